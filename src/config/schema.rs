//! Configuration schema types
//!
//! Root structure mapping to the TOML configuration file, plus per-section
//! validation.

use crate::config::SecretString;
use serde::{Deserialize, Serialize};

/// Ledger backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerTarget {
    /// Self-trusted JSON file on local disk
    Local,
    /// Externally attested ledger service
    Attested,
    /// In-memory stand-in for tests and development
    Ephemeral,
}

/// Runtime environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment
    #[default]
    Development,
    /// Staging environment
    Staging,
    /// Production environment
    Production,
}

/// Main MedLedger configuration
///
/// This is the root structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedLedgerConfig {
    /// Application-level settings
    pub application: ApplicationConfig,

    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: Environment,

    /// Ledger backend selection and per-backend settings
    pub ledger: LedgerConfig,

    /// Import settings
    #[serde(default)]
    pub import: ImportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MedLedgerConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.ledger.validate(&self.environment)?;
        self.import.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Application name
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("application.name must not be empty".to_string());
        }
        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            other => Err(format!(
                "application.log_level '{other}' is invalid; must be one of: trace, debug, info, warn, error"
            )),
        }
    }
}

fn default_app_name() -> String {
    "medledger".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Ledger backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Which backend to construct (local, attested, ephemeral)
    pub target: LedgerTarget,

    /// Local mirror settings (required if target = local)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local: Option<LocalLedgerConfig>,

    /// Attested service settings (required if target = attested)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attested: Option<AttestedLedgerConfig>,
}

impl LedgerConfig {
    fn validate(&self, environment: &Environment) -> Result<(), String> {
        match self.target {
            LedgerTarget::Local => {
                let local = self.local.as_ref().ok_or_else(|| {
                    "ledger.local configuration is required when ledger.target = 'local'"
                        .to_string()
                })?;
                local.validate()
            }
            LedgerTarget::Attested => {
                let attested = self.attested.as_ref().ok_or_else(|| {
                    "ledger.attested configuration is required when ledger.target = 'attested'"
                        .to_string()
                })?;
                attested.validate()
            }
            LedgerTarget::Ephemeral => {
                if *environment == Environment::Production {
                    return Err(
                        "ledger.target = 'ephemeral' is not allowed in production".to_string()
                    );
                }
                Ok(())
            }
        }
    }
}

/// Local mirror ledger settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalLedgerConfig {
    /// Path of the backing JSON file
    pub path: String,
}

impl LocalLedgerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.path.trim().is_empty() {
            return Err("ledger.local.path must not be empty".to_string());
        }
        Ok(())
    }
}

/// Attested ledger service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttestedLedgerConfig {
    /// Base URL of the ledger service
    pub endpoint: String,

    /// Azure AD tenant for the client-credentials flow
    pub tenant_id: String,

    /// Application (client) id
    pub client_id: String,

    /// Client secret, supplied via `${VAR}` substitution in practice
    pub client_secret: SecretString,

    /// Path to the service's ledger-identity TLS certificate (PEM)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_path: Option<String>,

    /// Override for the AAD authority host (tests point this at a mock)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authority_host: Option<String>,

    /// Override for the token scope
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Delay between finality polls in `retrieve`
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Maximum finality polls before returning an unfinalized entry
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,

    /// Per-request HTTP timeout
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

impl AttestedLedgerConfig {
    fn validate(&self) -> Result<(), String> {
        if !self.endpoint.starts_with("https://") {
            return Err(format!(
                "ledger.attested.endpoint must be an https URL, got '{}'",
                self.endpoint
            ));
        }
        url::Url::parse(&self.endpoint)
            .map_err(|e| format!("ledger.attested.endpoint is not a valid URL: {e}"))?;
        if self.tenant_id.trim().is_empty() {
            return Err("ledger.attested.tenant_id must not be empty".to_string());
        }
        if self.client_id.trim().is_empty() {
            return Err("ledger.attested.client_id must not be empty".to_string());
        }
        if self.max_poll_attempts == 0 {
            return Err("ledger.attested.max_poll_attempts must be at least 1".to_string());
        }
        Ok(())
    }
}

fn default_poll_interval_ms() -> u64 {
    250
}

fn default_max_poll_attempts() -> u32 {
    20
}

fn default_request_timeout_seconds() -> u64 {
    30
}

/// Import settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Records per parser batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl ImportConfig {
    fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 {
            return Err("import.batch_size must be at least 1".to_string());
        }
        if self.batch_size > 100_000 {
            return Err("import.batch_size must be at most 100000".to_string());
        }
        Ok(())
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
        }
    }
}

fn default_batch_size() -> usize {
    500
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for rotated log files
    #[serde(default = "default_log_path")]
    pub local_path: String,

    /// Rotation policy: daily or hourly
    #[serde(default = "default_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path must not be empty when file logging is enabled".to_string());
        }
        match self.local_rotation.as_str() {
            "daily" | "hourly" => Ok(()),
            other => Err(format!(
                "logging.local_rotation '{other}' is invalid; must be daily or hourly"
            )),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_log_path(),
            local_rotation: default_rotation(),
        }
    }
}

fn default_log_path() -> String {
    "logs".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret::secret_string;

    fn base_config(target: LedgerTarget) -> MedLedgerConfig {
        MedLedgerConfig {
            application: ApplicationConfig {
                name: "medledger".to_string(),
                log_level: "info".to_string(),
            },
            environment: Environment::Development,
            ledger: LedgerConfig {
                target,
                local: None,
                attested: None,
            },
            import: ImportConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    #[test]
    fn test_ephemeral_valid_in_development() {
        assert!(base_config(LedgerTarget::Ephemeral).validate().is_ok());
    }

    #[test]
    fn test_ephemeral_rejected_in_production() {
        let mut config = base_config(LedgerTarget::Ephemeral);
        config.environment = Environment::Production;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_local_target_requires_section() {
        let mut config = base_config(LedgerTarget::Local);
        assert!(config.validate().is_err());

        config.ledger.local = Some(LocalLedgerConfig {
            path: "/var/lib/medledger/ledger.json".to_string(),
        });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_attested_endpoint_must_be_https() {
        let mut config = base_config(LedgerTarget::Attested);
        config.ledger.attested = Some(AttestedLedgerConfig {
            endpoint: "http://ledger.example.com".to_string(),
            tenant_id: "tenant".to_string(),
            client_id: "client".to_string(),
            client_secret: secret_string("s".to_string()),
            certificate_path: None,
            authority_host: None,
            scope: None,
            poll_interval_ms: 250,
            max_poll_attempts: 20,
            request_timeout_seconds: 30,
        });
        let err = config.validate().unwrap_err();
        assert!(err.contains("https"));
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let mut config = base_config(LedgerTarget::Ephemeral);
        config.application.log_level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let mut config = base_config(LedgerTarget::Ephemeral);
        config.import.batch_size = 0;
        assert!(config.validate().is_err());
    }
}
