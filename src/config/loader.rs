//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::MedLedgerConfig;
use crate::domain::errors::MedLedgerError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into MedLedgerConfig
/// 4. Applies environment variable overrides (MEDLEDGER_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - Environment variable substitution fails
/// - Configuration validation fails
pub fn load_config(path: impl AsRef<Path>) -> Result<MedLedgerConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MedLedgerError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        MedLedgerError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: MedLedgerConfig = toml::from_str(&contents)
        .map_err(|e| MedLedgerError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        MedLedgerError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    // Process line by line to skip comments
    for line in input.lines() {
        let trimmed = line.trim_start();

        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(MedLedgerError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the MEDLEDGER_* prefix
///
/// Environment variables follow the pattern: MEDLEDGER_<SECTION>_<KEY>
/// For example: MEDLEDGER_APPLICATION_LOG_LEVEL, MEDLEDGER_IMPORT_BATCH_SIZE
fn apply_env_overrides(config: &mut MedLedgerConfig) {
    // Application overrides
    if let Ok(val) = std::env::var("MEDLEDGER_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Import overrides
    if let Ok(val) = std::env::var("MEDLEDGER_IMPORT_BATCH_SIZE") {
        if let Ok(size) = val.parse() {
            config.import.batch_size = size;
        }
    }

    // Local ledger overrides
    if let Some(ref mut local) = config.ledger.local {
        if let Ok(val) = std::env::var("MEDLEDGER_LEDGER_LOCAL_PATH") {
            local.path = val;
        }
    }

    // Attested ledger overrides (only if the section is configured)
    if let Some(ref mut attested) = config.ledger.attested {
        if let Ok(val) = std::env::var("MEDLEDGER_LEDGER_ATTESTED_ENDPOINT") {
            attested.endpoint = val;
        }
        if let Ok(val) = std::env::var("MEDLEDGER_LEDGER_ATTESTED_TENANT_ID") {
            attested.tenant_id = val;
        }
        if let Ok(val) = std::env::var("MEDLEDGER_LEDGER_ATTESTED_CLIENT_ID") {
            attested.client_id = val;
        }
        if let Ok(val) = std::env::var("MEDLEDGER_LEDGER_ATTESTED_CLIENT_SECRET") {
            attested.client_secret = super::secret::secret_string(val);
        }
        if let Ok(val) = std::env::var("MEDLEDGER_LEDGER_ATTESTED_CERTIFICATE_PATH") {
            attested.certificate_path = Some(val);
        }
        if let Ok(val) = std::env::var("MEDLEDGER_LEDGER_ATTESTED_MAX_POLL_ATTEMPTS") {
            if let Ok(attempts) = val.parse() {
                attested.max_poll_attempts = attempts;
            }
        }
    }

    // Logging overrides
    if let Ok(val) = std::env::var("MEDLEDGER_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("MEDLEDGER_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("MEDLEDGER_TEST_VAR", "test_value");
        let input = "client_secret = \"${MEDLEDGER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "client_secret = \"test_value\"\n");
        std::env::remove_var("MEDLEDGER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("MEDLEDGER_MISSING_VAR");
        let input = "client_secret = \"${MEDLEDGER_MISSING_VAR}\"";
        let result = substitute_env_vars(input);
        assert!(result.is_err());
    }

    #[test]
    fn test_substitute_skips_comment_lines() {
        let input = "# secret = \"${NOT_SET_ANYWHERE}\"\ntarget = \"ephemeral\"";
        let result = substitute_env_vars(input).unwrap();
        assert!(result.contains("${NOT_SET_ANYWHERE}"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[application]
name = "medledger"
log_level = "info"

[ledger]
target = "local"

[ledger.local]
path = "/tmp/medledger/ledger.json"

[import]
batch_size = 250
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let result = load_config(temp_file.path());
        assert!(result.is_ok());

        let config = result.unwrap();
        assert_eq!(config.application.name, "medledger");
        assert_eq!(config.import.batch_size, 250);
        assert_eq!(
            config.ledger.local.as_ref().unwrap().path,
            "/tmp/medledger/ledger.json"
        );
    }

    #[test]
    fn test_load_config_rejects_missing_backend_section() {
        let toml_content = r#"
[application]
name = "medledger"

[ledger]
target = "attested"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let result = load_config(temp_file.path());
        assert!(result.is_err());
    }
}
