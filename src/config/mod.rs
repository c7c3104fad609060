//! Configuration management for MedLedger.
//!
//! TOML-based configuration loading, parsing, and validation with:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - Environment variable overrides (`MEDLEDGER_*` prefix)
//! - Default values for optional settings
//! - Validation on load
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! name = "medledger"
//! log_level = "info"
//!
//! [ledger]
//! target = "attested"
//!
//! [ledger.attested]
//! endpoint = "https://my-ledger.confidential-ledger.azure.com"
//! tenant_id = "00000000-0000-0000-0000-000000000000"
//! client_id = "00000000-0000-0000-0000-000000000000"
//! client_secret = "${MEDLEDGER_CLIENT_SECRET}"
//!
//! [import]
//! batch_size = 500
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    ApplicationConfig, AttestedLedgerConfig, Environment, ImportConfig, LedgerConfig,
    LedgerTarget, LocalLedgerConfig, LoggingConfig, MedLedgerConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
