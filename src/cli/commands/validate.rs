//! Validate config command implementation
//!
//! Implements the `validate-config` command.

use crate::config::load_config;
use crate::config::schema::LedgerTarget;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("Validating configuration file: {config_path}");
        println!();

        // load_config validates internally; a successful load is a valid config
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!("Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Application: {}", config.application.name);
        println!("  Log Level: {}", config.application.log_level);
        println!("  Environment: {:?}", config.environment);
        println!("  Batch Size: {}", config.import.batch_size);

        match config.ledger.target {
            LedgerTarget::Local => {
                if let Some(ref local) = config.ledger.local {
                    println!("  Ledger Target: local");
                    println!("  Ledger Path: {}", local.path);
                }
            }
            LedgerTarget::Attested => {
                if let Some(ref attested) = config.ledger.attested {
                    println!("  Ledger Target: attested");
                    println!("  Ledger Endpoint: {}", attested.endpoint);
                    println!("  Tenant: {}", attested.tenant_id);
                    println!("  Max Poll Attempts: {}", attested.max_poll_attempts);
                }
            }
            LedgerTarget::Ephemeral => {
                println!("  Ledger Target: ephemeral (in-memory, non-durable)");
            }
        }
        println!();
        Ok(0)
    }
}
