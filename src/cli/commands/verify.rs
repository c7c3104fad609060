//! Verify command implementation
//!
//! Retrieves a ledger entry by transaction id and checks that the stored
//! payload still matches the content hash stamped at insert time.

use crate::config::load_config;
use crate::core::verification::hash::canonical_hash;
use crate::domain::ids::TransactionId;
use crate::ledger::factory::create_ledger_backend;
use clap::Args;

/// Arguments for the verify command
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Transaction id to verify
    #[arg(long)]
    pub transaction_id: String,
}

impl VerifyArgs {
    /// Execute the verify command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(transaction_id = %self.transaction_id, "Starting verify command");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Configuration error: {e}");
                return Ok(2);
            }
        };

        let transaction_id = match TransactionId::new(&self.transaction_id) {
            Ok(id) => id,
            Err(e) => {
                eprintln!("Invalid transaction id: {e}");
                return Ok(2);
            }
        };

        let ledger = match create_ledger_backend(&config.ledger) {
            Ok(l) => l,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create ledger backend");
                eprintln!("Failed to initialize ledger backend: {e}");
                return Ok(4);
            }
        };

        let entry = match ledger.retrieve(&transaction_id).await {
            Ok(e) => e,
            Err(e) => {
                tracing::error!(transaction_id = %transaction_id, error = %e, "Ledger lookup failed");
                eprintln!("Ledger lookup failed: {e}");
                return Ok(4);
            }
        };

        let Some(entry) = entry else {
            println!("Transaction {transaction_id}: unknown to the ledger");
            return Ok(1);
        };

        if !entry.is_finalized() {
            println!(
                "Transaction {transaction_id}: accepted but not yet finalized ({:?})",
                entry.status
            );
            return Ok(1);
        }

        // is_finalized guarantees the payload is present
        let payload = entry.payload.unwrap_or_default();
        let recomputed = canonical_hash(&payload);
        match entry.content_hash {
            Some(ref stored) if *stored == recomputed => {
                println!("Transaction {transaction_id}: verified");
                println!("  Content hash: {stored}");
                Ok(0)
            }
            Some(ref stored) => {
                tracing::warn!(
                    transaction_id = %transaction_id,
                    "Stored payload does not match its content hash"
                );
                println!("Transaction {transaction_id}: HASH MISMATCH");
                println!("  Stored:     {stored}");
                println!("  Recomputed: {recomputed}");
                Ok(1)
            }
            None => {
                println!("Transaction {transaction_id}: entry carries no content hash");
                Ok(1)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_args_creation() {
        let args = VerifyArgs {
            transaction_id: "2.42".to_string(),
        };
        assert_eq!(args.transaction_id, "2.42");
    }
}
