//! Import command implementation
//!
//! Runs one import job end to end: accept the file, record the job on the
//! ledger, stream batches into the target store and verify the recorded
//! transactions afterwards.

use crate::adapters::parser::registry::ParserRegistry;
use crate::adapters::repository::memory::{InMemoryTargetStore, InMemoryTransactionRepository};
use crate::config::load_config;
use crate::core::import::{ImportOrchestrator, ImportRequest};
use crate::core::verification::verify::VerificationService;
use crate::domain::ids::TargetId;
use crate::ledger::factory::create_ledger_backend;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for the import command
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Target catalog or mapping set to populate
    #[arg(long)]
    pub target_id: String,

    /// Path to the source catalog file
    #[arg(long)]
    pub file: PathBuf,

    /// Source format key (csv, scsv, tsv, jsonl)
    #[arg(long)]
    pub source_type: String,

    /// Override the configured batch size
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Skip post-import verification of the recorded transactions
    #[arg(long)]
    pub no_verify: bool,
}

impl ImportArgs {
    /// Execute the import command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(
            target_id = %self.target_id,
            file = %self.file.display(),
            source_type = %self.source_type,
            "Starting import command"
        );

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Configuration error: {e}");
                return Ok(2);
            }
        };

        let target_id = match TargetId::new(&self.target_id) {
            Ok(id) => id,
            Err(e) => {
                eprintln!("Invalid target id: {e}");
                return Ok(2);
            }
        };

        let source_bytes = match tokio::fs::read(&self.file).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(file = %self.file.display(), error = %e, "Failed to read source file");
                eprintln!("Failed to read {}: {e}", self.file.display());
                return Ok(3);
            }
        };

        let batch_size = self.batch_size.unwrap_or(config.import.batch_size);
        let registry = ParserRegistry::with_builtins();
        let parser = match registry.select(&self.source_type, &self.file, batch_size) {
            Ok(p) => p,
            Err(e) => {
                tracing::error!(source_type = %self.source_type, error = %e, "Parser selection failed");
                eprintln!(
                    "Unsupported or malformed source ({e}). Known types: {}",
                    registry.known_types().join(", ")
                );
                return Ok(3);
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

        let transactions = Arc::new(InMemoryTransactionRepository::new());
        let targets = Arc::new(InMemoryTargetStore::new());

        let mut orchestrator = ImportOrchestrator::new(
            ledger.clone(),
            transactions.clone(),
            targets.clone(),
            targets.clone(),
        );

        let request = ImportRequest {
            target_id: target_id.clone(),
            source_filename: self
                .file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| self.file.display().to_string()),
            source_bytes,
        };

        let job = match orchestrator.prepare(request).await {
            Ok(job) => job,
            Err(e) => {
                tracing::error!(error = %e, "Failed to prepare import job");
                eprintln!("Failed to prepare import: {e}");
                return Ok(5);
            }
        };

        println!("Import job {} accepted for target {}", job.job_id, target_id);

        // The request path ends at prepare; the actual import runs on a
        // background task and is awaited here
        let handle = tokio::spawn(async move {
            let outcome = orchestrator.execute(parser).await;
            (orchestrator, outcome)
        });

        let (_orchestrator, outcome) = handle
            .await
            .map_err(|e| anyhow::anyhow!("Import task panicked: {e}"))?;

        let exit_code = match outcome {
            Ok(summary) => {
                println!();
                println!("Import Summary:");
                println!("  Job: {}", summary.job_id);
                println!("  Records: {}", summary.records_imported);
                println!("  Batches: {}", summary.batches);
                println!("  Duration: {}ms", summary.duration_ms);
                0
            }
            Err(e) => {
                println!();
                println!("Import failed: {e}");
                println!("All records for target {target_id} were rolled back.");
                1
            }
        };

        if !self.no_verify {
            let service = VerificationService::new(transactions.clone(), ledger);
            let mut verified = 0usize;
            let mut failed = 0usize;
            for txn_id in transactions.transaction_ids_for_target(&target_id) {
                match service.verify(&txn_id).await {
                    Ok(verdict) if verdict.is_valid() => verified += 1,
                    Ok(verdict) => {
                        tracing::warn!(
                            transaction_id = %txn_id,
                            verdict = ?verdict,
                            "Transaction failed verification"
                        );
                        failed += 1;
                    }
                    Err(e) => {
                        tracing::error!(transaction_id = %txn_id, error = %e, "Verification errored");
                        failed += 1;
                    }
                }
            }
            println!();
            println!("Verification: {verified} verified, {failed} failed");
            if failed > 0 && exit_code == 0 {
                return Ok(1);
            }
        }

        Ok(exit_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_args_defaults() {
        let args = ImportArgs {
            target_id: "catalog-fi".to_string(),
            file: PathBuf::from("drugs.csv"),
            source_type: "csv".to_string(),
            batch_size: None,
            no_verify: false,
        };

        assert!(args.batch_size.is_none());
        assert!(!args.no_verify);
    }
}
