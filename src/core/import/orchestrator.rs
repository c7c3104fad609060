//! Import orchestrator - the job state machine
//!
//! Drives one import attempt through `created -> processing ->
//! {completed | failed}`. Every transition goes through `update_status`,
//! the single atomic unit the state machine is built from: ledger insert
//! first, then the local transaction record, then the target's status.
//! On any parse or persistence failure the orchestrator transitions to
//! `failed` and issues a compensating delete of everything persisted for
//! the target, so a failed import leaves zero normalized records behind
//! while the ledger keeps the full history including the failure.

use crate::adapters::parser::contract::CatalogParser;
use crate::adapters::repository::traits::{
    BulkPersistence, TargetStatusRepository, TransactionRepository,
};
use crate::core::verification::hash::{bytes_checksum, canonical_hash};
use crate::domain::errors::MedLedgerError;
use crate::domain::ids::{JobId, TargetId};
use crate::domain::job::{ImportJob, JobStatus};
use crate::domain::payload::TransitionPayload;
use crate::domain::result::Result;
use crate::domain::transaction::TransactionRecord;
use crate::ledger::contract::LedgerBackend;
use std::sync::Arc;
use std::time::Instant;

/// One accepted import request
#[derive(Debug, Clone)]
pub struct ImportRequest {
    /// Catalog or mapping set to populate
    pub target_id: TargetId,

    /// Name of the uploaded file, recorded in every ledger payload
    pub source_filename: String,

    /// Raw uploaded bytes; only their checksum is kept on the job
    pub source_bytes: Vec<u8>,
}

/// Summary of a completed import
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub job_id: JobId,
    pub records_imported: usize,
    pub batches: usize,
    pub duration_ms: u64,
}

/// Orchestrates one import job
///
/// All collaborators are injected at construction; the orchestrator never
/// knows which ledger variant or persistence backend it holds. One
/// orchestrator instance owns exactly one job - transitions for a job are
/// strictly sequential by construction.
pub struct ImportOrchestrator {
    ledger: Arc<dyn LedgerBackend>,
    transactions: Arc<dyn TransactionRepository>,
    target_status: Arc<dyn TargetStatusRepository>,
    bulk: Arc<dyn BulkPersistence>,
    job: Option<ImportJob>,
}

impl ImportOrchestrator {
    /// Creates an orchestrator with injected collaborators
    pub fn new(
        ledger: Arc<dyn LedgerBackend>,
        transactions: Arc<dyn TransactionRepository>,
        target_status: Arc<dyn TargetStatusRepository>,
        bulk: Arc<dyn BulkPersistence>,
    ) -> Self {
        Self {
            ledger,
            transactions,
            target_status,
            bulk,
            job: None,
        }
    }

    /// The job owned by this orchestrator, once `prepare` has run
    pub fn job(&self) -> Option<&ImportJob> {
        self.job.as_ref()
    }

    /// Accepts an import request: checksums the upload, creates the job
    /// and records the `created` transition
    ///
    /// This is the fast, request-path half of an import; `execute` is
    /// meant to run afterwards on a background task.
    ///
    /// # Errors
    ///
    /// Fails if a job was already prepared on this orchestrator or if the
    /// `created` ledger write cannot be made.
    pub async fn prepare(&mut self, request: ImportRequest) -> Result<&ImportJob> {
        if self.job.is_some() {
            return Err(MedLedgerError::Validation(
                "Orchestrator already owns a job".to_string(),
            ));
        }

        let checksum = bytes_checksum(&request.source_bytes);
        let job = ImportJob::new(request.target_id, request.source_filename, checksum);

        tracing::info!(
            job_id = %job.job_id,
            target_id = %job.target_id,
            filename = %job.source_filename,
            "Import job accepted"
        );

        self.job = Some(job);
        self.update_status(JobStatus::Created).await?;
        Ok(self.job.as_ref().expect("job was just set"))
    }

    /// Records a status transition: ledger entry, local transaction
    /// record, then target status
    ///
    /// The ledger write deliberately comes first. If it succeeds and a
    /// local write then fails, the ledger holds an entry the local state
    /// does not match - an accepted inconsistency window, surfaced in the
    /// logs rather than hidden behind a distributed transaction.
    async fn update_status(&mut self, status: JobStatus) -> Result<()> {
        let job = self
            .job
            .as_mut()
            .ok_or_else(|| MedLedgerError::Validation("No job prepared".to_string()))?;

        // The initial `created` record is not a transition; everything
        // else must follow the table
        if status != job.status {
            job.transition_to(status)?;
        }

        let payload = TransitionPayload::for_transition(job, status).to_value()?;
        let content_hash = canonical_hash(&payload);
        let target_id = job.target_id.clone();
        let job_id = job.job_id.clone();

        let receipt = self.ledger.insert(&payload).await?;

        tracing::info!(
            job_id = %job_id,
            transaction_id = %receipt.transaction_id,
            status = %status,
            delivery = ?receipt.status,
            "Ledger entry written"
        );

        self.transactions
            .save(TransactionRecord::new(
                receipt.transaction_id.clone(),
                target_id.clone(),
                payload,
                content_hash,
            ))
            .await?;

        self.target_status.status_update(&target_id, status).await?;

        Ok(())
    }

    /// Runs the import: processing, batch persistence, completion
    ///
    /// The parser is drained exactly once; on any error during parsing or
    /// persistence the job transitions to `failed` and all records
    /// persisted for the target are deleted. Calling `execute` on a job
    /// that is not in `created` (including terminal jobs, or an
    /// orchestrator reused after a finished run) fails with an
    /// `InvalidTransition` instead of silently re-importing nothing.
    pub async fn execute(&mut self, mut parser: Box<dyn CatalogParser>) -> Result<ImportOutcome> {
        let job = self
            .job
            .as_ref()
            .ok_or_else(|| MedLedgerError::Validation("No job prepared".to_string()))?;
        if job.status != JobStatus::Created {
            return Err(MedLedgerError::InvalidTransition {
                from: job.status,
                to: JobStatus::Processing,
            });
        }

        let job_id = job.job_id.clone();
        let target_id = job.target_id.clone();
        let started = Instant::now();

        match self.run_import(parser.as_mut(), &target_id).await {
            Ok((records_imported, batches)) => {
                let outcome = ImportOutcome {
                    job_id,
                    records_imported,
                    batches,
                    duration_ms: started.elapsed().as_millis() as u64,
                };
                tracing::info!(
                    job_id = %outcome.job_id,
                    records = outcome.records_imported,
                    batches = outcome.batches,
                    duration_ms = outcome.duration_ms,
                    "Import completed"
                );
                Ok(outcome)
            }
            Err(err) => {
                tracing::error!(
                    job_id = %job_id,
                    target_id = %target_id,
                    error = %err,
                    "Import failed, rolling back target records"
                );
                self.compensate(&target_id).await;
                Err(err)
            }
        }
    }

    /// The fallible body of `execute`: every error here triggers
    /// compensation in the caller
    async fn run_import(
        &mut self,
        parser: &mut dyn CatalogParser,
        target_id: &TargetId,
    ) -> Result<(usize, usize)> {
        self.update_status(JobStatus::Processing).await?;

        let mut records_imported = 0;
        let mut batches = 0;
        while let Some(batch) = parser.next_batch()? {
            records_imported += batch.len();
            batches += 1;
            tracing::debug!(
                target_id = %target_id,
                batch = batches,
                batch_size = batch.len(),
                "Persisting batch"
            );
            self.bulk.save_batch(batch, target_id).await?;
        }

        self.update_status(JobStatus::Completed).await?;
        Ok((records_imported, batches))
    }

    /// Terminal failure path: record `failed`, then delete everything
    /// persisted for the target
    ///
    /// Both steps are attempted even if the first fails - the compensating
    /// delete must run regardless, and it is keyed by target id so it is
    /// safe after partial writes. Secondary errors are logged, not
    /// propagated; the caller returns the original import error.
    async fn compensate(&mut self, target_id: &TargetId) {
        if let Err(e) = self.update_status(JobStatus::Failed).await {
            tracing::error!(
                target_id = %target_id,
                error = %e,
                "Failed to record terminal failure status"
            );
        }
        if let Err(e) = self.target_status.delete_all_by_target_id(target_id).await {
            tracing::error!(
                target_id = %target_id,
                error = %e,
                "Compensating delete failed; target may hold partial records"
            );
        }
    }
}
