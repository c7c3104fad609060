//! Import job model and status state machine
//!
//! An [`ImportJob`] records one attempt to parse a source file and populate
//! normalized records for a target catalog or mapping set. Its status moves
//! forward only: `created -> processing -> {completed | failed}`. A job that
//! fails keeps its row as an audit trace even though its data rows are
//! rolled back.

use crate::domain::errors::MedLedgerError;
use crate::domain::ids::{JobId, TargetId};
use crate::domain::result::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of an import job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Import request accepted, nothing parsed yet
    Created,
    /// Parser and bulk persistence are running
    Processing,
    /// All batches persisted, terminal
    Completed,
    /// Parse or persistence error, data rolled back, terminal
    Failed,
}

impl JobStatus {
    /// Returns true if `next` is a legal successor of `self`
    ///
    /// `Created -> Failed` is the explicit format-error fast path: a file
    /// that fails structural validation before any work starts.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Created, JobStatus::Processing)
                | (JobStatus::Created, JobStatus::Failed)
                | (JobStatus::Processing, JobStatus::Completed)
                | (JobStatus::Processing, JobStatus::Failed)
        )
    }

    /// Returns true for the terminal states
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Stable lowercase label used in payloads and logs
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Created => "created",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One import attempt
///
/// Owned and mutated exclusively by the import orchestrator; never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportJob {
    /// Opaque identifier, stable for the job's lifetime
    pub job_id: JobId,

    /// Catalog or mapping set being populated
    pub target_id: TargetId,

    /// Current lifecycle status
    pub status: JobStatus,

    /// Name of the uploaded source file
    pub source_filename: String,

    /// SHA-256 of the raw uploaded bytes (independent of the ledger's
    /// payload hash)
    pub source_checksum: String,

    /// Set once at creation, never mutated
    pub created_at: DateTime<Utc>,
}

impl ImportJob {
    /// Creates a job in the `Created` state
    pub fn new(
        target_id: TargetId,
        source_filename: impl Into<String>,
        source_checksum: impl Into<String>,
    ) -> Self {
        Self {
            job_id: JobId::generate(),
            target_id,
            status: JobStatus::Created,
            source_filename: source_filename.into(),
            source_checksum: source_checksum.into(),
            created_at: Utc::now(),
        }
    }

    /// Advances the job to `next`, enforcing the transition table
    ///
    /// # Errors
    ///
    /// Returns [`MedLedgerError::InvalidTransition`] when `next` is not a
    /// legal successor of the current status.
    pub fn transition_to(&mut self, next: JobStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(MedLedgerError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn job() -> ImportJob {
        ImportJob::new(
            TargetId::new("catalog-1").unwrap(),
            "eu.xlsx",
            "abc123",
        )
    }

    #[test_case(JobStatus::Created, JobStatus::Processing => true)]
    #[test_case(JobStatus::Created, JobStatus::Failed => true)]
    #[test_case(JobStatus::Created, JobStatus::Completed => false)]
    #[test_case(JobStatus::Processing, JobStatus::Completed => true)]
    #[test_case(JobStatus::Processing, JobStatus::Failed => true)]
    #[test_case(JobStatus::Processing, JobStatus::Created => false)]
    #[test_case(JobStatus::Completed, JobStatus::Processing => false)]
    #[test_case(JobStatus::Failed, JobStatus::Processing => false)]
    #[test_case(JobStatus::Completed, JobStatus::Failed => false)]
    fn transition_table(from: JobStatus, to: JobStatus) -> bool {
        from.can_transition_to(to)
    }

    #[test]
    fn test_new_job_starts_created() {
        let job = job();
        assert_eq!(job.status, JobStatus::Created);
        assert_eq!(job.source_filename, "eu.xlsx");
        assert!(!job.status.is_terminal());
    }

    #[test]
    fn test_happy_path_transitions() {
        let mut job = job();
        job.transition_to(JobStatus::Processing).unwrap();
        job.transition_to(JobStatus::Completed).unwrap();
        assert!(job.status.is_terminal());
    }

    #[test]
    fn test_terminal_jobs_reject_further_transitions() {
        let mut job = job();
        job.transition_to(JobStatus::Processing).unwrap();
        job.transition_to(JobStatus::Failed).unwrap();
        let err = job.transition_to(JobStatus::Processing).unwrap_err();
        assert!(matches!(
            err,
            MedLedgerError::InvalidTransition {
                from: JobStatus::Failed,
                to: JobStatus::Processing,
            }
        ));
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&JobStatus::Processing).unwrap(),
            "\"processing\""
        );
    }
}
