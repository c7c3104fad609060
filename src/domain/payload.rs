//! Ledger transition payloads
//!
//! Every status transition of an import job is recorded in the ledger as
//! one immutable entry. Instead of an untyped dictionary, each transition
//! kind has an explicit versioned payload struct sharing a common core.
//! The serialized JSON value of a payload is exactly what gets canonically
//! hashed and appended, so field names here are part of the audit format.

use crate::domain::ids::TargetId;
use crate::domain::job::{ImportJob, JobStatus};
use crate::domain::result::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Payload format version, bumped on any field change
const PAYLOAD_VERSION: u32 = 1;

/// Fields shared by every transition payload
#[derive(Debug, Clone, Serialize)]
pub struct PayloadCore {
    /// Format version of this payload
    pub version: u32,

    /// Catalog or mapping set being populated
    pub target_id: TargetId,

    /// Name of the uploaded source file
    pub filename: String,

    /// Checksum of the raw uploaded bytes
    pub source_checksum: String,

    /// UTC timestamp of this transition (not of job creation)
    pub recorded_at: DateTime<Utc>,
}

impl PayloadCore {
    fn from_job(job: &ImportJob, recorded_at: DateTime<Utc>) -> Self {
        Self {
            version: PAYLOAD_VERSION,
            target_id: job.target_id.clone(),
            filename: job.source_filename.clone(),
            source_checksum: job.source_checksum.clone(),
            recorded_at,
        }
    }
}

/// Payload written when a job is accepted
#[derive(Debug, Clone, Serialize)]
pub struct CreatedPayload {
    #[serde(flatten)]
    pub core: PayloadCore,
    pub status: JobStatus,
}

/// Payload written when parsing and persistence start
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingPayload {
    #[serde(flatten)]
    pub core: PayloadCore,
    pub status: JobStatus,
}

/// Payload written for the terminal transitions (completed or failed)
#[derive(Debug, Clone, Serialize)]
pub struct TerminalPayload {
    #[serde(flatten)]
    pub core: PayloadCore,
    pub status: JobStatus,
}

/// One payload per transition kind
#[derive(Debug, Clone)]
pub enum TransitionPayload {
    Created(CreatedPayload),
    Processing(ProcessingPayload),
    Terminal(TerminalPayload),
}

impl TransitionPayload {
    /// Builds the payload for transitioning `job` into `status`
    ///
    /// The timestamp is taken at build time, so successive transitions of
    /// the same job carry distinct `recorded_at` values.
    pub fn for_transition(job: &ImportJob, status: JobStatus) -> Self {
        let core = PayloadCore::from_job(job, Utc::now());
        match status {
            JobStatus::Created => Self::Created(CreatedPayload { core, status }),
            JobStatus::Processing => Self::Processing(ProcessingPayload { core, status }),
            JobStatus::Completed | JobStatus::Failed => {
                Self::Terminal(TerminalPayload { core, status })
            }
        }
    }

    /// The job status this payload records
    pub fn status(&self) -> JobStatus {
        match self {
            Self::Created(p) => p.status,
            Self::Processing(p) => p.status,
            Self::Terminal(p) => p.status,
        }
    }

    /// Serializes into the JSON value that is hashed and ledgered
    pub fn to_value(&self) -> Result<Value> {
        let value = match self {
            Self::Created(p) => serde_json::to_value(p)?,
            Self::Processing(p) => serde_json::to_value(p)?,
            Self::Terminal(p) => serde_json::to_value(p)?,
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> ImportJob {
        ImportJob::new(TargetId::new("catalog-7").unwrap(), "fi.csv", "deadbeef")
    }

    #[test]
    fn test_payload_kind_follows_status() {
        let job = job();
        assert!(matches!(
            TransitionPayload::for_transition(&job, JobStatus::Created),
            TransitionPayload::Created(_)
        ));
        assert!(matches!(
            TransitionPayload::for_transition(&job, JobStatus::Processing),
            TransitionPayload::Processing(_)
        ));
        assert!(matches!(
            TransitionPayload::for_transition(&job, JobStatus::Completed),
            TransitionPayload::Terminal(_)
        ));
        assert!(matches!(
            TransitionPayload::for_transition(&job, JobStatus::Failed),
            TransitionPayload::Terminal(_)
        ));
    }

    #[test]
    fn test_serialized_fields() {
        let job = job();
        let payload = TransitionPayload::for_transition(&job, JobStatus::Created);
        let value = payload.to_value().unwrap();

        assert_eq!(value["status"], "created");
        assert_eq!(value["target_id"], "catalog-7");
        assert_eq!(value["filename"], "fi.csv");
        assert_eq!(value["source_checksum"], "deadbeef");
        assert_eq!(value["version"], 1);
        assert!(value["recorded_at"].is_string());
    }

    #[test]
    fn test_terminal_payload_keeps_failure_status() {
        let job = job();
        let payload = TransitionPayload::for_transition(&job, JobStatus::Failed);
        assert_eq!(payload.status(), JobStatus::Failed);
        assert_eq!(payload.to_value().unwrap()["status"], "failed");
    }
}
