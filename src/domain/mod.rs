//! Core domain types and models
//!
//! Identifier newtypes, the import job state machine, the normalized
//! record contract, ledger transition payloads and the crate error
//! hierarchy.

pub mod errors;
pub mod ids;
pub mod job;
pub mod payload;
pub mod record;
pub mod result;
pub mod transaction;

pub use errors::{FormatError, LedgerError, MedLedgerError};
pub use ids::{JobId, TargetId, TransactionId};
pub use job::{ImportJob, JobStatus};
pub use payload::TransitionPayload;
pub use record::NormalizedRecord;
pub use result::Result;
pub use transaction::TransactionRecord;
