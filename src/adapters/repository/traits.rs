//! Repository abstraction traits
//!
//! Contracts for the external collaborators the import orchestrator and
//! verification service call into: the local transaction mirror, the
//! target status store and bulk persistence of normalized records. Real
//! deployments back these with a database; the crate ships in-memory
//! implementations for wiring and tests.

use crate::domain::ids::{TargetId, TransactionId};
use crate::domain::job::JobStatus;
use crate::domain::record::NormalizedRecord;
use crate::domain::result::Result;
use crate::domain::transaction::TransactionRecord;
use async_trait::async_trait;
use serde_json::Value;

/// Local store of ledger transaction records, keyed by transaction id
///
/// This is the "our side" of every ledger entry: the verbatim payload kept
/// locally so verification can later rehash it against what the ledger
/// holds.
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Persists a transaction record, returning the stored copy
    async fn save(&self, record: TransactionRecord) -> Result<TransactionRecord>;

    /// Looks up a full record by transaction id
    async fn get_by_transaction_id(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<Option<TransactionRecord>>;

    /// Looks up just the stored payload by transaction id
    async fn get_payload_by_transaction_id(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<Option<Value>>;
}

/// Status store for the catalog or mapping set a job populates
#[async_trait]
pub trait TargetStatusRepository: Send + Sync {
    /// Writes the new job status for the target
    async fn status_update(&self, target_id: &TargetId, status: JobStatus) -> Result<()>;

    /// Compensating delete: removes every normalized record persisted for
    /// the target
    ///
    /// Keyed by target id rather than a per-row marker, so it is safe to
    /// call even after a partial, non-transactional write.
    async fn delete_all_by_target_id(&self, target_id: &TargetId) -> Result<()>;
}

/// Bulk persistence of normalized records
#[async_trait]
pub trait BulkPersistence: Send + Sync {
    /// Persists one parser batch for the target
    ///
    /// The underlying store is assumed to provide at least per-batch
    /// atomicity; no locking is done here.
    async fn save_batch(&self, records: Vec<NormalizedRecord>, target_id: &TargetId)
        -> Result<()>;

    /// Number of records currently persisted for the target
    async fn count_by_target_id(&self, target_id: &TargetId) -> Result<usize>;
}
