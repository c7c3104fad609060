//! Locally stored ledger transaction record
//!
//! The transaction repository keeps one of these per ledger insert, keyed
//! by the backend-assigned transaction id. The stored `payload` is the
//! verbatim value that was passed to the ledger; the verification service
//! later rehashes it and compares against the hash the ledger holds.

use crate::domain::ids::{TargetId, TransactionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One locally mirrored ledger transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Backend-assigned transaction identifier
    pub transaction_id: TransactionId,

    /// Catalog or mapping set the transaction belongs to
    pub target_id: TargetId,

    /// Exact payload that was passed to `LedgerBackend::insert`
    pub payload: Value,

    /// Content hash computed over `payload` at insert time
    pub content_hash: String,

    /// When this record was saved locally
    pub recorded_at: DateTime<Utc>,
}

impl TransactionRecord {
    /// Creates a record timestamped now
    pub fn new(
        transaction_id: TransactionId,
        target_id: TargetId,
        payload: Value,
        content_hash: impl Into<String>,
    ) -> Self {
        Self {
            transaction_id,
            target_id,
            payload,
            content_hash: content_hash.into(),
            recorded_at: Utc::now(),
        }
    }
}
