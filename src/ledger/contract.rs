//! Ledger backend contract
//!
//! Every backend - the local mirror, the externally attested service and
//! the ephemeral test ledger - implements the same two-method contract.
//! The import orchestrator only ever sees this trait; it never learns
//! which variant it holds.

use crate::core::verification::hash::canonical_hash;
use crate::domain::ids::TransactionId;
use crate::domain::result::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Backend-level delivery status of a ledger entry
///
/// Orthogonal to the import job status: an entry recording a `failed` job
/// transition can itself be `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    /// The backend accepted the entry but finality has not been reached
    Processing,
    /// The entry is durable and retrievable
    Ready,
}

/// Returned by [`LedgerBackend::insert`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    /// Identifier assigned by the backend at insert time
    pub transaction_id: TransactionId,

    /// Delivery status at the moment of the insert
    pub status: DeliveryStatus,
}

/// One entry retrieved from a ledger backend
///
/// `payload` and `content_hash` are `None` while the entry exists but has
/// not reached finality; callers must distinguish that case from
/// `retrieve` returning `Ok(None)` (the backend has no knowledge of the
/// id at all).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub transaction_id: TransactionId,
    pub status: DeliveryStatus,
    pub payload: Option<Value>,
    pub content_hash: Option<String>,
}

impl LedgerEntry {
    /// Returns true once the entry is durable and its payload is available
    pub fn is_finalized(&self) -> bool {
        self.status == DeliveryStatus::Ready && self.payload.is_some()
    }
}

/// Wraps a payload with its canonical content hash
///
/// This is the body every backend actually stores:
/// `{"data": <payload>, "hash": <canonical sha-256>}`. The hash is stamped
/// once, before insertion, and verification trusts only this stored value.
pub fn stamp_payload(payload: &Value) -> (Value, String) {
    let hash = canonical_hash(payload);
    let stamped = json!({ "data": payload, "hash": hash });
    (stamped, hash)
}

/// Splits a stored stamped body back into payload and hash
///
/// Returns `None` when the body does not have the stamped shape.
pub fn unstamp_payload(stored: &Value) -> Option<(Value, String)> {
    let data = stored.get("data")?.clone();
    let hash = stored.get("hash")?.as_str()?.to_string();
    Some((data, hash))
}

/// Append-only transaction ledger
///
/// `insert` is safe to call repeatedly for successive status transitions
/// of the same job; each call represents a distinct transition and gets
/// its own entry. An insert failure is fatal for the current transition
/// attempt - backends never retry internally.
#[async_trait]
pub trait LedgerBackend: Send + Sync + std::fmt::Debug {
    /// Appends an entry and returns the backend-assigned receipt
    async fn insert(&self, payload: &Value) -> Result<Receipt>;

    /// Looks up an entry by transaction id
    ///
    /// Returns `Ok(None)` if the backend has no knowledge of the id, and
    /// an unfinalized [`LedgerEntry`] if the entry exists but has not yet
    /// reached finality.
    async fn retrieve(&self, transaction_id: &TransactionId) -> Result<Option<LedgerEntry>>;
}
