//! Local mirror ledger
//!
//! A synchronous, self-trusted backend that keeps the ledger as a JSON
//! document on local disk. Inserts are durable before `insert` returns and
//! entries are `Ready` immediately. This is the default backend when an
//! externally attested ledger is not configured - it provides the audit
//! trail but no third-party tamper resistance.

use crate::domain::errors::LedgerError;
use crate::domain::ids::TransactionId;
use crate::domain::result::Result;
use crate::ledger::contract::{
    stamp_payload, unstamp_payload, DeliveryStatus, LedgerBackend, LedgerEntry, Receipt,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use uuid::Uuid;

/// On-disk representation of one mirrored entry
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredTransaction {
    transaction_id: String,
    status: DeliveryStatus,
    /// Stamped body: `{"data": <payload>, "hash": <sha-256>}`
    contents: Value,
}

/// File-backed local mirror
#[derive(Debug)]
pub struct LocalMirrorLedger {
    path: PathBuf,
    /// Serializes read-modify-write cycles on the backing file
    write_lock: Mutex<()>,
}

impl LocalMirrorLedger {
    /// Creates a mirror backed by the JSON file at `path`
    ///
    /// The file is created on first insert; the parent directory must
    /// exist or be creatable.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    async fn read_store(&self) -> Result<BTreeMap<String, StoredTransaction>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                LedgerError::Storage(format!(
                    "Corrupt mirror file {}: {e}",
                    self.path.display()
                ))
                .into()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(LedgerError::Storage(format!(
                "Failed to read mirror file {}: {e}",
                self.path.display()
            ))
            .into()),
        }
    }

    async fn write_store(&self, store: &BTreeMap<String, StoredTransaction>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    LedgerError::Storage(format!(
                        "Failed to create mirror directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }

        let encoded = serde_json::to_vec_pretty(store)
            .map_err(|e| LedgerError::Storage(format!("Failed to encode mirror: {e}")))?;

        // Write to a sibling temp file and rename so a crash mid-write
        // never leaves a truncated ledger behind
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, &encoded).await.map_err(|e| {
            LedgerError::Storage(format!("Failed to write mirror file {}: {e}", tmp.display()))
        })?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            LedgerError::Storage(format!(
                "Failed to replace mirror file {}: {e}",
                self.path.display()
            ))
        })?;

        Ok(())
    }
}

#[async_trait]
impl LedgerBackend for LocalMirrorLedger {
    async fn insert(&self, payload: &Value) -> Result<Receipt> {
        let _guard = self.write_lock.lock().await;

        let transaction_id = Uuid::new_v4().to_string();
        let (stamped, hash) = stamp_payload(payload);

        let mut store = self.read_store().await?;
        store.insert(
            transaction_id.clone(),
            StoredTransaction {
                transaction_id: transaction_id.clone(),
                status: DeliveryStatus::Ready,
                contents: stamped,
            },
        );
        self.write_store(&store).await?;

        tracing::debug!(
            transaction_id = %transaction_id,
            content_hash = %hash,
            "Mirrored ledger entry to local store"
        );

        Ok(Receipt {
            transaction_id: TransactionId::new(transaction_id)
                .map_err(LedgerError::InvalidResponse)?,
            status: DeliveryStatus::Ready,
        })
    }

    async fn retrieve(&self, transaction_id: &TransactionId) -> Result<Option<LedgerEntry>> {
        let store = self.read_store().await?;
        let Some(stored) = store.get(transaction_id.as_str()) else {
            return Ok(None);
        };

        let (payload, hash) = unstamp_payload(&stored.contents).ok_or_else(|| {
            LedgerError::Storage(format!(
                "Mirror entry {} has no stamped body",
                transaction_id
            ))
        })?;

        Ok(Some(LedgerEntry {
            transaction_id: transaction_id.clone(),
            status: stored.status,
            payload: Some(payload),
            content_hash: Some(hash),
        }))
    }
}
