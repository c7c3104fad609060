//! Ephemeral test ledger
//!
//! Single-process, in-memory backend used to exercise the import
//! orchestrator without network or credential dependencies. Entries live
//! in a plain map and are `Ready` the moment `insert` returns.

use crate::domain::errors::LedgerError;
use crate::domain::ids::TransactionId;
use crate::domain::result::Result;
use crate::ledger::contract::{
    stamp_payload, unstamp_payload, DeliveryStatus, LedgerBackend, LedgerEntry, Receipt,
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// In-memory ledger stand-in
#[derive(Debug, Default)]
pub struct EphemeralLedger {
    /// transaction id -> stamped body
    entries: Mutex<HashMap<String, Value>>,
}

impl EphemeralLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries inserted so far (test helper)
    pub fn len(&self) -> usize {
        self.entries.lock().expect("ledger map poisoned").len()
    }

    /// Returns true when nothing has been inserted yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl LedgerBackend for EphemeralLedger {
    async fn insert(&self, payload: &Value) -> Result<Receipt> {
        let transaction_id = Uuid::new_v4().to_string();
        let (stamped, _) = stamp_payload(payload);

        self.entries
            .lock()
            .expect("ledger map poisoned")
            .insert(transaction_id.clone(), stamped);

        Ok(Receipt {
            transaction_id: TransactionId::new(transaction_id)
                .map_err(LedgerError::InvalidResponse)?,
            status: DeliveryStatus::Ready,
        })
    }

    async fn retrieve(&self, transaction_id: &TransactionId) -> Result<Option<LedgerEntry>> {
        let stored = {
            let entries = self.entries.lock().expect("ledger map poisoned");
            entries.get(transaction_id.as_str()).cloned()
        };
        let Some(stored) = stored else {
            return Ok(None);
        };

        let (payload, hash) = unstamp_payload(&stored).ok_or_else(|| {
            LedgerError::Storage(format!(
                "Ephemeral entry {} has no stamped body",
                transaction_id
            ))
        })?;

        Ok(Some(LedgerEntry {
            transaction_id: transaction_id.clone(),
            status: DeliveryStatus::Ready,
            payload: Some(payload),
            content_hash: Some(hash),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_then_retrieve() {
        let ledger = EphemeralLedger::new();
        let payload = json!({"status": "created", "target_id": "catalog-1"});

        let receipt = ledger.insert(&payload).await.unwrap();
        assert_eq!(receipt.status, DeliveryStatus::Ready);

        let entry = ledger
            .retrieve(&receipt.transaction_id)
            .await
            .unwrap()
            .unwrap();
        assert!(entry.is_finalized());
        assert_eq!(entry.payload.unwrap(), payload);
    }

    #[tokio::test]
    async fn test_unknown_id_is_none() {
        let ledger = EphemeralLedger::new();
        let missing = ledger
            .retrieve(&TransactionId::new("no-such-id").unwrap())
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_each_transition_gets_its_own_entry() {
        let ledger = EphemeralLedger::new();
        ledger.insert(&json!({"status": "created"})).await.unwrap();
        ledger.insert(&json!({"status": "processing"})).await.unwrap();
        ledger.insert(&json!({"status": "completed"})).await.unwrap();
        assert_eq!(ledger.len(), 3);
    }
}
