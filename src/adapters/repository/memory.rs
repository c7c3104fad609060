//! In-memory repository implementations
//!
//! Process-local stores used by the CLI's default wiring and by tests.
//! A single [`InMemoryTargetStore`] implements both the status and bulk
//! persistence traits so the compensating delete and the record counts
//! observe the same data.

use crate::adapters::repository::traits::{
    BulkPersistence, TargetStatusRepository, TransactionRepository,
};
use crate::domain::ids::{TargetId, TransactionId};
use crate::domain::job::JobStatus;
use crate::domain::record::NormalizedRecord;
use crate::domain::result::Result;
use crate::domain::transaction::TransactionRecord;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory transaction record store
#[derive(Default)]
pub struct InMemoryTransactionRepository {
    records: Mutex<HashMap<String, TransactionRecord>>,
}

impl InMemoryTransactionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored transaction records (test helper)
    pub fn len(&self) -> usize {
        self.records.lock().expect("record map poisoned").len()
    }

    /// Returns true when no records have been saved
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Transaction ids recorded for a target, in insertion-independent order
    pub fn transaction_ids_for_target(&self, target_id: &TargetId) -> Vec<TransactionId> {
        self.records
            .lock()
            .expect("record map poisoned")
            .values()
            .filter(|r| &r.target_id == target_id)
            .map(|r| r.transaction_id.clone())
            .collect()
    }

    /// Overwrites a stored payload in place (test helper for tamper cases)
    pub fn tamper_payload(&self, transaction_id: &TransactionId, payload: Value) {
        let mut records = self.records.lock().expect("record map poisoned");
        if let Some(record) = records.get_mut(transaction_id.as_str()) {
            record.payload = payload;
        }
    }
}

#[async_trait]
impl TransactionRepository for InMemoryTransactionRepository {
    async fn save(&self, record: TransactionRecord) -> Result<TransactionRecord> {
        self.records
            .lock()
            .expect("record map poisoned")
            .insert(record.transaction_id.as_str().to_string(), record.clone());
        Ok(record)
    }

    async fn get_by_transaction_id(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<Option<TransactionRecord>> {
        Ok(self
            .records
            .lock()
            .expect("record map poisoned")
            .get(transaction_id.as_str())
            .cloned())
    }

    async fn get_payload_by_transaction_id(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<Option<Value>> {
        Ok(self
            .records
            .lock()
            .expect("record map poisoned")
            .get(transaction_id.as_str())
            .map(|r| r.payload.clone()))
    }
}

#[derive(Default)]
struct TargetState {
    status: Option<JobStatus>,
    records: Vec<NormalizedRecord>,
}

/// In-memory target store implementing both status updates and bulk writes
#[derive(Default)]
pub struct InMemoryTargetStore {
    targets: Mutex<HashMap<String, TargetState>>,
}

impl InMemoryTargetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last status written for the target (test helper)
    pub fn status_of(&self, target_id: &TargetId) -> Option<JobStatus> {
        self.targets
            .lock()
            .expect("target map poisoned")
            .get(target_id.as_str())
            .and_then(|t| t.status)
    }
}

#[async_trait]
impl TargetStatusRepository for InMemoryTargetStore {
    async fn status_update(&self, target_id: &TargetId, status: JobStatus) -> Result<()> {
        let mut targets = self.targets.lock().expect("target map poisoned");
        targets
            .entry(target_id.as_str().to_string())
            .or_default()
            .status = Some(status);
        Ok(())
    }

    async fn delete_all_by_target_id(&self, target_id: &TargetId) -> Result<()> {
        let mut targets = self.targets.lock().expect("target map poisoned");
        if let Some(state) = targets.get_mut(target_id.as_str()) {
            let removed = state.records.len();
            state.records.clear();
            tracing::debug!(
                target_id = %target_id,
                removed,
                "Deleted all records for target"
            );
        }
        Ok(())
    }
}

#[async_trait]
impl BulkPersistence for InMemoryTargetStore {
    async fn save_batch(
        &self,
        records: Vec<NormalizedRecord>,
        target_id: &TargetId,
    ) -> Result<()> {
        let mut targets = self.targets.lock().expect("target map poisoned");
        targets
            .entry(target_id.as_str().to_string())
            .or_default()
            .records
            .extend(records);
        Ok(())
    }

    async fn count_by_target_id(&self, target_id: &TargetId) -> Result<usize> {
        Ok(self
            .targets
            .lock()
            .expect("target map poisoned")
            .get(target_id.as_str())
            .map(|t| t.records.len())
            .unwrap_or(0))
    }
}
