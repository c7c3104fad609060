//! Repository adapters
//!
//! Collaborator traits consumed by the orchestrator and verification
//! service, plus in-memory implementations.

pub mod memory;
pub mod traits;

pub use memory::{InMemoryTargetStore, InMemoryTransactionRepository};
pub use traits::{BulkPersistence, TargetStatusRepository, TransactionRepository};
