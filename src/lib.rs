// MedLedger - Drug Catalog Import with a Verifiable Ledger Trail
// Licensed under the MIT License

//! # MedLedger - Drug Catalog Import & Verifiable Ledger
//!
//! MedLedger imports heterogeneous drug-catalog files (per-country registry
//! exports in delimited or JSON-lines form) into a target store, while
//! recording every job status transition on an append-only, hash-stamped
//! ledger so any recorded transition can later be verified for tampering.
//!
//! ## Overview
//!
//! One import runs as a small state machine:
//!
//! - **created** - the upload is accepted and checksummed
//! - **processing** - batches of normalized records are persisted
//! - **completed** / **failed** - terminal; a failure triggers a
//!   compensating delete so no partial rows survive
//!
//! Every transition is written to the configured ledger backend first, as a
//! payload stamped with its canonical SHA-256 content hash. Verification
//! recomputes the hash over the locally stored payload and compares it
//! against the ledgered value.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (import orchestration, hashing, verification)
//! - [`ledger`] - Ledger backends (local mirror, attested service, ephemeral)
//! - [`adapters`] - Parsers and persistence collaborators
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use medledger::adapters::repository::memory::{
//!     InMemoryTargetStore, InMemoryTransactionRepository,
//! };
//! use medledger::core::import::{ImportOrchestrator, ImportRequest};
//! use medledger::domain::ids::TargetId;
//! use medledger::ledger::ephemeral::EphemeralLedger;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ledger = Arc::new(EphemeralLedger::new());
//!     let transactions = Arc::new(InMemoryTransactionRepository::new());
//!     let targets = Arc::new(InMemoryTargetStore::new());
//!
//!     let mut orchestrator = ImportOrchestrator::new(
//!         ledger,
//!         transactions,
//!         targets.clone(),
//!         targets,
//!     );
//!
//!     let job = orchestrator
//!         .prepare(ImportRequest {
//!             target_id: TargetId::new("catalog-fi")?,
//!             source_filename: "drugs.csv".to_string(),
//!             source_bytes: b"code,name\nA01,Aspirin\n".to_vec(),
//!         })
//!         .await?;
//!
//!     println!("Accepted job {}", job.job_id);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! MedLedger uses the [`domain::MedLedgerError`] type for all errors:
//!
//! ```rust,no_run
//! use medledger::domain::MedLedgerError;
//!
//! fn example() -> Result<(), MedLedgerError> {
//!     let config = medledger::config::load_config("medledger.toml")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! MedLedger uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn};
//!
//! info!("Starting import");
//! warn!(transaction_id = "2.42", "Hash mismatch detected");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod ledger;
pub mod logging;
