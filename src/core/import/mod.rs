//! Import orchestration

pub mod orchestrator;

pub use orchestrator::{ImportOrchestrator, ImportOutcome, ImportRequest};
