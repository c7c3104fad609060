//! Domain error types
//!
//! This module defines the error hierarchy for MedLedger. All errors are
//! domain-specific and don't expose third-party types.

use crate::domain::job::JobStatus;
use thiserror::Error;

/// Main MedLedger error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum MedLedgerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Ledger backend errors
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Source file format errors
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// Persistence-layer errors (transaction/target repositories, bulk writes)
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Job state machine violation
    #[error("Invalid job transition: {from} -> {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Ledger backend errors
///
/// Errors that occur when talking to a ledger backend. These errors don't
/// expose the underlying HTTP client or filesystem types.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Failed to reach the ledger service
    #[error("Failed to connect to ledger: {0}")]
    ConnectionFailed(String),

    /// Credential acquisition or rejection
    #[error("Ledger authentication failed: {0}")]
    AuthenticationFailed(String),

    /// An append was rejected or could not be made durable
    #[error("Ledger insert failed: {0}")]
    InsertFailed(String),

    /// The backend returned a payload we could not interpret
    #[error("Invalid response from ledger: {0}")]
    InvalidResponse(String),

    /// Server error (5xx)
    #[error("Ledger server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Ledger client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Request timed out
    #[error("Ledger request timeout: {0}")]
    Timeout(String),

    /// Local store read/write failure
    #[error("Ledger storage error: {0}")]
    Storage(String),
}

/// Source file format errors
///
/// Raised when a source catalog file fails structural validation. The
/// import orchestrator converts these into a terminal `failed` status.
#[derive(Debug, Error)]
pub enum FormatError {
    /// A required field/column is absent
    #[error("Missing required field '{field}' at record {line}")]
    MissingField { field: String, line: usize },

    /// A required field is present but empty
    #[error("Empty value for required field '{field}' at record {line}")]
    EmptyValue { field: String, line: usize },

    /// A row/line could not be parsed at all
    #[error("Malformed record at line {line}: {message}")]
    MalformedRecord { line: usize, message: String },

    /// The file header does not match the expected layout
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Record properties must be a flat JSON-serializable map
    #[error("Property '{key}' is not a flat value at record {line}")]
    NestedProperty { key: String, line: usize },

    /// No parser is registered for the given source-type key
    #[error("Unknown source type: {0}")]
    UnknownSourceType(String),

    /// The source file could not be opened or read
    #[error("Failed to read source file: {0}")]
    Unreadable(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for MedLedgerError {
    fn from(err: std::io::Error) -> Self {
        MedLedgerError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for MedLedgerError {
    fn from(err: serde_json::Error) -> Self {
        MedLedgerError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for MedLedgerError {
    fn from(err: toml::de::Error) -> Self {
        MedLedgerError::Configuration(format!("TOML parse error: {err}"))
    }
}
