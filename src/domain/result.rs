//! Result type alias for MedLedger operations

use crate::domain::errors::MedLedgerError;

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, MedLedgerError>;
