//! Parser contract
//!
//! A parser turns one source catalog file into a lazy, finite sequence of
//! normalized record batches. The sequence is not restartable: once a
//! batch has been yielded it will not be yielded again, and after `None`
//! the parser is exhausted. The import orchestrator drains a parser
//! exactly once.

use crate::domain::record::NormalizedRecord;
use crate::domain::result::Result;

/// Pluggable source-format parser
///
/// Implementations validate required fields as they go and fail fast with
/// a typed [`crate::domain::FormatError`] on the first structural problem.
pub trait CatalogParser: Send + std::fmt::Debug {
    /// Yields the next batch of normalized records
    ///
    /// Returns `Ok(None)` when the source is exhausted. A returned error
    /// is terminal for the whole import, not just the current batch.
    fn next_batch(&mut self) -> Result<Option<Vec<NormalizedRecord>>>;
}
