//! External integrations
//!
//! Repository collaborators and source-format parsers. The HTTP surface,
//! blob storage and real database backends live outside this crate; the
//! traits here are their seams.

pub mod parser;
pub mod repository;
