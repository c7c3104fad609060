//! Source-format parsers
//!
//! The pluggable parser registry and the built-in catalog formats.

pub mod contract;
pub mod delimited;
pub mod jsonl;
pub mod registry;

pub use contract::CatalogParser;
pub use delimited::DelimitedParser;
pub use jsonl::JsonlParser;
pub use registry::ParserRegistry;
