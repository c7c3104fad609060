//! Parser registry
//!
//! Maps a source-type key to a parser constructor. The registry ships with
//! the built-in formats and accepts additional registrations for
//! deployment-specific source layouts (per-country registry exports tend
//! to need their own column mappings).

use crate::adapters::parser::contract::CatalogParser;
use crate::adapters::parser::delimited::DelimitedParser;
use crate::adapters::parser::jsonl::JsonlParser;
use crate::domain::errors::FormatError;
use crate::domain::result::Result;
use std::collections::HashMap;
use std::path::Path;

/// Constructor for one source format: (path, batch_size) -> parser
pub type ParserFactory =
    Box<dyn Fn(&Path, usize) -> Result<Box<dyn CatalogParser>> + Send + Sync>;

/// Registry of source-format parsers keyed by source-type string
pub struct ParserRegistry {
    factories: HashMap<String, ParserFactory>,
}

impl ParserRegistry {
    /// Creates a registry with the built-in formats registered:
    /// `jsonl`, `csv` (comma), `scsv` (semicolon) and `tsv` (tab)
    pub fn with_builtins() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register("jsonl", |path, batch_size| {
            Ok(Box::new(JsonlParser::open(path, batch_size)?))
        });
        registry.register("csv", |path, batch_size| {
            Ok(Box::new(DelimitedParser::open(path, ',', batch_size)?))
        });
        registry.register("scsv", |path, batch_size| {
            Ok(Box::new(DelimitedParser::open(path, ';', batch_size)?))
        });
        registry.register("tsv", |path, batch_size| {
            Ok(Box::new(DelimitedParser::open(path, '\t', batch_size)?))
        });
        registry
    }

    /// Registers (or replaces) a parser factory for a source-type key
    pub fn register<F>(&mut self, key: impl Into<String>, factory: F)
    where
        F: Fn(&Path, usize) -> Result<Box<dyn CatalogParser>> + Send + Sync + 'static,
    {
        self.factories
            .insert(key.into().to_lowercase(), Box::new(factory));
    }

    /// Constructs a parser for the given source-type key and file
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::UnknownSourceType`] when no factory is
    /// registered for the key, or the factory's own format error when the
    /// file fails structural validation at open time.
    pub fn select(
        &self,
        source_type: &str,
        path: impl AsRef<Path>,
        batch_size: usize,
    ) -> Result<Box<dyn CatalogParser>> {
        let factory = self
            .factories
            .get(&source_type.to_lowercase())
            .ok_or_else(|| FormatError::UnknownSourceType(source_type.to_string()))?;
        factory(path.as_ref(), batch_size)
    }

    /// Registered source-type keys, sorted (for error messages and CLI help)
    pub fn known_types(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.factories.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::MedLedgerError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_builtins_registered() {
        let registry = ParserRegistry::with_builtins();
        assert_eq!(registry.known_types(), vec!["csv", "jsonl", "scsv", "tsv"]);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let registry = ParserRegistry::with_builtins();
        let err = registry.select("xlsx", "/tmp/whatever", 10).unwrap_err();
        assert!(matches!(
            err,
            MedLedgerError::Format(FormatError::UnknownSourceType(ref key)) if key == "xlsx"
        ));
    }

    #[test]
    fn test_key_lookup_is_case_insensitive() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{\"code\":\"A\",\"name\":\"Alpha\"}\n").unwrap();
        file.flush().unwrap();

        let registry = ParserRegistry::with_builtins();
        assert!(registry.select("JSONL", file.path(), 10).is_ok());
    }

    #[test]
    fn test_custom_registration_overrides() {
        let mut registry = ParserRegistry::with_builtins();
        registry.register("fi", |path, batch_size| {
            Ok(Box::new(DelimitedParser::open(path, ';', batch_size)?))
        });

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"code;name\nA01;Aspirin\n").unwrap();
        file.flush().unwrap();

        let mut parser = registry.select("fi", file.path(), 10).unwrap();
        let batch = parser.next_batch().unwrap().unwrap();
        assert_eq!(batch[0].code, "A01");
    }
}
