//! JSON-lines catalog parser
//!
//! One JSON object per line; `code` and `name` are required, every other
//! key lands in the record's properties map.

use crate::adapters::parser::contract::CatalogParser;
use crate::domain::errors::FormatError;
use crate::domain::record::NormalizedRecord;
use crate::domain::result::Result;
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

/// Parser for newline-delimited JSON catalogs
#[derive(Debug)]
pub struct JsonlParser {
    lines: Lines<BufReader<File>>,
    batch_size: usize,
    line_no: usize,
}

impl JsonlParser {
    /// Opens the source file for lazy line-by-line reading
    pub fn open(path: impl AsRef<Path>, batch_size: usize) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            FormatError::Unreadable(format!("{}: {e}", path.display()))
        })?;
        Ok(Self {
            lines: BufReader::new(file).lines(),
            batch_size: batch_size.max(1),
            line_no: 0,
        })
    }

    fn parse_line(&self, line: &str) -> Result<NormalizedRecord> {
        let value: Value = serde_json::from_str(line).map_err(|e| {
            FormatError::MalformedRecord {
                line: self.line_no,
                message: e.to_string(),
            }
        })?;

        let Value::Object(mut fields) = value else {
            return Err(FormatError::MalformedRecord {
                line: self.line_no,
                message: "expected a JSON object".to_string(),
            }
            .into());
        };

        let code = take_string(&mut fields, "code", self.line_no)?;
        let name = take_string(&mut fields, "name", self.line_no)?;

        Ok(NormalizedRecord::new(code, name, fields, self.line_no)?)
    }
}

fn take_string(
    fields: &mut serde_json::Map<String, Value>,
    key: &str,
    line: usize,
) -> Result<String> {
    match fields.remove(key) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(FormatError::MalformedRecord {
            line,
            message: format!("field '{key}' must be a string, got {other}"),
        }
        .into()),
        None => Err(FormatError::MissingField {
            field: key.to_string(),
            line,
        }
        .into()),
    }
}

impl CatalogParser for JsonlParser {
    fn next_batch(&mut self) -> Result<Option<Vec<NormalizedRecord>>> {
        let mut batch = Vec::with_capacity(self.batch_size);

        while batch.len() < self.batch_size {
            let Some(line) = self.lines.next() else { break };
            self.line_no += 1;
            let line =
                line.map_err(|e| FormatError::Unreadable(format!("line {}: {e}", self.line_no)))?;
            if line.trim().is_empty() {
                continue;
            }
            batch.push(self.parse_line(&line)?);
        }

        if batch.is_empty() {
            Ok(None)
        } else {
            Ok(Some(batch))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::MedLedgerError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn source(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_batches_respect_size() {
        let file = source(
            "{\"code\":\"A\",\"name\":\"Alpha\"}\n\
             {\"code\":\"B\",\"name\":\"Beta\"}\n\
             {\"code\":\"C\",\"name\":\"Gamma\"}\n",
        );
        let mut parser = JsonlParser::open(file.path(), 2).unwrap();

        let first = parser.next_batch().unwrap().unwrap();
        assert_eq!(first.len(), 2);
        let second = parser.next_batch().unwrap().unwrap();
        assert_eq!(second.len(), 1);
        assert!(parser.next_batch().unwrap().is_none());
    }

    #[test]
    fn test_extra_fields_become_properties() {
        let file = source("{\"code\":\"A01\",\"name\":\"Aspirin\",\"strength\":\"500mg\"}\n");
        let mut parser = JsonlParser::open(file.path(), 10).unwrap();

        let batch = parser.next_batch().unwrap().unwrap();
        assert_eq!(batch[0].properties["strength"], "500mg");
    }

    #[test]
    fn test_missing_code_fails_fast() {
        let file = source("{\"name\":\"Aspirin\"}\n");
        let mut parser = JsonlParser::open(file.path(), 10).unwrap();

        let err = parser.next_batch().unwrap_err();
        assert!(matches!(
            err,
            MedLedgerError::Format(FormatError::MissingField { ref field, line: 1 }) if field == "code"
        ));
    }

    #[test]
    fn test_malformed_json_fails_fast() {
        let file = source("{\"code\":\"A\",\"name\":\"Alpha\"}\nnot json\n");
        let mut parser = JsonlParser::open(file.path(), 1).unwrap();

        assert!(parser.next_batch().is_ok());
        let err = parser.next_batch().unwrap_err();
        assert!(matches!(
            err,
            MedLedgerError::Format(FormatError::MalformedRecord { line: 2, .. })
        ));
    }

    #[test]
    fn test_blank_lines_skipped() {
        let file = source("\n{\"code\":\"A\",\"name\":\"Alpha\"}\n\n");
        let mut parser = JsonlParser::open(file.path(), 10).unwrap();
        let batch = parser.next_batch().unwrap().unwrap();
        assert_eq!(batch.len(), 1);
        assert!(parser.next_batch().unwrap().is_none());
    }

    #[test]
    fn test_missing_file_is_unreadable() {
        let err = JsonlParser::open("/no/such/file.jsonl", 10).unwrap_err();
        assert!(matches!(
            err,
            MedLedgerError::Format(FormatError::Unreadable(_))
        ));
    }
}
