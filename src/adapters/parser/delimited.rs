//! Delimited-text catalog parser
//!
//! Header-driven parser for the semicolon/comma/tab separated exports most
//! national drug registries publish. The header must contain `code` and
//! `name` columns (case-insensitive); remaining columns become string
//! properties. Quoting is not interpreted - the registry exports this
//! parser targets do not quote fields.

use crate::adapters::parser::contract::CatalogParser;
use crate::domain::errors::FormatError;
use crate::domain::record::NormalizedRecord;
use crate::domain::result::Result;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

/// Parser for delimiter-separated catalog files
#[derive(Debug)]
pub struct DelimitedParser {
    lines: Lines<BufReader<File>>,
    delimiter: char,
    batch_size: usize,
    /// Lowercased column names from the header row
    columns: Vec<String>,
    code_idx: usize,
    name_idx: usize,
    line_no: usize,
}

impl DelimitedParser {
    /// Opens the source file and reads its header row
    ///
    /// # Errors
    ///
    /// Fails with [`FormatError::InvalidHeader`] when the header is absent
    /// or lacks the required `code`/`name` columns.
    pub fn open(path: impl AsRef<Path>, delimiter: char, batch_size: usize) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| FormatError::Unreadable(format!("{}: {e}", path.display())))?;
        let mut lines = BufReader::new(file).lines();

        let header = lines
            .next()
            .transpose()
            .map_err(|e| FormatError::Unreadable(format!("header: {e}")))?
            .ok_or_else(|| FormatError::InvalidHeader("file is empty".to_string()))?;

        let columns: Vec<String> = header
            .split(delimiter)
            .map(|c| c.trim().to_lowercase())
            .collect();

        let code_idx = columns
            .iter()
            .position(|c| c == "code")
            .ok_or_else(|| FormatError::InvalidHeader("no 'code' column".to_string()))?;
        let name_idx = columns
            .iter()
            .position(|c| c == "name")
            .ok_or_else(|| FormatError::InvalidHeader("no 'name' column".to_string()))?;

        Ok(Self {
            lines,
            delimiter,
            batch_size: batch_size.max(1),
            columns,
            code_idx,
            name_idx,
            line_no: 1,
        })
    }

    fn parse_row(&self, row: &str) -> Result<NormalizedRecord> {
        let fields: Vec<&str> = row.split(self.delimiter).map(str::trim).collect();
        if fields.len() != self.columns.len() {
            return Err(FormatError::MalformedRecord {
                line: self.line_no,
                message: format!(
                    "expected {} fields, got {}",
                    self.columns.len(),
                    fields.len()
                ),
            }
            .into());
        }

        let mut properties = Map::new();
        for (idx, value) in fields.iter().enumerate() {
            if idx == self.code_idx || idx == self.name_idx {
                continue;
            }
            if !value.is_empty() {
                properties.insert(
                    self.columns[idx].clone(),
                    Value::String((*value).to_string()),
                );
            }
        }

        Ok(NormalizedRecord::new(
            fields[self.code_idx],
            fields[self.name_idx],
            properties,
            self.line_no,
        )?)
    }
}

impl CatalogParser for DelimitedParser {
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
            batch.push(self.parse_row(&line)?);
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
    fn test_parses_header_and_rows() {
        let file = source("Code;Name;Strength\nA01;Aspirin;500mg\nB02;Ibuprofen;200mg\n");
        let mut parser = DelimitedParser::open(file.path(), ';', 10).unwrap();

        let batch = parser.next_batch().unwrap().unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].code, "A01");
        assert_eq!(batch[0].name, "Aspirin");
        assert_eq!(batch[0].properties["strength"], "500mg");
        assert!(parser.next_batch().unwrap().is_none());
    }

    #[test]
    fn test_missing_code_column_rejected_at_open() {
        let file = source("Id;Name\n1;Aspirin\n");
        let err = DelimitedParser::open(file.path(), ';', 10).unwrap_err();
        assert!(matches!(
            err,
            MedLedgerError::Format(FormatError::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_empty_file_rejected_at_open() {
        let file = source("");
        let err = DelimitedParser::open(file.path(), ';', 10).unwrap_err();
        assert!(matches!(
            err,
            MedLedgerError::Format(FormatError::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_field_count_mismatch_fails() {
        let file = source("code;name\nA01;Aspirin;extra\n");
        let mut parser = DelimitedParser::open(file.path(), ';', 10).unwrap();
        let err = parser.next_batch().unwrap_err();
        assert!(matches!(
            err,
            MedLedgerError::Format(FormatError::MalformedRecord { line: 2, .. })
        ));
    }

    #[test]
    fn test_empty_name_fails() {
        let file = source("code;name\nA01;\n");
        let mut parser = DelimitedParser::open(file.path(), ';', 10).unwrap();
        let err = parser.next_batch().unwrap_err();
        assert!(matches!(
            err,
            MedLedgerError::Format(FormatError::EmptyValue { .. })
        ));
    }

    #[test]
    fn test_empty_optional_fields_omitted() {
        let file = source("code;name;atc\nA01;Aspirin;\n");
        let mut parser = DelimitedParser::open(file.path(), ';', 10).unwrap();
        let batch = parser.next_batch().unwrap().unwrap();
        assert!(batch[0].properties.is_empty());
    }

    #[test]
    fn test_tab_delimiter() {
        let file = source("code\tname\nA01\tAspirin\n");
        let mut parser = DelimitedParser::open(file.path(), '\t', 10).unwrap();
        let batch = parser.next_batch().unwrap().unwrap();
        assert_eq!(batch[0].name, "Aspirin");
    }
}
