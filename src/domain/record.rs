//! Normalized drug record
//!
//! The canonical record shape that every source-format parser produces and
//! the bulk-persistence collaborator consumes.

use crate::domain::errors::FormatError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One normalized catalog entry
///
/// Invariants enforced at construction: `code` and `name` are non-empty,
/// `properties` is a flat JSON-serializable map (no nested objects or
/// arrays).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    /// Source-assigned drug code, unique within a catalog
    pub code: String,

    /// Human-readable drug name
    pub name: String,

    /// Flat map of source-specific attributes (strength, form, ATC, ...)
    pub properties: Map<String, Value>,
}

impl NormalizedRecord {
    /// Builds a record, validating the canonical-shape invariants
    ///
    /// `line` is the 1-based source record number, used only for error
    /// reporting.
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        properties: Map<String, Value>,
        line: usize,
    ) -> Result<Self, FormatError> {
        let code = code.into();
        let name = name.into();

        if code.trim().is_empty() {
            return Err(FormatError::EmptyValue {
                field: "code".to_string(),
                line,
            });
        }
        if name.trim().is_empty() {
            return Err(FormatError::EmptyValue {
                field: "name".to_string(),
                line,
            });
        }
        for (key, value) in &properties {
            if value.is_object() || value.is_array() {
                return Err(FormatError::NestedProperty {
                    key: key.clone(),
                    line,
                });
            }
        }

        Ok(Self {
            code,
            name,
            properties,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_valid_record() {
        let record = NormalizedRecord::new(
            "N02BE01",
            "Paracetamol 500mg",
            props(&[("strength", json!("500mg")), ("atc", json!("N02BE01"))]),
            1,
        )
        .unwrap();
        assert_eq!(record.code, "N02BE01");
        assert_eq!(record.properties.len(), 2);
    }

    #[test]
    fn test_empty_code_rejected() {
        let err = NormalizedRecord::new("", "Paracetamol", Map::new(), 3).unwrap_err();
        assert!(matches!(err, FormatError::EmptyValue { ref field, line: 3 } if field == "code"));
    }

    #[test]
    fn test_empty_name_rejected() {
        let err = NormalizedRecord::new("A01", "  ", Map::new(), 9).unwrap_err();
        assert!(matches!(err, FormatError::EmptyValue { ref field, .. } if field == "name"));
    }

    #[test]
    fn test_nested_properties_rejected() {
        let err = NormalizedRecord::new(
            "A01",
            "Aspirin",
            props(&[("packaging", json!({"size": 20}))]),
            2,
        )
        .unwrap_err();
        assert!(matches!(err, FormatError::NestedProperty { ref key, line: 2 } if key == "packaging"));
    }

    #[test]
    fn test_scalar_properties_allowed() {
        let record = NormalizedRecord::new(
            "A01",
            "Aspirin",
            props(&[
                ("strength_mg", json!(500)),
                ("otc", json!(true)),
                ("note", Value::Null),
            ]),
            1,
        );
        assert!(record.is_ok());
    }
}
