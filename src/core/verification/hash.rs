//! Content hashing for ledger payloads and source files
//!
//! Two independent digests live here: the canonical payload hash that is
//! embedded in every ledger entry, and the raw-byte checksum of an
//! uploaded source file. They must never be conflated - the payload hash
//! is what verification compares, the file checksum is just a field inside
//! the payload.

use sha2::{Digest, Sha256};
use serde_json::Value;

/// Computes the canonical SHA-256 hash of a JSON payload
///
/// The payload is normalized (object keys sorted recursively) and
/// serialized compactly before hashing, so two structurally-equal values
/// always hash identically regardless of construction order. This is a
/// pure function: it is called both when writing a ledger entry and,
/// independently, when verifying one.
///
/// # Examples
///
/// ```
/// use medledger::core::verification::hash::canonical_hash;
/// use serde_json::json;
///
/// let a = canonical_hash(&json!({"a": 1, "b": 2}));
/// let b = canonical_hash(&json!({"b": 2, "a": 1}));
/// assert_eq!(a, b);
/// assert_eq!(a.len(), 64);
/// ```
pub fn canonical_hash(payload: &Value) -> String {
    let normalized = normalize_json(payload);
    // Normalized values always serialize; Value has no non-serializable states
    let encoded = serde_json::to_string(&normalized).unwrap_or_default();

    let mut hasher = Sha256::new();
    hasher.update(encoded.as_bytes());
    let digest = hasher.finalize();
    format!("{digest:x}")
}

/// Recursively sorts object keys so semantically identical JSON
/// produces the same serialization
fn normalize_json(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: std::collections::BTreeMap<String, Value> = map
                .iter()
                .map(|(k, v)| (k.clone(), normalize_json(v)))
                .collect();
            Value::Object(sorted.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.iter().map(normalize_json).collect()),
        _ => value.clone(),
    }
}

/// Computes the SHA-256 checksum of raw bytes
///
/// Used for the `source_checksum` of an uploaded catalog file.
pub fn bytes_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let digest = hasher.finalize();
    format!("{digest:x}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_hash_deterministic() {
        let data = json!({
            "status": "created",
            "filename": "eu.xlsx",
            "source_checksum": "ab12"
        });

        assert_eq!(canonical_hash(&data), canonical_hash(&data));
        assert_eq!(canonical_hash(&data).len(), 64);
    }

    #[test]
    fn test_canonical_hash_key_order_independence() {
        let a = json!({"a": 1, "b": 2, "c": 3});
        let b = json!({"c": 3, "a": 1, "b": 2});
        assert_eq!(canonical_hash(&a), canonical_hash(&b));
    }

    #[test]
    fn test_canonical_hash_nested_key_order_independence() {
        let a = json!({"outer": {"z": 1, "a": 2}, "list": [{"b": 1, "a": 2}]});
        let b = json!({"list": [{"a": 2, "b": 1}], "outer": {"a": 2, "z": 1}});
        assert_eq!(canonical_hash(&a), canonical_hash(&b));
    }

    #[test]
    fn test_canonical_hash_differs_on_any_field() {
        let base = json!({"status": "completed", "filename": "eu.xlsx"});
        let changed = json!({"status": "completed", "filename": "tampered.xlsx"});
        assert_ne!(canonical_hash(&base), canonical_hash(&changed));
    }

    #[test]
    fn test_array_order_is_significant() {
        // Arrays carry meaning; only object keys get normalized
        let a = json!({"batch": [1, 2, 3]});
        let b = json!({"batch": [3, 2, 1]});
        assert_ne!(canonical_hash(&a), canonical_hash(&b));
    }

    #[test]
    fn test_bytes_checksum() {
        let checksum = bytes_checksum(b"Hello, World!");
        assert_eq!(checksum.len(), 64);
        assert!(checksum.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(checksum, bytes_checksum(b"Hello, World!"));
        assert_ne!(checksum, bytes_checksum(b"hello, world!"));
    }

    #[test]
    fn test_known_sha256_value() {
        // sha256("") is a published constant
        assert_eq!(
            bytes_checksum(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
