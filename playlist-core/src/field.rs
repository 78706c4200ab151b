//! Tolerant per-record field extraction
//!
//! Library exports routinely omit optional metadata, so a missing key, or a
//! key holding something other than a text-like leaf, yields an empty string
//! instead of an error.

use tracing::trace;

use crate::plist::{Dict, Value};

/// Encodings a field value can be read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafKind {
    String,
    Integer,
    Date,
}

/// Sniff the encoding of a value and return its text
///
/// `None` for containers, reals, data blobs and booleans.
pub fn read_leaf(value: &Value) -> Option<(LeafKind, &str)> {
    match value {
        Value::String(s) => Some((LeafKind::String, s.as_str())),
        Value::Integer(s) => Some((LeafKind::Integer, s.as_str())),
        Value::Date(s) => Some((LeafKind::Date, s.as_str())),
        _ => None,
    }
}

/// Value of `field` in `record`, or `""` when absent or unreadable
///
/// Only the first occurrence of the key is read.
pub fn extract_field(record: &Dict, field: &str) -> String {
    let Some(value) = record.get(field) else {
        return String::new();
    };
    match read_leaf(value) {
        Some((kind, text)) => {
            trace!("{:?} read from {:?} leaf", field, kind);
            text.to_owned()
        }
        None => {
            trace!("{:?} holds a {}, read as empty", field, value.kind_name());
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> Dict {
        [
            ("Track ID", Value::Integer("101".into())),
            ("Name", Value::String("Shiny Stockings".into())),
            ("Release Date", Value::Date("1956-01-01T12:00:00Z".into())),
            ("Name", Value::String("shadowed".into())),
            ("Play Count", Value::Real("1.5".into())),
            ("Compilation", Value::Bool(true)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_extract_each_kind() {
        let r = record();
        assert_eq!(extract_field(&r, "Track ID"), "101");
        assert_eq!(extract_field(&r, "Name"), "Shiny Stockings");
        assert_eq!(extract_field(&r, "Release Date"), "1956-01-01T12:00:00Z");
    }

    #[test]
    fn test_missing_field_is_empty() {
        assert_eq!(extract_field(&record(), "Comments"), "");
    }

    #[test]
    fn test_unreadable_encoding_is_empty() {
        let r = record();
        assert_eq!(extract_field(&r, "Play Count"), "");
        assert_eq!(extract_field(&r, "Compilation"), "");
    }

    #[test]
    fn test_read_leaf_kinds() {
        assert_eq!(
            read_leaf(&Value::Integer("1".into())),
            Some((LeafKind::Integer, "1"))
        );
        assert_eq!(
            read_leaf(&Value::Date("x".into())),
            Some((LeafKind::Date, "x"))
        );
        assert_eq!(read_leaf(&Value::Array(Vec::new())), None);
    }
}
