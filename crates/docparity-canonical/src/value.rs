use indexmap::IndexMap;

use crate::parse::{parse_document, ParseError};

/// Ordered string-keyed mapping used for document objects.
pub type Mapping = IndexMap<String, DocValue>;

/// A parsed document tree.
///
/// The literal text of a number decides its variant: integers and floats
/// stay distinct so that an integer leaf is never re-emitted in float form. Mapping keys keep their insertion order; a key
/// repeated in the source text keeps its first position and its last value.
#[derive(Debug, Clone, PartialEq)]
pub enum DocValue {
    /// JSON `null`.
    Null,
    /// JSON `true` / `false`.
    Bool(bool),
    /// Signed integer literal.
    Int(i64),
    /// Unsigned integer literal that does not fit in `i64`.
    UInt(u64),
    /// Integer literal outside the 64-bit ranges, kept as its source digits.
    BigInt(String),
    /// Number written with a fraction or exponent, or one of the literals
    /// `NaN`, `Infinity` and `-Infinity`.
    Float(f64),
    /// JSON string.
    Text(String),
    /// JSON array.
    Sequence(Vec<DocValue>),
    /// JSON object.
    Mapping(Mapping),
}

impl DocValue {
    /// Parses a document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] with the line and column of malformed input.
    pub fn from_json_str(text: &str) -> Result<Self, ParseError> {
        parse_document(text)
    }

    /// Returns the member named `key` if this value is a mapping.
    pub fn get(&self, key: &str) -> Option<&DocValue> {
        match self {
            DocValue::Mapping(map) => map.get(key),
            _ => None,
        }
    }

    /// Returns the elements if this value is a sequence.
    pub fn as_sequence(&self) -> Option<&[DocValue]> {
        match self {
            DocValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the string if this value is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DocValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as `u64` if it is a non-negative integer.
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            DocValue::Int(n) => u64::try_from(n).ok(),
            DocValue::UInt(n) => Some(n),
            _ => None,
        }
    }

    /// Returns the float if this value is a float leaf.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            DocValue::Float(x) => Some(x),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_and_floats_stay_distinct() {
        let doc = DocValue::from_json_str(r#"{"i": 5, "f": 5.0, "e": 1e2}"#).unwrap();
        assert_eq!(doc.get("i"), Some(&DocValue::Int(5)));
        assert_eq!(doc.get("f"), Some(&DocValue::Float(5.0)));
        assert_eq!(doc.get("e"), Some(&DocValue::Float(100.0)));
    }

    #[test]
    fn key_order_follows_source() {
        let doc = DocValue::from_json_str(r#"{"z": 1, "a": 2, "m": 3}"#).unwrap();
        let DocValue::Mapping(map) = doc else {
            panic!("expected mapping");
        };
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn duplicate_key_keeps_first_slot_and_last_value() {
        let doc = DocValue::from_json_str(r#"{"a": 1, "b": 2, "a": 3}"#).unwrap();
        let DocValue::Mapping(map) = doc else {
            panic!("expected mapping");
        };
        let entries: Vec<(&str, &DocValue)> = map.iter().map(|(k, v)| (k.as_str(), v)).collect();
        assert_eq!(
            entries,
            [("a", &DocValue::Int(3)), ("b", &DocValue::Int(2))]
        );
    }

    #[test]
    fn large_unsigned_integer_is_kept_exact() {
        let doc = DocValue::from_json_str("18446744073709551615").unwrap();
        assert_eq!(doc, DocValue::UInt(u64::MAX));
    }

    #[test]
    fn integer_literals_never_become_floats() {
        let doc = DocValue::from_json_str(
            r#"{"z": -0, "big": 123456789012345678901234567890, "neg": -98765432109876543210}"#,
        )
        .unwrap();
        assert_eq!(doc.get("z"), Some(&DocValue::Int(0)));
        assert_eq!(
            doc.get("big"),
            Some(&DocValue::BigInt("123456789012345678901234567890".to_string()))
        );
        assert_eq!(
            doc.get("neg"),
            Some(&DocValue::BigInt("-98765432109876543210".to_string()))
        );
        assert_eq!(doc.get("big").and_then(DocValue::as_u64), None);
    }

    #[test]
    fn accepts_non_finite_literals() {
        let doc = DocValue::from_json_str(r#"{"x": NaN, "y": -Infinity}"#).unwrap();
        assert!(doc.get("x").and_then(DocValue::as_f64).is_some_and(f64::is_nan));
        assert_eq!(doc.get("y"), Some(&DocValue::Float(f64::NEG_INFINITY)));
    }

    #[test]
    fn rejects_trailing_commas() {
        assert!(DocValue::from_json_str("{\"x\": 1,}").is_err());
    }
}
