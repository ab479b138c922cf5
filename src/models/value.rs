//! Dynamically shaped attribute values.
//!
//! The status service returns arbitrary JSON per job/queue. Rather than
//! carrying `serde_json::Value` through the pipeline, records are decoded into
//! this closed sum type and walked structurally.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::utils::find_key_ci;

/// Attribute name to value mapping.
pub type Record = BTreeMap<String, Value>;

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Sequence(Vec<Value>),
    Mapping(Record),
}

impl Value {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_mapping(&self) -> Option<&Record> {
        match self {
            Value::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Integer view of the value, accepting digit strings as the server
    /// sends timestamps either way.
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::Sequence(_) | Value::Mapping(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => write!(f, "{}", s),
            Value::Sequence(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
            Value::Mapping(map) => {
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}={}", k, v)?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Record> for Value {
    fn from(m: Record) -> Self {
        Value::Mapping(m)
    }
}

/// Case-insensitive attribute lookup.
///
/// Exact hits are the common case after normalization; the scan only runs for
/// nested maps whose keys were left as the server sent them.
#[must_use]
pub fn lookup<'a>(record: &'a Record, key: &str) -> Option<&'a Value> {
    record
        .get(key)
        .or_else(|| find_key_ci(record.keys(), key).and_then(|k| record.get(k)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_json_shapes() {
        let json = r#"{"a": null, "b": true, "c": 3, "d": 1.5, "e": "x", "f": [1, "y"], "g": {"h": 2}}"#;
        let record: Record = serde_json::from_str(json).unwrap();

        assert_eq!(record["a"], Value::Null);
        assert_eq!(record["b"], Value::Bool(true));
        assert_eq!(record["c"], Value::Integer(3));
        assert_eq!(record["d"], Value::Float(1.5));
        assert_eq!(record["e"], Value::from("x"));
        assert_eq!(
            record["f"],
            Value::Sequence(vec![Value::Integer(1), Value::from("y")])
        );
        assert_eq!(record["g"].as_mapping().unwrap()["h"], Value::Integer(2));
    }

    #[test]
    fn test_is_scalar() {
        assert!(Value::from("R").is_scalar());
        assert!(Value::Null.is_scalar());
        assert!(!Value::Sequence(vec![]).is_scalar());
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Bool(true).to_string(), "True");
        assert_eq!(Value::Integer(42).to_string(), "42");
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(
            Value::Sequence(vec![Value::from("a"), Value::from("b")]).to_string(),
            "a, b"
        );

        let mut map = Record::new();
        map.insert("ncpus".to_string(), Value::Integer(4));
        map.insert("mem".to_string(), Value::from("8gb"));
        assert_eq!(Value::Mapping(map).to_string(), "mem=8gb, ncpus=4");
    }

    #[test]
    fn test_as_integer_accepts_digit_strings() {
        assert_eq!(Value::from("1700000000").as_integer(), Some(1_700_000_000));
        assert_eq!(Value::Integer(5).as_integer(), Some(5));
        assert_eq!(Value::from("soon").as_integer(), None);
    }

    #[test]
    fn test_lookup_case_insensitive() {
        let mut record = Record::new();
        record.insert("Walltime".to_string(), Value::from("01:00:00"));

        assert_eq!(lookup(&record, "walltime"), Some(&Value::from("01:00:00")));
        assert_eq!(lookup(&record, "WALLTIME"), Some(&Value::from("01:00:00")));
        assert_eq!(lookup(&record, "mem"), None);
    }
}
