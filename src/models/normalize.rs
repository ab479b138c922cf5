//! Attribute canonicalization.
//!
//! Every record is normalized exactly once, when a snapshot is ingested, so the
//! table schemas can address attributes by a fixed lower-case key set.

use std::collections::HashMap;

use super::value::{Record, Value};

/// Attribute names the server spells in more than one way.
const DEFAULT_SYNONYMS: &[(&str, &str)] = &[("rerunable", "rerunnable")];

/// Canonicalizes record keys and boolean-like leaf strings.
#[derive(Debug, Clone)]
pub struct Normalizer {
    synonyms: HashMap<String, String>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::with_synonyms(DEFAULT_SYNONYMS.iter().copied())
    }
}

impl Normalizer {
    /// Build a normalizer from `(alias, canonical)` pairs. Both sides are
    /// lower-cased.
    pub fn with_synonyms<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            synonyms: pairs
                .into_iter()
                .map(|(alias, canonical)| (alias.to_lowercase(), canonical.to_lowercase()))
                .collect(),
        }
    }

    /// Lower-case a key and resolve it through the synonym table.
    #[must_use]
    pub fn canonical_key(&self, key: &str) -> String {
        let lowered = key.to_lowercase();
        match self.synonyms.get(&lowered) {
            Some(canonical) => canonical.clone(),
            None => lowered,
        }
    }

    /// Canonicalize the top-level keys of `record` and coerce boolean strings
    /// anywhere inside it.
    ///
    /// Nested keys keep their original spelling: `variable_list` holds
    /// environment variable names whose case is significant.
    #[must_use]
    pub fn normalize(&self, record: Record) -> Record {
        record
            .into_iter()
            .map(|(key, value)| (self.canonical_key(&key), coerce_booleans(value)))
            .collect()
    }
}

/// Replace the literal strings `"True"` / `"False"` with booleans, recursing
/// through mappings and sequences.
#[must_use]
pub fn coerce_booleans(value: Value) -> Value {
    match value {
        Value::String(s) if s == "True" => Value::Bool(true),
        Value::String(s) if s == "False" => Value::Bool(false),
        Value::Sequence(items) => Value::Sequence(items.into_iter().map(coerce_booleans).collect()),
        Value::Mapping(map) => Value::Mapping(
            map.into_iter()
                .map(|(k, v)| (k, coerce_booleans(v)))
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, Value)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_keys_are_lowercased() {
        let raw = record(&[
            ("Job_Name", Value::from("sim")),
            ("JOB_OWNER", Value::from("alice@login")),
        ]);
        let normalized = Normalizer::default().normalize(raw);

        assert_eq!(normalized["job_name"], Value::from("sim"));
        assert_eq!(normalized["job_owner"], Value::from("alice@login"));
        assert!(!normalized.contains_key("Job_Name"));
    }

    #[test]
    fn test_synonym_renamed() {
        let raw = record(&[("Rerunable", Value::from("True"))]);
        let normalized = Normalizer::default().normalize(raw);

        assert_eq!(normalized["rerunnable"], Value::Bool(true));
        assert!(!normalized.contains_key("rerunable"));
    }

    #[test]
    fn test_boolean_coercion_is_recursive() {
        let inner = record(&[
            ("flag", Value::from("False")),
            ("name", Value::from("true")),
        ]);
        let raw = record(&[
            ("nested", Value::Mapping(inner)),
            (
                "list",
                Value::Sequence(vec![Value::from("True"), Value::from("x")]),
            ),
        ]);
        let normalized = Normalizer::default().normalize(raw);

        let nested = normalized["nested"].as_mapping().unwrap();
        assert_eq!(nested["flag"], Value::Bool(false));
        // only the exact literals are coerced
        assert_eq!(nested["name"], Value::from("true"));
        assert_eq!(
            normalized["list"],
            Value::Sequence(vec![Value::Bool(true), Value::from("x")])
        );
    }

    #[test]
    fn test_nested_keys_keep_case() {
        let env = record(&[("PBS_O_HOME", Value::from("/home/alice"))]);
        let raw = record(&[("Variable_List", Value::Mapping(env))]);
        let normalized = Normalizer::default().normalize(raw);

        let env = normalized["variable_list"].as_mapping().unwrap();
        assert!(env.contains_key("PBS_O_HOME"));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let raw = record(&[
            ("Job_State", Value::from("R")),
            ("rerunable", Value::from("False")),
            (
                "Resources_Used",
                Value::Mapping(record(&[("walltime", Value::from("00:10:00"))])),
            ),
        ]);
        let normalizer = Normalizer::default();
        let once = normalizer.normalize(raw);
        let twice = normalizer.normalize(once.clone());

        assert_eq!(once, twice);
    }

    #[test]
    fn test_custom_synonyms() {
        let normalizer = Normalizer::with_synonyms([("Owner", "job_owner")]);
        assert_eq!(normalizer.canonical_key("OWNER"), "job_owner");
        assert_eq!(normalizer.canonical_key("Queue"), "queue");
    }
}
