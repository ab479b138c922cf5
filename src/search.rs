//! Search predicates over rows and entities.
//!
//! Patterns are regular expressions anchored at the start of each candidate
//! string (a prefix match, not a full match).

use regex::Regex;

use crate::error::Result;
use crate::models::{Entity, Value};

/// A compiled, prefix-anchored search pattern.
#[derive(Debug, Clone)]
pub struct SearchPattern {
    source: String,
    regex: Regex,
}

impl SearchPattern {
    /// Compile `pattern`. An invalid expression yields [`crate::Error::Pattern`].
    pub fn compile(pattern: &str) -> Result<Self> {
        let regex = Regex::new(&format!("^(?:{})", pattern))?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// The pattern as typed by the user.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn is_match(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }

    /// Shallow match: any cell of an extracted row (the ID is the first cell
    /// of list rows). List views also pass the raw values of translated
    /// columns through here.
    #[must_use]
    pub fn matches_row(&self, row: &[String]) -> bool {
        row.iter().any(|cell| self.is_match(cell))
    }

    /// Deep match: the ID, or any scalar reachable inside the entity.
    #[must_use]
    pub fn matches_entity(&self, id: &str, entity: &Entity) -> bool {
        self.is_match(id)
            || entity
                .metadata
                .values()
                .chain(entity.attributes.values())
                .any(|value| self.matches_value(value))
    }

    fn matches_value(&self, value: &Value) -> bool {
        match value {
            Value::Null => false,
            scalar if scalar.is_scalar() => self.is_match(&scalar.to_string()),
            Value::Sequence(items) => items.iter().any(|v| self.matches_value(v)),
            Value::Mapping(map) => map.values().any(|v| self.matches_value(v)),
            _ => false,
        }
    }
}

/// How far a search looks into each entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// ID and the displayed columns.
    #[default]
    Shallow,
    /// ID and every nested attribute value.
    Deep,
}

impl SearchMode {
    #[must_use]
    pub fn toggle(self) -> Self {
        match self {
            SearchMode::Shallow => SearchMode::Deep,
            SearchMode::Deep => SearchMode::Shallow,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            SearchMode::Shallow => "shallow",
            SearchMode::Deep => "deep",
        }
    }
}

/// Live search input that keeps the last pattern that compiled.
///
/// While the user is typing, intermediate input is often not a valid
/// expression (`"(ab"`). The active pattern only changes once the input
/// compiles again, so the displayed rows stay put.
#[derive(Debug, Clone, Default)]
pub struct Search {
    input: String,
    active: Option<SearchPattern>,
    error: Option<String>,
    pub mode: SearchMode,
}

impl Search {
    #[must_use]
    pub fn new(mode: SearchMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Replace the input text. On a compile error the previous pattern stays
    /// active and the error is both recorded and returned.
    pub fn set_input(&mut self, input: &str) -> Result<()> {
        self.input = input.to_string();
        if input.is_empty() {
            self.active = None;
            self.error = None;
            return Ok(());
        }

        match SearchPattern::compile(input) {
            Ok(pattern) => {
                self.active = Some(pattern);
                self.error = None;
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn push(&mut self, c: char) -> Result<()> {
        let mut input = self.input.clone();
        input.push(c);
        self.set_input(&input)
    }

    pub fn pop(&mut self) -> Result<()> {
        let mut input = self.input.clone();
        input.pop();
        self.set_input(&input)
    }

    pub fn clear(&mut self) {
        self.input.clear();
        self.active = None;
        self.error = None;
    }

    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// The pattern rows are currently filtered by.
    #[must_use]
    pub fn pattern(&self) -> Option<&SearchPattern> {
        self.active.as_ref()
    }

    /// The compile error for the current input, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
