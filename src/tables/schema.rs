//! Declarative column definitions and the generic row extractor.

use chrono::{Local, SecondsFormat, TimeZone};

use crate::error::Result;
use crate::models::{Entity, Snapshot, Value, decode_state_count, job_state_label};
use crate::utils::natural_sort_key;

use super::Row;

/// Text shown in place of an attribute the server did not send.
///
/// Each table picks one; they carry different meanings and are never
/// interchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// Field not returned by the server (job tables).
    Missing,
    /// Setting not configured (queue tables).
    Unset,
    /// No resource data for the job.
    None,
    /// Job has not started executing.
    NotRunning,
}

impl Placeholder {
    pub const ALL: [Placeholder; 4] = [
        Placeholder::Missing,
        Placeholder::Unset,
        Placeholder::None,
        Placeholder::NotRunning,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Placeholder::Missing => "(missing)",
            Placeholder::Unset => "(unset)",
            Placeholder::None => "(none)",
            Placeholder::NotRunning => "(not running)",
        }
    }
}

/// Whether a rendered cell is one of the placeholder texts.
#[must_use]
pub fn is_placeholder(cell: &str) -> bool {
    Placeholder::ALL.iter().any(|p| p.as_str() == cell)
}

/// Where a column reads its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// A top-level status attribute.
    Attribute(&'static str),
    /// A key inside a mapping-valued attribute, e.g. `resources_used.walltime`.
    Nested {
        group: &'static str,
        key: &'static str,
    },
    /// One state's count decoded from the `state_count` attribute.
    StateCount(&'static str),
}

/// How a raw value is turned into display text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Translate {
    Identity,
    /// Single-letter job state code to its label.
    JobState,
    /// Epoch seconds to local RFC 3339 time.
    Timestamp,
}

impl Translate {
    fn apply(self, value: &Value) -> String {
        match self {
            Translate::Identity => value.to_string(),
            Translate::JobState => job_state_label(&value.to_string()).to_string(),
            Translate::Timestamp => format_timestamp(value),
        }
    }
}

/// Render epoch seconds in the local timezone; anything else passes through.
#[must_use]
pub fn format_timestamp(value: &Value) -> String {
    value
        .as_integer()
        .and_then(|secs| Local.timestamp_opt(secs, 0).single())
        .map(|time| time.to_rfc3339_opts(SecondsFormat::Secs, false))
        .unwrap_or_else(|| value.to_string())
}

/// One column of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub label: &'static str,
    pub source: Source,
    pub translate: Translate,
    pub placeholder: Placeholder,
}

impl Column {
    /// Column reading attribute `key`, labelled with the key itself.
    #[must_use]
    pub const fn attr(key: &'static str, placeholder: Placeholder) -> Self {
        Self {
            label: key,
            source: Source::Attribute(key),
            translate: Translate::Identity,
            placeholder,
        }
    }

    #[must_use]
    pub const fn nested(
        label: &'static str,
        group: &'static str,
        key: &'static str,
        placeholder: Placeholder,
    ) -> Self {
        Self {
            label,
            source: Source::Nested { group, key },
            translate: Translate::Identity,
            placeholder,
        }
    }

    #[must_use]
    pub const fn state_count(label: &'static str, state: &'static str) -> Self {
        Self {
            label,
            source: Source::StateCount(state),
            translate: Translate::Identity,
            placeholder: Placeholder::Unset,
        }
    }

    #[must_use]
    pub const fn labelled(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    #[must_use]
    pub const fn translated(mut self, translate: Translate) -> Self {
        self.translate = translate;
        self
    }

    /// Resolve this column for one entity.
    ///
    /// Absent and null values yield the placeholder. Only a malformed
    /// `state_count` string is an error.
    pub fn resolve(&self, entity: &Entity) -> Result<String> {
        let value = match self.source {
            Source::Attribute(key) => entity.attr(key),
            Source::Nested { group, key } => entity.group_attr(group, key),
            Source::StateCount(state) => {
                let Some(raw) = entity.attr("state_count") else {
                    return Ok(self.placeholder.as_str().to_string());
                };
                let counts = decode_state_count(&raw.to_string())?;
                return Ok(match counts.get(state) {
                    Some(count) => count.to_string(),
                    None => self.placeholder.as_str().to_string(),
                });
            }
        };

        Ok(match value {
            None | Some(Value::Null) => self.placeholder.as_str().to_string(),
            Some(value) => self.translate.apply(value),
        })
    }

    /// The untranslated value behind a translated cell, e.g. `R` for `running`.
    ///
    /// `None` for identity columns (the cell already is the raw value) and
    /// for absent attributes.
    #[must_use]
    pub fn raw(&self, entity: &Entity) -> Option<String> {
        if self.translate == Translate::Identity {
            return None;
        }
        let value = match self.source {
            Source::Attribute(key) => entity.attr(key),
            Source::Nested { group, key } => entity.group_attr(group, key),
            Source::StateCount(_) => None,
        };
        value
            .filter(|v| !matches!(v, Value::Null))
            .map(ToString::to_string)
    }
}

/// An ordered set of columns projected from one entity kind.
#[derive(Debug, Clone, Copy)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [Column],
    /// List views prepend the entity ID as the first column.
    pub with_id: bool,
}

impl TableSchema {
    /// Column headers, including `id` for list views.
    #[must_use]
    pub fn headers(&self) -> Vec<String> {
        let ids = self.with_id.then_some("id");
        ids.into_iter()
            .chain(self.columns.iter().map(|c| c.label))
            .map(str::to_string)
            .collect()
    }

    /// Column values for one entity, without the ID.
    pub fn values(&self, entity: &Entity) -> Result<Vec<String>> {
        self.columns.iter().map(|c| c.resolve(entity)).collect()
    }

    /// Full display row for one entity, ID first when this is a list view.
    pub fn row(&self, id: &str, entity: &Entity) -> Result<Row> {
        let mut row = Vec::with_capacity(self.columns.len() + 1);
        if self.with_id {
            row.push(id.to_string());
        }
        row.extend(self.values(entity)?);
        Ok(row)
    }

    /// Raw values of the translated columns, for matching what the server sent.
    #[must_use]
    pub fn raw_values(&self, entity: &Entity) -> Vec<String> {
        self.columns.iter().filter_map(|c| c.raw(entity)).collect()
    }

    /// One row per entity, naturally sorted by ID.
    pub fn list_rows(&self, snapshot: &Snapshot) -> Result<Vec<Row>> {
        let mut rows = snapshot
            .iter()
            .map(|(id, entity)| Ok((id.as_str(), self.row(id, entity)?)))
            .collect::<Result<Vec<_>>>()?;
        rows.sort_by_cached_key(|(id, _)| natural_sort_key(id));
        Ok(rows.into_iter().map(|(_, row)| row).collect())
    }

    /// Vertical `(label, value)` rows for a detail view.
    pub fn field_rows(&self, entity: &Entity) -> Result<Vec<Row>> {
        self.columns
            .iter()
            .map(|c| Ok(vec![c.label.to_string(), c.resolve(entity)?]))
            .collect()
    }
}

/// Key/value rows for a mapping attribute, naturally sorted by key.
#[must_use]
pub fn mapping_rows(entity: &Entity, key: &str) -> Vec<Row> {
    let mut rows: Vec<Row> = match entity.attr(key) {
        Some(Value::Mapping(map)) => map
            .iter()
            .map(|(k, v)| vec![k.clone(), v.to_string()])
            .collect(),
        Some(Value::String(list)) => split_pairs(list),
        _ => Vec::new(),
    };
    rows.sort_by_cached_key(|row| natural_sort_key(&row[0]));
    rows
}

/// Split `NAME=value,NAME=value` as PBS prints `Variable_List`.
fn split_pairs(list: &str) -> Vec<Row> {
    list.split(',')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((name, value)) => vec![name.to_string(), value.to_string()],
            None => vec![pair.to_string(), String::new()],
        })
        .collect()
}
