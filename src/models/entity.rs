//! Jobs, queues and point-in-time snapshots of them.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::normalize::Normalizer;
use super::value::{Record, Value, lookup};

/// The kinds of entity the status service can be queried for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Job,
    Queue,
}

impl EntityKind {
    /// Path segment used in `GET /query/{kind}`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            EntityKind::Job => "job",
            EntityKind::Queue => "queue",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One job or queue: top-level metadata plus the `attributes` sub-map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entity {
    pub metadata: Record,
    pub attributes: Record,
}

impl Entity {
    /// Split and normalize a raw record as received from the server.
    #[must_use]
    pub fn from_raw(raw: Record, normalizer: &Normalizer) -> Self {
        let mut metadata = normalizer.normalize(raw);
        let attributes = match metadata.remove("attributes") {
            Some(Value::Mapping(attrs)) => normalizer.normalize(attrs),
            Some(other) => {
                tracing::debug!(value = %other, "ignoring non-mapping attributes field");
                Record::new()
            }
            None => Record::new(),
        };

        Self {
            metadata,
            attributes,
        }
    }

    /// Look up a status attribute (case-insensitive).
    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&Value> {
        lookup(&self.attributes, key)
    }

    /// Look up `key` inside the mapping-valued attribute `group`.
    #[must_use]
    pub fn group_attr(&self, group: &str, key: &str) -> Option<&Value> {
        self.attr(group)
            .and_then(Value::as_mapping)
            .and_then(|m| lookup(m, key))
    }

    /// Human description from the metadata, if the server sent one.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        lookup(&self.metadata, "description").and_then(Value::as_str)
    }
}

/// Immutable query result for one entity kind, keyed by entity ID.
///
/// Cloning is cheap; a refresh replaces the whole snapshot so readers never
/// observe a partial update.
#[derive(Debug, Clone)]
pub struct Snapshot {
    kind: EntityKind,
    entities: Arc<BTreeMap<String, Entity>>,
}

impl Snapshot {
    #[must_use]
    pub fn empty(kind: EntityKind) -> Self {
        Self {
            kind,
            entities: Arc::new(BTreeMap::new()),
        }
    }

    /// Build a snapshot from raw server records, normalizing each one.
    #[must_use]
    pub fn from_raw(
        kind: EntityKind,
        raw: BTreeMap<String, Record>,
        normalizer: &Normalizer,
    ) -> Self {
        let entities = raw
            .into_iter()
            .map(|(id, record)| (id, Entity::from_raw(record, normalizer)))
            .collect();

        Self {
            kind,
            entities: Arc::new(entities),
        }
    }

    #[must_use]
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Entity> {
        self.entities.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterate `(id, entity)` pairs. Order is not the display order; the
    /// table layer sorts.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Entity)> {
        self.entities.iter()
    }

    /// True if both handles point at the same underlying data.
    #[must_use]
    pub fn ptr_eq(&self, other: &Snapshot) -> bool {
        Arc::ptr_eq(&self.entities, &other.entities)
    }
}
