//! Projection of snapshots into display rows.
//!
//! Every table is a declarative [`TableSchema`] (or a [`ResourceLayout`] for
//! the resource comparison tables). The TUI and the plain CLI output both
//! render from the values produced here.

mod job;
mod queue;
mod resources;
mod schema;

pub use job::{ENVIRONMENT_KEY, JOB_DETAILS, JOB_EXECUTION, JOB_LIST, JOB_PROPERTIES, JOB_TIMESTAMPS};
pub use queue::{QUEUE_LIST, QUEUE_SETTINGS, state_count_rows};
pub use resources::{JOB_RESOURCES, QUEUE_RESOURCES, RESOURCES, ResourceLayout, ResourceTable};
pub use schema::{
    Column, Placeholder, Source, TableSchema, Translate, format_timestamp, is_placeholder,
    mapping_rows,
};

use crate::error::Result;
use crate::models::{Entity, EntityKind, Snapshot};
use crate::search::{SearchMode, SearchPattern};
use crate::utils::natural_sort_key;

/// One display row: an ordered, fixed-arity list of cell strings.
pub type Row = Vec<String>;

/// The list schema shown for an entity kind.
#[must_use]
pub const fn list_schema(kind: EntityKind) -> &'static TableSchema {
    match kind {
        EntityKind::Job => &JOB_LIST,
        EntityKind::Queue => &QUEUE_LIST,
    }
}

/// Rows of a list view, optionally filtered, naturally sorted by ID.
pub fn list_view(
    snapshot: &Snapshot,
    pattern: Option<&SearchPattern>,
    mode: SearchMode,
) -> Result<Vec<Row>> {
    let schema = list_schema(snapshot.kind());
    let Some(pattern) = pattern else {
        return schema.list_rows(snapshot);
    };

    let mut rows = Vec::new();
    for (id, entity) in snapshot.iter() {
        let row = schema.row(id, entity)?;
        let keep = match mode {
            SearchMode::Shallow => {
                pattern.matches_row(&row) || pattern.matches_row(&schema.raw_values(entity))
            }
            SearchMode::Deep => pattern.matches_entity(id, entity),
        };
        if keep {
            rows.push(row);
        }
    }
    rows.sort_by_cached_key(|row| natural_sort_key(&row[0]));
    Ok(rows)
}

/// One titled block of a detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailSection {
    pub title: &'static str,
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
    /// False when the section has no data and should render a notice
    /// instead of rows.
    pub available: bool,
}

impl DetailSection {
    fn fields(schema: &TableSchema, entity: &Entity) -> Result<Self> {
        Ok(Self {
            title: schema.name,
            headers: vec!["attribute".to_string(), "value".to_string()],
            rows: schema.field_rows(entity)?,
            available: true,
        })
    }

    fn resources(layout: &ResourceLayout, entity: &Entity) -> Self {
        let table = layout.project(entity);
        Self {
            title: layout.name,
            headers: table.headers,
            rows: table.rows,
            available: table.available,
        }
    }
}

/// All detail sections for one job or queue.
pub fn detail_sections(kind: EntityKind, entity: &Entity) -> Result<Vec<DetailSection>> {
    match kind {
        EntityKind::Job => Ok(vec![
            DetailSection::fields(&JOB_DETAILS, entity)?,
            DetailSection::fields(&JOB_PROPERTIES, entity)?,
            DetailSection::fields(&JOB_EXECUTION, entity)?,
            DetailSection::fields(&JOB_TIMESTAMPS, entity)?,
            DetailSection::resources(&JOB_RESOURCES, entity),
        ]),
        EntityKind::Queue => {
            let counts = state_count_rows(entity)?;
            Ok(vec![
                DetailSection::fields(&QUEUE_SETTINGS, entity)?,
                DetailSection {
                    title: "state counts",
                    headers: vec!["state".to_string(), "count".to_string()],
                    available: !counts.is_empty(),
                    rows: counts,
                },
                DetailSection::resources(&QUEUE_RESOURCES, entity),
            ])
        }
    }
}

/// Environment variables of a job as `(name, value)` rows.
#[must_use]
pub fn environment_rows(job: &Entity) -> Vec<Row> {
    mapping_rows(job, ENVIRONMENT_KEY)
}
