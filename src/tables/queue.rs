//! Queue tables.

use crate::error::Result;
use crate::models::{Entity, decode_state_count};
use crate::utils::natural_sort_key;

use super::Row;
use super::schema::{Column, Placeholder, TableSchema};

const UNSET: Placeholder = Placeholder::Unset;

pub const QUEUE_LIST: TableSchema = TableSchema {
    name: "queues",
    columns: &[
        Column::attr("queue_type", UNSET).labelled("type"),
        Column::attr("enabled", UNSET),
        Column::attr("started", UNSET),
        Column::attr("total_jobs", UNSET).labelled("total jobs"),
        Column::state_count("queued", "queued"),
        Column::state_count("running", "running"),
        Column::state_count("held", "held"),
    ],
    with_id: true,
};

pub const QUEUE_SETTINGS: TableSchema = TableSchema {
    name: "settings",
    columns: &[
        Column::attr("queue_type", UNSET),
        Column::attr("priority", UNSET),
        Column::attr("enabled", UNSET),
        Column::attr("started", UNSET),
        Column::attr("max_running", UNSET),
        Column::attr("max_queued", UNSET),
        Column::attr("acl_user_enable", UNSET),
        Column::attr("acl_users", UNSET),
        Column::attr("from_route_only", UNSET),
        Column::attr("route_destinations", UNSET),
    ],
    with_id: false,
};

/// One `(state, count)` row per entry of the queue's `state_count`.
///
/// A queue without the attribute has no rows; a malformed one is an error.
pub fn state_count_rows(queue: &Entity) -> Result<Vec<Row>> {
    let Some(raw) = queue.attr("state_count") else {
        return Ok(Vec::new());
    };

    let mut rows: Vec<Row> = decode_state_count(&raw.to_string())?
        .into_iter()
        .map(|(state, count)| vec![state, count.to_string()])
        .collect();
    rows.sort_by_cached_key(|row| natural_sort_key(&row[0]));
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntityKind, Normalizer, Record, Snapshot};
    use std::collections::BTreeMap;

    fn queue(json: &str) -> Entity {
        let raw: Record = serde_json::from_str(json).unwrap();
        Entity::from_raw(raw, &Normalizer::default())
    }

    #[test]
    fn test_queue_list_row() {
        let workq = queue(
            r#"{"attributes": {
                "queue_type": "Execution",
                "total_jobs": 9,
                "state_count": "Transit:0 Queued:3 Held:1 Waiting:0 Running:5 Exiting:0 Begun:0",
                "enabled": "True",
                "started": "False"
            }}"#,
        );
        let row = QUEUE_LIST.row("workq", &workq).unwrap();
        assert_eq!(
            row,
            ["workq", "Execution", "True", "False", "9", "3", "5", "1"]
        );
    }

    #[test]
    fn test_queue_settings_use_unset() {
        let rows = QUEUE_SETTINGS
            .field_rows(&queue(r#"{"attributes": {"queue_type": "Route"}}"#))
            .unwrap();
        assert_eq!(rows[0], ["queue_type", "Route"]);
        assert!(rows[1..].iter().all(|r| r[1] == "(unset)"));
    }

    #[test]
    fn test_malformed_state_count_propagates() {
        let mut raw = BTreeMap::new();
        raw.insert(
            "workq".to_string(),
            serde_json::from_str::<Record>(r#"{"attributes": {"state_count": "Queued3"}}"#)
                .unwrap(),
        );
        let snapshot = Snapshot::from_raw(EntityKind::Queue, raw, &Normalizer::default());

        assert!(QUEUE_LIST.list_rows(&snapshot).is_err());
        assert!(state_count_rows(snapshot.get("workq").unwrap()).is_err());
    }

    #[test]
    fn test_state_count_rows() {
        let rows = state_count_rows(&queue(
            r#"{"attributes": {"state_count": "Running:5 Queued:3"}}"#,
        ))
        .unwrap();
        assert_eq!(rows, [["queued", "3"], ["running", "5"]]);
        assert!(state_count_rows(&queue("{}")).unwrap().is_empty());
    }
}
