//! Data models for status service responses.
//!
//! This module provides the dynamically shaped attribute values returned by
//! the server, their normalization, job/queue entities and snapshots, state
//! codes, and configuration types.

mod config;
mod entity;
mod normalize;
mod state;
mod value;

// Re-export all public types from submodules
pub use config::{BehaviorConfig, ConnectionConfig, DisplayConfig, JqmonConfig, RefreshConfig};
pub use entity::{Entity, EntityKind, Snapshot};
pub use normalize::{Normalizer, coerce_booleans};
pub use state::{
    JOB_STATES, JobStateClass, StateCounts, decode_state_count, encode_state_count,
    job_state_label,
};
pub use value::{Record, Value, lookup};

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn queue_snapshot(json: &str) -> Snapshot {
        let raw: BTreeMap<String, Record> = serde_json::from_str(json).unwrap();
        Snapshot::from_raw(EntityKind::Queue, raw, &Normalizer::default())
    }

    #[test]
    fn test_queue_state_count_through_snapshot() {
        let snapshot = queue_snapshot(
            r#"{
                "workq": {
                    "attributes": {
                        "Queue_Type": "Execution",
                        "State_Count": "Transit:0 Queued:3 Held:1 Running:5",
                        "Enabled": "True"
                    }
                }
            }"#,
        );

        let queue = snapshot.get("workq").unwrap();
        assert_eq!(queue.attr("enabled"), Some(&Value::Bool(true)));

        let counts = decode_state_count(queue.attr("state_count").unwrap().as_str().unwrap())
            .unwrap();
        assert_eq!(counts["queued"], 3);
        assert_eq!(counts["running"], 5);
    }

    #[test]
    fn test_snapshot_survives_unexpected_shapes() {
        let snapshot = queue_snapshot(
            r#"{
                "q1": {"attributes": "oops"},
                "q2": {}
            }"#,
        );

        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.get("q1").unwrap().attributes.is_empty());
        assert!(snapshot.get("q2").unwrap().attr("queue_type").is_none());
    }
}
