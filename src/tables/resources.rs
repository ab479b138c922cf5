//! Resource comparison tables.
//!
//! Several attribute groups describe the same resource dimensions (what a job
//! requested versus what it used, or a queue's min/max/default/assigned
//! limits). The projector lines them up per resource.

use crate::models::{Entity, Value};

use super::Row;
use super::schema::Placeholder;

/// Resources shown in every resource table: `(canonical key, display label)`.
pub const RESOURCES: &[(&str, &str)] = &[
    ("mem", "memory"),
    ("ncpus", "# cpus"),
    ("nodect", "# nodes"),
    ("walltime", "walltime"),
    ("mpiprocs", "# MPI processes"),
    ("place", "place"),
    ("select", "select"),
];

/// Which groups a resource table compares, and what fills a gap.
#[derive(Debug, Clone, Copy)]
pub struct ResourceLayout {
    pub name: &'static str,
    /// `(attribute group, column header)` pairs.
    pub groups: &'static [(&'static str, &'static str)],
    pub placeholder: Placeholder,
}

/// Requested versus used resources of one job.
pub const JOB_RESOURCES: ResourceLayout = ResourceLayout {
    name: "resources",
    groups: &[("resource_list", "requested"), ("resources_used", "used")],
    placeholder: Placeholder::None,
};

/// Limits and assignments of one queue.
pub const QUEUE_RESOURCES: ResourceLayout = ResourceLayout {
    name: "resources",
    groups: &[
        ("resources_min", "min"),
        ("resources_max", "max"),
        ("resources_default", "default"),
        ("resources_assigned", "assigned"),
    ],
    placeholder: Placeholder::Unset,
};

/// Projected resource table.
///
/// `available` is false when no group has a value for any resource; `rows`
/// is then empty so the caller can show a "no data" state instead of a grid
/// of placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceTable {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
    pub available: bool,
}

impl ResourceLayout {
    #[must_use]
    pub fn headers(&self) -> Vec<String> {
        std::iter::once("resource")
            .chain(self.groups.iter().map(|(_, header)| *header))
            .map(str::to_string)
            .collect()
    }

    /// Line up every resource across this layout's groups for one entity.
    #[must_use]
    pub fn project(&self, entity: &Entity) -> ResourceTable {
        let mut found = false;
        let rows: Vec<Row> = RESOURCES
            .iter()
            .map(|(key, label)| {
                let mut row = Vec::with_capacity(self.groups.len() + 1);
                row.push((*label).to_string());
                for (group, _) in self.groups {
                    match entity.group_attr(group, key) {
                        None | Some(Value::Null) => row.push(self.placeholder.as_str().to_string()),
                        Some(value) => {
                            found = true;
                            row.push(value.to_string());
                        }
                    }
                }
                row
            })
            .collect();

        ResourceTable {
            headers: self.headers(),
            rows: if found { rows } else { Vec::new() },
            available: found,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Normalizer, Record};

    fn entity(json: &str) -> Entity {
        let raw: Record = serde_json::from_str(json).unwrap();
        Entity::from_raw(raw, &Normalizer::default())
    }

    #[test]
    fn test_job_resources() {
        let job = entity(
            r#"{"attributes": {
                "Resource_List": {"ncpus": 4, "mem": "8gb", "walltime": "01:00:00"},
                "resources_used": {"walltime": "00:10:00", "Mem": "1gb"}
            }}"#,
        );
        let table = JOB_RESOURCES.project(&job);

        assert!(table.available);
        assert_eq!(table.headers, ["resource", "requested", "used"]);
        assert_eq!(table.rows.len(), RESOURCES.len());
        assert_eq!(table.rows[0], ["memory", "8gb", "1gb"]);
        assert_eq!(table.rows[1], ["# cpus", "4", "(none)"]);
        assert_eq!(table.rows[3], ["walltime", "01:00:00", "00:10:00"]);
        assert_eq!(table.rows[6], ["select", "(none)", "(none)"]);
    }

    #[test]
    fn test_queue_resources_use_unset() {
        let queue = entity(r#"{"attributes": {"resources_max": {"ncpus": 64}}}"#);
        let table = QUEUE_RESOURCES.project(&queue);

        assert!(table.available);
        assert_eq!(table.rows[1], ["# cpus", "(unset)", "64", "(unset)", "(unset)"]);
    }

    #[test]
    fn test_no_resource_data_disables_table() {
        let queue = entity(
            r#"{"attributes": {"queue_type": "Execution", "resources_max": {"gpus": 2}}}"#,
        );
        let table = QUEUE_RESOURCES.project(&queue);

        assert!(!table.available);
        assert!(table.rows.is_empty());
        assert_eq!(table.headers.len(), 5);
    }
}
