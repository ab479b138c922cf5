//! Job tables.

use super::schema::{Column, Placeholder, TableSchema, Translate};

const MISSING: Placeholder = Placeholder::Missing;

pub const JOB_LIST: TableSchema = TableSchema {
    name: "jobs",
    columns: &[
        Column::attr("queue", MISSING),
        Column::attr("job_state", MISSING)
            .labelled("status")
            .translated(Translate::JobState),
        Column::attr("job_name", MISSING).labelled("name"),
        Column::attr("job_owner", MISSING).labelled("owner"),
        Column::nested("walltime", "resources_used", "walltime", Placeholder::NotRunning),
    ],
    with_id: true,
};

pub const JOB_DETAILS: TableSchema = TableSchema {
    name: "details",
    columns: &[
        Column::attr("job_name", MISSING),
        Column::attr("job_owner", MISSING),
        Column::attr("project", MISSING),
        Column::attr("session_id", MISSING),
        Column::attr("queue", MISSING),
        Column::attr("server", MISSING),
        Column::attr("submit_arguments", MISSING),
        Column::attr("error_path", MISSING),
        Column::attr("output_path", MISSING),
    ],
    with_id: false,
};

pub const JOB_PROPERTIES: TableSchema = TableSchema {
    name: "properties",
    columns: &[
        Column::attr("priority", MISSING),
        Column::attr("rerunnable", MISSING),
        Column::attr("run_count", MISSING),
        Column::attr("checkpoint", MISSING),
        Column::attr("substate", MISSING),
        Column::attr("pset", MISSING),
        Column::attr("hold_types", MISSING),
        Column::attr("join_path", MISSING),
        Column::attr("keep_files", MISSING),
        Column::attr("mail_points", MISSING),
    ],
    with_id: false,
};

pub const JOB_TIMESTAMPS: TableSchema = TableSchema {
    name: "timestamps",
    columns: &[
        Column::attr("ctime", MISSING)
            .labelled("creation time")
            .translated(Translate::Timestamp),
        Column::attr("etime", MISSING).translated(Translate::Timestamp),
        Column::attr("qtime", MISSING)
            .labelled("queue time")
            .translated(Translate::Timestamp),
        Column::attr("stime", MISSING)
            .labelled("start time")
            .translated(Translate::Timestamp),
        Column::attr("mtime", MISSING)
            .labelled("last modification")
            .translated(Translate::Timestamp),
    ],
    with_id: false,
};

pub const JOB_EXECUTION: TableSchema = TableSchema {
    name: "execution",
    columns: &[
        Column::attr("queue", MISSING),
        Column::attr("job_state", MISSING).translated(Translate::JobState),
        Column::attr("exec_host", MISSING),
        Column::attr("exec_vnode", MISSING),
        Column::attr("jobdir", MISSING),
        Column::attr("comment", MISSING),
    ],
    with_id: false,
};

/// Attribute holding the job's environment.
pub const ENVIRONMENT_KEY: &str = "variable_list";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Entity, Normalizer, Record};

    fn job() -> Entity {
        let raw: Record = serde_json::from_str(
            r#"{"attributes": {
                "Job_Name": "relax",
                "Job_Owner": "alice@login1",
                "job_state": "Q",
                "queue": "workq",
                "Rerunable": "True",
                "ctime": "1700000000",
                "exec_host": null
            }}"#,
        )
        .unwrap();
        Entity::from_raw(raw, &Normalizer::default())
    }

    #[test]
    fn test_job_list_row() {
        let row = JOB_LIST.row("14.server", &job()).unwrap();
        assert_eq!(
            row,
            ["14.server", "workq", "queued", "relax", "alice@login1", "(not running)"]
        );
    }

    #[test]
    fn test_missing_job_name_placeholder() {
        let raw: Record = serde_json::from_str(r#"{"attributes": {"queue": "workq"}}"#).unwrap();
        let entity = Entity::from_raw(raw, &Normalizer::default());
        let rows = JOB_DETAILS.field_rows(&entity).unwrap();
        assert_eq!(rows[0], ["job_name", "(missing)"]);
    }

    #[test]
    fn test_properties_use_canonical_rerunnable() {
        let rows = JOB_PROPERTIES.field_rows(&job()).unwrap();
        assert_eq!(rows[1], ["rerunnable", "True"]);
    }

    #[test]
    fn test_timestamps_labels() {
        let rows = JOB_TIMESTAMPS.field_rows(&job()).unwrap();
        let labels: Vec<&str> = rows.iter().map(|r| r[0].as_str()).collect();
        assert_eq!(
            labels,
            ["creation time", "etime", "queue time", "start time", "last modification"]
        );
        assert_ne!(rows[0][1], "(missing)");
        assert_ne!(rows[0][1], "1700000000");
        assert_eq!(rows[1][1], "(missing)");
    }

    #[test]
    fn test_execution_translates_state() {
        let rows = JOB_EXECUTION.field_rows(&job()).unwrap();
        assert_eq!(rows[1], ["job_state", "queued"]);
        assert_eq!(rows[2], ["exec_host", "(missing)"]);
    }
}
