//! Export functionality for the TUI
//!
//! This module turns the rows of a view into file contents. The actual
//! export methods remain on `App` since they need access to feedback state
//! for error reporting.

use serde_json::{Map, Value};

use jqmon::models::EntityKind;
use jqmon::tables::Row;

use super::state::ExportFormat;

/// Escape a string for CSV (handle commas, quotes, newlines)
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Render rows with a header line.
pub fn rows_to_csv(headers: &[String], rows: &[Row]) -> String {
    let mut out = String::new();
    for line in std::iter::once(headers).chain(rows.iter().map(Vec::as_slice)) {
        let cells: Vec<String> = line.iter().map(|cell| escape_csv(cell)).collect();
        out.push_str(&cells.join(","));
        out.push('\n');
    }
    out
}

/// Render rows as a JSON array of objects keyed by header.
pub fn rows_to_json(headers: &[String], rows: &[Row]) -> String {
    let items: Vec<Value> = rows
        .iter()
        .map(|row| {
            let object: Map<String, Value> = headers
                .iter()
                .zip(row)
                .map(|(header, cell)| (header.clone(), Value::String(cell.clone())))
                .collect();
            Value::Object(object)
        })
        .collect();

    // Serializing plain strings cannot fail
    serde_json::to_string_pretty(&items).unwrap_or_default()
}

pub fn export_rows(headers: &[String], rows: &[Row], format: ExportFormat) -> String {
    match format {
        ExportFormat::Json => rows_to_json(headers, rows),
        ExportFormat::Csv => rows_to_csv(headers, rows),
    }
}

/// `jqmon_jobs_20250101_120000.csv`
pub fn export_filename(kind: EntityKind, format: ExportFormat) -> String {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    format!("jqmon_{}s_{}.{}", kind, timestamp, format.extension())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_escape_csv_simple() {
        assert_eq!(escape_csv("hello"), "hello");
        assert_eq!(escape_csv(""), "");
    }

    #[test]
    fn test_escape_csv_comma() {
        assert_eq!(escape_csv("hello,world"), "\"hello,world\"");
    }

    #[test]
    fn test_escape_csv_quotes() {
        assert_eq!(escape_csv("say \"hello\""), "\"say \"\"hello\"\"\"");
    }

    #[test]
    fn test_escape_csv_newline() {
        assert_eq!(escape_csv("line1\nline2"), "\"line1\nline2\"");
    }

    #[test]
    fn test_rows_to_csv() {
        let headers = strings(&["id", "queue", "name"]);
        let rows = vec![strings(&["1.srv", "workq", "relax, step 2"])];
        assert_eq!(
            rows_to_csv(&headers, &rows),
            "id,queue,name\n1.srv,workq,\"relax, step 2\"\n"
        );
    }

    #[test]
    fn test_rows_to_json() {
        let headers = strings(&["id", "status"]);
        let rows = vec![strings(&["1.srv", "running"]), strings(&["2.srv", "queued"])];
        let parsed: Value = serde_json::from_str(&rows_to_json(&headers, &rows)).unwrap();
        assert_eq!(parsed[1]["id"], "2.srv");
        assert_eq!(parsed[0]["status"], "running");
    }

    #[test]
    fn test_export_filename() {
        let name = export_filename(EntityKind::Queue, ExportFormat::Csv);
        assert!(name.starts_with("jqmon_queues_"));
        assert!(name.ends_with(".csv"));
    }
}
