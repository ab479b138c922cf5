//! Plain terminal output of the job and queue tables for the CLI commands

use crate::error::Result;
use crate::formatting::{layout, truncate_string};
use crate::models::{Entity, EntityKind, JobStateClass, Snapshot};
use crate::search::{SearchMode, SearchPattern};
use crate::tables::{
    DetailSection, detail_sections, environment_rows, is_placeholder, list_schema, list_view,
};
use owo_colors::OwoColorize;
use tabled::{
    Table,
    builder::Builder,
    settings::{Alignment, Modify, Style, Width, object::Rows},
};

/// Color a job state cell by its class
fn format_job_state(state: &str) -> String {
    match JobStateClass::classify(state) {
        JobStateClass::Running => state.green().to_string(),
        JobStateClass::Queued => state.yellow().to_string(),
        JobStateClass::Held => state.magenta().to_string(),
        JobStateClass::Finished => state.bright_blue().to_string(),
        JobStateClass::Other => state.white().to_string(),
    }
}

/// Color a boolean queue flag
fn format_flag(value: &str) -> String {
    match value {
        "True" => value.green().to_string(),
        "False" => value.red().to_string(),
        other => other.to_string(),
    }
}

/// Style one cell according to the column it sits in
fn format_cell(header: &str, cell: &str) -> String {
    if is_placeholder(cell) {
        return cell.bright_black().to_string();
    }
    match header {
        "status" | "job_state" => format_job_state(cell),
        "enabled" | "started" => format_flag(cell),
        _ => truncate_string(cell, layout::MAX_CELL_WIDTH),
    }
}

fn build_table(headers: Option<&[String]>, rows: &[Vec<String>]) -> Table {
    let mut builder = Builder::default();
    if let Some(headers) = headers {
        builder.push_record(headers.iter().map(|h| h.bold().to_string()));
    }

    for row in rows {
        // Attribute/value tables are colored by the attribute name
        let cells: Vec<String> = match headers {
            Some(headers) => row
                .iter()
                .zip(headers)
                .map(|(cell, header)| format_cell(header, cell))
                .collect(),
            None => {
                let key = row.first().map(String::as_str).unwrap_or_default();
                row.iter()
                    .enumerate()
                    .map(|(i, cell)| {
                        if i == 0 {
                            cell.cyan().to_string()
                        } else {
                            format_cell(key, cell)
                        }
                    })
                    .collect()
            }
        };
        builder.push_record(cells);
    }

    builder.build()
}

/// Render the (optionally filtered) list of jobs or queues
pub fn format_list(
    snapshot: &Snapshot,
    pattern: Option<&SearchPattern>,
    mode: SearchMode,
    name_max: usize,
) -> Result<String> {
    let kind = snapshot.kind();
    let headers = list_schema(kind).headers();
    let mut rows = list_view(snapshot, pattern, mode)?;

    if rows.is_empty() {
        let msg = match pattern {
            Some(p) => format!("No {}s match /{}", kind, p.as_str()),
            None => format!("No {}s found", kind),
        };
        return Ok(msg.yellow().to_string());
    }

    if kind == EntityKind::Job
        && let Some(name_col) = headers.iter().position(|h| h == "name")
    {
        for row in &mut rows {
            if let Some(name) = row.get_mut(name_col) {
                *name = truncate_string(name, name_max);
            }
        }
    }

    let mut table = build_table(Some(&headers), &rows);
    table
        .with(Style::rounded())
        .with(Width::wrap(200).keep_words(true))
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    let summary = if pattern.is_some() {
        format!("{} of {} {}s", rows.len(), snapshot.len(), kind)
    } else {
        format!("{} {}s", rows.len(), kind)
    };

    Ok(format!("{}\n{}", table, summary.bright_black()))
}

fn format_section(section: &DetailSection) -> String {
    let title = section.title.to_uppercase().bold().underline().to_string();
    if !section.available {
        let notice = if section.title == "state counts" {
            "no state counts reported"
        } else {
            "no resource data"
        };
        return format!("{}\n  {}", title, notice.bright_black().italic());
    }

    // Two-column sections are attribute/value pairs and need no header row
    let headers = (section.headers.len() > 2).then_some(section.headers.as_slice());
    let mut table = build_table(headers, &section.rows);
    if headers.is_some() {
        table.with(Style::rounded());
    } else {
        table.with(Style::blank());
    }
    format!("{}\n{}", title, table)
}

/// Render every detail section of one job or queue
pub fn format_details(kind: EntityKind, id: &str, entity: &Entity) -> Result<String> {
    let mut output = format!("{} {}\n", kind.to_string().bold(), id.cyan().bold());

    if let Some(description) = entity.description() {
        output.push_str(&format!("{}\n", description));
    }

    for section in detail_sections(kind, entity)? {
        output.push('\n');
        output.push_str(&format_section(&section));
        output.push('\n');
    }

    Ok(output)
}

/// Render the environment variables of a job
pub fn format_environment(id: &str, job: &Entity) -> String {
    let rows: Vec<Vec<String>> = environment_rows(job)
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|cell| truncate_string(&cell, layout::MAX_ENV_VALUE_WIDTH))
                .collect()
        })
        .collect();

    if rows.is_empty() {
        return format!("No environment variables recorded for job {}", id)
            .yellow()
            .to_string();
    }

    let mut table = build_table(None, &rows);
    table.with(Style::blank());
    format!("{} {}\n{}", "ENVIRONMENT".bold().underline(), id.cyan(), table)
}

/// Message for an ID that is not in the snapshot
pub fn format_not_found(kind: EntityKind, id: &str) -> String {
    format!("{} {} not found", kind, id).red().to_string()
}
