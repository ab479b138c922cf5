//! Jobs and queues list rendering
//!
//! Both views render the rows prepared by the app; only the styling of a few
//! columns differs.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};

use jqmon::formatting::truncate_string;
use jqmon::models::EntityKind;
use jqmon::tables::{is_placeholder, list_schema};

use crate::tui::app::{App, ViewState};
use crate::tui::theme::Theme;

use super::widgets::{column_widths, create_table_header, spinner_frame};

/// Upper bound for any column except the job name
const MAX_COLUMN_WIDTH: usize = 30;

pub fn render_list_view(app: &App, frame: &mut Frame, area: Rect, theme: &Theme) {
    let view = app.current();
    let kind = view.kind();

    let title = match view.search.pattern() {
        Some(pattern) => format!(" {}s matching /{} ", kind, pattern.as_str()),
        None => format!(" {}s ", kind),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_focused))
        .title(title);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if view.rows().is_empty() {
        let msg = empty_message(view);
        let para = Paragraph::new(msg)
            .style(Style::default().fg(theme.border))
            .alignment(Alignment::Center);
        frame.render_widget(para, inner);
        return;
    }

    render_rows(app, view, frame, inner, theme);
}

fn empty_message(view: &ViewState) -> String {
    let kind = view.kind();
    if !view.data.is_loaded() {
        format!("{} Loading {}s...", spinner_frame(), kind)
    } else if view.search.pattern().is_some() {
        format!("No {}s match the search", kind)
    } else {
        format!("No {}s found", kind)
    }
}

fn render_rows(app: &App, view: &ViewState, frame: &mut Frame, area: Rect, theme: &Theme) {
    let kind = view.kind();
    let headers = list_schema(kind).headers();
    let name_max = app.config.display.job_name_max_length;

    // Truncate job names before measuring so the width follows the config
    let rows: Vec<Vec<String>> = view
        .rows()
        .iter()
        .map(|row| {
            row.iter()
                .zip(&headers)
                .map(|(cell, header)| {
                    if kind == EntityKind::Job && header == "name" {
                        truncate_string(cell, name_max)
                    } else {
                        cell.clone()
                    }
                })
                .collect()
        })
        .collect();

    let widths: Vec<Constraint> = column_widths(&headers, &rows, MAX_COLUMN_WIDTH.max(name_max))
        .into_iter()
        .map(|w| Constraint::Length(w as u16))
        .collect();

    // Calculate visible rows
    let available_height = area.height.saturating_sub(1) as usize; // -1 for header
    let selected = view.list_state.selected;
    // Keep the selection visible even before the page size is known
    let scroll_offset = if selected >= view.list_state.scroll_offset + available_height {
        (selected + 1).saturating_sub(available_height)
    } else {
        view.list_state.scroll_offset
    };

    let table_rows: Vec<Row> = rows
        .iter()
        .enumerate()
        .skip(scroll_offset)
        .take(available_height)
        .map(|(idx, row)| styled_row(row, &headers, idx == selected, theme))
        .collect();

    let table = Table::new(table_rows, widths)
        .header(create_table_header(&headers, theme))
        .column_spacing(2);

    frame.render_widget(table, area);
}

fn styled_row<'a>(row: &'a [String], headers: &[String], selected: bool, theme: &Theme) -> Row<'a> {
    let cells = row.iter().zip(headers).map(|(cell, header)| {
        let style = if is_placeholder(cell) {
            Style::default().fg(theme.placeholder)
        } else {
            match header.as_str() {
                "status" => Style::default().fg(theme.job_state_color(cell)),
                "enabled" | "started" => Style::default().fg(theme.flag_color(cell)),
                _ => Style::default().fg(theme.fg),
            }
        };
        Cell::from(cell.as_str()).style(style)
    });

    let row = Row::new(cells);
    if selected {
        row.style(
            Style::default()
                .bg(theme.selected_bg)
                .fg(theme.selected_fg)
                .bold(),
        )
    } else {
        row
    }
}
