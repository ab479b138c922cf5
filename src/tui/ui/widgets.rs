//! Reusable UI widgets and helper functions
//!
//! This module contains shared rendering utilities used across different views.

use ratatui::prelude::*;
use ratatui::widgets::{Cell, Row};

use crate::tui::theme::Theme;

/// Braille spinner shown while the first snapshot is loading
const SPINNER: [&str; 8] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

/// Create a styled table header row from column names
pub fn create_table_header<'a>(columns: &'a [String], theme: &Theme) -> Row<'a> {
    let header_cells = columns
        .iter()
        .map(|h| Cell::from(h.as_str()).style(Style::default().fg(theme.header_fg).bold()));
    Row::new(header_cells)
        .style(Style::default().bg(theme.header_bg))
        .height(1)
}

/// Create a centered rectangle
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(area);

    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(popup_layout[1])[1]
}

/// Bold, colored title line for a block of a popup
pub fn section_header<'a>(title: &str, theme: &Theme) -> Line<'a> {
    Line::from(Span::styled(
        title.to_uppercase(),
        Style::default().fg(theme.highlight).bold(),
    ))
}

/// Width of each column: the longest cell (or header), capped at `max`.
/// Rows may be shorter or longer than the header.
pub fn column_widths(headers: &[String], rows: &[Vec<String>], max: usize) -> Vec<usize> {
    let mut widths: Vec<usize> = Vec::new();
    for line in std::iter::once(headers).chain(rows.iter().map(Vec::as_slice)) {
        for (i, cell) in line.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(i) {
                Some(width) => *width = (*width).max(len),
                None => widths.push(len),
            }
        }
    }
    widths.into_iter().map(|w| w.min(max)).collect()
}

/// Current spinner frame, advancing every 200ms
pub fn spinner_frame() -> &'static str {
    let tick = chrono::Local::now().timestamp_millis() / 200;
    SPINNER[tick.rem_euclid(SPINNER.len() as i64) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_widths() {
        let headers = vec!["id".to_string(), "name".to_string()];
        let rows = vec![vec!["14.server".to_string(), "x".repeat(80)]];
        assert_eq!(column_widths(&headers, &rows, 40), [9, 40]);
        assert_eq!(column_widths(&[], &rows, 40), [9, 40]);
    }
}
