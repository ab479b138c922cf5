//! Overlay and popup rendering
//!
//! Handles rendering of help, the search line, and toast notifications.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::{App, ClipboardFeedback};
use crate::tui::theme::Theme;

use super::widgets::centered_rect;

pub fn render_help_overlay(frame: &mut Frame, area: Rect, theme: &Theme) {
    let popup_area = centered_rect(65, 80, area);

    // Clear the area first
    frame.render_widget(Clear, popup_area);

    let heading = |text: &'static str| {
        Line::from(Span::styled(text, Style::default().fg(theme.highlight).bold()))
    };

    let help_text = vec![
        Line::from(Span::styled(
            "jqmon - Keyboard Shortcuts",
            Style::default().bold(),
        )),
        Line::from(""),
        heading("Navigation"),
        Line::from("  j / Down       Move selection down"),
        Line::from("  k / Up         Move selection up"),
        Line::from("  g / Home       Jump to top"),
        Line::from("  G / End        Jump to bottom"),
        Line::from("  Ctrl+d / PgDn  Page down"),
        Line::from("  Ctrl+u / PgUp  Page up"),
        Line::from("  Mouse click    Select row"),
        Line::from(""),
        heading("Views"),
        Line::from("  1              Jobs view"),
        Line::from("  2              Queues view"),
        Line::from("  Tab            Cycle to next view"),
        Line::from(""),
        heading("Search"),
        Line::from("  /              Search (regex, matches the start of a value)"),
        Line::from("  Ctrl+d         Toggle deep search (all attributes)"),
        Line::from("  Ctrl+u         Clear search input"),
        Line::from("  Enter          Keep search and close input"),
        Line::from("  Esc            Clear search"),
        Line::from(""),
        heading("Details"),
        Line::from("  Enter          Show job / queue details"),
        Line::from("  e              Environment variables (job details)"),
        Line::from("  y              Copy ID to clipboard"),
        Line::from(""),
        heading("General"),
        Line::from("  r              Refresh current view now"),
        Line::from("  e              Export current view to JSON"),
        Line::from("  E (shift)      Export current view to CSV"),
        Line::from("  ?/F1           Show this help"),
        Line::from("  q / Ctrl+c     Quit application"),
        Line::from(""),
        Line::from(Span::styled(
            "Press ? or Esc to close this help",
            Style::default().fg(theme.border),
        )),
    ];

    let help_para = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border_focused))
                .title(" Help "),
        )
        .style(Style::default().fg(theme.fg));

    frame.render_widget(help_para, popup_area);
}

/// Search input line shown at the top of the list while typing
pub fn render_search_overlay(app: &App, frame: &mut Frame, area: Rect, theme: &Theme) {
    let search = &app.current().search;

    let popup_area = Rect {
        x: area.x + 2,
        y: area.y + 1,
        width: area.width.saturating_sub(4).min(60),
        height: 3,
    };

    frame.render_widget(Clear, popup_area);

    let title = format!(" Search ({}) - Ctrl+d toggles ", search.mode.label());
    let border = if search.error().is_some() {
        theme.error
    } else {
        theme.highlight
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(title);

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let prefix = "/";
    let input_text = format!("{}{}", prefix, search.input());
    let para = Paragraph::new(input_text).style(Style::default().fg(theme.fg));
    frame.render_widget(para, inner);

    // Cursor sits after the last character
    frame.set_cursor_position((
        inner.x + (prefix.len() + search.input().chars().count()) as u16,
        inner.y,
    ));
}

/// Render clipboard/export feedback toast
pub fn render_clipboard_toast(
    feedback: &ClipboardFeedback,
    frame: &mut Frame,
    area: Rect,
    theme: &Theme,
) {
    // Position toast at bottom-right
    let toast_width = (feedback.message.len() + 4).min(60) as u16;
    let toast_area = Rect {
        x: area.width.saturating_sub(toast_width + 2),
        y: area.height.saturating_sub(4),
        width: toast_width,
        height: 3,
    };

    frame.render_widget(Clear, toast_area);

    let border_color = if feedback.success {
        theme.running
    } else {
        theme.error
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let para = Paragraph::new(format!(" {} ", feedback.message))
        .block(block)
        .style(Style::default().fg(theme.fg))
        .alignment(Alignment::Center);

    frame.render_widget(para, toast_area);
}
