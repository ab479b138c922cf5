//! UI rendering for the TUI
//!
//! This module handles all rendering using ratatui. The rendering is event-driven -
//! we only render when an event triggers a state change, not at a fixed frame rate.

mod details;
mod lists;
mod overlays;
mod widgets;

use ratatui::prelude::*;
use ratatui::widgets::{Paragraph, Tabs};

use jqmon::formatting::format_age;

use crate::tui::app::{App, ModalState, View};
use crate::tui::theme::Theme;

pub use details::max_detail_scroll;

use details::render_detail_popup;
use lists::render_list_view;
use overlays::{render_clipboard_toast, render_help_overlay, render_search_overlay};

/// Rows taken by everything except the table body: tab bar, info bar,
/// status bar (2), list borders (2) and the table header.
pub const CHROME_HEIGHT: u16 = 7;

/// Render the entire TUI
pub fn render(app: &App, frame: &mut Frame) {
    // Use theme from configuration
    let theme = Theme::from_name(&app.config.display.theme);
    let area = frame.area();

    // Main layout: header, content, footer
    let layout = Layout::vertical([
        Constraint::Length(1), // Tab bar
        Constraint::Length(1), // Info bar
        Constraint::Min(0),    // Main content
        Constraint::Length(2), // Status bar
    ])
    .split(area);

    render_tab_bar(app, frame, layout[0], &theme);
    render_info_bar(app, frame, layout[1], &theme);
    render_list_view(app, frame, layout[2], &theme);
    render_status_bar(app, frame, layout[3], &theme);

    // Overlays (render in order of z-index)
    match &app.modal {
        ModalState::Help => render_help_overlay(frame, area, &theme),
        ModalState::Search => render_search_overlay(app, frame, layout[2], &theme),
        ModalState::Detail(_) => render_detail_popup(app, frame, area, &theme),
        ModalState::None => {}
    }

    // Clipboard/export feedback toast (always on top)
    if let Some(feedback) = app.feedback.current_clipboard_feedback() {
        render_clipboard_toast(feedback, frame, area, &theme);
    }
}

fn render_tab_bar(app: &App, frame: &mut Frame, area: Rect, theme: &Theme) {
    let titles: Vec<Line> = View::ALL
        .iter()
        .enumerate()
        .map(|(i, view)| {
            let num = format!("[{}]", i + 1);
            let label = view.label();
            if *view == app.current_view {
                Line::from(vec![
                    Span::styled(num, Style::default().fg(theme.highlight)),
                    Span::styled(label, Style::default().fg(theme.selected_fg).bold()),
                ])
            } else {
                Line::from(vec![
                    Span::styled(num, Style::default().fg(theme.border)),
                    Span::raw(label),
                ])
            }
        })
        .collect();

    let selected = View::ALL
        .iter()
        .position(|v| *v == app.current_view)
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .divider(" | ")
        .style(Style::default().fg(theme.fg))
        .highlight_style(Style::default().fg(theme.selected_fg).bold());

    frame.render_widget(tabs, area);
}

fn render_info_bar(app: &App, frame: &mut Frame, area: Rect, theme: &Theme) {
    let view = app.current();
    let kind = view.kind();
    let total = view.data.snapshot().len();
    let shown = view.rows().len();

    let count = if view.search.pattern().is_some() {
        format!("{} of {} {}s", shown, total, kind)
    } else {
        format!("{} {}s", total, kind)
    };

    let search_info = match view.search.pattern() {
        Some(pattern) => format!(" | Search ({}): /{}", view.search.mode.label(), pattern.as_str()),
        None => String::new(),
    };

    let info = format!(" Server: {} | {}{}", app.server, count, search_info);

    let style = if view.data.is_stale() {
        Style::default().fg(theme.stale_indicator)
    } else {
        Style::default().fg(theme.border)
    };

    let para = Paragraph::new(info).style(style);
    frame.render_widget(para, area);
}

fn render_status_bar(app: &App, frame: &mut Frame, area: Rect, theme: &Theme) {
    let layout = Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).split(area);

    // Keybindings line - context-sensitive
    let keybinds = match &app.modal {
        ModalState::Search => " type:search  Ctrl+d:deep  Ctrl+u:clear  Enter:keep  Esc:clear ",
        ModalState::Detail(d) if d.show_env => " j/k:scroll  y:yank  e/Esc:back ",
        ModalState::Detail(_) => " j/k:scroll  e:environment  y:yank  Esc:close ",
        _ => " j/k:move  Enter:detail  /:search  r:refresh  y:yank  e/E:export  ?:help  q:quit ",
    };
    let keybinds_para = Paragraph::new(keybinds).style(Style::default().fg(theme.border));
    frame.render_widget(keybinds_para, layout[0]);

    let view = app.current();
    let mut status_parts = Vec::new();

    // Last update time
    if view.data.is_loaded() {
        let age_str = format_age(view.data.age());
        if view.data.is_stale() {
            status_parts.push(Span::styled(
                format!(" Updated: {} (*STALE*)", age_str),
                Style::default().fg(theme.stale_indicator),
            ));
        } else {
            status_parts.push(Span::styled(
                format!(" Updated: {}", age_str),
                Style::default().fg(theme.border),
            ));
        }
    } else {
        status_parts.push(Span::styled(" Loading...", Style::default().fg(theme.queued)));
    }

    // Config warnings display (persistent until fixed)
    if let Some(first) = app.feedback.config_warnings.first() {
        let more = app.feedback.config_warnings.len() - 1;
        let warning_text = if more == 0 {
            format!(" | WARN: {}", first)
        } else {
            format!(" | WARN: {} (+{} more)", first, more)
        };
        status_parts.push(Span::styled(warning_text, Style::default().fg(theme.warn)));
    }

    // Error display (temporary, auto-dismisses)
    if let Some(error) = app.current_error() {
        status_parts.push(Span::styled(
            format!(" | ERROR: {} ", error),
            Style::default().fg(theme.error),
        ));
    }

    let status_para = Paragraph::new(Line::from(status_parts));
    frame.render_widget(status_para, layout[1]);
}
