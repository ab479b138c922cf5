//! Detail popup for a single job or queue

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use jqmon::models::{Entity, EntityKind};
use jqmon::tables::{DetailSection, detail_sections, environment_rows, is_placeholder};

use crate::tui::app::{App, DetailState};
use crate::tui::theme::Theme;

use super::widgets::{centered_rect, column_widths, section_header};

const MAX_CELL_WIDTH: usize = 60;

/// Render the detail popup
pub fn render_detail_popup(app: &App, frame: &mut Frame, area: Rect, theme: &Theme) {
    let Some((detail, entity)) = app.detail_entity() else {
        return;
    };

    let popup_area = centered_rect(80, 85, area);
    frame.render_widget(Clear, popup_area);

    let mode = if detail.show_env { " environment" } else { "" };
    let title = format!(" {} {}{} ", detail.kind, detail.id, mode);
    let hint = match detail.kind {
        EntityKind::Job => " e:environment  y:yank  Esc:close ",
        EntityKind::Queue => " y:yank  Esc:close ",
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_focused))
        .title(title)
        .title_bottom(Line::from(hint).right_aligned());

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let lines = popup_lines(detail, entity, theme);

    // Clamp scrolling to the content
    let max_scroll = lines.len().saturating_sub(inner.height as usize);
    let scroll = detail.scroll.min(max_scroll) as u16;

    let para = Paragraph::new(lines)
        .style(Style::default().fg(theme.fg))
        .scroll((scroll, 0));
    frame.render_widget(para, inner);
}

/// Largest useful scroll offset of the detail popup on a screen of `area`
pub fn max_detail_scroll(app: &App, area: Rect) -> Option<usize> {
    let (detail, entity) = app.detail_entity()?;
    let lines = popup_lines(detail, entity, &Theme::default());
    // Popup borders take two rows
    let inner_height = centered_rect(80, 85, area).height.saturating_sub(2);
    Some(lines.len().saturating_sub(inner_height as usize))
}

fn popup_lines<'a>(
    detail: &DetailState,
    entity: Option<&'a Entity>,
    theme: &Theme,
) -> Vec<Line<'a>> {
    match entity {
        None => vec![Line::from(Span::styled(
            format!("  {} {} is no longer reported by the server", detail.kind, detail.id),
            Style::default().fg(theme.warn),
        ))],
        Some(entity) => match detail_lines(detail, entity, theme) {
            Ok(lines) => lines,
            Err(e) => vec![Line::from(Span::styled(
                format!("  {}", e),
                Style::default().fg(theme.error),
            ))],
        },
    }
}

fn detail_lines<'a>(
    detail: &DetailState,
    entity: &'a Entity,
    theme: &Theme,
) -> jqmon::Result<Vec<Line<'a>>> {
    let mut lines = Vec::new();

    if detail.show_env {
        let rows = environment_rows(entity);
        lines.push(section_header("environment", theme));
        if rows.is_empty() {
            lines.push(notice("no environment variables", theme));
        } else {
            push_table(&mut lines, None, &rows, theme);
        }
        return Ok(lines);
    }

    if let Some(description) = entity.description() {
        lines.push(Line::from(vec![
            Span::styled("  description  ", Style::default().bold()),
            Span::raw(description.to_string()),
        ]));
        lines.push(Line::from(""));
    }

    for section in detail_sections(detail.kind, entity)? {
        push_section(&mut lines, &section, theme);
        lines.push(Line::from(""));
    }
    Ok(lines)
}

fn push_section(lines: &mut Vec<Line<'_>>, section: &DetailSection, theme: &Theme) {
    lines.push(section_header(section.title, theme));
    if !section.available {
        let text = if section.title == "state counts" {
            "no state counts reported"
        } else {
            "no resource data"
        };
        lines.push(notice(text, theme));
        return;
    }

    // Attribute/value sections read better without a header line
    let headers = (section.headers.len() > 2).then_some(section.headers.as_slice());
    push_table(lines, headers, &section.rows, theme);
}

/// Append rows as space-aligned text lines.
fn push_table(
    lines: &mut Vec<Line<'_>>,
    headers: Option<&[String]>,
    rows: &[Vec<String>],
    theme: &Theme,
) {
    let widths = column_widths(headers.unwrap_or(&[]), rows, MAX_CELL_WIDTH);

    if let Some(headers) = headers {
        let spans: Vec<Span> = headers
            .iter()
            .zip(&widths)
            .map(|(h, w)| Span::styled(format!("  {:<w$}", h, w = *w), Style::default().bold()))
            .collect();
        lines.push(Line::from(spans));
    }

    for row in rows {
        let spans: Vec<Span> = row
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (cell, w))| {
                let style = if i == 0 {
                    Style::default().fg(theme.border_focused)
                } else if is_placeholder(cell) {
                    Style::default().fg(theme.placeholder)
                } else {
                    Style::default().fg(theme.fg)
                };
                Span::styled(format!("  {:<w$}", cell, w = *w), style)
            })
            .collect();
        lines.push(Line::from(spans));
    }
}

fn notice<'a>(text: &str, theme: &Theme) -> Line<'a> {
    Line::from(Span::styled(
        format!("  {}", text),
        Style::default().fg(theme.placeholder).italic(),
    ))
}
