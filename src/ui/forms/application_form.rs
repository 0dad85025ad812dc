//! Application form page: banner, error list, fields and buttons

use super::field_renderer::entry_lines;
use crate::app::App;
use crate::state::{ApplicationForm, FormButton};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

/// Rows kept for the error list before it scrolls off
const MAX_ERROR_ROWS: u16 = 8;

pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let title = format!(" {} ", app.form_page.form_name);
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(form) = &app.form_page.form else {
        let text = if app.state.is_loading() {
            "Loading…"
        } else {
            "Form unavailable."
        };
        frame.render_widget(
            Paragraph::new(text).style(Style::default().fg(Color::DarkGray)),
            inner,
        );
        return;
    };

    let banner = app.form_page.banner().message();
    let errors = form.error_list();
    let error_rows = if errors.is_empty() {
        0
    } else {
        (errors.len() as u16 + 2).min(MAX_ERROR_ROWS)
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(if banner.is_some() { 4 } else { 0 }),
            Constraint::Length(error_rows),
            Constraint::Min(0),
        ])
        .split(inner);

    if let Some(message) = banner {
        let paragraph = Paragraph::new(message)
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(Color::White).bg(Color::DarkGray))
            .block(Block::default().borders(Borders::BOTTOM));
        frame.render_widget(paragraph, chunks[0]);
    }

    if !errors.is_empty() {
        let lines: Vec<Line> = errors
            .iter()
            .map(|e| Line::from(Span::styled(format!("• {e}"), Style::default().fg(Color::Red))))
            .collect();
        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .title(" Errors ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        );
        frame.render_widget(paragraph, chunks[1]);
    }

    draw_fields(frame, chunks[2], form, &app.config.date_format);
}

fn draw_fields(frame: &mut Frame, area: Rect, form: &ApplicationForm, date_format: &str) {
    let mut items: Vec<ListItem> = form
        .entries()
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let props = form.props(index, date_format)?;
            let mut lines = entry_lines(entry, &props, form.errors.errors_for(&entry.id));
            lines.push(Line::from(""));
            Some(ListItem::new(lines))
        })
        .collect();

    if !form.is_read_only() {
        items.push(ListItem::new(buttons_line(form)));
    }

    let list = List::new(items);
    let mut state = ListState::default()
        .with_offset(form.scroll_offset)
        .with_selected(Some(form.active));
    frame.render_stateful_widget(list, area, &mut state);
}

fn buttons_line(form: &ApplicationForm) -> Line<'static> {
    let row_active = form.is_buttons_row_active();
    let button = |b: FormButton| {
        let style = if row_active && form.button == b {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Cyan)
        };
        Span::styled(format!("[ {} ]", b.label()), style)
    };
    Line::from(vec![
        button(FormButton::SaveForLater),
        Span::raw("  "),
        button(FormButton::Submit),
    ])
}
