//! Admin dashboard tabs and the admin creation page

use super::forms::draw_local_form;
use super::widgets::{centered_column, render_scrollable_list};
use crate::app::App;
use crate::state::AdminTab;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Tabs},
    Frame,
};

pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let selected = AdminTab::ALL
        .iter()
        .position(|t| *t == app.state.admin_tab)
        .unwrap_or(0);
    let tabs = Tabs::new(AdminTab::ALL.iter().map(|t| t.label()))
        .select(selected)
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().title(" Admin ").borders(Borders::ALL));
    frame.render_widget(tabs, chunks[0]);

    match app.state.admin_tab {
        AdminTab::Table => draw_table(frame, chunks[1], app),
        AdminTab::Stats => draw_stats(frame, chunks[1], app),
        AdminTab::BulkStatus => {
            if let Some(form) = app.state.form.as_form() {
                let column = centered_column(chunks[1], 70);
                draw_local_form(frame, column, "Bulk change status", form, "Apply");
            }
        }
    }
}

fn draw_table(frame: &mut Frame, area: Rect, app: &App) {
    let apps = &app.state.applications;
    let block = Block::default()
        .title(format!(" Applications ({}) ", apps.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if apps.is_empty() {
        frame.render_widget(
            Paragraph::new("No applications yet.")
                .style(Style::default().fg(Color::DarkGray))
                .block(block),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = apps
        .iter()
        .enumerate()
        .map(|(idx, summary)| {
            let is_selected = idx == app.state.selected_index;
            let style = if is_selected {
                Style::default().bg(Color::DarkGray)
            } else {
                Style::default()
            };
            let updated = summary
                .updated_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();
            ListItem::new(Line::from(vec![
                Span::styled(if is_selected { "▸" } else { " " }, style),
                Span::styled(format!("{:<28}", summary.display_name()), style),
                Span::styled(
                    format!("{:<24}", summary.university),
                    Style::default().fg(Color::Gray),
                ),
                Span::styled(
                    format!("{:<11}", summary.status.label()),
                    Style::default().fg(Color::Yellow),
                ),
                Span::styled(updated, Style::default().fg(Color::DarkGray)),
                Span::styled(
                    format!("  {}", summary.user_id),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    render_scrollable_list(frame, area, List::new(items).block(block), app.state.selected_index);
}

fn draw_stats(frame: &mut Frame, area: Rect, app: &App) {
    let counts = app.state.status_counts();
    let total: usize = counts.values().sum();

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Total: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                total.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
    ];
    lines.extend(counts.iter().map(|(status, count)| {
        Line::from(vec![
            Span::styled(format!("{:<12}", status.label()), Style::default().fg(Color::Cyan)),
            Span::raw(count.to_string()),
        ])
    }));

    frame.render_widget(
        Paragraph::new(lines).block(Block::default().title(" Stats ").borders(Borders::ALL)),
        area,
    );
}

/// New admin page
pub fn draw_create(frame: &mut Frame, area: Rect, app: &App) {
    if let Some(form) = app.state.form.as_form() {
        let column = centered_column(area, 70);
        draw_local_form(frame, column, "Create an admin", form, "Create");
    }
}
