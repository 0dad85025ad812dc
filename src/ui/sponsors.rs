//! Sponsor list, detail and editor

use super::forms::draw_local_form;
use super::widgets::{centered_column, render_scrollable_list};
use crate::app::App;
use crate::state::FormState;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

pub fn draw_list(frame: &mut Frame, area: Rect, app: &App) {
    let sponsors = &app.state.sponsors;
    let block = Block::default()
        .title(" Sponsors ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if sponsors.is_empty() {
        let hint = if app.state.auth.roles.admin {
            "No sponsors found.\nPress 'n' to add one."
        } else {
            "No sponsors found."
        };
        frame.render_widget(
            Paragraph::new(hint)
                .style(Style::default().fg(Color::DarkGray))
                .block(block),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = sponsors
        .iter()
        .enumerate()
        .map(|(idx, sponsor)| {
            let is_selected = idx == app.state.selected_index;
            let style = if is_selected {
                Style::default().bg(Color::DarkGray)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(vec![
                Span::styled(if is_selected { "▸" } else { " " }, style),
                Span::styled(sponsor.name.clone(), style.fg(Color::Cyan)),
                Span::styled(
                    format!("  {} admin(s)", sponsor.admin_emails.len()),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    render_scrollable_list(frame, area, List::new(items).block(block), app.state.selected_index);
}

pub fn draw_detail(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" Sponsor ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let Some(sponsor) = &app.state.sponsor_detail else {
        let text = if app.state.is_loading() {
            "Loading…"
        } else {
            "Sponsor not found"
        };
        frame.render_widget(
            Paragraph::new(text)
                .style(Style::default().fg(Color::DarkGray))
                .block(block),
            area,
        );
        return;
    };

    let label = Style::default().fg(Color::DarkGray);
    let mut lines = vec![
        Line::from(Span::styled(
            sponsor.name.clone(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![Span::styled("Id: ", label), Span::raw(sponsor.id.clone())]),
    ];
    if let Some(created) = sponsor.created_at {
        lines.push(Line::from(vec![
            Span::styled("Created: ", label),
            Span::raw(created.format("%Y-%m-%d %H:%M").to_string()),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Admins", label)));
    if sponsor.admin_emails.is_empty() {
        lines.push(Line::from(Span::styled("  (none)", label)));
    }
    lines.extend(
        sponsor
            .admin_emails
            .iter()
            .map(|email| Line::from(format!("  • {email}"))),
    );

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

pub fn draw_edit(frame: &mut Frame, area: Rect, app: &App) {
    let FormState::Sponsor(form) = &app.state.form else {
        return;
    };
    let title = if form.sponsor_id.is_some() {
        "Edit sponsor"
    } else {
        "New sponsor"
    };
    draw_local_form(frame, centered_column(area, 70), title, form, "Save");
}
