//! Signed-out pages: sign in, sign up and password reset

use super::forms::draw_local_form;
use super::widgets::centered_column;
use crate::app::App;
use crate::state::AuthPage;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

const COLUMN_WIDTH: u16 = 60;

fn submit_label(page: AuthPage) -> &'static str {
    match page {
        AuthPage::SignIn => "Sign in",
        AuthPage::SignUp => "Create account",
        AuthPage::ForgotPassword => "Send reset code",
        AuthPage::ForgotPasswordSubmit => "Change password",
    }
}

pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let column = centered_column(area, COLUMN_WIDTH);
    let auth = &app.state.auth;

    let mut notice: Vec<Line> = Vec::new();
    if !auth.message.is_empty() {
        notice.push(Line::from(Span::styled(
            auth.message.clone(),
            Style::default().fg(Color::Green),
        )));
    }
    if !auth.error.is_empty() {
        notice.push(Line::from(Span::styled(
            auth.error.clone(),
            Style::default().fg(Color::Red),
        )));
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(if notice.is_empty() { 0 } else { 3 }),
            Constraint::Min(0),
        ])
        .split(column);

    let heading = Paragraph::new(Line::from(Span::styled(
        "Hackathon application portal",
        Style::default()
            .fg(Color::Magenta)
            .add_modifier(Modifier::BOLD),
    )))
    .centered()
    .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(heading, chunks[0]);

    if !notice.is_empty() {
        frame.render_widget(Paragraph::new(notice).wrap(Wrap { trim: true }), chunks[1]);
    }

    if let Some(form) = app.state.form.as_form() {
        draw_local_form(
            frame,
            chunks[2],
            auth.page.title(),
            form,
            submit_label(auth.page),
        );
    }
}
