//! Applicant dashboard with the application status

use crate::app::App;
use crate::state::ApplicationStatus;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

fn status_color(status: ApplicationStatus) -> Color {
    match status {
        ApplicationStatus::Draft => Color::Yellow,
        ApplicationStatus::Submitted => Color::Cyan,
        ApplicationStatus::Admitted => Color::Green,
        ApplicationStatus::Waitlisted => Color::Magenta,
        ApplicationStatus::Rejected => Color::Red,
        ApplicationStatus::Unknown => Color::Gray,
    }
}

fn status_blurb(status: ApplicationStatus) -> &'static str {
    match status {
        ApplicationStatus::Draft => {
            "Your application is not submitted yet. Press Enter to continue it."
        }
        ApplicationStatus::Submitted => {
            "Your application is in. We will email you once a decision is made."
        }
        ApplicationStatus::Admitted => "Congratulations, you're in! See you at the event.",
        ApplicationStatus::Waitlisted => {
            "You're on the waitlist. We'll let you know if a spot opens up."
        }
        ApplicationStatus::Rejected => {
            "We couldn't offer you a spot this time. Thanks for applying."
        }
        ApplicationStatus::Unknown => {
            "Your application is being processed. Contact the organizers if this persists."
        }
    }
}

pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" Dashboard ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let Some(profile) = &app.state.profile else {
        let text = if app.state.is_loading() {
            "Loading…"
        } else {
            "No profile loaded. Press 'r' to retry."
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
    let lines = vec![
        Line::from(vec![
            Span::styled("Email:  ", label),
            Span::raw(profile.email.clone()),
        ]),
        Line::from(vec![
            Span::styled("Status: ", label),
            Span::styled(
                profile.status.label(),
                Style::default()
                    .fg(status_color(profile.status))
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
        Line::from(status_blurb(profile.status)),
    ];

    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: true }).block(block),
        area,
    );
}
