//! Layout components (navigation sidebar, status bar)

use super::components::{render_sidebar_button, BUTTON_HEIGHT};
use crate::app::App;
use crate::platform::{COPY_SHORTCUT, SAVE_SHORTCUT, SUBMIT_SHORTCUT};
use crate::state::{AdminTab, AuthPage, View};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

const SIDEBAR_WIDTH: u16 = 20;

/// Split the screen into sidebar and content, leaving the last row for the status bar
pub fn create_layout(area: Rect) -> (Rect, Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
        .split(rows[0]);

    (columns[0], columns[1])
}

/// Full-width content area for the signed-out pages
pub fn create_layout_no_sidebar(area: Rect) -> Rect {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area)[0]
}

/// Draw the navigation entries for the user's roles
pub fn draw_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let items = app.nav_items();

    let mut constraints = vec![Constraint::Length(2)];
    constraints.extend(items.iter().map(|_| Constraint::Length(BUTTON_HEIGHT)));
    constraints.push(Constraint::Min(0));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let title = Paragraph::new(Line::from(Span::styled(
        "HACKPORTAL",
        Style::default()
            .fg(Color::Magenta)
            .add_modifier(Modifier::BOLD),
    )))
    .centered();
    frame.render_widget(title, chunks[0]);

    for (idx, item) in items.iter().enumerate() {
        let is_active = item.is_active(
            &app.state.current_view,
            &app.state.view_params,
            &app.config.form_name,
        );
        render_sidebar_button(
            frame,
            chunks[idx + 1],
            &format!("F{}", idx + 1),
            item.label(),
            is_active,
        );
    }
}

/// Draw the status bar
pub fn draw_status_bar(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let status_area = Rect {
        x: 0,
        y: area.height.saturating_sub(1),
        width: area.width,
        height: 1,
    };

    let mut spans = vec![if app.state.api_connected {
        Span::styled(" ● ", Style::default().fg(Color::Green))
    } else {
        Span::styled(" ○ ", Style::default().fg(Color::Red))
    }];

    if app.state.is_loading() {
        spans.push(Span::styled(
            "loading… ",
            Style::default().fg(Color::Yellow),
        ));
    }

    spans.push(Span::styled(
        view_hints(app),
        Style::default().fg(Color::Gray),
    ));

    if let Some(msg) = &app.state.status_message {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(msg, Style::default().fg(Color::Green)));
    }
    if let Some(msg) = &app.copy_message {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(msg, Style::default().fg(Color::Green)));
    }
    if let Some(user) = &app.state.auth.user_id {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(user, Style::default().fg(Color::Blue)));
    }

    let status = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status, status_area);

    let quit_hint = " ^C^C:quit ";
    let quit_area = Rect {
        x: area.width.saturating_sub(quit_hint.len() as u16),
        y: area.height.saturating_sub(1),
        width: (quit_hint.len() as u16).min(area.width),
        height: 1,
    };
    let quit_widget =
        Paragraph::new(quit_hint).style(Style::default().bg(Color::DarkGray).fg(Color::Gray));
    frame.render_widget(quit_widget, quit_area);
}

/// Keyboard hints for the current view
fn view_hints(app: &App) -> String {
    match app.state.current_view {
        View::Auth => match app.state.auth.page {
            AuthPage::SignIn => "Tab:next  Enter:sign in  ^N:create account  ^F:forgot password"
                .to_string(),
            _ => "Tab:next  Enter:submit  Esc:back to sign in".to_string(),
        },
        View::Dashboard => "Enter:application  r:refresh".to_string(),
        View::Form => {
            if app.form_page.widget_set() == crate::widgets::WidgetSet::ReadOnly {
                format!("Tab:next  ↑/↓:links  {COPY_SHORTCUT}:copy link  Esc:back")
            } else {
                format!(
                    "Tab:next  Space:select  {SAVE_SHORTCUT}:save  {SUBMIT_SHORTCUT}:submit  Esc:back"
                )
            }
        }
        View::Admin => match app.state.admin_tab {
            AdminTab::BulkStatus => "Tab:next  ←/→:status  Enter:apply  Esc:table".to_string(),
            _ => "Tab:tab  j/k:nav  r:refresh".to_string(),
        },
        View::Sponsors => {
            if app.state.auth.roles.admin {
                "j/k:nav  Enter:view  n:new  r:refresh".to_string()
            } else {
                "j/k:nav  Enter:view  r:refresh".to_string()
            }
        }
        View::SponsorDetail => "e:edit  Esc:back".to_string(),
        View::SponsorEdit | View::AdminCreate => {
            format!("Tab:next  {SAVE_SHORTCUT}:save  Esc:cancel")
        }
    }
}
