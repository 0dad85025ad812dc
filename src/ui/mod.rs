//! UI module for rendering the TUI

mod admin;
mod auth;
mod components;
mod dashboard;
mod forms;
mod layout;
mod sponsors;
mod widgets;

use crate::app::App;
use crate::state::View;
use components::{render_alert_dialog, render_error_dialog};
use ratatui::Frame;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    if app.state.current_view == View::Auth {
        let main_area = layout::create_layout_no_sidebar(area);
        auth::draw(frame, main_area, app);
    } else {
        let (sidebar_area, main_area) = layout::create_layout(area);
        layout::draw_sidebar(frame, sidebar_area, app);

        match &app.state.current_view {
            View::Auth => {}
            View::Dashboard => dashboard::draw(frame, main_area, app),
            View::Form => forms::draw_application_form(frame, main_area, app),
            View::Admin => admin::draw(frame, main_area, app),
            View::AdminCreate => admin::draw_create(frame, main_area, app),
            View::Sponsors => sponsors::draw_list(frame, main_area, app),
            View::SponsorDetail => sponsors::draw_detail(frame, main_area, app),
            View::SponsorEdit => sponsors::draw_edit(frame, main_area, app),
        }
    }

    layout::draw_status_bar(frame, app);

    // Modals last so they sit on top
    if let Some(message) = &app.state.alert {
        render_alert_dialog(frame, message);
    } else if let Some(message) = app.state.current_error() {
        render_error_dialog(frame, message);
    }
}
