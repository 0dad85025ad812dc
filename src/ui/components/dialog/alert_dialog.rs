//! Blocking alert, e.g. a rejected upload

use super::base::{render_dialog, DialogConfig};
use ratatui::{style::Color, Frame};

pub fn render_alert_dialog(frame: &mut Frame, message: &str) {
    render_dialog(
        frame,
        DialogConfig {
            title: "Alert",
            accent: Color::Yellow,
            message,
            max_width: 50,
        },
    );
}
