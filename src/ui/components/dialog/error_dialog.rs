//! Error dialog component

use super::base::{render_dialog, DialogConfig};
use ratatui::{style::Color, Frame};

/// Render the front of the error queue
pub fn render_error_dialog(frame: &mut Frame, error_message: &str) {
    render_dialog(
        frame,
        DialogConfig {
            title: "Error",
            accent: Color::Red,
            message: error_message,
            max_width: 60,
        },
    );
}
