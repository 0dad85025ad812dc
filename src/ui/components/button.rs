//! Boxed buttons

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Button height in rows (top border + content + bottom border)
pub const BUTTON_HEIGHT: u16 = 3;

/// Render a bordered button; `accent` colors the selected state
pub fn render_button(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    is_selected: bool,
    accent: Color,
) {
    let (border_style, text_style) = if is_selected {
        (
            Style::default().fg(accent),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        )
    } else {
        (Style::default().fg(Color::DarkGray), Style::default())
    };

    let paragraph = Paragraph::new(format!(" {label} "))
        .style(text_style)
        .centered()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style),
        );
    frame.render_widget(paragraph, area);
}

/// Navigation entry with its shortcut key
pub fn render_sidebar_button(frame: &mut Frame, area: Rect, key: &str, label: &str, is_active: bool) {
    let content = format!("{key} {label}");
    render_button(frame, area, &content, is_active, Color::Cyan);
}
