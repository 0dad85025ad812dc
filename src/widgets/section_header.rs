//! Section header: a heading with an optional description and no value

use super::WidgetProps;
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

pub fn render(props: &WidgetProps<'_>) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        props.field.label().to_string(),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ))];

    if let Some(description) = &props.field.custom_description {
        for text in description.lines() {
            lines.push(Line::from(Span::styled(
                text.to_string(),
                Style::default().fg(Color::Gray),
            )));
        }
    }

    lines
}
