//! Word-counted textarea
//!
//! The count under the input is informational only; typing past the limit is
//! allowed and the limit is enforced when the form is validated.

use super::{edit_text, WidgetInput, WidgetProps};
use crate::schema::count_words;
use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
};
use serde_json::Value;

const CURSOR: &str = "▌";

/// `<count> / <limit> words`
pub fn word_count_label(text: &str, limit: u32) -> String {
    format!("{} / {} words", count_words(text), limit)
}

pub fn render(props: &WidgetProps<'_>) -> Vec<Line<'static>> {
    let text = props.text();
    let mut lines: Vec<Line<'static>> = if text.is_empty() && !props.focused {
        let placeholder = props.options.placeholder.as_deref().unwrap_or("(empty)");
        vec![Line::from(Span::styled(
            placeholder.to_string(),
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        text.split('\n').map(|l| Line::from(l.to_string())).collect()
    };

    if props.focused {
        if let Some(last) = lines.last_mut() {
            last.spans
                .push(Span::styled(CURSOR, Style::default().fg(Color::Cyan)));
        }
    }

    let rows = props.options.rows.unwrap_or(1) as usize;
    while lines.len() < rows {
        lines.push(Line::from(""));
    }

    if let Some(limit) = props.field.word_count {
        let over = count_words(text) > limit as usize;
        let color = if over { Color::Red } else { Color::DarkGray };
        lines.push(Line::from(Span::styled(
            word_count_label(text, limit),
            Style::default().fg(color),
        )));
    }

    lines
}

pub fn handle_input(
    props: &WidgetProps<'_>,
    input: WidgetInput,
    on_change: &mut dyn FnMut(Option<Value>),
) {
    if let Some(next) = edit_text(props.text(), &input, props.options) {
        on_change(next);
    }
}
