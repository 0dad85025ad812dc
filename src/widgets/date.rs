//! Date entry
//!
//! Answers are stored as ISO dates (`YYYY-MM-DD`) and shown in the configured
//! display format. Text that is not yet a complete date in that format is
//! stored as typed so validation can flag it.

use super::{edit_text, WidgetInput, WidgetProps};
use chrono::NaiveDate;
use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
};
use serde_json::Value;

const ISO_FORMAT: &str = "%Y-%m-%d";

/// The stored answer as the applicant sees it
pub fn display_text(stored: &str, date_format: &str) -> String {
    match NaiveDate::parse_from_str(stored, ISO_FORMAT) {
        Ok(date) => date.format(date_format).to_string(),
        Err(_) => stored.to_string(),
    }
}

/// What to store for text typed in the display format
pub fn stored_text(typed: &str, date_format: &str) -> String {
    match NaiveDate::parse_from_str(typed, date_format) {
        Ok(date) if date.format(date_format).to_string() == typed => {
            date.format(ISO_FORMAT).to_string()
        }
        _ => typed.to_string(),
    }
}

pub fn render(props: &WidgetProps<'_>) -> Vec<Line<'static>> {
    let shown = display_text(props.text(), props.date_format);
    let mut spans = Vec::new();

    if shown.is_empty() && !props.focused {
        spans.push(Span::styled(
            props
                .options
                .placeholder
                .clone()
                .unwrap_or_else(|| props.date_format.replace('%', "")),
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        spans.push(Span::raw(shown));
    }
    if props.focused {
        spans.push(Span::styled("▌", Style::default().fg(Color::Cyan)));
    }
    vec![Line::from(spans)]
}

pub fn handle_input(
    props: &WidgetProps<'_>,
    input: WidgetInput,
    on_change: &mut dyn FnMut(Option<Value>),
) {
    let shown = display_text(props.text(), props.date_format);
    let Some(next) = edit_text(&shown, &input, props.options) else {
        return;
    };
    on_change(next.map(|value| match value {
        Value::String(typed) => Value::String(stored_text(&typed, props.date_format)),
        other => other,
    }));
}
