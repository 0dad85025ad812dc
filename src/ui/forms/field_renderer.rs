//! Field rendering utilities for forms

use crate::state::{FieldEntry, FormField};
use crate::widgets::WidgetProps;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Rows a boxed local-form field takes
pub fn field_height(field: &FormField) -> u16 {
    if field.is_multiline {
        6
    } else {
        3
    }
}

/// Draw a boxed local-form field
pub fn draw_field(frame: &mut Frame, area: Rect, field: &FormField, is_active: bool) {
    let accent = if is_active { Color::Cyan } else { Color::DarkGray };

    let display_value = field.display_value();
    let mut lines: Vec<Line> = if display_value.is_empty() && !is_active {
        vec![Line::from(Span::styled(
            "(empty)",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        display_value
            .split('\n')
            .map(|l| Line::from(l.to_string()))
            .collect()
    };
    if is_active {
        let cursor = Span::styled("▌", Style::default().fg(Color::Cyan));
        match lines.last_mut() {
            Some(last) => last.spans.push(cursor),
            None => lines.push(Line::from(cursor)),
        }
    }

    let block = Block::default()
        .title(format!(" {} ", field.label))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent));

    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }).block(block),
        area,
    );
}

/// Lines for one schema field: label, description, widget output and errors
pub fn entry_lines(
    entry: &FieldEntry,
    props: &WidgetProps<'_>,
    errors: &[String],
) -> Vec<Line<'static>> {
    let indent = "  ".repeat(entry.depth);
    let mut lines = Vec::new();

    if !entry.widget.renders_own_label() {
        let label_style = if props.focused {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        let mut spans = vec![
            Span::raw(indent.clone()),
            Span::styled(entry.field.label().to_string(), label_style),
        ];
        if entry.required {
            spans.push(Span::styled("*", Style::default().fg(Color::Red)));
        }
        lines.push(Line::from(spans));

        if let Some(description) = &entry.field.description {
            lines.push(Line::from(vec![
                Span::raw(indent.clone()),
                Span::styled(description.clone(), Style::default().fg(Color::Gray)),
            ]));
        }
    }

    for line in entry.widget.render(props) {
        let mut spans = vec![Span::raw(format!("{indent}  "))];
        spans.extend(line.spans);
        lines.push(Line::from(spans).style(line.style));
    }

    for error in errors {
        lines.push(Line::from(vec![
            Span::raw(format!("{indent}  ")),
            Span::styled(format!("• {error}"), Style::default().fg(Color::Red)),
        ]));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDef, FieldKind, UiOptions};
    use crate::widgets::Widget;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn entry(widget: Widget, required: bool) -> FieldEntry {
        FieldEntry {
            path: vec!["first_name".into()],
            id: "first_name".into(),
            depth: 0,
            field: FieldDef {
                name: "first_name".into(),
                kind: FieldKind::Text,
                title: Some("First name".into()),
                description: Some("As on your ID".into()),
                custom_description: None,
                word_count: None,
            },
            options: UiOptions::default(),
            widget,
            required,
        }
    }

    fn text(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_entry_lines_label_value_and_errors() {
        let entry = entry(Widget::TextInput, true);
        let value = json!("Ada");
        let props = WidgetProps {
            id: "first_name",
            value: Some(&value),
            field: &entry.field,
            options: &entry.options,
            readonly: false,
            disabled: false,
            required: true,
            focused: false,
            cursor: 0,
            pending: "",
            date_format: "%Y-%m-%d",
        };

        let lines = entry_lines(&entry, &props, &["is a required property".to_string()]);

        assert_eq!(
            text(&lines),
            vec![
                "First name*",
                "As on your ID",
                "  Ada",
                "  • is a required property"
            ]
        );
    }
}
