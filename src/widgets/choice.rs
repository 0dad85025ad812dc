//! Text inputs and option pickers

use super::{edit_text, WidgetInput, WidgetProps};
use crate::schema::FieldKind;
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use serde_json::{Number, Value};

/// Options shown at once by open lists
const LIST_WINDOW: usize = 7;
const MAX_SUGGESTIONS: usize = 8;

fn cursor_span(props: &WidgetProps<'_>) -> Option<Span<'static>> {
    props
        .focused
        .then(|| Span::styled("▌", Style::default().fg(Color::Cyan)))
}

fn option_style(props: &WidgetProps<'_>, index: usize) -> Style {
    if props.focused && index == props.cursor {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

/// Indices of the options to draw so the cursor stays visible
fn window(len: usize, cursor: usize) -> std::ops::Range<usize> {
    if len <= LIST_WINDOW {
        return 0..len;
    }
    let start = cursor.saturating_sub(LIST_WINDOW / 2).min(len - LIST_WINDOW);
    start..start + LIST_WINDOW
}

fn value_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

pub fn render_text(props: &WidgetProps<'_>) -> Vec<Line<'static>> {
    let text = value_text(props.value);
    let mut spans = Vec::new();
    if text.is_empty() && !props.focused {
        let placeholder = props.options.placeholder.clone().unwrap_or_default();
        spans.push(Span::styled(placeholder, Style::default().fg(Color::DarkGray)));
    } else {
        spans.push(Span::raw(text));
    }
    spans.extend(cursor_span(props));
    vec![Line::from(spans)]
}

/// Free text. Number fields store a JSON number once the text parses as one.
pub fn handle_text(
    props: &WidgetProps<'_>,
    input: WidgetInput,
    on_change: &mut dyn FnMut(Option<Value>),
) {
    let current = value_text(props.value);
    let Some(next) = edit_text(&current, &input, props.options) else {
        return;
    };
    if props.field.kind != FieldKind::Number {
        on_change(next);
        return;
    }
    on_change(next.map(|value| match value {
        Value::String(text) => parse_number(&text).unwrap_or(Value::String(text)),
        other => other,
    }));
}

fn parse_number(text: &str) -> Option<Value> {
    if let Ok(int) = text.parse::<i64>() {
        return Some(Value::Number(int.into()));
    }
    // "1." stays text until the fraction is typed
    if text.ends_with('.') {
        return None;
    }
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}

pub fn render_select(props: &WidgetProps<'_>) -> Vec<Line<'static>> {
    let options = props.field.options();
    let selected = props.text();

    if !props.focused {
        let shown = if selected.is_empty() {
            Span::styled("Select…", Style::default().fg(Color::DarkGray))
        } else {
            Span::raw(selected.to_string())
        };
        return vec![Line::from(vec![Span::raw("▾ "), shown])];
    }

    window(options.len(), props.cursor)
        .map(|i| {
            let mark = if options[i] == selected { "(•) " } else { "( ) " };
            Line::from(Span::styled(
                format!("{mark}{}", options[i]),
                option_style(props, i),
            ))
        })
        .collect()
}

pub fn handle_select(
    props: &WidgetProps<'_>,
    input: WidgetInput,
    on_change: &mut dyn FnMut(Option<Value>),
) {
    if input != WidgetInput::Toggle {
        return;
    }
    if let Some(option) = props.field.options().get(props.cursor) {
        on_change(Some(Value::String(option.clone())));
    }
}

pub fn render_checkbox(props: &WidgetProps<'_>) -> Vec<Line<'static>> {
    let checked = props.value.and_then(Value::as_bool).unwrap_or(false);
    let mark = if checked { "[x] " } else { "[ ] " };
    let style = if props.focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    vec![Line::from(Span::styled(
        format!("{mark}{}", props.field.label()),
        style,
    ))]
}

pub fn handle_checkbox(
    props: &WidgetProps<'_>,
    input: WidgetInput,
    on_change: &mut dyn FnMut(Option<Value>),
) {
    if input == WidgetInput::Toggle {
        let checked = props.value.and_then(Value::as_bool).unwrap_or(false);
        on_change(Some(Value::Bool(!checked)));
    }
}

fn checked_items(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

pub fn render_checkboxes(props: &WidgetProps<'_>) -> Vec<Line<'static>> {
    let options = props.field.options();
    let checked = checked_items(props.value);
    let range = if props.focused {
        window(options.len(), props.cursor)
    } else {
        0..options.len()
    };

    range
        .map(|i| {
            let mark = if checked.contains(&options[i]) {
                "[x] "
            } else {
                "[ ] "
            };
            Line::from(Span::styled(
                format!("{mark}{}", options[i]),
                option_style(props, i),
            ))
        })
        .collect()
}

/// Toggle the option under the cursor. Checked items keep the order of the
/// options list; unchecking the last item stores an empty list.
pub fn handle_checkboxes(
    props: &WidgetProps<'_>,
    input: WidgetInput,
    on_change: &mut dyn FnMut(Option<Value>),
) {
    if input != WidgetInput::Toggle {
        return;
    }
    let options = props.field.options();
    let Some(target) = options.get(props.cursor) else {
        return;
    };

    let mut checked = checked_items(props.value);
    if let Some(pos) = checked.iter().position(|c| c == target) {
        checked.remove(pos);
    } else {
        checked.push(target.clone());
    }
    checked.sort_by_key(|c| options.iter().position(|o| o == c).unwrap_or(usize::MAX));

    on_change(Some(Value::Array(
        checked.into_iter().map(Value::String).collect(),
    )));
}

/// Options containing the typed text, case-insensitively
pub fn suggestions<'a>(props: &WidgetProps<'a>) -> Vec<&'a str> {
    let typed = props.text().trim().to_lowercase();
    if typed.is_empty() {
        return Vec::new();
    }
    props
        .field
        .options()
        .iter()
        .filter(|option| option.to_lowercase().contains(&typed))
        .take(MAX_SUGGESTIONS)
        .map(String::as_str)
        .collect()
}

pub fn render_typeahead(props: &WidgetProps<'_>) -> Vec<Line<'static>> {
    let mut lines = render_text(props);
    if !props.focused {
        return lines;
    }
    for (i, suggestion) in suggestions(props).into_iter().enumerate() {
        if suggestion == props.text() {
            continue;
        }
        lines.push(Line::from(Span::styled(
            format!("  {suggestion}"),
            option_style(props, i),
        )));
    }
    lines
}

/// Typing edits the answer freely; Toggle takes the highlighted suggestion.
pub fn handle_typeahead(
    props: &WidgetProps<'_>,
    input: WidgetInput,
    on_change: &mut dyn FnMut(Option<Value>),
) {
    if input == WidgetInput::Toggle {
        if let Some(pick) = suggestions(props).get(props.cursor) {
            on_change(Some(Value::String(pick.to_string())));
        }
        return;
    }
    if let Some(next) = edit_text(props.text(), &input, props.options) {
        on_change(next);
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{field, flatten, props};
    use super::*;
    use crate::schema::{FieldDef, UiOptions};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn levels() -> FieldDef {
        field(
            "level",
            FieldKind::Select {
                options: vec!["Undergraduate".into(), "Graduate".into(), "Other".into()],
            },
        )
    }

    fn race() -> FieldDef {
        field(
            "race",
            FieldKind::MultiSelect {
                options: vec!["A".into(), "B".into(), "Prefer not to say".into()],
            },
        )
    }

    fn collect(
        handler: fn(&WidgetProps<'_>, WidgetInput, &mut dyn FnMut(Option<Value>)),
        p: &WidgetProps<'_>,
        input: WidgetInput,
    ) -> Vec<Option<Value>> {
        let mut changes = Vec::new();
        handler(p, input, &mut |v: Option<Value>| changes.push(v));
        changes
    }

    #[test]
    fn test_select_picks_option_under_cursor() {
        let def = levels();
        let options = UiOptions::default();
        let mut p = props(&def, &options, None);
        p.cursor = 1;
        assert_eq!(
            collect(handle_select, &p, WidgetInput::Toggle),
            vec![Some(json!("Graduate"))]
        );
        assert!(collect(handle_select, &p, WidgetInput::Char('x')).is_empty());
    }

    #[test]
    fn test_select_collapsed_when_unfocused() {
        let def = levels();
        let options = UiOptions::default();
        let value = json!("Graduate");
        let mut p = props(&def, &options, Some(&value));
        p.focused = false;
        assert_eq!(flatten(&render_select(&p)), "▾ Graduate");
        p.focused = true;
        assert_eq!(render_select(&p).len(), 3);
    }

    #[test]
    fn test_checkbox_flips() {
        let def = field("accept_terms", FieldKind::Boolean);
        let options = UiOptions::default();
        let value = json!(true);
        let p = props(&def, &options, Some(&value));
        assert_eq!(
            collect(handle_checkbox, &p, WidgetInput::Toggle),
            vec![Some(json!(false))]
        );
        let unset = props(&def, &options, None);
        assert_eq!(
            collect(handle_checkbox, &unset, WidgetInput::Toggle),
            vec![Some(json!(true))]
        );
    }

    #[test]
    fn test_checkboxes_keep_option_order() {
        let def = race();
        let options = UiOptions::default();
        let value = json!(["Prefer not to say"]);
        let p = props(&def, &options, Some(&value));
        assert_eq!(
            collect(handle_checkboxes, &p, WidgetInput::Toggle),
            vec![Some(json!(["A", "Prefer not to say"]))]
        );
    }

    #[test]
    fn test_unchecking_last_item_stores_empty_list() {
        let def = race();
        let options = UiOptions::default();
        let value = json!(["A"]);
        let p = props(&def, &options, Some(&value));
        assert_eq!(
            collect(handle_checkboxes, &p, WidgetInput::Toggle),
            vec![Some(json!([]))]
        );
    }

    #[test]
    fn test_render_checkboxes_marks() {
        let def = race();
        let options = UiOptions::default();
        let value = json!(["B"]);
        let mut p = props(&def, &options, Some(&value));
        p.focused = false;
        assert_eq!(
            flatten(&render_checkboxes(&p)),
            "[ ] A\n[x] B\n[ ] Prefer not to say"
        );
    }

    #[test]
    fn test_number_field_stores_numbers() {
        let def = field("age", FieldKind::Number);
        let options = UiOptions::default();
        let value = json!(2);
        let p = props(&def, &options, Some(&value));
        assert_eq!(
            collect(handle_text, &p, WidgetInput::Char('1')),
            vec![Some(json!(21))]
        );
        assert_eq!(
            collect(handle_text, &p, WidgetInput::Char('.')),
            vec![Some(json!("2."))]
        );
    }

    #[test]
    fn test_text_field_stores_strings() {
        let def = field("first_name", FieldKind::Text);
        let options = UiOptions::default();
        let p = props(&def, &options, None);
        assert_eq!(
            collect(handle_text, &p, WidgetInput::Char('7')),
            vec![Some(json!("7"))]
        );
    }

    #[test]
    fn test_typeahead_suggestions_and_pick() {
        let def = field(
            "university",
            FieldKind::Select {
                options: vec![
                    "Stanford University".into(),
                    "Stony Brook University".into(),
                    "MIT".into(),
                ],
            },
        );
        let options = UiOptions::default();
        let value = json!("st");
        let mut p = props(&def, &options, Some(&value));

        assert_eq!(
            suggestions(&p),
            vec!["Stanford University", "Stony Brook University"]
        );
        p.cursor = 1;
        assert_eq!(
            collect(handle_typeahead, &p, WidgetInput::Toggle),
            vec![Some(json!("Stony Brook University"))]
        );
        assert_eq!(
            collect(handle_typeahead, &p, WidgetInput::Char('a')),
            vec![Some(json!("sta"))]
        );
    }

    #[test]
    fn test_window_follows_cursor() {
        assert_eq!(window(3, 2), 0..3);
        assert_eq!(window(20, 0), 0..7);
        assert_eq!(window(20, 10), 7..14);
        assert_eq!(window(20, 19), 13..20);
    }
}
