//! Centered modal box shared by the error and alert dialogs

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

pub struct DialogConfig<'a> {
    pub title: &'a str,
    /// Title and border color
    pub accent: Color,
    /// Message body; `\n` starts a new paragraph
    pub message: &'a str,
    pub max_width: u16,
}

/// "Press Enter or Esc to dismiss"
pub fn dismiss_hint() -> Line<'static> {
    let key = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    Line::from(vec![
        Span::raw("Press "),
        Span::styled("Enter", key),
        Span::raw(" or "),
        Span::styled("Esc", key),
        Span::raw(" to dismiss"),
    ])
}

/// Render a centered dialog overlay with the dismiss hint at the bottom
pub fn render_dialog(frame: &mut Frame, config: DialogConfig) {
    let area = frame.area();
    // Borders plus one column of padding each side
    let chrome = 4u16;
    let max_width = config.max_width.min(area.width).max(chrome + 1);
    let lines = wrap_text(config.message, usize::from(max_width - chrome));

    let widest = lines
        .iter()
        .map(|l| l.chars().count())
        .chain([config.title.chars().count(), 27])
        .max()
        .unwrap_or(0) as u16;
    let width = (widest + chrome).min(max_width);
    // title, blank, message, blank, hint, borders
    let height = (lines.len() as u16 + 6).min(area.height);

    let dialog_area = Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    };
    frame.render_widget(Clear, dialog_area);

    let mut content = vec![
        Line::from(Span::styled(
            format!(" {}", config.title),
            Style::default()
                .fg(config.accent)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    content.extend(lines.into_iter().map(|l| Line::from(format!(" {l}"))));
    content.push(Line::from(""));
    let mut hint = dismiss_hint();
    hint.spans.insert(0, Span::raw(" "));
    content.push(hint);

    let dialog = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(config.accent))
            .style(Style::default().bg(Color::Black)),
    );
    frame.render_widget(dialog, dialog_area);
}

/// Greedy word wrap; words longer than `max_width` are split
pub fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let max_width = max_width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let mut word: String = word.to_string();
            while word.chars().count() > max_width {
                if !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                }
                let head: String = word.chars().take(max_width).collect();
                word = word.chars().skip(max_width).collect();
                lines.push(head);
            }
            let needed = line.chars().count() + word.chars().count() + usize::from(!line.is_empty());
            if needed > max_width && !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(&word);
        }
        lines.push(line);
    }
    lines
}
