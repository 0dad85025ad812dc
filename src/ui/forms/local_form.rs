//! Stacked boxed fields with a submit button

use super::field_renderer::{draw_field, field_height};
use crate::state::Form;
use crate::ui::components::{render_button, BUTTON_HEIGHT};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::Paragraph,
    Frame,
};

pub fn draw_local_form(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    form: &dyn Form,
    submit_label: &str,
) {
    let fields = form.fields();
    let active = form.active_field();

    let mut constraints = vec![Constraint::Length(2)];
    constraints.extend(fields.iter().map(|f| Constraint::Length(field_height(f))));
    constraints.push(Constraint::Length(BUTTON_HEIGHT));
    constraints.push(Constraint::Min(0));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    frame.render_widget(
        Paragraph::new(Span::styled(
            title.to_string(),
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        )),
        chunks[0],
    );

    for (idx, field) in fields.iter().enumerate() {
        draw_field(frame, chunks[idx + 1], field, idx == active);
    }

    render_button(
        frame,
        chunks[fields.len() + 1],
        submit_label,
        form.is_buttons_row_active(),
        Color::Green,
    );
}
