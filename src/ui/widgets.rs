//! Reusable UI widget helpers

use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{List, ListState},
    Frame,
};

/// Render a list that keeps the selected row in view
pub fn render_scrollable_list(frame: &mut Frame, area: Rect, list: List, selected_index: usize) {
    let mut list_state = ListState::default().with_selected(Some(selected_index));
    frame.render_stateful_widget(list, area, &mut list_state);
}

/// A `width` wide column centered in `area`
pub fn centered_column(area: Rect, width: u16) -> Rect {
    let [column] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(area);
    column
}
