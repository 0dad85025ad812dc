//! Field widgets
//!
//! A widget turns one field's answer into terminal lines and turns edit
//! events into `on_change` calls. Two widget sets exist: the interactive set
//! used while an application is a draft and the read-only set used once it has
//! been submitted. The set is chosen once per page, never per field.

mod choice;
mod date;
mod file;
mod linkify;
mod section_header;
mod textarea;

pub use file::{
    accept_upload, describe_data_uri, encode_file, mime_type_of, FileSummary, NOT_PDF_ALERT,
    NO_FILE, PDF_MIME,
};
pub use linkify::{commas_to_spaces, linkify, links, normalize_href, Link, Segment};
pub use textarea::word_count_label;

use crate::schema::{FieldDef, UiOptions, WidgetTag};
use crate::state::ApplicationStatus;
use ratatui::text::Line;
use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;

/// Errors a widget raises instead of reporting a change
#[derive(Debug, Error)]
pub enum WidgetError {
    /// The uploaded file is not a PDF; shown to the applicant as a blocking alert
    #[error("Uploaded file must be a PDF")]
    NotPdf,

    #[error("Could not read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Everything a widget needs to render or edit one field
#[derive(Debug, Clone, Copy)]
pub struct WidgetProps<'a> {
    /// Dotted field path, e.g. `address.city`
    pub id: &'a str,
    pub value: Option<&'a Value>,
    pub field: &'a FieldDef,
    pub options: &'a UiOptions,
    pub readonly: bool,
    pub disabled: bool,
    pub required: bool,
    pub focused: bool,
    /// Highlighted option (choice widgets) or link (linkified widgets)
    pub cursor: usize,
    /// Text typed but not yet committed, such as a file path awaiting upload
    pub pending: &'a str,
    /// chrono format used to display and read dates
    pub date_format: &'a str,
}

impl WidgetProps<'_> {
    /// Whether edit events should be ignored
    pub fn is_locked(&self) -> bool {
        self.readonly || self.disabled
    }

    pub fn text(&self) -> &str {
        self.value.and_then(Value::as_str).unwrap_or("")
    }
}

/// An edit event delivered to the focused widget
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetInput {
    Char(char),
    Newline,
    Backspace,
    /// Select or toggle the option under the cursor
    Toggle,
    /// An encoded file to store
    Upload(String),
}

/// Which widget table is active for the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetSet {
    Interactive,
    ReadOnly,
}

impl WidgetSet {
    pub fn for_status(status: ApplicationStatus) -> Self {
        if status.is_submitted() {
            Self::ReadOnly
        } else {
            Self::Interactive
        }
    }

    /// Resolve the renderer bound to a widget tag
    pub fn widget_for(self, tag: WidgetTag) -> Widget {
        match (self, tag) {
            (_, WidgetTag::SectionHeader) => Widget::SectionHeader,
            (_, WidgetTag::CustomDate) => Widget::Date,
            (Self::Interactive, WidgetTag::File) => Widget::FileInputAndPreview,
            (Self::ReadOnly, WidgetTag::File) => Widget::FilePreview,
            (Self::Interactive, WidgetTag::Textarea | WidgetTag::LinkArea) => {
                Widget::TextareaWordCounting
            }
            (Self::ReadOnly, WidgetTag::Textarea) => Widget::TextareaReadOnly,
            (Self::ReadOnly, WidgetTag::LinkArea) => Widget::LinkReadOnly,
            (_, WidgetTag::Typeahead) => Widget::Typeahead,
            (_, WidgetTag::Checkboxes) => Widget::Checkboxes,
            (_, WidgetTag::Checkbox) => Widget::Checkbox,
            (_, WidgetTag::Select) => Widget::Select,
            (_, WidgetTag::Text) => Widget::TextInput,
        }
    }
}

/// Concrete renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Widget {
    SectionHeader,
    Date,
    FileInputAndPreview,
    FilePreview,
    TextareaWordCounting,
    TextareaReadOnly,
    LinkReadOnly,
    TextInput,
    Select,
    Checkbox,
    Checkboxes,
    Typeahead,
}

impl Widget {
    /// Whether the field takes keyboard focus
    pub fn is_focusable(self) -> bool {
        !matches!(self, Self::SectionHeader)
    }

    /// Whether Enter inserts a newline rather than moving on
    pub fn is_multiline(self) -> bool {
        matches!(self, Self::TextareaWordCounting)
    }

    /// Whether the widget draws the field label itself
    pub fn renders_own_label(self) -> bool {
        matches!(self, Self::SectionHeader | Self::Checkbox)
    }

    /// Whether Space selects rather than types
    pub fn toggles_on_space(self) -> bool {
        matches!(self, Self::Select | Self::Checkbox | Self::Checkboxes)
    }

    /// Whether the widget uses the pending-text buffer
    pub fn takes_pending_input(self) -> bool {
        matches!(self, Self::FileInputAndPreview)
    }

    /// Number of selectable items under the cursor
    pub fn cursor_len(self, props: &WidgetProps<'_>) -> usize {
        match self {
            Self::Select | Self::Checkboxes => props.field.options().len(),
            Self::Typeahead => choice::suggestions(props).len(),
            Self::TextareaReadOnly => links(props.text()).len(),
            Self::LinkReadOnly => links(&commas_to_spaces(props.text())).len(),
            _ => 0,
        }
    }

    /// Link under the cursor, for linkified widgets
    pub fn focused_link(self, props: &WidgetProps<'_>) -> Option<Link> {
        let text = match self {
            Self::TextareaReadOnly => props.text().to_string(),
            Self::LinkReadOnly => commas_to_spaces(props.text()),
            _ => return None,
        };
        links(&text).into_iter().nth(props.cursor)
    }

    pub fn render(self, props: &WidgetProps<'_>) -> Vec<Line<'static>> {
        match self {
            Self::SectionHeader => section_header::render(props),
            Self::Date => date::render(props),
            Self::FileInputAndPreview => file::render_input_and_preview(props),
            Self::FilePreview => file::render_preview(props),
            Self::TextareaWordCounting => textarea::render(props),
            Self::TextareaReadOnly => linkify::render(props, false),
            Self::LinkReadOnly => linkify::render(props, true),
            Self::TextInput => choice::render_text(props),
            Self::Select => choice::render_select(props),
            Self::Checkbox => choice::render_checkbox(props),
            Self::Checkboxes => choice::render_checkboxes(props),
            Self::Typeahead => choice::render_typeahead(props),
        }
    }

    /// Apply an edit event. `on_change` receives the new answer (`None` unsets
    /// the field) and is never called for locked or display-only widgets.
    pub fn handle_input(
        self,
        props: &WidgetProps<'_>,
        input: WidgetInput,
        on_change: &mut dyn FnMut(Option<Value>),
    ) -> Result<(), WidgetError> {
        if props.is_locked() {
            return Ok(());
        }
        match self {
            Self::SectionHeader
            | Self::FilePreview
            | Self::TextareaReadOnly
            | Self::LinkReadOnly => {}
            Self::Date => date::handle_input(props, input, on_change),
            Self::FileInputAndPreview => {
                if let WidgetInput::Upload(encoded) = input {
                    accept_upload(encoded, on_change)?;
                }
            }
            Self::TextareaWordCounting => textarea::handle_input(props, input, on_change),
            Self::TextInput => choice::handle_text(props, input, on_change),
            Self::Select => choice::handle_select(props, input, on_change),
            Self::Checkbox => choice::handle_checkbox(props, input, on_change),
            Self::Checkboxes => choice::handle_checkboxes(props, input, on_change),
            Self::Typeahead => choice::handle_typeahead(props, input, on_change),
        }
        Ok(())
    }
}

/// Apply a text edit to `current`, returning the new answer.
/// Clearing the text reports the field's `empty_value`, or unsets it.
pub(crate) fn edit_text(
    current: &str,
    input: &WidgetInput,
    options: &UiOptions,
) -> Option<Option<Value>> {
    let mut text = current.to_string();
    match input {
        WidgetInput::Char(c) => text.push(*c),
        WidgetInput::Newline => text.push('\n'),
        WidgetInput::Backspace => {
            text.pop()?;
        }
        WidgetInput::Toggle | WidgetInput::Upload(_) => return None,
    }
    if text.is_empty() {
        Some(options.empty_value.clone())
    } else {
        Some(Some(Value::String(text)))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::WidgetProps;
    use crate::schema::{FieldDef, FieldKind, UiOptions};
    use serde_json::Value;

    pub fn field(name: &str, kind: FieldKind) -> FieldDef {
        FieldDef {
            name: name.to_string(),
            kind,
            title: Some(name.to_uppercase()),
            description: None,
            custom_description: None,
            word_count: None,
        }
    }

    pub fn props<'a>(
        field: &'a FieldDef,
        options: &'a UiOptions,
        value: Option<&'a Value>,
    ) -> WidgetProps<'a> {
        WidgetProps {
            id: &field.name,
            value,
            field,
            options,
            readonly: false,
            disabled: false,
            required: false,
            focused: true,
            cursor: 0,
            pending: "",
            date_format: "%Y-%m-%d",
        }
    }

    pub fn flatten(lines: &[ratatui::text::Line<'_>]) -> String {
        lines
            .iter()
            .map(|line| {
                line.spans
                    .iter()
                    .map(|span| span.content.as_ref())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
