//! Schema-driven application form
//!
//! Holds the effective (visibility-applied) documents, the applicant's
//! answers and the focus state of the rendered field list.

use crate::schema::{
    apply_visibility, validate_form, ErrorCollector, FieldDef, FieldKind, FormData, Schema,
    UiOptions, UiSchema, HIDDEN_CLASS,
};
use crate::state::ApplicationStatus;
use crate::widgets::{encode_file, Widget, WidgetError, WidgetInput, WidgetProps, WidgetSet};
use serde_json::Value;
use std::path::PathBuf;

/// Buttons under a draft application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormButton {
    SaveForLater,
    #[default]
    Submit,
}

impl FormButton {
    pub fn label(&self) -> &'static str {
        match self {
            Self::SaveForLater => "Save for later",
            Self::Submit => "Submit",
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            Self::SaveForLater => Self::Submit,
            Self::Submit => Self::SaveForLater,
        }
    }
}

/// One rendered row of the form
#[derive(Debug, Clone, PartialEq)]
pub struct FieldEntry {
    pub path: Vec<String>,
    /// Dotted path, the key used by validation errors
    pub id: String,
    /// Nesting level for object fields
    pub depth: usize,
    pub field: FieldDef,
    pub options: UiOptions,
    pub widget: Widget,
    pub required: bool,
}

#[derive(Debug, Clone)]
pub struct ApplicationForm {
    pub schema: Schema,
    pub ui_schema: UiSchema,
    pub data: FormData,
    pub widget_set: WidgetSet,
    pub errors: ErrorCollector,
    entries: Vec<FieldEntry>,
    /// Focused entry; `entries.len()` is the buttons row
    pub active: usize,
    /// Option or link under the cursor in the focused widget
    pub cursor: usize,
    /// Text typed into the focused widget's side buffer (file path)
    pub pending: String,
    pub button: FormButton,
    pub scroll_offset: usize,
}

impl ApplicationForm {
    pub fn new(
        schema: &Schema,
        ui_schema: &UiSchema,
        shown_fields: Option<&[String]>,
        data: FormData,
        status: ApplicationStatus,
    ) -> Self {
        let (schema, ui_schema) = apply_visibility(schema, ui_schema, shown_fields);
        let widget_set = WidgetSet::for_status(status);

        let mut entries = Vec::new();
        collect_entries(&schema, &ui_schema, widget_set, &[], &mut entries);

        let mut form = Self {
            schema,
            ui_schema,
            data,
            widget_set,
            errors: ErrorCollector::new(),
            entries,
            active: 0,
            cursor: 0,
            pending: String::new(),
            button: FormButton::default(),
            scroll_offset: 0,
        };
        form.active = form.first_focusable().unwrap_or(0);
        form
    }

    /// Swap the widget set after a status change (e.g. once submitted)
    pub fn set_status(&mut self, status: ApplicationStatus) {
        let widget_set = WidgetSet::for_status(status);
        if widget_set == self.widget_set {
            return;
        }
        self.widget_set = widget_set;
        self.entries.clear();
        collect_entries(&self.schema, &self.ui_schema, widget_set, &[], &mut self.entries);
        let first = self.first_focusable().unwrap_or(0);
        self.focus(first);
    }

    pub fn entries(&self) -> &[FieldEntry] {
        &self.entries
    }

    pub fn is_read_only(&self) -> bool {
        self.widget_set == WidgetSet::ReadOnly
    }

    pub fn active_entry(&self) -> Option<&FieldEntry> {
        self.entries.get(self.active)
    }

    pub fn is_buttons_row_active(&self) -> bool {
        !self.is_read_only() && self.active == self.entries.len()
    }

    /// Props for rendering entry `index`
    pub fn props<'a>(&'a self, index: usize, date_format: &'a str) -> Option<WidgetProps<'a>> {
        let entry = self.entries.get(index)?;
        let focused = index == self.active;
        Some(WidgetProps {
            id: &entry.id,
            value: self.data.get_path(&entry.path),
            field: &entry.field,
            options: &entry.options,
            readonly: self.is_read_only(),
            disabled: false,
            required: entry.required,
            focused,
            cursor: if focused { self.cursor } else { 0 },
            pending: if focused { &self.pending } else { "" },
            date_format,
        })
    }

    fn first_focusable(&self) -> Option<usize> {
        self.entries.iter().position(|e| e.widget.is_focusable())
    }

    /// Number of focus stops: focusable entries plus the buttons row
    fn stop_count(&self) -> usize {
        if self.is_read_only() {
            self.entries.len()
        } else {
            self.entries.len() + 1
        }
    }

    fn is_stop(&self, index: usize) -> bool {
        match self.entries.get(index) {
            Some(entry) => entry.widget.is_focusable(),
            None => !self.is_read_only(),
        }
    }

    fn focus(&mut self, index: usize) {
        self.active = index;
        self.cursor = 0;
        self.pending.clear();
    }

    pub fn next_field(&mut self) {
        let count = self.stop_count();
        if count == 0 {
            return;
        }
        let mut index = self.active;
        for _ in 0..count {
            index = (index + 1) % count;
            if self.is_stop(index) {
                self.focus(index);
                return;
            }
        }
    }

    pub fn prev_field(&mut self) {
        let count = self.stop_count();
        if count == 0 {
            return;
        }
        let mut index = self.active;
        for _ in 0..count {
            index = if index == 0 { count - 1 } else { index - 1 };
            if self.is_stop(index) {
                self.focus(index);
                return;
            }
        }
    }

    /// Number of items the cursor can move over in the focused widget
    pub fn cursor_len(&self) -> usize {
        self.props(self.active, "")
            .zip(self.active_entry())
            .map(|(props, entry)| entry.widget.cursor_len(&props))
            .unwrap_or(0)
    }

    /// Move the cursor; returns false when the widget has nothing to move over
    pub fn move_cursor(&mut self, down: bool) -> bool {
        let len = self.cursor_len();
        if len == 0 {
            return false;
        }
        self.cursor = if down {
            (self.cursor + 1).min(len - 1)
        } else {
            self.cursor.saturating_sub(1)
        };
        true
    }

    /// Deliver an edit event to the focused widget and store the change
    pub fn apply_input(&mut self, input: WidgetInput, date_format: &str) -> Result<(), WidgetError> {
        let Some(entry) = self.entries.get(self.active) else {
            return Ok(());
        };
        let widget = entry.widget;
        let path = entry.path.clone();

        let mut change = None;
        if let Some(props) = self.props(self.active, date_format) {
            widget.handle_input(&props, input, &mut |value: Option<Value>| {
                change = Some(value);
            })?;
        }

        if let Some(value) = change {
            self.data.set_path(&path, value);
            let len = self.cursor_len();
            if self.cursor >= len {
                self.cursor = len.saturating_sub(1);
            }
        }
        Ok(())
    }

    /// Read the file named in the pending buffer and hand it to the widget
    pub fn upload_pending(&mut self) -> Result<(), WidgetError> {
        let path = expand_home(self.pending.trim());
        let encoded = encode_file(&path)?;
        self.apply_input(WidgetInput::Upload(encoded), "")?;
        self.pending.clear();
        Ok(())
    }

    /// Run both validation passes, keeping the errors for display.
    /// Returns true when the form may be submitted.
    pub fn validate(&mut self) -> bool {
        self.errors = validate_form(&self.data, &self.schema);
        if !self.errors.is_empty() {
            tracing::info!("Validation failed with {} field error(s)", self.errors.len());
            self.scroll_offset = 0;
        }
        self.errors.is_empty()
    }

    /// Lines for the error list shown at the top of the form
    pub fn error_list(&self) -> Vec<String> {
        self.errors
            .iter()
            .flat_map(|(id, messages)| {
                // Hidden fields have no entry but keep their schema title
                let label = self
                    .entries
                    .iter()
                    .find(|e| e.id == id)
                    .map(|e| &e.field)
                    .or_else(|| self.schema.field(id))
                    .map(|f| f.label().to_string())
                    .unwrap_or_else(|| id.to_string());
                messages.iter().map(move |m| format!("{label}: {m}"))
            })
            .collect()
    }
}

fn collect_entries(
    schema: &Schema,
    ui_schema: &UiSchema,
    widget_set: WidgetSet,
    parent: &[String],
    out: &mut Vec<FieldEntry>,
) {
    for field in ui_schema.ordered(schema) {
        let options = ui_schema.get(&field.name).cloned().unwrap_or_default();
        if options.has_class(HIDDEN_CLASS) {
            continue;
        }

        let mut path = parent.to_vec();
        path.push(field.name.clone());
        let required = schema.is_required(&field.name);

        if let FieldKind::Object(inner) = &field.kind {
            let children = options.children.clone();
            out.push(FieldEntry {
                id: path.join("."),
                path: path.clone(),
                depth: parent.len(),
                field: field.clone(),
                options,
                widget: Widget::SectionHeader,
                required,
            });
            collect_entries(inner, &children, widget_set, &path, out);
            continue;
        }

        out.push(FieldEntry {
            id: path.join("."),
            path,
            depth: parent.len(),
            field: field.clone(),
            widget: widget_set.widget_for(ui_schema.widget_for(field)),
            options,
            required,
        });
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(dirs) = directories::BaseDirs::new() {
            return dirs.home_dir().join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{RACE_REQUIRED, REQUIRED_PROPERTY, UNIVERSITY_REQUIRED};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::io::Write;

    const SCHEMA: &str = r#"{
        "required": ["first_name", "resume"],
        "properties": {
            "about": {"type": "null", "title": "About you"},
            "first_name": {"type": "string", "title": "First name"},
            "race": {"type": "array", "items": {"enum": ["A", "Prefer not to say"]}},
            "resume": {"type": "string", "format": "data-url", "title": "Resume"},
            "essay": {"type": "string", "word_count": 3},
            "address": {"type": "object", "properties": {"city": {"type": "string"}}}
        }
    }"#;

    const UI: &str = r#"{
        "about": {"ui:widget": "sectionHeader"},
        "essay": {"ui:widget": "textarea"},
        "resume": {"ui:widget": "FileWidget"}
    }"#;

    fn form(status: ApplicationStatus, shown: Option<&[String]>) -> ApplicationForm {
        let schema = Schema::from_json(SCHEMA).unwrap();
        let ui = UiSchema::from_json(UI).unwrap();
        ApplicationForm::new(&schema, &ui, shown, FormData::new(), status)
    }

    fn ids(form: &ApplicationForm) -> Vec<&str> {
        form.entries().iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_entries_follow_schema_order_with_nested_paths() {
        let form = form(ApplicationStatus::Draft, None);
        assert_eq!(
            ids(&form),
            vec!["about", "first_name", "race", "resume", "essay", "address", "address.city"]
        );
        assert_eq!(form.entries()[6].depth, 1);
    }

    #[test]
    fn test_focus_skips_section_headers() {
        let mut form = form(ApplicationStatus::Draft, None);
        assert_eq!(form.active_entry().unwrap().id, "first_name");
        form.prev_field();
        assert!(form.is_buttons_row_active());
        form.next_field();
        assert_eq!(form.active_entry().unwrap().id, "first_name");
    }

    #[test]
    fn test_hidden_fields_are_not_rendered() {
        let shown = vec!["first_name".to_string()];
        let form = form(ApplicationStatus::Draft, Some(shown.as_slice()));
        assert_eq!(ids(&form), vec!["first_name"]);
        assert_eq!(form.schema.required, vec!["first_name"]);
    }

    #[test]
    fn test_widget_set_follows_status() {
        let draft = form(ApplicationStatus::Draft, None);
        let resume = draft.entries().iter().find(|e| e.id == "resume").unwrap();
        assert_eq!(resume.widget, Widget::FileInputAndPreview);

        let submitted = form(ApplicationStatus::Submitted, None);
        let resume = submitted.entries().iter().find(|e| e.id == "resume").unwrap();
        assert_eq!(resume.widget, Widget::FilePreview);
        assert!(submitted.is_read_only());
    }

    #[test]
    fn test_read_only_form_has_no_buttons_row() {
        let mut form = form(ApplicationStatus::Submitted, None);
        for _ in 0..20 {
            form.next_field();
            assert!(!form.is_buttons_row_active());
        }
    }

    #[test]
    fn test_set_status_switches_to_read_only() {
        let mut form = form(ApplicationStatus::Draft, None);
        form.prev_field();
        form.set_status(ApplicationStatus::Submitted);
        assert!(form.is_read_only());
        assert!(!form.is_buttons_row_active());
        let resume = form.entries().iter().find(|e| e.id == "resume").unwrap();
        assert_eq!(resume.widget, Widget::FilePreview);
    }

    #[test]
    fn test_typing_updates_answers() {
        let mut form = form(ApplicationStatus::Draft, None);
        for c in "Ada".chars() {
            form.apply_input(WidgetInput::Char(c), "%Y-%m-%d").unwrap();
        }
        assert_eq!(form.data.get("first_name"), Some(&json!("Ada")));
    }

    #[test]
    fn test_read_only_form_ignores_typing() {
        let mut form = form(ApplicationStatus::Submitted, None);
        form.apply_input(WidgetInput::Char('x'), "%Y-%m-%d").unwrap();
        assert!(form.data.is_empty());
    }

    #[test]
    fn test_nested_answers_use_paths() {
        let mut form = form(ApplicationStatus::Draft, None);
        while form.active_entry().map(|e| e.id.as_str()) != Some("address.city") {
            form.next_field();
        }
        form.apply_input(WidgetInput::Char('P'), "%Y-%m-%d").unwrap();
        assert_eq!(form.data.get("address"), Some(&json!({"city": "P"})));
    }

    #[test]
    fn test_checkbox_cursor_and_toggle() {
        let mut form = form(ApplicationStatus::Draft, None);
        form.next_field();
        assert_eq!(form.active_entry().unwrap().id, "race");
        assert!(form.move_cursor(true));
        assert!(form.move_cursor(true));
        assert_eq!(form.cursor, 1);
        form.apply_input(WidgetInput::Toggle, "%Y-%m-%d").unwrap();
        assert_eq!(form.data.get("race"), Some(&json!(["Prefer not to say"])));
    }

    #[test]
    fn test_error_list_labels_hidden_fields_from_schema() {
        let schema = Schema::from_json(
            r#"{"properties": {
                "first_name": {"type": "string"},
                "university": {"type": "string", "title": "University"}
            }}"#,
        )
        .unwrap();
        let shown = ["first_name".to_string()];
        let mut form = ApplicationForm::new(
            &schema,
            &UiSchema::default(),
            Some(&shown),
            FormData::new(),
            ApplicationStatus::Draft,
        );
        assert_eq!(ids(&form), vec!["first_name"]);

        assert!(!form.validate());
        assert_eq!(
            form.error_list(),
            vec![format!("University: {UNIVERSITY_REQUIRED}")]
        );
    }

    #[test]
    fn test_validate_collects_errors_and_lists_labels() {
        let mut form = form(ApplicationStatus::Draft, None);
        form.scroll_offset = 12;
        assert!(!form.validate());
        assert_eq!(form.scroll_offset, 0);
        assert_eq!(form.errors.errors_for("first_name"), [REQUIRED_PROPERTY]);
        assert_eq!(form.errors.errors_for("race"), [RACE_REQUIRED]);
        assert!(form
            .error_list()
            .contains(&format!("First name: {REQUIRED_PROPERTY}")));
    }

    #[test]
    fn test_upload_pending_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cv.pdf");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"%PDF-1.4")
            .unwrap();

        let mut form = form(ApplicationStatus::Draft, None);
        while form.active_entry().map(|e| e.id.as_str()) != Some("resume") {
            form.next_field();
        }
        form.pending = path.display().to_string();
        form.upload_pending().unwrap();
        assert!(form.pending.is_empty());
        assert!(form
            .data
            .text_at(&["resume".to_string()])
            .unwrap()
            .starts_with("data:application/pdf;name=cv.pdf;base64,"));
    }

    #[test]
    fn test_upload_rejects_non_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cv.png");
        std::fs::File::create(&path).unwrap().write_all(b"png").unwrap();

        let mut form = form(ApplicationStatus::Draft, None);
        while form.active_entry().map(|e| e.id.as_str()) != Some("resume") {
            form.next_field();
        }
        form.pending = path.display().to_string();
        assert!(matches!(form.upload_pending(), Err(WidgetError::NotPdf)));
        assert!(form.data.get("resume").is_none());
        assert!(!form.pending.is_empty());
    }
}
