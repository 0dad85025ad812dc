//! Form field value objects

/// Type-safe field values
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    /// Text rendered masked (passwords)
    Secret(String),
    /// One of a fixed list, cycled with Left/Right
    Choice {
        options: Vec<String>,
        selected: usize,
    },
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

/// A single field of a local form (auth pages, sponsor and admin editors)
#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub value: FieldValue,
    pub is_multiline: bool,
}

impl FormField {
    /// Create a new text field
    pub fn text(name: &str, label: &str) -> Self {
        Self::text_with_value(name, label, String::new())
    }

    /// Create a new text field with initial value
    pub fn text_with_value(name: &str, label: &str, value: String) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            value: FieldValue::Text(value),
            is_multiline: false,
        }
    }

    /// Create a new multiline text field with initial value
    pub fn multiline(name: &str, label: &str, value: String) -> Self {
        Self {
            is_multiline: true,
            ..Self::text_with_value(name, label, value)
        }
    }

    /// Create a new password field
    pub fn secret(name: &str, label: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            value: FieldValue::Secret(String::new()),
            is_multiline: false,
        }
    }

    /// Create a new choice field
    pub fn choice(name: &str, label: &str, options: Vec<String>, selected: usize) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            value: FieldValue::Choice { options, selected },
            is_multiline: false,
        }
    }

    /// Entered text, or the selected option for choice fields
    pub fn as_text(&self) -> &str {
        match &self.value {
            FieldValue::Text(s) | FieldValue::Secret(s) => s,
            FieldValue::Choice { options, selected } => {
                options.get(*selected).map(String::as_str).unwrap_or("")
            }
        }
    }

    /// Push a character to the field value
    pub fn push_char(&mut self, c: char) {
        match &mut self.value {
            FieldValue::Text(s) | FieldValue::Secret(s) => s.push(c),
            FieldValue::Choice { .. } => {}
        }
    }

    /// Remove the last character from the field value
    pub fn pop_char(&mut self) {
        match &mut self.value {
            FieldValue::Text(s) | FieldValue::Secret(s) => {
                s.pop();
            }
            FieldValue::Choice { .. } => {}
        }
    }

    /// Step a choice field forward or back (wraps around)
    pub fn cycle(&mut self, forward: bool) {
        if let FieldValue::Choice { options, selected } = &mut self.value {
            if options.is_empty() {
                return;
            }
            *selected = if forward {
                (*selected + 1) % options.len()
            } else if *selected == 0 {
                options.len() - 1
            } else {
                *selected - 1
            };
        }
    }

    /// Clear the field value
    pub fn clear(&mut self) {
        match &mut self.value {
            FieldValue::Text(s) | FieldValue::Secret(s) => s.clear(),
            FieldValue::Choice { selected, .. } => *selected = 0,
        }
    }

    /// Get the display value for rendering
    pub fn display_value(&self) -> String {
        match &self.value {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Secret(s) => "•".repeat(s.chars().count()),
            FieldValue::Choice { .. } => format!("◀ {} ▶", self.as_text()),
        }
    }
}
