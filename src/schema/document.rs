//! Schema and uiSchema documents
//!
//! Forms arrive from the portal API as JSON-schema-like documents. They are
//! parsed once into closed, typed field definitions so widget dispatch and
//! validation can match exhaustively instead of probing untyped maps.

use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

/// Errors raised while parsing schema documents
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid schema JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("schema root must be a JSON object")]
    NotAnObject,

    #[error("definition of field `{0}` must be a JSON object")]
    InvalidField(String),
}

/// The kind of a field, derived from its `type`/`format`/`enum` keywords
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// `type: "null"`: a heading with no value
    Section,
    Text,
    /// A string restricted to an `enum`
    Select { options: Vec<String> },
    /// An array of strings, usually drawn from `items.enum`
    MultiSelect { options: Vec<String> },
    Boolean,
    Number,
    /// A string with `format: "date"`, stored as `YYYY-MM-DD`
    Date,
    /// A string with `format: "data-url"`
    File,
    Object(Schema),
}

/// A single field definition
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub kind: FieldKind,
    pub title: Option<String>,
    pub description: Option<String>,
    pub custom_description: Option<String>,
    /// Upper bound on the number of words in a text answer
    pub word_count: Option<u32>,
}

impl FieldDef {
    /// Label shown next to the field: its title, falling back to the name
    pub fn label(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    /// Choices offered by select-like kinds
    pub fn options(&self) -> &[String] {
        match &self.kind {
            FieldKind::Select { options } | FieldKind::MultiSelect { options } => options,
            _ => &[],
        }
    }

    fn from_value(name: &str, value: &Value) -> Result<Self, SchemaError> {
        let obj = value
            .as_object()
            .ok_or_else(|| SchemaError::InvalidField(name.to_string()))?;

        let ty = obj.get("type").and_then(Value::as_str).unwrap_or("string");
        let format = obj.get("format").and_then(Value::as_str);

        let kind = match ty {
            "null" => FieldKind::Section,
            "boolean" => FieldKind::Boolean,
            "integer" | "number" => FieldKind::Number,
            "object" => FieldKind::Object(Schema::from_map(obj)?),
            "array" => FieldKind::MultiSelect {
                options: string_list(obj.get("items").and_then(|items| items.get("enum"))),
            },
            _ => match format {
                Some("data-url") => FieldKind::File,
                Some("date") => FieldKind::Date,
                _ if obj.contains_key("enum") => FieldKind::Select {
                    options: string_list(obj.get("enum")),
                },
                _ => FieldKind::Text,
            },
        };

        Ok(Self {
            name: name.to_string(),
            kind,
            title: string_field(obj, "title"),
            description: string_field(obj, "description"),
            custom_description: string_field(obj, "custom_description"),
            word_count: obj
                .get("word_count")
                .and_then(Value::as_u64)
                .and_then(|n| u32::try_from(n).ok())
                .filter(|n| *n > 0),
        })
    }
}

/// An object level of the schema tree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Fields in document order
    pub properties: Vec<FieldDef>,
    /// Names of required fields; always a subset of `properties`
    pub required: Vec<String>,
}

impl Schema {
    /// Parse a schema from JSON text
    pub fn from_json(text: &str) -> Result<Self, SchemaError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, SchemaError> {
        let obj = value.as_object().ok_or(SchemaError::NotAnObject)?;
        Self::from_map(obj)
    }

    fn from_map(obj: &Map<String, Value>) -> Result<Self, SchemaError> {
        let mut properties = Vec::new();
        if let Some(props) = obj.get("properties").and_then(Value::as_object) {
            for (name, def) in props {
                properties.push(FieldDef::from_value(name, def)?);
            }
        }

        let mut required = Vec::new();
        for name in string_list(obj.get("required")) {
            if properties.iter().any(|f| f.name == name) {
                required.push(name);
            } else {
                tracing::warn!("Dropping required entry `{name}` with no matching property");
            }
        }

        Ok(Self {
            title: string_field(obj, "title"),
            description: string_field(obj, "description"),
            properties,
            required,
        })
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.properties.iter().find(|f| f.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }
}

/// Widget tags a uiSchema can bind to a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetTag {
    SectionHeader,
    CustomDate,
    File,
    Textarea,
    LinkArea,
    Typeahead,
    Checkboxes,
    Checkbox,
    Select,
    Text,
}

impl WidgetTag {
    /// Parse a `ui:widget` / `ui:field` tag
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "sectionHeader" => Some(Self::SectionHeader),
            "customDate" | "date" => Some(Self::CustomDate),
            "FileWidget" | "file" => Some(Self::File),
            "textarea" => Some(Self::Textarea),
            "linkarea" => Some(Self::LinkArea),
            "typeahead" => Some(Self::Typeahead),
            "checkboxes" => Some(Self::Checkboxes),
            "checkbox" => Some(Self::Checkbox),
            "select" | "radio" => Some(Self::Select),
            "text" | "email" | "uri" | "updown" => Some(Self::Text),
            _ => None,
        }
    }

    /// Widget used when the uiSchema does not name one
    pub fn default_for(kind: &FieldKind) -> Self {
        match kind {
            FieldKind::Section | FieldKind::Object(_) => Self::SectionHeader,
            FieldKind::Text | FieldKind::Number => Self::Text,
            FieldKind::Select { .. } => Self::Select,
            FieldKind::MultiSelect { .. } => Self::Checkboxes,
            FieldKind::Boolean => Self::Checkbox,
            FieldKind::Date => Self::CustomDate,
            FieldKind::File => Self::File,
        }
    }
}

/// Display options for one field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiOptions {
    pub widget: Option<WidgetTag>,
    pub class_names: Vec<String>,
    pub rows: Option<u16>,
    pub placeholder: Option<String>,
    pub help: Option<String>,
    /// Value reported when a text input is cleared; `None` unsets the field
    pub empty_value: Option<Value>,
    /// Options for the fields of an object field
    pub children: UiSchema,
}

impl UiOptions {
    pub fn has_class(&self, class: &str) -> bool {
        self.class_names.iter().any(|c| c == class)
    }

    fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        let widget = obj
            .get("ui:widget")
            .or_else(|| obj.get("ui:field"))
            .and_then(Value::as_str)
            .and_then(|tag| {
                let parsed = WidgetTag::parse(tag);
                if parsed.is_none() {
                    tracing::debug!("Unknown widget tag `{tag}`, using the default widget");
                }
                parsed
            });

        let class_names = obj
            .get("classNames")
            .and_then(Value::as_str)
            .map(|s| s.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();

        let ui_options = obj.get("ui:options").and_then(Value::as_object);
        let rows = ui_options
            .and_then(|o| o.get("rows"))
            .and_then(Value::as_u64)
            .and_then(|n| u16::try_from(n).ok());
        let empty_value = obj
            .get("ui:emptyValue")
            .or_else(|| ui_options.and_then(|o| o.get("emptyValue")))
            .cloned();

        Self {
            widget,
            class_names,
            rows,
            placeholder: string_field(obj, "ui:placeholder"),
            help: string_field(obj, "ui:help"),
            empty_value,
            children: UiSchema::from_map(obj),
        }
    }
}

/// Per-field display options mirroring the schema's shape
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiSchema {
    pub fields: BTreeMap<String, UiOptions>,
    /// `ui:order`; `*` stands for every field not listed
    pub order: Vec<String>,
}

impl UiSchema {
    pub fn from_json(text: &str) -> Result<Self, SchemaError> {
        let value: Value = serde_json::from_str(text)?;
        match value {
            Value::Null => Ok(Self::default()),
            Value::Object(obj) => Ok(Self::from_map(&obj)),
            _ => Err(SchemaError::NotAnObject),
        }
    }

    fn from_map(obj: &Map<String, Value>) -> Self {
        let fields = obj
            .iter()
            .filter(|(key, _)| !key.starts_with("ui:") && key.as_str() != "classNames")
            .filter(|(_, value)| value.is_object())
            .map(|(key, value)| (key.clone(), UiOptions::from_value(value)))
            .collect();

        Self {
            fields,
            order: string_list(obj.get("ui:order")),
        }
    }

    pub fn get(&self, name: &str) -> Option<&UiOptions> {
        self.fields.get(name)
    }

    /// Options for `name`, created empty when missing
    pub fn entry(&mut self, name: &str) -> &mut UiOptions {
        self.fields.entry(name.to_string()).or_default()
    }

    /// Widget bound to a field, falling back to the default for its kind
    pub fn widget_for(&self, field: &FieldDef) -> WidgetTag {
        self.get(&field.name)
            .and_then(|o| o.widget)
            .unwrap_or_else(|| WidgetTag::default_for(&field.kind))
    }

    /// Schema fields in display order. Names repeated in `ui:order` are
    /// shown once, at their first position.
    pub fn ordered<'a>(&self, schema: &'a Schema) -> Vec<&'a FieldDef> {
        if self.order.is_empty() {
            return schema.properties.iter().collect();
        }

        let listed = |name: &str| self.order.iter().any(|o| o == name);
        let mut emitted = HashSet::new();
        let mut out = Vec::with_capacity(schema.properties.len());
        let mut push = |field: &'a FieldDef, out: &mut Vec<&'a FieldDef>| {
            if emitted.insert(field.name.as_str()) {
                out.push(field);
            }
        };
        for name in &self.order {
            if name == "*" {
                for field in schema.properties.iter().filter(|f| !listed(&f.name)) {
                    push(field, &mut out);
                }
            } else if let Some(field) = schema.field(name) {
                push(field, &mut out);
            }
        }
        if !self.order.iter().any(|o| o == "*") {
            for field in schema.properties.iter().filter(|f| !listed(&f.name)) {
                push(field, &mut out);
            }
        }
        out
    }
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SCHEMA: &str = r#"{
        "title": "Application",
        "type": "object",
        "required": ["first_name", "essay", "ghost"],
        "properties": {
            "about": {"type": "null", "title": "About you", "custom_description": "Tell us"},
            "first_name": {"type": "string", "title": "First name"},
            "dob": {"type": "string", "format": "date"},
            "level_of_study": {"type": "string", "enum": ["Undergraduate", "Graduate"]},
            "race": {"type": "array", "items": {"type": "string", "enum": ["A", "B"]}},
            "resume": {"type": "string", "format": "data-url"},
            "accept_terms": {"type": "boolean"},
            "graduation_year": {"type": "integer"},
            "essay": {"type": "string", "word_count": 150},
            "address": {
                "type": "object",
                "required": ["city"],
                "properties": {"city": {"type": "string"}}
            }
        }
    }"#;

    #[test]
    fn test_parse_kinds() {
        let schema = Schema::from_json(SCHEMA).unwrap();
        let kind = |name: &str| schema.field(name).unwrap().kind.clone();

        assert_eq!(kind("about"), FieldKind::Section);
        assert_eq!(kind("first_name"), FieldKind::Text);
        assert_eq!(kind("dob"), FieldKind::Date);
        assert_eq!(
            kind("level_of_study"),
            FieldKind::Select {
                options: vec!["Undergraduate".into(), "Graduate".into()]
            }
        );
        assert_eq!(
            kind("race"),
            FieldKind::MultiSelect {
                options: vec!["A".into(), "B".into()]
            }
        );
        assert_eq!(kind("resume"), FieldKind::File);
        assert_eq!(kind("accept_terms"), FieldKind::Boolean);
        assert_eq!(kind("graduation_year"), FieldKind::Number);
        assert!(matches!(kind("address"), FieldKind::Object(_)));
    }

    #[test]
    fn test_properties_keep_document_order() {
        let schema = Schema::from_json(SCHEMA).unwrap();
        let names: Vec<_> = schema.properties.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names[0], "about");
        assert_eq!(names[1], "first_name");
        assert_eq!(names.last(), Some(&"address"));
    }

    #[test]
    fn test_required_drops_unknown_names() {
        let schema = Schema::from_json(SCHEMA).unwrap();
        assert_eq!(schema.required, vec!["first_name", "essay"]);
        assert!(!schema.is_required("ghost"));
    }

    #[test]
    fn test_word_count_and_descriptions() {
        let schema = Schema::from_json(SCHEMA).unwrap();
        assert_eq!(schema.field("essay").unwrap().word_count, Some(150));
        assert_eq!(schema.field("first_name").unwrap().word_count, None);
        let about = schema.field("about").unwrap();
        assert_eq!(about.label(), "About you");
        assert_eq!(about.custom_description.as_deref(), Some("Tell us"));
    }

    #[test]
    fn test_nested_object_required() {
        let schema = Schema::from_json(SCHEMA).unwrap();
        match &schema.field("address").unwrap().kind {
            FieldKind::Object(inner) => assert!(inner.is_required("city")),
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn test_root_must_be_object() {
        assert!(matches!(
            Schema::from_json("[1, 2]"),
            Err(SchemaError::NotAnObject)
        ));
        assert!(matches!(Schema::from_json("{"), Err(SchemaError::Json(_))));
    }

    #[test]
    fn test_field_must_be_object() {
        let err = Schema::from_json(r#"{"properties": {"name": 3}}"#).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidField(name) if name == "name"));
    }

    #[test]
    fn test_ui_schema_parsing() {
        let ui = UiSchema::from_json(
            r#"{
                "ui:order": ["essay", "*"],
                "about": {"ui:widget": "sectionHeader"},
                "essay": {"ui:widget": "textarea", "ui:options": {"rows": 6}, "classNames": "wide tall"},
                "university": {"ui:field": "typeahead", "ui:placeholder": "Start typing"},
                "address": {"city": {"ui:widget": "text"}},
                "links": {"ui:widget": "mystery"}
            }"#,
        )
        .unwrap();

        assert_eq!(ui.order, vec!["essay", "*"]);
        assert_eq!(ui.get("about").unwrap().widget, Some(WidgetTag::SectionHeader));
        let essay = ui.get("essay").unwrap();
        assert_eq!(essay.widget, Some(WidgetTag::Textarea));
        assert_eq!(essay.rows, Some(6));
        assert!(essay.has_class("tall"));
        let university = ui.get("university").unwrap();
        assert_eq!(university.widget, Some(WidgetTag::Typeahead));
        assert_eq!(university.placeholder.as_deref(), Some("Start typing"));
        let address = ui.get("address").unwrap();
        assert_eq!(
            address.children.get("city").unwrap().widget,
            Some(WidgetTag::Text)
        );
        assert_eq!(ui.get("links").unwrap().widget, None);
    }

    #[test]
    fn test_null_ui_schema_is_empty() {
        assert_eq!(UiSchema::from_json("null").unwrap(), UiSchema::default());
    }

    #[test]
    fn test_widget_for_falls_back_to_kind_default() {
        let schema = Schema::from_json(SCHEMA).unwrap();
        let ui = UiSchema::from_json(r#"{"essay": {"ui:widget": "textarea"}}"#).unwrap();
        assert_eq!(
            ui.widget_for(schema.field("essay").unwrap()),
            WidgetTag::Textarea
        );
        assert_eq!(
            ui.widget_for(schema.field("resume").unwrap()),
            WidgetTag::File
        );
        assert_eq!(
            ui.widget_for(schema.field("race").unwrap()),
            WidgetTag::Checkboxes
        );
    }

    #[test]
    fn test_ordered_with_wildcard() {
        let schema = Schema::from_json(SCHEMA).unwrap();
        let ui = UiSchema::from_json(r#"{"ui:order": ["essay", "*", "about"]}"#).unwrap();
        let names: Vec<_> = ui.ordered(&schema).iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names.first(), Some(&"essay"));
        assert_eq!(names.last(), Some(&"about"));
        assert_eq!(names.len(), schema.properties.len());
    }

    #[test]
    fn test_ordered_without_wildcard_appends_rest() {
        let schema = Schema::from_json(SCHEMA).unwrap();
        let ui = UiSchema::from_json(r#"{"ui:order": ["resume"]}"#).unwrap();
        let ordered = ui.ordered(&schema);
        assert_eq!(ordered[0].name, "resume");
        assert_eq!(ordered.len(), schema.properties.len());
    }

    #[test]
    fn test_ordered_skips_repeated_names() {
        let schema = Schema::from_json(
            r#"{"properties": {"a": {"type": "string"}, "b": {"type": "string"}}}"#,
        )
        .unwrap();
        let ui = UiSchema::from_json(r#"{"ui:order": ["a", "a", "*", "*"]}"#).unwrap();
        let names: Vec<_> = ui.ordered(&schema).iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
