//! Form validation
//!
//! Validation runs in two passes over the same [`ErrorCollector`]: the
//! built-in schema pass (required fields, date format, allowed values) and
//! the application rules in [`validate`].

use super::document::{FieldKind, Schema};
use super::form_data::{is_blank, FormData};
use super::count_words;
use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const RACE_REQUIRED: &str = "Please specify a race, or select \"Prefer not to say\"";
pub const UNIVERSITY_REQUIRED: &str = "University is required";
pub const REQUIRED_PROPERTY: &str = "is a required property";
pub const INVALID_DATE: &str = "should be a valid date";
pub const INVALID_OPTION: &str = "should be equal to one of the allowed values";

/// Message attached when an answer exceeds a field's word limit
pub fn word_limit_message(limit: u32) -> String {
    format!("Response cannot exceed {limit} words")
}

/// Error messages bucketed by field path (`parent.child` for nested fields)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorCollector {
    errors: BTreeMap<String, Vec<String>>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn errors_for(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The message shown inline under a field
    pub fn first_error(&self, field: &str) -> Option<&str> {
        self.errors_for(field).first().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of fields with at least one error
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }
}

/// Built-in schema validation
pub fn validate_schema(data: &FormData, schema: &Schema) -> ErrorCollector {
    let mut errors = ErrorCollector::new();
    check_object(data.as_map(), schema, "", &mut errors);
    errors
}

fn check_object(values: &Map<String, Value>, schema: &Schema, prefix: &str, errors: &mut ErrorCollector) {
    for field in &schema.properties {
        let key = if prefix.is_empty() {
            field.name.clone()
        } else {
            format!("{prefix}.{}", field.name)
        };
        let value = values.get(&field.name);

        // Presence only, as JSON-schema `required` means: `false` and `[]` count as given
        let missing = matches!(value, None | Some(Value::Null))
            || matches!(value, Some(Value::String(s)) if s.is_empty());
        if missing && schema.is_required(&field.name) && field.kind != FieldKind::Section {
            errors.add_error(&key, REQUIRED_PROPERTY);
        }

        match (&field.kind, value) {
            (FieldKind::Date, Some(Value::String(s))) if !s.is_empty() => {
                if NaiveDate::parse_from_str(s, "%Y-%m-%d").is_err() {
                    errors.add_error(&key, INVALID_DATE);
                }
            }
            (FieldKind::Select { options }, Some(Value::String(s)))
                if !s.is_empty() && !options.is_empty() && !options.contains(s) =>
            {
                errors.add_error(&key, INVALID_OPTION);
            }
            (FieldKind::MultiSelect { options }, Some(Value::Array(items))) if !options.is_empty() => {
                let all_allowed = items
                    .iter()
                    .all(|item| item.as_str().is_some_and(|s| options.iter().any(|o| o == s)));
                if !all_allowed {
                    errors.add_error(&key, INVALID_OPTION);
                }
            }
            (FieldKind::Object(inner), Some(Value::Object(map))) => {
                check_object(map, inner, &key, errors);
            }
            _ => {}
        }
    }
}

/// Application rules, run after the built-in pass on the same collector.
///
/// Each rule attaches at most one message per field.
pub fn validate(data: &FormData, mut errors: ErrorCollector, schema: &Schema) -> ErrorCollector {
    if schema.has_field("race") && is_blank(data.get("race")) {
        errors.add_error("race", RACE_REQUIRED);
    }

    for field in &schema.properties {
        let Some(limit) = field.word_count else {
            continue;
        };
        if let Some(Value::String(text)) = data.get(&field.name) {
            if count_words(text) > limit as usize {
                errors.add_error(&field.name, word_limit_message(limit));
            }
        }
    }

    if schema.has_field("university") && is_blank(data.get("university")) {
        errors.add_error("university", UNIVERSITY_REQUIRED);
    }

    errors
}

/// Both validation passes
pub fn validate_form(data: &FormData, schema: &Schema) -> ErrorCollector {
    validate(data, validate_schema(data, schema), schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn schema(json: &str) -> Schema {
        Schema::from_json(json).unwrap()
    }

    fn data(json: Value) -> FormData {
        FormData::from_json(&json.to_string()).unwrap()
    }

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    const ESSAY: &str = r#"{"properties": {"essay": {"type": "string", "word_count": 5}}}"#;

    mod word_count_rule {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_exactly_at_limit_passes() {
            let errors = validate(&data(json!({"essay": words(5)})), ErrorCollector::new(), &schema(ESSAY));
            assert!(errors.errors_for("essay").is_empty());
        }

        #[test]
        fn test_one_over_limit_fails_with_message() {
            let errors = validate(&data(json!({"essay": words(6)})), ErrorCollector::new(), &schema(ESSAY));
            assert_eq!(errors.errors_for("essay"), ["Response cannot exceed 5 words"]);
        }

        #[test]
        fn test_whitespace_runs_do_not_inflate_count() {
            let text = "one   two\n\nthree\t four     five   ";
            let errors = validate(&data(json!({"essay": text})), ErrorCollector::new(), &schema(ESSAY));
            assert!(errors.is_empty());
        }

        #[test]
        fn test_missing_or_non_string_answer_is_ignored() {
            let s = schema(ESSAY);
            assert!(validate(&FormData::new(), ErrorCollector::new(), &s).is_empty());
            assert!(validate(&data(json!({"essay": 12})), ErrorCollector::new(), &s).is_empty());
        }

        #[test]
        fn test_fields_without_limit_are_unchecked() {
            let s = schema(r#"{"properties": {"bio": {"type": "string"}}}"#);
            let errors = validate(&data(json!({"bio": words(5000)})), ErrorCollector::new(), &s);
            assert!(errors.is_empty());
        }
    }

    mod race_rule {
        use super::*;
        use pretty_assertions::assert_eq;

        const RACE: &str = r#"{"properties": {"race": {"type": "array", "items": {"enum": ["A", "Prefer not to say"]}}}}"#;

        #[test]
        fn test_absent_race_fails() {
            let errors = validate(&FormData::new(), ErrorCollector::new(), &schema(RACE));
            assert_eq!(errors.errors_for("race"), [RACE_REQUIRED]);
        }

        #[test]
        fn test_empty_race_fails() {
            let errors = validate(&data(json!({"race": []})), ErrorCollector::new(), &schema(RACE));
            assert_eq!(errors.first_error("race"), Some(RACE_REQUIRED));
        }

        #[test]
        fn test_prefer_not_to_say_passes() {
            let errors = validate(
                &data(json!({"race": ["Prefer not to say"]})),
                ErrorCollector::new(),
                &schema(RACE),
            );
            assert!(errors.is_empty());
        }

        #[test]
        fn test_schema_without_race_never_checks() {
            let errors = validate(&FormData::new(), ErrorCollector::new(), &schema(ESSAY));
            assert!(errors.errors_for("race").is_empty());
        }
    }

    mod university_rule {
        use super::*;
        use pretty_assertions::assert_eq;

        const UNIVERSITY: &str = r#"{"properties": {"university": {"type": "string"}}}"#;

        #[test]
        fn test_empty_string_fails() {
            let errors = validate(&data(json!({"university": ""})), ErrorCollector::new(), &schema(UNIVERSITY));
            assert_eq!(errors.errors_for("university"), [UNIVERSITY_REQUIRED]);
        }

        #[test]
        fn test_absent_fails() {
            let errors = validate(&FormData::new(), ErrorCollector::new(), &schema(UNIVERSITY));
            assert_eq!(errors.errors_for("university"), [UNIVERSITY_REQUIRED]);
        }

        #[test]
        fn test_any_non_empty_answer_passes() {
            for answer in ["Stanford University", "x", " "] {
                let errors = validate(
                    &data(json!({"university": answer})),
                    ErrorCollector::new(),
                    &schema(UNIVERSITY),
                );
                assert!(errors.is_empty(), "unexpected error for {answer:?}");
            }
        }
    }

    mod schema_pass {
        use super::*;
        use pretty_assertions::assert_eq;

        const FORM: &str = r#"{
            "required": ["first_name", "accept_terms", "header"],
            "properties": {
                "header": {"type": "null", "title": "Header"},
                "first_name": {"type": "string"},
                "accept_terms": {"type": "boolean"},
                "dob": {"type": "string", "format": "date"},
                "level": {"type": "string", "enum": ["Undergraduate", "Graduate"]},
                "address": {"type": "object", "required": ["city"], "properties": {"city": {"type": "string"}}}
            }
        }"#;

        #[test]
        fn test_missing_required_fields() {
            let errors = validate_schema(&FormData::new(), &schema(FORM));
            assert_eq!(errors.errors_for("first_name"), [REQUIRED_PROPERTY]);
            assert_eq!(errors.errors_for("accept_terms"), [REQUIRED_PROPERTY]);
            assert!(errors.errors_for("header").is_empty());
        }

        #[test]
        fn test_empty_string_counts_as_missing() {
            let errors = validate_schema(&data(json!({"first_name": ""})), &schema(FORM));
            assert_eq!(errors.first_error("first_name"), Some(REQUIRED_PROPERTY));
        }

        #[test]
        fn test_false_boolean_counts_as_present() {
            let errors = validate_schema(&data(json!({"accept_terms": false})), &schema(FORM));
            assert!(errors.errors_for("accept_terms").is_empty());
        }

        #[test]
        fn test_invalid_date() {
            let errors = validate_schema(&data(json!({"dob": "2001-13-40"})), &schema(FORM));
            assert_eq!(errors.errors_for("dob"), [INVALID_DATE]);
            let ok = validate_schema(&data(json!({"dob": "2001-02-03"})), &schema(FORM));
            assert!(ok.errors_for("dob").is_empty());
        }

        #[test]
        fn test_invalid_enum_value() {
            let errors = validate_schema(&data(json!({"level": "PhD"})), &schema(FORM));
            assert_eq!(errors.errors_for("level"), [INVALID_OPTION]);
        }

        #[test]
        fn test_nested_required_uses_dotted_path() {
            let errors = validate_schema(&data(json!({"address": {}})), &schema(FORM));
            assert_eq!(errors.errors_for("address.city"), [REQUIRED_PROPERTY]);
        }
    }

    #[test]
    fn test_validate_form_combines_passes() {
        let s = schema(
            r#"{
                "required": ["essay"],
                "properties": {
                    "essay": {"type": "string", "word_count": 2},
                    "university": {"type": "string"}
                }
            }"#,
        );
        let errors = validate_form(&data(json!({"essay": "one two three"})), &s);
        assert_eq!(errors.errors_for("essay"), ["Response cannot exceed 2 words"]);
        assert_eq!(errors.errors_for("university"), [UNIVERSITY_REQUIRED]);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_collector_keeps_messages_in_order() {
        let mut errors = ErrorCollector::new();
        errors.add_error("essay", "first");
        errors.add_error("essay", "second");
        assert_eq!(errors.first_error("essay"), Some("first"));
        assert_eq!(errors.errors_for("essay").len(), 2);
        errors.clear();
        assert!(errors.is_empty());
    }
}
