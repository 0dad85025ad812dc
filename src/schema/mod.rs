//! Form schema domain layer
//!
//! Typed schema/uiSchema documents, the visibility pass that narrows a form
//! to an applicant's shown fields, and the validation passes run on submit.

mod document;
mod form_data;
mod validation;
mod visibility;

pub use document::{FieldDef, FieldKind, Schema, SchemaError, UiOptions, UiSchema, WidgetTag};
pub use form_data::{is_blank, FormData};
pub use validation::{
    validate, validate_form, validate_schema, word_limit_message, ErrorCollector, INVALID_DATE,
    INVALID_OPTION, RACE_REQUIRED, REQUIRED_PROPERTY, UNIVERSITY_REQUIRED,
};
pub use visibility::{apply_visibility, HIDDEN_CLASS};

/// Count the words in a free-text answer.
///
/// Runs of whitespace count as a single separator and leading/trailing
/// whitespace is ignored, so `"a  b   c"` is 3 words and `"   "` is 0.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::count_words;

    #[test]
    fn test_count_words_collapses_whitespace_runs() {
        assert_eq!(count_words("a  b   c"), 3);
    }

    #[test]
    fn test_count_words_empty_and_blank() {
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("   "), 0);
    }

    #[test]
    fn test_count_words_ignores_leading_and_trailing_whitespace() {
        assert_eq!(count_words("  hello world \n"), 2);
    }

    #[test]
    fn test_count_words_newlines_and_tabs_separate() {
        assert_eq!(count_words("one\ttwo\nthree\r\nfour"), 4);
    }
}
