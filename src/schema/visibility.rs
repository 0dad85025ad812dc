//! Field visibility
//!
//! Narrows a form to the fields shown for an applicant or track. The caller's
//! documents are left untouched; effective copies are returned.

use super::document::{Schema, UiSchema};

/// Class marking a field as hidden for the current render
pub const HIDDEN_CLASS: &str = "portal-hidden";

/// Hide every top-level field not in `shown_fields` and drop it from `required`.
///
/// `None` or an empty allowlist shows every field. Applying the result again
/// with the same allowlist changes nothing.
pub fn apply_visibility(
    schema: &Schema,
    ui_schema: &UiSchema,
    shown_fields: Option<&[String]>,
) -> (Schema, UiSchema) {
    let mut effective_schema = schema.clone();
    let mut effective_ui = ui_schema.clone();

    let Some(shown) = shown_fields.filter(|fields| !fields.is_empty()) else {
        return (effective_schema, effective_ui);
    };

    for field in &schema.properties {
        if shown.iter().any(|name| name == &field.name) {
            continue;
        }

        let options = effective_ui.entry(&field.name);
        if !options.has_class(HIDDEN_CLASS) {
            options.class_names.push(HIDDEN_CLASS.to_string());
        }
        effective_schema.required.retain(|name| name != &field.name);
    }

    (effective_schema, effective_ui)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fixture() -> (Schema, UiSchema) {
        let schema = Schema::from_json(
            r#"{
                "required": ["first_name", "essay", "resume"],
                "properties": {
                    "first_name": {"type": "string"},
                    "essay": {"type": "string", "word_count": 100},
                    "resume": {"type": "string", "format": "data-url"},
                    "shirt": {"type": "string"}
                }
            }"#,
        )
        .unwrap();
        let ui = UiSchema::from_json(
            r#"{"essay": {"ui:widget": "textarea", "classNames": "wide"}}"#,
        )
        .unwrap();
        (schema, ui)
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_none_leaves_documents_unchanged() {
        let (schema, ui) = fixture();
        let (s, u) = apply_visibility(&schema, &ui, None);
        assert_eq!(s, schema);
        assert_eq!(u, ui);
    }

    #[test]
    fn test_empty_allowlist_leaves_documents_unchanged() {
        let (schema, ui) = fixture();
        let (s, u) = apply_visibility(&schema, &ui, Some(Vec::new().as_slice()));
        assert_eq!(s, schema);
        assert_eq!(u, ui);
    }

    #[test]
    fn test_hides_unlisted_fields_and_relaxes_required() {
        let (schema, ui) = fixture();
        let shown = names(&["first_name"]);
        let (s, u) = apply_visibility(&schema, &ui, Some(shown.as_slice()));

        assert_eq!(s.required, vec!["first_name"]);
        for hidden in ["essay", "resume", "shirt"] {
            assert!(u.get(hidden).unwrap().has_class(HIDDEN_CLASS), "{hidden}");
        }
        assert!(u.get("first_name").is_none());
    }

    #[test]
    fn test_existing_options_are_kept() {
        let (schema, ui) = fixture();
        let shown = names(&["first_name"]);
        let (_, u) = apply_visibility(&schema, &ui, Some(shown.as_slice()));
        let essay = u.get("essay").unwrap();
        assert!(essay.has_class("wide"));
        assert_eq!(essay.widget, ui.get("essay").unwrap().widget);
    }

    #[test]
    fn test_inputs_are_not_mutated() {
        let (schema, ui) = fixture();
        let (schema_before, ui_before) = (schema.clone(), ui.clone());
        let shown = names(&["essay"]);
        let _ = apply_visibility(&schema, &ui, Some(shown.as_slice()));
        assert_eq!(schema, schema_before);
        assert_eq!(ui, ui_before);
    }

    #[test]
    fn test_idempotent_for_every_subset() {
        let (schema, ui) = fixture();
        let all = ["first_name", "essay", "resume", "shirt"];
        for mask in 0u32..(1 << all.len()) {
            let shown: Vec<String> = all
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, n)| n.to_string())
                .collect();
            let once = apply_visibility(&schema, &ui, Some(shown.as_slice()));
            let twice = apply_visibility(&once.0, &once.1, Some(shown.as_slice()));
            assert_eq!(once, twice, "allowlist {shown:?}");
        }
    }

    #[test]
    fn test_unknown_shown_names_are_ignored() {
        let (schema, ui) = fixture();
        let shown = names(&["first_name", "not_a_field"]);
        let (s, _) = apply_visibility(&schema, &ui, Some(shown.as_slice()));
        assert_eq!(s.properties.len(), schema.properties.len());
        assert_eq!(s.required, vec!["first_name"]);
    }
}
