//! Applicant answers keyed by schema field name

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The applicant's answers: a JSON object, nested for object fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData(Map<String, Value>);

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse persisted answers. Empty text and `null` load as no answers.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        match serde_json::from_str::<Value>(text)? {
            Value::Object(map) => Ok(Self(map)),
            _ => Ok(Self::default()),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.0)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Top-level answer
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Answer at a nested path
    pub fn get_path(&self, path: &[String]) -> Option<&Value> {
        let (last, parents) = path.split_last()?;
        let mut map = &self.0;
        for segment in parents {
            map = map.get(segment)?.as_object()?;
        }
        map.get(last)
    }

    /// Set (`Some`) or unset (`None`) the answer at a nested path,
    /// creating intermediate objects as needed
    pub fn set_path(&mut self, path: &[String], value: Option<Value>) {
        let Some((last, parents)) = path.split_last() else {
            return;
        };
        let mut map = &mut self.0;
        for segment in parents {
            let slot = map
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            match slot {
                Value::Object(inner) => map = inner,
                _ => return,
            }
        }
        match value {
            Some(value) => {
                map.insert(last.clone(), value);
            }
            None => {
                map.remove(last);
            }
        }
    }

    /// String answer at a path, if it is a string
    pub fn text_at(&self, path: &[String]) -> Option<&str> {
        self.get_path(path).and_then(Value::as_str)
    }
}

/// Whether an answer counts as not given: absent, `null`, `false`,
/// an empty string, or an empty array/object
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
        Some(Value::Bool(true)) | Some(Value::Number(_)) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_from_json_empty_and_null() {
        assert!(FormData::from_json("").unwrap().is_empty());
        assert!(FormData::from_json("null").unwrap().is_empty());
    }

    #[test]
    fn test_from_json_object() {
        let data = FormData::from_json(r#"{"first_name": "Ada", "race": ["A"]}"#).unwrap();
        assert_eq!(data.get("first_name"), Some(&json!("Ada")));
        assert_eq!(data.get("race"), Some(&json!(["A"])));
    }

    #[test]
    fn test_set_path_creates_nested_objects() {
        let mut data = FormData::new();
        data.set_path(&path(&["address", "city"]), Some(json!("Palo Alto")));
        assert_eq!(data.text_at(&path(&["address", "city"])), Some("Palo Alto"));
        assert_eq!(data.get("address"), Some(&json!({"city": "Palo Alto"})));
    }

    #[test]
    fn test_set_path_none_removes() {
        let mut data = FormData::from_json(r#"{"essay": "hello"}"#).unwrap();
        data.set_path(&path(&["essay"]), None);
        assert!(data.get("essay").is_none());
    }

    #[test]
    fn test_set_path_replaces_non_object_parent() {
        let mut data = FormData::from_json(r#"{"address": "somewhere"}"#).unwrap();
        data.set_path(&path(&["address", "zip"]), Some(json!("94305")));
        assert_eq!(data.get("address"), Some(&json!({"zip": "94305"})));
    }

    #[test]
    fn test_get_path_missing_parent() {
        let data = FormData::new();
        assert!(data.get_path(&path(&["address", "city"])).is_none());
        assert!(data.get_path(&[]).is_none());
    }

    #[test]
    fn test_round_trip_preserves_keys() {
        let data = FormData::from_json(r#"{"b": 1, "a": true}"#).unwrap();
        let text = data.to_json().unwrap();
        assert_eq!(FormData::from_json(&text).unwrap(), data);
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(None));
        assert!(is_blank(Some(&json!(null))));
        assert!(is_blank(Some(&json!(""))));
        assert!(is_blank(Some(&json!([]))));
        assert!(is_blank(Some(&json!(false))));
        assert!(!is_blank(Some(&json!("x"))));
        assert!(!is_blank(Some(&json!(["Prefer not to say"]))));
        assert!(!is_blank(Some(&json!(0))));
    }
}
