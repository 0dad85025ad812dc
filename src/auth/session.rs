//! Key/value stores persisted as JSON files
//!
//! Two stores exist: the session cache (identity provider data such as
//! `federatedInfo`) and the local store (client preferences). Both live in
//! the project's data directory.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct SessionStore {
    /// `None` keeps the store in memory only
    path: Option<PathBuf>,
    entries: BTreeMap<String, String>,
}

impl SessionStore {
    /// Open a store backed by `path`; a missing or unreadable file starts empty
    pub fn open(path: &Path) -> Self {
        let entries = match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring corrupt store {}: {e}", path.display());
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        Self {
            path: Some(path.to_path_buf()),
            entries,
        }
    }

    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn get_item(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set_item(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        self.entries.insert(key.to_string(), value.into());
        self.persist()
    }

    pub fn remove_item(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        self.persist()
    }

    pub fn keys(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.entries)?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_set_get_remove_in_memory() {
        let mut store = SessionStore::in_memory();
        store.set_item("federatedInfo", "{}").unwrap();
        assert_eq!(store.get_item("federatedInfo"), Some("{}"));
        store.remove_item("federatedInfo").unwrap();
        assert!(store.get_item("federatedInfo").is_none());
        store.remove_item("never-set").unwrap();
    }

    #[test]
    fn test_persists_across_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("session.json");

        let mut store = SessionStore::open(&path);
        store.set_item("a", "1").unwrap();
        store.set_item("b", "2").unwrap();

        let reopened = SessionStore::open(&path);
        assert_eq!(reopened.keys(), vec!["a", "b"]);
        assert_eq!(reopened.get_item("b"), Some("2"));
    }

    #[test]
    fn test_clear_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.json");

        let mut store = SessionStore::open(&path);
        store.set_item("lastEmail", "ada@example.com").unwrap();
        store.clear().unwrap();

        assert!(SessionStore::open(&path).keys().is_empty());
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();
        assert!(SessionStore::open(&path).keys().is_empty());
    }
}
