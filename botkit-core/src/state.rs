//! Persisted key-value state backing the polling loop.
//!
//! A single JSON document, cached in memory for the whole process
//! lifetime and flushed back only when its content differs from what is
//! already on disk. The polling loop is the sole writer between a fetch
//! and the matching persist; commands read through accessors.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{BotError, Result};

/// Key holding the offset for the next update fetch.
pub const CURRENT_UPDATE_ID: &str = "current_update_id";

pub struct StateStore {
    path: PathBuf,
    cached: Option<Map<String, Value>>,
}

impl StateStore {
    /// A store over the JSON document at `path`. Nothing is read until
    /// first access.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cached: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The cached document, loading it from disk on first use. A missing
    /// file initializes a fresh document; any other failure propagates.
    pub fn load(&mut self) -> Result<&mut Map<String, Value>> {
        if self.cached.is_none() {
            let document = self.read_document()?;
            self.cached = Some(document);
        }
        match self.cached.as_mut() {
            Some(document) => Ok(document),
            None => Err(BotError::State("state cache failed to initialize".into())),
        }
    }

    /// Offset to request the next update batch from.
    pub fn current_update_id(&mut self) -> Result<i64> {
        Ok(self
            .load()?
            .get(CURRENT_UPDATE_ID)
            .and_then(Value::as_i64)
            .unwrap_or(0))
    }

    /// Records `id` as the next offset. Reaches disk at the next
    /// `save_if_changed`.
    pub fn set_current_update_id(&mut self, id: i64) -> Result<()> {
        self.load()?
            .insert(CURRENT_UPDATE_ID.to_string(), Value::from(id));
        Ok(())
    }

    /// Reads an extra key stashed alongside the offset.
    pub fn get(&mut self, key: &str) -> Result<Option<Value>> {
        Ok(self.load()?.get(key).cloned())
    }

    /// Stashes an extra key alongside the offset.
    pub fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.load()?.insert(key.to_string(), value);
        Ok(())
    }

    /// Writes the cached document back, but only when it differs from
    /// the file's current content. Returns whether a write happened.
    pub fn save_if_changed(&mut self) -> Result<bool> {
        self.load()?;
        let Some(document) = self.cached.as_ref() else {
            return Ok(false);
        };
        let current = Value::Object(document.clone());

        let on_disk: Option<Value> = std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|contents| serde_json::from_str(&contents).ok());
        if on_disk.as_ref() == Some(&current) {
            return Ok(false);
        }

        debug!(path = %self.path.display(), "saving state");
        std::fs::write(&self.path, serde_json::to_string_pretty(&current)?)?;
        Ok(true)
    }

    fn read_document(&self) -> Result<Map<String, Value>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let value: Value = serde_json::from_str(&contents)?;
                match value {
                    Value::Object(document) => Ok(document),
                    _ => Err(BotError::State(format!(
                        "state file {} does not hold a JSON object",
                        self.path.display()
                    ))),
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no state file yet, starting fresh");
                let mut document = Map::new();
                document.insert(CURRENT_UPDATE_ID.to_string(), Value::from(0i64));
                Ok(document)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> StateStore {
        StateStore::new(dir.path().join("data.json"))
    }

    #[test]
    fn test_missing_file_starts_at_zero() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        assert_eq!(store.current_update_id().unwrap(), 0);
        // Loading alone must not create the file.
        assert!(!store.path().exists());
    }

    #[test]
    fn test_roundtrip_offset_and_extras() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.set_current_update_id(41).unwrap();
        store.set("greeted", json!(["ann"])).unwrap();
        assert!(store.save_if_changed().unwrap());

        let mut reloaded = store_in(&dir);
        assert_eq!(reloaded.current_update_id().unwrap(), 41);
        assert_eq!(reloaded.get("greeted").unwrap(), Some(json!(["ann"])));
        assert_eq!(reloaded.get("missing").unwrap(), None);
    }

    #[test]
    fn test_save_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.set_current_update_id(7).unwrap();
        assert!(store.save_if_changed().unwrap());
        assert!(!store.save_if_changed().unwrap());

        store.set_current_update_id(7).unwrap();
        assert!(!store.save_if_changed().unwrap());

        store.set_current_update_id(8).unwrap();
        assert!(store.save_if_changed().unwrap());
    }

    #[test]
    fn test_corrupt_file_propagates_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, "not json").unwrap();
        let mut store = StateStore::new(&path);
        assert!(matches!(store.load(), Err(BotError::Json(_))));

        std::fs::write(&path, "[1, 2]").unwrap();
        let mut store = StateStore::new(&path);
        assert!(matches!(store.load(), Err(BotError::State(_))));
    }

    #[test]
    fn test_cache_survives_disk_changes() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.set_current_update_id(5).unwrap();
        store.save_if_changed().unwrap();

        // Disk is rewritten behind our back; the cache stays authoritative.
        std::fs::write(store.path(), r#"{"current_update_id": 999}"#).unwrap();
        assert_eq!(store.current_update_id().unwrap(), 5);
        assert!(store.save_if_changed().unwrap());
        assert_eq!(
            store_in(&dir).current_update_id().unwrap(),
            5,
        );
    }
}
