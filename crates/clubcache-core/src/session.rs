//! Session-scoped storage for list screen state.
//!
//! Screens save their filters, cache entry and scroll position here when they
//! unmount and read it back on mount, so back-navigation can restore a list
//! without refetching. The host decides where the data lives.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde_json::Value;

/// Key-value storage injected into list screens.
pub trait SessionStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<Value>>;

    fn save(&self, key: &str, value: &Value) -> Result<()>;

    fn clear(&self, key: &str) -> Result<()>;
}

/// Store that lives as long as the process.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    values: Mutex<HashMap<String, Value>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self, key: &str) -> Result<Option<Value>> {
        let values = self
            .values
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {}", e))?;
        Ok(values.get(key).cloned())
    }

    fn save(&self, key: &str, value: &Value) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {}", e))?;
        values.insert(key.to_string(), value.clone());
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {}", e))?;
        values.remove(key);
        Ok(())
    }
}

/// Store with one JSON file per key in a directory.
pub struct JsonFileSessionStore {
    dir: PathBuf,
}

impl JsonFileSessionStore {
    pub fn new(dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create session directory: {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn path(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", name))
    }
}

impl SessionStore for JsonFileSessionStore {
    fn load(&self, key: &str) -> Result<Option<Value>> {
        let path = self.path(key);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read session file: {}", key))?;
        let value = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse session file: {}", key))?;
        Ok(Some(value))
    }

    fn save(&self, key: &str, value: &Value) -> Result<()> {
        let contents = serde_json::to_string(value)?;
        std::fs::write(self.path(key), contents)
            .with_context(|| format!("Failed to write session file: {}", key))?;
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<()> {
        let path = self.path(key);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemorySessionStore::new();
        assert!(store.load("list").unwrap().is_none());

        store.save("list", &json!({"page": 2})).unwrap();
        assert_eq!(store.load("list").unwrap(), Some(json!({"page": 2})));

        store.clear("list").unwrap();
        assert!(store.load("list").unwrap().is_none());
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileSessionStore::new(dir.path().join("session")).unwrap();

        store.save("screen:join_requests", &json!({"scroll": 120.5})).unwrap();
        assert!(dir.path().join("session").join("screen_join_requests.json").exists());
        assert_eq!(
            store.load("screen:join_requests").unwrap(),
            Some(json!({"scroll": 120.5}))
        );

        store.clear("screen:join_requests").unwrap();
        assert!(store.load("screen:join_requests").unwrap().is_none());
        // Clearing a missing key is fine
        store.clear("screen:join_requests").unwrap();
    }

    #[test]
    fn test_file_store_reports_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileSessionStore::new(dir.path().to_path_buf()).unwrap();
        std::fs::write(dir.path().join("broken.json"), "{not json").unwrap();
        assert!(store.load("broken").is_err());
    }
}
