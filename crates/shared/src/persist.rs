use std::collections::HashMap;

use crate::error::{PinError, Result};
use crate::models::Pin;

/// Synchronous string key-value storage, e.g. browser `localStorage`.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// In-process store, used off the web and in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Reads and writes the pin list as a JSON array under a single key.
pub struct PinRepository<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> PinRepository<S> {
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load the stored pins. A missing key is an empty list; anything that
    /// is not a JSON array of pins is a [`PinError::StorageParse`].
    pub fn try_load(&self) -> Result<Vec<Pin>> {
        match self.store.get(&self.key)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    /// Like [`Self::try_load`] but never fails: errors are logged and the
    /// viewer starts with no pins.
    pub fn load(&self) -> Vec<Pin> {
        match self.try_load() {
            Ok(pins) => {
                tracing::debug!(key = %self.key, count = pins.len(), "Loaded pins");
                pins
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Failed to load saved pins");
                Vec::new()
            }
        }
    }

    pub fn save(&mut self, pins: &[Pin]) -> Result<()> {
        let json = serde_json::to_string(pins).map_err(|e| PinError::Storage(e.to_string()))?;
        self.store.set(&self.key, &json)
    }

    /// Drop the key entirely.
    pub fn clear(&mut self) -> Result<()> {
        self.store.remove(&self.key)
    }
}
