/// Persistence of the inactive tab list in a key-value store
///
/// The whole list is written as one JSON array under a single key, so a
/// save either replaces the previous list entirely or leaves it untouched.

use std::cell::RefCell;
use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::PersistenceError;
use crate::tab_record::TabRecord;

/// Minimal key-value capability (browser.storage.local in the extension)
#[async_trait(?Send)]
pub trait KeyValueStore {
    /// `Ok(None)` when nothing is stored under `key`
    async fn get(&self, key: &str) -> Result<Option<Value>, PersistenceError>;
    async fn set(&self, key: &str, value: Value) -> Result<(), PersistenceError>;
}

/// In-process store; contents vanish with the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait(?Send)]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, PersistenceError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), PersistenceError> {
        self.entries.borrow_mut().insert(key.to_string(), value);
        Ok(())
    }
}

/// Loads and saves the inactive tab list under one key
pub struct InactiveTabStorage<S> {
    backend: S,
    key: String,
}

impl<S: KeyValueStore> InactiveTabStorage<S> {
    pub fn new(backend: S, key: impl Into<String>) -> Self {
        InactiveTabStorage {
            backend,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Returns an empty list when the key is missing or holds null
    pub async fn load(&self) -> Result<Vec<TabRecord>, PersistenceError> {
        match self.backend.get(&self.key).await? {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(value) => Ok(serde_json::from_value(value)?),
        }
    }

    pub async fn save(&self, records: &[TabRecord]) -> Result<(), PersistenceError> {
        let value = serde_json::to_value(records)?;
        self.backend.set(&self.key, value).await
    }
}
