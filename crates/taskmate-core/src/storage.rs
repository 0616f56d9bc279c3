use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use thiserror::Error;

/// Errors produced by durable state storage implementations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateStoreError {
    /// Requested key does not exist.
    #[error("entry not found for key: {key}")]
    NotFound { key: String },
    /// Underlying storage failure.
    #[error("storage failure: {reason}")]
    Storage { reason: String },
}

/// Contract for the durable key-value store holding the task collection and
/// small preferences. All access is synchronous: the app runs a single
/// cooperative event loop and every mutation is saved before control returns
/// to it.
pub trait StateStore {
    /// Persist a value under a key, overwriting any existing entry.
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StateStoreError>;

    /// Retrieve the value for a key.
    fn get(&self, key: &str) -> Result<Vec<u8>, StateStoreError>;

    /// Remove a key and its value (idempotent).
    fn delete(&self, key: &str) -> Result<(), StateStoreError>;
}

/// In-memory state store for tests and smoke runs. Clones share the same
/// backing map, so a test can reopen a "fresh" store over existing data.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStateStore {
    inner: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for InMemoryStateStore {
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StateStoreError> {
        let mut map = self.inner.lock().map_err(|err| StateStoreError::Storage {
            reason: format!("lock poisoned: {err}"),
        })?;
        map.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, StateStoreError> {
        let map = self.inner.lock().map_err(|err| StateStoreError::Storage {
            reason: format!("lock poisoned: {err}"),
        })?;
        map.get(key)
            .cloned()
            .ok_or_else(|| StateStoreError::NotFound {
                key: key.to_string(),
            })
    }

    fn delete(&self, key: &str) -> Result<(), StateStoreError> {
        let mut map = self.inner.lock().map_err(|err| StateStoreError::Storage {
            reason: format!("lock poisoned: {err}"),
        })?;
        map.remove(key);
        Ok(())
    }
}
