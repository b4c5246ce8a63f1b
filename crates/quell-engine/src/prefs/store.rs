//! Key-value storage behind the preferences

use std::collections::HashMap;

use serde_json::Value;

/// Storage failure reported by a [`KeyValueStore`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("malformed value for '{key}': {reason}")]
    Malformed { key: String, reason: String },
}

/// Get/set contract of the extension storage area
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;
    fn set(&mut self, key: &str, value: Value) -> Result<(), StorageError>;
}

/// In-memory store; can be switched into a failing state
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, Value>,
    offline: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with [`StorageError::Unavailable`]
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    /// Raw value, bypassing the offline switch
    pub fn raw(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.offline {
            return Err(StorageError::Unavailable("store is offline".to_string()));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        self.check()?;
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StorageError> {
        self.check()?;
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}
