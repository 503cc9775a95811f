//! In-memory key-value store.

use super::{BoxFuture, KeyValueStore, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// In-memory store for testing and ephemeral use.
///
/// An optional byte quota mimics the browser's storage limit, and the store
/// can be switched off to simulate a disabled `localStorage`.
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
    /// Maximum total bytes of keys plus values.
    quota: Option<usize>,
    available: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
            quota: None,
            available: AtomicBool::new(true),
        }
    }
}

impl MemoryStore {
    /// Create a new empty, unlimited store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that rejects writes past `bytes` in total.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            quota: Some(bytes),
            ..Self::default()
        }
    }

    /// Toggle availability; an unavailable store fails every call.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.values.read().map(|values| values.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_available(&self) -> StorageResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StorageError::Unavailable("memory store disabled".to_string()))
        }
    }

    fn write(&self, key: &str, value: &str) -> StorageResult<()> {
        self.check_available()?;
        let mut values = self
            .values
            .write()
            .map_err(|e| StorageError::Unavailable(format!("Lock error: {}", e)))?;
        if let Some(quota) = self.quota {
            let others: usize = values
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            if others + key.len() + value.len() > quota {
                return Err(StorageError::QuotaExceeded(key.to_string()));
            }
        }
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<Option<String>>> {
        let key = key.to_string();
        Box::pin(async move {
            self.check_available()?;
            let values = self
                .values
                .read()
                .map_err(|e| StorageError::Unavailable(format!("Lock error: {}", e)))?;
            Ok(values.get(&key).cloned())
        })
    }

    fn save(&self, key: &str, value: &str) -> BoxFuture<'_, StorageResult<()>> {
        let result = self.write(key, value);
        Box::pin(async move { result })
    }

    fn remove(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        Box::pin(async move {
            self.check_available()?;
            let mut values = self
                .values
                .write()
                .map_err(|e| StorageError::Unavailable(format!("Lock error: {}", e)))?;
            values.remove(&key);
            Ok(())
        })
    }
}
