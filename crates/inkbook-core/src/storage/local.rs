//! `window.localStorage` store for WebAssembly.

use super::{BoxFuture, KeyValueStore, StorageError, StorageResult};
use wasm_bindgen::{JsCast, JsValue};

/// Store backed by the browser's `localStorage`.
///
/// The handle is looked up on every call: private browsing modes can revoke
/// it at any time, and a missing handle maps to `Unavailable`.
#[derive(Default)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }

    fn storage() -> StorageResult<web_sys::Storage> {
        let window =
            web_sys::window().ok_or_else(|| StorageError::Unavailable("No window object".to_string()))?;
        window
            .local_storage()
            .map_err(|e| StorageError::Unavailable(format!("localStorage error: {:?}", e)))?
            .ok_or_else(|| StorageError::Unavailable("localStorage not available".to_string()))
    }
}

fn map_write_error(key: &str, error: JsValue) -> StorageError {
    let quota = error
        .dyn_ref::<web_sys::DomException>()
        .map(|e| e.name() == "QuotaExceededError")
        .unwrap_or(false);
    if quota {
        StorageError::QuotaExceeded(key.to_string())
    } else {
        StorageError::Io(format!("Failed to write {}: {:?}", key, error))
    }
}

impl KeyValueStore for LocalStorage {
    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<Option<String>>> {
        let result = Self::storage().and_then(|storage| {
            storage
                .get_item(key)
                .map_err(|e| StorageError::Io(format!("Failed to read {}: {:?}", key, e)))
        });
        Box::pin(async move { result })
    }

    fn save(&self, key: &str, value: &str) -> BoxFuture<'_, StorageResult<()>> {
        let result = Self::storage()
            .and_then(|storage| storage.set_item(key, value).map_err(|e| map_write_error(key, e)));
        Box::pin(async move { result })
    }

    fn remove(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let result = Self::storage().and_then(|storage| {
            storage
                .remove_item(key)
                .map_err(|e| StorageError::Io(format!("Failed to delete {}: {:?}", key, e)))
        });
        Box::pin(async move { result })
    }
}
