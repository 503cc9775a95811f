//! Key-value persistence for notebooks and user preferences.
//!
//! Everything the notebook stores is a JSON string under a flat key, the
//! same layout the browser's `localStorage` offers. Backends only move
//! strings; typed encoding lives in the helpers at the bottom of this module.

mod autosave;
mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

#[cfg(target_arch = "wasm32")]
mod local;

pub use autosave::{AutoSaveManager, DEFAULT_AUTOSAVE_INTERVAL_SECS};
pub use memory::MemoryStore;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;

#[cfg(target_arch = "wasm32")]
pub use local::LocalStorage;

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Key holding the logged-in user's name.
pub const CURRENT_USER_KEY: &str = "currentUser";
/// Key holding the selected theme.
pub const THEME_KEY: &str = "theme";
/// Key holding the user's custom palette colors.
pub const CUSTOM_COLORS_KEY: &str = "customColors";

/// Suffix appended to a key when an unreadable value is set aside.
pub const CORRUPT_SUFFIX: &str = ".corrupt";

/// Key of a user's notebook collection.
pub fn notebooks_key(user: &str) -> String {
    format!("notebooks_{user}")
}

/// Key of a user's weekly calendar.
pub fn calendar_key(user: &str) -> String {
    format!("calendarEntries_{user}")
}

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    #[error("Storage quota exceeded while writing {0}")]
    QuotaExceeded(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Trait for string key-value backends.
///
/// Note: On native platforms, implementations must be Send + Sync.
/// On WASM, these bounds are relaxed since it's single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait KeyValueStore: Send + Sync {
    /// Read a value. Missing keys are `Ok(None)`.
    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<Option<String>>>;

    /// Write a value, replacing any previous one.
    fn save(&self, key: &str, value: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// Delete a value. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> BoxFuture<'_, StorageResult<()>>;
}

/// Trait for string key-value backends (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait KeyValueStore {
    /// Read a value. Missing keys are `Ok(None)`.
    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<Option<String>>>;

    /// Write a value, replacing any previous one.
    fn save(&self, key: &str, value: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// Delete a value. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> BoxFuture<'_, StorageResult<()>>;
}

/// The logged-in user, if any. Blank names count as logged out.
pub async fn current_user<S: KeyValueStore + ?Sized>(store: &S) -> StorageResult<Option<String>> {
    let user = store.load(CURRENT_USER_KEY).await?;
    Ok(user
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty()))
}

/// Load and decode a JSON value, falling back to `T::default()` when absent.
///
/// A value that fails to decode is copied to `<key>.corrupt` before the
/// default is returned, so the next save cannot destroy the only copy.
pub async fn load_json<T, S>(store: &S, key: &str) -> StorageResult<T>
where
    T: DeserializeOwned + Default,
    S: KeyValueStore + ?Sized,
{
    let Some(raw) = store.load(key).await? else {
        return Ok(T::default());
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(value),
        Err(e) => {
            let backup = format!("{key}{CORRUPT_SUFFIX}");
            log::warn!("Unreadable value under {}: {}; backing up to {}", key, e, backup);
            store.save(&backup, &raw).await?;
            Ok(T::default())
        }
    }
}

/// Encode a value as JSON and store it.
pub async fn save_json<T, S>(store: &S, key: &str, value: &T) -> StorageResult<()>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let json = serde_json::to_string(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
    store.save(key, &json).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notebook::{Notebooks, PaperType};

    fn block_on<F: std::future::Future>(f: F) -> F::Output {
        use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

        fn dummy_raw_waker() -> RawWaker {
            fn no_op(_: *const ()) {}
            fn clone(_: *const ()) -> RawWaker {
                dummy_raw_waker()
            }
            static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
            RawWaker::new(std::ptr::null(), &VTABLE)
        }

        let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
        let mut cx = Context::from_waker(&waker);
        let mut f = std::pin::pin!(f);

        loop {
            match f.as_mut().poll(&mut cx) {
                Poll::Ready(result) => return result,
                Poll::Pending => {}
            }
        }
    }

    #[test]
    fn test_keys_are_scoped_per_user() {
        assert_eq!(notebooks_key("ana"), "notebooks_ana");
        assert_eq!(calendar_key("ana"), "calendarEntries_ana");
    }

    #[test]
    fn test_current_user() {
        let store = MemoryStore::new();
        assert_eq!(block_on(current_user(&store)).unwrap(), None);

        block_on(store.save(CURRENT_USER_KEY, "  ")).unwrap();
        assert_eq!(block_on(current_user(&store)).unwrap(), None);

        block_on(store.save(CURRENT_USER_KEY, "ana")).unwrap();
        assert_eq!(block_on(current_user(&store)).unwrap(), Some("ana".to_string()));
    }

    #[test]
    fn test_json_helpers_round_trip() {
        let store = MemoryStore::new();
        let mut books = Notebooks::new();
        books.create("math", PaperType::Grid).unwrap();

        block_on(save_json(&store, "notebooks_ana", &books)).unwrap();
        let loaded: Notebooks = block_on(load_json(&store, "notebooks_ana")).unwrap();

        assert_eq!(loaded, books);
    }

    #[test]
    fn test_missing_json_is_default() {
        let store = MemoryStore::new();
        let loaded: Notebooks = block_on(load_json(&store, "notebooks_nobody")).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_corrupt_json_is_backed_up() {
        let store = MemoryStore::new();
        block_on(store.save("notebooks_ana", "{not json")).unwrap();

        let loaded: Notebooks = block_on(load_json(&store, "notebooks_ana")).unwrap();

        assert!(loaded.is_empty());
        assert_eq!(
            block_on(store.load("notebooks_ana.corrupt")).unwrap().as_deref(),
            Some("{not json")
        );
        // The original stays in place until the caller saves over it.
        assert_eq!(
            block_on(store.load("notebooks_ana")).unwrap().as_deref(),
            Some("{not json")
        );
    }
}
