//! Auto-save functionality for notebook persistence.
//!
//! Page commits write through immediately; this manager rewrites the whole
//! collection on a fixed interval as well, whether or not anything changed.

use crate::notebook::Notebooks;
use crate::storage::{KeyValueStore, StorageResult, save_json};

#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

/// Default auto-save interval in seconds.
pub const DEFAULT_AUTOSAVE_INTERVAL_SECS: u64 = 5;

/// Schedules collection writes and tracks unflushed changes.
#[derive(Debug, Clone)]
pub struct AutoSaveManager {
    /// Auto-save interval.
    interval: Duration,
    /// Last successful flush.
    last_save: Option<Instant>,
    /// Whether the collection has unflushed changes.
    dirty: bool,
}

impl Default for AutoSaveManager {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_AUTOSAVE_INTERVAL_SECS))
    }
}

impl AutoSaveManager {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_save: None,
            dirty: false,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether a flush is due at `now`: the interval has elapsed since the
    /// last successful write. Dirtiness does not matter.
    pub fn should_save_at(&self, now: Instant) -> bool {
        match self.last_save {
            Some(last) => now.saturating_duration_since(last) >= self.interval,
            None => true,
        }
    }

    /// Whether a flush is due now.
    pub fn should_save(&self) -> bool {
        self.should_save_at(Instant::now())
    }

    /// Write the collection. On failure the manager stays dirty so the next
    /// tick retries.
    pub async fn flush<S: KeyValueStore + ?Sized>(
        &mut self,
        store: &S,
        key: &str,
        notebooks: &Notebooks,
    ) -> StorageResult<()> {
        self.dirty = true;
        save_json(store, key, notebooks).await?;
        self.last_save = Some(Instant::now());
        self.dirty = false;
        log::debug!("Flushed {} notebooks to {}", notebooks.len(), key);
        Ok(())
    }

    /// Flush if the interval has elapsed. Returns true if a flush was
    /// performed.
    pub async fn maybe_flush<S: KeyValueStore + ?Sized>(
        &mut self,
        store: &S,
        key: &str,
        notebooks: &Notebooks,
    ) -> StorageResult<bool> {
        if !self.should_save() {
            return Ok(false);
        }
        self.flush(store, key, notebooks).await?;
        Ok(true)
    }
}
