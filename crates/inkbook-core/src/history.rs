//! Bounded undo/redo history of full-surface snapshots.
//!
//! Every committed gesture pushes a raster capture of the whole page. Memory
//! grows with canvas size times [`MAX_UNDO_HISTORY`]; fine for a fixed
//! 800x600 page, a diff-based store would be needed for larger surfaces.

use kurbo::Point;
use std::collections::VecDeque;
use std::sync::Arc;

/// Maximum number of undo states to keep.
pub const MAX_UNDO_HISTORY: usize = 50;

/// An immutable capture of the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Serialized bitmap (data URL).
    data: Arc<str>,
    /// World position of the capture's top-left pixel.
    origin: Point,
}

impl Snapshot {
    pub fn new(data: impl Into<Arc<str>>, origin: Point) -> Self {
        Self {
            data: data.into(),
            origin,
        }
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn origin(&self) -> Point {
        self.origin
    }
}

/// What the surface should show after an undo.
#[derive(Debug, Clone, PartialEq)]
pub enum UndoStep {
    /// Restore this earlier snapshot.
    Restore(Snapshot),
    /// The last snapshot was undone: show the bare background.
    Blank,
    /// Nothing to undo.
    Unchanged,
}

/// Undo and redo stacks for the page currently open.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    undo_stack: VecDeque<Snapshot>,
    redo_stack: Vec<Snapshot>,
    limit: usize,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::with_limit(MAX_UNDO_HISTORY)
    }
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that keeps at most `limit` undo states (minimum 1).
    pub fn with_limit(limit: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Record a committed state. The oldest entry is dropped on overflow.
    pub fn push(&mut self, snapshot: Snapshot) {
        self.undo_stack.push_back(snapshot);
        while self.undo_stack.len() > self.limit {
            self.undo_stack.pop_front();
        }
    }

    /// A new gesture invalidates forward history.
    pub fn begin_gesture(&mut self) {
        self.redo_stack.clear();
    }

    /// Step back one state.
    pub fn undo(&mut self) -> UndoStep {
        let Some(undone) = self.undo_stack.pop_back() else {
            return UndoStep::Unchanged;
        };
        self.redo_stack.push(undone);
        match self.undo_stack.back() {
            Some(previous) => UndoStep::Restore(previous.clone()),
            None => UndoStep::Blank,
        }
    }

    /// Re-apply the most recently undone state.
    pub fn redo(&mut self) -> Option<Snapshot> {
        let snapshot = self.redo_stack.pop()?;
        self.push(snapshot.clone());
        Some(snapshot)
    }

    /// The latest committed state.
    pub fn current(&self) -> Option<&Snapshot> {
        self.undo_stack.back()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo_stack.is_empty()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Drop both stacks (page switch).
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(n: usize) -> Snapshot {
        Snapshot::new(format!("data:image/png;base64,{n}"), Point::ZERO)
    }

    #[test]
    fn test_push_evicts_oldest_first() {
        let mut store = SnapshotStore::new();
        for i in 0..(MAX_UNDO_HISTORY + 5) {
            store.push(snap(i));
        }
        assert_eq!(store.len(), MAX_UNDO_HISTORY);
        assert_eq!(store.current(), Some(&snap(MAX_UNDO_HISTORY + 4)));

        // Walk back to the oldest surviving entry.
        let mut last = None;
        while let UndoStep::Restore(s) = store.undo() {
            last = Some(s);
        }
        assert_eq!(last, Some(snap(5)));
    }

    #[test]
    fn test_history_length_is_min_of_commits_and_limit() {
        for n in [0, 1, 7, 50, 51, 80] {
            let mut store = SnapshotStore::new();
            for i in 0..n {
                store.push(snap(i));
            }
            assert_eq!(store.len(), n.min(MAX_UNDO_HISTORY));
        }
    }

    #[test]
    fn test_undo_steps_back_then_blanks() {
        let mut store = SnapshotStore::new();
        store.push(snap(1));
        store.push(snap(2));

        assert_eq!(store.undo(), UndoStep::Restore(snap(1)));
        assert_eq!(store.undo(), UndoStep::Blank);
        assert_eq!(store.undo(), UndoStep::Unchanged);
        assert_eq!(store.redo_len(), 2);
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut store = SnapshotStore::new();
        store.push(snap(1));
        store.push(snap(2));

        store.undo();
        assert_eq!(store.redo(), Some(snap(2)));
        assert_eq!(store.current(), Some(&snap(2)));
        assert!(!store.can_redo());
        assert_eq!(store.redo(), None);
    }

    #[test]
    fn test_new_gesture_clears_redo() {
        let mut store = SnapshotStore::new();
        store.push(snap(1));
        store.push(snap(2));
        store.undo();
        assert!(store.can_redo());

        store.begin_gesture();
        store.push(snap(3));

        assert!(!store.can_redo());
        assert_eq!(store.redo(), None);
    }

    #[test]
    fn test_empty_store_is_noop() {
        let mut store = SnapshotStore::new();
        assert!(!store.can_undo());
        assert_eq!(store.undo(), UndoStep::Unchanged);
        assert_eq!(store.redo(), None);
    }

    #[test]
    fn test_clear_drops_both_stacks() {
        let mut store = SnapshotStore::with_limit(3);
        store.push(snap(1));
        store.push(snap(2));
        store.undo();
        store.clear();
        assert!(store.is_empty());
        assert!(!store.can_redo());
    }
}
