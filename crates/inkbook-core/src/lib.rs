//! Inkbook Core Library
//!
//! Platform-agnostic data structures and logic for the Inkbook notebook:
//! notebooks and pages, the snapshot undo history, the drawing tool state
//! machine, the pan transform, and key-value persistence.

pub mod calendar;
pub mod camera;
pub mod color;
pub mod history;
pub mod notebook;
pub mod palette;
pub mod storage;
pub mod theme;
pub mod tools;

pub use calendar::{CalendarEntries, Weekday};
pub use camera::Camera;
pub use color::Rgba;
pub use history::{Snapshot, SnapshotStore, UndoStep, MAX_UNDO_HISTORY};
pub use notebook::{Notebook, NotebookError, Notebooks, Page, PaperType};
pub use palette::Palette;
pub use storage::{KeyValueStore, StorageError, StorageResult};
pub use theme::Theme;
pub use tools::{Brush, ShapeGeometry, ToolAction, ToolConfig, ToolKind, ToolManager};
