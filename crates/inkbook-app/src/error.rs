use inkbook_core::{NotebookError, StorageError};
use inkbook_render::RenderError;
use thiserror::Error;

/// Session errors.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No user is logged in")]
    NotLoggedIn,
    #[error("No page is open")]
    NoOpenPage,
    #[error(transparent)]
    Notebook(#[from] NotebookError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
