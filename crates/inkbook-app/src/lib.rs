//! Inkbook Application
//!
//! The notebook session that ties the drawing engine to persistence, plus
//! the browser shell (wasm) and the native command-line entry point.

mod config;
mod error;
mod prompt;
mod session;

pub use config::{CONFIG_ENV, DATA_DIR_ENV, SessionConfig};
pub use error::{SessionError, SessionResult};
pub use prompt::{ScriptedPrompt, UserPrompt};
pub use session::{NotebookSession, OpenPage};

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::run_wasm;
