//! Inkbook Render Library
//!
//! Drawing surfaces, bitmap codecs and page export for Inkbook. The browser
//! draws on an HTML canvas; this crate also provides a software surface used
//! by the native binary and by tests.

pub mod codec;
mod export;
pub mod font;
pub mod paper;
mod pipeline;
mod raster;
mod surface;

pub use export::{ExportArtifact, export_document, export_image};
pub use pipeline::{PendingRestore, RenderPipeline};
pub use raster::{RasterImages, RasterSurface};
pub use surface::{BoxFuture, ImageFormat, ImageSource, RenderError, RenderResult, Surface};
