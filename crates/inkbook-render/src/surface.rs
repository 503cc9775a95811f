//! Drawing surface and image loading abstractions.

use inkbook_core::{Brush, PaperType};
use kurbo::{BezPath, Point, Size, Vec2};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Rendering errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
    #[error("Export failed: {0}")]
    Export(String),
    #[error("Surface error: {0}")]
    Surface(String),
}

/// Result type for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Bitmap format for captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormat {
    #[default]
    Png,
    /// Quality in `1..=100`.
    Jpeg { quality: u8 },
}

impl ImageFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg { .. } => "image/jpeg",
        }
    }
}

/// A fixed-size raster the page is drawn on.
///
/// All drawing coordinates are world coordinates; the surface applies its
/// translation `offset` (the pan) to reach pixels. Captures and `clear`
/// ignore the offset and always cover the full pixel area.
pub trait Surface {
    /// Decoded bitmap type accepted by this surface.
    type Image;

    /// Size in pixels.
    fn size(&self) -> Size;

    /// Current translation applied to drawing.
    fn offset(&self) -> Vec2;

    fn set_offset(&mut self, offset: Vec2);

    /// Reset every pixel to opaque white.
    fn clear(&mut self);

    /// Draw the paper stretched to the surface size with its top-left at
    /// the world origin.
    fn draw_background(&mut self, image: &Self::Image);

    /// Draw a bitmap at natural size with its top-left at `origin`.
    fn draw_image(&mut self, image: &Self::Image, origin: Point);

    /// Stroke a path with round caps and joins.
    fn stroke(&mut self, path: &BezPath, brush: &Brush);

    /// Draw text with its alphabetic baseline starting at `origin`.
    fn fill_text(&mut self, text: &str, origin: Point, font_size: f64, brush: &Brush);

    /// Serialize the full pixel area as a data URL.
    fn to_data_url(&self, format: ImageFormat) -> RenderResult<String>;
}

/// Produces bitmaps for a [`Surface`]: stored snapshots and paper textures.
///
/// Both operations may complete later; callers must not assume the surface
/// is unchanged when the future resolves.
pub trait ImageSource {
    type Image: 'static;

    /// Decode a data URL.
    fn decode(&self, data_url: &str) -> BoxFuture<'static, RenderResult<Self::Image>>;

    /// Load the background texture for a paper type at the given size.
    fn paper(&self, paper: PaperType, size: Size) -> BoxFuture<'static, RenderResult<Self::Image>>;
}
