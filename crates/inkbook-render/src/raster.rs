//! Software raster surface on a [`tiny_skia::Pixmap`].
//!
//! Used by the native binary and by tests. Every surface starts opaque
//! white, so the premultiplied pixmap and the straight-alpha captures agree.

use crate::codec::{decode_data_url, decode_image, encode_data_url, encode_jpeg, encode_png};
use crate::font::{ADVANCE, GLYPH_HEIGHT, glyph_cells};
use crate::paper::rulings;
use crate::surface::{BoxFuture, ImageFormat, ImageSource, RenderError, RenderResult, Surface};
use inkbook_core::{Brush, PaperType, Rgba};
use kurbo::{BezPath, PathEl, Point, Size, Vec2};
use tiny_skia::{
    Color, ColorU8, FillRule, FilterQuality, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint,
    Stroke, Transform,
};

/// Font units per pixel of font size; puts cap height near 70% of the size.
const FONT_UNIT: f64 = 0.1;

/// A CPU-backed [`Surface`].
#[derive(Debug, Clone)]
pub struct RasterSurface {
    pixmap: Pixmap,
    offset: Vec2,
}

impl RasterSurface {
    /// Create an opaque white surface.
    pub fn new(width: u32, height: u32) -> RenderResult<Self> {
        let mut pixmap = Pixmap::new(width, height)
            .ok_or_else(|| RenderError::Surface(format!("invalid surface size {width}x{height}")))?;
        pixmap.fill(Color::WHITE);
        Ok(Self {
            pixmap,
            offset: Vec2::ZERO,
        })
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn into_pixmap(self) -> Pixmap {
        self.pixmap
    }

    /// Color of one pixel, `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        self.pixmap.pixel(x, y).map(|p| {
            let c = p.demultiply();
            Rgba::new(c.red(), c.green(), c.blue(), c.alpha())
        })
    }

    fn transform(&self) -> Transform {
        Transform::from_translate(self.offset.x as f32, self.offset.y as f32)
    }

    /// Straight-alpha RGBA8 bytes, row-major.
    fn demultiplied(&self) -> Vec<u8> {
        self.pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect()
    }
}

fn paint(brush: &Brush) -> Paint<'static> {
    let mut color = Color::from_rgba8(brush.color.r, brush.color.g, brush.color.b, 255);
    color.set_alpha((brush.opacity.clamp(0.0, 1.0) * f64::from(brush.color.a) / 255.0) as f32);
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = true;
    paint
}

fn to_skia_path(path: &BezPath) -> Option<tiny_skia::Path> {
    let mut builder = PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => builder.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => builder.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(a, p) => builder.quad_to(a.x as f32, a.y as f32, p.x as f32, p.y as f32),
            PathEl::CurveTo(a, b, p) => {
                builder.cubic_to(a.x as f32, a.y as f32, b.x as f32, b.y as f32, p.x as f32, p.y as f32)
            }
            PathEl::ClosePath => builder.close(),
        }
    }
    builder.finish()
}

impl Surface for RasterSurface {
    type Image = Pixmap;

    fn size(&self) -> Size {
        Size::new(f64::from(self.pixmap.width()), f64::from(self.pixmap.height()))
    }

    fn offset(&self) -> Vec2 {
        self.offset
    }

    fn set_offset(&mut self, offset: Vec2) {
        self.offset = offset;
    }

    fn clear(&mut self) {
        self.pixmap.fill(Color::WHITE);
    }

    fn draw_background(&mut self, image: &Pixmap) {
        let sx = self.pixmap.width() as f32 / image.width() as f32;
        let sy = self.pixmap.height() as f32 / image.height() as f32;
        let quality = if sx == 1.0 && sy == 1.0 {
            FilterQuality::Nearest
        } else {
            FilterQuality::Bilinear
        };
        let paint = PixmapPaint {
            quality,
            ..PixmapPaint::default()
        };
        let transform = Transform::from_scale(sx, sy).post_concat(self.transform());
        self.pixmap.draw_pixmap(0, 0, image.as_ref(), &paint, transform, None);
    }

    fn draw_image(&mut self, image: &Pixmap, origin: Point) {
        // Whole pixels keep restored snapshots byte-exact.
        let screen = origin + self.offset;
        self.pixmap.draw_pixmap(
            screen.x.round() as i32,
            screen.y.round() as i32,
            image.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    fn stroke(&mut self, path: &BezPath, brush: &Brush) {
        if brush.width <= 0.0 {
            return;
        }
        let Some(path) = to_skia_path(path) else {
            return;
        };
        let stroke = Stroke {
            width: brush.width as f32,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };
        let transform = self.transform();
        self.pixmap.stroke_path(&path, &paint(brush), &stroke, transform, None);
    }

    fn fill_text(&mut self, text: &str, origin: Point, font_size: f64, brush: &Brush) {
        let unit = font_size.max(0.0) * FONT_UNIT;
        if unit <= 0.0 {
            return;
        }
        let top = origin.y - GLYPH_HEIGHT as f64 * unit;
        let mut builder = PathBuilder::new();
        for (index, c) in text.chars().enumerate() {
            let left = origin.x + (index * ADVANCE) as f64 * unit;
            for (col, row) in glyph_cells(c) {
                let x = left + col as f64 * unit;
                let y = top + row as f64 * unit;
                if let Some(cell) = tiny_skia::Rect::from_xywh(x as f32, y as f32, unit as f32, unit as f32) {
                    builder.push_rect(cell);
                }
            }
        }
        let Some(path) = builder.finish() else {
            return;
        };
        let transform = self.transform();
        self.pixmap.fill_path(&path, &paint(brush), FillRule::Winding, transform, None);
    }

    fn to_data_url(&self, format: ImageFormat) -> RenderResult<String> {
        let (width, height) = (self.pixmap.width(), self.pixmap.height());
        let rgba = self.demultiplied();
        let bytes = match format {
            ImageFormat::Png => encode_png(&rgba, width, height)?,
            ImageFormat::Jpeg { quality } => encode_jpeg(&rgba, width, height, quality)?,
        };
        Ok(encode_data_url(format.mime_type(), &bytes))
    }
}

/// Decode PNG or JPEG bytes into a premultiplied pixmap.
fn decode_pixmap(bytes: &[u8]) -> RenderResult<Pixmap> {
    let rgba = decode_image(bytes)?;
    let (width, height) = rgba.dimensions();
    let mut pixmap =
        Pixmap::new(width, height).ok_or_else(|| RenderError::Decode(format!("invalid image size {width}x{height}")))?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(rgba.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

/// [`ImageSource`] for [`RasterSurface`]: decodes data URLs in memory and
/// renders paper procedurally. Futures resolve on first poll.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterImages;

impl RasterImages {
    pub fn new() -> Self {
        Self
    }

    /// Render a paper texture synchronously.
    pub fn render_paper(paper: PaperType, size: Size) -> RenderResult<Pixmap> {
        if !(size.width >= 1.0 && size.height >= 1.0) {
            return Err(RenderError::Surface(format!("invalid paper size {size:?}")));
        }
        let mut surface = RasterSurface::new(size.width as u32, size.height as u32)?;
        for ruling in rulings(paper, size) {
            surface.stroke(&ruling.path, &ruling.brush);
        }
        Ok(surface.into_pixmap())
    }
}

impl ImageSource for RasterImages {
    type Image = Pixmap;

    fn decode(&self, data_url: &str) -> BoxFuture<'static, RenderResult<Pixmap>> {
        let result = decode_data_url(data_url).and_then(|(_, bytes)| decode_pixmap(&bytes));
        Box::pin(std::future::ready(result))
    }

    fn paper(&self, paper: PaperType, size: Size) -> BoxFuture<'static, RenderResult<Pixmap>> {
        Box::pin(std::future::ready(Self::render_paper(paper, size)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Line, Shape};

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

    fn pen(width: f64) -> Brush {
        Brush {
            color: Rgba::black(),
            width,
            opacity: 1.0,
        }
    }

    fn line(x0: f64, y0: f64, x1: f64, y1: f64) -> BezPath {
        Line::new((x0, y0), (x1, y1)).to_path(0.1)
    }

    #[test]
    fn test_stroke_paints_along_line_only() {
        let mut surface = RasterSurface::new(40, 40).unwrap();
        surface.stroke(&line(5.0, 20.0, 35.0, 20.0), &pen(4.0));

        assert_eq!(surface.pixel(20, 20), Some(Rgba::black()));
        assert_eq!(surface.pixel(20, 19), Some(Rgba::black()));
        assert_eq!(surface.pixel(20, 5), Some(Rgba::white()));
        // Round caps reach past the endpoints by half the width.
        assert_eq!(surface.pixel(4, 20), Some(Rgba::black()));
        assert_eq!(surface.pixel(0, 20), Some(Rgba::white()));
    }

    #[test]
    fn test_offset_translates_drawing() {
        let mut surface = RasterSurface::new(40, 40).unwrap();
        surface.set_offset(Vec2::new(10.0, 0.0));
        surface.stroke(&line(0.0, 10.0, 5.0, 10.0), &pen(2.0));

        assert_eq!(surface.pixel(12, 10), Some(Rgba::black()));
        assert_eq!(surface.pixel(2, 10), Some(Rgba::white()));
    }

    #[test]
    fn test_highlighter_blends() {
        let mut surface = RasterSurface::new(20, 20).unwrap();
        let brush = Brush {
            color: Rgba::new(255, 0, 0, 255),
            width: 6.0,
            opacity: 0.3,
        };
        surface.stroke(&line(2.0, 10.0, 18.0, 10.0), &brush);

        let p = surface.pixel(10, 10).unwrap();
        assert_eq!(p.r, 255);
        // 30% red over white.
        assert!((176..=181).contains(&p.g));
        assert_eq!(p.a, 255);
    }

    #[test]
    fn test_clear_resets_to_white() {
        let mut surface = RasterSurface::new(10, 10).unwrap();
        surface.stroke(&line(0.0, 5.0, 10.0, 5.0), &pen(10.0));
        surface.clear();
        assert!(surface.pixmap().data().iter().all(|&b| b == 255));
    }

    #[test]
    fn test_text_draws_inside_its_box() {
        let mut surface = RasterSurface::new(100, 40).unwrap();
        surface.fill_text("HI", Point::new(10.0, 30.0), 20.0, &pen(1.0));

        let inked: Vec<(u32, u32)> = (0..40)
            .flat_map(|y| (0..100).map(move |x| (x, y)))
            .filter(|&(x, y)| surface.pixel(x, y) != Some(Rgba::white()))
            .collect();
        assert!(!inked.is_empty());
        // Cap height is 14px above the baseline; two glyphs advance 24px.
        assert!(inked.iter().all(|&(x, y)| (10..34).contains(&x) && (16..30).contains(&y)));
    }

    #[test]
    fn test_png_capture_round_trips() {
        let mut surface = RasterSurface::new(16, 16).unwrap();
        surface.stroke(&line(0.0, 8.0, 16.0, 8.0), &pen(3.0));

        let url = surface.to_data_url(ImageFormat::Png).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));

        let decoded = block_on(RasterImages.decode(&url)).unwrap();
        assert_eq!(decoded.data(), surface.pixmap().data());
    }

    #[test]
    fn test_draw_image_at_world_origin() {
        let mut stamp = RasterSurface::new(4, 4).unwrap();
        stamp.stroke(&line(0.0, 2.0, 4.0, 2.0), &pen(4.0));

        let mut surface = RasterSurface::new(20, 20).unwrap();
        surface.set_offset(Vec2::new(5.0, 5.0));
        surface.draw_image(stamp.pixmap(), Point::new(2.0, 2.0));

        assert_eq!(surface.pixel(8, 8), Some(Rgba::black()));
        assert_eq!(surface.pixel(6, 6), Some(Rgba::white()));
        assert_eq!(surface.pixel(11, 11), Some(Rgba::white()));
    }

    #[test]
    fn test_lined_paper_has_rules() {
        let paper = RasterImages::render_paper(PaperType::Lined, Size::new(100.0, 100.0)).unwrap();
        let white = ColorU8::from_rgba(255, 255, 255, 255);
        assert_ne!(paper.pixel(80, 30).map(|p| p.demultiply()), Some(white));
        assert_eq!(paper.pixel(80, 45).map(|p| p.demultiply()), Some(white));

        let plain = RasterImages::render_paper(PaperType::Plain, Size::new(10.0, 10.0)).unwrap();
        assert!(plain.data().iter().all(|&b| b == 255));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(block_on(RasterImages.decode("data:image/png;base64,AAAA")).is_err());
        assert!(RasterImages::render_paper(PaperType::Grid, Size::ZERO).is_err());
        assert!(RasterSurface::new(0, 10).is_err());
    }
}
