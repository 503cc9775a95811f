//! Page rendering: paper background, snapshot restore and capture.

use crate::surface::{BoxFuture, ImageFormat, ImageSource, RenderResult, Surface};
use inkbook_core::{PaperType, Snapshot};
use kurbo::Point;

/// A restore whose decode is still running.
///
/// Await `decode`, then hand the result to [`RenderPipeline::complete_restore`].
/// Only the most recently requested restore is drawn; completions for older
/// tickets are discarded.
pub struct PendingRestore<T> {
    pub ticket: u64,
    pub origin: Point,
    pub decode: BoxFuture<'static, RenderResult<T>>,
}

/// Draws pages onto a [`Surface`] with bitmaps from an [`ImageSource`].
pub struct RenderPipeline<S: Surface, I: ImageSource<Image = S::Image>> {
    surface: S,
    images: I,
    paper: PaperType,
    /// Decoded paper, `None` until loaded or if loading failed.
    background: Option<S::Image>,
    /// Ticket of the latest restore request.
    ticket: u64,
}

impl<S, I> RenderPipeline<S, I>
where
    S: Surface,
    I: ImageSource<Image = S::Image>,
{
    pub fn new(surface: S, images: I) -> Self {
        Self {
            surface,
            images,
            paper: PaperType::Plain,
            background: None,
            ticket: 0,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn paper(&self) -> PaperType {
        self.paper
    }

    /// Load the paper texture. On failure the page renders on plain white.
    pub async fn load_paper(&mut self, paper: PaperType) {
        if self.paper == paper && self.background.is_some() {
            return;
        }
        self.paper = paper;
        match self.images.paper(paper, self.surface.size()).await {
            Ok(image) => self.background = Some(image),
            Err(e) => {
                log::warn!("Failed to load {} paper: {}", paper, e);
                self.background = None;
            }
        }
    }

    /// Clear the surface and draw the paper.
    pub fn paint_background(&mut self) {
        self.surface.clear();
        if let Some(background) = &self.background {
            self.surface.draw_background(background);
        }
    }

    /// Start restoring a snapshot. Supersedes every earlier request.
    pub fn request_restore(&mut self, snapshot: &Snapshot) -> PendingRestore<S::Image> {
        self.request_image(snapshot.data(), snapshot.origin())
    }

    /// Start drawing a stored bitmap at a world position over the paper.
    pub fn request_image(&mut self, data_url: &str, origin: Point) -> PendingRestore<S::Image> {
        self.ticket += 1;
        log::debug!("Restore #{} requested at {:?}", self.ticket, origin);
        PendingRestore {
            ticket: self.ticket,
            origin,
            decode: self.images.decode(data_url),
        }
    }

    /// Finish a restore once its decode resolved.
    ///
    /// Returns true if the bitmap was drawn. A superseded ticket leaves the
    /// surface alone; a failed decode leaves the bare paper.
    pub fn complete_restore(&mut self, ticket: u64, origin: Point, decoded: RenderResult<S::Image>) -> bool {
        if ticket != self.ticket {
            log::debug!("Dropping stale restore #{} (latest is #{})", ticket, self.ticket);
            return false;
        }
        self.paint_background();
        match decoded {
            Ok(image) => {
                self.surface.draw_image(&image, origin);
                true
            }
            Err(e) => {
                log::warn!("Failed to decode snapshot: {}", e);
                false
            }
        }
    }

    /// Restore a snapshot: paper first, then the bitmap at its origin.
    pub async fn restore(&mut self, snapshot: &Snapshot) -> bool {
        let pending = self.request_restore(snapshot);
        let decoded = pending.decode.await;
        self.complete_restore(pending.ticket, pending.origin, decoded)
    }

    /// Draw a stored bitmap over fresh paper.
    pub async fn restore_image(&mut self, data_url: &str, origin: Point) -> bool {
        let pending = self.request_image(data_url, origin);
        let decoded = pending.decode.await;
        self.complete_restore(pending.ticket, pending.origin, decoded)
    }

    /// Show only the paper. Cancels any restore in flight.
    pub fn restore_blank(&mut self) {
        self.ticket += 1;
        self.paint_background();
    }

    /// Capture the surface as a snapshot anchored at the visible top-left.
    pub fn capture(&self) -> RenderResult<Snapshot> {
        let data = self.surface.to_data_url(ImageFormat::Png)?;
        Ok(Snapshot::new(data, self.view_origin()))
    }

    /// World position of the surface's top-left pixel.
    pub fn view_origin(&self) -> Point {
        (-self.surface.offset()).to_point()
    }
}
