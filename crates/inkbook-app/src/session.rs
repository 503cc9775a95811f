//! The notebook session: one logged-in user editing one page at a time.
//!
//! [`NotebookSession`] owns the user's notebook collection, the open page's
//! undo history, the tool state and the render pipeline. Every gesture
//! commit captures the surface, pushes it to history and writes the page
//! through to the key-value store.

use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult};
use crate::prompt::UserPrompt;
use inkbook_core::storage::{self, AutoSaveManager, KeyValueStore, load_json, notebooks_key};
use inkbook_core::{
    CalendarEntries, Camera, Notebook, NotebookError, Notebooks, Page, Palette, PaperType, Rgba, Snapshot, SnapshotStore, Theme,
    ToolAction, ToolConfig, ToolKind, ToolManager, UndoStep, Weekday,
};
use inkbook_render::{ExportArtifact, ImageFormat, ImageSource, RenderPipeline, Surface, export_document, export_image};
use kurbo::{Point, Shape};

/// Flattening tolerance for shape outlines.
const SHAPE_TOLERANCE: f64 = 0.1;

/// Notebook and page currently shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenPage {
    pub notebook: String,
    /// 1-based page number.
    pub page: usize,
}

pub struct NotebookSession<K, S, I, P>
where
    K: KeyValueStore,
    S: Surface,
    I: ImageSource<Image = S::Image>,
    P: UserPrompt,
{
    store: K,
    prompt: P,
    user: String,
    notebooks: Notebooks,
    calendar: CalendarEntries,
    palette: Palette,
    autosave: AutoSaveManager,
    open: Option<OpenPage>,
    tools: ToolManager,
    camera: Camera,
    history: SnapshotStore,
    /// Bitmap the page was loaded with, if any.
    base: Option<Snapshot>,
    pipeline: RenderPipeline<S, I>,
}

impl<K, S, I, P> NotebookSession<K, S, I, P>
where
    K: KeyValueStore,
    S: Surface,
    I: ImageSource<Image = S::Image>,
    P: UserPrompt,
{
    /// Start a session for the user recorded in the store.
    pub async fn start(
        store: K,
        prompt: P,
        surface: S,
        images: I,
        config: &SessionConfig,
    ) -> SessionResult<Self> {
        let Some(user) = storage::current_user(&store).await? else {
            return Err(SessionError::NotLoggedIn);
        };
        Self::for_user(store, prompt, surface, images, config, &user).await
    }

    /// Start a session for an explicit user.
    pub async fn for_user(
        store: K,
        prompt: P,
        surface: S,
        images: I,
        config: &SessionConfig,
        user: &str,
    ) -> SessionResult<Self> {
        let notebooks: Notebooks = load_json(&store, &notebooks_key(user)).await?;
        let calendar = CalendarEntries::load(&store, user).await.unwrap_or_else(|e| {
            log::warn!("Failed to load calendar for {}: {}", user, e);
            CalendarEntries::default()
        });
        let palette = Palette::load(&store).await.unwrap_or_else(|e| {
            log::warn!("Failed to load palette: {}", e);
            Palette::default()
        });
        log::info!("Session started for {} with {} notebooks", user, notebooks.len());

        Ok(Self {
            store,
            prompt,
            user: user.to_string(),
            notebooks,
            calendar,
            palette,
            autosave: AutoSaveManager::new(config.autosave_interval()),
            open: None,
            tools: ToolManager::new(),
            camera: Camera::new(),
            history: SnapshotStore::with_limit(config.history_limit),
            base: None,
            pipeline: RenderPipeline::new(surface, images),
        })
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn store(&self) -> &K {
        &self.store
    }

    pub fn prompt(&self) -> &P {
        &self.prompt
    }

    pub fn notebooks(&self) -> &Notebooks {
        &self.notebooks
    }

    pub fn open_page(&self) -> Option<&OpenPage> {
        self.open.as_ref()
    }

    pub fn current_notebook(&self) -> Option<&Notebook> {
        self.open.as_ref().and_then(|open| self.notebooks.get(&open.notebook))
    }

    pub fn current_page(&self) -> Option<usize> {
        self.open.as_ref().map(|open| open.page)
    }

    pub fn page_count(&self) -> usize {
        self.current_notebook().map(Notebook::page_count).unwrap_or(0)
    }

    pub fn history(&self) -> &SnapshotStore {
        &self.history
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn tool_config(&self) -> &ToolConfig {
        self.tools.config()
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn calendar(&self) -> &CalendarEntries {
        &self.calendar
    }

    pub fn pipeline(&self) -> &RenderPipeline<S, I> {
        &self.pipeline
    }

    pub fn surface(&self) -> &S {
        self.pipeline.surface()
    }

    /// Whether the collection has changes not yet in the store.
    pub fn is_dirty(&self) -> bool {
        self.autosave.is_dirty()
    }

    /// Create a notebook and persist the collection. Invalid names are
    /// reported to the user and change nothing.
    pub async fn create_notebook(&mut self, name: &str, paper_type: PaperType) -> SessionResult<String> {
        match self.notebooks.create(name, paper_type) {
            Ok(name) => {
                log::info!("Created notebook {} ({})", name, paper_type);
                self.autosave.mark_dirty();
                self.persist().await;
                Ok(name)
            }
            Err(e) => {
                self.prompt.alert(&e.to_string());
                Err(e.into())
            }
        }
    }

    /// Open a notebook at its first page. Unknown names are ignored.
    pub async fn open_notebook(&mut self, name: &str) -> SessionResult<bool> {
        let Some(notebook) = self.notebooks.get_mut(name) else {
            log::debug!("Notebook {} not found", name);
            return Ok(false);
        };
        if notebook.ensure_first_page() {
            self.autosave.mark_dirty();
        }
        self.open = Some(OpenPage {
            notebook: name.to_string(),
            page: 1,
        });
        self.display_page().await?;
        Ok(true)
    }

    /// Show a page of the open notebook. Out-of-range numbers are ignored.
    pub async fn goto_page(&mut self, page: usize) -> SessionResult<bool> {
        let count = self.page_count();
        let Some(open) = self.open.as_mut() else {
            return Ok(false);
        };
        if page == 0 || page > count || page == open.page {
            return Ok(false);
        }
        open.page = page;
        self.display_page().await?;
        Ok(true)
    }

    pub async fn next_page(&mut self) -> SessionResult<bool> {
        match self.current_page() {
            Some(page) => self.goto_page(page + 1).await,
            None => Ok(false),
        }
    }

    pub async fn prev_page(&mut self) -> SessionResult<bool> {
        match self.current_page() {
            Some(page) if page > 1 => self.goto_page(page - 1).await,
            _ => Ok(false),
        }
    }

    /// Append a blank page to the open notebook and switch to it.
    pub async fn add_page(&mut self) -> SessionResult<usize> {
        let open = self.open.as_mut().ok_or(SessionError::NoOpenPage)?;
        let notebook = self
            .notebooks
            .get_mut(&open.notebook)
            .ok_or_else(|| NotebookError::NotFound(open.notebook.clone()))?;
        let page = notebook.add_page();
        open.page = page;
        log::info!("Added page {} to {}", page, open.notebook);
        self.autosave.mark_dirty();
        self.persist().await;
        self.display_page().await?;
        Ok(page)
    }

    /// Load the open page onto the surface with fresh history.
    async fn display_page(&mut self) -> SessionResult<()> {
        let Some(open) = self.open.clone() else {
            return Err(SessionError::NoOpenPage);
        };
        let Some(notebook) = self.notebooks.get(&open.notebook) else {
            return Err(NotebookError::NotFound(open.notebook).into());
        };
        let paper = notebook.paper_type;
        let bitmap = notebook.page(open.page).and_then(Page::bitmap).map(str::to_string);

        self.tools.cancel();
        self.history.clear();
        self.base = None;

        self.pipeline.load_paper(paper).await;
        self.pipeline.surface_mut().set_offset(self.camera.offset);
        match bitmap {
            Some(data) => {
                let origin = self.camera.view_origin();
                if self.pipeline.restore_image(&data, origin).await {
                    self.base = Some(Snapshot::new(data, origin));
                }
            }
            None => self.pipeline.restore_blank(),
        }
        log::debug!("Displaying {} page {}", open.notebook, open.page);
        Ok(())
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        self.tools.set_tool(tool);
    }

    pub fn set_color(&mut self, color: Rgba) {
        self.tools.set_color(color);
    }

    pub fn set_stroke_width(&mut self, width: f64) {
        self.tools.set_stroke_width(width);
    }

    /// Add a custom palette color, select it, and persist the palette.
    pub async fn add_custom_color(&mut self, color: Rgba) -> bool {
        self.tools.set_color(color);
        if !self.palette.add(color) {
            return false;
        }
        if let Err(e) = self.palette.save(&self.store).await {
            log::warn!("Failed to save palette: {}", e);
        }
        true
    }

    /// Switch between dark and light themes.
    pub async fn toggle_theme(&mut self) -> SessionResult<Theme> {
        Ok(Theme::toggle(&self.store).await?)
    }

    /// Update one calendar day; the calendar is written immediately.
    pub async fn set_calendar_entry(&mut self, day: Weekday, text: &str) -> SessionResult<()> {
        self.calendar.set_entry(&self.store, &self.user, day, text).await?;
        Ok(())
    }

    /// Pointer pressed at a surface position.
    pub async fn pointer_down(&mut self, position: Point) -> SessionResult<()> {
        if self.open.is_none() {
            return Ok(());
        }
        let action = self.tools.press(position, &self.camera);
        if action.starts_gesture() {
            self.history.begin_gesture();
        }
        if let ToolAction::TextRequested {
            origin,
            font_size,
            brush,
        } = action
        {
            let text = self.prompt.prompt_text("Enter text:");
            match text.filter(|text| !text.is_empty()) {
                Some(text) => {
                    self.pipeline
                        .surface_mut()
                        .fill_text(&text, origin, font_size, &brush);
                    self.commit().await?;
                }
                None => log::debug!("Text entry cancelled"),
            }
        }
        Ok(())
    }

    /// Pointer moved to a surface position.
    pub async fn pointer_move(&mut self, position: Point) -> SessionResult<()> {
        match self.tools.motion(position, &mut self.camera) {
            ToolAction::StrokeSegment { segment, brush } => {
                let path = segment.to_path(SHAPE_TOLERANCE);
                self.pipeline.surface_mut().stroke(&path, &brush);
            }
            ToolAction::ShapePreview { shape, brush } => {
                self.redraw_committed().await;
                self.pipeline
                    .surface_mut()
                    .stroke(&shape.to_path(SHAPE_TOLERANCE), &brush);
            }
            ToolAction::ShapeCleared => self.redraw_committed().await,
            ToolAction::PanMoved { offset } => {
                self.pipeline.surface_mut().set_offset(offset);
                self.redraw_committed().await;
            }
            _ => {}
        }
        Ok(())
    }

    /// Pointer released (or left the surface) at a position.
    pub async fn pointer_up(&mut self, position: Point) -> SessionResult<()> {
        match self.tools.release(position, &self.camera) {
            ToolAction::StrokeCommit => self.commit().await?,
            ToolAction::ShapeCommit { shape, brush } => {
                self.redraw_committed().await;
                self.pipeline
                    .surface_mut()
                    .stroke(&shape.to_path(SHAPE_TOLERANCE), &brush);
                self.commit().await?;
            }
            ToolAction::ShapeCleared => self.redraw_committed().await,
            ToolAction::PanEnded => log::debug!("Pan ended at {:?}", self.camera.offset),
            _ => {}
        }
        Ok(())
    }

    /// Latest committed content: the newest snapshot, else the loaded page.
    fn committed(&self) -> Option<Snapshot> {
        self.history.current().or(self.base.as_ref()).cloned()
    }

    /// Redraw paper plus committed content at the current pan.
    async fn redraw_committed(&mut self) {
        match self.committed() {
            Some(snapshot) => {
                self.pipeline.restore(&snapshot).await;
            }
            None => self.pipeline.restore_blank(),
        }
    }

    /// Record the surface as a new history state and save the page.
    async fn commit(&mut self) -> SessionResult<()> {
        let snapshot = self.pipeline.capture()?;
        let data = snapshot.data().to_string();
        self.history.push(snapshot);
        self.store_page(data).await
    }

    /// Step back one committed state and save the page.
    pub async fn undo(&mut self) -> SessionResult<bool> {
        if self.open.is_none() {
            return Ok(false);
        }
        match self.history.undo() {
            UndoStep::Restore(snapshot) => {
                if self.pipeline.restore(&snapshot).await {
                    self.save_page().await?;
                }
                Ok(true)
            }
            UndoStep::Blank => {
                self.base = None;
                self.pipeline.restore_blank();
                self.save_page().await?;
                Ok(true)
            }
            UndoStep::Unchanged => Ok(false),
        }
    }

    /// Re-apply the last undone state and save the page.
    pub async fn redo(&mut self) -> SessionResult<bool> {
        if self.open.is_none() {
            return Ok(false);
        }
        let Some(snapshot) = self.history.redo() else {
            return Ok(false);
        };
        if self.pipeline.restore(&snapshot).await {
            self.save_page().await?;
        }
        Ok(true)
    }

    /// Capture the surface into the open page and flush the collection.
    pub async fn save_page(&mut self) -> SessionResult<()> {
        let data = self.pipeline.surface().to_data_url(ImageFormat::Png)?;
        self.store_page(data).await
    }

    async fn store_page(&mut self, data: String) -> SessionResult<()> {
        let open = self.open.as_ref().ok_or(SessionError::NoOpenPage)?;
        let notebook = self
            .notebooks
            .get_mut(&open.notebook)
            .ok_or_else(|| NotebookError::NotFound(open.notebook.clone()))?;
        notebook.set_page(open.page, Page::from_bitmap(data))?;
        self.autosave.mark_dirty();
        self.persist().await;
        Ok(())
    }

    /// Write the collection now. Failures are reported and leave it dirty.
    async fn persist(&mut self) -> bool {
        let key = notebooks_key(&self.user);
        match self.autosave.flush(&self.store, &key, &self.notebooks).await {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed to save notebooks: {}", e);
                self.prompt.alert(&format!("Could not save your notebook: {e}"));
                false
            }
        }
    }

    /// Periodic autosave: rewrites the collection once the autosave interval
    /// has elapsed, even when nothing changed. Returns true if it wrote.
    pub async fn tick(&mut self) -> bool {
        let key = notebooks_key(&self.user);
        match self.autosave.maybe_flush(&self.store, &key, &self.notebooks).await {
            Ok(flushed) => flushed,
            Err(e) => {
                log::warn!("Autosave failed, will retry: {}", e);
                false
            }
        }
    }

    /// Final flush before the session goes away.
    pub async fn flush(&mut self) -> bool {
        if !self.autosave.is_dirty() {
            return true;
        }
        let key = notebooks_key(&self.user);
        match self.autosave.flush(&self.store, &key, &self.notebooks).await {
            Ok(()) => true,
            Err(e) => {
                log::error!("Unsaved notebook changes lost: {}", e);
                false
            }
        }
    }

    fn export_name(&self) -> SessionResult<(String, usize)> {
        let open = self.open.as_ref().ok_or(SessionError::NoOpenPage)?;
        Ok((open.notebook.clone(), open.page))
    }

    /// Export the open page as PNG.
    pub fn export_image(&mut self) -> SessionResult<ExportArtifact> {
        let (notebook, page) = self.export_name()?;
        Ok(export_image(self.pipeline.surface_mut(), &notebook, page)?)
    }

    /// Export the open page as a one-page PDF.
    pub fn export_document(&mut self) -> SessionResult<ExportArtifact> {
        let (notebook, page) = self.export_name()?;
        Ok(export_document(self.pipeline.surface_mut(), &notebook, page)?)
    }
}
