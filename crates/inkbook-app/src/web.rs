//! WebAssembly entry point and browser shell.
//!
//! The page's HTML calls the exported functions below; each one queues a
//! [`UiEvent`]. A single `spawn_local` task drains the queue so only one
//! event touches the session at a time, even while a decode is in flight.

use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult};
use crate::prompt::UserPrompt;
use crate::session::NotebookSession;
use inkbook_core::notebook::display_name;
use inkbook_core::storage::LocalStorage;
use inkbook_core::{Brush, CalendarEntries, PaperType, Rgba, Theme, ToolKind, Weekday};
use inkbook_render::{BoxFuture, ExportArtifact, ImageFormat, ImageSource, RenderError, RenderResult, Surface};
use kurbo::{BezPath, PathEl, Point, Size, Vec2};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

const CANVAS_ID: &str = "drawingCanvas";
/// Autosave poll period; the session decides when a write is due.
const AUTOSAVE_POLL_MS: i32 = 1000;

type WebSession = NotebookSession<LocalStorage, CanvasSurface, HtmlImages, BrowserPrompt>;

fn js_error(error: JsValue) -> String {
    error.as_string().unwrap_or_else(|| format!("{:?}", error))
}

/// Canvas 2D context as a drawing surface.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    offset: Vec2,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self {
            canvas,
            ctx,
            offset: Vec2::ZERO,
        })
    }

    fn apply_brush(&self, brush: &Brush) {
        let color = brush.color.to_css();
        self.ctx.set_global_alpha(brush.opacity);
        self.ctx.set_stroke_style_str(&color);
        self.ctx.set_fill_style_str(&color);
    }
}

impl Surface for CanvasSurface {
    type Image = HtmlImageElement;

    fn size(&self) -> Size {
        Size::new(f64::from(self.canvas.width()), f64::from(self.canvas.height()))
    }

    fn offset(&self) -> Vec2 {
        self.offset
    }

    fn set_offset(&mut self, offset: Vec2) {
        self.offset = offset;
        if let Err(e) = self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, offset.x, offset.y) {
            log::warn!("set_transform failed: {}", js_error(e));
        }
    }

    fn clear(&mut self) {
        let size = self.size();
        self.ctx.save();
        let _ = self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
        self.ctx.set_global_alpha(1.0);
        self.ctx.set_fill_style_str("#FFFFFF");
        self.ctx.fill_rect(0.0, 0.0, size.width, size.height);
        self.ctx.restore();
    }

    fn draw_background(&mut self, image: &HtmlImageElement) {
        let size = self.size();
        self.ctx.set_global_alpha(1.0);
        if let Err(e) = self
            .ctx
            .draw_image_with_html_image_element_and_dw_and_dh(image, 0.0, 0.0, size.width, size.height)
        {
            log::warn!("Failed to draw paper: {}", js_error(e));
        }
    }

    fn draw_image(&mut self, image: &HtmlImageElement, origin: Point) {
        self.ctx.set_global_alpha(1.0);
        if let Err(e) = self.ctx.draw_image_with_html_image_element(image, origin.x, origin.y) {
            log::warn!("Failed to draw bitmap: {}", js_error(e));
        }
    }

    fn stroke(&mut self, path: &BezPath, brush: &Brush) {
        self.apply_brush(brush);
        self.ctx.set_line_width(brush.width);
        self.ctx.set_line_cap("round");
        self.ctx.set_line_join("round");
        self.ctx.begin_path();
        for el in path.elements() {
            match *el {
                PathEl::MoveTo(p) => self.ctx.move_to(p.x, p.y),
                PathEl::LineTo(p) => self.ctx.line_to(p.x, p.y),
                PathEl::QuadTo(c, p) => self.ctx.quadratic_curve_to(c.x, c.y, p.x, p.y),
                PathEl::CurveTo(c1, c2, p) => self.ctx.bezier_curve_to(c1.x, c1.y, c2.x, c2.y, p.x, p.y),
                PathEl::ClosePath => self.ctx.close_path(),
            }
        }
        self.ctx.stroke();
        self.ctx.set_global_alpha(1.0);
    }

    fn fill_text(&mut self, text: &str, origin: Point, font_size: f64, brush: &Brush) {
        self.apply_brush(brush);
        self.ctx.set_font(&format!("{}px Arial", font_size));
        if let Err(e) = self.ctx.fill_text(text, origin.x, origin.y) {
            log::warn!("fill_text failed: {}", js_error(e));
        }
        self.ctx.set_global_alpha(1.0);
    }

    fn to_data_url(&self, format: ImageFormat) -> RenderResult<String> {
        let url = match format {
            ImageFormat::Png => self.canvas.to_data_url(),
            ImageFormat::Jpeg { quality } => self.canvas.to_data_url_with_type_and_encoder_options(
                format.mime_type(),
                &JsValue::from_f64(f64::from(quality) / 100.0),
            ),
        };
        url.map_err(|e| RenderError::Encode(js_error(e)))
    }
}

/// Loads bitmaps through `<img>` elements.
#[derive(Default)]
pub struct HtmlImages;

impl HtmlImages {
    fn load(src: String) -> BoxFuture<'static, RenderResult<HtmlImageElement>> {
        Box::pin(async move {
            let img = HtmlImageElement::new().map_err(|e| RenderError::Decode(js_error(e)))?;

            let promise = js_sys::Promise::new(&mut |resolve, reject| {
                let onload = Closure::once(Box::new(move |_: web_sys::Event| {
                    resolve.call0(&JsValue::NULL).ok();
                }) as Box<dyn FnOnce(_)>);
                let onerror = Closure::once(Box::new(move |_: web_sys::Event| {
                    reject.call1(&JsValue::NULL, &"Failed to load image".into()).ok();
                }) as Box<dyn FnOnce(_)>);

                img.set_onload(Some(onload.as_ref().unchecked_ref()));
                img.set_onerror(Some(onerror.as_ref().unchecked_ref()));
                onload.forget();
                onerror.forget();
            });

            img.set_src(&src);
            wasm_bindgen_futures::JsFuture::from(promise)
                .await
                .map_err(|e| RenderError::Decode(js_error(e)))?;
            Ok(img)
        })
    }
}

impl ImageSource for HtmlImages {
    type Image = HtmlImageElement;

    fn decode(&self, data_url: &str) -> BoxFuture<'static, RenderResult<HtmlImageElement>> {
        Self::load(data_url.to_string())
    }

    fn paper(&self, paper: PaperType, _size: Size) -> BoxFuture<'static, RenderResult<HtmlImageElement>> {
        Self::load(paper.asset_path())
    }
}

/// `window.prompt` and `window.alert`.
#[derive(Default)]
pub struct BrowserPrompt;

impl UserPrompt for BrowserPrompt {
    fn prompt_text(&self, message: &str) -> Option<String> {
        web_sys::window()?.prompt_with_message(message).ok().flatten()
    }

    fn alert(&self, message: &str) {
        if let Some(window) = web_sys::window() {
            window.alert_with_message(message).ok();
        }
    }
}

enum UiEvent {
    PointerDown(Point),
    PointerMove(Point),
    PointerUp(Point),
    SelectTool(ToolKind),
    SelectColor(Rgba),
    StrokeWidth(f64),
    AddColor(Rgba),
    Undo,
    Redo,
    NextPage,
    PrevPage,
    AddPage,
    CreateNotebook { name: String, paper: PaperType },
    OpenNotebook(String),
    ExportImage,
    ExportDocument,
    ToggleTheme,
    Tick,
}

#[derive(Default)]
struct Shell {
    /// `None` until started, and while the pump holds it.
    session: RefCell<Option<WebSession>>,
    queue: RefCell<VecDeque<UiEvent>>,
    pumping: Cell<bool>,
}

thread_local! {
    static SHELL: Rc<Shell> = Rc::new(Shell::default());
}

fn enqueue(event: UiEvent) {
    SHELL.with(|shell| {
        {
            let mut queue = shell.queue.borrow_mut();
            let coalesced = match (&event, queue.back_mut()) {
                (UiEvent::PointerMove(position), Some(UiEvent::PointerMove(last))) => {
                    *last = *position;
                    true
                }
                _ => false,
            };
            if !coalesced {
                queue.push_back(event);
            }
        }
        schedule_pump(shell);
    });
}

fn schedule_pump(shell: &Rc<Shell>) {
    if shell.pumping.replace(true) {
        return;
    }
    let shell = shell.clone();
    wasm_bindgen_futures::spawn_local(async move {
        pump(&shell).await;
        shell.pumping.set(false);
    });
}

async fn pump(shell: &Shell) {
    loop {
        let Some(mut session) = shell.session.borrow_mut().take() else {
            return;
        };
        let event = shell.queue.borrow_mut().pop_front();
        let Some(event) = event else {
            *shell.session.borrow_mut() = Some(session);
            return;
        };
        if let Err(e) = handle(&mut session, event).await {
            log::warn!("{}", e);
        }
        update_page_label(&session);
        *shell.session.borrow_mut() = Some(session);
    }
}

async fn handle(session: &mut WebSession, event: UiEvent) -> SessionResult<()> {
    match event {
        UiEvent::PointerDown(position) => session.pointer_down(position).await?,
        UiEvent::PointerMove(position) => session.pointer_move(position).await?,
        UiEvent::PointerUp(position) => session.pointer_up(position).await?,
        UiEvent::SelectTool(tool) => session.set_tool(tool),
        UiEvent::SelectColor(color) => session.set_color(color),
        UiEvent::StrokeWidth(width) => session.set_stroke_width(width),
        UiEvent::AddColor(color) => {
            if session.add_custom_color(color).await {
                render_palette(session);
            }
        }
        UiEvent::Undo => {
            session.undo().await?;
        }
        UiEvent::Redo => {
            session.redo().await?;
        }
        UiEvent::NextPage => {
            session.next_page().await?;
        }
        UiEvent::PrevPage => {
            session.prev_page().await?;
        }
        UiEvent::AddPage => {
            session.add_page().await?;
        }
        UiEvent::CreateNotebook { name, paper } => match session.create_notebook(&name, paper).await {
            Ok(_) => {
                render_sidebar(session);
                set_display("#createNotebookModal", "none");
            }
            // Already reported to the user.
            Err(SessionError::Notebook(_)) => {}
            Err(e) => return Err(e),
        },
        UiEvent::OpenNotebook(name) => {
            if session.open_notebook(&name).await? {
                set_display("#toolbar", "flex");
                set_display(".pagination", "flex");
                set_display(".add-page", "block");
            }
        }
        UiEvent::ExportImage => download(&session.export_image()?),
        UiEvent::ExportDocument => download(&session.export_document()?),
        UiEvent::ToggleTheme => apply_theme(session.toggle_theme().await?),
        UiEvent::Tick => {
            session.tick().await;
        }
    }
    Ok(())
}

fn document() -> Option<web_sys::Document> {
    web_sys::window()?.document()
}

fn set_display(selector: &str, display: &str) {
    let element = document()
        .and_then(|doc| doc.query_selector(selector).ok().flatten())
        .and_then(|el| el.dyn_into::<web_sys::HtmlElement>().ok());
    if let Some(element) = element {
        element.style().set_property("display", display).ok();
    }
}

fn set_text(id: &str, text: &str) {
    if let Some(element) = document().and_then(|doc| doc.get_element_by_id(id)) {
        element.set_text_content(Some(text));
    }
}

fn apply_theme(theme: Theme) {
    let root = document()
        .and_then(|doc| doc.document_element())
        .and_then(|el| el.dyn_into::<web_sys::HtmlElement>().ok());
    let Some(root) = root else {
        return;
    };
    let style = root.style();
    for (name, value) in theme.css_variables() {
        style.set_property(name, value).ok();
    }
}

fn update_page_label(session: &WebSession) {
    if let Some(open) = session.open_page() {
        set_text("subjectTitle", &display_name(&open.notebook));
        set_text("currentPage", &open.page.to_string());
    }
}

/// Rebuild the notebook list. Clicks are handled by one listener on the list.
fn render_sidebar(session: &WebSession) {
    let Some(doc) = document() else {
        return;
    };
    let Some(list) = doc.get_element_by_id("subjectList") else {
        return;
    };
    list.set_inner_html("");
    for name in session.notebooks().names() {
        let Ok(item) = doc.create_element("li") else {
            continue;
        };
        let Ok(link) = doc.create_element("a") else {
            continue;
        };
        link.set_attribute("href", "#").ok();
        link.set_attribute("data-notebook", name).ok();
        link.set_text_content(Some(&display_name(name)));
        item.append_child(&link).ok();
        list.append_child(&item).ok();
    }
}

fn render_palette(session: &WebSession) {
    let Some(doc) = document() else {
        return;
    };
    let Some(palette) = doc.get_element_by_id("colorPalette") else {
        return;
    };
    palette.set_inner_html("");
    for color in session.palette().colors() {
        let Ok(swatch) = doc.create_element("div") else {
            continue;
        };
        swatch.set_class_name("color-swatch");
        swatch.set_attribute("data-color", &color.to_hex()).ok();
        swatch
            .set_attribute("style", &format!("background-color: {}", color.to_hex()))
            .ok();
        palette.append_child(&swatch).ok();
    }
}

/// Forward clicks on descendants carrying `attribute` to `on_click`.
fn delegate_clicks(container_id: &str, attribute: &'static str, on_click: fn(String)) {
    let Some(container) = document().and_then(|doc| doc.get_element_by_id(container_id)) else {
        return;
    };
    let handler = Closure::wrap(Box::new(move |event: web_sys::Event| {
        let target = event
            .target()
            .and_then(|target| target.dyn_into::<web_sys::Element>().ok())
            .and_then(|el| el.closest(&format!("[{attribute}]")).ok().flatten());
        if let Some(value) = target.and_then(|el| el.get_attribute(attribute)) {
            event.prevent_default();
            on_click(value);
        }
    }) as Box<dyn FnMut(_)>);
    container
        .add_event_listener_with_callback("click", handler.as_ref().unchecked_ref())
        .ok();
    handler.forget();
}

fn listen(target: &web_sys::EventTarget, name: &str, make_event: fn(Point) -> UiEvent) {
    let handler = Closure::wrap(Box::new(move |event: web_sys::MouseEvent| {
        let position = Point::new(f64::from(event.offset_x()), f64::from(event.offset_y()));
        enqueue(make_event(position));
    }) as Box<dyn FnMut(_)>);
    target
        .add_event_listener_with_callback(name, handler.as_ref().unchecked_ref())
        .ok();
    handler.forget();
}

fn download(artifact: &ExportArtifact) {
    if let Err(e) = download_binary_file(&artifact.file_name, &artifact.bytes, artifact.mime_type) {
        log::error!("Failed to download {}: {}", artifact.file_name, js_error(e));
    }
}

fn download_binary_file(filename: &str, data: &[u8], mime_type: &str) -> Result<(), JsValue> {
    let doc = document().ok_or("No document")?;

    let uint8_array = js_sys::Uint8Array::from(data);
    let blob_parts = js_sys::Array::new();
    blob_parts.push(&uint8_array);

    let options = web_sys::BlobPropertyBag::new();
    options.set_type(mime_type);
    let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&blob_parts, &options)?;
    let url = web_sys::Url::create_object_url_with_blob(&blob)?;

    let a = doc.create_element("a")?.dyn_into::<web_sys::HtmlAnchorElement>()?;
    a.set_href(&url);
    a.set_download(filename);
    a.click();

    web_sys::Url::revoke_object_url(&url).ok();
    Ok(())
}

fn input_value(id: &str) -> Option<String> {
    let element = document()?.get_element_by_id(id)?;
    if let Some(input) = element.dyn_ref::<web_sys::HtmlInputElement>() {
        return Some(input.value());
    }
    element
        .dyn_ref::<web_sys::HtmlSelectElement>()
        .map(web_sys::HtmlSelectElement::value)
}

#[wasm_bindgen(js_name = setTool)]
pub fn set_tool(name: &str) {
    match name.parse::<ToolKind>() {
        Ok(tool) => enqueue(UiEvent::SelectTool(tool)),
        Err(e) => log::warn!("{}", e),
    }
}

#[wasm_bindgen(js_name = setColor)]
pub fn set_color(hex: &str) {
    match Rgba::parse_hex(hex) {
        Some(color) => enqueue(UiEvent::SelectColor(color)),
        None => log::warn!("Ignoring color {:?}", hex),
    }
}

#[wasm_bindgen(js_name = setBrushSize)]
pub fn set_brush_size(width: f64) {
    enqueue(UiEvent::StrokeWidth(width));
}

#[wasm_bindgen(js_name = addCustomColor)]
pub fn add_custom_color(hex: &str) {
    if let Some(color) = Rgba::parse_hex(hex) {
        enqueue(UiEvent::AddColor(color));
    }
}

#[wasm_bindgen]
pub fn undo() {
    enqueue(UiEvent::Undo);
}

#[wasm_bindgen]
pub fn redo() {
    enqueue(UiEvent::Redo);
}

#[wasm_bindgen(js_name = nextPage)]
pub fn next_page() {
    enqueue(UiEvent::NextPage);
}

#[wasm_bindgen(js_name = prevPage)]
pub fn prev_page() {
    enqueue(UiEvent::PrevPage);
}

#[wasm_bindgen(js_name = addPage)]
pub fn add_page() {
    enqueue(UiEvent::AddPage);
}

#[wasm_bindgen(js_name = openCreateNotebookModal)]
pub fn open_create_notebook_modal() {
    set_display("#createNotebookModal", "block");
}

#[wasm_bindgen(js_name = closeCreateNotebookModal)]
pub fn close_create_notebook_modal() {
    set_display("#createNotebookModal", "none");
}

/// Create a notebook from the modal's name and paper fields.
#[wasm_bindgen(js_name = createNotebook)]
pub fn create_notebook() {
    let name = input_value("notebookName").unwrap_or_default();
    let paper = input_value("paperType")
        .map(PaperType::from)
        .unwrap_or_default();
    enqueue(UiEvent::CreateNotebook { name, paper });
}

#[wasm_bindgen(js_name = openSubject)]
pub fn open_subject(name: String) {
    enqueue(UiEvent::OpenNotebook(name));
}

#[wasm_bindgen(js_name = exportAsImage)]
pub fn export_as_image() {
    enqueue(UiEvent::ExportImage);
}

#[wasm_bindgen(js_name = exportAsPDF)]
pub fn export_as_pdf() {
    enqueue(UiEvent::ExportDocument);
}

#[wasm_bindgen(js_name = toggleTheme)]
pub fn toggle_theme() {
    enqueue(UiEvent::ToggleTheme);
}

fn redirect(page: &str) {
    if let Some(window) = web_sys::window() {
        window.location().set_href(page).ok();
    }
}

#[wasm_bindgen(js_name = goToCalendar)]
pub fn go_to_calendar() {
    redirect("calendar.html");
}

#[wasm_bindgen(js_name = goBack)]
pub fn go_back() {
    redirect("index.html");
}

/// Flush synchronously before the page goes away.
///
/// `localStorage` writes complete on the first poll, so one poll suffices.
/// If the pump currently holds the session the flush is skipped.
fn flush_on_unload() {
    SHELL.with(|shell| {
        let Ok(mut slot) = shell.session.try_borrow_mut() else {
            return;
        };
        let Some(session) = slot.as_mut() else {
            log::warn!("Session busy during unload; last changes may be lost");
            return;
        };
        let mut cx = Context::from_waker(Waker::noop());
        let mut flush = std::pin::pin!(session.flush());
        if let Poll::Pending = flush.as_mut().poll(&mut cx) {
            log::error!("Flush did not complete before unload");
        }
    });
}

fn install_window_handlers() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("No window")?;

    let tick = Closure::wrap(Box::new(|| enqueue(UiEvent::Tick)) as Box<dyn FnMut()>);
    window.set_interval_with_callback_and_timeout_and_arguments_0(tick.as_ref().unchecked_ref(), AUTOSAVE_POLL_MS)?;
    tick.forget();

    let unload = Closure::wrap(Box::new(flush_on_unload) as Box<dyn FnMut()>);
    window.set_onbeforeunload(Some(unload.as_ref().unchecked_ref()));
    unload.forget();
    Ok(())
}

fn mount_canvas(config: &SessionConfig) -> Result<HtmlCanvasElement, JsValue> {
    let doc = document().ok_or("No document")?;
    let canvas = match doc.get_element_by_id(CANVAS_ID) {
        Some(element) => element.dyn_into::<HtmlCanvasElement>()?,
        None => {
            let canvas = doc.create_element("canvas")?.dyn_into::<HtmlCanvasElement>()?;
            canvas.set_id(CANVAS_ID);
            let area = doc.get_element_by_id("contentArea").ok_or("No #contentArea")?;
            area.set_inner_html("");
            area.append_child(&canvas)?;
            canvas
        }
    };
    canvas.set_width(config.canvas_width);
    canvas.set_height(config.canvas_height);

    listen(&canvas, "mousedown", UiEvent::PointerDown);
    listen(&canvas, "mousemove", UiEvent::PointerMove);
    listen(&canvas, "mouseup", UiEvent::PointerUp);
    listen(&canvas, "mouseout", UiEvent::PointerUp);
    Ok(canvas)
}

async fn start_notebooks(config: SessionConfig) -> Result<(), JsValue> {
    let canvas = mount_canvas(&config)?;
    let surface = CanvasSurface::new(canvas)?;
    let session = match NotebookSession::start(LocalStorage, BrowserPrompt, surface, HtmlImages, &config).await {
        Ok(session) => session,
        Err(SessionError::NotLoggedIn) => {
            redirect("login.html");
            return Ok(());
        }
        Err(e) => return Err(JsValue::from_str(&e.to_string())),
    };

    render_sidebar(&session);
    render_palette(&session);
    delegate_clicks("subjectList", "data-notebook", |name| enqueue(UiEvent::OpenNotebook(name)));
    delegate_clicks("colorPalette", "data-color", |hex| set_color(&hex));
    install_window_handlers()?;

    SHELL.with(|shell| {
        *shell.session.borrow_mut() = Some(session);
        schedule_pump(shell);
    });
    Ok(())
}

/// Build the weekly calendar editor in `.calendar-container`.
async fn start_calendar(container: web_sys::Element) -> Result<(), JsValue> {
    let Some(user) = inkbook_core::storage::current_user(&LocalStorage)
        .await
        .map_err(|e| JsValue::from_str(&e.to_string()))?
    else {
        redirect("login.html");
        return Ok(());
    };
    let doc = document().ok_or("No document")?;
    let entries = CalendarEntries::load(&LocalStorage, &user).await.unwrap_or_else(|e| {
        log::warn!("Failed to load calendar: {}", e);
        CalendarEntries::default()
    });
    let entries = Rc::new(RefCell::new(entries));

    container.set_inner_html("");
    for day in Weekday::ALL {
        let day_div = doc.create_element("div")?;
        day_div.set_class_name("calendar-day");
        let title = doc.create_element("h2")?;
        title.set_text_content(Some(day.name()));
        let textarea = doc
            .create_element("textarea")?
            .dyn_into::<web_sys::HtmlTextAreaElement>()?;
        textarea.set_value(entries.borrow().entry(day));

        let entries = entries.clone();
        let user = user.clone();
        let field = textarea.clone();
        let oninput = Closure::wrap(Box::new(move || {
            let mut entries = entries.borrow_mut();
            let mut write = std::pin::pin!(entries.set_entry(&LocalStorage, &user, day, field.value()));
            // localStorage completes synchronously.
            let mut cx = Context::from_waker(Waker::noop());
            match write.as_mut().poll(&mut cx) {
                Poll::Ready(Err(e)) => log::warn!("Failed to save {}: {}", day, e),
                Poll::Ready(Ok(())) => {}
                Poll::Pending => log::warn!("Calendar write for {} still pending", day),
            }
        }) as Box<dyn FnMut()>);
        textarea.set_oninput(Some(oninput.as_ref().unchecked_ref()));
        oninput.forget();

        day_div.append_child(&title)?;
        day_div.append_child(&textarea)?;
        container.append_child(&day_div)?;
    }
    Ok(())
}

/// Initialize and run the WASM application.
#[wasm_bindgen(start)]
pub async fn run_wasm() {
    console_error_panic_hook::set_once();

    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::error_1(&JsValue::from_str(&e.to_string()));
    }

    log::info!("Starting Inkbook (WASM)");

    match Theme::load(&LocalStorage).await {
        Ok(theme) => apply_theme(theme),
        Err(e) => log::warn!("Failed to load theme: {}", e),
    }

    let calendar = document().and_then(|doc| doc.query_selector(".calendar-container").ok().flatten());
    let result = match calendar {
        Some(container) => start_calendar(container).await,
        None => start_notebooks(SessionConfig::default()).await,
    };
    if let Err(e) = result {
        log::error!("Startup failed: {}", js_error(e));
    }
}
