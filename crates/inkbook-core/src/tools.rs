//! Tool system for the notebook page.
//!
//! [`ToolManager`] turns press/move/release input into [`ToolAction`]s. It
//! never touches pixels itself: the caller draws what each action describes
//! and decides when to capture a snapshot.

use crate::camera::Camera;
use crate::color::Rgba;
use kurbo::{BezPath, Circle, Line, Point, Rect, Shape, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opacity applied to highlighter strokes.
pub const HIGHLIGHTER_OPACITY: f64 = 0.3;

/// Text is rendered at this multiple of the stroke width.
pub const TEXT_SCALE: f64 = 2.0;

/// Default stroke width in pixels.
pub const DEFAULT_STROKE_WIDTH: f64 = 5.0;

/// Smallest and largest accepted stroke widths.
pub const MIN_STROKE_WIDTH: f64 = 1.0;
pub const MAX_STROKE_WIDTH: f64 = 100.0;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Pen,
    Eraser,
    Highlighter,
    Line,
    Rectangle,
    Circle,
    Text,
    Pan,
}

impl ToolKind {
    pub const ALL: [ToolKind; 8] = [
        ToolKind::Pen,
        ToolKind::Eraser,
        ToolKind::Highlighter,
        ToolKind::Line,
        ToolKind::Rectangle,
        ToolKind::Circle,
        ToolKind::Text,
        ToolKind::Pan,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Pen => "pen",
            ToolKind::Eraser => "eraser",
            ToolKind::Highlighter => "highlighter",
            ToolKind::Line => "line",
            ToolKind::Rectangle => "rectangle",
            ToolKind::Circle => "circle",
            ToolKind::Text => "text",
            ToolKind::Pan => "pan",
        }
    }

    /// Freehand tools that emit a segment per pointer move.
    pub fn is_freehand(self) -> bool {
        matches!(self, ToolKind::Pen | ToolKind::Eraser | ToolKind::Highlighter)
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ToolKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolKind::ALL
            .into_iter()
            .find(|tool| tool.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown tool: {s}"))
    }
}

/// Clamp a stroke width into the accepted range.
pub fn sanitize_stroke_width(width: f64) -> f64 {
    if width.is_finite() {
        width.clamp(MIN_STROKE_WIDTH, MAX_STROKE_WIDTH)
    } else {
        DEFAULT_STROKE_WIDTH
    }
}

/// The user's current tool selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToolConfig {
    pub tool: ToolKind,
    pub color: Rgba,
    stroke_width: f64,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            tool: ToolKind::default(),
            color: Rgba::black(),
            stroke_width: DEFAULT_STROKE_WIDTH,
        }
    }
}

impl ToolConfig {
    pub fn stroke_width(&self) -> f64 {
        self.stroke_width
    }

    pub fn set_stroke_width(&mut self, width: f64) {
        self.stroke_width = sanitize_stroke_width(width);
    }

    /// Paint used by the current tool.
    pub fn brush(&self) -> Brush {
        match self.tool {
            ToolKind::Eraser => Brush {
                color: Rgba::white(),
                width: self.stroke_width,
                opacity: 1.0,
            },
            ToolKind::Highlighter => Brush {
                color: self.color,
                width: self.stroke_width,
                opacity: HIGHLIGHTER_OPACITY,
            },
            _ => Brush {
                color: self.color,
                width: self.stroke_width,
                opacity: 1.0,
            },
        }
    }
}

/// Stroke or fill paint handed to a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brush {
    pub color: Rgba,
    pub width: f64,
    /// Global alpha multiplied into `color`.
    pub opacity: f64,
}

impl Default for Brush {
    fn default() -> Self {
        ToolConfig::default().brush()
    }
}

/// A shape produced by a drag with one of the shape tools.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeGeometry {
    Line(Line),
    Rectangle(Rect),
    Circle(Circle),
}

impl ShapeGeometry {
    /// Build the shape spanned by a drag, or `None` for non-shape tools and
    /// for drags that span nothing: a line or rectangle whose ends coincide,
    /// or a circle with zero radius.
    ///
    /// Circles sit at the midpoint of the drag with a radius of half the
    /// horizontal span; the vertical span does not affect the radius.
    pub fn from_drag(tool: ToolKind, start: Point, end: Point) -> Option<Self> {
        match tool {
            ToolKind::Line | ToolKind::Rectangle if start == end => None,
            ToolKind::Line => Some(Self::Line(Line::new(start, end))),
            ToolKind::Rectangle => Some(Self::Rectangle(Rect::from_points(start, end))),
            ToolKind::Circle => {
                let center = start.midpoint(end);
                let radius = (end.x - start.x).abs() / 2.0;
                (radius > 0.0).then(|| Self::Circle(Circle::new(center, radius)))
            }
            _ => None,
        }
    }

    /// Outline path for stroking.
    pub fn to_path(&self, tolerance: f64) -> BezPath {
        match self {
            Self::Line(line) => line.to_path(tolerance),
            Self::Rectangle(rect) => rect.to_path(tolerance),
            Self::Circle(circle) => circle.to_path(tolerance),
        }
    }
}

/// Gesture in progress.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    /// Freehand stroke; `last` is the previous world point.
    Stroking { last: Point },
    /// Shape drag anchored at a world point.
    Shaping { start: Point, current: Point },
    /// Pan drag; `grab` is the pointer position relative to the pan offset.
    Panning { grab: Vec2 },
}

/// What the caller should do in response to input.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolAction {
    /// Nothing to draw.
    None,
    /// A freehand stroke began.
    StrokeStarted,
    /// Draw one segment of the stroke in progress.
    StrokeSegment { segment: Line, brush: Brush },
    /// The stroke ended; commit the surface.
    StrokeCommit,
    /// A shape drag began.
    ShapeStarted,
    /// Restore committed content, then draw this shape on top.
    ShapePreview { shape: ShapeGeometry, brush: Brush },
    /// Restore committed content, draw this shape, and commit.
    ShapeCommit { shape: ShapeGeometry, brush: Brush },
    /// The drag spans nothing; restore committed content only.
    ShapeCleared,
    /// Ask the user for text to place at `origin` (world baseline).
    TextRequested {
        origin: Point,
        font_size: f64,
        brush: Brush,
    },
    PanStarted,
    /// The view moved; re-render committed content at the new offset.
    PanMoved { offset: Vec2 },
    PanEnded,
}

impl ToolAction {
    /// Whether this action opens a drawing gesture, which invalidates redo.
    pub fn starts_gesture(&self) -> bool {
        matches!(
            self,
            ToolAction::StrokeStarted | ToolAction::ShapeStarted | ToolAction::TextRequested { .. }
        )
    }
}

/// Manages the current tool and its gesture state.
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    config: ToolConfig,
    state: GestureState,
}

impl ToolManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    pub fn current_tool(&self) -> ToolKind {
        self.config.tool
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != GestureState::Idle
    }

    /// Select a tool. Any gesture in flight is dropped without committing.
    pub fn set_tool(&mut self, tool: ToolKind) {
        if self.is_active() {
            log::debug!("Cancelling {:?} on switch to {}", self.state, tool);
        }
        self.config.tool = tool;
        self.state = GestureState::Idle;
    }

    pub fn set_color(&mut self, color: Rgba) {
        self.config.color = color;
    }

    pub fn set_stroke_width(&mut self, width: f64) {
        self.config.set_stroke_width(width);
    }

    /// Abandon the current gesture.
    pub fn cancel(&mut self) {
        self.state = GestureState::Idle;
    }

    /// Pointer pressed at a screen position.
    pub fn press(&mut self, screen: Point, camera: &Camera) -> ToolAction {
        let world = camera.screen_to_world(screen);
        let tool = self.config.tool;
        match tool {
            ToolKind::Pan => {
                self.state = GestureState::Panning {
                    grab: camera.grab(screen),
                };
                ToolAction::PanStarted
            }
            ToolKind::Text => {
                self.state = GestureState::Idle;
                ToolAction::TextRequested {
                    origin: world,
                    font_size: self.config.stroke_width * TEXT_SCALE,
                    brush: self.config.brush(),
                }
            }
            _ if tool.is_freehand() => {
                self.state = GestureState::Stroking { last: world };
                ToolAction::StrokeStarted
            }
            _ => {
                self.state = GestureState::Shaping {
                    start: world,
                    current: world,
                };
                ToolAction::ShapeStarted
            }
        }
    }

    /// Pointer moved to a screen position. Pan gestures update `camera`.
    pub fn motion(&mut self, screen: Point, camera: &mut Camera) -> ToolAction {
        match self.state {
            GestureState::Idle => ToolAction::None,
            GestureState::Panning { grab } => {
                camera.drag_to(grab, screen);
                ToolAction::PanMoved {
                    offset: camera.offset,
                }
            }
            GestureState::Stroking { last } => {
                let world = camera.screen_to_world(screen);
                self.state = GestureState::Stroking { last: world };
                ToolAction::StrokeSegment {
                    segment: Line::new(last, world),
                    brush: self.config.brush(),
                }
            }
            GestureState::Shaping { start, .. } => {
                let world = camera.screen_to_world(screen);
                self.state = GestureState::Shaping {
                    start,
                    current: world,
                };
                match ShapeGeometry::from_drag(self.config.tool, start, world) {
                    Some(shape) => ToolAction::ShapePreview {
                        shape,
                        brush: self.config.brush(),
                    },
                    None => ToolAction::ShapeCleared,
                }
            }
        }
    }

    /// Pointer released at a screen position.
    pub fn release(&mut self, screen: Point, camera: &Camera) -> ToolAction {
        let state = std::mem::take(&mut self.state);
        match state {
            GestureState::Idle => ToolAction::None,
            GestureState::Panning { .. } => ToolAction::PanEnded,
            GestureState::Stroking { .. } => ToolAction::StrokeCommit,
            GestureState::Shaping { start, .. } => {
                let end = camera.screen_to_world(screen);
                match ShapeGeometry::from_drag(self.config.tool, start, end) {
                    Some(shape) => ToolAction::ShapeCommit {
                        shape,
                        brush: self.config.brush(),
                    },
                    None => ToolAction::ShapeCleared,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_uses_horizontal_span() {
        let shape = ShapeGeometry::from_drag(
            ToolKind::Circle,
            Point::new(100.0, 100.0),
            Point::new(180.0, 140.0),
        );
        let Some(ShapeGeometry::Circle(circle)) = shape else {
            panic!("expected circle, got {shape:?}");
        };
        assert_eq!(circle.center, Point::new(140.0, 120.0));
        assert!((circle.radius - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rectangle_normalizes_drag_direction() {
        let shape =
            ShapeGeometry::from_drag(ToolKind::Rectangle, Point::new(50.0, 60.0), Point::new(10.0, 20.0));
        assert_eq!(
            shape,
            Some(ShapeGeometry::Rectangle(Rect::new(10.0, 20.0, 50.0, 60.0)))
        );
        assert_eq!(
            ShapeGeometry::from_drag(ToolKind::Pen, Point::ZERO, Point::ZERO),
            None
        );
    }

    #[test]
    fn test_stroke_width_is_sanitized() {
        let mut config = ToolConfig::default();
        config.set_stroke_width(0.0);
        assert_eq!(config.stroke_width(), MIN_STROKE_WIDTH);
        config.set_stroke_width(500.0);
        assert_eq!(config.stroke_width(), MAX_STROKE_WIDTH);
        config.set_stroke_width(f64::NAN);
        assert_eq!(config.stroke_width(), DEFAULT_STROKE_WIDTH);
    }

    #[test]
    fn test_brushes_per_tool() {
        let mut config = ToolConfig {
            color: Rgba::new(255, 0, 0, 255),
            ..Default::default()
        };
        assert_eq!(config.brush().color, Rgba::new(255, 0, 0, 255));
        assert_eq!(config.brush().opacity, 1.0);

        config.tool = ToolKind::Highlighter;
        assert_eq!(config.brush().opacity, HIGHLIGHTER_OPACITY);

        config.tool = ToolKind::Eraser;
        assert_eq!(config.brush().color, Rgba::white());
        assert_eq!(config.brush().opacity, 1.0);
    }

    #[test]
    fn test_pen_stroke_emits_segments_in_world_space() {
        let mut tools = ToolManager::new();
        let mut camera = Camera::new();
        camera.offset = Vec2::new(10.0, 0.0);

        let action = tools.press(Point::new(20.0, 20.0), &camera);
        assert_eq!(action, ToolAction::StrokeStarted);
        assert!(action.starts_gesture());

        let action = tools.motion(Point::new(30.0, 25.0), &mut camera);
        let ToolAction::StrokeSegment { segment, .. } = action else {
            panic!("expected segment, got {action:?}");
        };
        assert_eq!(segment, Line::new((10.0, 20.0), (20.0, 25.0)));

        assert_eq!(tools.release(Point::new(30.0, 25.0), &camera), ToolAction::StrokeCommit);
        assert!(!tools.is_active());
        assert_eq!(tools.motion(Point::new(40.0, 40.0), &mut camera), ToolAction::None);
    }

    #[test]
    fn test_shape_previews_then_commits() {
        let mut tools = ToolManager::new();
        let mut camera = Camera::new();
        tools.set_tool(ToolKind::Line);

        assert_eq!(tools.press(Point::new(0.0, 0.0), &camera), ToolAction::ShapeStarted);
        assert!(matches!(
            tools.motion(Point::new(5.0, 5.0), &mut camera),
            ToolAction::ShapePreview { .. }
        ));
        let action = tools.release(Point::new(10.0, 0.0), &camera);
        assert_eq!(
            action,
            ToolAction::ShapeCommit {
                shape: ShapeGeometry::Line(Line::new((0.0, 0.0), (10.0, 0.0))),
                brush: tools.config().brush(),
            }
        );
    }

    #[test]
    fn test_zero_extent_shapes_are_skipped() {
        let at = Point::new(30.0, 40.0);
        assert_eq!(ShapeGeometry::from_drag(ToolKind::Rectangle, at, at), None);
        assert_eq!(ShapeGeometry::from_drag(ToolKind::Line, at, at), None);
        // A purely vertical drag gives the circle no radius.
        assert_eq!(
            ShapeGeometry::from_drag(ToolKind::Circle, at, Point::new(30.0, 90.0)),
            None
        );
        // A flat rectangle still strokes as a line.
        assert!(ShapeGeometry::from_drag(ToolKind::Rectangle, at, Point::new(30.0, 90.0)).is_some());
    }

    #[test]
    fn test_rectangle_click_clears_instead_of_committing() {
        let mut tools = ToolManager::new();
        let mut camera = Camera::new();
        tools.set_tool(ToolKind::Rectangle);

        tools.press(Point::new(5.0, 5.0), &camera);
        assert!(matches!(
            tools.motion(Point::new(25.0, 25.0), &mut camera),
            ToolAction::ShapePreview { .. }
        ));
        // Dragging back to the start leaves nothing to preview.
        assert_eq!(tools.motion(Point::new(5.0, 5.0), &mut camera), ToolAction::ShapeCleared);
        assert_eq!(tools.release(Point::new(5.0, 5.0), &camera), ToolAction::ShapeCleared);
        assert!(!tools.is_active());
    }

    #[test]
    fn test_text_press_requests_prompt() {
        let mut tools = ToolManager::new();
        tools.set_tool(ToolKind::Text);
        tools.set_stroke_width(8.0);

        let action = tools.press(Point::new(12.0, 34.0), &Camera::new());
        match action {
            ToolAction::TextRequested { origin, font_size, .. } => {
                assert_eq!(origin, Point::new(12.0, 34.0));
                assert_eq!(font_size, 16.0);
            }
            other => panic!("expected text request, got {other:?}"),
        }
        assert!(!tools.is_active());
    }

    #[test]
    fn test_pan_moves_camera_and_does_not_start_gesture() {
        let mut tools = ToolManager::new();
        let mut camera = Camera::new();
        tools.set_tool(ToolKind::Pan);

        let action = tools.press(Point::new(100.0, 100.0), &camera);
        assert_eq!(action, ToolAction::PanStarted);
        assert!(!action.starts_gesture());

        assert_eq!(
            tools.motion(Point::new(130.0, 90.0), &mut camera),
            ToolAction::PanMoved {
                offset: Vec2::new(30.0, -10.0)
            }
        );
        assert_eq!(camera.offset, Vec2::new(30.0, -10.0));
        assert_eq!(tools.release(Point::new(130.0, 90.0), &camera), ToolAction::PanEnded);
    }

    #[test]
    fn test_switching_tools_cancels_gesture() {
        let mut tools = ToolManager::new();
        let mut camera = Camera::new();
        tools.set_tool(ToolKind::Rectangle);
        tools.press(Point::new(1.0, 1.0), &camera);
        assert!(tools.is_active());

        tools.set_tool(ToolKind::Pen);

        assert!(!tools.is_active());
        assert_eq!(tools.motion(Point::new(9.0, 9.0), &mut camera), ToolAction::None);
        assert_eq!(tools.release(Point::new(9.0, 9.0), &camera), ToolAction::None);
    }

    #[test]
    fn test_tool_names_round_trip() {
        for tool in ToolKind::ALL {
            assert_eq!(tool.name().parse::<ToolKind>(), Ok(tool));
        }
        let json = serde_json::to_string(&ToolKind::Highlighter).unwrap();
        assert_eq!(json, "\"highlighter\"");
    }
}
