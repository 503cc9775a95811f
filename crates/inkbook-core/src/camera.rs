//! Camera module for the pan transform.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Camera manages the view transform for the page.
///
/// Pages have no zoom: the transform is a pure translation by `offset`,
/// so a screen point maps to world as `screen - offset`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Camera {
    /// Current translation offset (pan)
    pub offset: Vec2,
}

impl Camera {
    /// Create a camera with no pan.
    pub fn new() -> Self {
        Self::default()
    }

    /// World to screen transform used for drawing.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset)
    }

    /// Screen to world transform used for input handling.
    pub fn inverse_transform(&self) -> Affine {
        Affine::translate(-self.offset)
    }

    /// Convert a screen point to world coordinates.
    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    /// Convert a world point to screen coordinates.
    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// World position of the visible top-left corner.
    pub fn view_origin(&self) -> Point {
        self.screen_to_world(Point::ZERO)
    }

    /// Grab the page at a screen point. Feed the result to [`Camera::drag_to`].
    pub fn grab(&self, screen_point: Point) -> Vec2 {
        screen_point.to_vec2() - self.offset
    }

    /// Move so that the grabbed spot stays under the pointer.
    pub fn drag_to(&mut self, grab: Vec2, screen_point: Point) {
        self.offset = screen_point.to_vec2() - grab;
    }
}
