//! Procedural paper textures.
//!
//! The browser loads paper from image assets; everything else renders the
//! same rulings from these paths.

use inkbook_core::{Brush, PaperType, Rgba};
use kurbo::{BezPath, Circle, Point, Shape, Size};

/// Distance between ruled lines on lined paper.
pub const LINE_SPACING: f64 = 30.0;
/// Cell size on grid and dotted paper.
pub const GRID_SIZE: f64 = 25.0;
/// Left margin of lined paper.
pub const MARGIN_X: f64 = 60.0;
/// Radius of the dots on dotted paper.
pub const DOT_RADIUS: f64 = 1.5;

/// A ruling layer: a path and the brush it is stroked with.
pub struct Ruling {
    pub path: BezPath,
    pub brush: Brush,
}

/// Rulings for a paper type, bottom layer first. Plain paper has none.
pub fn rulings(paper: PaperType, size: Size) -> Vec<Ruling> {
    match paper {
        PaperType::Plain => Vec::new(),
        PaperType::Lined => vec![
            Ruling {
                path: horizontal_lines(size, LINE_SPACING),
                brush: brush(Rgba::new(160, 196, 255, 255), 1.0),
            },
            Ruling {
                path: vertical_line(MARGIN_X, size.height),
                brush: brush(Rgba::new(255, 140, 140, 255), 1.0),
            },
        ],
        PaperType::Grid => {
            let mut path = horizontal_lines(size, GRID_SIZE);
            let mut x = GRID_SIZE;
            while x < size.width {
                path.move_to(Point::new(x, 0.0));
                path.line_to(Point::new(x, size.height));
                x += GRID_SIZE;
            }
            vec![Ruling {
                path,
                brush: brush(Rgba::new(200, 200, 200, 255), 1.0),
            }]
        }
        PaperType::Dotted => vec![Ruling {
            path: dots(size, GRID_SIZE),
            brush: brush(Rgba::new(160, 160, 160, 255), DOT_RADIUS),
        }],
    }
}

fn brush(color: Rgba, width: f64) -> Brush {
    Brush {
        color,
        width,
        opacity: 1.0,
    }
}

fn horizontal_lines(size: Size, spacing: f64) -> BezPath {
    let mut path = BezPath::new();
    let mut y = spacing;
    while y < size.height {
        path.move_to(Point::new(0.0, y));
        path.line_to(Point::new(size.width, y));
        y += spacing;
    }
    path
}

fn vertical_line(x: f64, height: f64) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(Point::new(x, 0.0));
    path.line_to(Point::new(x, height));
    path
}

/// Small circles whose stroke, half a radius wide on each side, fills them.
fn dots(size: Size, spacing: f64) -> BezPath {
    let mut path = BezPath::new();
    let mut x = spacing;
    while x < size.width {
        let mut y = spacing;
        while y < size.height {
            for el in Circle::new(Point::new(x, y), DOT_RADIUS / 2.0).path_elements(0.1) {
                path.push(el);
            }
            y += spacing;
        }
        x += spacing;
    }
    path
}
