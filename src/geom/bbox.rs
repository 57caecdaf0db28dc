//! Axis-aligned bounding boxes over flattened geometry.
//!
//! Curves are flattened first so the box bounds the rendered outline, not
//! the control polygon. Used for "fit to page" and object placement.

use super::flatten::flat_path;
use super::{Path, Point, Segment};

/// Flattening tolerance for bbox computation; fine enough for placement.
const BBOX_TOLERANCE: f64 = 0.1;

/// An axis-aligned bounding box `(x0, y0)..(x1, y1)` with `x0 <= x1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl BBox {
    /// The degenerate box containing a single point.
    pub fn from_point(p: Point) -> Self {
        BBox {
            x0: p.x,
            y0: p.y,
            x1: p.x,
            y1: p.y,
        }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn center(&self) -> Point {
        Point::new((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }

    /// Grow this box to include a point.
    pub fn add_point(&mut self, p: Point) {
        self.x0 = self.x0.min(p.x);
        self.y0 = self.y0.min(p.y);
        self.x1 = self.x1.max(p.x);
        self.y1 = self.y1.max(p.y);
    }

    /// The smallest box containing both boxes.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    pub fn contains_point(&self, p: Point) -> bool {
        self.x0 <= p.x && p.x <= self.x1 && self.y0 <= p.y && p.y <= self.y1
    }

    pub fn contains(&self, other: &BBox) -> bool {
        self.x0 <= other.x0 && self.y0 <= other.y0 && self.x1 >= other.x1 && self.y1 >= other.y1
    }
}

/// Bounding box of one path over its flattened points.
pub fn path_bbox(path: &Path) -> BBox {
    let flat = flat_path(path, BBOX_TOLERANCE);
    let mut bbox = BBox::from_point(flat.start);
    for seg in &flat.segments {
        if let Segment::Line(p) = seg {
            bbox.add_point(*p);
        }
    }
    bbox
}

/// Bounding box over a set of paths; `None` for an empty set.
pub fn paths_bbox(paths: &[Path]) -> Option<BBox> {
    let mut result: Option<BBox> = None;
    for path in paths {
        let bbox = path_bbox(path);
        result = Some(match result {
            Some(acc) => acc.union(&bbox),
            None => bbox,
        });
    }
    result
}
