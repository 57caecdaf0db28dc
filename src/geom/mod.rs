//! Bezier geometry engine.
//!
//! Path and transform math shared by every format translator: affine
//! composition and inversion, adaptive curve flattening, segment splitting,
//! bounding boxes and text-on-path placement. Everything here is a plain
//! value type; no operation keeps shared mutable state between calls.

use std::ops::{Add, Mul, Sub};

pub mod bbox;
pub mod flatten;
pub mod path;
pub mod text_path;
pub mod trafo;

pub use bbox::{BBox, path_bbox, paths_bbox};
pub use flatten::{flat_path, flat_paths};
pub use path::{Path, Segment, split_at_t};
pub use text_path::{GlyphPlacement, point_at_length, text_on_path};
pub use trafo::Trafo;

/// A 2D point (or vector) in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// Euclidean length of this point taken as a vector.
    pub fn hypot(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Dot product.
    pub fn dot(self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the cross product.
    pub fn cross(self, other: Point) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Unit vector in this direction, `None` for the zero vector.
    pub fn normalized(self) -> Option<Point> {
        let len = self.hypot();
        if len == 0.0 {
            None
        } else {
            Some(Point::new(self.x / len, self.y / len))
        }
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Linear interpolation towards `other`; `t` in 0..=1 stays on the segment.
    pub fn lerp(self, other: Point, t: f64) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    pub fn distance(self, other: Point) -> f64 {
        (other - self).hypot()
    }

    /// Mirror of `first` across this point, used for smooth-node handles.
    pub fn contra(self, first: Point) -> Point {
        Point::new(2.0 * self.x - first.x, 2.0 * self.y - first.y)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, k: f64) -> Point {
        Point::new(self.x * k, self.y * k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_vector_ops() {
        let a = Point::new(3.0, 4.0);
        assert_eq!(a.hypot(), 5.0);
        assert_eq!(a.dot(Point::new(1.0, 0.0)), 3.0);
        assert_eq!(a.cross(Point::new(1.0, 0.0)), -4.0);
        assert_eq!(Point::new(0.0, 0.0).normalized(), None);
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = Point::new(1.0, 2.0);
        let b = Point::new(5.0, -2.0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), a.midpoint(b));
    }
}
