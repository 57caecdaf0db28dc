//! Path model: a start point, ordered segments and a closed flag.
//!
//! A curve segment's implicit start point is the previous segment's end
//! point, so splitting or flattening always walks segments in order.

use super::{Point, Trafo};

/// One path segment following the previous end point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    /// Straight line to the given point.
    Line(Point),
    /// Cubic bezier with two control points and an end point. `smooth` marks
    /// the end node as a smooth join with the following segment.
    Curve {
        c1: Point,
        c2: Point,
        end: Point,
        smooth: bool,
    },
}

impl Segment {
    /// The end point this segment arrives at.
    pub fn end(&self) -> Point {
        match *self {
            Segment::Line(p) => p,
            Segment::Curve { end, .. } => end,
        }
    }
}

/// An open or closed path.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    pub start: Point,
    pub segments: Vec<Segment>,
    pub closed: bool,
}

impl Path {
    pub fn new(start: Point) -> Self {
        Path {
            start,
            segments: Vec::new(),
            closed: false,
        }
    }

    pub fn line_to(&mut self, p: Point) -> &mut Self {
        self.segments.push(Segment::Line(p));
        self
    }

    pub fn curve_to(&mut self, c1: Point, c2: Point, end: Point) -> &mut Self {
        self.segments.push(Segment::Curve {
            c1,
            c2,
            end,
            smooth: false,
        });
        self
    }

    pub fn close(&mut self) -> &mut Self {
        self.closed = true;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Where the path currently ends; the start point for an empty path.
    pub fn end_point(&self) -> Point {
        self.segments.last().map_or(self.start, Segment::end)
    }

    /// Apply a transform pointwise to every coordinate, including bezier
    /// control points, preserving segment kinds and the closed flag.
    pub fn transform(&self, t: &Trafo) -> Path {
        Path {
            start: t.apply(self.start),
            segments: self
                .segments
                .iter()
                .map(|seg| match *seg {
                    Segment::Line(p) => Segment::Line(t.apply(p)),
                    Segment::Curve {
                        c1,
                        c2,
                        end,
                        smooth,
                    } => Segment::Curve {
                        c1: t.apply(c1),
                        c2: t.apply(c2),
                        end: t.apply(end),
                        smooth,
                    },
                })
                .collect(),
            closed: self.closed,
        }
    }
}

/// Apply a transform to every path in a slice.
pub fn transform_paths(paths: &[Path], t: &Trafo) -> Vec<Path> {
    paths.iter().map(|p| p.transform(t)).collect()
}

/// De Casteljau split of one cubic segment at parameter `t`.
///
/// Takes the four control points `[p0, p1, p2, p3]` and returns the two
/// sub-curves whose concatenation reproduces the original within floating
/// precision; the first curve ends where the second begins.
pub fn split_at_t(points: [Point; 4], t: f64) -> ([Point; 4], [Point; 4]) {
    let [p0, p1, p2, p3] = points;
    let q0 = p0.lerp(p1, t);
    let q1 = p1.lerp(p2, t);
    let q2 = p2.lerp(p3, t);
    let r0 = q0.lerp(q1, t);
    let r1 = q1.lerp(q2, t);
    let s = r0.lerp(r1, t);
    ([p0, q0, r0, s], [s, r1, q2, p3])
}

/// Evaluate a cubic at parameter `t` (used by tests and placement code).
pub fn cubic_at(points: [Point; 4], t: f64) -> Point {
    let [p0, p1, p2, p3] = points;
    let u = 1.0 - t;
    p0 * (u * u * u) + p1 * (3.0 * u * u * t) + p2 * (3.0 * u * t * t) + p3 * (t * t * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_end_point_tracks_segments() {
        let mut path = Path::new(Point::new(0.0, 0.0));
        assert_eq!(path.end_point(), Point::new(0.0, 0.0));
        path.line_to(Point::new(10.0, 0.0));
        path.curve_to(
            Point::new(12.0, 2.0),
            Point::new(14.0, 4.0),
            Point::new(16.0, 0.0),
        );
        assert_eq!(path.end_point(), Point::new(16.0, 0.0));
    }

    #[test]
    fn test_transform_preserves_kind_and_closed() {
        let mut path = Path::new(Point::new(1.0, 1.0));
        path.curve_to(
            Point::new(2.0, 2.0),
            Point::new(3.0, 2.0),
            Point::new(4.0, 1.0),
        );
        path.close();
        let moved = path.transform(&Trafo::translation(5.0, -1.0));
        assert!(moved.closed);
        assert_eq!(moved.start, Point::new(6.0, 0.0));
        match moved.segments[0] {
            Segment::Curve { c1, end, .. } => {
                assert_eq!(c1, Point::new(7.0, 1.0));
                assert_eq!(end, Point::new(9.0, 0.0));
            }
            _ => panic!("segment kind changed"),
        }
    }

    #[test]
    fn test_split_midpoint_shares_point() {
        let pts = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 2.0),
            Point::new(3.0, 2.0),
            Point::new(4.0, 0.0),
        ];
        let (left, right) = split_at_t(pts, 0.5);
        assert_eq!(left[3], right[0]);
        assert_eq!(left[0], pts[0]);
        assert_eq!(right[3], pts[3]);
    }

    proptest! {
        #[test]
        fn prop_split_reproduces_curve(
            t in 0.01f64..0.99,
            sample in 0.0f64..1.0,
            coords in proptest::array::uniform8(-50.0f64..50.0),
        ) {
            let pts = [
                Point::new(coords[0], coords[1]),
                Point::new(coords[2], coords[3]),
                Point::new(coords[4], coords[5]),
                Point::new(coords[6], coords[7]),
            ];
            let (left, right) = split_at_t(pts, t);
            // Sample the original at `u` and the matching sub-curve point.
            let u = sample;
            let original = cubic_at(pts, u);
            let via_split = if u <= t {
                cubic_at(left, u / t)
            } else {
                cubic_at(right, (u - t) / (1.0 - t))
            };
            prop_assert!((original.x - via_split.x).abs() < 1e-6);
            prop_assert!((original.y - via_split.y).abs() < 1e-6);
        }
    }
}
