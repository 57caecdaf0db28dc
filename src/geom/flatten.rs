//! Adaptive flattening of cubic segments into polylines.
//!
//! Each cubic is recursively bisected with a De Casteljau split at the
//! midpoint until the deviation between the chord and the control polygon
//! drops below the tolerance, or a degenerate base case fires (control
//! points on the chord collapse to a straight line). Subdivision strictly
//! shrinks the sub-curves, so termination is guaranteed; the result is an
//! eager, finite polyline and repeated calls are idempotent.

use smallvec::{SmallVec, smallvec};

use super::{Path, Point, Segment};

/// Control points closer to the chord than this are treated as exactly
/// collinear and the whole segment collapses to its chord.
const COLLINEAR_EPS: f64 = 1e-9;

/// Flatten one cubic `(p0, p1, p2, p3)` into `out`, appending every point
/// after `p0`.
fn flat_segment(seg: [Point; 4], tolerance: f64, out: &mut Vec<Point>) {
    // Explicit work stack instead of recursion; right halves are pushed
    // first so the polyline comes out in curve order.
    let mut stack: SmallVec<[[Point; 4]; 32]> = smallvec![seg];

    while let Some([p0, p1, p2, p3]) = stack.pop() {
        let b = p3 - p0;
        let c1 = p1 - p0;
        let c2 = p2 - p3;

        // Degenerate base case: all control points on the chord. The curve
        // is a straight line regardless of tolerance. A zero-length chord
        // with non-zero handles is a loop and must still subdivide.
        let chord_len = b.hypot();
        let degenerate = if chord_len == 0.0 {
            c1.hypot() == 0.0 && c2.hypot() == 0.0
        } else {
            c1.cross(b).abs() / chord_len <= COLLINEAR_EPS
                && c2.cross(b).abs() / chord_len <= COLLINEAR_EPS
        };
        if degenerate {
            out.push(p3);
            continue;
        }

        let p4 = p0.midpoint(p1);
        let p5 = p1.midpoint(p2);
        let p6 = p2.midpoint(p3);
        let p7 = p4.midpoint(p5);
        let p8 = p5.midpoint(p6);
        let p9 = p7.midpoint(p8);

        let subdivide = if c1.hypot() > b.hypot() || c2.hypot() > b.hypot() {
            true
        } else if b.hypot() < tolerance / 2.0 {
            false
        } else {
            // b is non-degenerate here: the collinear check above would have
            // fired for a zero chord with zero handles.
            let n = match b.normalized() {
                Some(n) => n,
                None => {
                    out.push(p9);
                    out.push(p3);
                    continue;
                }
            };
            let s = p9 - p0;
            c1.dot(n) < -tolerance
                || c2.dot(n) > tolerance
                || c1.cross(b) * c2.cross(b) < 0.0
                || n.cross(s).abs() > tolerance
        };

        if subdivide {
            stack.push([p9, p8, p6, p3]);
            stack.push([p0, p4, p7, p9]);
        } else {
            out.push(p9);
            out.push(p3);
        }
    }
}

/// Flatten a path into an equivalent path of line segments only.
pub fn flat_path(path: &Path, tolerance: f64) -> Path {
    let mut result = Path::new(path.start);
    result.closed = path.closed;

    let mut start = path.start;
    for seg in &path.segments {
        match *seg {
            Segment::Line(p) => {
                result.segments.push(Segment::Line(p));
                start = p;
            }
            Segment::Curve { c1, c2, end, .. } => {
                let mut points = Vec::new();
                flat_segment([start, c1, c2, end], tolerance, &mut points);
                result
                    .segments
                    .extend(points.into_iter().map(Segment::Line));
                start = end;
            }
        }
    }
    result
}

/// Flatten every path in a slice.
pub fn flat_paths(paths: &[Path], tolerance: f64) -> Vec<Path> {
    paths.iter().map(|p| flat_path(p, tolerance)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn curve_path(p0: Point, c1: Point, c2: Point, end: Point) -> Path {
        let mut path = Path::new(p0);
        path.curve_to(c1, c2, end);
        path
    }

    fn points_of(path: &Path) -> Vec<Point> {
        let mut pts = vec![path.start];
        for seg in &path.segments {
            pts.push(seg.end());
        }
        pts
    }

    #[test]
    fn test_collinear_cubic_is_a_straight_two_point_line() {
        let path = curve_path(
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(3.0, 0.0),
        );
        for tolerance in [10.0, 0.5, 0.001] {
            let flat = flat_path(&path, tolerance);
            assert_eq!(
                points_of(&flat),
                vec![Point::new(0.0, 0.0), Point::new(3.0, 0.0)]
            );
        }
    }

    #[test]
    fn test_coincident_control_points_terminate() {
        let p = Point::new(2.0, 2.0);
        // start == c1 == c2 == end
        let flat = flat_path(&curve_path(p, p, p, p), 0.1);
        assert!(!flat.segments.is_empty());
        assert_eq!(flat.end_point(), p);
    }

    #[test]
    fn test_only_line_segments_in_output() {
        let flat = flat_path(
            &curve_path(
                Point::new(0.0, 0.0),
                Point::new(0.0, 10.0),
                Point::new(10.0, 10.0),
                Point::new(10.0, 0.0),
            ),
            0.1,
        );
        assert!(
            flat.segments
                .iter()
                .all(|s| matches!(s, Segment::Line(_)))
        );
        assert_eq!(flat.end_point(), Point::new(10.0, 0.0));
    }

    #[test]
    fn test_tighter_tolerance_refines() {
        let path = curve_path(
            Point::new(0.0, 0.0),
            Point::new(0.0, 100.0),
            Point::new(100.0, 100.0),
            Point::new(100.0, 0.0),
        );
        let coarse = points_of(&flat_path(&path, 1.0));
        let fine = points_of(&flat_path(&path, 0.01));
        assert!(fine.len() >= coarse.len());
        // Monotonic refinement: every coarse point appears in the fine run.
        for cp in &coarse {
            assert!(
                fine.iter()
                    .any(|fp| (fp.x - cp.x).abs() < 1e-9 && (fp.y - cp.y).abs() < 1e-9),
                "coarse point {:?} missing from refinement",
                cp
            );
        }
    }

    #[test]
    fn test_flatten_is_idempotent() {
        let path = curve_path(
            Point::new(0.0, 0.0),
            Point::new(5.0, 8.0),
            Point::new(9.0, 8.0),
            Point::new(12.0, 1.0),
        );
        let once = flat_path(&path, 0.2);
        let twice = flat_path(&once, 0.2);
        assert_eq!(once, twice);
    }

    proptest! {
        #[test]
        fn prop_flatten_terminates_and_reaches_end(
            coords in proptest::array::uniform8(-1000.0f64..1000.0),
            tolerance in 0.001f64..10.0,
        ) {
            let end = Point::new(coords[6], coords[7]);
            let path = curve_path(
                Point::new(coords[0], coords[1]),
                Point::new(coords[2], coords[3]),
                Point::new(coords[4], coords[5]),
                end,
            );
            let flat = flat_path(&path, tolerance);
            prop_assert!((flat.end_point().x - end.x).abs() < 1e-9);
            prop_assert!((flat.end_point().y - end.y).abs() < 1e-9);
        }
    }
}
