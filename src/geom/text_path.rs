//! Glyph placement along a path.
//!
//! For every glyph the layout engine supplies a horizontal advance offset
//! and a baseline position; the placer walks the flattened path accumulating
//! chord length, interpolates the exact point and local tangent angle at the
//! glyph's offset and produces a per-glyph transform (rotation to the
//! tangent plus translation onto the path) for baseline placement.

use super::flatten::flat_path;
use super::{Path, Point, Segment, Trafo};

/// Flattening tolerance used before walking the path.
const PLACEMENT_TOLERANCE: f64 = 0.1;

/// One glyph's layout data in text space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphPlacement {
    /// Horizontal advance offset of the glyph's left edge.
    pub x: f64,
    /// Baseline vertical position.
    pub y: f64,
    /// Glyph advance width; the glyph is anchored at its center.
    pub width: f64,
}

/// The point and tangent angle at arc position `pos` along a flat path.
///
/// Positions beyond the path length extrapolate along the last chord, so
/// trailing glyphs keep a stable direction instead of vanishing.
pub fn point_at_length(flat: &Path, pos: f64) -> (Point, f64) {
    let mut start = flat.start;
    let mut end = flat.start;
    let mut total = 0.0;

    for seg in &flat.segments {
        let Segment::Line(p) = seg else { continue };
        start = end;
        end = *p;
        let chord = start.distance(end);
        total += chord;
        if total >= pos && chord > 0.0 {
            let coef = 1.0 - (total - pos) / chord;
            let point = start.lerp(end, coef);
            let angle = (end.y - start.y).atan2(end.x - start.x);
            return (point, angle);
        }
    }

    // Ran off the end: extrapolate on the last chord.
    let last = start.distance(end);
    let angle = (end.y - start.y).atan2(end.x - start.x);
    if last == 0.0 {
        return (end, 0.0);
    }
    let coef = (pos - total + last) / last;
    (start.lerp(end, coef), angle)
}

/// Build per-glyph transforms that place glyph baselines along `path`.
///
/// Glyph offsets are normalized so the leftmost glyph starts at the path
/// start; each glyph is rotated to the local tangent around its center and
/// translated from its layout position onto the path.
pub fn text_on_path(path: &Path, glyphs: &[GlyphPlacement]) -> Vec<Trafo> {
    let flat = flat_path(path, PLACEMENT_TOLERANCE);
    let shift_x = -glyphs.iter().map(|g| g.x).fold(0.0, f64::min);

    glyphs
        .iter()
        .map(|glyph| {
            let half = glyph.width / 2.0;
            let (point, angle) = point_at_length(&flat, glyph.x + shift_x + half);

            let center = Point::new(glyph.x + half, glyph.y);
            let rotation = Trafo::rotation(angle, center);
            Trafo {
                dx: rotation.dx + point.x - glyph.x - half,
                dy: rotation.dy + point.y - glyph.y,
                ..rotation
            }
        })
        .collect()
}
