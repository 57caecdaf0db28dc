//! Canonical document tree: nodes, kinds and geometry payloads.
//!
//! The node kind set is closed, so translators and traversals dispatch with
//! exhaustive matches. Structural legality (which kind may parent which) is
//! part of the model's contract: violating it is a programming error and
//! asserts, it is never a runtime-recoverable condition.

use bitflags::bitflags;

use crate::geom::{BBox, Path, Point, Trafo, paths_bbox};
use crate::model::style::StyleId;

/// Bezier arc approximation constant for quarter circles.
const CIRCLE_CTRL: f64 = 0.552_284_749_830_793_4;

bitflags! {
    /// Layer behavior flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LayerFlags: u8 {
        const VISIBLE = 1 << 0;
        const EDITABLE = 1 << 1;
        const PRINTABLE = 1 << 2;
    }
}

impl Default for LayerFlags {
    fn default() -> Self {
        LayerFlags::VISIBLE | LayerFlags::EDITABLE | LayerFlags::PRINTABLE
    }
}

/// Closed set of node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    Pages,
    Page,
    Layer,
    GridLayer,
    GuideLayer,
    Group,
    Rectangle,
    Ellipse,
    Curve,
    TextBlock,
}

impl NodeKind {
    /// Primitive kinds carry geometry and are always leaves.
    pub fn is_primitive(self) -> bool {
        matches!(
            self,
            NodeKind::Rectangle | NodeKind::Ellipse | NodeKind::Curve | NodeKind::TextBlock
        )
    }

    pub fn is_layer(self) -> bool {
        matches!(
            self,
            NodeKind::Layer | NodeKind::GridLayer | NodeKind::GuideLayer
        )
    }

    /// Whether a node of this kind may parent a node of `child`'s kind.
    pub fn allows_child(self, child: NodeKind) -> bool {
        match self {
            NodeKind::Document => matches!(
                child,
                NodeKind::Pages | NodeKind::GridLayer | NodeKind::GuideLayer
            ),
            NodeKind::Pages => child == NodeKind::Page,
            NodeKind::Page => child.is_layer(),
            NodeKind::Layer | NodeKind::GridLayer | NodeKind::GuideLayer | NodeKind::Group => {
                child.is_primitive() || child == NodeKind::Group
            }
            _ => false,
        }
    }
}

/// Geometry payload of a primitive node.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// Axis-aligned rectangle `(x, y, width, height)` before the node trafo.
    Rect { x: f64, y: f64, w: f64, h: f64 },
    /// Ellipse inscribed in `(x, y, width, height)` before the node trafo.
    Ellipse { x: f64, y: f64, w: f64, h: f64 },
    /// Free-form bezier paths.
    Paths(Vec<Path>),
    /// A block of text anchored at `origin`.
    Text { origin: Point, content: String },
}

/// One node of the canonical document tree.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentNode {
    pub kind: NodeKind,
    /// Children in z-order, bottom-most first.
    pub children: Vec<DocumentNode>,
    pub style: StyleId,
    pub trafo: Trafo,
    pub geometry: Option<Geometry>,
    pub name: String,
    /// Meaningful for layer kinds only.
    pub flags: LayerFlags,
    /// Cached bounding box; never copied, recomputed on demand.
    cache_bbox: Option<BBox>,
}

impl DocumentNode {
    pub fn new(kind: NodeKind) -> Self {
        DocumentNode {
            kind,
            children: Vec::new(),
            style: StyleId::DEFAULT,
            trafo: Trafo::IDENTITY,
            geometry: None,
            name: String::new(),
            flags: LayerFlags::default(),
            cache_bbox: None,
        }
    }

    pub fn named(kind: NodeKind, name: &str) -> Self {
        DocumentNode {
            name: name.to_string(),
            ..DocumentNode::new(kind)
        }
    }

    /// Append a child, asserting structural legality.
    pub fn append(&mut self, child: DocumentNode) -> &mut DocumentNode {
        assert!(
            self.kind.allows_child(child.kind),
            "{:?} node cannot parent {:?}",
            self.kind,
            child.kind
        );
        self.cache_bbox = None;
        self.children.push(child);
        self.children.last_mut().unwrap()
    }

    /// Deep copy of this subtree with cache fields cleared.
    pub fn deep_copy(&self) -> DocumentNode {
        DocumentNode {
            kind: self.kind,
            children: self.children.iter().map(DocumentNode::deep_copy).collect(),
            style: self.style,
            trafo: self.trafo,
            geometry: self.geometry.clone(),
            name: self.name.clone(),
            flags: self.flags,
            cache_bbox: None,
        }
    }

    /// The node's outline as bezier paths in parent coordinates.
    ///
    /// Parametric rectangles and ellipses are converted to curves, so formats
    /// without native rect or ellipse records consume a uniform path form.
    pub fn to_paths(&self) -> Vec<Path> {
        let paths = match &self.geometry {
            Some(Geometry::Rect { x, y, w, h }) => vec![rect_path(*x, *y, *w, *h)],
            Some(Geometry::Ellipse { x, y, w, h }) => vec![ellipse_path(*x, *y, *w, *h)],
            Some(Geometry::Paths(paths)) => paths.clone(),
            Some(Geometry::Text { origin, .. }) => {
                // Without glyph outlines the anchor is all the geometry there is.
                vec![Path::new(*origin)]
            }
            None => Vec::new(),
        };
        paths.iter().map(|p| p.transform(&self.trafo)).collect()
    }

    /// Bounding box of this subtree in parent coordinates, cached per node.
    pub fn bbox(&mut self) -> Option<BBox> {
        if let Some(bbox) = self.cache_bbox {
            return Some(bbox);
        }
        let mut result = paths_bbox(&self.to_paths());
        for child in &mut self.children {
            if let Some(child_box) = child.bbox() {
                let mapped = map_bbox(&child_box, &self.trafo);
                result = Some(match result {
                    Some(acc) => acc.union(&mapped),
                    None => mapped,
                });
            }
        }
        self.cache_bbox = result;
        result
    }

    /// Walk the subtree depth-first, parents before children.
    pub fn walk<F: FnMut(&DocumentNode)>(&self, visit: &mut F) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

fn map_bbox(bbox: &BBox, t: &Trafo) -> BBox {
    let corners = [
        Point::new(bbox.x0, bbox.y0),
        Point::new(bbox.x1, bbox.y0),
        Point::new(bbox.x1, bbox.y1),
        Point::new(bbox.x0, bbox.y1),
    ];
    let mut result = BBox::from_point(t.apply(corners[0]));
    for corner in &corners[1..] {
        result.add_point(t.apply(*corner));
    }
    result
}

/// Closed rectangle outline, counter-clockwise from the lower-left corner.
pub fn rect_path(x: f64, y: f64, w: f64, h: f64) -> Path {
    let mut path = Path::new(Point::new(x, y));
    path.line_to(Point::new(x + w, y))
        .line_to(Point::new(x + w, y + h))
        .line_to(Point::new(x, y + h))
        .line_to(Point::new(x, y))
        .close();
    path
}

/// Four-arc bezier approximation of the ellipse inscribed in the rect.
pub fn ellipse_path(x: f64, y: f64, w: f64, h: f64) -> Path {
    let rx = w / 2.0;
    let ry = h / 2.0;
    let cx = x + rx;
    let cy = y + ry;
    let kx = rx * CIRCLE_CTRL;
    let ky = ry * CIRCLE_CTRL;

    let mut path = Path::new(Point::new(cx + rx, cy));
    path.curve_to(
        Point::new(cx + rx, cy + ky),
        Point::new(cx + kx, cy + ry),
        Point::new(cx, cy + ry),
    )
    .curve_to(
        Point::new(cx - kx, cy + ry),
        Point::new(cx - rx, cy + ky),
        Point::new(cx - rx, cy),
    )
    .curve_to(
        Point::new(cx - rx, cy - ky),
        Point::new(cx - kx, cy - ry),
        Point::new(cx, cy - ry),
    )
    .curve_to(
        Point::new(cx + kx, cy - ry),
        Point::new(cx + rx, cy - ky),
        Point::new(cx + rx, cy),
    )
    .close();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_kinds_are_leaves() {
        for kind in [
            NodeKind::Rectangle,
            NodeKind::Ellipse,
            NodeKind::Curve,
            NodeKind::TextBlock,
        ] {
            assert!(kind.is_primitive());
            assert!(!kind.allows_child(NodeKind::Group));
        }
    }

    #[test]
    #[should_panic(expected = "cannot parent")]
    fn test_illegal_append_panics() {
        let mut rect = DocumentNode::new(NodeKind::Rectangle);
        rect.append(DocumentNode::new(NodeKind::Curve));
    }

    #[test]
    fn test_deep_copy_clears_cache() {
        let mut layer = DocumentNode::new(NodeKind::Layer);
        let mut rect = DocumentNode::new(NodeKind::Rectangle);
        rect.geometry = Some(Geometry::Rect {
            x: 0.0,
            y: 0.0,
            w: 10.0,
            h: 5.0,
        });
        layer.append(rect);
        let bbox = layer.bbox();
        assert!(bbox.is_some());

        let copy = layer.deep_copy();
        assert_eq!(copy.children.len(), 1);
        assert!(copy.cache_bbox.is_none());
        assert_eq!(copy.children[0].geometry, layer.children[0].geometry);
    }

    #[test]
    fn test_rect_to_paths_applies_trafo() {
        let mut rect = DocumentNode::new(NodeKind::Rectangle);
        rect.geometry = Some(Geometry::Rect {
            x: 0.0,
            y: 0.0,
            w: 2.0,
            h: 2.0,
        });
        rect.trafo = Trafo::translation(10.0, 0.0);
        let paths = rect.to_paths();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].start, Point::new(10.0, 0.0));
        assert!(paths[0].closed);
    }

    #[test]
    fn test_ellipse_bbox_matches_rect() {
        let path = ellipse_path(0.0, 0.0, 10.0, 6.0);
        let bbox = crate::geom::bbox::path_bbox(&path);
        assert!((bbox.x0 - 0.0).abs() < 0.05);
        assert!((bbox.y0 - 0.0).abs() < 0.05);
        assert!((bbox.x1 - 10.0).abs() < 0.05);
        assert!((bbox.y1 - 6.0).abs() < 0.05);
    }
}
