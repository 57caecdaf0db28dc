//! Canonical, format-agnostic document model.
//!
//! A [`Document`] owns a style table and a node tree rooted at a
//! [`NodeKind::Document`] node. Translators build and consume this model;
//! nothing in it is specific to any file format.

pub mod node;
pub mod style;
pub mod translate;

pub use node::{DocumentNode, Geometry, LayerFlags, NodeKind, ellipse_path, rect_path};
pub use style::{
    Fill, Gradient, GradientKind, GradientStop, LineCap, LineJoin, Pattern, Stroke, StrokeSpec,
    Style, StyleId, StyleTable, TextSpec,
};
pub use translate::{FormatCaps, Translated, TranslationWarning, degrade_style};

/// A complete canonical document: style table plus node tree.
#[derive(Debug, Clone)]
pub struct Document {
    pub styles: StyleTable,
    pub root: DocumentNode,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document seeded with the standard skeleton: one page with one
    /// default layer under the page set, plus document-level grid and guide
    /// layers, and the "Default Style" table entry.
    pub fn new() -> Self {
        let mut root = DocumentNode::new(NodeKind::Document);

        let mut pages = DocumentNode::new(NodeKind::Pages);
        let mut page = DocumentNode::named(NodeKind::Page, "Page 1");
        page.append(DocumentNode::named(NodeKind::Layer, "Layer 1"));
        pages.append(page);
        root.append(pages);

        root.append(DocumentNode::named(NodeKind::GridLayer, "Grid"));
        root.append(DocumentNode::named(NodeKind::GuideLayer, "Guide Layer"));

        Document {
            styles: StyleTable::new(),
            root,
        }
    }

    /// The page set node.
    pub fn pages(&self) -> &DocumentNode {
        // Seeded in new() and never removed.
        &self.root.children[0]
    }

    pub fn pages_mut(&mut self) -> &mut DocumentNode {
        &mut self.root.children[0]
    }

    /// The currently active layer: the last layer of the last page.
    pub fn active_layer_mut(&mut self) -> &mut DocumentNode {
        let page = self
            .pages_mut()
            .children
            .last_mut()
            .filter(|n| n.kind == NodeKind::Page);
        match page {
            Some(page) if !page.children.is_empty() => {
                page.children.last_mut().filter(|n| n.kind.is_layer())
            }
            _ => None,
        }
        .expect("document skeleton always carries a page with a layer")
    }

    /// Total node count, root included.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.root.walk(&mut |_| count += 1);
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document_skeleton() {
        let doc = Document::new();
        assert_eq!(doc.root.kind, NodeKind::Document);
        // Pages, grid layer, guide layer.
        assert_eq!(doc.root.children.len(), 3);
        assert_eq!(doc.root.children[1].kind, NodeKind::GridLayer);
        assert_eq!(doc.root.children[2].kind, NodeKind::GuideLayer);

        let pages = doc.pages();
        assert_eq!(pages.kind, NodeKind::Pages);
        assert_eq!(pages.children.len(), 1);
        assert_eq!(pages.children[0].children[0].kind, NodeKind::Layer);

        assert_eq!(doc.styles.len(), 1);
    }

    #[test]
    fn test_active_layer_receives_objects() {
        let mut doc = Document::new();
        let mut rect = DocumentNode::new(NodeKind::Rectangle);
        rect.geometry = Some(Geometry::Rect {
            x: 1.0,
            y: 1.0,
            w: 4.0,
            h: 4.0,
        });
        doc.active_layer_mut().append(rect);
        assert_eq!(doc.node_count(), 7);
    }
}
