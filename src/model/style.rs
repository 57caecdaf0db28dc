//! Style value types and the immutable style table.
//!
//! A style bundles a fill spec, a stroke spec, an optional text spec and an
//! optional structural spec, each a tagged variant. Styles are values until
//! they are published into a [`StyleTable`]; after publication they are
//! immutable and referenced by index from any number of nodes, so no
//! synchronization is ever needed to share them.

use crate::common::color::Color;

/// Fill specification.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Fill {
    #[default]
    None,
    Solid(Color),
    Gradient(Gradient),
    Pattern(Pattern),
}

/// Gradient flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientKind {
    Linear,
    Radial,
}

/// A color stop at a normalized offset in 0..=1.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientStop {
    pub offset: f64,
    pub color: Color,
}

/// A two-point gradient with stops sorted by offset.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    pub kind: GradientKind,
    pub stops: Vec<GradientStop>,
}

impl Gradient {
    /// The first stop's color, used when a target format degrades the
    /// gradient to a solid fill; `None` for a stopless gradient.
    pub fn first_color(&self) -> Option<&Color> {
        self.stops.first().map(|stop| &stop.color)
    }
}

/// A two-color bitmap pattern fill.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    pub fg: Color,
    pub bg: Color,
    /// Raw 1-bit pattern bitmap, format-specific.
    pub bitmap: Vec<u8>,
}

/// Stroke specification.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Stroke {
    #[default]
    None,
    Solid(StrokeSpec),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

/// Solid stroke parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeSpec {
    pub width: f64,
    pub color: Color,
    /// Dash pattern in stroke-width units; empty means a solid line.
    pub dashes: Vec<f64>,
    pub cap: LineCap,
    pub join: LineJoin,
}

impl StrokeSpec {
    pub fn hairline(color: Color) -> Self {
        StrokeSpec {
            width: 0.1,
            color,
            dashes: Vec::new(),
            cap: LineCap::default(),
            join: LineJoin::default(),
        }
    }
}

/// Text styling carried by text nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpec {
    pub font_family: String,
    pub font_size: f64,
}

impl Default for TextSpec {
    fn default() -> Self {
        TextSpec {
            font_family: "Sans".to_string(),
            font_size: 12.0,
        }
    }
}

/// Structural styling for non-printable layers (guides, grids).
#[derive(Debug, Clone, PartialEq)]
pub enum Structural {
    Guide { color: Color },
    Grid { color: Color, geometry: [f64; 4] },
}

/// A complete, publishable style entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub name: String,
    pub fill: Fill,
    pub stroke: Stroke,
    pub text: Option<TextSpec>,
    pub structural: Option<Structural>,
}

impl Style {
    pub fn new(name: &str) -> Self {
        Style {
            name: name.to_string(),
            fill: Fill::None,
            stroke: Stroke::None,
            text: None,
            structural: None,
        }
    }

    /// The built-in style every new document starts with: no fill, thin
    /// black stroke.
    pub fn default_style() -> Self {
        Style {
            name: "Default Style".to_string(),
            fill: Fill::None,
            stroke: Stroke::Solid(StrokeSpec {
                width: 0.5,
                color: Color::black(),
                dashes: Vec::new(),
                cap: LineCap::Butt,
                join: LineJoin::Miter,
            }),
            text: Some(TextSpec::default()),
            structural: None,
        }
    }
}

/// Index of a published style inside a [`StyleTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StyleId(pub usize);

impl StyleId {
    /// The default style present in every table.
    pub const DEFAULT: StyleId = StyleId(0);
}

/// Append-only table of published styles.
///
/// Entries are immutable once published; there is deliberately no mutable
/// accessor. To change a node's look, publish a new style and repoint the
/// node.
#[derive(Debug, Clone)]
pub struct StyleTable {
    entries: Vec<Style>,
}

impl Default for StyleTable {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleTable {
    /// A table seeded with the "Default Style" entry at index 0.
    pub fn new() -> Self {
        StyleTable {
            entries: vec![Style::default_style()],
        }
    }

    /// Publish a style, returning its id. The style is frozen from here on.
    pub fn publish(&mut self, style: Style) -> StyleId {
        // Reuse an identical entry instead of growing the table.
        if let Some(idx) = self.entries.iter().position(|s| *s == style) {
            return StyleId(idx);
        }
        self.entries.push(style);
        StyleId(self.entries.len() - 1)
    }

    pub fn get(&self, id: StyleId) -> &Style {
        &self.entries[id.0]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StyleId, &Style)> {
        self.entries.iter().enumerate().map(|(i, s)| (StyleId(i), s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_seeds_default_style() {
        let table = StyleTable::new();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(StyleId::DEFAULT).name, "Default Style");
    }

    #[test]
    fn test_publish_dedupes_identical_styles() {
        let mut table = StyleTable::new();
        let mut style = Style::new("red fill");
        style.fill = Fill::Solid(Color::rgb(1.0, 0.0, 0.0));
        let a = table.publish(style.clone());
        let b = table.publish(style);
        assert_eq!(a, b);
        assert_eq!(table.len(), 2);
    }
}
