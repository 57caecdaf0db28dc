//! Shared translation machinery: format capabilities, warnings and graceful
//! degradation of styles a target format cannot represent.
//!
//! Degradation never aborts a save. Every degraded node yields exactly one
//! [`TranslationWarning`] so callers can report what was lost.

use crate::common::color::{Color, ColorManager, Colorspace, SpotFallback};
use crate::model::node::NodeKind;
use crate::model::style::{Fill, Stroke, Style};

/// What a target format can represent natively.
#[derive(Debug, Clone, Copy)]
pub struct FormatCaps {
    pub gradients: bool,
    pub patterns: bool,
    pub spot_colors: bool,
    /// Colorspaces the format stores directly; everything else converts.
    pub colorspaces: &'static [Colorspace],
}

impl FormatCaps {
    pub fn supports_space(&self, space: Colorspace) -> bool {
        self.colorspaces.contains(&space)
    }

    /// The colorspace a color lands in after conversion for this format.
    pub fn target_space(&self, color: &Color) -> Colorspace {
        if self.supports_space(color.space) && (color.space != Colorspace::Spot || self.spot_colors)
        {
            color.space
        } else {
            self.colorspaces[0]
        }
    }
}

/// One lossy adjustment made while translating a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationWarning {
    pub kind: NodeKind,
    pub message: String,
}

impl TranslationWarning {
    pub fn new(kind: NodeKind, message: impl Into<String>) -> Self {
        TranslationWarning {
            kind,
            message: message.into(),
        }
    }
}

/// A translation product plus the warnings accumulated while producing it.
#[derive(Debug, Clone)]
pub struct Translated<T> {
    pub value: T,
    pub warnings: Vec<TranslationWarning>,
}

impl<T> Translated<T> {
    pub fn clean(value: T) -> Self {
        Translated {
            value,
            warnings: Vec::new(),
        }
    }

    pub fn is_lossless(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Rewrite `style` into what `caps` can hold, emitting at most one warning.
///
/// A gradient or pattern fill collapses to a solid fill (first stop or
/// foreground color); spot colors fall back to the alternate selected by
/// `fallback`; out-of-gamut-for-the-format colorspaces convert. Exactly one
/// warning is recorded per degraded node even when several adjustments stack.
pub fn degrade_style(
    style: &Style,
    caps: &FormatCaps,
    cm: &dyn ColorManager,
    fallback: SpotFallback,
    kind: NodeKind,
    warnings: &mut Vec<TranslationWarning>,
) -> Style {
    let mut result = style.clone();
    let mut lossy: Option<String> = None;

    match &style.fill {
        Fill::Gradient(gradient) if !caps.gradients => {
            result.fill = match gradient.first_color() {
                Some(color) => Fill::Solid(color.clone()),
                None => Fill::None,
            };
            lossy = Some("gradient fill flattened to solid".to_string());
        }
        Fill::Pattern(pattern) if !caps.patterns => {
            result.fill = Fill::Solid(pattern.fg.clone());
            lossy = Some("pattern fill flattened to solid".to_string());
        }
        _ => {}
    }

    if let Fill::Solid(color) = &result.fill {
        let target = caps.target_space(color);
        if target != color.space {
            if color.space == Colorspace::Spot && lossy.is_none() {
                lossy = Some(format!("spot color '{}' replaced by alternate", color.name));
            }
            result.fill = Fill::Solid(cm.convert(color, target, fallback));
        }
    }

    if let Stroke::Solid(spec) = &mut result.stroke {
        let target = caps.target_space(&spec.color);
        if target != spec.color.space {
            if spec.color.space == Colorspace::Spot && lossy.is_none() {
                lossy = Some(format!(
                    "spot color '{}' replaced by alternate",
                    spec.color.name
                ));
            }
            spec.color = cm.convert(&spec.color, target, fallback);
        }
    }

    if let Some(message) = lossy {
        warnings.push(TranslationWarning::new(kind, message));
    }
    result
}
