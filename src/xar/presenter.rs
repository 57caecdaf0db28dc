//! XAR presenter: the per-format façade tying parser, translator, writer
//! and config together.

use std::fs;
use std::path::Path;

use crate::common::cancel::CancelFlag;
use crate::common::color::SimpleColorManager;
use crate::common::config::FormatConfig;
use crate::common::error::Result;
use crate::model::{Document, TranslationWarning};

use super::config::XarConfig;
use super::parser::{self, XarTree};
use super::{translator, writer};

/// Result of loading a XAR file: the native record tree alongside the
/// translated canonical document.
#[derive(Debug)]
pub struct XarLoader {
    pub tree: XarTree,
    pub document: Document,
    pub warnings: Vec<TranslationWarning>,
}

/// Entry point for working with XAR documents.
///
/// # Examples
///
/// ```no_run
/// use pitaya::xar::XarPresenter;
///
/// let presenter = XarPresenter::new();
/// let loader = presenter.load("drawing.xar")?;
/// println!("{} nodes", loader.document.node_count());
/// # Ok::<(), pitaya::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct XarPresenter {
    pub config: XarConfig,
    cm: SimpleColorManager,
}

impl XarPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: XarConfig) -> Self {
        XarPresenter {
            config,
            cm: SimpleColorManager,
        }
    }

    /// Build a presenter with its config populated from a persisted
    /// `key = value` file; a missing file keeps the defaults.
    pub fn with_config_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = XarConfig::default();
        config.load(path.as_ref())?;
        Ok(Self::with_config(config))
    }

    /// Persist the current config as a `key = value` file.
    pub fn save_config<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.config.save(path.as_ref())
    }

    /// A fresh document with the standard skeleton.
    pub fn new_document(&self) -> Document {
        Document::new()
    }

    /// Load a XAR file from disk.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<XarLoader> {
        self.load_with_cancel(path, &CancelFlag::new())
    }

    /// Load with cooperative cancellation; the flag is checked between
    /// top-level records.
    pub fn load_with_cancel<P: AsRef<Path>>(
        &self,
        path: P,
        cancel: &CancelFlag,
    ) -> Result<XarLoader> {
        let data = fs::read(path.as_ref())?;
        log::debug!(
            "loading XAR file '{}' ({} bytes)",
            path.as_ref().display(),
            data.len()
        );
        self.load_from_bytes(&data, cancel)
    }

    /// Load from an in-memory buffer.
    pub fn load_from_bytes(&self, data: &[u8], cancel: &CancelFlag) -> Result<XarLoader> {
        let tree = parser::parse(data, cancel)?;
        log::debug!(
            "parsed XAR tree with {} records (compressed: {})",
            tree.root.count(),
            tree.compressed
        );
        let translated = translator::to_canonical(&tree, &self.config, &self.cm)?;
        log::info!(
            "loaded XAR document with {} nodes",
            translated.value.node_count()
        );
        Ok(XarLoader {
            tree,
            document: translated.value,
            warnings: translated.warnings,
        })
    }

    /// Save a canonical document as a XAR file, returning the degradation
    /// warnings collected on the way.
    pub fn save<P: AsRef<Path>>(
        &self,
        document: &Document,
        path: P,
    ) -> Result<Vec<TranslationWarning>> {
        let (bytes, warnings) = self.save_to_bytes(document)?;
        for warning in &warnings {
            log::warn!("XAR export: {:?}: {}", warning.kind, warning.message);
        }
        fs::write(path.as_ref(), bytes)?;
        log::info!("saved XAR file '{}'", path.as_ref().display());
        Ok(warnings)
    }

    /// Serialize a canonical document to XAR bytes.
    pub fn save_to_bytes(&self, document: &Document) -> Result<(Vec<u8>, Vec<TranslationWarning>)> {
        let translated = translator::from_canonical(document, &self.config, &self.cm);
        Ok((writer::write(&translated.value)?, translated.warnings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::color::{Color, ColorManager, SpotFallback};
    use crate::geom::Point;
    use crate::model::{DocumentNode, Fill, Geometry, NodeKind, Style, Stroke};

    fn doc_with_text() -> Document {
        let mut doc = Document::new();
        let mut style = Style::new("blue");
        style.fill = Fill::Solid(Color::rgb(0.0, 0.0, 1.0));
        style.stroke = Stroke::None;
        let style_id = doc.styles.publish(style);
        let mut text = DocumentNode::new(NodeKind::TextBlock);
        text.style = style_id;
        text.geometry = Some(Geometry::Text {
            origin: Point::new(10.0, 10.0),
            content: "pitaya".to_string(),
        });
        doc.active_layer_mut().append(text);
        doc
    }

    #[test]
    fn test_save_load_compressed_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drawing.xar");

        let presenter = XarPresenter::new();
        assert!(presenter.config.save_compressed);
        let warnings = presenter.save(&doc_with_text(), &path).unwrap();
        assert!(warnings.is_empty());

        let loader = presenter.load(&path).unwrap();
        assert!(loader.tree.compressed);
        let layer = &loader.document.pages().children[0].children[0];
        assert_eq!(layer.children[0].kind, NodeKind::TextBlock);
    }

    #[test]
    fn test_save_load_uncompressed() {
        let mut config = XarConfig::default();
        config.save_compressed = false;
        let presenter = XarPresenter::with_config(config);

        let (bytes, _) = presenter.save_to_bytes(&doc_with_text()).unwrap();
        let loader = presenter
            .load_from_bytes(&bytes, &CancelFlag::new())
            .unwrap();
        assert!(!loader.tree.compressed);
        // Unmodified tree serializes back byte-exactly.
        assert_eq!(crate::xar::writer::write(&loader.tree).unwrap(), bytes);
    }

    #[test]
    fn test_config_file_drives_save_behavior() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("xar.cfg");
        std::fs::write(&path, "save_compressed = 0\nspot_fallback = cmyk\n").unwrap();

        let presenter = XarPresenter::with_config_file(&path).unwrap();
        assert_eq!(presenter.config.spot_fallback, SpotFallback::Cmyk);
        let (bytes, _) = presenter.save_to_bytes(&doc_with_text()).unwrap();
        let loader = presenter
            .load_from_bytes(&bytes, &CancelFlag::new())
            .unwrap();
        assert!(!loader.tree.compressed);

        // Write-back round trip keeps the persisted state.
        let out = dir.path().join("saved.cfg");
        presenter.save_config(&out).unwrap();
        let reloaded = XarPresenter::with_config_file(&out).unwrap();
        assert!(!reloaded.config.save_compressed);
    }

    #[test]
    fn test_cross_format_interchange() {
        // CMX -> canonical -> XAR -> canonical keeps solid basic shapes
        // within quantization tolerance.
        let cmx = crate::cmx::CmxPresenter::new();
        let mut doc = cmx.new_document();
        let mut style = Style::new("spot-ish");
        style.fill = Fill::Solid(Color::cmyk(0.0, 1.0, 1.0, 0.0));
        style.stroke = Stroke::None;
        let style_id = doc.styles.publish(style);
        let mut rect = DocumentNode::new(NodeKind::Rectangle);
        rect.style = style_id;
        rect.geometry = Some(Geometry::Rect {
            x: 7.2,
            y: 7.2,
            w: 144.0,
            h: 72.0,
        });
        doc.active_layer_mut().append(rect);

        let (cmx_bytes, _) = cmx.save_to_bytes(&doc);
        let from_cmx = cmx.load_from_bytes(&cmx_bytes, &CancelFlag::new()).unwrap();

        let xar = XarPresenter::new();
        let (xar_bytes, warnings) = xar.save_to_bytes(&from_cmx.document).unwrap();
        // CMYK solid converts to RGB channels silently.
        assert!(warnings.is_empty());
        let from_xar = xar.load_from_bytes(&xar_bytes, &CancelFlag::new()).unwrap();

        let layer = &from_xar.document.pages().children[0].children[0];
        assert_eq!(layer.children.len(), 1);
        match layer.children[0].geometry.as_ref().unwrap() {
            Geometry::Rect { x, y, w, h } => {
                assert!((x - 7.2).abs() < 0.1);
                assert!((y - 7.2).abs() < 0.1);
                assert!((w - 144.0).abs() < 0.1);
                assert!((h - 72.0).abs() < 0.1);
            }
            other => panic!("unexpected geometry {:?}", other),
        }
        match &from_xar.document.styles.get(layer.children[0].style).fill {
            Fill::Solid(color) => {
                // CMYK red lands on RGB red.
                let rgb = crate::common::color::SimpleColorManager.resolve_rgb(color);
                assert!((rgb[0] - 1.0).abs() < 0.01);
                assert!(rgb[1] < 0.01 && rgb[2] < 0.01);
            }
            other => panic!("unexpected fill {:?}", other),
        }
    }

    #[test]
    fn test_cancelled_load() {
        let presenter = XarPresenter::new();
        let (bytes, _) = presenter.save_to_bytes(&doc_with_text()).unwrap();
        let cancel = CancelFlag::new();
        cancel.cancel();
        let err = presenter.load_from_bytes(&bytes, &cancel).unwrap_err();
        assert!(matches!(err, crate::common::error::Error::Cancelled));
    }
}
