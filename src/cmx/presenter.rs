//! CMX presenter: the per-format façade tying parser, translator, writer
//! and config together.

use std::fs;
use std::path::Path;

use crate::common::cancel::CancelFlag;
use crate::common::color::SimpleColorManager;
use crate::common::config::FormatConfig;
use crate::common::error::Result;
use crate::model::{Document, TranslationWarning};

use super::config::CmxConfig;
use super::parser::{self, CmxTree};
use super::{translator, writer};

/// Result of loading a CMX file: the native record tree alongside the
/// translated canonical document.
#[derive(Debug)]
pub struct CmxLoader {
    pub tree: CmxTree,
    pub document: Document,
    pub warnings: Vec<TranslationWarning>,
}

/// Entry point for working with CMX documents.
///
/// # Examples
///
/// ```no_run
/// use pitaya::cmx::CmxPresenter;
///
/// let presenter = CmxPresenter::new();
/// let loader = presenter.load("drawing.cmx")?;
/// println!("{} nodes", loader.document.node_count());
/// # Ok::<(), pitaya::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct CmxPresenter {
    pub config: CmxConfig,
    cm: SimpleColorManager,
}

impl CmxPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CmxConfig) -> Self {
        CmxPresenter {
            config,
            cm: SimpleColorManager,
        }
    }

    /// Build a presenter with its config populated from a persisted
    /// `key = value` file; a missing file keeps the defaults.
    pub fn with_config_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = CmxConfig::default();
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

    /// Load a CMX file from disk.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<CmxLoader> {
        self.load_with_cancel(path, &CancelFlag::new())
    }

    /// Load with cooperative cancellation; the flag is checked between
    /// top-level chunks.
    pub fn load_with_cancel<P: AsRef<Path>>(
        &self,
        path: P,
        cancel: &CancelFlag,
    ) -> Result<CmxLoader> {
        let data = fs::read(path.as_ref())?;
        log::debug!(
            "loading CMX file '{}' ({} bytes)",
            path.as_ref().display(),
            data.len()
        );
        self.load_from_bytes(&data, cancel)
    }

    /// Load from an in-memory buffer.
    pub fn load_from_bytes(&self, data: &[u8], cancel: &CancelFlag) -> Result<CmxLoader> {
        let tree = parser::parse(data, cancel)?;
        log::debug!("parsed CMX tree with {} records", tree.root.count());
        let translated = translator::to_canonical(&tree, &self.config, &self.cm)?;
        log::info!(
            "loaded CMX document with {} nodes",
            translated.value.node_count()
        );
        Ok(CmxLoader {
            tree,
            document: translated.value,
            warnings: translated.warnings,
        })
    }

    /// Save a canonical document as a CMX file, returning the degradation
    /// warnings collected on the way.
    pub fn save<P: AsRef<Path>>(
        &self,
        document: &Document,
        path: P,
    ) -> Result<Vec<TranslationWarning>> {
        let (bytes, warnings) = self.save_to_bytes(document);
        for warning in &warnings {
            log::warn!("CMX export: {:?}: {}", warning.kind, warning.message);
        }
        fs::write(path.as_ref(), bytes)?;
        log::info!("saved CMX file '{}'", path.as_ref().display());
        Ok(warnings)
    }

    /// Serialize a canonical document to CMX bytes.
    pub fn save_to_bytes(&self, document: &Document) -> (Vec<u8>, Vec<TranslationWarning>) {
        let translated = translator::from_canonical(document, &self.config, &self.cm);
        (writer::write(&translated.value), translated.warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::color::{Color, SpotFallback};
    use crate::model::{DocumentNode, Fill, Geometry, NodeKind, Style, Stroke};

    #[test]
    fn test_new_document_skeleton() {
        let presenter = CmxPresenter::new();
        let doc = presenter.new_document();
        assert_eq!(doc.styles.len(), 1);
        assert_eq!(doc.pages().children.len(), 1);
    }

    #[test]
    fn test_save_load_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drawing.cmx");

        let presenter = CmxPresenter::new();
        let mut doc = presenter.new_document();
        let mut style = Style::new("red");
        style.fill = Fill::Solid(Color::cmyk(0.0, 1.0, 1.0, 0.0));
        style.stroke = Stroke::None;
        let style_id = doc.styles.publish(style);
        let mut rect = DocumentNode::new(NodeKind::Rectangle);
        rect.style = style_id;
        rect.geometry = Some(Geometry::Rect {
            x: 0.0,
            y: 0.0,
            w: 72.0,
            h: 72.0,
        });
        doc.active_layer_mut().append(rect);

        let warnings = presenter.save(&doc, &path).unwrap();
        assert!(warnings.is_empty());

        let loader = presenter.load(&path).unwrap();
        let layer = &loader.document.pages().children[0].children[0];
        assert_eq!(layer.children.len(), 1);
        assert_eq!(layer.children[0].kind, NodeKind::Rectangle);
    }

    #[test]
    fn test_config_file_round_trip_into_presenter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cmx.cfg");
        std::fs::write(&path, "factor = 0.1\nspot_fallback = rgb\n").unwrap();

        let presenter = CmxPresenter::with_config_file(&path).unwrap();
        assert_eq!(presenter.config.factor, 0.1);
        assert_eq!(presenter.config.spot_fallback, SpotFallback::Rgb);

        // Write-back round trip keeps the persisted state.
        let out = dir.path().join("saved.cfg");
        presenter.save_config(&out).unwrap();
        let reloaded = CmxPresenter::with_config_file(&out).unwrap();
        assert_eq!(reloaded.config.spot_fallback, SpotFallback::Rgb);

        // A missing file keeps the defaults.
        let fresh = CmxPresenter::with_config_file(dir.path().join("none.cfg")).unwrap();
        assert_eq!(fresh.config.factor, 0.072);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let presenter = CmxPresenter::new();
        let err = presenter.load("/nonexistent/drawing.cmx").unwrap_err();
        assert!(matches!(err, crate::common::error::Error::Io(_)));
    }

    #[test]
    fn test_save_load_byte_stability() {
        // Parsing a written file and writing the unmodified tree again
        // reproduces the bytes exactly.
        let presenter = CmxPresenter::new();
        let doc = presenter.new_document();
        let (bytes, _) = presenter.save_to_bytes(&doc);
        let loader = presenter
            .load_from_bytes(&bytes, &CancelFlag::new())
            .unwrap();
        assert_eq!(crate::cmx::writer::write(&loader.tree), bytes);
    }
}
