//! # pitaya
//!
//! Multi-format vector-graphics interchange engine: binary container
//! parsers, a canonical document model, a bezier geometry engine and
//! bidirectional per-format translators with graceful degradation.
//!
//! ## Supported formats
//!
//! | Format | Container | Read | Write |
//! |--------|-----------|------|-------|
//! | CMX | RIFF-family fourcc chunks | ✅ | ✅ |
//! | XAR | compact record stream, deflate regions | ✅ | ✅ |
//!
//! ## Quick start
//!
//! ```no_run
//! use pitaya::cmx::CmxPresenter;
//! use pitaya::xar::XarPresenter;
//!
//! // Load a CMX drawing and re-save it as XAR.
//! let loader = CmxPresenter::new().load("drawing.cmx")?;
//! let warnings = XarPresenter::new().save(&loader.document, "drawing.xar")?;
//! for warning in &warnings {
//!     eprintln!("lost in translation: {}", warning.message);
//! }
//! # Ok::<(), pitaya::Error>(())
//! ```
//!
//! Format detection sniffs a small prefix without interpreting payloads:
//!
//! ```no_run
//! use pitaya::common::detection::detect_file_format;
//!
//! if let Some(format) = detect_file_format("drawing.bin")? {
//!     println!("looks like {}", format);
//! }
//! # Ok::<(), pitaya::Error>(())
//! ```

pub mod chunk;
pub mod cmx;
pub mod common;
pub mod geom;
pub mod model;
pub mod xar;

pub use common::cancel::CancelFlag;
pub use common::detection::{FileFormat, detect_file_format, detect_format_from_bytes};
pub use common::error::{Error, Result};
pub use model::{Document, DocumentNode, NodeKind, TranslationWarning};
