//! Common types and utilities shared across formats.
//!
//! This module provides the unified error type, binary reading primitives,
//! the color model, config persistence and format detection used by every
//! format implementation, ensuring a consistent API for users.

pub mod binary;
pub mod cancel;
pub mod color;
pub mod config;
pub mod detection;
pub mod error;

pub use cancel::CancelFlag;
pub use color::{Color, ColorManager, Colorspace, SimpleColorManager, SpotFallback};
pub use config::FormatConfig;
pub use detection::{FileFormat, detect_file_format, detect_format_from_bytes};
pub use error::{Error, Result};
