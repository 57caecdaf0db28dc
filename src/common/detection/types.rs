//! Format identifiers used by the sniffing dispatcher.

use std::fmt;

/// Supported vector graphics interchange formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    /// RIFF-family Corel Presentation Exchange container.
    Cmx,
    /// XAR-style compressed record stream.
    Xar,
}

impl FileFormat {
    /// Conventional file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            FileFormat::Cmx => "cmx",
            FileFormat::Xar => "xar",
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileFormat::Cmx => write!(f, "CMX"),
            FileFormat::Xar => write!(f, "XAR"),
        }
    }
}
