//! File format detection.
//!
//! Each format registers a signature check that reads a small fixed prefix of
//! the file; the dispatcher tries the checks in priority order and falls back
//! to content-based heuristics when no signature matches. Detection never
//! interprets payloads, so it is safe to run on arbitrary input.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::common::error::Result;
use crate::{cmx, xar};

mod types;

pub use types::FileFormat;

/// Bytes of prefix the dispatcher needs for all signature checks.
pub const SNIFF_LEN: usize = 64;

/// A registered signature check: reads only a fixed prefix, answers yes/no.
struct SignatureCheck {
    format: FileFormat,
    check: fn(&[u8]) -> bool,
}

/// Checks in priority order: more specific signatures first.
const SIGNATURE_CHECKS: &[SignatureCheck] = &[
    SignatureCheck {
        format: FileFormat::Xar,
        check: xar::consts::check_signature,
    },
    SignatureCheck {
        format: FileFormat::Cmx,
        check: cmx::consts::check_signature,
    },
];

/// Detect the format of an in-memory prefix.
///
/// Returns `None` when no registered format claims the data — the caller
/// treats that as "not ours", not as an error.
pub fn detect_format_from_bytes(prefix: &[u8]) -> Option<FileFormat> {
    for sig in SIGNATURE_CHECKS {
        if (sig.check)(prefix) {
            return Some(sig.format);
        }
    }
    // Heuristic fallback: a stray RIFF container whose form type got
    // mangled but still carries the CMX form tag somewhere in the header.
    if prefix.len() >= 12 && prefix.windows(4).take(16).any(|w| w == cmx::consts::CMX_FORM) {
        return Some(FileFormat::Cmx);
    }
    None
}

/// Detect the format of a file on disk by reading its prefix.
pub fn detect_file_format<P: AsRef<Path>>(path: P) -> Result<Option<FileFormat>> {
    let mut file = File::open(path)?;
    let mut prefix = [0u8; SNIFF_LEN];
    let mut filled = 0;
    while filled < SNIFF_LEN {
        let n = file.read(&mut prefix[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(detect_format_from_bytes(&prefix[..filled]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_xar_signature() {
        let mut data = xar::consts::XAR_SIGNATURE.to_vec();
        data.extend_from_slice(&[0u8; 16]);
        assert_eq!(detect_format_from_bytes(&data), Some(FileFormat::Xar));
    }

    #[test]
    fn test_detect_cmx_signature() {
        let mut data = b"RIFF\x00\x00\x00\x00CMX1".to_vec();
        data.extend_from_slice(&[0u8; 16]);
        assert_eq!(detect_format_from_bytes(&data), Some(FileFormat::Cmx));
    }

    #[test]
    fn test_unknown_prefix_is_not_an_error() {
        assert_eq!(detect_format_from_bytes(b"GIF89a whatever"), None);
        assert_eq!(detect_format_from_bytes(b""), None);
    }
}
