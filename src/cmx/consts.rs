//! CMX container constants and tag tables.
//!
//! CMX is a RIFF-family container: a `RIFF` (little-endian) or `RIFX`
//! (big-endian) root carrying the `CMX1` form type, `LIST` chunks for
//! nesting and fourcc-tagged leaf chunks.

use phf::phf_map;

use crate::chunk::RecordTag;

/// Little-endian root chunk tag.
pub const ROOT_LE: [u8; 4] = *b"RIFF";
/// Big-endian root chunk tag.
pub const ROOT_BE: [u8; 4] = *b"RIFX";
/// Nested container chunk tag.
pub const LIST: [u8; 4] = *b"LIST";
/// Form type identifying a CMX document inside the RIFF root.
pub const CMX_FORM: &[u8; 4] = b"CMX1";

/// Document info chunk: carries the coordinate scale factor as an f64.
pub const CONT: [u8; 4] = *b"cont";
/// Color table chunk.
pub const RCLR: [u8; 4] = *b"rclr";
/// Layer info chunk: flags byte plus layer name.
pub const LINF: [u8; 4] = *b"linf";
/// Rectangle leaf chunk.
pub const RECT: [u8; 4] = *b"rect";
/// Ellipse leaf chunk.
pub const ELPS: [u8; 4] = *b"elps";
/// Bezier path leaf chunk.
pub const PATH: [u8; 4] = *b"path";

/// LIST form types.
pub const LIST_PAGE: [u8; 4] = *b"page";
pub const LIST_LAYR: [u8; 4] = *b"layr";
pub const LIST_GRP: [u8; 4] = *b"grp ";

/// Color model bytes in the color table.
pub const COLOR_MODEL_CMYK: u8 = 2;
pub const COLOR_MODEL_RGB: u8 = 5;
pub const COLOR_MODEL_GRAY: u8 = 9;

/// "No color" index in shape chunks.
pub const COLOR_NONE: u16 = 0xFFFF;

/// Path point verbs.
pub const VERB_MOVE: u8 = 0;
pub const VERB_LINE: u8 = 1;
pub const VERB_CONTROL: u8 = 2;
pub const VERB_CURVE_END: u8 = 3;
/// Set on a `VERB_MOVE` byte when the subpath it starts is closed.
pub const VERB_CLOSED_FLAG: u8 = 0x80;
/// Mask selecting the verb bits.
pub const VERB_MASK: u8 = 0x0F;

/// Human-readable names for diagnostics.
pub static CHUNK_NAMES: phf::Map<&'static [u8], &'static str> = phf_map! {
    b"RIFF" => "root (little-endian)",
    b"RIFX" => "root (big-endian)",
    b"LIST" => "list",
    b"cont" => "document info",
    b"rclr" => "color table",
    b"linf" => "layer info",
    b"rect" => "rectangle",
    b"elps" => "ellipse",
    b"path" => "bezier path",
};

/// Name of a chunk tag for log output.
pub fn chunk_name(tag: RecordTag) -> &'static str {
    match tag {
        RecordTag::FourCc(bytes) => CHUNK_NAMES.get(bytes.as_slice()).copied().unwrap_or("unknown"),
        RecordTag::Opcode(_) => "unknown",
    }
}

/// Signature check used by the format detection dispatcher: a RIFF or RIFX
/// root whose form type is `CMX1`.
pub fn check_signature(prefix: &[u8]) -> bool {
    if prefix.len() < 12 {
        return false;
    }
    let root = &prefix[0..4];
    (root == ROOT_LE || root == ROOT_BE) && &prefix[8..12] == CMX_FORM
}
