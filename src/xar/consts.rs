//! XAR record-stream constants.
//!
//! The container is a flat stream of compact records after an 8-byte
//! signature: u8 tag + u8 size, where a size byte of 0x1F announces an
//! extended little-endian u32 size. Structure is explicit in the stream:
//! `DOWN` descends into the record before it, `UP` ascends, compression
//! brackets wrap a raw-deflate span.

use phf::phf_map;

/// 8-byte stream signature.
pub const XAR_SIGNATURE: &[u8; 8] = b"XARA\xa3\xa3\r\n";

/// Size byte announcing an extended u32 record size.
pub const EXTENDED_SIZE: u8 = 0x1F;

// Structure tags.
pub const TAG_UP: u32 = 0;
pub const TAG_DOWN: u32 = 1;
pub const TAG_FILEHEADER: u32 = 2;
pub const TAG_ENDOFFILE: u32 = 3;

// Compression brackets.
pub const TAG_STARTCOMPRESSION: u32 = 30;
pub const TAG_ENDCOMPRESSION: u32 = 31;

// Document structure.
pub const TAG_DOCUMENT: u32 = 40;
pub const TAG_CHAPTER: u32 = 41;
pub const TAG_SPREAD: u32 = 42;
pub const TAG_LAYER: u32 = 43;
pub const TAG_LAYERDETAILS: u32 = 44;

// Objects.
pub const TAG_PATH: u32 = 100;
pub const TAG_RECTANGLE: u32 = 101;
pub const TAG_ELLIPSE: u32 = 102;
pub const TAG_TEXT: u32 = 103;
pub const TAG_GROUP: u32 = 110;

// Attributes; they persist in stream order until overwritten and are
// consumed by the next object record.
pub const TAG_FLATFILL: u32 = 150;
pub const TAG_LINECOLOUR: u32 = 151;
pub const TAG_LINEWIDTH: u32 = 152;
pub const TAG_NOFILL: u32 = 153;
pub const TAG_NOSTROKE: u32 = 154;

/// Path point verbs, shared with the path record payload.
pub const VERB_MOVE: u8 = 0;
pub const VERB_LINE: u8 = 1;
pub const VERB_CONTROL: u8 = 2;
pub const VERB_CURVE_END: u8 = 3;
pub const VERB_CLOSED_FLAG: u8 = 0x80;
pub const VERB_MASK: u8 = 0x0F;

/// Scale from millipoint file units to document points.
pub const MILLIPOINT: f64 = 0.001;

pub static TAG_NAMES: phf::Map<u32, &'static str> = phf_map! {
    0u32 => "up",
    1u32 => "down",
    2u32 => "file header",
    3u32 => "end of file",
    30u32 => "start compression",
    31u32 => "end compression",
    40u32 => "document",
    41u32 => "chapter",
    42u32 => "spread",
    43u32 => "layer",
    44u32 => "layer details",
    100u32 => "path",
    101u32 => "rectangle",
    102u32 => "ellipse",
    103u32 => "text",
    110u32 => "group",
    150u32 => "flat fill",
    151u32 => "line colour",
    152u32 => "line width",
    153u32 => "no fill",
    154u32 => "no stroke",
};

/// Name of a record tag for log output.
pub fn tag_name(tag: u32) -> &'static str {
    TAG_NAMES.get(&tag).copied().unwrap_or("unknown")
}

/// Signature check used by the format detection dispatcher.
pub fn check_signature(prefix: &[u8]) -> bool {
    prefix.len() >= XAR_SIGNATURE.len() && prefix[..XAR_SIGNATURE.len()] == XAR_SIGNATURE[..]
}
