//! XAR record-stream parser.
//!
//! Records are read sequentially; `DOWN` descends into the record just read,
//! `UP` ascends (an unmatched `UP` is fatal). `STARTCOMPRESSION` switches the
//! rest of the stream through an inflating adapter until `ENDCOMPRESSION`,
//! whose raw payload declares the decompressed byte count and CRC32 that
//! must match what the adapter accumulated. `ENDOFFILE` (or a clean end of
//! input at a record boundary) terminates parsing.

use crate::chunk::{Record, RecordTag, inflate_region};
use crate::common::binary::read_u32_le;
use crate::common::cancel::CancelFlag;
use crate::common::error::{Error, Result};

use super::consts;

/// Synthetic tag of the stream root record; never present in a file.
pub const STREAM_ROOT: RecordTag = RecordTag::Opcode(u32::MAX);

/// A parsed XAR stream: a synthetic root owning the top-level records, plus
/// whether the body was wrapped in a compressed region.
#[derive(Debug, Clone)]
pub struct XarTree {
    pub root: Record,
    pub compressed: bool,
}

/// Parse an in-memory XAR stream into a record tree.
///
/// A foreign signature yields [`Error::Format`]; truncation mid-record and
/// structural damage are fatal [`Error::Parse`]. The cancel flag is checked
/// between top-level records.
pub fn parse(data: &[u8], cancel: &CancelFlag) -> Result<XarTree> {
    if !consts::check_signature(data) {
        return Err(Error::Format("not a XAR stream".to_string()));
    }

    let mut stack: Vec<Record> = vec![Record::new(STREAM_ROOT)];
    let mut pos = consts::XAR_SIGNATURE.len();
    let mut compressed = false;

    while pos < data.len() {
        if stack.len() == 1 && cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let (tag, size, header_len) = read_header(data, pos)?;
        let body = pos + header_len;
        match tag {
            consts::TAG_ENDOFFILE => break,
            consts::TAG_STARTCOMPRESSION => {
                if body + size > data.len() {
                    return Err(truncated(tag, pos));
                }
                compressed = true;
                pos = parse_compressed_region(data, body + size, &mut stack, cancel)?;
            }
            consts::TAG_ENDCOMPRESSION => {
                return Err(Error::Parse(
                    "compression close without a matching open".to_string(),
                ));
            }
            _ => {
                if body + size > data.len() {
                    return Err(truncated(tag, pos));
                }
                handle_record(tag, data[body..body + size].to_vec(), &mut stack)?;
                pos = body + size;
            }
        }
    }

    // Containers left open at end of stream close implicitly.
    while stack.len() > 1 {
        if let Some(done) = stack.pop() {
            if let Some(parent) = stack.last_mut() {
                parent.children.push(done);
            }
        }
    }
    match stack.pop() {
        Some(root) => Ok(XarTree { root, compressed }),
        None => Err(Error::Parse("empty record stack".to_string())),
    }
}

/// Read one compact record header: u8 tag + u8 size, with 0x1F announcing
/// an extended u32 size. Returns `(tag, size, header length)`.
fn read_header(data: &[u8], pos: usize) -> Result<(u32, usize, usize)> {
    if pos + 2 > data.len() {
        return Err(Error::Parse(format!(
            "record header truncated at offset {}",
            pos
        )));
    }
    let tag = data[pos] as u32;
    let size = data[pos + 1];
    if size == consts::EXTENDED_SIZE {
        let extended = read_u32_le(data, pos + 2)?;
        Ok((tag, extended as usize, 6))
    } else {
        Ok((tag, size as usize, 2))
    }
}

fn truncated(tag: u32, pos: usize) -> Error {
    Error::Parse(format!(
        "record '{}' truncated at offset {}",
        consts::tag_name(tag),
        pos
    ))
}

/// Apply one record to the structure stack.
fn handle_record(tag: u32, payload: Vec<u8>, stack: &mut Vec<Record>) -> Result<()> {
    match tag {
        consts::TAG_DOWN => {
            let parent = stack
                .last_mut()
                .and_then(|top| top.children.pop())
                .ok_or_else(|| {
                    Error::Parse("container open without a preceding record".to_string())
                })?;
            stack.push(parent);
        }
        consts::TAG_UP => {
            if stack.len() == 1 {
                return Err(Error::Parse("unmatched container close".to_string()));
            }
            if let Some(done) = stack.pop() {
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(done);
                }
            }
        }
        _ => {
            if let Some(top) = stack.last_mut() {
                top.children.push(Record::leaf(RecordTag::Opcode(tag), payload));
            }
        }
    }
    Ok(())
}

/// Inflate and consume a compressed region starting at `start`; returns the
/// outer-stream position just past the region's raw trailer.
///
/// The cancel flag is honored between top-level records inside the region,
/// since a compressed stream carries essentially all of its records here.
fn parse_compressed_region(
    data: &[u8],
    start: usize,
    stack: &mut Vec<Record>,
    cancel: &CancelFlag,
) -> Result<usize> {
    let region = inflate_region(&data[start..])?;
    let buf = &region.data;
    let mut pos = 0usize;

    loop {
        if stack.len() == 1 && cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        if pos >= buf.len() {
            return Err(Error::Parse("unterminated compressed region".to_string()));
        }
        let (tag, size, header_len) = read_header(buf, pos)?;
        let body = pos + header_len;
        match tag {
            consts::TAG_ENDCOMPRESSION => {
                if size != 8 {
                    return Err(Error::Parse(
                        "compression close with malformed trailer size".to_string(),
                    ));
                }
                break;
            }
            consts::TAG_STARTCOMPRESSION => {
                return Err(Error::Parse("nested compressed region".to_string()));
            }
            consts::TAG_ENDOFFILE => {
                return Err(Error::Parse(
                    "end of file inside compressed region".to_string(),
                ));
            }
            _ => {
                if body + size > buf.len() {
                    return Err(truncated(tag, body));
                }
                handle_record(tag, buf[body..body + size].to_vec(), stack)?;
                pos = body + size;
            }
        }
    }

    // The close record's payload lives raw in the outer stream, right after
    // the deflate span.
    let trailer = start + region.consumed as usize;
    let declared_len = read_u32_le(data, trailer)?;
    let declared_crc = read_u32_le(data, trailer + 4)?;
    if declared_len as usize != buf.len() {
        return Err(Error::Parse(format!(
            "compressed region declares {} decompressed bytes, got {}",
            declared_len,
            buf.len()
        )));
    }
    if declared_crc != region.crc {
        return Err(Error::Parse("compressed region CRC mismatch".to_string()));
    }
    Ok(trailer + 8)
}
