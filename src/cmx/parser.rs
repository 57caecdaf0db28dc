//! RIFF-family chunk parser for CMX containers.
//!
//! Chunks are fourcc + u32 size + payload; an odd payload is followed by one
//! pad byte that is consumed but excluded from the payload. `LIST` chunks
//! (and the root) nest: their first four payload bytes are a form type and
//! the rest is a run of child chunks. Nesting is tracked with an explicit
//! stack bounded by the declared sizes, so depth is limited only by input.

use crate::chunk::{Record, RecordTag};
use crate::common::binary::{read_fourcc, read_u32_be, read_u32_le};
use crate::common::cancel::CancelFlag;
use crate::common::error::{Error, Result};

use super::consts;

/// A parsed CMX container: the record tree plus its byte order.
#[derive(Debug, Clone)]
pub struct CmxTree {
    pub root: Record,
    pub big_endian: bool,
}

struct Frame {
    record: Record,
    /// Absolute offset one past this container's last child byte.
    end: usize,
}

/// Parse an in-memory CMX container into a record tree.
///
/// A missing or foreign signature yields [`Error::Format`]; any structural
/// damage past the signature (truncation, sizes overrunning the container)
/// is a fatal [`Error::Parse`]. The cancel flag is checked between top-level
/// chunks; the chunk being read is always finished first.
pub fn parse(data: &[u8], cancel: &CancelFlag) -> Result<CmxTree> {
    if !consts::check_signature(data) {
        return Err(Error::Format("not a CMX container".to_string()));
    }
    let big_endian = data[0..4] == consts::ROOT_BE;
    let read_size = if big_endian { read_u32_be } else { read_u32_le };

    let root_tag = read_fourcc(data, 0)?;
    let root_size = read_size(data, 4)? as usize;
    let root_end = 8 + root_size;
    if root_end > data.len() {
        return Err(Error::Parse(format!(
            "root chunk declares {} bytes, file has {}",
            root_size,
            data.len() - 8
        )));
    }

    let mut root = Record::new(RecordTag::fourcc(&root_tag));
    root.size = root_size as u32;
    root.payload = data[8..12].to_vec();

    let mut stack: Vec<Frame> = vec![Frame {
        record: root,
        end: root_end,
    }];
    let mut offset = 12usize;

    while offset < root_end {
        if stack.len() == 1 && cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let tag = read_fourcc(data, offset)?;
        let size = read_size(data, offset + 4)? as usize;
        let body = offset + 8;
        let container_end = stack.last().map_or(root_end, |f| f.end);
        if body + size > data.len() {
            return Err(Error::Parse(format!(
                "chunk '{}' truncated: declares {} bytes at offset {}",
                RecordTag::fourcc(&tag),
                size,
                offset
            )));
        }
        if body + size > container_end {
            return Err(Error::Parse(format!(
                "chunk '{}' overruns its container",
                RecordTag::fourcc(&tag)
            )));
        }

        if tag == consts::LIST {
            if size < 4 {
                return Err(Error::Parse(
                    "LIST chunk shorter than its form type".to_string(),
                ));
            }
            let mut record = Record::new(RecordTag::fourcc(&tag));
            record.size = size as u32;
            record.payload = data[body..body + 4].to_vec();
            stack.push(Frame {
                record,
                end: body + size,
            });
            offset = body + 4;
        } else {
            let record = Record::leaf(RecordTag::fourcc(&tag), data[body..body + size].to_vec());
            if let Some(frame) = stack.last_mut() {
                frame.record.children.push(record);
            }
            offset = body + size + (size & 1); // pad byte after odd payloads
        }

        // Attach every container that ends here to its parent.
        while stack.len() > 1 && offset >= stack.last().map_or(0, |f| f.end) {
            if let Some(frame) = stack.pop() {
                if let Some(parent) = stack.last_mut() {
                    parent.record.children.push(frame.record);
                }
            }
        }
    }

    match stack.pop() {
        Some(frame) if stack.is_empty() => Ok(CmxTree {
            root: frame.record,
            big_endian,
        }),
        _ => Err(Error::Parse("unterminated LIST chunk".to_string())),
    }
}
