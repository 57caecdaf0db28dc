//! XAR record-stream serializer.
//!
//! Container structure is re-expressed as `DOWN`/`UP` brackets around each
//! record's children. When compression is requested the first top-level
//! record (the file header) stays raw, everything after it goes through one
//! deflate span closed by `ENDCOMPRESSION`, whose byte-count and CRC32
//! trailer is written raw after the span.

use crate::chunk::{Record, RecordTag, crc32, deflate_region};
use crate::common::error::Result;

use super::consts;
use super::parser::XarTree;

/// Serialize a record tree back into XAR stream bytes.
pub fn write(tree: &XarTree) -> Result<Vec<u8>> {
    let mut out = consts::XAR_SIGNATURE.to_vec();

    if tree.compressed {
        let mut children = tree.root.children.iter();
        if let Some(header) = children.next() {
            write_record(header, &mut out);
        }
        write_header(consts::TAG_STARTCOMPRESSION, 4, &mut out);
        out.extend_from_slice(&0u32.to_le_bytes());

        let mut body = Vec::new();
        for child in children {
            write_record(child, &mut body);
        }
        write_header(consts::TAG_ENDCOMPRESSION, 8, &mut body);

        out.extend_from_slice(&deflate_region(&body)?);
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
        out.extend_from_slice(&crc32(&body).to_le_bytes());
    } else {
        for child in &tree.root.children {
            write_record(child, &mut out);
        }
    }

    write_header(consts::TAG_ENDOFFILE, 0, &mut out);
    Ok(out)
}

fn write_record(record: &Record, out: &mut Vec<u8>) {
    let tag = match record.tag {
        RecordTag::Opcode(op) => op,
        // Fourcc tags never occur in a XAR tree; fold to the first byte so a
        // mixed tree still produces diagnosable output.
        RecordTag::FourCc(bytes) => bytes[0] as u32,
    };
    write_header(tag, record.payload.len(), out);
    out.extend_from_slice(&record.payload);

    if !record.children.is_empty() {
        write_header(consts::TAG_DOWN, 0, out);
        for child in &record.children {
            write_record(child, out);
        }
        write_header(consts::TAG_UP, 0, out);
    }
}

/// Compact header: u8 tag + u8 size, extended u32 size behind the 0x1F
/// sentinel for sizes that do not fit (or collide with) the short form.
fn write_header(tag: u32, size: usize, out: &mut Vec<u8>) {
    out.push(tag as u8);
    if size <= u8::MAX as usize && size != consts::EXTENDED_SIZE as usize {
        out.push(size as u8);
    } else {
        out.push(consts::EXTENDED_SIZE);
        out.extend_from_slice(&(size as u32).to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xar::parser::STREAM_ROOT;

    #[test]
    fn test_sentinel_sized_payload_uses_extended_form() {
        let mut root = Record::new(STREAM_ROOT);
        root.children.push(Record::leaf(
            RecordTag::Opcode(0x41),
            vec![0u8; consts::EXTENDED_SIZE as usize],
        ));
        let out = write(&XarTree {
            root,
            compressed: false,
        })
        .unwrap();
        let at = consts::XAR_SIGNATURE.len();
        assert_eq!(out[at], 0x41);
        assert_eq!(out[at + 1], consts::EXTENDED_SIZE);
        assert_eq!(
            u32::from_le_bytes([out[at + 2], out[at + 3], out[at + 4], out[at + 5]]),
            consts::EXTENDED_SIZE as u32
        );
    }

    #[test]
    fn test_children_bracketed_by_down_up() {
        let mut root = Record::new(STREAM_ROOT);
        let mut doc = Record::new(RecordTag::Opcode(consts::TAG_DOCUMENT));
        doc.children
            .push(Record::leaf(RecordTag::Opcode(consts::TAG_LAYER), vec![]));
        root.children.push(doc);
        let out = write(&XarTree {
            root,
            compressed: false,
        })
        .unwrap();
        let at = consts::XAR_SIGNATURE.len();
        assert_eq!(
            &out[at..at + 8],
            &[
                consts::TAG_DOCUMENT as u8,
                0,
                consts::TAG_DOWN as u8,
                0,
                consts::TAG_LAYER as u8,
                0,
                consts::TAG_UP as u8,
                0,
            ]
        );
    }
}
