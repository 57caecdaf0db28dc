//! RIFF-family chunk serializer for CMX containers.
//!
//! Declared sizes are recomputed from payloads and children on the way out,
//! so a tree edited in memory always serializes consistently; serializing an
//! unmodified parsed tree reproduces the input bytes exactly.

use crate::chunk::{Record, RecordTag};

use super::parser::CmxTree;

/// Serialize a record tree back into CMX container bytes.
pub fn write(tree: &CmxTree) -> Vec<u8> {
    let mut out = Vec::new();
    write_record(&tree.root, tree.big_endian, &mut out);
    out
}

fn write_record(record: &Record, big_endian: bool, out: &mut Vec<u8>) {
    let tag = match record.tag {
        RecordTag::FourCc(bytes) => bytes,
        // Opcode tags never occur in a CMX tree; serialize the raw value so
        // a mixed tree still produces diagnosable output.
        RecordTag::Opcode(op) => op.to_le_bytes(),
    };
    out.extend_from_slice(&tag);

    let size_at = out.len();
    out.extend_from_slice(&[0u8; 4]);
    let body_at = out.len();

    out.extend_from_slice(&record.payload);
    if record.children.is_empty() {
        if record.payload.len() % 2 == 1 {
            // Pad byte excluded from the declared size.
            let size = (record.payload.len() as u32).to_bytes(big_endian);
            out[size_at..size_at + 4].copy_from_slice(&size);
            out.push(0);
            return;
        }
    } else {
        for child in &record.children {
            write_record(child, big_endian, out);
        }
    }

    let size = ((out.len() - body_at) as u32).to_bytes(big_endian);
    out[size_at..size_at + 4].copy_from_slice(&size);
}

trait ToOrderedBytes {
    fn to_bytes(self, big_endian: bool) -> [u8; 4];
}

impl ToOrderedBytes for u32 {
    fn to_bytes(self, big_endian: bool) -> [u8; 4] {
        if big_endian {
            self.to_be_bytes()
        } else {
            self.to_le_bytes()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::RecordTag;

    #[test]
    fn test_sizes_recomputed_from_children() {
        let mut root = Record::new(RecordTag::fourcc(b"RIFF"));
        root.payload = b"CMX1".to_vec();
        root.size = 999; // stale on purpose

        let mut list = Record::new(RecordTag::fourcc(b"LIST"));
        list.payload = b"page".to_vec();
        list.children
            .push(Record::leaf(RecordTag::fourcc(b"linf"), vec![7, 1, b'L']));
        root.children.push(list);

        let out = write(&CmxTree {
            root,
            big_endian: false,
        });
        // Root size covers form + LIST chunk; LIST size covers form + leaf
        // chunk including its pad byte exclusion rules.
        let root_size = u32::from_le_bytes([out[4], out[5], out[6], out[7]]);
        assert_eq!(root_size as usize, out.len() - 8);
        let list_size = u32::from_le_bytes([out[16], out[17], out[18], out[19]]);
        // form (4) + leaf header (8) + payload (3) + pad (1)
        assert_eq!(list_size, 16);
    }

    #[test]
    fn test_big_endian_sizes() {
        let mut root = Record::new(RecordTag::fourcc(b"RIFX"));
        root.payload = b"CMX1".to_vec();
        root.children
            .push(Record::leaf(RecordTag::fourcc(b"cont"), vec![0u8; 8]));
        let out = write(&CmxTree {
            root,
            big_endian: true,
        });
        let root_size = u32::from_be_bytes([out[4], out[5], out[6], out[7]]);
        assert_eq!(root_size as usize, out.len() - 8);
    }
}
