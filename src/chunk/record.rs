//! Generic chunk records shared by the container parsers.
//!
//! Both container families reduce to the same shape: a tagged record with a
//! declared size, a raw payload and owned children. Parsers build trees of
//! these; translators walk them; writers serialize them back.

use std::fmt;

/// Record identity: RIFF-style fourcc or a numeric opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordTag {
    FourCc([u8; 4]),
    Opcode(u32),
}

impl RecordTag {
    pub fn fourcc(tag: &[u8; 4]) -> Self {
        RecordTag::FourCc(*tag)
    }
}

impl fmt::Display for RecordTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordTag::FourCc(bytes) => {
                for &b in bytes {
                    let c = if b.is_ascii_graphic() || b == b' ' {
                        b as char
                    } else {
                        '.'
                    };
                    write!(f, "{}", c)?;
                }
                Ok(())
            }
            RecordTag::Opcode(op) => write!(f, "0x{:02X}", op),
        }
    }
}

/// One parsed record: tag, declared payload size, raw payload and children.
///
/// For container records the declared size covers the nested records (plus
/// any format padding); leaf records own their payload bytes verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub tag: RecordTag,
    /// Declared payload size as read from the stream. Writers recompute this
    /// from the payload and children before serialization.
    pub size: u32,
    pub payload: Vec<u8>,
    pub children: Vec<Record>,
}

impl Record {
    pub fn new(tag: RecordTag) -> Self {
        Record {
            tag,
            size: 0,
            payload: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn leaf(tag: RecordTag, payload: Vec<u8>) -> Self {
        Record {
            tag,
            size: payload.len() as u32,
            payload,
            children: Vec::new(),
        }
    }

    pub fn is_container(&self) -> bool {
        !self.children.is_empty()
    }

    /// First direct child with the given tag.
    pub fn find_child(&self, tag: RecordTag) -> Option<&Record> {
        self.children.iter().find(|c| c.tag == tag)
    }

    /// All direct children with the given tag.
    pub fn children_with_tag(&self, tag: RecordTag) -> impl Iterator<Item = &Record> {
        self.children.iter().filter(move |c| c.tag == tag)
    }

    /// Depth-first search of the whole subtree.
    pub fn find(&self, tag: RecordTag) -> Option<&Record> {
        if self.tag == tag {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(tag))
    }

    /// Total record count in this subtree, self included.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Record::count).sum::<usize>()
    }
}
