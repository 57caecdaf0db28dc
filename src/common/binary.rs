//! Binary data parsing utilities shared across formats.
//!
//! Chunk formats in this crate are little-endian with one big-endian variant
//! (RIFX containers), so both byte orders are provided for the 32-bit reads.

use zerocopy::{BE, F32, F64, FromBytes, I16, I32, LE, U16, U32};

use crate::common::error::{Error, Result};

fn short(expected: usize, available: usize) -> Error {
    Error::Parse(format!(
        "Insufficient data: expected {} bytes, got {}",
        expected, available
    ))
}

/// Read a little-endian u16 from a byte slice at the given offset.
///
/// # Examples
///
/// ```
/// use pitaya::common::binary::read_u16_le;
/// let data = [0x34, 0x12, 0x78, 0x56];
/// assert_eq!(read_u16_le(&data, 0).unwrap(), 0x1234);
/// assert_eq!(read_u16_le(&data, 2).unwrap(), 0x5678);
/// ```
#[inline]
pub fn read_u16_le(data: &[u8], offset: usize) -> Result<u16> {
    if offset + 2 > data.len() {
        return Err(short(offset + 2, data.len()));
    }
    U16::<LE>::read_from_bytes(&data[offset..offset + 2])
        .map(|v| v.get())
        .map_err(|_| Error::Parse("Failed to read u16".to_string()))
}

/// Read a little-endian i16 from a byte slice at the given offset.
#[inline]
pub fn read_i16_le(data: &[u8], offset: usize) -> Result<i16> {
    if offset + 2 > data.len() {
        return Err(short(offset + 2, data.len()));
    }
    I16::<LE>::read_from_bytes(&data[offset..offset + 2])
        .map(|v| v.get())
        .map_err(|_| Error::Parse("Failed to read i16".to_string()))
}

/// Read a little-endian u32 from a byte slice at the given offset.
///
/// # Examples
///
/// ```
/// use pitaya::common::binary::read_u32_le;
/// let data = [0x78, 0x56, 0x34, 0x12];
/// assert_eq!(read_u32_le(&data, 0).unwrap(), 0x12345678);
/// ```
#[inline]
pub fn read_u32_le(data: &[u8], offset: usize) -> Result<u32> {
    if offset + 4 > data.len() {
        return Err(short(offset + 4, data.len()));
    }
    U32::<LE>::read_from_bytes(&data[offset..offset + 4])
        .map(|v| v.get())
        .map_err(|_| Error::Parse("Failed to read u32".to_string()))
}

/// Read a big-endian u32 from a byte slice at the given offset.
///
/// Used by the big-endian RIFX container variant.
#[inline]
pub fn read_u32_be(data: &[u8], offset: usize) -> Result<u32> {
    if offset + 4 > data.len() {
        return Err(short(offset + 4, data.len()));
    }
    U32::<BE>::read_from_bytes(&data[offset..offset + 4])
        .map(|v| v.get())
        .map_err(|_| Error::Parse("Failed to read u32".to_string()))
}

/// Read a little-endian i32 from a byte slice at the given offset.
///
/// # Examples
///
/// ```
/// use pitaya::common::binary::read_i32_le;
/// let data = [0xFF, 0xFF, 0xFF, 0xFF];
/// assert_eq!(read_i32_le(&data, 0).unwrap(), -1i32);
/// ```
#[inline]
pub fn read_i32_le(data: &[u8], offset: usize) -> Result<i32> {
    if offset + 4 > data.len() {
        return Err(short(offset + 4, data.len()));
    }
    I32::<LE>::read_from_bytes(&data[offset..offset + 4])
        .map(|v| v.get())
        .map_err(|_| Error::Parse("Failed to read i32".to_string()))
}

/// Read a little-endian f32 from a byte slice at the given offset.
#[inline]
pub fn read_f32_le(data: &[u8], offset: usize) -> Result<f32> {
    if offset + 4 > data.len() {
        return Err(short(offset + 4, data.len()));
    }
    F32::<LE>::read_from_bytes(&data[offset..offset + 4])
        .map(|v| v.get())
        .map_err(|_| Error::Parse("Failed to read f32".to_string()))
}

/// Read a little-endian f64 from a byte slice at the given offset.
#[inline]
pub fn read_f64_le(data: &[u8], offset: usize) -> Result<f64> {
    if offset + 8 > data.len() {
        return Err(short(offset + 8, data.len()));
    }
    F64::<LE>::read_from_bytes(&data[offset..offset + 8])
        .map(|v| v.get())
        .map_err(|_| Error::Parse("Failed to read f64".to_string()))
}

/// Read a four-character chunk tag at the given offset.
///
/// # Examples
///
/// ```
/// use pitaya::common::binary::read_fourcc;
/// let data = b"RIFF\x10\x00\x00\x00";
/// assert_eq!(read_fourcc(data, 0).unwrap(), *b"RIFF");
/// ```
#[inline]
pub fn read_fourcc(data: &[u8], offset: usize) -> Result<[u8; 4]> {
    if offset + 4 > data.len() {
        return Err(short(offset + 4, data.len()));
    }
    let mut tag = [0u8; 4];
    tag.copy_from_slice(&data[offset..offset + 4]);
    Ok(tag)
}

/// Read a byte-length-prefixed Latin-1 string at the given offset.
///
/// Returns the decoded string and the number of bytes consumed.
pub fn read_pstr(data: &[u8], offset: usize) -> Result<(String, usize)> {
    if offset >= data.len() {
        return Err(short(offset + 1, data.len()));
    }
    let len = data[offset] as usize;
    if offset + 1 + len > data.len() {
        return Err(short(offset + 1 + len, data.len()));
    }
    let s = data[offset + 1..offset + 1 + len]
        .iter()
        .map(|&b| b as char)
        .collect();
    Ok((s, 1 + len))
}

/// Append a byte-length-prefixed Latin-1 string to an output buffer.
///
/// Strings longer than 255 bytes are truncated at the limit.
pub fn write_pstr(out: &mut Vec<u8>, s: &str) {
    let bytes: Vec<u8> = s.chars().map(|c| if (c as u32) < 256 { c as u8 } else { b'?' }).collect();
    let len = bytes.len().min(255);
    out.push(len as u8);
    out.extend_from_slice(&bytes[..len]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_u16_le() {
        let data = [0x34, 0x12, 0x78, 0x56];
        assert!(read_u16_le(&data, 0).is_ok_and(|v| v == 0x1234));
        assert!(read_u16_le(&data, 2).is_ok_and(|v| v == 0x5678));
        assert!(read_u16_le(&data, 3).is_err());
    }

    #[test]
    fn test_read_u32_both_orders() {
        let data = [0x78, 0x56, 0x34, 0x12];
        assert!(read_u32_le(&data, 0).is_ok_and(|v| v == 0x12345678));
        assert!(read_u32_be(&data, 0).is_ok_and(|v| v == 0x78563412));
        assert!(read_u32_le(&data, 1).is_err());
    }

    #[test]
    fn test_read_fourcc() {
        let data = b"LISTpage";
        assert_eq!(read_fourcc(data, 0).unwrap(), *b"LIST");
        assert_eq!(read_fourcc(data, 4).unwrap(), *b"page");
        assert!(read_fourcc(data, 6).is_err());
    }

    #[test]
    fn test_pstr_round_trip() {
        let mut buf = Vec::new();
        write_pstr(&mut buf, "Layer 1");
        let (s, consumed) = read_pstr(&buf, 0).unwrap();
        assert_eq!(s, "Layer 1");
        assert_eq!(consumed, buf.len());
    }
}
