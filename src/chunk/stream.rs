//! Stream helpers for compressed record regions.
//!
//! A compressed region is a raw-deflate span embedded in an outer stream.
//! Parsers inflate it up front, track how many source bytes the decoder
//! consumed so the outer cursor can resume right after the span, and check
//! the region's CRC32 against the declared value.

use std::io::Read;

use flate2::Crc;
use flate2::read::DeflateDecoder;

use crate::common::error::{Error, Result};

/// A decompressed region and the bookkeeping the outer parser needs.
#[derive(Debug)]
pub struct InflatedRegion {
    /// The decompressed bytes.
    pub data: Vec<u8>,
    /// Compressed bytes consumed from the outer stream.
    pub consumed: u64,
    /// CRC32 of the decompressed bytes.
    pub crc: u32,
}

/// Inflate a raw-deflate region starting at the beginning of `input`.
///
/// The decoder stops at the deflate end-of-stream marker; trailing bytes in
/// `input` are untouched and `consumed` tells the caller where they start.
pub fn inflate_region(input: &[u8]) -> Result<InflatedRegion> {
    let mut decoder = DeflateDecoder::new(input);
    let mut data = Vec::new();
    decoder
        .read_to_end(&mut data)
        .map_err(|e| Error::Parse(format!("bad deflate region: {}", e)))?;
    let consumed = decoder.total_in();
    Ok(InflatedRegion {
        crc: crc32(&data),
        data,
        consumed,
    })
}

/// Deflate `data` as a raw stream (no zlib wrapper), matching what
/// [`inflate_region`] reads.
pub fn deflate_region(data: &[u8]) -> Result<Vec<u8>> {
    use flate2::Compression;
    use flate2::write::DeflateEncoder;
    use std::io::Write;

    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// CRC32 (IEEE) of a byte slice.
pub fn crc32(data: &[u8]) -> u32 {
    let mut crc = Crc::new();
    crc.update(data);
    crc.sum()
}
