//! Format-neutral chunk layer: record trees and stream adapters.

pub mod record;
pub mod stream;

pub use record::{Record, RecordTag};
pub use stream::{InflatedRegion, crc32, deflate_region, inflate_region};
