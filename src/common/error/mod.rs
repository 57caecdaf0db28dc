//! Unified error handling.

mod types;

pub use types::{Error, Result};
