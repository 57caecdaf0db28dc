//! XAR: compact record-stream container format.
//!
//! Opcode-tagged records with `DOWN`/`UP` structure brackets, an extended
//! size sentinel and optional deflate-compressed regions with CRC checking.

pub mod config;
pub mod consts;
pub mod parser;
pub mod presenter;
pub mod translator;
pub mod writer;

pub use config::XarConfig;
pub use parser::XarTree;
pub use presenter::{XarLoader, XarPresenter};
