//! CMX: RIFF-family chunk container format.
//!
//! Fourcc-tagged chunks under a `RIFF`/`RIFX` root with the `CMX1` form
//! type; `LIST` chunks nest pages, layers and groups.

pub mod config;
pub mod consts;
pub mod parser;
pub mod presenter;
pub mod translator;
pub mod writer;

pub use config::CmxConfig;
pub use parser::CmxTree;
pub use presenter::{CmxLoader, CmxPresenter};
