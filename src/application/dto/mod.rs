//! Data Transfer Objects

mod suite_report;
mod verify_options;

pub use suite_report::{RunReport, SuiteReport};
pub use verify_options::{VerifyOptions, DEFAULT_CHUNK_SIZE};
