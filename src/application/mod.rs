//! Application layer
//!
//! Use cases that drive fixtures through the verification engine.

pub mod dto;
mod opened_image;
mod sector_stream;
mod verify_fixture;
mod verify_suite;

pub use opened_image::OpenedImage;
pub use sector_stream::{for_each_chunk, stream_digest, StreamedDigest};
pub use verify_fixture::VerifyFixtureUseCase;
pub use verify_suite::VerifySuiteUseCase;
