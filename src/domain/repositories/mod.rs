//! Repository traits (interfaces)
//!
//! Contracts the verification engine requires from the outside world:
//! a place to fetch fixture bytes and the decoder plugins themselves.

mod fixture_source;
mod image_plugin;

pub use fixture_source::{FixtureError, FixtureSource, FixtureStream, ReadSeek};
pub use image_plugin::{
    sector_run_len, ImageError, ImageHandle, ImagePlugin, PartitionedImage,
};
