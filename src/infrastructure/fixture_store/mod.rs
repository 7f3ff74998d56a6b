//! Fixture store implementations

mod gzip_reader;
mod local_fixture_store;

pub use gzip_reader::GzipFixtureReader;
pub use local_fixture_store::{LocalFixtureStore, GZIP_SUFFIX};
