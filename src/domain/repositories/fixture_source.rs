//! Fixture source trait
//!
//! Resolves a logical fixture name to a seekable byte stream. Decoders
//! perform random-access sector reads, so every stream handed out must
//! support `Seek` even when the fixture is stored compressed.

use std::io::{self, Read, Seek};
use thiserror::Error;

/// A readable, seekable stream that can move to a worker thread
pub trait ReadSeek: Read + Seek + Send {}

impl<T: Read + Seek + Send> ReadSeek for T {}

/// Owned fixture stream; dropping it releases the underlying file handle
pub type FixtureStream = Box<dyn ReadSeek>;

/// Errors that can occur while resolving a fixture
#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("Fixture not found: {0}")]
    NotFound(String),

    #[error("Fixture unreadable: {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Fixture corrupt: {path}: {message}")]
    Corrupt { path: String, message: String },
}

impl FixtureError {
    /// Taxonomy name of the error
    pub fn kind(&self) -> &'static str {
        match self {
            FixtureError::NotFound(_) => "FixtureNotFound",
            FixtureError::Unreadable { .. } => "FixtureUnreadable",
            FixtureError::Corrupt { .. } => "FixtureCorrupt",
        }
    }
}

/// Trait for opening fixture images by name
///
/// # Example
///
/// ```ignore
/// let store = LocalFixtureStore::new("test-files")?;
/// let stream = store.open_fixture("DiskCopy 4.2", "mf2dd.dc42.gz")?;
/// ```
pub trait FixtureSource: Send + Sync {
    /// Opens `file_name` inside `folder`
    ///
    /// Ownership of the stream passes to the caller.
    fn open_fixture(&self, folder: &str, file_name: &str) -> Result<FixtureStream, FixtureError>;
}
