//! Local fixture store
//!
//! Resolves fixtures under a root directory laid out as
//! `<root>/<folder>/<file name>`. Names ending in `.gz` are served through
//! a [`GzipFixtureReader`]; everything else is read directly.

use super::gzip_reader::{open_error, GzipFixtureReader};
use crate::domain::repositories::{FixtureError, FixtureSource, FixtureStream};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Suffix marking a gzip-compressed fixture
pub const GZIP_SUFFIX: &str = ".gz";

/// Fixture store backed by a directory tree
///
/// # Example
///
/// ```ignore
/// let store = LocalFixtureStore::new("test-files");
/// let stream = store.open_fixture("raw", "floppy.img.gz")?;
/// ```
#[derive(Debug, Clone)]
pub struct LocalFixtureStore {
    root: PathBuf,
}

impl LocalFixtureStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path a fixture resolves to, whether or not it exists
    pub fn resolve(&self, folder: &str, file_name: &str) -> PathBuf {
        self.root.join(folder).join(file_name)
    }

    /// Returns whether `file_name` is stored gzip-compressed
    pub fn is_compressed(file_name: &str) -> bool {
        file_name.to_ascii_lowercase().ends_with(GZIP_SUFFIX)
    }
}

impl FixtureSource for LocalFixtureStore {
    fn open_fixture(&self, folder: &str, file_name: &str) -> Result<FixtureStream, FixtureError> {
        let path = self.resolve(folder, file_name);

        if !path.is_file() {
            return Err(FixtureError::NotFound(path.display().to_string()));
        }

        if Self::is_compressed(file_name) {
            return Ok(Box::new(GzipFixtureReader::open(&path)?));
        }

        let file = File::open(&path).map_err(|e| open_error(&path, e))?;
        Ok(Box::new(BufReader::new(file)))
    }
}
