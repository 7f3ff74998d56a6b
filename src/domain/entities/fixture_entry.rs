//! Fixture entity
//!
//! One row of an expectation table: a reference image plus the properties
//! its decoder must report. Rows are validated once on construction and are
//! immutable afterwards.

use super::media_type::{Geometry, MediaType};
use std::fmt;
use thiserror::Error;

/// Errors raised when an expectation row breaks a table invariant
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpectationError {
    #[error("{file}: fixture file name is empty")]
    EmptyFileName { file: String },

    #[error("{file}: sector size must be non-zero")]
    ZeroSectorSize { file: String },

    #[error("{file}: {sectors} sectors of {sector_size} bytes overflow a 64-bit byte range")]
    SizeOverflow {
        file: String,
        sectors: u64,
        sector_size: u32,
    },

    #[error("{file}: digest '{digest}' is not a hexadecimal string")]
    InvalidDigest { file: String, digest: String },

    #[error("{file}: partition #{index} ({extent}) lies outside [0, {sectors})")]
    PartitionOutOfBounds {
        file: String,
        index: usize,
        extent: PartitionExtent,
        sectors: u64,
    },

    #[error("{file}: partition #{index} ({extent}) overlaps partition #{other}")]
    PartitionOverlap {
        file: String,
        index: usize,
        other: usize,
        extent: PartitionExtent,
    },
}

/// A contiguous run of sectors designated as a volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PartitionExtent {
    /// First sector of the partition
    pub start: u64,
    /// Length in sectors
    pub length: u64,
}

impl PartitionExtent {
    pub fn new(start: u64, length: u64) -> Self {
        Self { start, length }
    }

    /// One past the last sector, or `None` on overflow
    pub fn end(&self) -> Option<u64> {
        self.start.checked_add(self.length)
    }

    pub fn overlaps(&self, other: &PartitionExtent) -> bool {
        match (self.end(), other.end()) {
            (Some(a_end), Some(b_end)) => self.start < b_end && other.start < a_end,
            _ => true,
        }
    }
}

impl fmt::Display for PartitionExtent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "start {} length {}", self.start, self.length)
    }
}

/// Expected decoded properties of a single fixture image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureEntry {
    file_name: String,
    media_type: MediaType,
    geometry: Geometry,
    /// Lower-case hex
    digest: String,
    partitions: Option<Vec<PartitionExtent>>,
}

impl FixtureEntry {
    /// Builds a validated fixture row
    ///
    /// The digest is normalised to lower case so later comparisons are
    /// case-insensitive.
    pub fn new(
        file_name: impl Into<String>,
        media_type: MediaType,
        sector_count: u64,
        sector_size: u32,
        digest: impl Into<String>,
        partitions: Option<Vec<PartitionExtent>>,
    ) -> Result<Self, ExpectationError> {
        let file_name = file_name.into();
        let digest = digest.into().trim().to_ascii_lowercase();

        if file_name.trim().is_empty() {
            return Err(ExpectationError::EmptyFileName { file: file_name });
        }
        if sector_size == 0 {
            return Err(ExpectationError::ZeroSectorSize { file: file_name });
        }

        let geometry = Geometry::new(sector_count, sector_size);
        if geometry.byte_len().is_none() {
            return Err(ExpectationError::SizeOverflow {
                file: file_name,
                sectors: sector_count,
                sector_size,
            });
        }

        if digest.is_empty() || !digest.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ExpectationError::InvalidDigest {
                file: file_name,
                digest,
            });
        }

        if let Some(extents) = &partitions {
            validate_extents(&file_name, extents, sector_count)?;
        }

        Ok(Self {
            file_name,
            media_type,
            geometry,
            digest,
            partitions,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn sector_count(&self) -> u64 {
        self.geometry.sector_count
    }

    pub fn sector_size(&self) -> u32 {
        self.geometry.sector_size
    }

    /// Expected digest in lower-case hex
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Expected partition extents in on-disk table order, if any were given
    pub fn partitions(&self) -> Option<&[PartitionExtent]> {
        self.partitions.as_deref()
    }
}

fn validate_extents(
    file: &str,
    extents: &[PartitionExtent],
    sectors: u64,
) -> Result<(), ExpectationError> {
    for (index, extent) in extents.iter().enumerate() {
        let inside = extent.end().is_some_and(|end| end <= sectors) && extent.start < sectors;
        if !inside {
            return Err(ExpectationError::PartitionOutOfBounds {
                file: file.to_string(),
                index,
                extent: *extent,
                sectors,
            });
        }

        if let Some(other) = extents[..index].iter().position(|e| e.overlaps(extent)) {
            return Err(ExpectationError::PartitionOverlap {
                file: file.to_string(),
                index,
                other,
                extent: *extent,
            });
        }
    }
    Ok(())
}

/// A group of fixtures decoded by the same plugin
///
/// Mirrors one test class: the plugin is chosen by the suite, never
/// auto-detected from the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureSuite {
    /// Display name of the suite
    pub name: String,
    /// Registry name of the decoder plugin
    pub plugin: String,
    /// Folder below the fixture root holding this suite's images
    pub folder: String,
    pub fixtures: Vec<FixtureEntry>,
}

impl FixtureSuite {
    pub fn new(
        name: impl Into<String>,
        plugin: impl Into<String>,
        folder: impl Into<String>,
        fixtures: Vec<FixtureEntry>,
    ) -> Self {
        Self {
            name: name.into(),
            plugin: plugin.into(),
            folder: folder.into(),
            fixtures,
        }
    }
}
