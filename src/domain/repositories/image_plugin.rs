//! Image plugin traits
//!
//! The capability interface every disk-image decoder implements. A plugin
//! parses a fixture stream into an [`ImageHandle`]; the handle reports media
//! type and geometry and serves sector reads. Partition enumeration is an
//! optional capability exposed through [`ImageHandle::partitions`].

use super::fixture_source::FixtureStream;
use crate::domain::entities::{Geometry, MediaType, PartitionExtent};
use std::io;
use thiserror::Error;

/// Errors raised by decoder plugins
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    #[error("Sectors {start_lba}+{count} out of range: image has {sector_count} sectors")]
    OutOfRange {
        start_lba: u64,
        count: u64,
        sector_count: u64,
    },

    #[error("Read error at sector {lba}: {source}")]
    ReadError {
        lba: u64,
        #[source]
        source: io::Error,
    },
}

impl ImageError {
    /// Taxonomy name of the error
    pub fn kind(&self) -> &'static str {
        match self {
            ImageError::UnsupportedFormat(_) => "UnsupportedFormat",
            ImageError::MalformedHeader(_) => "MalformedHeader",
            ImageError::OutOfRange { .. } => "OutOfRange",
            ImageError::ReadError { .. } => "ReadError",
        }
    }
}

/// Checks a sector run against the geometry and returns its length in bytes
///
/// Fails with `OutOfRange` when the run ends past the last sector or its
/// byte length is not addressable.
pub fn sector_run_len(geometry: Geometry, start_lba: u64, count: u64) -> Result<usize, ImageError> {
    let out_of_range = || ImageError::OutOfRange {
        start_lba,
        count,
        sector_count: geometry.sector_count,
    };

    if !geometry.contains_run(start_lba, count) {
        return Err(out_of_range());
    }

    count
        .checked_mul(geometry.sector_size as u64)
        .and_then(|len| usize::try_from(len).ok())
        .ok_or_else(out_of_range)
}

/// A decoder for one disk-image format
///
/// Plugins are stateless factories; every call to `open` yields an
/// independent handle that owns its stream exclusively.
pub trait ImagePlugin: Send + Sync {
    /// Registry name used by expectation tables
    fn name(&self) -> &'static str;

    /// Human-readable format name
    fn description(&self) -> &'static str;

    /// Parses format headers and returns an open image
    ///
    /// Fails with `UnsupportedFormat` when the signature does not match and
    /// `MalformedHeader` when it matches but the header is inconsistent.
    fn open(&self, stream: FixtureStream) -> Result<Box<dyn ImageHandle>, ImageError>;
}

/// An open, decoded image
pub trait ImageHandle: Send {
    /// Medium classification, fixed for the handle's lifetime
    fn media_type(&self) -> MediaType;

    fn sector_count(&self) -> u64;

    fn sector_size(&self) -> u32;

    fn geometry(&self) -> Geometry {
        Geometry::new(self.sector_count(), self.sector_size())
    }

    /// Reads `count` sectors starting at `start_lba`
    ///
    /// Either returns exactly `count * sector_size` bytes or fails; a run
    /// ending past the last sector is always `OutOfRange`.
    fn read_sectors(&mut self, start_lba: u64, count: u64) -> Result<Vec<u8>, ImageError>;

    /// Same as [`read_sectors`](Self::read_sectors) but fills a caller-owned
    /// buffer so streaming readers can recycle allocations
    fn read_sectors_into(
        &mut self,
        start_lba: u64,
        count: u64,
        buffer: &mut Vec<u8>,
    ) -> Result<(), ImageError> {
        *buffer = self.read_sectors(start_lba, count)?;
        Ok(())
    }

    /// Partition enumeration capability, if this format has one
    fn partitions(&mut self) -> Option<&mut dyn PartitionedImage> {
        None
    }
}

/// Optional capability: list partitions in on-disk table order
pub trait PartitionedImage {
    fn enumerate_partitions(&mut self) -> Result<Vec<PartitionExtent>, ImageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sector_run_len_in_range() {
        let geometry = Geometry::new(2880, 512);
        assert_eq!(sector_run_len(geometry, 0, 2880).unwrap(), 2880 * 512);
        assert_eq!(sector_run_len(geometry, 2879, 1).unwrap(), 512);
    }

    #[test]
    fn test_sector_run_len_past_end() {
        let geometry = Geometry::new(2880, 512);
        let err = sector_run_len(geometry, 2880, 1).unwrap_err();
        assert!(matches!(
            err,
            ImageError::OutOfRange {
                start_lba: 2880,
                count: 1,
                sector_count: 2880
            }
        ));
    }

    #[test]
    fn test_sector_run_len_overflowing_start() {
        let geometry = Geometry::new(10, 512);
        assert!(sector_run_len(geometry, u64::MAX, 1).is_err());
    }
}
