//! Raw sector dump adapter
//!
//! A raw image is the sector data and nothing else: the geometry follows
//! from the stream length and the media type from the geometry. Images with
//! 512-byte sectors expose the partition capability through their MBR;
//! optical dumps have no MBR and expose none.

use super::mbr;
use super::sector_reader::{stream_len, SectorReader};
use crate::domain::entities::{Geometry, MediaType, PartitionExtent};
use crate::domain::repositories::{
    FixtureStream, ImageError, ImageHandle, ImagePlugin, PartitionedImage,
};

/// Plugin for flat sector dumps with a fixed sector size
#[derive(Debug, Clone, Copy)]
pub struct RawImagePlugin {
    name: &'static str,
    description: &'static str,
    sector_size: u32,
}

impl RawImagePlugin {
    /// Hard disk and floppy dumps with 512-byte sectors
    pub const fn raw() -> Self {
        Self {
            name: "raw",
            description: "Raw sector image (512-byte sectors)",
            sector_size: 512,
        }
    }

    /// Optical dumps with 2048-byte sectors
    pub const fn iso() -> Self {
        Self {
            name: "iso",
            description: "ISO 9660 optical image (2048-byte sectors)",
            sector_size: 2048,
        }
    }

    pub fn sector_size(&self) -> u32 {
        self.sector_size
    }
}

impl ImagePlugin for RawImagePlugin {
    fn name(&self) -> &'static str {
        self.name
    }

    fn description(&self) -> &'static str {
        self.description
    }

    fn open(&self, mut stream: FixtureStream) -> Result<Box<dyn ImageHandle>, ImageError> {
        let len = stream_len(&mut stream)?;
        let sector_size = self.sector_size as u64;

        if len == 0 || len % sector_size != 0 {
            return Err(ImageError::UnsupportedFormat(format!(
                "{} bytes is not a whole number of {}-byte sectors",
                len, sector_size
            )));
        }

        let geometry = Geometry::new(len / sector_size, self.sector_size);
        Ok(Box::new(RawImage {
            media_type: MediaType::from_geometry(geometry),
            partitioned: sector_size == mbr::MBR_LEN as u64,
            reader: SectorReader::new(stream, 0, geometry),
        }))
    }
}

struct RawImage {
    media_type: MediaType,
    /// MBR LBAs count 512-byte sectors
    partitioned: bool,
    reader: SectorReader,
}

impl ImageHandle for RawImage {
    fn media_type(&self) -> MediaType {
        self.media_type
    }

    fn sector_count(&self) -> u64 {
        self.reader.geometry().sector_count
    }

    fn sector_size(&self) -> u32 {
        self.reader.geometry().sector_size
    }

    fn read_sectors(&mut self, start_lba: u64, count: u64) -> Result<Vec<u8>, ImageError> {
        self.reader.read(start_lba, count)
    }

    fn read_sectors_into(
        &mut self,
        start_lba: u64,
        count: u64,
        buffer: &mut Vec<u8>,
    ) -> Result<(), ImageError> {
        self.reader.read_into(start_lba, count, buffer)
    }

    fn partitions(&mut self) -> Option<&mut dyn PartitionedImage> {
        if self.partitioned {
            Some(self)
        } else {
            None
        }
    }
}

impl PartitionedImage for RawImage {
    fn enumerate_partitions(&mut self) -> Result<Vec<PartitionExtent>, ImageError> {
        let sector_count = self.sector_count();
        let reader = &mut self.reader;
        mbr::enumerate_partitions(sector_count, |lba| reader.read(lba, 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn open(plugin: RawImagePlugin, data: Vec<u8>) -> Result<Box<dyn ImageHandle>, ImageError> {
        plugin.open(Box::new(Cursor::new(data)))
    }

    #[test]
    fn test_floppy_geometry_and_media_type() {
        let image = open(RawImagePlugin::raw(), vec![0; 1440 * 512]).unwrap();
        assert_eq!(image.sector_count(), 1440);
        assert_eq!(image.sector_size(), 512);
        assert_eq!(image.media_type(), MediaType::Dos35DsDd9);
    }

    #[test]
    fn test_iso_sector_size() {
        let image = open(RawImagePlugin::iso(), vec![0; 2048 * 10]).unwrap();
        assert_eq!(image.sector_count(), 10);
        assert_eq!(image.media_type(), MediaType::CdRom);
    }

    #[test]
    fn test_ragged_length_is_unsupported() {
        let err = open(RawImagePlugin::raw(), vec![0; 1000]).err().unwrap();
        assert!(matches!(err, ImageError::UnsupportedFormat(_)));
        let err = open(RawImagePlugin::raw(), Vec::new()).err().unwrap();
        assert!(matches!(err, ImageError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_reads_exact_sectors() {
        let data: Vec<u8> = (0..4 * 512).map(|i| (i / 512) as u8).collect();
        let mut image = open(RawImagePlugin::raw(), data).unwrap();
        let sectors = image.read_sectors(2, 2).unwrap();
        assert_eq!(sectors.len(), 1024);
        assert!(sectors[..512].iter().all(|&b| b == 2));
        assert!(sectors[512..].iter().all(|&b| b == 3));
    }

    #[test]
    fn test_unpartitioned_image_has_capability_and_no_partitions() {
        let mut image = open(RawImagePlugin::raw(), vec![0; 16 * 512]).unwrap();
        let partitions = image.partitions().unwrap().enumerate_partitions().unwrap();
        assert!(partitions.is_empty());
    }

    #[test]
    fn test_iso_has_no_partition_capability() {
        let mut sector = vec![0u8; 2048];
        sector[446 + 4] = 0x83;
        sector[446 + 8..446 + 12].copy_from_slice(&1u32.to_le_bytes());
        sector[446 + 12..446 + 16].copy_from_slice(&4u32.to_le_bytes());
        sector[510..512].copy_from_slice(&mbr::MBR_SIGNATURE);
        let mut data = sector;
        data.resize(2048 * 10, 0);

        let mut image = open(RawImagePlugin::iso(), data).unwrap();
        assert!(image.partitions().is_none());
    }
}
