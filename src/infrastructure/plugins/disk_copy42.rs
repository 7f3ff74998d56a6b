//! Apple DiskCopy 4.2 adapter
//!
//! Header layout (big-endian, 84 bytes):
//!
//! | Offset | Size | Field |
//! |---|---|---|
//! | 0 | 1 | image name length |
//! | 1 | 63 | image name |
//! | 64 | 4 | data size |
//! | 68 | 4 | tag size |
//! | 72 | 4 | data checksum |
//! | 76 | 4 | tag checksum |
//! | 80 | 1 | disk format |
//! | 81 | 1 | format byte |
//! | 82 | 2 | magic, 0x0100 |
//!
//! Sector data follows the header, then the tag bytes.

use super::sector_reader::{stream_len, SectorReader};
use crate::domain::entities::{Geometry, MediaType};
use crate::domain::repositories::{FixtureStream, ImageError, ImageHandle, ImagePlugin};
use std::io::Read;

pub const DC42_HEADER_LEN: usize = 84;
pub const DC42_MAGIC: u16 = 0x0100;
pub const DC42_SECTOR_SIZE: u32 = 512;

const NAME_MAX: usize = 63;

/// Parsed DiskCopy 4.2 header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dc42Header {
    pub name: String,
    pub data_size: u32,
    pub tag_size: u32,
    pub data_checksum: u32,
    pub tag_checksum: u32,
    pub disk_format: u8,
    pub format_byte: u8,
}

impl Dc42Header {
    /// Parses and validates a header
    pub fn parse(bytes: &[u8]) -> Result<Self, ImageError> {
        if bytes.len() < DC42_HEADER_LEN {
            return Err(ImageError::UnsupportedFormat(format!(
                "{} bytes is shorter than a DiskCopy 4.2 header",
                bytes.len()
            )));
        }

        let be_u32 = |at: usize| {
            u32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
        };
        let magic = u16::from_be_bytes([bytes[82], bytes[83]]);
        if magic != DC42_MAGIC {
            return Err(ImageError::UnsupportedFormat(format!(
                "DiskCopy 4.2 magic 0x{:04x} expected, found 0x{:04x}",
                DC42_MAGIC, magic
            )));
        }

        let name_len = bytes[0] as usize;
        if name_len > NAME_MAX {
            return Err(ImageError::MalformedHeader(format!(
                "image name length {} exceeds {}",
                name_len, NAME_MAX
            )));
        }

        let data_size = be_u32(64);
        if data_size == 0 || data_size % DC42_SECTOR_SIZE != 0 {
            return Err(ImageError::MalformedHeader(format!(
                "data size {} is not a positive multiple of {}",
                data_size, DC42_SECTOR_SIZE
            )));
        }

        Ok(Self {
            name: String::from_utf8_lossy(&bytes[1..1 + name_len]).into_owned(),
            data_size,
            tag_size: be_u32(68),
            data_checksum: be_u32(72),
            tag_checksum: be_u32(76),
            disk_format: bytes[80],
            format_byte: bytes[81],
        })
    }

    pub fn geometry(&self) -> Geometry {
        Geometry::new((self.data_size / DC42_SECTOR_SIZE) as u64, DC42_SECTOR_SIZE)
    }

    /// Media type from the disk format byte, or from geometry when the
    /// format byte disagrees with the data size
    pub fn media_type(&self) -> MediaType {
        match (self.disk_format, self.data_size) {
            (0, 409_600) => MediaType::AppleSonySs,
            (1, 819_200) => MediaType::AppleSonyDs,
            (2, 737_280) => MediaType::Dos35DsDd9,
            (3, 1_474_560) => MediaType::Dos35Hd,
            _ => MediaType::from_geometry(self.geometry()),
        }
    }

    /// Bytes a complete image file occupies
    pub fn image_len(&self) -> u64 {
        DC42_HEADER_LEN as u64 + self.data_size as u64 + self.tag_size as u64
    }
}

/// Plugin for Apple DiskCopy 4.2 images
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskCopy42Plugin;

impl ImagePlugin for DiskCopy42Plugin {
    fn name(&self) -> &'static str {
        "dc42"
    }

    fn description(&self) -> &'static str {
        "Apple DiskCopy 4.2"
    }

    fn open(&self, mut stream: FixtureStream) -> Result<Box<dyn ImageHandle>, ImageError> {
        let len = stream_len(&mut stream)?;

        let mut raw = [0u8; DC42_HEADER_LEN];
        let available = (len as usize).min(DC42_HEADER_LEN);
        stream
            .read_exact(&mut raw[..available])
            .map_err(|source| ImageError::ReadError { lba: 0, source })?;
        let header = Dc42Header::parse(&raw[..available])?;

        if len < header.image_len() {
            return Err(ImageError::MalformedHeader(format!(
                "header describes {} bytes but the image has {}",
                header.image_len(),
                len
            )));
        }

        tracing::trace!(
            name = %header.name,
            format = header.disk_format,
            "parsed DiskCopy 4.2 header"
        );

        Ok(Box::new(DiskCopy42Image {
            media_type: header.media_type(),
            reader: SectorReader::new(stream, DC42_HEADER_LEN as u64, header.geometry()),
        }))
    }
}

struct DiskCopy42Image {
    media_type: MediaType,
    reader: SectorReader,
}

impl ImageHandle for DiskCopy42Image {
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
}
