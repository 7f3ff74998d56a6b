//! Sector access over a fixture stream
//!
//! Shared by adapters whose sector data is stored contiguously after an
//! optional header.

use crate::domain::entities::Geometry;
use crate::domain::repositories::{sector_run_len, FixtureStream, ImageError};
use std::io::{self, Read, Seek, SeekFrom};

pub(crate) struct SectorReader {
    stream: FixtureStream,
    data_offset: u64,
    geometry: Geometry,
}

impl SectorReader {
    pub(crate) fn new(stream: FixtureStream, data_offset: u64, geometry: Geometry) -> Self {
        Self {
            stream,
            data_offset,
            geometry,
        }
    }

    pub(crate) fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Fills `buffer` with exactly `count` sectors or fails without partial data
    pub(crate) fn read_into(
        &mut self,
        start_lba: u64,
        count: u64,
        buffer: &mut Vec<u8>,
    ) -> Result<(), ImageError> {
        let len = sector_run_len(self.geometry, start_lba, count)?;
        let read_error = |source: io::Error| ImageError::ReadError {
            lba: start_lba,
            source,
        };

        let offset = start_lba
            .checked_mul(self.geometry.sector_size as u64)
            .and_then(|o| o.checked_add(self.data_offset))
            .ok_or_else(|| {
                read_error(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "sector offset overflows",
                ))
            })?;

        buffer.clear();
        buffer.resize(len, 0);

        let result = self
            .stream
            .seek(SeekFrom::Start(offset))
            .and_then(|_| self.stream.read_exact(buffer));
        if let Err(e) = result {
            buffer.clear();
            return Err(read_error(e));
        }
        Ok(())
    }

    pub(crate) fn read(&mut self, start_lba: u64, count: u64) -> Result<Vec<u8>, ImageError> {
        let mut buffer = Vec::new();
        self.read_into(start_lba, count, &mut buffer)?;
        Ok(buffer)
    }
}

/// Total length of a stream, leaving it positioned at the start
pub(crate) fn stream_len(stream: &mut FixtureStream) -> Result<u64, ImageError> {
    let read_error = |source| ImageError::ReadError { lba: 0, source };
    let len = stream.seek(SeekFrom::End(0)).map_err(read_error)?;
    stream.seek(SeekFrom::Start(0)).map_err(read_error)?;
    Ok(len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader(data: Vec<u8>, offset: u64, sectors: u64) -> SectorReader {
        SectorReader::new(Box::new(Cursor::new(data)), offset, Geometry::new(sectors, 4))
    }

    #[test]
    fn test_reads_after_header() {
        let data: Vec<u8> = (0u8..20).collect();
        let mut reader = reader(data, 4, 4);
        assert_eq!(reader.read(1, 2).unwrap(), (8u8..16).collect::<Vec<_>>());
    }

    #[test]
    fn test_out_of_range_returns_no_data() {
        let mut reader = reader(vec![0; 16], 0, 4);
        let mut buffer = vec![1, 2, 3];
        let err = reader.read_into(3, 2, &mut buffer).unwrap_err();
        assert!(matches!(err, ImageError::OutOfRange { .. }));
    }

    #[test]
    fn test_short_stream_is_read_error() {
        let mut reader = reader(vec![0; 10], 0, 4);
        let mut buffer = Vec::new();
        let err = reader.read_into(2, 2, &mut buffer).unwrap_err();
        assert!(matches!(err, ImageError::ReadError { lba: 2, .. }));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_stream_len_rewinds() {
        let mut stream: FixtureStream = Box::new(Cursor::new(vec![7u8; 33]));
        assert_eq!(stream_len(&mut stream).unwrap(), 33);
        let mut first = [0u8; 1];
        stream.read_exact(&mut first).unwrap();
        assert_eq!(first, [7]);
    }
}
