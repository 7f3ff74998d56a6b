//! Seekable gzip fixture reader
//!
//! Decoders need random access, but a deflate stream can only be read
//! forward. This reader keeps a single decoder and emulates seeking:
//! forward seeks decompress and discard, backward seeks restart the
//! decoder from the start of the file. Concatenated gzip members decode as
//! one stream. The decompressed image is never held in memory.

use crate::domain::repositories::FixtureError;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Seekable view over a gzip-compressed fixture
///
/// # Example
///
/// ```ignore
/// let mut reader = GzipFixtureReader::open("test-files/raw/floppy.img.gz")?;
/// reader.seek(SeekFrom::Start(512))?;
/// ```
pub struct GzipFixtureReader {
    path: PathBuf,
    decoder: MultiGzDecoder<BufReader<File>>,
    /// Logical position seen by the caller
    position: u64,
    /// Bytes the current decoder has produced
    decoded: u64,
    /// Decompressed length, learned at open
    len: u64,
}

impl GzipFixtureReader {
    /// Opens a gzip fixture and verifies it decompresses cleanly
    ///
    /// Every member is decompressed once into a sink, so truncation and
    /// checksum failures surface here as `Corrupt` instead of in the middle
    /// of a decoder's sector read.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let path = path.as_ref().to_path_buf();

        let mut integrity = Self::decoder_for(&path)?;
        let len = io::copy(&mut integrity, &mut io::sink())
            .map_err(|e| decompression_error(&path, e))?;

        tracing::trace!(path = %path.display(), len, "gzip fixture verified");

        let decoder = Self::decoder_for(&path)?;
        Ok(Self {
            path,
            decoder,
            position: 0,
            decoded: 0,
            len,
        })
    }

    /// Decompressed length in bytes
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn decoder_for(path: &Path) -> Result<MultiGzDecoder<BufReader<File>>, FixtureError> {
        let file = File::open(path).map_err(|e| open_error(path, e))?;
        Ok(MultiGzDecoder::new(BufReader::new(file)))
    }

    fn restart(&mut self) -> io::Result<()> {
        self.decoder = Self::decoder_for(&self.path).map_err(io::Error::other)?;
        self.decoded = 0;
        Ok(())
    }

    /// Decompresses and discards until the decoder reaches `target`
    fn skip_to(&mut self, target: u64) -> io::Result<()> {
        let target = target.min(self.len);
        if target < self.decoded {
            self.restart()?;
        }
        let wanted = target - self.decoded;
        let skipped = io::copy(&mut (&mut self.decoder).take(wanted), &mut io::sink())?;
        self.decoded += skipped;
        if skipped != wanted {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("gzip stream ended at {} while seeking to {}", self.decoded, target),
            ));
        }
        Ok(())
    }
}

impl Read for GzipFixtureReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.position >= self.len || buf.is_empty() {
            return Ok(0);
        }
        if self.decoded != self.position {
            self.skip_to(self.position)?;
        }
        let n = self.decoder.read(buf)?;
        self.decoded += n as u64;
        self.position = self.decoded;
        Ok(n)
    }
}

impl Seek for GzipFixtureReader {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::End(delta) => self.len.checked_add_signed(delta),
            SeekFrom::Current(delta) => self.position.checked_add_signed(delta),
        }
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid seek to a negative or overflowing position",
            )
        })?;

        if target < self.decoded {
            self.skip_to(target)?;
        }
        self.position = target;
        Ok(target)
    }
}

pub(super) fn open_error(path: &Path, err: io::Error) -> FixtureError {
    if err.kind() == io::ErrorKind::NotFound {
        FixtureError::NotFound(path.display().to_string())
    } else {
        FixtureError::Unreadable {
            path: path.display().to_string(),
            source: err,
        }
    }
}

fn decompression_error(path: &Path, err: io::Error) -> FixtureError {
    match err.kind() {
        io::ErrorKind::UnexpectedEof | io::ErrorKind::InvalidData | io::ErrorKind::InvalidInput => {
            FixtureError::Corrupt {
                path: path.display().to_string(),
                message: err.to_string(),
            }
        }
        _ => open_error(path, err),
    }
}
