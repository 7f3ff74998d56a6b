//! Chunked sector streaming into a digest
//!
//! Reads an image front to back in runs of whole sectors and feeds each run
//! into a [`DigestAccumulator`]. Peak memory is a handful of chunk buffers no
//! matter how large the image is.
//!
//! In pipelined mode a scoped producer thread performs the sector reads and
//! hands filled buffers over a bounded channel, so the next read overlaps
//! with hashing of the current chunk. Hashed buffers flow back to the
//! producer for reuse.

use crate::domain::entities::Geometry;
use crate::domain::repositories::{ImageError, ImageHandle};
use crate::domain::services::{DigestAccumulator, DigestAlgorithm};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::io;

/// Filled buffers allowed in flight between producer and hasher
const PIPELINE_DEPTH: usize = 2;

/// Result of streaming a whole image through a digest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamedDigest {
    pub algorithm: DigestAlgorithm,
    /// Lower-case hex
    pub digest: String,
    pub bytes: u64,
}

/// Streams every sector of `handle` through `algorithm`
pub fn stream_digest(
    handle: &mut dyn ImageHandle,
    geometry: Geometry,
    algorithm: DigestAlgorithm,
    sectors_per_chunk: u64,
    pipelined: bool,
) -> Result<StreamedDigest, ImageError> {
    let sectors_per_chunk = sectors_per_chunk.max(1);
    let mut acc = DigestAccumulator::new(algorithm);

    if pipelined && geometry.sector_count > sectors_per_chunk {
        stream_pipelined(handle, geometry, sectors_per_chunk, &mut acc)?;
    } else {
        stream_sequential(handle, geometry, sectors_per_chunk, &mut acc)?;
    }

    let bytes = acc.bytes_fed();
    Ok(StreamedDigest {
        algorithm,
        digest: acc.finalize(),
        bytes,
    })
}

/// Visits every sector run of the image in order
///
/// `visit` receives the first LBA and the bytes of each run.
pub fn for_each_chunk<F>(
    handle: &mut dyn ImageHandle,
    geometry: Geometry,
    sectors_per_chunk: u64,
    mut visit: F,
) -> Result<(), ImageError>
where
    F: FnMut(u64, &[u8]),
{
    let sectors_per_chunk = sectors_per_chunk.max(1);
    let mut buffer = Vec::new();
    let mut lba = 0u64;

    while lba < geometry.sector_count {
        let count = sectors_per_chunk.min(geometry.sector_count - lba);
        read_run(handle, geometry, lba, count, &mut buffer)?;
        visit(lba, &buffer);
        lba += count;
    }
    Ok(())
}

fn stream_sequential(
    handle: &mut dyn ImageHandle,
    geometry: Geometry,
    sectors_per_chunk: u64,
    acc: &mut DigestAccumulator,
) -> Result<(), ImageError> {
    for_each_chunk(handle, geometry, sectors_per_chunk, |_, data| acc.update(data))
}

fn stream_pipelined(
    handle: &mut dyn ImageHandle,
    geometry: Geometry,
    sectors_per_chunk: u64,
    acc: &mut DigestAccumulator,
) -> Result<(), ImageError> {
    let (filled_tx, filled_rx) = bounded::<Result<Vec<u8>, ImageError>>(PIPELINE_DEPTH);
    let (free_tx, free_rx) = bounded::<Vec<u8>>(PIPELINE_DEPTH + 2);

    std::thread::scope(|scope| {
        scope.spawn(move || produce(handle, geometry, sectors_per_chunk, filled_tx, free_rx));

        // An error is the producer's last message, so returning on it never leaves the
        // producer blocked on a send.
        for message in filled_rx.iter() {
            let buffer = message?;
            acc.update(&buffer);
            let _ = free_tx.try_send(buffer);
        }
        Ok(())
    })
}

fn produce(
    handle: &mut dyn ImageHandle,
    geometry: Geometry,
    sectors_per_chunk: u64,
    filled_tx: Sender<Result<Vec<u8>, ImageError>>,
    free_rx: Receiver<Vec<u8>>,
) {
    let mut lba = 0u64;

    while lba < geometry.sector_count {
        let count = sectors_per_chunk.min(geometry.sector_count - lba);
        let mut buffer = free_rx.try_recv().unwrap_or_default();

        let message = read_run(handle, geometry, lba, count, &mut buffer).map(|()| buffer);
        let failed = message.is_err();
        if filled_tx.send(message).is_err() || failed {
            return;
        }
        lba += count;
    }
}

/// Reads one run and checks the decoder returned exactly the bytes asked for
fn read_run(
    handle: &mut dyn ImageHandle,
    geometry: Geometry,
    lba: u64,
    count: u64,
    buffer: &mut Vec<u8>,
) -> Result<(), ImageError> {
    handle.read_sectors_into(lba, count, buffer)?;

    let expected = count * geometry.sector_size as u64;
    if buffer.len() as u64 != expected {
        return Err(ImageError::ReadError {
            lba,
            source: io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "decoder returned {} bytes for {} sectors ({} expected)",
                    buffer.len(),
                    count,
                    expected
                ),
            ),
        });
    }
    Ok(())
}
