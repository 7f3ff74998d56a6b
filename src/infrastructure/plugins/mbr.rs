//! MBR partition table parsing
//!
//! Lists the four primary entries of a master boot record in table order.
//! An extended partition is replaced in place by the logical partitions of
//! its EBR chain.

use crate::domain::entities::PartitionExtent;
use crate::domain::repositories::ImageError;
use std::collections::HashSet;

/// Boot signature at the end of the first sector
pub const MBR_SIGNATURE: [u8; 2] = [0x55, 0xAA];

const SIGNATURE_OFFSET: usize = 510;
const TABLE_OFFSET: usize = 446;
const ENTRY_SIZE: usize = 16;
const ENTRY_COUNT: usize = 4;

/// Bytes of a sector the table lives in
pub const MBR_LEN: usize = 512;

/// Upper bound on logical partitions followed through an EBR chain
const MAX_LOGICAL_PARTITIONS: usize = 128;

/// One used slot of a partition table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MbrEntry {
    pub partition_type: u8,
    /// First sector, relative to the table's base
    pub start: u64,
    pub length: u64,
}

impl MbrEntry {
    /// DOS, LBA and Linux extended container types
    pub fn is_extended(&self) -> bool {
        matches!(self.partition_type, 0x05 | 0x0F | 0x85)
    }
}

/// Parses the partition table of one MBR or EBR sector
///
/// Returns `None` when the sector is too short or carries no boot
/// signature. Empty slots (type 0 or zero length) are skipped.
pub fn parse_partition_table(sector: &[u8]) -> Option<Vec<MbrEntry>> {
    if sector.len() < MBR_LEN || sector[SIGNATURE_OFFSET..SIGNATURE_OFFSET + 2] != MBR_SIGNATURE {
        return None;
    }

    let entries = sector[TABLE_OFFSET..TABLE_OFFSET + ENTRY_SIZE * ENTRY_COUNT]
        .chunks_exact(ENTRY_SIZE)
        .filter_map(|raw| {
            let partition_type = raw[4];
            let start = u32::from_le_bytes([raw[8], raw[9], raw[10], raw[11]]) as u64;
            let length = u32::from_le_bytes([raw[12], raw[13], raw[14], raw[15]]) as u64;
            (partition_type != 0 && length != 0).then_some(MbrEntry {
                partition_type,
                start,
                length,
            })
        })
        .collect();

    Some(entries)
}

/// Enumerates partitions of an image through `read_sector`
///
/// `read_sector(lba)` must return the bytes of one sector. An image with no
/// boot signature has no partitions.
pub fn enumerate_partitions<F>(
    sector_count: u64,
    mut read_sector: F,
) -> Result<Vec<PartitionExtent>, ImageError>
where
    F: FnMut(u64) -> Result<Vec<u8>, ImageError>,
{
    if sector_count == 0 {
        return Ok(Vec::new());
    }

    let Some(primaries) = parse_partition_table(&read_sector(0)?) else {
        return Ok(Vec::new());
    };

    let mut extents = Vec::new();
    for entry in primaries {
        if entry.is_extended() {
            walk_ebr_chain(entry.start, sector_count, &mut read_sector, &mut extents)?;
        } else {
            extents.push(PartitionExtent::new(entry.start, entry.length));
        }
    }
    Ok(extents)
}

/// Follows the linked list of extended boot records starting at `base`
fn walk_ebr_chain<F>(
    base: u64,
    sector_count: u64,
    read_sector: &mut F,
    extents: &mut Vec<PartitionExtent>,
) -> Result<(), ImageError>
where
    F: FnMut(u64) -> Result<Vec<u8>, ImageError>,
{
    let mut visited = HashSet::new();
    let mut current = base;

    while extents.len() < MAX_LOGICAL_PARTITIONS && visited.insert(current) {
        if current >= sector_count {
            return Err(ImageError::MalformedHeader(format!(
                "extended boot record at sector {} is past the end of the image ({} sectors)",
                current, sector_count
            )));
        }

        let Some(entries) = parse_partition_table(&read_sector(current)?) else {
            tracing::debug!(lba = current, "EBR chain ends at sector without signature");
            break;
        };

        let mut next = None;
        for entry in entries {
            if entry.is_extended() {
                next.get_or_insert(base + entry.start);
            } else {
                extents.push(PartitionExtent::new(current + entry.start, entry.length));
            }
        }

        match next {
            Some(lba) => current = lba,
            None => break,
        }
    }
    Ok(())
}
