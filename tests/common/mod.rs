//! Shared fixture builders for integration tests

#![allow(dead_code)]

use flate2::write::GzEncoder;
use flate2::Compression;
use imgverify::domain::services::{digest_hex, DigestAlgorithm};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Deterministic sector content that differs per sector
pub fn patterned(sectors: u64, sector_size: u32) -> Vec<u8> {
    (0..sectors * sector_size as u64)
        .map(|i| ((i / sector_size as u64) as u8) ^ (i as u8).wrapping_mul(31))
        .collect()
}

pub fn sha256(data: &[u8]) -> String {
    digest_hex(DigestAlgorithm::Sha256, data)
}

pub fn write_plain(root: &Path, folder: &str, name: &str, data: &[u8]) {
    let dir = root.join(folder);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(name), data).unwrap();
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

pub fn write_gz(root: &Path, folder: &str, name: &str, data: &[u8]) {
    write_plain(root, folder, name, &gzip(data));
}

/// Writes a partition entry into an MBR or EBR sector
pub fn put_mbr_entry(sector: &mut [u8], slot: usize, partition_type: u8, start: u32, length: u32) {
    let at = 446 + slot * 16;
    sector[at + 4] = partition_type;
    sector[at + 8..at + 12].copy_from_slice(&start.to_le_bytes());
    sector[at + 12..at + 16].copy_from_slice(&length.to_le_bytes());
    sector[510] = 0x55;
    sector[511] = 0xAA;
}

/// A raw disk with a primary partition table listing `extents`
pub fn raw_disk_with_partitions(sectors: u64, extents: &[(u32, u32)]) -> Vec<u8> {
    let mut data = patterned(sectors, 512);
    data[..512].fill(0);
    for (slot, (start, length)) in extents.iter().enumerate() {
        put_mbr_entry(&mut data[..512], slot, 0x83, *start, *length);
    }
    data
}

/// A DiskCopy 4.2 image around `sector_data`
pub fn dc42_image(name: &str, disk_format: u8, sector_data: &[u8], tag_size: u32) -> Vec<u8> {
    let mut image = vec![0u8; 84];
    image[0] = name.len() as u8;
    image[1..1 + name.len()].copy_from_slice(name.as_bytes());
    image[64..68].copy_from_slice(&(sector_data.len() as u32).to_be_bytes());
    image[68..72].copy_from_slice(&tag_size.to_be_bytes());
    image[80] = disk_format;
    image[81] = 0x22;
    image[82] = 0x01;
    image[83] = 0x00;
    image.extend_from_slice(sector_data);
    image.extend(std::iter::repeat_n(0u8, tag_size as usize));
    image
}
