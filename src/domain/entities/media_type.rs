//! Media type entity
//!
//! Classification of the physical medium a decoder reports for an image,
//! plus the sector geometry that goes with it.

use std::fmt;
use std::str::FromStr;

/// Physical medium reported by a decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    /// Decoder could not classify the medium
    Unknown,
    /// Generic hard disk or any non-floppy block device
    GenericHdd,
    /// CD-ROM data track (2048-byte sectors)
    CdRom,
    /// 5.25" single-sided double-density, 8 sectors per track (160K)
    Dos525SsDd8,
    /// 5.25" single-sided double-density, 9 sectors per track (180K)
    Dos525SsDd9,
    /// 5.25" double-sided double-density, 8 sectors per track (320K)
    Dos525DsDd8,
    /// 5.25" double-sided double-density, 9 sectors per track (360K)
    Dos525DsDd9,
    /// 5.25" high-density (1.2M)
    Dos525Hd,
    /// 3.5" double-sided double-density, 9 sectors per track (720K)
    Dos35DsDd9,
    /// 3.5" high-density (1.44M)
    Dos35Hd,
    /// Microsoft Distribution Media Format (1.68M)
    Dmf,
    /// 3.5" extra-density (2.88M)
    Dos35Ed,
    /// Apple 3.5" single-sided GCR (400K)
    AppleSonySs,
    /// Apple 3.5" double-sided GCR (800K)
    AppleSonyDs,
}

impl MediaType {
    /// Every known media type, in declaration order
    pub const ALL: [MediaType; 14] = [
        MediaType::Unknown,
        MediaType::GenericHdd,
        MediaType::CdRom,
        MediaType::Dos525SsDd8,
        MediaType::Dos525SsDd9,
        MediaType::Dos525DsDd8,
        MediaType::Dos525DsDd9,
        MediaType::Dos525Hd,
        MediaType::Dos35DsDd9,
        MediaType::Dos35Hd,
        MediaType::Dmf,
        MediaType::Dos35Ed,
        MediaType::AppleSonySs,
        MediaType::AppleSonyDs,
    ];

    /// Stable identifier used by expectation tables
    pub fn name(&self) -> &'static str {
        match self {
            MediaType::Unknown => "unknown",
            MediaType::GenericHdd => "generic_hdd",
            MediaType::CdRom => "cd_rom",
            MediaType::Dos525SsDd8 => "dos_525_ss_dd_8",
            MediaType::Dos525SsDd9 => "dos_525_ss_dd_9",
            MediaType::Dos525DsDd8 => "dos_525_ds_dd_8",
            MediaType::Dos525DsDd9 => "dos_525_ds_dd_9",
            MediaType::Dos525Hd => "dos_525_hd",
            MediaType::Dos35DsDd9 => "dos_35_ds_dd_9",
            MediaType::Dos35Hd => "dos_35_hd",
            MediaType::Dmf => "dmf",
            MediaType::Dos35Ed => "dos_35_ed",
            MediaType::AppleSonySs => "apple_sony_ss",
            MediaType::AppleSonyDs => "apple_sony_ds",
        }
    }

    /// Returns a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            MediaType::Unknown => "Unknown medium",
            MediaType::GenericHdd => "Generic hard disk",
            MediaType::CdRom => "CD-ROM",
            MediaType::Dos525SsDd8 => "5.25\" SS/DD 8 spt (160K)",
            MediaType::Dos525SsDd9 => "5.25\" SS/DD 9 spt (180K)",
            MediaType::Dos525DsDd8 => "5.25\" DS/DD 8 spt (320K)",
            MediaType::Dos525DsDd9 => "5.25\" DS/DD 9 spt (360K)",
            MediaType::Dos525Hd => "5.25\" HD (1.2M)",
            MediaType::Dos35DsDd9 => "3.5\" DS/DD 9 spt (720K)",
            MediaType::Dos35Hd => "3.5\" HD (1.44M)",
            MediaType::Dmf => "DMF (1.68M)",
            MediaType::Dos35Ed => "3.5\" ED (2.88M)",
            MediaType::AppleSonySs => "Apple 3.5\" SS GCR (400K)",
            MediaType::AppleSonyDs => "Apple 3.5\" DS GCR (800K)",
        }
    }

    /// Classifies a flat sector dump by its geometry
    ///
    /// Only exact floppy capacities map to floppy types; anything else with
    /// 2048-byte sectors is a CD-ROM and the rest is a generic hard disk.
    pub fn from_geometry(geometry: Geometry) -> Self {
        match (geometry.sector_size, geometry.sector_count) {
            (512, 320) => MediaType::Dos525SsDd8,
            (512, 360) => MediaType::Dos525SsDd9,
            (512, 640) => MediaType::Dos525DsDd8,
            (512, 720) => MediaType::Dos525DsDd9,
            (512, 800) => MediaType::AppleSonySs,
            (512, 1440) => MediaType::Dos35DsDd9,
            (512, 1600) => MediaType::AppleSonyDs,
            (512, 2400) => MediaType::Dos525Hd,
            (512, 2880) => MediaType::Dos35Hd,
            (512, 3360) => MediaType::Dmf,
            (512, 5760) => MediaType::Dos35Ed,
            (2048, _) => MediaType::CdRom,
            _ => MediaType::GenericHdd,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MediaType::ALL
            .iter()
            .copied()
            .find(|m| m.name() == s)
            .ok_or_else(|| format!("unknown media type '{}'", s))
    }
}

/// Sector geometry of an image: constant for the lifetime of a handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Geometry {
    pub sector_count: u64,
    pub sector_size: u32,
}

impl Geometry {
    pub fn new(sector_count: u64, sector_size: u32) -> Self {
        Self {
            sector_count,
            sector_size,
        }
    }

    /// Total decoded size in bytes, or `None` if it does not fit in a `u64`
    pub fn byte_len(&self) -> Option<u64> {
        self.sector_count.checked_mul(self.sector_size as u64)
    }

    /// Whether `count` sectors starting at `start_lba` lie inside the image
    pub fn contains_run(&self, start_lba: u64, count: u64) -> bool {
        start_lba
            .checked_add(count)
            .is_some_and(|end| end <= self.sector_count)
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {} bytes", self.sector_count, self.sector_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip_through_from_str() {
        for media in MediaType::ALL {
            assert_eq!(media.name().parse::<MediaType>().unwrap(), media);
        }
    }

    #[test]
    fn test_unknown_name_is_rejected() {
        assert!("floppy".parse::<MediaType>().is_err());
    }

    #[test]
    fn test_from_geometry_floppies() {
        assert_eq!(
            MediaType::from_geometry(Geometry::new(1440, 512)),
            MediaType::Dos35DsDd9
        );
        assert_eq!(
            MediaType::from_geometry(Geometry::new(2880, 512)),
            MediaType::Dos35Hd
        );
    }

    #[test]
    fn test_from_geometry_fallbacks() {
        assert_eq!(
            MediaType::from_geometry(Geometry::new(20480, 512)),
            MediaType::GenericHdd
        );
        assert_eq!(
            MediaType::from_geometry(Geometry::new(1440, 2048)),
            MediaType::CdRom
        );
    }

    #[test]
    fn test_byte_len_overflow() {
        assert_eq!(Geometry::new(u64::MAX, 512).byte_len(), None);
        assert_eq!(Geometry::new(4, 512).byte_len(), Some(2048));
    }

    #[test]
    fn test_contains_run() {
        let geometry = Geometry::new(10, 512);
        assert!(geometry.contains_run(0, 10));
        assert!(geometry.contains_run(9, 1));
        assert!(!geometry.contains_run(9, 2));
        assert!(!geometry.contains_run(u64::MAX, 2));
    }
}
