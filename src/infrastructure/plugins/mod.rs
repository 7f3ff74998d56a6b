//! Reference image plugins

mod disk_copy42;
pub mod mbr;
mod raw_image;
mod sector_reader;

pub use disk_copy42::{Dc42Header, DiskCopy42Plugin, DC42_HEADER_LEN, DC42_MAGIC};
pub use raw_image::RawImagePlugin;

use crate::domain::services::PluginRegistry;
use std::sync::Arc;

/// Registry holding every plugin shipped with the crate
pub fn builtin_registry() -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    registry.register(Arc::new(RawImagePlugin::raw()));
    registry.register(Arc::new(RawImagePlugin::iso()));
    registry.register(Arc::new(DiskCopy42Plugin));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_names() {
        assert_eq!(builtin_registry().names(), vec!["dc42", "iso", "raw"]);
    }
}
