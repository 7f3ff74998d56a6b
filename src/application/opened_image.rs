//! Scoped ownership of a decoded image
//!
//! An [`OpenedImage`] is created for exactly one verification run and owns
//! the plugin handle (and through it the fixture stream). Dropping it on any
//! exit path releases the underlying file.

use crate::domain::entities::{Geometry, MediaType};
use crate::domain::repositories::{
    FixtureStream, ImageError, ImageHandle, ImagePlugin, PartitionedImage,
};

pub struct OpenedImage {
    label: String,
    handle: Box<dyn ImageHandle>,
    media_type: MediaType,
    geometry: Geometry,
}

impl OpenedImage {
    /// Decodes `stream` with `plugin` and caches the reported metadata
    pub fn open(
        plugin: &dyn ImagePlugin,
        stream: FixtureStream,
        label: impl Into<String>,
    ) -> Result<Self, ImageError> {
        let handle = plugin.open(stream)?;
        let media_type = handle.media_type();
        let geometry = handle.geometry();
        let label = label.into();

        tracing::debug!(
            fixture = %label,
            plugin = plugin.name(),
            media_type = %media_type,
            sectors = geometry.sector_count,
            sector_size = geometry.sector_size,
            "opened image"
        );

        Ok(Self {
            label,
            handle,
            media_type,
            geometry,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn handle_mut(&mut self) -> &mut dyn ImageHandle {
        self.handle.as_mut()
    }

    /// Partition capability of the underlying decoder, if it has one
    pub fn partitions(&mut self) -> Option<&mut dyn PartitionedImage> {
        self.handle.partitions()
    }
}

impl Drop for OpenedImage {
    fn drop(&mut self) {
        tracing::trace!(fixture = %self.label, "released image handle");
    }
}
