//! Domain services
//!
//! Stateless logic shared by the verification engine.

mod digest;
mod partition_check;
mod plugin_registry;

pub use digest::{digest_hex, digests_equal, DigestAccumulator, DigestAlgorithm};
pub use partition_check::compare_partitions;
pub use plugin_registry::PluginRegistry;
