//! Domain entities
//!
//! Value records describing fixtures, media, and verification outcomes.

mod fixture_entry;
mod media_type;
mod verification_result;

pub use fixture_entry::{ExpectationError, FixtureEntry, FixtureSuite, PartitionExtent};
pub use media_type::{Geometry, MediaType};
pub(crate) use verification_result::ResultBuilder;
pub use verification_result::{
    Diagnostic, MetadataField, PartitionMismatch, VerificationResult, VerificationState,
};
