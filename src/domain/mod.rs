//! Domain layer - Core verification model
//!
//! Fixture and result entities, the decoder capability traits, and the
//! digest and partition-comparison services. Nothing here touches the
//! filesystem.

pub mod entities;
pub mod repositories;
pub mod services;
