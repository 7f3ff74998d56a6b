//! Infrastructure layer
//!
//! Concrete fixture stores, image plugins and expectation table loaders.

pub mod expectations;
pub mod fixture_store;
pub mod plugins;
