//! Golden-value conformance harness for disk and media image decoders
//!
//! A run loads an expectation table, opens every fixture through the
//! plugin its suite names, and checks the decoded media type, geometry,
//! sector digest and partition table against the table.
//!
//! ```ignore
//! use imgverify::application::{dto::VerifyOptions, VerifySuiteUseCase};
//! use imgverify::infrastructure::{expectations, fixture_store::LocalFixtureStore, plugins};
//! use std::sync::Arc;
//!
//! let suites = expectations::load_table("expectations.json")?;
//! let runner = VerifySuiteUseCase::new(
//!     Arc::new(LocalFixtureStore::new("test-files")),
//!     Arc::new(plugins::builtin_registry()),
//!     VerifyOptions::default(),
//! );
//! let report = runner.run(&suites)?;
//! assert!(report.is_success(), "{}", report.summary());
//! ```

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod logging;

pub use application::dto::{RunReport, SuiteReport, VerifyOptions};
pub use application::{VerifyFixtureUseCase, VerifySuiteUseCase};
pub use domain::entities::{
    Diagnostic, FixtureEntry, FixtureSuite, MediaType, PartitionExtent, VerificationResult,
    VerificationState,
};
pub use error::HarnessError;
