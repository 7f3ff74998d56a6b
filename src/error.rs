//! Run-level errors
//!
//! Only contract violations end a run: a table naming a plugin that does not
//! exist, a row that breaks a table invariant, or a table that cannot be
//! read. Fixture and decoder failures are recorded in results instead.

use crate::domain::entities::ExpectationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("suite '{suite}' references unknown plugin '{plugin}'")]
    UnknownPlugin { suite: String, plugin: String },

    #[error("invalid expectation: {0}")]
    InvalidExpectation(String),

    #[error("failed to read expectation table {path}: {source}")]
    TableRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse expectation table {path}: {source}")]
    TableParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
}

impl From<ExpectationError> for HarnessError {
    fn from(err: ExpectationError) -> Self {
        HarnessError::InvalidExpectation(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, HarnessError>;
