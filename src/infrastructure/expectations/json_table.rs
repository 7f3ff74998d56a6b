//! JSON expectation table
//!
//! ```json
//! {
//!   "suites": [{
//!     "name": "raw floppies",
//!     "plugin": "raw",
//!     "folder": "raw",
//!     "fixtures": [{
//!       "test_file": "mf2hd.img.gz",
//!       "media_type": "dos_35_hd",
//!       "sectors": 2880,
//!       "sector_size": 512,
//!       "digest": "…",
//!       "partitions": [{ "start": 63, "length": 20417 }]
//!     }]
//!   }]
//! }
//! ```
//!
//! Unknown fields are rejected so that a misspelt column fails loudly
//! instead of silently dropping a check.

use crate::domain::entities::{FixtureEntry, FixtureSuite, MediaType, PartitionExtent};
use crate::error::{HarnessError, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TableFile {
    suites: Vec<SuiteRow>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SuiteRow {
    name: String,
    plugin: String,
    folder: String,
    #[serde(default)]
    fixtures: Vec<FixtureRow>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FixtureRow {
    test_file: String,
    media_type: String,
    sectors: u64,
    sector_size: u32,
    digest: String,
    #[serde(default)]
    partitions: Option<Vec<ExtentRow>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ExtentRow {
    start: u64,
    length: u64,
}

/// Reads and validates a table file
pub fn load_table(path: impl AsRef<Path>) -> Result<Vec<FixtureSuite>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| HarnessError::TableRead {
        path: path.display().to_string(),
        source,
    })?;
    parse_table_at(&text, &path.display().to_string())
}

/// Parses and validates a table held in memory
pub fn parse_table(text: &str) -> Result<Vec<FixtureSuite>> {
    parse_table_at(text, "<memory>")
}

fn parse_table_at(text: &str, origin: &str) -> Result<Vec<FixtureSuite>> {
    let table: TableFile = serde_json::from_str(text).map_err(|source| HarnessError::TableParse {
        path: origin.to_string(),
        source,
    })?;

    let suites = table
        .suites
        .into_iter()
        .map(SuiteRow::into_suite)
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(
        origin,
        suites = suites.len(),
        fixtures = suites.iter().map(|s| s.fixtures.len()).sum::<usize>(),
        "loaded expectation table"
    );
    Ok(suites)
}

impl SuiteRow {
    fn into_suite(self) -> Result<FixtureSuite> {
        if self.plugin.trim().is_empty() {
            return Err(HarnessError::InvalidExpectation(format!(
                "suite '{}' names no plugin",
                self.name
            )));
        }

        let fixtures = self
            .fixtures
            .into_iter()
            .map(FixtureRow::into_entry)
            .collect::<Result<Vec<_>>>()?;
        Ok(FixtureSuite::new(self.name, self.plugin, self.folder, fixtures))
    }
}

impl FixtureRow {
    fn into_entry(self) -> Result<FixtureEntry> {
        let media_type: MediaType = self.media_type.parse().map_err(|e: String| {
            HarnessError::InvalidExpectation(format!("{}: {}", self.test_file, e))
        })?;

        let partitions = self.partitions.map(|rows| {
            rows.into_iter()
                .map(|row| PartitionExtent::new(row.start, row.length))
                .collect()
        });

        Ok(FixtureEntry::new(
            self.test_file,
            media_type,
            self.sectors,
            self.sector_size,
            self.digest,
            partitions,
        )?)
    }
}
