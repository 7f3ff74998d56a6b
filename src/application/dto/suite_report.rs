//! Suite and run report DTOs

use crate::domain::entities::VerificationResult;
use std::time::Duration;

/// Outcome of verifying every fixture in one suite
#[derive(Debug, Clone)]
pub struct SuiteReport {
    /// Suite display name
    pub suite: String,
    /// Plugin the suite was decoded with
    pub plugin: String,
    /// One result per fixture, in table order
    pub results: Vec<VerificationResult>,
    /// Wall-clock time for the whole suite
    pub duration: Duration,
}

impl SuiteReport {
    pub fn new(suite: String, plugin: String) -> Self {
        Self {
            suite,
            plugin,
            results: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.is_pass()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }

    /// Fixtures that stopped before completing every check
    pub fn errored(&self) -> usize {
        self.results.iter().filter(|r| r.is_errored()).count()
    }

    /// Results that are not fully matched
    pub fn failures(&self) -> impl Iterator<Item = &VerificationResult> {
        self.results.iter().filter(|r| !r.is_pass())
    }

    /// A suite passes only when every fixture passes
    pub fn is_success(&self) -> bool {
        self.results.iter().all(|r| r.is_pass())
    }

    /// Returns a summary string listing every diagnostic of every failure
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "{} [{}]: {}/{} passed ({} errored) in {:.2}s\n",
            self.suite,
            self.plugin,
            self.passed(),
            self.total(),
            self.errored(),
            self.duration.as_secs_f64()
        );

        for result in self.failures() {
            summary.push_str(&format!(
                "  FAIL {} ({})\n",
                result.fixture().file_name(),
                result.state()
            ));
            for diagnostic in result.diagnostics() {
                summary.push_str(&format!("    - {}: {}\n", diagnostic.kind(), diagnostic));
            }
        }

        summary
    }
}

/// Outcome of a whole run across suites
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub suites: Vec<SuiteReport>,
}

impl RunReport {
    pub fn total(&self) -> usize {
        self.suites.iter().map(SuiteReport::total).sum()
    }

    pub fn failed(&self) -> usize {
        self.suites.iter().map(SuiteReport::failed).sum()
    }

    /// The run fails if any fixture in any suite is not fully matched
    pub fn is_success(&self) -> bool {
        self.suites.iter().all(SuiteReport::is_success)
    }

    pub fn summary(&self) -> String {
        let mut summary: String = self.suites.iter().map(SuiteReport::summary).collect();
        summary.push_str(&format!(
            "\n{} suites, {} fixtures, {} failed\n",
            self.suites.len(),
            self.total(),
            self.failed()
        ));
        summary
    }
}
