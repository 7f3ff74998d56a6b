//! Verify suite use case
//!
//! Resolves a suite's plugin, validates its rows, then verifies every
//! fixture independently. A failing fixture never stops its siblings.

use crate::application::dto::{RunReport, SuiteReport, VerifyOptions};
use crate::application::verify_fixture::VerifyFixtureUseCase;
use crate::domain::entities::{FixtureSuite, VerificationResult};
use crate::domain::repositories::FixtureSource;
use crate::domain::services::PluginRegistry;
use crate::error::{HarnessError, Result};
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;

/// Verify suite use case
pub struct VerifySuiteUseCase {
    source: Arc<dyn FixtureSource>,
    registry: Arc<PluginRegistry>,
    options: VerifyOptions,
}

impl VerifySuiteUseCase {
    pub fn new(
        source: Arc<dyn FixtureSource>,
        registry: Arc<PluginRegistry>,
        options: VerifyOptions,
    ) -> Self {
        Self {
            source,
            registry,
            options,
        }
    }

    pub fn options(&self) -> &VerifyOptions {
        &self.options
    }

    /// Verifies every suite in order
    ///
    /// Stops at the first contract violation; fixture failures are only
    /// reported.
    pub fn run(&self, suites: &[FixtureSuite]) -> Result<RunReport> {
        let mut report = RunReport::default();
        for suite in suites {
            report.suites.push(self.execute(suite)?);
        }
        Ok(report)
    }

    /// Verifies one suite; results keep the table's fixture order
    pub fn execute(&self, suite: &FixtureSuite) -> Result<SuiteReport> {
        let use_case = self.preflight(suite)?;
        let start_time = Instant::now();

        tracing::info!(
            suite = %suite.name,
            plugin = %suite.plugin,
            fixtures = suite.fixtures.len(),
            parallel = self.options.parallel,
            "starting suite"
        );

        let results = if self.options.parallel && suite.fixtures.len() > 1 {
            self.execute_parallel(&use_case, suite)?
        } else {
            suite
                .fixtures
                .iter()
                .map(|fixture| use_case.execute(&suite.folder, fixture))
                .collect()
        };

        let mut report = SuiteReport::new(suite.name.clone(), suite.plugin.clone());
        report.results = results;
        report.duration = start_time.elapsed();

        tracing::info!(
            suite = %suite.name,
            passed = report.passed(),
            failed = report.failed(),
            "suite complete in {:.2}s",
            report.duration.as_secs_f64()
        );

        Ok(report)
    }

    fn execute_parallel(
        &self,
        use_case: &VerifyFixtureUseCase,
        suite: &FixtureSuite,
    ) -> Result<Vec<VerificationResult>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.thread_count)
            .thread_name(|i| format!("imgverify-{}", i))
            .build()
            .map_err(|e| HarnessError::ThreadPool(e.to_string()))?;

        Ok(pool.install(|| {
            suite
                .fixtures
                .par_iter()
                .map(|fixture| use_case.execute(&suite.folder, fixture))
                .collect()
        }))
    }

    /// Checks the suite against the run's contract before touching any fixture
    fn preflight(&self, suite: &FixtureSuite) -> Result<VerifyFixtureUseCase> {
        let plugin = self
            .registry
            .get(&suite.plugin)
            .ok_or_else(|| HarnessError::UnknownPlugin {
                suite: suite.name.clone(),
                plugin: suite.plugin.clone(),
            })?;

        for fixture in &suite.fixtures {
            let digest = fixture.digest();
            match self.options.algorithm_for(digest) {
                Some(algorithm) if algorithm.hex_len() == digest.len() => {}
                Some(algorithm) => {
                    return Err(HarnessError::InvalidExpectation(format!(
                        "{}: digest has {} hex characters, {} produces {}",
                        fixture.file_name(),
                        digest.len(),
                        algorithm,
                        algorithm.hex_len()
                    )));
                }
                None => {
                    return Err(HarnessError::InvalidExpectation(format!(
                        "{}: no digest algorithm produces {} hex characters",
                        fixture.file_name(),
                        digest.len()
                    )));
                }
            }
        }

        Ok(VerifyFixtureUseCase::new(
            Arc::clone(&self.source),
            plugin,
            self.options.clone(),
        ))
    }
}
