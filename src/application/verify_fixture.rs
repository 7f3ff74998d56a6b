//! Verify fixture use case
//!
//! Runs one fixture through the verification state machine:
//! open, metadata, digest, partitions. Mismatches are recorded and the run
//! carries on; only failures that make later checks meaningless stop it.

use crate::application::dto::VerifyOptions;
use crate::application::opened_image::OpenedImage;
use crate::application::sector_stream::stream_digest;
use crate::domain::entities::{
    Diagnostic, FixtureEntry, MetadataField, ResultBuilder, VerificationResult, VerificationState,
};
use crate::domain::repositories::{FixtureSource, ImagePlugin};
use crate::domain::services::{compare_partitions, digests_equal};
use std::fmt::Display;
use std::sync::Arc;
use std::time::Instant;

/// Verify fixture use case
///
/// Owns nothing between runs: every `execute` opens its own stream and
/// releases it before returning.
pub struct VerifyFixtureUseCase {
    source: Arc<dyn FixtureSource>,
    plugin: Arc<dyn ImagePlugin>,
    options: VerifyOptions,
}

/// Per-fixture progress through the state machine
struct FixtureRun {
    state: VerificationState,
    builder: ResultBuilder,
    started: Instant,
}

impl FixtureRun {
    fn new(fixture: FixtureEntry) -> Self {
        Self {
            state: VerificationState::Pending,
            builder: ResultBuilder::new(fixture),
            started: Instant::now(),
        }
    }

    fn advance(&mut self, next: VerificationState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {}",
            self.state,
            next
        );
        self.state = next;
    }

    /// Stops the run, recording the stage it reached
    fn abort(mut self, message: impl Display) -> VerificationResult {
        let message = message.to_string();
        tracing::warn!(
            fixture = self.builder.fixture().file_name(),
            stage = %self.state,
            "{}",
            message
        );
        self.builder.record(Diagnostic::Errored {
            stage: self.state,
            message,
        });
        self.builder
            .finish(VerificationState::Errored, self.started.elapsed())
    }

    fn finish(mut self) -> VerificationResult {
        self.advance(VerificationState::Done);
        self.builder.finish(self.state, self.started.elapsed())
    }
}

impl VerifyFixtureUseCase {
    pub fn new(
        source: Arc<dyn FixtureSource>,
        plugin: Arc<dyn ImagePlugin>,
        options: VerifyOptions,
    ) -> Self {
        Self {
            source,
            plugin,
            options,
        }
    }

    pub fn plugin(&self) -> &dyn ImagePlugin {
        self.plugin.as_ref()
    }

    /// Verifies `fixture`, resolved from `folder` in the fixture store
    pub fn execute(&self, folder: &str, fixture: &FixtureEntry) -> VerificationResult {
        let mut run = FixtureRun::new(fixture.clone());
        tracing::debug!(fixture = fixture.file_name(), folder, "verifying fixture");

        let stream = match self.source.open_fixture(folder, fixture.file_name()) {
            Ok(stream) => stream,
            Err(e) => return run.abort(format!("{}: {}", e.kind(), e)),
        };

        let mut image = match OpenedImage::open(self.plugin.as_ref(), stream, fixture.file_name())
        {
            Ok(image) => image,
            Err(e) => return run.abort(format!("{}: {}", e.kind(), e)),
        };
        run.advance(VerificationState::Opened);

        self.check_metadata(&mut run, &image);
        run.advance(VerificationState::MetadataChecked);

        if let Err(message) = self.check_digest(&mut run, &mut image) {
            return run.abort(message);
        }
        run.advance(VerificationState::DigestComputed);

        if let Err(message) = self.check_partitions(&mut run, &mut image) {
            return run.abort(message);
        }
        run.advance(VerificationState::PartitionsChecked);

        drop(image);
        let result = run.finish();

        if result.is_pass() {
            tracing::info!(
                fixture = fixture.file_name(),
                elapsed_ms = result.duration().as_millis() as u64,
                "fixture passed"
            );
        } else {
            tracing::info!(
                fixture = fixture.file_name(),
                diagnostics = result.diagnostics().len(),
                "fixture failed"
            );
        }
        result
    }

    /// Compares every metadata field; a mismatch never skips the others
    fn check_metadata(&self, run: &mut FixtureRun, image: &OpenedImage) {
        let expected = run.builder.fixture().clone();
        let geometry = image.geometry();

        let media_type_match = image.media_type() == expected.media_type();
        if !media_type_match {
            run.builder.record(Diagnostic::MetadataMismatch {
                field: MetadataField::MediaType,
                expected: expected.media_type().to_string(),
                actual: image.media_type().to_string(),
            });
        }

        let count_match = geometry.sector_count == expected.sector_count();
        if !count_match {
            run.builder.record(Diagnostic::MetadataMismatch {
                field: MetadataField::SectorCount,
                expected: expected.sector_count().to_string(),
                actual: geometry.sector_count.to_string(),
            });
        }

        let size_match = geometry.sector_size == expected.sector_size();
        if !size_match {
            run.builder.record(Diagnostic::MetadataMismatch {
                field: MetadataField::SectorSize,
                expected: expected.sector_size().to_string(),
                actual: geometry.sector_size.to_string(),
            });
        }

        run.builder.set_media_type_match(media_type_match);
        run.builder.set_geometry_match(count_match && size_match);
    }

    /// Streams every decoded sector through the digest and compares
    fn check_digest(&self, run: &mut FixtureRun, image: &mut OpenedImage) -> Result<(), String> {
        let expected = run.builder.fixture().digest().to_string();
        let algorithm = self.options.algorithm_for(&expected).ok_or_else(|| {
            format!(
                "no digest algorithm produces {} hex characters",
                expected.len()
            )
        })?;

        let geometry = image.geometry();
        if geometry.byte_len().is_none() {
            return Err(format!("decoded geometry {} is not addressable", geometry));
        }

        let streamed = stream_digest(
            image.handle_mut(),
            geometry,
            algorithm,
            self.options.sectors_per_chunk(geometry.sector_size),
            self.options.pipelined,
        )
        .map_err(|e| format!("{}: {}", e.kind(), e))?;

        let matched = digests_equal(&expected, &streamed.digest);
        if !matched {
            run.builder.record(Diagnostic::DigestMismatch {
                algorithm: algorithm.name(),
                expected,
                actual: streamed.digest.clone(),
            });
        }

        tracing::debug!(
            fixture = image.label(),
            algorithm = algorithm.name(),
            bytes = streamed.bytes,
            matched,
            "digest computed"
        );
        run.builder
            .set_digest(streamed.digest, matched, streamed.bytes);
        Ok(())
    }

    /// Compares partition extents when the fixture expects any
    fn check_partitions(
        &self,
        run: &mut FixtureRun,
        image: &mut OpenedImage,
    ) -> Result<(), String> {
        let Some(expected) = run.builder.fixture().partitions().map(<[_]>::to_vec) else {
            return Ok(());
        };

        let Some(partitioned) = image.partitions() else {
            run.builder.record(Diagnostic::PartitionCapabilityMissing {
                expected: expected.len(),
            });
            run.builder.set_partition_match(false);
            return Err(format!(
                "plugin '{}' cannot enumerate partitions",
                self.plugin.name()
            ));
        };

        let actual = partitioned
            .enumerate_partitions()
            .map_err(|e| format!("{}: {}", e.kind(), e))?;

        let mismatches = compare_partitions(&expected, &actual);
        run.builder.set_partition_match(mismatches.is_empty());
        for mismatch in mismatches {
            run.builder.record(Diagnostic::PartitionMismatch(mismatch));
        }
        Ok(())
    }
}
