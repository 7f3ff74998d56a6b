//! Verification result entity
//!
//! The outcome of checking one fixture: which checks matched, every
//! diagnostic recorded along the way, and the state the run ended in.

use super::fixture_entry::{FixtureEntry, PartitionExtent};
use std::fmt;
use std::time::Duration;

/// Per-fixture verification state machine
///
/// `Pending -> Opened -> MetadataChecked -> DigestComputed ->
/// PartitionsChecked -> Done`, with `Errored` reachable from every
/// non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerificationState {
    Pending,
    Opened,
    MetadataChecked,
    DigestComputed,
    PartitionsChecked,
    Done,
    Errored,
}

impl VerificationState {
    pub fn name(&self) -> &'static str {
        match self {
            VerificationState::Pending => "pending",
            VerificationState::Opened => "opened",
            VerificationState::MetadataChecked => "metadata-checked",
            VerificationState::DigestComputed => "digest-computed",
            VerificationState::PartitionsChecked => "partitions-checked",
            VerificationState::Done => "done",
            VerificationState::Errored => "errored",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, VerificationState::Done | VerificationState::Errored)
    }

    /// Whether the machine may move from `self` to `next`
    pub fn can_transition_to(&self, next: VerificationState) -> bool {
        use VerificationState::*;
        match (self, next) {
            (s, Errored) => !s.is_terminal(),
            (Pending, Opened)
            | (Opened, MetadataChecked)
            | (MetadataChecked, DigestComputed)
            | (DigestComputed, PartitionsChecked)
            | (PartitionsChecked, Done) => true,
            _ => false,
        }
    }
}

impl fmt::Display for VerificationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Metadata property compared against the expectation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataField {
    MediaType,
    SectorCount,
    SectorSize,
}

impl MetadataField {
    pub fn name(&self) -> &'static str {
        match self {
            MetadataField::MediaType => "media type",
            MetadataField::SectorCount => "sector count",
            MetadataField::SectorSize => "sector size",
        }
    }
}

impl fmt::Display for MetadataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// How a decoded partition table differs from the expected one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartitionMismatch {
    CountDiffers {
        expected: usize,
        actual: usize,
    },
    ExtentDiffers {
        index: usize,
        expected: PartitionExtent,
        actual: PartitionExtent,
    },
}

impl fmt::Display for PartitionMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartitionMismatch::CountDiffers { expected, actual } => {
                write!(f, "expected {} partitions, decoder reported {}", expected, actual)
            }
            PartitionMismatch::ExtentDiffers {
                index,
                expected,
                actual,
            } => write!(
                f,
                "partition #{}: expected {}, decoder reported {}",
                index, expected, actual
            ),
        }
    }
}

/// A single human-readable finding for a fixture
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    MetadataMismatch {
        field: MetadataField,
        expected: String,
        actual: String,
    },
    DigestMismatch {
        algorithm: &'static str,
        expected: String,
        actual: String,
    },
    PartitionMismatch(PartitionMismatch),
    /// Partitions were expected but the decoder cannot enumerate them
    PartitionCapabilityMissing {
        expected: usize,
    },
    /// The run stopped early; `stage` is the last state reached
    Errored {
        stage: VerificationState,
        message: String,
    },
}

impl Diagnostic {
    /// Taxonomy name of the finding
    pub fn kind(&self) -> &'static str {
        match self {
            Diagnostic::MetadataMismatch { .. } => "MetadataMismatch",
            Diagnostic::DigestMismatch { .. } => "DigestMismatch",
            Diagnostic::PartitionMismatch(_) => "PartitionMismatch",
            Diagnostic::PartitionCapabilityMissing { .. } => "PartitionCapabilityMissing",
            Diagnostic::Errored { .. } => "Errored",
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MetadataMismatch {
                field,
                expected,
                actual,
            } => write!(f, "{}: expected {}, decoder reported {}", field, expected, actual),
            Diagnostic::DigestMismatch {
                algorithm,
                expected,
                actual,
            } => write!(f, "{} digest: expected {}, computed {}", algorithm, expected, actual),
            Diagnostic::PartitionMismatch(mismatch) => write!(f, "{}", mismatch),
            Diagnostic::PartitionCapabilityMissing { expected } => write!(
                f,
                "{} partitions expected but the decoder cannot enumerate partitions",
                expected
            ),
            Diagnostic::Errored { stage, message } => {
                write!(f, "aborted after {}: {}", stage, message)
            }
        }
    }
}

/// Immutable outcome of verifying one fixture
#[derive(Debug, Clone)]
pub struct VerificationResult {
    fixture: FixtureEntry,
    state: VerificationState,
    media_type_match: bool,
    geometry_match: bool,
    digest_match: bool,
    partition_match: Option<bool>,
    computed_digest: Option<String>,
    bytes_streamed: u64,
    duration: Duration,
    diagnostics: Vec<Diagnostic>,
}

impl VerificationResult {
    pub fn fixture(&self) -> &FixtureEntry {
        &self.fixture
    }

    /// Terminal state: `Done` or `Errored`
    pub fn state(&self) -> VerificationState {
        self.state
    }

    pub fn media_type_match(&self) -> bool {
        self.media_type_match
    }

    pub fn geometry_match(&self) -> bool {
        self.geometry_match
    }

    pub fn digest_match(&self) -> bool {
        self.digest_match
    }

    /// `None` when no partition check was requested
    pub fn partition_match(&self) -> Option<bool> {
        self.partition_match
    }

    pub fn computed_digest(&self) -> Option<&str> {
        self.computed_digest.as_deref()
    }

    pub fn bytes_streamed(&self) -> u64 {
        self.bytes_streamed
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Diagnostics in the order they were recorded
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn is_errored(&self) -> bool {
        self.state == VerificationState::Errored
    }

    /// Fully matched: finished every check with nothing recorded
    pub fn is_pass(&self) -> bool {
        self.state == VerificationState::Done && self.diagnostics.is_empty()
    }

    /// Returns whether any diagnostic of the given kind was recorded
    pub fn has_diagnostic(&self, kind: &str) -> bool {
        self.diagnostics.iter().any(|d| d.kind() == kind)
    }
}

/// Accumulates findings while a fixture is being verified
///
/// Only the engine builds results; once `finish` is called the result can
/// no longer change.
#[derive(Debug)]
pub(crate) struct ResultBuilder {
    fixture: FixtureEntry,
    media_type_match: bool,
    geometry_match: bool,
    digest_match: bool,
    partition_match: Option<bool>,
    computed_digest: Option<String>,
    bytes_streamed: u64,
    diagnostics: Vec<Diagnostic>,
}

impl ResultBuilder {
    pub(crate) fn new(fixture: FixtureEntry) -> Self {
        Self {
            fixture,
            media_type_match: false,
            geometry_match: false,
            digest_match: false,
            partition_match: None,
            computed_digest: None,
            bytes_streamed: 0,
            diagnostics: Vec::new(),
        }
    }

    pub(crate) fn fixture(&self) -> &FixtureEntry {
        &self.fixture
    }

    pub(crate) fn record(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub(crate) fn set_media_type_match(&mut self, matched: bool) {
        self.media_type_match = matched;
    }

    pub(crate) fn set_geometry_match(&mut self, matched: bool) {
        self.geometry_match = matched;
    }

    pub(crate) fn set_digest(&mut self, computed: String, matched: bool, bytes_streamed: u64) {
        self.computed_digest = Some(computed);
        self.digest_match = matched;
        self.bytes_streamed = bytes_streamed;
    }

    pub(crate) fn set_partition_match(&mut self, matched: bool) {
        self.partition_match = Some(matched);
    }

    pub(crate) fn finish(self, state: VerificationState, duration: Duration) -> VerificationResult {
        VerificationResult {
            fixture: self.fixture,
            state,
            media_type_match: self.media_type_match,
            geometry_match: self.geometry_match,
            digest_match: self.digest_match,
            partition_match: self.partition_match,
            computed_digest: self.computed_digest,
            bytes_streamed: self.bytes_streamed,
            duration,
            diagnostics: self.diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::MediaType;

    fn fixture() -> FixtureEntry {
        FixtureEntry::new("a.img", MediaType::Dos35Hd, 2880, 512, "00ff", None).unwrap()
    }

    #[test]
    fn test_happy_path_transitions() {
        use VerificationState::*;
        let path = [Pending, Opened, MetadataChecked, DigestComputed, PartitionsChecked, Done];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_errored_reachable_only_from_non_terminal() {
        use VerificationState::*;
        assert!(Pending.can_transition_to(Errored));
        assert!(DigestComputed.can_transition_to(Errored));
        assert!(!Done.can_transition_to(Errored));
        assert!(!Errored.can_transition_to(Errored));
    }

    #[test]
    fn test_skipping_states_is_rejected() {
        use VerificationState::*;
        assert!(!Pending.can_transition_to(MetadataChecked));
        assert!(!Opened.can_transition_to(Done));
    }

    #[test]
    fn test_clean_result_passes() {
        let result = ResultBuilder::new(fixture()).finish(VerificationState::Done, Duration::ZERO);
        assert!(result.is_pass());
        assert_eq!(result.partition_match(), None);
    }

    #[test]
    fn test_any_diagnostic_fails() {
        let mut builder = ResultBuilder::new(fixture());
        builder.record(Diagnostic::MetadataMismatch {
            field: MetadataField::SectorCount,
            expected: "2880".into(),
            actual: "2881".into(),
        });
        let result = builder.finish(VerificationState::Done, Duration::ZERO);
        assert!(!result.is_pass());
        assert!(result.has_diagnostic("MetadataMismatch"));
    }

    #[test]
    fn test_diagnostic_display_is_actionable() {
        let diagnostic = Diagnostic::PartitionMismatch(PartitionMismatch::ExtentDiffers {
            index: 1,
            expected: PartitionExtent::new(63, 100),
            actual: PartitionExtent::new(64, 100),
        });
        assert_eq!(
            diagnostic.to_string(),
            "partition #1: expected start 63 length 100, decoder reported start 64 length 100"
        );
    }
}
