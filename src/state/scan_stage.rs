/// Scan stage definitions for a single site scan
///
/// A scan moves strictly forward through `Fetching -> Parsing -> Classifying -> Assembled`;
/// any non-terminal stage may drop to `Failed`.
use crate::ScanError;
use std::fmt;

/// Represents the current stage of one site scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanStage {
    // ===== Active Stages =====
    /// The page is being requested
    Fetching,

    /// The response body is being parsed into a document
    Parsing,

    /// Extracted links are being bucketed
    Classifying,

    // ===== Terminal Stages =====
    /// A record was produced
    Assembled,

    /// The scan was abandoned; no record is produced
    Failed,
}

impl ScanStage {
    /// Returns true if this is a terminal stage
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Assembled | Self::Failed)
    }

    /// Returns true if this stage represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Assembled)
    }

    /// Checks whether moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: ScanStage) -> bool {
        match (self, next) {
            (Self::Fetching, Self::Parsing) => true,
            (Self::Parsing, Self::Classifying) => true,
            (Self::Classifying, Self::Assembled) => true,
            (from, Self::Failed) => !from.is_terminal(),
            _ => false,
        }
    }

    /// Lowercase label used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetching => "fetching",
            Self::Parsing => "parsing",
            Self::Classifying => "classifying",
            Self::Assembled => "assembled",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ScanStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-scan stage tracker; lives for exactly one scan call
#[derive(Debug)]
pub struct StageTracker {
    url: String,
    stage: ScanStage,
}

impl StageTracker {
    /// Starts tracking a scan in the `Fetching` stage
    pub fn start(url: &str) -> Self {
        tracing::trace!("{}: {}", url, ScanStage::Fetching);
        Self {
            url: url.to_string(),
            stage: ScanStage::Fetching,
        }
    }

    /// Returns the current stage
    pub fn stage(&self) -> ScanStage {
        self.stage
    }

    /// Advances to `next`, rejecting illegal transitions
    pub fn advance(&mut self, next: ScanStage) -> Result<(), ScanError> {
        if !self.stage.can_transition_to(next) {
            return Err(ScanError::InvalidTransition {
                from: self.stage,
                to: next,
            });
        }

        tracing::trace!("{}: {} -> {}", self.url, self.stage, next);
        self.stage = next;
        Ok(())
    }

    /// Marks the scan as failed; a no-op once terminal
    pub fn fail(&mut self) {
        if !self.stage.is_terminal() {
            tracing::trace!("{}: {} -> {}", self.url, self.stage, ScanStage::Failed);
            self.stage = ScanStage::Failed;
        }
    }
}
