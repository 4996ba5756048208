//! Result types produced by a conversion run.

use crate::error::{FailureReason, Video2AudioError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One video mapped to the audio file it should become.
///
/// Created during enumeration and consumed by exactly one conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
}

impl WorkItem {
    pub fn new(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
        }
    }
}

/// Result of converting a single work item.
///
/// A failed item is an ordinary value that the batch records and moves
/// past, so this is not a `Result`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
#[must_use = "a failed conversion is only visible through its outcome"]
pub enum ConversionOutcome {
    Success,
    Failure(FailureReason),
}

impl ConversionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ConversionOutcome::Success)
    }

    /// The failure reason, if any.
    pub fn reason(&self) -> Option<&FailureReason> {
        match self {
            ConversionOutcome::Success => None,
            ConversionOutcome::Failure(r) => Some(r),
        }
    }
}

impl From<FailureReason> for ConversionOutcome {
    fn from(reason: FailureReason) -> Self {
        ConversionOutcome::Failure(reason)
    }
}

/// A failed batch entry, kept so callers can tell which inputs failed and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedItem {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub reason: FailureReason,
}

/// Aggregate result of a batch run.
///
/// `failures` follows the enumeration order of the inputs, also when items
/// were converted concurrently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub success_count: usize,
    pub failure_count: usize,
    pub failures: Vec<FailedItem>,
    /// Wall-clock duration of the whole batch.
    pub duration_ms: u64,
}

impl BatchReport {
    /// Fold one item's outcome into the running totals.
    pub fn record(&mut self, item: &WorkItem, outcome: ConversionOutcome) {
        match outcome {
            ConversionOutcome::Success => self.success_count += 1,
            ConversionOutcome::Failure(reason) => {
                self.failure_count += 1;
                self.failures.push(FailedItem {
                    input_path: item.input_path.clone(),
                    output_path: item.output_path.clone(),
                    reason,
                });
            }
        }
    }

    /// Number of items attempted.
    pub fn total(&self) -> usize {
        self.success_count + self.failure_count
    }

    /// `true` when no item failed. An empty batch counts as success.
    pub fn is_success(&self) -> bool {
        self.failure_count == 0
    }

    /// Turn any item failure into [`Video2AudioError::PartialFailure`].
    pub fn into_result(self) -> Result<BatchReport, Video2AudioError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Video2AudioError::PartialFailure {
                succeeded: self.success_count,
                failed: self.failure_count,
                total: self.total(),
            })
        }
    }
}
