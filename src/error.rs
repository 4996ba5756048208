//! Error types for the video2audio library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Video2AudioError`] — **Fatal**: the run cannot start at all (no
//!   engine, batch input is not a directory, output directory cannot be
//!   created). Returned as `Err(Video2AudioError)` from the batch entry points.
//!
//! * [`FailureReason`] — **Non-fatal**: one video failed to convert but the
//!   rest of the batch is unaffected. Carried inside
//!   [`crate::output::ConversionOutcome::Failure`] so callers can inspect
//!   which inputs failed and why instead of losing the whole run.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the video2audio library.
///
/// Per-item failures use [`FailureReason`] and are stored in
/// [`crate::output::BatchReport`] rather than propagated here.
#[derive(Debug, Error)]
pub enum Video2AudioError {
    // ── Engine errors ─────────────────────────────────────────────────────
    /// No usable ffmpeg binary; nothing in the run could succeed.
    #[error("FFmpeg is not installed or not usable: {reason}\nInstall it from https://ffmpeg.org/download.html or pass --ffmpeg <PATH>.")]
    EngineUnavailable { reason: String },

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input path does not exist.
    #[error("Input not found: '{path}'\nCheck the path exists and is readable.")]
    InputMissing { path: PathBuf },

    /// Batch mode was given something that is not a directory.
    #[error("Input must be a directory in batch mode: '{path}'")]
    NotADirectory { path: PathBuf },

    /// The input directory exists but could not be listed.
    #[error("Failed to read directory '{path}': {source}")]
    ReadDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Output directory is missing and could not be created.
    #[error("Cannot create output directory '{path}': {source}")]
    OutputDirUnwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Some items succeeded but at least one failed.
    ///
    /// Returned by [`crate::output::BatchReport::into_result`] when the
    /// caller wants to treat any item failure as an error.
    #[error("{failed}/{total} conversions failed")]
    PartialFailure {
        succeeded: usize,
        failed: usize,
        total: usize,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Why a single conversion failed.
///
/// Stored inside [`crate::output::ConversionOutcome::Failure`]. The batch
/// carries on after any of these.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    /// The engine binary could not be spawned.
    #[error("ffmpeg could not be started ('{program}')")]
    EngineNotFound { program: String },

    /// The engine ran but exited abnormally, or was killed on timeout.
    #[error("ffmpeg failed: {detail}")]
    EngineExecution { detail: String },

    /// Input is not an existing regular file.
    #[error("input file does not exist: '{}'", path.display())]
    InputMissing { path: PathBuf },

    /// Parent directory of the output could not be created.
    #[error("cannot create output directory '{}': {detail}", path.display())]
    OutputDirUnwritable { path: PathBuf, detail: String },
}
