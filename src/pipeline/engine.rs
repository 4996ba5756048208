//! The external engine seam.
//!
//! [`AudioEngine`] is the only place a conversion touches the outside world.
//! [`FfmpegEngine`] runs the real binary; tests and embedders can supply any
//! other implementation through
//! [`crate::config::ConversionConfigBuilder::engine`].
//!
//! ## Outcome classification
//!
//! Success is decided by exit status alone. ffmpeg's output is never parsed:
//! in quiet mode stderr is captured and attached to the failure as detail,
//! in verbose mode both streams go straight to the terminal.

use super::command::{display_args, ConversionRequest};
use crate::error::FailureReason;
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Longest stderr excerpt kept in [`FailureReason::EngineExecution`].
const MAX_DETAIL_BYTES: usize = 2000;

/// Something that turns one [`ConversionRequest`] into an audio file.
///
/// Implementations must be `Send + Sync`; batch mode shares one engine
/// across all worker slots.
#[async_trait]
pub trait AudioEngine: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Run one conversion to completion.
    ///
    /// Returns [`FailureReason::EngineNotFound`] when the engine cannot be
    /// started and [`FailureReason::EngineExecution`] for any abnormal exit.
    async fn run(&self, request: &ConversionRequest) -> Result<(), FailureReason>;
}

/// Runs the ffmpeg binary as a child process, one per request.
#[derive(Debug, Clone)]
pub struct FfmpegEngine {
    program: PathBuf,
}

impl FfmpegEngine {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

#[async_trait]
impl AudioEngine for FfmpegEngine {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn run(&self, request: &ConversionRequest) -> Result<(), FailureReason> {
        let args = request.engine_args();
        debug!("Running: {}", display_args(&self.program, &args));

        let mut cmd = Command::new(&self.program);
        cmd.args(&args).stdin(Stdio::null()).kill_on_drop(true);
        if request.verbose {
            cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        } else {
            cmd.stdout(Stdio::null()).stderr(Stdio::piped());
        }

        let child = cmd.spawn().map_err(|e| spawn_failure(&self.program, e))?;

        // Dropping this future (e.g. on timeout) kills the child.
        let output = child
            .wait_with_output()
            .await
            .map_err(|e| FailureReason::EngineExecution {
                detail: format!("failed waiting for ffmpeg: {e}"),
            })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let excerpt = tail(stderr.trim(), MAX_DETAIL_BYTES);
        let detail = if excerpt.is_empty() {
            output.status.to_string()
        } else {
            format!("{}: {}", output.status, excerpt)
        };
        Err(FailureReason::EngineExecution { detail })
    }
}

fn spawn_failure(program: &Path, e: io::Error) -> FailureReason {
    match e.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
            FailureReason::EngineNotFound {
                program: program.display().to_string(),
            }
        }
        _ => FailureReason::EngineExecution {
            detail: format!("failed to start '{}': {e}", program.display()),
        },
    }
}

/// Last `max` bytes of `s`, cut on a char boundary.
fn tail(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut start = s.len() - max;
    while !s.is_char_boundary(start) {
        start += 1;
    }
    &s[start..]
}
