//! Conversion entry points.
//!
//! [`convert`] is the conversion unit: one input, one output, one engine
//! invocation, one [`ConversionOutcome`]. [`convert_one`] and
//! [`convert_batch`] sit on top of it for single-file and directory mode.
//!
//! Batch mode is best effort. A failed item is recorded in the
//! [`BatchReport`] and the run moves on; only problems that make every item
//! fail (no engine, unusable input or output directory) end the run early
//! with an `Err`.

use crate::config::ConversionConfig;
use crate::error::{FailureReason, Video2AudioError};
use crate::output::{BatchReport, ConversionOutcome, WorkItem};
use crate::pipeline::command::ConversionRequest;
use crate::pipeline::discover;
use crate::pipeline::engine::{AudioEngine, FfmpegEngine};
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Convert one video file into one audio file.
///
/// Checks that `input` is an existing regular file and creates the parent
/// directory of `output` before ffmpeg is started. On failure ffmpeg may
/// leave a partial file at `output`; it is not removed.
pub async fn convert(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &ConversionConfig,
) -> ConversionOutcome {
    let request = ConversionRequest::new(input.as_ref(), output.as_ref(), config);

    if let Err(reason) = prepare(&request).await {
        return reason.into();
    }

    let engine = match resolve_engine(config) {
        Ok(engine) => engine,
        Err(e) => {
            warn!("{e}");
            let program = config
                .engine_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| ffmpeg_locate::FFMPEG_BINARY.to_string());
            return FailureReason::EngineNotFound { program }.into();
        }
    };

    execute(engine.as_ref(), &request, config.timeout_secs).await
}

/// Single-file mode.
///
/// When `output` is an existing directory the audio file is placed inside
/// it, named after the input the same way batch mode names its outputs.
pub async fn convert_one(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &ConversionConfig,
) -> ConversionOutcome {
    let input = input.as_ref();
    let output = single_output_path(input, output.as_ref(), config).await;

    if let Some(ref cb) = config.progress_callback {
        cb.on_item_start(1, 1, input);
    }

    let outcome = if is_regular_file(input).await {
        convert(input, &output, config).await
    } else {
        FailureReason::InputMissing {
            path: input.to_path_buf(),
        }
        .into()
    };

    report_item(config, 1, 1, &WorkItem::new(input, output), &outcome);
    outcome
}

/// Directory mode: convert every video directly inside `input_dir`.
///
/// # Errors
/// Returns `Err` only for problems that stop the batch before it starts:
/// - no usable engine ([`Video2AudioError::EngineUnavailable`])
/// - `input_dir` missing ([`Video2AudioError::InputMissing`]) or not a
///   directory ([`Video2AudioError::NotADirectory`])
/// - `output_dir` cannot be created
///
/// A directory without videos is not an error; it yields an empty report.
pub async fn convert_batch(
    input_dir: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<BatchReport, Video2AudioError> {
    let start = Instant::now();
    let input_dir = input_dir.as_ref();
    let output_dir = output_dir.as_ref();

    // ── Step 1: Engine ───────────────────────────────────────────────────
    let engine = resolve_engine(config).map_err(|e| Video2AudioError::EngineUnavailable {
        reason: e.to_string(),
    })?;

    // ── Step 2: Validate directories ─────────────────────────────────────
    match tokio::fs::metadata(input_dir).await {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(Video2AudioError::NotADirectory {
                path: input_dir.to_path_buf(),
            })
        }
        Err(_) => {
            return Err(Video2AudioError::InputMissing {
                path: input_dir.to_path_buf(),
            })
        }
    }

    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|e| Video2AudioError::OutputDirUnwritable {
            path: output_dir.to_path_buf(),
            source: e,
        })?;

    // ── Step 3: Enumerate ────────────────────────────────────────────────
    // Directory listing is blocking I/O; keep it off the async workers.
    let (dir, out, format) = (
        input_dir.to_path_buf(),
        output_dir.to_path_buf(),
        config.format.clone(),
    );
    let items = tokio::task::spawn_blocking(move || discover::plan_batch(&dir, &out, &format))
        .await
        .map_err(|e| Video2AudioError::Internal(format!("Enumeration task panicked: {}", e)))?
        .map_err(|e| Video2AudioError::ReadDirFailed {
            path: input_dir.to_path_buf(),
            source: e,
        })?;
    let total = items.len();

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    if items.is_empty() {
        warn!("No video files found in {}", input_dir.display());
        if let Some(ref cb) = config.progress_callback {
            cb.on_batch_complete(0, 0);
        }
        return Ok(BatchReport {
            duration_ms: start.elapsed().as_millis() as u64,
            ..BatchReport::default()
        });
    }

    info!(
        "Starting batch conversion: {} files from {} ({} at a time)",
        total,
        input_dir.display(),
        config.concurrency
    );

    // ── Step 4: Convert ──────────────────────────────────────────────────
    let mut outcomes: Vec<(usize, ConversionOutcome)> =
        stream::iter(items.iter().enumerate().map(|(idx, item)| {
            let engine = Arc::clone(&engine);
            async move {
                let index = idx + 1;
                if let Some(ref cb) = config.progress_callback {
                    cb.on_item_start(index, total, &item.input_path);
                }
                let request = ConversionRequest::new(&item.input_path, &item.output_path, config);
                let outcome = match prepare(&request).await {
                    Ok(()) => execute(engine.as_ref(), &request, config.timeout_secs).await,
                    Err(reason) => reason.into(),
                };
                report_item(config, index, total, item, &outcome);
                (idx, outcome)
            }
        }))
        .buffer_unordered(config.concurrency)
        .collect()
        .await;

    // ── Step 5: Aggregate in enumeration order ───────────────────────────
    outcomes.sort_by_key(|(idx, _)| *idx);
    let mut report = BatchReport::default();
    for (idx, outcome) in outcomes {
        report.record(&items[idx], outcome);
    }
    report.duration_ms = start.elapsed().as_millis() as u64;

    info!(
        "Batch conversion finished: {} succeeded, {} failed, {}ms",
        report.success_count, report.failure_count, report.duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(total, report.success_count);
    }

    Ok(report)
}

/// Synchronous wrapper around [`convert_one`].
///
/// Creates a temporary tokio runtime internally. A runtime that cannot be
/// built is reported as an engine failure.
pub fn convert_one_sync(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &ConversionConfig,
) -> ConversionOutcome {
    match tokio::runtime::Runtime::new() {
        Ok(rt) => rt.block_on(convert_one(input, output, config)),
        Err(e) => FailureReason::EngineExecution {
            detail: format!("failed to create tokio runtime: {e}"),
        }
        .into(),
    }
}

/// Synchronous wrapper around [`convert_batch`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_batch_sync(
    input_dir: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<BatchReport, Video2AudioError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Video2AudioError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert_batch(input_dir, output_dir, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Resolve the engine, from most-specific to least-specific:
///
/// 1. **Pre-built engine** (`config.engine`), used as-is.
/// 2. **Explicit binary** (`config.engine_path`).
/// 3. **`FFMPEG_PATH` / `PATH`** via [`ffmpeg_locate`].
fn resolve_engine(
    config: &ConversionConfig,
) -> Result<Arc<dyn AudioEngine>, ffmpeg_locate::LocateError> {
    if let Some(ref engine) = config.engine {
        return Ok(Arc::clone(engine));
    }

    let program = ffmpeg_locate::locate_ffmpeg_from(config.engine_path.as_deref())?;
    debug!("Using ffmpeg at {}", program.display());
    Ok(Arc::new(FfmpegEngine::new(program)))
}

/// Pre-flight checks shared by every conversion.
async fn prepare(request: &ConversionRequest) -> Result<(), FailureReason> {
    if !is_regular_file(&request.input_path).await {
        return Err(FailureReason::InputMissing {
            path: request.input_path.clone(),
        });
    }

    if let Some(parent) = request.output_path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                FailureReason::OutputDirUnwritable {
                    path: parent.to_path_buf(),
                    detail: e.to_string(),
                }
            })?;
        }
    }

    Ok(())
}

/// Run the engine, enforcing the optional per-conversion timeout.
async fn execute(
    engine: &dyn AudioEngine,
    request: &ConversionRequest,
    timeout_secs: Option<u64>,
) -> ConversionOutcome {
    let run = engine.run(request);
    let result = match timeout_secs {
        Some(secs) => match tokio::time::timeout(Duration::from_secs(secs), run).await {
            Ok(result) => result,
            Err(_) => Err(FailureReason::EngineExecution {
                detail: format!("{} killed after {}s timeout", engine.name(), secs),
            }),
        },
        None => run.await,
    };

    match result {
        Ok(()) => ConversionOutcome::Success,
        Err(reason) => reason.into(),
    }
}

async fn is_regular_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

async fn single_output_path(input: &Path, output: &Path, config: &ConversionConfig) -> PathBuf {
    let is_dir = tokio::fs::metadata(output)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);
    if is_dir {
        discover::derive_output_path(input, output, &config.format)
    } else {
        output.to_path_buf()
    }
}

/// Log and forward one item's outcome.
fn report_item(
    config: &ConversionConfig,
    index: usize,
    total: usize,
    item: &WorkItem,
    outcome: &ConversionOutcome,
) {
    match outcome {
        ConversionOutcome::Success => {
            info!(
                "Converted {} -> {}",
                item.input_path.display(),
                item.output_path.display()
            );
            if let Some(ref cb) = config.progress_callback {
                cb.on_item_complete(index, total, &item.input_path, &item.output_path);
            }
        }
        ConversionOutcome::Failure(reason) => {
            warn!("Failed {}: {}", item.input_path.display(), reason);
            if let Some(ref cb) = config.progress_callback {
                cb.on_item_error(index, total, &item.input_path, reason);
            }
        }
    }
}
