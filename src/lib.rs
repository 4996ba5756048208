//! # video2audio
//!
//! Extract the audio track from video files by driving an installed
//! [FFmpeg](https://ffmpeg.org/) binary.
//!
//! The crate does no decoding of its own. It decides *what* to run: which
//! files to pick up from a directory, where each audio file goes, and which
//! codec flags a format needs. Then it runs ffmpeg once per file and
//! accounts for every success and failure.
//!
//! ## Pipeline Overview
//!
//! ```text
//! input dir / file
//!  │
//!  ├─ 1. Discover  top-level *.mp4/avi/mov/mkv/wmv/flv/webm, any letter case
//!  ├─ 2. Plan      movie.mkv ──▶ <out>/movie.<format>
//!  ├─ 3. Command   mp3 → libmp3lame -b:a <quality>, wav → pcm_s16le, other → copy
//!  ├─ 4. Engine    ffmpeg -i <in> -vn -c:a … <out>   (one process per item)
//!  └─ 5. Report    BatchReport { success_count, failure_count, failures }
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use video2audio::{convert_batch, AudioFormat, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder()
//!         .format(AudioFormat::Wav)
//!         .build()?;
//!     let report = convert_batch("videos/", "audio/", &config).await?;
//!     println!("{} converted, {} failed", report.success_count, report.failure_count);
//!     for failed in &report.failures {
//!         eprintln!("{}: {}", failed.input_path.display(), failed.reason);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `video2audio` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! video2audio = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{AudioFormat, ConversionConfig, ConversionConfigBuilder, Quality};
pub use convert::{convert, convert_batch, convert_batch_sync, convert_one, convert_one_sync};
pub use error::{FailureReason, Video2AudioError};
pub use output::{BatchReport, ConversionOutcome, FailedItem, WorkItem};
pub use pipeline::command::{AudioCodec, ConversionRequest};
pub use pipeline::discover::{
    derive_output_path, discover_videos, has_video_extension, plan_batch, VIDEO_EXTENSIONS,
};
pub use pipeline::engine::{AudioEngine, FfmpegEngine};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
