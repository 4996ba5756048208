//! Configuration types for video-to-audio conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The same config drives single-file
//! and batch runs, so a batch is exactly "the single-file conversion, once
//! per discovered video".

use crate::error::Video2AudioError;
use crate::pipeline::engine::AudioEngine;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// Configuration for one conversion run.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use video2audio::{AudioFormat, ConversionConfig, Quality};
///
/// let config = ConversionConfig::builder()
///     .format(AudioFormat::Mp3)
///     .quality(Quality::Kbps320)
///     .concurrency(4)
///     .build()
///     .unwrap();
/// assert_eq!(config.format.extension(), "mp3");
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Target audio format. Default: [`AudioFormat::Mp3`].
    pub format: AudioFormat,

    /// MP3 bitrate. Ignored for every other format. Default: 192k.
    pub quality: Quality,

    /// Let ffmpeg write to the terminal instead of capturing its output. Default: false.
    ///
    /// When set, failure detail only contains the exit status because the
    /// engine's own diagnostics have already been shown live.
    pub verbose: bool,

    /// Number of ffmpeg processes allowed to run at once in batch mode. Default: 1.
    ///
    /// Each worker slot owns exactly one engine process. 1 keeps the run
    /// strictly sequential.
    pub concurrency: usize,

    /// Kill a single conversion after this many seconds. Default: None.
    pub timeout_secs: Option<u64>,

    /// Explicit ffmpeg binary. If None, resolved via `FFMPEG_PATH` / `PATH`.
    pub engine_path: Option<PathBuf>,

    /// Pre-constructed engine. Takes precedence over `engine_path`.
    pub engine: Option<Arc<dyn AudioEngine>>,

    /// Receives per-item outcome events. Default: None.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            format: AudioFormat::default(),
            quality: Quality::default(),
            verbose: false,
            concurrency: 1,
            timeout_secs: None,
            engine_path: None,
            engine: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("format", &self.format)
            .field("quality", &self.quality)
            .field("verbose", &self.verbose)
            .field("concurrency", &self.concurrency)
            .field("timeout_secs", &self.timeout_secs)
            .field("engine_path", &self.engine_path)
            .field("engine", &self.engine.as_ref().map(|e| e.name().to_string()))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn format(mut self, format: AudioFormat) -> Self {
        self.config.format = format;
        self
    }

    pub fn quality(mut self, quality: Quality) -> Self {
        self.config.quality = quality;
        self
    }

    pub fn verbose(mut self, v: bool) -> Self {
        self.config.verbose = v;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = Some(secs);
        self
    }

    pub fn engine_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.engine_path = Some(path.into());
        self
    }

    pub fn engine(mut self, engine: Arc<dyn AudioEngine>) -> Self {
        self.config.engine = Some(engine);
        self
    }

    /// Attach a callback that receives an event for every item of a run.
    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Video2AudioError> {
        let c = &self.config;
        if let AudioFormat::Other(ext) = &c.format {
            if !is_valid_extension(ext) {
                return Err(Video2AudioError::InvalidConfig(format!(
                    "output extension must be non-empty ASCII alphanumeric, got {ext:?}"
                )));
            }
        }
        if c.timeout_secs == Some(0) {
            return Err(Video2AudioError::InvalidConfig(
                "timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

fn is_valid_extension(ext: &str) -> bool {
    !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric())
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Output audio format.
///
/// MP3 and WAV are re-encoded. Anything else copies the source audio stream
/// into a container chosen by the extension; ffmpeg rejects the result when
/// the source codec does not fit that container.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// MPEG-1 Layer III via libmp3lame, bitrate from [`Quality`]. (default)
    #[default]
    Mp3,
    /// 16-bit little-endian linear PCM.
    Wav,
    /// Pass-through of the source audio stream, stored under this extension.
    Other(String),
}

impl AudioFormat {
    /// Map a user-supplied name onto a format. Never fails.
    ///
    /// `"mp3"` and `"wav"` are matched case-insensitively, with or without a
    /// leading dot; everything else becomes [`AudioFormat::Other`].
    pub fn parse(s: &str) -> Self {
        let s = s.trim().trim_start_matches('.').to_ascii_lowercase();
        match s.as_str() {
            "mp3" => AudioFormat::Mp3,
            "wav" => AudioFormat::Wav,
            _ => AudioFormat::Other(s),
        }
    }

    /// File extension (without the dot) for derived output paths.
    pub fn extension(&self) -> &str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Wav => "wav",
            AudioFormat::Other(ext) => ext,
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// MP3 bitrate choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Quality {
    #[serde(rename = "128k")]
    Kbps128,
    /// (default)
    #[default]
    #[serde(rename = "192k")]
    Kbps192,
    #[serde(rename = "256k")]
    Kbps256,
    #[serde(rename = "320k")]
    Kbps320,
}

impl Quality {
    pub const ALL: [Quality; 4] = [
        Quality::Kbps128,
        Quality::Kbps192,
        Quality::Kbps256,
        Quality::Kbps320,
    ];

    /// Bitrate as ffmpeg expects it for `-b:a`.
    pub fn as_bitrate(&self) -> &'static str {
        match self {
            Quality::Kbps128 => "128k",
            Quality::Kbps192 => "192k",
            Quality::Kbps256 => "256k",
            Quality::Kbps320 => "320k",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_bitrate())
    }
}

impl FromStr for Quality {
    type Err = Video2AudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        Quality::ALL
            .into_iter()
            .find(|q| q.as_bitrate() == s)
            .ok_or_else(|| {
                Video2AudioError::InvalidConfig(format!(
                    "quality must be one of 128k, 192k, 256k, 320k; got {s:?}"
                ))
            })
    }
}
