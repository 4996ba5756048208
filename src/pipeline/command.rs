//! Format → ffmpeg parameter derivation.
//!
//! The mapping is closed: MP3 and WAV are re-encoded, every other format
//! copies the source audio stream untouched. The video stream is always
//! dropped (`-vn`).

use crate::config::{AudioFormat, ConversionConfig, Quality};
use serde::Serialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Everything needed to run one conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionRequest {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub format: AudioFormat,
    /// Only meaningful when `format` is [`AudioFormat::Mp3`].
    pub quality: Quality,
    pub verbose: bool,
}

/// Audio codec directive passed as `-c:a`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCodec {
    Mp3Lame,
    PcmS16Le,
    /// Pass the source stream through without re-encoding.
    Copy,
}

impl AudioCodec {
    /// Get the ffmpeg codec name.
    pub fn ffmpeg_name(&self) -> &'static str {
        match self {
            AudioCodec::Mp3Lame => "libmp3lame",
            AudioCodec::PcmS16Le => "pcm_s16le",
            AudioCodec::Copy => "copy",
        }
    }
}

impl ConversionRequest {
    /// Build a request from the run-wide config.
    pub fn new(
        input_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        config: &ConversionConfig,
    ) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            format: config.format.clone(),
            quality: config.quality,
            verbose: config.verbose,
        }
    }

    pub fn codec(&self) -> AudioCodec {
        match self.format {
            AudioFormat::Mp3 => AudioCodec::Mp3Lame,
            AudioFormat::Wav => AudioCodec::PcmS16Le,
            AudioFormat::Other(_) => AudioCodec::Copy,
        }
    }

    /// `-b:a` value, present for MP3 only.
    pub fn bitrate(&self) -> Option<&'static str> {
        match self.format {
            AudioFormat::Mp3 => Some(self.quality.as_bitrate()),
            _ => None,
        }
    }

    /// Full ffmpeg argument vector, program name excluded.
    ///
    /// `-y` makes ffmpeg overwrite an existing output instead of prompting;
    /// `-nostdin` keeps it from reading the terminal in batch runs.
    pub fn engine_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-hide_banner".into(), "-nostdin".into(), "-y".into()];

        if !self.verbose {
            args.push("-loglevel".into());
            args.push("error".into());
        }

        args.push("-i".into());
        args.push(self.input_path.clone().into_os_string());
        args.push("-vn".into());
        args.push("-c:a".into());
        args.push(self.codec().ffmpeg_name().into());

        if let Some(bitrate) = self.bitrate() {
            args.push("-b:a".into());
            args.push(bitrate.into());
        }

        args.push(output_arg(&self.output_path));
        args
    }
}

/// ffmpeg reads a leading `-` as an option, so such relative names get `./`.
fn output_arg(path: &Path) -> OsString {
    if path.as_os_str().to_string_lossy().starts_with('-') {
        Path::new(".").join(path).into_os_string()
    } else {
        path.as_os_str().to_os_string()
    }
}

/// Render an argument vector for log output.
pub fn display_args(program: &Path, args: &[OsString]) -> String {
    let mut line = program.display().to_string();
    for a in args {
        line.push(' ');
        line.push_str(&a.to_string_lossy());
    }
    line
}
