//! Pipeline stages for video-to-audio conversion.
//!
//! Each submodule implements exactly one step, so the policy parts
//! (which files, which paths, which ffmpeg flags) are testable without
//! ever starting a process.
//!
//! ## Data Flow
//!
//! ```text
//! discover ──▶ command ──▶ engine
//! (dir scan)   (ffmpeg args) (subprocess)
//! ```
//!
//! 1. [`discover`] — list the videos in a directory and derive each output path
//! 2. [`command`]  — map format/quality onto the ffmpeg argument vector
//! 3. [`engine`]   — run the engine once per request and classify the exit

pub mod command;
pub mod discover;
pub mod engine;
