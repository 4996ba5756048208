//! # ffmpeg-locate
//!
//! Find an installed [FFmpeg](https://ffmpeg.org/) executable and confirm it
//! actually runs, so callers can fail fast before queueing any work.
//!
//! ## How it works
//!
//! [`locate_ffmpeg`] resolves the binary in this order:
//!
//! 1. `FFMPEG_PATH` environment variable, when set and non-empty.
//! 2. `ffmpeg` (or `ffmpeg.exe`) on `PATH`, via the [`which`] crate.
//!
//! A set `FFMPEG_PATH` is never silently skipped: if it does not name an
//! existing binary the lookup fails. The `PATH` lookup is cached for the lifetime of the process. [`probe`]
//! then runs `<binary> -version` and reports the first line of its banner.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ffmpeg_locate::{is_ffmpeg_available, locate_ffmpeg, probe};
//!
//! if !is_ffmpeg_available() {
//!     eprintln!("install ffmpeg: https://ffmpeg.org/download.html");
//!     std::process::exit(1);
//! }
//!
//! let path = locate_ffmpeg().expect("located above");
//! let info = probe(&path).expect("probed above");
//! println!("{} ({})", info.version, info.path.display());
//! ```
//!
//! ## Environment variable overrides
//!
//! - `FFMPEG_PATH` — path to a specific ffmpeg binary; skips the `PATH` search.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::OnceLock;

use thiserror::Error;

// ── Public constants ─────────────────────────────────────────────────────────

/// Environment variable that overrides the `PATH` search.
pub const FFMPEG_PATH_ENV: &str = "FFMPEG_PATH";

/// Executable name searched for on `PATH`.
pub const FFMPEG_BINARY: &str = "ffmpeg";

// ── Error type ───────────────────────────────────────────────────────────────

/// Errors returned by ffmpeg-locate operations.
#[derive(Error, Debug)]
pub enum LocateError {
    /// No candidate binary exists.
    #[error("ffmpeg not found (searched: {searched})\nInstall it from https://ffmpeg.org/download.html or set FFMPEG_PATH.")]
    NotFound { searched: String },

    /// A binary exists but `-version` did not succeed.
    #[error("ffmpeg at '{path}' is not usable: {reason}")]
    ProbeFailed { path: PathBuf, reason: String },
}

/// A binary that answered `-version` successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineInfo {
    /// Absolute or caller-supplied path to the executable.
    pub path: PathBuf,
    /// First line of the `-version` banner, e.g. `ffmpeg version 7.1 ...`.
    pub version: String,
}

// ── Thread-safe singleton path cache ─────────────────────────────────────────

static PATH_LOOKUP: OnceLock<Option<PathBuf>> = OnceLock::new();

// ── Public API ───────────────────────────────────────────────────────────────

/// Resolve the ffmpeg executable from `FFMPEG_PATH` or `PATH`.
///
/// `FFMPEG_PATH` is re-read on every call; only the `PATH` search is cached.
/// A non-empty `FFMPEG_PATH` that does not name an executable is an error,
/// the same as a missing explicit path in [`locate_ffmpeg_from`].
pub fn locate_ffmpeg() -> Result<PathBuf, LocateError> {
    locate_ffmpeg_from(None)
}

/// Resolve the executable, preferring `explicit` over `FFMPEG_PATH` over `PATH`.
///
/// A requested binary (explicit, or via `FFMPEG_PATH`) is authoritative: when
/// it does not exist the result is [`LocateError::NotFound`], never whatever
/// happens to be on `PATH`.
pub fn locate_ffmpeg_from(explicit: Option<&Path>) -> Result<PathBuf, LocateError> {
    resolve(explicit, std::env::var_os(FFMPEG_PATH_ENV))
}

/// Run `<path> -version` and return the banner's first line.
pub fn probe(path: &Path) -> Result<EngineInfo, LocateError> {
    let output = Command::new(path)
        .arg("-version")
        .stdin(Stdio::null())
        .output()
        .map_err(|e| LocateError::ProbeFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(LocateError::ProbeFailed {
            path: path.to_path_buf(),
            reason: format!("`-version` exited with {}", output.status),
        });
    }

    let version = String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(|l| l.trim().to_string())
        .unwrap_or_default();

    Ok(EngineInfo {
        path: path.to_path_buf(),
        version,
    })
}

/// Locate and probe in one step.
pub fn detect(explicit: Option<&Path>) -> Result<EngineInfo, LocateError> {
    let path = locate_ffmpeg_from(explicit)?;
    probe(&path)
}

/// Returns `true` when an ffmpeg binary can be located and answers `-version`.
pub fn is_ffmpeg_available() -> bool {
    detect(None).is_ok()
}

// ── Internal helpers ─────────────────────────────────────────────────────────

fn resolve(explicit: Option<&Path>, env_value: Option<OsString>) -> Result<PathBuf, LocateError> {
    if let Some(p) = explicit {
        return requested(p, format!("'{}'", p.display()));
    }

    if let Some(raw) = env_value.filter(|v| !v.is_empty()) {
        let p = PathBuf::from(raw);
        let searched = format!("{FFMPEG_PATH_ENV}='{}'", p.display());
        return requested(&p, searched);
    }

    let found = PATH_LOOKUP.get_or_init(|| which::which(FFMPEG_BINARY).ok());
    match found {
        Some(p) => Ok(p.clone()),
        None => Err(LocateError::NotFound {
            searched: "PATH".to_string(),
        }),
    }
}

fn requested(p: &Path, searched: String) -> Result<PathBuf, LocateError> {
    if p.is_file() {
        return Ok(p.to_path_buf());
    }
    // Bare program names ("ffmpeg7") are looked up on PATH.
    if p.components().count() == 1 {
        if let Ok(found) = which::which(p) {
            return Ok(found);
        }
    }
    Err(LocateError::NotFound { searched })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // Scripts written while a sibling test forks can fail exec with ETXTBSY.
    #[cfg(unix)]
    static SCRIPTS: std::sync::Mutex<()> = std::sync::Mutex::new(());

    #[test]
    fn explicit_missing_path_is_not_found() {
        let err = locate_ffmpeg_from(Some(Path::new("/definitely/not/here/ffmpeg"))).unwrap_err();
        assert!(matches!(err, LocateError::NotFound { .. }));
        assert!(err.to_string().contains("/definitely/not/here/ffmpeg"));
    }

    #[test]
    fn stale_env_override_is_not_found() {
        let err = resolve(None, Some("/stale/ffmpeg".into())).unwrap_err();
        match err {
            LocateError::NotFound { searched } => {
                assert_eq!(searched, "FFMPEG_PATH='/stale/ffmpeg'")
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn env_override_existing_file_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("ffmpeg-from-env");
        std::fs::write(&fake, b"").unwrap();

        let found = resolve(None, Some(fake.clone().into_os_string())).unwrap();
        assert_eq!(found, fake);
    }

    #[test]
    fn explicit_path_beats_env_override() {
        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("ffmpeg");
        std::fs::write(&fake, b"").unwrap();

        let found = resolve(Some(&fake), Some("/stale/ffmpeg".into())).unwrap();
        assert_eq!(found, fake);

        let err = resolve(Some(Path::new("/stale/explicit")), Some(fake.into_os_string()))
            .unwrap_err();
        assert!(err.to_string().contains("/stale/explicit"), "got: {err}");
    }

    #[test]
    fn explicit_existing_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("ffmpeg");
        std::fs::write(&fake, b"").unwrap();

        let found = locate_ffmpeg_from(Some(&fake)).unwrap();
        assert_eq!(found, fake);
    }

    #[test]
    fn probe_missing_binary_fails() {
        let err = probe(Path::new("/definitely/not/here/ffmpeg")).unwrap_err();
        assert!(matches!(err, LocateError::ProbeFailed { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn probe_reads_first_banner_line() {
        use std::os::unix::fs::PermissionsExt;
        let _guard = SCRIPTS.lock().unwrap_or_else(|e| e.into_inner());

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-ffmpeg");
        std::fs::write(
            &script,
            "#!/bin/sh\necho 'ffmpeg version 9.9-test'\necho 'built with sh'\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let info = probe(&script).unwrap();
        assert_eq!(info.version, "ffmpeg version 9.9-test");
        assert_eq!(info.path, script);
    }

    #[cfg(unix)]
    #[test]
    fn probe_nonzero_exit_fails() {
        use std::os::unix::fs::PermissionsExt;
        let _guard = SCRIPTS.lock().unwrap_or_else(|e| e.into_inner());

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("broken-ffmpeg");
        std::fs::write(&script, "#!/bin/sh\nexit 3\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let err = probe(&script).unwrap_err();
        assert!(err.to_string().contains("-version"), "got: {err}");
    }
}
