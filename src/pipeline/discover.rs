//! Input enumeration and output path derivation for batch mode.
//!
//! Only the top level of the input directory is scanned. Extensions are
//! compared case-insensitively against [`VIDEO_EXTENSIONS`], so `Movie.MP4`
//! and `clip.mkv` are both picked up, each exactly once.

use crate::config::AudioFormat;
use crate::output::WorkItem;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Container extensions treated as video inputs.
pub const VIDEO_EXTENSIONS: [&str; 7] = ["mp4", "avi", "mov", "mkv", "wmv", "flv", "webm"];

/// `true` when `path` carries one of [`VIDEO_EXTENSIONS`], in any letter case.
pub fn has_video_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| VIDEO_EXTENSIONS.iter().any(|v| v.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// List video files directly inside `dir`, sorted by path.
///
/// Sorting makes processing order reproducible across platforms; raw
/// `read_dir` order is filesystem-dependent.
pub fn discover_videos(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut videos = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        // `is_file` follows symlinks, so linked videos are included.
        if has_video_extension(&path) && path.is_file() {
            videos.push(path);
        }
    }

    videos.sort();
    videos.dedup();
    debug!("Found {} video files in {}", videos.len(), dir.display());
    Ok(videos)
}

/// Output path for `input`: its base name with the extension swapped for
/// `format`'s, placed in `output_dir`.
///
/// Only the last extension is replaced (`show.s01.mkv` → `show.s01.wav`).
/// Two inputs that differ only by extension (`a.mp4`, `a.MOV`) map to the
/// same output; the later conversion overwrites the earlier one.
pub fn derive_output_path(input: &Path, output_dir: &Path, format: &AudioFormat) -> PathBuf {
    let mut name: OsString = input
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_default();
    name.push(".");
    name.push(format.extension());
    output_dir.join(name)
}

/// Enumerate `input_dir` and pair every video with its derived output path.
pub fn plan_batch(
    input_dir: &Path,
    output_dir: &Path,
    format: &AudioFormat,
) -> io::Result<Vec<WorkItem>> {
    Ok(discover_videos(input_dir)?
        .into_iter()
        .map(|input| {
            let output = derive_output_path(&input, output_dir, format);
            WorkItem::new(input, output)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"not really a video").unwrap();
    }

    #[test]
    fn extension_match_ignores_case() {
        assert!(has_video_extension(Path::new("a.mp4")));
        assert!(has_video_extension(Path::new("a.MP4")));
        assert!(has_video_extension(Path::new("a.Mp4")));
        assert!(has_video_extension(Path::new("/x/y/clip.WebM")));
        assert!(!has_video_extension(Path::new("a.mp3")));
        assert!(!has_video_extension(Path::new("mp4")));
        assert!(!has_video_extension(Path::new(".mkv")));
    }

    #[test]
    fn mixed_case_extensions_are_each_counted_once() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.MP4");
        touch(dir.path(), "b.mp4");
        touch(dir.path(), "c.Mp4");

        let found = discover_videos(dir.path()).unwrap();
        assert_eq!(found.len(), 3);
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.MP4", "b.mp4", "c.Mp4"]);
    }

    #[test]
    fn scan_is_top_level_only_and_skips_non_videos() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "keep.mkv");
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "song.mp3");
        fs::create_dir(dir.path().join("nested")).unwrap();
        touch(&dir.path().join("nested"), "deep.mp4");
        fs::create_dir(dir.path().join("folder.mp4")).unwrap();

        let found = discover_videos(dir.path()).unwrap();
        assert_eq!(found, vec![dir.path().join("keep.mkv")]);
    }

    #[test]
    fn empty_directory_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_videos(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn output_path_swaps_extension() {
        let out = derive_output_path(
            Path::new("/videos/movie.mkv"),
            Path::new("/out"),
            &AudioFormat::Wav,
        );
        assert_eq!(out, PathBuf::from("/out/movie.wav"));

        // Same input, same answer, every time.
        let again = derive_output_path(
            Path::new("/videos/movie.mkv"),
            Path::new("/out"),
            &AudioFormat::Wav,
        );
        assert_eq!(out, again);
    }

    #[test]
    fn output_path_keeps_inner_dots() {
        let out = derive_output_path(
            Path::new("show.s01e02.MP4"),
            Path::new("audio"),
            &AudioFormat::Mp3,
        );
        assert_eq!(out, PathBuf::from("audio/show.s01e02.mp3"));
    }

    #[test]
    fn output_path_uses_other_extension() {
        let out = derive_output_path(
            Path::new("clip.webm"),
            Path::new("/out"),
            &AudioFormat::Other("opus".into()),
        );
        assert_eq!(out, PathBuf::from("/out/clip.opus"));
    }

    #[test]
    fn extension_case_variants_collide_on_output() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.mp4");
        touch(dir.path(), "a.MOV");

        let items = plan_batch(dir.path(), Path::new("/out"), &AudioFormat::Mp3).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].output_path, items[1].output_path);
    }
}
