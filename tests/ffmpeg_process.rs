//! Subprocess tests for `FfmpegEngine`.
//!
//! A small shell script stands in for ffmpeg so exit-status handling,
//! stderr capture, argument passing and timeouts are exercised against a
//! real child process. Unix only.
//!
//! A smoke test against the real ffmpeg binary runs when `FFMPEG_E2E` is set:
//!   FFMPEG_E2E=1 cargo test --test ffmpeg_process -- --nocapture

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tokio::sync::{Mutex, MutexGuard};
use video2audio::{
    convert, convert_batch, AudioFormat, ConversionConfig, ConversionOutcome, FailureReason,
    Quality,
};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Writing a script while another test forks can make exec fail with
/// ETXTBSY, so tests that create scripts run one at a time.
static SERIAL: Mutex<()> = Mutex::const_new(());

async fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().await
}

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Fake ffmpeg: writes its last argument, fails on inputs named `*corrupt*`.
fn fake_ffmpeg(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "fake-ffmpeg",
        r#"for arg; do
  case "$arg" in
    *corrupt*) echo "$arg: Invalid data found when processing input" >&2; exit 1 ;;
  esac
done
for last; do :; done
printf 'fake audio' > "$last"
"#,
    )
}

fn video(dir: &Path, name: &str) -> PathBuf {
    let p = dir.join(name);
    std::fs::write(&p, b"video bytes").unwrap();
    p
}

fn config(engine: &Path) -> ConversionConfig {
    ConversionConfig::builder().engine_path(engine).build().unwrap()
}

// ── Fake engine tests ────────────────────────────────────────────────────────

#[tokio::test]
async fn zero_exit_is_success_and_output_exists() {
    let _guard = serial().await;
    let tools = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    let engine = fake_ffmpeg(tools.path());
    let input = video(work.path(), "clip.mp4");
    let output = work.path().join("out/clip.mp3");

    let outcome = convert(&input, &output, &config(&engine)).await;

    assert_eq!(outcome, ConversionOutcome::Success);
    assert_eq!(std::fs::read(&output).unwrap(), b"fake audio");
}

#[tokio::test]
async fn nonzero_exit_captures_stderr() {
    let _guard = serial().await;
    let tools = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    let engine = fake_ffmpeg(tools.path());
    let input = video(work.path(), "corrupt.mkv");

    let outcome = convert(&input, work.path().join("corrupt.mp3"), &config(&engine)).await;

    match outcome {
        ConversionOutcome::Failure(FailureReason::EngineExecution { detail }) => {
            assert!(detail.contains("exit status: 1"), "got: {detail}");
            assert!(detail.contains("Invalid data found"), "got: {detail}");
        }
        other => panic!("expected EngineExecution, got {other:?}"),
    }
}

#[tokio::test]
async fn verbose_failure_detail_is_exit_status_only() {
    let _guard = serial().await;
    let tools = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    let engine = write_script(tools.path(), "noisy-ffmpeg", "echo 'to the terminal' >&2\nexit 2\n");
    let input = video(work.path(), "clip.mp4");
    let config = ConversionConfig::builder()
        .engine_path(&engine)
        .verbose(true)
        .build()
        .unwrap();

    let outcome = convert(&input, work.path().join("clip.mp3"), &config).await;

    assert_eq!(
        outcome,
        ConversionOutcome::Failure(FailureReason::EngineExecution {
            detail: "exit status: 2".into()
        })
    );
}

#[tokio::test]
async fn engine_receives_derived_arguments() {
    let _guard = serial().await;
    let tools = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    let args_file = work.path().join("args.txt");
    let engine = write_script(
        tools.path(),
        "arg-dump",
        &format!("printf '%s\\n' \"$@\" > '{}'\n", args_file.display()),
    );
    let input = video(work.path(), "movie.mkv");
    let config = ConversionConfig::builder()
        .engine_path(&engine)
        .format(AudioFormat::Wav)
        .build()
        .unwrap();

    let outcome = convert(&input, work.path().join("movie.wav"), &config).await;
    assert!(outcome.is_success());

    let args = std::fs::read_to_string(&args_file).unwrap();
    let args: Vec<&str> = args.lines().collect();
    assert!(args.contains(&"-vn"));
    assert!(args.windows(2).any(|w| w == ["-c:a", "pcm_s16le"]));
    assert!(args.windows(2).any(|w| w[0] == "-i" && w[1].ends_with("movie.mkv")));
    assert!(args.last().unwrap().ends_with("movie.wav"));
}

#[tokio::test]
async fn hung_engine_is_killed_on_timeout() {
    let _guard = serial().await;
    let tools = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    let engine = write_script(tools.path(), "hang", "exec sleep 30\n");
    let input = video(work.path(), "clip.mp4");
    let config = ConversionConfig::builder()
        .engine_path(&engine)
        .timeout_secs(1)
        .build()
        .unwrap();

    let started = std::time::Instant::now();
    let outcome = convert(&input, work.path().join("clip.mp3"), &config).await;

    assert!(started.elapsed().as_secs() < 10);
    assert!(matches!(
        outcome.reason(),
        Some(FailureReason::EngineExecution { .. })
    ));
}

#[tokio::test]
async fn non_executable_engine_is_not_found() {
    let _guard = serial().await;
    let tools = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    let engine = tools.path().join("not-executable");
    std::fs::write(&engine, "#!/bin/sh\nexit 0\n").unwrap();
    std::fs::set_permissions(&engine, std::fs::Permissions::from_mode(0o644)).unwrap();
    let input = video(work.path(), "clip.mp4");

    let outcome = convert(&input, work.path().join("clip.mp3"), &config(&engine)).await;

    assert!(matches!(
        outcome.reason(),
        Some(FailureReason::EngineNotFound { .. })
    ));
}

#[tokio::test]
async fn batch_through_subprocess_counts_partial_failure() {
    let _guard = serial().await;
    let tools = tempfile::tempdir().unwrap();
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let engine = fake_ffmpeg(tools.path());
    video(input.path(), "a.mp4");
    video(input.path(), "corrupt.MOV");
    video(input.path(), "z.webm");

    let config = ConversionConfig::builder()
        .engine_path(&engine)
        .concurrency(2)
        .build()
        .unwrap();
    let report = convert_batch(input.path(), output.path(), &config).await.unwrap();

    assert_eq!(report.success_count, 2);
    assert_eq!(report.failure_count, 1);
    assert_eq!(report.failures[0].input_path, input.path().join("corrupt.MOV"));
    assert!(output.path().join("a.mp3").is_file());
    assert!(output.path().join("z.mp3").is_file());
}

// ── Real ffmpeg (opt-in) ─────────────────────────────────────────────────────

#[tokio::test]
async fn real_ffmpeg_extracts_audio() {
    if std::env::var("FFMPEG_E2E").is_err() {
        println!("SKIP — set FFMPEG_E2E=1 to run against the installed ffmpeg");
        return;
    }
    let info = match ffmpeg_locate::detect(None) {
        Ok(info) => info,
        Err(e) => {
            println!("SKIP — {e}");
            return;
        }
    };
    println!("Using {}", info.version);

    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let sample = input.path().join("sample.MP4");
    let status = std::process::Command::new(&info.path)
        .args(["-hide_banner", "-loglevel", "error", "-y"])
        .args(["-f", "lavfi", "-i", "testsrc=duration=1:size=64x64:rate=10"])
        .args(["-f", "lavfi", "-i", "sine=frequency=440:duration=1"])
        .args(["-shortest", "-c:v", "mpeg4", "-c:a", "aac"])
        .arg(&sample)
        .status()
        .expect("ffmpeg should run");
    assert!(status.success(), "could not generate sample video");

    for format in [AudioFormat::Mp3, AudioFormat::Wav] {
        let config = ConversionConfig::builder()
            .engine_path(&info.path)
            .format(format.clone())
            .quality(Quality::Kbps128)
            .build()
            .unwrap();
        let report = convert_batch(input.path(), output.path(), &config).await.unwrap();
        assert_eq!(report.success_count, 1, "{format}: {:?}", report.failures);

        let produced = output.path().join(format!("sample.{}", format.extension()));
        assert!(std::fs::metadata(&produced).unwrap().len() > 0);
    }
}
