//! CLI binary for video2audio.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use video2audio::{
    convert_batch, convert_one, derive_output_path, plan_batch, AudioFormat, BatchReport,
    ConversionConfig, ConversionOutcome, ConversionProgressCallback, FailureReason,
    ProgressCallback, Quality, WorkItem,
};

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

/// Shorten a message to `max` characters for one-line display.
fn truncate(msg: &str, max: usize) -> String {
    let first_line = msg.lines().next().unwrap_or("");
    if first_line.chars().count() > max {
        let cut: String = first_line.chars().take(max - 1).collect();
        format!("{cut}\u{2026}")
    } else {
        first_line.to_string()
    }
}

fn file_name(p: &Path) -> String {
    p.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| p.display().to_string())
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live bar plus one log line per video.
/// Works when items complete out of order (`--jobs` > 1).
struct CliProgressCallback {
    bar: ProgressBar,
    start_times: Mutex<HashMap<usize, Instant>>,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Scanning…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
            errors: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Converting");
        self.bar.reset_eta();
    }

    fn elapsed_secs(&self, index: usize) -> f64 {
        self.start_times
            .lock()
            .map(|mut m| m.remove(&index))
            .ok()
            .flatten()
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total: usize) {
        if total == 0 {
            return;
        }
        self.activate_bar(total);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Extracting audio from {total} videos…"))
        ));
    }

    fn on_item_start(&self, index: usize, _total: usize, input: &Path) {
        if let Ok(mut m) = self.start_times.lock() {
            m.insert(index, Instant::now());
        }
        self.bar.set_message(file_name(input));
    }

    fn on_item_complete(&self, index: usize, total: usize, input: &Path, output: &Path) {
        let secs = self.elapsed_secs(index);
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {} → {}  {}",
            green("✓"),
            index,
            total,
            file_name(input),
            file_name(output),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_item_error(&self, index: usize, total: usize, input: &Path, reason: &FailureReason) {
        let secs = self.elapsed_secs(index);
        self.errors.fetch_add(1, Ordering::SeqCst);

        let msg = truncate(&reason.to_string(), 80);

        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}  {}",
            red("✗"),
            index,
            total,
            file_name(input),
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total: usize, success_count: usize) {
        self.bar.finish_and_clear();
        if total == 0 {
            return;
        }
        let failed = self.errors.load(Ordering::SeqCst);

        if failed == 0 {
            eprintln!(
                "{} {} files converted successfully",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} files converted  ({} failed)",
                if failed == total { red("✘") } else { cyan("⚠") },
                bold(&success_count.to_string()),
                total,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Single file to MP3 (default 192k)
  video2audio -i movie.mp4 -o movie.mp3

  # Single file to WAV
  video2audio -i movie.mkv -o movie.wav -f wav

  # Every video in a folder, highest MP3 quality
  video2audio -b -i videos/ -o audio/ -q 320k

  # Four ffmpeg processes at once, JSON report on stdout
  video2audio -b -i videos/ -o audio/ -j 4 --json

  # Show what would be converted without running ffmpeg
  video2audio -b -i videos/ -o audio/ --dry-run

RECOGNISED VIDEO EXTENSIONS (any letter case):
  mp4 avi mov mkv wmv flv webm

EXIT STATUS:
  0  everything converted
  1  ffmpeg unavailable, invalid input/output path, or at least one failure

ENVIRONMENT VARIABLES:
  FFMPEG_PATH             Use this ffmpeg binary instead of searching PATH
  RUST_LOG                Override the log filter (e.g. video2audio=debug)
"#;

/// Extract audio tracks from video files with FFmpeg.
#[derive(Parser, Debug)]
#[command(
    name = "video2audio",
    version,
    about = "Extract audio tracks from video files with FFmpeg",
    long_about = "Extract the audio track of a video file, or of every video in a folder, \
into MP3 or WAV. The conversion itself is done by an installed ffmpeg binary.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Video file, or folder of videos with --batch.
    #[arg(short, long)]
    input: PathBuf,

    /// Audio file, or output folder with --batch.
    #[arg(short, long)]
    output: PathBuf,

    /// Output audio format.
    #[arg(short, long, env = "VIDEO2AUDIO_FORMAT", value_enum, default_value = "mp3")]
    format: FormatArg,

    /// MP3 bitrate (ignored for wav).
    #[arg(short, long, env = "VIDEO2AUDIO_QUALITY", value_enum, default_value = "192k")]
    quality: QualityArg,

    /// Convert every video in the --input folder.
    #[arg(short, long)]
    batch: bool,

    /// Show ffmpeg's own output and DEBUG-level logs.
    #[arg(short, long, env = "VIDEO2AUDIO_VERBOSE")]
    verbose: bool,

    /// Number of ffmpeg processes to run at once in batch mode.
    #[arg(short, long, env = "VIDEO2AUDIO_JOBS", default_value_t = 1,
          value_parser = clap::value_parser!(u16).range(1..=64))]
    jobs: u16,

    /// Kill a single conversion after this many seconds.
    #[arg(long, env = "VIDEO2AUDIO_TIMEOUT",
          value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Path to the ffmpeg binary.
    #[arg(long, env = "FFMPEG_PATH")]
    ffmpeg: Option<PathBuf>,

    /// Print the result as JSON on stdout.
    #[arg(long, env = "VIDEO2AUDIO_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "VIDEO2AUDIO_NO_PROGRESS")]
    no_progress: bool,

    /// Suppress all output except errors.
    #[arg(long, env = "VIDEO2AUDIO_QUIET")]
    quiet: bool,

    /// List the planned conversions without running ffmpeg.
    #[arg(long)]
    dry_run: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Mp3,
    Wav,
}

impl From<FormatArg> for AudioFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Mp3 => AudioFormat::Mp3,
            FormatArg::Wav => AudioFormat::Wav,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum QualityArg {
    #[value(name = "128k")]
    K128,
    #[value(name = "192k")]
    K192,
    #[value(name = "256k")]
    K256,
    #[value(name = "320k")]
    K320,
}

impl From<QualityArg> for Quality {
    fn from(v: QualityArg) -> Self {
        match v {
            QualityArg::K128 => Quality::Kbps128,
            QualityArg::K192 => Quality::Kbps192,
            QualityArg::K256 => Quality::Kbps256,
            QualityArg::K320 => Quality::Kbps320,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // ffmpeg writes to the terminal in verbose mode, which would tear the
    // progress bar apart; JSON keeps stdout machine-readable.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.verbose && !cli.dry_run;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let format: AudioFormat = cli.format.into();

    // ── Dry run ──────────────────────────────────────────────────────────
    if cli.dry_run {
        let items = plan(&cli, &format)?;
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&items).context("Failed to serialise plan")?
            );
        } else {
            for item in &items {
                println!("{} -> {}", item.input_path.display(), item.output_path.display());
            }
        }
        return Ok(ExitCode::SUCCESS);
    }

    // ── Ensure ffmpeg is available ───────────────────────────────────────
    // Checked once, before anything else: without it no item can succeed.
    let engine = ffmpeg_locate::detect(cli.ffmpeg.as_deref())
        .context("FFmpeg is not installed or not usable")?;
    tracing::debug!("{} at {}", engine.version, engine.path.display());

    // ── Build config ─────────────────────────────────────────────────────
    let progress = show_progress.then(CliProgressCallback::new);

    let mut builder = ConversionConfig::builder()
        .format(format)
        .quality(cli.quality.into())
        .verbose(cli.verbose)
        .concurrency(cli.jobs as usize)
        .engine_path(engine.path);
    if let Some(secs) = cli.timeout {
        builder = builder.timeout_secs(secs);
    }
    if let Some(ref cb) = progress {
        builder = builder.progress_callback(Arc::clone(cb) as ProgressCallback);
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Run ──────────────────────────────────────────────────────────────
    let ok = if cli.batch {
        if !cli.input.is_dir() {
            anyhow::bail!(
                "Input must be a directory in batch mode: {}",
                cli.input.display()
            );
        }
        let report = convert_batch(&cli.input, &cli.output, &config)
            .await
            .context("Batch conversion failed")?;
        print_batch_report(&cli, &report, progress.is_some())?;
        report.is_success()
    } else {
        if !cli.input.is_file() {
            anyhow::bail!("Input file does not exist: {}", cli.input.display());
        }
        let outcome = convert_one(&cli.input, &cli.output, &config).await;
        if let Some(ref cb) = progress {
            cb.finish();
        }
        print_single_outcome(&cli, &config, &outcome, progress.is_some())?;
        outcome.is_success()
    };

    Ok(exit_status(ok))
}

/// 0 only when every attempted conversion succeeded (an empty batch included).
fn exit_status(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Work items that a run with these flags would process.
fn plan(cli: &Cli, format: &AudioFormat) -> Result<Vec<WorkItem>> {
    if cli.batch {
        plan_batch(&cli.input, &cli.output, format)
            .with_context(|| format!("Failed to read directory {}", cli.input.display()))
    } else {
        let output = if cli.output.is_dir() {
            derive_output_path(&cli.input, &cli.output, format)
        } else {
            cli.output.clone()
        };
        Ok(vec![WorkItem::new(&cli.input, output)])
    }
}

fn print_batch_report(cli: &Cli, report: &BatchReport, had_progress: bool) -> Result<()> {
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(report).context("Failed to serialise report")?
        );
        return Ok(());
    }
    if cli.quiet {
        return Ok(());
    }

    if report.total() == 0 {
        eprintln!("No video files found in {}", cli.input.display());
        return Ok(());
    }

    // The progress callback already printed its own summary line.
    if !had_progress {
        eprintln!(
            "{}  {} succeeded, {} failed  {}ms",
            if report.is_success() { green("✔") } else { cyan("⚠") },
            report.success_count,
            report.failure_count,
            report.duration_ms,
        );
    }

    if !report.failures.is_empty() {
        eprintln!("{}", bold("Failed:"));
        for failed in &report.failures {
            let reason = failed.reason.to_string();
            let reason = if cli.verbose { reason } else { truncate(&reason, 100) };
            eprintln!("  {} {}  {}", red("✗"), failed.input_path.display(), dim(&reason));
        }
    }
    Ok(())
}

fn print_single_outcome(
    cli: &Cli,
    config: &ConversionConfig,
    outcome: &ConversionOutcome,
    had_progress: bool,
) -> Result<()> {
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(outcome).context("Failed to serialise outcome")?
        );
        return Ok(());
    }

    match outcome {
        ConversionOutcome::Success if !cli.quiet && !had_progress => {
            let output = if cli.output.is_dir() {
                derive_output_path(&cli.input, &cli.output, &config.format)
            } else {
                cli.output.clone()
            };
            eprintln!(
                "{}  {}  →  {}",
                green("✔"),
                cli.input.display(),
                bold(&output.display().to_string())
            );
        }
        ConversionOutcome::Success => {}
        ConversionOutcome::Failure(_) if had_progress => {}
        ConversionOutcome::Failure(reason) => {
            eprintln!("{}  {}: {}", red("✘"), cli.input.display(), reason);
        }
    }
    Ok(())
}
