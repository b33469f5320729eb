use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use std::path::PathBuf;

use phrasecut::{Pipeline, PlannerConfig, ShortPolicy, SplitConfig};
use phrasecut::silence::RmsSilenceDetector;

/// What to do with clips that stay shorter than `--min_sec`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ShortArg {
    /// Export them unchanged
    Keep,
    /// Do not export them
    Drop,
    /// Pad them with trailing silence up to `--pad_sec`
    Pad,
}

/// CLI arguments for phrasecut.
#[derive(Parser, Debug)]
#[command(
    name = "phrasecut",
    version,
    about = "Split audio files at silences into clips between --min_sec and --max_sec, with fades at every splice."
)]
struct Args {
    /// Directory scanned (non-recursively) for audio files.
    #[arg(long = "input_dir")]
    input_dir: PathBuf,

    /// Destination directory for the clips; created if absent.
    #[arg(long = "output_dir")]
    output_dir: PathBuf,

    /// Minimum silence length in milliseconds.
    #[arg(long = "min_silence_len", default_value_t = 300)]
    min_silence_len: u64,

    /// Silence threshold in dBFS.
    #[arg(long = "silence_thresh", default_value_t = -40, allow_negative_numbers = true)]
    silence_thresh: i32,

    /// Lower clip length bound in seconds.
    #[arg(long = "min_sec", default_value_t = 1.0)]
    min_sec: f64,

    /// Upper clip length bound in seconds.
    #[arg(long = "max_sec", default_value_t = 5.0)]
    max_sec: f64,

    /// Fade-in/out length in milliseconds at every piece edge.
    #[arg(long = "fade_ms", default_value_t = 10)]
    fade_ms: u64,

    /// Silence inserted between merged pieces, in milliseconds.
    #[arg(long = "gap_ms", default_value_t = 100, allow_negative_numbers = true)]
    gap_ms: i64,

    /// Window around the middle of an over-long phrase searched for a quiet cut point, in milliseconds.
    #[arg(long = "search_ms", default_value_t = 1000)]
    search_ms: u64,

    /// Handling of clips shorter than --min_sec.
    #[arg(long = "short_policy", value_enum, default_value_t = ShortArg::Keep)]
    short_policy: ShortArg,

    /// Target length in seconds for --short_policy pad.
    #[arg(long = "pad_sec", default_value_t = 4.0)]
    pad_sec: f64,
}

impl Args {
    fn split_config(&self) -> SplitConfig {
        let short_policy = match self.short_policy {
            ShortArg::Keep => ShortPolicy::Keep,
            ShortArg::Drop => ShortPolicy::Drop,
            ShortArg::Pad => ShortPolicy::Pad {
                pad_sec: self.pad_sec,
            },
        };
        SplitConfig {
            detector: RmsSilenceDetector {
                min_silence_len_ms: self.min_silence_len,
                silence_thresh_db: self.silence_thresh as f64,
            },
            planner: PlannerConfig {
                min_sec: self.min_sec,
                max_sec: self.max_sec,
                gap_ms: self.gap_ms,
                short_policy,
            },
            search_ms: self.search_ms,
            fade_ms: self.fade_ms,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let pipeline =
        Pipeline::from_config(&args.split_config()).context("invalid configuration")?;
    let report = pipeline
        .process_dir(&args.input_dir, &args.output_dir)
        .with_context(|| {
            format!(
                "failed to process {} into {}",
                args.input_dir.display(),
                args.output_dir.display()
            )
        })?;

    info!(
        "done: {} clips from {} files, {} skipped",
        report.exported,
        report.processed,
        report.skipped.len()
    );
    Ok(())
}
