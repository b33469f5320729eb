//! Per-file pipeline and the directory batch loop.
//!
//! decode -> detect candidates -> split long candidates -> plan -> export.
//! Files are processed one after another. A file that fails to decode, has
//! no sound, or cannot be written is logged and skipped; configuration
//! errors abort the batch.

use log::{debug, info, warn};
use std::path::{Path, PathBuf};

use crate::files::{find_audio_files, output_name, output_names, part_file_name};
use crate::io;
use crate::planner::{PlannerConfig, SegmentPlanner};
use crate::render::{ClipExporter, WavExporter};
use crate::silence::{RmsSilenceDetector, SilenceDetector};
use crate::split::LongSplitter;
use crate::{Error, Result};

/// All knobs of a split run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitConfig {
    pub detector: RmsSilenceDetector,
    pub planner: PlannerConfig,
    pub search_ms: u64,
    pub fade_ms: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            detector: RmsSilenceDetector::default(),
            planner: PlannerConfig::default(),
            search_ms: 1000,
            fade_ms: 10,
        }
    }
}

impl SplitConfig {
    /// Validate every section; nothing is read or written before this passes.
    pub fn validate(&self) -> Result<()> {
        self.detector.validate()?;
        self.planner.validate()?;
        self.splitter().validate()
    }

    fn splitter(&self) -> LongSplitter {
        LongSplitter {
            max_sec: self.planner.max_sec,
            search_ms: self.search_ms,
        }
    }
}

/// A file the batch gave up on.
#[derive(Debug)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub error: Error,
}

/// Outcome of [`Pipeline::process_dir`].
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Files that produced at least one clip.
    pub processed: usize,
    /// Clips written across all files.
    pub exported: usize,
    pub skipped: Vec<SkippedFile>,
}

/// Detection, splitting, planning and export wired together.
pub struct Pipeline<D, E> {
    detector: D,
    splitter: LongSplitter,
    planner: SegmentPlanner,
    exporter: E,
}

impl Pipeline<RmsSilenceDetector, WavExporter> {
    /// Build the default RMS-detector / WAV-exporter pipeline.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfiguration`] when `config` does not validate.
    pub fn from_config(config: &SplitConfig) -> Result<Self> {
        config.validate()?;
        Self::new(
            config.detector,
            config.splitter(),
            config.planner,
            WavExporter {
                fade_ms: config.fade_ms,
            },
        )
    }
}

impl<D: SilenceDetector, E: ClipExporter> Pipeline<D, E> {
    pub fn new(
        detector: D,
        splitter: LongSplitter,
        planner: PlannerConfig,
        exporter: E,
    ) -> Result<Self> {
        splitter.validate()?;
        Ok(Self {
            detector,
            splitter,
            planner: SegmentPlanner::new(planner)?,
            exporter,
        })
    }

    /// Run the whole pipeline for one file and return the written paths.
    ///
    /// # Errors
    /// [`Error::DecodeFailure`] when the file cannot be decoded,
    /// [`Error::EmptyInput`] when no sound is found, and I/O or audio errors
    /// from export.
    pub fn process_file(&self, path: &Path, output_dir: &Path) -> Result<Vec<PathBuf>> {
        self.process_file_as(path, &output_name(path), output_dir)
    }

    /// Like [`Pipeline::process_file`], naming the clips `{name}_partNNN.wav`.
    pub fn process_file_as(
        &self,
        path: &Path,
        name: &str,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>> {
        let track = io::load(path).map_err(|source| Error::DecodeFailure {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(
            "decoded {} ({:.2}s, {} Hz, {} ch)",
            path.display(),
            track.duration(),
            track.sample_rate(),
            track.channels()
        );

        let candidates = self.detector.candidates(&track)?;
        let candidates = self.splitter.split(&track, &candidates)?;
        let plan = self.planner.plan(&candidates)?;

        let mut written = Vec::with_capacity(plan.len());
        for (i, clip) in plan.clips().iter().enumerate() {
            let out_path = output_dir.join(part_file_name(name, i + 1));
            let seconds = self.exporter.export(&track, clip, &out_path)?;
            info!(
                "exported {} ({} ms)",
                out_path.display(),
                (seconds * 1000.0).round() as u64
            );
            written.push(out_path);
        }
        Ok(written)
    }

    /// Process every audio file directly inside `input_dir`.
    ///
    /// `output_dir` is created if absent. Per-file failures are logged and
    /// collected in the report. Files sharing a stem are told apart by
    /// their extension in the clip names.
    ///
    /// # Errors
    /// Fails only when `input_dir` cannot be listed, `output_dir` cannot be
    /// created, or an unrecoverable error occurs.
    pub fn process_dir(&self, input_dir: &Path, output_dir: &Path) -> Result<BatchReport> {
        let files = find_audio_files(input_dir, None)?;
        std::fs::create_dir_all(output_dir)?;
        info!(
            "found {} audio files in {}",
            files.len(),
            input_dir.display()
        );

        let names = output_names(&files);
        let mut report = BatchReport::default();
        for (path, name) in files.into_iter().zip(names) {
            match self.process_file_as(&path, &name, output_dir) {
                Ok(written) if written.is_empty() => {
                    debug!("no clips kept for {}", path.display());
                }
                Ok(written) => {
                    report.processed += 1;
                    report.exported += written.len();
                }
                Err(error) if error.is_recoverable() => {
                    warn!("skipping {}: {}", path.display(), error);
                    report.skipped.push(SkippedFile { path, error });
                }
                Err(error) => return Err(error),
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::ShortPolicy;

    #[test]
    fn test_invalid_planner_bounds_fail_validation() {
        let mut config = SplitConfig::default();
        config.planner.min_sec = 5.0;
        config.planner.max_sec = 1.0;
        assert!(matches!(
            Pipeline::from_config(&config),
            Err(Error::InvalidConfiguration { name: "min_sec", .. })
        ));
    }

    #[test]
    fn test_zero_silence_window_fails_validation() {
        let mut config = SplitConfig::default();
        config.detector.min_silence_len_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_pad_policy_is_checked_against_bounds() {
        let mut config = SplitConfig::default();
        config.planner.short_policy = ShortPolicy::Pad { pad_sec: 0.5 };
        assert!(config.validate().is_err());
        config.planner.short_policy = ShortPolicy::Pad { pad_sec: 4.0 };
        assert!(config.validate().is_ok());
    }
}
