//! Silence detection over decoded tracks.
//!
//! A window of `min_silence_len` milliseconds slides over the track in 1 ms
//! steps. A window whose RMS (full scale = 1.0, all channels pooled) is at or
//! below the dBFS threshold is silent; overlapping silent windows coalesce
//! into silence ranges. Non-silent candidates are the complement.

use crate::io::Track;
use crate::segment::TimeRange;
use crate::{Error, Result};

/// Capability: find the sound-bearing candidates of a track.
pub trait SilenceDetector {
    fn candidates(&self, track: &Track) -> Result<Vec<TimeRange>>;
}

/// RMS-threshold detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RmsSilenceDetector {
    pub min_silence_len_ms: u64,
    pub silence_thresh_db: f64,
}

impl Default for RmsSilenceDetector {
    fn default() -> Self {
        Self {
            min_silence_len_ms: 300,
            silence_thresh_db: -40.0,
        }
    }
}

impl RmsSilenceDetector {
    pub fn validate(&self) -> Result<()> {
        if self.min_silence_len_ms == 0 {
            return Err(Error::config("min_silence_len", 0, "must be > 0"));
        }
        if !self.silence_thresh_db.is_finite() {
            return Err(Error::config(
                "silence_thresh",
                self.silence_thresh_db,
                "must be finite",
            ));
        }
        Ok(())
    }
}

impl SilenceDetector for RmsSilenceDetector {
    fn candidates(&self, track: &Track) -> Result<Vec<TimeRange>> {
        detect_nonsilent(track, self.min_silence_len_ms, self.silence_thresh_db)
    }
}

/// Prefix sums of per-frame mean-square energy, for O(1) window RMS.
pub(crate) struct Energy {
    prefix: Vec<f64>,
    sample_rate: u32,
}

impl Energy {
    pub(crate) fn new(track: &Track) -> Self {
        let samples = track.samples();
        let channels = track.channels().max(1) as f64;
        let mut prefix = Vec::with_capacity(track.frames() + 1);
        prefix.push(0.0);
        let mut acc = 0.0f64;
        for column in samples.columns() {
            let sq: f64 = column.iter().map(|&v| (v as f64) * (v as f64)).sum();
            acc += sq / channels;
            prefix.push(acc);
        }
        Self {
            prefix,
            sample_rate: track.sample_rate(),
        }
    }

    pub(crate) fn frames(&self) -> usize {
        self.prefix.len() - 1
    }

    /// Track length in whole milliseconds (rounded).
    pub(crate) fn len_ms(&self) -> u64 {
        ((self.frames() as f64) * 1000.0 / self.sample_rate as f64).round() as u64
    }

    pub(crate) fn frame_at_ms(&self, ms: u64) -> usize {
        let frame = ms.saturating_mul(self.sample_rate as u64) / 1000;
        (frame as usize).min(self.frames())
    }

    pub(crate) fn frame_at_sec(&self, seconds: f64) -> usize {
        let frame = (seconds.max(0.0) * self.sample_rate as f64).round() as usize;
        frame.min(self.frames())
    }

    /// RMS between two frame indices; an empty window has zero energy.
    pub(crate) fn rms_frames(&self, start: usize, end: usize) -> f64 {
        let end = end.min(self.frames());
        if end <= start {
            return 0.0;
        }
        let sum = self.prefix[end] - self.prefix[start];
        (sum.max(0.0) / (end - start) as f64).sqrt()
    }

    pub(crate) fn rms_ms(&self, start_ms: u64, end_ms: u64) -> f64 {
        self.rms_frames(self.frame_at_ms(start_ms), self.frame_at_ms(end_ms))
    }
}

/// Convert a dBFS value to a linear amplitude (full scale = 1.0).
pub fn db_to_amplitude(db: f64) -> f64 {
    10f64.powf(db / 20.0)
}

fn silent_ranges_ms(energy: &Energy, min_silence_len: u64, thresh_db: f64) -> Vec<(u64, u64)> {
    let seg_len = energy.len_ms();
    if seg_len < min_silence_len {
        return Vec::new();
    }
    let threshold = db_to_amplitude(thresh_db);

    let mut ranges = Vec::new();
    let mut current: Option<(u64, u64)> = None; // (range start, last silent window start)
    for i in 0..=(seg_len - min_silence_len) {
        if energy.rms_ms(i, i + min_silence_len) > threshold {
            continue;
        }
        current = match current {
            None => Some((i, i)),
            Some((range_start, prev)) => {
                let continuous = i == prev + 1;
                let has_gap = i > prev + min_silence_len;
                if !continuous && has_gap {
                    ranges.push((range_start, prev + min_silence_len));
                    Some((i, i))
                } else {
                    Some((range_start, i))
                }
            }
        };
    }
    if let Some((range_start, prev)) = current {
        ranges.push((range_start, prev + min_silence_len));
    }
    ranges
}

/// Find silence ranges of at least `min_silence_len` ms below `silence_thresh` dBFS.
///
/// # Errors
/// Returns [`Error::InvalidConfiguration`] when `min_silence_len` is zero.
pub fn detect_silence(
    track: &Track,
    min_silence_len: u64,
    silence_thresh: f64,
) -> Result<Vec<TimeRange>> {
    if min_silence_len == 0 {
        return Err(Error::config("min_silence_len", 0, "must be > 0"));
    }
    let energy = Energy::new(track);
    silent_ranges_ms(&energy, min_silence_len, silence_thresh)
        .into_iter()
        .map(|(start, end)| clamp_to_track(start, end, track.duration()))
        .collect()
}

/// Find the non-silent candidates between silence ranges.
///
/// A track without silence yields one candidate covering all of it; a track
/// that is silent throughout yields none.
///
/// # Example
/// ```
/// use phrasecut::io::{self, Track};
/// use phrasecut::silence::detect_nonsilent;
///
/// let mut y = io::tone(440.0, 8000, 0.5, 0.5);
/// y.extend(io::silence(8000, 0.5));
/// y.extend(io::tone(440.0, 8000, 0.5, 0.5));
/// let track = Track::from_mono(&y, 8000).unwrap();
///
/// let candidates = detect_nonsilent(&track, 300, -40.0).unwrap();
/// assert_eq!(candidates.len(), 2);
/// ```
pub fn detect_nonsilent(
    track: &Track,
    min_silence_len: u64,
    silence_thresh: f64,
) -> Result<Vec<TimeRange>> {
    if min_silence_len == 0 {
        return Err(Error::config("min_silence_len", 0, "must be > 0"));
    }
    let energy = Energy::new(track);
    let seg_len = energy.len_ms();
    if seg_len == 0 {
        return Ok(Vec::new());
    }
    let silent = silent_ranges_ms(&energy, min_silence_len, silence_thresh);

    let mut spans = Vec::with_capacity(silent.len() + 1);
    let mut prev_end = 0u64;
    for &(start, end) in &silent {
        spans.push((prev_end, start));
        prev_end = end;
    }
    spans.push((prev_end, seg_len));

    spans
        .into_iter()
        .filter(|&(start, end)| end > start)
        .map(|(start, end)| clamp_to_track(start, end, track.duration()))
        .collect()
}

fn clamp_to_track(start_ms: u64, end_ms: u64, duration: f64) -> Result<TimeRange> {
    let start = start_ms as f64 / 1000.0;
    let end = (end_ms as f64 / 1000.0).min(duration);
    TimeRange::new(start, end.max(start + 1e-6))
}
