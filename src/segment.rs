//! Time ranges, planned clips and plans.
//!
//! All times are in seconds on the source track's timeline.

use crate::{Error, Result};

/// A half-open span `[start, end)` of a track, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    start: f64,
    end: f64,
}

impl TimeRange {
    /// Create a range, checking `0 <= start < end` and that both ends are finite.
    ///
    /// # Example
    /// ```
    /// use phrasecut::TimeRange;
    ///
    /// let r = TimeRange::new(0.5, 1.25).unwrap();
    /// assert_eq!(r.duration(), 0.75);
    /// assert!(TimeRange::new(1.0, 1.0).is_err());
    /// ```
    pub fn new(start: f64, end: f64) -> Result<Self> {
        if !start.is_finite() || !end.is_finite() || start < 0.0 || start >= end {
            return Err(Error::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Like [`TimeRange::new`], additionally requiring `end <= track_duration`.
    pub fn within(start: f64, end: f64, track_duration: f64) -> Result<Self> {
        let range = Self::new(start, end)?;
        if end > track_duration {
            return Err(Error::InvalidRange { start, end });
        }
        Ok(range)
    }

    /// Build a range from millisecond offsets.
    pub fn from_millis(start_ms: u64, end_ms: u64) -> Result<Self> {
        Self::new(start_ms as f64 / 1000.0, end_ms as f64 / 1000.0)
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Frame indices `(start, end)` of this range at `sample_rate`, clamped to `frames`.
    pub fn to_frames(&self, sample_rate: u32, frames: usize) -> (usize, usize) {
        let sr = sample_rate as f64;
        let start = ((self.start * sr).round() as usize).min(frames);
        let end = ((self.end * sr).round() as usize).min(frames);
        (start, end.max(start))
    }
}

/// One planned output: source pieces joined by a fixed gap of silence.
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    pieces: Vec<TimeRange>,
    gap_sec: f64,
    pad_to: Option<f64>,
}

impl Clip {
    pub(crate) fn single(piece: TimeRange, gap_sec: f64) -> Self {
        Self {
            pieces: vec![piece],
            gap_sec,
            pad_to: None,
        }
    }

    /// Duration this clip would have after absorbing a piece ending at `end`.
    pub(crate) fn merged_duration(&self, end: f64) -> f64 {
        (end - self.start()) + self.gap_sec
    }

    pub(crate) fn absorb(&mut self, piece: TimeRange) {
        self.pieces.push(piece);
    }

    pub(crate) fn set_pad_to(&mut self, seconds: f64) {
        self.pad_to = Some(seconds);
    }

    /// Source pieces in playback order.
    pub fn pieces(&self) -> &[TimeRange] {
        &self.pieces
    }

    /// Silence inserted between consecutive pieces, in seconds.
    pub fn gap_sec(&self) -> f64 {
        self.gap_sec
    }

    /// Trailing silence target in seconds, set by the pad policy.
    pub fn pad_to(&self) -> Option<f64> {
        self.pad_to
    }

    pub fn start(&self) -> f64 {
        self.pieces[0].start
    }

    pub fn end(&self) -> f64 {
        self.pieces[self.pieces.len() - 1].end
    }

    /// Source span covered by this clip, first piece start to last piece end.
    pub fn range(&self) -> TimeRange {
        TimeRange {
            start: self.start(),
            end: self.end(),
        }
    }

    /// Length used for the `[min_sec, max_sec]` bound.
    ///
    /// A single piece measures its own span; a merged clip measures its span
    /// plus one gap.
    pub fn duration(&self) -> f64 {
        if self.pieces.len() > 1 {
            self.merged_duration(self.end())
        } else {
            self.range().duration()
        }
    }
}

/// Ordered, non-overlapping clips produced for one track.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    clips: Vec<Clip>,
}

impl Plan {
    pub(crate) fn from_clips(clips: Vec<Clip>) -> Self {
        Self { clips }
    }

    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Source spans of each clip, in order.
    pub fn ranges(&self) -> Vec<TimeRange> {
        self.clips.iter().map(Clip::range).collect()
    }
}

impl<'a> IntoIterator for &'a Plan {
    type Item = &'a Clip;
    type IntoIter = std::slice::Iter<'a, Clip>;

    fn into_iter(self) -> Self::IntoIter {
        self.clips.iter()
    }
}
