//! Splitting of candidates that are longer than the clip bound.
//!
//! A long candidate is cut at the quietest point near its middle: 50 ms
//! slices within `search_ms` of the centre are compared by RMS and the cut
//! lands in the middle of the quietest slice. The remainder is cut again
//! until it fits; a left part that is still too long is split recursively.

use log::debug;

use crate::io::Track;
use crate::segment::TimeRange;
use crate::silence::Energy;
use crate::{Error, Result};

const STEP_MS: u64 = 50;
const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LongSplitter {
    pub max_sec: f64,
    pub search_ms: u64,
}

impl Default for LongSplitter {
    fn default() -> Self {
        Self {
            max_sec: 5.0,
            search_ms: 1000,
        }
    }
}

impl LongSplitter {
    pub fn validate(&self) -> Result<()> {
        if !self.max_sec.is_finite() || self.max_sec <= 0.0 {
            return Err(Error::config("max_sec", self.max_sec, "must be > 0"));
        }
        Ok(())
    }

    /// Split every candidate longer than `max_sec`; shorter ones pass through.
    ///
    /// # Example
    /// ```
    /// use phrasecut::io::{self, Track};
    /// use phrasecut::split::LongSplitter;
    /// use phrasecut::TimeRange;
    ///
    /// let track = Track::from_mono(&io::tone(220.0, 8000, 12.0, 0.5), 8000).unwrap();
    /// let splitter = LongSplitter { max_sec: 5.0, search_ms: 1000 };
    /// let pieces = splitter
    ///     .split(&track, &[TimeRange::new(0.0, 12.0).unwrap()])
    ///     .unwrap();
    /// assert!(pieces.iter().all(|p| p.duration() <= 5.0));
    /// ```
    pub fn split(&self, track: &Track, candidates: &[TimeRange]) -> Result<Vec<TimeRange>> {
        self.validate()?;
        let energy = Energy::new(track);
        let mut out = Vec::with_capacity(candidates.len());
        for &candidate in candidates {
            if candidate.duration() > self.max_sec + EPSILON {
                let before = out.len();
                self.split_range(&energy, candidate, &mut out)?;
                debug!(
                    "split {:.3}..{:.3} into {} pieces",
                    candidate.start(),
                    candidate.end(),
                    out.len() - before
                );
            } else {
                out.push(candidate);
            }
        }
        Ok(out)
    }

    fn split_range(&self, energy: &Energy, range: TimeRange, out: &mut Vec<TimeRange>) -> Result<()> {
        let mut remaining = range;
        while remaining.duration() > self.max_sec + EPSILON {
            let Some(offset) = quietest_offset(energy, remaining, self.search_ms) else {
                break;
            };
            let cut = remaining.start() + offset;
            let left = TimeRange::new(remaining.start(), cut)?;
            if left.duration() > self.max_sec + EPSILON {
                self.split_range(energy, left, out)?;
            } else {
                out.push(left);
            }
            remaining = TimeRange::new(cut, remaining.end())?;
        }
        out.push(remaining);
        Ok(())
    }
}

/// Offset in seconds from `range.start` of the quietest cut point, or `None`
/// when the range is too short to cut.
fn quietest_offset(energy: &Energy, range: TimeRange, search_ms: u64) -> Option<f64> {
    let length = (range.duration() * 1000.0).floor() as u64;
    if length < 2 {
        return None;
    }
    let mid = length / 2;
    if length <= search_ms {
        return Some(mid as f64 / 1000.0);
    }

    let base = range.start();
    let rms_at = |from: u64, to: u64| {
        let from = energy.frame_at_sec(base + from as f64 / 1000.0);
        let to = energy.frame_at_sec(base + to as f64 / 1000.0);
        energy.rms_frames(from, to)
    };

    let start_search = mid.saturating_sub(search_ms / 2);
    let end_search = (mid + search_ms / 2).min(length);
    let mut best = mid;
    let mut min_rms = f64::INFINITY;
    let mut i = start_search;
    while i < end_search {
        let value = rms_at(i, (i + STEP_MS).min(length));
        if value < min_rms {
            min_rms = value;
            best = i + STEP_MS / 2;
        }
        i += STEP_MS;
    }

    if best == 0 || best >= length {
        best = mid;
    }
    Some(best as f64 / 1000.0)
}
