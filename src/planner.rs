//! Greedy merge of candidate intervals into duration-bounded clips.
//!
//! Candidates are walked in order and merged into an accumulator for as long
//! as the merged clip (span plus one inter-piece gap) stays within `max_sec`.
//! When the next candidate would overflow the bound the accumulator is
//! flushed and a new one starts. Clips that end up shorter than `min_sec`
//! are handed to the configured [`ShortPolicy`].

use log::debug;

use crate::segment::{Clip, Plan, TimeRange};
use crate::{Error, Result};

/// Tolerance for comparing accumulated float durations against the bounds.
const EPSILON: f64 = 1e-9;

/// What to do with a flushed clip shorter than `min_sec`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ShortPolicy {
    /// Emit the clip unchanged.
    #[default]
    Keep,
    /// Leave the clip out of the plan.
    Drop,
    /// Emit the clip and pad it with trailing silence up to `pad_sec`.
    Pad { pad_sec: f64 },
}

/// Bounds and gap used by [`SegmentPlanner`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannerConfig {
    pub min_sec: f64,
    pub max_sec: f64,
    pub gap_ms: i64,
    pub short_policy: ShortPolicy,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            min_sec: 1.0,
            max_sec: 5.0,
            gap_ms: 100,
            short_policy: ShortPolicy::Keep,
        }
    }
}

impl PlannerConfig {
    /// Build a validated configuration with the default short policy.
    pub fn new(min_sec: f64, max_sec: f64, gap_ms: i64) -> Result<Self> {
        let config = Self {
            min_sec,
            max_sec,
            gap_ms,
            short_policy: ShortPolicy::Keep,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_short_policy(mut self, short_policy: ShortPolicy) -> Result<Self> {
        self.short_policy = short_policy;
        self.validate()?;
        Ok(self)
    }

    /// Gap between merged pieces, in seconds.
    pub fn gap_sec(&self) -> f64 {
        self.gap_ms as f64 / 1000.0
    }

    /// Check the bounds, the gap and the short policy.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfiguration`] when `min_sec <= 0`,
    /// `min_sec > max_sec`, `gap_ms < 0`, a bound is not finite, or a pad
    /// target lies outside `[min_sec, max_sec]`.
    pub fn validate(&self) -> Result<()> {
        if !self.min_sec.is_finite() || self.min_sec <= 0.0 {
            return Err(Error::config("min_sec", self.min_sec, "must be > 0"));
        }
        if !self.max_sec.is_finite() {
            return Err(Error::config("max_sec", self.max_sec, "must be finite"));
        }
        if self.min_sec > self.max_sec {
            return Err(Error::config(
                "min_sec",
                self.min_sec,
                &format!("must not exceed max_sec ({})", self.max_sec),
            ));
        }
        if self.gap_ms < 0 {
            return Err(Error::config("gap_ms", self.gap_ms, "must be >= 0"));
        }
        if let ShortPolicy::Pad { pad_sec } = self.short_policy
            && !(pad_sec.is_finite() && pad_sec >= self.min_sec && pad_sec <= self.max_sec)
        {
            return Err(Error::config(
                "pad_sec",
                pad_sec,
                &format!("must lie within [{}, {}]", self.min_sec, self.max_sec),
            ));
        }
        Ok(())
    }
}

/// Turns detected candidates into an export-ready [`Plan`].
#[derive(Debug, Clone)]
pub struct SegmentPlanner {
    config: PlannerConfig,
}

impl SegmentPlanner {
    /// Create a planner, rejecting an invalid configuration up front.
    pub fn new(config: PlannerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plan the clips for one track.
    ///
    /// # Arguments
    /// * `candidates` - Non-silent ranges sorted by start time, non-overlapping
    ///
    /// # Errors
    /// [`Error::EmptyInput`] when there are no candidates and
    /// [`Error::InvalidCandidates`] when they are out of order or overlap.
    ///
    /// # Example
    /// ```
    /// use phrasecut::{PlannerConfig, SegmentPlanner, TimeRange};
    ///
    /// let planner = SegmentPlanner::new(PlannerConfig::new(1.0, 5.0, 100).unwrap()).unwrap();
    /// let candidates = [
    ///     TimeRange::new(0.0, 3.0).unwrap(),
    ///     TimeRange::new(3.1, 6.0).unwrap(),
    /// ];
    /// let plan = planner.plan(&candidates).unwrap();
    /// assert_eq!(plan.len(), 2);
    /// ```
    pub fn plan(&self, candidates: &[TimeRange]) -> Result<Plan> {
        if candidates.is_empty() {
            return Err(Error::EmptyInput);
        }
        check_ordered(candidates)?;

        let gap_sec = self.config.gap_sec();
        let max_sec = self.config.max_sec;

        let mut flushed: Vec<Clip> = Vec::new();
        let mut acc: Option<Clip> = None;
        for &candidate in candidates {
            let fits = acc
                .as_ref()
                .is_some_and(|clip| clip.merged_duration(candidate.end()) <= max_sec + EPSILON);
            if fits {
                if let Some(clip) = acc.as_mut() {
                    clip.absorb(candidate);
                }
            } else if let Some(done) = acc.replace(Clip::single(candidate, gap_sec)) {
                flushed.push(done);
            }
        }
        if let Some(last) = acc {
            flushed.push(last);
        }

        let clips = self.apply_short_policy(flushed);
        debug!(
            "planned {} clips from {} candidates",
            clips.len(),
            candidates.len()
        );
        Ok(Plan::from_clips(clips))
    }

    fn apply_short_policy(&self, flushed: Vec<Clip>) -> Vec<Clip> {
        let min_sec = self.config.min_sec;
        let mut clips = Vec::with_capacity(flushed.len());
        for mut clip in flushed {
            if clip.duration() + EPSILON >= min_sec {
                clips.push(clip);
                continue;
            }
            match self.config.short_policy {
                ShortPolicy::Keep => clips.push(clip),
                ShortPolicy::Drop => {
                    debug!(
                        "dropping short clip {:.3}..{:.3} ({:.3}s)",
                        clip.start(),
                        clip.end(),
                        clip.duration()
                    );
                }
                ShortPolicy::Pad { pad_sec } => {
                    clip.set_pad_to(pad_sec);
                    clips.push(clip);
                }
            }
        }
        clips
    }
}

fn check_ordered(candidates: &[TimeRange]) -> Result<()> {
    for (i, pair) in candidates.windows(2).enumerate() {
        if pair[1].start() < pair[0].end() {
            return Err(Error::InvalidCandidates(format!(
                "candidate {} starts at {} before candidate {} ends at {}",
                i + 1,
                pair[1].start(),
                i,
                pair[0].end()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(start: f64, end: f64) -> TimeRange {
        TimeRange::new(start, end).unwrap()
    }

    #[test]
    fn test_merges_until_max_then_flushes() {
        let planner = SegmentPlanner::new(PlannerConfig::new(1.0, 2.0, 100).unwrap()).unwrap();
        let plan = planner
            .plan(&[r(0.0, 0.4), r(0.5, 0.9), r(1.0, 1.8), r(2.0, 2.5)])
            .unwrap();
        // 0..0.9 (+gap 1.0) fits, 0..1.8 (+gap 1.9) fits, 0..2.5 (+gap 2.6) does not
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.clips()[0].pieces().len(), 3);
        assert_eq!(plan.ranges()[1], r(2.0, 2.5));
    }

    #[test]
    fn test_overlapping_candidates_are_rejected() {
        let planner = SegmentPlanner::new(PlannerConfig::default()).unwrap();
        let err = planner.plan(&[r(0.0, 1.0), r(0.5, 2.0)]).unwrap_err();
        assert!(matches!(err, Error::InvalidCandidates(_)));
    }

    #[test]
    fn test_touching_candidates_are_accepted() {
        let planner = SegmentPlanner::new(PlannerConfig::default()).unwrap();
        let plan = planner.plan(&[r(0.0, 1.0), r(1.0, 2.0)]).unwrap();
        assert_eq!(plan.len(), 1);
    }

    #[test]
    fn test_drop_policy_removes_short_clips() {
        let config = PlannerConfig::new(1.0, 2.0, 0)
            .unwrap()
            .with_short_policy(ShortPolicy::Drop)
            .unwrap();
        let planner = SegmentPlanner::new(config).unwrap();
        let plan = planner.plan(&[r(0.0, 1.5), r(3.0, 3.4)]).unwrap();
        assert_eq!(plan.ranges(), vec![r(0.0, 1.5)]);
    }

    #[test]
    fn test_pad_policy_marks_short_clips() {
        let config = PlannerConfig::new(1.0, 5.0, 100)
            .unwrap()
            .with_short_policy(ShortPolicy::Pad { pad_sec: 4.0 })
            .unwrap();
        let planner = SegmentPlanner::new(config).unwrap();
        let plan = planner.plan(&[r(0.0, 0.3)]).unwrap();
        assert_eq!(plan.clips()[0].pad_to(), Some(4.0));
    }

    #[test]
    fn test_pad_target_outside_bounds_is_rejected() {
        let err = PlannerConfig::new(1.0, 5.0, 100)
            .unwrap()
            .with_short_policy(ShortPolicy::Pad { pad_sec: 6.0 })
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidConfiguration { name: "pad_sec", .. }
        ));
    }

    #[test]
    fn test_negative_gap_is_rejected() {
        let err = PlannerConfig::new(1.0, 5.0, -1).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidConfiguration { name: "gap_ms", .. }
        ));
    }
}
