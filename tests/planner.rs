use approx::assert_relative_eq;
use phrasecut::{Error, PlannerConfig, SegmentPlanner, ShortPolicy, TimeRange};

fn r(start: f64, end: f64) -> TimeRange {
    TimeRange::new(start, end).unwrap()
}

fn planner(min_sec: f64, max_sec: f64, gap_ms: i64) -> SegmentPlanner {
    SegmentPlanner::new(PlannerConfig::new(min_sec, max_sec, gap_ms).unwrap()).unwrap()
}

#[test]
fn short_tail_merges_into_one_clip() {
    let plan = planner(1.0, 5.0, 100)
        .plan(&[r(0.0, 0.5), r(0.6, 0.9)])
        .unwrap();
    assert_eq!(plan.len(), 1);
    let clip = &plan.clips()[0];
    assert_eq!(clip.range(), r(0.0, 0.9));
    assert_eq!(clip.pieces(), &[r(0.0, 0.5), r(0.6, 0.9)]);
    assert_relative_eq!(clip.duration(), 1.0, epsilon = 1e-9);
}

#[test]
fn overflow_flushes_separately() {
    let plan = planner(1.0, 5.0, 100)
        .plan(&[r(0.0, 3.0), r(3.1, 6.0)])
        .unwrap();
    assert_eq!(plan.ranges(), vec![r(0.0, 3.0), r(3.1, 6.0)]);
}

#[test]
fn inverted_bounds_fail_before_planning() {
    let err = PlannerConfig::new(5.0, 1.0, 100).unwrap_err();
    assert!(matches!(err, Error::InvalidConfiguration { name: "min_sec", .. }));

    let raw = PlannerConfig {
        min_sec: 5.0,
        max_sec: 1.0,
        gap_ms: 100,
        short_policy: ShortPolicy::Keep,
    };
    assert!(matches!(
        SegmentPlanner::new(raw),
        Err(Error::InvalidConfiguration { .. })
    ));
}

#[test]
fn non_positive_min_is_rejected() {
    assert!(PlannerConfig::new(0.0, 1.0, 0).is_err());
    assert!(PlannerConfig::new(-1.0, 1.0, 0).is_err());
    assert!(PlannerConfig::new(f64::NAN, 1.0, 0).is_err());
}

#[test]
fn equal_bounds_are_allowed() {
    let plan = planner(2.0, 2.0, 0).plan(&[r(0.0, 2.0), r(3.0, 5.0)]).unwrap();
    assert_eq!(plan.len(), 2);
}

#[test]
fn empty_candidates_are_reported() {
    assert!(matches!(planner(1.0, 5.0, 100).plan(&[]), Err(Error::EmptyInput)));
}

#[test]
fn unsorted_candidates_are_reported() {
    let err = planner(1.0, 5.0, 100)
        .plan(&[r(2.0, 3.0), r(0.0, 1.0)])
        .unwrap_err();
    assert!(matches!(err, Error::InvalidCandidates(_)));
}

#[test]
fn short_clip_in_the_middle_is_kept_by_default() {
    // 0.5s phrase followed by a phrase too long to merge with it
    let plan = planner(1.0, 5.0, 100)
        .plan(&[r(0.0, 0.5), r(0.6, 5.5), r(6.0, 7.5)])
        .unwrap();
    assert_eq!(plan.ranges(), vec![r(0.0, 0.5), r(0.6, 5.5), r(6.0, 7.5)]);
}

#[test]
fn single_over_long_candidate_is_emitted_as_is() {
    let plan = planner(1.0, 5.0, 100).plan(&[r(0.0, 8.0)]).unwrap();
    assert_eq!(plan.ranges(), vec![r(0.0, 8.0)]);
}

#[test]
fn gap_counts_against_max() {
    // 2.0s span fits exactly without a gap, overflows with one
    let candidates = [r(0.0, 1.0), r(1.5, 2.0)];
    assert_eq!(planner(0.5, 2.0, 0).plan(&candidates).unwrap().len(), 1);
    assert_eq!(planner(0.5, 2.0, 1).plan(&candidates).unwrap().len(), 2);
}

#[test]
fn many_short_phrases_fill_clips_greedily() {
    // 0.4s phrases every 0.5s; each clip takes pieces while span + 0.1 <= 2.0
    let candidates: Vec<_> = (0..10)
        .map(|i| r(i as f64 * 0.5, i as f64 * 0.5 + 0.4))
        .collect();
    let plan = planner(1.0, 2.0, 100).plan(&candidates).unwrap();
    let counts: Vec<_> = plan.clips().iter().map(|c| c.pieces().len()).collect();
    assert_eq!(counts, vec![4, 4, 2]);
    for clip in plan.clips() {
        assert!(clip.duration() <= 2.0 + 1e-9);
    }
}
