//! Silence-based audio splitting for building short-clip corpora.
//!
//! phrasecut cuts audio files into clips at detected silences, merges
//! undersized fragments into clips bounded by `[min_sec, max_sec]`, and fades
//! every splice point to avoid clicks.
//!
//! # Pipeline
//!
//! | Stage | Module | Description |
//! |-------|--------|-------------|
//! | decode | [`io`] | Any symphonia-supported format into a `(channels, frames)` buffer |
//! | detect | [`silence`] | RMS/dBFS silence detection, non-silent candidates |
//! | split | [`split`] | Cut over-long candidates at their quietest point |
//! | plan | [`planner`] | Greedy merge of candidates into bounded clips |
//! | render | [`render`] | Fades, inter-piece gaps, padding, WAV export |
//! | batch | [`batch`] | Directory loop with per-file failure isolation |
//!
//! # Quick Start
//!
//! ```rust
//! use phrasecut::{PlannerConfig, SegmentPlanner, TimeRange};
//!
//! let planner = SegmentPlanner::new(PlannerConfig::new(1.0, 5.0, 100).unwrap()).unwrap();
//! let candidates = [
//!     TimeRange::new(0.0, 0.5).unwrap(),
//!     TimeRange::new(0.6, 0.9).unwrap(),
//! ];
//! let plan = planner.plan(&candidates).unwrap();
//! assert_eq!(plan.len(), 1);
//! assert!((plan.clips()[0].duration() - 1.0).abs() < 1e-9);
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T>`], an alias for
//! `std::result::Result<T, Error>`. Configuration errors are fatal for a
//! batch; every other [`Error`] only skips the file it occurred in.

#![forbid(unsafe_code)]

pub mod error;
pub use error::{Error, Result};

pub mod batch;
pub mod files;
pub mod io;
pub mod planner;
pub mod render;
pub mod segment;
pub mod silence;
pub mod split;

pub use batch::{BatchReport, Pipeline, SplitConfig};
pub use planner::{PlannerConfig, SegmentPlanner, ShortPolicy};
pub use segment::{Clip, Plan, TimeRange};
