//! Rendering planned clips to samples and exporting them.

use ndarray::Array2;
use std::path::Path;

use crate::io::{self, Track};
use crate::segment::Clip;
use crate::Result;

/// Capability: write one planned clip of a track to `path`.
pub trait ClipExporter {
    /// Export the clip and return the rendered length in seconds.
    fn export(&self, track: &Track, clip: &Clip, path: &Path) -> Result<f64>;
}

/// Writes 16-bit PCM WAV files with linear fades at every piece edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavExporter {
    pub fade_ms: u64,
}

impl Default for WavExporter {
    fn default() -> Self {
        Self { fade_ms: 10 }
    }
}

impl ClipExporter for WavExporter {
    fn export(&self, track: &Track, clip: &Clip, path: &Path) -> Result<f64> {
        let data = render_clip(track, clip, self.fade_ms);
        io::save_wav(path, data.view(), track.sample_rate())?;
        Ok(data.shape()[1] as f64 / track.sample_rate() as f64)
    }
}

/// Render a clip: each piece faded in and out, pieces joined by silence of
/// `clip.gap_sec()`, then padded with silence up to `clip.pad_to()` if set.
///
/// The silence between two pieces never exceeds their separation in the
/// source, so touching pieces are joined directly and the rendered length
/// stays within the clip's source span.
///
/// # Arguments
/// * `track` - Source track
/// * `clip` - Planned clip whose pieces lie within the track
/// * `fade_ms` - Fade length at each piece edge, clamped to half the piece
///
/// # Returns
/// Samples with shape `(channels, frames)`.
pub fn render_clip(track: &Track, clip: &Clip, fade_ms: u64) -> Array2<f32> {
    let sr = track.sample_rate();
    let channels = track.channels();
    let samples = track.samples();
    let gap_frames = (clip.gap_sec() * sr as f64).round() as usize;
    let fade_frames = (fade_ms.saturating_mul(sr as u64) / 1000) as usize;

    let mut rows: Vec<Vec<f32>> = vec![Vec::new(); channels];
    let mut prev_end: Option<usize> = None;
    for piece in clip.pieces() {
        let (start, end) = piece.to_frames(sr, track.frames());
        let gap = prev_end.map_or(0, |prev| gap_frames.min(start.saturating_sub(prev)));
        prev_end = Some(end);
        for (ch, row) in rows.iter_mut().enumerate() {
            row.resize(row.len() + gap, 0.0);
            let offset = row.len();
            row.extend(samples.row(ch).iter().skip(start).take(end - start));
            apply_fade(&mut row[offset..], fade_frames);
        }
    }

    if let Some(pad_to) = clip.pad_to() {
        let target = (pad_to * sr as f64).round() as usize;
        for row in rows.iter_mut() {
            if row.len() < target {
                row.resize(target, 0.0);
            }
        }
    }

    let frames = rows.first().map(Vec::len).unwrap_or(0);
    let mut out = Array2::<f32>::zeros((channels, frames));
    for (ch, row) in rows.iter().enumerate() {
        for (frame, &v) in row.iter().enumerate() {
            out[(ch, frame)] = v;
        }
    }
    out
}

/// Linear fade-in over the first `fade_frames` and fade-out over the last.
pub fn apply_fade(buf: &mut [f32], fade_frames: usize) {
    let n = fade_frames.min(buf.len() / 2);
    if n == 0 {
        return;
    }
    let len = buf.len();
    for i in 0..n {
        let gain = i as f32 / n as f32;
        buf[i] *= gain;
        buf[len - 1 - i] *= gain;
    }
}
