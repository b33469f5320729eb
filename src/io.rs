//! Audio decoding, WAV writing and test-signal generation.

use hound::{SampleFormat, WavSpec, WavWriter};
use ndarray::{Array2, ArrayView2};
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioSpec {
    pub sample_rate: u32,
    pub channels: u16,
}

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("hound error: {0}")]
    Hound(#[from] hound::Error),
    #[error("symphonia error: {0}")]
    Symphonia(SymphoniaError),
    #[error("no audio track found")]
    NoAudioTrack,
    #[error("unsupported number of channels")]
    UnsupportedChannels,
    #[error("unknown sample rate")]
    UnknownSampleRate,
}

impl From<SymphoniaError> for AudioError {
    fn from(err: SymphoniaError) -> Self {
        Self::Symphonia(err)
    }
}

/// A decoded track: samples with shape `(channels, frames)` in `[-1.0, 1.0]`.
#[derive(Debug, Clone)]
pub struct Track {
    samples: Array2<f32>,
    spec: AudioSpec,
}

impl Track {
    /// Wrap an existing buffer.
    ///
    /// # Errors
    /// Returns [`AudioError::UnsupportedChannels`] for a buffer without channels
    /// and [`AudioError::UnknownSampleRate`] for a zero sample rate.
    pub fn new(samples: Array2<f32>, sample_rate: u32) -> Result<Self, AudioError> {
        let channels = samples.shape()[0];
        if channels == 0 || channels > u16::MAX as usize {
            return Err(AudioError::UnsupportedChannels);
        }
        if sample_rate == 0 {
            return Err(AudioError::UnknownSampleRate);
        }
        Ok(Self {
            samples,
            spec: AudioSpec {
                sample_rate,
                channels: channels as u16,
            },
        })
    }

    /// Build a mono track from a slice of samples.
    pub fn from_mono(samples: &[f32], sample_rate: u32) -> Result<Self, AudioError> {
        let data = Array2::from_shape_vec((1, samples.len()), samples.to_vec())
            .map_err(|_| AudioError::UnsupportedChannels)?;
        Self::new(data, sample_rate)
    }

    pub fn samples(&self) -> ArrayView2<'_, f32> {
        self.samples.view()
    }

    pub fn spec(&self) -> AudioSpec {
        self.spec
    }

    pub fn sample_rate(&self) -> u32 {
        self.spec.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.spec.channels as usize
    }

    pub fn frames(&self) -> usize {
        self.samples.shape()[1]
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.frames() as f64 / self.spec.sample_rate as f64
    }
}

/// Decode an audio file into a [`Track`].
///
/// Supports every container and codec enabled in symphonia (WAV, FLAC, MP3,
/// AAC/M4A, Ogg Vorbis). Channels are kept as decoded.
///
/// # Example
/// ```no_run
/// use phrasecut::io;
///
/// let track = io::load("speech.wav").unwrap();
/// println!("{:.2}s at {} Hz", track.duration(), track.sample_rate());
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<Track, AudioError> {
    let path_ref = path.as_ref();
    let mut hint = Hint::new();
    if let Some(ext) = path_ref.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let file = std::fs::File::open(path_ref).map_err(SymphoniaError::IoError)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());
    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;

    let mut format = probed.format;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.sample_rate.is_some())
        .ok_or(AudioError::NoAudioTrack)?
        .clone();

    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or(AudioError::UnknownSampleRate)?;
    let mut channels = track
        .codec_params
        .channels
        .map(|c| c.count())
        .unwrap_or(0);

    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut samples: Vec<f32> = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(SymphoniaError::IoError(_)) => break,
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track.id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(audio) => audio,
            Err(SymphoniaError::IoError(_)) => break,
            Err(SymphoniaError::DecodeError(_)) => continue,
            Err(e) => return Err(e.into()),
        };

        // Some codecs only report their layout once the first packet is decoded.
        if channels == 0 {
            channels = decoded.spec().channels.count();
        }
        let mut sb = SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec());
        sb.copy_interleaved_ref(decoded);
        samples.extend_from_slice(sb.samples());
    }

    if channels == 0 {
        return Err(AudioError::UnsupportedChannels);
    }
    let total_frames = samples.len() / channels;
    let mut data = Array2::<f32>::zeros((channels, total_frames));
    for frame in 0..total_frames {
        for ch in 0..channels {
            data[(ch, frame)] = samples[frame * channels + ch];
        }
    }

    Track::new(data, sample_rate)
}

/// Save audio data to a 16-bit PCM WAV file.
///
/// # Arguments
/// * `path` - Path to save the WAV file
/// * `data` - Audio data with shape (channels, frames)
/// * `sample_rate` - Sample rate in Hz
///
/// Samples are clipped to `[-1.0, 1.0]` before quantisation.
pub fn save_wav<P: AsRef<Path>>(
    path: P,
    data: ArrayView2<'_, f32>,
    sample_rate: u32,
) -> Result<(), AudioError> {
    let channels = data.shape()[0];
    if channels == 0 || channels > u16::MAX as usize {
        return Err(AudioError::UnsupportedChannels);
    }
    let frames = data.shape()[1];

    let spec = WavSpec {
        channels: channels as u16,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for frame in 0..frames {
        for ch in 0..channels {
            let sample = data[(ch, frame)].clamp(-1.0, 1.0);
            writer.write_sample((sample * i16::MAX as f32) as i16)?;
        }
    }
    writer.finalize()?;
    Ok(())
}

/// Generate a pure tone.
pub fn tone(frequency: f32, sr: u32, duration: f32, amplitude: f32) -> Vec<f32> {
    let n_samples = (duration * sr as f32) as usize;
    let angular_freq = 2.0 * std::f32::consts::PI * frequency / sr as f32;
    (0..n_samples)
        .map(|i| amplitude * (angular_freq * i as f32).sin())
        .collect()
}

/// Generate digital silence.
pub fn silence(sr: u32, duration: f32) -> Vec<f32> {
    vec![0.0; (duration * sr as f32) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_duration() {
        let track = Track::from_mono(&vec![0.0; 22050], 22050).unwrap();
        assert!((track.duration() - 1.0).abs() < 1e-9);
        assert_eq!(track.channels(), 1);

        let stereo = Track::new(Array2::<f32>::zeros((2, 44100)), 44100).unwrap();
        assert!((stereo.duration() - 1.0).abs() < 1e-9);
        assert_eq!(stereo.channels(), 2);
    }

    #[test]
    fn test_track_rejects_zero_rate() {
        assert!(matches!(
            Track::from_mono(&[0.0; 4], 0),
            Err(AudioError::UnknownSampleRate)
        ));
    }

    #[test]
    fn test_tone() {
        let sr = 22050;
        let signal = tone(440.0, sr, 0.1, 0.5);
        assert_eq!(signal.len(), (0.1 * sr as f32) as usize);
        assert!(signal.iter().any(|&x| x.abs() > 0.45));
        assert!(signal.iter().all(|&x| x.abs() <= 0.5));
    }

    #[test]
    fn test_save_and_load_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");

        let signal = tone(440.0, 16000, 0.5, 0.8);
        let track = Track::from_mono(&signal, 16000).unwrap();
        save_wav(&path, track.samples(), track.sample_rate()).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.sample_rate(), 16000);
        assert_eq!(loaded.channels(), 1);
        assert_eq!(loaded.frames(), signal.len());
        let peak = loaded.samples().iter().fold(0.0f32, |m, v| m.max(v.abs()));
        assert!((peak - 0.8).abs() < 0.01);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(load("/nonexistent/phrasecut/missing.wav").is_err());
    }

    #[test]
    fn test_load_garbage_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.wav");
        std::fs::write(&path, b"definitely not a riff header").unwrap();
        assert!(load(&path).is_err());
    }
}
