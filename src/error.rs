use std::path::PathBuf;

/// Crate-level error type for phrasecut.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A configuration value is out of range or inconsistent with another.
    #[error("invalid configuration `{name}`: got {value}, {reason}")]
    InvalidConfiguration {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// No non-silent candidates were found for a track.
    #[error("no non-silent candidates to plan")]
    EmptyInput,

    /// Planner candidates are not sorted or overlap each other.
    #[error("invalid candidates: {0}")]
    InvalidCandidates(String),

    /// A time range does not satisfy `0 <= start < end`.
    #[error("invalid time range: start={start}, end={end}")]
    InvalidRange { start: f64, end: f64 },

    /// A file could not be decoded or written by the audio layer.
    #[error("failed to decode `{}`: {source}", .path.display())]
    DecodeFailure {
        path: PathBuf,
        #[source]
        source: crate::io::AudioError,
    },

    /// Audio I/O errors without an associated input file.
    #[error(transparent)]
    Audio(#[from] crate::io::AudioError),

    /// File I/O errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn config(name: &'static str, value: impl ToString, reason: &str) -> Self {
        Error::InvalidConfiguration {
            name,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Whether the batch driver may skip the current file and carry on.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::InvalidConfiguration { .. })
    }
}

/// Convenience Result type for phrasecut operations.
pub type Result<T> = std::result::Result<T, Error>;
