use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while resolving, reading or normalizing a confocal image.
#[derive(Debug, Error)]
pub enum Error {
    #[error("No image at index {index} in '{path}' ({available} available)")]
    NotFound {
        path: PathBuf,
        index: usize,
        available: usize,
    },

    #[error("Channel '{name}' not found")]
    ChannelNotFound { name: String },

    #[error("Timepoint {t} out of range ({count} timepoints)")]
    TimepointOutOfRange { t: usize, count: usize },

    #[error("Invalid metadata: {0}")]
    Metadata(String),

    #[error("Failed to decode '{path}': {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Image has no positive pixels")]
    EmptyImage,

    #[error("Percentile must be within [0, 100], got {0}")]
    InvalidPercentile(f64),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

impl Error {
    pub(crate) fn decode(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::Decode {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
