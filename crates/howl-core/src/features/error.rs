//! Feature extraction error types

use std::path::PathBuf;
use thiserror::Error;

/// Reasons an audio file cannot be turned into a mel spectrogram
#[derive(Error, Debug)]
pub enum FeatureError {
    #[error("Failed to read audio file: {path}")]
    UnreadableFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("Audio contains no samples")]
    EmptyAudio,

    #[error("Resampling failed: {0}")]
    Resample(String),

    #[error("Spectral transform failed: {0}")]
    Transform(String),
}

pub type Result<T> = std::result::Result<T, FeatureError>;
