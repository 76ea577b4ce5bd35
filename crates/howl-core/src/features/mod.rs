//! Feature extraction: audio file to fixed-size mel spectrogram
//!
//! The chain is decode → mono → resample to 22050 Hz → trim silence →
//! mel power spectrogram → dB → min-max normalize → fit to 174 frames.
//! The result always has the model's input shape `(1, 128, 174, 1)`.

pub mod constants;
mod decode;
mod error;
mod mel;
mod resample;
mod trim;

use std::path::Path;

use ndarray::{Array2, Array4, ArrayView2, Axis};

pub use constants::*;
pub use decode::{decode_file, DecodedAudio};
pub use error::{FeatureError, Result};
pub use mel::{
    fit_frames, hz_to_mel, mel_filter_bank, mel_power_spectrogram, mel_to_hz, normalize,
    normalized_mel_db, power_to_db, stft_power,
};
pub use resample::resample;
pub use trim::trim_silence;

/// Normalized mel spectrogram in model input layout `(batch, mels, frames, channel)`
#[derive(Debug, Clone, PartialEq)]
pub struct MelSpectrogram {
    data: Array4<f32>,
}

impl MelSpectrogram {
    /// Wrap a `(N_MELS, N_FRAMES)` matrix.
    pub(crate) fn from_matrix(matrix: Array2<f32>) -> Self {
        debug_assert_eq!(matrix.dim(), (N_MELS, N_FRAMES));
        let data = matrix.insert_axis(Axis(0)).insert_axis(Axis(3));
        Self { data }
    }

    /// All-zero input, used to warm up the model.
    pub fn zeros() -> Self {
        Self {
            data: Array4::zeros((1, N_MELS, N_FRAMES, 1)),
        }
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn as_array(&self) -> &Array4<f32> {
        &self.data
    }

    pub fn into_array(self) -> Array4<f32> {
        self.data
    }

    /// `(mels, frames)` view without the singleton axes
    pub fn matrix(&self) -> ArrayView2<'_, f32> {
        self.data.index_axis(Axis(3), 0).index_axis_move(Axis(0), 0)
    }
}

/// Decode a file and resample it to [`SAMPLE_RATE`].
pub fn load_audio(path: &Path) -> Result<Vec<f32>> {
    let decoded = decode_file(path)?;
    log::debug!(
        "Loaded {:.2}s of audio at {} Hz",
        decoded.duration_secs(),
        decoded.sample_rate
    );
    resample(&decoded.samples, decoded.sample_rate, SAMPLE_RATE)
}

/// Extract the model input for an audio file.
pub fn extract_mel_spectrogram(path: &Path) -> Result<MelSpectrogram> {
    let samples = load_audio(path)?;
    features_from_samples(&samples)
}

/// Extract the model input from mono samples already at [`SAMPLE_RATE`].
pub fn features_from_samples(samples: &[f32]) -> Result<MelSpectrogram> {
    let trimmed = trim_silence(samples, TRIM_TOP_DB);
    if trimmed.is_empty() {
        return Err(FeatureError::EmptyAudio);
    }

    let normalized = normalized_mel_db(trimmed)?;
    log::debug!(
        "Mel spectrogram: {} frames from {} samples, fitting to {}",
        normalized.ncols(),
        trimmed.len(),
        N_FRAMES
    );

    Ok(MelSpectrogram::from_matrix(fit_frames(&normalized, N_FRAMES)))
}
