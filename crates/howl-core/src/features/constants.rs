//! Fixed analysis parameters
//!
//! The classifier was trained on features computed with exactly these values;
//! changing any of them silently invalidates the model.

/// Sample rate every clip is resampled to before analysis.
pub const SAMPLE_RATE: u32 = 22050;

/// Silence threshold in dB below the loudest frame.
pub const TRIM_TOP_DB: f32 = 20.0;
/// Frame length used for the silence-trimming energy envelope.
pub const TRIM_FRAME_LENGTH: usize = 2048;
/// Hop length used for the silence-trimming energy envelope.
pub const TRIM_HOP_LENGTH: usize = 512;

/// Number of mel bands (frequency axis of the model input).
pub const N_MELS: usize = 128;
/// STFT window size in samples.
pub const N_FFT: usize = 2048;
/// STFT hop size in samples.
pub const HOP_LENGTH: usize = 256;
/// Lowest mel filter edge in Hz.
pub const F_MIN: f64 = 0.0;
/// Highest mel filter edge in Hz.
pub const F_MAX: f64 = 8000.0;

/// Number of time frames (time axis of the model input).
pub const N_FRAMES: usize = 174;

/// Added to every mel power value before the log.
pub const POWER_EPSILON: f32 = 1e-9;
/// Added to the min-max denominator.
pub const NORM_EPSILON: f32 = 1e-9;
/// Smallest power value the dB conversion distinguishes.
pub const AMIN: f32 = 1e-10;
/// Dynamic range kept by the dB conversion.
pub const TOP_DB: f32 = 80.0;
