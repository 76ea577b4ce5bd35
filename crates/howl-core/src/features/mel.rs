//! Mel spectrogram computation
//!
//! - Periodic Hann window, centered frames with zero padding
//! - Power spectrum via real FFT (realfft)
//! - Slaney-scale mel filter bank with Slaney area normalization
//! - dB conversion relative to the per-clip peak, then min-max normalization

use ndarray::linalg::general_mat_vec_mul;
use ndarray::{s, Array1, Array2};
use realfft::RealFftPlanner;

use super::constants::{
    AMIN, F_MAX, F_MIN, HOP_LENGTH, NORM_EPSILON, N_FFT, N_MELS, POWER_EPSILON, SAMPLE_RATE,
    TOP_DB,
};
use super::error::{FeatureError, Result};

const MIN_LOG_HZ: f64 = 1000.0;
const MIN_LOG_MEL: f64 = 15.0;
const F_SP: f64 = 200.0 / 3.0;

fn log_step() -> f64 {
    6.4f64.ln() / 27.0
}

/// Hz to mel, Slaney scale (linear below 1 kHz, logarithmic above).
pub fn hz_to_mel(hz: f64) -> f64 {
    if hz >= MIN_LOG_HZ {
        MIN_LOG_MEL + (hz / MIN_LOG_HZ).ln() / log_step()
    } else {
        hz / F_SP
    }
}

/// Mel to Hz, Slaney scale.
pub fn mel_to_hz(mel: f64) -> f64 {
    if mel >= MIN_LOG_MEL {
        MIN_LOG_HZ * (log_step() * (mel - MIN_LOG_MEL)).exp()
    } else {
        F_SP * mel
    }
}

/// Build a `(n_mels, n_fft / 2 + 1)` triangular mel filter bank.
pub fn mel_filter_bank(
    sample_rate: u32,
    n_fft: usize,
    n_mels: usize,
    f_min: f64,
    f_max: f64,
) -> Array2<f32> {
    let n_bins = n_fft / 2 + 1;
    let fft_freqs: Vec<f64> = (0..n_bins)
        .map(|k| k as f64 * sample_rate as f64 / n_fft as f64)
        .collect();

    let mel_min = hz_to_mel(f_min);
    let mel_max = hz_to_mel(f_max);
    let mel_freqs: Vec<f64> = (0..n_mels + 2)
        .map(|i| mel_to_hz(mel_min + (mel_max - mel_min) * i as f64 / (n_mels + 1) as f64))
        .collect();

    let mut weights = Array2::<f32>::zeros((n_mels, n_bins));
    for m in 0..n_mels {
        let (left, center, right) = (mel_freqs[m], mel_freqs[m + 1], mel_freqs[m + 2]);
        let enorm = 2.0 / (right - left);
        for (k, &freq) in fft_freqs.iter().enumerate() {
            let lower = (freq - left) / (center - left);
            let upper = (right - freq) / (right - center);
            let w = lower.min(upper).max(0.0);
            weights[[m, k]] = (w * enorm) as f32;
        }
    }

    weights
}

/// Periodic Hann window
fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let phase = 2.0 * std::f32::consts::PI * i as f32 / size as f32;
            0.5 * (1.0 - phase.cos())
        })
        .collect()
}

/// Centered, windowed power spectra, one call to `on_frame` per frame.
///
/// The signal is zero-padded by `n_fft / 2` on both sides so frame `t` is
/// centered on sample `t * hop`.
fn for_each_power_frame<F>(
    samples: &[f32],
    n_fft: usize,
    hop: usize,
    mut on_frame: F,
) -> Result<()>
where
    F: FnMut(usize, &Array1<f32>),
{
    let pad = n_fft / 2;
    let mut padded = vec![0.0f32; samples.len() + 2 * pad];
    padded[pad..pad + samples.len()].copy_from_slice(samples);

    let n_frames = 1 + (padded.len() - n_fft) / hop;

    let mut planner = RealFftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(n_fft);
    let window = hann_window(n_fft);

    let mut scratch = fft.make_scratch_vec();
    let mut frame_buf = vec![0.0f32; n_fft];
    let mut spectrum = fft.make_output_vec();
    let mut power = Array1::<f32>::zeros(n_fft / 2 + 1);

    for frame_idx in 0..n_frames {
        let start = frame_idx * hop;
        for (i, sample) in frame_buf.iter_mut().enumerate() {
            *sample = padded[start + i] * window[i];
        }

        fft.process_with_scratch(&mut frame_buf, &mut spectrum, &mut scratch)
            .map_err(|e| FeatureError::Transform(format!("FFT failed: {:?}", e)))?;

        for (p, c) in power.iter_mut().zip(spectrum.iter()) {
            *p = c.re * c.re + c.im * c.im;
        }
        on_frame(frame_idx, &power);
    }

    Ok(())
}

/// Power STFT, shape `(n_fft / 2 + 1, 1 + len / hop)`.
pub fn stft_power(samples: &[f32], n_fft: usize, hop: usize) -> Result<Array2<f32>> {
    let n_frames = 1 + samples.len() / hop;
    let mut power = Array2::<f32>::zeros((n_fft / 2 + 1, n_frames));
    for_each_power_frame(samples, n_fft, hop, |t, frame| {
        power.column_mut(t).assign(frame);
    })?;
    Ok(power)
}

/// Mel power spectrogram with the model's analysis parameters, shape `(N_MELS, frames)`.
///
/// Each frame is projected onto the filter bank as soon as it is computed, so
/// the linear-frequency spectrogram is never held in full.
pub fn mel_power_spectrogram(samples: &[f32]) -> Result<Array2<f32>> {
    if samples.is_empty() {
        return Err(FeatureError::EmptyAudio);
    }
    let filters = mel_filter_bank(SAMPLE_RATE, N_FFT, N_MELS, F_MIN, F_MAX);
    let n_frames = 1 + samples.len() / HOP_LENGTH;
    let mut mel = Array2::<f32>::zeros((N_MELS, n_frames));
    for_each_power_frame(samples, N_FFT, HOP_LENGTH, |t, frame| {
        general_mat_vec_mul(1.0, &filters, frame, 0.0, &mut mel.column_mut(t));
    })?;
    Ok(mel)
}

/// Convert mel power to dB relative to the clip's peak.
///
/// `POWER_EPSILON` is added to every value first, and the result is floored
/// `TOP_DB` below its maximum.
pub fn power_to_db(power: &Array2<f32>) -> Array2<f32> {
    let shifted = power.mapv(|v| v + POWER_EPSILON);
    let reference = shifted.fold(AMIN, |acc, &v| acc.max(v));
    let ref_db = 10.0 * reference.max(AMIN).log10();

    let mut db = shifted.mapv(|v| 10.0 * v.max(AMIN).log10() - ref_db);
    let peak = db.fold(f32::NEG_INFINITY, |acc, &v| acc.max(v));
    let floor = peak - TOP_DB;
    db.mapv_inplace(|v| v.max(floor));
    db
}

/// Min-max normalize into `[0, 1]`; a constant matrix becomes all zeros.
pub fn normalize(db: &Array2<f32>) -> Array2<f32> {
    let min = db.fold(f32::INFINITY, |acc, &v| acc.min(v));
    let max = db.fold(f32::NEG_INFINITY, |acc, &v| acc.max(v));
    let range = max - min + NORM_EPSILON;
    db.mapv(|v| ((v - min) / range).clamp(0.0, 1.0))
}

/// Zero-pad or crop the time axis to exactly `n_frames` columns.
pub fn fit_frames(spec: &Array2<f32>, n_frames: usize) -> Array2<f32> {
    let mut fitted = Array2::<f32>::zeros((spec.nrows(), n_frames));
    let keep = spec.ncols().min(n_frames);
    fitted
        .slice_mut(s![.., ..keep])
        .assign(&spec.slice(s![.., ..keep]));
    fitted
}

/// Full-length normalized dB mel spectrogram of already-trimmed samples.
pub fn normalized_mel_db(samples: &[f32]) -> Result<Array2<f32>> {
    let mel = mel_power_spectrogram(samples)?;
    Ok(normalize(&power_to_db(&mel)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mel_hz_roundtrip() {
        for hz in [0.0, 440.0, 999.0, 1000.0, 4000.0, 8000.0] {
            let back = mel_to_hz(hz_to_mel(hz));
            assert!((back - hz).abs() < 1e-6, "Roundtrip: {} -> {}", hz, back);
        }
    }

    #[test]
    fn test_slaney_breakpoint() {
        assert!((hz_to_mel(1000.0) - 15.0).abs() < 1e-9);
        assert!((hz_to_mel(500.0) - 7.5).abs() < 1e-9);
    }

    #[test]
    fn test_filter_bank_shape_and_ceiling() {
        let bank = mel_filter_bank(SAMPLE_RATE, N_FFT, N_MELS, F_MIN, F_MAX);
        assert_eq!(bank.dim(), (N_MELS, N_FFT / 2 + 1));

        // No energy is picked up above the 8 kHz ceiling
        let ceiling_bin = (F_MAX * N_FFT as f64 / SAMPLE_RATE as f64).ceil() as usize;
        for k in ceiling_bin..bank.ncols() {
            assert!(bank.column(k).iter().all(|&w| w == 0.0), "bin {} has weight", k);
        }

        // Every filter covers at least one bin
        for m in 0..N_MELS {
            assert!(bank.row(m).iter().any(|&w| w > 0.0), "filter {} is empty", m);
        }
    }

    #[test]
    fn test_stft_frame_count() {
        let power = stft_power(&vec![0.0; 10_000], N_FFT, HOP_LENGTH).unwrap();
        assert_eq!(power.dim(), (N_FFT / 2 + 1, 1 + 10_000 / HOP_LENGTH));
    }

    #[test]
    fn test_stft_peak_at_tone_bin() {
        let freq = 1000.0f32;
        let samples: Vec<f32> = (0..22050)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / SAMPLE_RATE as f32).sin())
            .collect();
        let power = stft_power(&samples, N_FFT, HOP_LENGTH).unwrap();

        let column = power.column(40);
        let peak_bin = column
            .iter()
            .enumerate()
            .fold((0, f32::MIN), |best, (k, &p)| if p > best.1 { (k, p) } else { best })
            .0;
        let expected = (freq as f64 * N_FFT as f64 / SAMPLE_RATE as f64).round() as usize;
        assert!((peak_bin as isize - expected as isize).abs() <= 1);
    }

    #[test]
    fn test_streamed_mel_matches_full_projection() {
        let samples: Vec<f32> = (0..30_000)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                (2.0 * std::f32::consts::PI * 330.0 * t).sin() * 0.4
                    + (2.0 * std::f32::consts::PI * 2500.0 * t).sin() * 0.2
            })
            .collect();

        let filters = mel_filter_bank(SAMPLE_RATE, N_FFT, N_MELS, F_MIN, F_MAX);
        let full = filters.dot(&stft_power(&samples, N_FFT, HOP_LENGTH).unwrap());
        let streamed = mel_power_spectrogram(&samples).unwrap();

        assert_eq!(streamed.dim(), full.dim());
        let peak = full.fold(0.0f32, |acc, &v| acc.max(v));
        for (a, b) in streamed.iter().zip(full.iter()) {
            assert!((a - b).abs() <= peak * 1e-5, "{} vs {}", a, b);
        }
    }

    #[test]
    fn test_power_to_db_reference_is_peak() {
        let power = Array2::from_shape_vec((1, 3), vec![1.0, 0.1, 0.01]).unwrap();
        let db = power_to_db(&power);
        assert!(db[[0, 0]].abs() < 1e-4);
        assert!((db[[0, 1]] + 10.0).abs() < 1e-3);
        assert!((db[[0, 2]] + 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_power_to_db_floor() {
        let power = Array2::from_shape_vec((1, 2), vec![1.0, 1e-12]).unwrap();
        let db = power_to_db(&power);
        assert!((db[[0, 1]] + TOP_DB).abs() < 1e-3);
    }

    #[test]
    fn test_normalize_constant_is_zero() {
        let db = Array2::from_elem((4, 4), -12.5f32);
        assert!(normalize(&db).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_normalize_range() {
        let db = Array2::from_shape_vec((1, 3), vec![-80.0, -40.0, 0.0]).unwrap();
        let n = normalize(&db);
        assert_eq!(n[[0, 0]], 0.0);
        assert!((n[[0, 1]] - 0.5).abs() < 1e-6);
        assert!(n[[0, 2]] <= 1.0 && n[[0, 2]] > 0.999);
    }

    #[test]
    fn test_fit_frames_pads_and_crops() {
        let spec = Array2::from_elem((2, 3), 1.0f32);
        let padded = fit_frames(&spec, 5);
        assert_eq!(padded.dim(), (2, 5));
        assert_eq!(padded.slice(s![.., 3..]).sum(), 0.0);

        let spec = Array2::from_shape_fn((2, 8), |(_, t)| t as f32);
        let cropped = fit_frames(&spec, 5);
        assert_eq!(cropped.dim(), (2, 5));
        assert_eq!(cropped.row(0).to_vec(), vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_empty_samples_rejected() {
        assert!(matches!(
            mel_power_spectrogram(&[]),
            Err(FeatureError::EmptyAudio)
        ));
    }
}
