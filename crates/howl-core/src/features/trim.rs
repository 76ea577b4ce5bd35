//! Leading/trailing silence removal

use super::constants::{AMIN, TRIM_FRAME_LENGTH, TRIM_HOP_LENGTH};

/// Trim leading and trailing silence.
///
/// The signal is cut into centered, zero-padded frames of `TRIM_FRAME_LENGTH`
/// samples every `TRIM_HOP_LENGTH` samples. A frame is silent when its mean
/// power is more than `top_db` dB below the loudest frame. The returned slice
/// spans from the first to the last non-silent frame.
///
/// An all-zero signal has no dynamic range at all, so nothing is trimmed.
pub fn trim_silence(samples: &[f32], top_db: f32) -> &[f32] {
    if samples.is_empty() {
        return samples;
    }

    let power = frame_power(samples, TRIM_FRAME_LENGTH, TRIM_HOP_LENGTH);
    let reference = power.iter().copied().fold(0.0f32, f32::max);
    let ref_db = 10.0 * reference.max(AMIN).log10();

    let is_loud = |p: &f32| 10.0 * p.max(AMIN).log10() - ref_db > -top_db;

    let first = power.iter().position(is_loud);
    let last = power.iter().rposition(is_loud);

    match (first, last) {
        (Some(first), Some(last)) => {
            let end = ((last + 1) * TRIM_HOP_LENGTH).min(samples.len());
            let start = (first * TRIM_HOP_LENGTH).min(end);
            &samples[start..end]
        }
        _ => &samples[..0],
    }
}

/// Mean power of centered frames.
///
/// Frame `t` covers `[t * hop - frame_length / 2, t * hop + frame_length / 2)`,
/// samples outside the signal count as zero. There are `1 + len / hop` frames.
fn frame_power(samples: &[f32], frame_length: usize, hop: usize) -> Vec<f32> {
    // Prefix sums of squares make every frame O(1)
    let mut prefix = Vec::with_capacity(samples.len() + 1);
    prefix.push(0.0f64);
    let mut acc = 0.0f64;
    for &s in samples {
        acc += (s as f64) * (s as f64);
        prefix.push(acc);
    }

    let half = frame_length / 2;
    let n_frames = 1 + samples.len() / hop;

    (0..n_frames)
        .map(|t| {
            let center = t * hop;
            let start = center.saturating_sub(half).min(samples.len());
            let end = (center + half).min(samples.len());
            ((prefix[end] - prefix[start]) / frame_length as f64) as f32
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::constants::TRIM_TOP_DB;

    fn tone(len: usize, amplitude: f32) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 22050.0).sin() * amplitude)
            .collect()
    }

    #[test]
    fn test_frame_count() {
        let power = frame_power(&vec![0.5; 5000], 2048, 512);
        assert_eq!(power.len(), 1 + 5000 / 512);
    }

    #[test]
    fn test_frame_power_constant_signal() {
        let power = frame_power(&vec![0.5; 10_000], 2048, 512);
        // Interior frames see the full window
        assert!((power[5] - 0.25).abs() < 1e-6);
        // The first frame is half padding
        assert!((power[0] - 0.125).abs() < 1e-6);
    }

    #[test]
    fn test_trims_surrounding_silence() {
        let mut samples = vec![0.0f32; 22050];
        samples.extend(tone(22050, 0.5));
        samples.extend(vec![0.0f32; 22050]);

        let trimmed = trim_silence(&samples, TRIM_TOP_DB);
        assert!(trimmed.len() < samples.len());
        // The tone survives, give or take one frame on either side
        assert!(trimmed.len() >= 22050);
        assert!(trimmed.len() <= 22050 + 2 * TRIM_FRAME_LENGTH);
    }

    #[test]
    fn test_quiet_noise_floor_is_trimmed() {
        // -40 dB floor around a loud burst
        let mut samples = tone(11025, 0.005);
        samples.extend(tone(11025, 0.5));
        samples.extend(tone(11025, 0.005));

        let trimmed = trim_silence(&samples, TRIM_TOP_DB);
        assert!(trimmed.len() < 11025 + 2 * TRIM_FRAME_LENGTH);
    }

    #[test]
    fn test_all_zero_is_untouched() {
        let samples = vec![0.0f32; 4096];
        assert_eq!(trim_silence(&samples, TRIM_TOP_DB).len(), 4096);
    }

    #[test]
    fn test_empty_input() {
        assert!(trim_silence(&[], TRIM_TOP_DB).is_empty());
    }

    #[test]
    fn test_constant_tone_is_untouched() {
        let samples = tone(22050, 0.3);
        assert_eq!(trim_silence(&samples, TRIM_TOP_DB).len(), samples.len());
    }
}
