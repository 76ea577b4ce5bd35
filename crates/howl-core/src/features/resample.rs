//! Sample rate conversion (rubato)

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use super::error::{FeatureError, Result};

/// Input frames fed to the resampler per call
const CHUNK_SIZE: usize = 1024;

/// Resample mono audio from `from_rate` to `to_rate`.
///
/// Uses a band-limited sinc interpolator. The filter delay is compensated so the
/// output is time-aligned with the input, and the output length is
/// `ceil(len * to_rate / from_rate)`.
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }
    if from_rate == 0 || to_rate == 0 {
        return Err(FeatureError::Resample(format!(
            "Invalid sample rates: {} -> {}",
            from_rate, to_rate
        )));
    }

    let ratio = to_rate as f64 / from_rate as f64;
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Cubic,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, params, CHUNK_SIZE, 1)
        .map_err(|e| FeatureError::Resample(e.to_string()))?;

    let expected_len = (samples.len() as f64 * ratio).ceil() as usize;
    let delay = resampler.output_delay();
    let mut output: Vec<f32> = Vec::with_capacity(expected_len + delay + CHUNK_SIZE);

    let mut chunks = samples.chunks_exact(CHUNK_SIZE);
    for chunk in &mut chunks {
        let waves = resampler
            .process(&[chunk], None)
            .map_err(|e| FeatureError::Resample(e.to_string()))?;
        output.extend_from_slice(&waves[0]);
    }

    let remainder = chunks.remainder();
    if !remainder.is_empty() {
        let waves = resampler
            .process_partial(Some(&[remainder][..]), None)
            .map_err(|e| FeatureError::Resample(e.to_string()))?;
        output.extend_from_slice(&waves[0]);
    }

    // Flush the samples still held back by the filter delay
    while output.len() < expected_len + delay {
        let waves = resampler
            .process_partial::<&[f32]>(None, None)
            .map_err(|e| FeatureError::Resample(e.to_string()))?;
        if waves[0].is_empty() {
            break;
        }
        output.extend_from_slice(&waves[0]);
    }

    output.drain(..delay.min(output.len()));
    output.truncate(expected_len);
    output.resize(expected_len, 0.0);

    Ok(output)
}
