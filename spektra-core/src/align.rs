//! Sample-rate and length reconciliation between two signals.
//!
//! Encoding forces the watermark onto the host's length; decoding only
//! needs a common comparison window and truncates both inputs to it.

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use tracing::debug;

use crate::error::{Error, Result};
use crate::signal::AudioSignal;

const SINC_LEN: usize = 256;

/// Resample mono samples from `from_rate` to `to_rate`.
///
/// Uses band-limited sinc interpolation. The output is time-aligned with the
/// input and holds `ceil(n * to / from)` samples. Equal rates return a copy.
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    if from_rate == 0 || to_rate == 0 {
        return Err(Error::Resample(format!(
            "sample rates must be positive, got {from_rate} Hz -> {to_rate} Hz"
        )));
    }
    if from_rate == to_rate {
        debug!("Sample rate already at {}Hz, skipping resample", to_rate);
        return Ok(samples.to_vec());
    }
    if samples.is_empty() {
        return Ok(Vec::new());
    }

    let ratio = to_rate as f64 / from_rate as f64;
    let expected = (samples.len() as f64 * ratio).ceil() as usize;

    let params = SincInterpolationParameters {
        sinc_len: SINC_LEN,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    // Single pass over the whole input, then zero-filled flushes until the
    // filter has released every output sample. Inputs shorter than the sinc
    // half-length need more than one flush.
    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, params, samples.len(), 1)
        .map_err(|e| Error::Resample(format!("failed to create resampler: {e}")))?;

    let input = vec![samples.to_vec()];
    let mut output = resampler
        .process(&input, None)
        .map_err(|e| Error::Resample(e.to_string()))?
        .swap_remove(0);
    let max_flushes = SINC_LEN / samples.len() + 4;
    for _ in 0..max_flushes {
        if output.len() >= expected {
            break;
        }
        let tail = resampler
            .process_partial(None::<&[Vec<f32>]>, None)
            .map_err(|e| Error::Resample(e.to_string()))?
            .swap_remove(0);
        output.extend_from_slice(&tail);
    }

    // SincFixedIn already compensates its own delay
    output.resize(expected, 0.0);

    debug!(
        "Resampled {} samples ({} Hz) -> {} samples ({} Hz)",
        samples.len(),
        from_rate,
        output.len(),
        to_rate
    );

    Ok(output)
}

/// Bring `other` to the sample rate of `reference`.
pub fn match_rate(reference: &AudioSignal, other: &AudioSignal) -> Result<AudioSignal> {
    let samples = resample(&other.samples, other.sample_rate, reference.sample_rate)?;
    Ok(AudioSignal::new(samples, reference.sample_rate))
}

/// Truncate or right-pad with zeros to exactly `len` samples.
pub fn fit_to_length(samples: &[f32], len: usize) -> Vec<f32> {
    let mut out = samples[..samples.len().min(len)].to_vec();
    out.resize(len, 0.0);
    out
}

/// Truncate both buffers to their common (shorter) length.
pub fn truncate_to_common<'a>(a: &'a [f32], b: &'a [f32]) -> (&'a [f32], &'a [f32]) {
    let n = a.len().min(b.len());
    (&a[..n], &b[..n])
}
