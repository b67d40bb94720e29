/// A mono audio signal at a fixed sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSignal {
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

/// Outcome of peak normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Normalization {
    /// Samples were divided by this peak absolute amplitude.
    Scaled(f32),
    /// The buffer was silent (peak of exactly zero) and was left untouched.
    Silent,
}

impl AudioSignal {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds, or 0.0 for a zero sample rate.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Maximum absolute amplitude.
    pub fn peak(&self) -> f32 {
        peak(&self.samples)
    }
}

/// Maximum absolute amplitude of a buffer (0.0 when empty).
pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max)
}

/// Scale samples so the peak absolute amplitude is exactly 1.0.
///
/// A silent buffer is left as-is. Re-normalizing an already normalized
/// buffer divides by 1.0 and is a no-op.
pub fn normalize_peak(samples: &mut [f32]) -> Normalization {
    let peak = peak(samples);
    if peak == 0.0 {
        return Normalization::Silent;
    }
    for s in samples.iter_mut() {
        *s /= peak;
    }
    Normalization::Scaled(peak)
}

/// Peak-normalize a double precision buffer and narrow it to f32.
pub(crate) fn normalize_to_f32(samples: &[f64]) -> (Vec<f32>, Normalization) {
    let peak = samples.iter().map(|s| s.abs()).fold(0.0f64, f64::max);
    if peak == 0.0 {
        return (vec![0.0; samples.len()], Normalization::Silent);
    }
    let out = samples.iter().map(|&s| (s / peak) as f32).collect();
    (out, Normalization::Scaled(peak as f32))
}

/// Average interleaved frames into a single channel.
pub fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    let scale = 1.0 / channels as f32;
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() * scale)
        .collect()
}
