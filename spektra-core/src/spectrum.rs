use rustfft::num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

use crate::error::{Error, Result};

/// Planned full-length complex DFT pair for a fixed signal length.
///
/// Unlike a real-input transform, the whole conjugate-symmetric spectrum
/// (indices `0..n`) is materialized so callers can address every bin.
pub struct SpectrumProcessor {
    len: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

impl SpectrumProcessor {
    /// Plan transforms for signals of exactly `len` samples. `len` must be > 0.
    pub fn new(len: usize) -> Result<Self> {
        if len == 0 {
            return Err(Error::EmptySignal { role: "spectrum" });
        }
        let mut planner = FftPlanner::<f64>::new();
        let forward = planner.plan_fft_forward(len);
        let inverse = planner.plan_fft_inverse(len);
        Ok(Self {
            len,
            forward,
            inverse,
        })
    }

    /// Transform length.
    pub fn signal_len(&self) -> usize {
        self.len
    }

    /// Forward DFT of real samples. `samples` must have exactly `len` elements.
    pub fn forward(&self, samples: &[f32]) -> Result<Vec<Complex64>> {
        self.check_len(samples.len())?;
        let mut buf: Vec<Complex64> = samples
            .iter()
            .map(|&s| Complex64::new(s as f64, 0.0))
            .collect();
        self.forward.process(&mut buf);
        Ok(buf)
    }

    /// Forward DFT of two equal-length signals.
    #[cfg(not(feature = "parallel"))]
    pub fn forward_pair(
        &self,
        a: &[f32],
        b: &[f32],
    ) -> Result<(Vec<Complex64>, Vec<Complex64>)> {
        Ok((self.forward(a)?, self.forward(b)?))
    }

    /// Forward DFT of two equal-length signals, computed on the rayon pool.
    #[cfg(feature = "parallel")]
    pub fn forward_pair(
        &self,
        a: &[f32],
        b: &[f32],
    ) -> Result<(Vec<Complex64>, Vec<Complex64>)> {
        let (fa, fb) = rayon::join(|| self.forward(a), || self.forward(b));
        Ok((fa?, fb?))
    }

    /// Inverse DFT, keeping only the real part, scaled by `1 / len`.
    pub fn inverse_real(&self, mut spectrum: Vec<Complex64>) -> Result<Vec<f64>> {
        self.check_len(spectrum.len())?;
        self.inverse.process(&mut spectrum);
        let scale = 1.0 / self.len as f64;
        Ok(spectrum.iter().map(|c| c.re * scale).collect())
    }

    fn check_len(&self, got: usize) -> Result<()> {
        if got != self.len {
            return Err(Error::Fft(format!(
                "spectrum length mismatch: expected {}, got {}",
                self.len, got
            )));
        }
        Ok(())
    }
}
