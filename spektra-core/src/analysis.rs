//! Spectral inspection helpers for checking recovered watermarks.

use realfft::{RealFftPlanner, RealToComplex};

use crate::signal::AudioSignal;

/// Frequency in Hz of the strongest non-DC bin of a real FFT over the whole
/// signal. `None` for signals shorter than two samples or a zero sample rate.
pub fn dominant_frequency(signal: &AudioSignal) -> Option<f32> {
    let n = signal.len();
    if n < 2 || signal.sample_rate == 0 {
        return None;
    }

    let mut planner = RealFftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(n);
    let mut input = signal.samples.clone();
    let mut spectrum = fft.make_output_vec();
    fft.process(&mut input, &mut spectrum).ok()?;

    let (bin, _) = spectrum
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, c)| (i, c.norm_sqr()))
        .fold((0usize, 0.0f32), |best, cur| if cur.1 > best.1 { cur } else { best });
    if bin == 0 {
        return None;
    }
    Some(bin as f32 * signal.sample_rate as f32 / n as f32)
}

/// Pearson correlation of `a` and `b` over their common prefix.
///
/// Returns 0.0 when either side has no variance.
pub fn correlation(a: &[f32], b: &[f32]) -> f32 {
    let n = a.len().min(b.len());
    if n == 0 {
        return 0.0;
    }
    let (a, b) = (&a[..n], &b[..n]);
    let mean_a = a.iter().map(|&x| x as f64).sum::<f64>() / n as f64;
    let mean_b = b.iter().map(|&x| x as f64).sum::<f64>() / n as f64;

    let mut cov = 0.0f64;
    let mut var_a = 0.0f64;
    let mut var_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let dx = x as f64 - mean_a;
        let dy = y as f64 - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }
    if var_a == 0.0 || var_b == 0.0 {
        return 0.0;
    }
    (cov / (var_a.sqrt() * var_b.sqrt())) as f32
}
