use rustfft::num_complex::Complex64;

use crate::align;
use crate::config::WatermarkConfig;
use crate::error::{Error, Result};
use crate::metadata::{MetadataStore, WatermarkMetadata};
use crate::signal::{AudioSignal, normalize_to_f32};
use crate::spectrum::SpectrumProcessor;

/// Recover the watermark from `watermarked` given the original `host`.
///
/// `watermarked` is resampled to the host's rate and both are truncated to
/// their common length `n`. The band start is recomputed from `n`, so the
/// watermarked signal must keep the exact sample count produced by the
/// encoder for the bands to line up. The result is trimmed to
/// `metadata.original_watermark_length` (or `n` if shorter) and
/// peak-normalized unless it is silent.
pub fn decode(
    host: &AudioSignal,
    watermarked: &AudioSignal,
    metadata: &WatermarkMetadata,
    config: &WatermarkConfig,
) -> Result<AudioSignal> {
    config.validate()?;
    if host.is_empty() {
        return Err(Error::EmptySignal { role: "host" });
    }

    let watermarked = align::match_rate(host, watermarked)?;
    if watermarked.is_empty() {
        return Err(Error::EmptySignal {
            role: "watermarked",
        });
    }
    let (host_samples, marked_samples) =
        align::truncate_to_common(&host.samples, &watermarked.samples);
    let n = host_samples.len();

    let fft = SpectrumProcessor::new(n)?;
    let (host_bins, marked_bins) = fft.forward_pair(host_samples, marked_samples)?;

    let start = config.band_start(n);
    let mut extracted = vec![Complex64::new(0.0, 0.0); n];
    extract_band(
        &mut extracted[start..],
        &host_bins[start..],
        &marked_bins[start..],
        config.alpha,
    );

    let mut time = fft.inverse_real(extracted)?;
    let keep = usize::try_from(metadata.original_watermark_length)
        .unwrap_or(usize::MAX)
        .min(n);
    time.truncate(keep);

    let (samples, _) = normalize_to_f32(&time);
    Ok(AudioSignal::new(samples, host.sample_rate))
}

/// Decode using the metadata recorded for `session`.
///
/// Fails with [`Error::MetadataMissing`] when no encode stored a record under
/// that session.
pub fn decode_with_store<S: MetadataStore + ?Sized>(
    store: &S,
    session: &str,
    host: &AudioSignal,
    watermarked: &AudioSignal,
    config: &WatermarkConfig,
) -> Result<AudioSignal> {
    let metadata = store
        .load(session)?
        .ok_or_else(|| Error::MetadataMissing(session.to_string()))?;
    decode(host, watermarked, &metadata, config)
}

/// `(marked - host) / alpha`, bin by bin.
fn extract_band(out: &mut [Complex64], host: &[Complex64], marked: &[Complex64], alpha: f64) {
    for ((o, h), m) in out.iter_mut().zip(host.iter()).zip(marked.iter()) {
        *o = (*m - *h) / alpha;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::encode;
    use crate::metadata::MemoryStore;

    fn sine(freq: f32, sample_rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn length_follows_metadata() {
        let host = AudioSignal::new(sine(440.0, 8000, 8000), 8000);
        let watermark = AudioSignal::new(sine(1000.0, 8000, 3000), 8000);
        let config = WatermarkConfig::default();
        let encoded = encode(&host, &watermark, &config).unwrap();

        let extracted = decode(&host, &encoded.signal, &encoded.metadata, &config).unwrap();
        assert_eq!(extracted.len(), 3000);
        assert_eq!(extracted.sample_rate, 8000);
    }

    #[test]
    fn length_clipped_to_common_window() {
        let host = AudioSignal::new(sine(440.0, 8000, 1000), 8000);
        let watermark = AudioSignal::new(sine(1000.0, 8000, 4000), 8000);
        let config = WatermarkConfig::default();
        let encoded = encode(&host, &watermark, &config).unwrap();
        assert_eq!(encoded.metadata.original_watermark_length, 4000);

        let extracted = decode(&host, &encoded.signal, &encoded.metadata, &config).unwrap();
        assert_eq!(extracted.len(), 1000);
    }

    #[test]
    fn truncates_to_shorter_input() {
        let host = AudioSignal::new(sine(440.0, 8000, 2000), 8000);
        let marked = AudioSignal::new(sine(440.0, 8000, 1200), 8000);
        let meta = WatermarkMetadata::new(u64::MAX);
        let extracted = decode(&host, &marked, &meta, &WatermarkConfig::default()).unwrap();
        assert_eq!(extracted.len(), 1200);
    }

    #[test]
    fn identical_inputs_give_silence() {
        let host = AudioSignal::new(sine(440.0, 8000, 500), 8000);
        let meta = WatermarkMetadata::new(500);
        let extracted = decode(&host, &host, &meta, &WatermarkConfig::default()).unwrap();
        assert_eq!(extracted.len(), 500);
        assert!(extracted.samples.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn recovered_tone_matches_watermark() {
        // Host must already sit at unit peak, otherwise the encoder's
        // normalization leaks host energy into the extracted band.
        let mut host_samples = sine(440.0, 8000, 8000);
        crate::signal::normalize_peak(&mut host_samples);
        let host = AudioSignal::new(host_samples, 8000);
        let watermark = AudioSignal::new(sine(880.0, 8000, 8000), 8000);
        let config = WatermarkConfig::default();
        let encoded = encode(&host, &watermark, &config).unwrap();
        let extracted = decode(&host, &encoded.signal, &encoded.metadata, &config).unwrap();

        let max_err = extracted
            .samples
            .iter()
            .zip(watermark.samples.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0f32, f32::max);
        assert!(max_err < 1e-3, "recovered watermark deviates by {max_err}");
    }

    #[test]
    fn missing_metadata_fails() {
        let store = MemoryStore::new();
        let host = AudioSignal::new(sine(440.0, 8000, 500), 8000);
        let result = decode_with_store(
            &store,
            "never-encoded",
            &host,
            &host,
            &WatermarkConfig::default(),
        );
        assert!(matches!(result, Err(Error::MetadataMissing(ref s)) if s == "never-encoded"));
    }

    #[test]
    fn sessions_do_not_share_metadata() {
        let store = MemoryStore::new();
        let config = WatermarkConfig::default();
        let host = AudioSignal::new(sine(440.0, 8000, 4000), 8000);

        let short = AudioSignal::new(sine(1000.0, 8000, 1000), 8000);
        let long = AudioSignal::new(sine(1500.0, 8000, 3000), 8000);
        let marked_a =
            crate::embed::encode_with_store(&store, "a", &host, &short, &config).unwrap();
        let marked_b = crate::embed::encode_with_store(&store, "b", &host, &long, &config).unwrap();

        let out_a = decode_with_store(&store, "a", &host, &marked_a, &config).unwrap();
        let out_b = decode_with_store(&store, "b", &host, &marked_b, &config).unwrap();
        assert_eq!(out_a.len(), 1000);
        assert_eq!(out_b.len(), 3000);
    }

    #[test]
    fn empty_inputs_rejected() {
        let config = WatermarkConfig::default();
        let meta = WatermarkMetadata::new(10);
        let empty = AudioSignal::new(Vec::new(), 8000);
        let some = AudioSignal::new(vec![0.5; 16], 8000);
        assert!(matches!(
            decode(&empty, &some, &meta, &config),
            Err(Error::EmptySignal { role: "host" })
        ));
        assert!(matches!(
            decode(&some, &empty, &meta, &config),
            Err(Error::EmptySignal { role: "watermarked" })
        ));
    }
}
