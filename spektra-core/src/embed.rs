use rustfft::num_complex::Complex64;

use crate::align;
use crate::config::WatermarkConfig;
use crate::error::{Error, Result};
use crate::metadata::{MetadataStore, WatermarkMetadata};
use crate::signal::{AudioSignal, normalize_to_f32};
use crate::spectrum::SpectrumProcessor;

/// Output of an encode operation.
#[derive(Debug, Clone)]
pub struct Encoded {
    /// Peak-normalized watermarked signal at the host's sample rate.
    pub signal: AudioSignal,
    /// Record the matching decode needs.
    pub metadata: WatermarkMetadata,
}

/// Embed `watermark` into `host`.
///
/// The watermark is resampled to the host's rate, its length at that point is
/// captured in the returned metadata, and it is then truncated or zero-padded
/// to the host's length. Both signals are transformed over their full length
/// and `alpha * watermark` is added to every bin at or above the band start.
/// The band is addressed by raw index, so it covers the mirrored
/// negative-frequency half of the spectrum as well.
pub fn encode(
    host: &AudioSignal,
    watermark: &AudioSignal,
    config: &WatermarkConfig,
) -> Result<Encoded> {
    config.validate()?;
    if host.is_empty() {
        return Err(Error::EmptySignal { role: "host" });
    }

    let watermark = align::match_rate(host, watermark)?;
    if watermark.is_empty() {
        return Err(Error::EmptySignal { role: "watermark" });
    }
    let metadata = WatermarkMetadata::new(watermark.len() as u64);

    let n = host.len();
    let fitted = align::fit_to_length(&watermark.samples, n);

    let fft = SpectrumProcessor::new(n)?;
    let (mut combined, watermark_bins) = fft.forward_pair(&host.samples, &fitted)?;

    let start = config.band_start(n);
    embed_band(&mut combined[start..], &watermark_bins[start..], config.alpha);

    let time = fft.inverse_real(combined)?;
    let (samples, _) = normalize_to_f32(&time);

    Ok(Encoded {
        signal: AudioSignal::new(samples, host.sample_rate),
        metadata,
    })
}

/// Encode and record the metadata under `session`.
pub fn encode_with_store<S: MetadataStore + ?Sized>(
    store: &S,
    session: &str,
    host: &AudioSignal,
    watermark: &AudioSignal,
    config: &WatermarkConfig,
) -> Result<AudioSignal> {
    let encoded = encode(host, watermark, config)?;
    store.save(session, &encoded.metadata)?;
    Ok(encoded.signal)
}

/// Add `alpha * watermark` onto `host`, bin by bin.
fn embed_band(host: &mut [Complex64], watermark: &[Complex64], alpha: f64) {
    for (h, w) in host.iter_mut().zip(watermark.iter()) {
        *h += *w * alpha;
    }
}
