pub mod align;
pub mod analysis;
pub mod config;
pub mod embed;
pub mod error;
pub mod extract;
pub mod io;
pub mod metadata;
pub mod signal;
pub mod spectrum;

// Re-export primary API types
pub use config::{OutputFormat, WatermarkConfig};
pub use embed::Encoded;
pub use error::Error;
pub use metadata::{MemoryStore, MetadataStore, SidecarStore, WatermarkMetadata};
pub use signal::{AudioSignal, Normalization};

/// Embed `watermark` into `host` in the frequency domain.
///
/// The returned [`Encoded::metadata`] must accompany the watermarked signal to
/// the matching [`decode`] call.
pub fn encode(
    host: &AudioSignal,
    watermark: &AudioSignal,
    config: &WatermarkConfig,
) -> error::Result<Encoded> {
    embed::encode(host, watermark, config)
}

/// Recover the watermark from `watermarked` given the original `host`.
pub fn decode(
    host: &AudioSignal,
    watermarked: &AudioSignal,
    metadata: &WatermarkMetadata,
    config: &WatermarkConfig,
) -> error::Result<AudioSignal> {
    extract::decode(host, watermarked, metadata, config)
}

/// Byte-level encode: audio containers in, mono WAV out.
///
/// `original` may be any container the loader understands. The output WAV has
/// the original's sample rate and the sample encoding of `config.output_format`.
pub fn encode_bytes(
    original: &[u8],
    watermark: &[u8],
    config: &WatermarkConfig,
) -> error::Result<(Vec<u8>, WatermarkMetadata)> {
    let host = io::load_bytes(original)?;
    let watermark = io::load_bytes(watermark)?;
    let encoded = embed::encode(&host, &watermark, config)?;
    let bytes = io::write_wav_bytes(&encoded.signal, config.output_format)?;
    Ok((bytes, encoded.metadata))
}

/// Byte-level decode: audio containers in, extracted watermark as mono WAV out.
pub fn decode_bytes(
    original: &[u8],
    watermarked: &[u8],
    metadata: &WatermarkMetadata,
    config: &WatermarkConfig,
) -> error::Result<Vec<u8>> {
    let host = io::load_bytes(original)?;
    let watermarked = io::load_bytes(watermarked)?;
    let extracted = extract::decode(&host, &watermarked, metadata, config)?;
    io::write_wav_bytes(&extracted, config.output_format)
}
