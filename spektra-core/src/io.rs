//! Audio container loading and WAV serialization.
//!
//! WAV input is read with `hound`; anything else (FLAC, MP3, Vorbis, AAC)
//! goes through `symphonia`. Every input is downmixed to mono at its native
//! sample rate. Output is always mono WAV.

use std::io::{Cursor, ErrorKind};
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

use crate::config::OutputFormat;
use crate::error::{Error, Result};
use crate::signal::{AudioSignal, downmix};

/// Load an audio file from disk.
pub fn load_file(path: &Path) -> Result<AudioSignal> {
    let bytes = std::fs::read(path)
        .map_err(|e| Error::Decode(format!("{}: {e}", path.display())))?;
    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }
    debug!("Loading {} ({} bytes)", path.display(), bytes.len());
    load_with_hint(bytes, &hint)
}

/// Load an audio container held in memory.
pub fn load_bytes(bytes: &[u8]) -> Result<AudioSignal> {
    load_with_hint(bytes.to_vec(), &Hint::new())
}

fn load_with_hint(bytes: Vec<u8>, hint: &Hint) -> Result<AudioSignal> {
    if is_riff_wave(&bytes) {
        match load_wav(&bytes) {
            Ok(signal) => return Ok(signal),
            Err(e) => debug!("hound rejected WAV input ({e}), retrying with symphonia"),
        }
    }
    load_compressed(bytes, hint)
}

fn is_riff_wave(bytes: &[u8]) -> bool {
    bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE"
}

/// Decode a WAV container, downmixing to mono.
pub fn load_wav(bytes: &[u8]) -> Result<AudioSignal> {
    let reader =
        hound::WavReader::new(Cursor::new(bytes)).map_err(|e| Error::Decode(e.to_string()))?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(|e| Error::Decode(e.to_string()))?,
        hound::SampleFormat::Int => {
            let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .collect::<std::result::Result<Vec<i32>, _>>()
                .map_err(|e| Error::Decode(e.to_string()))?
                .into_iter()
                .map(|s| s as f32 / max)
                .collect()
        }
    };

    debug!(
        "Decoded WAV: {} channels, {} Hz, {} bits, {} frames",
        spec.channels,
        spec.sample_rate,
        spec.bits_per_sample,
        interleaved.len() / spec.channels.max(1) as usize
    );

    Ok(AudioSignal::new(
        downmix(&interleaved, spec.channels as usize),
        spec.sample_rate,
    ))
}

fn load_compressed(bytes: Vec<u8>, hint: &Hint) -> Result<AudioSignal> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());
    let probed = symphonia::default::get_probe()
        .format(
            hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| Error::Decode(format!("unrecognized audio container: {e}")))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| Error::Decode("no audio track found".into()))?;
    let track_id = track.id;
    let codec_params = track.codec_params.clone();
    let sample_rate = codec_params
        .sample_rate
        .ok_or_else(|| Error::Decode("sample rate not specified".into()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| Error::Decode(e.to_string()))?;

    let mut samples = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(Error::Decode(e.to_string())),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            // Corrupt packets are skipped, matching symphonia's own players
            Err(SymphoniaError::DecodeError(e)) => {
                debug!("Skipping undecodable packet: {e}");
                continue;
            }
            Err(e) => return Err(Error::Decode(e.to_string())),
        };

        let spec = *decoded.spec();
        let channels = spec.channels.count();
        let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buf.copy_interleaved_ref(decoded);
        samples.extend(downmix(buf.samples(), channels));
    }

    debug!("Decoded {} mono samples at {} Hz", samples.len(), sample_rate);
    Ok(AudioSignal::new(samples, sample_rate))
}

fn wav_spec(sample_rate: u32, format: OutputFormat) -> hound::WavSpec {
    match format {
        OutputFormat::Float32 => hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        },
        OutputFormat::Pcm16 => hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        },
    }
}

fn write_samples<W: std::io::Write + std::io::Seek>(
    writer: &mut hound::WavWriter<W>,
    samples: &[f32],
    format: OutputFormat,
) -> std::result::Result<(), hound::Error> {
    match format {
        OutputFormat::Float32 => {
            for &s in samples {
                writer.write_sample(s)?;
            }
        }
        OutputFormat::Pcm16 => {
            for &s in samples {
                let clamped = s.clamp(-1.0, 1.0);
                writer.write_sample((clamped * i16::MAX as f32).round() as i16)?;
            }
        }
    }
    Ok(())
}

/// Serialize a signal as a mono WAV container in memory.
pub fn write_wav_bytes(signal: &AudioSignal, format: OutputFormat) -> Result<Vec<u8>> {
    if signal.sample_rate == 0 {
        return Err(Error::Write("sample rate must be positive".into()));
    }
    let mut out = Vec::new();
    {
        let spec = wav_spec(signal.sample_rate, format);
        let mut writer = hound::WavWriter::new(Cursor::new(&mut out), spec)
            .map_err(|e| Error::Write(e.to_string()))?;
        write_samples(&mut writer, &signal.samples, format)
            .map_err(|e| Error::Write(e.to_string()))?;
        writer.finalize().map_err(|e| Error::Write(e.to_string()))?;
    }
    Ok(out)
}

/// Write a signal to `path` as a mono WAV file.
pub fn write_wav_file(path: &Path, signal: &AudioSignal, format: OutputFormat) -> Result<()> {
    if signal.sample_rate == 0 {
        return Err(Error::Write("sample rate must be positive".into()));
    }
    let mut writer = hound::WavWriter::create(path, wav_spec(signal.sample_rate, format))
        .map_err(|e| Error::Write(format!("{}: {e}", path.display())))?;
    write_samples(&mut writer, &signal.samples, format)
        .map_err(|e| Error::Write(e.to_string()))?;
    writer.finalize().map_err(|e| Error::Write(e.to_string()))?;
    debug!("Wrote {} samples to {}", signal.len(), path.display());
    Ok(())
}
