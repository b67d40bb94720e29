use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spektra_core::analysis::dominant_frequency;
use spektra_core::{OutputFormat, WatermarkConfig, WatermarkMetadata};

#[derive(Parser)]
#[command(name = "spektra", about = "Frequency-domain audio watermarking tool", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Embed a watermark recording into a host recording
    Encode {
        /// Host audio file (WAV, FLAC, MP3, OGG, M4A)
        #[arg(long)]
        original: PathBuf,

        /// Watermark audio file
        #[arg(short, long)]
        watermark: PathBuf,

        /// Output WAV file
        #[arg(short, long)]
        output: PathBuf,

        /// Metadata sidecar to write [default: <output>.wm.json]
        #[arg(short, long)]
        metadata: Option<PathBuf>,

        #[command(flatten)]
        params: Params,
    },
    /// Recover a watermark given the host and the watermarked recording
    Decode {
        /// Host audio file used at encode time
        #[arg(long)]
        original: PathBuf,

        /// Watermarked audio file produced by `encode`
        #[arg(short, long)]
        watermarked: PathBuf,

        /// Output WAV file for the extracted watermark
        #[arg(short, long)]
        output: PathBuf,

        /// Metadata sidecar written by `encode` [default: <watermarked>.wm.json]
        #[arg(short, long)]
        metadata: Option<PathBuf>,

        #[command(flatten)]
        params: Params,
    },
    /// Print basic facts about an audio file
    Inspect {
        /// Input audio file
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[derive(Args)]
struct Params {
    /// Embedding strength
    #[arg(long, default_value = "0.008")]
    alpha: f64,

    /// Fraction of the spectrum left untouched (0.0 - 1.0)
    #[arg(long, default_value = "0.7")]
    band_start: f64,

    /// Output sample encoding
    #[arg(long, value_enum, default_value = "float32")]
    format: Format,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Float32,
    Pcm16,
}

impl Params {
    fn config(&self) -> WatermarkConfig {
        WatermarkConfig {
            alpha: self.alpha,
            band_start_ratio: self.band_start,
            output_format: match self.format {
                Format::Float32 => OutputFormat::Float32,
                Format::Pcm16 => OutputFormat::Pcm16,
            },
        }
    }
}

/// `<path>.wm.json`, next to the audio file it describes.
fn sidecar_path(audio: &Path) -> PathBuf {
    let mut name = audio.as_os_str().to_owned();
    name.push(".wm.json");
    PathBuf::from(name)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Encode {
            original,
            watermark,
            output,
            metadata,
            params,
        } => {
            let config = params.config();
            config.validate()?;

            let host = spektra_core::io::load_file(&original)?;
            let mark = spektra_core::io::load_file(&watermark)?;
            info!(
                "Embedding {} ({} samples, {}Hz) into {} ({} samples, {}Hz)...",
                watermark.display(),
                mark.len(),
                mark.sample_rate,
                original.display(),
                host.len(),
                host.sample_rate
            );
            if mark.sample_rate != host.sample_rate {
                warn!(
                    "Watermark will be resampled from {}Hz to {}Hz.",
                    mark.sample_rate, host.sample_rate
                );
            }
            if mark.len() > host.len() {
                warn!(
                    "Watermark is longer than the host; only the first {} samples will be embedded.",
                    host.len()
                );
            }

            let encoded = spektra_core::encode(&host, &mark, &config)?;
            spektra_core::io::write_wav_file(&output, &encoded.signal, config.output_format)?;

            let metadata_path = metadata.unwrap_or_else(|| sidecar_path(&output));
            encoded.metadata.write_to(&metadata_path)?;

            info!("Watermarked audio written to {}", output.display());
            info!("Metadata written to {}", metadata_path.display());
            println!(
                "Original watermark length: {} samples",
                encoded.metadata.original_watermark_length
            );
        }
        Command::Decode {
            original,
            watermarked,
            output,
            metadata,
            params,
        } => {
            let config = params.config();
            config.validate()?;

            let metadata_path = metadata.unwrap_or_else(|| sidecar_path(&watermarked));
            let record = WatermarkMetadata::read_from(&metadata_path)?.ok_or_else(|| {
                spektra_core::Error::MetadataMissing(metadata_path.display().to_string())
            })?;

            let host = spektra_core::io::load_file(&original)?;
            let marked = spektra_core::io::load_file(&watermarked)?;
            info!(
                "Extracting watermark from {} ({} samples, {}Hz)...",
                watermarked.display(),
                marked.len(),
                marked.sample_rate
            );
            if marked.len() != host.len() && marked.sample_rate == host.sample_rate {
                warn!(
                    "Sample counts differ ({} vs {}); recovery assumes the watermarked file was not trimmed.",
                    marked.len(),
                    host.len()
                );
            }

            let extracted = spektra_core::decode(&host, &marked, &record, &config)?;
            spektra_core::io::write_wav_file(&output, &extracted, config.output_format)?;

            info!("Extracted watermark written to {}", output.display());
            println!("Extracted length: {} samples", extracted.len());
        }
        Command::Inspect { input } => {
            let signal = spektra_core::io::load_file(&input)?;
            println!("File:        {}", input.display());
            println!("Sample rate: {} Hz", signal.sample_rate);
            println!("Samples:     {}", signal.len());
            println!("Duration:    {:.3} s", signal.duration_secs());
            println!("Peak:        {:.6}", signal.peak());
            match dominant_frequency(&signal) {
                Some(freq) => println!("Dominant:    {:.1} Hz", freq),
                None => println!("Dominant:    n/a"),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sidecar_next_to_audio() {
        assert_eq!(
            sidecar_path(Path::new("out/marked.wav")),
            PathBuf::from("out/marked.wav.wm.json")
        );
    }

    #[test]
    fn params_map_to_config() {
        let cli = Cli::parse_from([
            "spektra",
            "encode",
            "--original",
            "a.wav",
            "-w",
            "b.wav",
            "-o",
            "c.wav",
            "--alpha",
            "0.02",
            "--format",
            "pcm16",
        ]);
        let Command::Encode { params, metadata, .. } = cli.command else {
            panic!("expected encode");
        };
        assert!(metadata.is_none());
        let config = params.config();
        assert_eq!(config.alpha, 0.02);
        assert_eq!(config.band_start_ratio, 0.7);
        assert_eq!(config.output_format, OutputFormat::Pcm16);
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
