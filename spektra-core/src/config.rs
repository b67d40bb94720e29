use crate::error::{Error, Result};

/// Sample encoding used when serializing a signal to WAV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// 32-bit IEEE float samples.
    #[default]
    Float32,
    /// 16-bit signed integer PCM, clamped to [-1, 1] before quantization.
    Pcm16,
}

/// Configuration for watermark embedding and extraction.
///
/// The same values must be used for a matching encode/decode pair.
#[derive(Debug, Clone)]
pub struct WatermarkConfig {
    /// Embedding strength applied to the watermark spectrum. Default: 0.008.
    pub alpha: f64,
    /// Fraction of the spectrum length below which no watermark energy is
    /// injected. Range [0, 1]. Default: 0.7.
    pub band_start_ratio: f64,
    /// WAV sample encoding for byte-level output. Default: 32-bit float.
    pub output_format: OutputFormat,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            alpha: 0.008,
            band_start_ratio: 0.7,
            output_format: OutputFormat::Float32,
        }
    }
}

impl WatermarkConfig {
    /// Check that the parameters describe an invertible embedding.
    pub fn validate(&self) -> Result<()> {
        if !self.alpha.is_finite() || self.alpha == 0.0 {
            return Err(Error::InvalidConfig(format!(
                "alpha must be finite and non-zero, got {}",
                self.alpha
            )));
        }
        if !(0.0..=1.0).contains(&self.band_start_ratio) {
            return Err(Error::InvalidConfig(format!(
                "band_start_ratio must be within [0, 1], got {}",
                self.band_start_ratio
            )));
        }
        Ok(())
    }

    /// First spectral index that carries watermark energy for a spectrum of length `n`.
    pub fn band_start(&self, n: usize) -> usize {
        ((self.band_start_ratio * n as f64).floor() as usize).min(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_parameters() {
        let config = WatermarkConfig::default();
        assert_eq!(config.alpha, 0.008);
        assert_eq!(config.band_start_ratio, 0.7);
        assert_eq!(config.output_format, OutputFormat::Float32);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn band_start_floors() {
        let config = WatermarkConfig::default();
        // 0.7 * 44100 evaluates to 30869.999... in f64
        assert_eq!(config.band_start(44100), 30869);
        assert_eq!(config.band_start(10), 7);
        assert_eq!(config.band_start(3), 2);
        assert_eq!(config.band_start(0), 0);
    }

    #[test]
    fn band_start_boundaries() {
        let full = WatermarkConfig {
            band_start_ratio: 0.0,
            ..WatermarkConfig::default()
        };
        assert_eq!(full.band_start(1000), 0);

        let none = WatermarkConfig {
            band_start_ratio: 1.0,
            ..WatermarkConfig::default()
        };
        assert_eq!(none.band_start(1000), 1000);
    }

    #[test]
    fn rejects_zero_alpha() {
        let config = WatermarkConfig {
            alpha: 0.0,
            ..WatermarkConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn rejects_ratio_out_of_range() {
        for ratio in [-0.1, 1.5, f64::NAN] {
            let config = WatermarkConfig {
                band_start_ratio: ratio,
                ..WatermarkConfig::default()
            };
            assert!(config.validate().is_err(), "ratio {ratio} accepted");
        }
    }
}
