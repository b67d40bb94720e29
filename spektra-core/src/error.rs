use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to decode audio: {0}")]
    Decode(String),

    #[error("{role} signal is empty")]
    EmptySignal { role: &'static str },

    #[error("watermark length metadata not found for session {0:?}")]
    MetadataMissing(String),

    #[error("resampling failed: {0}")]
    Resample(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("failed to write audio: {0}")]
    Write(String),

    #[error("metadata store error: {0}")]
    Metadata(String),

    #[error("FFT error: {0}")]
    Fft(String),
}

pub type Result<T> = std::result::Result<T, Error>;
