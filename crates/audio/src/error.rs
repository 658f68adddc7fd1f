use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio device error: {0}")]
    Device(String),
    #[error("failed to decode audio: {0}")]
    Decode(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no audio output available")]
    Unavailable,
}

pub type Result<T> = std::result::Result<T, AudioError>;
