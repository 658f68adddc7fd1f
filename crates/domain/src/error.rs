use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("level {0} not found")]
    NotFound(u32),
    #[error("level {0} is locked")]
    Locked(u32),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("storage error: {0}")]
    Io(String),
}

impl DomainError {
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation(message.into())
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for DomainError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
