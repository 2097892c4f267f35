use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Engine not available: {0}")]
    NotAvailable(String),

    #[error("Engine failed to load: {0}")]
    LoadFailed(String),

    #[error("Engine operation failed: {0}")]
    OperationFailed(String),

    #[error("Audio device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
