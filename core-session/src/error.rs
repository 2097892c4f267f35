use bridge_engine::EngineError;
use core_playback::PlaybackError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    /// The environment cannot run the native engine. Fatal, surfaced once at
    /// init, never retried automatically.
    #[error("Incompatible environment: {0}")]
    IncompatibleEnvironment(String),

    /// The native engine failed to load or bind.
    #[error("Native engine failed to load: {0}")]
    EngineLoad(String),

    #[error(transparent)]
    Playback(#[from] PlaybackError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SessionError {
    /// Returns `true` for startup failures that abort the session and must
    /// not be retried automatically.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SessionError::IncompatibleEnvironment(_) | SessionError::EngineLoad(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
