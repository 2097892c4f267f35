//! # Playback Error Types
//!
//! Error type for the hardware policy, option building, and audio bridge
//! operations.

use bridge_engine::EngineError;
use thiserror::Error;

/// Errors that can occur during playback operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// The audio device could not be opened at the requested format. The
    /// audio path is treated as absent; callers must not retry in a loop.
    #[error("Audio device unavailable: {0}")]
    DeviceUnavailable(String),

    /// `open` was called on a bridge that is already open.
    #[error("Audio bridge already open")]
    AlreadyOpen,

    /// A buffer was pushed to a bridge that is not open.
    #[error("Audio bridge is closed")]
    BridgeClosed,

    /// The native engine reported a failure.
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Player settings failed validation.
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// Internal error (should not occur in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlaybackError {
    /// Returns `true` when the error concerns the audio device rather than
    /// the engine or the caller.
    pub fn is_device_error(&self) -> bool {
        matches!(
            self,
            PlaybackError::DeviceUnavailable(_) | PlaybackError::BridgeClosed
        )
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
