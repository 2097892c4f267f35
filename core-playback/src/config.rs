//! # Player Settings
//!
//! Mutable playback configuration read by the option builder on every play
//! request.
//!
//! Settings are mutated only by explicit setters between playback starts;
//! they are plain data with serde support so host applications can persist
//! them as JSON.

use crate::error::{PlaybackError, Result};
use crate::hardware::{DevDecoder, HwAcceleration};
use serde::{Deserialize, Serialize};

/// Audio output backend requested from the native engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AudioOutputBackend {
    /// Pick the platform default.
    #[default]
    Auto,
    /// Managed audio track output.
    AudioTrack,
    /// Low-level OpenSL ES output.
    OpenSlEs,
}

/// Video output backend requested from the native engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VideoOutputBackend {
    /// Pick the platform default.
    #[default]
    Auto,
    /// Plain surface output.
    Surface,
    /// GLES compositing output.
    OpenGles,
    /// Windowed surface output (required for direct rendering).
    Window,
}

/// Player configuration consumed when building per-play options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSettings {
    /// Requested hardware acceleration mode.
    #[serde(default)]
    pub hardware_acceleration: HwAcceleration,

    /// Developer decoder override; takes precedence over the automatic
    /// hardware policy.
    #[serde(default)]
    pub dev_decoder: DevDecoder,

    /// Character encoding for subtitle files; empty = autodetect.
    #[serde(default)]
    pub subtitle_encoding: String,

    /// Audio output backend selector.
    #[serde(default)]
    pub audio_output: AudioOutputBackend,

    /// Video output backend selector.
    #[serde(default)]
    pub video_output: VideoOutputBackend,

    /// File cache duration in milliseconds; 0 = engine default.
    #[serde(default)]
    pub file_caching_ms: u32,

    /// Network cache duration in milliseconds; 0 = engine default.
    #[serde(default)]
    pub network_caching_ms: u32,

    /// Cache duration applied on hardware decoding paths to absorb decoder
    /// start-up latency.
    ///
    /// Default: 1500 ms.
    #[serde(default = "default_hw_latency_caching_ms")]
    pub hw_latency_caching_ms: u32,

    /// Equalizer band gains in dB, or `None` to disable the equalizer.
    #[serde(default)]
    pub equalizer: Option<Vec<f32>>,

    /// Keep pitch constant when the playback rate changes.
    #[serde(default)]
    pub time_stretching: bool,

    /// Allow the decoder to drop late frames.
    #[serde(default)]
    pub frame_skip: bool,

    /// Deblocking filter level; -1 = automatic.
    #[serde(default = "default_deblocking")]
    pub deblocking: i32,

    /// Forced chroma format; empty = engine default.
    #[serde(default)]
    pub chroma: String,

    /// Reconnect dropped HTTP streams.
    #[serde(default)]
    pub http_reconnect: bool,

    /// Verbose engine logging.
    #[serde(default = "default_verbose")]
    pub verbose: bool,
}

fn default_hw_latency_caching_ms() -> u32 {
    1500
}

fn default_deblocking() -> i32 {
    -1
}

fn default_verbose() -> bool {
    true
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            hardware_acceleration: HwAcceleration::Automatic,
            dev_decoder: DevDecoder::Automatic,
            subtitle_encoding: String::new(),
            audio_output: AudioOutputBackend::Auto,
            video_output: VideoOutputBackend::Auto,
            file_caching_ms: 0,
            network_caching_ms: 0,
            hw_latency_caching_ms: default_hw_latency_caching_ms(),
            equalizer: None,
            time_stretching: false,
            frame_skip: false,
            deblocking: default_deblocking(),
            chroma: String::new(),
            http_reconnect: false,
            verbose: default_verbose(),
        }
    }
}

impl PlayerSettings {
    /// Validate settings values.
    pub fn validate(&self) -> Result<()> {
        if self.hw_latency_caching_ms == 0 || self.hw_latency_caching_ms > 60_000 {
            return Err(PlaybackError::InvalidSettings(
                "hw_latency_caching_ms must be within 1..=60000".to_string(),
            ));
        }

        if self.network_caching_ms > 60_000 || self.file_caching_ms > 60_000 {
            return Err(PlaybackError::InvalidSettings(
                "cache durations must not exceed 60000 ms".to_string(),
            ));
        }

        if self.deblocking < -1 {
            return Err(PlaybackError::InvalidSettings(
                "deblocking must be -1 (automatic) or a non-negative level".to_string(),
            ));
        }

        if let Some(bands) = &self.equalizer {
            if bands.is_empty() {
                return Err(PlaybackError::InvalidSettings(
                    "equalizer band list must not be empty".to_string(),
                ));
            }
            if bands.iter().any(|band| !band.is_finite()) {
                return Err(PlaybackError::InvalidSettings(
                    "equalizer bands must be finite".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Deblocking level actually sent to the engine.
    ///
    /// Automatic resolves to the conservative skip-non-key level; levels
    /// above the engine maximum are pulled back to it.
    pub fn effective_deblocking(&self) -> i32 {
        match self.deblocking {
            -1 => 3,
            level if level > 4 => 3,
            level => level,
        }
    }

    /// Audio backend after resolving `Auto`.
    pub fn resolved_audio_output(&self) -> AudioOutputBackend {
        match self.audio_output {
            AudioOutputBackend::Auto => AudioOutputBackend::OpenSlEs,
            other => other,
        }
    }

    /// Video backend after resolving `Auto`, given whether a windowed
    /// surface is available on this platform.
    pub fn resolved_video_output(&self, windowed_available: bool) -> VideoOutputBackend {
        let requested = match self.video_output {
            VideoOutputBackend::Auto => VideoOutputBackend::Surface,
            other => other,
        };
        if requested == VideoOutputBackend::Surface && windowed_available {
            VideoOutputBackend::Window
        } else {
            requested
        }
    }
}
