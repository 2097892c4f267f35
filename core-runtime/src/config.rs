//! # Core Configuration Module
//!
//! Dependency wiring for a playback session.
//!
//! ## Overview
//!
//! A session needs three host-supplied capabilities (the native engine, an
//! audio device sink, and a device-capability profile) plus two optional
//! ones with built-in defaults. [`CoreConfig`] collects them through a
//! builder that fails fast with an actionable [`Error::CapabilityMissing`]
//! message when a required bridge is absent, so misconfiguration surfaces at
//! startup rather than mid-playback.
//!
//! ## Required Dependencies
//!
//! - `MediaEngine` - the native demux/decode/render engine
//! - `AudioSink` - the platform audio device
//! - `DeviceProfile` - hardware decoder capability classification
//!
//! ## Optional Dependencies (with defaults)
//!
//! - `EnvironmentProbe` - pre-init validation (default: accepts everything)
//! - `UnknownLabels` - placeholder metadata strings (default: English)
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .engine(Arc::new(MyEngine::load()?))
//!     .audio_sink(Arc::new(MySink::default_device()?))
//!     .device_profile(Arc::new(FixedProfile(DecoderSupport::All)))
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_CAPACITY;
use bridge_engine::{
    AlwaysCompatible, AudioSink, DeviceProfile, EnglishLabels, EnvironmentProbe, MediaEngine,
    UnknownLabels,
};
use std::sync::Arc;

/// Capability bundle for constructing a playback session.
///
/// Use [`CoreConfig::builder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Native media engine (required).
    pub engine: Arc<dyn MediaEngine>,

    /// Platform audio device sink (required).
    pub audio_sink: Arc<dyn AudioSink>,

    /// Device decoder capability classification (required).
    pub device_profile: Arc<dyn DeviceProfile>,

    /// Environment validation run before the engine is loaded.
    pub environment: Arc<dyn EnvironmentProbe>,

    /// Placeholder strings for absent metadata.
    pub labels: Arc<dyn UnknownLabels>,

    /// Whether the platform offers a windowed video surface. Gates direct
    /// rendering and the automatic video backend choice.
    pub windowed_video_output: bool,

    /// Buffer size of the session event bus.
    pub event_capacity: usize,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("engine", &"MediaEngine { ... }")
            .field("audio_sink", &"AudioSink { ... }")
            .field("device_profile", &"DeviceProfile { ... }")
            .field("event_capacity", &self.event_capacity)
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.event_capacity == 0 {
            return Err(Error::Config(
                "Event capacity must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    engine: Option<Arc<dyn MediaEngine>>,
    audio_sink: Option<Arc<dyn AudioSink>>,
    device_profile: Option<Arc<dyn DeviceProfile>>,
    environment: Option<Arc<dyn EnvironmentProbe>>,
    labels: Option<Arc<dyn UnknownLabels>>,
    windowed_video_output: Option<bool>,
    event_capacity: Option<usize>,
}

impl CoreConfigBuilder {
    /// Sets the native media engine implementation (required).
    pub fn engine(mut self, engine: Arc<dyn MediaEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Sets the audio device sink implementation (required).
    pub fn audio_sink(mut self, sink: Arc<dyn AudioSink>) -> Self {
        self.audio_sink = Some(sink);
        self
    }

    /// Sets the device capability profile (required).
    pub fn device_profile(mut self, profile: Arc<dyn DeviceProfile>) -> Self {
        self.device_profile = Some(profile);
        self
    }

    /// Sets the environment probe. Defaults to accepting every environment.
    pub fn environment(mut self, probe: Arc<dyn EnvironmentProbe>) -> Self {
        self.environment = Some(probe);
        self
    }

    /// Sets the unknown-label provider. Defaults to fixed English labels.
    pub fn labels(mut self, labels: Arc<dyn UnknownLabels>) -> Self {
        self.labels = Some(labels);
        self
    }

    /// Declares whether the platform offers a windowed video surface.
    /// Default: true.
    pub fn windowed_video_output(mut self, available: bool) -> Self {
        self.windowed_video_output = Some(available);
        self
    }

    /// Sets the event bus buffer size. Default: 64.
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = Some(capacity);
        self
    }

    /// Builds the final `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityMissing`] naming the absent bridge when a
    /// required dependency was not provided, or [`Error::Config`] for
    /// invalid values.
    pub fn build(self) -> Result<CoreConfig> {
        let engine = self.engine.ok_or_else(|| Error::CapabilityMissing {
            capability: "MediaEngine".to_string(),
            message: "A native engine implementation is required. \
                     Inject the host's engine adapter with .engine()."
                .to_string(),
        })?;

        let audio_sink = self.audio_sink.ok_or_else(|| Error::CapabilityMissing {
            capability: "AudioSink".to_string(),
            message: "An audio device sink is required. \
                     Inject the platform audio adapter with .audio_sink()."
                .to_string(),
        })?;

        let device_profile = self
            .device_profile
            .ok_or_else(|| Error::CapabilityMissing {
                capability: "DeviceProfile".to_string(),
                message: "A device capability classification is required. \
                         Inject a FixedProfile or ProfileTable with .device_profile()."
                    .to_string(),
            })?;

        let config = CoreConfig {
            engine,
            audio_sink,
            device_profile,
            environment: self
                .environment
                .unwrap_or_else(|| Arc::new(AlwaysCompatible)),
            labels: self.labels.unwrap_or_else(|| Arc::new(EnglishLabels)),
            windowed_video_output: self.windowed_video_output.unwrap_or(true),
            event_capacity: self.event_capacity.unwrap_or(DEFAULT_EVENT_CAPACITY),
        };

        config.validate()?;

        Ok(config)
    }
}
