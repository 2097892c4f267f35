//! Native media engine trait and supporting track/metadata types.
//!
//! The core never talks to the demux/decode/render engine directly; it goes
//! through [`MediaEngine`], which host applications implement over whatever
//! native library they embed. The trait surface is deliberately narrow: probe,
//! start with positional option directives, transport control, position
//! queries, and per-key metadata reads.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ============================================================================
// Metadata Keys
// ============================================================================

/// Metadata keys understood by the native engine.
///
/// The numeric values mirror the engine's key space; gaps are keys the core
/// does not read yet and are reserved for future fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum MetaKey {
    Title = 0,
    Artist = 1,
    Genre = 2,
    Album = 4,
    NowPlaying = 12,
    ArtworkUrl = 15,
}

impl MetaKey {
    /// Raw numeric key passed across the engine boundary.
    pub fn code(self) -> i32 {
        self as i32
    }
}

// ============================================================================
// Track Descriptors
// ============================================================================

/// Metadata reported by the engine's meta elementary stream.
///
/// Every field is optional; absent values are substituted by the injected
/// unknown-label provider at the media layer, never here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackMeta {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub genre: Option<String>,
    pub album_artist: Option<String>,
    /// Locator of the artwork resource, when the container carries one.
    pub artwork_locator: Option<String>,
    /// Free-form "now playing" text, used by live streams.
    pub now_playing: Option<String>,
    /// Stream duration in milliseconds, 0 when unknown.
    pub duration_ms: i64,
    /// Raw track number string as found in the container. May be malformed.
    pub track_number: Option<String>,
}

/// One elementary stream found in a probed resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackDescriptor {
    /// Video stream with its coded dimensions.
    Video { width: u32, height: u32 },
    /// Audio stream.
    Audio,
    /// Subtitle/text stream.
    Text,
    /// Container-level metadata pseudo-stream.
    Meta(TrackMeta),
    /// Stream type the engine reported but the core does not model.
    Unknown,
}

impl TrackDescriptor {
    /// Returns `true` for streams that carry presentable video.
    pub fn is_video(&self) -> bool {
        matches!(self, TrackDescriptor::Video { .. })
    }
}

// ============================================================================
// Engine Trait
// ============================================================================

/// Abstract surface of the native playback engine.
///
/// Implementations wrap the embedded native library and are shared behind an
/// `Arc`, so every method takes `&self`. All calls are serialized by the
/// session facade; implementations do not need their own locking for
/// correctness, only for safety.
///
/// Option directives passed to [`start`](MediaEngine::start) are applied
/// positionally by some engine builds, so callers must preserve order.
#[async_trait]
pub trait MediaEngine: Send + Sync {
    /// Load and bind the native engine. Called once per session lifecycle;
    /// failure is fatal to the session.
    async fn initialize(&self) -> Result<()>;

    /// Release the native engine. Must be safe to call after a failed
    /// `initialize`.
    async fn shutdown(&self) -> Result<()>;

    /// Inspect a resource and return its elementary stream descriptors.
    ///
    /// Returns `Ok(None)` when the resource cannot be opened or parsed;
    /// that is an expected outcome for unreadable locators, not an error.
    async fn probe_tracks(&self, locator: &str) -> Result<Option<Vec<TrackDescriptor>>>;

    /// Begin playback of `locator` with the given option directives.
    async fn start(&self, locator: &str, options: &[String]) -> Result<()>;

    /// Resolve the ordered child locators of a container medium (playlist,
    /// archive). Empty when the medium has no children.
    async fn sub_items(&self, locator: &str) -> Result<Vec<String>>;

    /// Resume or start playback of the loaded media.
    async fn play(&self) -> Result<()>;

    /// Pause playback.
    async fn pause(&self) -> Result<()>;

    /// Stop playback and unload the media.
    async fn stop(&self) -> Result<()>;

    async fn is_playing(&self) -> Result<bool>;

    async fn is_seekable(&self) -> Result<bool>;

    /// Current playback time in milliseconds, `-1` when no media is loaded.
    async fn time(&self) -> Result<i64>;

    /// Seek to an absolute time in milliseconds. Returns the new time, or
    /// `-1` when no media is loaded.
    async fn set_time(&self, time_ms: i64) -> Result<i64>;

    /// Current position as a fraction of the media length.
    async fn position(&self) -> Result<f32>;

    /// Seek to a fractional position in `0.0..=1.0`.
    async fn set_position(&self, position: f32) -> Result<()>;

    /// Media length in milliseconds, `-1` when no media is loaded.
    async fn length(&self) -> Result<i64>;

    /// Current playback rate (1.0 = normal speed).
    async fn rate(&self) -> Result<f32>;

    async fn set_rate(&self, rate: f32) -> Result<()>;

    /// Software volume in engine units (0..=100 typical).
    async fn volume(&self) -> Result<i32>;

    async fn set_volume(&self, volume: i32) -> Result<()>;

    /// Read one metadata value for the currently loaded media.
    async fn meta(&self, key: MetaKey) -> Result<Option<String>>;

    /// Apply equalizer band gains, or `None` to disable the equalizer.
    async fn set_equalizer(&self, bands: Option<&[f32]>) -> Result<()>;
}
