//! # Playback Policy & Audio Delivery Module
//!
//! Decides which hardware decoding path to request and carries decoded audio
//! to the output device.
//!
//! ## Overview
//!
//! This module handles:
//! - The hardware acceleration policy: requested mode × device capability →
//!   effective mode + ordered codec preference list
//! - Player settings (acceleration, caching, output backends, equalizer)
//! - The per-play option directive list handed to the native engine
//! - The audio output bridge: bounded decode-thread → device hand-off

pub mod bridge;
pub mod config;
pub mod error;
pub mod hardware;
pub mod options;

pub use bridge::{AudioBridge, DEFAULT_QUEUE_CAPACITY};
pub use config::{AudioOutputBackend, PlayerSettings, VideoOutputBackend};
pub use error::{PlaybackError, Result};
pub use hardware::{
    dev_codec_list, direct_rendering, resolve, DevDecoder, HwAcceleration, HwPolicy,
    CODEC_LIST_ALL, DEFAULT_CODEC_LIST,
};
pub use options::{media_options, OptionFlags};
