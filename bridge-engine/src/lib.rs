//! # Engine Bridge Traits
//!
//! Abstraction traits between the playback core and its external
//! collaborators: the native media engine, the platform audio device, and
//! the device-capability database.
//!
//! ## Overview
//!
//! The core contains the decision and data-flow logic of a media player; the
//! heavy machinery (demuxing, decoding, rendering) lives in a native engine
//! the host embeds. This crate defines the contract between the two:
//!
//! - [`MediaEngine`](engine::MediaEngine): probe, start, transport control,
//!   metadata reads
//! - [`AudioSink`](sink::AudioSink): the audio device consuming PCM buffers
//! - [`DeviceProfile`](device::DeviceProfile): hardware decoder capability
//!   classification
//! - [`EnvironmentProbe`](device::EnvironmentProbe): pre-init environment
//!   validation
//! - [`UnknownLabels`](labels::UnknownLabels): localized placeholder strings
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync`; implementations are shared behind `Arc`
//! between the application control thread and the decode side.

pub mod device;
pub mod engine;
pub mod error;
pub mod labels;
pub mod sink;

pub use device::{
    AlwaysCompatible, DecoderSupport, DeviceProfile, EnvironmentProbe, FixedProfile, ProfileRule,
    ProfileTable,
};
pub use engine::{MediaEngine, MetaKey, TrackDescriptor, TrackMeta};
pub use error::{EngineError, Result};
pub use labels::{EnglishLabels, UnknownLabels};
pub use sink::{AudioSink, PcmBuffer, StreamSpec};
