//! Audio device sink trait and PCM buffer types.
//!
//! The decode side of the native engine produces raw PCM which the core's
//! audio bridge forwards to an [`AudioSink`]. Implementations own the actual
//! audio device (AudioTrack, OpenSL ES, a test recorder, ...). A `write` is
//! allowed to block for the duration of bounded device buffering (that is
//! the backpressure mechanism) but must never block unboundedly.

use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

/// PCM stream parameters negotiated at device open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSpec {
    /// Sample rate in hertz.
    pub sample_rate: u32,
    /// Number of interleaved channels.
    pub channels: u16,
    /// Frames per buffer the decoder will push.
    pub frame_count: usize,
}

impl StreamSpec {
    pub fn new(sample_rate: u32, channels: u16, frame_count: usize) -> Self {
        Self {
            sample_rate,
            channels,
            frame_count,
        }
    }
}

/// One run of interleaved PCM bytes handed from the decode thread to the
/// audio bridge.
///
/// The payload is a [`Bytes`] so ownership transfers across the channel
/// without copying.
#[derive(Debug, Clone)]
pub struct PcmBuffer {
    /// Interleaved sample data.
    pub data: Bytes,
    /// Sample rate in hertz.
    pub sample_rate: u32,
    /// Number of interleaved channels.
    pub channels: u16,
    /// Number of frames represented by `data`.
    pub frames: usize,
}

impl PcmBuffer {
    pub fn new(data: Bytes, sample_rate: u32, channels: u16, frames: usize) -> Self {
        Self {
            data,
            sample_rate,
            channels,
            frames,
        }
    }

    /// Returns `true` if the buffer carries no sample data.
    pub fn is_empty(&self) -> bool {
        self.frames == 0 || self.data.is_empty()
    }

    /// Playback duration of this buffer.
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames as f64 / self.sample_rate as f64)
    }
}

/// Trait for platform audio devices consumed by the audio output bridge.
///
/// Lifecycle: `open` → `write`* → (`pause`/`resume`)* → `close`. `close` must
/// be idempotent. When the device cannot be opened at the requested format,
/// `open` fails with [`EngineError::DeviceUnavailable`](crate::EngineError);
/// the caller treats the audio path as absent rather than retrying in a loop.
#[async_trait]
pub trait AudioSink: Send + Sync {
    /// Acquire the device for the given stream parameters.
    async fn open(&self, spec: StreamSpec) -> Result<()>;

    /// Deliver one buffer to the device. Buffers must reach the device in
    /// call order; a full device queue blocks the call (bounded).
    async fn write(&self, buffer: PcmBuffer) -> Result<()>;

    /// Pause the device without releasing it.
    async fn pause(&self) -> Result<()>;

    /// Resume a paused device.
    async fn resume(&self) -> Result<()>;

    /// Release the device. Idempotent.
    async fn close(&self) -> Result<()>;
}
