//! # Audio Output Bridge
//!
//! Bridges PCM buffers produced on the decode side to the platform audio
//! device.
//!
//! ## Architecture
//!
//! The bridge is a bounded single-producer/single-consumer hand-off: the
//! decode thread enqueues buffers, a dedicated writer task performs the
//! blocking device writes.
//!
//! ```text
//! ┌──────────────────────────┐
//! │  Decode thread (native)  │
//! │  push / push_blocking    │
//! └───────────┬──────────────┘
//!             │ PcmBuffer (bounded mpsc)
//!             ▼
//! ┌──────────────────────────┐
//! │  Writer task             │
//! │  AudioSink::write loop   │
//! └───────────┬──────────────┘
//!             ▼
//!        audio device
//! ```
//!
//! A full queue makes `push` wait, which paces the decode thread off the
//! device's real consumption rate; nothing here times out internally.
//! Buffers reach the device in exact submission order: the single receiver
//! writes sequentially.
//!
//! ## Lifecycle
//!
//! `open` → `push`* → (`pause`/`resume`)* → `close`. `close` is idempotent,
//! waits for an in-flight device write to finish, discards buffers still
//! queued, and releases the device. A failed `open` leaves the bridge
//! closed; the audio track is then absent for this playback, not retried.

use crate::error::{PlaybackError, Result};
use bridge_engine::{AudioSink, EngineError, PcmBuffer, StreamSpec};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Default number of queued buffers before `push` applies backpressure.
pub const DEFAULT_QUEUE_CAPACITY: usize = 32;

enum State {
    Closed,
    Open(OpenState),
}

struct OpenState {
    spec: StreamSpec,
    tx: mpsc::Sender<PcmBuffer>,
    cancel: CancellationToken,
    writer: JoinHandle<()>,
    paused: bool,
}

/// Lifecycle-managed consumer of PCM buffers pushed from the decode thread.
///
/// Owns the audio device through the injected [`AudioSink`]. Safe to share
/// between the decode thread (`push_blocking`) and the control thread
/// (`pause`/`close`); `close` blocks until an in-flight write completes,
/// then releases the device exclusively.
pub struct AudioBridge {
    sink: Arc<dyn AudioSink>,
    queue_capacity: usize,
    state: Mutex<State>,
}

impl AudioBridge {
    pub fn new(sink: Arc<dyn AudioSink>) -> Self {
        Self::with_queue_capacity(sink, DEFAULT_QUEUE_CAPACITY)
    }

    pub fn with_queue_capacity(sink: Arc<dyn AudioSink>, queue_capacity: usize) -> Self {
        Self {
            sink,
            queue_capacity: queue_capacity.max(1),
            state: Mutex::new(State::Closed),
        }
    }

    /// Acquire the device and start the writer task.
    ///
    /// # Errors
    ///
    /// [`PlaybackError::DeviceUnavailable`] when the device cannot be opened
    /// at the requested format; [`PlaybackError::AlreadyOpen`] when the
    /// bridge is already open.
    pub async fn open(&self, spec: StreamSpec) -> Result<()> {
        let mut state = self.state.lock().await;
        if matches!(*state, State::Open(_)) {
            return Err(PlaybackError::AlreadyOpen);
        }

        self.sink.open(spec).await.map_err(|err| match err {
            EngineError::DeviceUnavailable(message) => {
                warn!(
                    sample_rate = spec.sample_rate,
                    channels = spec.channels,
                    "Audio device unavailable: {}",
                    message
                );
                PlaybackError::DeviceUnavailable(message)
            }
            other => PlaybackError::Engine(other),
        })?;

        let (tx, rx) = mpsc::channel(self.queue_capacity);
        let cancel = CancellationToken::new();
        let writer = tokio::spawn(writer_loop(Arc::clone(&self.sink), rx, cancel.clone()));

        *state = State::Open(OpenState {
            spec,
            tx,
            cancel,
            writer,
            paused: false,
        });

        info!(
            sample_rate = spec.sample_rate,
            channels = spec.channels,
            frame_count = spec.frame_count,
            "Audio bridge opened"
        );
        Ok(())
    }

    /// Enqueue one buffer for delivery.
    ///
    /// Waits when the queue is full; this is the backpressure that paces the
    /// decode side. Buffers are delivered in submission order.
    pub async fn push(&self, buffer: PcmBuffer) -> Result<()> {
        let tx = match &*self.state.lock().await {
            State::Open(open) => open.tx.clone(),
            State::Closed => return Err(PlaybackError::BridgeClosed),
        };
        tx.send(buffer)
            .await
            .map_err(|_| PlaybackError::BridgeClosed)
    }

    /// [`push`](Self::push) for synchronous callers, i.e. the native decode
    /// thread. Must not be called from inside an async runtime.
    pub fn push_blocking(&self, buffer: PcmBuffer) -> Result<()> {
        let tx = match &*self.state.blocking_lock() {
            State::Open(open) => open.tx.clone(),
            State::Closed => return Err(PlaybackError::BridgeClosed),
        };
        tx.blocking_send(buffer)
            .map_err(|_| PlaybackError::BridgeClosed)
    }

    /// Pause the device. Queued buffers stay queued. No-op when closed.
    pub async fn pause(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        match &mut *state {
            State::Open(open) if !open.paused => {
                self.sink.pause().await?;
                open.paused = true;
                debug!("Audio bridge paused");
            }
            State::Open(_) => {}
            State::Closed => debug!("Pause ignored: audio bridge closed"),
        }
        Ok(())
    }

    /// Resume a paused device. No-op when closed or not paused.
    pub async fn resume(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        match &mut *state {
            State::Open(open) if open.paused => {
                self.sink.resume().await?;
                open.paused = false;
                debug!("Audio bridge resumed");
            }
            State::Open(_) => {}
            State::Closed => debug!("Resume ignored: audio bridge closed"),
        }
        Ok(())
    }

    /// Release the device. Idempotent.
    ///
    /// Blocks until the writer task has finished its in-flight device write
    /// and closed the sink. Buffers still queued at that point are dropped.
    pub async fn close(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        let open = match std::mem::replace(&mut *state, State::Closed) {
            State::Open(open) => open,
            State::Closed => {
                debug!("Close ignored: audio bridge already closed");
                return Ok(());
            }
        };

        open.cancel.cancel();
        drop(open.tx);
        if open.writer.await.is_err() {
            error!("Audio bridge writer task panicked during close");
        }

        info!("Audio bridge closed");
        Ok(())
    }

    /// Stream parameters of the open device, if any.
    pub async fn spec(&self) -> Option<StreamSpec> {
        match &*self.state.lock().await {
            State::Open(open) => Some(open.spec),
            State::Closed => None,
        }
    }

    pub async fn is_open(&self) -> bool {
        matches!(*self.state.lock().await, State::Open(_))
    }
}

/// Writer task: drains the queue into the device, in order, until cancelled
/// or the producer side is gone, then releases the device.
async fn writer_loop(
    sink: Arc<dyn AudioSink>,
    mut rx: mpsc::Receiver<PcmBuffer>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            buffer = rx.recv() => match buffer {
                Some(buffer) => {
                    if let Err(err) = sink.write(buffer).await {
                        error!("Audio device write failed: {}", err);
                        break;
                    }
                }
                None => break,
            },
        }
    }

    if let Err(err) = sink.close().await {
        warn!("Audio device close failed: {}", err);
    }
}

// ============================================================================
// Tests
// ============================================================================
