//! # Event Bus and Crash Relay
//!
//! Routes native engine events and crash notifications to application
//! listeners using `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! The native engine emits events asynchronously from its own control
//! thread. The core does not interpret them; it forwards them opaquely to
//! whoever subscribed. Two pieces cooperate:
//!
//! - [`EventBus`]: broadcast channel carrying [`SessionEvent`]s. Multiple
//!   subscribers, each with an independent receiver; slow subscribers see
//!   `RecvError::Lagged` rather than blocking fast ones.
//! - [`EventRelay`]: the handle given to the engine side. Forwarding through
//!   a detached relay (session destroyed) is a no-op, so stale native
//!   callbacks can never reach listeners of a dead session.
//!
//! Crash notifications are special-cased: beyond the broadcast event, a
//! single registered [`CrashListener`] is invoked exactly once per crash
//! signal. Recovery (tearing down and restarting the whole session) is the
//! caller's responsibility.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{EngineEvent, EventBus, SessionEvent};
//!
//! let bus = EventBus::new(64);
//! let mut rx = bus.subscribe();
//! bus.emit(SessionEvent::Engine(EngineEvent::Playing)).ok();
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

// ============================================================================
// Event Types
// ============================================================================

/// Event reported by the native engine.
///
/// The relay forwards these without interpreting them; `Unknown` carries any
/// engine event code the core does not name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum EngineEvent {
    /// The engine started opening a resource.
    Opening,
    /// Input buffering progress.
    Buffering { percent: f32 },
    /// Playback started or resumed.
    Playing,
    /// Playback paused.
    Paused,
    /// Playback stopped.
    Stopped,
    /// The end of the media was reached.
    EndReached,
    /// The engine reported a non-fatal error.
    EncounteredError { message: String },
    /// Playback time advanced.
    TimeChanged { ms: i64 },
    /// Fractional position changed.
    PositionChanged { position: f32 },
    /// The engine finished parsing media metadata.
    MediaParsed,
    /// Engine event code the core does not model.
    Unknown { code: i32 },
}

/// Top-level event delivered to session subscribers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload")]
pub enum SessionEvent {
    /// Forwarded native engine event.
    Engine(EngineEvent),
    /// The native engine crashed. The session must be restarted by the
    /// application; no recovery happens in the core.
    EngineCrashed,
}

impl SessionEvent {
    /// Returns a short human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            SessionEvent::Engine(EngineEvent::Opening) => "Engine opening media",
            SessionEvent::Engine(EngineEvent::Buffering { .. }) => "Engine buffering",
            SessionEvent::Engine(EngineEvent::Playing) => "Playback playing",
            SessionEvent::Engine(EngineEvent::Paused) => "Playback paused",
            SessionEvent::Engine(EngineEvent::Stopped) => "Playback stopped",
            SessionEvent::Engine(EngineEvent::EndReached) => "End of media reached",
            SessionEvent::Engine(EngineEvent::EncounteredError { .. }) => "Engine error",
            SessionEvent::Engine(EngineEvent::TimeChanged { .. }) => "Playback time changed",
            SessionEvent::Engine(EngineEvent::PositionChanged { .. }) => "Playback position changed",
            SessionEvent::Engine(EngineEvent::MediaParsed) => "Media metadata parsed",
            SessionEvent::Engine(EngineEvent::Unknown { .. }) => "Unrecognized engine event",
            SessionEvent::EngineCrashed => "Native engine crashed",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Broadcast channel carrying [`SessionEvent`]s to any number of subscribers.
///
/// Cloning the bus clones the sender; every `subscribe()` creates an
/// independent receiver. Past events are not replayed.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Returns the number of subscribers that received it, or an error when
    /// nobody is listening (a normal condition before the application has
    /// attached).
    pub fn emit(&self, event: SessionEvent) -> Result<usize, SendError<SessionEvent>> {
        self.sender.send(event)
    }

    /// Create a new independent subscriber.
    pub fn subscribe(&self) -> Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Number of currently attached subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&SessionEvent) -> bool + Send + Sync>;

/// Receiver wrapper with optional predicate filtering.
pub struct EventStream {
    receiver: Receiver<SessionEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<SessionEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` are returned by `recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&SessionEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Receive the next event that passes the filter.
    ///
    /// # Errors
    ///
    /// `RecvError::Lagged(n)` when the subscriber fell `n` events behind;
    /// `RecvError::Closed` when every sender has been dropped.
    pub async fn recv(&mut self) -> Result<SessionEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            match &self.filter {
                Some(filter) if !filter(&event) => continue,
                _ => return Ok(event),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Crash Relay
// ============================================================================

/// Listener invoked when the native engine reports an unrecoverable crash.
pub trait CrashListener: Send + Sync {
    fn on_engine_crash(&self);
}

/// Handle through which the engine side feeds events into the core.
///
/// The relay carries a detach latch: once the owning session is destroyed it
/// flips the latch, and every later `forward`/`notify_crash` becomes a
/// no-op. This is what keeps stale native callbacks from acting on a dead
/// session.
#[derive(Clone)]
pub struct EventRelay {
    bus: EventBus,
    crash_listener: Arc<parking_lot::RwLock<Option<Arc<dyn CrashListener>>>>,
    attached: Arc<AtomicBool>,
}

impl EventRelay {
    pub fn new(bus: EventBus) -> Self {
        Self {
            bus,
            crash_listener: Arc::new(parking_lot::RwLock::new(None)),
            attached: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Register the crash listener, replacing any previous one.
    pub fn set_crash_listener(&self, listener: Option<Arc<dyn CrashListener>>) {
        *self.crash_listener.write() = listener;
    }

    /// Forward a native engine event to subscribers.
    pub fn forward(&self, event: EngineEvent) {
        if !self.is_attached() {
            debug!("Dropping engine event after detach: {:?}", event);
            return;
        }
        // Nobody listening yet is fine; the send error carries the event back.
        let _ = self.bus.emit(SessionEvent::Engine(event));
    }

    /// Report an engine crash: publishes [`SessionEvent::EngineCrashed`] and
    /// invokes the registered crash listener exactly once per call.
    pub fn notify_crash(&self) {
        if !self.is_attached() {
            debug!("Dropping crash notification after detach");
            return;
        }
        warn!("Native engine crash reported");
        let _ = self.bus.emit(SessionEvent::EngineCrashed);
        let listener = self.crash_listener.read().clone();
        match listener {
            Some(listener) => listener.on_engine_crash(),
            None => warn!("Engine crashed with no crash listener registered"),
        }
    }

    /// Stop forwarding. Called when the owning session is destroyed.
    pub fn detach(&self) {
        self.attached.store(false, Ordering::SeqCst);
    }

    /// Re-arm a previously detached relay (session re-initialized).
    pub fn attach(&self) {
        self.attached.store(true, Ordering::SeqCst);
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for EventRelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRelay")
            .field("attached", &self.is_attached())
            .field("has_crash_listener", &self.crash_listener.read().is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
