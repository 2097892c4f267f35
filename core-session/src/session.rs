//! # Player Session Facade
//!
//! The single entry point for starting, stopping, and steering playback.
//!
//! ## Overview
//!
//! A [`PlayerSession`] is an explicit object; construct as many as you need
//! (tests run several side by side). There is no process-wide singleton.
//! Each session owns:
//!
//! - the native engine handle and the audio output bridge
//! - the primary media list, plus an optional alternate list it follows
//! - the active play index
//! - the resolved hardware policy and the mutable player settings
//! - the event relay feeding engine events to subscribers
//!
//! ## Lifecycle
//!
//! `Uninitialized → Initialized → Destroyed`, with `init` and `destroy`
//! idempotent and a destroyed session eligible for re-initialization.
//! `init` validates the environment before touching the native engine; a
//! failed validation is fatal, never a silent fallback. After `destroy`,
//! every playback operation reports "no session" sentinels instead of
//! acting on stale native handles.
//!
//! ## Concurrency
//!
//! One async mutex serializes init, destroy, and every operation in
//! between. Settings are applied at the next `play*` call; the audio
//! bridge is separately synchronized for the decode thread.

use crate::error::{Result, SessionError};
use crate::list::{ExpandOutcome, MediaList};
use crate::media::Media;
use bridge_engine::{
    DecoderSupport, DeviceProfile, EnvironmentProbe, MediaEngine, UnknownLabels,
};
use core_playback::{
    direct_rendering, media_options, resolve, AudioBridge, DevDecoder, HwAcceleration, HwPolicy,
    PlayerSettings,
};
use core_runtime::events::{CrashListener, EventBus, EventRelay, Receiver, SessionEvent};
use core_runtime::CoreConfig;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Diagnostic identifier labelling one session's log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Uninitialized,
    Initialized,
    Destroyed,
}

struct SessionState {
    lifecycle: Lifecycle,
    settings: PlayerSettings,
    /// Device classification, queried once at init.
    decoder_support: Option<DecoderSupport>,
    policy: HwPolicy,
    primary: MediaList,
    /// Followed alternate list; `None` means the primary list is followed.
    alternate: Option<MediaList>,
    active_index: usize,
}

impl SessionState {
    fn followed(&self) -> &MediaList {
        self.alternate.as_ref().unwrap_or(&self.primary)
    }

    fn followed_mut(&mut self) -> &mut MediaList {
        match &mut self.alternate {
            Some(list) => list,
            None => &mut self.primary,
        }
    }
}

/// Control and audio-delivery facade over one native engine instance.
pub struct PlayerSession {
    id: SessionId,
    engine: Arc<dyn MediaEngine>,
    bridge: Arc<AudioBridge>,
    device_profile: Arc<dyn DeviceProfile>,
    environment: Arc<dyn EnvironmentProbe>,
    labels: Arc<dyn UnknownLabels>,
    windowed_video_output: bool,
    bus: EventBus,
    relay: EventRelay,
    state: Mutex<SessionState>,
}

impl PlayerSession {
    /// Assemble a session from validated capability wiring. The session
    /// starts Uninitialized; call [`init`](Self::init) before playing.
    pub fn new(config: CoreConfig) -> Self {
        let bus = EventBus::new(config.event_capacity);
        let relay = EventRelay::new(bus.clone());
        Self {
            id: SessionId::new(),
            engine: config.engine,
            bridge: Arc::new(AudioBridge::new(config.audio_sink)),
            device_profile: config.device_profile,
            environment: config.environment,
            labels: config.labels,
            windowed_video_output: config.windowed_video_output,
            bus,
            relay,
            state: Mutex::new(SessionState {
                lifecycle: Lifecycle::Uninitialized,
                settings: PlayerSettings::default(),
                decoder_support: None,
                policy: resolve(HwAcceleration::Automatic, DecoderSupport::Unknown),
                primary: MediaList::new(),
                alternate: None,
                active_index: 0,
            }),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Bring the session up. Idempotent: a second call on an initialized
    /// session is a no-op.
    ///
    /// # Errors
    ///
    /// [`SessionError::IncompatibleEnvironment`] when the environment probe
    /// rejects the host, [`SessionError::EngineLoad`] when the native
    /// engine fails to load. Both are fatal; neither is retried here.
    pub async fn init(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.lifecycle == Lifecycle::Initialized {
            debug!(session = %self.id, "init ignored: session already initialized");
            return Ok(());
        }

        self.environment
            .verify()
            .map_err(SessionError::IncompatibleEnvironment)?;

        self.engine
            .initialize()
            .await
            .map_err(|err| SessionError::EngineLoad(err.to_string()))?;

        let support = self.device_profile.decoder_support();
        state.decoder_support = Some(support);
        state.policy = resolve(state.settings.hardware_acceleration, support);
        state.primary = MediaList::new();
        state.alternate = None;
        state.active_index = 0;
        self.relay.attach();
        state.lifecycle = Lifecycle::Initialized;

        info!(session = %self.id, ?support, "Session initialized");
        Ok(())
    }

    /// Tear the session down: release the native engine, close the audio
    /// bridge, detach event routing. Idempotent.
    pub async fn destroy(&self) {
        let mut state = self.state.lock().await;
        if state.lifecycle == Lifecycle::Destroyed {
            debug!(session = %self.id, "destroy ignored: session already destroyed");
            return;
        }

        if state.lifecycle == Lifecycle::Initialized {
            if let Err(err) = self.engine.shutdown().await {
                warn!(session = %self.id, "Engine shutdown failed: {}", err);
            }
        }
        if let Err(err) = self.bridge.close().await {
            warn!(session = %self.id, "Audio bridge close failed: {}", err);
        }
        self.relay.detach();
        state.lifecycle = Lifecycle::Destroyed;

        info!(session = %self.id, "Session destroyed");
    }

    /// Destroy and re-initialize the session.
    pub async fn restart(&self) -> Result<()> {
        self.destroy().await;
        self.init().await
    }

    pub async fn is_initialized(&self) -> bool {
        self.state.lock().await.lifecycle == Lifecycle::Initialized
    }

    // ------------------------------------------------------------------
    // Play entry points
    // ------------------------------------------------------------------

    /// Play the entry at `index` of the followed list.
    ///
    /// Returns `Ok(false)`, with no side effects and the active index
    /// unchanged, when the index yields no locator or the session is not
    /// initialized.
    pub async fn play_index(&self, index: usize) -> Result<bool> {
        let mut state = self.state.lock().await;
        if state.lifecycle != Lifecycle::Initialized {
            debug!(session = %self.id, "play_index unavailable: no session");
            return Ok(false);
        }
        self.start_at(&mut state, index).await
    }

    /// Play a locator directly, outside the followed list. Applies global
    /// options only and resets the active index to 0.
    pub async fn play_locator(&self, locator: &str) -> Result<bool> {
        let mut state = self.state.lock().await;
        if state.lifecycle != Lifecycle::Initialized {
            debug!(session = %self.id, "play_locator unavailable: no session");
            return Ok(false);
        }

        let flags = state.followed().flags(None);
        let options = media_options(&state.settings, &state.policy, flags);
        state.active_index = 0;
        info!(session = %self.id, locator, "Starting direct playback");
        self.engine.start(locator, &options).await?;
        Ok(true)
    }

    /// Expand the container entry at the active index and, when children
    /// appeared, immediately play the first of them (same index). Returns
    /// whether expansion occurred.
    pub async fn expand_and_play(&self) -> Result<bool> {
        let mut state = self.state.lock().await;
        if state.lifecycle != Lifecycle::Initialized {
            debug!(session = %self.id, "expand_and_play unavailable: no session");
            return Ok(false);
        }

        let index = state.active_index;
        let outcome = {
            let engine = Arc::clone(&self.engine);
            let labels = Arc::clone(&self.labels);
            state
                .followed_mut()
                .expand(index, engine.as_ref(), labels.as_ref())
                .await?
        };

        match outcome {
            ExpandOutcome::Expanded(_) => {
                self.start_at(&mut state, index).await?;
                Ok(true)
            }
            ExpandOutcome::NothingToExpand => Ok(false),
        }
    }

    /// Expand the entry at the active index without starting playback.
    pub async fn expand(&self) -> Result<ExpandOutcome> {
        let mut state = self.state.lock().await;
        if state.lifecycle != Lifecycle::Initialized {
            return Ok(ExpandOutcome::NothingToExpand);
        }
        let index = state.active_index;
        let engine = Arc::clone(&self.engine);
        let labels = Arc::clone(&self.labels);
        Ok(state
            .followed_mut()
            .expand(index, engine.as_ref(), labels.as_ref())
            .await?)
    }

    async fn start_at(&self, state: &mut SessionState, index: usize) -> Result<bool> {
        let (locator, flags) = {
            let list = state.followed();
            match list.locator(index) {
                Some(locator) => (locator.to_string(), list.flags(Some(index))),
                None => {
                    debug!(session = %self.id, index, "Play ignored: no media at index");
                    return Ok(false);
                }
            }
        };

        let options = media_options(&state.settings, &state.policy, flags);
        state.active_index = index;
        info!(session = %self.id, index, locator = %locator, "Starting playback");
        self.engine.start(&locator, &options).await?;
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Transport
    // ------------------------------------------------------------------

    /// Resume playback. `Ok(false)` when no session is available.
    pub async fn play(&self) -> Result<bool> {
        let state = self.state.lock().await;
        if state.lifecycle != Lifecycle::Initialized {
            return Ok(false);
        }
        self.engine.play().await?;
        Ok(true)
    }

    /// Pause playback. `Ok(false)` when no session is available.
    pub async fn pause(&self) -> Result<bool> {
        let state = self.state.lock().await;
        if state.lifecycle != Lifecycle::Initialized {
            return Ok(false);
        }
        self.engine.pause().await?;
        Ok(true)
    }

    /// Stop playback. `Ok(false)` when no session is available.
    pub async fn stop(&self) -> Result<bool> {
        let state = self.state.lock().await;
        if state.lifecycle != Lifecycle::Initialized {
            return Ok(false);
        }
        self.engine.stop().await?;
        Ok(true)
    }

    pub async fn is_playing(&self) -> Result<bool> {
        let state = self.state.lock().await;
        if state.lifecycle != Lifecycle::Initialized {
            return Ok(false);
        }
        Ok(self.engine.is_playing().await?)
    }

    pub async fn is_seekable(&self) -> Result<bool> {
        let state = self.state.lock().await;
        if state.lifecycle != Lifecycle::Initialized {
            return Ok(false);
        }
        Ok(self.engine.is_seekable().await?)
    }

    /// Current playback time in milliseconds; `-1` without a session or
    /// loaded media.
    pub async fn time(&self) -> Result<i64> {
        let state = self.state.lock().await;
        if state.lifecycle != Lifecycle::Initialized {
            return Ok(-1);
        }
        Ok(self.engine.time().await?)
    }

    /// Seek by absolute time. Returns the new time, `-1` without a session.
    pub async fn set_time(&self, time_ms: i64) -> Result<i64> {
        let state = self.state.lock().await;
        if state.lifecycle != Lifecycle::Initialized {
            return Ok(-1);
        }
        Ok(self.engine.set_time(time_ms).await?)
    }

    /// Fractional playback position; `-1.0` without a session.
    pub async fn position(&self) -> Result<f32> {
        let state = self.state.lock().await;
        if state.lifecycle != Lifecycle::Initialized {
            return Ok(-1.0);
        }
        Ok(self.engine.position().await?)
    }

    /// Seek by fraction. `Ok(false)` when no session is available.
    pub async fn set_position(&self, position: f32) -> Result<bool> {
        let state = self.state.lock().await;
        if state.lifecycle != Lifecycle::Initialized {
            return Ok(false);
        }
        self.engine.set_position(position).await?;
        Ok(true)
    }

    /// Media length in milliseconds; `-1` without a session.
    pub async fn length(&self) -> Result<i64> {
        let state = self.state.lock().await;
        if state.lifecycle != Lifecycle::Initialized {
            return Ok(-1);
        }
        Ok(self.engine.length().await?)
    }

    /// Playback rate; `1.0` without a session.
    pub async fn rate(&self) -> Result<f32> {
        let state = self.state.lock().await;
        if state.lifecycle != Lifecycle::Initialized {
            return Ok(1.0);
        }
        Ok(self.engine.rate().await?)
    }

    /// Change the playback rate. `Ok(false)` when no session is available.
    pub async fn set_rate(&self, rate: f32) -> Result<bool> {
        let state = self.state.lock().await;
        if state.lifecycle != Lifecycle::Initialized {
            return Ok(false);
        }
        self.engine.set_rate(rate).await?;
        Ok(true)
    }

    /// Engine volume; `-1` without a session.
    pub async fn volume(&self) -> Result<i32> {
        let state = self.state.lock().await;
        if state.lifecycle != Lifecycle::Initialized {
            return Ok(-1);
        }
        Ok(self.engine.volume().await?)
    }

    /// Set the engine volume. `Ok(false)` when no session is available.
    pub async fn set_volume(&self, volume: i32) -> Result<bool> {
        let state = self.state.lock().await;
        if state.lifecycle != Lifecycle::Initialized {
            return Ok(false);
        }
        self.engine.set_volume(volume).await?;
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Settings & policy
    // ------------------------------------------------------------------

    /// Snapshot of the current settings.
    pub async fn settings(&self) -> PlayerSettings {
        self.state.lock().await.settings.clone()
    }

    /// Replace the settings wholesale. Validated; effective at the next
    /// `play*` call.
    pub async fn apply_settings(&self, settings: PlayerSettings) -> Result<()> {
        settings.validate().map_err(SessionError::Playback)?;
        let mut state = self.state.lock().await;
        if let Some(support) = state.decoder_support {
            state.policy = resolve(settings.hardware_acceleration, support);
        }
        state.settings = settings;
        Ok(())
    }

    /// Change the requested acceleration mode and re-resolve the policy
    /// against the cached device classification.
    pub async fn set_hardware_acceleration(&self, mode: HwAcceleration) {
        let mut state = self.state.lock().await;
        state.settings.hardware_acceleration = mode;
        if let Some(support) = state.decoder_support {
            state.policy = resolve(mode, support);
        }
    }

    /// Change the developer decoder override.
    pub async fn set_dev_decoder(&self, dev: DevDecoder) {
        let mut state = self.state.lock().await;
        state.settings.dev_decoder = dev;
        debug!(session = %self.id, ?dev, "Decoder override changed");
    }

    /// Store equalizer bands and apply them to a live engine.
    pub async fn set_equalizer(&self, bands: Option<Vec<f32>>) -> Result<()> {
        let mut state = self.state.lock().await;
        let mut next = state.settings.clone();
        next.equalizer = bands.clone();
        next.validate().map_err(SessionError::Playback)?;
        state.settings = next;
        if state.lifecycle == Lifecycle::Initialized {
            self.engine.set_equalizer(bands.as_deref()).await?;
        }
        Ok(())
    }

    /// Resolved hardware policy currently in effect.
    pub async fn hw_policy(&self) -> HwPolicy {
        self.state.lock().await.policy.clone()
    }

    /// Cached device classification; `None` before init.
    pub async fn decoder_support(&self) -> Option<DecoderSupport> {
        self.state.lock().await.decoder_support
    }

    /// Whether the current configuration decodes straight into the display
    /// surface.
    pub async fn is_direct_rendering(&self) -> bool {
        let state = self.state.lock().await;
        direct_rendering(
            state.settings.dev_decoder,
            state.policy.effective,
            self.windowed_video_output,
        )
    }

    // ------------------------------------------------------------------
    // Media lists
    // ------------------------------------------------------------------

    /// Follow an alternate list. Reversible via
    /// [`follow_primary`](Self::follow_primary); the primary list is kept.
    pub async fn follow(&self, list: MediaList) {
        self.state.lock().await.alternate = Some(list);
    }

    /// Go back to following the primary list.
    pub async fn follow_primary(&self) {
        self.state.lock().await.alternate = None;
    }

    pub async fn is_following_primary(&self) -> bool {
        self.state.lock().await.alternate.is_none()
    }

    /// Read access to the followed list.
    pub async fn with_list<R>(&self, f: impl FnOnce(&MediaList) -> R) -> R {
        let state = self.state.lock().await;
        f(state.followed())
    }

    /// Write access to the followed list.
    pub async fn with_list_mut<R>(&self, f: impl FnOnce(&mut MediaList) -> R) -> R {
        let mut state = self.state.lock().await;
        f(state.followed_mut())
    }

    /// Read access to the primary list, regardless of which list is
    /// followed.
    pub async fn with_primary<R>(&self, f: impl FnOnce(&MediaList) -> R) -> R {
        let state = self.state.lock().await;
        f(&state.primary)
    }

    /// Write access to the primary list.
    pub async fn with_primary_mut<R>(&self, f: impl FnOnce(&mut MediaList) -> R) -> R {
        let mut state = self.state.lock().await;
        f(&mut state.primary)
    }

    /// Index in the followed list currently being played.
    pub async fn active_index(&self) -> usize {
        self.state.lock().await.active_index
    }

    /// Probe a locator into a [`Media`]; `None` without a session.
    pub async fn probe_media(&self, locator: &str) -> Result<Option<Media>> {
        let state = self.state.lock().await;
        if state.lifecycle != Lifecycle::Initialized {
            return Ok(None);
        }
        let media = Media::probe(self.engine.as_ref(), locator, self.labels.as_ref()).await?;
        Ok(Some(media))
    }

    /// Refresh the active entry's metadata from the engine (richer values
    /// become available once parsing completes). Returns whether an entry
    /// was refreshed.
    pub async fn refresh_active_meta(&self) -> Result<bool> {
        let mut state = self.state.lock().await;
        if state.lifecycle != Lifecycle::Initialized {
            return Ok(false);
        }
        let index = state.active_index;
        let engine = Arc::clone(&self.engine);
        let labels = Arc::clone(&self.labels);
        match state.followed_mut().media_mut(index) {
            Some(media) => {
                media.refresh_meta(engine.as_ref(), labels.as_ref()).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // ------------------------------------------------------------------
    // Events & audio
    // ------------------------------------------------------------------

    /// Subscribe to session events. Each call yields an independent
    /// receiver.
    pub fn subscribe(&self) -> Receiver<SessionEvent> {
        self.bus.subscribe()
    }

    /// The handle engine/host code uses to feed events into this session.
    pub fn event_relay(&self) -> EventRelay {
        self.relay.clone()
    }

    /// Register the crash listener notified exactly once per engine crash.
    pub fn set_crash_listener(&self, listener: Option<Arc<dyn CrashListener>>) {
        self.relay.set_crash_listener(listener);
    }

    /// The audio output bridge the decode side pushes PCM buffers into.
    pub fn audio_bridge(&self) -> Arc<AudioBridge> {
        Arc::clone(&self.bridge)
    }
}

impl fmt::Debug for PlayerSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayerSession")
            .field("id", &self.id)
            .field("windowed_video_output", &self.windowed_video_output)
            .finish()
    }
}
