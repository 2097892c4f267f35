//! End-to-end session flows against a scripted engine.

use async_trait::async_trait;
use bridge_engine::{
    AudioSink, DecoderSupport, EngineError, EnvironmentProbe, FixedProfile, MediaEngine, MetaKey,
    PcmBuffer, StreamSpec, TrackDescriptor, TrackMeta,
};
use core_playback::{HwAcceleration, OptionFlags, PlaybackError};
use core_runtime::events::CrashListener;
use core_runtime::CoreConfig;
use core_session::{ExpandOutcome, Media, MediaRecord, PlayerSession, SessionError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ============================================================================
// Test doubles
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum EngineCall {
    Initialize,
    Shutdown,
    Start { locator: String, options: Vec<String> },
    Play,
    Pause,
    Stop,
    SetTime(i64),
    SetEqualizer(Option<Vec<f32>>),
}

#[derive(Default)]
struct TestEngine {
    calls: Mutex<Vec<EngineCall>>,
    fail_initialize: bool,
    tracks: Mutex<HashMap<String, Option<Vec<TrackDescriptor>>>>,
    children: Mutex<HashMap<String, Vec<String>>>,
    meta: Mutex<HashMap<i32, String>>,
}

impl TestEngine {
    fn failing_initialize() -> Self {
        Self {
            fail_initialize: true,
            ..Default::default()
        }
    }

    fn set_tracks(&self, locator: &str, tracks: Option<Vec<TrackDescriptor>>) {
        self.tracks.lock().unwrap().insert(locator.to_string(), tracks);
    }

    fn set_children(&self, locator: &str, children: &[&str]) {
        self.children.lock().unwrap().insert(
            locator.to_string(),
            children.iter().map(|child| child.to_string()).collect(),
        );
    }

    fn set_meta(&self, key: MetaKey, value: &str) {
        self.meta.lock().unwrap().insert(key.code(), value.to_string());
    }

    fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }

    fn starts(&self) -> Vec<(String, Vec<String>)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                EngineCall::Start { locator, options } => Some((locator, options)),
                _ => None,
            })
            .collect()
    }

    fn count(&self, expected: &EngineCall) -> usize {
        self.calls()
            .iter()
            .filter(|call| *call == expected)
            .count()
    }

    fn record(&self, call: EngineCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl MediaEngine for TestEngine {
    async fn initialize(&self) -> bridge_engine::Result<()> {
        if self.fail_initialize {
            return Err(EngineError::LoadFailed("native library missing".to_string()));
        }
        self.record(EngineCall::Initialize);
        Ok(())
    }

    async fn shutdown(&self) -> bridge_engine::Result<()> {
        self.record(EngineCall::Shutdown);
        Ok(())
    }

    async fn probe_tracks(
        &self,
        locator: &str,
    ) -> bridge_engine::Result<Option<Vec<TrackDescriptor>>> {
        Ok(self
            .tracks
            .lock()
            .unwrap()
            .get(locator)
            .cloned()
            .unwrap_or_else(|| Some(vec![TrackDescriptor::Audio])))
    }

    async fn start(&self, locator: &str, options: &[String]) -> bridge_engine::Result<()> {
        self.record(EngineCall::Start {
            locator: locator.to_string(),
            options: options.to_vec(),
        });
        Ok(())
    }

    async fn sub_items(&self, locator: &str) -> bridge_engine::Result<Vec<String>> {
        Ok(self
            .children
            .lock()
            .unwrap()
            .get(locator)
            .cloned()
            .unwrap_or_default())
    }

    async fn play(&self) -> bridge_engine::Result<()> {
        self.record(EngineCall::Play);
        Ok(())
    }

    async fn pause(&self) -> bridge_engine::Result<()> {
        self.record(EngineCall::Pause);
        Ok(())
    }

    async fn stop(&self) -> bridge_engine::Result<()> {
        self.record(EngineCall::Stop);
        Ok(())
    }

    async fn is_playing(&self) -> bridge_engine::Result<bool> {
        Ok(true)
    }

    async fn is_seekable(&self) -> bridge_engine::Result<bool> {
        Ok(true)
    }

    async fn time(&self) -> bridge_engine::Result<i64> {
        Ok(5_000)
    }

    async fn set_time(&self, time_ms: i64) -> bridge_engine::Result<i64> {
        self.record(EngineCall::SetTime(time_ms));
        Ok(time_ms)
    }

    async fn position(&self) -> bridge_engine::Result<f32> {
        Ok(0.25)
    }

    async fn set_position(&self, _position: f32) -> bridge_engine::Result<()> {
        Ok(())
    }

    async fn length(&self) -> bridge_engine::Result<i64> {
        Ok(20_000)
    }

    async fn rate(&self) -> bridge_engine::Result<f32> {
        Ok(1.5)
    }

    async fn set_rate(&self, _rate: f32) -> bridge_engine::Result<()> {
        Ok(())
    }

    async fn volume(&self) -> bridge_engine::Result<i32> {
        Ok(80)
    }

    async fn set_volume(&self, _volume: i32) -> bridge_engine::Result<()> {
        Ok(())
    }

    async fn meta(&self, key: MetaKey) -> bridge_engine::Result<Option<String>> {
        Ok(self.meta.lock().unwrap().get(&key.code()).cloned())
    }

    async fn set_equalizer(&self, bands: Option<&[f32]>) -> bridge_engine::Result<()> {
        self.record(EngineCall::SetEqualizer(bands.map(<[f32]>::to_vec)));
        Ok(())
    }
}

#[derive(Default)]
struct QuietSink {
    fail_open: bool,
}

#[async_trait]
impl AudioSink for QuietSink {
    async fn open(&self, _spec: StreamSpec) -> bridge_engine::Result<()> {
        if self.fail_open {
            return Err(EngineError::DeviceUnavailable("format rejected".to_string()));
        }
        Ok(())
    }

    async fn write(&self, _buffer: PcmBuffer) -> bridge_engine::Result<()> {
        Ok(())
    }

    async fn pause(&self) -> bridge_engine::Result<()> {
        Ok(())
    }

    async fn resume(&self) -> bridge_engine::Result<()> {
        Ok(())
    }

    async fn close(&self) -> bridge_engine::Result<()> {
        Ok(())
    }
}

struct RejectingProbe;

impl EnvironmentProbe for RejectingProbe {
    fn verify(&self) -> std::result::Result<(), String> {
        Err("CPU lacks required features".to_string())
    }
}

#[derive(Default)]
struct CountingCrashListener {
    crashes: AtomicUsize,
}

impl CrashListener for CountingCrashListener {
    fn on_engine_crash(&self) {
        self.crashes.fetch_add(1, Ordering::SeqCst);
    }
}

fn session_with(
    engine: Arc<TestEngine>,
    support: DecoderSupport,
) -> PlayerSession {
    let config = CoreConfig::builder()
        .engine(engine)
        .audio_sink(Arc::new(QuietSink::default()))
        .device_profile(Arc::new(FixedProfile(support)))
        .build()
        .unwrap();
    PlayerSession::new(config)
}

fn audio_media(locator: &str) -> Media {
    Media::from_record(
        MediaRecord {
            locator: locator.to_string(),
            kind: core_session::MediaKind::Audio,
            ..Default::default()
        },
        &bridge_engine::EnglishLabels,
    )
}

async fn push_tracks(session: &PlayerSession, locators: &[&str]) {
    for locator in locators {
        let media = audio_media(locator);
        session.with_list_mut(|list| list.push(media)).await;
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test]
async fn init_is_idempotent() {
    let engine = Arc::new(TestEngine::default());
    let session = session_with(engine.clone(), DecoderSupport::All);

    session.init().await.unwrap();
    session.init().await.unwrap();

    assert!(session.is_initialized().await);
    assert_eq!(engine.count(&EngineCall::Initialize), 1);
}

#[tokio::test]
async fn incompatible_environment_aborts_init() {
    let engine = Arc::new(TestEngine::default());
    let config = CoreConfig::builder()
        .engine(engine.clone())
        .audio_sink(Arc::new(QuietSink::default()))
        .device_profile(Arc::new(FixedProfile(DecoderSupport::All)))
        .environment(Arc::new(RejectingProbe))
        .build()
        .unwrap();
    let session = PlayerSession::new(config);

    let err = session.init().await.unwrap_err();
    assert!(matches!(err, SessionError::IncompatibleEnvironment(_)));
    assert!(err.is_fatal());
    assert!(!session.is_initialized().await);
    // Validation failed before the native engine was contacted.
    assert_eq!(engine.count(&EngineCall::Initialize), 0);
}

#[tokio::test]
async fn engine_load_failure_is_fatal() {
    let engine = Arc::new(TestEngine::failing_initialize());
    let session = session_with(engine, DecoderSupport::All);

    let err = session.init().await.unwrap_err();
    assert!(matches!(err, SessionError::EngineLoad(_)));
    assert!(err.is_fatal());
    assert!(!session.is_initialized().await);
}

#[tokio::test]
async fn destroy_twice_does_not_fault() {
    let engine = Arc::new(TestEngine::default());
    let session = session_with(engine.clone(), DecoderSupport::All);

    session.init().await.unwrap();
    session.destroy().await;
    session.destroy().await;

    assert_eq!(engine.count(&EngineCall::Shutdown), 1);
}

#[tokio::test]
async fn operations_after_destroy_report_unavailable() {
    let engine = Arc::new(TestEngine::default());
    let session = session_with(engine.clone(), DecoderSupport::All);

    session.init().await.unwrap();
    session.destroy().await;
    let calls_after_destroy = engine.calls().len();

    assert!(!session.play().await.unwrap());
    assert!(!session.pause().await.unwrap());
    assert!(!session.stop().await.unwrap());
    assert!(!session.is_playing().await.unwrap());
    assert_eq!(session.time().await.unwrap(), -1);
    assert_eq!(session.set_time(9_000).await.unwrap(), -1);
    assert_eq!(session.position().await.unwrap(), -1.0);
    assert_eq!(session.length().await.unwrap(), -1);
    assert_eq!(session.rate().await.unwrap(), 1.0);
    assert_eq!(session.volume().await.unwrap(), -1);
    assert!(!session.play_index(0).await.unwrap());
    assert!(!session.play_locator("file:///a.mp3").await.unwrap());
    assert!(!session.expand_and_play().await.unwrap());

    // None of the sentinel results came from the engine.
    assert_eq!(engine.calls().len(), calls_after_destroy);
}

#[tokio::test]
async fn destroyed_session_can_be_reinitialized() {
    let engine = Arc::new(TestEngine::default());
    let session = session_with(engine.clone(), DecoderSupport::All);

    session.init().await.unwrap();
    session.destroy().await;
    session.init().await.unwrap();

    assert!(session.is_initialized().await);
    assert!(session.play().await.unwrap());
}

#[tokio::test]
async fn restart_cycles_the_engine() {
    let engine = Arc::new(TestEngine::default());
    let session = session_with(engine.clone(), DecoderSupport::All);

    session.init().await.unwrap();
    session.restart().await.unwrap();

    assert_eq!(engine.count(&EngineCall::Shutdown), 1);
    assert_eq!(engine.count(&EngineCall::Initialize), 2);
    assert!(session.is_initialized().await);
}

// ============================================================================
// Play entry points
// ============================================================================

#[tokio::test]
async fn play_index_out_of_range_is_a_noop() {
    let engine = Arc::new(TestEngine::default());
    let session = session_with(engine.clone(), DecoderSupport::All);
    session.init().await.unwrap();
    push_tracks(&session, &["file:///a.mp3", "file:///b.mp3", "file:///c.mp3"]).await;

    assert!(!session.play_index(5).await.unwrap());
    assert_eq!(session.active_index().await, 0);
    assert!(engine.starts().is_empty());
}

#[tokio::test]
async fn play_index_records_index_and_builds_options() {
    let engine = Arc::new(TestEngine::default());
    let session = session_with(engine.clone(), DecoderSupport::All);
    session.init().await.unwrap();
    push_tracks(&session, &["file:///a.mp3", "file:///b.mp3"]).await;

    assert!(session.play_index(1).await.unwrap());
    assert_eq!(session.active_index().await, 1);

    let starts = engine.starts();
    assert_eq!(starts.len(), 1);
    let (locator, options) = &starts[0];
    assert_eq!(locator, "file:///b.mp3");
    assert_eq!(
        options,
        &vec![
            ":file-caching=1500".to_string(),
            ":network-caching=1500".to_string(),
            ":codec=mediacodec,iomx,all".to_string(),
        ]
    );
}

#[tokio::test]
async fn play_locator_resets_active_index() {
    let engine = Arc::new(TestEngine::default());
    let session = session_with(engine.clone(), DecoderSupport::All);
    session.init().await.unwrap();
    push_tracks(&session, &["file:///a.mp3", "file:///b.mp3"]).await;

    session.play_index(1).await.unwrap();
    assert_eq!(session.active_index().await, 1);

    assert!(session.play_locator("http://radio/stream").await.unwrap());
    assert_eq!(session.active_index().await, 0);
    assert_eq!(engine.starts()[1].0, "http://radio/stream");
}

#[tokio::test]
async fn per_entry_flags_shape_the_options() {
    let engine = Arc::new(TestEngine::default());
    let session = session_with(engine.clone(), DecoderSupport::All);
    session.init().await.unwrap();

    let media = audio_media("file:///a.mp3");
    session
        .with_list_mut(|list| {
            list.push_with_flags(
                media,
                OptionFlags {
                    no_hardware_acceleration: false,
                    no_video: true,
                },
            )
        })
        .await;

    session.play_index(0).await.unwrap();
    let (_, options) = &engine.starts()[0];
    assert_eq!(options.last().map(String::as_str), Some(":no-video"));
}

#[tokio::test]
async fn disabled_acceleration_drops_codec_directive_on_next_play() {
    let engine = Arc::new(TestEngine::default());
    let session = session_with(engine.clone(), DecoderSupport::All);
    session.init().await.unwrap();
    push_tracks(&session, &["file:///a.mp3"]).await;

    session
        .set_hardware_acceleration(HwAcceleration::Disabled)
        .await;
    session.play_index(0).await.unwrap();

    let (_, options) = &engine.starts()[0];
    assert!(options.is_empty());
}

// ============================================================================
// Expansion
// ============================================================================

#[tokio::test]
async fn expand_and_play_replaces_entry_and_plays_first_child() {
    let engine = Arc::new(TestEngine::default());
    engine.set_children(
        "file:///mix.m3u",
        &["file:///song1.mp3", "file:///song2.mp3", "file:///song3.mp3"],
    );
    let session = session_with(engine.clone(), DecoderSupport::All);
    session.init().await.unwrap();

    push_tracks(&session, &["file:///mix.m3u"]).await;
    let before = session.with_list(|list| list.len()).await;

    assert!(session.expand_and_play().await.unwrap());

    // One entry became three: length grows by children - 1.
    let after = session.with_list(|list| list.len()).await;
    assert_eq!(before, 1);
    assert_eq!(after, 3);

    let locators: Vec<String> = session
        .with_list(|list| {
            (0..list.len())
                .filter_map(|index| list.locator(index).map(str::to_owned))
                .collect()
        })
        .await;
    assert_eq!(
        locators,
        vec![
            "file:///song1.mp3".to_string(),
            "file:///song2.mp3".to_string(),
            "file:///song3.mp3".to_string(),
        ]
    );

    // Playback restarted at the same index, now the first child.
    assert_eq!(session.active_index().await, 0);
    assert_eq!(engine.starts()[0].0, "file:///song1.mp3");
}

#[tokio::test]
async fn expand_with_no_children_reports_nothing() {
    let engine = Arc::new(TestEngine::default());
    let session = session_with(engine.clone(), DecoderSupport::All);
    session.init().await.unwrap();
    push_tracks(&session, &["file:///plain.mp3"]).await;

    assert_eq!(
        session.expand().await.unwrap(),
        ExpandOutcome::NothingToExpand
    );
    assert!(!session.expand_and_play().await.unwrap());
    assert_eq!(session.with_list(|list| list.len()).await, 1);
    assert!(engine.starts().is_empty());
}

// ============================================================================
// Media lists
// ============================================================================

#[tokio::test]
async fn following_an_alternate_list_is_reversible() {
    let engine = Arc::new(TestEngine::default());
    let session = session_with(engine.clone(), DecoderSupport::All);
    session.init().await.unwrap();
    push_tracks(&session, &["file:///primary.mp3"]).await;

    let mut alternate = core_session::MediaList::new();
    alternate.push(audio_media("file:///alternate.mp3"));
    session.follow(alternate).await;
    assert!(!session.is_following_primary().await);

    session.play_index(0).await.unwrap();
    assert_eq!(engine.starts()[0].0, "file:///alternate.mp3");

    session.follow_primary().await;
    assert!(session.is_following_primary().await);
    session.play_index(0).await.unwrap();
    assert_eq!(engine.starts()[1].0, "file:///primary.mp3");

    // The primary list survived the detour untouched.
    assert_eq!(
        session.with_primary(|list| list.len()).await,
        1
    );
}

// ============================================================================
// Policy
// ============================================================================

#[tokio::test]
async fn init_resolves_policy_from_device_classification() {
    let engine = Arc::new(TestEngine::default());
    let session = session_with(engine, DecoderSupport::MediaCodec);
    session.init().await.unwrap();

    let policy = session.hw_policy().await;
    assert_eq!(policy.effective, HwAcceleration::Full);
    assert_eq!(policy.codec_list, "mediacodec,all");
    assert_eq!(
        session.decoder_support().await,
        Some(DecoderSupport::MediaCodec)
    );
}

#[tokio::test]
async fn forcing_cannot_override_broken_device() {
    let engine = Arc::new(TestEngine::default());
    let session = session_with(engine, DecoderSupport::None);
    session.init().await.unwrap();

    session.set_hardware_acceleration(HwAcceleration::Full).await;
    let policy = session.hw_policy().await;
    assert_eq!(policy.effective, HwAcceleration::Disabled);
    assert_eq!(policy.codec_list, "all");
}

// ============================================================================
// Settings & equalizer
// ============================================================================

#[tokio::test]
async fn apply_settings_validates_before_storing() {
    let engine = Arc::new(TestEngine::default());
    let session = session_with(engine, DecoderSupport::All);
    session.init().await.unwrap();

    let mut bad = session.settings().await;
    bad.hw_latency_caching_ms = 0;
    let err = session.apply_settings(bad).await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::Playback(PlaybackError::InvalidSettings(_))
    ));
    assert_eq!(session.settings().await.hw_latency_caching_ms, 1500);
}

#[tokio::test]
async fn equalizer_reaches_live_engine() {
    let engine = Arc::new(TestEngine::default());
    let session = session_with(engine.clone(), DecoderSupport::All);
    session.init().await.unwrap();

    session
        .set_equalizer(Some(vec![0.0, 1.5, -3.0]))
        .await
        .unwrap();
    assert_eq!(
        engine.count(&EngineCall::SetEqualizer(Some(vec![0.0, 1.5, -3.0]))),
        1
    );

    let err = session
        .set_equalizer(Some(vec![f32::INFINITY]))
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Playback(_)));
}

// ============================================================================
// Events & crash relay
// ============================================================================

#[tokio::test]
async fn crash_listener_fires_once_per_crash_and_not_after_destroy() {
    let engine = Arc::new(TestEngine::default());
    let session = session_with(engine, DecoderSupport::All);
    session.init().await.unwrap();

    let listener = Arc::new(CountingCrashListener::default());
    session.set_crash_listener(Some(listener.clone()));
    let relay = session.event_relay();

    relay.notify_crash();
    assert_eq!(listener.crashes.load(Ordering::SeqCst), 1);

    session.destroy().await;
    relay.notify_crash();
    assert_eq!(listener.crashes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn engine_events_reach_subscribers() {
    use core_runtime::events::{EngineEvent, SessionEvent};

    let engine = Arc::new(TestEngine::default());
    let session = session_with(engine, DecoderSupport::All);
    session.init().await.unwrap();

    let mut rx = session.subscribe();
    session.event_relay().forward(EngineEvent::EndReached);

    assert_eq!(
        rx.recv().await.unwrap(),
        SessionEvent::Engine(EngineEvent::EndReached)
    );
}

// ============================================================================
// Audio degradation
// ============================================================================

#[tokio::test]
async fn audio_device_failure_degrades_without_killing_session() {
    let engine = Arc::new(TestEngine::default());
    let config = CoreConfig::builder()
        .engine(engine.clone())
        .audio_sink(Arc::new(QuietSink { fail_open: true }))
        .device_profile(Arc::new(FixedProfile(DecoderSupport::All)))
        .build()
        .unwrap();
    let session = PlayerSession::new(config);
    session.init().await.unwrap();
    push_tracks(&session, &["file:///a.mp3"]).await;

    let bridge = session.audio_bridge();
    let err = bridge.open(StreamSpec::new(48_000, 2, 2048)).await.unwrap_err();
    assert!(err.is_device_error());
    assert!(!bridge.is_open().await);

    // Playback continues, video-only.
    assert!(session.play_index(0).await.unwrap());
}

// ============================================================================
// Metadata refresh
// ============================================================================

#[tokio::test]
async fn refresh_active_meta_pulls_parsed_values() {
    let engine = Arc::new(TestEngine::default());
    engine.set_tracks("file:///a.mp3", Some(vec![TrackDescriptor::Audio]));
    engine.set_meta(MetaKey::Title, "Parsed Title");
    engine.set_meta(MetaKey::Artist, "Parsed Artist");
    engine.set_meta(MetaKey::NowPlaying, "Live Show");

    let session = session_with(engine.clone(), DecoderSupport::All);
    session.init().await.unwrap();

    let media = session.probe_media("file:///a.mp3").await.unwrap().unwrap();
    session.with_list_mut(|list| list.push(media)).await;
    session.play_index(0).await.unwrap();

    assert!(session.refresh_active_meta().await.unwrap());
    let (title, artist, now_playing) = session
        .with_list(|list| {
            let media = list.media(0).unwrap();
            (
                media.title(),
                media.artist().to_string(),
                media.now_playing().map(str::to_owned),
            )
        })
        .await;
    assert_eq!(title, "Parsed Title");
    assert_eq!(artist, "Parsed Artist");
    assert_eq!(now_playing.as_deref(), Some("Live Show"));
}

#[tokio::test]
async fn probe_media_classifies_from_descriptors() {
    let engine = Arc::new(TestEngine::default());
    engine.set_tracks(
        "file:///movie.mkv",
        Some(vec![
            TrackDescriptor::Video {
                width: 1280,
                height: 720,
            },
            TrackDescriptor::Meta(TrackMeta {
                duration_ms: 90_000,
                ..Default::default()
            }),
        ]),
    );

    let session = session_with(engine, DecoderSupport::All);
    session.init().await.unwrap();

    let media = session
        .probe_media("file:///movie.mkv")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(media.kind(), core_session::MediaKind::Video);
    assert_eq!(media.width(), 1280);
    assert_eq!(media.duration_ms(), 90_000);
}
