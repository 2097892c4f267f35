//! # Media Entity
//!
//! A playable resource: a locator plus derived metadata.
//!
//! ## Classification
//!
//! A media item is classified by inspecting the track descriptors the engine
//! reports for its locator. A video stream wins over audio; when probing is
//! inconclusive, the file extension is matched against fixed video/audio
//! extension sets; anything else stays [`MediaKind::Unknown`].
//!
//! Metadata fields the container does not carry are substituted with labels
//! from the injected [`UnknownLabels`] provider at construction time, and
//! the substitution is remembered so callers can distinguish "tagged as X"
//! from "untagged".

use bridge_engine::{
    EngineError, MediaEngine, MetaKey, TrackDescriptor, TrackMeta, UnknownLabels,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, warn};

/// File extensions recognized as video content.
pub const VIDEO_EXTENSIONS: &[&str] = &[
    ".3g2", ".3gp", ".3gp2", ".3gpp", ".amv", ".asf", ".avi", ".divx", ".drc", ".dv", ".f4v",
    ".flv", ".gvi", ".gxf", ".ismv", ".iso", ".m1v", ".m2v", ".m2t", ".m2ts", ".m4v", ".mkv",
    ".mov", ".mp2", ".mp2v", ".mp4", ".mp4v", ".mpe", ".mpeg", ".mpeg1", ".mpeg2", ".mpeg4",
    ".mpg", ".mpv2", ".mts", ".mtv", ".mxf", ".mxg", ".nsv", ".nut", ".nuv", ".ogm", ".ogv",
    ".ogx", ".ps", ".rec", ".rm", ".rmvb", ".tod", ".ts", ".tts", ".vob", ".vro", ".webm", ".wm",
    ".wmv", ".wtv", ".xesc",
];

/// File extensions recognized as audio content.
pub const AUDIO_EXTENSIONS: &[&str] = &[
    ".3ga", ".a52", ".aac", ".ac3", ".adt", ".adts", ".aif", ".aifc", ".aiff", ".amr", ".aob",
    ".ape", ".awb", ".caf", ".dts", ".flac", ".it", ".m4a", ".m4b", ".m4p", ".mid", ".mka",
    ".mlp", ".mod", ".mpa", ".mp1", ".mp2", ".mp3", ".mpc", ".mpga", ".oga", ".ogg", ".oma",
    ".opus", ".ra", ".ram", ".rmi", ".s3m", ".spx", ".tta", ".voc", ".vqf", ".w64", ".wav",
    ".wma", ".wv", ".xa", ".xm",
];

/// Media classification derived from track descriptors or the locator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Video,
    Audio,
    /// Container grouping other media (directory, collection).
    Group,
    #[default]
    Unknown,
}

/// Default index for "no explicit audio track selected".
pub const AUDIO_TRACK_UNSET: i32 = -1;
/// Default index for "no explicit subtitle track selected".
pub const SPU_TRACK_UNSET: i32 = -2;

// ============================================================================
// Media
// ============================================================================

/// One playable resource and its derived metadata.
///
/// Created either by probing a locator through the engine or from a
/// pre-built [`MediaRecord`]; metadata may be refreshed in place once the
/// engine has fully parsed the media.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Media {
    locator: String,
    kind: MediaKind,
    title: Option<String>,
    artist: String,
    artist_unknown: bool,
    genre: String,
    genre_unknown: bool,
    album: String,
    album_unknown: bool,
    album_artist: String,
    album_artist_unknown: bool,
    artwork_locator: Option<String>,
    now_playing: Option<String>,
    track_number: u32,
    duration_ms: i64,
    width: u32,
    height: u32,
    /// Saved playback position in milliseconds.
    time_ms: i64,
    audio_track: i32,
    spu_track: i32,
}

/// Pre-saved field values for building a [`Media`] without probing.
#[derive(Debug, Clone, Default)]
pub struct MediaRecord {
    pub locator: String,
    pub kind: MediaKind,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub genre: Option<String>,
    pub album: Option<String>,
    pub album_artist: Option<String>,
    pub artwork_locator: Option<String>,
    pub track_number: u32,
    pub duration_ms: i64,
    pub width: u32,
    pub height: u32,
    pub time_ms: i64,
    pub audio_track: i32,
    pub spu_track: i32,
}

impl Media {
    /// Build a media item by probing `locator` through the engine.
    pub async fn probe(
        engine: &dyn MediaEngine,
        locator: impl Into<String>,
        labels: &dyn UnknownLabels,
    ) -> Result<Self, EngineError> {
        let locator = locator.into();
        let tracks = engine.probe_tracks(&locator).await?;
        Ok(Self::from_tracks(locator, tracks, labels))
    }

    /// Build a media item from engine-reported track descriptors.
    ///
    /// `None` descriptors (unreadable resource) leave all metadata at the
    /// unknown labels and classify from the extension alone.
    pub fn from_tracks(
        locator: String,
        tracks: Option<Vec<TrackDescriptor>>,
        labels: &dyn UnknownLabels,
    ) -> Self {
        let mut media = Self::blank(locator, labels);

        for track in tracks.unwrap_or_default() {
            match track {
                TrackDescriptor::Video { width, height } => {
                    media.kind = MediaKind::Video;
                    media.width = width;
                    media.height = height;
                }
                TrackDescriptor::Audio if media.kind == MediaKind::Unknown => {
                    media.kind = MediaKind::Audio;
                }
                TrackDescriptor::Meta(meta) => media.apply_track_meta(meta, labels),
                _ => {}
            }
        }

        // No conclusive elementary stream: fall back to the extension sets.
        if media.kind == MediaKind::Unknown {
            media.kind = kind_from_extension(&media.locator);
        }

        media
    }

    /// Build a media item from pre-saved values.
    pub fn from_record(record: MediaRecord, labels: &dyn UnknownLabels) -> Self {
        let (artist, artist_unknown) =
            resolve_label(record.artist.as_deref(), labels.unknown_artist());
        let (genre, genre_unknown) = resolve_label(record.genre.as_deref(), labels.unknown_genre());
        let (album, album_unknown) = resolve_label(record.album.as_deref(), labels.unknown_album());
        let (album_artist, album_artist_unknown) =
            resolve_label(record.album_artist.as_deref(), labels.unknown_artist());

        Self {
            locator: record.locator,
            kind: record.kind,
            title: record.title.filter(|title| !title.trim().is_empty()),
            artist,
            artist_unknown,
            genre,
            genre_unknown,
            album,
            album_unknown,
            album_artist,
            album_artist_unknown,
            artwork_locator: record.artwork_locator,
            now_playing: None,
            track_number: record.track_number,
            duration_ms: record.duration_ms,
            width: record.width,
            height: record.height,
            time_ms: record.time_ms,
            audio_track: record.audio_track,
            spu_track: record.spu_track,
        }
    }

    fn blank(locator: String, labels: &dyn UnknownLabels) -> Self {
        Self {
            locator,
            kind: MediaKind::Unknown,
            title: None,
            artist: labels.unknown_artist().to_string(),
            artist_unknown: true,
            genre: labels.unknown_genre().to_string(),
            genre_unknown: true,
            album: labels.unknown_album().to_string(),
            album_unknown: true,
            album_artist: labels.unknown_artist().to_string(),
            album_artist_unknown: true,
            artwork_locator: None,
            now_playing: None,
            track_number: 0,
            duration_ms: 0,
            width: 0,
            height: 0,
            time_ms: 0,
            audio_track: AUDIO_TRACK_UNSET,
            spu_track: SPU_TRACK_UNSET,
        }
    }

    fn apply_track_meta(&mut self, meta: TrackMeta, labels: &dyn UnknownLabels) {
        self.duration_ms = meta.duration_ms;
        self.title = meta.title.as_deref().map(str::trim).filter(|title| !title.is_empty()).map(str::to_owned);

        let (artist, artist_unknown) =
            resolve_label(meta.artist.as_deref(), labels.unknown_artist());
        self.artist = artist;
        self.artist_unknown = artist_unknown;

        let (album, album_unknown) = resolve_label(meta.album.as_deref(), labels.unknown_album());
        self.album = album;
        self.album_unknown = album_unknown;

        let (genre, genre_unknown) = resolve_label(meta.genre.as_deref(), labels.unknown_genre());
        self.genre = genre;
        self.genre_unknown = genre_unknown;

        let (album_artist, album_artist_unknown) =
            resolve_label(meta.album_artist.as_deref(), labels.unknown_artist());
        self.album_artist = album_artist;
        self.album_artist_unknown = album_artist_unknown;

        self.artwork_locator = meta.artwork_locator;
        self.now_playing = meta.now_playing;
        self.track_number = parse_track_number(&self.locator, meta.track_number.as_deref());

        debug!(
            title = self.title.as_deref().unwrap_or(""),
            artist = %self.artist,
            album = %self.album,
            genre = %self.genre,
            "Extracted media metadata"
        );
    }

    /// Re-read metadata from the engine after parsing completed.
    pub async fn refresh_meta(
        &mut self,
        engine: &dyn MediaEngine,
        labels: &dyn UnknownLabels,
    ) -> Result<(), EngineError> {
        let title = engine.meta(MetaKey::Title).await?;
        self.title = title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_owned);

        let artist = engine.meta(MetaKey::Artist).await?;
        let (artist, artist_unknown) = resolve_label(artist.as_deref(), labels.unknown_artist());
        self.artist = artist;
        self.artist_unknown = artist_unknown;

        let genre = engine.meta(MetaKey::Genre).await?;
        let (genre, genre_unknown) = resolve_label(genre.as_deref(), labels.unknown_genre());
        self.genre = genre;
        self.genre_unknown = genre_unknown;

        let album = engine.meta(MetaKey::Album).await?;
        let (album, album_unknown) = resolve_label(album.as_deref(), labels.unknown_album());
        self.album = album;
        self.album_unknown = album_unknown;

        self.now_playing = engine.meta(MetaKey::NowPlaying).await?;
        self.artwork_locator = engine.meta(MetaKey::ArtworkUrl).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn locator(&self) -> &str {
        &self.locator
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Last path segment of the locator.
    pub fn filename(&self) -> &str {
        filename_of(&self.locator)
    }

    /// Display title: the tagged title for non-video media, otherwise the
    /// file stem.
    pub fn title(&self) -> String {
        if let Some(title) = &self.title {
            if self.kind != MediaKind::Video {
                return title.clone();
            }
        }
        let filename = self.filename();
        match filename.rfind('.') {
            Some(end) if end > 0 => filename[..end].to_string(),
            _ => filename.to_string(),
        }
    }

    /// Display subtitle: now-playing text when present, otherwise
    /// "artist - album". Empty for video media.
    pub fn subtitle(&self) -> String {
        if self.kind == MediaKind::Video {
            return String::new();
        }
        match &self.now_playing {
            Some(now_playing) => now_playing.clone(),
            None => format!("{} - {}", self.artist, self.album),
        }
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    /// Artist used for grouping: the album artist when tagged, otherwise
    /// the track artist.
    pub fn reference_artist(&self) -> &str {
        if self.album_artist_unknown {
            &self.artist
        } else {
            &self.album_artist
        }
    }

    pub fn album_artist(&self) -> &str {
        &self.album_artist
    }

    pub fn album(&self) -> &str {
        &self.album
    }

    /// Genre, normalized to leading-uppercase for case-insensitive grouping.
    pub fn genre(&self) -> String {
        if self.genre_unknown || self.genre.chars().count() <= 1 {
            return self.genre.clone();
        }
        let mut chars = self.genre.chars();
        let first = chars.next().map(|c| c.to_uppercase().to_string()).unwrap_or_default();
        format!("{}{}", first, chars.as_str().to_lowercase())
    }

    pub fn is_artist_unknown(&self) -> bool {
        self.artist_unknown
    }

    pub fn is_album_unknown(&self) -> bool {
        self.album_unknown
    }

    pub fn is_album_artist_unknown(&self) -> bool {
        self.album_artist_unknown
    }

    pub fn now_playing(&self) -> Option<&str> {
        self.now_playing.as_deref()
    }

    pub fn artwork_locator(&self) -> Option<&str> {
        self.artwork_locator.as_deref()
    }

    pub fn track_number(&self) -> u32 {
        self.track_number
    }

    pub fn duration_ms(&self) -> i64 {
        self.duration_ms
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn time_ms(&self) -> i64 {
        self.time_ms
    }

    pub fn set_time_ms(&mut self, time_ms: i64) {
        self.time_ms = time_ms;
    }

    pub fn audio_track(&self) -> i32 {
        self.audio_track
    }

    pub fn set_audio_track(&mut self, track: i32) {
        self.audio_track = track;
    }

    pub fn spu_track(&self) -> i32 {
        self.spu_track
    }

    pub fn set_spu_track(&mut self, track: i32) {
        self.spu_track = track;
    }

    /// Case-insensitive title ordering, for sorted listings.
    pub fn cmp_by_title(&self, other: &Self) -> Ordering {
        self.title()
            .to_lowercase()
            .cmp(&other.title().to_lowercase())
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Classify a locator from its file extension; case-insensitive.
pub fn kind_from_extension(locator: &str) -> MediaKind {
    let Some(dot) = locator.rfind('.') else {
        return MediaKind::Unknown;
    };
    let extension = locator[dot..].to_lowercase();
    if VIDEO_EXTENSIONS.contains(&extension.as_str()) {
        MediaKind::Video
    } else if AUDIO_EXTENSIONS.contains(&extension.as_str()) {
        MediaKind::Audio
    } else {
        MediaKind::Unknown
    }
}

/// Last path segment of a locator.
pub fn filename_of(locator: &str) -> &str {
    locator
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(locator)
}

fn resolve_label(value: Option<&str>, fallback: &str) -> (String, bool) {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => (value.to_string(), false),
        _ => (fallback.to_string(), true),
    }
}

fn parse_track_number(locator: &str, raw: Option<&str>) -> u32 {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return 0;
    };
    match raw.parse::<u32>() {
        Ok(number) => number,
        Err(_) => {
            // Containers in the wild carry values like "3/12" or plain junk.
            warn!(
                track_number = raw,
                media = filename_of(locator),
                "Ignoring malformed track number"
            );
            0
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
