//! # Session Facade Module
//!
//! The application-facing surface of the playback core: the media entity,
//! the ordered media list, and the [`PlayerSession`] facade that drives the
//! native engine.
//!
//! ## Overview
//!
//! Host applications wire their bridges into a
//! [`CoreConfig`](core_runtime::CoreConfig), construct a session, `init` it,
//! fill a media list, and play by index:
//!
//! ```ignore
//! let session = PlayerSession::new(config);
//! session.init().await?;
//! if let Some(media) = session.probe_media("file:///music/track.flac").await? {
//!     session.with_list_mut(|list| list.push(media)).await;
//! }
//! session.play_index(0).await?;
//! ```

pub mod error;
pub mod list;
pub mod media;
pub mod session;

pub use error::{Result, SessionError};
pub use list::{ExpandOutcome, MediaEntry, MediaList};
pub use media::{
    filename_of, kind_from_extension, Media, MediaKind, MediaRecord, AUDIO_EXTENSIONS,
    AUDIO_TRACK_UNSET, SPU_TRACK_UNSET, VIDEO_EXTENSIONS,
};
pub use session::{PlayerSession, SessionId};
