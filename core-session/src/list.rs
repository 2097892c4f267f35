//! # Media List
//!
//! Ordered, mutable playlist the session follows during playback.
//!
//! Insertion order is significant. Each entry pairs a [`Media`] with
//! per-entry option flags that feed the option builder when that entry is
//! played. Container entries (playlists, archives) are expanded in place:
//! the single entry is atomically replaced by its ordered children.

use crate::media::Media;
use bridge_engine::{EngineError, MediaEngine, UnknownLabels};
use core_playback::OptionFlags;
use tracing::{debug, info};

/// One playlist slot: the media plus its option overrides.
#[derive(Debug, Clone)]
pub struct MediaEntry {
    pub media: Media,
    pub flags: OptionFlags,
}

/// Result of expanding a container entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandOutcome {
    /// The entry was replaced by this many children.
    Expanded(usize),
    /// The entry had no children (or the index was vacant). Not an error.
    NothingToExpand,
}

/// Ordered sequence of media entries.
#[derive(Debug, Clone, Default)]
pub struct MediaList {
    entries: Vec<MediaEntry>,
}

impl MediaList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a media item with default option flags.
    pub fn push(&mut self, media: Media) {
        self.push_with_flags(media, OptionFlags::default());
    }

    /// Append a media item with explicit option flags.
    pub fn push_with_flags(&mut self, media: Media, flags: OptionFlags) {
        self.entries.push(MediaEntry { media, flags });
    }

    /// Insert at `index`, appending when the index is past the end.
    pub fn insert(&mut self, index: usize, media: Media) {
        let index = index.min(self.entries.len());
        self.entries.insert(
            index,
            MediaEntry {
                media,
                flags: OptionFlags::default(),
            },
        );
    }

    /// Remove and return the entry at `index`.
    pub fn remove(&mut self, index: usize) -> Option<Media> {
        if index < self.entries.len() {
            Some(self.entries.remove(index).media)
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn media(&self, index: usize) -> Option<&Media> {
        self.entries.get(index).map(|entry| &entry.media)
    }

    pub fn media_mut(&mut self, index: usize) -> Option<&mut Media> {
        self.entries.get_mut(index).map(|entry| &mut entry.media)
    }

    /// Locator of the entry at `index`, if present.
    pub fn locator(&self, index: usize) -> Option<&str> {
        self.media(index).map(Media::locator)
    }

    /// Option flags for `index`. A vacant or absent index yields default
    /// flags, the "apply global options only" sentinel used when playing a
    /// locator outside the list.
    pub fn flags(&self, index: Option<usize>) -> OptionFlags {
        index
            .and_then(|index| self.entries.get(index))
            .map(|entry| entry.flags)
            .unwrap_or_default()
    }

    pub fn set_flags(&mut self, index: usize, flags: OptionFlags) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.flags = flags;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &MediaEntry> {
        self.entries.iter()
    }

    /// Replace the container entry at `index` with its resolved children,
    /// preserving relative order.
    ///
    /// The replacement is atomic: children are fully probed first, and a
    /// probe failure leaves the list untouched. A childless entry or vacant
    /// index reports [`ExpandOutcome::NothingToExpand`].
    pub async fn expand(
        &mut self,
        index: usize,
        engine: &dyn MediaEngine,
        labels: &dyn UnknownLabels,
    ) -> Result<ExpandOutcome, EngineError> {
        let Some(entry) = self.entries.get(index) else {
            debug!(index, "Expand ignored: no entry at index");
            return Ok(ExpandOutcome::NothingToExpand);
        };

        let parent_locator = entry.media.locator().to_string();
        let flags = entry.flags;

        let child_locators = engine.sub_items(&parent_locator).await?;
        if child_locators.is_empty() {
            debug!(media = %parent_locator, "Nothing to expand");
            return Ok(ExpandOutcome::NothingToExpand);
        }

        let mut children = Vec::with_capacity(child_locators.len());
        for locator in child_locators {
            let media = Media::probe(engine, locator, labels).await?;
            children.push(MediaEntry { media, flags });
        }

        let count = children.len();
        self.entries.splice(index..=index, children);
        info!(media = %parent_locator, children = count, "Expanded container entry");
        Ok(ExpandOutcome::Expanded(count))
    }
}

// ============================================================================
// Tests
// ============================================================================
