//! Injected provider for "unknown" metadata labels.
//!
//! Host applications with localized string resources implement
//! [`UnknownLabels`] to supply translated placeholders; the default returns
//! fixed English labels.

/// Placeholder strings substituted for absent media metadata.
pub trait UnknownLabels: Send + Sync {
    fn unknown_artist(&self) -> &str;
    fn unknown_album(&self) -> &str;
    fn unknown_genre(&self) -> &str;
}

/// Fixed English labels. Default implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishLabels;

impl UnknownLabels for EnglishLabels {
    fn unknown_artist(&self) -> &str {
        "Unknown Artist"
    }

    fn unknown_album(&self) -> &str {
        "Unknown Album"
    }

    fn unknown_genre(&self) -> &str {
        "Unknown Genre"
    }
}
