//! Workspace placeholder crate.
//!
//! This crate exists to expose shared feature flags that map to the
//! individual workspace crates (e.g., `core-session`, `core-playback`).
//! Host applications can depend on `mediacore` and enable the documented
//! features without needing to wire each crate individually.

#[cfg(feature = "session")]
pub use core_session as session;

#[cfg(any(feature = "session", feature = "policy-only"))]
pub use core_playback as playback;

#[cfg(feature = "session")]
pub use core_runtime as runtime;

#[cfg(any(feature = "session", feature = "policy-only"))]
pub use bridge_engine as bridge;
