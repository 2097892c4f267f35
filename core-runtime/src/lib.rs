//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the playback core:
//! - Logging and tracing setup
//! - Session capability wiring (`CoreConfig`)
//! - Event bus and crash relay
//!
//! ## Overview
//!
//! This crate carries the ambient concerns every other module depends on. It
//! establishes the logging conventions, the event broadcasting mechanism
//! native engine callbacks flow through, and the fail-fast dependency
//! injection used to assemble a session.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{CoreConfig, CoreConfigBuilder};
pub use error::{Error, Result};
pub use events::{
    CrashListener, EngineEvent, EventBus, EventRelay, EventStream, SessionEvent,
};
