//! # Core Runtime Module
//!
//! Provides the runtime infrastructure shared by the audio engine crates:
//! - Logging and tracing infrastructure
//! - Configuration management (capability injection + audio settings)
//! - Event bus system
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that the playback engine depends
//! on. It resolves host capabilities once at construction time, establishes
//! the logging conventions, and broadcasts unlock and playback events to any
//! interested observer (a UI layer, a test, a host logger).

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
