//! Configuration management for reconscan.
//!
//! Provides XDG-compliant settings storage and the defaults the command line
//! falls back to.

mod settings;

pub use settings::{AppSettings, Paths};
