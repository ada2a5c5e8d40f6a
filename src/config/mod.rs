//! Configuration module for Marki Mark
//!
//! This module handles display settings and the persisted session
//! (theme, recent files, open tabs), stored as string key/value pairs
//! in a JSON file in the platform-specific config directory.

mod persistence;
mod settings;

pub use persistence::*;
pub use settings::*;
