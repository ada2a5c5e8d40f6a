//! File operations module for Marki Mark
//!
//! This module provides document read/write access, the native open
//! dialog, image decoding, and the background worker that performs I/O off
//! the UI thread.

pub mod dialogs;
mod gateway;
pub(crate) mod image_decode;
mod worker;

pub use gateway::*;
pub use image_decode::load_image_file;
pub use worker::{IoCompletion, IoJob, IoWorker};
