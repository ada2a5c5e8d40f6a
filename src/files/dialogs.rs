//! Native file dialog integration using the rfd crate
//!
//! This module provides the native file picker used to choose documents
//! to open.

use rfd::FileDialog;
use std::path::{Path, PathBuf};

/// File extension filter for markdown documents.
const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

/// Opens a native file dialog for selecting one or more markdown files.
///
/// Returns the selected file paths. Empty if the dialog was cancelled.
pub fn choose_markdown_files(initial_dir: Option<&Path>) -> Vec<PathBuf> {
    let mut dialog = FileDialog::new()
        .set_title("Open Markdown Files")
        .add_filter("Markdown Files", MARKDOWN_EXTENSIONS)
        .add_filter("All Files", &["*"]);

    if let Some(dir) = initial_dir {
        dialog = dialog.set_directory(dir);
    }

    dialog.pick_files().unwrap_or_default()
}
