//! UI components for Marki Mark
//!
//! This module contains the widgets and dialogs the app is built from.
//! Components draw themselves and report what the user did; they never
//! change session state directly.

mod about;
mod editor;
mod images;
mod menu_bar;
mod settings;
mod tab_bar;
mod viewer;

pub use about::AboutPanel;
pub use editor::{EditorAction, EditorPanel};
pub use menu_bar::{show_menu_bar, MenuAction, MenuContext};
pub use settings::SettingsPanel;
pub use tab_bar::{show_tab_bar, TabBarAction};
pub use viewer::{DocumentViewer, ViewerAction};

/// Name of the platform's command modifier.
const COMMAND_KEY: &str = if cfg!(target_os = "macos") {
    "Cmd"
} else {
    "Ctrl"
};

/// Display text for the command modifier plus `key`, e.g. `Ctrl+O`.
pub fn shortcut_label(key: &str) -> String {
    format!("{}+{}", COMMAND_KEY, key)
}
