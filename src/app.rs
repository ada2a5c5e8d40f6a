//! Main application module for Marki Mark
//!
//! This module implements the eframe App trait: it owns the tab session,
//! feeds it file I/O completions from the background worker, draws the
//! menus, tab bar, viewer and editor, and turns user intents into session
//! operations.

use crate::config::{FileStore, Theme, ZoomLevel};
use crate::error::Error;
use crate::export::print_document;
use crate::files::{
    dialogs, load_image_file, open_external, FileGateway, FsGateway, IoCompletion, IoJob,
    IoWorker,
};
use crate::markdown::WELCOME_DOCUMENT;
use crate::state::{SaveRequest, TabSession};
use crate::theme::ThemeManager;
use crate::ui::{
    show_menu_bar, show_tab_bar, shortcut_label, AboutPanel, DocumentViewer, EditorAction,
    EditorPanel, MenuAction, MenuContext, SettingsPanel, TabBarAction, ViewerAction,
};
use eframe::egui::{self, Key, Modifiers, RichText};
use log::{debug, error, info, warn};
use std::path::PathBuf;

/// How long status messages stay visible, in seconds.
const TOAST_SECONDS: f64 = 3.0;
const ERROR_TOAST_SECONDS: f64 = 5.0;

// ─────────────────────────────────────────────────────────────────────────────
// Keyboard Shortcuts
// ─────────────────────────────────────────────────────────────────────────────

/// Keyboard shortcut actions.
///
/// These are detected in the input handling closure and executed
/// afterwards to avoid borrow conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyboardAction {
    /// Open file dialog (Ctrl+O)
    Open,
    /// Toggle edit mode (Ctrl+E)
    ToggleEdit,
    /// Save the draft (Ctrl+S, only while editing)
    Save,
    /// Leave edit mode discarding the draft (Escape, only while editing)
    CancelEdit,
    /// Print (Ctrl+P)
    Print,
    /// Zoom in (Ctrl+Plus or Ctrl+=)
    ZoomIn,
    /// Zoom out (Ctrl+Minus)
    ZoomOut,
    /// Reset zoom (Ctrl+0)
    ZoomReset,
}

/// Map a key press to a shortcut. `command` is Ctrl, or Cmd on macOS.
fn map_key(key: Key, modifiers: Modifiers, is_editing: bool) -> Option<KeyboardAction> {
    if key == Key::Escape {
        return (is_editing && modifiers.is_none()).then_some(KeyboardAction::CancelEdit);
    }
    if !modifiers.command || modifiers.alt {
        return None;
    }

    match key {
        // Shift is needed to type `+` on many layouts
        Key::Plus | Key::Equals => Some(KeyboardAction::ZoomIn),
        Key::Minus => Some(KeyboardAction::ZoomOut),
        _ if modifiers.shift => None,
        Key::O => Some(KeyboardAction::Open),
        Key::E => Some(KeyboardAction::ToggleEdit),
        Key::S if is_editing => Some(KeyboardAction::Save),
        Key::P => Some(KeyboardAction::Print),
        Key::Num0 => Some(KeyboardAction::ZoomReset),
        _ => None,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Status Messages
// ─────────────────────────────────────────────────────────────────────────────

/// A temporary message in the status bar.
#[derive(Debug, Clone, PartialEq)]
struct Toast {
    message: String,
    is_error: bool,
    expires_at: f64,
}

impl Toast {
    fn info(message: impl Into<String>, now: f64) -> Self {
        Self {
            message: message.into(),
            is_error: false,
            expires_at: now + TOAST_SECONDS,
        }
    }

    fn error(message: impl Into<String>, now: f64) -> Self {
        Self {
            message: message.into(),
            is_error: true,
            expires_at: now + ERROR_TOAST_SECONDS,
        }
    }

    fn is_expired(&self, now: f64) -> bool {
        now >= self.expires_at
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Application
// ─────────────────────────────────────────────────────────────────────────────

/// The main application struct that holds all state and implements eframe::App.
pub struct MarkiMarkApp {
    /// Open documents, display settings and their persistence
    session: TabSession<FileStore>,
    /// Background file I/O; `None` if the thread could not be started
    worker: Option<IoWorker>,
    theme_manager: ThemeManager,
    viewer: DocumentViewer,
    editor: EditorPanel,
    settings_panel: SettingsPanel,
    about_panel: AboutPanel,
    show_settings: bool,
    show_about: bool,
    toast: Option<Toast>,
    /// Zoom last applied to the egui context
    applied_zoom: Option<ZoomLevel>,
    /// Window title last sent to the viewport
    applied_title: String,
}

impl MarkiMarkApp {
    /// Create the app around a session that is restoring its tabs.
    pub fn new(cc: &eframe::CreationContext<'_>, session: TabSession<FileStore>) -> Self {
        // Zoom shortcuts are handled here so the session tracks the level
        cc.egui_ctx.options_mut(|o| o.zoom_with_keyboard = false);

        let repaint_ctx = cc.egui_ctx.clone();
        let worker = match IoWorker::spawn(FsGateway, move || repaint_ctx.request_repaint()) {
            Ok(worker) => Some(worker),
            Err(e) => {
                error!("{}; falling back to blocking file access", e);
                None
            }
        };

        let theme_manager = ThemeManager::new(session.theme());
        info!("Application initialized");

        Self {
            session,
            worker,
            theme_manager,
            viewer: DocumentViewer::new(),
            editor: EditorPanel::new(),
            settings_panel: SettingsPanel::new(),
            about_panel: AboutPanel::new(),
            show_settings: false,
            show_about: false,
            toast: None,
            applied_zoom: None,
            applied_title: String::new(),
        }
    }

    fn show_info(&mut self, ctx: &egui::Context, message: impl Into<String>) {
        self.toast = Some(Toast::info(message, ctx.input(|i| i.time)));
    }

    fn show_error(&mut self, ctx: &egui::Context, err: &Error) {
        self.toast = Some(Toast::error(err.to_string(), ctx.input(|i| i.time)));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // File I/O
    // ─────────────────────────────────────────────────────────────────────────

    /// Apply finished reads and writes, then start the next queued read.
    fn pump_io(&mut self, ctx: &egui::Context) {
        let Some(worker) = &self.worker else {
            for e in self.session.load_pending(&FsGateway as &dyn FileGateway) {
                self.show_error(ctx, &e);
            }
            return;
        };

        for completion in worker.poll() {
            match completion {
                IoCompletion::ImageDecoded { path, image } => {
                    self.viewer.insert_image(ctx, path, image);
                }
                IoCompletion::Read { path, result } => {
                    if let Err(e) = self.session.complete_read(path, result) {
                        self.toast = Some(Toast::error(e.to_string(), ctx.input(|i| i.time)));
                    }
                }
                IoCompletion::Written {
                    path,
                    content,
                    result,
                } => {
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    let draft = self.editor.draft(&path).map(str::to_string);
                    match self.session.complete_save(
                        SaveRequest { path, content },
                        result,
                        draft.as_deref(),
                    ) {
                        Ok(()) => {
                            self.toast = Some(Toast::info(
                                format!("Saved {}", name),
                                ctx.input(|i| i.time),
                            ))
                        }
                        Err(e) => {
                            self.toast = Some(Toast::error(e.to_string(), ctx.input(|i| i.time)))
                        }
                    }
                }
            }
        }

        if let Some(path) = self.session.next_read() {
            debug!("Reading {}", path.display());
            worker.submit(IoJob::Read(path));
        }
    }

    /// Decode the images the viewer asked for during this frame.
    fn request_images(&mut self, ctx: &egui::Context) {
        let requests = self.viewer.take_image_requests();
        if requests.is_empty() {
            return;
        }
        match &self.worker {
            Some(worker) => {
                for path in requests {
                    worker.submit(IoJob::DecodeImage(path));
                }
            }
            None => {
                for path in requests {
                    let image = load_image_file(&path);
                    self.viewer.insert_image(ctx, path, image);
                }
                ctx.request_repaint();
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Intents
    // ─────────────────────────────────────────────────────────────────────────

    fn handle_open_file(&mut self) {
        let initial_dir = self
            .session
            .active_tab()
            .and_then(|t| t.base_dir())
            .or_else(|| self.session.recent_files().first().and_then(|p| p.parent()))
            .map(|p| p.to_path_buf());

        let paths = dialogs::choose_markdown_files(initial_dir.as_deref());
        if paths.is_empty() {
            debug!("Open dialog cancelled");
            return;
        }
        info!("Opening {} file(s)", paths.len());
        self.session.open_paths(paths);
    }

    fn handle_open_recent(&mut self, path: PathBuf) {
        self.session.open_paths([path]);
    }

    fn handle_save(&mut self, ctx: &egui::Context, content: Option<String>) {
        let Some(tab) = self.session.active_tab() else {
            return;
        };
        if !tab.is_editing {
            return;
        }
        let content = content.or_else(|| self.editor.draft(&tab.path).map(str::to_string));

        if self.worker.is_none() {
            if let Err(e) = self.session.save(&FsGateway, content) {
                self.show_error(ctx, &e);
            }
            return;
        }

        match self.session.begin_save(content) {
            Ok(request) => {
                if let Some(worker) = &self.worker {
                    worker.submit(IoJob::Write {
                        path: request.path,
                        content: request.content,
                    });
                }
            }
            Err(e) => self.show_error(ctx, &e),
        }
    }

    fn handle_print(&mut self, ctx: &egui::Context) {
        let Some(tab) = self.session.active_tab() else {
            return;
        };
        match print_document(&tab.content, &tab.file_name, tab.base_dir()) {
            Ok(()) => self.show_info(ctx, "Opened print preview in your browser"),
            Err(e) => {
                warn!("Print failed: {}", e);
                self.show_error(ctx, &e);
            }
        }
    }

    fn handle_set_theme(&mut self, theme: Theme) {
        self.session.set_theme(theme);
        self.theme_manager.set_theme(theme);
    }

    fn handle_open_url(&mut self, url: &str) {
        info!("Opening link {}", url);
        // Best effort: a failure is only logged
        if let Err(e) = open_external(url) {
            warn!("{}", e);
        }
    }

    fn handle_keyboard_action(&mut self, ctx: &egui::Context, action: KeyboardAction) {
        debug!("Keyboard shortcut: {:?}", action);
        match action {
            KeyboardAction::Open => self.handle_open_file(),
            KeyboardAction::ToggleEdit => self.session.toggle_edit(),
            KeyboardAction::Save => self.handle_save(ctx, None),
            KeyboardAction::CancelEdit => self.session.cancel_edit(),
            KeyboardAction::Print => self.handle_print(ctx),
            KeyboardAction::ZoomIn => self.session.zoom_in(),
            KeyboardAction::ZoomOut => self.session.zoom_out(),
            KeyboardAction::ZoomReset => self.session.zoom_reset(),
        }
    }

    fn handle_menu_action(&mut self, ctx: &egui::Context, action: MenuAction) {
        debug!("Menu action: {:?}", action);
        match action {
            MenuAction::OpenFile => self.handle_open_file(),
            MenuAction::OpenRecent(path) => self.handle_open_recent(path),
            MenuAction::Print => self.handle_print(ctx),
            MenuAction::OpenSettings => self.show_settings = true,
            MenuAction::Exit => {
                info!("Exit requested");
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
            MenuAction::ToggleEdit => self.session.toggle_edit(),
            MenuAction::ZoomIn => self.session.zoom_in(),
            MenuAction::ZoomOut => self.session.zoom_out(),
            MenuAction::ZoomReset => self.session.zoom_reset(),
            MenuAction::OpenAbout => self.show_about = true,
        }
    }

    fn handle_keyboard_shortcuts(&mut self, ctx: &egui::Context) {
        if self.show_settings || self.show_about {
            return;
        }
        let is_editing = self
            .session
            .active_tab()
            .map(|t| t.is_editing)
            .unwrap_or(false);

        let actions: Vec<KeyboardAction> = ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Key {
                        key,
                        pressed: true,
                        repeat: false,
                        modifiers,
                        ..
                    } => map_key(*key, *modifiers, is_editing),
                    _ => None,
                })
                .collect()
        });

        for action in actions {
            self.handle_keyboard_action(ctx, action);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Frame Setup
    // ─────────────────────────────────────────────────────────────────────────

    fn sync_viewport(&mut self, ctx: &egui::Context) {
        self.theme_manager.apply_if_needed(ctx);

        let zoom = self.session.zoom();
        if self.applied_zoom != Some(zoom) {
            ctx.set_zoom_factor(zoom.factor());
            self.applied_zoom = Some(zoom);
        }

        let title = self.session.window_title();
        if title != self.applied_title {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
            self.applied_title = title;
        }

        let now = ctx.input(|i| i.time);
        if self.toast.as_ref().is_some_and(|t| t.is_expired(now)) {
            self.toast = None;
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Panels
    // ─────────────────────────────────────────────────────────────────────────

    fn show_top_panels(&mut self, ctx: &egui::Context) {
        let menu_action = egui::TopBottomPanel::top("menu_bar")
            .show(ctx, |ui| {
                let active = self.session.active_tab();
                show_menu_bar(
                    ui,
                    MenuContext {
                        recent_files: self.session.recent_files().paths(),
                        has_active_tab: active.is_some(),
                        is_editing: active.map(|t| t.is_editing).unwrap_or(false),
                        zoom: self.session.zoom(),
                    },
                )
            })
            .inner;
        if let Some(action) = menu_action {
            self.handle_menu_action(ctx, action);
        }

        if self.session.tabs().is_empty() {
            return;
        }

        let colors = self.theme_manager.colors();
        let tab_action = egui::TopBottomPanel::top("tab_bar")
            .show(ctx, |ui| {
                ui.add_space(4.0);
                let action = show_tab_bar(
                    ui,
                    self.session.tabs(),
                    self.session.active_tab_id(),
                    &colors,
                );
                if let Some(tab) = self.session.active_tab() {
                    ui.label(
                        RichText::new(tab.path.display().to_string())
                            .small()
                            .color(colors.text.muted),
                    );
                }
                action
            })
            .inner;

        match tab_action {
            Some(TabBarAction::Select(id)) => self.session.select_tab(&id),
            Some(TabBarAction::Close(id)) => self.session.close_tab(&id),
            None => {}
        }
    }

    fn show_status_bar(&mut self, ctx: &egui::Context) {
        let colors = self.theme_manager.colors();
        let mut edit_clicked = false;
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.session.is_loading() {
                    ui.spinner();
                    ui.label(RichText::new("Loading…").small().color(colors.text.muted));
                }
                if let Some(toast) = &self.toast {
                    let color = if toast.is_error {
                        colors.ui.error
                    } else {
                        colors.text.secondary
                    };
                    ui.label(RichText::new(&toast.message).small().color(color));
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if let Some(tab) = self.session.active_tab() {
                        let mode = if self.session.is_saving(&tab.path) {
                            "Saving…"
                        } else if tab.is_editing {
                            "Editing"
                        } else {
                            "Viewing"
                        };
                        ui.label(RichText::new(mode).small().color(colors.text.muted));
                        if !tab.is_editing {
                            edit_clicked = ui
                                .small_button("✏ Edit")
                                .on_hover_text(shortcut_label("E"))
                                .clicked();
                        }
                    }
                });
            });
        });

        if edit_clicked {
            self.session.enter_edit();
        }
    }

    fn show_central_panel(&mut self, ctx: &egui::Context) {
        let colors = self.theme_manager.colors();
        let theme = self.theme_manager.current_theme();

        let (editor_action, viewer_action) = egui::CentralPanel::default()
            .show(ctx, |ui| match self.session.active_tab() {
                Some(tab) if tab.is_editing => (self.editor.show(ui, tab, &colors), None),
                Some(tab) => (
                    None,
                    self.viewer
                        .show(ui, &tab.content, tab.base_dir(), theme, &colors),
                ),
                None => (
                    None,
                    self.viewer.show(ui, WELCOME_DOCUMENT, None, theme, &colors),
                ),
            })
            .inner;

        match editor_action {
            Some(EditorAction::Save(content)) => self.handle_save(ctx, Some(content)),
            Some(EditorAction::Cancel) => self.session.cancel_edit(),
            None => {}
        }
        if let Some(ViewerAction::OpenUrl(url)) = viewer_action {
            self.handle_open_url(&url);
        }
    }

    fn show_dialogs(&mut self, ctx: &egui::Context) {
        if self.show_settings {
            let output = self.settings_panel.show(ctx, self.session.theme());
            if let Some(theme) = output.theme {
                self.handle_set_theme(theme);
            }
            if output.close_requested {
                self.show_settings = false;
            }
        }

        if self.show_about {
            let is_dark = self.session.theme() == Theme::Dark;
            if self.about_panel.show(ctx, is_dark).close_requested {
                self.show_about = false;
            }
        }
    }
}

impl eframe::App for MarkiMarkApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.pump_io(ctx);
        self.handle_keyboard_shortcuts(ctx);
        self.sync_viewport(ctx);

        self.show_top_panels(ctx);
        self.show_status_bar(ctx);
        self.show_central_panel(ctx);
        self.show_dialogs(ctx);
        self.request_images(ctx);

        self.editor.retain_editing(self.session.tabs());

        if let Some(toast) = &self.toast {
            let remaining = toast.expires_at - ctx.input(|i| i.time);
            ctx.request_repaint_after(std::time::Duration::from_secs_f64(remaining.max(0.0)));
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!(
            "Shutting down with {} open tab(s)",
            self.session.tabs().len()
        );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn command() -> Modifiers {
        Modifiers::COMMAND
    }

    #[test]
    fn test_command_shortcuts() {
        assert_eq!(map_key(Key::O, command(), false), Some(KeyboardAction::Open));
        assert_eq!(
            map_key(Key::E, command(), false),
            Some(KeyboardAction::ToggleEdit)
        );
        assert_eq!(map_key(Key::P, command(), false), Some(KeyboardAction::Print));
        assert_eq!(
            map_key(Key::Num0, command(), false),
            Some(KeyboardAction::ZoomReset)
        );
        assert_eq!(
            map_key(Key::Minus, command(), false),
            Some(KeyboardAction::ZoomOut)
        );
    }

    #[test]
    fn test_zoom_in_accepts_plus_and_equals() {
        assert_eq!(
            map_key(Key::Equals, command(), false),
            Some(KeyboardAction::ZoomIn)
        );
        assert_eq!(
            map_key(Key::Plus, command() | Modifiers::SHIFT, false),
            Some(KeyboardAction::ZoomIn)
        );
    }

    #[test]
    fn test_save_only_while_editing() {
        assert_eq!(map_key(Key::S, command(), false), None);
        assert_eq!(map_key(Key::S, command(), true), Some(KeyboardAction::Save));
    }

    #[test]
    fn test_escape_cancels_only_while_editing() {
        assert_eq!(map_key(Key::Escape, Modifiers::NONE, false), None);
        assert_eq!(
            map_key(Key::Escape, Modifiers::NONE, true),
            Some(KeyboardAction::CancelEdit)
        );
    }

    #[test]
    fn test_keys_without_command_are_ignored() {
        assert_eq!(map_key(Key::O, Modifiers::NONE, false), None);
        assert_eq!(map_key(Key::O, Modifiers::ALT | command(), false), None);
        assert_eq!(map_key(Key::O, Modifiers::SHIFT | command(), false), None);
        assert_eq!(map_key(Key::Q, command(), false), None);
    }

    #[test]
    fn test_toast_expiry() {
        let toast = Toast::info("Saved a.md", 10.0);
        assert!(!toast.is_expired(12.9));
        assert!(toast.is_expired(13.0));

        let toast = Toast::error("boom", 10.0);
        assert!(toast.is_error);
        assert!(!toast.is_expired(14.0));
    }
}
