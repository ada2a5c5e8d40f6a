//! Tab session state for Marki Mark
//!
//! This module contains the tab session manager: the open documents, which
//! one is active, the edit mode of each, the load/save/close lifecycle, and
//! the persistence of that state through a `SessionStore`.
//!
//! Document reads and writes are split into a request half and a completion
//! half so the UI can run them on a background thread. Opens are strictly
//! sequential: only one read is in flight at a time, which keeps tab order
//! deterministic and makes duplicate paths in one batch collapse into a
//! single tab.
//!
//! Restore queues the persisted tabs ahead of anything the user opens during
//! startup. It ends once those persisted paths have been processed, so files
//! the user opened meanwhile keep the focus they take.

use crate::config::{keys, RecentFiles, SessionSnapshot, SessionStore, Theme, ZoomLevel};
use crate::error::{Error, Result};
use crate::files::FileGateway;
use log::{debug, info, warn};
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};

/// Application name shown in the window title.
pub const APP_TITLE: &str = "Marki Mark";

// ─────────────────────────────────────────────────────────────────────────────
// Tab State
// ─────────────────────────────────────────────────────────────────────────────

/// One open document.
///
/// A tab is identified by its path: at most one tab exists per path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    /// Absolute path of the document, also the tab's identifier
    pub path: PathBuf,
    /// Display label (final path segment)
    pub file_name: String,
    /// Last loaded or saved text
    pub content: String,
    /// Whether the document is shown in the editor instead of the viewer
    pub is_editing: bool,
}

impl Tab {
    /// Create a tab in viewing mode.
    pub fn new(path: PathBuf, content: String) -> Self {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            path,
            file_name,
            content,
            is_editing: false,
        }
    }

    /// Directory used to resolve relative references in the document.
    pub fn base_dir(&self) -> Option<&Path> {
        self.path.parent()
    }
}

/// Where the session is in its startup sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    /// Reopening the persisted tabs; `active` is the persisted active tab
    /// and `remaining` counts restored paths not yet opened or skipped
    Restoring {
        active: Option<PathBuf>,
        remaining: usize,
    },
    /// Normal operation
    Ready,
}

/// A write of the active document that has been started but not finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub path: PathBuf,
    pub content: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tab Session
// ─────────────────────────────────────────────────────────────────────────────

/// The set of open documents plus display settings.
///
/// All persistence goes through the injected store. Store failures are
/// logged and otherwise ignored.
#[derive(Debug)]
pub struct TabSession<S: SessionStore> {
    /// Open tabs in open order
    tabs: Vec<Tab>,
    /// Path of the active tab
    active: Option<PathBuf>,
    recent_files: RecentFiles,
    theme: Theme,
    zoom: ZoomLevel,
    store: S,
    phase: SessionPhase,
    /// Paths waiting to be opened, in order
    open_queue: VecDeque<PathBuf>,
    /// Path whose read is in flight
    pending_read: Option<PathBuf>,
    /// Paths whose write is in flight
    saving: HashSet<PathBuf>,
}

impl<S: SessionStore> TabSession<S> {
    /// Create an empty session that ignores whatever the store holds.
    pub fn new(store: S) -> Self {
        Self {
            tabs: Vec::new(),
            active: None,
            recent_files: RecentFiles::default(),
            theme: Theme::default(),
            zoom: ZoomLevel::default(),
            store,
            phase: SessionPhase::Ready,
            open_queue: VecDeque::new(),
            pending_read: None,
            saving: HashSet::new(),
        }
    }

    /// Start a session from the persisted state.
    ///
    /// Theme and recent files apply immediately. The persisted tabs are
    /// queued for opening; until they have all been processed, open tabs
    /// and the active tab are not written back to the store.
    pub fn restore(store: S) -> Self {
        let snapshot = SessionSnapshot::load(&store);
        info!(
            "Restoring session: {} tabs, {} recent files, {} theme",
            snapshot.open_tabs.len(),
            snapshot.recent_files.len(),
            snapshot.theme
        );

        let mut session = Self::new(store);
        session.theme = snapshot.theme;
        session.recent_files = snapshot.recent_files;
        session.phase = SessionPhase::Restoring {
            active: snapshot.active_tab,
            remaining: snapshot.open_tabs.len(),
        };
        session.open_queue.extend(snapshot.open_tabs);
        session.settle();
        session
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn tab(&self, id: &Path) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.path == id)
    }

    pub fn active_tab_id(&self) -> Option<&Path> {
        self.active.as_deref()
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.active.as_deref().and_then(|id| self.tab(id))
    }

    pub fn recent_files(&self) -> &RecentFiles {
        &self.recent_files
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn zoom(&self) -> ZoomLevel {
        self.zoom
    }

    #[cfg(test)]
    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn is_restoring(&self) -> bool {
        matches!(self.phase, SessionPhase::Restoring { .. })
    }

    /// Whether opens are queued or a read is in flight.
    pub fn is_loading(&self) -> bool {
        self.pending_read.is_some() || !self.open_queue.is_empty()
    }

    /// Whether a write of `id` is in flight.
    pub fn is_saving(&self, id: &Path) -> bool {
        self.saving.contains(id)
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Window title for the current state.
    pub fn window_title(&self) -> String {
        match self.active_tab() {
            Some(tab) => format!("{} - {}", tab.file_name, APP_TITLE),
            None => APP_TITLE.to_string(),
        }
    }

    fn tab_mut(&mut self, id: &Path) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|t| t.path == id)
    }

    fn active_tab_mut(&mut self) -> Option<&mut Tab> {
        let id = self.active.clone()?;
        self.tab_mut(&id)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Opening
    // ─────────────────────────────────────────────────────────────────────────

    /// Queue paths to be opened, in order.
    ///
    /// Drive the queue with `next_read`/`complete_read`, or with
    /// `load_pending` when reading synchronously.
    pub fn open_paths<I>(&mut self, paths: I)
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let before = self.open_queue.len();
        self.open_queue.extend(paths);
        debug!("Queued {} paths to open", self.open_queue.len() - before);
    }

    /// The next path that must be read from disk, if any.
    ///
    /// Returns `None` while a read is in flight. Queued paths that are
    /// already open are activated and recorded as recent without a read.
    pub fn next_read(&mut self) -> Option<PathBuf> {
        if self.pending_read.is_some() {
            return None;
        }

        while let Some(path) = self.open_queue.pop_front() {
            if self.tab(&path).is_some() {
                debug!("Already open, activating {}", path.display());
                self.activate(path.clone());
                self.record_recent(path);
                self.finish_queued_path();
                continue;
            }
            self.pending_read = Some(path.clone());
            return Some(path);
        }

        self.settle();
        None
    }

    /// Apply the result of reading `path`.
    ///
    /// A completion for a path that is not the read in flight is stale and
    /// is discarded. A failed read skips that one path and is returned to
    /// the caller; the rest of the queue is unaffected.
    pub fn complete_read(&mut self, path: PathBuf, result: Result<String>) -> Result<()> {
        if self.pending_read.as_ref() != Some(&path) {
            debug!("Discarding stale read of {}", path.display());
            return Ok(());
        }
        self.pending_read = None;

        let outcome = match result {
            Ok(content) => {
                if self.tab(&path).is_none() {
                    info!("Opened {}", path.display());
                    self.tabs.push(Tab::new(path.clone(), content));
                    self.persist_open_tabs();
                }
                self.activate(path.clone());
                self.record_recent(path);
                Ok(())
            }
            Err(e) => {
                warn!("Failed to open {}: {}", path.display(), e);
                Err(e)
            }
        };

        self.finish_queued_path();
        outcome
    }

    /// Open every queued path, reading synchronously through `gateway`.
    ///
    /// Returns the read failures, one per skipped path.
    pub fn load_pending(&mut self, gateway: &dyn FileGateway) -> Vec<Error> {
        let mut failures = Vec::new();
        while let Some(path) = self.next_read() {
            let result = gateway.read_file(&path);
            if let Err(e) = self.complete_read(path, result) {
                failures.push(e);
            }
        }
        failures
    }

    /// Account for one processed path from the front of the queue.
    ///
    /// Restored paths sit ahead of any later opens, so while restoring the
    /// first processed paths are exactly the restored ones.
    fn finish_queued_path(&mut self) {
        if let SessionPhase::Restoring { remaining, .. } = &mut self.phase {
            *remaining = remaining.saturating_sub(1);
        }
        self.settle();
    }

    /// Leave the restore phase once every restored path has been processed.
    fn settle(&mut self) {
        if !matches!(self.phase, SessionPhase::Restoring { remaining: 0, .. }) {
            return;
        }

        if let SessionPhase::Restoring { active, .. } =
            std::mem::replace(&mut self.phase, SessionPhase::Ready)
        {
            if let Some(id) = active {
                if self.tab(&id).is_some() {
                    self.active = Some(id);
                } else {
                    debug!("Persisted active tab {} is not open", id.display());
                }
            }
            info!("Session restore complete with {} tabs", self.tabs.len());
            self.persist_open_tabs();
            self.persist_active_tab();
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Tab Management
    // ─────────────────────────────────────────────────────────────────────────

    /// Make `id` the active tab. Unknown ids are ignored.
    pub fn select_tab(&mut self, id: &Path) {
        if self.tab(id).is_some() {
            self.activate(id.to_path_buf());
        } else {
            debug!("Ignoring selection of unknown tab {}", id.display());
        }
    }

    /// Close the tab `id`. Unknown ids are ignored.
    ///
    /// Closing the active tab activates the tab before it, or the new first
    /// tab when the first was closed.
    pub fn close_tab(&mut self, id: &Path) {
        let Some(index) = self.tabs.iter().position(|t| t.path == id) else {
            debug!("Ignoring close of unknown tab {}", id.display());
            return;
        };

        self.tabs.remove(index);
        debug!("Closed tab {}", id.display());
        self.persist_open_tabs();

        if self.active.as_deref() == Some(id) {
            let replacement = if index > 0 {
                self.tabs.get(index - 1)
            } else {
                self.tabs.first()
            };
            self.active = replacement.map(|t| t.path.clone());
            self.persist_active_tab();
        }
    }

    fn activate(&mut self, id: PathBuf) {
        if self.active.as_ref() != Some(&id) {
            self.active = Some(id);
            self.persist_active_tab();
        }
    }

    fn record_recent(&mut self, path: PathBuf) {
        self.recent_files.record(path);
        match self.recent_files.to_json() {
            Ok(json) => self.write_key(keys::RECENT_FILES, &json),
            Err(e) => warn!("Failed to serialize recent files: {}", e),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Edit Mode
    // ─────────────────────────────────────────────────────────────────────────

    // Edit mode is frozen while the active tab is being written, so the
    // completion always finds the tab in the mode the save started from.

    /// Flip edit mode on the active tab.
    pub fn toggle_edit(&mut self) {
        if self.active_is_saving() {
            debug!("Ignoring edit toggle while saving");
            return;
        }
        if let Some(tab) = self.active_tab_mut() {
            tab.is_editing = !tab.is_editing;
            debug!("{} editing: {}", tab.file_name, tab.is_editing);
        }
    }

    /// Put the active tab into edit mode.
    pub fn enter_edit(&mut self) {
        if self.active_is_saving() {
            debug!("Ignoring edit while saving");
            return;
        }
        if let Some(tab) = self.active_tab_mut() {
            tab.is_editing = true;
        }
    }

    /// Leave edit mode on the active tab, keeping its last saved content.
    pub fn cancel_edit(&mut self) {
        if self.active_is_saving() {
            debug!("Ignoring cancel while saving");
            return;
        }
        if let Some(tab) = self.active_tab_mut() {
            tab.is_editing = false;
        }
    }

    fn active_is_saving(&self) -> bool {
        self.active
            .as_deref()
            .map_or(false, |id| self.saving.contains(id))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Saving
    // ─────────────────────────────────────────────────────────────────────────

    /// Start saving the active tab.
    ///
    /// `content` defaults to the tab's current content. Only one write per
    /// tab may be in flight.
    pub fn begin_save(&mut self, content: Option<String>) -> Result<SaveRequest> {
        let tab = self.active_tab().ok_or(Error::NoActiveTab)?;
        if self.saving.contains(&tab.path) {
            return Err(Error::Application(format!(
                "{} is already being saved",
                tab.file_name
            )));
        }
        let request = SaveRequest {
            path: tab.path.clone(),
            content: content.unwrap_or_else(|| tab.content.clone()),
        };
        self.saving.insert(request.path.clone());
        Ok(request)
    }

    /// Apply the result of a save.
    ///
    /// On success the tab takes the saved text. It leaves edit mode only when
    /// `draft`, the editor text at completion time, matches what was
    /// written; newer edits keep the tab editing. A failed save leaves the
    /// tab untouched. If the tab was closed while the write was in flight
    /// the completion is discarded.
    pub fn complete_save(
        &mut self,
        request: SaveRequest,
        result: Result<()>,
        draft: Option<&str>,
    ) -> Result<()> {
        self.saving.remove(&request.path);

        if let Err(e) = result {
            warn!("Failed to save {}: {}", request.path.display(), e);
            return Err(e);
        }

        let unchanged = draft.map_or(true, |draft| draft == request.content);
        match self.tab_mut(&request.path) {
            Some(tab) => {
                tab.content = request.content;
                if unchanged {
                    tab.is_editing = false;
                } else {
                    debug!("{} changed during save, still editing", tab.file_name);
                }
                info!("Saved {}", request.path.display());
            }
            None => debug!(
                "Saved {} after its tab was closed",
                request.path.display()
            ),
        }
        Ok(())
    }

    /// Save the active tab synchronously through `gateway`.
    pub fn save(&mut self, gateway: &dyn FileGateway, content: Option<String>) -> Result<()> {
        let request = self.begin_save(content)?;
        let result = gateway.write_file(&request.path, &request.content);
        self.complete_save(request, result, None)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Display Settings
    // ─────────────────────────────────────────────────────────────────────────

    pub fn zoom_in(&mut self) {
        self.zoom.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.zoom.zoom_out();
    }

    pub fn zoom_reset(&mut self) {
        self.zoom.reset();
    }

    /// Switch theme and persist the choice.
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.write_key(keys::THEME, theme.as_str());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Persistence
    // ─────────────────────────────────────────────────────────────────────────

    fn persist_open_tabs(&mut self) {
        if self.is_restoring() {
            return;
        }
        let paths: Vec<&Path> = self.tabs.iter().map(|t| t.path.as_path()).collect();
        match serde_json::to_string(&paths) {
            Ok(json) => self.write_key(keys::OPEN_TABS, &json),
            Err(e) => warn!("Failed to serialize open tabs: {}", e),
        }
    }

    fn persist_active_tab(&mut self) {
        if self.is_restoring() {
            return;
        }
        let result = match &self.active {
            Some(id) => self
                .store
                .set(keys::ACTIVE_TAB_ID, &id.to_string_lossy()),
            None => self.store.remove(keys::ACTIVE_TAB_ID),
        };
        if let Err(e) = result {
            warn!("Failed to persist {}: {}", keys::ACTIVE_TAB_ID, e);
        }
    }

    fn write_key(&mut self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            warn!("Failed to persist {}: {}", key, e);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
