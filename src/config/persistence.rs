//! Session store persistence for Marki Mark
//!
//! This module defines the string-keyed, string-valued `SessionStore` used to
//! remember state across restarts, and its on-disk implementation that keeps
//! all entries in a single JSON file in the platform configuration directory.

use crate::error::{Error, Result, ResultExt};
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Application name used for the config directory
const APP_NAME: &str = "marki-mark";

/// Session store file name
const STORE_FILE_NAME: &str = "session.json";

/// Temporary file name (used during atomic writes)
const STORE_TEMP_NAME: &str = "session.json.tmp";

// ─────────────────────────────────────────────────────────────────────────────
// Session Store Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Durable key/value storage that survives process restarts.
///
/// Reads never fail from the caller's point of view: a missing key and an
/// unreadable backing file both read as absent.
pub trait SessionStore {
    /// Get the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove `key` if present.
    fn remove(&mut self, key: &str) -> Result<()>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Platform-Specific Directory Resolution
// ─────────────────────────────────────────────────────────────────────────────

/// Get the platform-specific configuration directory for the application.
///
/// - **Windows**: `%APPDATA%\marki-mark\`
/// - **macOS**: `~/Library/Application Support/marki-mark/`
/// - **Linux**: `~/.config/marki-mark/`
///
/// # Errors
///
/// Returns `Error::ConfigDirNotFound` if the config directory cannot be determined
/// (e.g., if the HOME environment variable is not set).
pub fn get_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|base| base.join(APP_NAME))
        .ok_or(Error::ConfigDirNotFound)
}

/// Get the full path to the session store file.
pub fn get_store_file_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(STORE_FILE_NAME))
}

// ─────────────────────────────────────────────────────────────────────────────
// File-Backed Store
// ─────────────────────────────────────────────────────────────────────────────

/// Session store backed by a JSON object on disk.
///
/// Every mutation rewrites the whole file atomically. When no backing path
/// is available the store keeps its entries in memory only.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: Option<PathBuf>,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at the default platform location.
    ///
    /// Falls back to an in-memory store if the config directory cannot be
    /// determined.
    pub fn open_default() -> Self {
        match get_store_file_path() {
            Ok(path) => Self::open(path),
            Err(e) => {
                warn!("{}. Session state will not be persisted.", e);
                Self::in_memory()
            }
        }
    }

    /// Open the store backed by `path`.
    ///
    /// A missing, empty or corrupted file yields an empty store.
    pub fn open(path: PathBuf) -> Self {
        let entries =
            load_entries(&path).unwrap_or_warn_default(BTreeMap::new(), "Failed to load session");
        Self {
            path: Some(path),
            entries,
        }
    }

    /// A store that is never written to disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: BTreeMap::new(),
        }
    }

    /// The backing file, if any.
    #[cfg(test)]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write all entries to disk.
    ///
    /// This performs an atomic write by writing a temporary file in the same
    /// directory and renaming it over the original.
    fn flush(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(dir) = path.parent() {
            if !dir.exists() {
                debug!("Creating config directory: {}", dir.display());
                fs::create_dir_all(dir).map_err(|e| Error::StoreSave {
                    path: dir.to_path_buf(),
                    source: Box::new(e),
                })?;
            }
        }

        let json = serde_json::to_string_pretty(&self.entries).map_err(|e| Error::StoreSave {
            path: path.clone(),
            source: Box::new(e),
        })?;

        let temp_path = path.with_file_name(STORE_TEMP_NAME);
        fs::write(&temp_path, &json).map_err(|e| Error::StoreSave {
            path: temp_path.clone(),
            source: Box::new(e),
        })?;

        fs::rename(&temp_path, path).map_err(|e| Error::StoreSave {
            path: path.clone(),
            source: Box::new(e),
        })?;

        debug!("Session saved to {}", path.display());
        Ok(())
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if self.entries.get(key).map(String::as_str) == Some(value) {
            return Ok(());
        }
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// Read the entries from `path`.
fn load_entries(path: &Path) -> Result<BTreeMap<String, String>> {
    if !path.exists() {
        debug!(
            "Session file not found at {}, starting fresh",
            path.display()
        );
        return Ok(BTreeMap::new());
    }

    let contents = fs::read_to_string(path).map_err(|e| Error::StoreLoad {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;

    if contents.trim().is_empty() {
        debug!("Session file is empty, starting fresh");
        return Ok(BTreeMap::new());
    }

    let entries = serde_json::from_str(&contents).map_err(|e| {
        warn!(
            "Session file at {} contains invalid JSON: {}",
            path.display(),
            e
        );
        Error::Parse {
            message: format!("Failed to parse session file: {}", e),
            source: Some(Box::new(e)),
        }
    })?;

    info!("Session loaded from {}", path.display());
    Ok(entries)
}

// ─────────────────────────────────────────────────────────────────────────────
// In-Memory Store (tests)
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory store with optional write failures.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub entries: BTreeMap<String, String>,
    pub fail_writes: bool,
    pub writes: usize,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: &[(&str, &str)]) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes {
            return Err(Error::Application("store is read-only".to_string()));
        }
        self.writes += 1;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.fail_writes {
            return Err(Error::Application("store is read-only".to_string()));
        }
        self.writes += 1;
        self.entries.remove(key);
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_path(dir: &TempDir) -> PathBuf {
        dir.path().join(APP_NAME).join(STORE_FILE_NAME)
    }

    #[test]
    fn test_get_config_dir_contains_app_name() {
        if let Ok(path) = get_config_dir() {
            assert!(path.to_string_lossy().contains(APP_NAME));
        }
    }

    #[test]
    fn test_open_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(store_path(&dir));
        assert!(store.get("theme").is_none());
    }

    #[test]
    fn test_set_creates_directory_and_persists() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);

        let mut store = FileStore::open(path.clone());
        store.set("theme", "light").unwrap();
        store.set("openTabs", r#"["/a.md"]"#).unwrap();
        assert!(path.exists());

        let reopened = FileStore::open(path);
        assert_eq!(reopened.get("theme").as_deref(), Some("light"));
        assert_eq!(reopened.get("openTabs").as_deref(), Some(r#"["/a.md"]"#));
    }

    #[test]
    fn test_remove_persists() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);

        let mut store = FileStore::open(path.clone());
        store.set("activeTabId", "/a.md").unwrap();
        store.remove("activeTabId").unwrap();
        // Removing an absent key is not an error
        store.remove("activeTabId").unwrap();

        let reopened = FileStore::open(path);
        assert!(reopened.get("activeTabId").is_none());
    }

    #[test]
    fn test_corrupted_file_yields_empty_store() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ invalid json }").unwrap();

        let store = FileStore::open(path);
        assert!(store.get("theme").is_none());
    }

    #[test]
    fn test_empty_file_yields_empty_store() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "   \n").unwrap();

        let store = FileStore::open(path);
        assert!(store.get("theme").is_none());
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);
        let mut store = FileStore::open(path.clone());
        store.set("theme", "dark").unwrap();
        assert!(!path.with_file_name(STORE_TEMP_NAME).exists());
    }

    #[test]
    fn test_in_memory_store_never_touches_disk() {
        let mut store = FileStore::in_memory();
        assert!(store.path().is_none());
        store.set("theme", "light").unwrap();
        assert_eq!(store.get("theme").as_deref(), Some("light"));
    }

    #[test]
    fn test_memory_store_write_failure() {
        let mut store = MemoryStore::new();
        store.fail_writes = true;
        assert!(store.set("theme", "dark").is_err());
        assert!(store.get("theme").is_none());
    }
}
