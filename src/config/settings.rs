//! Display settings and persisted session values for Marki Mark
//!
//! This module defines the value types that make up the persisted part of a
//! session (theme, recent files, open tab paths, active tab) and the zoom
//! level, each enforcing its own invariants.

use crate::config::SessionStore;
use crate::error::{Result, ResultExt};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

// ─────────────────────────────────────────────────────────────────────────────
// Session Store Keys
// ─────────────────────────────────────────────────────────────────────────────

/// Keys used in the session store.
pub mod keys {
    /// `"light"` or `"dark"`
    pub const THEME: &str = "theme";
    /// JSON array of up to ten paths, most recent first
    pub const RECENT_FILES: &str = "recentFiles";
    /// JSON array of open tab paths in open order
    pub const OPEN_TABS: &str = "openTabs";
    /// Path of the active tab, absent when no tab is active
    pub const ACTIVE_TAB_ID: &str = "activeTabId";
}

// ─────────────────────────────────────────────────────────────────────────────
// Theme Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Available color themes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    /// The value written to the session store.
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Get the display label for the theme.
    pub fn label(&self) -> &'static str {
        match self {
            Theme::Light => "Light Mode",
            Theme::Dark => "Dark Mode",
        }
    }

    /// Get the icon for the theme.
    pub fn icon(&self) -> &'static str {
        match self {
            Theme::Light => "☀",
            Theme::Dark => "🌙",
        }
    }

    /// Get all available themes in display order.
    pub fn all() -> &'static [Theme] {
        &[Theme::Light, Theme::Dark]
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme '{}'", other)),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Zoom Level
// ─────────────────────────────────────────────────────────────────────────────

/// Display scale factor, bounded to [0.5, 3.0] in steps of 0.1.
///
/// Stored as whole tenths so that repeated steps land on exact values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoomLevel {
    tenths: u8,
}

impl ZoomLevel {
    const MIN_TENTHS: u8 = 5;
    const MAX_TENTHS: u8 = 30;
    const DEFAULT_TENTHS: u8 = 10;

    /// Smallest zoom factor.
    #[cfg(test)]
    pub const MIN: f32 = 0.5;
    /// Largest zoom factor.
    #[cfg(test)]
    pub const MAX: f32 = 3.0;

    /// Increase by one step, saturating at the maximum.
    pub fn zoom_in(&mut self) {
        self.tenths = (self.tenths + 1).min(Self::MAX_TENTHS);
    }

    /// Decrease by one step, saturating at the minimum.
    pub fn zoom_out(&mut self) {
        self.tenths = self.tenths.saturating_sub(1).max(Self::MIN_TENTHS);
    }

    /// Return to exactly 1.0.
    pub fn reset(&mut self) {
        self.tenths = Self::DEFAULT_TENTHS;
    }

    /// The scale factor to hand to the renderer.
    pub fn factor(&self) -> f32 {
        f32::from(self.tenths) / 10.0
    }

    /// The zoom level as a whole percentage (100 at the default).
    pub fn percent(&self) -> u32 {
        u32::from(self.tenths) * 10
    }

    /// Whether the zoom is at its default.
    pub fn is_default(&self) -> bool {
        self.tenths == Self::DEFAULT_TENTHS
    }
}

impl Default for ZoomLevel {
    fn default() -> Self {
        Self {
            tenths: Self::DEFAULT_TENTHS,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Recent Files
// ─────────────────────────────────────────────────────────────────────────────

/// Recently opened files, most recent first, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecentFiles {
    paths: Vec<PathBuf>,
}

impl RecentFiles {
    /// Maximum number of recent files to remember.
    pub const MAX: usize = 10;

    /// Build from a persisted list, dropping duplicates and trimming to `MAX`.
    pub fn from_paths(paths: Vec<PathBuf>) -> Self {
        let mut paths = dedup_paths(paths);
        paths.truncate(Self::MAX);
        Self { paths }
    }

    /// Record a file as most recently used.
    ///
    /// If the file already exists in the list, it's moved to the front.
    /// The list is trimmed to `MAX`.
    pub fn record(&mut self, path: PathBuf) {
        // Remove if already exists
        self.paths.retain(|p| p != &path);
        // Add to front
        self.paths.insert(0, path);
        // Trim to max
        self.paths.truncate(Self::MAX);
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn first(&self) -> Option<&Path> {
        self.paths.first().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Serialize as the JSON array stored under `keys::RECENT_FILES`.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session Snapshot
// ─────────────────────────────────────────────────────────────────────────────

/// Everything a previous run left in the session store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub theme: Theme,
    pub recent_files: RecentFiles,
    /// Open tab paths in open order, already deduplicated
    pub open_tabs: Vec<PathBuf>,
    pub active_tab: Option<PathBuf>,
}

impl SessionSnapshot {
    /// Read the persisted session, falling back to defaults per key.
    ///
    /// Corrupt values are logged and replaced; loading never fails.
    pub fn load(store: &dyn SessionStore) -> Self {
        let theme = match store.get(keys::THEME) {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                debug!("Ignoring stored theme: {}", e);
                Theme::default()
            }),
            None => Theme::default(),
        };

        let recent_files = store
            .get(keys::RECENT_FILES)
            .map(|raw| parse_path_list(&raw))
            .transpose()
            .unwrap_or_warn_default(None, "Failed to parse recent files")
            .map(RecentFiles::from_paths)
            .unwrap_or_default();

        let open_tabs = store
            .get(keys::OPEN_TABS)
            .map(|raw| parse_path_list(&raw))
            .transpose()
            .unwrap_or_warn_default(None, "Failed to parse open tabs")
            .map(dedup_paths)
            .unwrap_or_default();

        let active_tab = store
            .get(keys::ACTIVE_TAB_ID)
            .filter(|raw| !raw.is_empty())
            .map(PathBuf::from);

        Self {
            theme,
            recent_files,
            open_tabs,
            active_tab,
        }
    }
}

/// Parse a JSON array of path strings.
pub fn parse_path_list(raw: &str) -> Result<Vec<PathBuf>> {
    Ok(serde_json::from_str(raw)?)
}

/// Drop repeated paths, keeping the first occurrence of each.
pub fn dedup_paths(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    paths
        .into_iter()
        .filter(|p| seen.insert(p.clone()))
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryStore;

    #[test]
    fn test_theme_default_is_dark() {
        assert_eq!(Theme::default(), Theme::Dark);
    }

    #[test]
    fn test_theme_parse() {
        assert_eq!("light".parse::<Theme>(), Ok(Theme::Light));
        assert_eq!("dark".parse::<Theme>(), Ok(Theme::Dark));
        assert!("system".parse::<Theme>().is_err());
        assert_eq!(Theme::Light.to_string(), "light");
    }

    #[test]
    fn test_theme_serde_matches_store_value() {
        for &theme in Theme::all() {
            let json = serde_json::to_string(&theme).unwrap();
            assert_eq!(json, format!("\"{}\"", theme.as_str()));
            assert_eq!(serde_json::from_str::<Theme>(&json).unwrap(), theme);
        }
    }

    #[test]
    fn test_zoom_ten_steps_is_exactly_two() {
        let mut zoom = ZoomLevel::default();
        assert_eq!(zoom.factor(), 1.0);
        for _ in 0..10 {
            zoom.zoom_in();
        }
        assert_eq!(zoom.factor(), 2.0);
        assert_eq!(zoom.percent(), 200);
    }

    #[test]
    fn test_zoom_saturates_at_bounds() {
        let mut zoom = ZoomLevel::default();
        for _ in 0..50 {
            zoom.zoom_in();
        }
        assert_eq!(zoom.factor(), ZoomLevel::MAX);

        for _ in 0..50 {
            zoom.zoom_out();
        }
        assert_eq!(zoom.factor(), ZoomLevel::MIN);
    }

    #[test]
    fn test_zoom_reset_from_anywhere() {
        let mut zoom = ZoomLevel::default();
        zoom.zoom_out();
        zoom.zoom_out();
        zoom.zoom_out();
        assert!(!zoom.is_default());
        zoom.reset();
        assert_eq!(zoom.factor(), 1.0);
        assert!(zoom.is_default());
    }

    #[test]
    fn test_record_recent_file() {
        let mut recent = RecentFiles::default();
        recent.record(PathBuf::from("/file1.md"));
        recent.record(PathBuf::from("/file2.md"));
        recent.record(PathBuf::from("/file3.md"));

        assert_eq!(recent.len(), 3);
        assert_eq!(recent.paths()[0], PathBuf::from("/file3.md"));
        assert_eq!(recent.paths()[2], PathBuf::from("/file1.md"));

        // Existing file moves to the front without growing the list
        recent.record(PathBuf::from("/file1.md"));
        assert_eq!(recent.first(), Some(Path::new("/file1.md")));
        assert_eq!(recent.len(), 3);
    }

    #[test]
    fn test_recent_files_capped_at_ten() {
        let mut recent = RecentFiles::default();
        for i in 0..15 {
            recent.record(PathBuf::from(format!("/doc{}.md", i)));
        }
        assert_eq!(recent.len(), RecentFiles::MAX);
        assert_eq!(recent.first(), Some(Path::new("/doc14.md")));
        assert!(!recent.paths().contains(&PathBuf::from("/doc4.md")));
    }

    #[test]
    fn test_recent_files_from_paths_sanitizes() {
        let mut paths: Vec<PathBuf> = (0..12)
            .map(|i| PathBuf::from(format!("/doc{}.md", i)))
            .collect();
        paths.insert(1, PathBuf::from("/doc0.md"));
        let recent = RecentFiles::from_paths(paths);
        assert_eq!(recent.len(), 10);
        assert_eq!(recent.paths()[1], PathBuf::from("/doc1.md"));
    }

    #[test]
    fn test_recent_files_json_shape() {
        let mut recent = RecentFiles::default();
        recent.record(PathBuf::from("/a.md"));
        recent.record(PathBuf::from("/b.md"));
        assert_eq!(recent.to_json().unwrap(), r#"["/b.md","/a.md"]"#);
    }

    #[test]
    fn test_dedup_paths_keeps_first_occurrence() {
        let paths = vec![
            PathBuf::from("/a.md"),
            PathBuf::from("/b.md"),
            PathBuf::from("/a.md"),
            PathBuf::from("/c.md"),
            PathBuf::from("/b.md"),
        ];
        assert_eq!(
            dedup_paths(paths),
            vec![
                PathBuf::from("/a.md"),
                PathBuf::from("/b.md"),
                PathBuf::from("/c.md")
            ]
        );
    }

    #[test]
    fn test_snapshot_defaults_for_empty_store() {
        let store = MemoryStore::new();
        let snapshot = SessionSnapshot::load(&store);
        assert_eq!(snapshot, SessionSnapshot::default());
        assert_eq!(snapshot.theme, Theme::Dark);
    }

    #[test]
    fn test_snapshot_reads_all_keys() {
        let store = MemoryStore::with_entries(&[
            (keys::THEME, "light"),
            (keys::RECENT_FILES, r#"["/b.md","/a.md"]"#),
            (keys::OPEN_TABS, r#"["/a.md","/b.md","/a.md"]"#),
            (keys::ACTIVE_TAB_ID, "/b.md"),
        ]);
        let snapshot = SessionSnapshot::load(&store);

        assert_eq!(snapshot.theme, Theme::Light);
        assert_eq!(snapshot.recent_files.first(), Some(Path::new("/b.md")));
        assert_eq!(
            snapshot.open_tabs,
            vec![PathBuf::from("/a.md"), PathBuf::from("/b.md")]
        );
        assert_eq!(snapshot.active_tab, Some(PathBuf::from("/b.md")));
    }

    #[test]
    fn test_snapshot_corrupt_values_fall_back() {
        let store = MemoryStore::with_entries(&[
            (keys::THEME, "purple"),
            (keys::RECENT_FILES, "{not json"),
            (keys::OPEN_TABS, r#"{"a": 1}"#),
            (keys::ACTIVE_TAB_ID, ""),
        ]);
        let snapshot = SessionSnapshot::load(&store);

        assert_eq!(snapshot.theme, Theme::Dark);
        assert!(snapshot.recent_files.is_empty());
        assert!(snapshot.open_tabs.is_empty());
        assert!(snapshot.active_tab.is_none());
    }
}
