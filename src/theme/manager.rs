//! Theme Manager for Marki Mark
//!
//! Tracks the active theme and applies it to the egui context only when it
//! changes.

use eframe::egui::{Context, Visuals};
use log::{debug, info};

use super::ThemeColors;
use crate::config::Theme;

/// Applies the selected theme to the egui context.
#[derive(Debug, Clone)]
pub struct ThemeManager {
    current_theme: Theme,
    /// Cached visuals for the current theme
    cached_visuals: Option<Visuals>,
    needs_apply: bool,
}

impl ThemeManager {
    pub fn new(theme: Theme) -> Self {
        info!("ThemeManager initialized with theme: {}", theme);
        Self {
            current_theme: theme,
            cached_visuals: None,
            needs_apply: true,
        }
    }

    pub fn current_theme(&self) -> Theme {
        self.current_theme
    }

    /// Set the theme and mark it for reapplication.
    ///
    /// This doesn't apply the theme immediately; call `apply_if_needed()`.
    pub fn set_theme(&mut self, theme: Theme) {
        if self.current_theme != theme {
            info!("Theme changed from {} to {}", self.current_theme, theme);
            self.current_theme = theme;
            self.cached_visuals = None;
            self.needs_apply = true;
        }
    }

    #[cfg(test)]
    pub fn needs_apply(&self) -> bool {
        self.needs_apply
    }

    /// Apply the theme if it changed since the last call.
    ///
    /// Returns `true` if the theme was applied.
    pub fn apply_if_needed(&mut self, ctx: &Context) -> bool {
        if !self.needs_apply {
            return false;
        }
        ctx.set_visuals(self.visuals());
        self.needs_apply = false;
        debug!("Applied theme: {}", self.current_theme);
        true
    }

    /// Visuals for the current theme, built once per theme change.
    pub fn visuals(&mut self) -> Visuals {
        self.cached_visuals
            .get_or_insert_with(|| ThemeColors::from_theme(self.current_theme).to_visuals())
            .clone()
    }

    /// Palette for the current theme.
    pub fn colors(&self) -> ThemeColors {
        ThemeColors::from_theme(self.current_theme)
    }
}

impl Default for ThemeManager {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_needs_apply() {
        let manager = ThemeManager::new(Theme::Light);
        assert_eq!(manager.current_theme(), Theme::Light);
        assert!(manager.needs_apply());
    }

    #[test]
    fn test_apply_if_needed_only_once() {
        let ctx = Context::default();
        let mut manager = ThemeManager::new(Theme::Dark);
        assert!(manager.apply_if_needed(&ctx));
        assert!(!manager.apply_if_needed(&ctx));
        assert!(ctx.style().visuals.dark_mode);

        manager.set_theme(Theme::Light);
        assert!(manager.apply_if_needed(&ctx));
        assert!(!ctx.style().visuals.dark_mode);
    }

    #[test]
    fn test_set_same_theme_is_noop() {
        let ctx = Context::default();
        let mut manager = ThemeManager::new(Theme::Dark);
        manager.apply_if_needed(&ctx);
        manager.set_theme(Theme::Dark);
        assert!(!manager.needs_apply());
    }

    #[test]
    fn test_visuals_match_theme() {
        let mut manager = ThemeManager::new(Theme::Light);
        assert!(!manager.visuals().dark_mode);
        manager.set_theme(Theme::Dark);
        assert!(manager.visuals().dark_mode);
        assert_eq!(manager.colors(), ThemeColors::dark());
    }
}
