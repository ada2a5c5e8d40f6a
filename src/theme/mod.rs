//! Theme System for Marki Mark
//!
//! This module defines the light and dark color palettes and converts them
//! into egui `Visuals`. The `Theme` enum in `config::settings` selects which
//! palette is active; `ThemeManager` applies it to the egui context.
//!
//! # Usage
//!
//! ```ignore
//! use crate::theme::ThemeColors;
//! use crate::config::Theme;
//!
//! let colors = ThemeColors::from_theme(Theme::Dark);
//! ui.label(RichText::new("Hello").color(colors.text.primary));
//! ctx.set_visuals(colors.to_visuals());
//! ```

mod manager;

pub use manager::ThemeManager;

use crate::config::Theme;
use eframe::egui::{self, Color32, Rounding, Stroke, Visuals};

/// Corner radius for widgets.
const WIDGET_ROUNDING: f32 = 4.0;

/// Corner radius for windows and dialogs.
const WINDOW_ROUNDING: f32 = 8.0;

// ─────────────────────────────────────────────────────────────────────────────
// Theme Colors
// ─────────────────────────────────────────────────────────────────────────────

/// All colors used by the application chrome and the document viewer.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeColors {
    /// Base UI colors (backgrounds, borders)
    pub base: BaseColors,
    /// Text colors for various contexts
    pub text: TextColors,
    /// Colors for rendered markdown
    pub document: DocumentColors,
    /// UI feedback colors (accent, error)
    pub ui: UiColors,
}

impl ThemeColors {
    /// Palette for a theme.
    pub fn from_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self::dark(),
            Theme::Light => Self::light(),
        }
    }

    pub fn light() -> Self {
        Self {
            base: BaseColors::light(),
            text: TextColors::light(),
            document: DocumentColors::light(),
            ui: UiColors::light(),
        }
    }

    pub fn dark() -> Self {
        Self {
            base: BaseColors::dark(),
            text: TextColors::dark(),
            document: DocumentColors::dark(),
            ui: UiColors::dark(),
        }
    }

    /// Dark themes have darker backgrounds.
    pub fn is_dark(&self) -> bool {
        self.base.background.r() < 128
    }

    /// Convert the palette into egui Visuals.
    pub fn to_visuals(&self) -> Visuals {
        let mut visuals = if self.is_dark() {
            Visuals::dark()
        } else {
            Visuals::light()
        };

        // Window & panel background
        visuals.panel_fill = self.base.background;
        visuals.window_fill = self.base.background;
        visuals.extreme_bg_color = self.base.background_tertiary;
        visuals.faint_bg_color = self.base.background_secondary;
        visuals.code_bg_color = self.document.code_block_bg;

        // Text
        visuals.override_text_color = None;
        visuals.error_fg_color = self.ui.error;
        visuals.hyperlink_color = self.text.link;

        // Selection
        visuals.selection.bg_fill = self.base.selected;
        visuals.selection.stroke = Stroke::new(1.0, self.ui.accent);

        // Widgets
        let rounding = Rounding::same(WIDGET_ROUNDING);
        let widgets = &mut visuals.widgets;

        widgets.noninteractive.bg_fill = self.base.background_secondary;
        widgets.noninteractive.weak_bg_fill = self.base.background_tertiary;
        widgets.noninteractive.bg_stroke = Stroke::new(1.0, self.base.border_subtle);
        widgets.noninteractive.fg_stroke = Stroke::new(1.0, self.text.primary);
        widgets.noninteractive.rounding = rounding;

        widgets.inactive.bg_fill = self.base.background_secondary;
        widgets.inactive.weak_bg_fill = self.base.background_tertiary;
        widgets.inactive.bg_stroke = Stroke::new(1.0, self.base.border);
        widgets.inactive.fg_stroke = Stroke::new(1.0, self.text.secondary);
        widgets.inactive.rounding = rounding;

        widgets.hovered.bg_fill = self.base.hover;
        widgets.hovered.weak_bg_fill = self.base.hover;
        widgets.hovered.bg_stroke = Stroke::new(1.0, self.ui.accent);
        widgets.hovered.fg_stroke = Stroke::new(1.5, self.text.primary);
        widgets.hovered.rounding = rounding;

        widgets.active.bg_fill = self.ui.accent;
        widgets.active.weak_bg_fill = self.base.selected;
        widgets.active.bg_stroke = Stroke::new(1.0, self.ui.accent);
        widgets.active.fg_stroke = Stroke::new(2.0, Color32::WHITE);
        widgets.active.rounding = rounding;

        widgets.open.bg_fill = self.base.selected;
        widgets.open.weak_bg_fill = self.base.selected;
        widgets.open.bg_stroke = Stroke::new(1.0, self.ui.accent);
        widgets.open.fg_stroke = Stroke::new(1.0, self.text.primary);
        widgets.open.rounding = rounding;

        // Windows & popups
        let shadow = egui::epaint::Shadow {
            offset: egui::vec2(0.0, 4.0),
            blur: 16.0,
            spread: 0.0,
            color: Color32::from_black_alpha(if self.is_dark() { 80 } else { 30 }),
        };
        visuals.window_rounding = Rounding::same(WINDOW_ROUNDING);
        visuals.window_shadow = shadow;
        visuals.popup_shadow = shadow;
        visuals.window_stroke = Stroke::new(1.0, self.base.border);

        visuals
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Base Colors
// ─────────────────────────────────────────────────────────────────────────────

/// Base UI colors for backgrounds and borders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseColors {
    /// Primary background color
    pub background: Color32,
    /// Elevated background (panels, tab bar)
    pub background_secondary: Color32,
    /// Inputs and code blocks
    pub background_tertiary: Color32,
    pub border: Color32,
    /// Dividers
    pub border_subtle: Color32,
    pub hover: Color32,
    /// Selected/active state background
    pub selected: Color32,
}

impl BaseColors {
    pub fn light() -> Self {
        Self {
            background: Color32::from_rgb(255, 255, 255),
            background_secondary: Color32::from_rgb(245, 245, 245),
            background_tertiary: Color32::from_rgb(238, 238, 238),
            border: Color32::from_rgb(212, 212, 212),
            border_subtle: Color32::from_rgb(229, 229, 229),
            hover: Color32::from_rgb(229, 229, 229),
            selected: Color32::from_rgb(219, 234, 254),
        }
    }

    pub fn dark() -> Self {
        Self {
            background: Color32::from_rgb(23, 23, 23),
            background_secondary: Color32::from_rgb(32, 32, 32),
            background_tertiary: Color32::from_rgb(38, 38, 38),
            border: Color32::from_rgb(64, 64, 64),
            border_subtle: Color32::from_rgb(45, 45, 45),
            hover: Color32::from_rgb(48, 48, 48),
            selected: Color32::from_rgb(30, 58, 95),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Text Colors
// ─────────────────────────────────────────────────────────────────────────────

/// Text colors for various contexts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextColors {
    /// Main content
    pub primary: Color32,
    /// Labels and descriptions
    pub secondary: Color32,
    /// Hints, the header path, the editor hint line
    pub muted: Color32,
    pub link: Color32,
    /// Inline code
    pub code: Color32,
}

impl TextColors {
    pub fn light() -> Self {
        Self {
            primary: Color32::from_rgb(38, 38, 38),
            secondary: Color32::from_rgb(82, 82, 82),
            muted: Color32::from_rgb(163, 163, 163),
            link: Color32::from_rgb(37, 99, 235),
            code: Color32::from_rgb(190, 24, 93),
        }
    }

    pub fn dark() -> Self {
        Self {
            primary: Color32::from_rgb(229, 229, 229),
            secondary: Color32::from_rgb(163, 163, 163),
            muted: Color32::from_rgb(115, 115, 115),
            link: Color32::from_rgb(96, 165, 250),
            code: Color32::from_rgb(244, 114, 182),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Document Colors
// ─────────────────────────────────────────────────────────────────────────────

/// Colors for rendered markdown elements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentColors {
    pub heading: Color32,
    pub blockquote_border: Color32,
    pub blockquote_text: Color32,
    pub code_block_bg: Color32,
    pub code_block_border: Color32,
    pub horizontal_rule: Color32,
    /// Bullets and numbers
    pub list_marker: Color32,
    pub table_border: Color32,
    pub table_header_bg: Color32,
    /// Placeholder frame for images that cannot be shown
    pub image_placeholder: Color32,
}

impl DocumentColors {
    pub fn light() -> Self {
        Self {
            heading: Color32::from_rgb(23, 23, 23),
            blockquote_border: Color32::from_rgb(212, 212, 212),
            blockquote_text: Color32::from_rgb(82, 82, 82),
            code_block_bg: Color32::from_rgb(245, 245, 245),
            code_block_border: Color32::from_rgb(229, 229, 229),
            horizontal_rule: Color32::from_rgb(229, 229, 229),
            list_marker: Color32::from_rgb(115, 115, 115),
            table_border: Color32::from_rgb(212, 212, 212),
            table_header_bg: Color32::from_rgb(245, 245, 245),
            image_placeholder: Color32::from_rgb(229, 229, 229),
        }
    }

    pub fn dark() -> Self {
        Self {
            heading: Color32::from_rgb(250, 250, 250),
            blockquote_border: Color32::from_rgb(64, 64, 64),
            blockquote_text: Color32::from_rgb(163, 163, 163),
            code_block_bg: Color32::from_rgb(20, 20, 20),
            code_block_border: Color32::from_rgb(50, 50, 50),
            horizontal_rule: Color32::from_rgb(64, 64, 64),
            list_marker: Color32::from_rgb(140, 140, 140),
            table_border: Color32::from_rgb(64, 64, 64),
            table_header_bg: Color32::from_rgb(38, 38, 38),
            image_placeholder: Color32::from_rgb(45, 45, 45),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// UI Colors
// ─────────────────────────────────────────────────────────────────────────────

/// Colors for feedback and interactive elements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UiColors {
    /// Buttons, the active tab, selected theme card
    pub accent: Color32,
    pub success: Color32,
    pub error: Color32,
}

impl UiColors {
    pub fn light() -> Self {
        Self {
            accent: Color32::from_rgb(37, 99, 235),
            success: Color32::from_rgb(22, 163, 74),
            error: Color32::from_rgb(220, 38, 38),
        }
    }

    pub fn dark() -> Self {
        Self {
            accent: Color32::from_rgb(59, 130, 246),
            success: Color32::from_rgb(74, 222, 128),
            error: Color32::from_rgb(248, 113, 113),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_theme_selects_palette() {
        assert_eq!(ThemeColors::from_theme(Theme::Dark), ThemeColors::dark());
        assert_eq!(ThemeColors::from_theme(Theme::Light), ThemeColors::light());
    }

    #[test]
    fn test_is_dark() {
        assert!(ThemeColors::dark().is_dark());
        assert!(!ThemeColors::light().is_dark());
    }

    #[test]
    fn test_visuals_follow_palette() {
        let dark = ThemeColors::dark();
        let visuals = dark.to_visuals();
        assert!(visuals.dark_mode);
        assert_eq!(visuals.panel_fill, dark.base.background);
        assert_eq!(visuals.hyperlink_color, dark.text.link);

        let light = ThemeColors::light().to_visuals();
        assert!(!light.dark_mode);
    }

    #[test]
    fn test_text_contrast() {
        for colors in [ThemeColors::light(), ThemeColors::dark()] {
            let bg = colors.base.background.r() as i32;
            let fg = colors.text.primary.r() as i32;
            assert!((bg - fg).abs() > 150, "primary text must contrast with background");
        }
    }
}
