//! Code block syntax highlighting with syntect
//!
//! Loading syntect's syntax and theme sets is expensive, so a single
//! `SyntaxHighlighter` is created lazily and shared by every viewer frame.

use crate::config::Theme;
use eframe::egui::{Color32, FontId, RichText};
use log::{debug, warn};
use std::sync::OnceLock;
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Style, Theme as SyntectTheme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

/// syntect theme used with the dark UI theme
pub const DARK_CODE_THEME: &str = "base16-ocean.dark";

/// syntect theme used with the light UI theme
pub const LIGHT_CODE_THEME: &str = "InspiredGitHub";

// ─────────────────────────────────────────────────────────────────────────────
// Highlighted Text
// ─────────────────────────────────────────────────────────────────────────────

/// A run of code sharing one style.
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightedSegment {
    pub text: String,
    pub foreground: Color32,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl HighlightedSegment {
    /// An unstyled segment.
    pub fn plain(text: &str, foreground: Color32) -> Self {
        Self {
            text: text.to_string(),
            foreground,
            bold: false,
            italic: false,
            underline: false,
        }
    }

    fn from_style(style: Style, text: &str) -> Self {
        Self {
            text: text.to_string(),
            foreground: to_color32(style.foreground),
            bold: style.font_style.contains(FontStyle::BOLD),
            italic: style.font_style.contains(FontStyle::ITALIC),
            underline: style.font_style.contains(FontStyle::UNDERLINE),
        }
    }

    /// Convert to monospace egui text at `font_size`.
    pub fn to_rich_text(&self, font_size: f32) -> RichText {
        let mut text = RichText::new(&self.text)
            .color(self.foreground)
            .font(FontId::monospace(font_size));
        if self.bold {
            text = text.strong();
        }
        if self.italic {
            text = text.italics();
        }
        if self.underline {
            text = text.underline();
        }
        text
    }
}

/// One source line as styled segments.
pub type HighlightedLine = Vec<HighlightedSegment>;

/// Convert syntect Color to egui Color32.
pub fn to_color32(color: syntect::highlighting::Color) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

// ─────────────────────────────────────────────────────────────────────────────
// Syntax Highlighter
// ─────────────────────────────────────────────────────────────────────────────

/// Cached syntect syntax and theme sets.
pub struct SyntaxHighlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl Default for SyntaxHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxHighlighter {
    pub fn new() -> Self {
        let syntax_set = SyntaxSet::load_defaults_newlines();
        let theme_set = ThemeSet::load_defaults();
        debug!(
            "Loaded {} syntaxes and {} code themes",
            syntax_set.syntaxes().len(),
            theme_set.themes.len()
        );
        Self {
            syntax_set,
            theme_set,
        }
    }

    /// The syntect theme paired with a UI theme.
    pub fn code_theme(&self, theme: Theme) -> Option<&SyntectTheme> {
        let name = match theme {
            Theme::Dark => DARK_CODE_THEME,
            Theme::Light => LIGHT_CODE_THEME,
        };
        self.theme_set.themes.get(name)
    }

    /// Background color of the code theme, if it defines one.
    pub fn background(&self, theme: Theme) -> Option<Color32> {
        self.code_theme(theme)?.settings.background.map(to_color32)
    }

    /// Highlight `code` written in `language` for the given UI theme.
    ///
    /// Unknown languages and missing themes produce plain lines.
    pub fn highlight(&self, code: &str, language: &str, theme: Theme) -> Vec<HighlightedLine> {
        let fallback = match theme {
            Theme::Dark => Color32::LIGHT_GRAY,
            Theme::Light => Color32::DARK_GRAY,
        };

        let Some(code_theme) = self.code_theme(theme) else {
            warn!("Code theme for {} is missing", theme);
            return plain_lines(code, fallback);
        };
        let plain = code_theme
            .settings
            .foreground
            .map(to_color32)
            .unwrap_or(fallback);

        let Some(syntax) = self.find_syntax(language) else {
            debug!("No syntax found for language: {:?}", language);
            return plain_lines(code, plain);
        };

        let mut highlighter = HighlightLines::new(syntax, code_theme);
        LinesWithEndings::from(code)
            .map(|line| match highlighter.highlight_line(line, &self.syntax_set) {
                Ok(ranges) => ranges
                    .into_iter()
                    .map(|(style, text)| HighlightedSegment::from_style(style, text))
                    .collect(),
                Err(e) => {
                    warn!("Failed to highlight line: {}", e);
                    vec![HighlightedSegment::plain(line, plain)]
                }
            })
            .collect()
    }

    /// Find a syntax by fence language: common aliases, then extension,
    /// then case-insensitive name.
    fn find_syntax(&self, language: &str) -> Option<&SyntaxReference> {
        if language.is_empty() {
            return None;
        }
        let lower = language.to_lowercase();
        let extension = match lower.as_str() {
            "rust" => "rs",
            "python" => "py",
            "javascript" => "js",
            "typescript" => "ts",
            "c++" | "cxx" => "cpp",
            "csharp" | "c#" => "cs",
            "golang" => "go",
            "ruby" => "rb",
            "shell" | "bash" | "zsh" => "sh",
            "markdown" => "md",
            "yml" => "yaml",
            "htm" => "html",
            other => other,
        };

        self.syntax_set
            .find_syntax_by_extension(extension)
            .or_else(|| self.syntax_set.find_syntax_by_name(language))
            .or_else(|| {
                self.syntax_set
                    .syntaxes()
                    .iter()
                    .find(|syntax| syntax.name.to_lowercase() == lower)
            })
    }
}

fn plain_lines(code: &str, color: Color32) -> Vec<HighlightedLine> {
    code.lines()
        .map(|line| vec![HighlightedSegment::plain(line, color)])
        .collect()
}

static HIGHLIGHTER: OnceLock<SyntaxHighlighter> = OnceLock::new();

/// The shared highlighter, created on first use.
pub fn highlighter() -> &'static SyntaxHighlighter {
    HIGHLIGHTER.get_or_init(SyntaxHighlighter::new)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_themes_exist_for_both_modes() {
        let highlighter = highlighter();
        assert!(highlighter.code_theme(Theme::Dark).is_some());
        assert!(highlighter.code_theme(Theme::Light).is_some());
        assert!(highlighter.background(Theme::Dark).is_some());
    }

    #[test]
    fn test_highlight_rust_code() {
        let code = "fn main() {\n    println!(\"Hello\");\n}";
        let lines = highlighter().highlight(code, "rust", Theme::Dark);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].len() > 1, "keywords should be split into segments");
    }

    #[test]
    fn test_unknown_language_is_plain() {
        let lines = highlighter().highlight("some random text", "unknownlang123", Theme::Light);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].len(), 1);
        assert_eq!(lines[0][0].text, "some random text");
    }

    #[test]
    fn test_empty_code() {
        assert!(highlighter().highlight("", "rust", Theme::Dark).is_empty());
    }

    #[test]
    fn test_language_aliases() {
        let highlighter = highlighter();
        for (alias, canonical) in [("rs", "rust"), ("py", "python"), ("sh", "bash")] {
            let a = highlighter.find_syntax(alias).map(|s| &s.name);
            let b = highlighter.find_syntax(canonical).map(|s| &s.name);
            assert!(a.is_some());
            assert_eq!(a, b, "{} and {} should match", alias, canonical);
        }
    }

    #[test]
    fn test_to_color32() {
        let color = to_color32(syntect::highlighting::Color {
            r: 255,
            g: 128,
            b: 64,
            a: 255,
        });
        assert_eq!(color, Color32::from_rgb(255, 128, 64));
    }

    #[test]
    fn test_shared_highlighter_is_reused() {
        assert!(std::ptr::eq(highlighter(), highlighter()));
    }
}
