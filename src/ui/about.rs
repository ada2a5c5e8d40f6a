//! About/Help Panel Component for Marki Mark
//!
//! This module implements a modal About/Help panel that displays:
//! - Application name, version and description
//! - The keyboard shortcut reference

use super::shortcut_label;
use crate::state::APP_TITLE;
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

/// One-line description shown under the version.
pub const APP_DESCRIPTION: &str = "A fast, modern, and cross-platform Markdown viewer and editor";

/// Keyboard shortcut category for organized display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutCategory {
    File,
    Edit,
    View,
}

impl ShortcutCategory {
    pub fn all() -> &'static [ShortcutCategory] {
        &[
            ShortcutCategory::File,
            ShortcutCategory::Edit,
            ShortcutCategory::View,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            ShortcutCategory::File => "File",
            ShortcutCategory::Edit => "Edit",
            ShortcutCategory::View => "View",
        }
    }
}

/// A keyboard shortcut entry.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Shortcut {
    keys: String,
    action: &'static str,
}

impl Shortcut {
    fn command(key: &str, action: &'static str) -> Self {
        Self {
            keys: shortcut_label(key),
            action,
        }
    }
}

fn get_shortcuts(category: ShortcutCategory) -> Vec<Shortcut> {
    match category {
        ShortcutCategory::File => vec![
            Shortcut::command("O", "Open File"),
            Shortcut::command("P", "Print"),
        ],
        ShortcutCategory::Edit => vec![
            Shortcut::command("E", "Toggle Edit Mode"),
            Shortcut::command("S", "Save (while editing)"),
            Shortcut {
                keys: "Esc".to_string(),
                action: "Cancel Editing",
            },
        ],
        ShortcutCategory::View => vec![
            Shortcut::command("+", "Zoom In"),
            Shortcut::command("-", "Zoom Out"),
            Shortcut::command("0", "Reset Zoom"),
        ],
    }
}

/// About panel sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AboutSection {
    #[default]
    About,
    Shortcuts,
}

impl AboutSection {
    pub fn label(&self) -> &'static str {
        match self {
            AboutSection::About => "About",
            AboutSection::Shortcuts => "Shortcuts",
        }
    }
}

/// Result of showing the about panel.
#[derive(Debug, Clone, Default)]
pub struct AboutPanelOutput {
    /// Whether the panel should be closed.
    pub close_requested: bool,
}

/// About/Help panel state and rendering.
#[derive(Debug, Clone, Default)]
pub struct AboutPanel {
    active_section: AboutSection,
}

impl AboutPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the about panel as a modal window.
    pub fn show(&mut self, ctx: &egui::Context, is_dark: bool) -> AboutPanelOutput {
        let mut output = AboutPanelOutput::default();

        let screen_rect = ctx.screen_rect();
        let overlay_color = if is_dark {
            Color32::from_rgba_unmultiplied(0, 0, 0, 180)
        } else {
            Color32::from_rgba_unmultiplied(0, 0, 0, 120)
        };

        egui::Area::new(egui::Id::new("about_overlay"))
            .order(egui::Order::Middle)
            .fixed_pos(screen_rect.min)
            .show(ctx, |ui| {
                let response = ui.allocate_response(screen_rect.size(), egui::Sense::click());
                ui.painter().rect_filled(screen_rect, 0.0, overlay_color);
                if response.clicked() {
                    output.close_requested = true;
                }
            });

        egui::Window::new(format!("About {}", APP_TITLE))
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .min_width(420.0)
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                    output.close_requested = true;
                }

                ui.horizontal(|ui| {
                    for section in [AboutSection::About, AboutSection::Shortcuts] {
                        ui.selectable_value(&mut self.active_section, section, section.label());
                    }
                });
                ui.separator();

                ui.vertical(|ui| {
                    ui.set_min_height(220.0);
                    match self.active_section {
                        AboutSection::About => show_about_section(ui),
                        AboutSection::Shortcuts => show_shortcuts_section(ui, is_dark),
                    }
                });

                ui.separator();
                ui.horizontal(|ui| {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("Close").clicked() {
                            output.close_requested = true;
                        }
                    });
                });
            });

        output
    }
}

fn show_about_section(ui: &mut Ui) {
    ui.vertical_centered(|ui| {
        ui.add_space(16.0);
        ui.heading(RichText::new(APP_TITLE).size(24.0).strong());
        ui.add_space(4.0);
        ui.label(
            RichText::new(format!("Version {}", env!("CARGO_PKG_VERSION")))
                .size(14.0)
                .weak(),
        );
        ui.add_space(12.0);
        ui.label(APP_DESCRIPTION);
        ui.add_space(16.0);
    });
}

fn show_shortcuts_section(ui: &mut Ui, is_dark: bool) {
    let key_bg = if is_dark {
        Color32::from_rgb(60, 60, 70)
    } else {
        Color32::from_rgb(230, 230, 235)
    };
    let key_color = if is_dark {
        Color32::from_rgb(255, 200, 100)
    } else {
        Color32::from_rgb(150, 80, 0)
    };

    ScrollArea::vertical().show(ui, |ui| {
        for category in ShortcutCategory::all() {
            ui.label(RichText::new(category.label()).strong().size(14.0));
            ui.indent(category.label(), |ui| {
                egui::Grid::new(format!("shortcuts_{:?}", category))
                    .num_columns(2)
                    .spacing([16.0, 4.0])
                    .min_col_width(90.0)
                    .show(ui, |ui| {
                        for shortcut in get_shortcuts(*category) {
                            egui::Frame::none()
                                .fill(key_bg)
                                .rounding(3.0)
                                .inner_margin(egui::Margin::symmetric(6.0, 2.0))
                                .show(ui, |ui| {
                                    ui.label(
                                        RichText::new(&shortcut.keys)
                                            .color(key_color)
                                            .family(egui::FontFamily::Monospace)
                                            .size(12.0),
                                    );
                                });
                            ui.label(shortcut.action);
                            ui.end_row();
                        }
                    });
            });
            ui.add_space(6.0);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_about_panel_default() {
        let panel = AboutPanel::new();
        assert_eq!(panel.active_section, AboutSection::About);
    }

    #[test]
    fn test_shortcut_categories() {
        let categories = ShortcutCategory::all();
        assert_eq!(categories.len(), 3);
        assert_eq!(categories[0].label(), "File");
    }

    #[test]
    fn test_every_shortcut_is_listed() {
        let actions: Vec<&str> = ShortcutCategory::all()
            .iter()
            .flat_map(|c| get_shortcuts(*c))
            .map(|s| s.action)
            .collect();
        for expected in [
            "Open File",
            "Print",
            "Toggle Edit Mode",
            "Save (while editing)",
            "Cancel Editing",
            "Zoom In",
            "Zoom Out",
            "Reset Zoom",
        ] {
            assert!(actions.contains(&expected), "missing {}", expected);
        }
    }

    #[test]
    fn test_command_shortcut_uses_platform_modifier() {
        let open = &get_shortcuts(ShortcutCategory::File)[0];
        assert_eq!(open.keys, shortcut_label("O"));
        assert!(open.keys.ends_with("+O"));
    }
}
