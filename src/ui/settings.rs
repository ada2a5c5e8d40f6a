//! Settings Panel Component for Marki Mark
//!
//! A modal dialog for appearance settings. Changes apply immediately and
//! are persisted by the app.

use crate::config::Theme;
use crate::theme::ThemeColors;
use eframe::egui::{self, Color32, RichText, Sense, Stroke, Ui, Vec2};

/// Settings panel sections for navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettingsSection {
    #[default]
    Appearance,
}

impl SettingsSection {
    pub fn label(&self) -> &'static str {
        match self {
            SettingsSection::Appearance => "Appearance",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            SettingsSection::Appearance => "🎨",
        }
    }
}

/// Result of showing the settings panel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsPanelOutput {
    /// Theme the user picked this frame, if it differs from the current one
    pub theme: Option<Theme>,
    /// Whether the panel should be closed.
    pub close_requested: bool,
}

/// Settings panel state and rendering.
#[derive(Debug, Clone, Default)]
pub struct SettingsPanel {
    active_section: SettingsSection,
}

impl SettingsPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the settings panel as a modal window.
    pub fn show(&mut self, ctx: &egui::Context, current: Theme) -> SettingsPanelOutput {
        let mut output = SettingsPanelOutput::default();
        let colors = ThemeColors::from_theme(current);

        // Semi-transparent overlay
        let screen_rect = ctx.screen_rect();
        let overlay_color = if colors.is_dark() {
            Color32::from_rgba_unmultiplied(0, 0, 0, 180)
        } else {
            Color32::from_rgba_unmultiplied(0, 0, 0, 120)
        };

        egui::Area::new(egui::Id::new("settings_overlay"))
            .order(egui::Order::Middle)
            .fixed_pos(screen_rect.min)
            .show(ctx, |ui| {
                let response = ui.allocate_response(screen_rect.size(), Sense::click());
                ui.painter().rect_filled(screen_rect, 0.0, overlay_color);

                // Close on click outside
                if response.clicked() {
                    output.close_requested = true;
                }
            });

        egui::Window::new("⚙ Settings")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .min_width(460.0)
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                    output.close_requested = true;
                }

                ui.horizontal(|ui| {
                    ui.vertical(|ui| {
                        ui.set_min_width(120.0);
                        let section = SettingsSection::Appearance;
                        let text = format!("{} {}", section.icon(), section.label());
                        if ui
                            .add_sized(
                                [110.0, 32.0],
                                egui::SelectableLabel::new(
                                    self.active_section == section,
                                    RichText::new(text).size(14.0),
                                ),
                            )
                            .clicked()
                        {
                            self.active_section = section;
                        }
                    });

                    ui.separator();

                    ui.vertical(|ui| {
                        ui.set_min_width(300.0);
                        match self.active_section {
                            SettingsSection::Appearance => {
                                output.theme = show_appearance_section(ui, current, &colors);
                            }
                        }
                    });
                });

                ui.separator();

                ui.horizontal(|ui| {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("Close").clicked() {
                            output.close_requested = true;
                        }
                        ui.label(
                            RichText::new("Settings are saved automatically")
                                .small()
                                .weak(),
                        );
                    });
                });
            });

        output
    }
}

/// Theme cards. Returns the theme clicked, if it isn't the current one.
fn show_appearance_section(ui: &mut Ui, current: Theme, colors: &ThemeColors) -> Option<Theme> {
    let mut picked = None;

    ui.heading("Appearance");
    ui.add_space(8.0);
    ui.label(RichText::new("Theme").strong());
    ui.add_space(4.0);

    ui.horizontal(|ui| {
        for &theme in Theme::all() {
            if theme_card(ui, theme, theme == current, colors).clicked() && theme != current {
                picked = Some(theme);
            }
        }
    });

    picked
}

/// A clickable preview card showing the theme's background and text.
fn theme_card(ui: &mut Ui, theme: Theme, selected: bool, colors: &ThemeColors) -> egui::Response {
    let preview = ThemeColors::from_theme(theme);
    let (rect, response) = ui.allocate_exact_size(Vec2::new(130.0, 84.0), Sense::click());

    let border = if selected {
        Stroke::new(2.0, colors.ui.accent)
    } else if response.hovered() {
        Stroke::new(1.0, colors.base.border)
    } else {
        Stroke::new(1.0, colors.base.border_subtle)
    };

    let painter = ui.painter();
    painter.rect(rect, 6.0, preview.base.background, border);

    // Mock document lines
    let line = |y: f32, width: f32, color: Color32| {
        painter.rect_filled(
            egui::Rect::from_min_size(rect.min + Vec2::new(12.0, y), Vec2::new(width, 5.0)),
            2.0,
            color,
        );
    };
    line(14.0, 60.0, preview.document.heading);
    line(26.0, 100.0, preview.text.secondary);
    line(36.0, 84.0, preview.text.secondary);

    painter.text(
        egui::pos2(rect.center().x, rect.bottom() - 16.0),
        egui::Align2::CENTER_CENTER,
        format!("{} {}", theme.icon(), theme.label()),
        egui::FontId::proportional(13.0),
        preview.text.primary,
    );

    response.on_hover_text(theme.label())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_panel_default() {
        let panel = SettingsPanel::new();
        assert_eq!(panel.active_section, SettingsSection::Appearance);
    }

    #[test]
    fn test_settings_section_label() {
        assert_eq!(SettingsSection::Appearance.label(), "Appearance");
        assert_eq!(SettingsSection::Appearance.icon(), "🎨");
    }

    #[test]
    fn test_settings_panel_output_default() {
        let output = SettingsPanelOutput::default();
        assert_eq!(output.theme, None);
        assert!(!output.close_requested);
    }

    #[test]
    fn test_show_without_input_changes_nothing() {
        let ctx = egui::Context::default();
        let mut panel = SettingsPanel::new();
        let mut output = None;
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            output = Some(panel.show(ctx, Theme::Dark));
        });
        assert_eq!(output, Some(SettingsPanelOutput::default()));
    }
}
