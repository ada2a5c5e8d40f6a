//! Application menu bar
//!
//! File / Edit / View / Help menus. The menus only report what was chosen;
//! the app performs the action.

use super::shortcut_label;
use crate::config::ZoomLevel;
use eframe::egui::{self, Button, RichText, Ui};
use std::path::{Path, PathBuf};

/// A menu entry the user chose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    OpenFile,
    OpenRecent(PathBuf),
    Print,
    OpenSettings,
    Exit,
    ToggleEdit,
    ZoomIn,
    ZoomOut,
    ZoomReset,
    OpenAbout,
}

/// What the menus need to know to enable and label their entries.
#[derive(Debug, Clone, Copy)]
pub struct MenuContext<'a> {
    pub recent_files: &'a [PathBuf],
    pub has_active_tab: bool,
    pub is_editing: bool,
    pub zoom: ZoomLevel,
}

/// Label of the Edit menu's mode switch.
pub fn edit_mode_label(is_editing: bool) -> &'static str {
    if is_editing {
        "View Mode"
    } else {
        "Edit Mode"
    }
}

/// Label of an Open Recent entry: file name, then its directory.
fn recent_label(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(dir) => format!("{}  ·  {}", name, dir.display()),
        None => name,
    }
}

/// Draw the menu bar inside a top panel.
pub fn show_menu_bar(ui: &mut Ui, menu: MenuContext<'_>) -> Option<MenuAction> {
    let mut action = None;

    egui::menu::bar(ui, |ui| {
        ui.menu_button("File", |ui| {
            if ui
                .add(Button::new("Open File…").shortcut_text(shortcut_label("O")))
                .clicked()
            {
                action = Some(MenuAction::OpenFile);
                ui.close_menu();
            }

            ui.add_enabled_ui(!menu.recent_files.is_empty(), |ui| {
                ui.menu_button("Open Recent", |ui| {
                    for path in menu.recent_files {
                        if ui
                            .button(recent_label(path))
                            .on_hover_text(path.display().to_string())
                            .clicked()
                        {
                            action = Some(MenuAction::OpenRecent(path.clone()));
                            ui.close_menu();
                        }
                    }
                });
            });

            ui.separator();

            if ui
                .add_enabled(
                    menu.has_active_tab,
                    Button::new("Print…").shortcut_text(shortcut_label("P")),
                )
                .clicked()
            {
                action = Some(MenuAction::Print);
                ui.close_menu();
            }

            if ui.button("Settings").clicked() {
                action = Some(MenuAction::OpenSettings);
                ui.close_menu();
            }

            ui.separator();

            if ui.button("Exit").clicked() {
                action = Some(MenuAction::Exit);
                ui.close_menu();
            }
        });

        ui.menu_button("Edit", |ui| {
            if ui
                .add_enabled(
                    menu.has_active_tab,
                    Button::new(edit_mode_label(menu.is_editing))
                        .shortcut_text(shortcut_label("E")),
                )
                .clicked()
            {
                action = Some(MenuAction::ToggleEdit);
                ui.close_menu();
            }
        });

        ui.menu_button("View", |ui| {
            if ui
                .add(Button::new("Zoom In").shortcut_text(shortcut_label("+")))
                .clicked()
            {
                action = Some(MenuAction::ZoomIn);
                ui.close_menu();
            }
            if ui
                .add(Button::new("Zoom Out").shortcut_text(shortcut_label("-")))
                .clicked()
            {
                action = Some(MenuAction::ZoomOut);
                ui.close_menu();
            }
            if ui
                .add(Button::new("Reset Zoom").shortcut_text(shortcut_label("0")))
                .clicked()
            {
                action = Some(MenuAction::ZoomReset);
                ui.close_menu();
            }
        });

        ui.menu_button("Help", |ui| {
            if ui.button("About").clicked() {
                action = Some(MenuAction::OpenAbout);
                ui.close_menu();
            }
        });

        if !menu.zoom.is_default() {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(
                    RichText::new(format!("{}%", menu.zoom.percent()))
                        .small()
                        .weak(),
                );
            });
        }
    });

    action
}
