//! Text editor for the active document
//!
//! Edits go into a draft buffer kept per document path. Save hands the
//! draft to the app; Cancel throws it away. The tab's own content only
//! changes once a save succeeds.

use super::shortcut_label;
use crate::state::Tab;
use crate::theme::ThemeColors;
use eframe::egui::{self, FontId, RichText, TextEdit, Ui};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Editor font size in points, before zoom.
const EDITOR_FONT_SIZE: f32 = 14.0;

/// What the user asked the editor to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorAction {
    /// Write the draft to disk
    Save(String),
    /// Leave edit mode, discarding the draft
    Cancel,
}

/// Hint shown above the editor.
pub fn editor_hint() -> String {
    format!("{} to Save, Esc to Cancel", shortcut_label("S"))
}

/// Draft buffers for documents in edit mode.
#[derive(Debug, Default)]
pub struct EditorPanel {
    drafts: HashMap<PathBuf, String>,
}

impl EditorPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// The draft for `tab`, started from its content on first use.
    pub fn draft_mut(&mut self, tab: &Tab) -> &mut String {
        self.drafts
            .entry(tab.path.clone())
            .or_insert_with(|| tab.content.clone())
    }

    pub fn draft(&self, path: &Path) -> Option<&str> {
        self.drafts.get(path).map(String::as_str)
    }

    /// Drop drafts whose tab was closed or left edit mode.
    pub fn retain_editing(&mut self, tabs: &[Tab]) {
        self.drafts.retain(|path, _| {
            tabs.iter()
                .any(|tab| tab.is_editing && tab.path.as_path() == path.as_path())
        });
    }

    /// Draw the editor for `tab`.
    pub fn show(&mut self, ui: &mut Ui, tab: &Tab, colors: &ThemeColors) -> Option<EditorAction> {
        let mut action = None;

        ui.horizontal(|ui| {
            ui.label(
                RichText::new(editor_hint())
                    .small()
                    .color(colors.text.muted),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Cancel").clicked() {
                    action = Some(EditorAction::Cancel);
                }
                if ui
                    .add(egui::Button::new(RichText::new("Save").strong()).fill(colors.ui.accent))
                    .clicked()
                {
                    action = Some(EditorAction::Save(self.draft_mut(tab).clone()));
                }
            });
        });
        ui.separator();

        let draft = self.draft_mut(tab);
        egui::ScrollArea::vertical()
            .id_source(egui::Id::new("editor_scroll").with(&tab.path))
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.add(
                    TextEdit::multiline(draft)
                        .id(egui::Id::new("editor").with(&tab.path))
                        .font(FontId::monospace(EDITOR_FONT_SIZE))
                        .code_editor()
                        .desired_width(f32::INFINITY)
                        .desired_rows(30)
                        .lock_focus(true),
                );
            });

        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editing_tab(path: &str, content: &str) -> Tab {
        let mut tab = Tab::new(PathBuf::from(path), content.to_string());
        tab.is_editing = true;
        tab
    }

    #[test]
    fn test_draft_starts_from_content() {
        let tab = editing_tab("/a.md", "# A");
        let mut panel = EditorPanel::new();
        assert_eq!(panel.draft_mut(&tab), "# A");

        panel.draft_mut(&tab).push_str("\nmore");
        assert_eq!(panel.draft(Path::new("/a.md")), Some("# A\nmore"));
        // Tab content is untouched until a save
        assert_eq!(tab.content, "# A");
    }

    #[test]
    fn test_retain_editing_drops_closed_and_viewing() {
        let a = editing_tab("/a.md", "A");
        let mut b = editing_tab("/b.md", "B");
        let c = editing_tab("/c.md", "C");
        let mut panel = EditorPanel::new();
        for tab in [&a, &b, &c] {
            panel.draft_mut(tab).push('!');
        }

        b.is_editing = false;
        panel.retain_editing(&[a, b]);

        assert_eq!(panel.draft(Path::new("/a.md")), Some("A!"));
        assert!(panel.draft(Path::new("/b.md")).is_none());
        assert!(panel.draft(Path::new("/c.md")).is_none());
    }

    #[test]
    fn test_reentering_edit_starts_fresh() {
        let mut tab = editing_tab("/a.md", "A");
        let mut panel = EditorPanel::new();
        panel.draft_mut(&tab).push_str(" discarded");

        tab.is_editing = false;
        panel.retain_editing(std::slice::from_ref(&tab));
        tab.is_editing = true;
        assert_eq!(panel.draft_mut(&tab), "A");
    }

    #[test]
    fn test_editor_hint() {
        assert!(editor_hint().ends_with("+S to Save, Esc to Cancel"));
    }
}
