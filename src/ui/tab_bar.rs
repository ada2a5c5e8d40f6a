//! Tab bar for open documents
//!
//! Tabs wrap onto extra rows when they don't fit. Clicking a tab selects
//! it; the `×` on each tab closes it.

use crate::state::Tab;
use crate::theme::ThemeColors;
use eframe::egui::{self, Align2, CursorIcon, FontId, Rect, Sense, Ui, Vec2};
use std::path::{Path, PathBuf};

const TAB_HEIGHT: f32 = 26.0;
const TAB_SPACING: f32 = 4.0;
const TAB_PADDING: f32 = 10.0;
const CLOSE_BUTTON_WIDTH: f32 = 18.0;
const MIN_TAB_WIDTH: f32 = 80.0;

/// What the user did in the tab bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabBarAction {
    Select(PathBuf),
    Close(PathBuf),
}

/// Position of each tab as (x offset, row), wrapping at `available_width`.
fn layout_rows(widths: &[f32], available_width: f32) -> Vec<(f32, usize)> {
    let mut x = 0.0;
    let mut row = 0;
    widths
        .iter()
        .map(|&width| {
            if x + width > available_width && x > 0.0 {
                x = 0.0;
                row += 1;
            }
            let position = (x, row);
            x += width + TAB_SPACING;
            position
        })
        .collect()
}

/// Draw the tab bar. Nothing is drawn when there are no tabs.
pub fn show_tab_bar(
    ui: &mut Ui,
    tabs: &[Tab],
    active: Option<&Path>,
    colors: &ThemeColors,
) -> Option<TabBarAction> {
    if tabs.is_empty() {
        return None;
    }

    let font = FontId::proportional(13.0);
    let text_widths: Vec<f32> = tabs
        .iter()
        .map(|tab| {
            ui.fonts(|f| {
                f.layout_no_wrap(tab.file_name.clone(), font.clone(), colors.text.primary)
                    .size()
                    .x
            })
        })
        .collect();
    let widths: Vec<f32> = text_widths
        .iter()
        .map(|w| (w + CLOSE_BUTTON_WIDTH + TAB_PADDING * 2.0).max(MIN_TAB_WIDTH))
        .collect();

    let available_width = ui.available_width();
    let positions = layout_rows(&widths, available_width);
    let rows = positions.last().map(|(_, row)| row + 1).unwrap_or(1);
    let (bar_rect, _) = ui.allocate_exact_size(
        Vec2::new(available_width, rows as f32 * (TAB_HEIGHT + 2.0)),
        Sense::hover(),
    );

    let mut action = None;
    for ((tab, width), (x, row)) in tabs.iter().zip(&widths).zip(&positions) {
        let selected = active == Some(tab.path.as_path());
        let tab_rect = Rect::from_min_size(
            bar_rect.min + Vec2::new(*x, *row as f32 * (TAB_HEIGHT + 2.0)),
            Vec2::new(*width, TAB_HEIGHT),
        );
        let close_rect = Rect::from_min_size(
            egui::pos2(tab_rect.right() - CLOSE_BUTTON_WIDTH - 4.0, tab_rect.top() + 4.0),
            Vec2::new(CLOSE_BUTTON_WIDTH, TAB_HEIGHT - 8.0),
        );

        let id = egui::Id::new("tab").with(&tab.path);
        let tab_response = ui.interact(tab_rect, id, Sense::click());
        let close_response = ui.interact(close_rect, id.with("close"), Sense::click());

        let painter = ui.painter();
        if selected {
            painter.rect_filled(tab_rect, 4.0, colors.base.selected);
            painter.rect_filled(
                Rect::from_min_max(
                    egui::pos2(tab_rect.left() + 4.0, tab_rect.bottom() - 2.0),
                    egui::pos2(tab_rect.right() - 4.0, tab_rect.bottom()),
                ),
                1.0,
                colors.ui.accent,
            );
        } else if tab_response.hovered() {
            painter.rect_filled(tab_rect, 4.0, colors.base.hover);
        }

        let text_color = if selected {
            colors.text.primary
        } else {
            colors.text.secondary
        };
        painter.text(
            egui::pos2(tab_rect.left() + TAB_PADDING, tab_rect.center().y),
            Align2::LEFT_CENTER,
            &tab.file_name,
            font.clone(),
            text_color,
        );
        painter.text(
            close_rect.center(),
            Align2::CENTER_CENTER,
            "×",
            FontId::proportional(15.0),
            if close_response.hovered() {
                colors.ui.error
            } else {
                text_color
            },
        );

        if tab_response.hovered() || close_response.hovered() {
            ui.ctx().set_cursor_icon(CursorIcon::PointingHand);
        }
        let tab_response = tab_response.on_hover_text(tab.path.display().to_string());

        if close_response.clicked() {
            action = Some(TabBarAction::Close(tab.path.clone()));
        } else if tab_response.clicked() && !selected {
            action = Some(TabBarAction::Select(tab.path.clone()));
        }
    }

    action
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_single_row() {
        let positions = layout_rows(&[100.0, 100.0], 500.0);
        assert_eq!(positions, vec![(0.0, 0), (104.0, 0)]);
    }

    #[test]
    fn test_layout_wraps_to_new_row() {
        let positions = layout_rows(&[100.0, 100.0, 100.0], 250.0);
        assert_eq!(positions, vec![(0.0, 0), (104.0, 0), (0.0, 1)]);
    }

    #[test]
    fn test_layout_oversized_tab_stays_on_its_row() {
        let positions = layout_rows(&[400.0, 50.0], 300.0);
        assert_eq!(positions, vec![(0.0, 0), (0.0, 1)]);
    }

    #[test]
    fn test_empty_tab_bar_draws_nothing() {
        let ctx = egui::Context::default();
        let colors = ThemeColors::light();
        let mut action = Some(TabBarAction::Select(PathBuf::new()));
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                action = show_tab_bar(ui, &[], None, &colors);
            });
        });
        assert_eq!(action, None);
    }
}
