//! Rendered document view
//!
//! Draws a `DisplayTree` with egui widgets: headings, paragraphs, lists,
//! task lists, block quotes, highlighted code blocks, tables and images.
//! The viewer is read-only; the only thing it reports back is a link the
//! user activated, which the app hands to the system.

use crate::config::Theme;
use crate::markdown::{
    render, syntax, DisplayNode, DisplayTree, ImageSource, ListType, NodeKind, TableAlignment,
};
use crate::theme::ThemeColors;
use crate::ui::images::{ImageCache, ImageState};
use eframe::egui::{self, Align, Color32, ColorImage, Layout, RichText, Sense, Stroke, Ui, Vec2};
use std::path::{Path, PathBuf};

/// Base body font size in points, before zoom.
const BODY_FONT_SIZE: f32 = 15.0;

/// Something the user did in the viewer that the app must handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerAction {
    /// A link or image placeholder was clicked
    OpenUrl(String),
}

// ─────────────────────────────────────────────────────────────────────────────
// Inline Content
// ─────────────────────────────────────────────────────────────────────────────

/// Accumulated inline formatting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct SpanStyle {
    strong: bool,
    emphasis: bool,
    strikethrough: bool,
    code: bool,
    muted: bool,
}

/// Inline content flattened out of the tree, ready to lay out.
#[derive(Debug, Clone, PartialEq)]
enum Inline {
    Text {
        text: String,
        style: SpanStyle,
        link: Option<String>,
    },
    Image {
        source: ImageSource,
        alt: String,
        link: Option<String>,
    },
    LineBreak,
}

fn collect_inlines(nodes: &[DisplayNode]) -> Vec<Inline> {
    let mut out = Vec::new();
    for node in nodes {
        push_inline(node, SpanStyle::default(), None, &mut out);
    }
    out
}

fn push_inline(node: &DisplayNode, style: SpanStyle, link: Option<&str>, out: &mut Vec<Inline>) {
    let text = |text: &str, style: SpanStyle| Inline::Text {
        text: text.to_string(),
        style,
        link: link.map(str::to_string),
    };

    match &node.kind {
        NodeKind::Text(t) => out.push(text(t, style)),
        NodeKind::Code(t) => out.push(text(t, SpanStyle { code: true, ..style })),
        NodeKind::HtmlInline(html) => out.push(text(html, SpanStyle { muted: true, ..style })),
        NodeKind::SoftBreak => out.push(text(" ", style)),
        NodeKind::LineBreak => out.push(Inline::LineBreak),
        NodeKind::FootnoteReference(name) => {
            out.push(text(&format!("[{}]", name), SpanStyle { muted: true, ..style }))
        }
        NodeKind::Image { source, .. } => out.push(Inline::Image {
            source: source.clone(),
            alt: node.text_content(),
            link: link.map(str::to_string),
        }),
        NodeKind::Link { url, .. } => {
            for child in &node.children {
                push_inline(child, style, Some(url), out);
            }
        }
        kind => {
            let style = match kind {
                NodeKind::Strong => SpanStyle { strong: true, ..style },
                NodeKind::Emphasis => SpanStyle { emphasis: true, ..style },
                NodeKind::Strikethrough => SpanStyle { strikethrough: true, ..style },
                _ => style,
            };
            for child in &node.children {
                push_inline(child, style, link, out);
            }
        }
    }
}

/// Target to hand to the system for a link in a document in `base_dir`.
///
/// URLs with a scheme, anchors and absolute paths are kept; other relative
/// references are joined to the document's directory.
pub fn resolve_link_target(url: &str, base_dir: Option<&Path>) -> String {
    let has_scheme = url
        .split_once(':')
        .map(|(scheme, _)| {
            scheme.len() > 1
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        })
        .unwrap_or(false);

    if has_scheme || url.starts_with('#') || Path::new(url).is_absolute() {
        return url.to_string();
    }
    match base_dir {
        Some(dir) => dir
            .join(url.strip_prefix("./").unwrap_or(url))
            .to_string_lossy()
            .into_owned(),
        None => url.to_string(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Document Viewer
// ─────────────────────────────────────────────────────────────────────────────

struct CachedTree {
    source: String,
    base_dir: Option<PathBuf>,
    tree: DisplayTree,
}

/// Draws rendered markdown and keeps the caches it needs between frames.
pub struct DocumentViewer {
    images: ImageCache,
    cached: Option<CachedTree>,
}

impl DocumentViewer {
    pub fn new() -> Self {
        Self {
            images: ImageCache::new(),
            cached: None,
        }
    }

    /// Image paths the viewer needs decoded.
    pub fn take_image_requests(&mut self) -> Vec<PathBuf> {
        self.images.take_requests()
    }

    /// Hand the viewer a decoded image; `None` marks it unloadable.
    pub fn insert_image(&mut self, ctx: &egui::Context, path: PathBuf, image: Option<ColorImage>) {
        self.images.insert(ctx, path, image);
    }

    /// The display tree for `markdown`, re-rendered only when the text or
    /// directory changes.
    fn tree_for(&mut self, markdown: &str, base_dir: Option<&Path>) -> &DisplayTree {
        let stale = match &self.cached {
            Some(c) => c.source != markdown || c.base_dir.as_deref() != base_dir,
            None => true,
        };
        if stale {
            self.cached = None;
        }
        let cached = self.cached.get_or_insert_with(|| CachedTree {
            source: markdown.to_string(),
            base_dir: base_dir.map(Path::to_path_buf),
            tree: render(markdown, base_dir),
        });
        &cached.tree
    }

    /// Draw `markdown` in a scrollable area.
    pub fn show(
        &mut self,
        ui: &mut Ui,
        markdown: &str,
        base_dir: Option<&Path>,
        theme: Theme,
        colors: &ThemeColors,
    ) -> Option<ViewerAction> {
        // Split borrows: the tree lives in `cached`, textures in `images`
        self.tree_for(markdown, base_dir);
        let Self { images, cached } = self;
        let tree = &cached.as_ref()?.tree;

        let mut painter = DocumentPainter {
            colors,
            theme,
            font_size: BODY_FONT_SIZE,
            text_color: colors.text.primary,
            images,
            base_dir,
            action: None,
            block_counter: 0,
        };

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                egui::Frame::none()
                    .inner_margin(egui::Margin::symmetric(24.0, 16.0))
                    .show(ui, |ui| {
                        ui.set_max_width(900.0);
                        painter.blocks(ui, &tree.root.children);
                    });
            });

        painter.action
    }
}

/// Per-frame drawing state.
struct DocumentPainter<'a> {
    colors: &'a ThemeColors,
    theme: Theme,
    font_size: f32,
    /// Body text color; block quotes swap it while drawing their children
    text_color: Color32,
    images: &'a mut ImageCache,
    base_dir: Option<&'a Path>,
    action: Option<ViewerAction>,
    /// Distinguishes widgets that need stable ids (scroll areas, grids)
    block_counter: usize,
}

impl DocumentPainter<'_> {
    fn next_id(&mut self, kind: &str) -> egui::Id {
        self.block_counter += 1;
        egui::Id::new((kind, self.block_counter))
    }

    fn open(&mut self, url: &str) {
        self.action = Some(ViewerAction::OpenUrl(resolve_link_target(url, self.base_dir)));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Blocks
    // ─────────────────────────────────────────────────────────────────────────

    fn blocks(&mut self, ui: &mut Ui, nodes: &[DisplayNode]) {
        for node in nodes {
            self.block(ui, node);
        }
    }

    fn block(&mut self, ui: &mut Ui, node: &DisplayNode) {
        match &node.kind {
            NodeKind::Heading { level } => self.heading(ui, node, *level),
            NodeKind::Paragraph => {
                self.inline_block(ui, &node.children, self.font_size, self.text_color);
                ui.add_space(self.font_size * 0.6);
            }
            NodeKind::BlockQuote => self.blockquote(ui, node),
            NodeKind::List { list_type, tight } => self.list(ui, node, *list_type, *tight),
            NodeKind::CodeBlock { language, literal } => self.code_block(ui, language, literal),
            NodeKind::HtmlBlock(html) => {
                ui.label(
                    RichText::new(html.trim_end())
                        .monospace()
                        .color(self.colors.text.muted),
                );
            }
            NodeKind::ThematicBreak => {
                ui.add_space(6.0);
                let (rect, _) =
                    ui.allocate_exact_size(Vec2::new(ui.available_width(), 1.0), Sense::hover());
                ui.painter()
                    .rect_filled(rect, 0.0, self.colors.document.horizontal_rule);
                ui.add_space(6.0);
            }
            NodeKind::Table { alignments } => self.table(ui, node, alignments),
            NodeKind::FootnoteDefinition(name) => {
                ui.horizontal_top(|ui| {
                    ui.label(
                        RichText::new(format!("[{}]", name))
                            .size(self.font_size * 0.85)
                            .color(self.colors.text.muted),
                    );
                    ui.vertical(|ui| self.blocks(ui, &node.children));
                });
            }
            // Stray inline content at block level
            _ => self.inline_block(
                ui,
                std::slice::from_ref(node),
                self.font_size,
                self.text_color,
            ),
        }
    }

    fn heading(&mut self, ui: &mut Ui, node: &DisplayNode, level: u8) {
        let scale = match level {
            1 => 1.8,
            2 => 1.5,
            3 => 1.3,
            4 => 1.15,
            5 => 1.05,
            _ => 1.0,
        };
        ui.add_space(if level <= 2 { 10.0 } else { 6.0 });

        let inlines = collect_inlines(&node.children)
            .into_iter()
            .map(|inline| match inline {
                Inline::Text { text, style, link } => Inline::Text {
                    text,
                    style: SpanStyle { strong: true, ..style },
                    link,
                },
                other => other,
            })
            .collect::<Vec<_>>();
        self.inlines(ui, &inlines, self.font_size * scale, self.colors.document.heading);

        if level <= 2 {
            ui.add_space(2.0);
            let (rect, _) =
                ui.allocate_exact_size(Vec2::new(ui.available_width(), 1.0), Sense::hover());
            ui.painter().rect_filled(rect, 0.0, self.colors.base.border_subtle);
        }
        ui.add_space(6.0);
    }

    fn blockquote(&mut self, ui: &mut Ui, node: &DisplayNode) {
        let border = self.colors.document.blockquote_border;
        let response = ui.horizontal_top(|ui| {
            ui.add_space(14.0);
            ui.vertical(|ui| {
                let outer = std::mem::replace(
                    &mut self.text_color,
                    self.colors.document.blockquote_text,
                );
                self.blocks(ui, &node.children);
                self.text_color = outer;
            });
        });
        let rect = response.response.rect;
        ui.painter().rect_filled(
            egui::Rect::from_min_max(rect.left_top(), egui::pos2(rect.left() + 4.0, rect.bottom())),
            2.0,
            border,
        );
        ui.add_space(6.0);
    }

    fn list(&mut self, ui: &mut Ui, node: &DisplayNode, list_type: ListType, tight: bool) {
        let mut number = match list_type {
            ListType::Ordered { start, .. } => start,
            ListType::Bullet => 0,
        };

        for item in &node.children {
            let marker = match (&item.kind, list_type) {
                (NodeKind::TaskItem { checked: true }, _) => "☑".to_string(),
                (NodeKind::TaskItem { checked: false }, _) => "☐".to_string(),
                (_, ListType::Bullet) => "•".to_string(),
                (_, ListType::Ordered { delimiter, .. }) => format!("{}{}", number, delimiter),
            };
            number += 1;

            ui.horizontal_top(|ui| {
                ui.add_space(8.0);
                ui.add_sized(
                    [self.font_size * 1.6, self.font_size * 1.3],
                    egui::Label::new(
                        RichText::new(marker)
                            .size(self.font_size)
                            .color(self.colors.document.list_marker),
                    ),
                );
                ui.vertical(|ui| {
                    for child in &item.children {
                        match child.kind {
                            // Tight lists keep items together
                            NodeKind::Paragraph if tight => self.inline_block(
                                ui,
                                &child.children,
                                self.font_size,
                                self.text_color,
                            ),
                            _ => self.block(ui, child),
                        }
                    }
                });
            });
        }
        ui.add_space(4.0);
    }

    fn code_block(&mut self, ui: &mut Ui, language: &str, literal: &str) {
        let highlighter = syntax::highlighter();
        let background = highlighter
            .background(self.theme)
            .unwrap_or(self.colors.document.code_block_bg);
        let lines = highlighter.highlight(literal, language, self.theme);
        let size = self.font_size * 0.9;
        let id = self.next_id("code_block");

        egui::Frame::none()
            .fill(background)
            .stroke(Stroke::new(1.0, self.colors.document.code_block_border))
            .rounding(4.0)
            .inner_margin(10.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                egui::ScrollArea::horizontal().id_source(id).show(ui, |ui| {
                    ui.spacing_mut().item_spacing = Vec2::ZERO;
                    for line in &lines {
                        ui.horizontal(|ui| {
                            if line.is_empty() {
                                ui.label(RichText::new(" ").monospace().size(size));
                            }
                            for segment in line {
                                let text = segment.text.trim_end_matches(['\n', '\r']);
                                if text.is_empty() {
                                    continue;
                                }
                                let mut segment = segment.clone();
                                segment.text = text.to_string();
                                ui.add(egui::Label::new(segment.to_rich_text(size)).extend());
                            }
                        });
                    }
                });
            });
        ui.add_space(8.0);
    }

    fn table(&mut self, ui: &mut Ui, node: &DisplayNode, alignments: &[TableAlignment]) {
        let id = self.next_id("table");
        egui::Frame::none()
            .stroke(Stroke::new(1.0, self.colors.document.table_border))
            .rounding(4.0)
            .inner_margin(6.0)
            .show(ui, |ui| {
                egui::Grid::new(id)
                    .striped(true)
                    .spacing([16.0, 6.0])
                    .show(ui, |ui| {
                        for row in &node.children {
                            let header = matches!(row.kind, NodeKind::TableRow { header: true });
                            for (column, cell) in row.children.iter().enumerate() {
                                let align = alignments.get(column).copied().unwrap_or_default();
                                self.table_cell(ui, cell, header, align);
                            }
                            ui.end_row();
                        }
                    });
            });
        ui.add_space(8.0);
    }

    fn table_cell(&mut self, ui: &mut Ui, cell: &DisplayNode, header: bool, align: TableAlignment) {
        let inlines = collect_inlines(&cell.children);
        let plain = inlines
            .iter()
            .all(|i| matches!(i, Inline::Text { link: None, .. }));

        if plain {
            let mut text = RichText::new(cell.text_content())
                .size(self.font_size)
                .color(self.text_color);
            if header {
                text = text.strong();
            }
            let cross = match align {
                TableAlignment::Center => Align::Center,
                TableAlignment::Right => Align::Max,
                TableAlignment::Left | TableAlignment::None => Align::Min,
            };
            ui.with_layout(Layout::top_down(cross), |ui| ui.label(text));
        } else {
            ui.vertical(|ui| {
                self.inlines(ui, &inlines, self.font_size, self.text_color)
            });
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Inlines
    // ─────────────────────────────────────────────────────────────────────────

    fn inline_block(&mut self, ui: &mut Ui, nodes: &[DisplayNode], size: f32, color: Color32) {
        let inlines = collect_inlines(nodes);
        self.inlines(ui, &inlines, size, color);
    }

    fn inlines(&mut self, ui: &mut Ui, inlines: &[Inline], size: f32, color: Color32) {
        // Split at hard breaks so each line wraps on its own
        for line in inlines.split(|i| matches!(i, Inline::LineBreak)) {
            ui.horizontal_wrapped(|ui| {
                ui.spacing_mut().item_spacing.x = 0.0;
                for inline in line {
                    self.inline(ui, inline, size, color);
                }
            });
        }
    }

    fn inline(&mut self, ui: &mut Ui, inline: &Inline, size: f32, color: Color32) {
        match inline {
            Inline::Text { text, style, link } => {
                let rich = self.styled_text(text, *style, size, color, link.is_some());
                match link {
                    Some(url) => {
                        if ui.add(egui::Link::new(rich)).on_hover_text(url).clicked() {
                            self.open(url);
                        }
                    }
                    None => {
                        ui.label(rich);
                    }
                }
            }
            Inline::Image { source, alt, link } => self.image(ui, source, alt, link.as_deref()),
            Inline::LineBreak => {}
        }
    }

    fn styled_text(
        &self,
        text: &str,
        style: SpanStyle,
        size: f32,
        color: Color32,
        is_link: bool,
    ) -> RichText {
        let mut rich = RichText::new(text).size(size);
        rich = if is_link {
            rich.color(self.colors.text.link)
        } else if style.code {
            rich.color(self.colors.text.code)
        } else if style.muted {
            rich.color(self.colors.text.muted)
        } else {
            rich.color(color)
        };
        if style.code {
            rich = rich
                .monospace()
                .size(size * 0.9)
                .background_color(self.colors.document.code_block_bg);
        }
        if style.strong {
            rich = rich.strong();
        }
        if style.emphasis {
            rich = rich.italics();
        }
        if style.strikethrough {
            rich = rich.strikethrough();
        }
        rich
    }

    fn image(&mut self, ui: &mut Ui, source: &ImageSource, alt: &str, link: Option<&str>) {
        let texture = match source {
            ImageSource::Local(path) => match self.images.get(path) {
                ImageState::Ready(handle) => Some(egui::load::SizedTexture::from_handle(handle)),
                ImageState::Loading => {
                    let spinner = ui.add(egui::Spinner::new().size(self.font_size));
                    if !alt.is_empty() {
                        spinner.on_hover_text(alt);
                    }
                    return;
                }
                ImageState::Failed => None,
            },
            ImageSource::Uri(_) => None,
        };

        match texture {
            Some(texture) => {
                let response = ui.add(
                    egui::Image::new(texture)
                        .max_width(ui.available_width())
                        .sense(if link.is_some() {
                            Sense::click()
                        } else {
                            Sense::hover()
                        }),
                );
                let response = if alt.is_empty() {
                    response
                } else {
                    response.on_hover_text(alt)
                };
                if let Some(url) = link {
                    if response.clicked() {
                        self.open(url);
                    }
                }
            }
            None => self.image_placeholder(ui, source, alt, link),
        }
    }

    fn image_placeholder(
        &mut self,
        ui: &mut Ui,
        source: &ImageSource,
        alt: &str,
        link: Option<&str>,
    ) {
        let target = match source {
            ImageSource::Uri(uri) => uri.clone(),
            ImageSource::Local(path) => path.to_string_lossy().into_owned(),
        };
        let label = if alt.is_empty() { "image" } else { alt };

        let response = ui.add(
            egui::Button::new(
                RichText::new(format!("🖼 {}", label))
                    .size(self.font_size * 0.9)
                    .color(self.colors.text.muted),
            )
            .stroke(Stroke::new(1.0, self.colors.document.image_placeholder))
            .fill(Color32::TRANSPARENT),
        );
        if response.on_hover_text(&target).clicked() {
            let url = link.map(str::to_string).unwrap_or(target);
            self.open(&url);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
