//! Markdown rendering using comrak
//!
//! This module turns markdown text into a `DisplayTree` that the viewer
//! draws. Image references are resolved against the document's directory
//! while the tree is built, and links keep their target so the viewer can
//! hand them to the system instead of navigating in-app.

use comrak::{
    markdown_to_html,
    nodes::{
        AstNode, ListDelimType, ListType as ComrakListType, NodeValue,
        TableAlignment as ComrakTableAlignment,
    },
    parse_document, Arena, Options,
};
use std::path::{Path, PathBuf};

/// Document shown when no tab is open.
pub const WELCOME_DOCUMENT: &str = "# Welcome to Marki Mark\n\nOpen a markdown file to get started.";

// ─────────────────────────────────────────────────────────────────────────────
// Public Types
// ─────────────────────────────────────────────────────────────────────────────

/// List type (ordered or unordered)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListType {
    Bullet,
    Ordered { start: usize, delimiter: char },
}

/// Table cell alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableAlignment {
    #[default]
    None,
    Left,
    Center,
    Right,
}

impl From<ComrakTableAlignment> for TableAlignment {
    fn from(align: ComrakTableAlignment) -> Self {
        match align {
            ComrakTableAlignment::None => TableAlignment::None,
            ComrakTableAlignment::Left => TableAlignment::Left,
            ComrakTableAlignment::Center => TableAlignment::Center,
            ComrakTableAlignment::Right => TableAlignment::Right,
        }
    }
}

/// Where an image's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// `http`, `https` or `data:` URI, kept as written
    Uri(String),
    /// File on disk
    Local(PathBuf),
}

/// The kind of a display node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Document,
    BlockQuote,
    List { list_type: ListType, tight: bool },
    Item,
    /// Fenced or indented code; `language` is the first word of the info string
    CodeBlock { language: String, literal: String },
    HtmlBlock(String),
    Paragraph,
    /// Heading level 1-6
    Heading { level: u8 },
    ThematicBreak,
    Table { alignments: Vec<TableAlignment> },
    TableRow { header: bool },
    TableCell,
    Text(String),
    TaskItem { checked: bool },
    SoftBreak,
    LineBreak,
    Code(String),
    HtmlInline(String),
    Emphasis,
    Strong,
    Strikethrough,
    Link { url: String, title: String },
    Image { source: ImageSource, title: String },
    FootnoteReference(String),
    FootnoteDefinition(String),
    /// Constructs the viewer does not draw specially
    Other,
}

/// A node of the rendered document.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayNode {
    pub kind: NodeKind,
    pub children: Vec<DisplayNode>,
}

impl DisplayNode {
    /// Get all text content from this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, output: &mut String) {
        match &self.kind {
            NodeKind::Text(t) | NodeKind::Code(t) => output.push_str(t),
            NodeKind::SoftBreak => output.push(' '),
            NodeKind::LineBreak => output.push('\n'),
            _ => {}
        }
        for child in &self.children {
            child.collect_text(output);
        }
    }

    /// Visit this node and every descendant, depth first.
    #[cfg(test)]
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a DisplayNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

/// A rendered document.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayTree {
    pub root: DisplayNode,
}

#[cfg(test)]
impl DisplayTree {
    /// Link targets in document order.
    pub fn links(&self) -> Vec<&str> {
        let mut links = Vec::new();
        self.root.walk(&mut |node| {
            if let NodeKind::Link { url, .. } = &node.kind {
                links.push(url.as_str());
            }
        });
        links
    }

    /// Image sources in document order.
    pub fn images(&self) -> Vec<&ImageSource> {
        let mut images = Vec::new();
        self.root.walk(&mut |node| {
            if let NodeKind::Image { source, .. } = &node.kind {
                images.push(source);
            }
        });
        images
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Public API Functions
// ─────────────────────────────────────────────────────────────────────────────

/// GitHub Flavored Markdown options shared by the viewer and print output.
fn gfm_options() -> Options {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.footnotes = true;
    options
}

/// Render markdown into a display tree.
///
/// Relative image paths are resolved against `base_dir`, normally the
/// directory of the document being shown.
pub fn render(markdown: &str, base_dir: Option<&Path>) -> DisplayTree {
    let arena = Arena::new();
    let root = parse_document(&arena, markdown, &gfm_options());
    DisplayTree {
        root: convert_node(root, base_dir),
    }
}

/// Render markdown to an HTML fragment.
pub fn render_html(markdown: &str) -> String {
    markdown_to_html(markdown, &gfm_options())
}

/// Resolve an image reference from a document in `base_dir`.
///
/// Remote and `data:` URIs are kept as written. Absolute paths are used as
/// they are. Relative paths lose a leading `./` and are joined to `base_dir`.
pub fn resolve_image_source(src: &str, base_dir: Option<&Path>) -> ImageSource {
    if src.starts_with("http://") || src.starts_with("https://") || src.starts_with("data:") {
        return ImageSource::Uri(src.to_string());
    }

    if is_absolute_reference(src) {
        return ImageSource::Local(PathBuf::from(src));
    }

    match base_dir {
        Some(dir) => {
            let clean = src
                .strip_prefix("./")
                .or_else(|| src.strip_prefix(".\\"))
                .unwrap_or(src);
            ImageSource::Local(dir.join(clean))
        }
        None => ImageSource::Local(PathBuf::from(src)),
    }
}

/// Absolute on this platform, rooted, or carrying a drive letter.
fn is_absolute_reference(src: &str) -> bool {
    if Path::new(src).is_absolute() || src.starts_with('/') || src.starts_with('\\') {
        return true;
    }
    let bytes = src.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

// ─────────────────────────────────────────────────────────────────────────────
// Internal Conversion Functions
// ─────────────────────────────────────────────────────────────────────────────

/// Convert a comrak AST node to our DisplayNode structure.
fn convert_node<'a>(node: &'a AstNode<'a>, base_dir: Option<&Path>) -> DisplayNode {
    let kind = convert_node_value(&node.data.borrow().value, base_dir);
    DisplayNode {
        kind,
        children: node
            .children()
            .map(|child| convert_node(child, base_dir))
            .collect(),
    }
}

/// Convert a comrak NodeValue to our NodeKind.
fn convert_node_value(value: &NodeValue, base_dir: Option<&Path>) -> NodeKind {
    match value {
        NodeValue::Document => NodeKind::Document,
        NodeValue::BlockQuote => NodeKind::BlockQuote,
        NodeValue::List(list) => {
            let list_type = match list.list_type {
                ComrakListType::Bullet => ListType::Bullet,
                ComrakListType::Ordered => ListType::Ordered {
                    start: list.start,
                    delimiter: if list.delimiter == ListDelimType::Period {
                        '.'
                    } else {
                        ')'
                    },
                },
            };
            NodeKind::List {
                list_type,
                tight: list.tight,
            }
        }
        NodeValue::Item(_) => NodeKind::Item,
        NodeValue::CodeBlock(code) => NodeKind::CodeBlock {
            language: code
                .info
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_string(),
            literal: code.literal.clone(),
        },
        NodeValue::HtmlBlock(html) => NodeKind::HtmlBlock(html.literal.clone()),
        NodeValue::Paragraph => NodeKind::Paragraph,
        NodeValue::Heading(heading) => NodeKind::Heading {
            level: heading.level.clamp(1, 6),
        },
        NodeValue::ThematicBreak => NodeKind::ThematicBreak,
        NodeValue::Table(table) => NodeKind::Table {
            alignments: table
                .alignments
                .iter()
                .map(|a| TableAlignment::from(*a))
                .collect(),
        },
        NodeValue::TableRow(header) => NodeKind::TableRow { header: *header },
        NodeValue::TableCell => NodeKind::TableCell,
        NodeValue::Text(text) => NodeKind::Text(text.clone()),
        NodeValue::TaskItem(checked) => NodeKind::TaskItem {
            checked: checked.map(|c| c == 'x' || c == 'X').unwrap_or(false),
        },
        NodeValue::SoftBreak => NodeKind::SoftBreak,
        NodeValue::LineBreak => NodeKind::LineBreak,
        NodeValue::Code(code) => NodeKind::Code(code.literal.clone()),
        NodeValue::HtmlInline(html) => NodeKind::HtmlInline(html.clone()),
        NodeValue::Emph => NodeKind::Emphasis,
        NodeValue::Strong => NodeKind::Strong,
        NodeValue::Strikethrough => NodeKind::Strikethrough,
        NodeValue::Link(link) => NodeKind::Link {
            url: link.url.clone(),
            title: link.title.clone(),
        },
        NodeValue::Image(image) => NodeKind::Image {
            source: resolve_image_source(&image.url, base_dir),
            title: image.title.clone(),
        },
        NodeValue::FootnoteReference(reference) => {
            NodeKind::FootnoteReference(reference.name.clone())
        }
        NodeValue::FootnoteDefinition(def) => NodeKind::FootnoteDefinition(def.name.clone()),
        _ => NodeKind::Other,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn first_block(markdown: &str) -> DisplayNode {
        render(markdown, None).root.children[0].clone()
    }

    #[test]
    fn test_render_empty_document() {
        let tree = render("", None);
        assert_eq!(tree.root.kind, NodeKind::Document);
        assert!(tree.root.children.is_empty());
    }

    #[test]
    fn test_welcome_document() {
        let tree = render(WELCOME_DOCUMENT, None);
        assert_eq!(tree.root.children[0].kind, NodeKind::Heading { level: 1 });
        assert!(tree
            .root
            .text_content()
            .contains("Open a markdown file to get started."));
    }

    #[test]
    fn test_heading_levels() {
        assert_eq!(first_block("## Two").kind, NodeKind::Heading { level: 2 });
        assert_eq!(first_block("###### Six").kind, NodeKind::Heading { level: 6 });
    }

    #[test]
    fn test_strong_inside_paragraph() {
        let para = first_block("This is **bold** text");
        assert_eq!(para.kind, NodeKind::Paragraph);
        let strong = para
            .children
            .iter()
            .find(|c| c.kind == NodeKind::Strong)
            .unwrap();
        assert_eq!(strong.text_content(), "bold");
    }

    #[test]
    fn test_code_block_language_is_first_word() {
        let block = first_block("```rust ignore\nfn main() {}\n```");
        assert_eq!(
            block.kind,
            NodeKind::CodeBlock {
                language: "rust".to_string(),
                literal: "fn main() {}\n".to_string(),
            }
        );
    }

    #[test]
    fn test_gfm_table_and_tasklist() {
        let table = first_block("| L | R |\n|:--|--:|\n| a | b |");
        assert_eq!(
            table.kind,
            NodeKind::Table {
                alignments: vec![TableAlignment::Left, TableAlignment::Right]
            }
        );

        let list = first_block("- [x] done\n- [ ] todo");
        let mut checks = Vec::new();
        list.walk(&mut |n| {
            if let NodeKind::TaskItem { checked } = n.kind {
                checks.push(checked);
            }
        });
        assert_eq!(checks, vec![true, false]);
    }

    #[test]
    fn test_links_are_collected() {
        let tree = render(
            "See [docs](https://example.com/docs) and https://rust-lang.org.",
            None,
        );
        assert_eq!(
            tree.links(),
            vec!["https://example.com/docs", "https://rust-lang.org"]
        );
    }

    #[test]
    fn test_image_relative_to_document() {
        let tree = render(
            "![logo](./img/logo.png) ![plain](pic.gif)",
            Some(Path::new("/docs")),
        );
        assert_eq!(
            tree.images(),
            vec![
                &ImageSource::Local(PathBuf::from("/docs/img/logo.png")),
                &ImageSource::Local(PathBuf::from("/docs/pic.gif")),
            ]
        );
    }

    #[test]
    fn test_resolve_image_source_kinds() {
        let base = Some(Path::new("/docs"));
        assert_eq!(
            resolve_image_source("https://example.com/a.png", base),
            ImageSource::Uri("https://example.com/a.png".to_string())
        );
        assert_eq!(
            resolve_image_source("data:image/png;base64,AAAA", base),
            ImageSource::Uri("data:image/png;base64,AAAA".to_string())
        );
        assert_eq!(
            resolve_image_source("/abs/a.png", base),
            ImageSource::Local(PathBuf::from("/abs/a.png"))
        );
        assert_eq!(
            resolve_image_source("C:\\pics\\a.png", base),
            ImageSource::Local(PathBuf::from("C:\\pics\\a.png"))
        );
        assert_eq!(
            resolve_image_source("a.png", None),
            ImageSource::Local(PathBuf::from("a.png"))
        );
    }

    #[test]
    fn test_render_html_gfm() {
        let html = render_html("| a |\n|---|\n| b |\n\n~~gone~~");
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>gone</del>"));
    }

    #[test]
    fn test_malformed_markdown_does_not_panic() {
        for input in [
            "```\nunclosed code block",
            "| broken | table",
            "[unclosed link(",
            "![broken image",
            "***nested emphasis**",
        ] {
            let _ = render(input, Some(Path::new("/docs")));
        }
    }
}
