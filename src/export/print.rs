//! Print support
//!
//! Printing hands the document to the system browser: the markdown is
//! converted to a standalone HTML page that calls `window.print()` once it
//! has loaded, the page is written to the temp directory, and the default
//! handler opens it. Relative images keep working because the page's
//! `<base>` points at the document's directory.

use crate::error::{Error, Result};
use crate::files::open_external;
use crate::markdown::render_html;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// Subdirectory of the temp directory that holds print pages.
const PRINT_DIR_NAME: &str = "marki-mark-print";

// ─────────────────────────────────────────────────────────────────────────────
// Page Generation
// ─────────────────────────────────────────────────────────────────────────────

/// Build a standalone print page for `markdown`.
pub fn build_print_page(markdown: &str, title: &str, base_dir: Option<&Path>) -> String {
    let base = base_dir
        .map(|dir| {
            format!(
                "\n    <base href=\"{}\">",
                html_escape(&directory_url(dir))
            )
        })
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="generator" content="Marki Mark">{base}
    <title>{title}</title>
    <style>
{css}
    </style>
</head>
<body onload="window.print()">
    <article class="markdown-body">
{body}
    </article>
</body>
</html>"#,
        base = base,
        title = html_escape(title),
        css = PRINT_CSS,
        body = render_html(markdown),
    )
}

/// `file://` URL for a directory, with a trailing slash.
fn directory_url(dir: &Path) -> String {
    let mut path = dir.to_string_lossy().replace('\\', "/");
    if !path.starts_with('/') {
        path.insert(0, '/');
    }
    if !path.ends_with('/') {
        path.push('/');
    }
    format!("file://{}", path.replace(' ', "%20"))
}

/// Escape text for HTML content and attribute values.
fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

// ─────────────────────────────────────────────────────────────────────────────
// Printing
// ─────────────────────────────────────────────────────────────────────────────

/// Write a print page into `dir` and return its path.
pub fn write_print_page(
    dir: &Path,
    markdown: &str,
    title: &str,
    base_dir: Option<&Path>,
) -> Result<PathBuf> {
    fs::create_dir_all(dir).map_err(|e| Error::from_write(dir, e))?;

    let stem = Path::new(title)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "document".to_string());
    let path = dir.join(format!("{}.html", stem));

    let html = build_print_page(markdown, title, base_dir);
    fs::write(&path, html).map_err(|e| Error::from_write(&path, e))?;
    Ok(path)
}

/// Print a document through the system browser.
pub fn print_document(markdown: &str, title: &str, base_dir: Option<&Path>) -> Result<()> {
    let dir = std::env::temp_dir().join(PRINT_DIR_NAME);
    let page = write_print_page(&dir, markdown, title, base_dir)?;
    info!("Opening print page {}", page.display());
    open_external(&page.to_string_lossy())
}

// ─────────────────────────────────────────────────────────────────────────────
// CSS
// ─────────────────────────────────────────────────────────────────────────────

/// Paper-friendly styles for the print page.
const PRINT_CSS: &str = r#"
body {
    margin: 0;
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Noto Sans', Helvetica, Arial, sans-serif;
    font-size: 12pt;
    line-height: 1.6;
    color: #111;
    background: #fff;
}
.markdown-body { max-width: 800px; margin: 0 auto; padding: 24px; }
h1, h2 { border-bottom: 1px solid #ddd; padding-bottom: 0.3em; }
pre, code { font-family: 'SF Mono', Consolas, 'Liberation Mono', monospace; font-size: 10pt; }
pre { background: #f5f5f5; padding: 12px; border-radius: 4px; overflow-x: auto; }
blockquote { margin: 0; padding: 0 1em; color: #555; border-left: 4px solid #ddd; }
table { border-collapse: collapse; }
th, td { border: 1px solid #ccc; padding: 6px 12px; }
img { max-width: 100%; }
a { color: #0645ad; }
@media print {
    .markdown-body { padding: 0; }
    pre, blockquote, table, img { page-break-inside: avoid; }
}
"#;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_page_prints_on_load() {
        let html = build_print_page("# Hello", "hello.md", None);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"onload="window.print()""#));
        assert!(html.contains("<h1>Hello</h1>"));
        assert!(html.contains("<title>hello.md</title>"));
        assert!(!html.contains("<base"));
    }

    #[test]
    fn test_page_base_points_at_document_dir() {
        let html = build_print_page("![a](img/a.png)", "a.md", Some(Path::new("/docs/my notes")));
        assert!(html.contains(r#"<base href="file:///docs/my%20notes/">"#));
        assert!(html.contains(r#"src="img/a.png""#));
    }

    #[test]
    fn test_directory_url_windows_style() {
        assert_eq!(
            directory_url(Path::new("C:\\Users\\me\\docs")),
            "file:///C:/Users/me/docs/"
        );
    }

    #[test]
    fn test_title_is_escaped() {
        let html = build_print_page("", "<script>.md", None);
        assert!(html.contains("<title>&lt;script&gt;.md</title>"));
    }

    #[test]
    fn test_write_print_page() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("print");
        let path = write_print_page(&out, "# Notes", "notes.md", None).unwrap();

        assert_eq!(path, out.join("notes.html"));
        assert!(fs::read_to_string(&path).unwrap().contains("<h1>Notes</h1>"));
    }
}
