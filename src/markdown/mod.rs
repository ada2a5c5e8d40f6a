//! Markdown rendering module
//!
//! This module turns markdown text into a display tree using the comrak
//! library (CommonMark + GFM), resolves image references against the
//! document's directory, and highlights code blocks with syntect.
//!
//! # Example
//! ```ignore
//! use crate::markdown::render;
//!
//! let tree = render("# Hello\n\n![logo](./logo.png)", Some(Path::new("/docs")));
//! assert_eq!(tree.root.children.len(), 2);
//! ```

mod render;
pub mod syntax;

pub use render::*;
