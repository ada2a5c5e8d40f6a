//! Document export for Marki Mark
//!
//! Printing converts the active document into a standalone HTML page and
//! hands it to the system browser's print dialog.

mod print;

pub use print::print_document;
