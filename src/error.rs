//! Centralized error handling for Marki Mark
//!
//! This module provides a unified error type that covers all error scenarios
//! in the application: document I/O, session persistence, and the external
//! host actions (opening URLs, printing).

use log::warn;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

// ─────────────────────────────────────────────────────────────────────────────
// Custom Result Type Alias
// ─────────────────────────────────────────────────────────────────────────────

/// A specialized `Result` type for the application.
pub type Result<T> = std::result::Result<T, Error>;

/// The centralized error type for the application.
///
/// A dismissed file dialog is not represented here: cancellation is an
/// empty selection, not a failure.
#[derive(Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────
    // Document I/O Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// The document does not exist
    NotFound { path: PathBuf },

    /// The document exists but may not be read or written
    PermissionDenied { path: PathBuf },

    /// Failed to read file contents
    FileRead { path: PathBuf, source: io::Error },

    /// Failed to write file contents
    FileWrite { path: PathBuf, source: io::Error },

    // ─────────────────────────────────────────────────────────────────────────
    // Session Store Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Failed to load the session store file
    StoreLoad {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to save the session store file
    StoreSave {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A persisted value is not valid JSON or has the wrong shape
    Parse {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration directory not found or inaccessible
    ConfigDirNotFound,

    // ─────────────────────────────────────────────────────────────────────────
    // Host Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// The system could not open an external URL or file
    Unreachable { target: String, source: io::Error },

    // ─────────────────────────────────────────────────────────────────────────
    // Application Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// An operation that needs an active tab was invoked without one
    NoActiveTab,

    /// Generic application error with a message
    Application(String),
}

impl Error {
    /// Classify an I/O error raised while reading `path`.
    pub fn from_read(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Error::NotFound {
                path: path.to_path_buf(),
            },
            io::ErrorKind::PermissionDenied => Error::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => Error::FileRead {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }

    /// Classify an I/O error raised while writing `path`.
    pub fn from_write(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => Error::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => Error::FileWrite {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Parse {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Display trait implementation for user-friendly error messages
// ─────────────────────────────────────────────────────────────────────────────
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Document I/O Errors
            Error::NotFound { path } => write!(f, "File not found: '{}'", path.display()),
            Error::PermissionDenied { path } => {
                write!(f, "Permission denied: '{}'", path.display())
            }
            Error::FileRead { path, source } => {
                write!(f, "Failed to read '{}': {}", path.display(), source)
            }
            Error::FileWrite { path, source } => {
                write!(f, "Failed to write '{}': {}", path.display(), source)
            }

            // Session Store Errors
            Error::StoreLoad { path, source } => {
                write!(
                    f,
                    "Failed to load session from '{}': {}",
                    path.display(),
                    source
                )
            }
            Error::StoreSave { path, source } => {
                write!(
                    f,
                    "Failed to save session to '{}': {}",
                    path.display(),
                    source
                )
            }
            Error::Parse { message, .. } => write!(f, "Invalid stored value: {}", message),
            Error::ConfigDirNotFound => write!(f, "Configuration directory not found"),

            // Host Errors
            Error::Unreachable { target, source } => {
                write!(f, "Could not open '{}': {}", target, source)
            }

            // Application Errors
            Error::NoActiveTab => write!(f, "No active tab"),
            Error::Application(msg) => write!(f, "{}", msg),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// std::error::Error trait implementation for error chaining
// ─────────────────────────────────────────────────────────────────────────────
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::FileRead { source, .. } => Some(source),
            Error::FileWrite { source, .. } => Some(source),
            Error::Unreachable { source, .. } => Some(source),
            Error::StoreLoad { source, .. } => Some(source.as_ref()),
            Error::StoreSave { source, .. } => Some(source.as_ref()),
            Error::Parse { source, .. } => source
                .as_ref()
                .map(|s| s.as_ref() as &(dyn std::error::Error + 'static)),
            Error::NotFound { .. }
            | Error::PermissionDenied { .. }
            | Error::ConfigDirNotFound
            | Error::NoActiveTab
            | Error::Application(_) => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Graceful Degradation Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for Result to support graceful degradation.
pub trait ResultExt<T> {
    /// If the result is an error, log it at warning level and return the provided default.
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T;
}

impl<T> ResultExt<T> for Result<T> {
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                warn!("{}: {}. Using default.", context, err);
                default
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_not_found_is_classified() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let err = Error::from_read(Path::new("/missing.md"), io_err);
        assert!(matches!(err, Error::NotFound { path } if path == Path::new("/missing.md")));
    }

    #[test]
    fn test_read_permission_denied_is_classified() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        let err = Error::from_read(Path::new("/locked.md"), io_err);
        assert!(matches!(err, Error::PermissionDenied { .. }));
    }

    #[test]
    fn test_read_other_kind_keeps_source() {
        use std::error::Error as StdError;
        let io_err = io::Error::new(io::ErrorKind::InvalidData, "not utf-8");
        let err = Error::from_read(Path::new("/binary.md"), io_err);
        assert!(matches!(err, Error::FileRead { .. }));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_write_not_found_is_generic_write_error() {
        // A missing parent directory is an I/O failure for writes, not NotFound.
        let io_err = io::Error::new(io::ErrorKind::NotFound, "no dir");
        let err = Error::from_write(Path::new("/nodir/file.md"), io_err);
        assert!(matches!(err, Error::FileWrite { .. }));
    }

    #[test]
    fn test_write_permission_denied_is_classified() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "read-only");
        let err = Error::from_write(Path::new("/ro.md"), io_err);
        assert!(matches!(err, Error::PermissionDenied { .. }));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_result: std::result::Result<Vec<String>, _> = serde_json::from_str("[oops");
        let err = Error::from(json_result.unwrap_err());
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn test_display_messages() {
        let err = Error::NotFound {
            path: PathBuf::from("/a.md"),
        };
        assert_eq!(format!("{}", err), "File not found: '/a.md'");
        assert_eq!(format!("{}", Error::NoActiveTab), "No active tab");
        assert_eq!(
            format!("{}", Error::ConfigDirNotFound),
            "Configuration directory not found"
        );
    }

    #[test]
    fn test_error_source_none_for_simple_variants() {
        use std::error::Error as StdError;
        assert!(Error::Application("test".to_string()).source().is_none());
        assert!(Error::NoActiveTab.source().is_none());
        assert!(Error::ConfigDirNotFound.source().is_none());
    }

    #[test]
    fn test_unwrap_or_warn_default_ok() {
        let result: super::Result<i32> = Ok(42);
        assert_eq!(result.unwrap_or_warn_default(0, "test context"), 42);
    }

    #[test]
    fn test_unwrap_or_warn_default_err() {
        let result: super::Result<i32> = Err(Error::Application("test".to_string()));
        assert_eq!(result.unwrap_or_warn_default(0, "test context"), 0);
    }
}
