//! Unified error types for the CVU workspace.
//!
//! Parse and evaluation failures have their own enums in `cvu-lang` and
//! `cvu-expr`; this one covers the filesystem and configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum CvuError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

impl CvuError {
    /// Builds a [`CvuError::Io`] for the given path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, CvuError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_message_is_prefixed() {
        let err = CvuError::Config {
            message: "indent must not be empty".into(),
        };
        assert_eq!(err.to_string(), "invalid configuration: indent must not be empty");
    }

    #[test]
    fn io_error_includes_path() {
        let err = CvuError::io(
            "/tmp/missing.cvu",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/tmp/missing.cvu"), "got: {msg}");
    }

    #[test]
    fn serde_error_converts() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: CvuError = source.into();
        assert!(err.to_string().starts_with("serialization error"));
    }
}
