//! Error types for Nugget Extract
//!
//! This module defines all custom error types used throughout the crate.
//! Error types are organized by category: contract errors raised when a
//! tokenizer is built, skippable per-file errors, scan-level errors, and
//! configuration errors.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type encompassing all error categories
#[derive(Error, Debug)]
pub enum AppError {
    /// Tokenizer construction errors
    #[error(transparent)]
    Nugget(#[from] NuggetError),

    /// File I/O related errors
    #[error(transparent)]
    FileIO(#[from] FileError),

    /// Source tree scan errors
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Invalid nugget token configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NuggetError {
    /// A token was configured as the empty string
    #[error("Nugget {which} token must not be empty")]
    EmptyToken { which: &'static str },

    /// Begin and end tokens are identical
    #[error("Nugget begin and end tokens must differ (both are {token:?})")]
    AmbiguousTokens { token: String },
}

/// File related errors; the scanner logs these and moves on
#[derive(Error, Debug)]
pub enum FileError {
    /// File not found at specified path
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Path exceeds the configured maximum length
    #[error("Path too long to process ({len} > {max}): {path}")]
    PathTooLong { path: PathBuf, len: usize, max: usize },

    /// File is too large to parse
    #[error("File too large: {path} ({size} bytes, max {max_size} bytes)")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// Error reading file
    #[error("Could not read file: {path}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error walking a directory
    #[error("Could not read directory entry under {root}: {message}")]
    WalkError { root: PathBuf, message: String },
}

/// Source tree scan errors
#[derive(Error, Debug)]
pub enum ScanError {
    /// A configured scan root does not exist or is not a directory
    #[error("Scan root not found: {0}")]
    RootNotFound(PathBuf),

    /// Token set from settings is invalid
    #[error("Invalid nugget tokens: {0}")]
    InvalidTokens(#[from] NuggetError),

    /// Background scan task failed to complete
    #[error("Scan task failed: {0}")]
    TaskFailed(String),
}

/// Configuration related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error loading configuration file
    #[error("Could not load configuration from {path}")]
    LoadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing configuration
    #[error("Invalid configuration format: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Invalid configuration value
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

/// Result type alias for operations that can fail with AppError
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for tokenizer construction
pub type NuggetResult<T> = Result<T, NuggetError>;

/// Result type alias for file operations
pub type FileResult<T> = Result<T, FileError>;

/// Result type alias for scans
pub type ScanResult<T> = Result<T, ScanError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_error_display() {
        let err = FileError::NotFound(PathBuf::from("/test/file.cshtml"));
        assert!(err.to_string().contains("/test/file.cshtml"));
    }

    #[test]
    fn test_path_too_long_display() {
        let err = FileError::PathTooLong {
            path: PathBuf::from("/deep/path"),
            len: 300,
            max: 260,
        };
        let msg = err.to_string();
        assert!(msg.contains("300"));
        assert!(msg.contains("260"));
    }

    #[test]
    fn test_app_error_from_nugget_error() {
        let err: AppError = NuggetError::EmptyToken { which: "begin" }.into();
        assert!(matches!(err, AppError::Nugget(_)));
        assert!(err.to_string().contains("begin"));
    }

    #[test]
    fn test_scan_error_from_nugget_error() {
        let err: ScanError = NuggetError::AmbiguousTokens {
            token: "##".to_string(),
        }
        .into();
        assert!(matches!(err, ScanError::InvalidTokens(_)));
    }
}
