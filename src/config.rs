//! Configuration management for Nugget Extract
//!
//! Handles loading and resolving the extraction settings: nugget tokens,
//! scan roots, white/black lists and catalog key options. Settings are read
//! from JSON; every field is optional and falls back to its default.

use crate::error::{ConfigError, ConfigResult, NuggetResult};
use crate::nugget::{
    NuggetTokens, DEFAULT_BEGIN_TOKEN, DEFAULT_COMMENT_TOKEN, DEFAULT_DELIMITER_TOKEN,
    DEFAULT_END_TOKEN,
};
use crate::utils::path;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier used for the configuration directory
pub const APP_ID: &str = "nugget-extract";

/// Settings file name inside the configuration directory
pub const SETTINGS_FILE: &str = "settings.json";

/// Maximum path length before a file is skipped
#[cfg(windows)]
pub const DEFAULT_MAX_PATH_LEN: usize = 260;

/// Maximum path length before a file is skipped
#[cfg(not(windows))]
pub const DEFAULT_MAX_PATH_LEN: usize = 4096;

/// Maximum file size to parse (in bytes) - 10MB
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Extraction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub nugget_begin_token: String,
    pub nugget_end_token: String,
    pub nugget_delimiter_token: String,
    pub nugget_comment_token: String,

    /// Root that references are made relative to
    pub project_dir: Option<PathBuf>,

    /// Directories scanned recursively; relative entries resolve against `project_dir`
    pub directories_to_scan: Vec<PathBuf>,

    /// File names (`Web.config`) or extension wildcards (`*.cshtml`) to parse
    pub white_list: Vec<String>,

    /// Directory prefixes never parsed, matched case-insensitively
    pub black_list: Vec<PathBuf>,

    /// Make the nugget comment part of the catalog key
    pub message_context_enabled_from_comment: bool,

    /// Index nuggets whose msgid is empty
    pub index_empty_msgids: bool,

    pub max_path_len: usize,

    pub max_file_size: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            nugget_begin_token: DEFAULT_BEGIN_TOKEN.to_string(),
            nugget_end_token: DEFAULT_END_TOKEN.to_string(),
            nugget_delimiter_token: DEFAULT_DELIMITER_TOKEN.to_string(),
            nugget_comment_token: DEFAULT_COMMENT_TOKEN.to_string(),
            project_dir: None,
            directories_to_scan: vec![PathBuf::from(".")],
            white_list: vec!["*.cs".to_string(), "*.cshtml".to_string()],
            black_list: Vec::new(),
            message_context_enabled_from_comment: false,
            index_empty_msgids: false,
            max_path_len: DEFAULT_MAX_PATH_LEN,
            max_file_size: MAX_FILE_SIZE,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let settings = Self::from_json(&raw)?;
        log::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Parse and validate settings from a JSON string
    pub fn from_json(raw: &str) -> ConfigResult<Self> {
        let settings: Self = serde_json::from_str(raw)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Get the configuration directory path
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(APP_ID))
    }

    /// Default settings file location, if a configuration directory exists
    pub fn default_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join(SETTINGS_FILE))
    }

    /// Check values that cannot be caught by deserialization
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_path_len == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_path_len".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.directories_to_scan.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "directories_to_scan".to_string(),
                reason: "at least one directory is required".to_string(),
            });
        }
        if let Some(bad) = self.white_list.iter().find(|w| w.is_empty() || *w == "*.") {
            return Err(ConfigError::InvalidValue {
                key: "white_list".to_string(),
                reason: format!("{:?} matches nothing useful", bad),
            });
        }
        Ok(())
    }

    /// Build the validated nugget token set
    pub fn tokens(&self) -> NuggetResult<NuggetTokens> {
        NuggetTokens::new(
            self.nugget_begin_token.as_str(),
            self.nugget_end_token.as_str(),
            self.nugget_delimiter_token.as_str(),
            self.nugget_comment_token.as_str(),
        )
    }

    /// Copy with every path made absolute: `project_dir` against the current
    /// directory, scan roots and black list entries against `project_dir`.
    /// A black list entry written with a trailing separator keeps it.
    pub fn resolved(&self) -> Self {
        let project_dir = self
            .project_dir
            .as_deref()
            .map(|p| path::absolute(&path::expand_tilde(p)));
        let base = project_dir.as_deref();

        let resolve = |p: &PathBuf| path::absolute(&path::resolve_against(p, base));

        Self {
            directories_to_scan: self.directories_to_scan.iter().map(resolve).collect(),
            black_list: self
                .black_list
                .iter()
                .map(|p| {
                    if path::ends_with_separator(p) {
                        path::with_trailing_separator(resolve(p))
                    } else {
                        resolve(p)
                    }
                })
                .collect(),
            project_dir,
            ..self.clone()
        }
    }
}
