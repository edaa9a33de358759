//!
//! This module defines configuration structures and loading logic for tabsalvage.
//! Configuration is read from a TOML file (`.tabsalvage.toml` by default) and
//! can be overridden from the command line.

use crate::display_text::DEFAULT_SENTINEL;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

/// Default configuration file name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = ".tabsalvage.toml";

/// Number of in-block occurrences a tag candidate must have
pub const DEFAULT_REPEAT_COUNT: usize = 5;
/// Tag candidate length in characters
pub const DEFAULT_TAG_LENGTH: usize = 19;
/// Distance from the end of a tag's first occurrence to the group-name region
pub const DEFAULT_ADVANCE_AFTER_TAG: usize = 4;
/// Cap on the right-context string attached to a row
pub const DEFAULT_RIGHT_CONTEXT_MAX_CHARS: usize = 30_000;

/// Represents the complete configuration loaded from `.tabsalvage.toml`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Heuristic scan parameters
    #[serde(default)]
    pub scan: ScanConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Parameters of the byte-pattern heuristics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ScanConfig {
    /// A tag must occur exactly this many times (non-overlapping) in the block
    #[serde(default = "default_repeat_count", alias = "repeat_count")]
    pub repeat_count: usize,

    /// Tag candidate length, including the three-sentinel prefix
    #[serde(default = "default_tag_length", alias = "tag_length")]
    pub tag_length: usize,

    /// Group-name region starts this far past the end of the tag's first occurrence
    #[serde(default = "default_advance_after_tag", alias = "advance_after_tag")]
    pub advance_after_tag: usize,

    /// Visible replacement for non-printable bytes (one printable ASCII character)
    #[serde(default = "default_sentinel")]
    pub sentinel: char,
}

/// Output settings consumed by the report writers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct OutputConfig {
    /// Truncation length of the right-context column
    #[serde(default = "default_right_context_max_chars", alias = "right_context_max_chars")]
    pub right_context_max_chars: usize,

    /// Write the sentinel-substituted text of each input next to the report
    #[serde(default = "default_true", alias = "write_replaced_text")]
    pub write_replaced_text: bool,

    /// Write the Netscape bookmarks file
    #[serde(default = "default_true", alias = "write_bookmarks")]
    pub write_bookmarks: bool,
}

fn default_repeat_count() -> usize {
    DEFAULT_REPEAT_COUNT
}

fn default_tag_length() -> usize {
    DEFAULT_TAG_LENGTH
}

fn default_advance_after_tag() -> usize {
    DEFAULT_ADVANCE_AFTER_TAG
}

fn default_sentinel() -> char {
    DEFAULT_SENTINEL
}

fn default_right_context_max_chars() -> usize {
    DEFAULT_RIGHT_CONTEXT_MAX_CHARS
}

fn default_true() -> bool {
    true
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            repeat_count: DEFAULT_REPEAT_COUNT,
            tag_length: DEFAULT_TAG_LENGTH,
            advance_after_tag: DEFAULT_ADVANCE_AFTER_TAG,
            sentinel: DEFAULT_SENTINEL,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            right_context_max_chars: DEFAULT_RIGHT_CONTEXT_MAX_CHARS,
            write_replaced_text: true,
            write_bookmarks: true,
        }
    }
}

impl ScanConfig {
    /// Check the invariants the scanners rely on.
    ///
    /// The sentinel must be printable ASCII so display text stays one byte per
    /// input byte, and tags must be long enough to hold the sentinel prefix.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sentinel.is_ascii() && !self.sentinel.is_ascii_control()) {
            return Err(ConfigError::InvalidValue {
                key: "scan.sentinel".to_string(),
                message: format!("must be a single printable ASCII character, got {:?}", self.sentinel),
            });
        }
        if self.tag_length < 3 {
            return Err(ConfigError::InvalidValue {
                key: "scan.tag-length".to_string(),
                message: format!("must be at least 3, got {}", self.tag_length),
            });
        }
        if self.repeat_count == 0 {
            return Err(ConfigError::InvalidValue {
                key: "scan.repeat-count".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// The three-sentinel prefix every tag starts with
    pub fn tag_prefix(&self) -> String {
        std::iter::repeat_n(self.sentinel, 3).collect()
    }
}

impl Config {
    /// Parse configuration from TOML text and validate it.
    pub fn from_toml_str(content: &str, path: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(format!("{path}: Failed to parse TOML: {e}")))?;
        config.scan.validate()?;
        Ok(config)
    }

    /// Load configuration from an explicit file path.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let path_str = path.display().to_string();
        log::debug!("[tabsalvage-config] Loading config file: {path_str}");
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            source: e,
            path: path_str.clone(),
        })?;
        Self::from_toml_str(&content, &path_str)
    }

    /// Load configuration with discovery.
    ///
    /// An explicit path must exist. Without one, `.tabsalvage.toml` in
    /// `search_dir` is used when present, otherwise defaults apply.
    /// `skip_discovery` ignores any discovered file.
    pub fn load_with_discovery(
        config_path: Option<&str>,
        search_dir: &Path,
        skip_discovery: bool,
    ) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_file(Path::new(path));
        }
        if skip_discovery {
            log::debug!("[tabsalvage-config] Skipping auto-discovery due to --no-config flag");
            return Ok(Self::default());
        }

        let candidate = search_dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            Self::load_file(&candidate)
        } else {
            log::debug!("[tabsalvage-config] No configuration file found in {}", search_dir.display());
            Ok(Self::default())
        }
    }
}

/// Create a default configuration file at the specified path
pub fn create_default_config(path: &str) -> Result<(), ConfigError> {
    if Path::new(path).exists() {
        return Err(ConfigError::FileExists { path: path.to_string() });
    }

    let default_config = r#"# tabsalvage configuration file

[scan]
# A tag must occur exactly this many times in the tab-group block
repeat-count = 5

# Tag length in characters, including the three-sentinel prefix
tag-length = 19

# The group-name region starts this many characters after the first tag occurrence
advance-after-tag = 4

# Replacement for non-printable bytes (one printable ASCII character)
sentinel = "|"

[output]
# Truncate the URL_RightContext column to this many characters
right-context-max-chars = 30000

# Write the sentinel-substituted text of each input file
write-replaced-text = true

# Write a Netscape-format bookmarks file
write-bookmarks = true
"#;

    fs::write(path, default_config).map_err(|err| ConfigError::IoError {
        source: err,
        path: path.to_string(),
    })
}

/// Errors that can occur when loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read config file at {path}: {source}")]
    IoError { source: io::Error, path: String },

    /// Failed to parse the configuration content
    #[error("Failed to parse config: {0}")]
    ParseError(String),

    /// A value parsed but is out of range
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// Configuration file already exists
    #[error("Configuration file already exists at {path}")]
    FileExists { path: String },
}
