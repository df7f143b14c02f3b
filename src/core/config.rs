//! Logger configuration
//!
//! [`LoggerConfig`] carries everything `init` needs. It can be built in
//! code, through [`crate::LoggerBuilder`], or loaded from JSON:
//!
//! ```
//! use rust_async_logger::{LoggerConfig, LogLevel};
//!
//! let config = LoggerConfig::from_json_str(r#"{
//!     "format": "[$T $L] $C$Z",
//!     "log_dir": "./logs",
//!     "file_name": "service.log",
//!     "append": true,
//!     "min_level": "Debug"
//! }"#).unwrap();
//!
//! assert_eq!(config.file_name, "service.log");
//! assert_eq!(config.min_level, LogLevel::Debug);
//! assert!(!config.log_to_console);
//! ```

use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Format used when none is configured
pub const DEFAULT_FORMAT: &str = "[$B$T:$J  $L$X  $I:$G  $Q$E] $C$Z";

/// Whether `$B`/`$E` produce escape sequences
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorMode {
    /// Colors when the terminal supports them
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    /// Resolve to a yes/no decision. Always `false` without the `console` feature.
    pub fn enabled(&self) -> bool {
        #[cfg(feature = "console")]
        {
            match self {
                ColorMode::Auto => colored::control::SHOULD_COLORIZE.should_colorize(),
                ColorMode::Always => true,
                ColorMode::Never => false,
            }
        }
        #[cfg(not(feature = "console"))]
        {
            false
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Initial format string
    pub format: String,
    /// Mirror every line to stdout/stderr
    pub log_to_console: bool,
    /// Directory holding the log file, created if missing
    pub log_dir: PathBuf,
    pub file_name: String,
    /// Append to an existing file instead of truncating it
    pub append: bool,
    /// Runtime cutoff on top of the static one
    pub min_level: LogLevel,
    pub color: ColorMode,
    /// Start of the path printed by `$K`
    pub project_root_marker: Option<String>,
    /// Remove color escapes from file output
    pub strip_file_colors: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_FORMAT.to_string(),
            log_to_console: false,
            log_dir: PathBuf::from("./logs"),
            file_name: "general.log".to_string(),
            append: false,
            min_level: LogLevel::Trace,
            color: ColorMode::Auto,
            project_root_marker: None,
            strip_file_colors: false,
        }
    }
}

impl LoggerConfig {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            ..Self::default()
        }
    }

    /// Parse and validate a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: LoggerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            LoggerError::io_operation(
                "reading logger configuration",
                path.display().to_string(),
                e,
            )
        })?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.file_name.trim().is_empty() {
            return Err(LoggerError::config("LoggerConfig", "file_name is empty"));
        }
        if self.file_name.contains(['/', '\\']) {
            return Err(LoggerError::config(
                "LoggerConfig",
                format!(
                    "file_name '{}' must not contain path separators, use log_dir",
                    self.file_name
                ),
            ));
        }
        Ok(())
    }

    /// `log_dir/file_name`
    pub fn log_file_path(&self) -> PathBuf {
        self.log_dir.join(&self.file_name)
    }

    /// Lowest level that passes both the static and the runtime cutoff
    pub fn effective_min_level(&self) -> LogLevel {
        let floor = super::log_level::STATIC_MIN_LEVEL.max(self.min_level);
        floor.min(LogLevel::Error)
    }
}
