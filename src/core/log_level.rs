//! Log level definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub enum LogLevel {
    #[default]
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
}

/// Lowest level compiled into call sites, selected by the `max-level-*` features.
pub const STATIC_MIN_LEVEL: LogLevel = if cfg!(feature = "max-level-error") {
    LogLevel::Error
} else if cfg!(feature = "max-level-warn") {
    LogLevel::Warn
} else if cfg!(feature = "max-level-info") {
    LogLevel::Info
} else if cfg!(feature = "max-level-debug") {
    LogLevel::Debug
} else {
    LogLevel::Trace
};

const ANSI_RESET: &str = "\x1b[0m";

impl LogLevel {
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }

    /// Capitalized name used in the init banner
    pub fn title(&self) -> &'static str {
        match self {
            LogLevel::Trace => "Trace",
            LogLevel::Debug => "Debug",
            LogLevel::Info => "Info",
            LogLevel::Warn => "Warn",
            LogLevel::Error => "Error",
            LogLevel::Fatal => "Fatal",
        }
    }

    /// Error and Fatal can never be filtered out.
    #[inline]
    pub fn is_always_enabled(&self) -> bool {
        *self >= LogLevel::Error
    }

    /// Whether the static cutoff lets this level through.
    #[inline]
    pub const fn is_statically_enabled(self) -> bool {
        self as u8 >= LogLevel::Error as u8 || self as u8 >= STATIC_MIN_LEVEL as u8
    }

    /// 4-letter names get one padding space so columns line up with 5-letter names.
    #[inline]
    pub fn needs_alignment(&self) -> bool {
        matches!(self, LogLevel::Info | LogLevel::Warn)
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            LogLevel::Trace => BrightBlack,
            LogLevel::Debug => BrightBlue,
            LogLevel::Info => BrightGreen,
            LogLevel::Warn => Yellow,
            LogLevel::Error => Red,
            LogLevel::Fatal => Black,
        }
    }

    #[cfg(feature = "console")]
    fn background_code(&self) -> Option<colored::Color> {
        match self {
            LogLevel::Fatal => Some(colored::Color::Red),
            _ => None,
        }
    }

    /// Escape sequence that starts this level's color.
    #[cfg(feature = "console")]
    pub fn ansi_start(&self) -> String {
        let fg = format!("\x1b[{}m", self.color_code().to_fg_str());
        match self.background_code() {
            Some(bg) => format!("\x1b[{}m{}", bg.to_bg_str(), fg),
            None => fg,
        }
    }

    #[cfg(not(feature = "console"))]
    pub fn ansi_start(&self) -> String {
        String::new()
    }

    /// Escape sequence that resets any color.
    pub fn ansi_reset() -> &'static str {
        ANSI_RESET
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            "FATAL" => Ok(LogLevel::Fatal),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}
