//! Console appender implementation

use crate::core::{strip_ansi, Appender, LogLevel, Result};
use std::io::Write;

/// Mirrors rendered lines to the terminal
pub struct ConsoleAppender {
    strip_colors: bool,
}

impl ConsoleAppender {
    pub fn new() -> Self {
        Self {
            strip_colors: false,
        }
    }

    /// Keep or remove the color escapes produced by `$B`/`$E`
    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            strip_colors: !use_colors,
        }
    }
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::new()
    }
}

impl Appender for ConsoleAppender {
    fn write(&mut self, level: Option<LogLevel>, text: &str) -> Result<()> {
        let stripped;
        let output = if self.strip_colors {
            stripped = strip_ansi(text);
            stripped.as_str()
        } else {
            text
        };

        // Route Error and Fatal levels to stderr, others to stdout
        match level {
            Some(LogLevel::Error) | Some(LogLevel::Fatal) => {
                std::io::stderr().lock().write_all(output.as_bytes())?
            }
            _ => std::io::stdout().lock().write_all(output.as_bytes())?,
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        // Flush both stdout and stderr since we write to both
        std::io::stdout().flush()?;
        std::io::stderr().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
