//! File appender implementation

use crate::core::{strip_ansi, Appender, LogLevel, LoggerError, Result};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub struct FileAppender {
    writer: BufWriter<File>,
    path: PathBuf,
    strip_colors: bool,
}

impl FileAppender {
    /// Open `path` for appending, creating it if needed
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open(path, true)
    }

    /// Open `path` in append mode or truncate it
    pub fn open(path: impl Into<PathBuf>, append: bool) -> Result<Self> {
        let path = path.into();
        let mut options = OpenOptions::new();
        options.create(true);
        if append {
            options.append(true);
        } else {
            options.write(true).truncate(true);
        }
        let file = options
            .open(&path)
            .map_err(|e| LoggerError::file_open(path.display().to_string(), e))?;

        Ok(Self {
            writer: BufWriter::new(file),
            path,
            strip_colors: false,
        })
    }

    /// Remove ANSI color escapes before writing
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use rust_async_logger::appenders::FileAppender;
    ///
    /// let appender = FileAppender::new("/var/log/app.log")
    ///     .unwrap()
    ///     .with_strip_colors(true);
    /// ```
    #[must_use]
    pub fn with_strip_colors(mut self, strip_colors: bool) -> Self {
        self.strip_colors = strip_colors;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Appender for FileAppender {
    fn write(&mut self, _level: Option<LogLevel>, text: &str) -> Result<()> {
        if self.strip_colors {
            self.writer.write_all(strip_ansi(text).as_bytes())?;
        } else {
            self.writer.write_all(text.as_bytes())?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

impl Drop for FileAppender {
    fn drop(&mut self) {
        // Ensure all buffered data is flushed to disk
        let _ = self.flush();
    }
}
