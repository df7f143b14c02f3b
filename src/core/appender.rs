//! Appender trait for log output destinations

use super::{error::Result, log_level::LogLevel};

/// A sink for rendered text.
///
/// `level` is `None` for internal notices (banner, format changes, label
/// audit lines). Appenders are owned by the worker thread once the logger
/// is running, so implementations need no internal locking.
pub trait Appender: Send {
    fn write(&mut self, level: Option<LogLevel>, text: &str) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}
