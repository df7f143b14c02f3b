//! # Rust Async Logger
//!
//! An asynchronous, format-string driven logger. Callers enqueue events and
//! return immediately; a single background worker renders each event with
//! the format that was current when it was queued and writes it to a log
//! file (and optionally the console).
//!
//! ## Features
//!
//! - **Ordered**: one FIFO carries events and format/label changes alike
//! - **Format strings**: `$`-designators for level, time, source and thread
//! - **Thread labels**: name threads for the `$Q` designator
//! - **Static filtering**: `max-level-*` features compile out low levels
//! - **Flush on termination**: optional signal guard drains the queue
//!
//! ## Example
//!
//! ```no_run
//! use rust_async_logger::prelude::*;
//! use rust_async_logger::{info, warn};
//!
//! # fn main() -> rust_async_logger::Result<()> {
//! let logger = Logger::builder()
//!     .log_dir("./logs")
//!     .file_name("server.log")
//!     .format("[$T.$J $L$X] $C$Z")
//!     .build()?;
//!
//! logger.register_label("main");
//! info!(logger, "accepting connections");
//! warn!(logger, "slow request: {} ms", 1200);
//!
//! logger.shutdown();
//! # Ok(())
//! # }
//! ```

pub mod appenders;
pub mod core;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::{ConsoleAppender, FileAppender};
    pub use crate::core::{
        Appender, ColorMode, DurationPrecision, LogLevel, Logger, LoggerBuilder, LoggerConfig,
        LoggerError, LoggerMetrics, Result, SourceLocation, Stopwatch, TerminationGuard,
        DEFAULT_FORMAT,
    };
}

pub use appenders::{ConsoleAppender, FileAppender};
pub use crate::core::{
    Appender, Clock, ColorMode, DurationPrecision, FixedClock, LogEvent, LogLevel, Logger,
    LoggerBuilder, LoggerConfig, LoggerError, LoggerMetrics, Result, SourceLocation, Stopwatch,
    SystemClock, TerminationGuard, WallTime, DEFAULT_FORMAT,
};
