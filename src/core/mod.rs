//! Core logger types and traits

pub mod appender;
pub mod clock;
pub mod config;
pub mod error;
pub mod format;
pub mod log_event;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod queue;
pub mod stopwatch;
pub mod termination;
pub mod thread_label;
mod worker;

pub use appender::Appender;
pub use clock::{Clock, FixedClock, SystemClock, WallTime};
pub use config::{ColorMode, LoggerConfig, DEFAULT_FORMAT};
pub use error::{LoggerError, Result};
pub use format::{render, strip_ansi, FormatState, RenderContext};
pub use log_event::{thread_identity, LogEvent, SourceLocation};
pub use log_level::{LogLevel, STATIC_MIN_LEVEL};
pub use logger::{Logger, LoggerBuilder, BANNER_SEPARATOR};
pub use metrics::LoggerMetrics;
pub use queue::{EventQueue, QueueItem};
pub use stopwatch::{DurationPrecision, Stopwatch};
pub use termination::TerminationGuard;
pub use thread_label::{LabelAudit, ThreadLabelRegistry};
pub use worker::WORKER_THREAD_NAME;
