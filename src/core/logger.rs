//! Logger handle, lifecycle and builder
//!
//! [`Logger`] is a cheap, clonable handle. Producers build an event and
//! enqueue it; the worker renders and writes. Lifecycle:
//!
//! ```text
//! Uninitialized --init--> Running --shutdown--> ShutDown --init--> Running ...
//! ```
//!
//! Calling `init` while running and calling `shutdown` on a logger that was
//! never initialized are programming errors and panic. Logging outside the
//! running state is reported on stderr and the event is dropped.

use super::{
    appender::Appender,
    clock::{Clock, SystemClock},
    config::{ColorMode, LoggerConfig},
    error::{LoggerError, Result},
    format::FormatState,
    log_event::{LogEvent, SourceLocation},
    log_level::LogLevel,
    metrics::LoggerMetrics,
    queue::QueueItem,
    termination::TerminationGuard,
    worker::{self, Shared},
};
use crate::appenders::{ConsoleAppender, FileAppender};
use parking_lot::{Mutex, RwLock};
use std::fmt::Write as _;
use std::panic::Location;
use std::path::PathBuf;
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle, ThreadId};

/// Line that closes the start-up banner and separates appended sessions
pub const BANNER_SEPARATOR: &str =
    "=============================================================================";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LifecycleState {
    Uninitialized,
    Running,
    ShutDown,
}

enum StopOutcome {
    Stopped,
    AlreadyStopped,
    NeverInitialized,
}

struct Lifecycle {
    state: LifecycleState,
    worker: Option<JoinHandle<()>>,
    /// Extra appenders handed to the worker at the next `init`
    pending_appenders: Vec<Box<dyn Appender>>,
    config: Option<LoggerConfig>,
}

pub(crate) struct LoggerInner {
    shared: Arc<Shared>,
    lifecycle: Mutex<Lifecycle>,
    min_level: RwLock<LogLevel>,
}

impl LoggerInner {
    /// Close the queue, let the worker drain, join it.
    pub(crate) fn stop(&self) -> bool {
        matches!(self.stop_with_outcome(), StopOutcome::Stopped)
    }

    fn stop_with_outcome(&self) -> StopOutcome {
        let mut lifecycle = self.lifecycle.lock();
        match lifecycle.state {
            LifecycleState::Uninitialized => return StopOutcome::NeverInitialized,
            LifecycleState::ShutDown => return StopOutcome::AlreadyStopped,
            LifecycleState::Running => {}
        }

        self.shared.queue.close();
        if let Some(handle) = lifecycle.worker.take() {
            if let Err(e) = handle.join() {
                eprintln!("[LOGGER ERROR] Worker thread panicked during shutdown: {:?}", e);
            }
        }
        lifecycle.state = LifecycleState::ShutDown;
        StopOutcome::Stopped
    }
}

impl Drop for LoggerInner {
    fn drop(&mut self) {
        self.stop();

        let dropped = self.shared.metrics.dropped_count();
        if dropped > 0 {
            eprintln!(
                "[LOGGER WARNING] Logger dropped {} events while not running",
                dropped
            );
        }
    }
}

/// Asynchronous logger handle
///
/// # Example
///
/// ```no_run
/// use rust_async_logger::prelude::*;
/// use rust_async_logger::info;
///
/// # fn main() -> rust_async_logger::Result<()> {
/// let logger = Logger::new();
/// logger.init(LoggerConfig::new("[$T $L] $C$Z"))?;
///
/// info!(logger, "listening on port {}", 8080);
/// logger.set_format("$L: $C$Z");
/// info!(logger, "same stream, new layout");
///
/// logger.shutdown();
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
}

impl Logger {
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Logger whose `$T`, `$D`... read `clock` instead of the system time
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(LoggerInner {
                shared: Arc::new(Shared::new(clock)),
                lifecycle: Mutex::new(Lifecycle {
                    state: LifecycleState::Uninitialized,
                    worker: None,
                    pending_appenders: Vec::new(),
                    config: None,
                }),
                min_level: RwLock::new(LogLevel::Trace),
            }),
        }
    }

    /// Create a builder for configuring and starting a logger
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Start the logger: create the log directory, open the file, write the
    /// banner and start the worker.
    ///
    /// # Errors
    ///
    /// Invalid configuration, directory creation, file open and thread
    /// spawn failures. The logger stays stopped in that case.
    ///
    /// # Panics
    ///
    /// If the logger is already running.
    #[track_caller]
    pub fn init(&self, config: LoggerConfig) -> Result<()> {
        let mut lifecycle = self.inner.lifecycle.lock();
        if lifecycle.state == LifecycleState::Running {
            panic!("{}", LoggerError::AlreadyInitialized);
        }

        config.validate()?;

        if !config.log_dir.is_dir() {
            std::fs::create_dir_all(&config.log_dir).map_err(|e| {
                LoggerError::directory(config.log_dir.display().to_string(), e)
            })?;
        }

        let mut file = FileAppender::open(config.log_file_path(), config.append)?
            .with_strip_colors(config.strip_file_colors);
        file.write(None, &banner(&config))?;
        file.flush()?;

        let mut appenders: Vec<Box<dyn Appender>> = vec![Box::new(file)];
        if config.log_to_console {
            appenders.push(Box::new(ConsoleAppender::new()));
        }
        appenders.append(&mut lifecycle.pending_appenders);

        let shared = &self.inner.shared;
        {
            let mut text = shared.text.lock();
            text.format = FormatState::new(config.format.clone());
            text.colorize = config.color.enabled();
            text.project_root = config.project_root_marker.clone();
        }
        *self.inner.min_level.write() = config.min_level;

        // The worker exits on a closed, empty queue, so open first.
        shared.queue.open();
        let handle = match worker::spawn(Arc::clone(shared), appenders) {
            Ok(handle) => handle,
            Err(e) => {
                shared.queue.close();
                for _ in 0..shared.queue.clear() {
                    shared.metrics.record_dropped();
                }
                return Err(e);
            }
        };

        lifecycle.worker = Some(handle);
        lifecycle.config = Some(config);
        lifecycle.state = LifecycleState::Running;
        Ok(())
    }

    /// Stop accepting events, drain the queue, flush and join the worker.
    ///
    /// Calling it again after a shutdown does nothing.
    ///
    /// # Panics
    ///
    /// If the logger was never initialized.
    #[track_caller]
    pub fn shutdown(&self) {
        if let StopOutcome::NeverInitialized = self.inner.stop_with_outcome() {
            panic!("{}", LoggerError::NotInitialized);
        }
    }

    pub fn is_initialized(&self) -> bool {
        !self.inner.shared.queue.is_closed()
    }

    /// Whether an event at `level` would be queued right now.
    ///
    /// `Error` and `Fatal` always pass.
    #[inline]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level.is_always_enabled()
            || (level.is_statically_enabled() && level >= *self.inner.min_level.read())
    }

    pub fn min_level(&self) -> LogLevel {
        *self.inner.min_level.read()
    }

    pub fn set_min_level(&self, level: LogLevel) {
        *self.inner.min_level.write() = level;
    }

    /// Queue an event from the calling thread
    pub fn log(&self, level: LogLevel, location: SourceLocation, message: impl Into<String>) {
        self.log_from(level, location, thread::current().id(), message);
    }

    /// Queue an event attributed to `thread`
    pub fn log_from(
        &self,
        level: LogLevel,
        location: SourceLocation,
        thread: ThreadId,
        message: impl Into<String>,
    ) {
        if !self.enabled(level) {
            return;
        }

        let message = message.into();
        if message.is_empty() {
            self.inner.shared.metrics.record_filtered();
            return;
        }

        let event = LogEvent::from_thread(level, location, thread, message);
        match self.inner.shared.queue.push(QueueItem::Log(event)) {
            Ok(()) => {
                self.inner.shared.metrics.record_enqueued();
            }
            Err(_) => {
                eprintln!(
                    "[LOGGER ERROR] {} (event from {}:{} dropped)",
                    LoggerError::NotInitialized,
                    location.file,
                    location.line
                );
                self.inner.shared.metrics.record_dropped();
            }
        }
    }

    #[track_caller]
    fn enqueue_control(&self, item: QueueItem) {
        if self.inner.shared.queue.push(item).is_err() {
            let caller = Location::caller();
            eprintln!(
                "[LOGGER ERROR] {} (called at {}:{})",
                LoggerError::NotInitialized,
                caller.file(),
                caller.line()
            );
            self.inner.shared.metrics.record_dropped();
        }
    }

    /// Switch format for every event enqueued after this call
    #[track_caller]
    pub fn set_format(&self, format: impl Into<String>) {
        self.enqueue_control(QueueItem::UpdateFormat(format.into()));
    }

    /// Swap back to the format that was active before the last change.
    /// A second call swaps forward again.
    #[track_caller]
    pub fn use_previous_format(&self) {
        self.enqueue_control(QueueItem::RevertFormat);
    }

    /// Format the worker is rendering with now. Changes still in the queue
    /// are not reflected yet.
    pub fn get_format(&self) -> String {
        self.inner.shared.text.lock().format.current().to_string()
    }

    /// Label the calling thread for `$Q`
    #[track_caller]
    pub fn register_label(&self, label: impl Into<String>) {
        self.register_label_for(label, thread::current().id());
    }

    #[track_caller]
    pub fn register_label_for(&self, label: impl Into<String>, thread: ThreadId) {
        self.enqueue_control(QueueItem::RegisterLabel {
            thread,
            label: label.into(),
        });
    }

    #[track_caller]
    pub fn unregister_label(&self) {
        self.unregister_label_for(thread::current().id());
    }

    #[track_caller]
    pub fn unregister_label_for(&self, thread: ThreadId) {
        self.enqueue_control(QueueItem::UnregisterLabel { thread });
    }

    /// Attach an extra output. It is handed to the worker at the next `init`.
    pub fn add_appender(&self, appender: Box<dyn Appender>) {
        let mut lifecycle = self.inner.lifecycle.lock();
        if lifecycle.state == LifecycleState::Running {
            eprintln!(
                "[LOGGER WARNING] Appender '{}' added while running; it is used from the next init",
                appender.name()
            );
        }
        lifecycle.pending_appenders.push(appender);
    }

    /// Configuration of the current (or last) run
    pub fn config(&self) -> Option<LoggerConfig> {
        self.inner.lifecycle.lock().config.clone()
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.inner.shared.metrics
    }

    /// Flush queued events if the process receives a terminating signal.
    ///
    /// # Errors
    ///
    /// [`LoggerError::GuardAlreadyInstalled`] if another guard is alive, or
    /// the OS error from changing a signal disposition.
    pub fn install_termination_guard(&self) -> Result<TerminationGuard> {
        TerminationGuard::install(self)
    }

    pub(crate) fn downgrade(&self) -> Weak<LoggerInner> {
        Arc::downgrade(&self.inner)
    }

    /// File and line come from the caller. The function name cannot be
    /// recovered here, so `$F` and `$P` render as empty text.
    #[track_caller]
    fn log_here(&self, level: LogLevel, message: impl Into<String>) {
        let caller = Location::caller();
        self.log(
            level,
            SourceLocation::new(caller.file(), "", caller.line()),
            message,
        );
    }

    /// Log at Trace from the calling file and line.
    ///
    /// The method API does not know the enclosing function: `$F` and `$P`
    /// render empty. Use [`trace!`](crate::trace) and the other macros when
    /// the format prints the function.
    #[inline]
    #[track_caller]
    pub fn trace(&self, message: impl Into<String>) {
        self.log_here(LogLevel::Trace, message);
    }

    /// Log at Debug. `$F`/`$P` render empty; see [`Logger::trace`].
    #[inline]
    #[track_caller]
    pub fn debug(&self, message: impl Into<String>) {
        self.log_here(LogLevel::Debug, message);
    }

    /// Log at Info. `$F`/`$P` render empty; see [`Logger::trace`].
    #[inline]
    #[track_caller]
    pub fn info(&self, message: impl Into<String>) {
        self.log_here(LogLevel::Info, message);
    }

    /// Log at Warn. `$F`/`$P` render empty; see [`Logger::trace`].
    #[inline]
    #[track_caller]
    pub fn warn(&self, message: impl Into<String>) {
        self.log_here(LogLevel::Warn, message);
    }

    /// Log at Error. `$F`/`$P` render empty; see [`Logger::trace`].
    #[inline]
    #[track_caller]
    pub fn error(&self, message: impl Into<String>) {
        self.log_here(LogLevel::Error, message);
    }

    /// Log at Fatal. `$F`/`$P` render empty; see [`Logger::trace`].
    #[inline]
    #[track_caller]
    pub fn fatal(&self, message: impl Into<String>) {
        self.log_here(LogLevel::Fatal, message);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

fn banner(config: &LoggerConfig) -> String {
    let mut banner = String::new();
    if config.append {
        banner.push('\n');
        banner.push_str(BANNER_SEPARATOR);
        banner.push('\n');
    }

    let floor = config.effective_min_level();
    let levels: Vec<&str> = LogLevel::ALL
        .iter()
        .rev()
        .filter(|level| **level >= floor)
        .map(|level| level.title())
        .collect();

    // Writing into a String cannot fail
    let _ = writeln!(
        banner,
        "Log initialized at [{}]",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(banner, "Initial log format: '{}'", config.format);
    let _ = writeln!(banner, "Enabled log levels: {}", levels.join(" + "));
    banner.push_str(BANNER_SEPARATOR);
    banner.push('\n');
    banner
}

/// Builder for configuring and starting a [`Logger`]
///
/// # Example
///
/// ```no_run
/// use rust_async_logger::prelude::*;
///
/// # fn main() -> rust_async_logger::Result<()> {
/// let logger = Logger::builder()
///     .log_dir("/var/log/myapp")
///     .file_name("myapp.log")
///     .append(true)
///     .min_level(LogLevel::Debug)
///     .log_to_console(true)
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct LoggerBuilder {
    config: LoggerConfig,
    appenders: Vec<Box<dyn Appender>>,
    clock: Option<Arc<dyn Clock>>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            config: LoggerConfig::default(),
            appenders: Vec::new(),
            clock: None,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.config.format = format.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn log_to_console(mut self, enabled: bool) -> Self {
        self.config.log_to_console = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.log_dir = dir.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.config.file_name = name.into();
        self
    }

    /// Keep existing file content instead of truncating
    #[must_use = "builder methods return a new value"]
    pub fn append(mut self, append: bool) -> Self {
        self.config.append = append;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.config.min_level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn color(mut self, mode: ColorMode) -> Self {
        self.config.color = mode;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn project_root_marker(mut self, marker: impl Into<String>) -> Self {
        self.config.project_root_marker = Some(marker.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn strip_file_colors(mut self, strip: bool) -> Self {
        self.config.strip_file_colors = strip;
        self
    }

    /// Replace every setting at once
    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: LoggerConfig) -> Self {
        self.config = config;
        self
    }

    /// Add an appender next to the log file
    #[must_use = "builder methods return a new value"]
    pub fn appender<A: Appender + 'static>(mut self, appender: A) -> Self {
        self.appenders.push(Box::new(appender));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Build and initialize the logger
    pub fn build(self) -> Result<Logger> {
        let logger = match self.clock {
            Some(clock) => Logger::with_clock(clock),
            None => Logger::new(),
        };
        for appender in self.appenders {
            logger.add_appender(appender);
        }
        logger.init(self.config)?;
        Ok(logger)
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::{FixedClock, WallTime};
    use tempfile::TempDir;

    const HERE: SourceLocation = SourceLocation::new("logger.rs", "tests::run", 7);

    fn config_in(dir: &TempDir, format: &str) -> LoggerConfig {
        let mut config = LoggerConfig::new(format);
        config.log_dir = dir.path().to_path_buf();
        config.file_name = "test.log".to_string();
        config.color = ColorMode::Never;
        config
    }

    fn body(dir: &TempDir) -> Vec<String> {
        let content = std::fs::read_to_string(dir.path().join("test.log")).unwrap();
        let start = content.rfind(BANNER_SEPARATOR).unwrap() + BANNER_SEPARATOR.len() + 1;
        content[start..].lines().map(str::to_string).collect()
    }

    #[test]
    fn test_logs_reach_file_in_order() {
        let dir = TempDir::new().unwrap();
        let logger = Logger::new();
        logger.init(config_in(&dir, "$L $C$Z")).unwrap();

        logger.log(LogLevel::Info, HERE, "one");
        logger.log(LogLevel::Warn, HERE, "two");
        logger.shutdown();

        assert_eq!(body(&dir), vec!["INFO one", "WARN two"]);
        assert_eq!(logger.metrics().written_count(), 2);
    }

    #[test]
    fn test_log_before_init_is_dropped() {
        let logger = Logger::new();
        logger.log(LogLevel::Info, HERE, "nobody listens");
        assert_eq!(logger.metrics().dropped_count(), 1);
        assert!(!logger.is_initialized());
    }

    #[test]
    fn test_empty_message_is_filtered() {
        let dir = TempDir::new().unwrap();
        let logger = Logger::new();
        logger.init(config_in(&dir, "$C$Z")).unwrap();
        logger.log(LogLevel::Info, HERE, "");
        logger.shutdown();

        assert!(body(&dir).is_empty());
        assert_eq!(logger.metrics().filtered_count(), 1);
    }

    #[test]
    #[should_panic(expected = "initialize the logging system multiple times")]
    fn test_double_init_panics() {
        let dir = TempDir::new().unwrap();
        let logger = Logger::new();
        logger.init(config_in(&dir, "$C$Z")).unwrap();
        let _ = logger.init(config_in(&dir, "$C$Z"));
    }

    #[test]
    #[should_panic(expected = "used before it was initialized")]
    fn test_shutdown_without_init_panics() {
        Logger::new().shutdown();
    }

    #[test]
    fn test_shutdown_twice_is_benign() {
        let dir = TempDir::new().unwrap();
        let logger = Logger::new();
        logger.init(config_in(&dir, "$C$Z")).unwrap();
        logger.shutdown();
        logger.shutdown();
        assert!(!logger.is_initialized());
    }

    #[test]
    fn test_reinit_after_shutdown() {
        let dir = TempDir::new().unwrap();
        let logger = Logger::new();
        logger.init(config_in(&dir, "$C$Z")).unwrap();
        logger.shutdown();

        let mut config = config_in(&dir, "again $C$Z");
        config.append = true;
        logger.init(config).unwrap();
        logger.log(LogLevel::Info, HERE, "second run");
        logger.shutdown();

        assert_eq!(body(&dir), vec!["again second run"]);
    }

    #[test]
    fn test_min_level_filters_but_not_errors() {
        let dir = TempDir::new().unwrap();
        let mut config = config_in(&dir, "$L$Z");
        config.min_level = LogLevel::Fatal;
        let logger = Logger::new();
        logger.init(config).unwrap();

        assert!(!logger.enabled(LogLevel::Warn));
        assert!(logger.enabled(LogLevel::Error));
        logger.log(LogLevel::Info, HERE, "hidden");
        logger.log(LogLevel::Error, HERE, "shown");
        logger.shutdown();

        assert_eq!(body(&dir), vec!["ERROR"]);
    }

    #[test]
    fn test_fixed_clock_is_used_for_rendering() {
        let dir = TempDir::new().unwrap();
        let clock = FixedClock(WallTime {
            year: 2024,
            month: 3,
            day: 9,
            day_of_week: 6,
            hour: 8,
            minute: 5,
            second: 1,
            millisecond: 42,
        });
        let logger = Logger::with_clock(Arc::new(clock));
        logger.init(config_in(&dir, "$N $T.$J $C$Z")).unwrap();
        logger.log(LogLevel::Info, HERE, "tick");
        logger.shutdown();

        assert_eq!(body(&dir), vec!["2024/03/09 08:05:01.042 tick"]);
    }

    #[test]
    fn test_methods_leave_function_empty() {
        let dir = TempDir::new().unwrap();
        let logger = Logger::new();
        logger.init(config_in(&dir, "[$F|$P] $I:$G $C$Z")).unwrap();

        let line = line!() + 1;
        logger.warn("via method");
        crate::warn!(logger, "via macro");
        logger.shutdown();

        let lines = body(&dir);
        assert_eq!(lines[0], format!("[|] logger.rs:{} via method", line));
        assert!(lines[1].starts_with(
            "[rust_async_logger::core::logger::tests::test_methods_leave_function_empty|test_methods_leave_function_empty] logger.rs:"
        ));
    }

    #[test]
    fn test_banner_lists_enabled_levels() {
        let mut config = LoggerConfig::new("$C$Z");
        config.min_level = LogLevel::Info;
        let banner = banner(&config);
        assert!(banner.starts_with("Log initialized at ["));
        assert!(banner.contains("Initial log format: '$C$Z'"));
        assert!(banner.contains("Enabled log levels: Fatal + Error + Warn + Info\n"));
        assert!(banner.ends_with(&format!("{}\n", BANNER_SEPARATOR)));
    }

    #[test]
    fn test_banner_separator_in_append_mode() {
        let mut config = LoggerConfig::new("$C$Z");
        config.append = true;
        assert!(banner(&config).starts_with(&format!("\n{}\nLog initialized", BANNER_SEPARATOR)));
    }

    #[test]
    fn test_invalid_config_leaves_logger_stopped() {
        let logger = Logger::new();
        let mut config = LoggerConfig::default();
        config.file_name = String::new();
        assert!(logger.init(config).is_err());
        assert!(!logger.is_initialized());
    }

    #[test]
    fn test_builder() {
        let dir = TempDir::new().unwrap();
        let logger = Logger::builder()
            .log_dir(dir.path())
            .file_name("test.log")
            .format("$L|$C$Z")
            .color(ColorMode::Never)
            .build()
            .unwrap();

        assert!(logger.is_initialized());
        assert_eq!(logger.get_format(), "$L|$C$Z");
        logger.log(LogLevel::Debug, HERE, "built");
        logger.shutdown();

        assert_eq!(body(&dir), vec!["DEBUG|built"]);
    }
}
