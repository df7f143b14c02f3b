//! Logging macros.
//!
//! The macros capture the call site (file, line and enclosing function) and
//! skip formatting entirely when the level is disabled, either statically
//! through a `max-level-*` feature or by the logger's runtime cutoff.
//!
//! # Examples
//!
//! ```no_run
//! use rust_async_logger::prelude::*;
//! use rust_async_logger::{debug, info};
//!
//! # fn main() -> rust_async_logger::Result<()> {
//! let logger = Logger::builder().build()?;
//!
//! info!(logger, "Server started");
//!
//! let port = 8080;
//! debug!(logger, "Server listening on port {}", port);
//! # Ok(())
//! # }
//! ```

/// Path of the enclosing function, e.g. `my_crate::server::accept`.
///
/// Closure frames are trimmed so a call inside a closure reports the
/// function that defines it.
#[macro_export]
macro_rules! function_name {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let mut name = type_name_of(f);
        name = name.strip_suffix("::f").unwrap_or(name);
        while let Some(outer) = name.strip_suffix("::{{closure}}") {
            name = outer;
        }
        name
    }};
}

/// [`SourceLocation`](crate::SourceLocation) of the macro call
#[macro_export]
macro_rules! source_location {
    () => {
        $crate::SourceLocation::new(file!(), $crate::function_name!(), line!())
    };
}

/// Log a message at an explicit level.
///
/// # Examples
///
/// ```no_run
/// # use rust_async_logger::prelude::*;
/// # let logger = Logger::new();
/// use rust_async_logger::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        let level: $crate::LogLevel = $level;
        let logger = &$logger;
        if level.is_statically_enabled() && logger.enabled(level) {
            logger.log(level, $crate::source_location!(), format!($($arg)+));
        }
    }};
}

/// Log a trace-level message.
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Trace, $($arg)+)
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message. Never compiled out.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a fatal-level message. Never compiled out.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Fatal, $($arg)+)
    };
}

/// Check an invariant.
///
/// On success a Trace line is logged. On failure the failure message is
/// logged at Fatal and the thread panics with
/// `DEBUG BREAK [file: .., function: .., line: ..] => <message>`.
///
/// ```no_run
/// # use rust_async_logger::prelude::*;
/// # let logger = Logger::new();
/// use rust_async_logger::log_assert;
/// let connections = 3;
/// log_assert!(logger, connections < 10, "pool within limits", "pool exhausted");
/// log_assert!(logger, connections > 0);
/// ```
#[macro_export]
macro_rules! log_assert {
    ($logger:expr, $cond:expr) => {{
        let logger = &$logger;
        if !($cond) {
            $crate::macros::debug_break(logger, $crate::source_location!(), stringify!($cond));
        }
    }};
    ($logger:expr, $cond:expr, $ok:expr, $fail:expr) => {{
        let logger = &$logger;
        if $cond {
            $crate::trace!(logger, "{}", $ok);
        } else {
            $crate::macros::debug_break(logger, $crate::source_location!(), $fail);
        }
    }};
}

/// Check a recoverable condition.
///
/// On success a Trace line is logged. On failure a Warn line is logged and
/// `$on_fail` runs, typically `return` or `continue`.
///
/// ```no_run
/// # use rust_async_logger::prelude::*;
/// # let logger = Logger::new();
/// use rust_async_logger::log_validate;
/// fn handle(logger: &Logger, payload: &[u8]) -> bool {
///     log_validate!(logger, !payload.is_empty(), return false);
///     true
/// }
/// ```
#[macro_export]
macro_rules! log_validate {
    ($logger:expr, $cond:expr, $on_fail:expr) => {{
        if !($cond) {
            $crate::warn!($logger, "Validation failed: {}", stringify!($cond));
            $on_fail;
        }
    }};
    ($logger:expr, $cond:expr, $on_fail:expr, $ok:expr, $fail:expr) => {{
        if $cond {
            $crate::trace!($logger, "{}", $ok);
        } else {
            $crate::warn!($logger, "{}", $fail);
            $on_fail;
        }
    }};
}

/// Run `$body` `$iterations` times and log the average duration at Trace:
/// `label [sample count: N | average duration: X ms]`.
///
/// ```no_run
/// # use rust_async_logger::prelude::*;
/// # let logger = Logger::new();
/// use rust_async_logger::profile_loop;
/// let mut total = 0u64;
/// profile_loop!(logger, 1_000, DurationPrecision::Microseconds, "summing", {
///     total += 1;
/// });
/// ```
#[macro_export]
macro_rules! profile_loop {
    ($logger:expr, $iterations:expr, $precision:expr, $label:expr, $body:block) => {{
        let iterations: usize = $iterations;
        let precision: $crate::DurationPrecision = $precision;
        let mut stopwatch = $crate::Stopwatch::new(precision);
        for _ in 0..iterations {
            $body
        }
        let total = stopwatch.stop();
        let average = if iterations == 0 { 0.0 } else { total / iterations as f64 };
        $crate::trace!(
            $logger,
            "{} [sample count: {} | average duration: {}{}]",
            $label,
            iterations,
            average,
            precision.suffix()
        );
    }};
}

/// Failure path of [`log_assert!`]
#[doc(hidden)]
#[track_caller]
pub fn debug_break(
    logger: &crate::Logger,
    location: crate::SourceLocation,
    message: impl std::fmt::Display,
) -> ! {
    let message = message.to_string();
    logger.log(crate::LogLevel::Fatal, location, message.clone());
    panic!(
        "DEBUG BREAK [file: {}, function: {}, line: {}] => {}",
        location.file, location.function, location.line, message
    );
}

#[cfg(test)]
mod tests {
    use crate::core::BANNER_SEPARATOR;
    use crate::prelude::*;
    use tempfile::TempDir;

    fn started(dir: &TempDir, format: &str) -> Logger {
        Logger::builder()
            .log_dir(dir.path())
            .file_name("macros.log")
            .format(format)
            .color(ColorMode::Never)
            .build()
            .unwrap()
    }

    fn body(dir: &TempDir) -> Vec<String> {
        let content = std::fs::read_to_string(dir.path().join("macros.log")).unwrap();
        let start = content.rfind(BANNER_SEPARATOR).unwrap() + BANNER_SEPARATOR.len() + 1;
        content[start..].lines().map(str::to_string).collect()
    }

    #[test]
    fn test_function_name() {
        assert_eq!(
            crate::function_name!(),
            "rust_async_logger::macros::tests::test_function_name"
        );
        let from_closure = (|| crate::function_name!())();
        assert_eq!(from_closure, "rust_async_logger::macros::tests::test_function_name");
    }

    #[test]
    fn test_source_location() {
        let location = crate::source_location!();
        assert_eq!(location.file, file!());
        assert!(location.function.ends_with("test_source_location"));
        assert!(location.line > 0);
    }

    #[test]
    fn test_level_macros_capture_call_site() {
        let dir = TempDir::new().unwrap();
        let logger = started(&dir, "$L $P $I $C$Z");

        crate::info!(logger, "answer is {}", 42);
        crate::error!(logger, "boom");
        logger.shutdown();

        assert_eq!(
            body(&dir),
            vec![
                "INFO test_level_macros_capture_call_site macros.rs answer is 42",
                "ERROR test_level_macros_capture_call_site macros.rs boom",
            ]
        );
    }

    #[test]
    fn test_runtime_cutoff_skips_formatting() {
        let dir = TempDir::new().unwrap();
        let logger = started(&dir, "$C$Z");
        logger.set_min_level(LogLevel::Warn);

        let mut formatted = false;
        crate::debug!(logger, "{}", {
            formatted = true;
            "hidden"
        });
        logger.shutdown();

        assert!(!formatted);
        assert!(body(&dir).is_empty());
    }

    #[test]
    fn test_log_validate_runs_on_fail() {
        let dir = TempDir::new().unwrap();
        let logger = started(&dir, "$L $C$Z");

        fn checked(logger: &Logger, value: i32) -> bool {
            crate::log_validate!(logger, value > 0, return false);
            true
        }

        assert!(!checked(&logger, -1));
        assert!(checked(&logger, 5));
        logger.shutdown();

        assert_eq!(body(&dir), vec!["WARN Validation failed: value > 0"]);
    }

    #[test]
    fn test_log_validate_with_messages() {
        let dir = TempDir::new().unwrap();
        let logger = started(&dir, "$L $C$Z");

        let mut skipped = 0;
        for value in [1, -2] {
            crate::log_validate!(logger, value > 0, skipped += 1, "positive", "negative");
        }
        logger.shutdown();

        assert_eq!(skipped, 1);
        assert_eq!(body(&dir), vec!["TRACE positive", "WARN negative"]);
    }

    #[test]
    #[should_panic(expected = "DEBUG BREAK [file: src/macros.rs, function: rust_async_logger::macros::tests::test_log_assert_failure_panics")]
    fn test_log_assert_failure_panics() {
        let dir = TempDir::new().unwrap();
        let logger = started(&dir, "$C$Z");
        let items: Vec<u8> = Vec::new();
        crate::log_assert!(logger, !items.is_empty(), "has items", "no items");
    }

    #[test]
    fn test_log_assert_success_traces() {
        let dir = TempDir::new().unwrap();
        let logger = started(&dir, "$L $C$Z");
        crate::log_assert!(logger, 1 + 1 == 2, "math works", "math is broken");
        crate::log_assert!(logger, true);
        logger.shutdown();

        assert_eq!(body(&dir), vec!["TRACE math works"]);
    }

    #[test]
    fn test_profile_loop() {
        let dir = TempDir::new().unwrap();
        let logger = started(&dir, "$C$Z");

        let mut runs = 0;
        crate::profile_loop!(logger, 25, DurationPrecision::Microseconds, "counting", {
            runs += 1;
        });
        logger.shutdown();

        assert_eq!(runs, 25);
        let lines = body(&dir);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("counting [sample count: 25 | average duration: "));
        assert!(lines[0].ends_with(" micro-s]"));
    }
}
