//! Format interpreter for log lines
//!
//! A format string is copied to the output character by character; a `$`
//! followed by a designator letter is replaced with a piece of the event or
//! of the current wall time:
//!
//! | Designator | Output |
//! |---|---|
//! | `$B` / `$E` | color start for the event's level / color reset |
//! | `$C` | message text |
//! | `$L` | level name (`TRACE` .. `FATAL`) |
//! | `$X` | one space for `INFO` and `WARN`, nothing otherwise |
//! | `$Z` | line terminator |
//! | `$Q` | thread label, or the raw thread identity |
//! | `$F` / `$P` | full function name / function name without `path::` |
//! | `$A` / `$K` / `$I` | full file path / path from the project root / file name |
//! | `$G` | line number |
//! | `$T` | `HH:MM:SS` |
//! | `$H` `$M` `$S` `$J` | hour, minute, second, millisecond |
//! | `$N` | `YYYY/MM/DD` |
//! | `$Y` `$O` `$D` | year, month, day |
//!
//! Unknown designators render as nothing. A `$` at the very end of the
//! format is copied as is.
//!
//! # Example
//!
//! ```
//! use rust_async_logger::core::{
//!     render, LogEvent, LogLevel, RenderContext, SourceLocation, ThreadLabelRegistry, WallTime,
//! };
//!
//! let labels = ThreadLabelRegistry::new();
//! let ctx = RenderContext::new(&labels);
//! let event = LogEvent::new(
//!     LogLevel::Info,
//!     SourceLocation::new("src/main.rs", "app::main", 3),
//!     "ready".to_string(),
//! );
//!
//! let line = render("[$L] $C$Z", &event, &WallTime::default(), &ctx);
//! assert_eq!(line, "[INFO] ready\n");
//! ```

use super::clock::WallTime;
use super::log_event::LogEvent;
use super::log_level::LogLevel;
use super::thread_label::ThreadLabelRegistry;
use std::fmt::Write;

/// Active and previous format strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatState {
    current: String,
    previous: String,
}

impl FormatState {
    /// Both slots start with the initial format
    pub fn new(initial: impl Into<String>) -> Self {
        let initial = initial.into();
        Self {
            previous: initial.clone(),
            current: initial,
        }
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn previous(&self) -> &str {
        &self.previous
    }

    /// Install a new format, keeping the old one for [`FormatState::revert`]
    pub fn update(&mut self, format: impl Into<String>) {
        let old = std::mem::replace(&mut self.current, format.into());
        self.previous = old;
    }

    /// Swap current and previous. Applying it twice restores the original.
    pub fn revert(&mut self) {
        std::mem::swap(&mut self.current, &mut self.previous);
    }
}

/// Everything besides the event and the time that rendering reads
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub labels: &'a ThreadLabelRegistry,
    pub colorize: bool,
    pub project_root: Option<&'a str>,
}

impl<'a> RenderContext<'a> {
    pub fn new(labels: &'a ThreadLabelRegistry) -> Self {
        Self {
            labels,
            colorize: false,
            project_root: None,
        }
    }

    #[must_use]
    pub fn with_colors(mut self, colorize: bool) -> Self {
        self.colorize = colorize;
        self
    }

    #[must_use]
    pub fn with_project_root(mut self, marker: Option<&'a str>) -> Self {
        self.project_root = marker;
        self
    }
}

/// Render one event through `format`
pub fn render(format: &str, event: &LogEvent, now: &WallTime, ctx: &RenderContext<'_>) -> String {
    let mut out = String::with_capacity(format.len() + event.message.len() + 32);
    let mut chars = format.chars();

    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(designator) => expand(&mut out, designator, event, now, ctx),
            None => out.push('$'),
        }
    }

    out
}

// Writing into a String cannot fail, so the fmt::Result values are ignored.
fn expand(out: &mut String, designator: char, event: &LogEvent, now: &WallTime, ctx: &RenderContext<'_>) {
    match designator {
        // basic info
        'B' => {
            if ctx.colorize {
                out.push_str(&event.level.ansi_start());
            }
        }
        'E' => {
            if ctx.colorize {
                out.push_str(LogLevel::ansi_reset());
            }
        }
        'C' => out.push_str(&event.message),
        'L' => out.push_str(event.level.to_str()),
        'X' => {
            if event.level.needs_alignment() {
                out.push(' ');
            }
        }
        'Z' => out.push('\n'),
        'Q' => out.push_str(&ctx.labels.display(event.thread)),

        // source
        'F' => out.push_str(event.function),
        'P' => out.push_str(short_function_name(event.function)),
        'A' => out.push_str(event.file),
        'K' => out.push_str(project_relative_path(event.file, ctx.project_root)),
        'I' => out.push_str(file_name(event.file)),
        'G' => {
            let _ = write!(out, "{}", event.line);
        }

        // time
        'T' => {
            let _ = write!(out, "{:02}:{:02}:{:02}", now.hour, now.minute, now.second);
        }
        'H' => {
            let _ = write!(out, "{:02}", now.hour);
        }
        'M' => {
            let _ = write!(out, "{:02}", now.minute);
        }
        'S' => {
            let _ = write!(out, "{:02}", now.second);
        }
        'J' => {
            let _ = write!(out, "{:03}", now.millisecond);
        }

        // date
        'N' => {
            let _ = write!(out, "{:04}/{:02}/{:02}", now.year, now.month, now.day);
        }
        'Y' => {
            let _ = write!(out, "{:04}", now.year);
        }
        'O' => {
            let _ = write!(out, "{:02}", now.month);
        }
        'D' => {
            let _ = write!(out, "{:02}", now.day);
        }

        _ => {}
    }
}

/// `app::net::connect` -> `connect`
pub fn short_function_name(function: &str) -> &str {
    match function.rfind("::") {
        Some(idx) => &function[idx + 2..],
        None => function,
    }
}

/// `/a/b/main.cpp` -> `main.cpp`; accepts both separators
pub fn file_name(path: &str) -> &str {
    match path.rfind(['/', '\\']) {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Path starting at the first occurrence of `marker`, or the full path
pub fn project_relative_path<'a>(path: &'a str, marker: Option<&str>) -> &'a str {
    match marker {
        Some(marker) if !marker.is_empty() => match path.find(marker) {
            Some(idx) => &path[idx..],
            None => path,
        },
        _ => path,
    }
}

/// Remove ANSI CSI escape sequences (`ESC [ ... final-byte`)
pub fn strip_ansi(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            // parameters and intermediates run until a byte in 0x40..=0x7E
            for c in chars.by_ref() {
                if ('\x40'..='\x7e').contains(&c) {
                    break;
                }
            }
            continue;
        }
        out.push(c);
    }

    out
}
