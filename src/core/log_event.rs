//! Log event structure

use super::log_level::LogLevel;
use std::thread::{self, ThreadId};

/// Call-site information captured by the logging macros
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: &'static str,
    pub function: &'static str,
    pub line: u32,
}

impl SourceLocation {
    pub const fn new(file: &'static str, function: &'static str, line: u32) -> Self {
        Self {
            file,
            function,
            line,
        }
    }
}

/// One unit of log data. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub level: LogLevel,
    pub file: &'static str,
    pub function: &'static str,
    pub line: u32,
    pub thread: ThreadId,
    pub message: String,
}

impl LogEvent {
    /// Event originating on the calling thread
    pub fn new(level: LogLevel, location: SourceLocation, message: String) -> Self {
        Self::from_thread(level, location, thread::current().id(), message)
    }

    pub fn from_thread(
        level: LogLevel,
        location: SourceLocation,
        thread: ThreadId,
        message: String,
    ) -> Self {
        Self {
            level,
            file: location.file,
            function: location.function,
            line: location.line,
            thread,
            message,
        }
    }

    pub fn location(&self) -> SourceLocation {
        SourceLocation::new(self.file, self.function, self.line)
    }
}

/// Raw rendering of a thread identity, used when no label is registered
pub fn thread_identity(thread: ThreadId) -> String {
    format!("{:?}", thread)
}
