//! Lightweight stopwatch used by `profile_loop!`

use std::fmt;
use std::time::{Duration, Instant};

/// Unit in which a [`Stopwatch`] reports elapsed time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DurationPrecision {
    Microseconds,
    #[default]
    Milliseconds,
    Seconds,
}

impl DurationPrecision {
    /// Unit suffix appended to a printed value
    pub fn suffix(&self) -> &'static str {
        match self {
            DurationPrecision::Microseconds => " micro-s",
            DurationPrecision::Milliseconds => " ms",
            DurationPrecision::Seconds => " s",
        }
    }

    pub fn convert(&self, duration: Duration) -> f64 {
        match self {
            DurationPrecision::Microseconds => duration.as_secs_f64() * 1_000_000.0,
            DurationPrecision::Milliseconds => duration.as_secs_f64() * 1_000.0,
            DurationPrecision::Seconds => duration.as_secs_f64(),
        }
    }
}

impl fmt::Display for DurationPrecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix().trim_start())
    }
}

/// Starts running when created.
///
/// # Example
///
/// ```
/// use rust_async_logger::{DurationPrecision, Stopwatch};
///
/// let mut watch = Stopwatch::new(DurationPrecision::Microseconds);
/// let _sum: u64 = (0..1_000).sum();
/// let elapsed = watch.stop();
///
/// assert!(elapsed >= 0.0);
/// assert_eq!(watch.result(), elapsed);
/// ```
#[derive(Debug, Clone)]
pub struct Stopwatch {
    precision: DurationPrecision,
    start: Instant,
    result: f64,
}

impl Stopwatch {
    pub fn new(precision: DurationPrecision) -> Self {
        Self {
            precision,
            start: Instant::now(),
            result: 0.0,
        }
    }

    /// Elapsed time since the (re)start, in the configured precision.
    /// Also stored and available through [`Stopwatch::result`].
    pub fn stop(&mut self) -> f64 {
        self.result = self.precision.convert(self.start.elapsed());
        self.result
    }

    pub fn restart(&mut self) {
        self.start = Instant::now();
        self.result = 0.0;
    }

    /// Value returned by the last `stop`, zero before that
    pub fn result(&self) -> f64 {
        self.result
    }

    pub fn precision(&self) -> DurationPrecision {
        self.precision
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new(DurationPrecision::default())
    }
}
