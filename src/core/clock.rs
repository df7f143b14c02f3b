//! Wall-clock source for the format interpreter
//!
//! The worker reads the clock once per rendered event and hands the
//! decomposed value to the interpreter, so every time designator in one
//! line refers to the same instant.

use chrono::{DateTime, Datelike, Local, TimeZone, Timelike};

/// Local wall-clock time split into the fields the format designators print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WallTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    /// 0 = Sunday
    pub day_of_week: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub millisecond: u16,
}

impl WallTime {
    /// Read the current local time
    pub fn now() -> Self {
        Self::from_datetime(&Local::now())
    }

    /// Decompose any chrono datetime
    ///
    /// # Examples
    ///
    /// ```
    /// use rust_async_logger::core::WallTime;
    /// use chrono::{TimeZone, Utc};
    ///
    /// let dt = Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap();
    /// let time = WallTime::from_datetime(&dt);
    /// assert_eq!(time.year, 2025);
    /// assert_eq!(time.second, 45);
    /// ```
    pub fn from_datetime<Tz: TimeZone>(datetime: &DateTime<Tz>) -> Self {
        // Leap seconds surface as nanosecond values >= 1e9.
        let millis = (datetime.nanosecond() / 1_000_000).min(999);
        Self {
            year: datetime.year().clamp(0, u16::MAX as i32) as u16,
            month: datetime.month() as u8,
            day: datetime.day() as u8,
            day_of_week: datetime.weekday().num_days_from_sunday() as u8,
            hour: datetime.hour() as u8,
            minute: datetime.minute() as u8,
            second: datetime.second() as u8,
            millisecond: millis as u16,
        }
    }
}

/// Source of wall-clock time.
///
/// The default [`SystemClock`] reads the local time; tests inject a
/// [`FixedClock`] to make time designators deterministic.
pub trait Clock: Send + Sync {
    fn now(&self) -> WallTime;
}

/// Local system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> WallTime {
        WallTime::now()
    }
}

/// Always returns the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub WallTime);

impl Clock for FixedClock {
    fn now(&self) -> WallTime {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn fixed_datetime() -> DateTime<Utc> {
        // 2025-01-08 10:30:45.123456 UTC, a Wednesday
        Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45)
            .single()
            .expect("valid datetime")
            + chrono::Duration::microseconds(123456)
    }

    #[test]
    fn test_decompose_datetime() {
        let time = WallTime::from_datetime(&fixed_datetime());
        assert_eq!(
            time,
            WallTime {
                year: 2025,
                month: 1,
                day: 8,
                day_of_week: 3,
                hour: 10,
                minute: 30,
                second: 45,
                millisecond: 123,
            }
        );
    }

    #[test]
    fn test_fixed_clock() {
        let time = WallTime::from_datetime(&fixed_datetime());
        let clock = FixedClock(time);
        assert_eq!(clock.now(), time);
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn test_system_clock_fields_in_range() {
        let time = SystemClock.now();
        assert!((1..=12).contains(&time.month));
        assert!((1..=31).contains(&time.day));
        assert!(time.hour < 24);
        assert!(time.minute < 60);
        assert!(time.millisecond < 1000);
    }
}
