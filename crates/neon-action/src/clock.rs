//! Wall-clock access and spoken time/date formats.

use chrono::{Local, NaiveDateTime};

/// Source of the current local time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Reads the system's local clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always returns the same instant.
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// 12-hour time, e.g. "09:05 PM".
pub fn format_time(at: &NaiveDateTime) -> String {
    at.format("%I:%M %p").to_string()
}

/// Long date, e.g. "Thursday, October 15, 2026".
pub fn format_date(at: &NaiveDateTime) -> String {
    at.format("%A, %B %d, %Y").to_string()
}
