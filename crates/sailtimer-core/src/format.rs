//! Display formatting for the clock face.

use chrono::{DateTime, TimeZone};

/// `M:SS` with zero-padded seconds; minutes are not padded or capped.
pub fn time_string(total_seconds: u64) -> String {
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{}:{:02}", minutes, seconds)
}

/// Time of day as `h:mm AM`, shown while the timer is not running.
pub fn wall_clock<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%-I:%M %p").to_string()
}
