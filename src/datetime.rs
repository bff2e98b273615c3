//! Date/time display for the console.
//!
//! Timestamps are kept in UTC and converted to the configured timezone only
//! when shown to a user.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;

/// Default display format for timestamps.
pub const DEFAULT_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Format a `DateTime<Utc>` in the given timezone.
///
/// An unknown timezone name falls back to UTC.
pub fn format_utc_datetime(dt: &DateTime<Utc>, timezone: &str, format: &str) -> String {
    let tz: Tz = match timezone.parse() {
        Ok(tz) => tz,
        Err(_) => return dt.format(format).to_string(),
    };
    dt.with_timezone(&tz).format(format).to_string()
}

/// Format a timestamp with [`DEFAULT_FORMAT`] and the timezone abbreviation.
pub fn format_datetime_default(dt: &DateTime<Utc>, timezone: &str) -> String {
    format_utc_datetime(dt, timezone, "%Y-%m-%d %H:%M %Z")
}

/// Format a duration as hours and minutes, e.g. `7h 05m`.
///
/// Negative durations are shown as `0h 00m`.
pub fn format_duration(duration: Duration) -> String {
    let minutes = duration.num_minutes().max(0);
    format!("{}h {:02}m", minutes / 60, minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()
    }

    #[test]
    fn test_format_utc_datetime() {
        let result = format_utc_datetime(&sample(), "Asia/Kolkata", DEFAULT_FORMAT);
        assert_eq!(result, "2024-01-15 16:00"); // UTC+5:30
    }

    #[test]
    fn test_format_utc_datetime_utc() {
        let result = format_utc_datetime(&sample(), "UTC", DEFAULT_FORMAT);
        assert_eq!(result, "2024-01-15 10:30");
    }

    #[test]
    fn test_format_utc_datetime_invalid_timezone() {
        let result = format_utc_datetime(&sample(), "Invalid/Zone", DEFAULT_FORMAT);
        assert_eq!(result, "2024-01-15 10:30"); // Falls back to UTC
    }

    #[test]
    fn test_format_datetime_default() {
        assert_eq!(
            format_datetime_default(&sample(), "UTC"),
            "2024-01-15 10:30 UTC"
        );
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::hours(8)), "8h 00m");
        assert_eq!(
            format_duration(Duration::hours(7) + Duration::minutes(5) + Duration::seconds(59)),
            "7h 05m"
        );
        assert_eq!(format_duration(Duration::seconds(59)), "0h 00m");
        assert_eq!(format_duration(Duration::minutes(-3)), "0h 00m");
    }
}
