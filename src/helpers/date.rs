//! Date helper functions

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Display format for post dates, e.g. "January 5, 2024"
pub const LONG_DATE_FORMAT: &str = "%B %-d, %Y";

/// Resolve an IANA timezone name, falling back to UTC
pub fn site_timezone(name: &str) -> Tz {
    name.parse::<Tz>().unwrap_or_else(|_| {
        if !name.is_empty() {
            tracing::warn!("Unknown timezone {:?}, using UTC", name);
        }
        Tz::UTC
    })
}

/// Format a UTC date in the given timezone using a strftime pattern
pub fn format_date(date: &DateTime<Utc>, tz: Tz, format: &str) -> String {
    date.with_timezone(&tz).format(format).to_string()
}

/// Format date in full format (like "January 5, 2024")
pub fn full_date(date: &DateTime<Utc>, tz: Tz) -> String {
    format_date(date, tz, LONG_DATE_FORMAT)
}

/// Format a date in ISO 8601 / XML format
pub fn date_xml<Tz2: TimeZone>(date: &DateTime<Tz2>) -> String
where
    Tz2::Offset: std::fmt::Display,
{
    date.format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_date() {
        let date = Utc.with_ymd_and_hms(2024, 1, 5, 10, 30, 0).unwrap();
        assert_eq!(full_date(&date, Tz::UTC), "January 5, 2024");
    }

    #[test]
    fn test_timezone_shifts_day() {
        let date = Utc.with_ymd_and_hms(2024, 1, 5, 2, 0, 0).unwrap();
        let tz = site_timezone("America/Los_Angeles");
        assert_eq!(full_date(&date, tz), "January 4, 2024");
    }

    #[test]
    fn test_unknown_timezone_is_utc() {
        assert_eq!(site_timezone("Mars/Olympus"), Tz::UTC);
        assert_eq!(site_timezone(""), Tz::UTC);
    }

    #[test]
    fn test_date_xml() {
        let date = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(date_xml(&date), "2024-01-15T10:30:00.000+00:00");
    }
}
