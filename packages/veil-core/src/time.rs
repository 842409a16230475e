//! Time utilities.
//!
//! Package and key export timestamps use ISO-8601 in UTC with millisecond
//! precision and a `Z` suffix (`2024-05-01T10:00:00.000Z`).

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};

/// Returns the current time in UTC, truncated to milliseconds.
///
/// Truncating up front keeps a value equal to itself after a trip through
/// [`to_iso8601`] and [`parse_iso8601`].
pub fn now_utc() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Formats a timestamp as millisecond-precision ISO-8601.
pub fn to_iso8601(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Returns the current time as millisecond-precision ISO-8601.
pub fn now_iso8601() -> String {
    to_iso8601(&now_utc())
}

/// Parses an ISO-8601 / RFC 3339 timestamp into UTC.
pub fn parse_iso8601(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|at| at.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso8601_has_millis_and_z_suffix() {
        let at = parse_iso8601("2024-05-01T10:00:00Z").unwrap();
        assert_eq!(to_iso8601(&at), "2024-05-01T10:00:00.000Z");
    }

    #[test]
    fn test_now_survives_formatting() {
        let now = now_utc();
        assert_eq!(parse_iso8601(&to_iso8601(&now)), Some(now));
    }

    #[test]
    fn test_parse_accepts_offsets() {
        let at = parse_iso8601("2024-05-01T12:00:00.250+02:00").unwrap();
        assert_eq!(to_iso8601(&at), "2024-05-01T10:00:00.250Z");
        assert!(parse_iso8601("yesterday").is_none());
    }
}
