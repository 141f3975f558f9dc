//! Publication date parsing.

use chrono::{DateTime, Utc};

/// RFC 1123 with a numeric zone: `Mon, 02 Jan 2006 15:04:05 -0700`.
pub const PUB_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

// `PUB_DATE_FORMAT` after the weekday prefix.
const DATE_TIME_FORMAT: &str = "%d %b %Y %H:%M:%S %z";

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Stand-in for a `pubDate` that could not be parsed.
///
/// It sorts before every real date, so an item with a broken date never wins
/// the latest-item selection against one with a valid date.
pub const UNPARSED_DATE: DateTime<Utc> = DateTime::<Utc>::MIN_UTC;

/// Parses a `pubDate` and normalizes it to UTC.
///
/// The weekday must be a day name but is not checked against the date, so
/// `Tue, 03 Jan 2024 ...` parses as 3 January.
pub fn try_parse_date(text: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    let text = text.trim();
    let parsed = match text.split_once(", ") {
        Some((day, rest)) if is_weekday(day) => DateTime::parse_from_str(rest, DATE_TIME_FORMAT),
        _ => DateTime::parse_from_str(text, PUB_DATE_FORMAT),
    };
    parsed.map(|dt| dt.with_timezone(&Utc))
}

fn is_weekday(name: &str) -> bool {
    WEEKDAYS.iter().any(|day| day.eq_ignore_ascii_case(name))
}

/// Lenient variant of [`try_parse_date`]: failures become [`UNPARSED_DATE`].
///
/// Does not log; callers that care about the failure use [`try_parse_date`]
/// and log in their own span.
pub fn parse_date(text: &str) -> DateTime<Utc> {
    try_parse_date(text).unwrap_or(UNPARSED_DATE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_date_normalizes_to_utc() {
        let parsed = parse_date("Wed, 03 Jan 2024 12:00:00 +0200");
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 3, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_date_negative_offset() {
        let parsed = parse_date("Fri, 29 Nov 2024 23:30:00 -0500");
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 11, 30, 4, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_date_tolerates_surrounding_whitespace() {
        assert_ne!(parse_date("\n  Mon, 01 Jan 2024 00:00:00 +0000  "), UNPARSED_DATE);
    }

    #[test]
    fn test_parse_date_ignores_wrong_weekday() {
        // 03 Jan 2024 was a Wednesday.
        let parsed = parse_date("Tue, 03 Jan 2024 12:00:00 +0200");
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 3, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_unparseable_date_degrades_to_sentinel() {
        for bad in [
            "",
            "yesterday",
            "2024-01-03T10:00:00Z",
            "Wed, 03 Jan 2024 12:00:00 EET",
            "Xyz, 03 Jan 2024 12:00:00 +0200",
            "03 Jan 2024 12:00:00 +0200",
        ] {
            assert!(try_parse_date(bad).is_err(), "{bad:?}");
            assert_eq!(parse_date(bad), UNPARSED_DATE);
        }
    }

    #[test]
    fn test_sentinel_sorts_before_real_dates() {
        assert!(UNPARSED_DATE < parse_date("Thu, 01 Jan 1970 00:00:00 +0000"));
    }
}
