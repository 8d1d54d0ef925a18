//! Lenient date/time parsing for broker exports and the persisted ISO form.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
];

/// Parse a timestamp in any of the forms brokers commonly export.
///
/// Offset-bearing timestamps keep the wall-clock time they were written in.
/// Date-only values land on midnight.
pub fn parse_trade_date(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.naive_local());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

/// Serde adapter storing dates as ISO-8601 strings.
pub mod iso {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

    pub fn serialize<S: Serializer>(
        date: &NaiveDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_trade_date(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd_hms(y: i32, m: u32, d: u32, h: u32, min: u32, sec: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, sec)
            .unwrap()
    }

    #[test]
    fn parses_iso_date() {
        assert_eq!(parse_trade_date("2024-01-05"), Some(ymd_hms(2024, 1, 5, 0, 0, 0)));
    }

    #[test]
    fn parses_iso_datetime_variants() {
        let expected = ymd_hms(2024, 3, 1, 14, 30, 5);
        assert_eq!(parse_trade_date("2024-03-01T14:30:05"), Some(expected));
        assert_eq!(parse_trade_date("2024-03-01 14:30:05"), Some(expected));
        assert_eq!(parse_trade_date("2024-03-01T14:30:05.000Z"), Some(expected));
        assert_eq!(parse_trade_date("2024-03-01T14:30:05+10:00"), Some(expected));
        assert_eq!(
            parse_trade_date("2024-03-01 14:30"),
            Some(ymd_hms(2024, 3, 1, 14, 30, 0))
        );
    }

    #[test]
    fn parses_us_and_named_month_forms() {
        let expected = ymd_hms(2024, 1, 5, 0, 0, 0);
        assert_eq!(parse_trade_date("01/05/2024"), Some(expected));
        assert_eq!(parse_trade_date("Jan 5, 2024"), Some(expected));
        assert_eq!(parse_trade_date("5 Jan 2024"), Some(expected));
        assert_eq!(parse_trade_date("2024/01/05"), Some(expected));
        assert_eq!(
            parse_trade_date("01/05/2024 09:15"),
            Some(ymd_hms(2024, 1, 5, 9, 15, 0))
        );
    }

    #[test]
    fn parses_rfc2822() {
        assert_eq!(
            parse_trade_date("Fri, 05 Jan 2024 10:00:00 +0000"),
            Some(ymd_hms(2024, 1, 5, 10, 0, 0))
        );
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert!(parse_trade_date("  2024-01-05 ").is_some());
    }

    #[test]
    fn rejects_garbage_and_impossible_dates() {
        assert_eq!(parse_trade_date(""), None);
        assert_eq!(parse_trade_date("not a date"), None);
        assert_eq!(parse_trade_date("2024-02-30"), None);
        assert_eq!(parse_trade_date("13/45/2024"), None);
    }
}
