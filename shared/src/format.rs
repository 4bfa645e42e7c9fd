//! Display formatting in the fixed es-PE locale and America/Lima timezone

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Timezone every date shown on the dashboard is rendered in
pub const DISPLAY_TIMEZONE: Tz = chrono_tz::America::Lima;

/// Placeholder for absent values
pub const PLACEHOLDER: &str = "-";

/// Parse a store timestamp. Values without an offset are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// `15/03/2025, 09:30`
pub fn format_date_time(timestamp: &DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&DISPLAY_TIMEZONE)
        .format("%d/%m/%Y, %H:%M")
        .to_string()
}

/// `15/3/2025`
pub fn format_date_only(timestamp: &DateTime<Utc>) -> String {
    format_day(local_date(timestamp))
}

/// Label for a calendar day, matching [`format_date_only`]
pub fn format_day(day: NaiveDate) -> String {
    day.format("%-d/%-m/%Y").to_string()
}

/// Format a raw timestamp string; absent renders the placeholder and
/// unparseable input is returned unchanged.
pub fn format_date_time_str(raw: Option<&str>) -> String {
    format_raw(raw, format_date_time)
}

/// Date-only variant of [`format_date_time_str`]
pub fn format_date_only_str(raw: Option<&str>) -> String {
    format_raw(raw, format_date_only)
}

fn format_raw(raw: Option<&str>, render: fn(&DateTime<Utc>) -> String) -> String {
    match raw {
        None => PLACEHOLDER.to_string(),
        Some(s) if s.trim().is_empty() => PLACEHOLDER.to_string(),
        Some(s) => parse_timestamp(s)
            .map(|ts| render(&ts))
            .unwrap_or_else(|| s.to_string()),
    }
}

/// One decimal place with a trailing `%`; absent renders `-`, never `0.0%`
pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}%", v),
        None => PLACEHOLDER.to_string(),
    }
}

/// Calendar day of a timestamp in the display timezone
pub fn local_date(timestamp: &DateTime<Utc>) -> NaiveDate {
    timestamp.with_timezone(&DISPLAY_TIMEZONE).date_naive()
}

/// Local midnight of `day` as a UTC instant
pub fn start_of_local_day(day: NaiveDate) -> DateTime<Utc> {
    local_instant(day.and_time(NaiveTime::MIN))
}

/// 23:59:59 local time of `day` as a UTC instant
pub fn end_of_local_day(day: NaiveDate) -> DateTime<Utc> {
    let end = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
    local_instant(day.and_time(end))
}

fn local_instant(naive: NaiveDateTime) -> DateTime<Utc> {
    DISPLAY_TIMEZONE
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(raw: &str) -> DateTime<Utc> {
        parse_timestamp(raw).unwrap()
    }

    #[test]
    fn test_format_date_time_in_lima() {
        // Lima is UTC-5 all year
        assert_eq!(format_date_time(&ts("2025-03-15T14:30:00Z")), "15/03/2025, 09:30");
        assert_eq!(format_date_time(&ts("2025-03-15T02:05:00Z")), "14/03/2025, 21:05");
    }

    #[test]
    fn test_format_date_only() {
        assert_eq!(format_date_only(&ts("2025-03-05T14:30:00Z")), "5/3/2025");
        assert_eq!(format_date_only(&ts("2025-03-05T04:59:59Z")), "4/3/2025");
    }

    #[test]
    fn test_unparseable_input_returned_unchanged() {
        assert_eq!(format_date_time_str(Some("ayer")), "ayer");
        assert_eq!(format_date_only_str(Some("not-a-date")), "not-a-date");
        assert_eq!(format_date_time_str(None), "-");
        assert_eq!(format_date_time_str(Some("")), "-");
        assert_eq!(
            format_date_time_str(Some("2025-03-15T14:30:00+00:00")),
            "15/03/2025, 09:30"
        );
    }

    #[test]
    fn test_parse_store_variants() {
        assert!(parse_timestamp("2025-03-15T14:30:00.123456+00:00").is_some());
        assert!(parse_timestamp("2025-03-15 14:30:00+00").is_some());
        assert!(parse_timestamp("2025-03-15T14:30:00").is_some());
        assert!(parse_timestamp("2025-03-15 14:30:00.5").is_some());
        assert!(parse_timestamp("15/03/2025").is_none());
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(Some(60.0)), "60.0%");
        assert_eq!(format_percent(Some(33.333)), "33.3%");
        assert_eq!(format_percent(Some(0.0)), "0.0%");
        assert_eq!(format_percent(None), "-");
    }

    #[test]
    fn test_local_day_bounds() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        assert_eq!(start_of_local_day(day), ts("2025-03-15T05:00:00Z"));
        assert_eq!(end_of_local_day(day), ts("2025-03-16T04:59:59Z"));
    }
}
