//! Release-date normalization for chapter lists.
//!
//! The site prints either absolute English dates ("September 28, 2025") or relative ones
//! ("3 hours ago"). Absolute dates become UTC midnight of that day. Everything else,
//! relative dates included, becomes "now": ordering may be slightly off for those
//! chapters but extraction never fails on a date.

use chrono::{DateTime, NaiveDate, Utc};

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Milliseconds since the epoch as a decimal string.
pub fn parse_date(input: &str) -> String {
    release_millis(Some(input)).to_string()
}

/// Milliseconds since the epoch for a release-date string, using the current time as "now".
pub fn release_millis(input: Option<&str>) -> i64 {
    release_millis_at(input, Utc::now())
}

/// Same as [`release_millis`] with an explicit "now".
pub fn release_millis_at(input: Option<&str>, now: DateTime<Utc>) -> i64 {
    let now_ms = now.timestamp_millis();
    let Some(input) = input.map(str::trim).filter(|s| !s.is_empty()) else {
        return now_ms;
    };
    if input.to_lowercase().contains("ago") {
        return now_ms;
    }
    let cleaned = input.replace(',', "");
    let tokens: Vec<&str> = cleaned.split_whitespace().collect();
    let [month, day, year, ..] = tokens.as_slice() else {
        return now_ms;
    };
    let Some(month) = month_number(month) else {
        return now_ms;
    };
    let iso = format!("{}-{:02}-{:0>2}", year, month, day);
    NaiveDate::parse_from_str(&iso, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or(now_ms)
}

/// 1-based month for an English month name, case-insensitive.
fn month_number(name: &str) -> Option<u32> {
    let name = name.to_lowercase();
    MONTHS
        .iter()
        .position(|m| *m == name)
        .map(|i| i as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn absolute_date_is_utc_midnight() {
        assert_eq!(
            release_millis_at(Some("March 5, 2024"), fixed_now()),
            1_709_596_800_000
        );
        assert_eq!(
            release_millis_at(Some("september 28 2025"), fixed_now()),
            Utc.with_ymd_and_hms(2025, 9, 28, 0, 0, 0)
                .unwrap()
                .timestamp_millis()
        );
    }

    #[test]
    fn month_name_is_case_insensitive() {
        assert_eq!(
            release_millis_at(Some("DECEMBER 01, 2023"), fixed_now()),
            Utc.with_ymd_and_hms(2023, 12, 1, 0, 0, 0)
                .unwrap()
                .timestamp_millis()
        );
    }

    #[test]
    fn relative_and_empty_dates_are_now() {
        let now = fixed_now();
        assert_eq!(release_millis_at(Some("5 hours ago"), now), now.timestamp_millis());
        assert_eq!(release_millis_at(Some("2 Days AGO"), now), now.timestamp_millis());
        assert_eq!(release_millis_at(Some(""), now), now.timestamp_millis());
        assert_eq!(release_millis_at(Some("   "), now), now.timestamp_millis());
        assert_eq!(release_millis_at(None, now), now.timestamp_millis());
    }

    #[test]
    fn unparseable_dates_are_now() {
        let now = fixed_now();
        assert_eq!(release_millis_at(Some("garbage"), now), now.timestamp_millis());
        assert_eq!(release_millis_at(Some("March 5"), now), now.timestamp_millis());
        assert_eq!(release_millis_at(Some("Maret 5, 2024"), now), now.timestamp_millis());
        assert_eq!(release_millis_at(Some("February 30, 2024"), now), now.timestamp_millis());
        assert_eq!(release_millis_at(Some("March 5th, 2024"), now), now.timestamp_millis());
    }

    #[test]
    fn parse_date_relative_is_close_to_now() -> Result<(), std::num::ParseIntError> {
        let before = Utc::now().timestamp_millis();
        let value: i64 = parse_date("3 hours ago").parse()?;
        let after = Utc::now().timestamp_millis();
        assert!(value >= before && value <= after);
        Ok(())
    }

    #[test]
    fn parse_date_absolute_is_decimal_millis() {
        assert_eq!(parse_date("March 5, 2024"), "1709596800000");
    }
}
