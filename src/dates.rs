//! Calendar date arithmetic.
//!
//! All dates are timezone-naive [`NaiveDate`]s. Missing or unparsable
//! dates degrade to "undetermined" (`None`, or the sentinel 0 for
//! work-week numbers) instead of failing, so one bad field only blanks
//! its own row's derived values.

use chrono::{Days, NaiveDate};
use tracing::debug;

use crate::models::Episode;

/// Sentinel work-week number for undetermined dates.
pub const UNDETERMINED_WEEK: u32 = 0;

const INPUT_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];
const OUTPUT_FORMAT: &str = "%m/%d/%Y";

/// Adds `n` days (may be negative).
///
/// Returns `None` when the result falls outside the representable range.
#[inline]
pub fn add_days(date: NaiveDate, n: i64) -> Option<NaiveDate> {
    let days = Days::new(n.unsigned_abs());
    if n >= 0 {
        date.checked_add_days(days)
    } else {
        date.checked_sub_days(days)
    }
}

/// Days from `b` to `a` (`a - b`). Negative when `a` is earlier.
#[inline]
pub fn diff_days(a: NaiveDate, b: NaiveDate) -> i64 {
    (a - b).num_days()
}

/// Fractional weeks from `b` to `a`.
#[inline]
pub fn diff_weeks(a: NaiveDate, b: NaiveDate) -> f64 {
    diff_days(a, b) as f64 / 7.0
}

/// Index of the 7-day block `date` falls in, counted from the episode
/// start (block 0 = `[start, start + 6]`).
///
/// Returns [`UNDETERMINED_WEEK`] for `None` and for dates before the
/// episode start.
pub fn work_week_number(date: Option<NaiveDate>, episode: &Episode) -> u32 {
    match date {
        Some(d) if d >= episode.start => (diff_days(d, episode.start) / 7) as u32,
        _ => UNDETERMINED_WEEK,
    }
}

/// Parses `YYYY-MM-DD` or `MM/DD/YYYY`. Anything else is `None`.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    let parsed = INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok());
    if parsed.is_none() {
        debug!(input = trimmed, "unparsable date treated as undetermined");
    }
    parsed
}

/// Formats a date as `MM/DD/YYYY`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(OUTPUT_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_add_and_diff_days() {
        let d = date(2024, 1, 31);
        assert_eq!(add_days(d, 1), Some(date(2024, 2, 1)));
        assert_eq!(add_days(d, -31), Some(date(2023, 12, 31)));
        // Leap day
        assert_eq!(add_days(date(2024, 2, 28), 1), Some(date(2024, 2, 29)));

        assert_eq!(diff_days(date(2024, 1, 28), date(2024, 1, 1)), 27);
        assert_eq!(diff_days(date(2024, 1, 1), date(2024, 1, 28)), -27);
    }

    #[test]
    fn test_add_days_out_of_range() {
        let d = date(2024, 1, 1);
        assert_eq!(add_days(d, i64::from(u32::MAX) * 30), None);
        assert_eq!(add_days(d, i64::MIN), None);
        assert_eq!(add_days(NaiveDate::MAX, 1), None);
    }

    #[test]
    fn test_diff_weeks() {
        assert!((diff_weeks(date(2024, 1, 15), date(2024, 1, 1)) - 2.0).abs() < 1e-10);
        assert!((diff_weeks(date(2024, 1, 4), date(2024, 1, 1)) - 3.0 / 7.0).abs() < 1e-10);
    }

    #[test]
    fn test_work_week_number() {
        let ep = Episode::new(date(2024, 1, 1), date(2024, 2, 29));
        assert_eq!(work_week_number(Some(date(2024, 1, 1)), &ep), 0);
        assert_eq!(work_week_number(Some(date(2024, 1, 7)), &ep), 0);
        assert_eq!(work_week_number(Some(date(2024, 1, 8)), &ep), 1);
        assert_eq!(work_week_number(Some(date(2024, 1, 29)), &ep), 4);
        assert_eq!(work_week_number(None, &ep), UNDETERMINED_WEEK);
        assert_eq!(work_week_number(Some(date(2023, 12, 25)), &ep), UNDETERMINED_WEEK);

        // Pure function of its inputs
        let d = Some(date(2024, 2, 10));
        assert_eq!(work_week_number(d, &ep), work_week_number(d, &ep));
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-01-15"), Some(date(2024, 1, 15)));
        assert_eq!(parse_date(" 01/15/2024 "), Some(date(2024, 1, 15)));
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("2024-02-30"), None);
        assert_eq!(parse_date("next tuesday"), None);
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(date(2024, 1, 5)), "01/05/2024");
    }
}
