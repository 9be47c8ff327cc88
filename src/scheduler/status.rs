//! Remaining-episode status bar.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Latest end | max(discontinue date or frequency end) over displayed rows |
//! | Remaining days | episode end − latest end |
//! | Remaining weeks | remaining days / 7 |
//! | Severity | `Error` if < 0, `None` if = 0, else `Info` |
//!
//! With no dated rows the whole episode remains.

use serde::{Deserialize, Serialize};

use crate::dates::diff_days;
use crate::models::{Episode, ScheduleRow};

/// How the status bar should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Coverage runs past the episode end.
    Error,
    /// Episode time remains uncovered.
    Info,
    /// Coverage ends exactly on the episode end.
    None,
}

/// Remaining episode time after the scheduled coverage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusBar {
    /// Days between the latest coverage end and the episode end.
    pub remaining_days: i64,
    /// Same, in fractional weeks.
    pub remaining_weeks: f64,
    /// Coverage does not run past the episode.
    pub is_valid_duration: bool,
    /// Presentation severity.
    pub severity: Severity,
}

impl StatusBar {
    /// Computes the status bar from the displayed rows.
    pub fn calculate(rows: &[ScheduleRow], episode: &Episode) -> Self {
        let latest_end = rows
            .iter()
            .filter(|r| r.display)
            .filter_map(|r| r.order.coverage_end())
            .max();

        let remaining_days = match latest_end {
            Some(end) => diff_days(episode.end, end),
            None => episode.length_days(),
        };
        Self::from_remaining_days(remaining_days)
    }

    /// Builds a status bar for a given remaining-day count.
    pub fn from_remaining_days(remaining_days: i64) -> Self {
        let severity = match remaining_days {
            d if d < 0 => Severity::Error,
            0 => Severity::None,
            _ => Severity::Info,
        };
        Self {
            remaining_days,
            remaining_weeks: remaining_days as f64 / 7.0,
            is_valid_duration: remaining_days >= 0,
            severity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FrequencyOrder, StatusKey};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn episode() -> Episode {
        Episode::new(date(2024, 1, 1), date(2024, 1, 28))
    }

    fn ending(end: NaiveDate) -> ScheduleRow {
        let mut order = FrequencyOrder::default().with_effective_date(date(2024, 1, 1));
        order.frequency_end = Some(end);
        ScheduleRow::new(order)
    }

    #[test]
    fn test_exact_fit() {
        let status = StatusBar::calculate(&[ending(date(2024, 1, 28))], &episode());
        assert_eq!(status.remaining_days, 0);
        assert!(status.is_valid_duration);
        assert_eq!(status.severity, Severity::None);
    }

    #[test]
    fn test_time_remaining() {
        let rows = vec![ending(date(2024, 1, 7)), ending(date(2024, 1, 14))];
        let status = StatusBar::calculate(&rows, &episode());
        assert_eq!(status.remaining_days, 14);
        assert!((status.remaining_weeks - 2.0).abs() < 1e-10);
        assert_eq!(status.severity, Severity::Info);
    }

    #[test]
    fn test_overrun() {
        let status = StatusBar::calculate(&[ending(date(2024, 2, 3))], &episode());
        assert_eq!(status.remaining_days, -6);
        assert!(!status.is_valid_duration);
        assert_eq!(status.severity, Severity::Error);
    }

    #[test]
    fn test_discontinue_date_wins() {
        let mut row = ending(date(2024, 2, 3));
        row.order.discontinue_date = Some(date(2024, 1, 21));
        let status = StatusBar::calculate(&[row], &episode());
        assert_eq!(status.remaining_days, 7);
    }

    #[test]
    fn test_buffer_rows_ignored() {
        let mut buffer = ScheduleRow::buffer(StatusKey::New);
        buffer.order.frequency_end = Some(date(2024, 3, 1));
        let status = StatusBar::calculate(&[ending(date(2024, 1, 28)), buffer], &episode());
        assert_eq!(status.remaining_days, 0);
    }

    #[test]
    fn test_no_dates() {
        let status = StatusBar::calculate(&[], &episode());
        assert_eq!(status.remaining_days, 28);
        assert_eq!(status.severity, Severity::Info);
    }

    #[test]
    fn test_severity_serialization() {
        let json = serde_json::to_string(&StatusBar::from_remaining_days(-1)).unwrap();
        assert!(json.contains(r#""severity":"error""#));
    }
}
