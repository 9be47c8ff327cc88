//! Order and frequency-set validation.
//!
//! Row-level checks ([`validate_effective_date`], [`check_backdating_legality`])
//! feed the `valid` / `valid_back` flags kept by the cascade. The set-level
//! gate [`validate_frequency_set`] only aggregates those flags plus the
//! status bar and PRN fields; it never recomputes dates, so row flags must
//! be current when it is called.
//!
//! Detects:
//! - Coverage running past the episode end
//! - Rows with a missing or out-of-episode effective date
//! - Rows illegally backdated into the predecessor's coverage
//! - Rows with periods missing from the lookup table
//! - Incomplete visit counts or durations
//! - PRN count without reason (or reason without count)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{FrequencyOrder, FrequencyRanges, PrnVisits, ScheduleRow};
use crate::scheduler::StatusBar;

/// Outcome of the submission gate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether submission must be refused.
    pub error: bool,
    /// User-facing message for the first issue (empty when valid).
    pub text: String,
    /// Every issue found, in check order.
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// A passing result.
    pub fn ok() -> Self {
        Self::default()
    }

    fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        match issues.first() {
            Some(first) => Self {
                error: true,
                text: first.message.clone(),
                issues,
            },
            None => Self::ok(),
        }
    }
}

/// A single validation problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Issue category.
    pub kind: ValidationIssueKind,
    /// Offending row, when the issue belongs to one.
    pub row: Option<usize>,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationIssueKind {
    /// Coverage ends after the episode.
    DurationExceedsEpisode,
    /// Effective date missing or before the episode start.
    InvalidEffectiveDate,
    /// Effective date overlaps the predecessor's coverage.
    IllegalBackdate,
    /// Period has no entry in the lookup table.
    UnknownFrequency,
    /// Visit counts missing or inverted.
    InvalidOccurrence,
    /// Duration is zero.
    MissingDuration,
    /// PRN count and reason do not go together.
    IncompletePrn,
}

impl ValidationIssue {
    fn new(kind: ValidationIssueKind, row: Option<usize>, message: impl Into<String>) -> Self {
        Self {
            kind,
            row,
            message: message.into(),
        }
    }
}

/// Whether an effective date is present and not before the episode start.
pub fn validate_effective_date(date: Option<NaiveDate>, episode_start: NaiveDate) -> bool {
    date.is_some_and(|d| d >= episode_start)
}

/// Whether `candidate` may start where it does, given its predecessor.
///
/// Illegal when backdating is not allowed and the candidate starts on or
/// before the predecessor's discontinue date (discontinued predecessor)
/// or frequency end (running predecessor). A predecessor carrying the
/// discontinue flag without a date yields its whole window.
pub fn check_backdating_legality(
    candidate: &FrequencyOrder,
    predecessor: &FrequencyOrder,
    allow_backdate: bool,
) -> bool {
    if allow_backdate {
        return true;
    }
    let Some(start) = candidate.effective_date else {
        return true;
    };

    if let Some(discontinued) = predecessor.discontinue_date {
        return start > discontinued;
    }
    if predecessor.discontinue_flag {
        return true;
    }
    match predecessor.frequency_end {
        Some(end) => start > end,
        None => true,
    }
}

/// Validates the displayed frequency set before submission.
///
/// Checks, in order:
/// 1. Remaining episode time is not negative
/// 2. Every visible row has `valid` and `valid_back` set
/// 3. Every active visible row uses a period from `ranges`
/// 4. Every active visible row has visit counts and a duration
/// 5. PRN count and reason are filled together
///
/// # Returns
/// A passing result, or `error = true` with the first issue's message as
/// `text` and all issues in `issues`.
pub fn validate_frequency_set(
    rows: &[ScheduleRow],
    status: &StatusBar,
    ranges: &FrequencyRanges,
    prn: Option<&PrnVisits>,
) -> ValidationResult {
    let mut issues = Vec::new();

    if status.remaining_days < 0 || !status.is_valid_duration {
        issues.push(ValidationIssue::new(
            ValidationIssueKind::DurationExceedsEpisode,
            None,
            "duration exceeds episode",
        ));
    }

    for (index, row) in rows.iter().enumerate().filter(|(_, r)| r.display) {
        let number = index + 1;
        if !row.valid {
            issues.push(ValidationIssue::new(
                ValidationIssueKind::InvalidEffectiveDate,
                Some(index),
                format!("row {number}: effective date is missing or before the episode start"),
            ));
        }
        if !row.valid_back {
            issues.push(ValidationIssue::new(
                ValidationIssueKind::IllegalBackdate,
                Some(index),
                format!("row {number}: effective date overlaps the previous frequency"),
            ));
        }

        let order = &row.order;
        if !order.is_active() {
            continue;
        }
        if !ranges.contains(order.period()) {
            issues.push(ValidationIssue::new(
                ValidationIssueKind::UnknownFrequency,
                Some(index),
                format!("row {number}: frequency is not available"),
            ));
        }
        match (order.occurrence_min, order.occurrence_max) {
            (None, _) | (Some(0), _) => issues.push(ValidationIssue::new(
                ValidationIssueKind::InvalidOccurrence,
                Some(index),
                format!("row {number}: visits per period are required"),
            )),
            (Some(min), Some(max)) if max < min => issues.push(ValidationIssue::new(
                ValidationIssueKind::InvalidOccurrence,
                Some(index),
                format!("row {number}: maximum visits are below the minimum"),
            )),
            _ => {}
        }
        if order.duration == 0 {
            issues.push(ValidationIssue::new(
                ValidationIssueKind::MissingDuration,
                Some(index),
                format!("row {number}: duration is required"),
            ));
        }
    }

    if let Some(prn) = prn {
        if !prn.is_consistent() {
            issues.push(ValidationIssue::new(
                ValidationIssueKind::IncompletePrn,
                None,
                "PRN visits require both a count and a reason",
            ));
        }
    }

    ValidationResult::from_issues(issues)
}
