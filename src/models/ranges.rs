//! Frequency lookup table.
//!
//! Maps coverage periods to the tokens used in the canonical frequency
//! string and to human-readable labels. Supplied by the host as
//! read-only configuration; [`FrequencyRanges::default`] carries the
//! standard table.

use serde::{Deserialize, Serialize};

use super::Period;

/// One entry of the lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyRange {
    /// Coverage period this entry describes.
    pub period: Period,
    /// Token written into the frequency string (e.g. `W`).
    pub token: String,
    /// Human-readable label (e.g. `week`).
    pub label: String,
}

impl FrequencyRange {
    /// Creates a new entry.
    pub fn new(period: Period, token: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            period,
            token: token.into(),
            label: label.into(),
        }
    }
}

/// Lookup table of frequency ranges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyRanges {
    ranges: Vec<FrequencyRange>,
}

impl Default for FrequencyRanges {
    fn default() -> Self {
        Self::new()
            .with_range(FrequencyRange::new(Period::Day, "D", "day"))
            .with_range(FrequencyRange::new(Period::Week, "W", "week"))
            .with_range(FrequencyRange::new(
                Period::EveryOtherWeek,
                "EOW",
                "every other week",
            ))
            .with_range(FrequencyRange::new(Period::Month, "M", "month"))
    }
}

impl FrequencyRanges {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self { ranges: Vec::new() }
    }

    /// Adds an entry, replacing any existing entry for the same period.
    pub fn add(&mut self, range: FrequencyRange) {
        self.ranges.retain(|r| r.period != range.period);
        self.ranges.push(range);
    }

    /// Builder: adds an entry and returns self.
    pub fn with_range(mut self, range: FrequencyRange) -> Self {
        self.add(range);
        self
    }

    /// Entry for a period, if configured.
    pub fn get(&self, period: Period) -> Option<&FrequencyRange> {
        self.ranges.iter().find(|r| r.period == period)
    }

    /// Whether the table has an entry for a period.
    pub fn contains(&self, period: Period) -> bool {
        self.get(period).is_some()
    }

    /// Token for a period.
    ///
    /// Falls back to the period's built-in token when not configured.
    pub fn token_for(&self, period: Period) -> &str {
        self.get(period)
            .map(|r| r.token.as_str())
            .unwrap_or_else(|| period.default_token())
    }

    /// Period for a token (case-insensitive).
    ///
    /// Configured tokens win over built-in tokens.
    pub fn period_for_token(&self, token: &str) -> Option<Period> {
        self.ranges
            .iter()
            .find(|r| r.token.eq_ignore_ascii_case(token))
            .map(|r| r.period)
            .or_else(|| {
                Period::all()
                    .into_iter()
                    .find(|p| p.default_token().eq_ignore_ascii_case(token))
            })
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}
