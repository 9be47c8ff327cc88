//! Care episode model.
//!
//! An episode is the certification period that bounds every frequency
//! order. It is supplied once per edit session and never mutated.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A care episode `[start, end]` (both inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    /// First day of the episode.
    pub start: NaiveDate,
    /// Last day of the episode.
    pub end: NaiveDate,
}

impl Episode {
    /// Creates a new episode.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Number of calendar days in the episode (inclusive).
    pub fn length_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Whether a date falls within the episode.
    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}
