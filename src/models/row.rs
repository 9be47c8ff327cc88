//! Schedule row model.
//!
//! Wraps an order with the per-row flags the editing surface needs.
//! Rows with `display == false` are buffer rows: hidden placeholders
//! kept at the tail of the list so growing it does not flicker.

use serde::{Deserialize, Serialize};

use super::{FrequencyOrder, StatusKey};

/// One row of the schedule editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// The order carried by this row.
    pub order: FrequencyOrder,
    /// Shown to the user. `false` = buffer row.
    pub display: bool,
    /// Read-only in the editor; skipped by the cascade.
    pub disabled: bool,
    /// Effective date present and inside the episode.
    pub valid: bool,
    /// Effective date does not illegally overlap the predecessor.
    pub valid_back: bool,
    /// Row offers the "add another" action.
    pub show_add: bool,
    /// 7-day block of the effective date, counted from episode start.
    pub work_week_number: u32,
    /// Row was populated from persisted data.
    pub decoded: bool,
}

impl ScheduleRow {
    /// Creates a displayed row for an order.
    pub fn new(order: FrequencyOrder) -> Self {
        Self {
            order,
            display: true,
            disabled: false,
            valid: false,
            valid_back: true,
            show_add: false,
            work_week_number: 0,
            decoded: false,
        }
    }

    /// Creates a hidden buffer row.
    pub fn buffer(status_key: StatusKey) -> Self {
        Self {
            display: false,
            ..Self::new(FrequencyOrder::new(status_key))
        }
    }

    /// Creates a displayed row from a persisted order.
    pub fn decoded(order: FrequencyOrder) -> Self {
        Self {
            decoded: true,
            ..Self::new(order)
        }
    }

    /// Whether the row is a hidden buffer row.
    #[inline]
    pub fn is_buffer(&self) -> bool {
        !self.display
    }

    /// Whether the cascade may rewrite this row's effective date.
    #[inline]
    pub fn is_cascadable(&self) -> bool {
        self.display && !self.disabled && !self.order.is_locked()
    }
}

/// Number of displayed rows.
pub fn displayed_count(rows: &[ScheduleRow]) -> usize {
    rows.iter().filter(|r| r.display).count()
}

/// Index of the last displayed row.
pub fn last_displayed(rows: &[ScheduleRow]) -> Option<usize> {
    rows.iter().rposition(|r| r.display)
}
