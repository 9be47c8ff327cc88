//! Frequency order model.
//!
//! A frequency order is one recurrence rule ("2 visits/week for 4 weeks")
//! inside an episode. Orders are created empty or decoded from persisted
//! data, edited in place by the engine, and dropped on removal.
//!
//! # Discontinuation States
//!
//! | `discontinue_date` | `discontinue_flag` | status | saved | Meaning |
//! |---|---|---|---|---|
//! | `None` | any | any | any | Running |
//! | `Some` | `false` | any | any | Terminated early |
//! | `Some`/`None` | `true` | `Current` | yes | Fully removed from the active set |
//! | `Some`/`None` | `true` | `Current` | no | Pending confirmation, still active |

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{IntervalKey, IntervalKind, Period, StatusKey};

/// A recurring visit order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyOrder {
    /// First day of coverage. `None` until entered or cascaded.
    pub effective_date: Option<NaiveDate>,
    /// Last day of coverage (derived).
    pub frequency_end: Option<NaiveDate>,
    /// Interval unit.
    pub interval_kind: IntervalKind,
    /// Every / every-other repetition (weekly only).
    pub interval_key: IntervalKey,
    /// Number of periods covered.
    pub duration: u32,
    /// Minimum visits per period.
    pub occurrence_min: Option<u32>,
    /// Maximum visits per period.
    pub occurrence_max: Option<u32>,
    /// Early termination date.
    pub discontinue_date: Option<NaiveDate>,
    /// Marked for removal from the active set.
    pub discontinue_flag: bool,
    /// Free-text discontinuation reason.
    pub discontinue_reason: String,
    /// Discontinued in this session but not yet persisted.
    pub discontinued_not_saved: bool,
    /// Provenance of the order.
    pub status_key: StatusKey,
    /// Persisted task key. Non-zero = locked.
    pub patient_task_key: u64,
    /// Pass-through bookkeeping flag.
    pub pending: bool,
    /// Pass-through bookkeeping flag.
    pub in_frequency: bool,
    /// Coverage may run past the episode end.
    pub open_ended: bool,
}

impl Default for FrequencyOrder {
    fn default() -> Self {
        Self {
            effective_date: None,
            frequency_end: None,
            interval_kind: IntervalKind::Weekly,
            interval_key: IntervalKey::Every,
            duration: 0,
            occurrence_min: None,
            occurrence_max: None,
            discontinue_date: None,
            discontinue_flag: false,
            discontinue_reason: String::new(),
            discontinued_not_saved: false,
            status_key: StatusKey::New,
            patient_task_key: 0,
            pending: false,
            in_frequency: false,
            open_ended: false,
        }
    }
}

impl FrequencyOrder {
    /// Creates an empty order with the given status key.
    pub fn new(status_key: StatusKey) -> Self {
        Self {
            status_key,
            ..Self::default()
        }
    }

    /// Sets the effective date.
    pub fn with_effective_date(mut self, date: NaiveDate) -> Self {
        self.effective_date = Some(date);
        self
    }

    /// Sets interval kind and key.
    pub fn with_interval(mut self, kind: IntervalKind, key: IntervalKey) -> Self {
        self.interval_kind = kind;
        self.interval_key = key;
        self
    }

    /// Sets the number of periods.
    pub fn with_duration(mut self, duration: u32) -> Self {
        self.duration = duration;
        self
    }

    /// Sets visits per period. `max` may equal `min`.
    pub fn with_occurrences(mut self, min: u32, max: Option<u32>) -> Self {
        self.occurrence_min = Some(min);
        self.occurrence_max = max;
        self
    }

    /// Sets the status key.
    pub fn with_status(mut self, status_key: StatusKey) -> Self {
        self.status_key = status_key;
        self
    }

    /// Marks the order as persisted (locked).
    pub fn with_patient_task_key(mut self, key: u64) -> Self {
        self.patient_task_key = key;
        self
    }

    /// Terminates the order early.
    pub fn with_discontinuation(mut self, date: NaiveDate, reason: impl Into<String>) -> Self {
        self.discontinue_date = Some(date);
        self.discontinue_reason = reason.into();
        self
    }

    /// Sets the discontinue flag and its saved state.
    pub fn with_discontinue_flag(mut self, flag: bool, not_saved: bool) -> Self {
        self.discontinue_flag = flag;
        self.discontinued_not_saved = not_saved;
        self
    }

    /// Allows coverage past the episode end.
    pub fn open_ended(mut self) -> Self {
        self.open_ended = true;
        self
    }

    /// Effective coverage period.
    #[inline]
    pub fn period(&self) -> Period {
        Period::resolve(self.interval_kind, self.interval_key)
    }

    /// Whether the order is persisted and must keep its dates.
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.patient_task_key != 0
    }

    /// Whether the order was terminated early.
    #[inline]
    pub fn is_discontinued(&self) -> bool {
        self.discontinue_date.is_some()
    }

    /// Whether the order was fully and persistently discontinued.
    pub fn is_fully_discontinued(&self) -> bool {
        self.status_key == StatusKey::Current
            && self.discontinue_flag
            && !self.discontinued_not_saved
    }

    /// Whether the order belongs in encoded and submitted output.
    #[inline]
    pub fn is_active(&self) -> bool {
        !self.is_fully_discontinued()
    }

    /// Last day of actual coverage: the discontinue date if any,
    /// else the computed frequency end.
    pub fn coverage_end(&self) -> Option<NaiveDate> {
        self.discontinue_date.or(self.frequency_end)
    }
}
