//! Frequency codes, status keys and disciplines.
//!
//! # Period Lengths
//!
//! | Kind | Key | Period | Days |
//! |------|-----|--------|------|
//! | Daily | any | `Day` | 1 |
//! | Weekly | every | `Week` | 7 |
//! | Weekly | every other | `EveryOtherWeek` | 14 |
//! | Monthly | any | `Month` | 30 |

use serde::{Deserialize, Serialize};

/// Interval unit of a frequency order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntervalKind {
    /// Visits per day.
    Daily,
    /// Visits per week (or every other week, see [`IntervalKey`]).
    #[default]
    Weekly,
    /// Visits per month.
    Monthly,
}

/// Repetition key. Only meaningful for [`IntervalKind::Weekly`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntervalKey {
    /// Every period.
    #[default]
    Every = 1,
    /// Every other period.
    EveryOther = 2,
}

/// Effective coverage period derived from kind and key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    Day,
    Week,
    EveryOtherWeek,
    Month,
}

impl Period {
    /// Resolves the period for an interval kind and key.
    pub fn resolve(kind: IntervalKind, key: IntervalKey) -> Self {
        match (kind, key) {
            (IntervalKind::Daily, _) => Period::Day,
            (IntervalKind::Weekly, IntervalKey::Every) => Period::Week,
            (IntervalKind::Weekly, IntervalKey::EveryOther) => Period::EveryOtherWeek,
            (IntervalKind::Monthly, _) => Period::Month,
        }
    }

    /// Length of one period in days.
    #[inline]
    pub fn length_days(&self) -> i64 {
        match self {
            Period::Day => 1,
            Period::Week => 7,
            Period::EveryOtherWeek => 14,
            Period::Month => 30,
        }
    }

    /// Built-in token used in the canonical frequency string.
    pub fn default_token(&self) -> &'static str {
        match self {
            Period::Day => "D",
            Period::Week => "W",
            Period::EveryOtherWeek => "EOW",
            Period::Month => "M",
        }
    }

    /// Interval kind and key that produce this period.
    pub fn interval(&self) -> (IntervalKind, IntervalKey) {
        match self {
            Period::Day => (IntervalKind::Daily, IntervalKey::Every),
            Period::Week => (IntervalKind::Weekly, IntervalKey::Every),
            Period::EveryOtherWeek => (IntervalKind::Weekly, IntervalKey::EveryOther),
            Period::Month => (IntervalKind::Monthly, IntervalKey::Every),
        }
    }

    /// All periods, in display order.
    pub fn all() -> [Period; 4] {
        [
            Period::Day,
            Period::Week,
            Period::EveryOtherWeek,
            Period::Month,
        ]
    }
}

/// Provenance of an order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusKey {
    /// Active order already in effect.
    Current,
    /// Pending new order.
    #[default]
    New,
    /// New order saved from an OASIS assessment.
    OasisSaved,
    /// Pending physical therapy order.
    PTNew,
    /// Pending occupational therapy order.
    OTNew,
    /// Pending speech therapy order.
    STNew,
}

/// Care discipline that owns the schedule being edited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Discipline {
    #[default]
    SkilledNursing,
    PhysicalTherapy,
    OccupationalTherapy,
    SpeechTherapy,
    MedicalSocialWork,
    HomeHealthAide,
}

impl Discipline {
    /// Status key given to new orders of this discipline.
    pub fn new_order_status(&self) -> StatusKey {
        match self {
            Discipline::PhysicalTherapy => StatusKey::PTNew,
            Discipline::OccupationalTherapy => StatusKey::OTNew,
            Discipline::SpeechTherapy => StatusKey::STNew,
            Discipline::SkilledNursing
            | Discipline::MedicalSocialWork
            | Discipline::HomeHealthAide => StatusKey::New,
        }
    }

    /// Parses a discipline code (`SN`, `PT`, `OT`, `ST`, `MSW`, `HHA`).
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "SN" => Some(Discipline::SkilledNursing),
            "PT" => Some(Discipline::PhysicalTherapy),
            "OT" => Some(Discipline::OccupationalTherapy),
            "ST" => Some(Discipline::SpeechTherapy),
            "MSW" => Some(Discipline::MedicalSocialWork),
            "HHA" => Some(Discipline::HomeHealthAide),
            _ => None,
        }
    }

    /// Short discipline code.
    pub fn code(&self) -> &'static str {
        match self {
            Discipline::SkilledNursing => "SN",
            Discipline::PhysicalTherapy => "PT",
            Discipline::OccupationalTherapy => "OT",
            Discipline::SpeechTherapy => "ST",
            Discipline::MedicalSocialWork => "MSW",
            Discipline::HomeHealthAide => "HHA",
        }
    }
}
