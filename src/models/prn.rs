//! As-needed (PRN) visit allowance.

use serde::{Deserialize, Serialize};

/// PRN visits granted on top of the scheduled frequency.
///
/// Both fields must be filled together: a count needs a reason and a
/// reason needs a count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrnVisits {
    /// Number of as-needed visits.
    pub count: Option<u32>,
    /// Why the visits may be needed.
    pub reason: String,
}

impl PrnVisits {
    /// Creates a PRN allowance.
    pub fn new(count: u32, reason: impl Into<String>) -> Self {
        Self {
            count: Some(count),
            reason: reason.into(),
        }
    }

    /// Whether both count and reason are filled, or both are empty.
    pub fn is_consistent(&self) -> bool {
        let has_count = self.count.is_some_and(|c| c > 0);
        let has_reason = !self.reason.trim().is_empty();
        has_count == has_reason
    }

    /// Whether any PRN visits are granted.
    pub fn is_set(&self) -> bool {
        self.count.is_some_and(|c| c > 0)
    }
}
