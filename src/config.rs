//! Scheduler configuration.
//!
//! Resolved once per edit session and passed into the
//! [`ScheduleManager`](crate::scheduler::ScheduleManager). Deserializable so
//! hosts can keep it next to their other settings.

use serde::{Deserialize, Serialize};

use crate::{ScheduleError, ScheduleResult};

/// Default cap on simultaneously displayed rows.
pub const DEFAULT_MAX_ROWS: usize = 6;

/// Scheduler settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    max_rows: usize,
    allow_backdate: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_rows: DEFAULT_MAX_ROWS,
            allow_backdate: false,
        }
    }
}

impl SchedulerConfig {
    /// Creates a new `SchedulerConfig`.
    pub fn new(max_rows: usize, allow_backdate: bool) -> ScheduleResult<Self> {
        let config = Self {
            max_rows,
            allow_backdate,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks settings that serde cannot.
    pub fn validate(&self) -> ScheduleResult<()> {
        if self.max_rows == 0 {
            return Err(ScheduleError::InvalidConfig(
                "max_rows must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Maximum number of displayed rows.
    pub fn max_rows(&self) -> usize {
        self.max_rows
    }

    /// Whether rows may start inside the predecessor's coverage.
    pub fn allow_backdate(&self) -> bool {
        self.allow_backdate
    }
}
