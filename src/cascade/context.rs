//! Cascade context: mode and one-shot suppression state.

use std::collections::BTreeSet;

/// Whether the engine is editing or bulk-populating rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SchedulerMode {
    /// Normal editing: every change cascades.
    #[default]
    Editing,
    /// Rows are being populated from persisted data; cascades are off.
    BulkLoading,
}

/// Explicit state consulted by [`on_row_changed`](super::on_row_changed).
///
/// Replaces implicit watcher flags: the caller owns this value and passes
/// it into every cascade call.
#[derive(Debug, Clone, Default)]
pub struct CascadeContext {
    /// Current engine mode.
    pub mode: SchedulerMode,
    /// Row indices whose next cascade skips forward propagation.
    /// Each entry is consumed by the first cascade on that index.
    pub suppress_next_cascade: BTreeSet<usize>,
    /// Backdating into a predecessor's coverage is permitted.
    pub allow_backdate: bool,
}

impl CascadeContext {
    /// Creates an editing context.
    pub fn new(allow_backdate: bool) -> Self {
        Self {
            allow_backdate,
            ..Default::default()
        }
    }

    /// Sets the mode.
    pub fn with_mode(mut self, mode: SchedulerMode) -> Self {
        self.mode = mode;
        self
    }

    /// Marks rows whose next cascade must not propagate.
    pub fn suppress(&mut self, indices: impl IntoIterator<Item = usize>) {
        self.suppress_next_cascade.extend(indices);
    }

    /// Consumes the suppression flag for a row. Returns whether it was set.
    pub fn take_suppression(&mut self, index: usize) -> bool {
        self.suppress_next_cascade.remove(&index)
    }

    /// Whether cascades are currently disabled.
    #[inline]
    pub fn is_loading(&self) -> bool {
        self.mode == SchedulerMode::BulkLoading
    }
}
