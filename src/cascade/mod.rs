//! Cascading date recomputation over the row list.
//!
//! Every mutation of a row's effective date, discontinue date, or of the
//! list structure is followed by an explicit call into this module. There
//! are no watchers: the caller decides when to recompute and passes a
//! [`CascadeContext`] carrying the mode and one-shot suppression flags.
//!
//! # Row State
//!
//! ```text
//! Unset ──(date entered)──▶ Valid ──(outside episode)──▶ Invalid
//!                             │
//!                             └──(overlaps predecessor)──▶ valid_back = false
//! ```
//!
//! # Propagation
//!
//! After a valid change at row `i`, every later displayed, enabled,
//! unlocked row `j` gets `effective(j) = frequency_end(j - 1) + 1 day`
//! and its own end recomputed, so unlocked rows form a gap-free chain.

mod context;
mod engine;

pub use context::{CascadeContext, SchedulerMode};
pub use engine::{
    add_row, ensure_buffer, mark_show_add, on_row_changed, refresh_all, remove_row,
    seed_effective_date, sort_rows,
};
