//! Frequency scheduling domain models.
//!
//! Plain data types shared by every engine component. Nothing here
//! computes derived dates; see [`crate::frequency`] and [`crate::cascade`].
//!
//! # Domain Mappings
//!
//! | Type | Home care | Editor |
//! |------|-----------|--------|
//! | Episode | Certification period | Session bounds |
//! | FrequencyOrder | "2W4" visit order | Row payload |
//! | ScheduleRow | - | Editable row + flags |
//! | FrequencyRanges | Code table | Lookup input |

mod codes;
mod episode;
mod order;
mod prn;
mod ranges;
mod row;

pub use codes::{Discipline, IntervalKey, IntervalKind, Period, StatusKey};
pub use episode::Episode;
pub use order::FrequencyOrder;
pub use prn::PrnVisits;
pub use ranges::{FrequencyRange, FrequencyRanges};
pub use row::{displayed_count, last_displayed, ScheduleRow};
