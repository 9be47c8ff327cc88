//! Schedule orchestration, status bar and submission assembly.
//!
//! [`ScheduleManager`] owns the row list of one edit session and routes
//! every edit through the cascade, then exposes validation, encoding and
//! the submission-ready result.
//!
//! # Status Bar
//!
//! [`StatusBar`] reports how much of the episode remains after the
//! latest coverage end, and whether coverage overruns it.

mod manager;
mod status;
mod submission;

pub use manager::ScheduleManager;
pub use status::{Severity, StatusBar};
pub use submission::{assemble_submission, DiscontinuedRow, Submission};
