//! Frequency scheduling and cascading dates for home-care visit orders.
//!
//! A clinician edits a short list of frequency orders ("2 visits a week
//! for 3 weeks") covering a fixed certification episode. This crate keeps
//! the dates of those orders consistent as rows are edited, added,
//! removed and discontinued, and produces the canonical frequency string
//! submitted with the plan of care.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Episode`, `FrequencyOrder`, `ScheduleRow`,
//!   status and interval codes, frequency ranges, PRN visits
//! - **`dates`**: Day arithmetic, work-week numbers, date parsing
//! - **`frequency`**: Frequency end computation
//! - **`cascade`**: Date propagation across rows, add/remove/sort
//! - **`validation`**: Effective-date, backdating and submission checks
//! - **`encoding`**: Frequency string encode/decode, discontinuation summary
//! - **`scheduler`**: `ScheduleManager`, status bar, submission assembly
//! - **`config`**: Session configuration
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use care_frequency::config::SchedulerConfig;
//! use care_frequency::models::{Discipline, Episode};
//! use care_frequency::scheduler::ScheduleManager;
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let end = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
//! let mut manager = ScheduleManager::new(
//!     Episode::new(start, end),
//!     Discipline::SkilledNursing,
//!     SchedulerConfig::default(),
//! );
//!
//! manager.set_effective_date(0, Some(start));
//! manager.set_occurrences(0, Some(2), None);
//! manager.set_duration(0, 2);
//! manager.add_row(0).unwrap();
//!
//! let second = &manager.rows()[1];
//! assert_eq!(second.order.effective_date, NaiveDate::from_ymd_opt(2024, 1, 15));
//! ```

pub mod cascade;
pub mod config;
pub mod dates;
pub mod encoding;
mod error;
pub mod frequency;
pub mod models;
pub mod scheduler;
pub mod validation;

pub use error::{DecodeError, ScheduleError, ScheduleResult};
