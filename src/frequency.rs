//! Coverage end dates for frequency orders.
//!
//! # Algorithm
//!
//! `end = effective + duration × period_length − 1 day`, where every-other-week
//! orders use a 14-day period. Unless the order is open-ended, the end is
//! clamped to the episode end. The end never precedes the effective date.
//! An end past the last representable date clamps to the episode end, or
//! is undetermined (`None`) for open-ended orders.
//!
//! Both functions are pure: the cascade re-invokes them on every pass.

use chrono::NaiveDate;

use crate::dates::add_days;
use crate::models::{Episode, FrequencyOrder};

/// Computes the coverage end of an order.
///
/// Returns `None` when the order has no effective date.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use care_frequency::frequency::calc_frequency_end;
/// use care_frequency::models::{Episode, FrequencyOrder};
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2024, 1, 28).unwrap();
/// let episode = Episode::new(start, end);
/// let order = FrequencyOrder::default().with_effective_date(start).with_duration(4);
///
/// assert_eq!(calc_frequency_end(&order, &episode), Some(end));
/// ```
pub fn calc_frequency_end(order: &FrequencyOrder, episode: &Episode) -> Option<NaiveDate> {
    let effective = order.effective_date?;
    if order.duration == 0 {
        return Some(effective);
    }

    let span = i64::from(order.duration) * order.period().length_days();
    let end = match add_days(effective, span - 1) {
        Some(end) if order.open_ended || end <= episode.end => end,
        _ if order.open_ended => return None,
        _ => episode.end,
    };
    Some(end.max(effective))
}

/// End of the first coverage period, ignoring the duration.
///
/// Used to seed a following row when no frequency end is known.
pub fn calc_range_end(order: &FrequencyOrder) -> Option<NaiveDate> {
    let effective = order.effective_date?;
    add_days(effective, order.period().length_days() - 1)
}
