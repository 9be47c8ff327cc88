//! Cascade operations: row change, add, remove, sort.
//!
//! # Complexity
//! Every operation is O(n) in the number of rows (sort is O(n log n)).
//! Row lists are capped at a handful of entries, so each call recomputes
//! everything downstream instead of tracking dirty state.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use tracing::{debug, trace};

use super::CascadeContext;
use crate::dates::{add_days, work_week_number};
use crate::frequency::{calc_frequency_end, calc_range_end};
use crate::models::{
    displayed_count, last_displayed, Episode, FrequencyOrder, ScheduleRow, StatusKey,
};
use crate::scheduler::StatusBar;
use crate::validation::{check_backdating_legality, validate_effective_date};
use crate::{ScheduleError, ScheduleResult};

/// Recomputes derived state after row `index` changed.
///
/// # Algorithm
/// 1. Recompute the row's frequency end.
/// 2. `valid_back`: legal against the immediate predecessor, forced true
///    when the predecessor is fully discontinued or backdating is allowed.
/// 3. `valid`: effective date present and inside the episode.
/// 4. If valid, propagate chained effective dates to later rows, unless
///    the row carried a one-shot suppression flag.
/// 5. Recompute work-week numbers.
/// 6. Recompute the status bar.
///
/// While bulk loading nothing is recomputed; the current status bar is
/// returned unchanged.
///
/// # Panics
/// If `index` is out of range.
pub fn on_row_changed(
    rows: &mut [ScheduleRow],
    index: usize,
    episode: &Episode,
    ctx: &mut CascadeContext,
) -> StatusBar {
    assert!(
        index < rows.len(),
        "row index {index} out of range for {} rows",
        rows.len()
    );

    if ctx.is_loading() {
        trace!(index, "cascade skipped while loading");
        return StatusBar::calculate(rows, episode);
    }

    let suppressed = ctx.take_suppression(index);
    refresh_row(rows, index, episode, ctx.allow_backdate);

    if rows[index].valid && !suppressed {
        propagate(rows, index, episode, ctx.allow_backdate);
    } else if suppressed {
        trace!(index, "propagation suppressed after sort");
    }

    refresh_work_weeks(rows, episode);
    StatusBar::calculate(rows, episode)
}

/// Recomputes every displayed row's derived state without propagating.
///
/// Used once bulk loading completes, so freshly loaded dates are kept.
pub fn refresh_all(rows: &mut [ScheduleRow], episode: &Episode, allow_backdate: bool) -> StatusBar {
    for index in 0..rows.len() {
        if rows[index].display {
            refresh_row(rows, index, episode, allow_backdate);
        }
    }
    refresh_work_weeks(rows, episode);
    StatusBar::calculate(rows, episode)
}

/// Effective date for a row added after `index`.
///
/// Seeds from the nearest displayed, not fully discontinued row at or
/// before `index`:
/// - discontinued predecessor: the day after its discontinue date if its
///   visits had started by then, else the discontinue date itself
/// - otherwise: the day after its frequency end, falling back to the end
///   of its first period
pub fn seed_effective_date(rows: &[ScheduleRow], index: usize) -> Option<NaiveDate> {
    let last = index.min(rows.len().checked_sub(1)?);
    let predecessor = rows[..=last]
        .iter()
        .rev()
        .find(|r| r.display && !r.order.is_fully_discontinued())?;
    let order = &predecessor.order;

    if let Some(discontinued) = order.discontinue_date {
        let visits_started = order.effective_date.is_some_and(|e| e <= discontinued);
        return if visits_started {
            add_days(discontinued, 1)
        } else {
            Some(discontinued)
        };
    }

    order
        .frequency_end
        .or_else(|| calc_range_end(order))
        .and_then(|end| add_days(end, 1))
}

/// Adds a displayed row seeded from the row at or before `index`.
///
/// Reuses the first buffer row when one exists, then keeps one buffer
/// row behind the displayed rows unless the cap is reached.
///
/// # Returns
/// Index of the new row, or [`ScheduleError::RowLimitReached`].
///
/// # Panics
/// If `index` is out of range.
pub fn add_row(
    rows: &mut Vec<ScheduleRow>,
    index: usize,
    episode: &Episode,
    ctx: &mut CascadeContext,
    max_rows: usize,
    status_key: StatusKey,
) -> ScheduleResult<usize> {
    assert!(
        index < rows.len(),
        "row index {index} out of range for {} rows",
        rows.len()
    );
    if displayed_count(rows) >= max_rows {
        return Err(ScheduleError::RowLimitReached { max: max_rows });
    }

    let mut order = FrequencyOrder::new(status_key);
    order.effective_date = seed_effective_date(rows, index);
    if let Some(source) = rows[..=index].iter().rev().find(|r| r.display) {
        order.interval_kind = source.order.interval_kind;
        order.interval_key = source.order.interval_key;
    }

    let row = ScheduleRow::new(order);
    let new_index = match rows.iter().position(ScheduleRow::is_buffer) {
        Some(buffer) => {
            rows[buffer] = row;
            buffer
        }
        None => {
            rows.push(row);
            rows.len() - 1
        }
    };

    ensure_buffer(rows, max_rows, status_key);
    mark_show_add(rows, max_rows);
    debug!(
        new_index,
        seeded = ?rows[new_index].order.effective_date,
        "row added"
    );

    on_row_changed(rows, new_index, episode, ctx);
    Ok(new_index)
}

/// Removes a displayed row, then re-sorts and re-cascades.
///
/// # Returns
/// The refreshed status bar, or [`ScheduleError::LastRow`] when `index`
/// is the only displayed row.
///
/// # Panics
/// If `index` is out of range or names a buffer row.
pub fn remove_row(
    rows: &mut Vec<ScheduleRow>,
    index: usize,
    episode: &Episode,
    ctx: &mut CascadeContext,
    max_rows: usize,
    status_key: StatusKey,
) -> ScheduleResult<StatusBar> {
    assert!(
        index < rows.len() && rows[index].display,
        "row index {index} is not a displayed row"
    );
    if displayed_count(rows) == 1 {
        return Err(ScheduleError::LastRow);
    }

    rows.remove(index);
    ensure_buffer(rows, max_rows, status_key);
    sort_rows(rows);
    mark_show_add(rows, max_rows);
    debug!(index, remaining = displayed_count(rows), "row removed");

    let start = match last_displayed(rows) {
        Some(last) => index.saturating_sub(1).min(last),
        None => return Ok(StatusBar::calculate(rows, episode)),
    };
    Ok(on_row_changed(rows, start, episode, ctx))
}

/// Stable-sorts rows: dated displayed rows ascending, then undated
/// displayed rows, then buffer rows. Relative order within each group
/// is preserved.
///
/// Clears every `show_add` flag except the last displayed row's, which
/// keeps the flag if any row had it.
///
/// # Returns
/// The indices whose row changed position.
pub fn sort_rows(rows: &mut Vec<ScheduleRow>) -> BTreeSet<usize> {
    let could_add = rows.iter().any(|r| r.show_add);

    let mut tagged: Vec<(usize, ScheduleRow)> =
        std::mem::take(rows).into_iter().enumerate().collect();
    tagged.sort_by_key(|(_, row)| sort_key(row));

    let moved: BTreeSet<usize> = tagged
        .iter()
        .enumerate()
        .filter(|(position, (original, _))| position != original)
        .map(|(position, _)| position)
        .collect();
    *rows = tagged.into_iter().map(|(_, row)| row).collect();

    for row in rows.iter_mut() {
        row.show_add = false;
    }
    if let Some(last) = last_displayed(rows) {
        rows[last].show_add = could_add;
    }

    if !moved.is_empty() {
        trace!(moved = moved.len(), "rows reordered");
    }
    moved
}

/// Lets only the last displayed row offer "add", and only below the cap.
pub fn mark_show_add(rows: &mut [ScheduleRow], max_rows: usize) {
    let below_cap = displayed_count(rows) < max_rows;
    for row in rows.iter_mut() {
        row.show_add = false;
    }
    if let Some(last) = last_displayed(rows) {
        rows[last].show_add = below_cap;
    }
}

fn sort_key(row: &ScheduleRow) -> (u8, Option<NaiveDate>) {
    match (row.display, row.order.effective_date) {
        (true, Some(date)) => (0, Some(date)),
        (true, None) => (1, None),
        (false, _) => (2, None),
    }
}

/// Keeps exactly one buffer row, at the tail, while below the cap; none
/// at the cap.
pub fn ensure_buffer(rows: &mut Vec<ScheduleRow>, max_rows: usize, status_key: StatusKey) {
    let displayed = displayed_count(rows);
    rows.retain(|r| r.display);
    if displayed < max_rows {
        rows.push(ScheduleRow::buffer(status_key));
    }
}

fn refresh_row(rows: &mut [ScheduleRow], index: usize, episode: &Episode, allow_backdate: bool) {
    let frequency_end = calc_frequency_end(&rows[index].order, episode);
    rows[index].order.frequency_end = frequency_end;

    let valid_back = match index.checked_sub(1).map(|p| &rows[p]) {
        Some(pred) if pred.display => {
            allow_backdate
                || pred.order.is_fully_discontinued()
                || check_backdating_legality(&rows[index].order, &pred.order, allow_backdate)
        }
        _ => true,
    };
    let valid = validate_effective_date(rows[index].order.effective_date, episode.start);

    let row = &mut rows[index];
    row.valid_back = valid_back;
    row.valid = valid;
}

fn propagate(rows: &mut [ScheduleRow], from: usize, episode: &Episode, allow_backdate: bool) {
    let mut previous_end = rows[from].order.frequency_end;
    let mut updated = 0usize;

    for index in from + 1..rows.len() {
        if !rows[index].display {
            continue;
        }
        if rows[index].is_cascadable() {
            if let Some(end) = previous_end {
                rows[index].order.effective_date = add_days(end, 1);
                updated += 1;
            }
        }
        refresh_row(rows, index, episode, allow_backdate);
        previous_end = rows[index].order.frequency_end;
    }

    if updated > 0 {
        debug!(from, updated, "cascade propagated effective dates");
    }
}

fn refresh_work_weeks(rows: &mut [ScheduleRow], episode: &Episode) {
    for row in rows.iter_mut() {
        row.work_week_number = if row.display {
            work_week_number(row.order.effective_date, episode)
        } else {
            0
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cascade::SchedulerMode;
    use crate::scheduler::Severity;

    const MAX: usize = 6;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn episode() -> Episode {
        Episode::new(date(2024, 1, 1), date(2024, 2, 29))
    }

    fn weekly(start: Option<NaiveDate>, duration: u32) -> ScheduleRow {
        let mut order = FrequencyOrder::default()
            .with_duration(duration)
            .with_occurrences(2, None);
        order.effective_date = start;
        ScheduleRow::new(order)
    }

    fn chain(durations: &[u32]) -> (Vec<ScheduleRow>, CascadeContext) {
        let mut rows: Vec<ScheduleRow> = durations.iter().map(|&d| weekly(None, d)).collect();
        rows[0].order.effective_date = Some(date(2024, 1, 1));
        rows.push(ScheduleRow::buffer(StatusKey::New));
        let mut ctx = CascadeContext::new(false);
        on_row_changed(&mut rows, 0, &episode(), &mut ctx);
        (rows, ctx)
    }

    #[test]
    fn test_propagation_chains_dates() {
        let (rows, _) = chain(&[2, 1, 3]);
        assert_eq!(rows[0].order.frequency_end, Some(date(2024, 1, 14)));
        assert_eq!(rows[1].order.effective_date, Some(date(2024, 1, 15)));
        assert_eq!(rows[1].order.frequency_end, Some(date(2024, 1, 21)));
        assert_eq!(rows[2].order.effective_date, Some(date(2024, 1, 22)));
        assert_eq!(rows[2].order.frequency_end, Some(date(2024, 2, 11)));
        assert!(rows.iter().filter(|r| r.display).all(|r| r.valid && r.valid_back));

        // Buffer row untouched
        assert_eq!(rows[3].order.effective_date, None);
    }

    #[test]
    fn test_no_overlap_after_cascade() {
        let (rows, _) = chain(&[1, 2, 1, 2]);
        let displayed: Vec<_> = rows.iter().filter(|r| r.display).collect();
        for i in 0..displayed.len() {
            for j in i + 1..displayed.len() {
                assert!(displayed[i].order.frequency_end < displayed[j].order.effective_date);
            }
        }
    }

    #[test]
    fn test_locked_rows_keep_dates() {
        let mut rows = vec![
            weekly(Some(date(2024, 1, 1)), 1),
            weekly(Some(date(2024, 1, 20)), 1),
            weekly(None, 1),
        ];
        rows[1].order.patient_task_key = 99;
        let mut ctx = CascadeContext::new(false);
        on_row_changed(&mut rows, 0, &episode(), &mut ctx);

        assert_eq!(rows[1].order.effective_date, Some(date(2024, 1, 20)));
        assert_eq!(rows[1].order.frequency_end, Some(date(2024, 1, 26)));
        // Chain continues from the locked row's end
        assert_eq!(rows[2].order.effective_date, Some(date(2024, 1, 27)));
    }

    #[test]
    fn test_disabled_rows_skipped() {
        let mut rows = vec![weekly(Some(date(2024, 1, 1)), 1), weekly(Some(date(2024, 2, 1)), 1)];
        rows[1].disabled = true;
        let mut ctx = CascadeContext::new(false);
        on_row_changed(&mut rows, 0, &episode(), &mut ctx);
        assert_eq!(rows[1].order.effective_date, Some(date(2024, 2, 1)));
    }

    #[test]
    fn test_backdate_marks_row() {
        let (mut rows, mut ctx) = chain(&[2, 1]);
        rows[1].order.effective_date = Some(date(2024, 1, 10));
        on_row_changed(&mut rows, 1, &episode(), &mut ctx);
        assert!(rows[1].valid);
        assert!(!rows[1].valid_back);

        let mut permissive = CascadeContext::new(true);
        on_row_changed(&mut rows, 1, &episode(), &mut permissive);
        assert!(rows[1].valid_back);
    }

    #[test]
    fn test_fully_discontinued_predecessor_forces_valid_back() {
        let (mut rows, mut ctx) = chain(&[2, 1]);
        rows[0].order.status_key = StatusKey::Current;
        rows[0].order.discontinue_flag = true;
        rows[1].order.effective_date = Some(date(2024, 1, 3));
        on_row_changed(&mut rows, 1, &episode(), &mut ctx);
        assert!(rows[1].valid_back);
    }

    #[test]
    fn test_invalid_row_does_not_propagate() {
        let (mut rows, mut ctx) = chain(&[1, 1]);
        let before = rows[1].order.effective_date;
        rows[0].order.effective_date = Some(date(2023, 12, 1));
        on_row_changed(&mut rows, 0, &episode(), &mut ctx);
        assert!(!rows[0].valid);
        assert_eq!(rows[1].order.effective_date, before);
    }

    #[test]
    fn test_loading_mode_disables_cascade() {
        let mut rows = vec![weekly(Some(date(2024, 1, 1)), 2), weekly(Some(date(2024, 1, 3)), 1)];
        let mut ctx = CascadeContext::new(false).with_mode(SchedulerMode::BulkLoading);
        on_row_changed(&mut rows, 0, &episode(), &mut ctx);
        assert_eq!(rows[0].order.frequency_end, None);
        assert_eq!(rows[1].order.effective_date, Some(date(2024, 1, 3)));
    }

    #[test]
    fn test_sort_suppression_is_one_shot() {
        let (mut rows, mut ctx) = chain(&[1, 1]);
        rows[1].order.effective_date = Some(date(2024, 2, 1));
        ctx.suppress([0]);

        on_row_changed(&mut rows, 0, &episode(), &mut ctx);
        assert_eq!(rows[1].order.effective_date, Some(date(2024, 2, 1)));

        on_row_changed(&mut rows, 0, &episode(), &mut ctx);
        assert_eq!(rows[1].order.effective_date, Some(date(2024, 1, 8)));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_out_of_range_index_panics() {
        let mut rows = vec![weekly(None, 1)];
        on_row_changed(&mut rows, 3, &episode(), &mut CascadeContext::default());
    }

    #[test]
    fn test_work_week_numbers() {
        let (rows, _) = chain(&[2, 1, 1]);
        let weeks: Vec<u32> = rows.iter().map(|r| r.work_week_number).collect();
        assert_eq!(weeks, vec![0, 2, 3, 0]);
    }

    #[test]
    fn test_status_from_cascade() {
        let mut rows = vec![weekly(Some(date(2024, 1, 1)), 4)];
        let ep = Episode::new(date(2024, 1, 1), date(2024, 1, 28));
        let status = on_row_changed(&mut rows, 0, &ep, &mut CascadeContext::default());
        assert_eq!(status.remaining_days, 0);
        assert_eq!(status.severity, Severity::None);
    }

    #[test]
    fn test_seed_from_running_predecessor() {
        let (rows, _) = chain(&[2]);
        assert_eq!(seed_effective_date(&rows, 0), Some(date(2024, 1, 15)));

        // No frequency end: fall back to the first period
        let bare = vec![weekly(Some(date(2024, 1, 1)), 0)];
        assert_eq!(seed_effective_date(&bare, 0), Some(date(2024, 1, 8)));

        assert_eq!(seed_effective_date(&[weekly(None, 1)], 0), None);
        assert_eq!(seed_effective_date(&[], 0), None);
    }

    #[test]
    fn test_seed_from_discontinued_predecessor() {
        let (mut rows, _) = chain(&[2]);
        rows[0].order.discontinue_date = Some(date(2024, 1, 5));
        assert_eq!(seed_effective_date(&rows, 0), Some(date(2024, 1, 6)));

        // Discontinued before visits began: successor starts that same day
        rows[0].order.effective_date = Some(date(2024, 1, 10));
        assert_eq!(seed_effective_date(&rows, 0), Some(date(2024, 1, 5)));
    }

    #[test]
    fn test_seed_skips_fully_discontinued() {
        let (mut rows, _) = chain(&[1, 1]);
        rows[1].order.status_key = StatusKey::Current;
        rows[1].order.discontinue_flag = true;
        assert_eq!(seed_effective_date(&rows, 1), Some(date(2024, 1, 8)));
    }

    #[test]
    fn test_add_row_uses_buffer() {
        let (mut rows, mut ctx) = chain(&[2]);
        let index = add_row(&mut rows, 0, &episode(), &mut ctx, MAX, StatusKey::New).unwrap();
        assert_eq!(index, 1);
        assert_eq!(rows.len(), 3);
        assert!(rows[1].display);
        assert!(rows[2].is_buffer());
        assert_eq!(rows[1].order.effective_date, Some(date(2024, 1, 15)));
        assert!(rows[1].show_add);
        assert!(!rows[0].show_add);
    }

    #[test]
    fn test_add_row_respects_cap() {
        let (mut rows, mut ctx) = chain(&[1]);
        for _ in 1..3 {
            let last = last_displayed(&rows).unwrap();
            add_row(&mut rows, last, &episode(), &mut ctx, 3, StatusKey::New).unwrap();
        }
        assert_eq!(displayed_count(&rows), 3);
        assert!(rows.iter().all(|r| r.display));
        assert!(rows.iter().all(|r| !r.show_add));

        let err = add_row(&mut rows, 2, &episode(), &mut ctx, 3, StatusKey::New).unwrap_err();
        assert_eq!(err, ScheduleError::RowLimitReached { max: 3 });
    }

    #[test]
    fn test_remove_row_restores_buffer() {
        let (mut rows, mut ctx) = chain(&[1]);
        for _ in 1..3 {
            let last = last_displayed(&rows).unwrap();
            add_row(&mut rows, last, &episode(), &mut ctx, 3, StatusKey::New).unwrap();
        }
        remove_row(&mut rows, 1, &episode(), &mut ctx, 3, StatusKey::New).unwrap();

        assert_eq!(displayed_count(&rows), 2);
        assert!(rows[2].is_buffer());
        assert!(rows[1].show_add);
        // Re-cascaded: second row now follows the first
        assert_eq!(rows[1].order.effective_date, Some(date(2024, 1, 8)));
    }

    #[test]
    fn test_remove_last_row_refused() {
        let (mut rows, mut ctx) = chain(&[1]);
        let err = remove_row(&mut rows, 0, &episode(), &mut ctx, MAX, StatusKey::New).unwrap_err();
        assert_eq!(err, ScheduleError::LastRow);
    }

    #[test]
    fn test_sort_rows() {
        let mut rows = vec![
            weekly(None, 1),
            weekly(Some(date(2024, 1, 20)), 1),
            ScheduleRow::buffer(StatusKey::New),
            weekly(Some(date(2024, 1, 1)), 1),
        ];
        rows[0].show_add = true;

        let moved = sort_rows(&mut rows);
        assert_eq!(rows[0].order.effective_date, Some(date(2024, 1, 1)));
        assert_eq!(rows[1].order.effective_date, Some(date(2024, 1, 20)));
        assert_eq!(rows[2].order.effective_date, None);
        assert!(rows[3].is_buffer());
        // The 01-20 row keeps its slot
        assert_eq!(moved, BTreeSet::from([0, 2, 3]));

        assert!(rows[2].show_add);
        assert_eq!(rows.iter().filter(|r| r.show_add).count(), 1);

        // Second sort is a no-op
        let snapshot = rows.clone();
        assert!(sort_rows(&mut rows).is_empty());
        assert_eq!(rows, snapshot);
    }

    #[test]
    fn test_sort_is_stable_for_equal_dates() {
        let mut rows = vec![
            weekly(Some(date(2024, 1, 8)), 1),
            weekly(Some(date(2024, 1, 1)), 2),
            weekly(Some(date(2024, 1, 1)), 3),
        ];
        sort_rows(&mut rows);
        let durations: Vec<u32> = rows.iter().map(|r| r.order.duration).collect();
        assert_eq!(durations, vec![2, 3, 1]);
    }

    #[test]
    fn test_refresh_all_keeps_loaded_dates() {
        let mut rows = vec![
            weekly(Some(date(2024, 1, 1)), 2),
            weekly(Some(date(2024, 1, 22)), 1),
        ];
        let status = refresh_all(&mut rows, &episode(), false);
        assert_eq!(rows[1].order.effective_date, Some(date(2024, 1, 22)));
        assert_eq!(rows[1].order.frequency_end, Some(date(2024, 1, 28)));
        assert_eq!(rows[1].work_week_number, 3);
        assert!(rows[1].valid && rows[1].valid_back);
        assert_eq!(status.remaining_days, 32);
    }
}
