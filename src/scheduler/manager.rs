//! Schedule manager: owns the row list for one edit session.
//!
//! Every edit is routed through the cascade, then the rows are re-sorted.
//! Rows that move during a sort get their one-shot suppression flag and
//! are refreshed without propagating, so the sort cannot overwrite the
//! dates it just reordered.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use tracing::debug;

use super::{assemble_submission, DiscontinuedRow, StatusBar, Submission};
use crate::cascade::{self, CascadeContext, SchedulerMode};
use crate::config::SchedulerConfig;
use crate::dates::parse_date;
use crate::encoding;
use crate::models::{
    Discipline, Episode, FrequencyOrder, FrequencyRanges, IntervalKey, IntervalKind, PrnVisits,
    ScheduleRow, StatusKey,
};
use crate::validation::{validate_frequency_set, ValidationResult};
use crate::{ScheduleError, ScheduleResult};

/// Orchestrates rows, cascade, validation and encoding for an episode.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use care_frequency::config::SchedulerConfig;
/// use care_frequency::models::{Discipline, Episode};
/// use care_frequency::scheduler::ScheduleManager;
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2024, 1, 28).unwrap();
/// let mut manager = ScheduleManager::new(
///     Episode::new(start, end),
///     Discipline::SkilledNursing,
///     SchedulerConfig::default(),
/// );
///
/// manager.set_effective_date(0, Some(start));
/// manager.set_occurrences(0, Some(2), None);
/// let status = manager.set_duration(0, 4);
///
/// assert_eq!(status.remaining_days, 0);
/// assert_eq!(manager.encode(), "2W4");
/// ```
#[derive(Debug, Clone)]
pub struct ScheduleManager {
    episode: Episode,
    discipline: Discipline,
    config: SchedulerConfig,
    ranges: FrequencyRanges,
    prn: Option<PrnVisits>,
    rows: Vec<ScheduleRow>,
    discontinued: Vec<DiscontinuedRow>,
    ctx: CascadeContext,
    status: StatusBar,
}

impl ScheduleManager {
    /// Starts a session with one empty row and one buffer row.
    pub fn new(episode: Episode, discipline: Discipline, config: SchedulerConfig) -> Self {
        let status_key = discipline.new_order_status();
        let mut rows = vec![ScheduleRow::new(FrequencyOrder::new(status_key))];
        cascade::ensure_buffer(&mut rows, config.max_rows(), status_key);
        cascade::mark_show_add(&mut rows, config.max_rows());
        let status = StatusBar::calculate(&rows, &episode);

        Self {
            episode,
            discipline,
            config,
            ranges: FrequencyRanges::default(),
            prn: None,
            rows,
            discontinued: Vec::new(),
            ctx: CascadeContext::new(config.allow_backdate()),
            status,
        }
    }

    /// Sets the frequency lookup table.
    pub fn with_ranges(mut self, ranges: FrequencyRanges) -> Self {
        self.ranges = ranges;
        self
    }

    /// Sets the PRN allowance.
    pub fn with_prn(mut self, prn: PrnVisits) -> Self {
        self.prn = Some(prn);
        self
    }

    /// Replaces or clears the PRN allowance.
    pub fn set_prn(&mut self, prn: Option<PrnVisits>) {
        self.prn = prn;
    }

    /// Episode bounding the session.
    pub fn episode(&self) -> &Episode {
        &self.episode
    }

    /// Discipline that owns the schedule.
    pub fn discipline(&self) -> Discipline {
        self.discipline
    }

    /// Session configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Frequency lookup table.
    pub fn ranges(&self) -> &FrequencyRanges {
        &self.ranges
    }

    /// PRN allowance, if any.
    pub fn prn(&self) -> Option<&PrnVisits> {
        self.prn.as_ref()
    }

    /// All rows, buffer rows included.
    pub fn rows(&self) -> &[ScheduleRow] {
        &self.rows
    }

    /// Rows swept out while discontinued.
    pub fn discontinued_rows(&self) -> &[DiscontinuedRow] {
        &self.discontinued
    }

    /// Status bar as of the last recomputation.
    pub fn status_bar(&self) -> &StatusBar {
        &self.status
    }

    /// Current cascade mode.
    pub fn mode(&self) -> SchedulerMode {
        self.ctx.mode
    }

    /// Status key given to rows created in this session.
    pub fn new_order_status(&self) -> StatusKey {
        self.discipline.new_order_status()
    }

    // ---- loading ----

    /// Replaces the rows with persisted orders.
    ///
    /// Loaded dates are kept as-is: no propagation runs, only each row's
    /// own derived fields are refreshed.
    pub fn load(&mut self, orders: Vec<FrequencyOrder>) -> ScheduleResult<StatusBar> {
        let max = self.config.max_rows();
        if orders.len() > max {
            return Err(ScheduleError::RowLimitReached { max });
        }

        self.begin_loading();
        self.rows = orders.into_iter().map(ScheduleRow::decoded).collect();
        if self.rows.is_empty() {
            self.rows
                .push(ScheduleRow::new(FrequencyOrder::new(self.new_order_status())));
        }
        self.discontinued.clear();
        debug!(rows = self.rows.len(), "loaded persisted orders");
        Ok(self.finish_loading())
    }

    /// Loads orders from a canonical frequency string.
    ///
    /// The string carries no dates: the first order starts on the episode
    /// start and the rest are chained by the cascade.
    pub fn load_encoded(&mut self, frequency: &str) -> ScheduleResult<StatusBar> {
        let decoded = encoding::decode(frequency, &self.ranges)?;

        let mut orders: Vec<FrequencyOrder> = decoded
            .orders
            .into_iter()
            .map(|order| order.with_status(StatusKey::Current))
            .collect();
        if let Some(first) = orders.first_mut() {
            first.effective_date = Some(self.episode.start);
        }
        if let Some(count) = decoded.prn_count {
            let mut prn = self.prn.take().unwrap_or_default();
            prn.count = Some(count);
            self.prn = Some(prn);
        }

        self.load(orders)?;
        Ok(self.cascade(0))
    }

    /// Disables cascades while rows are populated.
    pub fn begin_loading(&mut self) {
        self.ctx.mode = SchedulerMode::BulkLoading;
        self.ctx.suppress_next_cascade.clear();
    }

    /// Re-enables cascades and refreshes every row without propagating.
    pub fn finish_loading(&mut self) -> StatusBar {
        let status_key = self.new_order_status();
        cascade::ensure_buffer(&mut self.rows, self.config.max_rows(), status_key);
        cascade::sort_rows(&mut self.rows);
        cascade::mark_show_add(&mut self.rows, self.config.max_rows());

        self.ctx.mode = SchedulerMode::Editing;
        self.status = cascade::refresh_all(&mut self.rows, &self.episode, self.ctx.allow_backdate);
        self.status.clone()
    }

    // ---- field edits ----

    /// Sets a row's effective date, cascades, and re-sorts.
    ///
    /// # Panics
    /// If `index` is not a displayed row.
    pub fn set_effective_date(&mut self, index: usize, date: Option<NaiveDate>) -> StatusBar {
        self.assert_displayed(index);
        self.rows[index].order.effective_date = date;
        self.cascade(index);
        self.resort();
        self.status.clone()
    }

    /// Like [`set_effective_date`](Self::set_effective_date) for raw input.
    /// Unparsable input clears the date.
    pub fn set_effective_date_str(&mut self, index: usize, input: &str) -> StatusBar {
        self.set_effective_date(index, parse_date(input))
    }

    /// Sets a row's interval and cascades.
    pub fn set_interval(&mut self, index: usize, kind: IntervalKind, key: IntervalKey) -> StatusBar {
        self.assert_displayed(index);
        let order = &mut self.rows[index].order;
        order.interval_kind = kind;
        order.interval_key = key;
        self.cascade(index)
    }

    /// Sets a row's duration and cascades.
    pub fn set_duration(&mut self, index: usize, duration: u32) -> StatusBar {
        self.assert_displayed(index);
        self.rows[index].order.duration = duration;
        self.cascade(index)
    }

    /// Sets visits per period. Dates are unaffected.
    pub fn set_occurrences(&mut self, index: usize, min: Option<u32>, max: Option<u32>) {
        self.assert_displayed(index);
        let order = &mut self.rows[index].order;
        order.occurrence_min = min;
        order.occurrence_max = max;
    }

    /// Terminates a row's order early and cascades.
    ///
    /// Current orders are also flagged for removal, pending save.
    pub fn discontinue(&mut self, index: usize, date: NaiveDate, reason: &str) -> StatusBar {
        self.assert_displayed(index);
        let order = &mut self.rows[index].order;
        order.discontinue_date = Some(date);
        order.discontinue_reason = reason.trim().to_string();
        if order.status_key == StatusKey::Current {
            order.discontinue_flag = true;
            order.discontinued_not_saved = true;
        }
        debug!(index, %date, "order discontinued");
        self.cascade(index)
    }

    /// Reverts a discontinuation and cascades.
    pub fn clear_discontinuation(&mut self, index: usize) -> StatusBar {
        self.assert_displayed(index);
        let order = &mut self.rows[index].order;
        order.discontinue_date = None;
        order.discontinue_reason.clear();
        order.discontinue_flag = false;
        order.discontinued_not_saved = false;
        self.cascade(index)
    }

    /// Records that pending discontinuations were persisted.
    pub fn mark_saved(&mut self) {
        let orders = self
            .rows
            .iter_mut()
            .map(|r| &mut r.order)
            .chain(self.discontinued.iter_mut().map(|d| &mut d.order));
        for order in orders {
            order.discontinued_not_saved = false;
        }
    }

    // ---- structure ----

    /// Adds a row after `index` and re-sorts.
    pub fn add_row(&mut self, index: usize) -> ScheduleResult<StatusBar> {
        let status_key = self.new_order_status();
        cascade::add_row(
            &mut self.rows,
            index,
            &self.episode,
            &mut self.ctx,
            self.config.max_rows(),
            status_key,
        )?;
        self.status = StatusBar::calculate(&self.rows, &self.episode);
        self.resort();
        Ok(self.status.clone())
    }

    /// Removes a displayed row, re-sorts and re-cascades.
    pub fn remove_row(&mut self, index: usize) -> ScheduleResult<StatusBar> {
        let status_key = self.new_order_status();
        self.status = cascade::remove_row(
            &mut self.rows,
            index,
            &self.episode,
            &mut self.ctx,
            self.config.max_rows(),
            status_key,
        )?;
        Ok(self.status.clone())
    }

    /// Re-sorts the rows.
    ///
    /// # Returns
    /// The indices whose row moved.
    pub fn sort(&mut self) -> BTreeSet<usize> {
        self.resort()
    }

    /// Moves fully discontinued rows out of the editor into the
    /// discontinued stash.
    ///
    /// Stash indices are positions in the merged list of displayed and
    /// stashed rows, so every sweep renumbers earlier entries against the
    /// current layout.
    ///
    /// # Returns
    /// Number of rows swept.
    pub fn sweep_discontinued(&mut self) -> usize {
        let mut stashed = std::mem::take(&mut self.discontinued);
        stashed.sort_by_key(|d| d.index);

        let mut merged: Vec<SweepSlot> = std::mem::take(&mut self.rows)
            .into_iter()
            .filter(|r| r.display)
            .map(SweepSlot::Displayed)
            .collect();
        for entry in stashed {
            let at = entry.index.min(merged.len());
            merged.insert(at, SweepSlot::Stashed(entry.order));
        }

        let mut swept = 0;
        for (position, slot) in merged.into_iter().enumerate() {
            match slot {
                SweepSlot::Stashed(order) => {
                    self.discontinued.push(DiscontinuedRow::new(position, order));
                }
                SweepSlot::Displayed(row) if row.order.is_fully_discontinued() => {
                    self.discontinued.push(DiscontinuedRow::new(position, row.order));
                    swept += 1;
                }
                SweepSlot::Displayed(row) => self.rows.push(row),
            }
        }

        let status_key = self.new_order_status();
        if self.rows.is_empty() {
            self.rows.push(ScheduleRow::new(FrequencyOrder::new(status_key)));
        }
        cascade::ensure_buffer(&mut self.rows, self.config.max_rows(), status_key);
        cascade::mark_show_add(&mut self.rows, self.config.max_rows());
        self.status = cascade::refresh_all(&mut self.rows, &self.episode, self.ctx.allow_backdate);

        if swept > 0 {
            debug!(swept, stashed = self.discontinued.len(), "swept discontinued rows");
        }
        swept
    }

    // ---- output ----

    /// Runs the submission gate against the current row flags.
    pub fn validate(&self) -> ValidationResult {
        validate_frequency_set(&self.rows, &self.status, &self.ranges, self.prn.as_ref())
    }

    /// Canonical frequency string of the submitted orders.
    pub fn encode(&self) -> String {
        let orders = assemble_submission(&self.rows, &self.discontinued);
        encoding::encode_orders(&orders, &self.ranges, self.prn.as_ref())
    }

    /// Discontinuation summary over displayed and swept rows.
    pub fn encode_discontinuations(&self) -> String {
        let displayed = self.rows.iter().filter(|r| r.display).map(|r| &r.order);
        let swept = self.discontinued.iter().map(|d| &d.order);
        encoding::encode_discontinuations(displayed.chain(swept))
    }

    /// Assembles the submission without running the gate.
    pub fn submission(&self) -> Submission {
        Submission {
            orders: assemble_submission(&self.rows, &self.discontinued),
            frequency: self.encode(),
            discontinuations: self.encode_discontinuations(),
        }
    }

    /// Assembles the submission if the gate passes.
    pub fn submit(&self) -> Result<Submission, ValidationResult> {
        let validation = self.validate();
        if validation.error {
            debug!(reason = %validation.text, "submission refused");
            return Err(validation);
        }
        let submission = self.submission();
        debug!(orders = submission.orders.len(), "submission assembled");
        Ok(submission)
    }

    // ---- internals ----

    fn cascade(&mut self, index: usize) -> StatusBar {
        self.status = cascade::on_row_changed(&mut self.rows, index, &self.episode, &mut self.ctx);
        self.status.clone()
    }

    fn resort(&mut self) -> BTreeSet<usize> {
        let moved = cascade::sort_rows(&mut self.rows);
        if moved.is_empty() {
            return moved;
        }

        self.ctx.suppress(moved.iter().copied());
        for &index in &moved {
            if self.rows[index].display {
                self.cascade(index);
            } else {
                self.ctx.take_suppression(index);
            }
        }
        self.status = cascade::refresh_all(&mut self.rows, &self.episode, self.ctx.allow_backdate);
        moved
    }

    fn assert_displayed(&self, index: usize) {
        assert!(
            index < self.rows.len() && self.rows[index].display,
            "row index {index} is not a displayed row"
        );
    }
}

/// Entry of the merged layout rebuilt during a sweep.
enum SweepSlot {
    Displayed(ScheduleRow),
    Stashed(FrequencyOrder),
}
