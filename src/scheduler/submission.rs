//! Submission assembly.
//!
//! Merges the displayed rows with rows swept out of the editor while
//! discontinued, restoring each swept row to its recorded position, and
//! drops fully discontinued orders. The filter is the same active
//! predicate the encoder uses, so the submitted orders and the encoded
//! frequency string always describe the same set.

use serde::{Deserialize, Serialize};

use crate::models::{FrequencyOrder, ScheduleRow};

/// A row removed from the editor while discontinued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscontinuedRow {
    /// Position in the merged list of displayed and swept rows.
    pub index: usize,
    /// The removed order.
    pub order: FrequencyOrder,
}

impl DiscontinuedRow {
    /// Creates a new entry.
    pub fn new(index: usize, order: FrequencyOrder) -> Self {
        Self { index, order }
    }
}

/// Submission-ready output of an edit session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    /// Orders to persist, in position order.
    pub orders: Vec<FrequencyOrder>,
    /// Canonical frequency string.
    pub frequency: String,
    /// Discontinuation summary (empty when nothing was discontinued).
    pub discontinuations: String,
}

/// Merges displayed rows and swept rows into position order, keeping
/// only active orders.
///
/// Swept rows are re-inserted in ascending recorded index; an index past
/// the end appends.
pub fn assemble_submission(
    rows: &[ScheduleRow],
    discontinued_rows: &[DiscontinuedRow],
) -> Vec<FrequencyOrder> {
    let mut merged: Vec<&FrequencyOrder> = rows
        .iter()
        .filter(|r| r.display)
        .map(|r| &r.order)
        .collect();

    let mut swept: Vec<&DiscontinuedRow> = discontinued_rows.iter().collect();
    swept.sort_by_key(|d| d.index);
    for entry in swept {
        let at = entry.index.min(merged.len());
        merged.insert(at, &entry.order);
    }

    merged
        .into_iter()
        .filter(|order| order.is_active())
        .cloned()
        .collect()
}
