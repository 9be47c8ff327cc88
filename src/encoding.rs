//! Canonical frequency strings.
//!
//! # Grammar
//!
//! ```text
//! frequency  := segment ("," segment)*
//! segment    := visits TOKEN duration | count "PRN"
//! visits     := min ("-" max)?
//! ```
//!
//! `TOKEN` comes from the [`FrequencyRanges`] table (`D`, `W`, `EOW`, `M` by
//! default). `max` is written only when set and different from `min`; a
//! missing `min` is written as `0`. Examples: `2W4`, `1-2W3, 1EOW2`, `3D5, 2PRN`.
//!
//! Only displayed rows whose order is active are encoded, in row order.
//! The discontinuation summary is separate and covers every order with a
//! discontinue date, active or not.

use serde::{Deserialize, Serialize};

use crate::dates::format_date;
use crate::error::DecodeError;
use crate::models::{FrequencyOrder, FrequencyRanges, PrnVisits, ScheduleRow};

const SEGMENT_SEPARATOR: &str = ", ";
const PRN_TOKEN: &str = "PRN";
const DISCONTINUATIONS_PREFIX: &str = "Discontinuations: ";

/// Orders included in encoded and submitted output.
pub fn active_orders(rows: &[ScheduleRow]) -> impl Iterator<Item = &FrequencyOrder> {
    rows.iter()
        .filter(|r| r.display && r.order.is_active())
        .map(|r| &r.order)
}

/// Encodes one order as a segment (e.g. `1-2W3`).
pub fn encode_segment(order: &FrequencyOrder, ranges: &FrequencyRanges) -> String {
    let min = order.occurrence_min.unwrap_or(0);
    let visits = match order.occurrence_max {
        Some(max) if max != min => format!("{min}-{max}"),
        _ => min.to_string(),
    };
    format!(
        "{visits}{}{}",
        ranges.token_for(order.period()),
        order.duration
    )
}

/// Encodes the active displayed orders as a frequency string.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use care_frequency::encoding::encode;
/// use care_frequency::models::{FrequencyOrder, FrequencyRanges, ScheduleRow};
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let rows = vec![
///     ScheduleRow::new(FrequencyOrder::default().with_effective_date(start)
///         .with_occurrences(2, None).with_duration(2)),
///     ScheduleRow::new(FrequencyOrder::default().with_occurrences(1, Some(2)).with_duration(2)),
/// ];
/// assert_eq!(encode(&rows, &FrequencyRanges::default()), "2W2, 1-2W2");
/// ```
pub fn encode(rows: &[ScheduleRow], ranges: &FrequencyRanges) -> String {
    encode_with_prn(rows, ranges, None)
}

/// Encodes the active displayed orders followed by the PRN segment, if any.
pub fn encode_with_prn(
    rows: &[ScheduleRow],
    ranges: &FrequencyRanges,
    prn: Option<&PrnVisits>,
) -> String {
    encode_orders(active_orders(rows), ranges, prn)
}

/// Encodes the given orders as-is, in iteration order, followed by the
/// PRN segment if any. Callers filter out inactive orders.
pub fn encode_orders<'a, I>(orders: I, ranges: &FrequencyRanges, prn: Option<&PrnVisits>) -> String
where
    I: IntoIterator<Item = &'a FrequencyOrder>,
{
    let mut segments: Vec<String> = orders
        .into_iter()
        .map(|order| encode_segment(order, ranges))
        .collect();
    if let Some(count) = prn.and_then(|p| p.count).filter(|&c| c > 0) {
        segments.push(format!("{count}{PRN_TOKEN}"));
    }
    segments.join(SEGMENT_SEPARATOR)
}

/// Summarizes discontinuations as `Discontinuations: d1, d2, Reason: r`.
///
/// Dates are unique, in order of first appearance. The reason is the
/// first non-empty one, with apostrophes stripped. Returns an empty
/// string when no order has a discontinue date.
pub fn encode_discontinuations<'a, I>(orders: I) -> String
where
    I: IntoIterator<Item = &'a FrequencyOrder>,
{
    let mut dates = Vec::new();
    let mut reason: Option<&str> = None;

    for order in orders {
        let Some(date) = order.discontinue_date else {
            continue;
        };
        if !dates.contains(&date) {
            dates.push(date);
        }
        if reason.is_none() && !order.discontinue_reason.trim().is_empty() {
            reason = Some(order.discontinue_reason.trim());
        }
    }

    if dates.is_empty() {
        return String::new();
    }

    let listed: Vec<String> = dates.into_iter().map(format_date).collect();
    let mut summary = format!("{DISCONTINUATIONS_PREFIX}{}", listed.join(SEGMENT_SEPARATOR));
    if let Some(reason) = reason {
        summary.push_str(", Reason: ");
        summary.push_str(&sanitize_reason(reason));
    }
    summary
}

/// Strips apostrophes, which the downstream field grammar reserves.
pub fn sanitize_reason(reason: &str) -> String {
    reason.chars().filter(|c| !matches!(c, '\'' | '\u{2019}')).collect()
}

/// Result of decoding a frequency string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecodedFrequency {
    /// One order per scheduled segment, in string order.
    pub orders: Vec<FrequencyOrder>,
    /// PRN visit count, if a PRN segment was present.
    pub prn_count: Option<u32>,
}

/// Parses a frequency string back into orders.
///
/// Decoded orders carry only interval, visit counts and duration; dates
/// and status come from the persisted record they belong to.
///
/// # Errors
/// [`DecodeError`] naming the first malformed segment.
pub fn decode(input: &str, ranges: &FrequencyRanges) -> Result<DecodedFrequency, DecodeError> {
    let mut decoded = DecodedFrequency::default();
    if input.trim().is_empty() {
        return Ok(decoded);
    }

    for (position, raw) in input.split(',').enumerate() {
        let segment = raw.trim();
        if segment.is_empty() {
            return Err(DecodeError::EmptySegment(position));
        }
        match parse_segment(segment, ranges)? {
            Segment::Order(order) => decoded.orders.push(order),
            Segment::Prn(count) => decoded.prn_count = Some(count),
        }
    }
    Ok(decoded)
}

enum Segment {
    Order(FrequencyOrder),
    Prn(u32),
}

fn parse_segment(segment: &str, ranges: &FrequencyRanges) -> Result<Segment, DecodeError> {
    let (min_digits, rest) = split_digits(segment);
    if min_digits.is_empty() {
        return Err(DecodeError::MissingOccurrence(segment.to_string()));
    }
    let min = parse_number(min_digits, segment)?;

    let (max, rest) = match rest.strip_prefix('-') {
        Some(after_dash) => {
            let (max_digits, rest) = split_digits(after_dash);
            if max_digits.is_empty() {
                return Err(DecodeError::InvalidRange(segment.to_string()));
            }
            let max = parse_number(max_digits, segment)?;
            if max < min {
                return Err(DecodeError::InvalidRange(segment.to_string()));
            }
            (Some(max), rest)
        }
        None => (None, rest),
    };

    let token_len = rest
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(rest.len());
    let (token, rest) = rest.split_at(token_len);

    if token.eq_ignore_ascii_case(PRN_TOKEN) && max.is_none() && rest.is_empty() {
        return Ok(Segment::Prn(min));
    }

    let period = ranges
        .period_for_token(token)
        .ok_or_else(|| DecodeError::UnknownToken {
            token: token.to_string(),
            segment: segment.to_string(),
        })?;

    let (duration_digits, trailing) = split_digits(rest);
    if duration_digits.is_empty() {
        return Err(DecodeError::MissingDuration(segment.to_string()));
    }
    if !trailing.is_empty() {
        return Err(DecodeError::InvalidNumber(segment.to_string()));
    }
    let duration = parse_number(duration_digits, segment)?;

    let (kind, key) = period.interval();
    Ok(Segment::Order(
        FrequencyOrder::default()
            .with_interval(kind, key)
            .with_occurrences(min, max)
            .with_duration(duration),
    ))
}

fn split_digits(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

fn parse_number(digits: &str, segment: &str) -> Result<u32, DecodeError> {
    digits
        .parse()
        .map_err(|_| DecodeError::InvalidNumber(segment.to_string()))
}
