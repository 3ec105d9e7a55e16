//! Time intervals and busy-set merging.
//!
//! Busy intervals arrive unordered from an external free/busy query and may
//! overlap or be malformed. [`merge`] collapses them into the canonical form
//! every other stage works with: sorted by start, pairwise disjoint, and with
//! touching intervals joined.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An absolute point in time. All comparisons are on the UTC timeline.
pub type Instant = DateTime<Utc>;

/// A half-open time range `[start, end)`.
///
/// Well-formed intervals satisfy `end > start`. The fields are public so callers
/// can build intervals directly; anything malformed is dropped by [`merge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub start: Instant,
    pub end: Instant,
}

impl Interval {
    /// Build an interval, returning `None` unless `end > start`.
    pub fn new(start: Instant, end: Instant) -> Option<Self> {
        (end > start).then_some(Self { start, end })
    }

    pub fn is_well_formed(&self) -> bool {
        self.end > self.start
    }

    /// Whole minutes covered by the interval (floored, never negative).
    pub fn minutes(&self) -> i64 {
        (self.end - self.start).num_minutes().max(0)
    }

    /// Clip to `[window_start, window_end]`, or `None` if nothing remains.
    /// Touching the window edge leaves nothing.
    pub fn clip(&self, window_start: Instant, window_end: Instant) -> Option<Self> {
        Self::new(self.start.max(window_start), self.end.min(window_end))
    }
}

/// Merge a busy list into sorted, disjoint, non-touching intervals.
///
/// Intervals with `end <= start` are discarded. An interval whose start is at or
/// before the current merged end is absorbed into it, so `[9:00, 10:00)` and
/// `[10:00, 11:00)` become `[9:00, 11:00)`. Merging a merged set is a no-op.
pub fn merge(intervals: &[Interval]) -> Vec<Interval> {
    let mut sorted: Vec<Interval> = intervals
        .iter()
        .filter(|it| it.is_well_formed())
        .copied()
        .collect();

    if sorted.is_empty() {
        return Vec::new();
    }

    // Sort by start time (then by end time for stability).
    sorted.sort_by_key(|it| (it.start, it.end));

    let mut merged: Vec<Interval> = Vec::with_capacity(sorted.len());
    for it in sorted {
        if let Some(last) = merged.last_mut() {
            if it.start <= last.end {
                last.end = last.end.max(it.end);
                continue;
            }
        }
        merged.push(it);
    }

    tracing::trace!(input = intervals.len(), merged = merged.len(), "merged busy intervals");
    merged
}
