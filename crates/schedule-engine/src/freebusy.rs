//! Compute free gaps inside a window from a busy list.
//!
//! Merges the busy intervals, clips them to the window, then walks them with a
//! cursor and emits the uncovered stretches in chronological order.

use serde::{Deserialize, Serialize};

use crate::interval::{self, Instant, Interval};

/// A stretch of the window not covered by any busy interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeGap {
    pub start: Instant,
    pub end: Instant,
    pub duration_minutes: i64,
}

impl FreeGap {
    fn between(start: Instant, end: Instant) -> Self {
        Self {
            start,
            end,
            duration_minutes: (end - start).num_minutes(),
        }
    }
}

/// Merged busy intervals clipped to `[window_start, window_end]`.
///
/// Returns a sorted, disjoint list; intervals entirely outside the window are
/// discarded. An empty or inverted window yields no intervals.
pub fn merged_busy_within(
    window_start: Instant,
    window_end: Instant,
    busy: &[Interval],
) -> Vec<Interval> {
    if window_end <= window_start {
        return Vec::new();
    }

    interval::merge(busy)
        .iter()
        .filter_map(|it| it.clip(window_start, window_end))
        .collect()
}

/// Find the free gaps of `[window_start, window_end)` given a busy list.
///
/// Busy intervals may overlap or be malformed; they are merged first. A window
/// with no busy overlap yields a single gap equal to the window, a fully covered
/// window yields none, and an inverted window (`window_end <= window_start`)
/// yields none.
pub fn invert(window_start: Instant, window_end: Instant, busy: &[Interval]) -> Vec<FreeGap> {
    if window_end <= window_start {
        return Vec::new();
    }

    let merged = merged_busy_within(window_start, window_end, busy);

    let mut gaps = Vec::new();
    let mut cursor = window_start;

    for b in &merged {
        if b.start > cursor {
            gaps.push(FreeGap::between(cursor, b.start));
        }
        cursor = cursor.max(b.end);
    }

    // Trailing gap after the last busy period.
    if window_end > cursor {
        gaps.push(FreeGap::between(cursor, window_end));
    }

    gaps
}
