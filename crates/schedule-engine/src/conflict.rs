//! Check planned sessions against busy intervals.
//!
//! Calendars change between planning and event creation. Callers can re-fetch
//! busy data and run [`find_conflicts`] before committing a plan. Sessions that
//! merely touch a busy interval (one ends exactly when the other starts) are
//! NOT conflicts.

use crate::interval::Interval;
use crate::planner::Session;

/// A session that overlaps a busy interval.
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    pub session: Session,
    pub busy: Interval,
    pub overlap_minutes: i64,
}

/// Find every (session, busy) pair whose time ranges share at least a moment.
///
/// `overlap_minutes` is the length of the shared stretch in whole minutes.
/// Malformed busy intervals never match.
pub fn find_conflicts(sessions: &[Session], busy: &[Interval]) -> Vec<Conflict> {
    sessions
        .iter()
        .flat_map(|session| {
            let span = session.span();
            busy.iter().filter_map(move |b| {
                let shared = b.clip(span.start, span.end)?;
                Some(Conflict {
                    session: session.clone(),
                    busy: *b,
                    overlap_minutes: shared.minutes(),
                })
            })
        })
        .collect()
}
