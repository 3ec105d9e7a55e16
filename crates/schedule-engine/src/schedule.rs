//! Window search driver: the public planning entry point.
//!
//! One attempt is made in the caller's window. When the planner hands the
//! problem back (auto strategy with nothing placeable, or `next-window`), the
//! same window is shifted forward one whole day at a time, up to
//! `search_days` days, until an attempt succeeds.
//!
//! ## Busy data for shifted windows
//!
//! Each attempted window asks a [`BusyProvider`] for its busy intervals. With
//! [`schedule`], the provider is the request's static busy list, so the caller
//! must fetch busy coverage for the whole horizon returned by
//! [`ScheduleRequest::search_horizon`], not just the original window. Callers
//! that can query per window should use [`schedule_with_provider`] instead.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::freebusy;
use crate::interval::{Instant, Interval};
use crate::planner::{self, ConflictStrategy, PlanParams, Placement, Session, StrategyUsed};

pub const DEFAULT_TITLE: &str = "Practice";
pub const DEFAULT_DURATION_MINUTES: i64 = 60;
pub const MAX_DURATION_MINUTES: i64 = 24 * 60;
pub const DEFAULT_MIN_SESSION_MINUTES: i64 = 30;
pub const MIN_SESSION_FLOOR_MINUTES: i64 = 5;
pub const DEFAULT_MAX_SPLIT_PARTS: i64 = 6;
pub const MAX_SPLIT_PARTS: i64 = 24;
pub const DEFAULT_SEARCH_DAYS: i64 = 14;
pub const MAX_SEARCH_DAYS: i64 = 60;

pub const NOTHING_FOUND_REASON: &str = "No suitable free time found within search window";

/// Source of busy intervals for a window.
///
/// Implementations should return every busy interval overlapping
/// `[window_start, window_end)`. Extra or malformed intervals are harmless; the
/// engine merges and clips whatever it receives.
pub trait BusyProvider {
    fn busy_between(&self, window_start: Instant, window_end: Instant) -> Vec<Interval>;
}

impl BusyProvider for [Interval] {
    fn busy_between(&self, window_start: Instant, window_end: Instant) -> Vec<Interval> {
        self.iter()
            .filter(|it| it.start < window_end && it.end > window_start)
            .copied()
            .collect()
    }
}

impl BusyProvider for Vec<Interval> {
    fn busy_between(&self, window_start: Instant, window_end: Instant) -> Vec<Interval> {
        self.as_slice().busy_between(window_start, window_end)
    }
}

/// Adapts a closure `Fn(start, end) -> Vec<Interval>` into a [`BusyProvider`].
pub struct BusyFn<F>(pub F);

impl<F> BusyProvider for BusyFn<F>
where
    F: Fn(Instant, Instant) -> Vec<Interval>,
{
    fn busy_between(&self, window_start: Instant, window_end: Instant) -> Vec<Interval> {
        (self.0)(window_start, window_end)
    }
}

/// Tunable knobs for a scheduling call. Every field is optional; `None` means
/// the documented default. Out-of-range values are clamped, never rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScheduleOptions {
    pub conflict_strategy: ConflictStrategy,
    /// Floor for split parts and shortened sessions. Clamped to `[5, requested]`, default 30.
    pub min_session_minutes: Option<i64>,
    /// Clamped to `[1, 24]`, default 6.
    pub max_split_parts: Option<i64>,
    /// Whether the shorten strategy may schedule less than requested. Default true.
    pub allow_light_practice: Option<bool>,
    /// Clamped to `[0, 60]`, default 14.
    pub search_days: Option<i64>,
}

impl ScheduleOptions {
    /// Clamp the requested duration and every option into planner parameters.
    pub fn resolve(&self, duration_minutes: Option<i64>) -> (PlanParams, i64) {
        let requested_minutes = clamp(
            duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES),
            1,
            MAX_DURATION_MINUTES,
        );
        let min_session_minutes = clamp(
            self.min_session_minutes
                .unwrap_or(DEFAULT_MIN_SESSION_MINUTES),
            MIN_SESSION_FLOOR_MINUTES,
            requested_minutes,
        );
        let max_split_parts = clamp(
            self.max_split_parts.unwrap_or(DEFAULT_MAX_SPLIT_PARTS),
            1,
            MAX_SPLIT_PARTS,
        );
        let search_days = clamp(
            self.search_days.unwrap_or(DEFAULT_SEARCH_DAYS),
            0,
            MAX_SEARCH_DAYS,
        );

        let params = PlanParams {
            requested_minutes,
            conflict_strategy: self.conflict_strategy,
            min_session_minutes,
            max_split_parts: max_split_parts as usize,
            allow_light_practice: self.allow_light_practice.unwrap_or(true),
        };
        (params, search_days)
    }
}

/// Bound `value` below by `min`, then above by `max`. When `min > max` the upper
/// bound wins, so a 3-minute request gets a 3-minute session floor.
fn clamp(value: i64, min: i64, max: i64) -> i64 {
    value.max(min).min(max)
}

/// A complete scheduling request with a static busy list.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleRequest {
    pub title: String,
    /// Requested duration; clamped to `[1, 1440]`, default 60.
    pub duration_minutes: Option<i64>,
    pub window_start: Instant,
    pub window_end: Instant,
    /// Busy intervals covering [`Self::search_horizon`].
    pub busy: Vec<Interval>,
    pub options: ScheduleOptions,
}

impl ScheduleRequest {
    /// The range the busy list must cover for day-shifted attempts to be
    /// conflict-free: the original window extended by the clamped search days.
    ///
    /// Saturates at the latest representable instant.
    pub fn search_horizon(&self) -> Interval {
        let (_, search_days) = self.options.resolve(self.duration_minutes);
        Interval {
            start: self.window_start,
            end: self
                .window_end
                .checked_add_signed(Duration::days(search_days))
                .unwrap_or(Instant::MAX_UTC),
        }
    }
}

/// The result of a scheduling call. Always returned, never an error.
///
/// A plan with no sessions is a failure; check [`Plan::is_scheduled`] and read
/// `reason` rather than inspecting `strategy_used` alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub title: String,
    pub requested_minutes: i64,
    pub strategy_used: StrategyUsed,
    pub scheduled_minutes: i64,
    pub sessions: Vec<Session>,
    /// How many days past the original window the search went.
    pub searched_days: i64,
    pub reason: Option<String>,
}

impl Plan {
    fn from_placement(
        title: String,
        requested_minutes: i64,
        placement: Placement,
        searched_days: i64,
    ) -> Self {
        Self {
            title,
            requested_minutes,
            strategy_used: placement.strategy,
            scheduled_minutes: placement.scheduled_minutes(),
            sessions: placement.sessions,
            searched_days,
            reason: placement.reason,
        }
    }

    fn nothing_found(title: String, requested_minutes: i64, searched_days: i64) -> Self {
        Self {
            title,
            requested_minutes,
            strategy_used: StrategyUsed::None,
            scheduled_minutes: 0,
            sessions: Vec::new(),
            searched_days,
            reason: Some(NOTHING_FOUND_REASON.to_string()),
        }
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled_minutes > 0
    }

    /// `(summary, session)` pairs ready to become calendar events.
    pub fn summaries(&self) -> impl Iterator<Item = (String, &Session)> + '_ {
        self.sessions.iter().map(|s| (s.summary(&self.title), s))
    }
}

fn normalize_title(title: &str) -> String {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Schedule a request against its static busy list.
///
/// The busy list is reused for every day-shifted window; see the module docs
/// for the coverage it must have.
pub fn schedule(request: &ScheduleRequest) -> Plan {
    schedule_with_provider(
        &request.title,
        request.duration_minutes,
        request.window_start,
        request.window_end,
        &request.options,
        request.busy.as_slice(),
    )
}

/// Schedule a request, asking `busy` for the busy intervals of each window tried.
pub fn schedule_with_provider<P>(
    title: &str,
    duration_minutes: Option<i64>,
    window_start: Instant,
    window_end: Instant,
    options: &ScheduleOptions,
    busy: &P,
) -> Plan
where
    P: BusyProvider + ?Sized,
{
    let title = normalize_title(title);
    let (params, search_days) = options.resolve(duration_minutes);

    let attempt = |ws: Instant, we: Instant| {
        let gaps = freebusy::invert(ws, we, &busy.busy_between(ws, we));
        planner::plan(&gaps, &params)
    };

    if let Some(placement) = attempt(window_start, window_end) {
        tracing::debug!(
            strategy = ?placement.strategy,
            sessions = placement.sessions.len(),
            "planned in original window"
        );
        return Plan::from_placement(title, params.requested_minutes, placement, 0);
    }

    for day in 1..=search_days {
        let shift = Duration::days(day);
        let (Some(ws), Some(we)) = (
            window_start.checked_add_signed(shift),
            window_end.checked_add_signed(shift),
        ) else {
            tracing::debug!(day, "shifted window is out of range");
            break;
        };
        let Some(mut placement) = attempt(ws, we) else {
            continue;
        };

        if placement.strategy == StrategyUsed::Exact {
            placement.strategy = StrategyUsed::NextWindow;
        }
        tracing::debug!(
            day,
            strategy = ?placement.strategy,
            sessions = placement.sessions.len(),
            "planned in shifted window"
        );
        return Plan::from_placement(title, params.requested_minutes, placement, day);
    }

    tracing::debug!(search_days, "no window could hold the request");
    Plan::nothing_found(title, params.requested_minutes, search_days)
}
