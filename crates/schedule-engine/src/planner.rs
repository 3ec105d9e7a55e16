//! Place a requested duration into one window's free gaps.
//!
//! The planner always tries an exact first-fit before anything else. Only when
//! no single gap can hold the full duration does the conflict strategy decide
//! what happens: split across several gaps, shorten into the largest gap, or
//! hand the problem back to the window search driver by returning `None`.

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;
use crate::freebusy::FreeGap;
use crate::interval::{Instant, Interval};

pub const SPLIT_FAILED_REASON: &str = "Not enough free time to split into sessions";
pub const SHORTEN_FAILED_REASON: &str = "No suitable gap for a minimum session";
pub const LIGHT_PRACTICE_LABEL: &str = "Light Practice";

/// Policy applied when no single gap fits the full requested duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictStrategy {
    /// Split if that fully satisfies the request, else shorten, else search later windows.
    #[default]
    Auto,
    /// Spread the duration across several gaps.
    Split,
    /// Schedule a shorter session in the largest gap.
    Shorten,
    /// Skip the current window and search later days.
    NextWindow,
}

impl ConflictStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictStrategy::Auto => "auto",
            ConflictStrategy::Split => "split",
            ConflictStrategy::Shorten => "shorten",
            ConflictStrategy::NextWindow => "next-window",
        }
    }
}

impl fmt::Display for ConflictStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictStrategy {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "auto" => Ok(ConflictStrategy::Auto),
            "split" => Ok(ConflictStrategy::Split),
            "shorten" => Ok(ConflictStrategy::Shorten),
            "next-window" => Ok(ConflictStrategy::NextWindow),
            other => Err(ScheduleError::InvalidStrategy(other.to_string())),
        }
    }
}

/// Which rule produced a plan's sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyUsed {
    Exact,
    Split,
    Shorten,
    /// An exact fit found in a day-shifted window.
    NextWindow,
    /// Nothing could be scheduled.
    None,
}

/// One concrete scheduled block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub start: Instant,
    pub end: Instant,
    /// Set when the session is shorter than the requested duration.
    #[serde(default)]
    pub light_practice: bool,
    /// Suffix shown after the title, e.g. `"Part 2"` or `"Light Practice"`.
    #[serde(default)]
    pub label: Option<String>,
}

impl Session {
    fn starting_at(start: Instant, minutes: i64, light_practice: bool, label: Option<String>) -> Self {
        Self {
            start,
            end: start + Duration::minutes(minutes),
            light_practice,
            label,
        }
    }

    pub fn minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    pub fn span(&self) -> Interval {
        Interval {
            start: self.start,
            end: self.end,
        }
    }

    /// Display title for a calendar event: `"{title}"` or `"{title} ({label})"`.
    pub fn summary(&self, title: &str) -> String {
        match &self.label {
            Some(label) => format!("{title} ({label})"),
            None => title.to_string(),
        }
    }
}

/// Planner inputs, already clamped by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanParams {
    pub requested_minutes: i64,
    pub conflict_strategy: ConflictStrategy,
    pub min_session_minutes: i64,
    pub max_split_parts: usize,
    pub allow_light_practice: bool,
}

/// The outcome of planning inside a single window.
///
/// A placement with no sessions is an explicit failure: it carries a `reason`
/// and must not trigger a search of later windows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub strategy: StrategyUsed,
    pub sessions: Vec<Session>,
    pub reason: Option<String>,
}

impl Placement {
    fn scheduled(strategy: StrategyUsed, sessions: Vec<Session>) -> Self {
        Self {
            strategy,
            sessions,
            reason: None,
        }
    }

    fn failed(strategy: StrategyUsed, reason: &str) -> Self {
        Self {
            strategy,
            sessions: Vec::new(),
            reason: Some(reason.to_string()),
        }
    }

    pub fn scheduled_minutes(&self) -> i64 {
        self.sessions.iter().map(Session::minutes).sum()
    }
}

/// Plan sessions inside one window's gaps.
///
/// Returns `None` when the driver should search a later window: always for
/// [`ConflictStrategy::NextWindow`] without an exact fit, and for
/// [`ConflictStrategy::Auto`] when neither split nor shorten succeeds. Explicit
/// `Split` and `Shorten` always return a placement, possibly a failed one.
pub fn plan(gaps: &[FreeGap], params: &PlanParams) -> Option<Placement> {
    let usable: Vec<&FreeGap> = gaps.iter().filter(|g| g.duration_minutes > 0).collect();

    if let Some(placement) = exact_fit(&usable, params) {
        return Some(placement);
    }

    match params.conflict_strategy {
        ConflictStrategy::Split => Some(
            split(&usable, params)
                .unwrap_or_else(|| Placement::failed(StrategyUsed::Split, SPLIT_FAILED_REASON)),
        ),
        ConflictStrategy::Shorten => Some(
            shorten(&usable, params)
                .unwrap_or_else(|| Placement::failed(StrategyUsed::Shorten, SHORTEN_FAILED_REASON)),
        ),
        ConflictStrategy::NextWindow => None,
        ConflictStrategy::Auto => split(&usable, params).or_else(|| shorten(&usable, params)),
    }
}

/// First gap, chronologically, that holds the whole duration.
fn exact_fit(gaps: &[&FreeGap], params: &PlanParams) -> Option<Placement> {
    let gap = gaps
        .iter()
        .find(|g| g.duration_minutes >= params.requested_minutes)?;

    let session = Session::starting_at(gap.start, params.requested_minutes, false, None);
    Some(Placement::scheduled(StrategyUsed::Exact, vec![session]))
}

fn split(gaps: &[&FreeGap], params: &PlanParams) -> Option<Placement> {
    let total_free: i64 = gaps.iter().map(|g| g.duration_minutes).sum();
    if total_free < params.requested_minutes {
        return None;
    }

    let mut remaining = params.requested_minutes;
    let mut sessions: Vec<Session> = Vec::new();

    for gap in gaps {
        if sessions.len() >= params.max_split_parts || remaining <= 0 {
            break;
        }

        // Never use a gap below the session floor, even partially.
        let take = gap.duration_minutes.min(remaining);
        if take < params.min_session_minutes {
            continue;
        }

        let label = (!sessions.is_empty()).then(|| format!("Part {}", sessions.len() + 1));
        sessions.push(Session::starting_at(gap.start, take, false, label));
        remaining -= take;
    }

    if remaining > 0 {
        tracing::debug!(remaining, parts = sessions.len(), "split could not cover request");
        return None;
    }

    Some(Placement::scheduled(StrategyUsed::Split, sessions))
}

fn shorten(gaps: &[&FreeGap], params: &PlanParams) -> Option<Placement> {
    if !params.allow_light_practice {
        return None;
    }

    // Largest gap; the earliest one wins a tie.
    let best = gaps.iter().copied().fold(None::<&FreeGap>, |best, g| match best {
        Some(b) if b.duration_minutes >= g.duration_minutes => Some(b),
        _ => Some(g),
    })?;

    if best.duration_minutes < params.min_session_minutes {
        return None;
    }

    let minutes = params.requested_minutes.min(best.duration_minutes);
    let light = minutes < params.requested_minutes;
    let label = light.then(|| LIGHT_PRACTICE_LABEL.to_string());

    Some(Placement::scheduled(
        StrategyUsed::Shorten,
        vec![Session::starting_at(best.start, minutes, light, label)],
    ))
}
