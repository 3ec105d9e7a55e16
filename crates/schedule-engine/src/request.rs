//! JSON request/response boundary.
//!
//! The HTTP layer and the CLI speak JSON with camelCase keys and ISO 8601
//! datetime strings. This module turns that into a [`ScheduleRequest`] and
//! renders a [`Plan`] back out, annotating each session with its display
//! summary.
//!
//! Busy entries are caller-supplied and untrusted: an entry with a missing or
//! unparseable bound, or with `end <= start`, is dropped without error. The
//! window bounds and the strategy name, on the other hand, must be valid.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, ScheduleError};
use crate::interval::{Instant, Interval};
use crate::planner::{ConflictStrategy, Session, StrategyUsed};
use crate::schedule::{Plan, ScheduleOptions, ScheduleRequest};

/// Parse an ISO 8601 datetime string into an [`Instant`].
///
/// Accepts RFC 3339 with an offset (`2026-03-02T09:00:00+01:00`, `...Z`) and
/// naive datetimes (`2026-03-02T09:00:00`), which are interpreted as UTC.
pub fn parse_instant(s: &str) -> Result<Instant> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .map(|ndt| ndt.and_utc())
        .map_err(|e| ScheduleError::InvalidDatetime(format!("'{}': {}", s, e)))
}

fn format_instant(instant: &Instant) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Accept an integer option the way a form-encoded HTTP layer sends it.
///
/// Numbers are truncated toward zero, strings contribute their leading integer
/// (`"90"`, `" 45 min"`), and anything else, including `null`, means "not set".
fn lenient_int<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose {
        Int(i64),
        Float(f64),
        Text(String),
        Other(serde_json::Value),
    }

    Ok(match Loose::deserialize(deserializer)? {
        Loose::Int(n) => Some(n),
        Loose::Float(f) if f.is_finite() => Some(f.trunc() as i64),
        Loose::Text(s) => leading_int(&s),
        Loose::Float(_) | Loose::Other(_) => None,
    })
}

/// Leading optionally-signed decimal integer of `s`, after leading whitespace.
/// Values past the `i64` range saturate; the driver clamps them anyway.
fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }

    let value = match rest[..digits].parse::<i64>() {
        Ok(n) => n,
        Err(_) => i64::MAX,
    };
    Some(if negative { -value } else { value })
}

/// One busy entry as received from a free/busy query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BusyInput {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

impl BusyInput {
    /// The well-formed interval this entry describes, if any.
    pub fn to_interval(&self) -> Option<Interval> {
        let start = parse_instant(self.start.as_deref()?).ok()?;
        let end = parse_instant(self.end.as_deref()?).ok()?;
        Interval::new(start, end)
    }
}

/// Keep the well-formed busy entries, silently dropping the rest.
pub fn busy_from_inputs(inputs: &[BusyInput]) -> Vec<Interval> {
    inputs.iter().filter_map(BusyInput::to_interval).collect()
}

/// Wire form of a scheduling request.
///
/// `timeMin`/`timeMax` are accepted as aliases for the window bounds, matching
/// the free/busy query the busy list came from.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScheduleRequestDto {
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient_int")]
    pub duration_minutes: Option<i64>,
    #[serde(alias = "timeMin")]
    pub window_start: Option<String>,
    #[serde(alias = "timeMax")]
    pub window_end: Option<String>,
    pub busy: Vec<BusyInput>,
    pub conflict_strategy: Option<String>,
    #[serde(deserialize_with = "lenient_int")]
    pub min_session_minutes: Option<i64>,
    #[serde(deserialize_with = "lenient_int")]
    pub max_split_parts: Option<i64>,
    pub allow_light_practice: Option<bool>,
    #[serde(deserialize_with = "lenient_int")]
    pub search_days: Option<i64>,
}

impl ScheduleRequestDto {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validate the window and strategy and build an engine request.
    pub fn into_request(self) -> Result<ScheduleRequest> {
        let window_start = parse_instant(
            self.window_start
                .as_deref()
                .ok_or(ScheduleError::MissingField("windowStart"))?,
        )?;
        let window_end = parse_instant(
            self.window_end
                .as_deref()
                .ok_or(ScheduleError::MissingField("windowEnd"))?,
        )?;
        let conflict_strategy = match self.conflict_strategy.as_deref() {
            Some(name) => name.parse::<ConflictStrategy>()?,
            None => ConflictStrategy::default(),
        };

        Ok(ScheduleRequest {
            title: self.title.unwrap_or_default(),
            duration_minutes: self.duration_minutes,
            window_start,
            window_end,
            busy: busy_from_inputs(&self.busy),
            options: ScheduleOptions {
                conflict_strategy,
                min_session_minutes: self.min_session_minutes,
                max_split_parts: self.max_split_parts,
                allow_light_practice: self.allow_light_practice,
                search_days: self.search_days,
            },
        })
    }
}

/// Wire form of a session, with its calendar event summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDto {
    pub start: String,
    pub end: String,
    pub light_practice: bool,
    pub label: Option<String>,
    pub summary: String,
}

impl SessionDto {
    fn new(session: &Session, title: &str) -> Self {
        Self {
            start: format_instant(&session.start),
            end: format_instant(&session.end),
            light_practice: session.light_practice,
            label: session.label.clone(),
            summary: session.summary(title),
        }
    }
}

/// Wire form of a [`Plan`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDto {
    pub title: String,
    pub requested_minutes: i64,
    pub strategy_used: StrategyUsed,
    pub scheduled_minutes: i64,
    pub sessions: Vec<SessionDto>,
    pub searched_days: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<&Plan> for PlanDto {
    fn from(plan: &Plan) -> Self {
        Self {
            title: plan.title.clone(),
            requested_minutes: plan.requested_minutes,
            strategy_used: plan.strategy_used,
            scheduled_minutes: plan.scheduled_minutes,
            sessions: plan
                .sessions
                .iter()
                .map(|s| SessionDto::new(s, &plan.title))
                .collect(),
            searched_days: plan.searched_days,
            reason: plan.reason.clone(),
        }
    }
}

/// Parse a JSON request, schedule it, and return the plan as JSON.
pub fn schedule_json(json: &str) -> Result<String> {
    let request = ScheduleRequestDto::from_json(json)?.into_request()?;
    let plan = crate::schedule::schedule(&request);
    Ok(serde_json::to_string(&PlanDto::from(&plan))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parse_instant_accepts_offsets_and_naive() {
        let expected = Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap();
        assert_eq!(parse_instant("2026-03-02T09:00:00+01:00").unwrap(), expected);
        assert_eq!(parse_instant("2026-03-02T08:00:00Z").unwrap(), expected);
        assert_eq!(parse_instant("2026-03-02T08:00:00").unwrap(), expected);
        assert!(parse_instant("next tuesday").is_err());
    }

    #[test]
    fn leading_int_reads_like_a_form_value() {
        assert_eq!(leading_int("90"), Some(90));
        assert_eq!(leading_int("  45 min"), Some(45));
        assert_eq!(leading_int("-5"), Some(-5));
        assert_eq!(leading_int("+7"), Some(7));
        assert_eq!(leading_int("12.9"), Some(12));
        assert_eq!(leading_int("99999999999999999999"), Some(i64::MAX));
        assert_eq!(leading_int("abc"), None);
        assert_eq!(leading_int("-"), None);
        assert_eq!(leading_int(""), None);
    }

    #[test]
    fn busy_entries_with_bad_bounds_are_dropped() {
        let inputs = vec![
            BusyInput {
                start: Some("2026-03-02T10:00:00Z".into()),
                end: Some("2026-03-02T11:00:00Z".into()),
            },
            BusyInput {
                start: None,
                end: Some("2026-03-02T11:00:00Z".into()),
            },
            BusyInput {
                start: Some("garbage".into()),
                end: Some("2026-03-02T11:00:00Z".into()),
            },
            BusyInput {
                start: Some("2026-03-02T12:00:00Z".into()),
                end: Some("2026-03-02T12:00:00Z".into()),
            },
        ];
        let busy = busy_from_inputs(&inputs);
        assert_eq!(busy.len(), 1);
        assert_eq!(busy[0].start, Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap());
    }
}
