//! WASM bindings for schedule-engine.
//!
//! Exposes session planning, free-gap computation, busy merging, and conflict
//! checks to the Node HTTP layer via `wasm-bindgen`. All complex types cross
//! the boundary as JSON strings using the same camelCase shapes as the REST API.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p schedule-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target nodejs --out-dir server/wasm/ \
//!   target/wasm32-unknown-unknown/release/schedule_engine_wasm.wasm
//! ```

use schedule_engine::request::{busy_from_inputs, BusyInput};
use schedule_engine::{parse_instant, Interval, Session};
use serde::Serialize;
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// JSON-in, JSON-out implementations (plain `String` errors so they can be
// exercised natively; the exports below wrap them in `JsValue`)
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConflictDto {
    session: Session,
    busy: Interval,
    overlap_minutes: i64,
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

/// Parse a JSON array of `{start, end}` busy entries, dropping malformed ones.
fn parse_busy_json(json: &str) -> Result<Vec<Interval>, String> {
    let inputs: Vec<BusyInput> =
        serde_json::from_str(json).map_err(|e| format!("Invalid busy JSON: {}", e))?;
    Ok(busy_from_inputs(&inputs))
}

fn plan_schedule_impl(request_json: &str) -> Result<String, String> {
    schedule_engine::schedule_json(request_json).map_err(|e| e.to_string())
}

fn find_free_gaps_impl(busy_json: &str, window_start: &str, window_end: &str) -> Result<String, String> {
    let busy = parse_busy_json(busy_json)?;
    let ws = parse_instant(window_start).map_err(|e| e.to_string())?;
    let we = parse_instant(window_end).map_err(|e| e.to_string())?;

    to_json(&schedule_engine::invert(ws, we, &busy))
}

fn merge_busy_impl(busy_json: &str) -> Result<String, String> {
    let busy = parse_busy_json(busy_json)?;
    to_json(&schedule_engine::merge(&busy))
}

fn find_conflicts_impl(sessions_json: &str, busy_json: &str) -> Result<String, String> {
    let sessions: Vec<Session> =
        serde_json::from_str(sessions_json).map_err(|e| format!("Invalid sessions JSON: {}", e))?;
    let busy = parse_busy_json(busy_json)?;

    let dtos: Vec<ConflictDto> = schedule_engine::find_conflicts(&sessions, &busy)
        .into_iter()
        .map(|c| ConflictDto {
            session: c.session,
            busy: c.busy,
            overlap_minutes: c.overlap_minutes,
        })
        .collect();
    to_json(&dtos)
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Plan sessions for a scheduling request.
///
/// `request_json` is the camelCase request object (`windowStart`, `windowEnd`,
/// `busy`, `durationMinutes`, `conflictStrategy`, ...). Returns the plan JSON,
/// with each session annotated with its calendar `summary`. Throws only for an
/// unparseable request; an unsatisfiable request returns a plan with
/// `scheduledMinutes: 0` and a `reason`.
#[wasm_bindgen(js_name = "planSchedule")]
pub fn plan_schedule(request_json: &str) -> Result<String, JsValue> {
    plan_schedule_impl(request_json).map_err(|e| JsValue::from_str(&e))
}

/// Free gaps of `[window_start, window_end)` given a JSON array of busy entries.
///
/// Returns a JSON array of `{start, end, durationMinutes}` objects.
#[wasm_bindgen(js_name = "findFreeGaps")]
pub fn find_free_gaps(busy_json: &str, window_start: &str, window_end: &str) -> Result<String, JsValue> {
    find_free_gaps_impl(busy_json, window_start, window_end).map_err(|e| JsValue::from_str(&e))
}

/// Merge a JSON array of busy entries into sorted, disjoint `{start, end}` intervals.
#[wasm_bindgen(js_name = "mergeBusy")]
pub fn merge_busy(busy_json: &str) -> Result<String, JsValue> {
    merge_busy_impl(busy_json).map_err(|e| JsValue::from_str(&e))
}

/// Check planned sessions against freshly fetched busy entries.
///
/// `sessions_json` is the `sessions` array of a plan. Returns a JSON array of
/// `{session, busy, overlapMinutes}` objects; empty when the plan is still clear.
#[wasm_bindgen(js_name = "findConflicts")]
pub fn find_conflicts(sessions_json: &str, busy_json: &str) -> Result<String, JsValue> {
    find_conflicts_impl(sessions_json, busy_json).map_err(|e| JsValue::from_str(&e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    const BUSY: &str = r#"[
        {"start": "2026-03-02T13:00:00Z", "end": "2026-03-02T15:00:00Z"},
        {"start": "2026-03-02T10:00:00Z", "end": "2026-03-02T11:00:00Z"},
        {"start": "2026-03-02T10:30:00Z"}
    ]"#;

    fn parse(json: &str) -> Value {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn plan_schedule_returns_plan_json() {
        let request = format!(
            r#"{{"title": "Piano", "durationMinutes": 90,
                "windowStart": "2026-03-02T09:00:00Z", "windowEnd": "2026-03-02T17:00:00Z",
                "busy": {BUSY}}}"#
        );
        let plan = parse(&plan_schedule_impl(&request).unwrap());

        assert_eq!(plan["strategyUsed"], "exact");
        assert_eq!(plan["sessions"][0]["start"], "2026-03-02T11:00:00Z");
    }

    #[test]
    fn plan_schedule_reports_bad_requests() {
        let err = plan_schedule_impl(r#"{"windowStart": "2026-03-02T09:00:00Z"}"#).unwrap_err();
        assert!(err.contains("windowEnd"), "{err}");
    }

    #[test]
    fn free_gaps_skip_malformed_busy() {
        let gaps = parse(
            &find_free_gaps_impl(BUSY, "2026-03-02T09:00:00Z", "2026-03-02T17:00:00Z").unwrap(),
        );

        let minutes: Vec<i64> = gaps
            .as_array()
            .unwrap()
            .iter()
            .map(|g| g["durationMinutes"].as_i64().unwrap())
            .collect();
        assert_eq!(minutes, vec![60, 120, 120]);
    }

    #[test]
    fn free_gaps_reject_bad_window() {
        assert!(find_free_gaps_impl("[]", "soon", "2026-03-02T17:00:00Z").is_err());
        assert!(find_free_gaps_impl("{", "2026-03-02T09:00:00Z", "2026-03-02T17:00:00Z").is_err());
    }

    #[test]
    fn merge_busy_sorts_and_merges() {
        let merged = parse(&merge_busy_impl(BUSY).unwrap());

        let merged = merged.as_array().unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0]["start"], "2026-03-02T10:00:00Z");
    }

    #[test]
    fn conflicts_report_overlap() {
        let sessions = r#"[{"start": "2026-03-02T10:30:00Z", "end": "2026-03-02T11:30:00Z",
                           "lightPractice": false, "label": null}]"#;
        let conflicts = parse(&find_conflicts_impl(sessions, BUSY).unwrap());

        assert_eq!(conflicts.as_array().unwrap().len(), 1);
        assert_eq!(conflicts[0]["overlapMinutes"], 30);
    }
}
