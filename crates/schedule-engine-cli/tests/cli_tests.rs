//! Integration tests for the `schedule` CLI binary.
//!
//! These tests use `assert_cmd` and `predicates` to exercise the plan, free,
//! and busy subcommands through the actual binary, including stdin/stdout
//! piping, file output, flag overrides, and error handling.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn run_json(args: &[&str]) -> Value {
    let output = Command::cargo_bin("schedule")
        .unwrap()
        .args(args)
        .output()
        .unwrap();
    assert!(output.status.success(), "command failed: {:?}", output);
    serde_json::from_slice(&output.stdout).expect("stdout must be JSON")
}

// ─────────────────────────────────────────────────────────────────────────────
// plan
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn plan_from_file_takes_the_first_fitting_gap() {
    let plan = run_json(&["plan", "-i", &fixture("request.json")]);

    assert_eq!(plan["strategyUsed"], "exact");
    assert_eq!(plan["scheduledMinutes"], 90);
    assert_eq!(plan["sessions"][0]["start"], "2026-03-02T11:00:00Z");
    assert_eq!(plan["sessions"][0]["end"], "2026-03-02T12:30:00Z");
    assert_eq!(plan["sessions"][0]["summary"], "Piano");
}

#[test]
fn plan_from_stdin() {
    let input = r#"{"windowStart":"2026-03-02T09:00:00Z","windowEnd":"2026-03-02T10:00:00Z"}"#;

    Command::cargo_bin("schedule")
        .unwrap()
        .arg("plan")
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""strategyUsed":"exact""#))
        .stdout(predicate::str::contains(r#""title":"Practice""#));
}

#[test]
fn plan_splits_across_fragmented_gaps() {
    let plan = run_json(&["plan", "-i", &fixture("fragmented.json")]);

    assert_eq!(plan["strategyUsed"], "split");
    assert_eq!(plan["scheduledMinutes"], 90);
    assert_eq!(plan["sessions"][0]["summary"], "Violin");
    assert_eq!(plan["sessions"][1]["summary"], "Violin (Part 2)");
    assert_eq!(plan["sessions"][1]["start"], "2026-03-02T10:30:00Z");
}

#[test]
fn strategy_flag_overrides_the_request() {
    let plan = run_json(&[
        "plan",
        "-i",
        &fixture("fragmented.json"),
        "--strategy",
        "shorten",
    ]);

    assert_eq!(plan["strategyUsed"], "shorten");
    assert_eq!(plan["scheduledMinutes"], 45);
    assert_eq!(plan["sessions"][0]["lightPractice"], true);
    assert_eq!(plan["sessions"][0]["summary"], "Violin (Light Practice)");
}

#[test]
fn next_window_flag_moves_to_the_next_day() {
    let plan = run_json(&[
        "plan",
        "-i",
        &fixture("fragmented.json"),
        "--strategy",
        "next-window",
    ]);

    assert_eq!(plan["strategyUsed"], "next-window");
    assert_eq!(plan["searchedDays"], 1);
    assert_eq!(plan["sessions"][0]["start"], "2026-03-03T09:00:00Z");
}

#[test]
fn duration_and_title_flags_override_the_request() {
    let plan = run_json(&[
        "plan",
        "-i",
        &fixture("request.json"),
        "--duration",
        "30",
        "--title",
        "Etudes",
    ]);

    assert_eq!(plan["requestedMinutes"], 30);
    assert_eq!(plan["title"], "Etudes");
    assert_eq!(plan["sessions"][0]["start"], "2026-03-02T09:00:00Z");
}

#[test]
fn unsatisfiable_plan_still_succeeds_with_a_reason() {
    let plan = run_json(&["plan", "-i", &fixture("covered.json")]);

    assert_eq!(plan["strategyUsed"], "none");
    assert_eq!(plan["scheduledMinutes"], 0);
    assert_eq!(plan["searchedDays"], 2);
    assert!(plan["reason"].is_string());
}

#[test]
fn search_days_flag_overrides_the_request() {
    let plan = run_json(&[
        "plan",
        "-i",
        &fixture("covered.json"),
        "--search-days",
        "3",
    ]);

    // Day +3 (March 5) lies beyond the busy block.
    assert_eq!(plan["strategyUsed"], "next-window");
    assert_eq!(plan["searchedDays"], 3);
}

#[test]
fn plan_writes_to_output_file() {
    let dir = std::env::temp_dir().join(format!("schedule-cli-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let out = dir.join("plan.json");

    Command::cargo_bin("schedule")
        .unwrap()
        .args(["plan", "-i", fixture("request.json").as_str(), "--pretty", "-o"])
        .arg(&out)
        .assert()
        .success();

    let written = std::fs::read_to_string(&out).unwrap();
    assert!(written.contains('\n'), "pretty output spans several lines");
    let plan: Value = serde_json::from_str(&written).unwrap();
    assert_eq!(plan["strategyUsed"], "exact");

    std::fs::remove_dir_all(&dir).ok();
}

// ─────────────────────────────────────────────────────────────────────────────
// free / busy
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn free_lists_gaps_in_order() {
    let gaps = run_json(&["free", "-i", &fixture("request.json")]);

    let gaps = gaps.as_array().unwrap();
    assert_eq!(gaps.len(), 3);
    let minutes: Vec<i64> = gaps
        .iter()
        .map(|g| g["durationMinutes"].as_i64().unwrap())
        .collect();
    assert_eq!(minutes, vec![60, 120, 120]);
}

#[test]
fn busy_lists_merged_intervals() {
    let busy = run_json(&["busy", "-i", &fixture("request.json")]);

    // 10:30-10:45 is absorbed by 10:00-11:00.
    assert_eq!(busy.as_array().unwrap().len(), 2);
}

#[test]
fn covered_window_has_no_free_gaps() {
    let gaps = run_json(&["free", "-i", &fixture("covered.json")]);
    assert_eq!(gaps.as_array().unwrap().len(), 0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn unknown_strategy_flag_is_rejected() {
    Command::cargo_bin("schedule")
        .unwrap()
        .args(["plan", "-i", fixture("request.json").as_str(), "--strategy", "best-fit"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("best-fit"));
}

#[test]
fn invalid_json_reports_the_request_error() {
    Command::cargo_bin("schedule")
        .unwrap()
        .arg("plan")
        .write_stdin("{not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid scheduling request"));
}

#[test]
fn missing_input_file_is_reported() {
    Command::cargo_bin("schedule")
        .unwrap()
        .args(["plan", "-i", "/nonexistent/request.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}

#[test]
fn no_subcommand_prints_help() {
    Command::cargo_bin("schedule")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}
