//! # schedule-engine
//!
//! Deterministic placement of practice sessions inside a busy calendar.
//!
//! Given a requested duration, a time window, and the busy intervals returned by
//! a calendar free/busy query, the engine computes concrete, conflict-free
//! sessions using a layered fallback policy: exact fit, then split across gaps,
//! then shorten, then search later windows. Everything here is pure computation
//! over [`chrono::DateTime<Utc>`] instants; calendar I/O stays with the caller.
//!
//! ## Quick start
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use schedule_engine::{schedule, Interval, ScheduleRequest, StrategyUsed};
//!
//! let at = |h, m| Utc.with_ymd_and_hms(2026, 3, 2, h, m, 0).unwrap();
//! let request = ScheduleRequest {
//!     title: "Piano".to_string(),
//!     duration_minutes: Some(90),
//!     window_start: at(9, 0),
//!     window_end: at(17, 0),
//!     busy: vec![
//!         Interval { start: at(10, 0), end: at(11, 0) },
//!         Interval { start: at(13, 0), end: at(15, 0) },
//!     ],
//!     options: Default::default(),
//! };
//!
//! let plan = schedule(&request);
//! assert_eq!(plan.strategy_used, StrategyUsed::Exact);
//! assert_eq!(plan.sessions[0].start, at(11, 0));
//! assert_eq!(plan.sessions[0].end, at(12, 30));
//! ```
//!
//! ## Modules
//!
//! - [`interval`]: `Interval` type and busy-set merging
//! - [`freebusy`]: Invert merged busy intervals into free gaps within a window
//! - [`planner`]: Exact / split / shorten placement inside one window's gaps
//! - [`schedule`]: Window search driver and the `BusyProvider` seam
//! - [`conflict`]: Check sessions against busy intervals
//! - [`request`]: JSON request/response boundary
//! - [`error`]: Error types for the JSON boundary

pub mod conflict;
pub mod error;
pub mod freebusy;
pub mod interval;
pub mod planner;
pub mod request;
pub mod schedule;

pub use conflict::{find_conflicts, Conflict};
pub use error::ScheduleError;
pub use freebusy::{invert, merged_busy_within, FreeGap};
pub use interval::{merge, Instant, Interval};
pub use planner::{plan, ConflictStrategy, PlanParams, Placement, Session, StrategyUsed};
pub use request::{parse_instant, schedule_json, PlanDto, ScheduleRequestDto};
pub use schedule::{
    schedule, schedule_with_provider, BusyFn, BusyProvider, Plan, ScheduleOptions, ScheduleRequest,
};
