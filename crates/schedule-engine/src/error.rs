//! Error types for the JSON request boundary.
//!
//! The planning engine itself is total; these errors only arise while turning
//! caller-supplied JSON into a [`ScheduleRequest`](crate::ScheduleRequest).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),

    #[error("Invalid conflict strategy: {0} (expected auto, split, shorten or next-window)")]
    InvalidStrategy(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid request JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
