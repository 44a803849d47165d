//! Task snapshot model — what the engine reads from the host's task store.
//!
//! The engine never owns tasks; it borrows read-only snapshots through
//! [`crate::traits::TaskSource`] and derives urgency from them.

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

/// Due date of a task — either an exact instant or a bare day.
///
/// Serialized untagged: an RFC 3339 string parses as `At`, a plain
/// `YYYY-MM-DD` string parses as `Day`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DueDate {
    At(DateTime<Local>),
    Day(NaiveDate),
}

impl DueDate {
    /// Effective due instant: a bare day means end of that day
    /// (23:59:59 local). Returns `None` only when the local instant does
    /// not exist (DST gap) — callers fall back to a safe default.
    pub fn instant(&self) -> Option<DateTime<Local>> {
        match self {
            DueDate::At(at) => Some(*at),
            DueDate::Day(day) => day
                .and_hms_opt(23, 59, 59)
                .and_then(|naive| Local.from_local_datetime(&naive).earliest()),
        }
    }
}

/// One task as seen by the engine.
///
/// A task with `completed = true` is never scored for urgency: it always
/// sorts last and never triggers a deadline alert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub due_date: Option<DueDate>,
    /// Tasks may not legally be started before this day.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// User-assigned importance, 1..=10.
    #[serde(default = "default_importance")]
    pub importance: u8,
    /// Estimated effort in minutes.
    #[serde(default = "default_estimated_minutes")]
    pub estimated_minutes: f64,
    #[serde(default)]
    pub completed: bool,
}

fn default_importance() -> u8 {
    5
}

fn default_estimated_minutes() -> f64 {
    60.0
}

impl Task {
    /// Create a task with default attributes.
    pub fn new(id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            due_date: None,
            start_date: None,
            importance: default_importance(),
            estimated_minutes: default_estimated_minutes(),
            completed: false,
        }
    }
}
