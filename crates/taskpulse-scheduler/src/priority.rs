//! Priority scoring and ranking — raw task attributes to a ranked
//! urgency score.
//!
//! Both entry points are pure functions of a task snapshot and the
//! current wall-clock time. Scores are recomputed on every read, never
//! cached across ticks, so a rank is always current.

use std::cmp::Ordering;

use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};

use taskpulse_core::task::Task;

/// Urgency tier derived from the numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    High,
    Medium,
    Low,
}

/// Computed urgency for one task at one instant. Derived, not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Priority {
    pub score: f64,
    pub tier: Tier,
}

/// Effective due instant of a task: an explicit instant as given, a bare
/// day as its end of day, and no due date (or an unresolvable local
/// time) as seven days out — undated tasks keep low-but-nonzero urgency.
pub fn effective_due_instant(task: &Task, now: DateTime<Local>) -> DateTime<Local> {
    task.due_date
        .as_ref()
        .and_then(|due| due.instant())
        .unwrap_or_else(|| now + Duration::days(7))
}

/// Score one task at `now`.
pub fn compute_priority(task: &Task, now: DateTime<Local>) -> Priority {
    let due = effective_due_instant(task, now);
    let hours_until_due = (due - now).num_seconds() as f64 / 3600.0;

    // Past-due tasks always get maximum urgency.
    let urgency = match hours_until_due {
        h if h < 0.0 => 10.0,
        h if h < 2.0 => 9.0,
        h if h < 6.0 => 8.0,
        h if h < 24.0 => 7.0,
        h if h < 48.0 => 6.0,
        h if h < 72.0 => 5.0,
        h if h < 168.0 => 4.0,
        _ => 3.0,
    };

    let importance = f64::from(task.importance);

    // Tasks whose effort is large relative to the remaining time get
    // boosted, capped at 2x.
    let time_ratio = (task.estimated_minutes / 60.0) / hours_until_due.max(1.0);
    let time_weight = (1.0 + time_ratio).min(2.0);

    // Tasks that cannot legally be started yet are suppressed, not hidden.
    let start_weight = match task.start_date {
        Some(start) if start > now.date_naive() => 0.3,
        _ => 1.0,
    };

    let raw = (urgency * 0.6 + importance * 0.4) * time_weight * start_weight;
    let score = (raw * 10.0).round() / 10.0;

    let tier = if score >= 8.0 {
        Tier::High
    } else if score >= 5.0 {
        Tier::Medium
    } else {
        Tier::Low
    };

    Priority { score, tier }
}

/// Stable multi-key ordering of a task snapshot: incomplete before
/// completed, then score descending, importance descending, due date
/// ascending with undated tasks last. Remaining ties keep input order.
pub fn rank(tasks: &[Task], now: DateTime<Local>) -> Vec<Task> {
    let mut annotated: Vec<(Task, Priority)> = tasks
        .iter()
        .map(|task| (task.clone(), compute_priority(task, now)))
        .collect();

    annotated.sort_by(|(a, pa), (b, pb)| {
        a.completed
            .cmp(&b.completed)
            .then_with(|| pb.score.partial_cmp(&pa.score).unwrap_or(Ordering::Equal))
            .then_with(|| b.importance.cmp(&a.importance))
            .then_with(|| {
                let due_a = a.due_date.as_ref().and_then(|d| d.instant());
                let due_b = b.due_date.as_ref().and_then(|d| d.instant());
                match (due_a, due_b) {
                    (Some(x), Some(y)) => x.cmp(&y),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                }
            })
    });

    annotated.into_iter().map(|(task, _)| task).collect()
}
