//! Deadline watcher — alerts for tasks approaching their due time.
//!
//! Stateless beyond the alert ledger. A task whose due time has already
//! passed is a missed deadline, not an approaching one, and is left to
//! the host's overdue styling.

use chrono::{DateTime, Local};

use taskpulse_core::config::Settings;
use taskpulse_core::task::Task;

use crate::gate::{GateOutcome, NotificationGate, NotifyPriority};
use crate::ledger::AlertLedger;
use crate::priority::effective_due_instant;

/// One evaluation pass over the task snapshot. Returns how many alerts
/// were proposed to the gate.
pub fn tick(
    tasks: &[Task],
    settings: &Settings,
    now: DateTime<Local>,
    ledger: &mut AlertLedger,
    gate: &NotificationGate,
) -> usize {
    if !settings.deadline_alert.enabled {
        return 0;
    }

    let threshold = settings.deadline_alert.minutes_before as f64;
    let mut proposed = 0;

    for task in tasks {
        if task.completed || task.due_date.is_none() {
            continue;
        }
        let due = effective_due_instant(task, now);
        let minutes_until_due = (due - now).num_seconds() as f64 / 60.0;

        if minutes_until_due > 0.0
            && minutes_until_due <= threshold
            && !ledger.has_fired(&task.id)
        {
            tracing::info!(
                "⏰ Deadline approaching for '{}' ({:.0} min left)",
                task.title,
                minutes_until_due
            );
            let outcome = gate.try_notify(
                settings,
                now,
                &format!("⏰ Deadline approaching: {}", task.title),
                &format!("'{}' is due in {:.0} minutes", task.title, minutes_until_due),
                &format!("deadline-{}", task.id),
                "deadline",
                NotifyPriority::High,
            );
            // Dedup on proposal, not delivery: a quiet-hours rejection
            // still counts as this window's alert.
            ledger.record_fired(&task.id, now);
            if outcome != GateOutcome::Suppressed {
                proposed += 1;
            }
        }
    }

    ledger.prune(now);
    proposed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::{Duration, TimeZone};
    use std::sync::{Arc, Mutex};
    use taskpulse_core::task::DueDate;
    use taskpulse_core::traits::Notifier;

    struct CountingNotifier {
        shown: Mutex<Vec<String>>,
    }

    impl CountingNotifier {
        fn new() -> Self {
            Self {
                shown: Mutex::new(Vec::new()),
            }
        }

        fn titles(&self) -> Vec<String> {
            self.shown.lock().unwrap().clone()
        }
    }

    impl Notifier for CountingNotifier {
        fn permission_granted(&self) -> bool {
            true
        }

        fn show(&self, title: &str, _body: &str, _tag: &str) {
            self.shown.lock().unwrap().push(title.to_string());
        }
    }

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    fn task_due_in_minutes(id: &str, minutes: i64) -> Task {
        let mut task = Task::new(id, &format!("Task {id}"));
        task.due_date = Some(DueDate::At(now() + Duration::minutes(minutes)));
        task
    }

    fn alert_settings(minutes_before: i64) -> Settings {
        let mut settings = Settings::default();
        settings.deadline_alert.minutes_before = minutes_before;
        settings
    }

    #[test]
    fn alerts_once_within_window() {
        let notifier = Arc::new(CountingNotifier::new());
        let gate = NotificationGate::new(notifier.clone());
        let mut ledger = AlertLedger::load(Arc::new(MemoryStore::new()));
        let tasks = vec![task_due_in_minutes("t1", 30)];
        let settings = alert_settings(60);

        // Two ticks inside the window: exactly one record, one gate call.
        tick(&tasks, &settings, now(), &mut ledger, &gate);
        tick(&tasks, &settings, now() + Duration::minutes(1), &mut ledger, &gate);

        assert_eq!(notifier.titles().len(), 1);
        assert!(notifier.titles()[0].contains("Task t1"));
        assert!(ledger.has_fired("t1"));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn completed_tasks_never_alert() {
        let notifier = Arc::new(CountingNotifier::new());
        let gate = NotificationGate::new(notifier.clone());
        let mut ledger = AlertLedger::load(Arc::new(MemoryStore::new()));
        let mut task = task_due_in_minutes("done", 10);
        task.completed = true;

        tick(&[task], &alert_settings(60), now(), &mut ledger, &gate);

        assert!(notifier.titles().is_empty());
        assert!(!ledger.has_fired("done"));
    }

    #[test]
    fn past_due_and_far_future_are_skipped() {
        let notifier = Arc::new(CountingNotifier::new());
        let gate = NotificationGate::new(notifier.clone());
        let mut ledger = AlertLedger::load(Arc::new(MemoryStore::new()));
        let tasks = vec![
            task_due_in_minutes("overdue", -5),
            task_due_in_minutes("distant", 240),
        ];

        tick(&tasks, &alert_settings(60), now(), &mut ledger, &gate);

        assert!(notifier.titles().is_empty());
        assert!(ledger.is_empty());
    }

    #[test]
    fn disabled_setting_skips_evaluation() {
        let notifier = Arc::new(CountingNotifier::new());
        let gate = NotificationGate::new(notifier.clone());
        let mut ledger = AlertLedger::load(Arc::new(MemoryStore::new()));
        let mut settings = alert_settings(60);
        settings.deadline_alert.enabled = false;

        tick(
            &[task_due_in_minutes("t1", 30)],
            &settings,
            now(),
            &mut ledger,
            &gate,
        );

        assert!(notifier.titles().is_empty());
    }

    #[test]
    fn ledger_expiry_allows_next_window() {
        let notifier = Arc::new(CountingNotifier::new());
        let gate = NotificationGate::new(notifier.clone());
        let mut ledger = AlertLedger::load(Arc::new(MemoryStore::new()));
        let settings = alert_settings(60);

        tick(
            &[task_due_in_minutes("t1", 30)],
            &settings,
            now(),
            &mut ledger,
            &gate,
        );
        assert_eq!(notifier.titles().len(), 1);

        // 25 hours later the record has expired. The tick that prunes it
        // evaluates first (pruning runs after evaluation), so the re-alert
        // lands on the following tick.
        let later = now() + Duration::hours(25);
        let mut task = Task::new("t1", "Task t1");
        task.due_date = Some(DueDate::At(later + Duration::minutes(30)));
        tick(std::slice::from_ref(&task), &settings, later, &mut ledger, &gate);
        assert_eq!(notifier.titles().len(), 1);
        assert!(!ledger.has_fired("t1"));

        tick(&[task], &settings, later + Duration::minutes(1), &mut ledger, &gate);
        assert_eq!(notifier.titles().len(), 2);
    }
}
