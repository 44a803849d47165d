//! Reminder dispatcher — fires one-shot reminders whose time has come.
//!
//! While quiet hours are active or push is off, the whole tick is
//! skipped: reminders are deferred, not cancelled. Their scheduled time
//! has already elapsed, so `due_now` keeps returning them until a later
//! tick falls outside the window.

use chrono::{DateTime, Local};

use taskpulse_core::config::Settings;

use crate::gate::{minute_of_day, NotificationGate, NotifyPriority};
use crate::reminders::ReminderQueue;

/// One dispatcher pass. Returns how many reminders fired.
pub fn tick(
    queue: &mut ReminderQueue,
    settings: &Settings,
    now: DateTime<Local>,
    gate: &NotificationGate,
) -> usize {
    if !settings.push_enabled || settings.do_not_disturb.covers(minute_of_day(now)) {
        return 0;
    }

    let mut fired = 0;
    for reminder in queue.due_now(now) {
        tracing::info!("🔔 Reminder due: '{}'", reminder.title);
        gate.try_notify(
            settings,
            now,
            &format!("🔔 {}", reminder.title),
            &reminder.message,
            &format!("reminder-{}", reminder.id),
            "reminder",
            NotifyPriority::Normal,
        );
        queue.mark_triggered(&reminder.id);
        fired += 1;
    }

    queue.purge_old(now);
    fired
}
