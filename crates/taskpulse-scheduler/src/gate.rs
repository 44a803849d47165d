//! Notification gate — the single chokepoint every producer goes
//! through. No producer talks to the platform notifier directly.
//!
//! The gate applies user policy (push toggle, quiet hours), degrades to
//! in-app logging when the OS permission is absent, and keeps the recent
//! notification history in a capped ring buffer.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local, Timelike};
use serde::{Deserialize, Serialize};

use taskpulse_core::config::Settings;
use taskpulse_core::traits::Notifier;

const LOG_CAP: usize = 100;

/// Log-entry priority label: deadline alerts high, reminders normal,
/// briefings low. Descriptive metadata, not ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyPriority {
    Low,
    Normal,
    High,
}

/// One entry in the in-app notification log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub tag: String,
    /// Which producer proposed this (deadline, reminder, briefing).
    pub source: String,
    pub priority: NotifyPriority,
    /// False when the OS popup was skipped (permission absent).
    pub shown: bool,
    pub timestamp: DateTime<Local>,
}

/// Outcome of a gate decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// Notifier invoked and entry logged.
    Delivered,
    /// Permission absent — logged in-app only, notifier not called.
    LoggedOnly,
    /// Push disabled or quiet hours — nothing shown, nothing logged.
    Suppressed,
}

pub struct NotificationGate {
    notifier: Arc<dyn Notifier>,
    log: Mutex<Vec<Notification>>,
}

impl NotificationGate {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier,
            log: Mutex::new(Vec::new()),
        }
    }

    /// Decide whether an otherwise-eligible alert may actually be shown,
    /// and show it. Safe for interleaved calls from different producers.
    #[allow(clippy::too_many_arguments)]
    pub fn try_notify(
        &self,
        settings: &Settings,
        now: DateTime<Local>,
        title: &str,
        body: &str,
        tag: &str,
        source: &str,
        priority: NotifyPriority,
    ) -> GateOutcome {
        if !settings.push_enabled {
            tracing::debug!("🔕 Push disabled, dropping '{title}'");
            return GateOutcome::Suppressed;
        }

        if settings.do_not_disturb.covers(minute_of_day(now)) {
            tracing::debug!("🌙 Quiet hours, dropping '{title}'");
            return GateOutcome::Suppressed;
        }

        // Without the OS permission the alert still lands in the in-app log.
        let granted = self.notifier.permission_granted();
        if granted {
            self.notifier.show(title, body, tag);
            tracing::info!("📣 [{source}] {title}");
        } else {
            tracing::info!("🔒 Permission absent, in-app only: [{source}] {title}");
        }

        self.record(Notification {
            title: title.to_string(),
            body: body.to_string(),
            tag: tag.to_string(),
            source: source.to_string(),
            priority,
            shown: granted,
            timestamp: now,
        });

        if granted {
            GateOutcome::Delivered
        } else {
            GateOutcome::LoggedOnly
        }
    }

    fn record(&self, notification: Notification) {
        let mut log = self.log.lock().unwrap();
        log.push(notification);
        // Ring buffer — keep the most recent entries only.
        if log.len() > LOG_CAP {
            log.remove(0);
        }
    }

    /// Recent notification history, oldest first.
    pub fn history(&self) -> Vec<Notification> {
        self.log.lock().unwrap().clone()
    }
}

/// Minutes since local midnight.
pub fn minute_of_day(now: DateTime<Local>) -> u32 {
    now.hour() * 60 + now.minute()
}
