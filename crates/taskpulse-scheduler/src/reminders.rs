//! One-shot reminder queue — dedup memory and source of truth for the
//! reminder dispatcher.
//!
//! Entries are append-only until triggered. The `triggered` flag is the
//! restart fence: a triggered reminder is never re-fired, even after the
//! persisted queue is re-read by a fresh process.

use std::sync::Arc;

use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};

use taskpulse_core::traits::PersistenceStore;

const STORE_KEY: &str = "scheduled_reminders";
const PURGE_AFTER_HOURS: i64 = 24;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledReminder {
    pub id: String,
    pub title: String,
    pub message: String,
    pub scheduled_time: DateTime<Local>,
    /// Optional link back to a host-side schedule entry.
    #[serde(default)]
    pub schedule_id: Option<String>,
    #[serde(default)]
    pub triggered: bool,
    pub created_at: DateTime<Local>,
}

/// What a caller provides when scheduling; the queue assigns the id.
#[derive(Debug, Clone)]
pub struct NewReminder {
    pub title: String,
    pub message: String,
    pub scheduled_time: DateTime<Local>,
    pub schedule_id: Option<String>,
}

pub struct ReminderQueue {
    store: Arc<dyn PersistenceStore>,
    entries: Vec<ScheduledReminder>,
}

impl ReminderQueue {
    /// Load the persisted queue; corrupt or missing blobs start empty.
    pub fn load(store: Arc<dyn PersistenceStore>) -> Self {
        let entries = match store.get(STORE_KEY) {
            Some(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!("⚠️ Failed to parse reminder queue, starting empty: {e}");
                Vec::new()
            }),
            None => Vec::new(),
        };
        Self { store, entries }
    }

    /// Append a reminder and return its assigned id.
    pub fn enqueue(&mut self, reminder: NewReminder, now: DateTime<Local>) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        tracing::info!(
            "📅 Reminder scheduled: '{}' at {}",
            reminder.title,
            reminder.scheduled_time
        );
        self.entries.push(ScheduledReminder {
            id: id.clone(),
            title: reminder.title,
            message: reminder.message,
            scheduled_time: reminder.scheduled_time,
            schedule_id: reminder.schedule_id,
            triggered: false,
            created_at: now,
        });
        self.save();
        id
    }

    /// Remove a reminder by id. Returns whether anything was removed.
    pub fn cancel(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        if self.entries.len() < before {
            self.save();
            true
        } else {
            false
        }
    }

    /// Entries whose time has come and that have not fired yet.
    pub fn due_now(&self, now: DateTime<Local>) -> Vec<ScheduledReminder> {
        self.entries
            .iter()
            .filter(|entry| !entry.triggered && entry.scheduled_time <= now)
            .cloned()
            .collect()
    }

    pub fn mark_triggered(&mut self, id: &str) {
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.id == id) {
            entry.triggered = true;
            self.save();
        }
    }

    /// Drop triggered entries older than 24h. Triggered entries fire at or
    /// shortly after their scheduled time, so age is measured from it.
    pub fn purge_old(&mut self, now: DateTime<Local>) {
        let before = self.entries.len();
        self.entries.retain(|entry| {
            !(entry.triggered && now - entry.scheduled_time > Duration::hours(PURGE_AFTER_HOURS))
        });
        if self.entries.len() != before {
            tracing::debug!("🧹 Purged {} old reminders", before - self.entries.len());
            self.save();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn save(&self) {
        match serde_json::to_string_pretty(&self.entries) {
            Ok(json) => {
                if let Err(e) = self.store.set(STORE_KEY, &json) {
                    tracing::warn!("⚠️ Failed to save reminder queue: {e}");
                }
            }
            Err(e) => tracing::warn!("⚠️ Failed to serialize reminder queue: {e}"),
        }
    }
}
