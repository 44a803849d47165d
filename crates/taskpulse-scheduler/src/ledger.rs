//! Alert ledger — dedup memory for the deadline watcher.
//!
//! Keyed by task id, persisted as one JSON blob. At most one live record
//! exists per task, which is the "one deadline alert per task per 24h
//! window" guarantee.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};

use taskpulse_core::traits::PersistenceStore;

const STORE_KEY: &str = "alert_ledger";
const RETENTION_HOURS: i64 = 24;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRecord {
    pub task_id: String,
    pub fired_at: DateTime<Local>,
}

pub struct AlertLedger {
    store: Arc<dyn PersistenceStore>,
    records: HashMap<String, AlertRecord>,
}

impl AlertLedger {
    /// Load the persisted ledger. A corrupt or missing blob starts empty.
    pub fn load(store: Arc<dyn PersistenceStore>) -> Self {
        let records = match store.get(STORE_KEY) {
            Some(json) => match serde_json::from_str::<Vec<AlertRecord>>(&json) {
                Ok(list) => list
                    .into_iter()
                    .map(|record| (record.task_id.clone(), record))
                    .collect(),
                Err(e) => {
                    tracing::warn!("⚠️ Failed to parse alert ledger, starting empty: {e}");
                    HashMap::new()
                }
            },
            None => HashMap::new(),
        };
        Self { store, records }
    }

    pub fn has_fired(&self, task_id: &str) -> bool {
        self.records.contains_key(task_id)
    }

    pub fn record_fired(&mut self, task_id: &str, now: DateTime<Local>) {
        self.records.insert(
            task_id.to_string(),
            AlertRecord {
                task_id: task_id.to_string(),
                fired_at: now,
            },
        );
        self.save();
    }

    /// Drop records past the 24h window. Called after a tick's evaluation,
    /// so a record that just fired is never pruned on its own tick.
    pub fn prune(&mut self, now: DateTime<Local>) {
        let before = self.records.len();
        self.records
            .retain(|_, record| now - record.fired_at <= Duration::hours(RETENTION_HOURS));
        if self.records.len() != before {
            tracing::debug!("🧹 Pruned {} expired alert records", before - self.records.len());
            self.save();
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn save(&self) {
        let list: Vec<&AlertRecord> = self.records.values().collect();
        match serde_json::to_string_pretty(&list) {
            Ok(json) => {
                if let Err(e) = self.store.set(STORE_KEY, &json) {
                    tracing::warn!("⚠️ Failed to save alert ledger: {e}");
                }
            }
            Err(e) => tracing::warn!("⚠️ Failed to serialize alert ledger: {e}"),
        }
    }
}
