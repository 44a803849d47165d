//! Capability seams injected by the host application at engine start.
//!
//! The engine consumes tasks and settings as plain data and produces
//! "fire this alert" decisions; everything else — fetching, rendering,
//! platform permission prompts — belongs to the host behind these traits.

use async_trait::async_trait;

use crate::config::Settings;
use crate::error::Result;
use crate::task::Task;

/// Read-only view of the host's task store.
#[async_trait]
pub trait TaskSource: Send + Sync {
    /// Snapshot of the tasks the host considers active.
    async fn list_active(&self) -> Result<Vec<Task>>;
}

/// Latest user settings. Called once per producer tick.
pub trait SettingsSource: Send + Sync {
    fn current(&self) -> Settings;
}

/// Platform notification sink.
///
/// `show` may no-op when the OS-level permission is absent; the gate
/// checks `permission_granted` first and degrades to in-app logging.
pub trait Notifier: Send + Sync {
    fn permission_granted(&self) -> bool;
    fn show(&self, title: &str, body: &str, tag: &str);
}

/// Key-value blob store backing the alert ledger and reminder queue.
/// Values are JSON strings; a corrupt or missing value is treated as
/// absent by every consumer.
pub trait PersistenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}
