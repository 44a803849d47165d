//! # Taskpulse Scheduler
//!
//! Priority-driven notification scheduling engine: converts raw
//! task/schedule attributes into a ranked urgency score and runs three
//! independent, self-rescheduling producers that watch deadlines, fire a
//! daily digest, and dispatch one-shot reminders — without duplicate
//! alerts and respecting the user's quiet hours.
//!
//! ## Design
//! - Tokio timers only — zero overhead while idle
//! - Injected capabilities (task source, settings, notifier, store) —
//!   the engine fetches and renders nothing itself
//! - File/key-value JSON persistence — dedup state survives restarts
//! - Fail open on bad data — a corrupt blob or malformed date never
//!   kills a producer's timer
//!
//! ## Architecture
//! ```text
//! Scheduler (start/stop)
//!   ├── DeadlineWatcher: 60s tick → tasks due within N minutes
//!   │     └── AlertLedger: one alert per task per 24h
//!   ├── DailyBriefing: one-shot at "HH:mm", re-arms itself daily
//!   ├── ReminderDispatcher: 60s tick → ReminderQueue.due_now
//!   └── all paths → NotificationGate → Notifier + in-app log
//! ```

pub mod briefing;
pub mod deadline;
pub mod dispatch;
pub mod engine;
pub mod gate;
pub mod ledger;
pub mod priority;
pub mod reminders;
pub mod store;

pub use briefing::{build_digest, next_occurrence, BriefingState};
pub use engine::{start, EngineDeps, Scheduler};
pub use gate::{GateOutcome, Notification, NotificationGate, NotifyPriority};
pub use ledger::{AlertLedger, AlertRecord};
pub use priority::{compute_priority, effective_due_instant, rank, Priority, Tier};
pub use reminders::{NewReminder, ReminderQueue, ScheduledReminder};
pub use store::{FileStore, MemoryStore};
