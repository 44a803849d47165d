//! # Taskpulse Core
//!
//! Shared foundation for the Taskpulse notification engine: the task
//! snapshot model, user settings, the crate-wide error type, and the
//! capability traits the host application injects at engine start.
//!
//! This crate holds no timers and no policy — that lives in
//! `taskpulse-scheduler`.

pub mod config;
pub mod error;
pub mod task;
pub mod traits;

pub use config::{DailyBriefing, DeadlineAlert, DoNotDisturb, EngineConfig, Settings};
pub use error::{Result, TaskpulseError};
pub use task::{DueDate, Task};
pub use traits::{Notifier, PersistenceStore, SettingsSource, TaskSource};
