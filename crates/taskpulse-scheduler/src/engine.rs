//! Scheduling facade — wires the three producers together, owns their
//! timers, and tears them down deterministically.
//!
//! There is one logical thread of control: every producer tick runs
//! under the shared engine mutex, so ticks interleave across producers
//! but never overlap. Uses tokio intervals for the polling producers —
//! zero overhead while idle.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use taskpulse_core::config::EngineConfig;
use taskpulse_core::error::Result;
use taskpulse_core::task::Task;
use taskpulse_core::traits::{Notifier, PersistenceStore, SettingsSource, TaskSource};

use crate::briefing::{self, BriefingScheduler};
use crate::deadline;
use crate::dispatch;
use crate::gate::{Notification, NotificationGate, NotifyPriority};
use crate::ledger::AlertLedger;
use crate::reminders::{NewReminder, ReminderQueue};

/// Collaborator capabilities injected by the host at start time.
#[derive(Clone)]
pub struct EngineDeps {
    pub tasks: Arc<dyn TaskSource>,
    pub settings: Arc<dyn SettingsSource>,
    pub notifier: Arc<dyn Notifier>,
    pub store: Arc<dyn PersistenceStore>,
}

/// Shared engine state. Producer ticks serialize on the surrounding
/// mutex; read-modify-write sequences on the ledgers never span an
/// await.
pub(crate) struct SchedulerEngine {
    tasks: Arc<dyn TaskSource>,
    settings: Arc<dyn SettingsSource>,
    gate: Arc<NotificationGate>,
    ledger: AlertLedger,
    queue: ReminderQueue,
    /// Last successful task fetch — the briefing falls back to this when
    /// a fetch fails.
    cached_tasks: Vec<Task>,
}

impl SchedulerEngine {
    pub(crate) fn new(deps: &EngineDeps, gate: Arc<NotificationGate>) -> Self {
        Self {
            tasks: deps.tasks.clone(),
            settings: deps.settings.clone(),
            gate,
            ledger: AlertLedger::load(deps.store.clone()),
            queue: ReminderQueue::load(deps.store.clone()),
            cached_tasks: Vec::new(),
        }
    }

    /// Deadline watcher pass: refresh the task snapshot, evaluate, prune.
    pub(crate) async fn deadline_tick(&mut self, now: DateTime<Local>) {
        let settings = self.settings.current();
        if !settings.deadline_alert.enabled {
            return;
        }
        match self.tasks.list_active().await {
            Ok(tasks) => self.cached_tasks = tasks,
            Err(e) => {
                tracing::warn!("⚠️ Task fetch failed, evaluating last snapshot: {e}");
            }
        }
        deadline::tick(&self.cached_tasks, &settings, now, &mut self.ledger, &self.gate);
    }

    /// Reminder dispatcher pass.
    pub(crate) fn reminder_tick(&mut self, now: DateTime<Local>) {
        let settings = self.settings.current();
        dispatch::tick(&mut self.queue, &settings, now, &self.gate);
    }

    /// Daily briefing fire: summarize the day's tasks and send the
    /// digest. A failed fetch falls back to the last cached snapshot
    /// rather than aborting — the re-arm must never be skipped.
    pub(crate) async fn briefing_fire(&mut self, now: DateTime<Local>) {
        let settings = self.settings.current();
        let tasks = match self.tasks.list_active().await {
            Ok(tasks) => {
                self.cached_tasks = tasks.clone();
                tasks
            }
            Err(e) => {
                tracing::warn!("⚠️ Task fetch failed for daily briefing, using cached snapshot: {e}");
                self.cached_tasks.clone()
            }
        };
        let (title, body) = briefing::build_digest(&tasks, now);
        self.gate.try_notify(
            &settings,
            now,
            &title,
            &body,
            "daily-briefing",
            "briefing",
            NotifyPriority::Low,
        );
    }
}

/// Process-wide lifecycle controller for the three producers.
///
/// Holds every timer handle it arms, so `stop()` can cancel them all;
/// `start()` on a running scheduler is a no-op — timers are never
/// duplicated. Multiple instances do not collide.
pub struct Scheduler {
    config: EngineConfig,
    engine: Arc<Mutex<SchedulerEngine>>,
    briefing: BriefingScheduler,
    running: Arc<AtomicBool>,
    deadline_loop: Mutex<Option<JoinHandle<()>>>,
    reminder_loop: Mutex<Option<JoinHandle<()>>>,
}

impl Scheduler {
    /// Build a scheduler without starting it. Invalid configuration is a
    /// setup-time contract violation and is rejected here.
    pub fn new(config: EngineConfig, deps: EngineDeps) -> Result<Self> {
        config.validate()?;
        deps.settings.current().validate()?;

        let gate = Arc::new(NotificationGate::new(deps.notifier.clone()));
        let engine = Arc::new(Mutex::new(SchedulerEngine::new(&deps, gate)));
        let running = Arc::new(AtomicBool::new(false));
        let briefing = BriefingScheduler::new(engine.clone(), deps.settings.clone(), running.clone());

        Ok(Self {
            config,
            engine,
            briefing,
            running,
            deadline_loop: Mutex::new(None),
            reminder_loop: Mutex::new(None),
        })
    }

    /// Arm all three producers and run one immediate evaluation pass, so
    /// a freshly started host does not wait a full tick for an
    /// already-due condition.
    pub async fn start(&self) -> Result<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            tracing::warn!("⚠️ Scheduler already running, start ignored");
            return Ok(());
        }

        tracing::info!(
            "⏰ Scheduler started (deadline every {}s, reminders every {}s)",
            self.config.deadline_tick_secs,
            self.config.reminder_tick_secs
        );

        {
            let mut engine = self.engine.lock().await;
            engine.deadline_tick(Local::now()).await;
            engine.reminder_tick(Local::now());
        }
        self.briefing.schedule().await;

        let engine = self.engine.clone();
        let running = self.running.clone();
        let period = Duration::from_secs(self.config.deadline_tick_secs);
        *self.deadline_loop.lock().await = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The immediate pass already ran; skip the interval's instant
            // first tick.
            interval.tick().await;
            loop {
                interval.tick().await;
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                let mut engine = engine.lock().await;
                engine.deadline_tick(Local::now()).await;
            }
        }));

        let engine = self.engine.clone();
        let running = self.running.clone();
        let period = Duration::from_secs(self.config.reminder_tick_secs);
        *self.reminder_loop.lock().await = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.tick().await;
            loop {
                interval.tick().await;
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                let mut engine = engine.lock().await;
                engine.reminder_tick(Local::now());
            }
        }));

        Ok(())
    }

    /// Cancel all pending timers. No notification fires after this
    /// returns; calling it twice is safe, and `start()` may be called
    /// again afterwards.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(handle) = self.deadline_loop.lock().await.take() {
            handle.abort();
        }
        if let Some(handle) = self.reminder_loop.lock().await.take() {
            handle.abort();
        }
        self.briefing.cancel().await;

        // A tick that was mid-body holds the engine lock; once we can
        // take it, no in-flight evaluation remains.
        drop(self.engine.lock().await);
        tracing::info!("⏹ Scheduler stopped");
    }

    /// Re-arm the daily briefing after a settings update, cancelling the
    /// previous timer first.
    pub async fn settings_changed(&self) {
        if self.running.load(Ordering::SeqCst) {
            self.briefing.schedule().await;
        }
    }

    /// Enqueue a one-shot reminder; returns its assigned id.
    pub async fn schedule_reminder(&self, reminder: NewReminder) -> String {
        self.engine.lock().await.queue.enqueue(reminder, Local::now())
    }

    /// Cancel a pending reminder. Returns whether anything was removed.
    pub async fn cancel_reminder(&self, id: &str) -> bool {
        self.engine.lock().await.queue.cancel(id)
    }

    /// Recent in-app notification history, oldest first.
    pub async fn notification_log(&self) -> Vec<Notification> {
        self.engine.lock().await.gate.history()
    }
}

/// Build and start a scheduler in one call.
pub async fn start(config: EngineConfig, deps: EngineDeps) -> Result<Scheduler> {
    let scheduler = Scheduler::new(config, deps)?;
    scheduler.start().await?;
    Ok(scheduler)
}
