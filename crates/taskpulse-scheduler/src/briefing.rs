//! Daily briefing — a self-rescheduling one-shot timer, not a
//! fixed-interval poll. The fire handler computes and arms the next
//! occurrence itself, which avoids both drift and double-fires across
//! settings changes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use chrono::{DateTime, Days, Local, TimeZone};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use taskpulse_core::config::parse_hhmm;
use taskpulse_core::task::Task;
use taskpulse_core::traits::SettingsSource;

use crate::engine::SchedulerEngine;
use crate::priority::{compute_priority, Tier};

/// Lifecycle of the briefing timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BriefingState {
    Idle,
    Scheduled(DateTime<Local>),
    Fired,
}

/// Owns the single armed timer. `schedule()` always cancels the previous
/// one first, so successive reconfiguration never leaks timers.
#[derive(Clone)]
pub(crate) struct BriefingScheduler {
    engine: Arc<Mutex<SchedulerEngine>>,
    settings: Arc<dyn SettingsSource>,
    running: Arc<AtomicBool>,
    timer: Arc<Mutex<Option<JoinHandle<()>>>>,
    state: Arc<StdMutex<BriefingState>>,
}

impl BriefingScheduler {
    pub(crate) fn new(
        engine: Arc<Mutex<SchedulerEngine>>,
        settings: Arc<dyn SettingsSource>,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            engine,
            settings,
            running,
            timer: Arc::new(Mutex::new(None)),
            state: Arc::new(StdMutex::new(BriefingState::Idle)),
        }
    }

    /// Cancel any pending fire and re-arm from the current settings.
    pub(crate) async fn schedule(&self) {
        let mut slot = self.timer.lock().await;
        if let Some(handle) = slot.take() {
            handle.abort();
        }

        let settings = self.settings.current();
        if !settings.daily_briefing.enabled {
            tracing::debug!("💤 Daily briefing disabled, timer idle");
            self.set_state(BriefingState::Idle);
            return;
        }

        let Some(fire_at) = next_occurrence(&settings.daily_briefing.time, Local::now()) else {
            tracing::warn!(
                "⚠️ Invalid briefing time '{}', timer idle",
                settings.daily_briefing.time
            );
            self.set_state(BriefingState::Idle);
            return;
        };

        tracing::info!("📋 Daily briefing armed for {fire_at}");
        self.set_state(BriefingState::Scheduled(fire_at));
        let this = self.clone();
        *slot = Some(tokio::spawn(async move { this.run(fire_at).await }));
    }

    /// Cancel the pending fire, if any.
    pub(crate) async fn cancel(&self) {
        if let Some(handle) = self.timer.lock().await.take() {
            handle.abort();
        }
        self.set_state(BriefingState::Idle);
    }

    pub(crate) fn state(&self) -> BriefingState {
        *self.state.lock().unwrap()
    }

    pub(crate) fn pending_fire_at(&self) -> Option<DateTime<Local>> {
        match self.state() {
            BriefingState::Scheduled(at) => Some(at),
            _ => None,
        }
    }

    pub(crate) async fn armed(&self) -> bool {
        self.timer.lock().await.is_some()
    }

    fn set_state(&self, state: BriefingState) {
        *self.state.lock().unwrap() = state;
    }

    /// The timer body: sleep to the armed instant, fire, re-arm for the
    /// following day. Sequential by construction — a slow fetch can
    /// never cause two overlapping fire evaluations.
    async fn run(self, first_fire: DateTime<Local>) {
        let mut next = first_fire;
        loop {
            let wait = (next - Local::now())
                .to_std()
                .unwrap_or(std::time::Duration::ZERO);
            tokio::time::sleep(wait).await;

            // Stale continuation after stop(): do nothing.
            if !self.running.load(Ordering::SeqCst) {
                return;
            }

            self.set_state(BriefingState::Fired);
            {
                let mut engine = self.engine.lock().await;
                engine.briefing_fire(Local::now()).await;
            }

            if !self.running.load(Ordering::SeqCst) {
                return;
            }
            let settings = self.settings.current();
            if !settings.daily_briefing.enabled {
                self.set_state(BriefingState::Idle);
                return;
            }
            match next_occurrence(&settings.daily_briefing.time, Local::now()) {
                Some(at) => {
                    tracing::info!("📋 Daily briefing re-armed for {at}");
                    self.set_state(BriefingState::Scheduled(at));
                    next = at;
                }
                None => {
                    self.set_state(BriefingState::Idle);
                    return;
                }
            }
        }
    }
}

/// Next occurrence of a wall-clock "HH:mm" strictly after `now`, rolled
/// to tomorrow when today's instant has already passed.
pub fn next_occurrence(time: &str, now: DateTime<Local>) -> Option<DateTime<Local>> {
    let minute_of_day = parse_hhmm(time)?;
    let (hour, minute) = (minute_of_day / 60, minute_of_day % 60);

    let today = now.date_naive().and_hms_opt(hour, minute, 0)?;
    if let Some(candidate) = Local.from_local_datetime(&today).earliest()
        && candidate > now
    {
        return Some(candidate);
    }

    let tomorrow = now
        .date_naive()
        .checked_add_days(Days::new(1))?
        .and_hms_opt(hour, minute, 0)?;
    Local.from_local_datetime(&tomorrow).earliest()
}

/// One-line digest of the day: open task count and how many are urgent.
pub fn build_digest(tasks: &[Task], now: DateTime<Local>) -> (String, String) {
    let open: Vec<&Task> = tasks.iter().filter(|task| !task.completed).collect();
    let urgent = open
        .iter()
        .filter(|task| compute_priority(task, now).tier == Tier::High)
        .count();

    let body = if open.is_empty() {
        "No open tasks today".to_string()
    } else {
        format!("{} open tasks, {} urgent", open.len(), urgent)
    };
    ("📋 Daily briefing".to_string(), body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineDeps;
    use crate::gate::NotificationGate;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use chrono::{Duration, Timelike};
    use taskpulse_core::config::Settings;
    use taskpulse_core::error::Result;
    use taskpulse_core::task::DueDate;
    use taskpulse_core::traits::{Notifier, TaskSource};

    struct NoTasks;

    #[async_trait]
    impl TaskSource for NoTasks {
        async fn list_active(&self) -> Result<Vec<Task>> {
            Ok(Vec::new())
        }
    }

    struct NullNotifier;

    impl Notifier for NullNotifier {
        fn permission_granted(&self) -> bool {
            true
        }

        fn show(&self, _title: &str, _body: &str, _tag: &str) {}
    }

    struct FixedSettings {
        settings: Settings,
    }

    impl taskpulse_core::traits::SettingsSource for FixedSettings {
        fn current(&self) -> Settings {
            self.settings.clone()
        }
    }

    fn scheduler_with(settings: Settings) -> BriefingScheduler {
        let deps = EngineDeps {
            tasks: Arc::new(NoTasks),
            settings: Arc::new(FixedSettings { settings }),
            notifier: Arc::new(NullNotifier),
            store: Arc::new(MemoryStore::new()),
        };
        let gate = Arc::new(NotificationGate::new(deps.notifier.clone()));
        let engine = Arc::new(Mutex::new(SchedulerEngine::new(&deps, gate)));
        BriefingScheduler::new(engine, deps.settings.clone(), Arc::new(AtomicBool::new(true)))
    }

    #[test]
    fn next_occurrence_rolls_to_tomorrow() {
        let now = Local.with_ymd_and_hms(2026, 3, 10, 10, 0, 0).unwrap();

        let later_today = next_occurrence("14:30", now).unwrap();
        assert_eq!(later_today.date_naive(), now.date_naive());
        assert_eq!((later_today.hour(), later_today.minute()), (14, 30));

        let tomorrow = next_occurrence("08:00", now).unwrap();
        assert_eq!(tomorrow.date_naive(), now.date_naive() + Duration::days(1));
        assert_eq!((tomorrow.hour(), tomorrow.minute()), (8, 0));

        // An instant equal to now rolls forward too.
        let same_minute = next_occurrence("10:00", now).unwrap();
        assert_eq!(same_minute.date_naive(), now.date_naive() + Duration::days(1));
    }

    #[test]
    fn next_occurrence_rejects_malformed_time() {
        let now = Local.with_ymd_and_hms(2026, 3, 10, 10, 0, 0).unwrap();
        assert!(next_occurrence("25:00", now).is_none());
        assert!(next_occurrence("morning", now).is_none());
    }

    #[test]
    fn digest_counts_open_and_urgent() {
        let now = Local.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap();
        let mut urgent = Task::new("u", "Submit filing");
        urgent.due_date = Some(DueDate::At(now + Duration::hours(1)));
        urgent.importance = 9;
        let mut done = Task::new("d", "Old chore");
        done.completed = true;
        let open = Task::new("o", "Read paper");

        let (title, body) = build_digest(&[urgent, done, open], now);
        assert!(title.contains("Daily briefing"));
        assert_eq!(body, "2 open tasks, 1 urgent");

        let (_, empty_body) = build_digest(&[], now);
        assert_eq!(empty_body, "No open tasks today");
    }

    #[tokio::test]
    async fn schedule_twice_leaves_one_armed_timer() {
        let scheduler = scheduler_with(Settings::default());

        scheduler.schedule().await;
        let first_fire = scheduler.pending_fire_at().unwrap();

        // A settings change re-enters schedule(): the old timer is
        // cancelled before the new one is armed.
        scheduler.schedule().await;
        assert!(scheduler.armed().await);
        assert_eq!(scheduler.pending_fire_at(), Some(first_fire));
        assert!(matches!(scheduler.state(), BriefingState::Scheduled(_)));

        scheduler.cancel().await;
        assert!(!scheduler.armed().await);
        assert_eq!(scheduler.state(), BriefingState::Idle);
    }

    #[tokio::test]
    async fn disabled_briefing_stays_idle() {
        let mut settings = Settings::default();
        settings.daily_briefing.enabled = false;
        let scheduler = scheduler_with(settings);

        scheduler.schedule().await;
        assert!(!scheduler.armed().await);
        assert_eq!(scheduler.state(), BriefingState::Idle);
    }

    #[tokio::test]
    async fn malformed_time_stays_idle() {
        let mut settings = Settings::default();
        settings.daily_briefing.time = "sunrise".into();
        let scheduler = scheduler_with(settings);

        scheduler.schedule().await;
        assert!(!scheduler.armed().await);
    }
}
