//! Engine configuration and user notification settings.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TaskpulseError};

/// User-facing notification settings.
///
/// Producers read the latest snapshot through
/// [`crate::traits::SettingsSource`] on every tick — settings are never
/// cached inside a producer beyond one tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "bool_true")]
    pub push_enabled: bool,
    #[serde(default = "bool_true")]
    pub sound: bool,
    #[serde(default)]
    pub vibration: bool,
    #[serde(default)]
    pub do_not_disturb: DoNotDisturb,
    #[serde(default)]
    pub daily_briefing: DailyBriefing,
    #[serde(default)]
    pub deadline_alert: DeadlineAlert,
}

fn bool_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            push_enabled: true,
            sound: true,
            vibration: false,
            do_not_disturb: DoNotDisturb::default(),
            daily_briefing: DailyBriefing::default(),
            deadline_alert: DeadlineAlert::default(),
        }
    }
}

impl Settings {
    /// Setup-time contract check, run once at engine start. Steady-state
    /// settings reads are never validated — producers fail open instead.
    pub fn validate(&self) -> Result<()> {
        if self.deadline_alert.minutes_before <= 0 {
            return Err(TaskpulseError::Config(format!(
                "deadline_alert.minutes_before must be positive, got {}",
                self.deadline_alert.minutes_before
            )));
        }
        Ok(())
    }
}

/// Quiet-hours window in wall-clock "HH:mm" bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoNotDisturb {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_dnd_start")]
    pub start: String,
    #[serde(default = "default_dnd_end")]
    pub end: String,
}

fn default_dnd_start() -> String {
    "22:00".into()
}

fn default_dnd_end() -> String {
    "08:00".into()
}

impl Default for DoNotDisturb {
    fn default() -> Self {
        Self {
            enabled: false,
            start: default_dnd_start(),
            end: default_dnd_end(),
        }
    }
}

impl DoNotDisturb {
    /// Whether the given minute-of-day falls inside the quiet window.
    ///
    /// `start > end` means the window spans midnight. Malformed bounds
    /// fail open: the window is treated as inactive.
    pub fn covers(&self, minute_of_day: u32) -> bool {
        if !self.enabled {
            return false;
        }
        let (Some(start), Some(end)) = (parse_hhmm(&self.start), parse_hhmm(&self.end)) else {
            tracing::warn!(
                "⚠️ Invalid do-not-disturb window '{}'-'{}', treating as inactive",
                self.start,
                self.end
            );
            return false;
        };
        if start > end {
            minute_of_day >= start || minute_of_day < end
        } else {
            minute_of_day >= start && minute_of_day < end
        }
    }
}

/// Daily digest configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyBriefing {
    #[serde(default = "bool_true")]
    pub enabled: bool,
    #[serde(default = "default_briefing_time")]
    pub time: String,
}

fn default_briefing_time() -> String {
    "08:00".into()
}

impl Default for DailyBriefing {
    fn default() -> Self {
        Self {
            enabled: true,
            time: default_briefing_time(),
        }
    }
}

/// Approaching-deadline alert configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadlineAlert {
    #[serde(default = "bool_true")]
    pub enabled: bool,
    /// Alert when a task is due within this many minutes.
    #[serde(default = "default_minutes_before")]
    pub minutes_before: i64,
}

fn default_minutes_before() -> i64 {
    60
}

impl Default for DeadlineAlert {
    fn default() -> Self {
        Self {
            enabled: true,
            minutes_before: default_minutes_before(),
        }
    }
}

/// Engine wiring knobs, validated once at start. A bad value here is a
/// setup bug, not a runtime condition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_tick_secs")]
    pub deadline_tick_secs: u64,
    #[serde(default = "default_tick_secs")]
    pub reminder_tick_secs: u64,
}

fn default_tick_secs() -> u64 {
    60
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            deadline_tick_secs: default_tick_secs(),
            reminder_tick_secs: default_tick_secs(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.deadline_tick_secs == 0 {
            return Err(TaskpulseError::Config(
                "deadline_tick_secs must be greater than zero".into(),
            ));
        }
        if self.reminder_tick_secs == 0 {
            return Err(TaskpulseError::Config(
                "reminder_tick_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Parse a wall-clock "HH:mm" string into minutes-of-day.
pub fn parse_hhmm(value: &str) -> Option<u32> {
    let (h, m) = value.split_once(':')?;
    let h: u32 = h.trim().parse().ok()?;
    let m: u32 = m.trim().parse().ok()?;
    if h > 23 || m > 59 {
        return None;
    }
    Some(h * 60 + m)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hhmm_accepts_valid_times() {
        assert_eq!(parse_hhmm("08:00"), Some(480));
        assert_eq!(parse_hhmm("23:59"), Some(1439));
        assert_eq!(parse_hhmm("0:5"), Some(5));
    }

    #[test]
    fn parse_hhmm_rejects_garbage() {
        assert_eq!(parse_hhmm("24:00"), None);
        assert_eq!(parse_hhmm("12:60"), None);
        assert_eq!(parse_hhmm("noon"), None);
        assert_eq!(parse_hhmm(""), None);
    }

    #[test]
    fn dnd_same_day_window() {
        let dnd = DoNotDisturb {
            enabled: true,
            start: "09:00".into(),
            end: "17:00".into(),
        };
        assert!(dnd.covers(parse_hhmm("12:00").unwrap()));
        assert!(!dnd.covers(parse_hhmm("08:59").unwrap()));
        assert!(!dnd.covers(parse_hhmm("17:00").unwrap()));
    }

    #[test]
    fn dnd_overnight_window_wraps_midnight() {
        let dnd = DoNotDisturb {
            enabled: true,
            start: "22:00".into(),
            end: "08:00".into(),
        };
        assert!(dnd.covers(parse_hhmm("23:00").unwrap()));
        assert!(dnd.covers(parse_hhmm("03:00").unwrap()));
        assert!(!dnd.covers(parse_hhmm("09:00").unwrap()));
        assert!(!dnd.covers(parse_hhmm("21:59").unwrap()));
    }

    #[test]
    fn dnd_disabled_or_malformed_is_inactive() {
        let off = DoNotDisturb {
            enabled: false,
            start: "22:00".into(),
            end: "08:00".into(),
        };
        assert!(!off.covers(1380));

        let bad = DoNotDisturb {
            enabled: true,
            start: "late".into(),
            end: "08:00".into(),
        };
        assert!(!bad.covers(1380));
    }

    #[test]
    fn settings_defaults_from_empty_json() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert!(settings.push_enabled);
        assert!(!settings.do_not_disturb.enabled);
        assert_eq!(settings.daily_briefing.time, "08:00");
        assert_eq!(settings.deadline_alert.minutes_before, 60);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn negative_minutes_before_rejected() {
        let mut settings = Settings::default();
        settings.deadline_alert.minutes_before = -5;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn zero_tick_rejected() {
        let config = EngineConfig {
            deadline_tick_secs: 0,
            reminder_tick_secs: 60,
        };
        assert!(config.validate().is_err());
        assert!(EngineConfig::default().validate().is_ok());
    }
}
