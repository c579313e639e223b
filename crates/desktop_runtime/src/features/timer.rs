//! Focus timer state and its pure transitions.

use desktop_app_contract::WindowAssociation;
use serde::{Deserialize, Serialize};

/// Durable storage key for [`TimerState`].
pub const TIMER_KEY: &str = "cozydesk.timer.v1";
/// Default custom duration in minutes.
pub const DEFAULT_CUSTOM_MINUTES: u32 = 45;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
/// Preset the timer counts down from.
pub enum TimerSetting {
    #[default]
    /// 25 minute focus block.
    Work25,
    /// 5 minute break.
    Short5,
    /// 15 minute break.
    Long15,
    /// User-chosen length.
    Custom,
}

impl TimerSetting {
    /// Countdown length in seconds. `custom_minutes` applies only to [`TimerSetting::Custom`].
    pub const fn duration_seconds(self, custom_minutes: u32) -> u32 {
        match self {
            Self::Work25 => 25 * 60,
            Self::Short5 => 5 * 60,
            Self::Long15 => 15 * 60,
            Self::Custom => custom_minutes.saturating_mul(60),
        }
    }

    /// Human label used by the timer view and the document title.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Work25 => "Focus",
            Self::Short5 => "Short break",
            Self::Long15 => "Long break",
            Self::Custom => "Custom",
        }
    }

    /// All presets in display order.
    pub const ALL: [Self; 4] = [Self::Work25, Self::Short5, Self::Long15, Self::Custom];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
/// Persisted timer record.
pub struct TimerState {
    /// Seconds left on the countdown.
    pub time_remaining: u32,
    /// Whether the countdown is running.
    pub is_running: bool,
    /// Selected preset.
    pub timer_setting: TimerSetting,
    /// Minutes used by the custom preset. Always at least 1.
    pub custom_duration_minutes: u32,
    /// Optional label shown in place of "Timer".
    pub custom_title: String,
    /// Window currently presenting the timer.
    #[serde(flatten)]
    pub association: WindowAssociation,
}

impl Default for TimerState {
    fn default() -> Self {
        Self {
            time_remaining: TimerSetting::Work25.duration_seconds(DEFAULT_CUSTOM_MINUTES),
            is_running: false,
            timer_setting: TimerSetting::Work25,
            custom_duration_minutes: DEFAULT_CUSTOM_MINUTES,
            custom_title: String::new(),
            association: WindowAssociation::default(),
        }
    }
}

impl TimerState {
    /// Merges a stored record with the hard-reset fields: a reload never resumes a running
    /// timer or keeps a window association.
    pub fn loaded(stored: Self) -> Self {
        Self {
            is_running: false,
            custom_duration_minutes: stored.custom_duration_minutes.max(1),
            association: WindowAssociation::default(),
            ..stored
        }
    }

    /// Full length of the selected preset in seconds.
    pub fn full_duration(&self) -> u32 {
        self.timer_setting
            .duration_seconds(self.custom_duration_minutes)
    }

    /// Title shown for this timer.
    pub fn display_title(&self) -> &str {
        let trimmed = self.custom_title.trim();
        if trimmed.is_empty() {
            "Timer"
        } else {
            trimmed
        }
    }

    pub fn start(&self) -> Self {
        Self {
            is_running: self.time_remaining > 0,
            ..self.clone()
        }
    }

    pub fn pause(&self) -> Self {
        Self {
            is_running: false,
            ..self.clone()
        }
    }

    pub fn reset(&self) -> Self {
        Self {
            is_running: false,
            time_remaining: self.full_duration(),
            ..self.clone()
        }
    }

    /// Switches preset; the countdown restarts stopped at the new full length.
    pub fn with_setting(&self, setting: TimerSetting) -> Self {
        Self {
            timer_setting: setting,
            ..self.clone()
        }
        .reset()
    }

    /// Updates the custom length. Time and run state change only while the custom preset is
    /// selected.
    pub fn with_custom_duration(&self, minutes: u32) -> Self {
        let next = Self {
            custom_duration_minutes: minutes.max(1),
            ..self.clone()
        };
        if next.timer_setting == TimerSetting::Custom {
            next.reset()
        } else {
            next
        }
    }

    pub fn with_custom_title(&self, title: impl Into<String>) -> Self {
        Self {
            custom_title: title.into(),
            ..self.clone()
        }
    }

    /// Applies a worker tick. Remaining time never grows while running.
    pub fn on_tick(&self, remaining: u32) -> Self {
        Self {
            time_remaining: remaining.min(self.time_remaining),
            ..self.clone()
        }
    }

    pub fn on_complete(&self) -> Self {
        Self {
            time_remaining: 0,
            is_running: false,
            ..self.clone()
        }
    }

    /// Binds the timer to `window`.
    pub fn associated(&self, association: WindowAssociation) -> Self {
        Self {
            association,
            ..self.clone()
        }
    }

    pub fn with_minimized(&self, minimized: bool) -> Self {
        let mut next = self.clone();
        next.association.is_minimized = minimized;
        next
    }
}
