//! Alarm sound settings.

use serde::{Deserialize, Serialize};

use super::ambience::clamp_volume;

/// Durable storage key for [`SoundSettings`].
pub const SOUND_KEY: &str = "cozydesk.sound.v1";
/// Alarm clip played when the timer completes.
pub const ALARM_SRC: &str = "/sounds/alarm.mp3";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SoundSettings {
    /// Alarm volume in `0.0..=1.0`.
    pub volume_level: f64,
    pub alarm_enabled: bool,
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self {
            volume_level: 0.7,
            alarm_enabled: true,
        }
    }
}

impl SoundSettings {
    pub fn loaded(stored: Self) -> Self {
        stored.with_volume(stored.volume_level)
    }

    pub fn with_volume(&self, volume: f64) -> Self {
        Self {
            volume_level: clamp_volume(volume),
            ..self.clone()
        }
    }

    pub fn toggle_alarm(&self) -> Self {
        Self {
            alarm_enabled: !self.alarm_enabled,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_is_clamped() {
        assert_eq!(SoundSettings::default().with_volume(1.4).volume_level, 1.0);
        assert_eq!(SoundSettings::default().with_volume(-2.0).volume_level, 0.0);
        assert!(!SoundSettings::default().toggle_alarm().alarm_enabled);
    }
}
