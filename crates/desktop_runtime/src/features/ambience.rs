//! Ambience player state.

use serde::{Deserialize, Serialize};

/// Durable storage key for [`AmbienceState`].
pub const AMBIENCE_KEY: &str = "cozydesk.ambience.v1";
const DEFAULT_VOLUME: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
/// Persisted ambience selection and intent.
///
/// `is_playing` is stored but never resumed from: the ambience manager forces it off on mount and
/// unmount.
pub struct AmbienceState {
    pub current_sound_index: usize,
    pub is_playing: bool,
    pub volume: f64,
}

impl Default for AmbienceState {
    fn default() -> Self {
        Self {
            current_sound_index: 0,
            is_playing: false,
            volume: DEFAULT_VOLUME,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Ephemeral ambience view state.
pub struct AmbienceUiState {
    pub is_loading: bool,
    pub is_muted: bool,
    /// Volume restored when unmuting.
    pub prev_volume: f64,
}

impl Default for AmbienceUiState {
    fn default() -> Self {
        Self {
            is_loading: false,
            is_muted: false,
            prev_volume: DEFAULT_VOLUME,
        }
    }
}

impl AmbienceState {
    /// Clamps a stored record into range for a catalog of `sound_count` entries.
    pub fn loaded(stored: Self, sound_count: usize) -> Self {
        Self {
            current_sound_index: if stored.current_sound_index < sound_count {
                stored.current_sound_index
            } else {
                0
            },
            volume: clamp_volume(stored.volume),
            ..stored
        }
    }

    pub fn select_sound(&self, index: usize, sound_count: usize) -> Self {
        if index >= sound_count {
            return self.clone();
        }
        Self {
            current_sound_index: index,
            ..self.clone()
        }
    }

    pub fn next_sound(&self, sound_count: usize) -> Self {
        if sound_count == 0 {
            return self.clone();
        }
        self.select_sound((self.current_sound_index + 1) % sound_count, sound_count)
    }

    pub fn previous_sound(&self, sound_count: usize) -> Self {
        if sound_count == 0 {
            return self.clone();
        }
        let index = (self.current_sound_index + sound_count - 1) % sound_count;
        self.select_sound(index, sound_count)
    }

    pub fn toggle_play(&self) -> Self {
        Self {
            is_playing: !self.is_playing,
            ..self.clone()
        }
    }

    pub fn with_playing(&self, is_playing: bool) -> Self {
        Self {
            is_playing,
            ..self.clone()
        }
    }

    pub fn with_volume(&self, volume: f64) -> Self {
        Self {
            volume: clamp_volume(volume),
            ..self.clone()
        }
    }
}

/// Toggles mute by parking the current volume in the ui state.
pub fn toggle_mute(state: &AmbienceState, ui: &AmbienceUiState) -> (AmbienceState, AmbienceUiState) {
    if ui.is_muted {
        let restored = if ui.prev_volume > 0.0 {
            ui.prev_volume
        } else {
            DEFAULT_VOLUME
        };
        (
            state.with_volume(restored),
            AmbienceUiState {
                is_muted: false,
                ..ui.clone()
            },
        )
    } else {
        (
            state.with_volume(0.0),
            AmbienceUiState {
                is_muted: true,
                prev_volume: state.volume,
                ..ui.clone()
            },
        )
    }
}

pub(crate) fn clamp_volume(volume: f64) -> f64 {
    if volume.is_nan() {
        DEFAULT_VOLUME
    } else {
        volume.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn sound_navigation_wraps() {
        let state = AmbienceState::default();
        assert_eq!(state.previous_sound(5).current_sound_index, 4);
        assert_eq!(
            state.select_sound(4, 5).next_sound(5).current_sound_index,
            0
        );
        assert_eq!(state.select_sound(9, 5), state);
    }

    #[test]
    fn mute_round_trip_restores_previous_volume() {
        let state = AmbienceState::default().with_volume(0.8);
        let (muted, ui) = toggle_mute(&state, &AmbienceUiState::default());
        assert_eq!(muted.volume, 0.0);
        assert!(ui.is_muted);

        let (unmuted, ui) = toggle_mute(&muted, &ui);
        assert_eq!(unmuted.volume, 0.8);
        assert!(!ui.is_muted);
    }

    #[test]
    fn loaded_state_is_clamped() {
        let stored = AmbienceState {
            current_sound_index: 12,
            is_playing: true,
            volume: 3.0,
        };
        let loaded = AmbienceState::loaded(stored, 5);
        assert_eq!(loaded.current_sound_index, 0);
        assert_eq!(loaded.volume, 1.0);
    }
}
