//! Music player playlist and transport state.

use serde::{Deserialize, Serialize};

use super::ambience::clamp_volume;
use crate::apps::SongSeed;

/// Durable storage key for [`MusicState`].
pub const MUSIC_KEY: &str = "cozydesk.music.v1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// One playlist entry.
pub struct Song {
    pub url: String,
    pub title: String,
    pub id: String,
    /// Monotonic sequence number; never reused after deletion.
    pub seq_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
/// Persisted music player record.
pub struct MusicState {
    pub playlist: Vec<Song>,
    /// Meaningful only while `playlist` is non-empty.
    pub current_song_index: usize,
    pub is_playing: bool,
    /// Playback position of the current song in seconds.
    pub current_time: f64,
    pub is_window_open: bool,
    /// Highest sequence number ever assigned.
    pub last_seq_id: u64,
    pub volume: f64,
}

impl Default for MusicState {
    fn default() -> Self {
        Self {
            playlist: Vec::new(),
            current_song_index: 0,
            is_playing: false,
            current_time: 0.0,
            is_window_open: false,
            last_seq_id: 0,
            volume: 0.8,
        }
    }
}

impl MusicState {
    /// Builds a fresh state from the bundled playlist.
    pub fn seeded(seeds: &[SongSeed]) -> Self {
        seeds.iter().fold(Self::default(), |state, seed| {
            state.add_song(&seed.url, &seed.title, seed.artist.clone())
        })
    }

    /// Merges a stored record: playback intent and window flag never survive a reload.
    pub fn loaded(stored: Self) -> Self {
        let last_seq_id = stored
            .playlist
            .iter()
            .map(|song| song.seq_id)
            .max()
            .unwrap_or(0)
            .max(stored.last_seq_id);
        let current_song_index = if stored.current_song_index < stored.playlist.len() {
            stored.current_song_index
        } else {
            0
        };
        Self {
            is_playing: false,
            is_window_open: false,
            current_song_index,
            last_seq_id,
            current_time: stored.current_time.max(0.0),
            volume: clamp_volume(stored.volume),
            ..stored
        }
    }

    pub fn current_song(&self) -> Option<&Song> {
        self.playlist.get(self.current_song_index)
    }

    fn next_seq_id(&self) -> u64 {
        self.playlist
            .iter()
            .map(|song| song.seq_id)
            .max()
            .unwrap_or(0)
            .max(self.last_seq_id)
            + 1
    }

    pub fn add_song(&self, url: &str, title: &str, artist: Option<String>) -> Self {
        let seq_id = self.next_seq_id();
        let title = title.trim();
        let mut next = self.clone();
        next.playlist.push(Song {
            url: url.trim().to_string(),
            title: if title.is_empty() {
                url.trim().to_string()
            } else {
                title.to_string()
            },
            id: format!("song-{seq_id}"),
            seq_id,
            artist,
        });
        next.last_seq_id = seq_id;
        next
    }

    pub fn remove_song(&self, id: &str) -> Self {
        let Some(index) = self.playlist.iter().position(|song| song.id == id) else {
            return self.clone();
        };
        let mut next = self.clone();
        next.playlist.remove(index);
        if next.playlist.is_empty() {
            next.current_song_index = 0;
            next.is_playing = false;
            next.current_time = 0.0;
        } else if index < next.current_song_index {
            next.current_song_index -= 1;
        } else if index == next.current_song_index {
            next.current_song_index = index.min(next.playlist.len() - 1);
            next.current_time = 0.0;
        }
        next
    }

    pub fn select_song(&self, index: usize) -> Self {
        if index >= self.playlist.len() {
            return self.clone();
        }
        Self {
            current_song_index: index,
            current_time: 0.0,
            ..self.clone()
        }
    }

    pub fn next_song(&self) -> Self {
        match self.playlist.len() {
            0 => self.clone(),
            len => self.select_song((self.current_song_index + 1) % len),
        }
    }

    pub fn previous_song(&self) -> Self {
        match self.playlist.len() {
            0 => self.clone(),
            len => self.select_song((self.current_song_index + len - 1) % len),
        }
    }

    /// Flips play intent; an empty playlist never plays.
    pub fn toggle_play(&self) -> Self {
        self.with_playing(!self.is_playing)
    }

    pub fn with_playing(&self, is_playing: bool) -> Self {
        Self {
            is_playing: is_playing && !self.playlist.is_empty(),
            ..self.clone()
        }
    }

    pub fn with_current_time(&self, seconds: f64) -> Self {
        Self {
            current_time: seconds.max(0.0),
            ..self.clone()
        }
    }

    pub fn with_volume(&self, volume: f64) -> Self {
        Self {
            volume: clamp_volume(volume),
            ..self.clone()
        }
    }

    pub fn with_window_open(&self, is_window_open: bool) -> Self {
        Self {
            is_window_open,
            ..self.clone()
        }
    }

    /// Moves to the next song after the current one ended, wrapping to the start.
    pub fn advance_on_end(&self) -> Self {
        self.next_song()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn three_songs() -> MusicState {
        MusicState::default()
            .add_song("/a.mp3", "A", None)
            .add_song("/b.mp3", "B", None)
            .add_song("/c.mp3", "C", Some("Band".to_string()))
    }

    #[test]
    fn seq_ids_are_never_reused_after_deletion() {
        let state = three_songs().remove_song("song-3");
        assert_eq!(state.playlist.len(), 2);
        let state = state.add_song("/d.mp3", "D", None);
        assert_eq!(state.playlist[2].seq_id, 4);
        assert_eq!(state.playlist[2].id, "song-4");

        let emptied = state
            .remove_song("song-1")
            .remove_song("song-2")
            .remove_song("song-4");
        assert_eq!(emptied.add_song("/e.mp3", "", None).playlist[0].seq_id, 5);
    }

    #[test]
    fn first_song_gets_seq_one() {
        let state = MusicState::default().add_song("/a.mp3", "A", None);
        assert_eq!(state.playlist[0].seq_id, 1);
    }

    #[test]
    fn removing_before_current_keeps_the_same_song_selected() {
        let state = three_songs().select_song(2).remove_song("song-1");
        assert_eq!(state.current_song_index, 1);
        assert_eq!(state.current_song().map(|s| s.title.as_str()), Some("C"));
    }

    #[test]
    fn removing_last_song_stops_playback() {
        let state = MusicState::default()
            .add_song("/a.mp3", "A", None)
            .toggle_play()
            .remove_song("song-1");
        assert!(!state.is_playing);
        assert!(state.current_song().is_none());
        assert!(!state.toggle_play().is_playing);
    }

    #[test]
    fn advance_on_end_wraps_and_rewinds() {
        let state = three_songs().select_song(2).with_current_time(93.0);
        let next = state.advance_on_end();
        assert_eq!(next.current_song_index, 0);
        assert_eq!(next.current_time, 0.0);
    }

    #[test]
    fn loaded_state_clears_intent_and_window_flag() {
        let stored = MusicState {
            is_playing: true,
            is_window_open: true,
            current_song_index: 7,
            last_seq_id: 1,
            ..three_songs()
        };
        let loaded = MusicState::loaded(stored);
        assert!(!loaded.is_playing);
        assert!(!loaded.is_window_open);
        assert_eq!(loaded.current_song_index, 0);
        assert_eq!(loaded.last_seq_id, 3);
    }
}
