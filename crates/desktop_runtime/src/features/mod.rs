//! Per-feature state records and their persisted atoms.

pub mod ambience;
pub mod background;
pub mod bookmarks;
pub mod music;
pub mod sessions;
pub mod sound;
pub mod timer;

use std::rc::Rc;

use platform_host::DurableStore;

use crate::{apps, atoms::Atom};

use self::{
    ambience::{AmbienceState, AmbienceUiState, AMBIENCE_KEY},
    background::{BackgroundSettings, BACKGROUND_KEY},
    bookmarks::{Bookmark, BOOKMARKS_KEY},
    music::{MusicState, MUSIC_KEY},
    sessions::{FocusSession, SESSIONS_KEY},
    sound::{SoundSettings, SOUND_KEY},
    timer::{TimerState, TIMER_KEY},
};

#[derive(Clone)]
/// Every feature atom, loaded from one durable store.
pub struct FeatureAtoms {
    pub timer: Atom<TimerState>,
    pub ambience: Atom<AmbienceState>,
    pub ambience_ui: Atom<AmbienceUiState>,
    pub music: Atom<MusicState>,
    /// Whether the music manager is waiting for a new source to become playable.
    pub music_loading: Atom<bool>,
    pub background: Atom<BackgroundSettings>,
    pub sound: Atom<SoundSettings>,
    pub bookmarks: Atom<Vec<Bookmark>>,
    pub sessions: Atom<Vec<FocusSession>>,
}

impl FeatureAtoms {
    /// Loads every feature from `store`, applying each feature's reload merge.
    pub fn load(store: Rc<dyn DurableStore>) -> Self {
        let sound_count = apps::ambience_sounds().len();
        Self {
            timer: Atom::persisted(
                store.clone(),
                TIMER_KEY,
                TimerState::default(),
                TimerState::loaded,
            ),
            ambience: Atom::persisted(
                store.clone(),
                AMBIENCE_KEY,
                AmbienceState::default(),
                |stored| AmbienceState::loaded(stored, sound_count),
            ),
            ambience_ui: Atom::new(AmbienceUiState::default()),
            music: Atom::persisted(
                store.clone(),
                MUSIC_KEY,
                MusicState::seeded(apps::default_playlist()),
                MusicState::loaded,
            ),
            music_loading: Atom::new(false),
            background: Atom::persisted(
                store.clone(),
                BACKGROUND_KEY,
                BackgroundSettings::default(),
                BackgroundSettings::loaded,
            ),
            sound: Atom::persisted(
                store.clone(),
                SOUND_KEY,
                SoundSettings::default(),
                SoundSettings::loaded,
            ),
            bookmarks: Atom::persisted(store.clone(), BOOKMARKS_KEY, Vec::new(), |stored| stored),
            sessions: Atom::persisted(store, SESSIONS_KEY, Vec::new(), |stored| stored),
        }
    }
}
