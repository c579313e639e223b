//! Music manager: playlist playback that outlives the music player window.

use std::rc::Rc;

use platform_host::HostServices;

use super::MediaManagerCore;
use crate::{
    apps::music_app_id,
    atoms::{Atom, Subscription},
    cleanup_queue::CleanupQueue,
    features::{music::MusicState, FeatureAtoms},
};

fn song_url(state: &MusicState) -> Option<String> {
    state.current_song().map(|song| song.url.clone())
}

/// Mounted music manager.
///
/// Closing the player window only clears `is_window_open`; playback continues until paused or the
/// manager is dropped.
pub struct MusicManager {
    core: Rc<MediaManagerCore>,
    music: Atom<MusicState>,
    cleanup: CleanupQueue,
    subscriptions: Vec<Subscription>,
}

impl MusicManager {
    pub fn mount(host: &HostServices, atoms: &FeatureAtoms, cleanup: CleanupQueue) -> Self {
        let music = atoms.music.clone();
        let loading = atoms.music_loading.clone();

        let handle = host.new_media_handle();
        handle.set_looping(false);
        handle.set_volume(music.with(|state| state.volume));

        let core = MediaManagerCore::new(
            host,
            handle.clone(),
            move |is_loading| {
                loading.set(is_loading);
            },
            {
                let music = music.clone();
                move || {
                    music.update(|state| state.with_playing(false));
                }
            },
        );

        handle.set_on_time_update(Some(Rc::new({
            let music = music.clone();
            move |seconds: f64| {
                let whole = seconds.floor();
                music.update(|state| {
                    if state.current_time.floor() == whole {
                        state.clone()
                    } else {
                        state.with_current_time(whole)
                    }
                });
            }
        })));
        handle.set_on_ended(Some(Rc::new({
            let music = music.clone();
            let core = Rc::downgrade(&core);
            move || {
                let ended = music.with(song_url);
                music.update(MusicState::advance_on_end);
                // Same URL next means no track change will restart the element.
                let (next, playing) = music.with(|state| (song_url(state), state.is_playing));
                if playing && next == ended {
                    if let Some(core) = core.upgrade() {
                        core.restart();
                    }
                }
            }
        })));

        let (src, resume_at) = music.with(|state| (song_url(state), state.current_time));
        if core.apply_track(src.as_deref(), false) && resume_at > 0.0 {
            handle.seek(resume_at);
        }

        let subscriptions = vec![
            music.select(|state| state.is_playing, {
                let core = Rc::downgrade(&core);
                move |playing: &bool| {
                    if let Some(core) = core.upgrade() {
                        core.apply_intent(*playing);
                    }
                }
            }),
            music.select(song_url, {
                let core = Rc::downgrade(&core);
                let music = music.clone();
                move |src: &Option<String>| {
                    if let Some(core) = core.upgrade() {
                        let playing = music.with(|state| state.is_playing);
                        core.apply_track(src.as_deref(), playing);
                    }
                }
            }),
            music.select(|state| state.volume.to_bits(), {
                let core = Rc::downgrade(&core);
                move |bits: &u64| {
                    if let Some(core) = core.upgrade() {
                        core.apply_volume(f64::from_bits(*bits));
                    }
                }
            }),
        ];

        Self {
            core,
            music,
            cleanup,
            subscriptions,
        }
    }

    /// Seeks the current song and records the new position.
    pub fn seek(&self, seconds: f64) {
        let seconds = seconds.max(0.0);
        self.core.handle().seek(seconds);
        self.music
            .update(|state| state.with_current_time(seconds.floor()));
    }

    /// Records that the player window opened.
    pub fn window_mounted(&self) {
        self.music.update(|state| state.with_window_open(true));
    }

    /// Marks the player window closed. Returns whether a request matched.
    pub fn process_cleanup(&self) -> bool {
        if self
            .cleanup
            .consume_cleanup_requests(&music_app_id())
            .is_empty()
        {
            return false;
        }
        self.music.update(|state| state.with_window_open(false));
        true
    }
}

impl Drop for MusicManager {
    fn drop(&mut self) {
        self.subscriptions.clear();
        self.core.teardown();
        self.music.update(|state| state.with_playing(false));
    }
}

#[cfg(test)]
mod tests {
    use desktop_app_contract::WindowId;
    use platform_host::{load_json_with, MediaCall, MediaHandle, MemoryDurableStore};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{features::music::MUSIC_KEY, test_support::TestHost};

    fn mount(host: &TestHost) -> (FeatureAtoms, CleanupQueue, MusicManager) {
        let atoms = FeatureAtoms::load(host.services.store.clone());
        let cleanup = CleanupQueue::default();
        let manager = MusicManager::mount(&host.services, &atoms, cleanup.clone());
        (atoms, cleanup, manager)
    }

    #[test]
    fn time_updates_are_throttled_to_whole_seconds() {
        let host = TestHost::new();
        let (atoms, _cleanup, _manager) = mount(&host);
        atoms.music.update(MusicState::toggle_play);
        host.run();

        let handle = host.created_media(0);
        handle.advance_to(1.2);
        handle.advance_to(1.7);
        assert_eq!(atoms.music.get().current_time, 1.0);
        handle.advance_to(2.1);
        assert_eq!(atoms.music.get().current_time, 2.0);

        let stored: MusicState = load_json_with(&host.store, MUSIC_KEY)
            .expect("load")
            .expect("stored");
        assert_eq!(stored.current_time, 2.0);
    }

    #[test]
    fn ended_song_advances_and_keeps_playing() {
        let host = TestHost::new();
        let (atoms, _cleanup, _manager) = mount(&host);
        atoms.music.update(MusicState::toggle_play);
        host.run();

        let handle = host.created_media(0);
        handle.finish();
        host.run();
        let state = atoms.music.get();
        assert_eq!(state.current_song_index, 1);
        assert!(state.is_playing);
        assert_eq!(handle.count(MediaCall::Play), 2);
        assert!(!handle.is_paused());
    }

    #[test]
    fn single_song_playlist_replays_after_ending() {
        let host = TestHost::new();
        let (atoms, _cleanup, _manager) = mount(&host);
        let extra: Vec<String> = atoms
            .music
            .with(|s| s.playlist.iter().skip(1).map(|song| song.id.clone()).collect());
        for id in extra {
            atoms.music.update(|s| s.remove_song(&id));
        }
        atoms.music.update(MusicState::toggle_play);
        host.run();

        let handle = host.created_media(0);
        handle.advance_to(180.0);
        handle.finish();
        host.run();

        let state = atoms.music.get();
        assert_eq!(state.playlist.len(), 1);
        assert_eq!(state.current_song_index, 0);
        assert!(state.is_playing);
        assert_eq!(handle.count(MediaCall::Seek(0.0)), 1);
        assert_eq!(handle.count(MediaCall::Play), 2);
        assert!(!handle.is_paused());
        assert_eq!(handle.current_time(), 0.0);
    }

    #[test]
    fn reload_seeks_to_persisted_position() {
        let store = MemoryDurableStore::default();
        {
            let host = TestHost::with_store(store.clone());
            let (atoms, _cleanup, _manager) = mount(&host);
            atoms.music.update(|s| s.select_song(1).with_current_time(42.0));
        }

        let host = TestHost::with_store(store);
        let (atoms, _cleanup, _manager) = mount(&host);
        assert_eq!(atoms.music.get().current_song_index, 1);
        assert!(!atoms.music.get().is_playing);
        let handle = host.created_media(0);
        assert_eq!(handle.count(MediaCall::Seek(42.0)), 1);
        assert_eq!(handle.current_time(), 42.0);
    }

    #[test]
    fn closing_window_keeps_playback_running() {
        let host = TestHost::new();
        let (atoms, cleanup, manager) = mount(&host);
        manager.window_mounted();
        atoms.music.update(MusicState::toggle_play);
        host.run();

        cleanup.request_cleanup(WindowId::single_instance(&music_app_id()), music_app_id());
        assert!(manager.process_cleanup());
        let state = atoms.music.get();
        assert!(!state.is_window_open);
        assert!(state.is_playing);
        assert!(!host.created_media(0).is_paused());
    }

    #[test]
    fn removing_every_song_releases_the_source() {
        let host = TestHost::new();
        let (atoms, _cleanup, _manager) = mount(&host);
        let ids: Vec<String> = atoms
            .music
            .with(|s| s.playlist.iter().map(|song| song.id.clone()).collect());
        for id in ids {
            atoms.music.update(|s| s.remove_song(&id));
        }
        assert!(host.created_media(0).src().is_none());
    }
}
