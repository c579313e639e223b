//! Ambience manager: one looping audio handle driven by the ambience atom.

use std::rc::Rc;

use platform_host::HostServices;

use super::MediaManagerCore;
use crate::{
    apps::{ambience_app_id, ambience_sounds},
    atoms::{Atom, Subscription},
    cleanup_queue::CleanupQueue,
    features::{
        ambience::{AmbienceState, AmbienceUiState},
        FeatureAtoms,
    },
};

fn sound_src(state: &AmbienceState) -> Option<String> {
    ambience_sounds()
        .get(state.current_sound_index)
        .map(|sound| sound.src.clone())
}

/// Mounted ambience manager. Playback intent is forced off on mount and on drop.
pub struct AmbienceManager {
    core: Rc<MediaManagerCore>,
    ambience: Atom<AmbienceState>,
    cleanup: CleanupQueue,
    subscriptions: Vec<Subscription>,
}

impl AmbienceManager {
    pub fn mount(host: &HostServices, atoms: &FeatureAtoms, cleanup: CleanupQueue) -> Self {
        let ambience = atoms.ambience.clone();
        let ui = atoms.ambience_ui.clone();
        ambience.update(|state| state.with_playing(false));

        let handle = host.new_media_handle();
        handle.set_looping(true);
        handle.set_volume(ambience.with(|state| state.volume));

        let core = MediaManagerCore::new(
            host,
            handle,
            {
                let ui = ui.clone();
                move |is_loading| {
                    ui.update(|ui| AmbienceUiState {
                        is_loading,
                        ..ui.clone()
                    });
                }
            },
            {
                let ambience = ambience.clone();
                move || {
                    ambience.update(|state| state.with_playing(false));
                }
            },
        );
        core.apply_track(ambience.with(sound_src).as_deref(), false);

        // Intent before track, so a combined "select and play" update plays the new source.
        let subscriptions = vec![
            ambience.select(|state| state.is_playing, {
                let core = Rc::downgrade(&core);
                move |playing: &bool| {
                    if let Some(core) = core.upgrade() {
                        core.apply_intent(*playing);
                    }
                }
            }),
            ambience.select(|state| state.current_sound_index, {
                let core = Rc::downgrade(&core);
                let ambience = ambience.clone();
                move |_: &usize| {
                    if let Some(core) = core.upgrade() {
                        let (src, playing) =
                            ambience.with(|state| (sound_src(state), state.is_playing));
                        core.apply_track(src.as_deref(), playing);
                    }
                }
            }),
            ambience.select(|state| state.volume.to_bits(), {
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
            ambience,
            cleanup,
            subscriptions,
        }
    }

    /// Stops playback when the ambience window was closed. Returns whether a request matched.
    pub fn process_cleanup(&self) -> bool {
        if self
            .cleanup
            .consume_cleanup_requests(&ambience_app_id())
            .is_empty()
        {
            return false;
        }
        self.ambience.update(|state| state.with_playing(false));
        true
    }
}

impl Drop for AmbienceManager {
    fn drop(&mut self) {
        self.subscriptions.clear();
        self.core.teardown();
        self.ambience.update(|state| state.with_playing(false));
    }
}

#[cfg(test)]
mod tests {
    use desktop_app_contract::WindowId;
    use platform_host::{MediaCall, MediaHandle};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_support::TestHost;

    fn mount(host: &TestHost) -> (FeatureAtoms, CleanupQueue, AmbienceManager) {
        let atoms = FeatureAtoms::load(host.services.store.clone());
        let cleanup = CleanupQueue::default();
        let manager = AmbienceManager::mount(&host.services, &atoms, cleanup.clone());
        (atoms, cleanup, manager)
    }

    #[test]
    fn playing_is_forced_off_on_mount_and_unmount() {
        let host = TestHost::new();
        let atoms = FeatureAtoms::load(host.services.store.clone());
        atoms.ambience.update(|s| s.with_playing(true));

        let manager = AmbienceManager::mount(&host.services, &atoms, CleanupQueue::default());
        assert!(!atoms.ambience.get().is_playing);

        atoms.ambience.update(AmbienceState::toggle_play);
        host.run();
        assert!(!host.created_media(0).is_paused());

        drop(manager);
        assert!(!atoms.ambience.get().is_playing);
        let handle = host.created_media(0);
        assert!(handle.is_paused());
        assert!(handle.src().is_none());
    }

    #[test]
    fn handle_loops_and_preloads_current_sound() {
        let host = TestHost::new();
        let (_atoms, _cleanup, _manager) = mount(&host);
        let handle = host.created_media(0);
        assert!(handle.is_looping());
        assert_eq!(handle.count(MediaCall::Load), 1);
        assert_eq!(
            handle.src(),
            Some(format!("http://localhost{}", ambience_sounds()[0].src))
        );
    }

    #[test]
    fn volume_change_keeps_loaded_source() {
        let host = TestHost::new();
        let (atoms, _cleanup, _manager) = mount(&host);
        let handle = host.created_media(0);
        handle.clear_calls();

        atoms.ambience.update(|s| s.with_volume(0.2));
        assert_eq!(handle.volume(), 0.2);
        assert!(handle.calls().is_empty());
    }

    #[test]
    fn select_and_play_in_one_update_plays_new_sound() {
        let host = TestHost::new();
        let (atoms, _cleanup, _manager) = mount(&host);
        atoms
            .ambience
            .update(|s| s.next_sound(ambience_sounds().len()).with_playing(true));
        host.run();
        let handle = host.created_media(0);
        assert_eq!(
            handle.src(),
            Some(format!("http://localhost{}", ambience_sounds()[1].src))
        );
        assert!(!handle.is_paused());
    }

    #[test]
    fn closing_window_stops_playback() {
        let host = TestHost::new();
        let (atoms, cleanup, manager) = mount(&host);
        atoms.ambience.update(AmbienceState::toggle_play);
        host.run();

        assert!(!manager.process_cleanup());
        cleanup.request_cleanup(
            WindowId::single_instance(&ambience_app_id()),
            ambience_app_id(),
        );
        assert!(manager.process_cleanup());
        assert!(!atoms.ambience.get().is_playing);
        assert!(host.created_media(0).is_paused());
    }

    #[test]
    fn rejected_play_reverts_to_paused() {
        let host = TestHost::new();
        let (atoms, _cleanup, _manager) = mount(&host);
        host.created_media(0).reject_next_play("NotAllowedError");
        atoms.ambience.update(AmbienceState::toggle_play);
        host.run();
        assert!(!atoms.ambience.get().is_playing);
    }
}
