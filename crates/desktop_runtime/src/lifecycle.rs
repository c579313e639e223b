//! Lifecycle coordinator: the mounted-once owner of feature atoms, app managers, and the tab
//! title, fed by window lifecycle effects and page visibility transitions.

use desktop_app_contract::{AppLifecycleEvent, ApplicationId, PageLifecycleEvent, WindowId};
use futures::stream::LocalBoxStream;
use leptos::logging;
use platform_host::HostServices;

use crate::{
    apps::{music_app_id, timer_app_id, MUSIC_APP_ID, TIMER_APP_ID},
    bus::RuntimeBus,
    cleanup_queue::CleanupQueue,
    features::FeatureAtoms,
    media::{AmbienceManager, MusicManager},
    model::DesktopState,
    timer::TimerManager,
    title::{compute_document_title, DocumentTitleCoordinator, TitleInputs, WindowPresence},
};

/// Owns every app manager for as long as the desktop runtime is mounted.
///
/// Dropping the coordinator unmounts the managers: the timer worker stops and both media handles
/// are released.
pub struct LifecycleCoordinator {
    atoms: FeatureAtoms,
    cleanup: CleanupQueue,
    bus: RuntimeBus,
    timer: TimerManager,
    ambience: AmbienceManager,
    music: MusicManager,
    title: DocumentTitleCoordinator,
}

impl LifecycleCoordinator {
    /// Loads persisted feature state and mounts the timer, ambience, and music managers.
    ///
    /// `ticks` drives the timer worker's one-second interval.
    pub fn mount(host: &HostServices, ticks: LocalBoxStream<'static, ()>) -> Self {
        let atoms = FeatureAtoms::load(host.store.clone());
        let cleanup = CleanupQueue::default();
        let bus = RuntimeBus::default();

        let timer = TimerManager::mount(host, &atoms, cleanup.clone(), bus.clone(), ticks);
        let ambience = AmbienceManager::mount(host, &atoms, cleanup.clone());
        let music = MusicManager::mount(host, &atoms, cleanup.clone());
        logging::log!(
            "lifecycle coordinator mounted on {} host",
            host.host_strategy.as_str()
        );

        Self {
            atoms,
            cleanup,
            bus,
            timer,
            ambience,
            music,
            title: DocumentTitleCoordinator::new(host.document_title.clone()),
        }
    }

    pub fn atoms(&self) -> &FeatureAtoms {
        &self.atoms
    }

    pub fn bus(&self) -> &RuntimeBus {
        &self.bus
    }

    pub fn timer(&self) -> &TimerManager {
        &self.timer
    }

    pub fn music(&self) -> &MusicManager {
        &self.music
    }

    /// Routes a window lifecycle transition to the manager owning `app_id`.
    ///
    /// Focus changes carry no manager state; the title picks them up from the desktop state.
    pub fn dispatch_lifecycle(
        &self,
        window_id: &WindowId,
        app_id: &ApplicationId,
        event: AppLifecycleEvent,
    ) {
        match (app_id.as_str(), event) {
            (TIMER_APP_ID, AppLifecycleEvent::Mounted) => self.timer.associate(window_id.clone()),
            (TIMER_APP_ID, AppLifecycleEvent::Minimized) => {
                self.timer.set_minimized(window_id, true)
            }
            (TIMER_APP_ID, AppLifecycleEvent::Restored) => {
                self.timer.set_minimized(window_id, false)
            }
            (MUSIC_APP_ID, AppLifecycleEvent::Mounted) => self.music.window_mounted(),
            _ => {}
        }
    }

    /// Enqueues a cleanup for a closed window and lets every manager drain its share.
    ///
    /// Requests for apps without a manager are dropped.
    pub fn request_cleanup(&self, window_id: WindowId, app_id: ApplicationId) {
        self.cleanup.request_cleanup(window_id, app_id.clone());
        // Every manager drains, so no short-circuit.
        let handled = self.timer.process_cleanup()
            | self.ambience.process_cleanup()
            | self.music.process_cleanup();
        if !handled {
            self.cleanup.consume_cleanup_requests(&app_id);
        }
    }

    pub fn on_page_event(&self, event: PageLifecycleEvent) {
        self.timer.on_page_event(event);
        if event == PageLifecycleEvent::Unload {
            logging::log!("page unloading; feature state already persisted");
        }
    }

    /// Recomputes the tab title for `desktop` and writes it when it changed.
    pub fn refresh_title(&self, desktop: &DesktopState) -> String {
        let timer = self.atoms.timer.get();
        let music = self.atoms.music.get();
        let title = compute_document_title(&TitleInputs {
            timer: &timer,
            timer_phase: self.timer.phase(),
            timer_window: WindowPresence::for_app(desktop, &timer_app_id()),
            music: &music,
            music_window: WindowPresence::for_app(desktop, &music_app_id()),
        });
        self.title.apply(&title);
        title
    }

    #[cfg(test)]
    pub(crate) fn pending_cleanup(&self) -> usize {
        self.cleanup.len()
    }
}
