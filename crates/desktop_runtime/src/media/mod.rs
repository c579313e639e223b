//! Global media managers. Each owns one playback handle outside any window view.

pub mod ambience;
pub mod music;

use std::{
    cell::Cell,
    rc::{Rc, Weak},
    time::Duration,
};

use futures::{
    future::{self, Either},
    task::{LocalSpawn, LocalSpawnExt},
};
use leptos::logging;
use platform_host::{HostServices, MediaHandle, Sleeper};
use thiserror::Error;

pub use ambience::AmbienceManager;
pub use music::MusicManager;

/// Upper bound on waiting for a new source to become playable.
pub const MEDIA_READY_TIMEOUT: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    #[error("media playback rejected: {0}")]
    PlaybackRejected(String),
    #[error("no media source loaded")]
    NoSource,
    #[error("failed to schedule media task: {0}")]
    Spawn(String),
}

/// Shared track/intent/volume reconciliation for one media handle.
///
/// State slices are pushed in by the owning manager's subscriptions; the core only ever touches
/// the handle when the applied value actually differs.
pub(crate) struct MediaManagerCore {
    handle: Rc<dyn MediaHandle>,
    spawner: Rc<dyn LocalSpawn>,
    sleeper: Rc<dyn Sleeper>,
    last_applied_intent: Cell<bool>,
    load_generation: Cell<u64>,
    set_loading: Box<dyn Fn(bool)>,
    revert_intent: Box<dyn Fn()>,
}

impl MediaManagerCore {
    pub(crate) fn new(
        host: &HostServices,
        handle: Rc<dyn MediaHandle>,
        set_loading: impl Fn(bool) + 'static,
        revert_intent: impl Fn() + 'static,
    ) -> Rc<Self> {
        Rc::new(Self {
            handle,
            spawner: host.spawner.clone(),
            sleeper: host.sleeper.clone(),
            last_applied_intent: Cell::new(false),
            load_generation: Cell::new(0),
            set_loading: Box::new(set_loading),
            revert_intent: Box::new(revert_intent),
        })
    }

    pub(crate) fn handle(&self) -> &Rc<dyn MediaHandle> {
        &self.handle
    }

    /// Switches to `src` when its resolved URL differs from the loaded one.
    ///
    /// Playback continues on the new source only if it was playing and the intent is still
    /// playing; otherwise the source is preloaded. Returns whether the source changed.
    pub(crate) fn apply_track(self: &Rc<Self>, src: Option<&str>, intent_playing: bool) -> bool {
        let Some(src) = src else {
            if self.handle.src().is_none() {
                return false;
            }
            self.handle.pause();
            self.handle.clear_src();
            self.last_applied_intent.set(false);
            return true;
        };

        let resolved = self.handle.resolve_url(src);
        if self.handle.src().as_deref() == Some(resolved.as_str()) {
            return false;
        }

        let was_playing = self.last_applied_intent.get();
        self.handle.set_src(src);
        self.begin_loading();
        if was_playing && intent_playing {
            self.play();
        } else {
            self.last_applied_intent.set(false);
            self.handle.load();
        }
        true
    }

    /// Issues play/pause only when `playing` differs from the last applied intent.
    pub(crate) fn apply_intent(self: &Rc<Self>, playing: bool) {
        if playing == self.last_applied_intent.get() {
            return;
        }
        if playing {
            self.play();
        } else {
            self.last_applied_intent.set(false);
            self.handle.pause();
        }
    }

    /// Plays the loaded source again from the start.
    pub(crate) fn restart(self: &Rc<Self>) {
        self.handle.seek(0.0);
        self.play();
    }

    pub(crate) fn apply_volume(&self, volume: f64) {
        self.handle.set_volume(volume);
    }

    fn play(self: &Rc<Self>) {
        if self.handle.src().is_none() {
            logging::warn!("{}", MediaError::NoSource);
            self.last_applied_intent.set(false);
            (self.revert_intent)();
            return;
        }
        self.last_applied_intent.set(true);
        let play = self.handle.play();
        let weak: Weak<Self> = Rc::downgrade(self);
        let task = async move {
            if let Err(reason) = play.await {
                logging::warn!("{}", MediaError::PlaybackRejected(reason));
                if let Some(core) = weak.upgrade() {
                    core.last_applied_intent.set(false);
                    (core.revert_intent)();
                }
            }
        };
        if let Err(err) = self.spawner.spawn_local(task) {
            logging::warn!("{}", MediaError::Spawn(err.to_string()));
            self.last_applied_intent.set(false);
            (self.revert_intent)();
        }
    }

    fn begin_loading(self: &Rc<Self>) {
        let generation = self.load_generation.get().wrapping_add(1);
        self.load_generation.set(generation);
        (self.set_loading)(true);

        let ready = self.handle.ready();
        let timeout = self.sleeper.sleep(MEDIA_READY_TIMEOUT);
        let weak: Weak<Self> = Rc::downgrade(self);
        let task = async move {
            if let Either::Right(_) = future::select(ready, timeout).await {
                logging::warn!("media source not ready after {MEDIA_READY_TIMEOUT:?}");
            }
            if let Some(core) = weak.upgrade() {
                if core.load_generation.get() == generation {
                    (core.set_loading)(false);
                }
            }
        };
        if let Err(err) = self.spawner.spawn_local(task) {
            logging::warn!("{}", MediaError::Spawn(err.to_string()));
            (self.set_loading)(false);
        }
    }

    /// Pauses, clears the source, and detaches handle callbacks.
    pub(crate) fn teardown(&self) {
        self.load_generation
            .set(self.load_generation.get().wrapping_add(1));
        self.last_applied_intent.set(false);
        self.handle.pause();
        self.handle.clear_src();
        self.handle.set_on_ended(None);
        self.handle.set_on_time_update(None);
        (self.set_loading)(false);
    }
}
