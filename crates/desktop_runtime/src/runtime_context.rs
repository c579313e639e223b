//! Runtime provider and context wiring for the desktop shell.
//!
//! This module owns the long-lived reducer container, runtime effect queue, the lifecycle
//! coordinator (through [`DesktopHostContext`]), and the bridge from feature atoms into Leptos
//! signals. UI composition stays in [`crate::components`].

use std::{cell::Cell, rc::Rc, time::Duration};

use desktop_app_contract::PageLifecycleEvent;
use futures::{channel::mpsc, StreamExt};
use leptos::*;
use platform_host::HostServices;
use platform_host_web::install_page_lifecycle_listener;
use serde::Serialize;

use crate::{
    atoms::{Atom, Subscription},
    effect_executor,
    features::{
        ambience::{AmbienceState, AmbienceUiState},
        background::BackgroundSettings,
        bookmarks::Bookmark,
        music::MusicState,
        sessions::FocusSession,
        sound::SoundSettings,
        timer::TimerState,
        FeatureAtoms,
    },
    host::DesktopHostContext,
    model::DesktopState,
    reducer::{reduce_desktop, DesktopAction, RuntimeEffect},
    timer::TimerPhase,
};

/// Interval pacing the timer worker.
pub const TIMER_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Feeds interval ticks into the worker channel.
struct TickForwarder {
    ticks: mpsc::UnboundedSender<()>,
    warned: Cell<bool>,
}

impl TickForwarder {
    fn new(ticks: mpsc::UnboundedSender<()>) -> Self {
        Self {
            ticks,
            warned: Cell::new(false),
        }
    }

    /// Returns whether the tick reached the worker. Warns once after the worker is gone.
    fn forward(&self) -> bool {
        if self.ticks.unbounded_send(()).is_ok() {
            return true;
        }
        if !self.warned.replace(true) {
            logging::warn!("timer worker stopped; dropping interval ticks");
        }
        false
    }
}

#[derive(Clone, Copy)]
/// Read-only signal mirrors of every feature atom.
pub struct FeatureSignals {
    pub timer: ReadSignal<TimerState>,
    pub timer_phase: ReadSignal<TimerPhase>,
    pub ambience: ReadSignal<AmbienceState>,
    pub ambience_ui: ReadSignal<AmbienceUiState>,
    pub music: ReadSignal<MusicState>,
    pub music_loading: ReadSignal<bool>,
    pub background: ReadSignal<BackgroundSettings>,
    pub sound: ReadSignal<SoundSettings>,
    pub bookmarks: ReadSignal<Vec<Bookmark>>,
    pub sessions: ReadSignal<Vec<FocusSession>>,
}

#[derive(Clone, Copy)]
/// Leptos context for reading desktop runtime state and dispatching [`DesktopAction`] values.
pub struct DesktopRuntimeContext {
    /// Host services and the mounted lifecycle coordinator.
    pub host: StoredValue<DesktopHostContext>,
    /// Reactive desktop state signal.
    pub state: RwSignal<DesktopState>,
    /// Queue of runtime effects emitted by the reducer and processed by the executor.
    pub effects: RwSignal<Vec<RuntimeEffect>>,
    /// Feature state mirrors for views.
    pub features: FeatureSignals,
    /// Reducer dispatch callback.
    pub dispatch: Callback<DesktopAction>,
}

impl DesktopRuntimeContext {
    /// Dispatches a reducer action through the runtime context callback.
    pub fn dispatch_action(&self, action: DesktopAction) {
        self.dispatch.call(action);
    }

    /// Runs `f` against the feature atoms. Views write feature state only through here.
    pub fn with_atoms<R>(&self, f: impl FnOnce(&FeatureAtoms) -> R) -> R {
        f(self.host.get_value().lifecycle().atoms())
    }

    /// Runs `f` against the mounted lifecycle coordinator.
    pub fn with_lifecycle<R>(
        &self,
        f: impl FnOnce(&crate::lifecycle::LifecycleCoordinator) -> R,
    ) -> R {
        f(self.host.get_value().lifecycle())
    }
}

fn bridge<T>(atom: &Atom<T>, subscriptions: &mut Vec<Subscription>) -> ReadSignal<T>
where
    T: Clone + Serialize + 'static,
{
    let (read, write) = create_signal(atom.get());
    subscriptions.push(atom.subscribe(move |value| write.set(value.clone())));
    read
}

fn bridge_features(host: &DesktopHostContext) -> (FeatureSignals, Vec<Subscription>) {
    let atoms = host.lifecycle().atoms();
    let mut subs = Vec::new();
    let signals = FeatureSignals {
        timer: bridge(&atoms.timer, &mut subs),
        timer_phase: bridge(&host.lifecycle().timer().phase_atom(), &mut subs),
        ambience: bridge(&atoms.ambience, &mut subs),
        ambience_ui: bridge(&atoms.ambience_ui, &mut subs),
        music: bridge(&atoms.music, &mut subs),
        music_loading: bridge(&atoms.music_loading, &mut subs),
        background: bridge(&atoms.background, &mut subs),
        sound: bridge(&atoms.sound, &mut subs),
        bookmarks: bridge(&atoms.bookmarks, &mut subs),
        sessions: bridge(&atoms.sessions, &mut subs),
    };
    (signals, subs)
}

fn install_runtime_orchestration(runtime: DesktopRuntimeContext) {
    effect_executor::install(runtime);
    runtime
        .host
        .get_value()
        .install_boot_hydration(runtime.dispatch);

    let page_listener = install_page_lifecycle_listener(Rc::new(move |event: PageLifecycleEvent| {
        runtime.with_lifecycle(|lifecycle| lifecycle.on_page_event(event));
    }));
    store_value(page_listener);

    create_effect(move |_| {
        let desktop = runtime.state.get();
        let features = runtime.features;
        features.timer.track();
        features.timer_phase.track();
        features.music.track();
        runtime.with_lifecycle(|lifecycle| lifecycle.refresh_title(&desktop));
    });
}

#[component]
/// Provides [`DesktopRuntimeContext`] to descendant components and boots persisted state.
pub fn DesktopProvider(
    /// Injected host bundle assembled by the entry layer.
    host_services: HostServices,
    children: Children,
) -> impl IntoView {
    let (tick_tx, tick_rx) = mpsc::unbounded::<()>();
    let forwarder = TickForwarder::new(tick_tx);
    if let Ok(interval) = set_interval_with_handle(
        move || {
            forwarder.forward();
        },
        TIMER_TICK_INTERVAL,
    ) {
        on_cleanup(move || interval.clear());
    }

    let host_context = DesktopHostContext::new(host_services, tick_rx.boxed_local());
    let (features, subscriptions) = bridge_features(&host_context);
    store_value(subscriptions);
    let host = store_value(host_context);
    let state = create_rw_signal(DesktopState::default());
    let effects = create_rw_signal(Vec::<RuntimeEffect>::new());

    let dispatch = Callback::new(move |action: DesktopAction| {
        let mut desktop = state.get_untracked();
        let previous = desktop.clone();

        match reduce_desktop(&mut desktop, action) {
            Ok(new_effects) => {
                if desktop != previous {
                    state.set(desktop);
                }
                if !new_effects.is_empty() {
                    let mut queue = effects.get_untracked();
                    queue.extend(new_effects);
                    effects.set(queue);
                }
            }
            Err(err) => logging::warn!("desktop reducer error: {err}"),
        }
    });

    let runtime = DesktopRuntimeContext {
        host,
        state,
        effects,
        features,
        dispatch,
    };

    provide_context(runtime);

    install_runtime_orchestration(runtime);

    children().into_view()
}

/// Returns the current [`DesktopRuntimeContext`].
///
/// # Panics
///
/// Panics if called outside [`DesktopProvider`].
pub fn use_desktop_runtime() -> DesktopRuntimeContext {
    use_context::<DesktopRuntimeContext>().expect("DesktopRuntimeContext not provided")
}
