//! Timer manager: owns the worker for as long as the runtime is mounted and keeps the timer atom,
//! the worker, and the timer window association in step.

use std::{
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
};

use desktop_app_contract::{PageLifecycleEvent, WindowAssociation, WindowId};
use futures::{
    channel::mpsc::{self, UnboundedSender},
    stream::LocalBoxStream,
    task::{LocalSpawn, LocalSpawnExt},
    StreamExt,
};
use leptos::logging;
use platform_host::{Clock, HostServices, MediaHandle};
use serde::Serialize;
use serde_json::json;

use super::{
    protocol::{decode_event, encode_command, WorkerCommand, WorkerEvent},
    worker::{run_timer_worker, TimerWorkerCore},
};
use crate::{
    apps::timer_app_id,
    atoms::{Atom, Subscription},
    bus::{RuntimeBus, TIMER_RESET_TOPIC},
    cleanup_queue::CleanupQueue,
    features::{
        sessions::{record_session, FocusSession},
        sound::{SoundSettings, ALARM_SRC},
        timer::TimerState,
        FeatureAtoms,
    },
    media::MediaError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
/// Host-side timer state machine.
///
/// `Idle -> Associated -> Running -> Completed -> Associated`, or back to `Idle` on window close.
pub enum TimerPhase {
    #[default]
    /// No window presents the timer.
    Idle,
    /// A window presents the timer and it is not running.
    Associated,
    /// The worker is counting down.
    Running,
    /// The countdown reached zero. Left only once time is restored by reset or a setting change.
    Completed,
}

struct TimerManagerInner {
    timer: Atom<TimerState>,
    sound: Atom<SoundSettings>,
    sessions: Atom<Vec<FocusSession>>,
    phase: Atom<TimerPhase>,
    commands: RefCell<Option<UnboundedSender<String>>>,
    alarm: Rc<dyn MediaHandle>,
    clock: Rc<dyn Clock>,
    spawner: Rc<dyn LocalSpawn>,
    cleanup: CleanupQueue,
    bus: RuntimeBus,
    /// Atom time last seen while running.
    running_time: Cell<Option<u32>>,
    /// Atom time at a user pause, until the worker reports its own remaining time.
    pending_pause: Cell<Option<u32>>,
}

/// Mounted timer manager. Dropping it terminates the worker and silences the alarm.
pub struct TimerManager {
    inner: Rc<TimerManagerInner>,
    _subscriptions: [Subscription; 2],
}

impl TimerManager {
    /// Spawns the worker and starts observing the timer atom.
    pub fn mount(
        host: &HostServices,
        atoms: &FeatureAtoms,
        cleanup: CleanupQueue,
        bus: RuntimeBus,
        ticks: LocalBoxStream<'static, ()>,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded::<String>();
        let (event_tx, mut event_rx) = mpsc::unbounded::<String>();

        let inner = Rc::new(TimerManagerInner {
            timer: atoms.timer.clone(),
            sound: atoms.sound.clone(),
            sessions: atoms.sessions.clone(),
            phase: Atom::new(TimerPhase::Idle),
            commands: RefCell::new(Some(command_tx)),
            alarm: host.new_media_handle(),
            clock: host.clock.clone(),
            spawner: host.spawner.clone(),
            cleanup,
            bus,
            running_time: Cell::new(None),
            pending_pause: Cell::new(None),
        });

        let worker = run_timer_worker(
            TimerWorkerCore::new(host.clock.clone()),
            command_rx,
            ticks,
            event_tx,
        );
        if let Err(err) = host.spawner.spawn_local(worker) {
            logging::warn!("timer worker failed to start: {err}");
        }

        let weak = Rc::downgrade(&inner);
        let pump = async move {
            while let Some(raw) = event_rx.next().await {
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                match decode_event(&raw) {
                    Ok(event) => inner.on_worker_event(event),
                    Err(err) => logging::warn!("timer manager ignored worker message: {err}"),
                }
            }
        };
        if let Err(err) = host.spawner.spawn_local(pump) {
            logging::warn!("timer event pump failed to start: {err}");
        }

        let weak: Weak<TimerManagerInner> = Rc::downgrade(&inner);
        let subscription = inner.timer.subscribe(move |state| {
            if let Some(inner) = weak.upgrade() {
                inner.observe(state);
            }
        });
        inner.observe(&inner.timer.get());

        // Payloads carrying `windowId` are this manager's own close broadcasts.
        let weak: Weak<TimerManagerInner> = Rc::downgrade(&inner);
        let reset_subscription = inner.bus.subscribe(TIMER_RESET_TOPIC, move |payload| {
            if payload.get("windowId").is_some() {
                return;
            }
            if let Some(inner) = weak.upgrade() {
                inner.reset_requested();
            }
        });

        Self {
            inner,
            _subscriptions: [subscription, reset_subscription],
        }
    }

    /// Current phase.
    pub fn phase(&self) -> TimerPhase {
        self.inner.phase.get()
    }

    /// Observable phase, used by the document title.
    pub fn phase_atom(&self) -> Atom<TimerPhase> {
        self.inner.phase.clone()
    }

    /// Binds the timer to a freshly mounted window.
    pub fn associate(&self, window_id: WindowId) {
        self.inner
            .timer
            .update(|state| state.associated(WindowAssociation::open(window_id)));
    }

    /// Mirrors minimize/restore of the associated window. Other windows are ignored.
    pub fn set_minimized(&self, window_id: &WindowId, minimized: bool) {
        self.inner.timer.update(|state| {
            if state.association.is_held_by(window_id) {
                state.with_minimized(minimized)
            } else {
                state.clone()
            }
        });
    }

    pub fn on_page_event(&self, event: PageLifecycleEvent) {
        if event == PageLifecycleEvent::Visible {
            self.inner.send(WorkerCommand::Check);
        }
    }

    /// Drains timer cleanup requests. Returns whether anything was torn down.
    pub fn process_cleanup(&self) -> bool {
        let requests = self.inner.cleanup.consume_cleanup_requests(&timer_app_id());
        let Some(last) = requests.last() else {
            return false;
        };
        self.inner.timer.set(TimerState::default());
        self.inner.pending_pause.set(None);
        self.inner.send(WorkerCommand::Reset);
        self.inner.phase.set(TimerPhase::Idle);
        self.inner.bus.publish(
            TIMER_RESET_TOPIC,
            json!({ "windowId": last.window_id.as_str() }),
        );
        logging::log!("timer torn down after `{}` closed", last.window_id);
        true
    }
}

impl Drop for TimerManager {
    fn drop(&mut self) {
        self.inner.commands.borrow_mut().take();
        self.inner.alarm.pause();
        self.inner.alarm.clear_src();
    }
}

impl TimerManagerInner {
    fn send(&self, command: WorkerCommand) {
        let commands = self.commands.borrow();
        let Some(sender) = commands.as_ref() else {
            return;
        };
        match encode_command(&command) {
            Ok(raw) => {
                if sender.unbounded_send(raw).is_err() {
                    logging::warn!("timer worker is gone; dropped {command:?}");
                }
            }
            Err(err) => logging::warn!("{err}"),
        }
    }

    /// Handles a `timer-reset` broadcast from outside the manager.
    fn reset_requested(&self) {
        self.timer.update(TimerState::reset);
        self.pending_pause.set(None);
        self.send(WorkerCommand::Reset);
        logging::log!("timer reset by broadcast");
    }

    fn observe(&self, state: &TimerState) {
        let phase = self.phase.get();

        if !state.association.is_active {
            self.pending_pause.set(None);
            if phase != TimerPhase::Idle {
                self.phase.set(TimerPhase::Idle);
            }
            self.send(WorkerCommand::Pause);
            if state.is_running {
                self.timer.update(TimerState::pause);
            }
            return;
        }

        let phase = match phase {
            TimerPhase::Completed if state.time_remaining > 0 && !state.is_running => {
                TimerPhase::Associated
            }
            TimerPhase::Completed => return,
            TimerPhase::Idle => TimerPhase::Associated,
            other => other,
        };

        let next = match (phase, state.is_running) {
            (TimerPhase::Running, true) => {
                self.running_time.set(Some(state.time_remaining));
                phase
            }
            (TimerPhase::Associated, false) => {
                if self.pending_pause.get() != Some(state.time_remaining) {
                    self.pending_pause.set(None);
                }
                phase
            }
            (_, true) => {
                self.pending_pause.set(None);
                self.running_time.set(Some(state.time_remaining));
                self.send(WorkerCommand::Start {
                    time_remaining: state.time_remaining,
                });
                TimerPhase::Running
            }
            (_, false) => {
                // An unchanged time means a plain pause; reset and setting changes move it.
                let paused = phase == TimerPhase::Running
                    && self.running_time.get() == Some(state.time_remaining);
                self.pending_pause
                    .set(paused.then_some(state.time_remaining));
                self.send(WorkerCommand::Pause);
                TimerPhase::Associated
            }
        };
        self.phase.set(next);
    }

    fn on_worker_event(&self, event: WorkerEvent) {
        let running = self.phase.get() == TimerPhase::Running;
        match event {
            WorkerEvent::Tick { time_remaining } if running => {
                self.timer.update(|state| state.on_tick(time_remaining));
            }
            WorkerEvent::Status {
                time_remaining,
                is_running: true,
            } if running => {
                self.timer.update(|state| state.on_tick(time_remaining));
            }
            WorkerEvent::Status {
                is_running: false, ..
            } if running => {
                self.send(WorkerCommand::Start {
                    time_remaining: self.timer.with(|state| state.time_remaining),
                });
            }
            WorkerEvent::Complete if running => self.complete(),
            WorkerEvent::Paused { time_remaining } => {
                let Some(paused_at) = self.pending_pause.take() else {
                    return;
                };
                let untouched = self.phase.get() == TimerPhase::Associated
                    && self
                        .timer
                        .with(|state| !state.is_running && state.time_remaining == paused_at);
                if untouched {
                    self.timer.update(|state| state.on_tick(time_remaining));
                }
            }
            _ => {}
        }
    }

    fn complete(&self) {
        self.phase.set(TimerPhase::Completed);
        let finished = self.timer.get();
        self.timer.update(TimerState::on_complete);
        self.sessions.update(|sessions| {
            record_session(
                sessions,
                finished.display_title(),
                finished.timer_setting,
                finished.full_duration(),
                self.clock.now_ms(),
            )
        });
        if let Err(err) = self.ring_alarm() {
            logging::warn!("{err}");
        }
    }

    fn ring_alarm(&self) -> Result<(), MediaError> {
        let sound = self.sound.get();
        if !sound.alarm_enabled {
            return Ok(());
        }
        let url = self.alarm.resolve_url(ALARM_SRC);
        if self.alarm.src().as_deref() != Some(url.as_str()) {
            self.alarm.set_src(ALARM_SRC);
        }
        self.alarm.seek(0.0);
        self.alarm.set_volume(sound.volume_level);
        let play = self.alarm.play();
        self.spawner
            .spawn_local(async move {
                if let Err(reason) = play.await {
                    logging::warn!("{}", MediaError::PlaybackRejected(reason));
                }
            })
            .map_err(|err| MediaError::Spawn(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use platform_host::{ManualClock, MediaCall, MemoryMediaHandle};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{features::timer::TimerSetting, test_support::TestHost};

    struct Fixture {
        host: TestHost,
        atoms: FeatureAtoms,
        cleanup: CleanupQueue,
        bus: RuntimeBus,
        ticks: UnboundedSender<()>,
        manager: TimerManager,
    }

    fn mount() -> Fixture {
        let host = TestHost::new();
        let atoms = FeatureAtoms::load(host.services.store.clone());
        let cleanup = CleanupQueue::default();
        let bus = RuntimeBus::default();
        let (ticks, tick_rx) = mpsc::unbounded::<()>();
        let manager = TimerManager::mount(
            &host.services,
            &atoms,
            cleanup.clone(),
            bus.clone(),
            tick_rx.boxed_local(),
        );
        Fixture {
            host,
            atoms,
            cleanup,
            bus,
            ticks,
            manager,
        }
    }

    impl Fixture {
        fn clock(&self) -> &ManualClock {
            &self.host.clock
        }

        fn alarm(&self) -> MemoryMediaHandle {
            self.host.created_media(0)
        }

        fn tick_after(&mut self, ms: u64) {
            self.clock().advance(ms);
            self.ticks.unbounded_send(()).expect("tick");
            self.host.run();
        }
    }

    fn window() -> WindowId {
        WindowId::single_instance(&timer_app_id())
    }

    #[test]
    fn associate_then_start_runs_and_ticks() {
        let mut fx = mount();
        assert_eq!(fx.manager.phase(), TimerPhase::Idle);

        fx.manager.associate(window());
        assert_eq!(fx.manager.phase(), TimerPhase::Associated);

        fx.atoms.timer.update(TimerState::start);
        fx.host.run();
        assert_eq!(fx.manager.phase(), TimerPhase::Running);
        assert_eq!(fx.atoms.timer.get().time_remaining, 1500);

        fx.tick_after(3_000);
        assert_eq!(fx.atoms.timer.get().time_remaining, 1497);
    }

    #[test]
    fn completion_fires_alarm_and_records_one_session() {
        let mut fx = mount();
        fx.manager.associate(window());
        fx.atoms.timer.update(|state| {
            state
                .with_custom_duration(1)
                .with_setting(TimerSetting::Custom)
                .start()
        });
        fx.host.run();

        fx.tick_after(61_000);
        assert_eq!(fx.manager.phase(), TimerPhase::Completed);
        assert_eq!(fx.atoms.timer.get().time_remaining, 0);
        assert!(!fx.atoms.timer.get().is_running);
        assert_eq!(fx.atoms.sessions.get().len(), 1);
        assert_eq!(fx.atoms.sessions.get()[0].duration_seconds, 60);
        assert_eq!(fx.alarm().count(MediaCall::Play), 1);
        assert_eq!(fx.alarm().volume(), 0.7);

        fx.tick_after(1_000);
        assert_eq!(fx.atoms.sessions.get().len(), 1);

        // Running cannot resume from Completed until time is restored.
        fx.atoms.timer.update(TimerState::start);
        assert_eq!(fx.manager.phase(), TimerPhase::Completed);
        fx.atoms.timer.update(TimerState::reset);
        assert_eq!(fx.manager.phase(), TimerPhase::Associated);
    }

    #[test]
    fn disabled_alarm_stays_silent() {
        let mut fx = mount();
        fx.atoms.sound.update(SoundSettings::toggle_alarm);
        fx.manager.associate(window());
        fx.atoms.timer.update(|state| state.on_tick(1).start());
        fx.host.run();
        fx.tick_after(1_000);
        assert_eq!(fx.manager.phase(), TimerPhase::Completed);
        assert_eq!(fx.alarm().count(MediaCall::Play), 0);
    }

    #[test]
    fn closing_running_timer_resets_and_broadcasts() {
        let mut fx = mount();
        let resets = Rc::new(RefCell::new(Vec::new()));
        let _sub = fx.bus.subscribe(TIMER_RESET_TOPIC, {
            let resets = resets.clone();
            move |payload| resets.borrow_mut().push(payload.clone())
        });
        fx.manager.associate(window());
        fx.atoms.timer.update(TimerState::start);
        fx.host.run();
        fx.tick_after(5_000);

        fx.cleanup.request_cleanup(window(), timer_app_id());
        assert!(fx.manager.process_cleanup());
        fx.host.run();

        assert_eq!(fx.atoms.timer.get(), TimerState::default());
        assert_eq!(fx.manager.phase(), TimerPhase::Idle);
        assert_eq!(*resets.borrow(), vec![json!({ "windowId": "timer-instance" })]);
        assert!(fx.cleanup.is_empty());
        assert!(!fx.manager.process_cleanup());

        fx.tick_after(5_000);
        assert_eq!(fx.atoms.timer.get().time_remaining, 1500);
    }

    #[test]
    fn reset_broadcast_stops_a_running_timer() {
        let mut fx = mount();
        fx.manager.associate(window());
        fx.atoms.timer.update(TimerState::start);
        fx.host.run();
        fx.tick_after(5_000);
        assert_eq!(fx.atoms.timer.get().time_remaining, 1495);

        assert_eq!(fx.bus.publish(TIMER_RESET_TOPIC, json!({})), 1);
        fx.host.run();
        let state = fx.atoms.timer.get();
        assert!(!state.is_running);
        assert_eq!(state.time_remaining, 1500);
        assert_eq!(fx.manager.phase(), TimerPhase::Associated);

        fx.tick_after(5_000);
        assert_eq!(fx.atoms.timer.get().time_remaining, 1500);

        // The worker restarts from the reset value, not its old countdown.
        fx.atoms.timer.update(TimerState::start);
        fx.host.run();
        fx.tick_after(2_000);
        assert_eq!(fx.atoms.timer.get().time_remaining, 1498);
    }

    #[test]
    fn reset_broadcast_ignores_close_payloads() {
        let mut fx = mount();
        fx.manager.associate(window());
        fx.atoms.timer.update(TimerState::start);
        fx.host.run();
        fx.tick_after(5_000);

        fx.bus
            .publish(TIMER_RESET_TOPIC, json!({ "windowId": "timer-instance" }));
        fx.host.run();
        assert_eq!(fx.manager.phase(), TimerPhase::Running);
        assert_eq!(fx.atoms.timer.get().time_remaining, 1495);
    }

    #[test]
    fn pause_keeps_time_elapsed_since_last_tick() {
        let mut fx = mount();
        fx.manager.associate(window());
        fx.atoms.timer.update(TimerState::start);
        fx.host.run();

        fx.clock().advance(10_000);
        fx.atoms.timer.update(TimerState::pause);
        fx.host.run();
        assert_eq!(fx.manager.phase(), TimerPhase::Associated);
        assert_eq!(fx.atoms.timer.get().time_remaining, 1490);

        fx.atoms.timer.update(TimerState::start);
        fx.host.run();
        fx.tick_after(1_000);
        assert_eq!(fx.atoms.timer.get().time_remaining, 1489);
    }

    #[test]
    fn reset_while_running_is_not_overwritten_by_worker_pause() {
        let mut fx = mount();
        fx.manager.associate(window());
        fx.atoms.timer.update(TimerState::start);
        fx.host.run();
        fx.tick_after(5_000);

        fx.atoms.timer.update(TimerState::reset);
        fx.host.run();
        assert_eq!(fx.atoms.timer.get().time_remaining, 1500);
    }

    #[test]
    fn minimize_only_applies_to_associated_window() {
        let fx = mount();
        fx.manager.associate(window());
        fx.manager.set_minimized(&WindowId::new("timer-other"), true);
        assert!(!fx.atoms.timer.get().association.is_minimized);
        fx.manager.set_minimized(&window(), true);
        assert!(fx.atoms.timer.get().association.is_minimized);
        assert_eq!(fx.manager.phase(), TimerPhase::Associated);
    }

    #[test]
    fn visible_page_resyncs_from_worker() {
        let mut fx = mount();
        fx.manager.associate(window());
        fx.atoms.timer.update(TimerState::start);
        fx.host.run();

        fx.clock().advance(120_000);
        fx.manager.on_page_event(PageLifecycleEvent::Visible);
        fx.host.run();
        assert_eq!(fx.atoms.timer.get().time_remaining, 1380);

        fx.manager.on_page_event(PageLifecycleEvent::Hidden);
        fx.tick_after(0);
        assert_eq!(fx.atoms.timer.get().time_remaining, 1380);
    }

    #[test]
    fn dropping_manager_stops_alarm() {
        let fx = mount();
        let alarm = fx.alarm();
        assert_eq!(fx.bus.subscriber_count(TIMER_RESET_TOPIC), 1);
        drop(fx.manager);
        assert_eq!(fx.bus.subscriber_count(TIMER_RESET_TOPIC), 0);
        assert!(alarm.is_paused());
        assert_eq!(alarm.count(MediaCall::ClearSrc), 1);
    }
}
