//! Timer worker: tracks wall-clock elapsed time independently of the host's tick cadence.

use std::rc::Rc;

use futures::{
    channel::mpsc::{UnboundedReceiver, UnboundedSender},
    select, Stream, StreamExt,
};
use leptos::logging;
use platform_host::Clock;

use super::protocol::{decode_command, encode_event, WorkerCommand, WorkerEvent};

/// Worker bookkeeping. Remaining time is derived from `start_time_ms` on every read.
pub struct TimerWorkerCore {
    clock: Rc<dyn Clock>,
    is_running: bool,
    start_time_ms: Option<u64>,
    paused_time_remaining: Option<u32>,
}

impl TimerWorkerCore {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            clock,
            is_running: false,
            start_time_ms: None,
            paused_time_remaining: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    /// `max(0, paused - floor(elapsed / 1000))` while running.
    pub fn current_remaining(&self) -> u32 {
        let base = self.paused_time_remaining.unwrap_or(0);
        match (self.is_running, self.start_time_ms) {
            (true, Some(start)) => {
                let elapsed_secs = self.clock.now_ms().saturating_sub(start) / 1000;
                let elapsed_secs = u32::try_from(elapsed_secs).unwrap_or(u32::MAX);
                base.saturating_sub(elapsed_secs)
            }
            _ => base,
        }
    }

    fn clear(&mut self) {
        self.is_running = false;
        self.start_time_ms = None;
        self.paused_time_remaining = None;
    }

    /// Applies one host command and returns the events to send back.
    pub fn handle(&mut self, command: WorkerCommand) -> Vec<WorkerEvent> {
        match command {
            WorkerCommand::Start { time_remaining: 0 } => {
                self.clear();
                vec![WorkerEvent::Complete]
            }
            WorkerCommand::Start { time_remaining } => {
                self.is_running = true;
                self.start_time_ms = Some(self.clock.now_ms());
                self.paused_time_remaining = Some(time_remaining);
                vec![WorkerEvent::Tick { time_remaining }]
            }
            WorkerCommand::Pause => {
                if !self.is_running {
                    return Vec::new();
                }
                let time_remaining = self.current_remaining();
                self.is_running = false;
                self.start_time_ms = None;
                self.paused_time_remaining = Some(time_remaining);
                vec![WorkerEvent::Paused { time_remaining }]
            }
            WorkerCommand::Reset => {
                self.clear();
                vec![WorkerEvent::Reset]
            }
            WorkerCommand::Check => {
                let time_remaining = self.current_remaining();
                if self.is_running && time_remaining == 0 {
                    self.clear();
                    return vec![WorkerEvent::Complete];
                }
                vec![WorkerEvent::Status {
                    time_remaining,
                    is_running: self.is_running,
                }]
            }
        }
    }

    /// Runs one 1000ms interval step.
    pub fn on_interval(&mut self) -> Vec<WorkerEvent> {
        if !self.is_running {
            return Vec::new();
        }
        let time_remaining = self.current_remaining();
        if time_remaining == 0 {
            self.clear();
            vec![WorkerEvent::Complete]
        } else {
            vec![WorkerEvent::Tick { time_remaining }]
        }
    }
}

/// Drives `core` from encoded commands and interval ticks until the command channel closes.
pub async fn run_timer_worker<T>(
    mut core: TimerWorkerCore,
    commands: UnboundedReceiver<String>,
    ticks: T,
    events: UnboundedSender<String>,
) where
    T: Stream<Item = ()> + Unpin,
{
    let mut commands = commands.fuse();
    let mut ticks = ticks.fuse();
    loop {
        let emitted = select! {
            raw = commands.next() => match raw {
                Some(raw) => match decode_command(&raw) {
                    Ok(command) => core.handle(command),
                    Err(err) => {
                        logging::warn!("timer worker ignored message: {err}");
                        Vec::new()
                    }
                },
                None => return,
            },
            tick = ticks.next() => match tick {
                Some(()) => core.on_interval(),
                None => Vec::new(),
            },
        };

        for event in emitted {
            match encode_event(&event) {
                Ok(raw) => {
                    if events.unbounded_send(raw).is_err() {
                        return;
                    }
                }
                Err(err) => logging::warn!("timer worker dropped event: {err}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::{channel::mpsc, executor::LocalPool, task::LocalSpawnExt};
    use platform_host::ManualClock;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::timer::protocol::{decode_event, encode_command};

    fn core_with(clock: &ManualClock) -> TimerWorkerCore {
        TimerWorkerCore::new(Rc::new(clock.clone()))
    }

    #[test]
    fn pause_after_ten_seconds_reports_elapsed_remaining() {
        let clock = ManualClock::starting_at(1_000);
        let mut core = core_with(&clock);
        assert_eq!(
            core.handle(WorkerCommand::Start {
                time_remaining: 1500
            }),
            vec![WorkerEvent::Tick {
                time_remaining: 1500
            }]
        );
        clock.advance(10_000);
        assert_eq!(
            core.handle(WorkerCommand::Pause),
            vec![WorkerEvent::Paused {
                time_remaining: 1490
            }]
        );
        assert!(core.handle(WorkerCommand::Pause).is_empty());
    }

    #[test]
    fn remaining_time_is_non_increasing_and_completes_once() {
        let clock = ManualClock::starting_at(0);
        let mut core = core_with(&clock);
        core.handle(WorkerCommand::Start { time_remaining: 3 });

        let mut last = 3;
        let mut completions = 0;
        for step_ms in [400, 900, 1_300, 700, 2_000, 1_000] {
            clock.advance(step_ms);
            for event in core.on_interval() {
                match event {
                    WorkerEvent::Tick { time_remaining } => {
                        assert!(time_remaining <= last);
                        last = time_remaining;
                    }
                    WorkerEvent::Complete => completions += 1,
                    other => panic!("unexpected {other:?}"),
                }
            }
        }
        assert_eq!(completions, 1);
        assert!(!core.is_running());
    }

    #[test]
    fn check_reports_status_or_overdue_completion() {
        let clock = ManualClock::starting_at(0);
        let mut core = core_with(&clock);
        assert_eq!(
            core.handle(WorkerCommand::Check),
            vec![WorkerEvent::Status {
                time_remaining: 0,
                is_running: false
            }]
        );
        core.handle(WorkerCommand::Start { time_remaining: 5 });
        clock.advance(2_500);
        assert_eq!(
            core.handle(WorkerCommand::Check),
            vec![WorkerEvent::Status {
                time_remaining: 3,
                is_running: true
            }]
        );
        clock.advance(60_000);
        assert_eq!(core.handle(WorkerCommand::Check), vec![WorkerEvent::Complete]);
        assert_eq!(
            core.handle(WorkerCommand::Start { time_remaining: 0 }),
            vec![WorkerEvent::Complete]
        );
    }

    #[test]
    fn run_loop_answers_commands_and_ticks_then_exits_on_close() {
        let clock = ManualClock::starting_at(0);
        let (command_tx, command_rx) = mpsc::unbounded::<String>();
        let (tick_tx, tick_rx) = mpsc::unbounded::<()>();
        let (event_tx, mut event_rx) = mpsc::unbounded::<String>();
        let mut pool = LocalPool::new();
        pool.spawner()
            .spawn_local(run_timer_worker(
                core_with(&clock),
                command_rx,
                tick_rx,
                event_tx,
            ))
            .expect("spawn worker");

        let send = |command: WorkerCommand| {
            command_tx
                .unbounded_send(encode_command(&command).expect("encode"))
                .expect("send");
        };
        send(WorkerCommand::Start { time_remaining: 2 });
        pool.run_until_stalled();
        clock.advance(1_000);
        tick_tx.unbounded_send(()).expect("tick");
        pool.run_until_stalled();
        clock.advance(1_000);
        tick_tx.unbounded_send(()).expect("tick");
        command_tx
            .unbounded_send("garbage".to_string())
            .expect("send garbage");
        pool.run_until_stalled();
        drop(command_tx);
        pool.run_until_stalled();

        let mut events = Vec::new();
        while let Ok(Some(raw)) = event_rx.try_next() {
            events.push(decode_event(&raw).expect("decode"));
        }
        assert_eq!(
            events,
            vec![
                WorkerEvent::Tick { time_remaining: 2 },
                WorkerEvent::Tick { time_remaining: 1 },
                WorkerEvent::Complete,
            ]
        );
        assert!(matches!(event_rx.try_next(), Ok(None)));
    }
}
