//! Reducer actions, side-effect intents, and transition logic for the desktop runtime.

use desktop_app_contract::{AppLifecycleEvent, ApplicationId, WindowId};
use serde_json::Value;
use thiserror::Error;

use crate::{
    apps::{app_manifest, app_manifest_by_str},
    model::{
        DesktopPreferences, DesktopSnapshot, DesktopState, OpenWindowRequest, WindowRecord,
        WindowRect,
    },
    window_manager::{
        cascade_rect, focus_window_internal, normalize_window_stack, preferred_window_for_app,
        MIN_WINDOW_HEIGHT, MIN_WINDOW_WIDTH,
    },
};

#[derive(Debug, Clone, PartialEq)]
/// Actions accepted by [`reduce_desktop`] to mutate [`DesktopState`].
pub enum DesktopAction {
    /// Open a window using the supplied request.
    OpenWindow(OpenWindowRequest),
    /// Open an app by raw id, as launched from the start menu.
    OpenApp {
        /// Raw application id.
        app_id: String,
    },
    /// Close a window by id.
    CloseWindow {
        /// Window to close.
        window_id: WindowId,
    },
    /// Focus (and raise) a window by id.
    FocusWindow {
        /// Window to focus.
        window_id: WindowId,
    },
    /// Minimize a window.
    MinimizeWindow {
        /// Window to minimize.
        window_id: WindowId,
    },
    /// Restore a minimized window.
    RestoreWindow {
        /// Window to restore.
        window_id: WindowId,
    },
    /// Toggle taskbar behavior for a window (focus, minimize, or restore).
    ToggleTaskbarWindow {
        /// Window associated with the taskbar button.
        window_id: WindowId,
    },
    /// Replace a window's position and size.
    SetWindowRect {
        /// Window to move.
        window_id: WindowId,
        /// New rectangle.
        rect: WindowRect,
    },
    /// Replace the per-window app payload.
    SetWindowAppState {
        /// Window whose payload should be replaced.
        window_id: WindowId,
        /// New payload.
        app_state: Value,
    },
    /// Replace the desktop preferences.
    SetPreferences {
        /// New preferences.
        preferences: DesktopPreferences,
    },
    /// Toggle the start menu open/closed.
    ToggleStartMenu,
    /// Close the start menu if open.
    CloseStartMenu,
    /// Hydrate runtime state from a persisted snapshot.
    HydrateSnapshot {
        /// Snapshot payload to restore.
        snapshot: DesktopSnapshot,
    },
}

#[derive(Debug, Clone, PartialEq)]
/// Side-effect intents emitted by [`reduce_desktop`] for the runtime host to execute.
pub enum RuntimeEffect {
    /// Persist the current desktop layout snapshot.
    PersistLayout,
    /// Deliver a window lifecycle event to the app's manager.
    DispatchLifecycle {
        /// Window the event concerns.
        window_id: WindowId,
        /// App presented by the window.
        app_id: ApplicationId,
        /// Lifecycle transition.
        event: AppLifecycleEvent,
    },
    /// Queue teardown of the app state presented by a closed window.
    RequestCleanup {
        /// Closed window.
        window_id: WindowId,
        /// App presented by the window.
        app_id: ApplicationId,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Reducer errors for invalid actions.
pub enum ReducerError {
    /// The target window id was not found in the current state.
    #[error("window `{0}` not found")]
    WindowNotFound(WindowId),
    /// No manifest is registered for the requested app id.
    #[error("unknown app `{0}`")]
    UnknownApp(String),
}

struct EffectSink {
    effects: Vec<RuntimeEffect>,
    persist: bool,
}

impl EffectSink {
    fn lifecycle(&mut self, window: &WindowRecord, event: AppLifecycleEvent) {
        self.effects.push(RuntimeEffect::DispatchLifecycle {
            window_id: window.id.clone(),
            app_id: window.app_id.clone(),
            event,
        });
    }
}

/// Applies a [`DesktopAction`] to the desktop runtime state and collects resulting side effects.
///
/// Focus changes are reported as `Blurred`/`Focused` lifecycle effects after the action's own
/// effects.
///
/// # Errors
///
/// Returns [`ReducerError::WindowNotFound`] when an action references a window that is not
/// present and [`ReducerError::UnknownApp`] when an open request names an unregistered app. The
/// state is left unchanged in both cases.
pub fn reduce_desktop(
    state: &mut DesktopState,
    action: DesktopAction,
) -> Result<Vec<RuntimeEffect>, ReducerError> {
    let focused_before = state.focused_window_id();
    let mut sink = EffectSink {
        effects: Vec::new(),
        persist: false,
    };
    apply_action(state, action, &mut sink)?;
    normalize_window_stack(state);

    let focused_after = state.focused_window_id();
    if focused_before != focused_after {
        if let Some(window) = focused_before.as_ref().and_then(|id| state.window(id)) {
            sink.lifecycle(window, AppLifecycleEvent::Blurred);
        }
        if let Some(window) = focused_after.as_ref().and_then(|id| state.window(id)) {
            sink.lifecycle(window, AppLifecycleEvent::Focused);
        }
    }
    if sink.persist {
        sink.effects.push(RuntimeEffect::PersistLayout);
    }
    Ok(sink.effects)
}

fn apply_action(
    state: &mut DesktopState,
    action: DesktopAction,
    sink: &mut EffectSink,
) -> Result<(), ReducerError> {
    match action {
        DesktopAction::OpenApp { app_id } => {
            let Some(manifest) = app_manifest_by_str(&app_id) else {
                return Err(ReducerError::UnknownApp(app_id));
            };
            apply_action(
                state,
                DesktopAction::OpenWindow(OpenWindowRequest::new(manifest.app_id.clone())),
                sink,
            )?;
        }
        DesktopAction::OpenWindow(req) => {
            let manifest = app_manifest(&req.app_id)
                .ok_or_else(|| ReducerError::UnknownApp(req.app_id.to_string()))?;
            state.start_menu_open = false;

            if manifest.single_instance {
                if let Some(existing) = preferred_window_for_app(state, &req.app_id) {
                    return apply_action(
                        state,
                        DesktopAction::RestoreWindow {
                            window_id: existing,
                        },
                        sink,
                    );
                }
            }

            let window_id = if manifest.single_instance {
                WindowId::single_instance(&req.app_id)
            } else {
                let seq = state.next_window_seq;
                state.next_window_seq = seq.saturating_add(1);
                WindowId::sequenced(&req.app_id, seq)
            };
            let rect = req
                .rect
                .unwrap_or_else(|| cascade_rect(state, manifest.window_defaults))
                .clamped_min(MIN_WINDOW_WIDTH, MIN_WINDOW_HEIGHT);
            let record = WindowRecord {
                id: window_id.clone(),
                app_id: req.app_id,
                title: req.title.unwrap_or_else(|| manifest.display_name.clone()),
                icon_id: req.icon_id.unwrap_or_else(|| manifest.icon_id.clone()),
                rect,
                z_index: 0,
                is_focused: false,
                minimized: false,
                app_state: req.app_state,
            };
            sink.lifecycle(&record, AppLifecycleEvent::Mounted);
            state.windows.push(record);
            focus_window_internal(state, &window_id);
            sink.persist = true;
        }
        DesktopAction::CloseWindow { window_id } => {
            let index = window_index(state, &window_id)?;
            let window = state.windows.remove(index);
            sink.lifecycle(&window, AppLifecycleEvent::Closed);
            sink.effects.push(RuntimeEffect::RequestCleanup {
                window_id: window.id,
                app_id: window.app_id,
            });
            sink.persist = true;
        }
        DesktopAction::FocusWindow { window_id } => {
            let was_minimized = find_window_mut(state, &window_id)?.minimized;
            focus_window_internal(state, &window_id);
            if was_minimized {
                if let Some(window) = state.window(&window_id) {
                    sink.lifecycle(window, AppLifecycleEvent::Restored);
                }
                sink.persist = true;
            }
            state.start_menu_open = false;
        }
        DesktopAction::MinimizeWindow { window_id } => {
            let window = find_window_mut(state, &window_id)?;
            if !window.minimized {
                window.minimized = true;
                window.is_focused = false;
                let window = window.clone();
                sink.lifecycle(&window, AppLifecycleEvent::Minimized);
                sink.persist = true;
            }
        }
        DesktopAction::RestoreWindow { window_id } => {
            apply_action(state, DesktopAction::FocusWindow { window_id }, sink)?;
        }
        DesktopAction::ToggleTaskbarWindow { window_id } => {
            let focused = state.focused_window_id().as_ref() == Some(&window_id);
            let minimized = find_window_mut(state, &window_id)?.minimized;
            let next = if minimized {
                DesktopAction::RestoreWindow { window_id }
            } else if focused {
                DesktopAction::MinimizeWindow { window_id }
            } else {
                DesktopAction::FocusWindow { window_id }
            };
            apply_action(state, next, sink)?;
        }
        DesktopAction::SetWindowRect { window_id, rect } => {
            let window = find_window_mut(state, &window_id)?;
            window.rect = rect.clamped_min(MIN_WINDOW_WIDTH, MIN_WINDOW_HEIGHT);
            sink.persist = true;
        }
        DesktopAction::SetWindowAppState {
            window_id,
            app_state,
        } => {
            let window = find_window_mut(state, &window_id)?;
            window.app_state = app_state;
            sink.persist = true;
        }
        DesktopAction::SetPreferences { preferences } => {
            if state.preferences != preferences {
                state.preferences = preferences;
                sink.persist = true;
            }
        }
        DesktopAction::ToggleStartMenu => {
            state.start_menu_open = !state.start_menu_open;
        }
        DesktopAction::CloseStartMenu => {
            state.start_menu_open = false;
        }
        DesktopAction::HydrateSnapshot { mut snapshot } => {
            snapshot
                .windows
                .retain(|window| app_manifest(&window.app_id).is_some());
            *state = DesktopState::from_snapshot(snapshot);
            normalize_window_stack(state);
            for window in &state.windows {
                sink.lifecycle(window, AppLifecycleEvent::Mounted);
                if window.minimized {
                    sink.lifecycle(window, AppLifecycleEvent::Minimized);
                }
            }
        }
    }
    Ok(())
}

fn window_index(state: &DesktopState, window_id: &WindowId) -> Result<usize, ReducerError> {
    state
        .windows
        .iter()
        .position(|w| w.id == *window_id)
        .ok_or_else(|| ReducerError::WindowNotFound(window_id.clone()))
}

fn find_window_mut<'a>(
    state: &'a mut DesktopState,
    window_id: &WindowId,
) -> Result<&'a mut WindowRecord, ReducerError> {
    state
        .windows
        .iter_mut()
        .find(|w| w.id == *window_id)
        .ok_or_else(|| ReducerError::WindowNotFound(window_id.clone()))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::apps::{NOTEPAD_APP_ID, TIMER_APP_ID};

    fn open(state: &mut DesktopState, raw: &str) -> (WindowId, Vec<RuntimeEffect>) {
        let effects = reduce_desktop(
            state,
            DesktopAction::OpenApp {
                app_id: raw.to_string(),
            },
        )
        .expect("open window");
        let id = state.focused_window_id().expect("focused window");
        (id, effects)
    }

    fn lifecycle(effects: &[RuntimeEffect]) -> Vec<(String, AppLifecycleEvent)> {
        effects
            .iter()
            .filter_map(|effect| match effect {
                RuntimeEffect::DispatchLifecycle {
                    window_id, event, ..
                } => Some((window_id.to_string(), *event)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn open_window_focuses_new_window_and_updates_stack() {
        let mut state = DesktopState::default();
        let (first, _) = open(&mut state, NOTEPAD_APP_ID);
        let (second, effects) = open(&mut state, TIMER_APP_ID);

        assert_eq!(first.as_str(), "notepad-1");
        assert_eq!(second.as_str(), "timer-instance");
        assert_eq!(state.windows[1].z_index, 2);
        assert_eq!(
            lifecycle(&effects),
            vec![
                ("timer-instance".to_string(), AppLifecycleEvent::Mounted),
                ("notepad-1".to_string(), AppLifecycleEvent::Blurred),
                ("timer-instance".to_string(), AppLifecycleEvent::Focused),
            ]
        );
        assert_eq!(effects.last(), Some(&RuntimeEffect::PersistLayout));
    }

    #[test]
    fn single_instance_app_restores_existing_window() {
        let mut state = DesktopState::default();
        let (timer, _) = open(&mut state, TIMER_APP_ID);
        reduce_desktop(
            &mut state,
            DesktopAction::MinimizeWindow {
                window_id: timer.clone(),
            },
        )
        .expect("minimize");

        let (again, effects) = open(&mut state, TIMER_APP_ID);
        assert_eq!(again, timer);
        assert_eq!(state.windows.len(), 1);
        assert!(!state.windows[0].minimized);
        assert_eq!(
            lifecycle(&effects),
            vec![
                ("timer-instance".to_string(), AppLifecycleEvent::Restored),
                ("timer-instance".to_string(), AppLifecycleEvent::Focused),
            ]
        );
    }

    #[test]
    fn unknown_app_is_rejected_without_state_change() {
        let mut state = DesktopState::default();
        let before = state.clone();
        assert_eq!(
            reduce_desktop(
                &mut state,
                DesktopAction::OpenApp {
                    app_id: "app.paint".to_string()
                }
            ),
            Err(ReducerError::UnknownApp("app.paint".to_string()))
        );
        assert_eq!(state, before);
    }

    #[test]
    fn closing_window_requests_cleanup() {
        let mut state = DesktopState::default();
        let (timer, _) = open(&mut state, TIMER_APP_ID);
        let effects = reduce_desktop(
            &mut state,
            DesktopAction::CloseWindow {
                window_id: timer.clone(),
            },
        )
        .expect("close");
        assert!(state.windows.is_empty());
        assert_eq!(
            effects,
            vec![
                RuntimeEffect::DispatchLifecycle {
                    window_id: timer.clone(),
                    app_id: ApplicationId::trusted(TIMER_APP_ID),
                    event: AppLifecycleEvent::Closed,
                },
                RuntimeEffect::RequestCleanup {
                    window_id: timer,
                    app_id: ApplicationId::trusted(TIMER_APP_ID),
                },
                RuntimeEffect::PersistLayout,
            ]
        );
        assert_eq!(
            reduce_desktop(
                &mut state,
                DesktopAction::CloseWindow {
                    window_id: WindowId::new("timer-instance")
                }
            ),
            Err(ReducerError::WindowNotFound(WindowId::new("timer-instance")))
        );
    }

    #[test]
    fn taskbar_toggle_minimizes_if_focused_and_restores_if_minimized() {
        let mut state = DesktopState::default();
        let (win, _) = open(&mut state, NOTEPAD_APP_ID);

        let effects = reduce_desktop(
            &mut state,
            DesktopAction::ToggleTaskbarWindow {
                window_id: win.clone(),
            },
        )
        .expect("minimize");
        let record = state.window(&win).expect("window");
        assert!(record.minimized);
        assert!(!record.is_focused);
        assert_eq!(
            lifecycle(&effects),
            vec![
                ("notepad-1".to_string(), AppLifecycleEvent::Minimized),
                ("notepad-1".to_string(), AppLifecycleEvent::Blurred),
            ]
        );

        reduce_desktop(
            &mut state,
            DesktopAction::ToggleTaskbarWindow {
                window_id: win.clone(),
            },
        )
        .expect("restore");
        let record = state.window(&win).expect("window");
        assert!(!record.minimized);
        assert!(record.is_focused);
    }

    #[test]
    fn focusing_already_focused_top_window_is_noop_for_stack_order() {
        let mut state = DesktopState::default();
        open(&mut state, NOTEPAD_APP_ID);
        let (second, _) = open(&mut state, NOTEPAD_APP_ID);
        let before = state.windows.clone();

        let effects = reduce_desktop(
            &mut state,
            DesktopAction::FocusWindow {
                window_id: second.clone(),
            },
        )
        .expect("focus focused window");

        assert_eq!(state.windows, before);
        assert!(effects.is_empty());
        assert_eq!(second.as_str(), "notepad-2");
    }

    #[test]
    fn hydrate_restores_known_windows_and_mounts_them() {
        let mut source = DesktopState::default();
        let (timer, _) = open(&mut source, TIMER_APP_ID);
        open(&mut source, NOTEPAD_APP_ID);
        reduce_desktop(&mut source, DesktopAction::MinimizeWindow { window_id: timer })
            .expect("minimize");
        let mut snapshot = source.snapshot();
        let mut stray = snapshot.windows[0].clone();
        stray.id = WindowId::new("paint-9");
        stray.app_id = ApplicationId::trusted("app.paint");
        snapshot.windows.push(stray);

        let mut state = DesktopState::default();
        let effects =
            reduce_desktop(&mut state, DesktopAction::HydrateSnapshot { snapshot }).expect("hydrate");

        assert_eq!(state.windows.len(), 2);
        assert_eq!(state.next_window_seq, 2);
        assert_eq!(
            lifecycle(&effects),
            vec![
                ("timer-instance".to_string(), AppLifecycleEvent::Mounted),
                ("timer-instance".to_string(), AppLifecycleEvent::Minimized),
                ("notepad-1".to_string(), AppLifecycleEvent::Mounted),
                ("notepad-1".to_string(), AppLifecycleEvent::Focused),
            ]
        );
    }
}
