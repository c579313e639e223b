use std::time::Duration;

use super::*;
use crate::{apps, title::format_mm_ss, timer::TimerPhase};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TaskbarClockSnapshot {
    hour: u32,
    minute: u32,
}

impl TaskbarClockSnapshot {
    fn now() -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            let date = js_sys::Date::new_0();
            return Self {
                hour: date.get_hours(),
                minute: date.get_minutes(),
            };
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            Self { hour: 0, minute: 0 }
        }
    }
}

fn format_taskbar_clock_time(snapshot: TaskbarClockSnapshot) -> String {
    let mut hour = snapshot.hour % 12;
    if hour == 0 {
        hour = 12;
    }
    let suffix = if snapshot.hour >= 12 { "PM" } else { "AM" };
    format!("{hour}:{:02} {suffix}", snapshot.minute)
}

/// Tray text for the timer: a countdown while running, an alert once completed.
fn timer_tray_text(phase: TimerPhase, remaining: u32) -> Option<String> {
    match phase {
        TimerPhase::Running => Some(format!("⏱ {}", format_mm_ss(remaining))),
        TimerPhase::Completed => Some("⏰ Done".to_string()),
        TimerPhase::Idle | TimerPhase::Associated => None,
    }
}

#[component]
pub(super) fn Taskbar() -> impl IntoView {
    let runtime = use_desktop_runtime();
    let state = runtime.state;
    let features = runtime.features;
    let clock_now = create_rw_signal(TaskbarClockSnapshot::now());

    if let Ok(interval) = set_interval_with_handle(
        move || clock_now.set(TaskbarClockSnapshot::now()),
        Duration::from_secs(15),
    ) {
        on_cleanup(move || interval.clear());
    }

    let timer_tray = move || {
        timer_tray_text(
            features.timer_phase.get(),
            features.timer.with(|timer| timer.time_remaining),
        )
    };
    let music_tray = move || {
        features.music.with(|music| {
            music
                .current_song()
                .filter(|_| music.is_playing)
                .map(|song| format!("♪ {}", song.title))
        })
    };

    view! {
        <footer
            class="taskbar"
            role="toolbar"
            aria-label="Taskbar"
            style=format!("height:{TASKBAR_HEIGHT_PX}px;")
            on:mousedown=move |ev| ev.stop_propagation()
        >
            <button
                class="taskbar-start"
                aria-haspopup="menu"
                aria-expanded=move || state.get().start_menu_open.to_string()
                on:click=move |ev| {
                    stop_mouse_event(&ev);
                    runtime.dispatch_action(DesktopAction::ToggleStartMenu);
                }
            >
                "Start"
            </button>
            <Show when=move || state.get().start_menu_open fallback=|| ()>
                <nav class="start-menu" role="menu" aria-label="Apps">
                    {apps::launcher_apps()
                        .into_iter()
                        .map(|manifest| {
                            let raw_id = manifest.app_id.to_string();
                            view! {
                                <button
                                    role="menuitem"
                                    on:click=move |ev| {
                                        stop_mouse_event(&ev);
                                        runtime.dispatch_action(DesktopAction::OpenApp {
                                            app_id: raw_id.clone(),
                                        });
                                    }
                                >
                                    <span aria-hidden="true">{app_icon_glyph(&manifest.icon_id)}</span>
                                    <span>{manifest.display_name.clone()}</span>
                                </button>
                            }
                        })
                        .collect_view()}
                </nav>
            </Show>
            <div class="taskbar-windows">
                <For
                    each=move || ordered_taskbar_windows(&state.get())
                    key=|win| (win.id.clone(), win.is_focused, win.minimized)
                    let:win
                >
                    {{
                        let window_id = win.id.clone();
                        let class = if win.is_focused && !win.minimized {
                            "taskbar-window active"
                        } else {
                            "taskbar-window"
                        };
                        view! {
                            <button
                                class=class
                                aria-label=taskbar_window_aria_label(&win)
                                aria-pressed=(win.is_focused && !win.minimized).to_string()
                                on:click=move |ev| {
                                    stop_mouse_event(&ev);
                                    runtime.dispatch_action(DesktopAction::ToggleTaskbarWindow {
                                        window_id: window_id.clone(),
                                    });
                                }
                            >
                                <span aria-hidden="true">{app_icon_glyph(&win.icon_id)}</span>
                                <span>{win.title.clone()}</span>
                            </button>
                        }
                    }}
                </For>
            </div>
            <div class="taskbar-tray" aria-live="polite">
                {move || timer_tray().map(|text| view! { <span class="tray-timer">{text}</span> })}
                {move || music_tray().map(|text| view! { <span class="tray-music">{text}</span> })}
                <span class="tray-clock">
                    {move || format_taskbar_clock_time(clock_now.get())}
                </span>
            </div>
        </footer>
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn clock_uses_twelve_hour_format() {
        assert_eq!(
            format_taskbar_clock_time(TaskbarClockSnapshot { hour: 0, minute: 5 }),
            "12:05 AM"
        );
        assert_eq!(
            format_taskbar_clock_time(TaskbarClockSnapshot {
                hour: 13,
                minute: 45
            }),
            "1:45 PM"
        );
    }

    #[test]
    fn timer_tray_shows_only_running_or_completed() {
        assert_eq!(
            timer_tray_text(TimerPhase::Running, 754).as_deref(),
            Some("⏱ 12:34")
        );
        assert_eq!(
            timer_tray_text(TimerPhase::Completed, 0).as_deref(),
            Some("⏰ Done")
        );
        assert_eq!(timer_tray_text(TimerPhase::Associated, 1500), None);
    }
}
