use super::*;
use crate::{
    features::{
        sessions::total_focus_seconds,
        timer::{TimerSetting, TimerState},
    },
    title::format_mm_ss,
    timer::TimerPhase,
};

fn focus_summary(session_count: usize, total_seconds: u64) -> String {
    let minutes = total_seconds / 60;
    match session_count {
        0 => "No focus sessions yet".to_string(),
        1 => format!("1 session, {minutes} min focused"),
        n => format!("{n} sessions, {minutes} min focused"),
    }
}

#[component]
pub(crate) fn TimerView() -> impl IntoView {
    let runtime = use_desktop_runtime();
    let timer = runtime.features.timer;
    let phase = runtime.features.timer_phase;
    let sessions = runtime.features.sessions;

    let update = move |f: fn(&TimerState) -> TimerState| {
        runtime.with_atoms(|atoms| atoms.timer.update(f));
    };

    view! {
        <div class="app-shell app-timer">
            <input
                class="app-field timer-title"
                type="text"
                placeholder="Timer"
                aria-label="Timer title"
                prop:value=move || timer.with(|t| t.custom_title.clone())
                on:input=move |ev| {
                    let value = event_target_value(&ev);
                    runtime.with_atoms(|atoms| atoms.timer.update(|t| t.with_custom_title(value)));
                }
            />
            <div class="timer-display" aria-live="polite">
                {move || format_mm_ss(timer.with(|t| t.time_remaining))}
            </div>
            <Show when=move || phase.get() == TimerPhase::Completed fallback=|| ()>
                <p class="timer-banner" role="alert">"Time is up!"</p>
            </Show>
            <div class="app-toolbar" role="group" aria-label="Timer presets">
                {TimerSetting::ALL
                    .into_iter()
                    .map(|setting| {
                        view! {
                            <button
                                type="button"
                                class="app-action"
                                aria-pressed=move || {
                                    (timer.with(|t| t.timer_setting) == setting).to_string()
                                }
                                on:click=move |_| {
                                    runtime
                                        .with_atoms(|atoms| {
                                            atoms.timer.update(|t| t.with_setting(setting))
                                        });
                                }
                            >
                                {setting.label()}
                            </button>
                        }
                    })
                    .collect_view()}
            </div>
            <Show
                when=move || timer.with(|t| t.timer_setting == TimerSetting::Custom)
                fallback=|| ()
            >
                <label>
                    "Minutes "
                    <input
                        class="app-field"
                        type="number"
                        min="1"
                        prop:value=move || timer.with(|t| t.custom_duration_minutes.to_string())
                        on:change=move |ev| {
                            if let Ok(minutes) = event_target_value(&ev).trim().parse::<u32>() {
                                runtime
                                    .with_atoms(|atoms| {
                                        atoms.timer.update(|t| t.with_custom_duration(minutes))
                                    });
                            }
                        }
                    />
                </label>
            </Show>
            <div class="app-toolbar" role="group" aria-label="Timer controls">
                <Show
                    when=move || timer.with(|t| t.is_running)
                    fallback=move || {
                        view! {
                            <button type="button" class="app-action" on:click=move |_| update(TimerState::start)>
                                "Start"
                            </button>
                        }
                    }
                >
                    <button type="button" class="app-action" on:click=move |_| update(TimerState::pause)>
                        "Pause"
                    </button>
                </Show>
                <button type="button" class="app-action" on:click=move |_| update(TimerState::reset)>
                    "Reset"
                </button>
            </div>
            <p class="timer-sessions">
                {move || sessions.with(|s| focus_summary(s.len(), total_focus_seconds(s)))}
            </p>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn focus_summary_pluralizes() {
        assert_eq!(focus_summary(0, 0), "No focus sessions yet");
        assert_eq!(focus_summary(1, 1500), "1 session, 25 min focused");
        assert_eq!(focus_summary(3, 3600), "3 sessions, 60 min focused");
    }
}
