use super::*;
use crate::{apps::ambience_sounds, features::ambience::toggle_mute};

#[component]
pub(crate) fn AmbienceView() -> impl IntoView {
    let runtime = use_desktop_runtime();
    let ambience = runtime.features.ambience;
    let ui = runtime.features.ambience_ui;
    let sound_count = ambience_sounds().len();

    let current_title = move || {
        ambience.with(|state| {
            ambience_sounds()
                .get(state.current_sound_index)
                .map(|sound| sound.title.clone())
                .unwrap_or_else(|| "No sounds".to_string())
        })
    };

    let mute = move |_| {
        runtime.with_atoms(|atoms| {
            let (state, next_ui) = toggle_mute(&atoms.ambience.get(), &atoms.ambience_ui.get());
            atoms.ambience_ui.set(next_ui);
            atoms.ambience.set(state);
        });
    };

    view! {
        <div class="app-shell app-ambience">
            <p class="ambience-title" aria-live="polite">
                {current_title}
                <Show when=move || ui.with(|ui| ui.is_loading) fallback=|| ()>
                    <span class="app-loading">" (loading…)"</span>
                </Show>
            </p>
            <div class="app-toolbar" role="group" aria-label="Ambience controls">
                <button
                    type="button"
                    class="app-action"
                    aria-label="Previous sound"
                    on:click=move |_| {
                        runtime
                            .with_atoms(|atoms| {
                                atoms.ambience.update(|s| s.previous_sound(sound_count))
                            });
                    }
                >
                    "⏮"
                </button>
                <button
                    type="button"
                    class="app-action"
                    on:click=move |_| {
                        runtime.with_atoms(|atoms| atoms.ambience.update(|s| s.toggle_play()));
                    }
                >
                    {move || if ambience.with(|s| s.is_playing) { "Pause" } else { "Play" }}
                </button>
                <button
                    type="button"
                    class="app-action"
                    aria-label="Next sound"
                    on:click=move |_| {
                        runtime
                            .with_atoms(|atoms| atoms.ambience.update(|s| s.next_sound(sound_count)));
                    }
                >
                    "⏭"
                </button>
            </div>
            <div class="app-toolbar">
                <button type="button" class="app-action" on:click=mute>
                    {move || if ui.with(|ui| ui.is_muted) { "Unmute" } else { "Mute" }}
                </button>
                <label>
                    "Volume "
                    <input
                        class="app-field"
                        type="range"
                        min="0"
                        max="100"
                        prop:value=move || volume_percent(ambience.with(|s| s.volume))
                        on:input=move |ev| {
                            if let Some(volume) = slider_volume(&event_target_value(&ev)) {
                                runtime
                                    .with_atoms(|atoms| {
                                        atoms.ambience.update(|s| s.with_volume(volume))
                                    });
                            }
                        }
                    />
                </label>
            </div>
        </div>
    }
}
