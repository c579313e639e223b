use super::*;
use crate::{
    features::background::{MAX_BLUR_PX, MAX_DIM_PERCENT, WALLPAPER_PRESETS},
    model::DesktopPreferences,
    reducer::DesktopAction,
};

#[component]
pub(crate) fn SettingsView() -> impl IntoView {
    let runtime = use_desktop_runtime();
    let background = runtime.features.background;
    let sound = runtime.features.sound;
    let preferences = create_memo(move |_| runtime.state.with(|s| s.preferences.clone()));
    let host_strategy = runtime.host.with_value(|host| host.host_strategy_name());

    let set_preferences = move |f: &dyn Fn(&mut DesktopPreferences)| {
        let mut next = preferences.get_untracked();
        f(&mut next);
        runtime.dispatch_action(DesktopAction::SetPreferences { preferences: next });
    };

    view! {
        <div class="app-shell app-settings">
            <fieldset>
                <legend>"Wallpaper"</legend>
                <select
                    class="app-field"
                    prop:value=move || background.with(|b| b.wallpaper_id.clone())
                    on:change=move |ev| {
                        let id = event_target_value(&ev);
                        runtime.with_atoms(|atoms| atoms.background.update(|b| b.with_wallpaper(&id)));
                    }
                >
                    {WALLPAPER_PRESETS
                        .iter()
                        .map(|preset| view! { <option value=preset.id>{preset.label}</option> })
                        .collect_view()}
                </select>
                <label>
                    "Dim "
                    <input
                        class="app-field"
                        type="range"
                        min="0"
                        max=MAX_DIM_PERCENT.to_string()
                        prop:value=move || background.with(|b| b.dim_percent.to_string())
                        on:input=move |ev| {
                            if let Ok(percent) = event_target_value(&ev).parse::<u8>() {
                                runtime
                                    .with_atoms(|atoms| {
                                        atoms.background.update(|b| b.with_dim_percent(percent))
                                    });
                            }
                        }
                    />
                </label>
                <label>
                    "Blur "
                    <input
                        class="app-field"
                        type="range"
                        min="0"
                        max=MAX_BLUR_PX.to_string()
                        prop:value=move || background.with(|b| b.blur_px.to_string())
                        on:input=move |ev| {
                            if let Ok(blur) = event_target_value(&ev).parse::<u8>() {
                                runtime
                                    .with_atoms(|atoms| atoms.background.update(|b| b.with_blur_px(blur)));
                            }
                        }
                    />
                </label>
            </fieldset>
            <fieldset>
                <legend>"Alarm"</legend>
                <label>
                    <input
                        type="checkbox"
                        prop:checked=move || sound.with(|s| s.alarm_enabled)
                        on:change=move |_| {
                            runtime.with_atoms(|atoms| atoms.sound.update(|s| s.toggle_alarm()));
                        }
                    />
                    " Play alarm when the timer ends"
                </label>
                <label>
                    "Alarm volume "
                    <input
                        class="app-field"
                        type="range"
                        min="0"
                        max="100"
                        prop:value=move || volume_percent(sound.with(|s| s.volume_level))
                        on:input=move |ev| {
                            if let Some(volume) = slider_volume(&event_target_value(&ev)) {
                                runtime.with_atoms(|atoms| atoms.sound.update(|s| s.with_volume(volume)));
                            }
                        }
                    />
                </label>
            </fieldset>
            <fieldset>
                <legend>"Desktop"</legend>
                <label>
                    <input
                        type="checkbox"
                        prop:checked=move || preferences.with(|p| p.restore_on_boot)
                        on:change=move |ev| {
                            let checked = event_target_checked(&ev);
                            set_preferences(&|p| p.restore_on_boot = checked);
                        }
                    />
                    " Restore windows on startup"
                </label>
                <label>
                    "Windows to restore "
                    <input
                        class="app-field"
                        type="number"
                        min="0"
                        max="20"
                        prop:value=move || preferences.with(|p| p.max_restore_windows.to_string())
                        on:change=move |ev| {
                            if let Ok(count) = event_target_value(&ev).trim().parse::<usize>() {
                                set_preferences(&|p| p.max_restore_windows = count.min(20));
                            }
                        }
                    />
                </label>
            </fieldset>
            <p class="app-footnote">"Host: " {host_strategy}</p>
        </div>
    }
}
