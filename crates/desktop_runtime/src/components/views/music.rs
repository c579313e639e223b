use super::*;
use crate::title::format_mm_ss;

#[component]
pub(crate) fn MusicView() -> impl IntoView {
    let runtime = use_desktop_runtime();
    let music = runtime.features.music;
    let loading = runtime.features.music_loading;
    let new_url = create_rw_signal(String::new());
    let new_title = create_rw_signal(String::new());

    let add_song = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let url = new_url.get_untracked();
        if url.trim().is_empty() {
            return;
        }
        let title = new_title.get_untracked();
        runtime.with_atoms(|atoms| atoms.music.update(|m| m.add_song(&url, &title, None)));
        new_url.set(String::new());
        new_title.set(String::new());
    };

    let now_playing = move || {
        music.with(|m| {
            m.current_song()
                .map(|song| match &song.artist {
                    Some(artist) => format!("{} · {artist}", song.title),
                    None => song.title.clone(),
                })
                .unwrap_or_else(|| "Playlist is empty".to_string())
        })
    };

    view! {
        <div class="app-shell app-music">
            <p class="music-now-playing" aria-live="polite">
                {now_playing}
                <Show when=move || loading.get() fallback=|| ()>
                    <span class="app-loading">" (loading…)"</span>
                </Show>
            </p>
            <div class="app-toolbar" role="group" aria-label="Playback controls">
                <button
                    type="button"
                    class="app-action"
                    aria-label="Previous song"
                    on:click=move |_| {
                        runtime.with_atoms(|atoms| atoms.music.update(|m| m.previous_song()));
                    }
                >
                    "⏮"
                </button>
                <button
                    type="button"
                    class="app-action"
                    on:click=move |_| {
                        runtime.with_atoms(|atoms| atoms.music.update(|m| m.toggle_play()));
                    }
                >
                    {move || if music.with(|m| m.is_playing) { "Pause" } else { "Play" }}
                </button>
                <button
                    type="button"
                    class="app-action"
                    aria-label="Next song"
                    on:click=move |_| {
                        runtime.with_atoms(|atoms| atoms.music.update(|m| m.next_song()));
                    }
                >
                    "⏭"
                </button>
                <span class="music-position">
                    {move || format_mm_ss(music.with(|m| m.current_time.floor() as u32))}
                </span>
            </div>
            <div class="app-toolbar">
                <label>
                    "Seek to (s) "
                    <input
                        class="app-field"
                        type="number"
                        min="0"
                        prop:value=move || music.with(|m| format!("{}", m.current_time.floor()))
                        on:change=move |ev| {
                            if let Ok(seconds) = event_target_value(&ev).trim().parse::<f64>() {
                                runtime.with_lifecycle(|lifecycle| lifecycle.music().seek(seconds));
                            }
                        }
                    />
                </label>
                <label>
                    "Volume "
                    <input
                        class="app-field"
                        type="range"
                        min="0"
                        max="100"
                        prop:value=move || volume_percent(music.with(|m| m.volume))
                        on:input=move |ev| {
                            if let Some(volume) = slider_volume(&event_target_value(&ev)) {
                                runtime
                                    .with_atoms(|atoms| atoms.music.update(|m| m.with_volume(volume)));
                            }
                        }
                    />
                </label>
            </div>
            <ol class="music-playlist">
                <For
                    each=move || music.with(|m| m.playlist.iter().cloned().enumerate().collect::<Vec<_>>())
                    key=|(index, song)| (*index, song.id.clone())
                    let:entry
                >
                    {{
                        let (index, song) = entry;
                        let song_id = song.id.clone();
                        let is_current = move || music.with(|m| m.current_song_index == index);
                        view! {
                            <li class:current=is_current>
                                <button
                                    type="button"
                                    class="app-link"
                                    on:click=move |_| {
                                        runtime
                                            .with_atoms(|atoms| {
                                                atoms.music.update(|m| m.select_song(index))
                                            });
                                    }
                                >
                                    {song.title.clone()}
                                </button>
                                <button
                                    type="button"
                                    class="app-action"
                                    aria-label=format!("Remove {}", song.title)
                                    on:click=move |_| {
                                        runtime
                                            .with_atoms(|atoms| {
                                                atoms.music.update(|m| m.remove_song(&song_id))
                                            });
                                    }
                                >
                                    "×"
                                </button>
                            </li>
                        }
                    }}
                </For>
            </ol>
            <form class="app-toolbar" on:submit=add_song>
                <input
                    class="app-field"
                    type="url"
                    placeholder="Song URL"
                    prop:value=move || new_url.get()
                    on:input=move |ev| new_url.set(event_target_value(&ev))
                />
                <input
                    class="app-field"
                    type="text"
                    placeholder="Title"
                    prop:value=move || new_title.get()
                    on:input=move |ev| new_title.set(event_target_value(&ev))
                />
                <button type="submit" class="app-action">"Add"</button>
            </form>
        </div>
    }
}
