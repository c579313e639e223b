use super::*;
use crate::features::bookmarks::{add_bookmark, remove_bookmark, rename_bookmark, BookmarkError};

#[component]
pub(crate) fn BookmarksView() -> impl IntoView {
    let runtime = use_desktop_runtime();
    let bookmarks = runtime.features.bookmarks;
    let new_title = create_rw_signal(String::new());
    let new_url = create_rw_signal(String::new());
    let error = create_rw_signal(None::<String>);

    let submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let title = new_title.get_untracked();
        let url = new_url.get_untracked();
        let result = runtime.with_atoms(|atoms| {
            let next = add_bookmark(&atoms.bookmarks.get(), &title, &url)?;
            atoms.bookmarks.set(next);
            Ok::<_, BookmarkError>(())
        });
        match result {
            Ok(()) => {
                error.set(None);
                new_title.set(String::new());
                new_url.set(String::new());
            }
            Err(err) => error.set(Some(err.to_string())),
        }
    };

    view! {
        <div class="app-shell app-bookmarks">
            <form class="app-toolbar" on:submit=submit>
                <input
                    class="app-field"
                    type="text"
                    placeholder="Title"
                    prop:value=move || new_title.get()
                    on:input=move |ev| new_title.set(event_target_value(&ev))
                />
                <input
                    class="app-field"
                    type="text"
                    placeholder="example.com"
                    prop:value=move || new_url.get()
                    on:input=move |ev| new_url.set(event_target_value(&ev))
                />
                <button type="submit" class="app-action">"Add"</button>
            </form>
            {move || error.get().map(|message| view! { <p class="app-error" role="alert">{message}</p> })}
            <ul class="bookmark-list">
                <For each=move || bookmarks.get() key=|bookmark| (bookmark.id.clone(), bookmark.title.clone()) let:bookmark>
                    {{
                        let rename_id = bookmark.id.clone();
                        let remove_id = bookmark.id.clone();
                        view! {
                            <li>
                                <a href=bookmark.url.clone() target="_blank" rel="noopener noreferrer">
                                    {bookmark.title.clone()}
                                </a>
                                <input
                                    class="app-field"
                                    type="text"
                                    aria-label="Rename bookmark"
                                    value=bookmark.title.clone()
                                    on:change=move |ev| {
                                        let title = event_target_value(&ev);
                                        runtime
                                            .with_atoms(|atoms| {
                                                atoms
                                                    .bookmarks
                                                    .update(|list| rename_bookmark(list, &rename_id, &title))
                                            });
                                    }
                                />
                                <button
                                    type="button"
                                    class="app-action"
                                    aria-label="Remove bookmark"
                                    on:click=move |_| {
                                        runtime
                                            .with_atoms(|atoms| {
                                                atoms.bookmarks.update(|list| remove_bookmark(list, &remove_id))
                                            });
                                    }
                                >
                                    "×"
                                </button>
                            </li>
                        }
                    }}
                </For>
            </ul>
        </div>
    }
}
