use super::*;
use crate::apps::{
    AMBIENCE_APP_ID, BOOKMARKS_APP_ID, MUSIC_APP_ID, NOTEPAD_APP_ID, SETTINGS_APP_ID,
    TIMER_APP_ID,
};
use super::views::{AmbienceView, BookmarksView, MusicView, NotepadView, SettingsView, TimerView};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;

#[cfg(target_arch = "wasm32")]
fn try_set_pointer_capture(ev: &web_sys::PointerEvent) {
    if let Some(target) = ev.current_target() {
        if let Ok(element) = target.dyn_into::<web_sys::Element>() {
            let _ = element.set_pointer_capture(ev.pointer_id());
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn try_set_pointer_capture(_: &web_sys::PointerEvent) {}

#[component]
pub(super) fn DesktopWindow(window_id: WindowId, drag: RwSignal<Option<WindowDrag>>) -> impl IntoView {
    let runtime = use_desktop_runtime();

    let window = create_memo({
        let window_id = window_id.clone();
        move |_| runtime.state.with(|state| state.window(&window_id).cloned())
    });

    let focus = {
        let window_id = window_id.clone();
        move |_| {
            let should_focus = window
                .get_untracked()
                .map(|w| !w.is_focused || w.minimized)
                .unwrap_or(false);
            if should_focus {
                runtime.dispatch_action(DesktopAction::FocusWindow {
                    window_id: window_id.clone(),
                });
            }
        }
    };
    let minimize = {
        let window_id = window_id.clone();
        move |ev: web_sys::MouseEvent| {
            stop_mouse_event(&ev);
            runtime.dispatch_action(DesktopAction::MinimizeWindow {
                window_id: window_id.clone(),
            });
        }
    };
    let close = {
        let window_id = window_id.clone();
        move |ev: web_sys::MouseEvent| {
            stop_mouse_event(&ev);
            runtime.dispatch_action(DesktopAction::CloseWindow {
                window_id: window_id.clone(),
            });
        }
    };
    let begin_move = {
        let window_id = window_id.clone();
        move |ev: web_sys::PointerEvent| {
            if ev.button() != 0 {
                return;
            }
            let Some(win) = window.get_untracked() else {
                return;
            };
            try_set_pointer_capture(&ev);
            ev.prevent_default();
            drag.set(Some(WindowDrag {
                window_id: window_id.clone(),
                pointer_x: ev.client_x(),
                pointer_y: ev.client_y(),
                origin: win.rect,
                preview: win.rect,
            }));
        }
    };

    let rect = {
        let window_id = window_id.clone();
        move || {
            drag.with(|drag| {
                drag.as_ref()
                    .filter(|active| active.window_id == window_id)
                    .map(|active| active.preview)
            })
            .or_else(|| window.with(|w| w.as_ref().map(|w| w.rect)))
            .unwrap_or_default()
        }
    };
    let style = move || {
        let rect = rect();
        let z_index = window.with(|w| w.as_ref().map(|w| w.z_index).unwrap_or(0));
        format!(
            "left:{}px;top:{}px;width:{}px;height:{}px;z-index:{};",
            rect.x, rect.y, rect.w, rect.h, z_index
        )
    };
    let class = move || {
        window.with(|w| match w {
            Some(w) if w.minimized => "desktop-window minimized",
            Some(w) if w.is_focused => "desktop-window focused",
            _ => "desktop-window",
        })
    };
    let title = move || window.with(|w| w.as_ref().map(|w| w.title.clone()).unwrap_or_default());
    let icon = move || window.with(|w| w.as_ref().map(|w| app_icon_glyph(&w.icon_id)).unwrap_or(""));

    view! {
        <section
            class=class
            style=style
            on:pointerdown=focus
            role="dialog"
            aria-label=title
        >
            <header class="titlebar" on:pointerdown=begin_move>
                <div class="titlebar-title">
                    <span class="titlebar-app-icon" aria-hidden="true">{icon}</span>
                    <span>{title}</span>
                </div>
                <div class="titlebar-controls">
                    <button
                        aria-label="Minimize window"
                        on:pointerdown=move |ev: web_sys::PointerEvent| ev.stop_propagation()
                        on:click=minimize
                    >
                        "–"
                    </button>
                    <button
                        aria-label="Close window"
                        on:pointerdown=move |ev: web_sys::PointerEvent| ev.stop_propagation()
                        on:click=close
                    >
                        "×"
                    </button>
                </div>
            </header>
            <div class="window-body">
                <WindowBody window_id=window_id />
            </div>
        </section>
    }
}

#[component]
fn WindowBody(window_id: WindowId) -> impl IntoView {
    let runtime = use_desktop_runtime();
    let app_id = runtime
        .state
        .with_untracked(|state| state.window(&window_id).map(|w| w.app_id.clone()));

    match app_id.as_ref().map(|id| id.as_str()) {
        Some(TIMER_APP_ID) => view! { <TimerView /> }.into_view(),
        Some(AMBIENCE_APP_ID) => view! { <AmbienceView /> }.into_view(),
        Some(MUSIC_APP_ID) => view! { <MusicView /> }.into_view(),
        Some(BOOKMARKS_APP_ID) => view! { <BookmarksView /> }.into_view(),
        Some(NOTEPAD_APP_ID) => view! { <NotepadView window_id=window_id /> }.into_view(),
        Some(SETTINGS_APP_ID) => view! { <SettingsView /> }.into_view(),
        Some(other) => {
            logging::warn!("no view registered for `{other}`");
            view! { <p>"This app has no view."</p> }.into_view()
        }
        None => view! { <p>"Closed"</p> }.into_view(),
    }
}
