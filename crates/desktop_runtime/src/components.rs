//! Desktop shell UI composition: wallpaper, window layer, and taskbar.

mod taskbar;
mod views;
mod window;

use leptos::*;

use self::{taskbar::Taskbar, window::DesktopWindow};

use crate::{
    model::{DesktopState, WindowRecord, WindowRect},
    reducer::DesktopAction,
};
use desktop_app_contract::WindowId;

pub use crate::runtime_context::{
    use_desktop_runtime, DesktopProvider, DesktopRuntimeContext, FeatureSignals,
};

const TASKBAR_HEIGHT_PX: i32 = 44;

/// Glyph rendered for a manifest `icon_id`.
fn app_icon_glyph(icon_id: &str) -> &'static str {
    match icon_id {
        "timer" => "⏱",
        "ambience" => "🌧",
        "music" => "🎵",
        "bookmark" => "🔖",
        "notepad" => "📝",
        "settings" => "⚙",
        _ => "▫",
    }
}

fn stop_mouse_event(ev: &web_sys::MouseEvent) {
    ev.prevent_default();
    ev.stop_propagation();
}

/// Windows in stacking order, bottom first.
fn ordered_taskbar_windows(state: &DesktopState) -> Vec<WindowRecord> {
    let mut windows = state.windows.clone();
    windows.sort_by(|a, b| (a.z_index, &a.id).cmp(&(b.z_index, &b.id)));
    windows
}

fn taskbar_window_aria_label(win: &WindowRecord) -> String {
    let mut parts = vec![win.title.clone()];
    if win.is_focused && !win.minimized {
        parts.push("focused".to_string());
    }
    if win.minimized {
        parts.push("minimized".to_string());
    }
    parts.join(", ")
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Titlebar drag in progress. The rect is committed once on pointer release.
struct WindowDrag {
    window_id: WindowId,
    pointer_x: i32,
    pointer_y: i32,
    origin: WindowRect,
    preview: WindowRect,
}

impl WindowDrag {
    fn moved_to(&self, pointer_x: i32, pointer_y: i32) -> Self {
        Self {
            preview: self
                .origin
                .offset(pointer_x - self.pointer_x, pointer_y - self.pointer_y),
            ..self.clone()
        }
    }
}

#[component]
/// Renders the full desktop shell UI.
pub fn DesktopShell() -> impl IntoView {
    let runtime = use_desktop_runtime();
    let state = runtime.state;
    let background = runtime.features.background;
    let drag = create_rw_signal(None::<WindowDrag>);

    let escape_listener = window_event_listener(ev::keydown, move |ev| {
        if ev.default_prevented() || ev.key() != "Escape" {
            return;
        }
        if state.get_untracked().start_menu_open {
            ev.prevent_default();
            runtime.dispatch_action(DesktopAction::CloseStartMenu);
        }
    });
    on_cleanup(move || escape_listener.remove());

    let on_pointer_move = move |ev: web_sys::PointerEvent| {
        if drag.get_untracked().is_some() {
            drag.update(|current| {
                if let Some(active) = current {
                    *active = active.moved_to(ev.client_x(), ev.client_y());
                }
            });
        }
    };
    let on_pointer_end = move |_| {
        if let Some(done) = drag.get_untracked() {
            drag.set(None);
            if done.preview != done.origin {
                runtime.dispatch_action(DesktopAction::SetWindowRect {
                    window_id: done.window_id,
                    rect: done.preview,
                });
            }
        }
    };

    let wallpaper_style = move || {
        let settings = background.get();
        format!(
            "background:{};filter:blur({}px);",
            settings.preset().css,
            settings.blur_px
        )
    };
    let dim_style = move || {
        format!(
            "background:rgba(0,0,0,{:.2});",
            f64::from(background.get().dim_percent) / 100.0
        )
    };

    view! {
        <div
            id="desktop-shell-root"
            class="desktop-shell"
            tabindex="-1"
            on:pointermove=on_pointer_move
            on:pointerup=on_pointer_end
            on:pointercancel=on_pointer_end
        >
            <div class="desktop-wallpaper" aria-hidden="true" style=wallpaper_style></div>
            <div class="desktop-dim" aria-hidden="true" style=dim_style></div>
            <div
                class="desktop-dismiss-layer"
                on:mousedown=move |_| runtime.dispatch_action(DesktopAction::CloseStartMenu)
            ></div>
            <div class="desktop-window-layer">
                <For
                    each=move || state.get().windows
                    key=|win| win.id.clone()
                    let:win
                >
                    <DesktopWindow window_id=win.id drag=drag />
                </For>
            </div>
            <Taskbar />
        </div>
    }
}
