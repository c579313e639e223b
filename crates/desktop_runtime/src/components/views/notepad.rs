use desktop_app_contract::WindowId;
use serde_json::{json, Value};

use super::*;
use crate::reducer::DesktopAction;

fn notepad_text(app_state: &Value) -> String {
    app_state
        .get("text")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[component]
pub(crate) fn NotepadView(window_id: WindowId) -> impl IntoView {
    let runtime = use_desktop_runtime();

    let text = {
        let window_id = window_id.clone();
        move || {
            runtime.state.with(|state| {
                state
                    .window(&window_id)
                    .map(|w| notepad_text(&w.app_state))
                    .unwrap_or_default()
            })
        }
    };

    view! {
        <textarea
            class="app-field notepad-text"
            aria-label="Note"
            spellcheck="false"
            prop:value=text
            on:input=move |ev| {
                runtime.dispatch_action(DesktopAction::SetWindowAppState {
                    window_id: window_id.clone(),
                    app_state: json!({ "text": event_target_value(&ev) }),
                });
            }
        ></textarea>
    }
}
