//! Shared window-manager transition helpers used by the desktop reducer.

use desktop_app_contract::{ApplicationId, WindowDefaults, WindowId};

use crate::model::{DesktopState, WindowRect, WINDOW_CASCADE_STEP};

/// Minimum allowed managed window width.
pub const MIN_WINDOW_WIDTH: i32 = 220;
/// Minimum allowed managed window height.
pub const MIN_WINDOW_HEIGHT: i32 = 140;
const CASCADE_SLOTS: i32 = 8;

/// Focuses and raises `window_id`, ensuring it is the top/focused non-minimized window.
///
/// Returns `true` when the window exists.
pub fn focus_window_internal(state: &mut DesktopState, window_id: &WindowId) -> bool {
    let Some(index) = state.windows.iter().position(|w| w.id == *window_id) else {
        return false;
    };

    let already_focused_top = index + 1 == state.windows.len()
        && state
            .windows
            .get(index)
            .map(|w| w.is_focused && !w.minimized)
            .unwrap_or(false);
    if already_focused_top {
        return true;
    }

    for window in &mut state.windows {
        window.is_focused = false;
    }
    let mut window = state.windows.remove(index);
    window.is_focused = true;
    window.minimized = false;
    state.windows.push(window);
    normalize_window_stack(state);
    true
}

/// Normalizes z-index ordering and focus invariants for all managed windows.
pub fn normalize_window_stack(state: &mut DesktopState) {
    let mut has_focused = false;
    for (idx, window) in state.windows.iter_mut().enumerate() {
        window.z_index = (idx + 1) as u32;
        if window.minimized {
            window.is_focused = false;
        }
        if window.is_focused {
            if has_focused {
                window.is_focused = false;
            } else {
                has_focused = true;
            }
        }
    }

    if !has_focused {
        if let Some(last_non_minimized) = state.windows.iter_mut().rev().find(|w| !w.minimized) {
            last_non_minimized.is_focused = true;
        }
    }
}

/// Topmost window presenting `app_id`, if any.
pub fn preferred_window_for_app(state: &DesktopState, app_id: &ApplicationId) -> Option<WindowId> {
    state
        .windows
        .iter()
        .rev()
        .find(|w| w.app_id == *app_id)
        .map(|w| w.id.clone())
}

/// Initial rect for a new window, cascaded by how many windows are already open.
pub fn cascade_rect(state: &DesktopState, defaults: WindowDefaults) -> WindowRect {
    let slot = (state.windows.len() as i32) % CASCADE_SLOTS;
    WindowRect {
        w: defaults.width,
        h: defaults.height,
        ..WindowRect::default()
    }
    .offset(slot * WINDOW_CASCADE_STEP, slot * WINDOW_CASCADE_STEP)
    .clamped_min(MIN_WINDOW_WIDTH, MIN_WINDOW_HEIGHT)
}
