//! Browser tab title derived from timer and music state.

use std::{cell::RefCell, rc::Rc};

use desktop_app_contract::ApplicationId;
use platform_host::DocumentTitleService;

use crate::{
    features::{music::MusicState, timer::TimerState},
    model::DesktopState,
    timer::TimerPhase,
};

/// Product name used as the idle title and title suffix.
pub const PRODUCT_NAME: &str = "Cozy Desk";
/// Title shown while a completed timer is unacknowledged.
pub const TIME_IS_UP_TITLE: &str = "⏰ Time is up!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Where an app's window currently stands on the desktop.
pub struct WindowPresence {
    pub open: bool,
    pub minimized: bool,
    pub focused: bool,
}

impl WindowPresence {
    /// Presence of the first window presenting `app_id`.
    pub fn for_app(state: &DesktopState, app_id: &ApplicationId) -> Self {
        state
            .windows
            .iter()
            .find(|window| window.app_id == *app_id)
            .map(|window| Self {
                open: true,
                minimized: window.minimized,
                focused: window.is_focused,
            })
            .unwrap_or_default()
    }
}

/// Everything the title depends on.
pub struct TitleInputs<'a> {
    pub timer: &'a TimerState,
    pub timer_phase: TimerPhase,
    pub timer_window: WindowPresence,
    pub music: &'a MusicState,
    pub music_window: WindowPresence,
}

/// `MM:SS`, with minutes allowed past 59.
pub fn format_mm_ss(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

pub fn compute_document_title(inputs: &TitleInputs<'_>) -> String {
    if inputs.timer_phase == TimerPhase::Completed {
        return TIME_IS_UP_TITLE.to_string();
    }

    let timer_hidden = inputs.timer_window.minimized || !inputs.timer_window.focused;
    if inputs.timer.is_running && timer_hidden {
        return format!(
            "({}) {} - {PRODUCT_NAME}",
            format_mm_ss(inputs.timer.time_remaining),
            inputs.timer.display_title()
        );
    }

    let music_open = inputs.music.is_window_open && inputs.music_window.open;
    if inputs.music.is_playing && (!music_open || inputs.music_window.minimized) {
        if let Some(song) = inputs.music.current_song() {
            return format!("▶️ {} - {PRODUCT_NAME}", song.title);
        }
    }

    PRODUCT_NAME.to_string()
}

/// Writes the tab title only when it changes.
pub struct DocumentTitleCoordinator {
    service: Rc<dyn DocumentTitleService>,
    last_written: RefCell<Option<String>>,
}

impl DocumentTitleCoordinator {
    pub fn new(service: Rc<dyn DocumentTitleService>) -> Self {
        Self {
            service,
            last_written: RefCell::new(None),
        }
    }

    /// Returns whether the title was written.
    pub fn apply(&self, title: &str) -> bool {
        let mut last = self.last_written.borrow_mut();
        if last.as_deref() == Some(title) {
            return false;
        }
        self.service.set_title(title);
        *last = Some(title.to_string());
        true
    }
}
