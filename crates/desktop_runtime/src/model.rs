use desktop_app_contract::{ApplicationId, WindowId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DESKTOP_LAYOUT_SCHEMA_VERSION: u32 = 1;
pub const DEFAULT_WINDOW_WIDTH: i32 = 420;
pub const DEFAULT_WINDOW_HEIGHT: i32 = 300;
/// Cascade step applied to each newly opened window.
pub const WINDOW_CASCADE_STEP: i32 = 28;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl WindowRect {
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }

    pub fn clamped_min(self, min_w: i32, min_h: i32) -> Self {
        Self {
            w: self.w.max(min_w),
            h: self.h.max(min_h),
            ..self
        }
    }
}

impl Default for WindowRect {
    fn default() -> Self {
        Self {
            x: 48,
            y: 48,
            w: DEFAULT_WINDOW_WIDTH,
            h: DEFAULT_WINDOW_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowRecord {
    pub id: WindowId,
    pub app_id: ApplicationId,
    pub title: String,
    pub icon_id: String,
    pub rect: WindowRect,
    pub z_index: u32,
    pub is_focused: bool,
    pub minimized: bool,
    /// Per-window app payload (notepad text); singleton apps keep their state in atoms.
    #[serde(default)]
    pub app_state: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesktopPreferences {
    pub restore_on_boot: bool,
    pub max_restore_windows: usize,
}

impl Default for DesktopPreferences {
    fn default() -> Self {
        Self {
            restore_on_boot: true,
            max_restore_windows: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesktopState {
    pub next_window_seq: u64,
    pub windows: Vec<WindowRecord>,
    pub start_menu_open: bool,
    pub preferences: DesktopPreferences,
}

impl Default for DesktopState {
    fn default() -> Self {
        Self {
            next_window_seq: 1,
            windows: Vec::new(),
            start_menu_open: false,
            preferences: DesktopPreferences::default(),
        }
    }
}

impl DesktopState {
    pub fn focused_window_id(&self) -> Option<WindowId> {
        self.windows
            .iter()
            .find(|w| w.is_focused)
            .map(|w| w.id.clone())
    }

    pub fn window(&self, window_id: &WindowId) -> Option<&WindowRecord> {
        self.windows.iter().find(|w| w.id == *window_id)
    }

    pub fn snapshot(&self) -> DesktopSnapshot {
        DesktopSnapshot {
            schema_version: DESKTOP_LAYOUT_SCHEMA_VERSION,
            preferences: self.preferences.clone(),
            windows: self.windows.clone(),
        }
    }

    /// Rebuilds state from a snapshot, keeping at most `max_restore_windows` of the topmost
    /// windows. Sequenced window ids continue after the highest restored sequence.
    pub fn from_snapshot(snapshot: DesktopSnapshot) -> Self {
        let mut state = Self {
            preferences: snapshot.preferences,
            ..Self::default()
        };
        let keep = state.preferences.max_restore_windows;
        let skip = snapshot.windows.len().saturating_sub(keep);
        state.windows = snapshot.windows.into_iter().skip(skip).collect();
        state.next_window_seq = state
            .windows
            .iter()
            .filter_map(|w| w.id.as_str().rsplit('-').next()?.parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            .saturating_add(1);
        state
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesktopSnapshot {
    pub schema_version: u32,
    pub preferences: DesktopPreferences,
    pub windows: Vec<WindowRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenWindowRequest {
    pub app_id: ApplicationId,
    pub title: Option<String>,
    pub icon_id: Option<String>,
    pub rect: Option<WindowRect>,
    pub app_state: Value,
}

impl OpenWindowRequest {
    pub fn new(app_id: ApplicationId) -> Self {
        Self {
            app_id,
            title: None,
            icon_id: None,
            rect: None,
            app_state: Value::Null,
        }
    }
}
