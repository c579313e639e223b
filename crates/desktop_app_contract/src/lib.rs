//! Shared contract types between the desktop window manager runtime and its managed apps.
//!
//! The runtime identifies apps by canonical dotted [`ApplicationId`] values and windows by
//! string [`WindowId`] values. Singleton app state records embed a [`WindowAssociation`] that
//! binds them to the one window currently presenting them.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

use serde::{Deserialize, Serialize};

/// Stable identifier for an app package/module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(String);

impl ApplicationId {
    /// Returns an app identifier when `raw` conforms to the `segment.segment...` policy.
    pub fn new(raw: impl Into<String>) -> Result<Self, String> {
        let raw = raw.into();
        if is_valid_application_id(&raw) {
            Ok(Self(raw))
        } else {
            Err(format!(
                "invalid application id `{raw}`; expected namespaced dotted segments"
            ))
        }
    }

    /// Returns the string form of the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Creates an id without validation for compile-time/runtime trusted constants.
    pub fn trusted(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the last dotted segment (`app.timer` -> `timer`).
    pub fn slug(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }
}

impl std::fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn is_valid_application_id(raw: &str) -> bool {
    if raw.is_empty() || raw.len() > 120 {
        return false;
    }

    let mut count = 0usize;
    for part in raw.split('.') {
        count += 1;
        if part.is_empty() || part.len() > 32 {
            return false;
        }
        let bytes = part.as_bytes();
        if !bytes[0].is_ascii_lowercase() {
            return false;
        }
        if !bytes
            .iter()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-')
        {
            return false;
        }
        if part.ends_with('-') {
            return false;
        }
    }

    count >= 2
}

/// Stable identifier for a runtime-managed window.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(String);

impl WindowId {
    /// Wraps a raw window id.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Window id used by single-instance apps (`timer-instance`).
    pub fn single_instance(app_id: &ApplicationId) -> Self {
        Self(format!("{}-instance", app_id.slug()))
    }

    /// Window id for the `seq`-th window of a multi-instance app (`notepad-3`).
    pub fn sequenced(app_id: &ApplicationId, seq: u64) -> Self {
        Self(format!("{}-{seq}", app_id.slug()))
    }

    /// Returns the string form of the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WindowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Lifecycle events emitted by the desktop window manager.
pub enum AppLifecycleEvent {
    /// App view has been mounted into a managed window.
    Mounted,
    /// Window became focused.
    Focused,
    /// Window lost focus.
    Blurred,
    /// Window was minimized.
    Minimized,
    /// Window was restored from minimized state.
    Restored,
    /// Window close sequence completed.
    Closed,
}

impl AppLifecycleEvent {
    /// Returns a stable string token for persistence/debugging hooks.
    pub const fn token(self) -> &'static str {
        match self {
            Self::Mounted => "mounted",
            Self::Focused => "focused",
            Self::Blurred => "blurred",
            Self::Minimized => "minimized",
            Self::Restored => "restored",
            Self::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Page-level transitions the lifecycle core reacts to.
pub enum PageLifecycleEvent {
    /// The tab became visible.
    Visible,
    /// The tab was backgrounded.
    Hidden,
    /// The page is unloading.
    Unload,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Binding between a singleton app state record and the window presenting it.
///
/// `is_active` implies `window_id.is_some()`.
pub struct WindowAssociation {
    /// Window currently presenting the app.
    #[serde(default)]
    pub window_id: Option<WindowId>,
    /// Whether the app is open in a window.
    #[serde(default)]
    pub is_active: bool,
    /// Whether the presenting window is minimized.
    #[serde(default)]
    pub is_minimized: bool,
}

impl WindowAssociation {
    /// Association for a freshly opened window.
    pub fn open(window_id: WindowId) -> Self {
        Self {
            window_id: Some(window_id),
            is_active: true,
            is_minimized: false,
        }
    }

    /// Returns whether `window_id` currently holds this association.
    pub fn is_held_by(&self, window_id: &WindowId) -> bool {
        self.is_active && self.window_id.as_ref() == Some(window_id)
    }

    /// Returns whether the association invariant holds.
    pub fn is_consistent(&self) -> bool {
        !self.is_active || self.window_id.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Default window geometry declared by an app manifest.
pub struct WindowDefaults {
    /// Default width in pixels.
    pub width: i32,
    /// Default height in pixels.
    pub height: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Manifest-backed registration metadata for a runtime app entry.
pub struct AppManifest {
    /// Canonical app id.
    pub app_id: ApplicationId,
    /// Human-readable display name.
    pub display_name: String,
    /// Icon token rendered by the shell.
    pub icon_id: String,
    /// Whether only one instance should be open.
    pub single_instance: bool,
    /// Launcher visibility flag.
    pub show_in_launcher: bool,
    /// Default window geometry.
    pub window_defaults: WindowDefaults,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn application_id_requires_dotted_namespaces() {
        assert!(ApplicationId::new("app.timer").is_ok());
        assert!(ApplicationId::new("app.music-player").is_ok());
        assert!(ApplicationId::new("timer").is_err());
        assert!(ApplicationId::new("App.timer").is_err());
        assert!(ApplicationId::new("app..timer").is_err());
        assert!(ApplicationId::new("app.timer-").is_err());
    }

    #[test]
    fn window_ids_derive_from_app_slug() {
        let timer = ApplicationId::trusted("app.timer");
        assert_eq!(WindowId::single_instance(&timer).as_str(), "timer-instance");
        let notepad = ApplicationId::trusted("app.notepad");
        assert_eq!(WindowId::sequenced(&notepad, 3).as_str(), "notepad-3");
    }

    #[test]
    fn association_serializes_with_camel_case_keys() {
        let association = WindowAssociation::open(WindowId::new("timer-instance"));
        let value = serde_json::to_value(&association).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({
                "windowId": "timer-instance",
                "isActive": true,
                "isMinimized": false,
            })
        );
        assert!(association.is_consistent());
        assert!(association.is_held_by(&WindowId::new("timer-instance")));
        assert!(!association.is_held_by(&WindowId::new("timer-2")));
    }

    #[test]
    fn default_association_is_idle_and_consistent() {
        let association = WindowAssociation::default();
        assert!(!association.is_active);
        assert!(association.window_id.is_none());
        assert!(association.is_consistent());
    }
}
