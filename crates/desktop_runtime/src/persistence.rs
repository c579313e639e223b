//! Desktop layout persistence for boot hydration.

use leptos::logging;
use platform_host::{load_json_with, save_json_with, DurableStore};

use crate::model::{DesktopSnapshot, DesktopState, DESKTOP_LAYOUT_SCHEMA_VERSION};

/// Storage key of the persisted desktop layout.
pub const LAYOUT_KEY: &str = "cozydesk.layout.v1";

fn migrate_desktop_snapshot(snapshot: DesktopSnapshot) -> Option<DesktopSnapshot> {
    match snapshot.schema_version {
        DESKTOP_LAYOUT_SCHEMA_VERSION => Some(snapshot),
        other => {
            logging::warn!("discarding desktop layout with unsupported schema {other}");
            None
        }
    }
}

/// Loads the boot snapshot, if one was persisted and is still readable.
///
/// When the user turned off restore-on-boot the preferences survive but the windows do not.
pub fn load_boot_snapshot(store: &dyn DurableStore) -> Option<DesktopSnapshot> {
    let snapshot = match load_json_with::<_, DesktopSnapshot>(store, LAYOUT_KEY) {
        Ok(snapshot) => snapshot?,
        Err(err) => {
            logging::warn!("desktop layout load failed: {err}");
            return None;
        }
    };
    let mut snapshot = migrate_desktop_snapshot(snapshot)?;
    if !snapshot.preferences.restore_on_boot {
        snapshot.windows.clear();
    }
    Some(snapshot)
}

/// Persists the current layout.
///
/// # Errors
///
/// Returns the store error when the write fails.
pub fn persist_layout_snapshot(store: &dyn DurableStore, state: &DesktopState) -> Result<(), String> {
    save_json_with(store, LAYOUT_KEY, &state.snapshot())
}
