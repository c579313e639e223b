//! App registry and bundled media catalogs, compiled in from `manifests/` by `build.rs`.

use std::sync::OnceLock;

use desktop_app_contract::{AppManifest, ApplicationId};
use leptos::logging;
use serde::{de::DeserializeOwned, Deserialize};

include!(concat!(env!("OUT_DIR"), "/app_catalog_generated.rs"));
include!(concat!(env!("OUT_DIR"), "/media_catalog_generated.rs"));

/// Canonical id of the focus timer app.
pub const TIMER_APP_ID: &str = "app.timer";
/// Canonical id of the ambience player app.
pub const AMBIENCE_APP_ID: &str = "app.ambience";
/// Canonical id of the music player app.
pub const MUSIC_APP_ID: &str = "app.music-player";
/// Canonical id of the bookmarks app.
pub const BOOKMARKS_APP_ID: &str = "app.bookmarks";
/// Canonical id of the notepad app.
pub const NOTEPAD_APP_ID: &str = "app.notepad";
/// Canonical id of the settings app.
pub const SETTINGS_APP_ID: &str = "app.settings";

pub fn timer_app_id() -> ApplicationId {
    ApplicationId::trusted(TIMER_APP_ID)
}

pub fn ambience_app_id() -> ApplicationId {
    ApplicationId::trusted(AMBIENCE_APP_ID)
}

pub fn music_app_id() -> ApplicationId {
    ApplicationId::trusted(MUSIC_APP_ID)
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
/// One bundled ambience loop.
pub struct AmbienceSound {
    pub id: String,
    pub title: String,
    pub src: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
/// One bundled playlist entry used to seed a fresh music player.
pub struct SongSeed {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub artist: Option<String>,
}

fn parse_catalog<T: DeserializeOwned>(name: &str, json: &str) -> Vec<T> {
    match serde_json::from_str(json) {
        Ok(entries) => entries,
        Err(err) => {
            logging::warn!("generated {name} catalog failed to parse: {err}");
            Vec::new()
        }
    }
}

/// Returns every registered app manifest, sorted by app id.
pub fn app_registry() -> &'static [AppManifest] {
    static CATALOG: OnceLock<Vec<AppManifest>> = OnceLock::new();
    CATALOG.get_or_init(|| parse_catalog("app manifest", APP_MANIFEST_CATALOG_JSON))
}

pub fn app_manifest(app_id: &ApplicationId) -> Option<&'static AppManifest> {
    app_registry().iter().find(|entry| entry.app_id == *app_id)
}

/// Looks up a manifest by raw id string.
pub fn app_manifest_by_str(raw: &str) -> Option<&'static AppManifest> {
    app_registry()
        .iter()
        .find(|entry| entry.app_id.as_str() == raw)
}

/// Apps listed in the start menu, ordered by display name.
pub fn launcher_apps() -> Vec<&'static AppManifest> {
    let mut apps: Vec<_> = app_registry()
        .iter()
        .filter(|entry| entry.show_in_launcher)
        .collect();
    apps.sort_by(|a, b| a.display_name.cmp(&b.display_name));
    apps
}

pub fn ambience_sounds() -> &'static [AmbienceSound] {
    static CATALOG: OnceLock<Vec<AmbienceSound>> = OnceLock::new();
    CATALOG.get_or_init(|| parse_catalog("ambience sound", AMBIENCE_SOUND_CATALOG_JSON))
}

pub fn default_playlist() -> &'static [SongSeed] {
    static CATALOG: OnceLock<Vec<SongSeed>> = OnceLock::new();
    CATALOG.get_or_init(|| parse_catalog("default playlist", DEFAULT_PLAYLIST_JSON))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_contains_every_bundled_app() {
        for raw in [
            TIMER_APP_ID,
            AMBIENCE_APP_ID,
            MUSIC_APP_ID,
            BOOKMARKS_APP_ID,
            NOTEPAD_APP_ID,
            SETTINGS_APP_ID,
        ] {
            let manifest = app_manifest_by_str(raw).unwrap_or_else(|| panic!("{raw} registered"));
            assert!(ApplicationId::new(manifest.app_id.as_str()).is_ok());
            assert!(manifest.window_defaults.width > 0);
        }
        assert!(app_manifest_by_str("app.unknown").is_none());
    }

    #[test]
    fn singleton_flags_follow_manifests() {
        assert!(app_manifest(&timer_app_id()).is_some_and(|m| m.single_instance));
        assert!(app_manifest_by_str(NOTEPAD_APP_ID).is_some_and(|m| !m.single_instance));
    }

    #[test]
    fn media_catalogs_are_populated() {
        assert!(!ambience_sounds().is_empty());
        assert!(!default_playlist().is_empty());
        assert!(ambience_sounds().iter().all(|s| s.src.starts_with('/')));
    }
}
