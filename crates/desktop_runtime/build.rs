use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WindowDefaults {
    width: i32,
    height: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AppManifest {
    #[serde(skip_serializing)]
    schema_version: u32,
    app_id: String,
    display_name: String,
    icon_id: String,
    single_instance: bool,
    show_in_launcher: bool,
    window_defaults: WindowDefaults,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AmbienceSound {
    id: String,
    title: String,
    src: String,
}

#[derive(Debug, Deserialize)]
struct AmbienceCatalog {
    schema_version: u32,
    sounds: Vec<AmbienceSound>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SongSeed {
    title: String,
    url: String,
    #[serde(default)]
    artist: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaylistCatalog {
    schema_version: u32,
    songs: Vec<SongSeed>,
}

fn app_manifest_paths(root: &Path) -> Vec<PathBuf> {
    let dir = root.join("manifests").join("apps");
    println!("cargo:rerun-if-changed={}", dir.display());
    let mut paths: Vec<PathBuf> = fs::read_dir(&dir)
        .unwrap_or_else(|err| panic!("failed to read {}: {err}", dir.display()))
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    paths.sort();
    paths
}

fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> T {
    println!("cargo:rerun-if-changed={}", path.display());
    let raw = fs::read_to_string(path)
        .unwrap_or_else(|err| panic!("failed to read {}: {err}", path.display()));
    toml::from_str(&raw).unwrap_or_else(|err| panic!("failed to parse {}: {err}", path.display()))
}

fn is_dotted_id(raw: &str) -> bool {
    let parts: Vec<&str> = raw.split('.').collect();
    parts.len() >= 2
        && parts.iter().all(|part| {
            part.starts_with(|c: char| c.is_ascii_lowercase())
                && !part.ends_with('-')
                && part
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        })
}

fn load_app_manifests(root: &Path) -> Vec<AppManifest> {
    let mut manifests = Vec::<AppManifest>::new();
    let mut seen = BTreeSet::new();

    for path in app_manifest_paths(root) {
        let manifest: AppManifest = read_toml(&path);
        if manifest.schema_version != 1 {
            panic!(
                "manifest schema mismatch in {}: expected 1 found {}",
                path.display(),
                manifest.schema_version
            );
        }
        if !is_dotted_id(&manifest.app_id) {
            panic!("invalid app_id `{}` in {}", manifest.app_id, path.display());
        }
        if !seen.insert(manifest.app_id.clone()) {
            panic!("duplicate app_id `{}` in {}", manifest.app_id, path.display());
        }
        if manifest.window_defaults.width <= 0 || manifest.window_defaults.height <= 0 {
            panic!("window_defaults must be positive in {}", path.display());
        }
        manifests.push(manifest);
    }

    manifests.sort_by(|a, b| a.app_id.cmp(&b.app_id));
    manifests
}

fn load_ambience_sounds(root: &Path) -> Vec<AmbienceSound> {
    let path = root.join("manifests").join("ambience_sounds.toml");
    let catalog: AmbienceCatalog = read_toml(&path);
    if catalog.schema_version != 1 {
        panic!("ambience catalog schema mismatch in {}", path.display());
    }
    if catalog.sounds.is_empty() {
        panic!("ambience catalog {} declares no sounds", path.display());
    }
    let mut seen = BTreeSet::new();
    for sound in &catalog.sounds {
        if !seen.insert(sound.id.clone()) {
            panic!("duplicate ambience sound id `{}`", sound.id);
        }
    }
    catalog.sounds
}

fn load_default_playlist(root: &Path) -> Vec<SongSeed> {
    let path = root.join("manifests").join("default_playlist.toml");
    let catalog: PlaylistCatalog = read_toml(&path);
    if catalog.schema_version != 1 {
        panic!("playlist schema mismatch in {}", path.display());
    }
    catalog.songs
}

fn main() {
    let crate_root = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").expect("manifest dir"));
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").expect("OUT_DIR"));

    let manifests = load_app_manifests(&crate_root);
    let json = serde_json::to_string_pretty(&manifests).expect("serialize app manifest catalog");
    let generated = format!(
        "/// Build-time generated app manifest catalog JSON.\n\
pub const APP_MANIFEST_CATALOG_JSON: &str = r##\"{}\"##;\n",
        json
    );
    let out_file = out_dir.join("app_catalog_generated.rs");
    fs::write(&out_file, generated)
        .unwrap_or_else(|err| panic!("failed to write {}: {err}", out_file.display()));

    let sounds = load_ambience_sounds(&crate_root);
    let songs = load_default_playlist(&crate_root);
    let generated = format!(
        "/// Build-time generated ambience sound catalog JSON.\n\
pub const AMBIENCE_SOUND_CATALOG_JSON: &str = r##\"{}\"##;\n\
/// Build-time generated default playlist JSON.\n\
pub const DEFAULT_PLAYLIST_JSON: &str = r##\"{}\"##;\n",
        serde_json::to_string_pretty(&sounds).expect("serialize ambience catalog"),
        serde_json::to_string_pretty(&songs).expect("serialize default playlist"),
    );
    let out_file = out_dir.join("media_catalog_generated.rs");
    fs::write(&out_file, generated)
        .unwrap_or_else(|err| panic!("failed to write {}: {err}", out_file.display()));
}
