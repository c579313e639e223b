//! Per-app window bodies. Views read feature signals and write back through the atoms.

mod ambience;
mod bookmarks;
mod music;
mod notepad;
mod settings;
mod timer;

use leptos::*;

use super::use_desktop_runtime;

pub(super) use self::{
    ambience::AmbienceView, bookmarks::BookmarksView, music::MusicView, notepad::NotepadView,
    settings::SettingsView, timer::TimerView,
};

/// Parses a `0..=100` range input into a `0.0..=1.0` volume.
fn slider_volume(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .map(|percent| (percent / 100.0).clamp(0.0, 1.0))
}

fn volume_percent(volume: f64) -> String {
    format!("{}", (volume * 100.0).round() as i64)
}
