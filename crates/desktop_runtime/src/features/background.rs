//! Desktop background settings and the bundled wallpaper presets.

use serde::{Deserialize, Serialize};

/// Durable storage key for [`BackgroundSettings`].
pub const BACKGROUND_KEY: &str = "cozydesk.background.v1";
/// Upper bound for the dim overlay.
pub const MAX_DIM_PERCENT: u8 = 80;
/// Upper bound for the background blur.
pub const MAX_BLUR_PX: u8 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallpaperPreset {
    pub id: &'static str,
    pub label: &'static str,
    /// CSS `background` value.
    pub css: &'static str,
}

/// Wallpaper catalog. The first entry is the fallback.
pub const WALLPAPER_PRESETS: &[WallpaperPreset] = &[
    WallpaperPreset {
        id: "dusk-gradient",
        label: "Dusk",
        css: "linear-gradient(160deg, #2b2d42 0%, #8d5a97 55%, #f4a261 100%)",
    },
    WallpaperPreset {
        id: "forest-mist",
        label: "Forest mist",
        css: "linear-gradient(180deg, #1b3a2f 0%, #4f7c63 60%, #c9d8c5 100%)",
    },
    WallpaperPreset {
        id: "rainy-window",
        label: "Rainy window",
        css: "linear-gradient(200deg, #1d2b3a 0%, #3e5c76 50%, #748cab 100%)",
    },
    WallpaperPreset {
        id: "paper",
        label: "Paper",
        css: "#efe6d8",
    },
];

/// Resolves a wallpaper id, falling back to the first preset.
pub fn wallpaper_preset(id: &str) -> WallpaperPreset {
    WALLPAPER_PRESETS
        .iter()
        .copied()
        .find(|preset| preset.id == id)
        .unwrap_or(WALLPAPER_PRESETS[0])
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackgroundSettings {
    pub wallpaper_id: String,
    pub dim_percent: u8,
    pub blur_px: u8,
}

impl Default for BackgroundSettings {
    fn default() -> Self {
        Self {
            wallpaper_id: WALLPAPER_PRESETS[0].id.to_string(),
            dim_percent: 20,
            blur_px: 0,
        }
    }
}

impl BackgroundSettings {
    /// Brings a stored record back into range.
    pub fn loaded(stored: Self) -> Self {
        Self {
            wallpaper_id: wallpaper_preset(&stored.wallpaper_id).id.to_string(),
            dim_percent: stored.dim_percent.min(MAX_DIM_PERCENT),
            blur_px: stored.blur_px.min(MAX_BLUR_PX),
        }
    }

    pub fn with_wallpaper(&self, id: &str) -> Self {
        Self {
            wallpaper_id: wallpaper_preset(id).id.to_string(),
            ..self.clone()
        }
    }

    pub fn with_dim_percent(&self, percent: u8) -> Self {
        Self {
            dim_percent: percent.min(MAX_DIM_PERCENT),
            ..self.clone()
        }
    }

    pub fn with_blur_px(&self, blur: u8) -> Self {
        Self {
            blur_px: blur.min(MAX_BLUR_PX),
            ..self.clone()
        }
    }

    pub fn preset(&self) -> WallpaperPreset {
        wallpaper_preset(&self.wallpaper_id)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn unknown_wallpaper_falls_back_to_first_preset() {
        let settings = BackgroundSettings::default().with_wallpaper("retro-teal");
        assert_eq!(settings.wallpaper_id, WALLPAPER_PRESETS[0].id);
    }

    #[test]
    fn dim_and_blur_are_clamped() {
        let settings = BackgroundSettings::default()
            .with_dim_percent(95)
            .with_blur_px(64);
        assert_eq!(settings.dim_percent, MAX_DIM_PERCENT);
        assert_eq!(settings.blur_px, MAX_BLUR_PX);

        let loaded = BackgroundSettings::loaded(BackgroundSettings {
            wallpaper_id: "gone".to_string(),
            dim_percent: 200,
            blur_px: 3,
        });
        assert_eq!(
            loaded,
            BackgroundSettings {
                wallpaper_id: "dusk-gradient".to_string(),
                dim_percent: 80,
                blur_px: 3,
            }
        );
    }
}
