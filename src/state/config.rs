use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const MAX_RECENT_IMAGES: usize = 10;

/// Default margin for panel content (in virtual units, scaled by ui_scale)
pub const DEFAULT_PANEL_MARGIN: f32 = 8.0;

pub const MIN_UI_SCALE: f32 = 0.75;
pub const MAX_UI_SCALE: f32 = 2.0;
pub const UI_SCALE_STEP: f32 = 0.25;

const RECORDS_FILE_NAME: &str = "records.json";

pub fn default_ui_scale() -> f32 {
    1.0
}

pub fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

/// App configuration stored on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub recent_images: Vec<String>,
    #[serde(default = "default_ui_scale")]
    pub ui_scale: f32,
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,
    /// Overrides where the slicer records are kept
    #[serde(default)]
    pub records_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            recent_images: Vec::new(),
            ui_scale: default_ui_scale(),
            ffmpeg_path: default_ffmpeg_path(),
            records_file: None,
        }
    }
}

impl AppConfig {
    pub fn config_dir() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var("APPDATA")
                .ok()
                .map(|appdata| PathBuf::from(appdata).join("PixelSpriteSlicer"))
        }
        #[cfg(not(target_os = "windows"))]
        {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".config").join("pixel-sprite-slicer"))
        }
    }

    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.json"))
    }

    /// Location of the record store
    pub fn records_path(&self) -> Option<PathBuf> {
        match &self.records_file {
            Some(path) if !path.trim().is_empty() => Some(PathBuf::from(path)),
            _ => Self::config_dir().map(|dir| dir.join(RECORDS_FILE_NAME)),
        }
    }

    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| fs::read_to_string(path).ok())
            .map(|json| Self::from_json(&json))
            .unwrap_or_default()
    }

    /// Malformed configs fall back to defaults
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Self>(json) {
            Ok(mut config) => {
                config.ui_scale = config.ui_scale.clamp(MIN_UI_SCALE, MAX_UI_SCALE);
                config.recent_images.truncate(MAX_RECENT_IMAGES);
                config
            }
            Err(e) => {
                tracing::warn!("ignoring malformed config: {e}");
                Self::default()
            }
        }
    }

    pub fn save(&self) {
        if let Some(path) = Self::config_path() {
            // Create parent directories if needed
            if let Some(parent) = path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            match serde_json::to_string_pretty(self) {
                Ok(json) => {
                    if let Err(e) = fs::write(&path, json) {
                        tracing::warn!(path = %path.display(), "failed to save config: {e}");
                    }
                }
                Err(e) => tracing::warn!("failed to serialize config: {e}"),
            }
        }
    }

    pub fn add_recent(&mut self, path: &str) {
        self.push_recent(path);
        self.save();
    }

    pub fn remove_recent(&mut self, path: &str) {
        self.recent_images.retain(|p| p != path);
        self.save();
    }

    fn push_recent(&mut self, path: &str) {
        // Move to front
        self.recent_images.retain(|p| p != path);
        self.recent_images.insert(0, path.to_string());
        self.recent_images.truncate(MAX_RECENT_IMAGES);
    }

    pub fn scale_up(&mut self) {
        self.ui_scale = (self.ui_scale + UI_SCALE_STEP).min(MAX_UI_SCALE);
    }

    pub fn scale_down(&mut self) {
        self.ui_scale = (self.ui_scale - UI_SCALE_STEP).max(MIN_UI_SCALE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recent_images_move_to_front_and_cap() {
        let mut config = AppConfig::default();
        for i in 0..12 {
            config.push_recent(&format!("img{i}.png"));
        }
        config.push_recent("img5.png");

        assert_eq!(config.recent_images.len(), MAX_RECENT_IMAGES);
        assert_eq!(config.recent_images[0], "img5.png");
        assert_eq!(config.recent_images.iter().filter(|p| *p == "img5.png").count(), 1);
    }

    #[test]
    fn malformed_json_falls_back_to_defaults() {
        let config = AppConfig::from_json("{ not json");
        assert_eq!(config.ffmpeg_path, "ffmpeg");
        assert_eq!(config.ui_scale, 1.0);
    }

    #[test]
    fn missing_fields_take_defaults_and_scale_is_clamped() {
        let config = AppConfig::from_json(r#"{ "ui_scale": 5.0 }"#);
        assert_eq!(config.ui_scale, MAX_UI_SCALE);
        assert_eq!(config.ffmpeg_path, "ffmpeg");
        assert!(config.recent_images.is_empty());
    }

    #[test]
    fn records_file_override_wins() {
        let config = AppConfig {
            records_file: Some("/tmp/slicer.json".to_string()),
            ..AppConfig::default()
        };
        assert_eq!(config.records_path(), Some(PathBuf::from("/tmp/slicer.json")));
    }

    #[test]
    fn scale_steps_stay_in_range() {
        let mut config = AppConfig::default();
        for _ in 0..10 {
            config.scale_up();
        }
        assert_eq!(config.ui_scale, MAX_UI_SCALE);
        for _ in 0..10 {
            config.scale_down();
        }
        assert_eq!(config.ui_scale, MIN_UI_SCALE);
    }
}
