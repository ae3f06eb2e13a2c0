use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

use crate::core::{CameraCatalog, CameraPreset, InterpolationMode, DEFAULT_PRESETS};
use crate::error::PlaybackError;

/// How the camera range is chosen each tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraRangeMode {
    /// Use the active preset's range
    #[default]
    Preset,
    /// Ease the range towards a value proportional to the current speed
    SpeedAdaptive,
}

/// Tunables for the playback engine, persisted as JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Nominal host frame interval, ~30 fps
    pub frame_interval_ms: u64,
    /// Frames each camera preset stays active
    pub frames_per_camera: u32,
    /// Ticks to wait for the view to settle on the first waypoint
    pub max_start_wait_ticks: u32,
    /// Decimal places used when comparing the view centre to the first waypoint
    pub start_match_decimals: u32,
    pub interpolation: InterpolationMode,
    pub camera_range: CameraRangeMode,
    pub cameras: Vec<CameraPreset>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            frame_interval_ms: 33,
            frames_per_camera: 400,
            max_start_wait_ticks: 150,
            start_match_decimals: 4,
            interpolation: InterpolationMode::GreatCircle,
            camera_range: CameraRangeMode::Preset,
            cameras: DEFAULT_PRESETS.to_vec(),
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("route-sim").join("settings.json"))
    }

    /// Load from the user config directory, falling back to defaults
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &std::path::Path) -> Self {
        if !path.exists() {
            debug!("No settings file at {}, using defaults", path.display());
            return Self::default();
        }

        match fs::read_to_string(path).map(|contents| serde_json::from_str::<Settings>(&contents)) {
            Ok(Ok(settings)) => settings,
            Ok(Err(e)) => {
                warn!("Ignoring malformed settings file {}: {}", path.display(), e);
                Self::default()
            }
            Err(e) => {
                warn!("Could not read settings file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::config_path().ok_or_else(|| anyhow::anyhow!("No config directory available"))?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &std::path::Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    /// Validated camera catalog built from `cameras`
    pub fn catalog(&self) -> Result<CameraCatalog, PlaybackError> {
        CameraCatalog::new(self.cameras.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.frame_interval(), Duration::from_millis(33));
        assert_eq!(settings.frames_per_camera, 400);
        assert_eq!(settings.max_start_wait_ticks, 150);
        assert_eq!(settings.catalog().unwrap().len(), 4);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"frames_per_camera": 12, "interpolation": "linear"}"#).unwrap();
        assert_eq!(settings.frames_per_camera, 12);
        assert_eq!(settings.interpolation, InterpolationMode::Linear);
        assert_eq!(settings.max_start_wait_ticks, 150);
        assert_eq!(settings.cameras.len(), 4);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut settings = Settings::default();
        settings.camera_range = CameraRangeMode::SpeedAdaptive;
        settings.save_to(&path).unwrap();

        assert_eq!(Settings::load_from(&path), settings);
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }
}
