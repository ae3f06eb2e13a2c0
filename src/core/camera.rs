use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::PlaybackError;

/// A fixed camera framing relative to the tracked model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPreset {
    /// Compass heading in degrees, -360..=360
    pub heading: f64,
    /// Tilt from straight down in degrees, 0..=90
    pub tilt: f64,
    /// Distance from the target in metres
    pub range: f64,
}

impl CameraPreset {
    pub const fn new(heading: f64, tilt: f64, range: f64) -> Self {
        Self { heading, tilt, range }
    }

    fn validate(&self, index: usize) -> Result<(), PlaybackError> {
        let reason = if !(-360.0..=360.0).contains(&self.heading) {
            format!("heading {} outside -360..=360", self.heading)
        } else if !(0.0..=90.0).contains(&self.tilt) {
            format!("tilt {} outside 0..=90", self.tilt)
        } else if !(self.range.is_finite() && self.range > 0.0) {
            format!("range {} must be positive", self.range)
        } else {
            return Ok(());
        };
        Err(PlaybackError::InvalidCamera { index, reason })
    }
}

/// Framings the simulation has always shipped with
pub const DEFAULT_PRESETS: [CameraPreset; 4] = [
    CameraPreset::new(200.0, 60.0, 300.0),
    CameraPreset::new(-47.3872, 80.5524, 102.0),
    CameraPreset::new(44.50891, 80.0, 664.0),
    CameraPreset::new(20.0, 0.0, 200.0),
];

/// Ordered, non-empty list of camera presets shared by every session
#[derive(Debug, Clone, PartialEq)]
pub struct CameraCatalog {
    presets: Arc<[CameraPreset]>,
}

impl CameraCatalog {
    pub fn new(presets: Vec<CameraPreset>) -> Result<Self, PlaybackError> {
        if presets.is_empty() {
            return Err(PlaybackError::EmptyCatalog);
        }
        for (index, preset) in presets.iter().enumerate() {
            preset.validate(index)?;
        }
        Ok(Self { presets: presets.into() })
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CameraPreset> {
        self.presets.get(index)
    }

    pub fn presets(&self) -> &[CameraPreset] {
        &self.presets
    }
}

impl Default for CameraCatalog {
    fn default() -> Self {
        Self {
            presets: DEFAULT_PRESETS.to_vec().into(),
        }
    }
}
