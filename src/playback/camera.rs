use crate::core::{CameraCatalog, CameraPreset};
use crate::error::PlaybackError;

/// Cycles through the camera catalog on a fixed frame cadence
///
/// Each preset stays active for exactly `frames_per_camera` calls to
/// [`CameraSequencer::advance`]; after the last preset the cycle wraps back
/// to the first. Route progress has no influence on the cadence.
#[derive(Debug, Clone)]
pub struct CameraSequencer {
    catalog: CameraCatalog,
    frames_per_camera: u32,
    frame_counter: u32,
    index: usize,
}

impl CameraSequencer {
    pub fn new(catalog: CameraCatalog, frames_per_camera: u32) -> Result<Self, PlaybackError> {
        if frames_per_camera == 0 {
            return Err(PlaybackError::InvalidCadence);
        }
        Ok(Self {
            catalog,
            frames_per_camera,
            frame_counter: 0,
            index: 0,
        })
    }

    /// Count one frame, switching preset once the current one has been
    /// shown for the full cadence
    pub fn advance(&mut self) {
        self.frame_counter += 1;

        if self.frame_counter > self.frames_per_camera {
            self.index = (self.index + 1) % self.catalog.len();
            // The switching frame is the new preset's first frame
            self.frame_counter = 1;
        }
    }

    pub fn current_camera(&self) -> CameraPreset {
        // The catalog is never empty and index stays below its length
        self.catalog.presets()[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn frame_counter(&self) -> u32 {
        self.frame_counter
    }
}
