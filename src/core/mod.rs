pub mod camera;
pub mod geo;
pub mod path;

pub use camera::{CameraCatalog, CameraPreset, DEFAULT_PRESETS};
pub use geo::{Coordinate, InterpolationMode};
pub use path::{Path, PathNode};
