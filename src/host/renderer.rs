use serde::{Deserialize, Serialize};

use crate::core::Coordinate;
use crate::error::HostError;

/// Result type for renderer host commands
pub type HostResult<T> = Result<T, HostError>;

/// How the host moves its camera to a new pose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionMode {
    /// Jump straight to the new pose
    Instantaneous,
    /// Fly there over several frames
    Smooth,
}

/// How a camera altitude is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AltitudeMode {
    RelativeToGround,
    Absolute,
}

/// Full camera placement sent to the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    /// Point the camera looks at
    pub target: Coordinate,
    pub altitude: f64,
    pub altitude_mode: AltitudeMode,
    pub heading: f64,
    pub tilt: f64,
    pub range: f64,
}

/// Handle for an attached per-frame tick subscription
///
/// Move-only: detaching consumes it, so a released subscription can't be
/// released twice.
#[derive(Debug, PartialEq, Eq)]
pub struct TickSubscription {
    id: u64,
}

impl TickSubscription {
    pub fn new(id: u64) -> Self {
        Self { id }
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

/// The rendering host the playback engine drives
///
/// Commands are fire-and-forget from the engine's point of view: a rejected
/// command is not retried, the next tick simply sends a fresh one.
pub trait RendererHost {
    /// Start delivering frame ticks to the playback engine
    fn attach_ticks(&mut self) -> TickSubscription;

    /// Stop delivering frame ticks for this subscription
    fn detach_ticks(&mut self, subscription: TickSubscription);

    /// Move and orient the model
    fn set_model_pose(&mut self, location: Coordinate, heading: f64) -> HostResult<()>;

    /// Place the camera
    fn set_camera_pose(&mut self, pose: CameraPose) -> HostResult<()>;

    /// Choose between flying and teleporting to new camera poses
    fn set_motion_mode(&mut self, mode: MotionMode) -> HostResult<()>;

    /// Uniformly scale the model
    fn set_model_scale(&mut self, scale: f64) -> HostResult<()>;

    /// Where the host view is currently centred, if known
    fn view_center(&self) -> Option<Coordinate>;
}
