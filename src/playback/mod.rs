pub mod camera;
pub mod clock;
pub mod engine;
pub mod interpolate;
pub mod speed;

pub use camera::CameraSequencer;
pub use clock::{ClockTick, PlaybackClock};
pub use engine::PlaybackController;
pub use interpolate::{initial_heading, interpolate, Pose};
pub use speed::compute_speed;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of a playback session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// No session has been started
    Idle,
    /// Waiting for the host view to reach the first waypoint
    AwaitingStart,
    Running,
    /// Reached the end of the route
    Completed,
    /// Cancelled before the end of the route
    Interrupted,
}

impl SessionPhase {
    /// A session exists and is attached to the tick source
    pub fn is_live(&self) -> bool {
        matches!(self, SessionPhase::AwaitingStart | SessionPhase::Running)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionPhase::Completed | SessionPhase::Interrupted)
    }
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionOutcome {
    Completed,
    Interrupted,
}

/// What happened during a finished session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: u64,
    pub outcome: SessionOutcome,
    pub path_nodes: usize,
    pub segments: usize,
    pub speed: f64,
    /// Running ticks processed (start-up wait not included)
    pub ticks: u64,
    /// Route seconds consumed
    pub simulated_seconds: f64,
    pub final_segment_index: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Notifications for UI and persistence collaborators
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Started { session_id: u64 },
    Completed(SessionSummary),
    Interrupted(SessionSummary),
}

/// Point-in-time view of the controller, for display or logging
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackStatus {
    pub phase: SessionPhase,
    pub session_id: Option<u64>,
    pub segment_index: usize,
    pub segment_count: usize,
    pub fraction: f64,
    pub speed: f64,
    /// Metres per second along the current segment
    pub current_speed_estimate: f64,
    pub camera_index: usize,
    pub ticks: u64,
    pub simulated_seconds: f64,
}
