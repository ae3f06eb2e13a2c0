use chrono::{DateTime, Utc};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::{CameraRangeMode, Settings};
use crate::core::{CameraCatalog, CameraPreset, Coordinate, Path};
use crate::error::PlaybackError;
use crate::host::{AltitudeMode, CameraPose, HostResult, MotionMode, RendererHost, TickSubscription};
use crate::playback::camera::CameraSequencer;
use crate::playback::clock::{ClockTick, PlaybackClock};
use crate::playback::interpolate::{initial_heading, interpolate, Pose};
use crate::playback::speed::compute_speed;
use crate::playback::{PlaybackStatus, SessionEvent, SessionOutcome, SessionPhase, SessionSummary};

/// Floor for the speed-adaptive camera range, in metres
const MIN_ADAPTIVE_RANGE: f64 = 20.0;

/// Mutable state of one playback session
///
/// Built fresh by [`PlaybackController::start_session`] and dropped when the
/// session completes or is interrupted.
#[derive(Debug)]
pub struct PlaybackState {
    session_id: u64,
    path: Path,
    speed: f64,
    clock: PlaybackClock,
    cameras: CameraSequencer,
    camera_range: f64,
    heading: f64,
    start_wait_ticks: u32,
    ticks: u64,
    last_tick: Option<ClockTick>,
    started_at: DateTime<Utc>,
}

impl PlaybackState {
    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Latest clock report, with both pre- and post-correction segment
    pub fn last_tick(&self) -> Option<ClockTick> {
        self.last_tick
    }

    fn summary(&self, outcome: SessionOutcome) -> SessionSummary {
        SessionSummary {
            session_id: self.session_id,
            outcome,
            path_nodes: self.path.len(),
            segments: self.path.segment_count(),
            speed: self.speed,
            ticks: self.ticks,
            simulated_seconds: self.clock.total_simulated(),
            final_segment_index: self.clock.segment_index(),
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }
}

/// Drives a model and camera along a route, one host tick at a time
pub struct PlaybackController<H: RendererHost> {
    host: H,
    settings: Settings,
    catalog: CameraCatalog,
    phase: SessionPhase,
    state: Option<PlaybackState>,
    subscription: Option<TickSubscription>,
    subscribers: Vec<Sender<SessionEvent>>,
    next_session_id: u64,
    last_summary: Option<SessionSummary>,
}

impl<H: RendererHost> PlaybackController<H> {
    pub fn new(host: H, settings: Settings) -> Result<Self, PlaybackError> {
        let catalog = settings.catalog()?;
        if settings.frames_per_camera == 0 {
            return Err(PlaybackError::InvalidCadence);
        }

        Ok(Self {
            host,
            settings,
            catalog,
            phase: SessionPhase::Idle,
            state: None,
            subscription: None,
            subscribers: Vec::new(),
            next_session_id: 1,
            last_summary: None,
        })
    }

    /// Receive session notifications from now on
    pub fn subscribe(&mut self) -> Receiver<SessionEvent> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn state(&self) -> Option<&PlaybackState> {
        self.state.as_ref()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Summary of the most recently finished session
    pub fn last_summary(&self) -> Option<&SessionSummary> {
        self.last_summary.as_ref()
    }

    /// Begin playing `path` back so it lasts `desired_eta_minutes`
    /// (0 = real time), with the model drawn at `scale_factor`.
    ///
    /// A live session is interrupted first. Returns the new session id.
    pub fn start_session(&mut self, path: Path, desired_eta_minutes: f64, scale_factor: f64) -> Result<u64, PlaybackError> {
        if !(desired_eta_minutes.is_finite() && desired_eta_minutes >= 0.0) {
            return Err(PlaybackError::InvalidEta(desired_eta_minutes));
        }
        if !(scale_factor.is_finite() && scale_factor > 0.0) {
            return Err(PlaybackError::InvalidScale(scale_factor));
        }

        let speed = compute_speed(path.total_duration(), desired_eta_minutes);
        if !speed.is_finite() {
            return Err(PlaybackError::InvalidEta(desired_eta_minutes));
        }

        self.interrupt();

        let cameras = CameraSequencer::new(self.catalog.clone(), self.settings.frames_per_camera)?;
        let session_id = self.next_session_id;
        self.next_session_id += 1;

        info!(
            "Starting session {}: {} nodes, {:.1}s of route at speed {:.3}",
            session_id,
            path.len(),
            path.total_duration(),
            speed
        );

        let state = PlaybackState {
            session_id,
            camera_range: cameras.current_camera().range,
            heading: initial_heading(&path),
            path,
            speed,
            clock: PlaybackClock::new(),
            cameras,
            start_wait_ticks: 0,
            ticks: 0,
            last_tick: None,
            started_at: Utc::now(),
        };

        self.subscription = Some(self.host.attach_ticks());

        if state.path.is_degenerate() {
            // Nothing to fly to; the first tick completes the session
            self.phase = SessionPhase::Running;
        } else {
            let first = state.path.nodes()[0].location;
            let preset = state.cameras.current_camera();
            log_host("set motion mode", self.host.set_motion_mode(MotionMode::Smooth));
            log_host("set model scale", self.host.set_model_scale(scale_factor));
            log_host("set camera pose", self.host.set_camera_pose(camera_pose(first, &preset, preset.range)));
            self.phase = SessionPhase::AwaitingStart;
        }

        self.state = Some(state);
        self.emit(SessionEvent::Started { session_id });
        Ok(session_id)
    }

    /// Process one host frame tick lasting `elapsed`
    pub fn tick(&mut self, elapsed: Duration) -> SessionPhase {
        match self.phase {
            SessionPhase::AwaitingStart => self.await_start(),
            SessionPhase::Running => self.advance(elapsed),
            _ => {}
        }
        self.phase
    }

    /// Cancel the live session, if any, without signalling completion
    ///
    /// Returns whether a session was interrupted.
    pub fn interrupt(&mut self) -> bool {
        if !self.phase.is_live() {
            return false;
        }
        self.finish(SessionOutcome::Interrupted);
        true
    }

    pub fn status(&self) -> PlaybackStatus {
        let state = self.state.as_ref();
        let last_tick = state.and_then(PlaybackState::last_tick);

        PlaybackStatus {
            phase: self.phase,
            session_id: state.map(|s| s.session_id),
            segment_index: state.map(|s| s.clock.segment_index()).unwrap_or(0),
            segment_count: state.map(|s| s.path.segment_count()).unwrap_or(0),
            fraction: last_tick.map(|t| t.fraction).unwrap_or(0.0),
            speed: state.map(|s| s.speed).unwrap_or(0.0),
            current_speed_estimate: state.map(|s| s.clock.current_speed_estimate()).unwrap_or(0.0),
            camera_index: state.map(|s| s.cameras.index()).unwrap_or(0),
            ticks: state.map(|s| s.ticks).unwrap_or(0),
            simulated_seconds: state.map(|s| s.clock.total_simulated()).unwrap_or(0.0),
        }
    }

    fn await_start(&mut self) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        let Some(first) = state.path.first().map(|n| n.location) else {
            return;
        };

        state.start_wait_ticks += 1;
        let settled = self
            .host
            .view_center()
            .map(|center| center.matches(&first, self.settings.start_match_decimals))
            .unwrap_or(false);

        if !settled && state.start_wait_ticks <= self.settings.max_start_wait_ticks {
            return;
        }
        if !settled {
            warn!(
                "View did not reach the start of the route within {} ticks, starting anyway",
                self.settings.max_start_wait_ticks
            );
        } else {
            debug!("View settled on the start of the route after {} ticks", state.start_wait_ticks);
        }

        let pose = Pose {
            location: first,
            heading: state.heading,
        };
        let preset = state.cameras.current_camera();
        let range = state.camera_range;
        push_pose(&mut self.host, pose, &preset, range);
        log_host("set motion mode", self.host.set_motion_mode(MotionMode::Instantaneous));
        self.phase = SessionPhase::Running;
    }

    fn advance(&mut self, elapsed: Duration) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        state.ticks += 1;
        let tick = state.clock.tick(&state.path, elapsed, state.speed);
        state.last_tick = Some(tick);
        state.cameras.advance();

        let preset = state.cameras.current_camera();
        state.camera_range = match self.settings.camera_range {
            CameraRangeMode::Preset => preset.range,
            CameraRangeMode::SpeedAdaptive => {
                let desired = (tick.current_speed_estimate * 10.0).max(MIN_ADAPTIVE_RANGE);
                state.camera_range + (desired - state.camera_range) * 0.1
            }
        };

        let pose = if tick.completed {
            state.path.last().map(|last| Pose {
                location: last.location,
                heading: final_heading(&state.path).unwrap_or(state.heading),
            })
        } else {
            state.path.segment(tick.segment_index).map(|(a, b)| interpolate(a, b, tick.fraction, self.settings.interpolation))
        };

        if let Some(pose) = pose {
            state.heading = pose.heading;
            push_pose(&mut self.host, pose, &preset, state.camera_range);
        }

        if tick.completed {
            self.finish(SessionOutcome::Completed);
        }
    }

    fn finish(&mut self, outcome: SessionOutcome) {
        if let Some(subscription) = self.subscription.take() {
            self.host.detach_ticks(subscription);
        }
        log_host("restore motion mode", self.host.set_motion_mode(MotionMode::Smooth));

        self.phase = match outcome {
            SessionOutcome::Completed => SessionPhase::Completed,
            SessionOutcome::Interrupted => SessionPhase::Interrupted,
        };

        let Some(state) = self.state.take() else {
            return;
        };
        let summary = state.summary(outcome);

        match outcome {
            SessionOutcome::Completed => {
                info!(
                    "Session {} completed after {} ticks ({:.1}s of route)",
                    summary.session_id, summary.ticks, summary.simulated_seconds
                );
                self.emit(SessionEvent::Completed(summary.clone()));
            }
            SessionOutcome::Interrupted => {
                info!(
                    "Session {} interrupted at segment {}/{}",
                    summary.session_id, summary.final_segment_index, summary.segments
                );
                self.emit(SessionEvent::Interrupted(summary.clone()));
            }
        }
        self.last_summary = Some(summary);
    }

    fn emit(&mut self, event: SessionEvent) {
        // Drop listeners that have gone away
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

/// Bearing of the final segment, if the path has one
fn final_heading(path: &Path) -> Option<f64> {
    let last = path.last_traversable_index()?;
    let (a, b) = path.segment(last)?;
    Some(crate::core::geo::heading(&a.location, &b.location))
}

fn camera_pose(target: Coordinate, preset: &CameraPreset, range: f64) -> CameraPose {
    CameraPose {
        target,
        altitude: 0.0,
        altitude_mode: AltitudeMode::RelativeToGround,
        heading: preset.heading,
        tilt: preset.tilt,
        range,
    }
}

fn push_pose<H: RendererHost>(host: &mut H, pose: Pose, preset: &CameraPreset, range: f64) {
    log_host("set model pose", host.set_model_pose(pose.location, pose.heading));
    log_host("set camera pose", host.set_camera_pose(camera_pose(pose.location, preset, range)));
}

fn log_host(command: &str, result: HostResult<()>) {
    if let Err(e) = result {
        debug!("Host ignored {}: {}", command, e);
    }
}
