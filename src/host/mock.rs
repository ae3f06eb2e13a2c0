use std::cell::Cell;
use std::collections::BTreeSet;

use crate::core::Coordinate;
use crate::error::HostError;
use crate::host::renderer::{CameraPose, HostResult, MotionMode, RendererHost, TickSubscription};

/// A command received by [`MockRendererHost`]
#[derive(Debug, Clone, PartialEq)]
pub enum HostCommand {
    Attach(u64),
    Detach(u64),
    ModelPose { location: Coordinate, heading: f64 },
    Camera(CameraPose),
    MotionMode(MotionMode),
    ModelScale(f64),
}

/// In-memory renderer host for headless runs and tests
///
/// Records every command it receives. In smooth motion mode the view takes
/// `settle_polls` calls to [`RendererHost::view_center`] to arrive at the
/// last camera target; in instantaneous mode it arrives at once.
pub struct MockRendererHost {
    commands: Vec<HostCommand>,
    active: BTreeSet<u64>,
    peak_active: usize,
    next_id: u64,
    motion_mode: MotionMode,
    camera_target: Option<Coordinate>,
    settle_polls: Option<u32>,
    polls: Cell<u32>,
    asset_loaded: bool,
}

impl MockRendererHost {
    /// Create a host whose smooth flights settle after `settle_polls` polls
    pub fn new(settle_polls: u32) -> Self {
        Self {
            commands: Vec::new(),
            active: BTreeSet::new(),
            peak_active: 0,
            next_id: 1,
            motion_mode: MotionMode::Smooth,
            camera_target: None,
            settle_polls: Some(settle_polls),
            polls: Cell::new(0),
            asset_loaded: true,
        }
    }

    /// A host whose smooth flights never arrive
    pub fn never_settles() -> Self {
        Self {
            settle_polls: None,
            ..Self::new(0)
        }
    }

    /// Simulate the model asset failing to load
    pub fn set_asset_loaded(&mut self, loaded: bool) {
        self.asset_loaded = loaded;
    }

    pub fn commands(&self) -> &[HostCommand] {
        &self.commands
    }

    /// Tick subscriptions currently attached
    pub fn active_subscriptions(&self) -> usize {
        self.active.len()
    }

    /// Most subscriptions ever attached at the same time
    pub fn peak_subscriptions(&self) -> usize {
        self.peak_active
    }

    pub fn motion_mode(&self) -> MotionMode {
        self.motion_mode
    }

    /// Last model pose the host accepted
    pub fn last_model_pose(&self) -> Option<(Coordinate, f64)> {
        self.commands.iter().rev().find_map(|c| match c {
            HostCommand::ModelPose { location, heading } => Some((*location, *heading)),
            _ => None,
        })
    }

    pub fn model_poses(&self) -> Vec<(Coordinate, f64)> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                HostCommand::ModelPose { location, heading } => Some((*location, *heading)),
                _ => None,
            })
            .collect()
    }

    pub fn camera_poses(&self) -> Vec<CameraPose> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                HostCommand::Camera(pose) => Some(*pose),
                _ => None,
            })
            .collect()
    }
}

impl Default for MockRendererHost {
    fn default() -> Self {
        Self::new(0)
    }
}

impl RendererHost for MockRendererHost {
    fn attach_ticks(&mut self) -> TickSubscription {
        let id = self.next_id;
        self.next_id += 1;
        self.active.insert(id);
        self.peak_active = self.peak_active.max(self.active.len());
        self.commands.push(HostCommand::Attach(id));
        TickSubscription::new(id)
    }

    fn detach_ticks(&mut self, subscription: TickSubscription) {
        self.active.remove(&subscription.id());
        self.commands.push(HostCommand::Detach(subscription.id()));
    }

    fn set_model_pose(&mut self, location: Coordinate, heading: f64) -> HostResult<()> {
        if !self.asset_loaded {
            return Err(HostError::AssetNotLoaded);
        }
        self.commands.push(HostCommand::ModelPose { location, heading });
        Ok(())
    }

    fn set_camera_pose(&mut self, pose: CameraPose) -> HostResult<()> {
        self.camera_target = Some(pose.target);
        self.polls.set(0);
        self.commands.push(HostCommand::Camera(pose));
        Ok(())
    }

    fn set_motion_mode(&mut self, mode: MotionMode) -> HostResult<()> {
        self.motion_mode = mode;
        self.commands.push(HostCommand::MotionMode(mode));
        Ok(())
    }

    fn set_model_scale(&mut self, scale: f64) -> HostResult<()> {
        self.commands.push(HostCommand::ModelScale(scale));
        Ok(())
    }

    fn view_center(&self) -> Option<Coordinate> {
        let target = self.camera_target?;
        if self.motion_mode == MotionMode::Instantaneous {
            return Some(target);
        }

        let polls = self.polls.get() + 1;
        self.polls.set(polls);
        match self.settle_polls {
            Some(needed) if polls >= needed => Some(target),
            // Still in flight somewhere short of the target
            _ => Some(Coordinate::new(target.lat + 1.0, target.lng + 1.0)),
        }
    }
}
