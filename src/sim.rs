//! Kinematic turtle simulator.
//!
//! [`SimTurtle`] stands in for both external collaborators: it is the
//! [`CommandSink`] that receives velocity intents and the [`EventPump`] that
//! publishes poses. Each pump advances simulated time by one fixed step, so a
//! full path runs deterministically and without sleeping.

use crate::error::ControlError;
use crate::motion::{CommandSink, EventPump, VelocityCommand};
use crate::pose::{Pose, PoseTracker, normalize_angle};

/// Integration step of the simulated pose feed, in seconds (62.5 Hz).
pub const DEFAULT_SIM_DT: f64 = 0.016;

/// A unicycle-model turtle that integrates the last received command.
#[derive(Clone, Debug)]
pub struct SimTurtle {
    pose: Pose,
    dt: f64,
    active: VelocityCommand,
    sent: Vec<VelocityCommand>,
    pumps: u64,
    /// Pumps that pass before the first pose is published.
    publish_delay: u64,
    /// Publishing stops after this many pumps, modelling a stalled feed.
    stall_after: Option<u64>,
}

impl SimTurtle {
    pub fn new(start: Pose) -> Self {
        Self {
            pose: start,
            dt: DEFAULT_SIM_DT,
            active: VelocityCommand::HALT,
            sent: Vec::new(),
            pumps: 0,
            publish_delay: 0,
            stall_after: None,
        }
    }

    /// Sets the integration step. It must be finite and positive, otherwise the
    /// turtle never moves or its pose turns to NaN.
    pub fn with_dt(mut self, dt: f64) -> Result<Self, ControlError> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(ControlError::InvalidArgument(format!(
                "simulation step must be finite and positive, found {dt}"
            )));
        }
        self.dt = dt;
        Ok(self)
    }

    pub fn with_publish_delay(mut self, pumps: u64) -> Self {
        self.publish_delay = pumps;
        self
    }

    pub fn stall_after(mut self, pumps: u64) -> Self {
        self.stall_after = Some(pumps);
        self
    }

    /// The simulated ground-truth pose.
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Every command received so far, in order.
    pub fn sent(&self) -> &[VelocityCommand] {
        &self.sent
    }

    pub fn pumps(&self) -> u64 {
        self.pumps
    }

    fn integrate(&mut self) {
        let cmd = self.active;
        let theta = normalize_angle(self.pose.theta + cmd.angular * self.dt);
        self.pose = Pose {
            x: self.pose.x + cmd.linear * theta.cos() * self.dt,
            y: self.pose.y + cmd.linear * theta.sin() * self.dt,
            theta,
        };
    }

    fn publishing(&self) -> bool {
        self.pumps > self.publish_delay && self.stall_after.is_none_or(|n| self.pumps <= n)
    }
}

impl CommandSink for SimTurtle {
    fn send(&mut self, command: VelocityCommand) {
        self.active = command;
        self.sent.push(command);
    }
}

impl EventPump for SimTurtle {
    fn pump_once(&mut self, tracker: &mut PoseTracker) {
        self.pumps += 1;
        self.integrate();
        if self.publishing() {
            tracker.update(self.pose);
        }
    }
}
