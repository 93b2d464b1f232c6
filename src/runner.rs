//! Top-level path execution.

use crate::config::ControlConfig;
use crate::error::ControlError;
use crate::motion::{CommandSink, EventPump, MotionDriver};
use crate::path::{snowflake, triangle};
use crate::pose::Pose;

/// Side length of the plain triangle path.
pub const TRIANGLE_SIDE: f64 = 3.0;
/// Edge length of the snowflake path.
pub const SNOWFLAKE_LENGTH: f64 = 3.0;
/// Koch depth of the snowflake path.
pub const SNOWFLAKE_DEPTH: u32 = 3;

/// Which path the runner traces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PathKind {
    /// Three `move_forward(3)`, `rotate(120)` pairs.
    Triangle,
    /// `snowflake(3, 3)`.
    #[default]
    Snowflake,
}

/// Waits for the pose feed, then drives a whole path to completion.
pub struct Runner<L> {
    driver: MotionDriver<L>,
}

impl<L: CommandSink + EventPump> Runner<L> {
    pub fn new(link: L, config: ControlConfig) -> Result<Self, ControlError> {
        Ok(Self {
            driver: MotionDriver::new(link, config)?,
        })
    }

    pub fn driver(&self) -> &MotionDriver<L> {
        &self.driver
    }

    pub fn into_driver(self) -> MotionDriver<L> {
        self.driver
    }

    /// Pumps events until the first pose arrives.
    ///
    /// Blocks indefinitely unless `max_ticks` is configured, in which case an
    /// exhausted budget yields [`ControlError::PoseUnavailable`].
    pub fn wait_for_pose(&mut self) -> Result<Pose, ControlError> {
        let mut pumps = 0;
        loop {
            if let Some(pose) = self.driver.tracker().current() {
                return Ok(pose);
            }
            if let Some(max_ticks) = self.driver.config().max_ticks
                && pumps >= max_ticks
            {
                return Err(ControlError::PoseUnavailable);
            }
            self.driver.pump_once();
            pumps += 1;
        }
    }

    /// Traces `kind` and returns the last known pose.
    ///
    /// Any primitive failure aborts the rest of the path.
    pub fn run(&mut self, kind: PathKind) -> Result<Pose, ControlError> {
        let start = self.wait_for_pose()?;
        tracing::info!(?kind, x = start.x, y = start.y, theta = start.theta, "starting path");

        match kind {
            PathKind::Triangle => triangle(&mut self.driver, TRIANGLE_SIDE)?,
            PathKind::Snowflake => snowflake(&mut self.driver, SNOWFLAKE_LENGTH, SNOWFLAKE_DEPTH)?,
        }

        let end = self
            .driver
            .tracker()
            .current()
            .ok_or(ControlError::PoseUnavailable)?;
        tracing::info!(?kind, x = end.x, y = end.y, theta = end.theta, "path complete");
        Ok(end)
    }
}
