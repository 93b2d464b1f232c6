//! Closed-loop motion primitives.
//!
//! Each primitive is a small state machine ([`ForwardControl`], [`RotateControl`])
//! that anchors its target on the first pose it sees and then maps every later
//! pose to a [`VelocityCommand`] until the error falls below threshold. The state
//! machines never touch a transport, so convergence can be checked by feeding
//! them synthetic poses.
//!
//! [`MotionDriver`] is the blocking rendition: it runs one state machine per
//! call, sending each command to a [`CommandSink`] and pumping an [`EventPump`]
//! once per tick so that a fresh pose is observed before the next error
//! computation.

use crate::config::{ControlConfig, ControlGains};
use crate::error::{ControlError, PrimitiveKind};
use crate::pose::{Pose, PoseTracker, normalize_angle};
use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Saturation limit for the linear speed command.
pub const MAX_LINEAR_SPEED: f64 = 1.0;

/// Velocity intent for the external actuator. Constructed per tick, never retained.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VelocityCommand {
    pub linear: f64,
    pub angular: f64,
}

impl VelocityCommand {
    pub const HALT: Self = Self {
        linear: 0.0,
        angular: 0.0,
    };

    pub fn linear(linear: f64) -> Self {
        Self {
            linear,
            angular: 0.0,
        }
    }

    pub fn angular(angular: f64) -> Self {
        Self {
            linear: 0.0,
            angular,
        }
    }

    pub fn is_halt(&self) -> bool {
        *self == Self::HALT
    }
}

/// Lifecycle of a primitive's control loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No pose seen yet; the target is not anchored.
    Idle,
    Converging,
    Done,
}

/// Outcome of a single control tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ControlStep {
    /// Keep going: send this command and wait for the next pose.
    Command(VelocityCommand),
    /// Error is below threshold: send this (halting) command and stop.
    Converged(VelocityCommand),
}

/// A proportional control loop driven one pose at a time.
pub trait Control {
    fn kind(&self) -> PrimitiveKind;

    fn phase(&self) -> Phase;

    /// Advances the loop with the latest pose.
    ///
    /// The first call anchors the target on `pose`. Once converged, every
    /// further call returns [`ControlStep::Converged`] with a halt command.
    fn step(&mut self, pose: &Pose) -> ControlStep;
}

/// Drives the turtle `distance` units along its heading at the anchor pose.
#[derive(Clone, Debug)]
pub struct ForwardControl {
    distance: f64,
    gains: ControlGains,
    target: Option<DVec2>,
    phase: Phase,
}

impl ForwardControl {
    pub fn new(distance: f64, gains: ControlGains) -> Result<Self, ControlError> {
        if !distance.is_finite() {
            return Err(ControlError::InvalidArgument(format!(
                "distance must be finite, found {distance}"
            )));
        }
        Ok(Self {
            distance,
            gains,
            target: None,
            phase: Phase::Idle,
        })
    }

    /// The anchored end point, once the first pose has been seen.
    pub fn target(&self) -> Option<DVec2> {
        self.target
    }

    /// Euclidean distance from `pose` to the anchored end point.
    pub fn error(&self, pose: &Pose) -> Option<f64> {
        self.target.map(|end| end.distance(pose.position()))
    }
}

impl Control for ForwardControl {
    fn kind(&self) -> PrimitiveKind {
        PrimitiveKind::Forward
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn step(&mut self, pose: &Pose) -> ControlStep {
        if self.phase == Phase::Done {
            return ControlStep::Converged(VelocityCommand::HALT);
        }

        let end = *self
            .target
            .get_or_insert_with(|| pose.position() + pose.heading() * self.distance);
        self.phase = Phase::Converging;

        let err = end.distance(pose.position());
        if err < self.gains.distance_threshold {
            self.phase = Phase::Done;
            return ControlStep::Converged(VelocityCommand::HALT);
        }

        // Direction follows the requested distance; the error itself is unsigned.
        let speed = (self.gains.kp_distance * err).min(MAX_LINEAR_SPEED);
        let linear = if self.distance < 0.0 { -speed } else { speed };
        ControlStep::Command(VelocityCommand::linear(linear))
    }
}

/// Turns the turtle by a relative angle from its anchor heading.
#[derive(Clone, Debug)]
pub struct RotateControl {
    delta: f64,
    gains: ControlGains,
    target: Option<f64>,
    phase: Phase,
}

impl RotateControl {
    /// `degrees` is the relative turn; positive is counter-clockwise.
    pub fn new(degrees: f64, gains: ControlGains) -> Result<Self, ControlError> {
        if !degrees.is_finite() {
            return Err(ControlError::InvalidArgument(format!(
                "rotation angle must be finite, found {degrees}"
            )));
        }
        Ok(Self {
            delta: degrees.to_radians(),
            gains,
            target: None,
            phase: Phase::Idle,
        })
    }

    /// The anchored absolute heading (radians), once the first pose has been seen.
    pub fn target(&self) -> Option<f64> {
        self.target
    }

    /// Signed heading error in `(-π, π]`.
    pub fn error(&self, pose: &Pose) -> Option<f64> {
        self.target
            .map(|target| normalize_angle(target - pose.theta))
    }
}

impl Control for RotateControl {
    fn kind(&self) -> PrimitiveKind {
        PrimitiveKind::Rotate
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn step(&mut self, pose: &Pose) -> ControlStep {
        if self.phase == Phase::Done {
            return ControlStep::Converged(VelocityCommand::HALT);
        }

        let target = *self
            .target
            .get_or_insert_with(|| normalize_angle(pose.theta + self.delta));
        self.phase = Phase::Converging;

        let error = normalize_angle(target - pose.theta);
        if error.abs() < self.gains.angle_threshold {
            self.phase = Phase::Done;
            return ControlStep::Converged(VelocityCommand::HALT);
        }

        let speed = self.gains.kp_angle * error.abs();
        let angular = if error < 0.0 { -speed } else { speed };
        ControlStep::Command(VelocityCommand::angular(angular))
    }
}

/// Consumer of velocity commands. Delivery is fire-and-forget.
pub trait CommandSink {
    fn send(&mut self, command: VelocityCommand);
}

/// Processes one unit of pending I/O, delivering any pose updates to `tracker`.
pub trait EventPump {
    fn pump_once(&mut self, tracker: &mut PoseTracker);
}

/// The two motion primitives that paths are composed from.
///
/// Implementations must not return until the primitive has finished, so calls
/// issued in sequence never overlap.
pub trait MotionPrimitives {
    fn move_forward(&mut self, distance: f64) -> Result<(), ControlError>;

    /// Relative turn in degrees; positive is counter-clockwise.
    fn rotate(&mut self, degrees: f64) -> Result<(), ControlError>;
}

/// Blocking executor of motion primitives over a transport link.
///
/// Owns the [`PoseTracker`]; the link feeds it through [`EventPump::pump_once`]
/// and receives commands through [`CommandSink::send`].
pub struct MotionDriver<L> {
    link: L,
    tracker: PoseTracker,
    config: ControlConfig,
}

impl<L: CommandSink + EventPump> MotionDriver<L> {
    pub fn new(link: L, config: ControlConfig) -> Result<Self, ControlError> {
        config.validate()?;
        Ok(Self {
            link,
            tracker: PoseTracker::new(),
            config,
        })
    }

    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    pub fn tracker(&self) -> &PoseTracker {
        &self.tracker
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn into_link(self) -> L {
        self.link
    }

    /// Pumps the link once, refreshing the tracker.
    pub fn pump_once(&mut self) {
        self.link.pump_once(&mut self.tracker);
    }

    /// Runs `control` to convergence and returns the number of commands sent
    /// before the halt.
    ///
    /// A halt command is always the last thing sent, whether the loop converged
    /// or ran out of ticks. With no pose known yet nothing is sent and `Ok(0)`
    /// is returned, the same no-op as the [`MotionPrimitives`] calls.
    pub fn run<C: Control>(&mut self, mut control: C) -> Result<u64, ControlError> {
        if !self.tracker.is_known() {
            tracing::debug!(primitive = %control.kind(), "pose unknown, skipping");
            return Ok(0);
        }

        let mut ticks = 0;
        loop {
            let pose = self
                .tracker
                .current()
                .ok_or(ControlError::PoseUnavailable)?;

            match control.step(&pose) {
                ControlStep::Converged(halt) => {
                    self.link.send(halt);
                    tracing::debug!(primitive = %control.kind(), ticks, "converged");
                    return Ok(ticks);
                }
                ControlStep::Command(command) => self.link.send(command),
            }

            ticks += 1;
            if let Some(max_ticks) = self.config.max_ticks
                && ticks >= max_ticks
            {
                self.link.send(VelocityCommand::HALT);
                tracing::warn!(primitive = %control.kind(), ticks, "no convergence, aborting");
                return Err(ControlError::ConvergenceTimeout {
                    primitive: control.kind(),
                    ticks,
                });
            }

            self.link.pump_once(&mut self.tracker);
        }
    }
}

impl<L: CommandSink + EventPump> MotionPrimitives for MotionDriver<L> {
    fn move_forward(&mut self, distance: f64) -> Result<(), ControlError> {
        let control = ForwardControl::new(distance, self.config.gains)?;
        tracing::debug!(distance, "move_forward");
        self.run(control).map(|_| ())
    }

    fn rotate(&mut self, degrees: f64) -> Result<(), ControlError> {
        let control = RotateControl::new(degrees, self.config.gains)?;
        tracing::debug!(degrees, "rotate");
        self.run(control).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn forward_anchors_target_on_first_pose() {
        let mut control = ForwardControl::new(2.0, ControlGains::default()).unwrap();
        assert_eq!(control.phase(), Phase::Idle);
        assert!(control.target().is_none());

        let step = control.step(&Pose::new(1.0, 1.0, FRAC_PI_2));
        assert_eq!(control.phase(), Phase::Converging);
        let target = control.target().unwrap();
        assert!((target.x - 1.0).abs() < 1e-12);
        assert!((target.y - 3.0).abs() < 1e-12);

        // Far from the target the command saturates.
        assert_eq!(step, ControlStep::Command(VelocityCommand::linear(1.0)));

        // Later poses do not move the anchor.
        control.step(&Pose::new(1.0, 2.0, 0.0));
        assert_eq!(control.target(), Some(target));
    }

    #[test]
    fn forward_speed_is_proportional_near_target() {
        let mut control = ForwardControl::new(1.0, ControlGains::default()).unwrap();
        control.step(&Pose::new(0.0, 0.0, 0.0));

        match control.step(&Pose::new(0.98, 0.0, 0.0)) {
            ControlStep::Command(cmd) => {
                assert!((cmd.linear - 0.4).abs() < 1e-9);
                assert_eq!(cmd.angular, 0.0);
            }
            other => panic!("expected a command, got {other:?}"),
        }

        assert_eq!(
            control.step(&Pose::new(0.995, 0.0, 0.0)),
            ControlStep::Converged(VelocityCommand::HALT)
        );
        assert_eq!(control.phase(), Phase::Done);
    }

    #[test]
    fn negative_distance_drives_in_reverse() {
        let mut control = ForwardControl::new(-1.0, ControlGains::default()).unwrap();
        match control.step(&Pose::new(0.0, 0.0, 0.0)) {
            ControlStep::Command(cmd) => assert_eq!(cmd.linear, -1.0),
            other => panic!("expected a command, got {other:?}"),
        }
        assert!((control.target().unwrap().x + 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_distance_converges_immediately() {
        let mut control = ForwardControl::new(0.0, ControlGains::default()).unwrap();
        assert_eq!(
            control.step(&Pose::new(4.0, 4.0, 1.0)),
            ControlStep::Converged(VelocityCommand::HALT)
        );
    }

    #[test]
    fn rotate_sign_follows_error() {
        let gains = ControlGains::default();

        let mut left = RotateControl::new(90.0, gains).unwrap();
        match left.step(&Pose::new(0.0, 0.0, 0.0)) {
            ControlStep::Command(cmd) => assert!((cmd.angular - 10.0 * FRAC_PI_2).abs() < 1e-9),
            other => panic!("expected a command, got {other:?}"),
        }

        let mut right = RotateControl::new(-90.0, gains).unwrap();
        match right.step(&Pose::new(0.0, 0.0, 0.0)) {
            ControlStep::Command(cmd) => {
                assert!((cmd.angular + 10.0 * FRAC_PI_2).abs() < 1e-9);
                assert_eq!(cmd.linear, 0.0);
            }
            other => panic!("expected a command, got {other:?}"),
        }
    }

    #[test]
    fn rotate_target_wraps_across_pi() {
        let mut control = RotateControl::new(120.0, ControlGains::default()).unwrap();
        control.step(&Pose::new(0.0, 0.0, 2.0));
        let target = control.target().unwrap();
        assert!((target - normalize_angle(2.0 + 120f64.to_radians())).abs() < 1e-12);
        assert!(target < 0.0);

        // Error is taken the short way round, not through zero.
        let err = control.error(&Pose::new(0.0, 0.0, 3.1)).unwrap();
        assert!(err > 0.0 && err < 1.0);
    }

    #[test]
    fn non_finite_arguments_are_rejected() {
        let gains = ControlGains::default();
        assert!(matches!(
            ForwardControl::new(f64::NAN, gains),
            Err(ControlError::InvalidArgument(_))
        ));
        assert!(matches!(
            RotateControl::new(f64::INFINITY, gains),
            Err(ControlError::InvalidArgument(_))
        ));
    }
}
