//! Agent pose and the single-slot tracker fed by the external pose feed.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Maps any angle (radians) into `(-π, π]`.
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle.sin().atan2(angle.cos());
    // atan2 may return exactly -π, which belongs to the other end of the interval.
    if a <= -PI { a + 2.0 * PI } else { a }
}

/// Planar position and heading of the agent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    /// Heading in radians, normalized to `(-π, π]`.
    pub theta: f64,
}

impl Pose {
    /// Creates a pose, normalizing `theta`.
    pub fn new(x: f64, y: f64, theta: f64) -> Self {
        Self {
            x,
            y,
            theta: normalize_angle(theta),
        }
    }

    pub fn position(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    /// Unit vector along the current heading.
    pub fn heading(&self) -> DVec2 {
        DVec2::from_angle(self.theta)
    }
}

/// Holds the most recent pose delivered by the pose feed.
///
/// Overwrite semantics: no history and no interpolation. The slot is empty until
/// the first update arrives.
#[derive(Clone, Debug, Default)]
pub struct PoseTracker {
    latest: Option<Pose>,
}

impl PoseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry point for the pose feed.
    pub fn update(&mut self, pose: Pose) {
        tracing::debug!(
            "POSE: ({:.2}; {:.2}, theta={:.4}°)",
            pose.x,
            pose.y,
            pose.theta.to_degrees()
        );
        self.latest = Some(pose);
    }

    pub fn current(&self) -> Option<Pose> {
        self.latest
    }

    pub fn is_known(&self) -> bool {
        self.latest.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_stays_in_half_open_interval() {
        for i in -100..=100 {
            let a = i as f64 * 0.37;
            let n = normalize_angle(a);
            assert!(n > -PI && n <= PI, "{a} normalized to {n}");
        }
        assert!((normalize_angle(-PI) - PI).abs() < 1e-12);
        assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-9);
    }

    #[test]
    fn normalize_is_idempotent() {
        for i in -50..=50 {
            let once = normalize_angle(i as f64 * 0.91);
            assert!((normalize_angle(once) - once).abs() < 1e-12);
        }
    }

    #[test]
    fn tracker_overwrites_latest_pose() {
        let mut tracker = PoseTracker::new();
        assert!(tracker.current().is_none());

        tracker.update(Pose::new(1.0, 2.0, 0.5));
        tracker.update(Pose::new(3.0, 4.0, -0.5));

        let pose = tracker.current().unwrap();
        assert_eq!(pose.position(), DVec2::new(3.0, 4.0));
        assert_eq!(pose.theta, -0.5);
    }
}
