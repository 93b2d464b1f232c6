//! Controller configuration.

use crate::error::ControlError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Proportional gains and convergence thresholds.
///
/// Immutable for the lifetime of a controller.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlGains {
    /// Gain applied to the Euclidean distance error.
    pub kp_distance: f64,
    /// A forward move converges once the distance error drops below this.
    pub distance_threshold: f64,
    /// Gain applied to the heading error (radians).
    pub kp_angle: f64,
    /// A rotation converges once the heading error drops below this (radians).
    pub angle_threshold: f64,
}

impl Default for ControlGains {
    fn default() -> Self {
        Self {
            kp_distance: 20.0,
            distance_threshold: 0.01,
            kp_angle: 10.0,
            angle_threshold: 0.001,
        }
    }
}

impl ControlGains {
    /// Rejects non-finite or non-positive values, which would either never
    /// converge or produce NaN commands.
    pub fn validate(&self) -> Result<(), ControlError> {
        let fields = [
            ("kp_distance", self.kp_distance),
            ("distance_threshold", self.distance_threshold),
            ("kp_angle", self.kp_angle),
            ("angle_threshold", self.angle_threshold),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(ControlError::InvalidArgument(format!(
                    "`{name}` must be finite and positive, found {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Full controller configuration, loadable from TOML.
///
/// ```toml
/// max_ticks = 5000
///
/// [gains]
/// kp_distance = 20.0
/// angle_threshold = 0.001
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    pub gains: ControlGains,

    /// Per-primitive tick budget. `None` waits for convergence indefinitely.
    pub max_ticks: Option<u64>,
}

impl ControlConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ControlError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ControlError> {
        let s = std::fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    pub fn validate(&self) -> Result<(), ControlError> {
        self.gains.validate()?;
        if self.max_ticks == Some(0) {
            return Err(ControlError::InvalidArgument(
                "`max_ticks` must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config = ControlConfig::from_toml_str("[gains]\nkp_angle = 4.0\n").unwrap();
        assert_eq!(config.gains.kp_angle, 4.0);
        assert_eq!(config.gains.kp_distance, 20.0);
        assert_eq!(config.gains.distance_threshold, 0.01);
        assert_eq!(config.max_ticks, None);
    }

    #[test]
    fn parses_tick_budget() {
        let config = ControlConfig::from_toml_str("max_ticks = 250").unwrap();
        assert_eq!(config.max_ticks, Some(250));
        assert_eq!(config.gains, ControlGains::default());
    }

    #[test]
    fn rejects_non_positive_gains() {
        let err = ControlConfig::from_toml_str("[gains]\ndistance_threshold = 0.0\n").unwrap_err();
        assert!(matches!(err, ControlError::InvalidArgument(_)));

        let err = ControlConfig::from_toml_str("max_ticks = 0").unwrap_err();
        assert!(matches!(err, ControlError::InvalidArgument(_)));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = ControlConfig::from_toml_str("gains = 3").unwrap_err();
        assert!(matches!(err, ControlError::ConfigParse(_)));
    }
}
