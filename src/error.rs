//! Error taxonomy for control and path generation.

use thiserror::Error;

/// Which primitive a [`ControlError::ConvergenceTimeout`] came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrimitiveKind {
    Forward,
    Rotate,
}

impl std::fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Forward => f.write_str("move_forward"),
            Self::Rotate => f.write_str("rotate"),
        }
    }
}

/// Errors raised while driving the turtle.
#[derive(Debug, Error)]
pub enum ControlError {
    /// No pose has been received yet.
    ///
    /// Primitives treat this as a no-op; it only surfaces when waiting for the
    /// first pose runs out of its tick budget.
    #[error("No pose has been received from the pose feed")]
    PoseUnavailable,

    /// A primitive did not converge within the configured tick budget.
    #[error("`{primitive}` did not converge within {ticks} ticks")]
    ConvergenceTimeout { primitive: PrimitiveKind, ticks: u64 },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Cannot read the configuration file: {0}")]
    ConfigRead(#[from] std::io::Error),

    #[error("Cannot parse the configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
}
