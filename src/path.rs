//! Koch curve decomposition into motion primitives.
//!
//! Paths are expressed as ordered calls on a [`MotionPrimitives`] implementation.
//! Against a [`MotionDriver`](crate::MotionDriver) they move the turtle; against a
//! [`PathRecorder`] they just list the commands.

use crate::error::ControlError;
use crate::motion::MotionPrimitives;
use serde::{Deserialize, Serialize};

/// Deepest Koch recursion accepted.
///
/// An edge of depth `d` issues `4^d` forward moves and `4^d - 1` turns, each of
/// them a full closed-loop primitive. Depth 8 is already 65 536 moves.
pub const MAX_DEPTH: u32 = 8;

/// Turns between the four sub-edges of a Koch generator, in degrees.
pub const KOCH_TURNS: [f64; 3] = [-60.0, 120.0, -60.0];

/// Turn after each side of a closed triangle, in degrees.
pub const TRIANGLE_TURN: f64 = 120.0;

/// A single primitive call.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum PathCommand {
    /// `move_forward(distance)`.
    Forward(f64),
    /// `rotate(degrees)`.
    Rotate(f64),
}

impl PathCommand {
    pub fn apply<M: MotionPrimitives + ?Sized>(self, motion: &mut M) -> Result<(), ControlError> {
        match self {
            Self::Forward(distance) => motion.move_forward(distance),
            Self::Rotate(degrees) => motion.rotate(degrees),
        }
    }
}

/// Issues `commands` in order, stopping at the first error.
pub fn replay<M: MotionPrimitives + ?Sized>(
    motion: &mut M,
    commands: &[PathCommand],
) -> Result<(), ControlError> {
    commands.iter().try_for_each(|cmd| cmd.apply(motion))
}

pub(crate) fn check_length(length: f64) -> Result<(), ControlError> {
    if length.is_finite() {
        Ok(())
    } else {
        Err(ControlError::InvalidArgument(format!(
            "path length must be finite, found {length}"
        )))
    }
}

pub(crate) fn check_depth(depth: u32) -> Result<(), ControlError> {
    if depth <= MAX_DEPTH {
        Ok(())
    } else {
        Err(ControlError::InvalidArgument(format!(
            "Koch depth {depth} exceeds the maximum of {MAX_DEPTH}"
        )))
    }
}

/// Traces one Koch edge of the given `length` and recursion `depth`.
///
/// Depth 0 is a single straight move. Otherwise the edge becomes four sub-edges
/// of a third of the length, joined by turns of -60°, +120° and -60°.
pub fn edge<M: MotionPrimitives + ?Sized>(
    motion: &mut M,
    length: f64,
    depth: u32,
) -> Result<(), ControlError> {
    check_length(length)?;
    check_depth(depth)?;
    koch_edge(motion, length, depth)
}

fn koch_edge<M: MotionPrimitives + ?Sized>(
    motion: &mut M,
    length: f64,
    depth: u32,
) -> Result<(), ControlError> {
    if depth == 0 {
        return motion.move_forward(length);
    }

    let sub = length / 3.0;
    koch_edge(motion, sub, depth - 1)?;
    for turn in KOCH_TURNS {
        motion.rotate(turn)?;
        koch_edge(motion, sub, depth - 1)?;
    }
    Ok(())
}

/// Traces a closed Koch snowflake: three edges, each followed by a 120° turn.
pub fn snowflake<M: MotionPrimitives + ?Sized>(
    motion: &mut M,
    length: f64,
    depth: u32,
) -> Result<(), ControlError> {
    check_length(length)?;
    check_depth(depth)?;
    for _ in 0..3 {
        koch_edge(motion, length, depth)?;
        motion.rotate(TRIANGLE_TURN)?;
    }
    Ok(())
}

/// Traces a plain equilateral triangle with sides of `side`.
pub fn triangle<M: MotionPrimitives + ?Sized>(
    motion: &mut M,
    side: f64,
) -> Result<(), ControlError> {
    check_length(side)?;
    for _ in 0..3 {
        motion.move_forward(side)?;
        motion.rotate(TRIANGLE_TURN)?;
    }
    Ok(())
}

/// Records primitive calls instead of executing them.
#[derive(Clone, Debug, Default)]
pub struct PathRecorder {
    pub commands: Vec<PathCommand>,
}

impl PathRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn forward_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, PathCommand::Forward(_)))
            .count()
    }

    pub fn rotate_count(&self) -> usize {
        self.commands.len() - self.forward_count()
    }
}

impl MotionPrimitives for PathRecorder {
    fn move_forward(&mut self, distance: f64) -> Result<(), ControlError> {
        self.commands.push(PathCommand::Forward(distance));
        Ok(())
    }

    fn rotate(&mut self, degrees: f64) -> Result<(), ControlError> {
        self.commands.push(PathCommand::Rotate(degrees));
        Ok(())
    }
}

/// The command list for a single Koch edge.
pub fn edge_commands(length: f64, depth: u32) -> Result<Vec<PathCommand>, ControlError> {
    let mut recorder = PathRecorder::new();
    edge(&mut recorder, length, depth)?;
    Ok(recorder.commands)
}

/// The command list for a full Koch snowflake.
pub fn snowflake_commands(length: f64, depth: u32) -> Result<Vec<PathCommand>, ControlError> {
    let mut recorder = PathRecorder::new();
    snowflake(&mut recorder, length, depth)?;
    Ok(recorder.commands)
}
