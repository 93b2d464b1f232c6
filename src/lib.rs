//! # koch-turtle
//!
//! Drives a planar point-mass agent (a "turtle" with position and heading) along
//! procedurally generated paths using closed-loop proportional control.
//!
//! The crate splits into two halves:
//! - *Control*: [`MotionDriver`] runs the [`ForwardControl`] and [`RotateControl`]
//!   state machines against a live [`PoseTracker`], emitting [`VelocityCommand`]s
//!   into a [`CommandSink`] and pumping an [`EventPump`] between ticks.
//! - *Paths*: [`edge`] and [`snowflake`] decompose a Koch curve into an ordered
//!   sequence of primitive calls on any [`MotionPrimitives`] implementation.
//!
//! Transports are collaborators. [`SimTurtle`] implements both sides with a
//! kinematic simulation, so the whole stack runs without real time passing.

pub mod config;
pub mod error;
pub mod interpreter;
pub mod motion;
pub mod path;
pub mod pose;
pub mod runner;
pub mod sim;

pub use config::*;
pub use error::*;
pub use interpreter::*;
pub use motion::*;
pub use path::*;
pub use pose::*;
pub use runner::*;
pub use sim::*;
