//! Interpreter that converts an L-System symbol sequence into [`PathCommand`]s.
//!
//! The entry point is [`TurtleInterpreter`]. Configure it with a [`TurtleConfig`],
//! register symbol-to-operation mappings via [`TurtleInterpreter::set_op`] or
//! [`TurtleInterpreter::populate_standard_symbols`], then call
//! [`TurtleInterpreter::interpret`] with a [`symbios::SymbiosState`].
//!
//! [`koch_snowflake_state`] writes the fully expanded snowflake string, so the
//! same path can be produced either by recursion ([`snowflake`])
//! or by interpretation of a symbol stream.

use crate::error::ControlError;
use crate::motion::MotionPrimitives;
use crate::path::{PathCommand, check_depth, check_length, snowflake};
use symbios::{SymbiosState, SymbolTable};

/// Symbols used by [`TurtleInterpreter::populate_standard_symbols`].
pub const FORWARD_SYMBOL: &str = "F";
pub const LEFT_SYMBOL: &str = "+";
pub const RIGHT_SYMBOL: &str = "-";

/// Operations that can be performed by the path turtle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TurtleOp {
    /// Move forward (`F`). Param: `(length)`.
    Forward,
    /// Turn by the signed default angle (`+`/`-`). Param: `(degrees)`.
    Turn(f64),
    /// No-op. The symbol has no registered meaning.
    Ignore,
}

/// Configuration for path interpretation.
#[derive(Clone, Debug)]
pub struct TurtleConfig {
    /// Forward length if no parameter is provided.
    pub default_length: f64,
    /// Turn angle in degrees if no parameter is provided.
    pub default_angle: f64,
}

impl Default for TurtleConfig {
    fn default() -> Self {
        Self {
            default_length: 1.0,
            default_angle: 60.0,
        }
    }
}

/// Interprets L-System output as a sequence of motion primitives.
pub struct TurtleInterpreter {
    op_map: Vec<TurtleOp>,
    config: TurtleConfig,
}

impl TurtleInterpreter {
    /// Creates a new interpreter with the given configuration and an empty symbol map.
    pub fn new(config: TurtleConfig) -> Self {
        Self {
            op_map: Vec::new(),
            config,
        }
    }

    /// Replaces the entire symbol-to-operation map in one step (builder pattern).
    ///
    /// Any ID that falls outside the slice is treated as [`TurtleOp::Ignore`].
    pub fn with_map(mut self, map: Vec<TurtleOp>) -> Self {
        self.op_map = map;
        self
    }

    /// Assigns a single [`TurtleOp`] to a symbol ID, growing the map as needed.
    pub fn set_op(&mut self, sym_id: u16, op: TurtleOp) {
        let idx = sym_id as usize;
        if idx >= self.op_map.len() {
            self.op_map.resize(idx + 1, TurtleOp::Ignore);
        }
        self.op_map[idx] = op;
    }

    /// Maps `F`, `+` and `-` when present in `interner`.
    pub fn populate_standard_symbols(&mut self, interner: &SymbolTable) {
        let mappings = [
            (FORWARD_SYMBOL, TurtleOp::Forward),
            (LEFT_SYMBOL, TurtleOp::Turn(1.0)),
            (RIGHT_SYMBOL, TurtleOp::Turn(-1.0)),
        ];

        for (sym, op) in mappings {
            if let Some(id) = interner.resolve_id(sym) {
                self.set_op(id, op);
            }
        }
    }

    /// Walks every symbol in `state` in order and returns the primitive calls.
    ///
    /// A turn parameter is an unsigned magnitude; the op supplies the sign.
    /// Unmapped symbols are skipped.
    pub fn interpret(&self, state: &SymbiosState) -> Vec<PathCommand> {
        let mut commands = Vec::new();

        for i in 0..state.len() {
            let view = match state.get_view(i) {
                Some(v) => v,
                None => break,
            };

            let op = self
                .op_map
                .get(view.sym as usize)
                .unwrap_or(&TurtleOp::Ignore);

            let p = |idx: usize, def: f64| view.params.get(idx).copied().unwrap_or(def);

            match op {
                TurtleOp::Forward => {
                    commands.push(PathCommand::Forward(p(0, self.config.default_length)))
                }
                TurtleOp::Turn(s) => {
                    commands.push(PathCommand::Rotate(p(0, self.config.default_angle) * s))
                }
                TurtleOp::Ignore => {}
            }
        }

        commands
    }
}

fn encode_error<E: std::fmt::Debug>(err: E) -> ControlError {
    ControlError::InvalidArgument(format!("cannot encode L-System symbol: {err:?}"))
}

/// Interns the standard symbols and returns their IDs as `(F, +, -)`.
fn intern_standard(interner: &mut SymbolTable) -> Result<(u16, u16, u16), ControlError> {
    let mut ids = [0u16; 3];
    for (slot, sym) in ids
        .iter_mut()
        .zip([FORWARD_SYMBOL, LEFT_SYMBOL, RIGHT_SYMBOL])
    {
        interner.intern(sym).map_err(encode_error)?;
        *slot = interner.resolve_id(sym).ok_or_else(|| encode_error(sym))?;
    }
    Ok((ids[0], ids[1], ids[2]))
}

/// Writes primitive calls into a [`SymbiosState`] as `F`/`+`/`-` symbols.
struct KochWriter {
    forward: u16,
    left: u16,
    right: u16,
    state: SymbiosState,
}

impl MotionPrimitives for KochWriter {
    fn move_forward(&mut self, distance: f64) -> Result<(), ControlError> {
        self.state
            .push(self.forward, 0.0, &[distance])
            .map_err(encode_error)?;
        Ok(())
    }

    fn rotate(&mut self, degrees: f64) -> Result<(), ControlError> {
        let sym = if degrees < 0.0 { self.right } else { self.left };
        self.state
            .push(sym, 0.0, &[degrees.abs()])
            .map_err(encode_error)?;
        Ok(())
    }
}

/// Writes the expanded Koch snowflake as a parametric `F`/`+`/`-` string.
///
/// Interpreting the result with standard symbols yields exactly the command
/// sequence of [`snowflake`] for the same arguments.
pub fn koch_snowflake_state(
    interner: &mut SymbolTable,
    length: f64,
    depth: u32,
) -> Result<SymbiosState, ControlError> {
    check_length(length)?;
    check_depth(depth)?;

    let (forward, left, right) = intern_standard(interner)?;
    let mut writer = KochWriter {
        forward,
        left,
        right,
        state: SymbiosState::new(),
    };
    snowflake(&mut writer, length, depth)?;
    Ok(writer.state)
}
