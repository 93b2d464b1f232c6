// tests/koch_interpretation.rs
use koch_turtle::{
    PathCommand, TurtleConfig, TurtleInterpreter, TurtleOp, koch_snowflake_state,
    snowflake_commands,
};
use symbios::{SymbiosState, SymbolTable};

fn setup() -> (TurtleInterpreter, SymbolTable) {
    let mut interner = SymbolTable::new();
    let mut interpreter = TurtleInterpreter::new(TurtleConfig::default());

    interner.intern("F").unwrap();
    interner.intern("+").unwrap();
    interner.intern("-").unwrap();
    interner.intern("X").unwrap();

    interpreter.populate_standard_symbols(&interner);
    (interpreter, interner)
}

#[test]
fn test_default_params_and_ignored_symbols() {
    let (interpreter, interner) = setup();
    let f = interner.resolve_id("F").unwrap();
    let plus = interner.resolve_id("+").unwrap();
    let minus = interner.resolve_id("-").unwrap();
    let x = interner.resolve_id("X").unwrap();

    // Grammar: F(2) + X - F
    let mut state = SymbiosState::new();
    state.push(f, 0.0, &[2.0]).unwrap();
    state.push(plus, 0.0, &[]).unwrap();
    state.push(x, 0.0, &[]).unwrap();
    state.push(minus, 0.0, &[90.0]).unwrap();
    state.push(f, 0.0, &[]).unwrap();

    assert_eq!(
        interpreter.interpret(&state),
        vec![
            PathCommand::Forward(2.0),
            PathCommand::Rotate(60.0),
            PathCommand::Rotate(-90.0),
            PathCommand::Forward(1.0),
        ]
    );
}

#[test]
fn test_custom_map_overrides_standard() {
    let (_, interner) = setup();
    let f = interner.resolve_id("F").unwrap();

    let mut interpreter = TurtleInterpreter::new(TurtleConfig::default());
    interpreter.set_op(f, TurtleOp::Turn(1.0));

    let mut state = SymbiosState::new();
    state.push(f, 0.0, &[]).unwrap();
    assert_eq!(interpreter.interpret(&state), vec![PathCommand::Rotate(60.0)]);

    let cleared = TurtleInterpreter::new(TurtleConfig::default()).with_map(Vec::new());
    assert!(cleared.interpret(&state).is_empty());
}

#[test]
fn test_snowflake_string_matches_recursion() {
    for depth in 0..=3 {
        let (interpreter, mut interner) = setup();
        let state = koch_snowflake_state(&mut interner, 3.0, depth).unwrap();
        assert_eq!(
            interpreter.interpret(&state),
            snowflake_commands(3.0, depth).unwrap(),
            "depth {depth}"
        );
    }
}

#[test]
fn test_snowflake_string_rejects_bad_depth() {
    let mut interner = SymbolTable::new();
    assert!(koch_snowflake_state(&mut interner, 1.0, koch_turtle::MAX_DEPTH + 1).is_err());
    assert!(koch_snowflake_state(&mut interner, f64::NAN, 1).is_err());
}
