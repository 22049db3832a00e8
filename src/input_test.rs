use super::*;

#[test]
fn parses_pointer_commands() {
    assert_eq!(
        parse_line("move 320 200"),
        Ok(Some(LocalInput::Pointer { kind: EventKind::Move, x: 320.0, y: 200.0 }))
    );
    assert_eq!(
        parse_line("DOWN 1.5 2"),
        Ok(Some(LocalInput::Pointer { kind: EventKind::Down, x: 1.5, y: 2.0 }))
    );
    assert_eq!(
        parse_line("  up 0 0  "),
        Ok(Some(LocalInput::Pointer { kind: EventKind::Up, x: 0.0, y: 0.0 }))
    );
}

#[test]
fn parses_control_commands() {
    assert_eq!(parse_line("resize 1024 768"), Ok(Some(LocalInput::Resize { width: 1024.0, height: 768.0 })));
    assert_eq!(parse_line("optout"), Ok(Some(LocalInput::OptOut)));
    assert_eq!(parse_line("quit"), Ok(Some(LocalInput::Quit)));
    assert_eq!(parse_line("exit"), Ok(Some(LocalInput::Quit)));
}

#[test]
fn skips_blank_lines_and_comments() {
    assert_eq!(parse_line(""), Ok(None));
    assert_eq!(parse_line("   "), Ok(None));
    assert_eq!(parse_line("# warm-up path"), Ok(None));
}

#[test]
fn rejects_unknown_command() {
    assert_eq!(parse_line("click 1 2"), Err(InputError::UnknownCommand("click".into())));
}

#[test]
fn rejects_wrong_arity() {
    assert_eq!(parse_line("move 1"), Err(InputError::Arity { command: "move", expected: 2 }));
    assert_eq!(parse_line("resize 1 2 3"), Err(InputError::Arity { command: "resize", expected: 2 }));
}

#[test]
fn rejects_non_numeric_and_non_finite_arguments() {
    assert_eq!(parse_line("move x 2"), Err(InputError::InvalidNumber("x".into())));
    assert_eq!(parse_line("move inf 2"), Err(InputError::InvalidNumber("inf".into())));
}
