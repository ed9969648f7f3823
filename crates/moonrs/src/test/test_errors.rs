// Error taxonomy tests: encoding, syntax and structural failures
use crate::{CompileError, CompilerConfig, compile, compile_bytes, to_lua};

fn cfg() -> CompilerConfig {
    CompilerConfig {
        lint_global_variable: false,
        implicit_return_root: false,
        reserve_line_number: false,
        use_space_over_tab: false,
        line_offset: 0,
    }
}

#[test]
fn test_invalid_encoding() {
    let err = compile_bytes(&[0xff, 0xfe, 0x01], &cfg())
        .err()
        .expect("encoding error");
    assert!(matches!(err, CompileError::InvalidEncoding));
    assert_eq!(err.to_string(), "Invalid text encoding.");
}

#[test]
fn test_syntax_error_carries_caret_line() {
    let err = compile("x = = 1", &cfg()).err().expect("syntax error");
    let CompileError::Parse { message, line, .. } = &err else {
        panic!("expected parse error, got {:?}", err);
    };
    assert_eq!(*line, 1);
    assert!(message.starts_with("1: Syntax error.\n"));
    assert!(message.contains("x = = 1"));
    assert!(message.ends_with("^"));
}

#[test]
fn test_syntax_error_line_offset() {
    let mut config = cfg();
    config.line_offset = 100;
    let err = compile("x = = 1", &config).err().expect("syntax error");
    assert!(err.to_string().starts_with("101: Syntax error."));
}

#[test]
fn test_non_assignable_left_hand_side() {
    let err = compile("1 = 2", &cfg()).err().expect("logic error");
    let CompileError::Logic { message, .. } = &err else {
        panic!("expected logic error, got {:?}", err);
    };
    assert!(message.contains("Left hand expression is not assignable."));
}

#[test]
fn test_continue_outside_loop() {
    let err = compile("continue", &cfg()).err().expect("logic error");
    assert!(err.to_string().contains("Continue is not inside a loop."));
}

#[test]
fn test_short_dot_outside_with() {
    let err = compile(".name = 1", &cfg()).err().expect("logic error");
    assert!(
        err.to_string()
            .contains("Short dot/colon syntax must be called within a with block.")
    );
}

#[test]
fn test_trailing_expression_not_at_end() {
    let err = compile("1 + 2\nprint 3", &cfg()).err().expect("logic error");
    assert!(
        err.to_string()
            .contains("Expression list must appear at the end of body block.")
    );
}

#[test]
fn test_update_on_multiple_values_rejected() {
    let err = compile("a, b += 1", &cfg()).err().expect("logic error");
    assert!(
        err.to_string()
            .contains("Can not apply update to multiple values.")
    );
}

#[test]
fn test_slice_outside_star_iteration() {
    let err = compile("x = t[1, 2]", &cfg()).err().expect("logic error");
    assert!(err.to_string().contains("Slice syntax not supported here."));
}

#[test]
fn test_invalid_class_property_name() {
    let err = compile("class A\n  @@x: 1", &cfg()).err().expect("logic error");
    assert!(err.to_string().contains("Invalid class property name."));
}

#[test]
fn test_logic_error_reports_position() {
    let err = compile("x = 1\ncontinue", &cfg()).err().expect("logic error");
    let CompileError::Logic { line, .. } = &err else {
        panic!("expected logic error");
    };
    assert_eq!(*line, 2);
}

#[test]
fn test_error_clears_output_in_triple() {
    let (code, message, globals) = to_lua("continue", &cfg());
    assert!(code.is_empty());
    assert!(message.contains("Continue is not inside a loop."));
    assert!(globals.is_empty());
}
