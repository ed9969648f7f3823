// End-to-end compile tests for the statement-level constructs
use crate::{CompilerConfig, compile, to_lua};

fn cfg() -> CompilerConfig {
    CompilerConfig {
        lint_global_variable: false,
        implicit_return_root: false,
        reserve_line_number: false,
        use_space_over_tab: false,
        line_offset: 0,
    }
}

fn lua(source: &str) -> String {
    compile(source, &cfg()).expect("compiles").code
}

#[test]
fn test_empty_input() {
    assert_eq!(lua(""), "");
}

#[test]
fn test_comments_only() {
    assert_eq!(lua("-- nothing here\n"), "");
}

#[test]
fn test_assignment_declares_local() {
    assert_eq!(lua("x = 1"), "local x = 1\n");
}

#[test]
fn test_reassignment_stays_plain() {
    assert_eq!(lua("x = 1\nx = 2"), "local x = 1\nx = 2\n");
}

#[test]
fn test_multiple_assignment() {
    assert_eq!(lua("a, b = 1, 2"), "local a, b = 1, 2\n");
}

#[test]
fn test_implicit_return_root() {
    let mut config = cfg();
    config.implicit_return_root = true;
    let output = compile("x = 1\n2 + 3", &config).expect("compiles");
    assert_eq!(output.code, "local x = 1\nreturn 2 + 3\n");
}

#[test]
fn test_call_statement() {
    assert_eq!(lua("print(\"hi\")"), "print(\"hi\")\n");
    assert_eq!(lua("print \"hi\""), "print(\"hi\")\n");
}

#[test]
fn test_if_as_expression() {
    assert_eq!(
        lua("y = if a then 1 else 2"),
        "local y\nif a then\n\ty = 1\nelse\n\ty = 2\nend\n"
    );
}

#[test]
fn test_if_statement_with_body() {
    assert_eq!(lua("if x\n\tprint 1"), "if x then\n\tprint(1)\nend\n");
}

#[test]
fn test_unless_negates_condition() {
    assert_eq!(lua("print x unless y"), "if not y then\n\tprint(x)\nend\n");
}

#[test]
fn test_if_line_appendix() {
    assert_eq!(lua("x = 1 if y"), "local x\nif y then\n\tx = 1\nend\n");
}

#[test]
fn test_if_with_inline_assignment_scopes_binding() {
    let output = lua("if v = f!\n\tprint v");
    assert!(output.starts_with("do\n"), "binding gets a do scope: {}", output);
    assert!(output.contains("local v = f()"));
    assert!(output.contains("if v then"));
}

#[test]
fn test_update_assignment() {
    assert_eq!(lua("a = 1\na += 2"), "local a = 1\na = a + 2\n");
    assert_eq!(lua("s = 'x'\ns ..= 'y'"), "local s = 'x'\ns = s .. 'y'\n");
}

#[test]
fn test_not_equals_operator() {
    assert_eq!(lua("x = a != b"), "local x = a ~= b\n");
}

#[test]
fn test_string_interpolation() {
    assert_eq!(
        lua("print \"a#{b}c\""),
        "print(\"a\" .. tostring(b) .. \"c\")\n"
    );
}

#[test]
fn test_single_string_newline_escape() {
    assert_eq!(lua("x = 'a\nb'"), "local x = 'a\\nb'\n");
}

#[test]
fn test_lua_string_passthrough() {
    assert_eq!(lua("x = [==[raw]==]"), "local x = [==[raw]==]\n");
}

#[test]
fn test_function_literal() {
    assert_eq!(lua("f = (a, b) -> a + b"), "local f = function(a, b)\n\treturn a + b\nend\n");
}

#[test]
fn test_fat_arrow_binds_self() {
    assert_eq!(lua("f = => @x"), "local f = function(self)\n\treturn self.x\nend\n");
}

#[test]
fn test_argument_default_value() {
    let output = lua("f = (a = 1) -> a");
    assert!(output.contains("if a == nil then"));
    assert!(output.contains("a = 1"));
}

#[test]
fn test_self_arg_assigns_through() {
    let output = lua("f = (@name) -> @name");
    assert!(output.contains("function(name)"));
    assert!(output.contains("self.name = name"));
}

#[test]
fn test_table_literal() {
    assert_eq!(lua("t = { a: 1 }"), "local t = {\n\ta = 1\n}\n");
}

#[test]
fn test_table_keyword_key_is_bracketed() {
    assert_eq!(lua("t = { end: 1 }"), "local t = {\n\t[\"end\"] = 1\n}\n");
}

#[test]
fn test_destructure_from_variable() {
    assert_eq!(lua("t = {}\n{a, b} = t"), "local t = { }\nlocal a, b = t[1], t[2]\n");
}

#[test]
fn test_destructure_key() {
    assert_eq!(lua("t = {}\n{x: a} = t"), "local t = { }\nlocal a = t.x\n");
}

#[test]
fn test_destructure_complex_rhs_binds_object() {
    let output = lua("{a, b} = f!");
    assert!(output.contains("do\n"));
    assert!(output.contains("local _obj_0 = f()"));
    assert!(output.contains("a, b = _obj_0[1], _obj_0[2]"));
}

#[test]
fn test_switch_lowering() {
    let output = lua("switch x\n  when 1\n    print 'one'\n  else\n    print 'other'");
    assert_eq!(
        output,
        "if 1 == x then\n\tprint('one')\nelse\n\tprint('other')\nend\n"
    );
}

#[test]
fn test_switch_multiple_values_or_chain() {
    let output = lua("switch x\n  when 1, 2\n    print 'low'");
    assert!(output.contains("if 1 == x or 2 == x then"));
}

#[test]
fn test_switch_complex_target_binds_temp() {
    let output = lua("switch f!\n  when 1\n    print 'one'");
    assert!(output.contains("local _exp_0 = f()"));
    assert!(output.contains("if 1 == _exp_0 then"));
}

#[test]
fn test_with_block_short_dot() {
    assert_eq!(lua("with obj\n  .name = \"x\""), "obj.name = \"x\"\n");
}

#[test]
fn test_with_block_fresh_variable() {
    let output = lua("with f!\n  .name = \"x\"");
    assert!(output.contains("local _with_0 = f()"));
    assert!(output.contains("_with_0.name = \"x\""));
}

#[test]
fn test_do_as_expression() {
    let output = lua("x = do\n  1");
    assert!(output.starts_with("local x\ndo\n"));
    assert!(output.contains("x = 1"));
}

#[test]
fn test_export_mode_suppresses_local() {
    assert_eq!(lua("export *\nx = 1"), "x = 1\n");
}

#[test]
fn test_export_capital_mode() {
    let output = lua("export ^\nTitle = 1\nsmall = 2");
    assert!(output.contains("Title = 1"));
    assert!(!output.contains("local Title"));
    assert!(output.contains("local small = 2"));
}

#[test]
fn test_export_values_assignment() {
    assert_eq!(lua("export a = 1"), "a = 1\n");
}

#[test]
fn test_local_star_predeclares() {
    assert_eq!(lua("local *\nx = 1"), "local x\nx = 1\n");
}

#[test]
fn test_local_capital_predeclares_capitalized_only() {
    let output = lua("local ^\nTitle = 1\nsmall = 2");
    assert!(output.starts_with("local Title\n"));
    assert!(output.contains("local small = 2"));
}

#[test]
fn test_local_names_force_declare() {
    let output = lua("local a, b\na = 1");
    assert!(output.starts_with("local a, b\n"));
    assert!(output.contains("a = 1"));
    assert!(!output.contains("local a = 1"));
}

#[test]
fn test_import_as_variable() {
    assert_eq!(lua("import \"foo.bar\""), "local bar = require('foo.bar')\n");
}

#[test]
fn test_import_from_object() {
    assert_eq!(
        lua("import insert from table"),
        "local insert = table.insert\n"
    );
}

#[test]
fn test_import_from_complex_object_binds_temp() {
    let output = lua("import insert from f!");
    assert!(output.starts_with("local insert\ndo\n"));
    assert!(output.contains("local _obj_0 = f()"));
    assert!(output.contains("insert = _obj_0.insert"));
}

#[test]
fn test_backcall_captures_rest_of_block() {
    let output = lua("(x) <- map list\nprint x");
    assert!(output.contains("map(list, function(x)"));
    assert!(output.contains("print(x)"));
}

#[test]
fn test_pipeline_operator() {
    assert_eq!(lua("x = 1 |> f"), "local x = f(1)\n");
}

#[test]
fn test_reserve_line_numbers() {
    let mut config = cfg();
    config.reserve_line_number = true;
    let output = compile("x = 1", &config).expect("compiles");
    assert_eq!(output.code, "local x = 1 -- 1\n");
}

#[test]
fn test_line_offset_applies() {
    let mut config = cfg();
    config.reserve_line_number = true;
    config.line_offset = 10;
    let output = compile("x = 1", &config).expect("compiles");
    assert_eq!(output.code, "local x = 1 -- 11\n");
}

#[test]
fn test_no_line_comments_when_disabled() {
    let output = lua("x = 1\ny = 2");
    assert!(!output.contains(" -- "));
}

#[test]
fn test_space_indentation_option() {
    let mut config = cfg();
    config.use_space_over_tab = true;
    let output = compile("if x\n  print 1", &config).expect("compiles");
    assert_eq!(output.code, "if x then\n  print(1)\nend\n");
}

#[test]
fn test_lint_globals_reported() {
    let mut config = cfg();
    config.lint_global_variable = true;
    let output = compile("print x", &config).expect("compiles");
    let names: Vec<&str> = output.globals.iter().map(|g| g.name.as_str()).collect();
    assert!(names.contains(&"print"));
    assert!(names.contains(&"x"));
    assert_eq!(output.globals[0].line, 1);
}

#[test]
fn test_lint_skips_defined_locals() {
    let mut config = cfg();
    config.lint_global_variable = true;
    let output = compile("x = 1\nprint x", &config).expect("compiles");
    let names: Vec<&str> = output.globals.iter().map(|g| g.name.as_str()).collect();
    assert!(!names.contains(&"x"));
}

#[test]
fn test_to_lua_triple_success() {
    let (code, err, _globals) = to_lua("x = 1", &cfg());
    assert_eq!(code, "local x = 1\n");
    assert!(err.is_empty());
}

#[test]
fn test_to_lua_triple_failure() {
    let (code, err, _globals) = to_lua("x = = 1", &cfg());
    assert!(code.is_empty());
    assert!(!err.is_empty());
}

#[test]
fn test_lua_subset_round_trip_shape() {
    // Constructs already in the Lua subset come out textually intact.
    assert_eq!(lua("x = 1"), "local x = 1\n");
    assert_eq!(lua("x = 1\nx = 2"), "local x = 1\nx = 2\n");
    assert_eq!(lua("x = \"s\""), "local x = \"s\"\n");
}
