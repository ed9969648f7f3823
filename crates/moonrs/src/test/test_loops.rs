// Loop and comprehension lowering tests
use crate::{CompilerConfig, compile};

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
fn test_numeric_for() {
    assert_eq!(
        lua("for i = 1, 10\n  print i"),
        "for i = 1, 10 do\n\tprint(i)\nend\n"
    );
}

#[test]
fn test_numeric_for_with_step() {
    let output = lua("for i = 10, 1, -1\n  print i");
    assert!(output.starts_with("for i = 10, 1, -1 do\n"));
}

#[test]
fn test_for_each() {
    assert_eq!(
        lua("for k, v in pairs t\n  print k"),
        "for k, v in pairs(t) do\n\tprint(k)\nend\n"
    );
}

#[test]
fn test_for_each_star_iteration() {
    let output = lua("for x in *items\n  print x");
    assert!(output.contains("for _index_0 = 1, #items do"));
    assert!(output.contains("local x = items[_index_0]"));
}

#[test]
fn test_star_slice_with_max_fixup() {
    let output = lua("for x in *items[2, n]\n  print x");
    assert!(output.contains("local _max_0 = n"));
    assert!(
        output.contains("for _index_0 = 2, _max_0 < 0 and #items + _max_0 or _max_0 do"),
        "got: {}",
        output
    );
    assert!(output.contains("local x = items[_index_0]"));
}

#[test]
fn test_while_loop() {
    assert_eq!(
        lua("while x\n  print x"),
        "while x do\n\tprint(x)\nend\n"
    );
}

#[test]
fn test_continue_rewrites_to_repeat_until() {
    let output = lua("while x\n  continue");
    assert!(output.contains("local _continue_0 = false"));
    assert!(output.contains("repeat"));
    assert!(output.contains("_continue_0 = true"));
    assert!(output.contains("until true"));
    assert!(output.contains("if not _continue_0 then"));
    assert!(output.contains("break"));
}

#[test]
fn test_continue_with_guard() {
    let output = lua("for i = 1, 10\n  continue if i > 5\n  print i");
    assert!(output.contains("repeat"));
    assert!(output.contains("if i > 5 then"));
    assert!(output.contains("until true"));
}

#[test]
fn test_break_stays_plain() {
    let output = lua("while x\n  break");
    assert_eq!(output, "while x do\n\tbreak\nend\n");
}

#[test]
fn test_list_comprehension_assignment() {
    assert_eq!(
        lua("xs = [i for i = 1, 10]"),
        "local xs\ndo\n\tlocal _accum_0 = { }\n\tlocal _len_0 = 1\n\tfor i = 1, 10 do\n\t\t_accum_0[_len_0] = i\n\t\t_len_0 = _len_0 + 1\n\tend\n\txs = _accum_0\nend\n"
    );
}

#[test]
fn test_comprehension_with_guard() {
    let output = lua("xs = [i for i = 1, 10 when i > 2]");
    assert!(output.contains("if i > 2 then"));
    assert!(output.contains("_accum_0[_len_0] = i"));
}

#[test]
fn test_comprehension_in_return_position() {
    let output = lua("f = -> [x for x in *t]");
    assert!(output.contains("local _accum_0 = { }"));
    assert!(output.contains("return _accum_0"));
}

#[test]
fn test_table_comprehension() {
    let output = lua("m = {k, v for k, v in pairs t}");
    assert!(output.contains("local _tbl_0 = { }"));
    assert!(output.contains("for k, v in pairs(t) do"));
    assert!(output.contains("_tbl_0[k] = v"));
    assert!(output.contains("m = _tbl_0"));
}

#[test]
fn test_table_comprehension_single_value_splits_pair() {
    let output = lua("m = {f x for x in *t}");
    assert!(output.contains("local _key_0, _val_0 = f(x)"));
    assert!(output.contains("_tbl_0[_key_0] = _val_0"));
}

#[test]
fn test_statement_comprehension_appendix() {
    let output = lua("print x for x in *t");
    assert!(output.contains("for _index_0 = 1, #t do"));
    assert!(output.contains("local x = t[_index_0]"));
    assert!(output.contains("print(x)"));
    assert!(output.ends_with("end\n"));
}

#[test]
fn test_for_as_expression_accumulates() {
    let output = lua("xs = for i = 1, 3\n  i * 2");
    assert!(output.contains("local _accum_0 = { }"));
    assert!(output.contains("local _len_0 = 1"));
    assert!(output.contains("_accum_0[_len_0] = i * 2"));
    assert!(output.contains("_len_0 = _len_0 + 1"));
    assert!(output.contains("xs = _accum_0"));
}

#[test]
fn test_while_as_expression_accumulates() {
    let output = lua("xs = while f!\n  1");
    assert!(output.contains("local _accum_0 = { }"));
    assert!(output.contains("while f() do"));
    assert!(output.contains("_accum_0[_len_0] = 1"));
    assert!(output.contains("xs = _accum_0"));
}

#[test]
fn test_loop_in_return_position() {
    let output = lua("f = -> return for i = 1, 2\n  i");
    assert!(output.contains("local _accum_0 = { }"));
    assert!(output.contains("_accum_0[_len_0] = i"));
    assert!(output.contains("return _accum_0"));
}

#[test]
fn test_destructuring_loop_variables() {
    let output = lua("for {a, b} in *pairs_list\n  print a");
    assert!(output.contains("local _des_0 = pairs_list[_index_0]"));
    assert!(output.contains("a, b = _des_0[1], _des_0[2]"));
}
