// Chain lowering tests: existential operators, method closures,
// keyword members, self shorthand
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
fn test_plain_chain() {
    assert_eq!(lua("x = a.b.c"), "local x = a.b.c\n");
}

#[test]
fn test_index_chain() {
    assert_eq!(lua("x = a[1].b"), "local x = a[1].b\n");
}

#[test]
fn test_colon_call() {
    assert_eq!(lua("obj\\method 1"), "obj:method(1)\n");
}

#[test]
fn test_bang_call() {
    assert_eq!(lua("f!"), "f()\n");
}

#[test]
fn test_method_closure() {
    let output = lua("f = tbl\\method");
    assert!(output.starts_with("local f\ndo\n"), "got: {}", output);
    assert!(output.contains("local _base_0 = tbl"));
    assert!(output.contains("local _fn_0 = _base_0.method"));
    assert!(output.contains("f = function(...)"));
    assert!(output.contains("return _fn_0(_base_0, ...)"));
}

#[test]
fn test_existential_mid_chain_assignment() {
    let output = lua("a = x?.y.z");
    assert_eq!(
        output,
        "local a\nif x ~= nil then\n\ta = x.y.z\nend\n"
    );
}

#[test]
fn test_existential_trailing_is_nil_check() {
    assert_eq!(lua("x = y?"), "local x = (y ~= nil)\n");
}

#[test]
fn test_existential_guard_for_call_statement() {
    assert_eq!(lua("f?!"), "if f ~= nil then\n\tf()\nend\n");
}

#[test]
fn test_existential_complex_prefix_binds_object() {
    let output = lua("a = f!?.x");
    assert!(output.contains("local _obj_0 = f()"));
    assert!(output.contains("if _obj_0 ~= nil then"));
    assert!(output.contains("a = _obj_0.x"));
}

#[test]
fn test_existential_in_expression_position() {
    let output = lua("g x?.y");
    assert!(output.contains("(function()"));
    assert!(output.contains("if x ~= nil then"));
    assert!(output.contains("return x.y"));
    assert!(output.contains("return nil"));
}

#[test]
fn test_keyword_colon_call_uses_string_index() {
    let output = lua("tbl\\end!");
    assert_eq!(output, "tbl[\"end\"](tbl)\n");
}

#[test]
fn test_keyword_dot_access_is_bracketed() {
    assert_eq!(lua("x = a.when"), "local x = a[\"when\"]\n");
}

#[test]
fn test_self_keyword_field_rewrites() {
    // `@end` emits a bracket access and passes self explicitly when
    // called.
    let output = lua("f = => @end 1");
    assert!(output.contains("self[\"end\"](self, 1)"));
}

#[test]
fn test_self_class_shorthand() {
    let output = lua("f = => @@items");
    assert!(output.contains("return self.__class.items"));
}

#[test]
fn test_string_base_call_is_parenthesized() {
    let output = lua("x = \"abc\"\\rep 2");
    assert!(output.contains("(\"abc\"):rep(2)"));
}

#[test]
fn test_dangling_dot_after_colon_needs_with() {
    // `.c` after `a\b` parses as a short-dot argument chain, which is
    // only meaningful inside a `with` block.
    let err = compile("x = a\\b.c", &cfg()).err().expect("logic error");
    assert!(
        err.to_string()
            .contains("Short dot/colon syntax must be called within a with block.")
    );
}

#[test]
fn test_with_short_colon_closure() {
    let output = lua("with obj\n  f = \\method");
    assert!(output.contains("local _base_0 = obj"));
    assert!(output.contains("local _fn_0 = _base_0.method"));
}
