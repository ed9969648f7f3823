// Class declaration lowering tests
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
fn test_plain_class_emits_metatable_idiom() {
    let output = lua("class A");
    assert!(output.starts_with("local A\ndo\n"), "got: {}", output);
    assert!(output.contains("local _class_0"));
    assert!(output.contains("local _base_0 = { }"));
    assert!(output.contains("_base_0.__index = _base_0"));
    assert!(output.contains("__init = function() end,"));
    assert!(output.contains("__base = _base_0"));
    assert!(output.contains("__name = \"A\""));
    assert!(output.contains("__index = _base_0,"));
    assert!(output.contains("__call = function(cls, ...)"));
    assert!(output.contains("local _self_0 = setmetatable({}, _base_0)"));
    assert!(output.contains("cls.__init(_self_0, ...)"));
    assert!(output.contains("_base_0.__class = _class_0"));
    assert!(output.contains("A = _class_0"));
}

#[test]
fn test_class_extends_parent() {
    let output = lua("class A extends B\n  new: => @x = 1");
    assert!(output.contains("local _parent_0 = B"));
    assert!(output.contains("setmetatable(_base_0, _parent_0.__base)"));
    assert!(output.contains("__init = function(self)"));
    assert!(output.contains("self.x = 1"));
    assert!(output.contains("__parent = _parent_0"));
    // Class metatable lookup falls through to the parent.
    assert!(output.contains("__index = function(cls, name)"));
    assert!(output.contains("local parent = rawget(cls, \"__parent\")"));
    // Inheritance hook runs after the body.
    assert!(output.contains("if _parent_0.__inherited then"));
    assert!(output.contains("_parent_0.__inherited(_parent_0, _class_0)"));
}

#[test]
fn test_new_member_becomes_init() {
    let output = lua("class A\n  new: (x) => @x = x");
    assert!(output.contains("__init = function(self, x)"));
    assert!(!output.contains("new ="));
}

#[test]
fn test_common_members_land_on_base() {
    let output = lua("class A\n  size: => 0");
    assert!(output.contains("size = function(self)"));
}

#[test]
fn test_default_init_calls_parent_when_extending() {
    let output = lua("class A extends B");
    assert!(output.contains("__init = function(self, ...)"));
    assert!(output.contains("return _class_0.__parent.__init(self, ...)"));
}

#[test]
fn test_super_call_passes_self() {
    let output = lua("class A extends B\n  m: => super!");
    assert!(
        output.contains("_class_0.__parent.__base.m(self)"),
        "got: {}",
        output
    );
}

#[test]
fn test_super_init_call() {
    let output = lua("class A extends B\n  new: => super 1");
    assert!(output.contains("_class_0.__parent.__init(self, 1)"));
}

#[test]
fn test_super_method_colon_switches_to_dot() {
    let output = lua("class A extends B\n  m: => super\\other 1");
    assert!(
        output.contains("_class_0.__parent.other(self, 1)"),
        "got: {}",
        output
    );
}

#[test]
fn test_bare_super_references_parent() {
    let output = lua("class A extends B\n  m: => super.other self");
    assert!(output.contains("_class_0.__parent.other(self)"));
}

#[test]
fn test_property_member_emitted_against_self() {
    let output = lua("class A\n  @static_var: 1");
    assert!(output.contains("local self = _class_0"));
    assert!(output.contains("static_var = 1"));
}

#[test]
fn test_class_expression_value() {
    let output = lua("x = class A");
    assert!(output.contains("local A"));
    assert!(output.contains("x = _class_0"));
}

#[test]
fn test_anonymous_class_takes_assigned_name() {
    let output = lua("Thing = class");
    assert!(output.contains("__name = \"Thing\""));
}

#[test]
fn test_class_statement_in_class_body() {
    let output = lua("class A\n  hidden = 1");
    assert!(output.contains("local hidden"));
    assert!(output.contains("hidden = 1"));
}
