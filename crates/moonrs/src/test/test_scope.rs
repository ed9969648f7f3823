// Scope stack tests: shadowing barriers, export modes, fresh names
use crate::compiler::{ExportMode, ScopeStack};

#[test]
fn test_inner_scope_sees_outer() {
    let mut scopes = ScopeStack::new();
    scopes.push();
    scopes.force_add("a");
    scopes.push();
    assert!(scopes.is_defined("a"));
    scopes.pop();
    assert!(scopes.is_defined("a"));
}

#[test]
fn test_inner_definitions_invisible_outside() {
    let mut scopes = ScopeStack::new();
    scopes.push();
    scopes.push();
    assert!(scopes.add_to_scope("x"));
    scopes.pop();
    assert!(!scopes.is_defined("x"));
}

#[test]
fn test_add_to_scope_reports_new_definitions() {
    let mut scopes = ScopeStack::new();
    scopes.push();
    assert!(scopes.add_to_scope("x"));
    assert!(!scopes.add_to_scope("x"));
}

#[test]
fn test_allow_list_is_transparent_barrier() {
    let mut scopes = ScopeStack::new();
    scopes.push();
    scopes.force_add("a");
    scopes.force_add("b");
    scopes.push();
    scopes.mark_shadowed();
    scopes.add_to_allow_list("a");
    // Listed names stay visible through the barrier.
    assert!(scopes.is_defined("a"));
    // Unlisted names stop the outward search.
    assert!(!scopes.is_defined("b"));
    scopes.pop();
    assert!(scopes.is_defined("b"));
}

#[test]
fn test_shadow_all_with_empty_allow_list() {
    let mut scopes = ScopeStack::new();
    scopes.push();
    scopes.force_add("a");
    scopes.push();
    scopes.mark_shadowed();
    assert!(!scopes.is_defined("a"));
}

#[test]
fn test_fresh_names_avoid_collisions() {
    let mut scopes = ScopeStack::new();
    scopes.push();
    assert_eq!(scopes.fresh("_accum_"), "_accum_0");
    scopes.force_add("_accum_0");
    assert_eq!(scopes.fresh("_accum_"), "_accum_1");
    scopes.push();
    // Names from outer scopes still count.
    assert_eq!(scopes.fresh("_accum_"), "_accum_1");
}

#[test]
fn test_export_any_mode_defines_on_sight() {
    let mut scopes = ScopeStack::new();
    scopes.push();
    scopes.mark_exported(ExportMode::Any, false);
    assert!(scopes.is_defined("anything"));
}

#[test]
fn test_export_capital_mode_only_capitalized() {
    let mut scopes = ScopeStack::new();
    scopes.push();
    scopes.mark_exported(ExportMode::Capital, false);
    assert!(scopes.is_defined("Exported"));
    assert!(!scopes.is_defined("hidden"));
}

#[test]
fn test_export_list_restricts_names() {
    let mut scopes = ScopeStack::new();
    scopes.push();
    scopes.mark_exported(ExportMode::Any, true);
    scopes.add_exported("a");
    assert!(scopes.is_defined("a"));
    assert!(!scopes.is_defined("b"));
}

#[test]
fn test_solid_lookup_ignores_export_mode() {
    let mut scopes = ScopeStack::new();
    scopes.push();
    scopes.mark_exported(ExportMode::Any, false);
    assert!(!scopes.is_solid_defined("x"));
}
