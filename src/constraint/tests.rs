use super::pattern::translate;
use super::{Condition, Constraint, ConstraintMeta, ConstraintRegistry, Pattern};
use crate::param::ParamDescriptor;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn no_meta() -> ConstraintMeta {
    ConstraintMeta::new()
}

fn check(registry: &ConstraintRegistry, name: &str, position: usize, value: &str) -> bool {
    registry
        .test_constraint(&ParamDescriptor::scalar(name, position), value, &no_meta())
        .expect("constraint evaluation")
}

#[test]
fn test_default_id_constraint() {
    let registry = ConstraintRegistry::with_defaults();
    assert!(check(&registry, "id", 0, "42"));
    assert!(!check(&registry, "id", 0, "abc"));
    // Pinned to position 0, so a same-named parameter elsewhere is unconstrained
    assert!(check(&registry, "id", 1, "abc"));
}

#[test]
fn test_default_page_constraint() {
    let registry = ConstraintRegistry::with_defaults();
    assert!(check(&registry, "page", 0, "p10"));
    assert!(check(&registry, "page", 3, "p10"));
    assert!(!check(&registry, "page", 0, "page10"));
    assert!(!check(&registry, "page", 0, "10"));
}

#[test]
fn test_default_constraints_reject_non_ascii_digits() {
    let registry = ConstraintRegistry::with_defaults();
    // Arabic-Indic four-two and fullwidth one-zero
    assert!(!check(&registry, "id", 0, "\u{0664}\u{0662}"));
    assert!(!check(&registry, "page", 0, "p\u{FF11}\u{FF10}"));
    assert!(!check(&registry, "page", 2, "p\u{0661}"));
    assert!(check(&registry, "id", 0, "42"));
    assert!(check(&registry, "page", 0, "p10"));
}

#[test]
fn test_unconfigured_name_is_permissive() {
    let registry = ConstraintRegistry::with_defaults();
    let param = ParamDescriptor::scalar("title", 0);
    assert!(!registry.has_constraint(&param));
    assert!(check(&registry, "title", 0, ""));
    assert!(check(&registry, "title", 0, "anything at all"));
}

#[test]
fn test_has_constraint_honours_position() {
    let registry = ConstraintRegistry::with_defaults();
    assert!(registry.has_constraint(&ParamDescriptor::scalar("id", 0)));
    assert!(!registry.has_constraint(&ParamDescriptor::scalar("id", 2)));
    assert!(registry.has_constraint(&ParamDescriptor::scalar("Page", 5)));
}

#[test]
fn test_set_constraint_string_becomes_pattern() {
    let mut registry = ConstraintRegistry::new();
    registry.set_constraint("Foo", r"/^\d+$/");
    let constraint = registry.constraint("foo").expect("stored under lower-case name");
    assert_eq!(constraint.regex(), Some(r"/^\d+$/"));
    assert!(constraint.callback().is_none());
    assert!(constraint.position().is_none());
    assert!(registry.constraint("FOO").is_some());
}

#[test]
fn test_callback_takes_precedence_over_regex() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let constraint = Constraint::new()
        .with_regex(r"^\d+$")
        .with_callback(move |v| {
            seen.fetch_add(1, Ordering::SeqCst);
            v.starts_with('x')
        });

    let mut registry = ConstraintRegistry::new();
    registry.set_constraint("bar", constraint);

    assert!(check(&registry, "bar", 0, "xyz"));
    assert!(!check(&registry, "bar", 0, "123"));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_set_constraint_callback() {
    let mut registry = ConstraintRegistry::new();
    registry.set_constraint("bar", Condition::callback(|v| v.len() == 3));
    let constraint = registry.constraint("bar").expect("stored");
    assert!(constraint.callback().is_some());
    assert!(constraint.regex().is_none());
    assert!(check(&registry, "bar", 4, "abc"));
    assert!(!check(&registry, "bar", 4, "abcd"));
}

#[test]
fn test_constraint_without_rule_passes() {
    let mut registry = ConstraintRegistry::new();
    registry.set_constraint("marker", Constraint::new().with_meta("method", "GET"));
    let param = ParamDescriptor::scalar("marker", 0);
    assert!(registry.has_constraint(&param));
    assert!(check(&registry, "marker", 0, "whatever"));
}

#[test]
fn test_empty_pattern_is_ignored() {
    let mut registry = ConstraintRegistry::new();
    registry.set_constraint("q", "");
    assert!(check(&registry, "q", 0, "anything"));
}

#[test]
fn test_meta_mismatch_fails() {
    let mut registry = ConstraintRegistry::new();
    registry.set_constraint(
        "action",
        Constraint::new().with_regex("^edit$").with_meta("method", "POST"),
    );
    let param = ParamDescriptor::scalar("action", 1);

    let mut meta = ConstraintMeta::new();
    meta.insert("method".into(), json!("GET"));
    assert!(!registry.test_constraint(&param, "edit", &meta).expect("eval"));

    meta.insert("method".into(), json!("POST"));
    assert!(registry.test_constraint(&param, "edit", &meta).expect("eval"));
    assert!(!registry.test_constraint(&param, "view", &meta).expect("eval"));
}

#[test]
fn test_meta_keys_unknown_to_constraint_are_ignored() {
    let registry = ConstraintRegistry::with_defaults();
    let mut meta = ConstraintMeta::new();
    meta.insert("method".into(), json!("DELETE"));
    let param = ParamDescriptor::scalar("page", 0);
    assert!(registry.test_constraint(&param, "p2", &meta).expect("eval"));
}

#[test]
fn test_meta_can_require_position_and_regex() {
    let registry = ConstraintRegistry::with_defaults();
    let param = ParamDescriptor::scalar("id", 0);

    let mut meta = ConstraintMeta::new();
    meta.insert("position".into(), json!(0));
    assert!(registry.test_constraint(&param, "7", &meta).expect("eval"));

    meta.insert("regex".into(), json!("^[a-z]+$"));
    assert!(!registry.test_constraint(&param, "7", &meta).expect("eval"));
}

#[test]
fn test_invalid_pattern_propagates() {
    let mut registry = ConstraintRegistry::new();
    registry.set_constraint("broken", "^(unclosed$");
    let param = ParamDescriptor::scalar("broken", 0);
    let err = registry
        .test_constraint(&param, "value", &no_meta())
        .expect_err("invalid pattern must be an error");
    assert!(err.to_string().contains("^(unclosed$"));
}

#[test]
fn test_invalid_pattern_not_consulted_when_callback_set() {
    let mut registry = ConstraintRegistry::new();
    registry.set_constraint(
        "ok",
        Constraint::new().with_regex("^(bad").with_callback(|_| true),
    );
    assert!(check(&registry, "ok", 0, "x"));
}

#[test]
fn test_set_constraints_replaces_table() {
    let mut registry = ConstraintRegistry::with_defaults();
    let mut table = HashMap::new();
    table.insert("Slug".to_string(), Constraint::new().with_regex("^[a-z]+$"));
    registry.set_constraints(table);

    assert!(registry.constraint("id").is_none());
    assert!(registry.constraint("page").is_none());
    assert!(registry.constraint("slug").is_some());
    assert!(check(&registry, "id", 0, "abc"));
}

#[test]
fn test_round_trip_is_idempotent() {
    let mut registry = ConstraintRegistry::with_defaults();
    registry.set_constraint("cb", Condition::callback(|_| false));
    let before = registry.clone();

    let table = registry.constraints().clone();
    registry.set_constraints(table);
    assert_eq!(registry, before);
}

#[test]
fn test_delimited_pattern_translation() {
    assert_eq!(translate(r"/^\d+$/"), "^[0-9]+$");
    assert_eq!(translate(r"#^p\d+$#i"), "(?i)^p[0-9]+$");
    assert_eq!(translate(r"~^a/b$~u"), r"^a/b$");
    assert_eq!(translate(r"^\d+$"), r"^\d+$");
    // Trailing text that is not a flag list means the pattern is bare
    assert_eq!(translate("/users/{id}"), "/users/{id}");
}

#[test]
fn test_case_insensitive_flag() {
    let pattern = Pattern::new("/^draft$/i");
    assert!(pattern.is_match("DRAFT").expect("compile"));
    assert!(!pattern.is_match("drafts").expect("compile"));
}

#[test]
fn test_delimited_digit_class_is_ascii() {
    assert_eq!(translate(r"/^[\d-]+$/"), "^[0-9-]+$");
    assert_eq!(translate(r"/^\\d\d$/"), r"^\\d[0-9]$");
    assert_eq!(translate(r"/^\d+$/u"), r"^\d+$");

    let ascii = Pattern::new(r"/^\d+$/");
    assert!(ascii.is_match("2024").expect("compile"));
    assert!(!ascii.is_match("\u{0664}\u{0662}").expect("compile"));

    let unicode = Pattern::new(r"/^\d+$/u");
    assert!(unicode.is_match("\u{0664}\u{0662}").expect("compile"));
}

#[test]
fn test_leading_delimiter_always_means_delimited() {
    // Trailing flag letters after the last slash are read as flags
    assert_eq!(translate("/api/sim"), "(?sim)api");
    assert!(Pattern::new("/api/sim").is_match("xxapixx").expect("compile"));

    // Literal paths need another delimiter or a leading anchor
    let wrapped = Pattern::new("#^/api/sim$#");
    assert!(wrapped.is_match("/api/sim").expect("compile"));
    assert!(!wrapped.is_match("xxapixx").expect("compile"));

    let anchored = Pattern::new("^/api/sim$");
    assert_eq!(translate(anchored.as_str()), "^/api/sim$");
    assert!(anchored.is_match("/api/sim").expect("compile"));
    assert!(!anchored.is_match("/api/simx").expect("compile"));
}
