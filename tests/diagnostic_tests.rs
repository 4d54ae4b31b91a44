//! Golden master tests for diagnostic output.
//!
//! These capture the exact text and wire shape of diagnostics so that
//! presentation stays stable across changes.

use serde_json::json;

use rcl_compiler::ast::{Position, Range};
use rcl_compiler::cli::diagnostics::render_diagnostic;
use rcl_compiler::diagnostics::{
    internal_error, missing_display_name, naming_convention, undefined_state_reference, Severity,
};

#[test]
fn display_form() {
    let diag = undefined_state_reference("Pay", "Order", Some(Range::point(12, 5)));
    assert_eq!(
        diag.to_string(),
        "error[RCL201]: Reference to undefined state 'Pay' in flow 'Order' (line 12, col 5)"
    );

    let info = naming_convention("state", "welcome", "PascalCase", Severity::Info, None);
    assert_eq!(
        info.to_string(),
        "info[RCL405]: state name 'welcome' should be PascalCase"
    );
}

#[test]
fn wire_form() {
    let diag = missing_display_name("Coffee", Some(Range::point(1, 1))).in_file("coffee.rcl");
    assert_eq!(
        serde_json::to_value(&diag).unwrap(),
        json!({
            "severity": "error",
            "category": "Semantic",
            "code": "RCL104",
            "message": "Agent 'Coffee' must have a displayName property",
            "range": {"start": {"line": 1, "column": 1}, "end": {"line": 1, "column": 1}},
            "file": "coffee.rcl",
            "hint": "Add a displayName property to your agent definition",
            "quickFixes": [{
                "label": "Add displayName",
                "replacement": "  displayName: \"Your Agent Name\"",
                "range": {"start": {"line": 1, "column": 1}, "end": {"line": 1, "column": 1}}
            }]
        })
    );
}

#[test]
fn minimal_form_drops_everything_but_message_range_and_severity() {
    let diag = missing_display_name("Coffee", Some(Range::point(1, 1)));
    assert_eq!(
        serde_json::to_value(diag.to_minimal()).unwrap(),
        json!({
            "message": "Agent 'Coffee' must have a displayName property",
            "range": {"start": {"line": 1, "column": 1}, "end": {"line": 1, "column": 1}},
            "severity": "error"
        })
    );
}

#[test]
fn internal_errors_ask_for_a_report() {
    let diag = internal_error("flow 'Main' has no initial state", None);
    let rendered = render_diagnostic(&diag, None, false);
    assert!(rendered.contains("RCL901"));
    assert!(rendered.contains("Internal error: flow 'Main' has no initial state"));
    assert!(rendered.contains("Please report it."));
}

#[test]
fn rendered_snippet_points_at_the_range() {
    let source = "flow Order\n  start: Pay\n  on Welcome\n";
    let range = Range::new(Position::new(2, 10), Position::new(2, 13));
    let diag = undefined_state_reference("Pay", "Order", Some(range)).in_file("order.rcl");
    let rendered = render_diagnostic(&diag, Some(source), false);
    assert!(rendered.contains("order.rcl:2:10"));
    assert!(rendered.contains("start: Pay"));
    assert!(rendered.contains("on 'Pay'") || rendered.contains("'on Pay'"));
}
