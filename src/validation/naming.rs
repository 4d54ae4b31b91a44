//! Naming conventions.
//!
//! An optional pass layered on top of semantic validation. It never reports
//! errors, so it can never fail a compilation.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ast::{kinds, Document};
use crate::diagnostics::{invalid_agent_name, naming_convention, Severity};
use crate::validation::{ValidationReporter, ValidationResult};

/// Agent names that collide with section keywords.
pub const RESERVED_AGENT_NAMES: &[&str] = &["Config", "Defaults", "Messages"];

static PASCAL_CASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][A-Za-z0-9]*( [A-Z][A-Za-z0-9]*)*$").expect("pattern is valid"));
static CAMEL_CASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][A-Za-z0-9]*$").expect("pattern is valid"));
static SNAKE_CASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9]*(_[a-z0-9]+)*$").expect("pattern is valid"));

/// Checks agent, flow, state and message names against the house style.
///
/// Agents and flows should be PascalCase (warning), states should be
/// PascalCase (info) and messages camelCase or snake_case (info).
pub fn check_naming_conventions(doc: &Document) -> ValidationResult {
    let mut result = ValidationResult::new();

    for agent in doc.sections.iter().filter(|s| s.is(kinds::AGENT)) {
        let Some(name) = agent.name() else { continue };
        if RESERVED_AGENT_NAMES.contains(&name) {
            result.report(
                invalid_agent_name(name, "it is a reserved section name", agent.range)
                    .with_severity(Severity::Warning),
            );
        } else if !PASCAL_CASE.is_match(name) {
            result.report(naming_convention(
                "agent",
                name,
                "PascalCase",
                Severity::Warning,
                agent.range,
            ));
        }
    }

    for flow in doc.gather(kinds::FLOW) {
        if let Some(name) = flow.name() {
            if !PASCAL_CASE.is_match(name) {
                result.report(naming_convention(
                    "flow",
                    name,
                    "PascalCase",
                    Severity::Warning,
                    flow.range,
                ));
            }
        }
        for state in flow.child_sections().filter(|s| s.is(kinds::STATE)) {
            let Some(name) = state.name() else { continue };
            if !PASCAL_CASE.is_match(name) {
                result.report(naming_convention(
                    "state",
                    name,
                    "PascalCase",
                    Severity::Info,
                    state.range,
                ));
            }
        }
    }

    for messages in doc.gather(kinds::MESSAGES) {
        for message in messages.child_sections() {
            let Some(name) = message.name() else { continue };
            if !(CAMEL_CASE.is_match(name) || SNAKE_CASE.is_match(name)) {
                result.report(naming_convention(
                    "message",
                    name,
                    "camelCase or snake_case",
                    Severity::Info,
                    message.range,
                ));
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builder::*;
    use crate::diagnostics::ErrorCode;

    #[test]
    fn findings_are_never_errors() {
        let doc = document(vec![
            section("agent").named("coffee_shop").build(),
            section("flow")
                .named("main-flow")
                .child(section("on").named("welcome").build())
                .build(),
            section("messages")
                .child(section("text").named("Bad-Name").build())
                .build(),
        ]);
        let result = check_naming_conventions(&doc);
        assert!(result.is_valid());
        let found: Vec<_> = result
            .diagnostics()
            .iter()
            .map(|d| (d.code, d.severity))
            .collect();
        assert_eq!(
            found,
            vec![
                (ErrorCode::NamingConvention, Severity::Warning),
                (ErrorCode::NamingConvention, Severity::Warning),
                (ErrorCode::NamingConvention, Severity::Info),
                (ErrorCode::NamingConvention, Severity::Info),
            ]
        );
    }

    #[test]
    fn reserved_agent_name_warns() {
        let doc = document(vec![section("agent").named("Messages").build()]);
        let result = check_naming_conventions(&doc);
        assert_eq!(result.diagnostics()[0].code, ErrorCode::InvalidAgentName);
        assert_eq!(result.diagnostics()[0].severity, Severity::Warning);
    }

    #[test]
    fn conventional_names_are_quiet() {
        let doc = document(vec![
            section("agent").named("Coffee Shop").build(),
            section("flow")
                .named("OrderFlow")
                .child(section("on").named("Welcome").build())
                .build(),
            section("messages")
                .child(section("text").named("welcome_back").build())
                .child(section("text").named("orderPlaced").build())
                .build(),
        ]);
        assert!(check_naming_conventions(&doc).diagnostics().is_empty());
    }
}
