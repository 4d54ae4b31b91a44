//! Factory functions for diagnostics.
//!
//! Each factory builds a fully-formed diagnostic from minimal inputs. All of
//! them set a hint; the ones whose repair is a fixed snippet also carry a
//! quick fix.

use super::{Diagnostic, ErrorCode, Severity};
use crate::ast::Range;

const REPORT_HINT: &str = "This is likely a bug in the compiler. Please report it.";

// ============================================================================
// SYNTAX (reported by the parsing collaborator)
// ============================================================================

/// A section that requires a name was declared without one.
pub fn missing_identifier(context: &str, range: Option<Range>) -> Diagnostic {
    Diagnostic::new(
        ErrorCode::MissingIdentifier,
        format!("Missing identifier after '{context}'"),
    )
    .at(range)
    .with_hint(format!("Add a name after '{context}', for example: {context} MyName"))
}

pub fn invalid_indentation(expected: usize, found: usize, range: Option<Range>) -> Diagnostic {
    Diagnostic::new(
        ErrorCode::InvalidIndentation,
        format!("Invalid indentation: expected {expected} spaces, found {found}"),
    )
    .at(range)
    .with_hint("Use consistent indentation (2 spaces per level)")
}

pub fn unexpected_token(found: &str, expected: Option<&str>, range: Option<Range>) -> Diagnostic {
    let message = match expected {
        Some(expected) => format!("Unexpected '{found}', expected {expected}"),
        None => format!("Unexpected '{found}'"),
    };
    Diagnostic::new(ErrorCode::UnexpectedToken, message)
        .at(range)
        .with_hint("Check for typos or missing punctuation near this position")
}

pub fn missing_colon(after: &str, range: Option<Range>) -> Diagnostic {
    Diagnostic::new(
        ErrorCode::MissingColon,
        format!("Missing ':' after property '{after}'"),
    )
    .at(range)
    .with_hint("Properties are written as key: value")
    .with_fix("Insert colon", format!("{after}:"))
}

pub fn invalid_section_type(found: &str, range: Option<Range>) -> Diagnostic {
    Diagnostic::new(
        ErrorCode::InvalidSectionType,
        format!("Unknown section type '{found}'"),
    )
    .at(range)
    .with_hint("Valid sections include agent, flow, on, messages, config and defaults")
}

pub fn malformed_match_statement(detail: &str, range: Option<Range>) -> Diagnostic {
    Diagnostic::new(
        ErrorCode::MalformedMatchStatement,
        format!("Malformed match statement: {detail}"),
    )
    .at(range)
    .with_hint("Each case is written as: \"pattern\" -> TargetState")
}

// ============================================================================
// SEMANTIC
// ============================================================================

pub fn missing_required_field(field: &str, range: Option<Range>) -> Diagnostic {
    Diagnostic::new(
        ErrorCode::MissingRequiredField,
        format!("Missing required field: {field}"),
    )
    .at(range)
    .with_hint(format!("Add the {field} to your document"))
}

/// A second definition of something that must be unique.
///
/// `name` is `None` for section kinds that may only appear once per file.
pub fn duplicate_definition(kind: &str, name: Option<&str>, range: Option<Range>) -> Diagnostic {
    let (message, hint) = match name {
        Some(name) => (
            format!("Duplicate {kind} definition '{name}'"),
            format!("Rename or remove the repeated {kind} '{name}'"),
        ),
        None => (
            format!("Duplicate {kind} definition"),
            format!("Only one {kind} section is allowed per file"),
        ),
    };
    Diagnostic::new(ErrorCode::DuplicateDefinition, message)
        .at(range)
        .with_hint(hint)
}

pub fn invalid_agent_name(name: &str, reason: &str, range: Option<Range>) -> Diagnostic {
    Diagnostic::new(
        ErrorCode::InvalidAgentName,
        format!("Invalid agent name '{name}': {reason}"),
    )
    .at(range)
    .with_hint("Choose a different name for the agent")
}

pub fn missing_display_name(agent: &str, range: Option<Range>) -> Diagnostic {
    Diagnostic::new(
        ErrorCode::MissingDisplayName,
        format!("Agent '{agent}' must have a displayName property"),
    )
    .at(range)
    .with_hint("Add a displayName property to your agent definition")
    .with_fix("Add displayName", "  displayName: \"Your Agent Name\"")
}

pub fn empty_flow_section(flow: &str, range: Option<Range>) -> Diagnostic {
    Diagnostic::new(
        ErrorCode::EmptyFlowSection,
        format!("Flow '{flow}' has no states defined"),
    )
    .at(range)
    .with_hint("Add at least one state to your flow using \"on StateName\" syntax")
}

pub fn missing_flow_start(flow: &str, range: Option<Range>) -> Diagnostic {
    Diagnostic::new(
        ErrorCode::MissingFlowStart,
        format!("Flow '{flow}' must have a 'start' property"),
    )
    .at(range)
    .with_hint("Add a start property naming the first state of the flow")
    .with_fix("Add start state", "    start: InitialState")
}

pub fn empty_messages_section(range: Option<Range>) -> Diagnostic {
    Diagnostic::new(
        ErrorCode::EmptyMessagesSection,
        "Messages section contains no message definitions",
    )
    .at(range)
    .with_hint("Define at least one message, for example: text Welcome \"Hello!\"")
}

// ============================================================================
// REFERENCE
// ============================================================================

pub fn undefined_state_reference(state: &str, flow: &str, range: Option<Range>) -> Diagnostic {
    Diagnostic::new(
        ErrorCode::UndefinedStateReference,
        format!("Reference to undefined state '{state}' in flow '{flow}'"),
    )
    .at(range)
    .with_hint(format!(
        "Make sure to define an 'on {state}' section in your flow"
    ))
}

pub fn undefined_flow_reference(flow: &str, range: Option<Range>) -> Diagnostic {
    Diagnostic::new(
        ErrorCode::UndefinedFlowReference,
        format!("Reference to undefined flow '{flow}'"),
    )
    .at(range)
    .with_hint(format!("Define a 'flow {flow}' section or fix the name"))
}

// ============================================================================
// TYPE
// ============================================================================

pub fn invalid_type_tag(tag: &str, range: Option<Range>) -> Diagnostic {
    Diagnostic::new(ErrorCode::InvalidTypeTag, format!("Invalid type tag '{tag}'"))
        .at(range)
        .with_hint("Type tags are written as <type value>, for example <email user@example.com>")
}

pub fn type_mismatch(expected: &str, found: &str, context: &str, range: Option<Range>) -> Diagnostic {
    Diagnostic::new(
        ErrorCode::TypeMismatch,
        format!("Type mismatch in {context}: expected {expected}, found {found}"),
    )
    .at(range)
    .with_hint(format!("Use a value of type {expected} here"))
}

/// Why a type tag value was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagValueProblem {
    Quoted,
    Empty,
    NotAnEmail,
    MissingScheme,
}

/// Only quoted values get a quick fix; the other repairs need the author.
pub fn invalid_type_tag_value(
    tag: &str,
    value: &str,
    problem: TagValueProblem,
    range: Option<Range>,
) -> Diagnostic {
    let diag = Diagnostic::new(
        ErrorCode::InvalidTypeTagValue,
        format!("Invalid value '{value}' for type tag <{tag}>"),
    )
    .at(range);
    match problem {
        TagValueProblem::Quoted => {
            let inner = value.get(1..value.len().saturating_sub(1)).unwrap_or(value);
            diag.with_hint("Type tag values should not be quoted")
                .with_fix("Remove quotes", format!("<{tag} {inner}>"))
        }
        TagValueProblem::Empty => {
            diag.with_hint(format!("Write the value after the tag name: <{tag} value>"))
        }
        TagValueProblem::NotAnEmail => {
            diag.with_hint("Email values look like user@example.com")
        }
        TagValueProblem::MissingScheme => {
            diag.with_hint("URLs must start with http:// or https://")
        }
    }
}

// ============================================================================
// VALIDATION
// ============================================================================

pub fn invalid_property_name(property: &str, section: &str, range: Option<Range>) -> Diagnostic {
    Diagnostic::new(
        ErrorCode::InvalidPropertyName,
        format!("Property '{property}' is not allowed in '{section}' sections"),
    )
    .at(range)
    .with_hint("The agent name comes from its identifier, for example: agent CoffeeShop")
}

pub fn invalid_message_type(tag: &str, range: Option<Range>) -> Diagnostic {
    Diagnostic::new(
        ErrorCode::InvalidMessageType,
        format!("Unknown message type '{tag}'"),
    )
    .at(range)
    .with_hint("Messages are declared with text, richCard, carousel or message")
}

pub fn malformed_message_content(message: &str, detail: &str, range: Option<Range>) -> Diagnostic {
    Diagnostic::new(
        ErrorCode::MalformedMessageContent,
        format!("Message '{message}' has malformed content: {detail}"),
    )
    .at(range)
    .with_hint("Check the shape of the message attributes")
}

/// A naming-convention finding. Never an error.
pub fn naming_convention(
    kind: &str,
    name: &str,
    convention: &str,
    severity: Severity,
    range: Option<Range>,
) -> Diagnostic {
    Diagnostic::new(
        ErrorCode::NamingConvention,
        format!("{kind} name '{name}' should be {convention}"),
    )
    .at(range)
    .with_severity(severity)
    .with_hint(format!("Rename the {kind} to follow {convention}"))
}

pub fn duplicate_match_case(pattern: &str, range: Option<Range>) -> Diagnostic {
    Diagnostic::new(
        ErrorCode::DuplicateMatchCase,
        format!("Match case '{pattern}' appears more than once; only the first is used"),
    )
    .at(range)
    .with_severity(Severity::Warning)
    .with_hint("Remove the repeated case")
}

/// Two rules of one state produce the same event key.
pub fn duplicate_event(event: &str, state: &str, range: Option<Range>) -> Diagnostic {
    Diagnostic::new(
        ErrorCode::DuplicateMatchCase,
        format!("Event '{event}' is handled more than once in state '{state}'; only the first rule is used"),
    )
    .at(range)
    .with_severity(Severity::Warning)
    .with_hint("Remove the later rule or give it a different event")
}

// ============================================================================
// IO / INTERNAL
// ============================================================================

pub fn file_not_found(path: &str) -> Diagnostic {
    Diagnostic::new(ErrorCode::FileNotFound, format!("File not found: {path}"))
        .with_hint("Check that the path exists and is spelled correctly")
        .in_file(path)
}

pub fn file_read_error(path: &str, reason: &str) -> Diagnostic {
    Diagnostic::new(
        ErrorCode::FileReadError,
        format!("Could not read {path}: {reason}"),
    )
    .with_hint("Check file permissions and encoding")
    .in_file(path)
}

pub fn internal_error(detail: &str, range: Option<Range>) -> Diagnostic {
    Diagnostic::new(ErrorCode::InternalError, format!("Internal error: {detail}"))
        .at(range)
        .with_hint(REPORT_HINT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Category;

    #[test]
    fn every_factory_sets_a_hint() {
        let all = vec![
            missing_identifier("flow", None),
            invalid_indentation(2, 3, None),
            unexpected_token(")", Some("identifier"), None),
            missing_colon("displayName", None),
            invalid_section_type("agnet", None),
            malformed_match_statement("case without target", None),
            missing_required_field("agent section", None),
            duplicate_definition("agent", None, None),
            invalid_agent_name("Config", "reserved", None),
            missing_display_name("A", None),
            empty_flow_section("F", None),
            missing_flow_start("F", None),
            empty_messages_section(None),
            undefined_state_reference("X", "F", None),
            undefined_flow_reference("F", None),
            invalid_type_tag("1x", None),
            type_mismatch("identifier", "string", "flow start", None),
            invalid_type_tag_value("email", "\"a@b\"", TagValueProblem::Quoted, None),
            invalid_type_tag_value("url", "shop.com", TagValueProblem::MissingScheme, None),
            invalid_property_name("name", "config", None),
            invalid_message_type("video", None),
            malformed_message_content("m", "bad", None),
            naming_convention("agent", "coffee", "PascalCase", Severity::Warning, None),
            duplicate_match_case("yes", None),
            duplicate_event("match_a", "Welcome", None),
            file_not_found("a.ast.json"),
            file_read_error("a.ast.json", "denied"),
            internal_error("oops", None),
        ];
        for diag in all {
            assert!(diag.hint.is_some(), "{} has no hint", diag.code);
            assert_eq!(diag.category, diag.code.category());
        }
    }

    #[test]
    fn internal_errors_ask_for_a_report() {
        let diag = internal_error("state table out of sync", None);
        assert_eq!(diag.category, Category::Internal);
        assert!(diag.hint.as_deref().unwrap_or_default().contains("Please report"));
    }

    #[test]
    fn duplicate_definition_hint_depends_on_name() {
        let section = duplicate_definition("messages", None, None);
        assert_eq!(section.message, "Duplicate messages definition");
        assert_eq!(
            section.hint.as_deref(),
            Some("Only one messages section is allowed per file")
        );
        let named = duplicate_definition("state", Some("Welcome"), None);
        assert_eq!(named.message, "Duplicate state definition 'Welcome'");
    }

    #[test]
    fn reference_message_names_state_and_flow() {
        let diag = undefined_state_reference("Checkout", "Order", None);
        assert!(diag.message.contains("'Checkout'"));
        assert!(diag.message.contains("'Order'"));
        assert_eq!(diag.category, Category::Reference);
    }

    #[test]
    fn quoted_type_tag_fix_strips_quotes() {
        let diag = invalid_type_tag_value("email", "\"a@b.c\"", TagValueProblem::Quoted, None);
        assert_eq!(diag.quick_fixes[0].replacement, "<email a@b.c>");
        let single = invalid_type_tag_value("phone", "'555'", TagValueProblem::Quoted, None);
        assert_eq!(single.quick_fixes[0].replacement, "<phone 555>");
    }

    #[test]
    fn unquoted_type_tag_values_get_specific_hints_and_no_fix() {
        let url = invalid_type_tag_value("url", "shop.com", TagValueProblem::MissingScheme, None);
        assert_eq!(url.hint.as_deref(), Some("URLs must start with http:// or https://"));
        assert!(url.quick_fixes.is_empty());

        let email = invalid_type_tag_value("email", "shop", TagValueProblem::NotAnEmail, None);
        assert_eq!(email.hint.as_deref(), Some("Email values look like user@example.com"));
        assert!(email.quick_fixes.is_empty());

        let empty = invalid_type_tag_value("date", "", TagValueProblem::Empty, None);
        assert_eq!(empty.hint.as_deref(), Some("Write the value after the tag name: <date value>"));
        assert!(empty.quick_fixes.is_empty());
    }
}
