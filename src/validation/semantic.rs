pub mod references;
pub mod type_tags;

use std::collections::HashSet;

use crate::agent::RESERVED_PROPERTY;
use crate::ast::{kinds, AstNode, Document, Section};
use crate::diagnostics::{
    duplicate_definition, empty_flow_section, invalid_message_type, invalid_property_name,
    malformed_message_content, missing_display_name, missing_flow_start, missing_identifier,
    missing_required_field, type_mismatch,
};
use crate::extraction::message_content;
use crate::validation::{ValidationReporter, ValidationResult};

/// Placeholder used in messages about sections that have no identifier.
pub(crate) const UNNAMED: &str = "<unnamed>";

/// Validates a parsed document for structural completeness and reference
/// integrity. Every check runs on every call; one finding never hides another.
///
/// # Example
/// ```rust
/// use rcl_compiler::ast::builder::{document, ident, section, string};
/// use rcl_compiler::validation::semantic::validate_document;
///
/// let doc = document(vec![
///     section("agent").named("Coffee").attr("displayName", string("Coffee")).build(),
///     section("flow")
///         .named("Main")
///         .attr("start", ident("Welcome"))
///         .child(section("on").named("Welcome").build())
///         .build(),
///     section("messages")
///         .child(section("text").named("Hi").param(string("Hello")).build())
///         .build(),
/// ]);
/// let result = validate_document(&doc);
/// assert!(result.is_valid());
/// assert!(result.diagnostics().is_empty());
/// ```
pub fn validate_document(doc: &Document) -> ValidationResult {
    let mut result = ValidationResult::new();
    DocumentValidator::validate(doc, &mut result);
    result
}

/// Structural checks over agent, flow and messages sections.
pub struct DocumentValidator;

impl DocumentValidator {
    pub fn validate<R: ValidationReporter>(doc: &Document, result: &mut R) {
        Self::validate_agent(doc, result);
        let flows = doc.gather(kinds::FLOW);
        Self::validate_flows(doc, &flows, result);
        Self::validate_messages(doc, result);
        references::check_references(doc, &flows, result);
        type_tags::check_type_tags(doc, result);
    }

    fn validate_agent<R: ValidationReporter>(doc: &Document, result: &mut R) {
        let agents: Vec<&Section> = doc.sections.iter().filter(|s| s.is(kinds::AGENT)).collect();
        let Some((agent, extra)) = agents.split_first() else {
            result.report(missing_required_field("agent section", doc.range));
            return;
        };
        for duplicate in extra {
            result.report(duplicate_definition("agent", None, duplicate.range));
        }

        let name = match agent.name() {
            Some(name) if !name.trim().is_empty() => name,
            _ => {
                result.report(missing_identifier("agent", agent.range));
                UNNAMED
            }
        };

        match agent.attribute("displayName") {
            None => result.report(missing_display_name(name, agent.range)),
            Some(attr) => {
                let value = attr.value.unwrap_context().0;
                if value.as_str().is_none() {
                    result.report(type_mismatch(
                        "string",
                        value.kind_name(),
                        "displayName",
                        attr.range.or(agent.range),
                    ));
                }
            }
        }

        let property_sections = std::iter::once(*agent)
            .chain(doc.gather(kinds::CONFIG))
            .chain(doc.gather(kinds::CONFIGURATION))
            .chain(doc.gather(kinds::DEFAULTS));
        for section in property_sections {
            if let Some(attr) = section.attribute(RESERVED_PROPERTY) {
                result.report(invalid_property_name(
                    RESERVED_PROPERTY,
                    &section.section_type,
                    attr.range.or(section.range),
                ));
            }
        }
    }

    fn validate_flows<R: ValidationReporter>(doc: &Document, flows: &[&Section], result: &mut R) {
        if flows.is_empty() {
            result.report(missing_required_field("flow section", doc.range));
        }

        let mut seen = HashSet::new();
        for flow in flows {
            let name = match flow.name() {
                Some(name) => {
                    if !seen.insert(name) {
                        result.report(duplicate_definition("flow", Some(name), flow.range));
                    }
                    name
                }
                None => {
                    result.report(missing_identifier("flow", flow.range));
                    UNNAMED
                }
            };
            Self::validate_flow(name, flow, result);
        }
    }

    fn validate_flow<R: ValidationReporter>(name: &str, flow: &Section, result: &mut R) {
        match flow.attribute("start") {
            None => result.report(missing_flow_start(name, flow.range)),
            Some(attr) if attr.value.as_state_ref().is_none() => {
                result.report(type_mismatch(
                    "state identifier",
                    attr.value.unwrap_context().0.kind_name(),
                    &format!("start of flow '{name}'"),
                    attr.range.or(flow.range),
                ));
            }
            Some(_) => {}
        }

        let states: Vec<&Section> = flow.child_sections().filter(|s| s.is(kinds::STATE)).collect();
        if states.is_empty() {
            result.report(empty_flow_section(name, flow.range));
        }

        let mut seen = HashSet::new();
        for state in states {
            match state.name() {
                None => result.report(missing_identifier("on", state.range)),
                Some(state_name) => {
                    if !seen.insert(state_name) {
                        result.report(duplicate_definition("state", Some(state_name), state.range));
                    }
                }
            }
        }
    }

    fn validate_messages<R: ValidationReporter>(doc: &Document, result: &mut R) {
        let sections = doc.gather(kinds::MESSAGES);
        let Some((_, extra)) = sections.split_first() else {
            result.report(missing_required_field("messages section", doc.range));
            return;
        };
        for duplicate in extra {
            result.report(duplicate_definition("messages", None, duplicate.range));
        }

        let mut ids = HashSet::new();
        for messages in &sections {
            for node in &messages.body {
                if let AstNode::Section(definition) = node {
                    Self::validate_message(definition, &mut ids, result);
                }
            }
        }
    }

    fn validate_message<'a, R: ValidationReporter>(
        definition: &'a Section,
        ids: &mut HashSet<&'a str>,
        result: &mut R,
    ) {
        if !kinds::is_message_tag(&definition.section_type) {
            result.report(invalid_message_type(&definition.section_type, definition.range));
            return;
        }

        // Unnamed messages are legal; the catalog gives them ordinal ids.
        let label = match definition.name() {
            Some(id) => {
                if !ids.insert(id) {
                    result.report(duplicate_definition("message", Some(id), definition.range));
                }
                id.to_string()
            }
            None => format!("{UNNAMED} {}", definition.section_type),
        };

        if let Err(detail) = message_content(definition) {
            result.report(malformed_message_content(&label, &detail, definition.range));
        }
    }
}
