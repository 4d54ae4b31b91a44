//! Type-tagged literal checks (`<email user@example.com>`, `<url https://...>`).

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ast::{AstNode, Document, Range, Section, Value};
use crate::diagnostics::{invalid_type_tag, invalid_type_tag_value, TagValueProblem};
use crate::validation::ValidationReporter;

/// Tags the runtime knows how to interpret.
pub const KNOWN_TYPE_TAGS: &[&str] = &[
    "phone", "email", "url", "date", "time", "datetime", "duration", "zip", "zipcode", "currency",
    "money",
];

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid"));

pub fn check_type_tags<R: ValidationReporter>(doc: &Document, result: &mut R) {
    for section in &doc.sections {
        visit_section(section, result);
    }
}

fn visit_section<R: ValidationReporter>(section: &Section, result: &mut R) {
    for param in &section.parameters {
        visit_value(&param.value, result);
    }
    for node in &section.body {
        match node {
            AstNode::Section(child) => visit_section(child, result),
            AstNode::Attribute(attr) => visit_value(&attr.value, result),
            AstNode::MatchBlock(block) => {
                visit_value(&block.discriminant, result);
                for case in &block.cases {
                    visit_value(&case.pattern, result);
                    visit_value(&case.consequence, result);
                }
            }
            AstNode::Transition(transition) => {
                if let Some(operand) = &transition.operand {
                    visit_value(operand, result);
                }
                visit_value(&transition.target, result);
            }
            AstNode::Value(value) => visit_value(value, result),
        }
    }
}

fn visit_value<R: ValidationReporter>(value: &Value, result: &mut R) {
    match value {
        Value::TypeTag {
            tag, value, range, ..
        } => check_tag(tag, value, *range, result),
        Value::List { items, .. } => {
            for item in items {
                visit_value(item, result);
            }
        }
        Value::Dictionary { entries, .. } => {
            for item in entries.values() {
                visit_value(item, result);
            }
        }
        Value::ContextualizedValue { value, context, .. } => {
            visit_value(value, result);
            for param in context {
                visit_value(&param.value, result);
            }
        }
        _ => {}
    }
}

fn check_tag<R: ValidationReporter>(tag: &str, value: &str, range: Option<Range>, result: &mut R) {
    if !KNOWN_TYPE_TAGS.contains(&tag) {
        result.report(invalid_type_tag(tag, range));
        return;
    }
    let quoted = value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')));
    let problem = match tag {
        _ if quoted => Some(TagValueProblem::Quoted),
        _ if value.trim().is_empty() => Some(TagValueProblem::Empty),
        "email" if !EMAIL.is_match(value) => Some(TagValueProblem::NotAnEmail),
        "url" if !(value.starts_with("https://") || value.starts_with("http://")) => {
            Some(TagValueProblem::MissingScheme)
        }
        _ => None,
    };
    if let Some(problem) = problem {
        result.report(invalid_type_tag_value(tag, value, problem, range));
    }
}
