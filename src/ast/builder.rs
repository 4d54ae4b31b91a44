//! # AST Builder Module
//!
//! ## Purpose
//! Fluent constructors for assembling documents by hand, for tests, fixtures
//! and tools that synthesize RCL without going through the parser.
//!
//! ## Invariants
//! - Builders only assemble nodes; they never validate
//! - Ranges are absent unless set with `at`

use indexmap::IndexMap;

use super::{
    AstNode, Attribute, DirectTransition, Document, Ident, MatchBlock, MatchCase, Parameter,
    Range, Section, Value,
};

// ============================================================================
// VALUES
// ============================================================================

pub fn string(value: &str) -> Value {
    Value::String {
        value: value.to_string(),
        range: None,
    }
}

pub fn number(value: f64) -> Value {
    Value::Number { value, range: None }
}

pub fn boolean(value: bool) -> Value {
    Value::Boolean { value, range: None }
}

pub fn null() -> Value {
    Value::Null { range: None }
}

/// An atom, given with or without its leading colon.
pub fn atom(value: &str) -> Value {
    Value::Atom {
        value: value.trim_start_matches(':').to_string(),
        range: None,
    }
}

pub fn ident(value: &str) -> Value {
    Value::Identifier {
        value: value.to_string(),
        range: None,
    }
}

pub fn var(name: &str) -> Value {
    Value::Variable {
        name: name.to_string(),
        range: None,
    }
}

pub fn list(items: Vec<Value>) -> Value {
    Value::List { items, range: None }
}

pub fn dict(entries: Vec<(&str, Value)>) -> Value {
    let entries: IndexMap<String, Value> = entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    Value::Dictionary {
        entries,
        range: None,
    }
}

/// `value with key: v, ...`
pub fn with_context(value: Value, context: Vec<(&str, Value)>) -> Value {
    Value::ContextualizedValue {
        value: Box::new(value),
        context: context
            .into_iter()
            .map(|(k, v)| Parameter {
                key: Some(k.to_string()),
                value: v,
                range: None,
            })
            .collect(),
        range: None,
    }
}

/// `<tag value | qualifier>`
pub fn type_tag(tag: &str, value: &str, qualifier: Option<&str>) -> Value {
    Value::TypeTag {
        tag: tag.to_string(),
        value: value.to_string(),
        qualifier: qualifier.map(str::to_string),
        range: None,
    }
}

/// Sets the range of any value to a single position.
pub fn located(value: Value, line: usize, column: usize) -> Value {
    let at = Some(Range::point(line, column));
    match value {
        Value::String { value, .. } => Value::String { value, range: at },
        Value::Number { value, .. } => Value::Number { value, range: at },
        Value::Boolean { value, .. } => Value::Boolean { value, range: at },
        Value::Null { .. } => Value::Null { range: at },
        Value::Atom { value, .. } => Value::Atom { value, range: at },
        Value::Identifier { value, .. } => Value::Identifier { value, range: at },
        Value::Variable { name, .. } => Value::Variable { name, range: at },
        Value::List { items, .. } => Value::List { items, range: at },
        Value::Dictionary { entries, .. } => Value::Dictionary { entries, range: at },
        Value::ContextualizedValue { value, context, .. } => Value::ContextualizedValue {
            value,
            context,
            range: at,
        },
        Value::TypeTag {
            tag,
            value,
            qualifier,
            ..
        } => Value::TypeTag {
            tag,
            value,
            qualifier,
            range: at,
        },
    }
}

// ============================================================================
// NODES
// ============================================================================

pub fn document(sections: Vec<Section>) -> Document {
    Document::new(sections)
}

pub fn case(pattern: Value, consequence: Value) -> MatchCase {
    MatchCase {
        pattern,
        consequence,
        range: None,
    }
}

pub fn match_block(discriminant: Value, cases: Vec<MatchCase>) -> AstNode {
    AstNode::MatchBlock(MatchBlock {
        discriminant,
        cases,
        range: None,
    })
}

/// Starts a section of the given type.
pub fn section(kind: &str) -> SectionBuilder {
    SectionBuilder {
        section: Section {
            section_type: kind.to_string(),
            identifier: None,
            parameters: Vec::new(),
            body: Vec::new(),
            range: None,
        },
    }
}

/// Incrementally assembles a [`Section`].
#[derive(Debug, Clone)]
pub struct SectionBuilder {
    section: Section,
}

impl SectionBuilder {
    pub fn named(mut self, name: &str) -> Self {
        self.section.identifier = Some(Ident {
            value: name.to_string(),
            range: None,
        });
        self
    }

    /// Places the section at `line:column`.
    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.section.range = Some(Range::point(line, column));
        if let Some(ident) = self.section.identifier.as_mut() {
            ident.range = Some(Range::point(line, column));
        }
        self
    }

    /// Adds a positional parameter.
    pub fn param(mut self, value: Value) -> Self {
        self.section.parameters.push(Parameter {
            key: None,
            value,
            range: None,
        });
        self
    }

    pub fn param_named(mut self, key: &str, value: Value) -> Self {
        self.section.parameters.push(Parameter {
            key: Some(key.to_string()),
            value,
            range: None,
        });
        self
    }

    pub fn attr(mut self, key: &str, value: Value) -> Self {
        self.section.body.push(AstNode::Attribute(Attribute {
            key: key.to_string(),
            value,
            range: None,
        }));
        self
    }

    /// Adds an attribute located at `line`.
    pub fn attr_at(mut self, key: &str, value: Value, line: usize) -> Self {
        self.section.body.push(AstNode::Attribute(Attribute {
            key: key.to_string(),
            value,
            range: Some(Range::point(line, 3)),
        }));
        self
    }

    pub fn child(mut self, section: Section) -> Self {
        self.section.body.push(AstNode::Section(section));
        self
    }

    pub fn value(mut self, value: Value) -> Self {
        self.section.body.push(AstNode::Value(value));
        self
    }

    pub fn transition(mut self, operand: Option<Value>, target: Value) -> Self {
        self.section
            .body
            .push(AstNode::Transition(DirectTransition {
                operand,
                target,
                range: None,
            }));
        self
    }

    pub fn node(mut self, node: AstNode) -> Self {
        self.section.body.push(node);
        self
    }

    pub fn build(self) -> Section {
        self.section
    }
}

impl From<SectionBuilder> for Section {
    fn from(builder: SectionBuilder) -> Self {
        builder.build()
    }
}
