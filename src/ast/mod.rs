//! AST module for the RCL language
//!
//! This module provides the tree of typed nodes handed to the compiler by the
//! parsing collaborator. The compiler borrows a [`Document`] for the duration
//! of one compilation and never mutates it.

// ============================================================================
// IMPORTS
// ============================================================================

use serde::{Deserialize, Serialize};

pub mod builder;
pub mod value;

pub use value::Value;

// ============================================================================
// SECTION TYPE TAGS
// ============================================================================

/// Stable `sectionType` tags emitted by the parser.
pub mod kinds {
    pub const AGENT: &str = "agent";
    pub const FLOW: &str = "flow";
    pub const STATE: &str = "on";
    pub const MESSAGES: &str = "messages";
    pub const CONFIG: &str = "config";
    pub const CONFIGURATION: &str = "configuration";
    pub const DEFAULTS: &str = "defaults";
    pub const TEXT: &str = "text";
    pub const RICH_CARD: &str = "richCard";
    pub const CAROUSEL: &str = "carousel";
    pub const MESSAGE: &str = "message";

    /// Section tags that declare a message definition.
    pub const MESSAGE_TAGS: [&str; 4] = [TEXT, RICH_CARD, CAROUSEL, MESSAGE];

    /// State attributes that describe actions rather than transitions.
    pub const ACTION_ATTRIBUTES: [&str; 2] = ["entry", "exit"];

    /// Returns true if `tag` declares a message definition.
    pub fn is_message_tag(tag: &str) -> bool {
        MESSAGE_TAGS.contains(&tag)
    }
}

// ============================================================================
// SOURCE LOCATIONS
// ============================================================================

/// A 1-based line/column position in the source text.
///
/// # Examples
///
/// ```rust
/// use rcl_compiler::ast::Position;
/// let pos = Position::new(3, 7);
/// assert_eq!(pos.line, 3);
/// assert_eq!(pos.column, 7);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// A source range between two positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// A zero-width range at a single position.
    pub fn point(line: usize, column: usize) -> Self {
        let pos = Position::new(line, column);
        Self { start: pos, end: pos }
    }
}

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// The root of one parsed source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Document {
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
}

/// An identifier with its own source range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ident {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
}

/// A section parameter. Positional (shorthand) parameters have no key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
}

/// A section such as `agent Coffee`, `flow Order` or `on Welcome`.
///
/// # Examples
///
/// ```rust
/// use rcl_compiler::ast::builder::{section, string};
/// let agent = section("agent").named("Coffee").attr("displayName", string("Coffee")).build();
/// assert!(agent.is("agent"));
/// assert_eq!(agent.name(), Some("Coffee"));
/// assert!(agent.attribute("displayName").is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub section_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Ident>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub body: Vec<AstNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
}

/// A node in a section body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node")]
pub enum AstNode {
    Section(Section),
    Attribute(Attribute),
    MatchBlock(MatchBlock),
    Transition(DirectTransition),
    Value(Value),
}

/// A `key: value` attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub key: String,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
}

/// `match <discriminant>` followed by its cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchBlock {
    pub discriminant: Value,
    #[serde(default)]
    pub cases: Vec<MatchCase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
}

/// One `pattern -> consequence` line of a match block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCase {
    pub pattern: Value,
    pub consequence: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
}

/// `operand -> target [with ...]`, or `-> target` when the operand is omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectTransition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operand: Option<Value>,
    pub target: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
}

// ============================================================================
// PUBLIC API IMPLEMENTATION
// ============================================================================

impl Document {
    pub fn new(sections: Vec<Section>) -> Self {
        Self {
            sections,
            range: None,
        }
    }

    /// Collects sections of the given type in source order, from the top
    /// level and from one level of nesting inside `agent` sections.
    pub fn gather(&self, kind: &str) -> Vec<&Section> {
        let mut found = Vec::new();
        for section in &self.sections {
            if section.is(kind) {
                found.push(section);
            }
            if section.is(kinds::AGENT) {
                found.extend(section.child_sections().filter(|s| s.is(kind)));
            }
        }
        found
    }
}

impl Section {
    pub fn is(&self, kind: &str) -> bool {
        self.section_type == kind
    }

    pub fn name(&self) -> Option<&str> {
        self.identifier.as_ref().map(|ident| ident.value.as_str())
    }

    /// The start line, if the parser recorded one.
    pub fn line(&self) -> Option<usize> {
        self.range.map(|r| r.start.line)
    }

    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.body.iter().filter_map(|node| match node {
            AstNode::Attribute(attr) => Some(attr),
            _ => None,
        })
    }

    /// The first attribute with the given key.
    pub fn attribute(&self, key: &str) -> Option<&Attribute> {
        self.attributes().find(|attr| attr.key == key)
    }

    pub fn child_sections(&self) -> impl Iterator<Item = &Section> {
        self.body.iter().filter_map(|node| match node {
            AstNode::Section(section) => Some(section),
            _ => None,
        })
    }

    /// The first unlabeled parameter.
    pub fn first_positional(&self) -> Option<&Value> {
        self.parameters
            .iter()
            .find(|p| p.key.is_none())
            .map(|p| &p.value)
    }

    pub fn named_parameters(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.parameters
            .iter()
            .filter_map(|p| p.key.as_deref().map(|key| (key, &p.value)))
    }
}

impl AstNode {
    pub fn range(&self) -> Option<Range> {
        match self {
            AstNode::Section(s) => s.range,
            AstNode::Attribute(a) => a.range,
            AstNode::MatchBlock(m) => m.range,
            AstNode::Transition(t) => t.range,
            AstNode::Value(v) => v.range(),
        }
    }
}

impl MatchCase {
    /// True for the `:default` fallback case.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rcl_compiler::ast::builder::{atom, case, ident, string};
    /// assert!(case(atom("default"), ident("Start")).is_default());
    /// assert!(!case(string("default"), ident("Start")).is_default());
    /// ```
    pub fn is_default(&self) -> bool {
        matches!(
            &self.pattern,
            Value::Atom { value, .. } if value == "default" || value == ":default"
        )
    }
}
