//! Literal values that appear in parameters, attributes and transitions.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Number};

use super::{Parameter, Range};

/// A literal value node.
///
/// Atoms are stored without their leading colon, although a colon is
/// tolerated wherever an atom is inspected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Value {
    String {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        range: Option<Range>,
    },
    Number {
        value: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        range: Option<Range>,
    },
    Boolean {
        value: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        range: Option<Range>,
    },
    Null {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        range: Option<Range>,
    },
    Atom {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        range: Option<Range>,
    },
    Identifier {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        range: Option<Range>,
    },
    Variable {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        range: Option<Range>,
    },
    List {
        #[serde(default)]
        items: Vec<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        range: Option<Range>,
    },
    Dictionary {
        #[serde(default)]
        entries: IndexMap<String, Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        range: Option<Range>,
    },
    ContextualizedValue {
        value: Box<Value>,
        #[serde(default)]
        context: Vec<Parameter>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        range: Option<Range>,
    },
    TypeTag {
        tag: String,
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        qualifier: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        range: Option<Range>,
    },
}

impl Value {
    pub fn range(&self) -> Option<Range> {
        match self {
            Value::String { range, .. }
            | Value::Number { range, .. }
            | Value::Boolean { range, .. }
            | Value::Null { range }
            | Value::Atom { range, .. }
            | Value::Identifier { range, .. }
            | Value::Variable { range, .. }
            | Value::List { range, .. }
            | Value::Dictionary { range, .. }
            | Value::ContextualizedValue { range, .. }
            | Value::TypeTag { range, .. } => *range,
        }
    }

    /// Human-readable node kind, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::String { .. } => "string",
            Value::Number { .. } => "number",
            Value::Boolean { .. } => "boolean",
            Value::Null { .. } => "null",
            Value::Atom { .. } => "atom",
            Value::Identifier { .. } => "identifier",
            Value::Variable { .. } => "variable",
            Value::List { .. } => "list",
            Value::Dictionary { .. } => "dictionary",
            Value::ContextualizedValue { .. } => "contextualized value",
            Value::TypeTag { .. } => "type tag",
        }
    }

    /// Resolves the state name this value refers to.
    ///
    /// Every `ContextualizedValue` layer is unwrapped first, so `Next` and
    /// `Next with x: 1` name the same state. Only identifiers are state
    /// references: atoms such as `:end` terminate a flow and variables are
    /// resolved at runtime.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rcl_compiler::ast::builder::{atom, ident, number, with_context};
    /// assert_eq!(ident("Next").as_state_ref(), Some("Next"));
    /// assert_eq!(with_context(ident("Next"), vec![("n", number(1.0))]).as_state_ref(), Some("Next"));
    /// assert_eq!(atom("end").as_state_ref(), None);
    /// ```
    pub fn as_state_ref(&self) -> Option<&str> {
        match self.unwrap_context().0 {
            Value::Identifier { value, .. } => Some(value.as_str()),
            _ => None,
        }
    }

    /// Strips `ContextualizedValue` layers, returning the innermost value and
    /// the context parameters from the outermost layer inward.
    pub fn unwrap_context(&self) -> (&Value, Vec<&Parameter>) {
        let mut current = self;
        let mut context = Vec::new();
        while let Value::ContextualizedValue {
            value, context: ctx, ..
        } = current
        {
            context.extend(ctx.iter());
            current = value.as_ref();
        }
        (current, context)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String { value, .. } => Some(value.as_str()),
            _ => None,
        }
    }

    /// Canonical text used to synthesize event names.
    ///
    /// Atoms drop their colon, strings yield their contents, integral
    /// numbers print without a fractional part and variables become `@name`.
    /// Collections and type tags have no canonical text.
    pub fn canonical_text(&self) -> Option<String> {
        match self.unwrap_context().0 {
            Value::String { value, .. } | Value::Identifier { value, .. } => Some(value.clone()),
            Value::Atom { value, .. } => Some(value.trim_start_matches(':').to_string()),
            Value::Number { value, .. } => Some(format_number(*value)),
            Value::Boolean { value, .. } => Some(value.to_string()),
            Value::Null { .. } => Some("null".to_string()),
            Value::Variable { name, .. } => Some(format!("@{name}")),
            _ => None,
        }
    }

    /// Converts the value to a JSON literal carried verbatim to the runtime.
    ///
    /// Variables become `{"var": name}` references and type tags keep their
    /// tag, value and qualifier.
    pub fn to_literal(&self) -> serde_json::Value {
        match self {
            Value::String { value, .. } => json!(value),
            Value::Number { value, .. } => number_literal(*value),
            Value::Boolean { value, .. } => json!(value),
            Value::Null { .. } => serde_json::Value::Null,
            Value::Atom { value, .. } => json!(format!(":{}", value.trim_start_matches(':'))),
            Value::Identifier { value, .. } => json!(value),
            Value::Variable { name, .. } => json!({ "var": name }),
            Value::List { items, .. } => {
                serde_json::Value::Array(items.iter().map(Value::to_literal).collect())
            }
            Value::Dictionary { entries, .. } => {
                let mut map = Map::new();
                for (key, value) in entries {
                    map.insert(key.clone(), value.to_literal());
                }
                serde_json::Value::Object(map)
            }
            Value::ContextualizedValue { value, .. } => value.to_literal(),
            Value::TypeTag {
                tag,
                value,
                qualifier,
                ..
            } => {
                let mut map = Map::new();
                map.insert("type".into(), json!(tag));
                map.insert("value".into(), json!(value));
                if let Some(q) = qualifier {
                    map.insert("qualifier".into(), json!(q));
                }
                serde_json::Value::Object(map)
            }
        }
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

fn number_literal(value: f64) -> serde_json::Value {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return json!(value as i64);
    }
    Number::from_f64(value)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}
