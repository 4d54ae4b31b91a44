//! Flow compilation.
//!
//! Each `flow` section becomes a [`FlowDefinition`]: a deterministic
//! transition table keyed by event name, in source order. Match blocks expand
//! into one `match_<pattern>` event per case and the `:default` case becomes
//! the state's `always` fallback.
//!
//! The compiler runs on whatever the document declares. It does not consult
//! validation results; the orchestrator decides whether the output is used.

use indexmap::IndexMap;

use crate::ast::{kinds, AstNode, Document, Section, Value};

mod model;

pub use model::{FlowDefinition, StateNode, Transition};

/// Prefix of events synthesized from match cases.
pub const MATCH_EVENT_PREFIX: &str = "match_";

/// Compiles every named flow in the document, keyed by flow id.
///
/// Unnamed flows cannot be keyed and are skipped. When two flows share an
/// id, the first one wins.
///
/// # Examples
///
/// ```rust
/// use rcl_compiler::ast::builder::{atom, case, document, ident, match_block, section, string, var};
/// use rcl_compiler::flow::compile_flows;
///
/// let doc = document(vec![section("flow")
///     .named("Order")
///     .attr("start", ident("Choose"))
///     .child(
///         section("on")
///             .named("Choose")
///             .node(match_block(
///                 var("reply"),
///                 vec![
///                     case(string("a"), ident("Choose")),
///                     case(atom("default"), ident("Choose")),
///                 ],
///             ))
///             .build(),
///     )
///     .build()]);
/// let flows = compile_flows(&doc);
/// let state = &flows["Order"].states["Choose"];
/// assert!(state.on.contains_key("match_a"));
/// assert_eq!(state.always.as_ref().map(|t| t.target.as_str()), Some("Choose"));
/// ```
pub fn compile_flows(doc: &Document) -> IndexMap<String, FlowDefinition> {
    let mut flows = IndexMap::new();
    for flow in doc.gather(kinds::FLOW) {
        let Some(id) = flow.name() else {
            tracing::debug!("skipping unnamed flow");
            continue;
        };
        if flows.contains_key(id) {
            continue;
        }
        flows.insert(id.to_string(), compile_flow(flow));
    }
    flows
}

/// Compiles one flow section.
///
/// `initial` is the flow's `start` state, else its first declared state,
/// else empty.
pub fn compile_flow(flow: &Section) -> FlowDefinition {
    let mut states = IndexMap::new();
    for state in flow.child_sections().filter(|s| s.is(kinds::STATE)) {
        let Some(name) = state.name() else { continue };
        states
            .entry(name.to_string())
            .or_insert_with(|| compile_state(state));
    }

    let initial = flow
        .attribute("start")
        .and_then(|attr| attr.value.as_state_ref())
        .map(str::to_string)
        .or_else(|| states.keys().next().cloned())
        .unwrap_or_default();

    FlowDefinition { initial, states }
}

fn compile_state(state: &Section) -> StateNode {
    let mut node = StateNode::default();
    for item in &state.body {
        match item {
            AstNode::Transition(rule) => {
                let Some(transition) = compile_transition(&rule.target) else {
                    continue;
                };
                match &rule.operand {
                    Some(operand) => match event_name(operand) {
                        Some(event) => node.add_event(event, transition),
                        None => tracing::debug!(
                            kind = operand.kind_name(),
                            "operand has no event name; rule skipped"
                        ),
                    },
                    None => node.set_always(transition),
                }
            }
            AstNode::Value(value) => {
                if value.as_state_ref().is_some() {
                    if let Some(transition) = compile_transition(value) {
                        node.set_always(transition);
                    }
                }
            }
            AstNode::Attribute(attr) => match attr.key.as_str() {
                "entry" => node.entry.extend(action_names(&attr.value)),
                "exit" => node.exit.extend(action_names(&attr.value)),
                key => {
                    if let Some(transition) = compile_transition(&attr.value) {
                        node.add_event(key.to_string(), transition);
                    }
                }
            },
            AstNode::MatchBlock(block) => {
                for case in &block.cases {
                    let Some(transition) = compile_transition(&case.consequence) else {
                        continue;
                    };
                    if case.is_default() {
                        node.set_always(transition);
                    } else if let Some(event) = match_event_name(&case.pattern) {
                        node.add_event(event, transition);
                    }
                }
            }
            AstNode::Section(_) => {}
        }
    }
    node
}

/// Event name of a direct transition operand. Lists, dictionaries and type
/// tags have none.
pub fn event_name(operand: &Value) -> Option<String> {
    operand.canonical_text()
}

/// Event name synthesized for a non-default match case.
pub fn match_event_name(pattern: &Value) -> Option<String> {
    pattern
        .canonical_text()
        .map(|text| format!("{MATCH_EVENT_PREFIX}{text}"))
}

/// True when the value can be the target of a transition.
pub fn is_transition_target(value: &Value) -> bool {
    target_text(value).is_some()
}

/// Target text for a transition: state names verbatim, atoms as `:name`,
/// variables as `@name`. Other values cannot be transition targets.
fn target_text(value: &Value) -> Option<String> {
    match value.unwrap_context().0 {
        Value::Identifier { value, .. } => Some(value.clone()),
        Value::Atom { value, .. } => Some(format!(":{}", value.trim_start_matches(':'))),
        Value::Variable { name, .. } => Some(format!("@{name}")),
        _ => None,
    }
}

/// Builds a transition with its `with` context. Context is shallow: each
/// named parameter becomes one key; the first occurrence of a key wins.
fn compile_transition(value: &Value) -> Option<Transition> {
    let target = target_text(value)?;
    let (_, params) = value.unwrap_context();
    let mut context = IndexMap::new();
    for param in params {
        if let Some(key) = &param.key {
            context
                .entry(key.clone())
                .or_insert_with(|| param.value.to_literal());
        }
    }
    Some(Transition { target, context })
}

fn action_names(value: &Value) -> Vec<String> {
    match value.unwrap_context().0 {
        Value::Identifier { value, .. } | Value::String { value, .. } => vec![value.clone()],
        Value::List { items, .. } => items.iter().flat_map(action_names).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builder::*;
    use serde_json::json;

    fn flow_of(states: Vec<Section>) -> FlowDefinition {
        let mut flow = section("flow").named("F").attr("start", ident("A"));
        for state in states {
            flow = flow.child(state);
        }
        compile_flow(&flow.build())
    }

    #[test]
    fn direct_transitions_key_by_operand() {
        let flow = flow_of(vec![section("on")
            .named("A")
            .transition(Some(atom(":yes")), ident("B"))
            .transition(Some(string("Order coffee")), ident("C"))
            .transition(Some(number(2.0)), atom("end"))
            .build()]);
        let state = &flow.states["A"];
        let keys: Vec<_> = state.on.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["yes", "Order coffee", "2"]);
        assert_eq!(state.on["2"].target, ":end");
        assert!(state.always.is_none());
    }

    #[test]
    fn default_case_becomes_always_not_on() {
        let flow = flow_of(vec![section("on")
            .named("A")
            .node(match_block(
                var("choice"),
                vec![
                    case(string("a"), ident("S1")),
                    case(string("b"), ident("S2")),
                    case(atom(":default"), ident("S1")),
                ],
            ))
            .build()]);
        let state = &flow.states["A"];
        let keys: Vec<_> = state.on.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["match_a", "match_b"]);
        assert_eq!(state.always.as_ref().unwrap().target, "S1");
    }

    #[test]
    fn context_is_shallow_and_literal() {
        let flow = flow_of(vec![section("on")
            .named("A")
            .transition(
                Some(atom("pay")),
                with_context(
                    ident("B"),
                    vec![
                        ("size", var("size")),
                        ("price", number(4.5)),
                        ("tags", list(vec![string("hot")])),
                        ("price", number(9.0)),
                    ],
                ),
            )
            .build()]);
        let context = &flow.states["A"].on["pay"].context;
        assert_eq!(
            serde_json::to_value(context).unwrap(),
            json!({"size": {"var": "size"}, "price": 4.5, "tags": ["hot"]})
        );
    }

    #[test]
    fn first_writer_wins() {
        let flow = flow_of(vec![section("on")
            .named("A")
            .transition(Some(atom("go")), ident("B"))
            .transition(Some(atom("go")), ident("C"))
            .transition(None, ident("D"))
            .value(ident("E"))
            .build()]);
        let state = &flow.states["A"];
        assert_eq!(state.on["go"].target, "B");
        assert_eq!(state.always.as_ref().unwrap().target, "D");
    }

    #[test]
    fn entry_and_exit_are_actions() {
        let flow = flow_of(vec![section("on")
            .named("A")
            .attr("entry", list(vec![ident("greet"), string("log")]))
            .attr("exit", ident("cleanup"))
            .attr("next", ident("B"))
            .build()]);
        let state = &flow.states["A"];
        assert_eq!(state.entry, vec!["greet", "log"]);
        assert_eq!(state.exit, vec!["cleanup"]);
        assert_eq!(state.on.keys().collect::<Vec<_>>(), vec!["next"]);
    }

    #[test]
    fn initial_falls_back_to_first_state() {
        let flow = compile_flow(
            &section("flow")
                .named("F")
                .child(section("on").named("First").build())
                .child(section("on").named("Second").build())
                .build(),
        );
        assert_eq!(flow.initial, "First");
        let empty = compile_flow(&section("flow").named("F").build());
        assert_eq!(empty.initial, "");
    }

    #[test]
    fn undeclared_states_still_compile() {
        let flow = flow_of(vec![section("on").named("A").value(ident("Missing")).build()]);
        assert_eq!(flow.states["A"].always.as_ref().unwrap().target, "Missing");
    }
}
