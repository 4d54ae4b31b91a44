//! Cross-reference checks: state targets within a flow and the agent's start flow.

use std::collections::{HashMap, HashSet};

use crate::ast::{kinds, AstNode, Document, MatchBlock, Range, Section};
use crate::diagnostics::{
    duplicate_event, duplicate_match_case, type_mismatch, undefined_flow_reference,
    undefined_state_reference,
};
use crate::flow::{event_name, is_transition_target, match_event_name};
use crate::validation::ValidationReporter;

use super::UNNAMED;

pub fn check_references<R: ValidationReporter>(doc: &Document, flows: &[&Section], result: &mut R) {
    for flow in flows {
        check_flow(flow, result);
    }
    check_agent_start(doc, flows, result);
}

fn check_flow<R: ValidationReporter>(flow: &Section, result: &mut R) {
    let flow_name = flow.name().unwrap_or(UNNAMED);
    let states: Vec<&Section> = flow.child_sections().filter(|s| s.is(kinds::STATE)).collect();
    let declared: HashSet<&str> = states.iter().filter_map(|s| s.name()).collect();

    if let Some(attr) = flow.attribute("start") {
        if let Some(start) = attr.value.as_state_ref() {
            if !declared.contains(start) {
                result.report(undefined_state_reference(
                    start,
                    flow_name,
                    attr.range.or(flow.range),
                ));
            }
        }
    }

    for state in states {
        for (target, range) in outgoing_targets(state) {
            if !declared.contains(target) {
                result.report(undefined_state_reference(
                    target,
                    flow_name,
                    range.or(state.range),
                ));
            }
        }
        for node in &state.body {
            if let AstNode::MatchBlock(block) = node {
                check_match_cases(block, result);
            }
        }
        check_events(state, result);
    }
}

const TARGET_KINDS: &str = "state, atom or variable";
const EVENT_KINDS: &str = "string, atom, identifier, number or variable";

/// Where a keyed event came from. Repeats inside one match block are
/// reported by `check_match_cases`.
#[derive(Clone, Copy, PartialEq, Eq)]
enum EventOrigin {
    Rule,
    Match(usize),
}

/// Every rule must compile to a keyed event or a fallback, and two rules of a
/// state must not claim the same event.
fn check_events<R: ValidationReporter>(state: &Section, result: &mut R) {
    let state_name = state.name().unwrap_or(UNNAMED);
    let mut claimed: HashMap<String, EventOrigin> = HashMap::new();
    let mut claim = |event: String, origin: EventOrigin, range: Option<Range>, result: &mut R| {
        match claimed.get(&event) {
            Some(first) if *first == origin && matches!(origin, EventOrigin::Match(_)) => {}
            Some(_) => result.report(duplicate_event(&event, state_name, range)),
            None => {
                claimed.insert(event, origin);
            }
        }
    };

    for (index, node) in state.body.iter().enumerate() {
        match node {
            AstNode::Transition(rule) => {
                let range = rule.range.or(state.range);
                if !is_transition_target(&rule.target) {
                    result.report(type_mismatch(
                        TARGET_KINDS,
                        rule.target.unwrap_context().0.kind_name(),
                        "transition target",
                        range,
                    ));
                    continue;
                }
                let Some(operand) = &rule.operand else { continue };
                match event_name(operand) {
                    Some(event) => claim(event, EventOrigin::Rule, range, result),
                    None => result.report(type_mismatch(
                        EVENT_KINDS,
                        operand.unwrap_context().0.kind_name(),
                        "transition event",
                        range,
                    )),
                }
            }
            AstNode::Attribute(attr) if !kinds::ACTION_ATTRIBUTES.contains(&attr.key.as_str()) => {
                if is_transition_target(&attr.value) {
                    claim(attr.key.clone(), EventOrigin::Rule, attr.range.or(state.range), result);
                }
            }
            AstNode::MatchBlock(block) => {
                for case in &block.cases {
                    let range = case.range.or(block.range);
                    if !is_transition_target(&case.consequence) {
                        result.report(type_mismatch(
                            TARGET_KINDS,
                            case.consequence.unwrap_context().0.kind_name(),
                            "match case target",
                            range,
                        ));
                        continue;
                    }
                    if case.is_default() {
                        continue;
                    }
                    match match_event_name(&case.pattern) {
                        Some(event) => claim(event, EventOrigin::Match(index), range, result),
                        None => result.report(type_mismatch(
                            EVENT_KINDS,
                            case.pattern.unwrap_context().0.kind_name(),
                            "match case pattern",
                            range,
                        )),
                    }
                }
            }
            _ => {}
        }
    }
}

/// Every state a state can move to, with the location of the reference.
///
/// Atoms and variables are not collected: the former end the flow and the
/// latter are resolved at runtime.
fn outgoing_targets(state: &Section) -> Vec<(&str, Option<Range>)> {
    let mut targets = Vec::new();
    for node in &state.body {
        match node {
            AstNode::Value(value) => {
                if let Some(target) = value.as_state_ref() {
                    targets.push((target, value.range()));
                }
            }
            AstNode::Attribute(attr) if !kinds::ACTION_ATTRIBUTES.contains(&attr.key.as_str()) => {
                if let Some(target) = attr.value.as_state_ref() {
                    targets.push((target, attr.range.or(attr.value.range())));
                }
            }
            AstNode::Transition(transition) => {
                if let Some(target) = transition.target.as_state_ref() {
                    targets.push((target, transition.range.or(transition.target.range())));
                }
            }
            AstNode::MatchBlock(block) => {
                for case in &block.cases {
                    if let Some(target) = case.consequence.as_state_ref() {
                        targets.push((target, case.range.or(block.range)));
                    }
                }
            }
            _ => {}
        }
    }
    targets
}

/// Repeated patterns can never fire after the first; warn about them.
fn check_match_cases<R: ValidationReporter>(block: &MatchBlock, result: &mut R) {
    let mut seen = HashSet::new();
    let mut has_default = false;
    for case in &block.cases {
        let range = case.range.or(block.range);
        if case.is_default() {
            if has_default {
                result.report(duplicate_match_case(":default", range));
            }
            has_default = true;
            continue;
        }
        if let Some(pattern) = case.pattern.canonical_text() {
            if !seen.insert(pattern.clone()) {
                result.report(duplicate_match_case(&pattern, range));
            }
        }
    }
}

fn check_agent_start<R: ValidationReporter>(doc: &Document, flows: &[&Section], result: &mut R) {
    let Some(agent) = doc.sections.iter().find(|s| s.is(kinds::AGENT)) else {
        return;
    };
    let Some(attr) = agent.attribute("start") else {
        return;
    };
    let range = attr.range.or(agent.range);
    match attr.value.as_state_ref() {
        Some(flow) if flows.iter().any(|f| f.name() == Some(flow)) => {}
        Some(flow) => result.report(undefined_flow_reference(flow, range)),
        None => result.report(type_mismatch(
            "flow identifier",
            attr.value.unwrap_context().0.kind_name(),
            "agent start",
            range,
        )),
    }
}
