//! Shared document builders for integration tests.
#![allow(dead_code)]

use rcl_compiler::ast::builder::*;
use rcl_compiler::ast::{Document, Section};

pub fn agent(name: &str, display_name: Option<&str>) -> Section {
    let mut agent = section("agent").named(name).at(1, 1);
    if let Some(display) = display_name {
        agent = agent.attr_at("displayName", string(display), 2);
    }
    agent.build()
}

/// `flow <name>` with `start: <start>` and one empty state per name.
pub fn flow(name: &str, start: &str, states: &[&str]) -> Section {
    let mut flow = section("flow")
        .named(name)
        .at(4, 1)
        .attr_at("start", ident(start), 5);
    for (index, state) in states.iter().enumerate() {
        flow = flow.child(section("on").named(state).at(7 + index, 3).build());
    }
    flow.build()
}

pub fn text_message(id: &str, text: &str, line: usize) -> Section {
    section("text").named(id).at(line, 3).param(string(text)).build()
}

pub fn messages(items: Vec<Section>) -> Section {
    let mut messages = section("messages").at(20, 1);
    for item in items {
        messages = messages.child(item);
    }
    messages.build()
}

/// Agent with displayName, one flow with start and one state, one message.
pub fn minimal_valid() -> Document {
    document(vec![
        agent("Coffee", Some("Coffee Shop")),
        flow("Main", "Welcome", &["Welcome"]),
        messages(vec![text_message("welcome", "Hi there!", 21)]),
    ])
}
