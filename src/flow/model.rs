use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A compiled flow: its initial state and transition table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowDefinition {
    pub initial: String,
    pub states: IndexMap<String, StateNode>,
}

impl FlowDefinition {
    /// True when `initial` names a compiled state.
    pub fn has_valid_initial(&self) -> bool {
        self.states.contains_key(&self.initial)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StateNode {
    /// Keyed transitions in source order.
    #[serde(default)]
    pub on: IndexMap<String, Transition>,
    /// Taken when no keyed event matches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub always: Option<Transition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entry: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exit: Vec<String>,
}

impl StateNode {
    /// Adds a keyed transition unless the event is already taken.
    pub fn add_event(&mut self, event: String, transition: Transition) {
        self.on.entry(event).or_insert(transition);
    }

    /// Sets the fallback unless one is already set.
    pub fn set_always(&mut self, transition: Transition) {
        if self.always.is_none() {
            self.always = Some(transition);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub target: String,
    /// Merged into session state when the transition fires.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub context: IndexMap<String, serde_json::Value>,
}
