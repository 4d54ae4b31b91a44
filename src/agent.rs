//! Agent configuration extraction.
//!
//! Collects the agent's identity and properties from the first `agent`
//! section. `config`/`configuration` sections set properties on top of the
//! agent's own attributes; `defaults` only fills keys nothing else set.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ast::{kinds, Document, Section};

/// Property key that would collide with the serialized agent `name`.
pub const RESERVED_PROPERTY: &str = "name";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    pub name: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Every other attribute, as JSON literals in source order.
    #[serde(flatten)]
    pub properties: IndexMap<String, serde_json::Value>,
}

/// Builds the agent configuration, or `None` when there is no agent section.
///
/// # Examples
///
/// ```rust
/// use rcl_compiler::agent::extract_agent;
/// use rcl_compiler::ast::builder::{document, section, string};
///
/// let doc = document(vec![
///     section("agent").named("Coffee").attr("displayName", string("Coffee Shop")).build(),
///     section("defaults").attr("brandColor", string("#6F4E37")).build(),
/// ]);
/// let agent = extract_agent(&doc).unwrap();
/// assert_eq!(agent.display_name, "Coffee Shop");
/// assert_eq!(agent.properties["brandColor"], "#6F4E37");
/// ```
pub fn extract_agent(doc: &Document) -> Option<AgentConfig> {
    let agent = doc.sections.iter().find(|s| s.is(kinds::AGENT))?;

    let mut properties = IndexMap::new();
    collect_attributes(agent, &mut properties, true);
    for config in doc
        .gather(kinds::CONFIG)
        .into_iter()
        .chain(doc.gather(kinds::CONFIGURATION))
    {
        collect_attributes(config, &mut properties, true);
    }
    for defaults in doc.gather(kinds::DEFAULTS) {
        collect_attributes(defaults, &mut properties, false);
    }

    // Reported by the validator; never carried into the artifact.
    properties.shift_remove(RESERVED_PROPERTY);

    let display_name = match properties.shift_remove("displayName") {
        Some(serde_json::Value::String(name)) => name,
        Some(other) => other.to_string(),
        None => String::new(),
    };
    let description = match properties.shift_remove("description") {
        Some(serde_json::Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
        None => None,
    };

    Some(AgentConfig {
        name: agent.name().unwrap_or_default().to_string(),
        display_name,
        description,
        properties,
    })
}

fn collect_attributes(
    section: &Section,
    properties: &mut IndexMap<String, serde_json::Value>,
    overwrite: bool,
) {
    for attr in section.attributes() {
        let value = attr.value.to_literal();
        if overwrite {
            properties.insert(attr.key.clone(), value);
        } else {
            properties.entry(attr.key.clone()).or_insert(value);
        }
    }
}
