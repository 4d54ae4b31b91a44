//! Resilient message extraction.
//!
//! The extractor builds the message catalog independently of validation, so
//! a document with reference errors still yields its usable messages. Each
//! candidate node is extracted by a function that returns an outcome instead
//! of failing; one malformed node costs one error string and nothing else.

use serde::{Deserialize, Serialize};

use crate::ast::{kinds, AstNode, Document, Range, Section, Value};
use crate::config::MAX_SCAN_DEPTH;

pub mod content;

use content::{
    decode_card_width, decode_content_info, decode_description, decode_media, decode_rich_card,
    decode_suggestions, decode_text, decode_uploaded_file, CardContent, CarouselCard,
    NormalizedContent, RichCard, StandaloneCard,
};

// ============================================================================
// TYPES
// ============================================================================

/// One message recovered from the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedMessage {
    pub id: String,
    pub content: NormalizedContent,
    /// First-seen position among extracted messages.
    pub order: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Range>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ExtractionResult {
    pub messages: Vec<ExtractedMessage>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Depth limit of the fallback scan; never more than [`MAX_SCAN_DEPTH`].
    pub scan_depth: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            scan_depth: MAX_SCAN_DEPTH,
        }
    }
}

/// What a single candidate node produced.
///
/// A node may yield content and errors at once, when a named attribute
/// disagreed with the shorthand and was discarded.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeOutcome {
    pub content: Option<NormalizedContent>,
    pub errors: Vec<String>,
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Extracts every recognizable message from `doc`.
///
/// # Examples
///
/// ```rust
/// use rcl_compiler::ast::builder::{document, section, string};
/// use rcl_compiler::extraction::{extract_messages, ExtractOptions};
///
/// let doc = document(vec![section("messages")
///     .child(section("text").named("Welcome").param(string("Hello!")).build())
///     .build()]);
/// let result = extract_messages(&doc, &ExtractOptions::default());
/// assert_eq!(result.messages[0].id, "Welcome");
/// assert_eq!(result.messages[0].content.text.as_deref(), Some("Hello!"));
/// assert!(result.errors.is_empty());
/// ```
pub fn extract_messages(doc: &Document, options: &ExtractOptions) -> ExtractionResult {
    let mut candidates = primary_candidates(doc);
    if candidates.is_empty() {
        let depth = options.scan_depth.min(MAX_SCAN_DEPTH);
        tracing::debug!(depth, "no message sections found; scanning document");
        for section in &doc.sections {
            scan(section, 0, depth, &mut candidates);
        }
    }

    let mut result = ExtractionResult::default();
    for section in candidates {
        let outcome = extract_node(section);
        result.errors.extend(outcome.errors);
        if let Some(content) = outcome.content {
            let order = result.messages.len();
            result.messages.push(ExtractedMessage {
                id: section
                    .name()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("message_{order}")),
                content,
                order,
                location: section.range,
            });
        }
    }

    for error in &result.errors {
        tracing::warn!(%error, "message skipped");
    }
    tracing::debug!(
        messages = result.messages.len(),
        errors = result.errors.len(),
        "extraction finished"
    );
    result
}

/// Extracts the content of one message section.
///
/// Never fails: a malformed node produces `content: None` and an error
/// naming its line. Nodes with no recognizable payload produce neither.
pub fn extract_node(section: &Section) -> NodeOutcome {
    let mut conflicts = Vec::new();
    match build_content(section, &mut conflicts) {
        Ok(content) => NodeOutcome {
            content: content.is_recognized().then_some(content),
            errors: conflicts
                .into_iter()
                .map(|c| format!("Conflicting value in message at {}: {c}", line_label(section)))
                .collect(),
        },
        Err(reason) => NodeOutcome {
            content: None,
            errors: vec![format!(
                "Failed to extract message at {}: {reason}",
                line_label(section)
            )],
        },
    }
}

/// Builds content for a message section, failing on the first malformed
/// attribute. Shared with the validator's message checks.
pub fn message_content(section: &Section) -> Result<NormalizedContent, String> {
    build_content(section, &mut Vec::new())
}

// ============================================================================
// CANDIDATES
// ============================================================================

fn primary_candidates(doc: &Document) -> Vec<&Section> {
    let mut found = Vec::new();
    for section in &doc.sections {
        if kinds::is_message_tag(&section.section_type) {
            found.push(section);
        }
        let containers: Vec<&Section> = if section.is(kinds::MESSAGES) {
            vec![section]
        } else if section.is(kinds::AGENT) {
            section.child_sections().filter(|s| s.is(kinds::MESSAGES)).collect()
        } else {
            Vec::new()
        };
        for messages in containers {
            found.extend(
                messages
                    .child_sections()
                    .filter(|s| kinds::is_message_tag(&s.section_type)),
            );
        }
    }
    found
}

/// Depth-bounded walk for documents whose messages sit somewhere unexpected.
fn scan<'a>(section: &'a Section, depth: usize, limit: usize, found: &mut Vec<&'a Section>) {
    if depth > limit {
        return;
    }
    if kinds::is_message_tag(&section.section_type) {
        found.push(section);
        return;
    }
    for child in section.child_sections() {
        scan(child, depth + 1, limit, found);
    }
}

fn line_label(section: &Section) -> String {
    match section.line() {
        Some(line) => format!("line {line}"),
        None => "line unknown".to_string(),
    }
}

// ============================================================================
// CONTENT MAPPING
// ============================================================================

/// Tracks which source populated each field, so a later source never
/// silently replaces an earlier one.
#[derive(Default)]
struct Draft {
    content: NormalizedContent,
    description: Option<String>,
    media: Option<content::Media>,
}

fn build_content(section: &Section, conflicts: &mut Vec<String>) -> Result<NormalizedContent, String> {
    let mut draft = Draft::default();

    // Shorthand: `text Welcome "Hello"` or `richCard Menu "Our menu"`.
    let shorthand = section.first_positional().or_else(|| {
        if section.is(kinds::TEXT) || section.is(kinds::MESSAGE) {
            section.body.iter().find_map(|node| match node {
                AstNode::Value(v @ Value::String { .. }) => Some(v),
                _ => None,
            })
        } else {
            None
        }
    });
    if let Some(value) = shorthand {
        match section.section_type.as_str() {
            kinds::RICH_CARD => draft.content.rich_card = Some(decode_rich_card(value)?),
            kinds::CAROUSEL => {}
            _ => draft.content.text = Some(decode_text(value)?),
        }
    }

    let named = section
        .named_parameters()
        .chain(section.attributes().map(|a| (a.key.as_str(), &a.value)));
    for (key, value) in named {
        apply_attribute(&mut draft, key, value, conflicts)?;
    }

    if section.is(kinds::CAROUSEL) {
        let carousel = build_carousel(section, conflicts)?;
        set_once(&mut draft.content.rich_card, carousel, "richCard", conflicts);
    }

    Ok(finish(draft, conflicts))
}

fn apply_attribute(
    draft: &mut Draft,
    key: &str,
    value: &Value,
    conflicts: &mut Vec<String>,
) -> Result<(), String> {
    match key {
        "text" => {
            let text = decode_text(value)?;
            set_once(&mut draft.content.text, text, "text", conflicts);
        }
        "richCard" => {
            let card = decode_rich_card(value)?;
            set_once(&mut draft.content.rich_card, card, "richCard", conflicts);
        }
        "suggestions" => {
            let suggestions = decode_suggestions(value)?;
            if draft.content.suggestions.is_empty() {
                draft.content.suggestions = suggestions;
            } else if draft.content.suggestions != suggestions {
                conflicts.push("suggestions defined twice; keeping the first".to_string());
            }
        }
        "uploadedRbmFile" => {
            let file = decode_uploaded_file(value)?;
            set_once(&mut draft.content.uploaded_rbm_file, file, "uploadedRbmFile", conflicts);
        }
        "contentInfo" => {
            let info = decode_content_info(value)?;
            set_once(&mut draft.content.content_info, info, "contentInfo", conflicts);
        }
        "description" => {
            let description = decode_description(value)?;
            set_once(&mut draft.description, description, "description", conflicts);
        }
        "media" => {
            let media = decode_media(value)?;
            set_once(&mut draft.media, media, "media", conflicts);
        }
        _ => {}
    }
    Ok(())
}

/// Folds refinements (description, media) into a standalone card.
fn finish(mut draft: Draft, conflicts: &mut Vec<String>) -> NormalizedContent {
    if let Some(RichCard::StandaloneCard(card)) = draft.content.rich_card.as_mut() {
        let body = &mut card.card_content;
        if let Some(description) = draft.description.take() {
            set_once(&mut body.description, description, "description", conflicts);
        }
        if let Some(media) = draft.media.take() {
            set_once(&mut body.media, media, "media", conflicts);
        }
    }
    draft.content
}

fn set_once<T: PartialEq>(slot: &mut Option<T>, value: T, field: &str, conflicts: &mut Vec<String>) {
    match slot {
        None => *slot = Some(value),
        Some(existing) if *existing == value => {}
        Some(_) => conflicts.push(format!("{field} already set; keeping the first value")),
    }
}

fn build_carousel(section: &Section, conflicts: &mut Vec<String>) -> Result<RichCard, String> {
    let mut card_width = Default::default();
    if let Some(width) = section.attribute("cardWidth") {
        card_width = decode_card_width(&width.value)?;
    }

    let mut card_contents = Vec::new();
    for card in section.child_sections().filter(|s| s.is(kinds::RICH_CARD)) {
        let content = build_content(card, conflicts)
            .map_err(|e| format!("card {}: {e}", card_contents.len() + 1))?;
        let mut card_content = match content.rich_card {
            Some(RichCard::StandaloneCard(StandaloneCard { card_content, .. })) => card_content,
            _ => CardContent::default(),
        };
        // Suggestions on a carousel entry belong to that card.
        if card_content.suggestions.is_empty() {
            card_content.suggestions = content.suggestions;
        }
        card_contents.push(card_content);
    }

    if card_contents.is_empty() {
        return Err("carousel has no richCard entries".to_string());
    }
    Ok(RichCard::CarouselCard(CarouselCard {
        card_width,
        card_contents,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builder::*;

    fn messages(children: Vec<Section>) -> Document {
        let mut builder = section("messages");
        for child in children {
            builder = builder.child(child);
        }
        document(vec![builder.build()])
    }

    #[test]
    fn malformed_node_is_isolated() {
        let doc = messages(vec![
            section("text").named("Hi").param(string("Hello")).at(2, 3).build(),
            section("text")
                .named("Broken")
                .attr("suggestions", number(4.0))
                .param(string("x"))
                .at(3, 3)
                .build(),
            section("text").named("Bye").param(string("Goodbye")).at(4, 3).build(),
        ]);
        let result = extract_messages(&doc, &ExtractOptions::default());
        let ids: Vec<_> = result.messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["Hi", "Bye"]);
        assert_eq!(result.messages[1].order, 1);
        assert_eq!(
            result.errors,
            vec!["Failed to extract message at line 3: suggestions must be a list, found number"]
        );
    }

    #[test]
    fn unnamed_messages_get_ordinal_ids() {
        let doc = messages(vec![
            section("text").build(),
            section("text").param(string("one")).build(),
            section("text").param(string("two")).build(),
        ]);
        let result = extract_messages(&doc, &ExtractOptions::default());
        let ids: Vec<_> = result.messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["message_0", "message_1"]);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn description_refines_shorthand_card() {
        let doc = messages(vec![section("richCard")
            .named("Menu")
            .param(string("Our menu"))
            .attr("description", string("Fresh every day"))
            .build()]);
        let result = extract_messages(&doc, &ExtractOptions::default());
        let Some(RichCard::StandaloneCard(card)) = &result.messages[0].content.rich_card else {
            panic!("expected a standalone card");
        };
        assert_eq!(card.card_content.title.as_deref(), Some("Our menu"));
        assert_eq!(card.card_content.description.as_deref(), Some("Fresh every day"));
    }

    #[test]
    fn named_attribute_never_overwrites_shorthand() {
        let section = section("text")
            .named("Hi")
            .param(string("Hello"))
            .attr("text", string("Howdy"))
            .at(9, 1)
            .build();
        let outcome = extract_node(&section);
        assert_eq!(outcome.content.unwrap().text.as_deref(), Some("Hello"));
        assert_eq!(
            outcome.errors,
            vec!["Conflicting value in message at line 9: text already set; keeping the first value"]
        );
    }

    #[test]
    fn carousel_collects_nested_cards() {
        let doc = messages(vec![section("carousel")
            .named("Drinks")
            .attr("cardWidth", atom("small"))
            .child(section("richCard").param(string("Latte")).build())
            .child(
                section("richCard")
                    .param(string("Mocha"))
                    .attr("suggestions", list(vec![string("Order")]))
                    .build(),
            )
            .build()]);
        let result = extract_messages(&doc, &ExtractOptions::default());
        let Some(RichCard::CarouselCard(carousel)) = &result.messages[0].content.rich_card else {
            panic!("expected a carousel");
        };
        assert_eq!(carousel.card_width, content::CardWidth::Small);
        assert_eq!(carousel.card_contents.len(), 2);
        assert_eq!(carousel.card_contents[1].title.as_deref(), Some("Mocha"));
        assert_eq!(carousel.card_contents[1].suggestions.len(), 1);
    }

    #[test]
    fn fallback_scan_finds_deep_messages_within_limit() {
        let deep = section("group")
            .child(section("group").child(section("text").named("Deep").param(string("hi")).build()).build())
            .build();
        let doc = document(vec![deep]);
        let found = extract_messages(&doc, &ExtractOptions::default());
        assert_eq!(found.messages.len(), 1);
        let shallow = extract_messages(&doc, &ExtractOptions { scan_depth: 1 });
        assert!(shallow.messages.is_empty());
    }

    #[test]
    fn suggestions_alone_are_not_a_message() {
        let doc = messages(vec![section("message")
            .attr("suggestions", list(vec![string("Yes")]))
            .build()]);
        let result = extract_messages(&doc, &ExtractOptions::default());
        assert!(result.messages.is_empty());
        assert!(result.errors.is_empty());
    }
}
