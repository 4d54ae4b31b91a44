//! Normalized message content and the decoders that build it from AST values.
//!
//! The wire shape follows the RBM agent-message model: camelCase fields,
//! absent fields omitted, enumerations in SCREAMING_CASE.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::ast::Value;

/// Longest postback payload a suggestion may carry.
pub const MAX_POSTBACK_LEN: usize = 2048;

// ============================================================================
// CONTENT MODEL
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rich_card: Option<RichCard>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_rbm_file: Option<UploadedRbmFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_info: Option<ContentInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<Suggestion>,
}

impl NormalizedContent {
    /// True if the content carries one of the primary payloads.
    /// Suggestions alone do not make a message.
    pub fn is_recognized(&self) -> bool {
        self.text.is_some()
            || self.rich_card.is_some()
            || self.uploaded_rbm_file.is_some()
            || self.content_info.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RichCard {
    StandaloneCard(StandaloneCard),
    CarouselCard(CarouselCard),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandaloneCard {
    #[serde(default)]
    pub card_orientation: CardOrientation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_image_alignment: Option<ImageAlignment>,
    #[serde(default)]
    pub card_content: CardContent,
}

impl StandaloneCard {
    pub fn vertical(card_content: CardContent) -> Self {
        Self {
            card_orientation: CardOrientation::Vertical,
            thumbnail_image_alignment: None,
            card_content,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardOrientation {
    #[default]
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImageAlignment {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CardContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<Media>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselCard {
    #[serde(default)]
    pub card_width: CardWidth,
    pub card_contents: Vec<CardContent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardWidth {
    Small,
    #[default]
    Medium,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    #[serde(default)]
    pub height: MediaHeight,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<UploadedRbmFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_info: Option<ContentInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaHeight {
    Short,
    #[default]
    Medium,
    Tall,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedRbmFile {
    pub file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentInfo {
    pub file_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_refresh: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Suggestion {
    Reply(SuggestedReply),
    Action(SuggestedAction),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedReply {
    pub text: String,
    #[serde(default)]
    pub postback_data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedAction {
    pub text: String,
    #[serde(default)]
    pub postback_data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dial_action: Option<DialAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_url_action: Option<OpenUrlAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialAction {
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenUrlAction {
    pub url: String,
}

// ============================================================================
// DECODERS
// ============================================================================
//
// Each decoder turns one attribute value into its typed form, or explains in
// a short sentence why it cannot. They are shared by the extractor and by the
// validator's message checks so both agree on what "malformed" means.

/// Postback payload for a suggestion that did not specify one.
///
/// Deterministic for a given action and text, and never longer than
/// [`MAX_POSTBACK_LEN`] characters.
pub fn derive_postback(action: &str, text: &str) -> String {
    let payload = json!({ "action": action, "text": text }).to_string();
    payload.chars().take(MAX_POSTBACK_LEN).collect()
}

fn decode_json<T: DeserializeOwned>(value: &Value, what: &str) -> Result<T, String> {
    serde_json::from_value(value.to_literal()).map_err(|e| format!("invalid {what}: {e}"))
}

fn expect_string<'a>(value: &'a Value, what: &str) -> Result<&'a str, String> {
    match value.unwrap_context().0 {
        Value::String { value, .. } => Ok(value),
        other => Err(format!("{what} must be a string, found {}", other.kind_name())),
    }
}

/// Strings pass through; type-tagged literals such as `<url ...>` yield their value.
fn expect_locator(value: &Value, what: &str) -> Option<Result<String, String>> {
    match value.unwrap_context().0 {
        Value::String { value, .. } => Some(Ok(value.clone())),
        Value::TypeTag { value, .. } => Some(Ok(value.clone())),
        Value::Dictionary { .. } => None,
        other => Some(Err(format!(
            "{what} must be a string or dictionary, found {}",
            other.kind_name()
        ))),
    }
}

pub fn decode_text(value: &Value) -> Result<String, String> {
    expect_string(value, "text").map(str::to_string)
}

pub fn decode_description(value: &Value) -> Result<String, String> {
    expect_string(value, "description").map(str::to_string)
}

/// Accepts a title string, a `{standaloneCard|carouselCard}` dictionary, or
/// a bare card-content dictionary which becomes a vertical standalone card.
pub fn decode_rich_card(value: &Value) -> Result<RichCard, String> {
    match value.unwrap_context().0 {
        Value::String { value, .. } => Ok(RichCard::StandaloneCard(StandaloneCard::vertical(
            CardContent {
                title: Some(value.clone()),
                ..Default::default()
            },
        ))),
        dict @ Value::Dictionary { entries, .. } => {
            if entries.contains_key("standaloneCard") || entries.contains_key("carouselCard") {
                let mut card: RichCard = decode_json(dict, "richCard")?;
                fill_card_postbacks(&mut card);
                Ok(card)
            } else {
                let mut content = decode_card_content(dict)?;
                fill_postbacks(&mut content.suggestions);
                Ok(RichCard::StandaloneCard(StandaloneCard::vertical(content)))
            }
        }
        other => Err(format!(
            "richCard must be a string or dictionary, found {}",
            other.kind_name()
        )),
    }
}

pub fn decode_card_content(value: &Value) -> Result<CardContent, String> {
    decode_json(value, "card content")
}

pub fn decode_media(value: &Value) -> Result<Media, String> {
    match expect_locator(value, "media") {
        Some(url) => Ok(Media {
            height: MediaHeight::default(),
            file: None,
            content_info: Some(ContentInfo {
                file_url: url?,
                thumbnail_url: None,
                force_refresh: None,
                alt_text: None,
            }),
        }),
        None => decode_json(value, "media"),
    }
}

pub fn decode_card_width(value: &Value) -> Result<CardWidth, String> {
    let raw = match value.unwrap_context().0 {
        Value::String { value, .. } | Value::Atom { value, .. } | Value::Identifier { value, .. } => {
            value.trim_start_matches(':').to_ascii_uppercase()
        }
        other => {
            return Err(format!(
                "cardWidth must be SMALL or MEDIUM, found {}",
                other.kind_name()
            ))
        }
    };
    match raw.as_str() {
        "SMALL" => Ok(CardWidth::Small),
        "MEDIUM" => Ok(CardWidth::Medium),
        _ => Err(format!("cardWidth must be SMALL or MEDIUM, found '{raw}'")),
    }
}

pub fn decode_uploaded_file(value: &Value) -> Result<UploadedRbmFile, String> {
    match expect_locator(value, "uploadedRbmFile") {
        Some(name) => Ok(UploadedRbmFile {
            file_name: name?,
            thumbnail_url: None,
            thumbnail_name: None,
        }),
        None => decode_json(value, "uploadedRbmFile"),
    }
}

pub fn decode_content_info(value: &Value) -> Result<ContentInfo, String> {
    match expect_locator(value, "contentInfo") {
        Some(url) => Ok(ContentInfo {
            file_url: url?,
            thumbnail_url: None,
            force_refresh: None,
            alt_text: None,
        }),
        None => decode_json(value, "contentInfo"),
    }
}

/// Decodes a suggestion list. Bare strings become replies; dictionaries are
/// `{reply: {...}}` or `{action: {...}}`. Missing postbacks are derived.
pub fn decode_suggestions(value: &Value) -> Result<Vec<Suggestion>, String> {
    let items = match value.unwrap_context().0 {
        Value::List { items, .. } => items.as_slice(),
        single @ (Value::String { .. } | Value::Dictionary { .. }) => std::slice::from_ref(single),
        other => {
            return Err(format!(
                "suggestions must be a list, found {}",
                other.kind_name()
            ))
        }
    };

    let mut suggestions = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let suggestion = match item.unwrap_context().0 {
            Value::String { value, .. } => Suggestion::Reply(SuggestedReply {
                text: value.clone(),
                postback_data: String::new(),
            }),
            dict @ Value::Dictionary { .. } => decode_json(dict, "suggestion")
                .map_err(|e| format!("suggestion {}: {e}", index + 1))?,
            other => {
                return Err(format!(
                    "suggestion {} must be a string or dictionary, found {}",
                    index + 1,
                    other.kind_name()
                ))
            }
        };
        suggestions.push(suggestion);
    }
    fill_postbacks(&mut suggestions);
    Ok(suggestions)
}

fn fill_postbacks(suggestions: &mut [Suggestion]) {
    for suggestion in suggestions {
        match suggestion {
            Suggestion::Reply(reply) if reply.postback_data.is_empty() => {
                reply.postback_data = derive_postback("reply", &reply.text);
            }
            Suggestion::Action(action) if action.postback_data.is_empty() => {
                action.postback_data = derive_postback("action", &action.text);
            }
            _ => {}
        }
    }
}

fn fill_card_postbacks(card: &mut RichCard) {
    match card {
        RichCard::StandaloneCard(standalone) => {
            fill_postbacks(&mut standalone.card_content.suggestions)
        }
        RichCard::CarouselCard(carousel) => {
            for content in &mut carousel.card_contents {
                fill_postbacks(&mut content.suggestions);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builder::*;

    #[test]
    fn string_suggestions_become_replies_with_stable_postback() {
        let suggestions = decode_suggestions(&list(vec![string("Yes"), string("No")])).unwrap();
        assert_eq!(suggestions.len(), 2);
        let Suggestion::Reply(reply) = &suggestions[0] else {
            panic!("expected reply");
        };
        assert_eq!(reply.postback_data, r#"{"action":"reply","text":"Yes"}"#);
        assert_eq!(decode_suggestions(&list(vec![string("Yes")])).unwrap()[0], suggestions[0]);
    }

    #[test]
    fn action_dictionaries_decode() {
        let value = list(vec![dict(vec![(
            "action",
            dict(vec![
                ("text", string("Call us")),
                ("postbackData", string("call")),
                ("dialAction", dict(vec![("phoneNumber", string("+15551234"))])),
            ]),
        )])]);
        let suggestions = decode_suggestions(&value).unwrap();
        let Suggestion::Action(action) = &suggestions[0] else {
            panic!("expected action");
        };
        assert_eq!(action.postback_data, "call");
        assert_eq!(
            action.dial_action.as_ref().map(|d| d.phone_number.as_str()),
            Some("+15551234")
        );
    }

    #[test]
    fn postback_is_truncated() {
        let long = "x".repeat(3000);
        assert_eq!(derive_postback("reply", &long).chars().count(), MAX_POSTBACK_LEN);
    }

    #[test]
    fn malformed_values_explain_themselves() {
        let err = decode_text(&list(vec![])).unwrap_err();
        assert_eq!(err, "text must be a string, found list");
        let err = decode_suggestions(&number(3.0)).unwrap_err();
        assert_eq!(err, "suggestions must be a list, found number");
        assert!(decode_content_info(&dict(vec![("altText", string("x"))])).is_err());
    }

    #[test]
    fn rich_card_shapes() {
        let titled = decode_rich_card(&string("Menu")).unwrap();
        let RichCard::StandaloneCard(card) = &titled else {
            panic!("expected standalone");
        };
        assert_eq!(card.card_orientation, CardOrientation::Vertical);
        assert_eq!(card.card_content.title.as_deref(), Some("Menu"));

        let content = decode_rich_card(&dict(vec![
            ("title", string("Latte")),
            ("description", string("Hot")),
        ]))
        .unwrap();
        let RichCard::StandaloneCard(card) = &content else {
            panic!("expected standalone");
        };
        assert_eq!(card.card_content.description.as_deref(), Some("Hot"));
    }

    #[test]
    fn wire_shape_is_camel_case() {
        let content = NormalizedContent {
            text: None,
            rich_card: Some(RichCard::StandaloneCard(StandaloneCard::vertical(CardContent {
                title: Some("Hi".into()),
                ..Default::default()
            }))),
            uploaded_rbm_file: None,
            content_info: Some(ContentInfo {
                file_url: "https://x/y.png".into(),
                thumbnail_url: None,
                force_refresh: None,
                alt_text: None,
            }),
            suggestions: Vec::new(),
        };
        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(
            json,
            json!({
                "richCard": {"standaloneCard": {
                    "cardOrientation": "VERTICAL",
                    "cardContent": {"title": "Hi"}
                }},
                "contentInfo": {"fileUrl": "https://x/y.png"}
            })
        );
    }
}
