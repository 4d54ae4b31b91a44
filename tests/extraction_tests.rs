//! Content normalization through the public extraction API.

use serde_json::json;

use rcl_compiler::ast::builder::*;
use rcl_compiler::extraction::content::{derive_postback, RichCard, MAX_POSTBACK_LEN};
use rcl_compiler::extraction::{extract_messages, ExtractOptions};

fn catalog(children: Vec<rcl_compiler::ast::Section>) -> rcl_compiler::ast::Document {
    let mut messages = section("messages");
    for child in children {
        messages = messages.child(child);
    }
    document(vec![messages.build()])
}

#[test]
fn bare_suggestions_become_replies_with_postbacks() {
    let doc = catalog(vec![section("text")
        .named("welcome")
        .param(string("What would you like?"))
        .attr("suggestions", list(vec![string("Espresso"), string("Latte")]))
        .build()]);
    let result = extract_messages(&doc, &ExtractOptions::default());
    let content = serde_json::to_value(&result.messages[0].content).unwrap();
    assert_eq!(
        content,
        json!({
            "text": "What would you like?",
            "suggestions": [
                {"reply": {"text": "Espresso", "postbackData": "{\"action\":\"reply\",\"text\":\"Espresso\"}"}},
                {"reply": {"text": "Latte", "postbackData": "{\"action\":\"reply\",\"text\":\"Latte\"}"}}
            ]
        })
    );
}

#[test]
fn explicit_postbacks_are_kept() {
    let doc = catalog(vec![section("text")
        .named("call")
        .param(string("Call us"))
        .attr(
            "suggestions",
            list(vec![dict(vec![(
                "action",
                dict(vec![
                    ("text", string("Call")),
                    ("postbackData", string("dial_shop")),
                    ("dialAction", dict(vec![("phoneNumber", string("+15550100"))])),
                ]),
            )])]),
        )
        .build()]);
    let result = extract_messages(&doc, &ExtractOptions::default());
    let content = serde_json::to_value(&result.messages[0].content).unwrap();
    assert_eq!(content["suggestions"][0]["action"]["postbackData"], "dial_shop");
    assert_eq!(
        content["suggestions"][0]["action"]["dialAction"]["phoneNumber"],
        "+15550100"
    );
}

#[test]
fn carousel_collects_nested_cards() {
    let doc = catalog(vec![section("carousel")
        .named("menu")
        .attr("cardWidth", atom("small"))
        .child(
            section("richCard")
                .param(string("Espresso"))
                .attr("media", type_tag("url", "https://coffee.example/espresso.png", None))
                .build(),
        )
        .child(
            section("richCard")
                .param(string("Latte"))
                .attr("suggestions", list(vec![string("Order latte")]))
                .build(),
        )
        .build()]);
    let result = extract_messages(&doc, &ExtractOptions::default());
    assert!(result.errors.is_empty(), "{:?}", result.errors);

    let Some(RichCard::CarouselCard(carousel)) = &result.messages[0].content.rich_card else {
        panic!("expected a carousel");
    };
    let json = serde_json::to_value(carousel).unwrap();
    assert_eq!(json["cardWidth"], "SMALL");
    assert_eq!(json["cardContents"][0]["title"], "Espresso");
    assert_eq!(
        json["cardContents"][0]["media"]["contentInfo"]["fileUrl"],
        "https://coffee.example/espresso.png"
    );
    assert_eq!(json["cardContents"][1]["suggestions"][0]["reply"]["text"], "Order latte");
}

#[test]
fn empty_carousel_is_an_extraction_error() {
    let doc = catalog(vec![section("carousel").named("menu").at(5, 3).build()]);
    let result = extract_messages(&doc, &ExtractOptions::default());
    assert!(result.messages.is_empty());
    assert_eq!(
        result.errors,
        vec!["Failed to extract message at line 5: carousel has no richCard entries"]
    );
}

#[test]
fn fallback_scan_finds_misplaced_messages_within_depth() {
    let doc = document(vec![section("agent")
        .named("Coffee")
        .child(
            section("extras")
                .child(section("text").named("tip").param(string("Try the mocha")).build())
                .build(),
        )
        .build()]);

    let found = extract_messages(&doc, &ExtractOptions::default());
    assert_eq!(found.messages.len(), 1);
    assert_eq!(found.messages[0].id, "tip");

    let shallow = extract_messages(&doc, &ExtractOptions { scan_depth: 1 });
    assert!(shallow.messages.is_empty());
}

#[test]
fn messages_inside_the_agent_are_primary() {
    let doc = document(vec![section("agent")
        .named("Coffee")
        .child(
            section("messages")
                .child(section("text").named("hi").param(string("Hi")).build())
                .build(),
        )
        .build()]);
    let result = extract_messages(&doc, &ExtractOptions::default());
    assert_eq!(result.messages[0].id, "hi");
}

#[test]
fn postbacks_are_bounded() {
    let long = "x".repeat(MAX_POSTBACK_LEN * 2);
    assert_eq!(derive_postback("reply", &long).chars().count(), MAX_POSTBACK_LEN);
    assert_eq!(derive_postback("reply", "a"), derive_postback("reply", "a"));
}
