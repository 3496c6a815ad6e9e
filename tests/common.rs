//! Common test utilities for building dialogue documents and reading reports.
use dialogue_schema::prelude::*;
use serde_json::{Value, json};

/// Wraps a node array into a minimal document with an intent trigger.
#[allow(dead_code)]
pub fn document(nodes: Value) -> Value {
    json!({
        "id": "test-dialogue",
        "trigger": {"type": "intent", "intent": "greet"},
        "nodes": nodes
    })
}

/// A document that touches every node type and most optional fields.
///
/// Flow: ask for a date, branch on it, loop through a repeat dialogue and finish
/// with a set of card, action and prompt nodes. All successors are in range.
#[allow(dead_code)]
pub fn full_dialogue() -> Value {
    json!({
        "id": "booking",
        "background": false,
        "trigger": {
            "type": "message",
            "values": ["book a table", {"var": "Language/BookTable"}]
        },
        "model": {"booking/guests": "number", "booking/tags": ["a", "b"]},
        "entities": {"Restaurant": "string"},
        "nodes": [
            {
                "type": "datePrompt",
                "message": "Which day?",
                "retryMessage": "Please give a date.",
                "output": "booking/day",
                "validation": {">=": [{"var": "booking/day"}, {"Date.currentDate": []}]},
                "nextNodeIndex": 1
            },
            {
                "type": "decision",
                "rule": {"and": [
                    {"==": [{"method": [{"var": "booking/day"}, "addDays", [1]]}, "2024-01-02"]},
                    {"!": [{"var": "booking/confirmed"}]}
                ]},
                "passNodeIndex": 2,
                "failNodeIndex": 0
            },
            {
                "type": "operation",
                "operation": {"cat": ["Table for ", {"var": "booking/guests"}]},
                "output": "booking/summary",
                "nextNodeIndex": 3
            },
            {
                "type": "repeatDialogue",
                "dialogueId": "collect-guest",
                "inputs": {"index": {"method": [{"var": "guests"}, "getCount"]}},
                "outputs": {"guests/last": {"var": "Dialogue/LastApiStatusCode"}},
                "repeatUntil": {">": [{"var": "count"}, 3]},
                "nextNodeIndex": 4
            },
            {
                "type": "card",
                "content": {
                    "title": "Your booking",
                    "text": "All set.",
                    "isThumbnail": true,
                    "tapOptions": {"displayName": "booking/name", "output": "booking/choice", "value": "ok"}
                },
                "nextNodeIndex": 5
            },
            {
                "type": "action",
                "service": {
                    "url": "https://example.com/book",
                    "method": "POST",
                    "headers": {"Content-Type": "application/json"},
                    "body": {"day": "{booking/day}"}
                },
                "outputs": {"body": {"booking/id": "id"}},
                "nextNodeIndex": 6
            },
            {
                "type": "choicePrompt",
                "message": "Pick one",
                "retryMessage": "Pick one of the list",
                "listName": "restaurants",
                "displayName": "name",
                "output": "booking/restaurant",
                "nextNodeIndex": 7
            },
            {
                "type": "confirmationPrompt",
                "message": "Confirm?",
                "retryMessage": "Yes or no?",
                "positiveMessage": "Great",
                "output": "booking/confirmed",
                "nextNodeIndex": 8
            },
            {
                "type": "cardCollection",
                "listName": "restaurants",
                "contentItem": "restaurant",
                "content": {
                    "title": "Pick",
                    "buttonOptions": {"listName": "options", "output": "booking/option"}
                },
                "output": "booking/picked",
                "pageSize": 5,
                "nextNodeIndex": 9
            },
            {
                "type": "customCardCollection",
                "listName": "restaurants",
                "contentItem": "item",
                "customContent": {"contentType": "application/vnd.card", "content": {}},
                "outputOperation": {
                    "operation": {"method": [{"var": "restaurants"}, "getItem", [0]]},
                    "output": "booking/first"
                },
                "output": "booking/custom",
                "validation": {"method": [{"var": "booking/custom"}, "matchesPattern", ["^[a-z]+$"]]},
                "nextNodeIndex": 10
            },
            {
                "type": "attachmentPrompt",
                "contentTypes": ["image/png", "image/jpeg"],
                "message": "Send a photo",
                "retryMessage": "A photo, please",
                "output": "conversation/photo",
                "nextNodeIndex": 11
            },
            {
                "type": "downloadAction",
                "service": {"url": "https://example.com/menu"},
                "outputs": {"content": "menu", "header": {"menu/type": "Content-Type"}},
                "nextNodeIndex": 12
            },
            {
                "type": "dialogue",
                "dialogueId": "upsell",
                "inputs": {"guests": {"var": "booking/guests"}},
                "outputs": {"booking/extra": {"var": "extra"}},
                "nextNodeIndex": 13
            },
            {
                "type": "sequenceDialogue",
                "dialogueId": "per-guest",
                "inputItem": "guest",
                "listName": "guests",
                "nextNodeIndex": 14
            },
            {
                "type": "message",
                "message": "Thanks!",
                "customContent": {"contentType": "text/plain", "content": {"x": 1}},
                "nextNodeIndex": 15
            },
            {
                "type": "customEvent",
                "name": "booked",
                "data": {"var": "booking/id"}
            },
            {
                "type": "event",
                "event": "endDialogue"
            }
        ]
    })
}

/// Flattens a report into `(path, kind)` pairs for compact assertions.
#[allow(dead_code)]
pub fn problems(report: &Report) -> Vec<(String, ErrorKind)> {
    report
        .iter()
        .map(|d| (d.path.as_str().to_string(), d.kind()))
        .collect()
}

/// Validates a document value with default settings.
#[allow(dead_code)]
pub fn check(document: &Value) -> Vec<(String, ErrorKind)> {
    problems(&Validator::new().validate_value(document))
}

/// Shorthand for an expected `(path, kind)` pair.
#[allow(dead_code)]
pub fn at(path: &str, kind: ErrorKind) -> (String, ErrorKind) {
    (path.to_string(), kind)
}

/// The empty problem list of an accepted document.
#[allow(dead_code)]
pub fn none() -> Vec<(String, ErrorKind)> {
    Vec::new()
}
