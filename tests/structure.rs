//! Structural validation tests
//!
//! Required keys, closed field sets, primitive types, patterns and lengths.
//!
mod common;
use common::*;
use dialogue_schema::prelude::*;
use serde_json::json;

#[cfg(test)]
mod structure_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_full_dialogue_is_accepted() {
        assert_eq!(check(&full_dialogue()), none());
    }

    #[test]
    fn test_top_level_fields() {
        let found = check(&json!({
            "trigger": {"type": "nestedDialogue"},
            "nodes": [{"type": "event", "event": "endDialogue"}],
            "owner": "me",
            "background": "yes"
        }));
        assert_eq!(
            found,
            vec![
                at("", ErrorKind::MissingRequiredField),
                at("/background", ErrorKind::InvalidType),
                at("/owner", ErrorKind::UnknownField),
            ]
        );
    }

    #[test]
    fn test_document_must_be_an_object() {
        assert_eq!(check(&json!([1, 2])), vec![at("", ErrorKind::InvalidType)]);
    }

    #[test]
    fn test_right_type_with_malformed_body_is_rejected() {
        let found = check(&document(json!([
            {"type": "message", "text": "hi", "nextNodeIndex": null}
        ])));
        assert_eq!(
            found,
            vec![
                at("/nodes/0", ErrorKind::MissingRequiredField),
                at("/nodes/0/text", ErrorKind::UnknownField),
            ]
        );
    }

    #[test]
    fn test_missing_discriminator() {
        let found = check(&document(json!([{"message": "hi", "nextNodeIndex": null}])));
        assert_eq!(found, vec![at("/nodes/0", ErrorKind::MissingRequiredField)]);
    }

    #[test]
    fn test_successor_must_be_number_or_null() {
        let found = check(&document(json!([
            {"type": "message", "message": "hi", "nextNodeIndex": "1"}
        ])));
        assert_eq!(found, vec![at("/nodes/0/nextNodeIndex", ErrorKind::InvalidType)]);
    }

    #[test]
    fn test_successor_is_required() {
        let found = check(&document(json!([
            {"type": "operation", "operation": 1, "output": "x"}
        ])));
        assert_eq!(found, vec![at("/nodes/0", ErrorKind::MissingRequiredField)]);
    }

    #[test]
    fn test_output_short_limit() {
        let long = "x".repeat(321);
        let found = check(&document(json!([
            {"type": "message", "message": long, "nextNodeIndex": null}
        ])));
        assert_eq!(found, vec![at("/nodes/0/message", ErrorKind::CardinalityMismatch)]);
    }

    #[test]
    fn test_alphanumeric_and_blob_patterns() {
        let found = check(&document(json!([
            {
                "type": "sequenceDialogue",
                "dialogueId": "d",
                "inputItem": "not alnum!",
                "listName": "items",
                "nextNodeIndex": null
            },
            {
                "type": "attachmentPrompt",
                "message": "m",
                "retryMessage": "r",
                "output": "user/photo",
                "nextNodeIndex": null
            }
        ])));
        assert_eq!(
            found,
            vec![
                at("/nodes/0/inputItem", ErrorKind::PatternMismatch),
                at("/nodes/1/output", ErrorKind::PatternMismatch),
            ]
        );
    }

    #[test]
    fn test_enumerations() {
        let found = check(&json!({
            "id": "d",
            "trigger": {"type": "event", "event": "goodbye"},
            "nodes": [
                {"type": "event", "event": "explode"},
                {
                    "type": "action",
                    "service": {"url": "u", "method": "PATCH"},
                    "nextNodeIndex": null
                }
            ]
        }));
        assert_eq!(
            found,
            vec![
                at("/trigger/event", ErrorKind::PatternMismatch),
                at("/nodes/0/event", ErrorKind::PatternMismatch),
                at("/nodes/1/service/method", ErrorKind::PatternMismatch),
            ]
        );
    }

    #[test]
    fn test_download_service_has_no_method() {
        let found = check(&document(json!([{
            "type": "downloadAction",
            "service": {"url": "u", "method": "GET"},
            "nextNodeIndex": null
        }])));
        assert_eq!(found, vec![at("/nodes/0/service/method", ErrorKind::UnknownField)]);
    }

    #[test]
    fn test_card_content_needs_a_visible_part() {
        let found = check(&document(json!([{
            "type": "card",
            "content": {"url": "https://example.com"},
            "nextNodeIndex": null
        }])));
        assert_eq!(found, vec![at("/nodes/0/content", ErrorKind::VariantNotMatched)]);
    }

    #[test]
    fn test_tap_options_are_closed_and_complete() {
        let found = check(&document(json!([{
            "type": "card",
            "content": {"tapOptions": {"output": "o", "value": "v", "extra": 1}},
            "nextNodeIndex": null
        }])));
        assert_eq!(
            found,
            vec![
                at("/nodes/0/content/tapOptions", ErrorKind::MissingRequiredField),
                at("/nodes/0/content/tapOptions/extra", ErrorKind::UnknownField),
            ]
        );
    }

    #[test]
    fn test_trigger_variants() {
        let found = check(&json!({
            "id": "d",
            "trigger": {"type": "attachment", "contentTypes": [], "output": "photo"},
            "nodes": [{"type": "event", "event": "endDialogue"}]
        }));
        assert_eq!(found, vec![at("/trigger/contentTypes", ErrorKind::CardinalityMismatch)]);

        let found = check(&json!({
            "id": "d",
            "trigger": {"type": "message", "values": ["hi", 3, {"var": "Bot/x"}]},
            "nodes": [{"type": "event", "event": "endDialogue"}]
        }));
        assert_eq!(
            found,
            vec![
                at("/trigger/values/1", ErrorKind::VariantNotMatched),
                at("/trigger/values/2/var", ErrorKind::PatternMismatch),
            ]
        );

        let found = check(&json!({
            "id": "d",
            "trigger": {"type": "nestedDialogue", "intent": "x"},
            "nodes": [{"type": "event", "event": "endDialogue"}]
        }));
        assert_eq!(found, vec![at("/trigger/intent", ErrorKind::UnknownField)]);
    }

    #[test]
    fn test_dialogue_inputs_keys_are_alphanumeric() {
        let found = check(&document(json!([{
            "type": "dialogue",
            "dialogueId": "child",
            "inputs": {"good": 1, "bad-key": 2},
            "nextNodeIndex": null
        }])));
        assert_eq!(found, vec![at("/nodes/0/inputs/bad-key", ErrorKind::UnknownField)]);
    }

    #[test]
    fn test_dialogue_outputs_are_var_lookups() {
        let found = check(&document(json!([{
            "type": "dialogue",
            "dialogueId": "child",
            "outputs": {"result": "plain"},
            "nextNodeIndex": null
        }])));
        assert_eq!(found, vec![at("/nodes/0/outputs/result", ErrorKind::InvalidType)]);
    }

    #[test]
    fn test_errors_accumulate_across_nodes() {
        let found = check(&document(json!([
            {"type": "message", "nextNodeIndex": null},
            {"type": "decision", "rule": true, "passNodeIndex": null},
            {"type": "event", "event": "endDialogue"}
        ])));
        assert_eq!(
            found,
            vec![
                at("/nodes/0", ErrorKind::MissingRequiredField),
                at("/nodes/1", ErrorKind::MissingRequiredField),
            ]
        );
    }

    #[test]
    fn test_pointer_escaping_in_paths() {
        let found = check(&json!({
            "id": "d",
            "trigger": {"type": "nestedDialogue"},
            "nodes": [{"type": "event", "event": "endDialogue"}],
            "model": {"a/b~c": 1}
        }));
        assert_eq!(found, vec![at("/model/a~1b~0c", ErrorKind::VariantNotMatched)]);
    }
}
