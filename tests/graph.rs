//! Graph integrity tests
//!
//! Successor bounds and the reserved property namespaces.
//!
mod common;
use common::*;
use dialogue_schema::prelude::*;
use serde_json::{Value, json};

fn message_to(next: Value) -> Value {
    json!({"type": "message", "message": "m", "nextNodeIndex": next})
}

fn end() -> Value {
    json!({"type": "event", "event": "endDialogue"})
}

#[cfg(test)]
mod graph_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_null_successor_is_never_dangling() {
        assert_eq!(check(&document(json!([message_to(json!(null))]))), none());
    }

    #[test]
    fn test_successor_out_of_range() {
        for next in [json!(2), json!(-1), json!(1.5), json!(1.0), json!(u64::MAX)] {
            let found = check(&document(json!([message_to(next.clone()), end()])));
            assert_eq!(
                found,
                vec![at("/nodes/0/nextNodeIndex", ErrorKind::DanglingReference)],
                "successor {}",
                next
            );
        }
    }

    #[test]
    fn test_successor_bound_is_exclusive() {
        assert_eq!(check(&document(json!([message_to(json!(1)), end()]))), none());
        assert_eq!(
            check(&document(json!([message_to(json!(1))]))),
            vec![at("/nodes/0/nextNodeIndex", ErrorKind::DanglingReference)]
        );
    }

    #[test]
    fn test_cycles_are_allowed() {
        let found = check(&document(json!([
            message_to(json!(1)),
            message_to(json!(0)),
            message_to(json!(2))
        ])));
        assert_eq!(found, none());
    }

    #[test]
    fn test_decision_branches_are_checked_separately() {
        let found = check(&document(json!([
            {"type": "decision", "rule": true, "passNodeIndex": 1, "failNodeIndex": 7},
            end()
        ])));
        assert_eq!(found, vec![at("/nodes/0/failNodeIndex", ErrorKind::DanglingReference)]);
    }

    #[test]
    fn test_broken_nodes_still_count_toward_the_bound() {
        let found = check(&document(json!([
            {"type": "message", "nextNodeIndex": null},
            message_to(json!(0)),
            message_to(json!(3))
        ])));
        assert_eq!(
            found,
            vec![
                at("/nodes/0", ErrorKind::MissingRequiredField),
                at("/nodes/2/nextNodeIndex", ErrorKind::DanglingReference),
            ]
        );
    }

    #[test]
    fn test_reserved_write_targets() {
        let found = check(&document(json!([
            {"type": "operation", "operation": 1, "output": "Bot/Foo", "nextNodeIndex": 1},
            {
                "type": "stringPrompt",
                "message": "m",
                "retryMessage": "r",
                "output": "user/authenticationtoken",
                "nextNodeIndex": 2
            },
            {
                "type": "choicePrompt",
                "message": "m",
                "retryMessage": "r",
                "listName": "//dialogue//items",
                "output": "choice",
                "nextNodeIndex": 3
            },
            {
                "type": "card",
                "content": {
                    "tapOptions": {"displayName": "Language/x", "output": "picked", "value": "v"},
                    "buttonOptions": {"listName": "buttons", "output": "BOT/pressed"}
                },
                "nextNodeIndex": null
            }
        ])));
        assert_eq!(
            found,
            vec![
                at("/nodes/0/output", ErrorKind::ReservedNamespace),
                at("/nodes/1/output", ErrorKind::ReservedNamespace),
                at("/nodes/2/listName", ErrorKind::ReservedNamespace),
                at("/nodes/3/content/tapOptions/displayName", ErrorKind::ReservedNamespace),
                at("/nodes/3/content/buttonOptions/output", ErrorKind::ReservedNamespace),
            ]
        );
    }

    #[test]
    fn test_reserved_property_keys() {
        let found = check(&json!({
            "id": "d",
            "trigger": {"type": "customEvent", "name": "ping", "output": "Dialogue/payload"},
            "nodes": [end()],
            "model": {"Bot/name": "string", "name": "string"},
            "entities": {"Language/x": "string"}
        }));
        assert_eq!(
            found,
            vec![
                at("/trigger/output", ErrorKind::ReservedNamespace),
                at("/model/Bot~1name", ErrorKind::ReservedNamespace),
                at("/entities/Language~1x", ErrorKind::ReservedNamespace),
            ]
        );
    }

    #[test]
    fn test_action_output_keys() {
        let found = check(&document(json!([{
            "type": "action",
            "service": {"url": "u", "method": "GET"},
            "outputs": {"body": {"ok": "a"}, "header": {"Dialogue/x": "b"}},
            "nextNodeIndex": null
        }])));
        assert_eq!(
            found,
            vec![at("/nodes/0/outputs/header/Dialogue~1x", ErrorKind::ReservedNamespace)]
        );
    }

    #[test]
    fn test_system_references_are_readable() {
        let found = check(&document(json!([
            {"type": "customEvent", "name": "a", "data": {"var": "Bot/SomeAlnum123"}},
            {"type": "customEvent", "name": "b", "data": {"var": "Dialogue/LastApiStatusCode"}},
            {
                "type": "dialogue",
                "dialogueId": "child",
                "outputs": {"answer": {"var": "Language/Answer"}},
                "nextNodeIndex": null
            },
            {
                "type": "decision",
                "rule": {"==": [{"var": "Bot/SomeAlnum123"}, "x"]},
                "passNodeIndex": null,
                "failNodeIndex": null
            }
        ])));
        assert_eq!(found, none());
    }

    #[test]
    fn test_other_system_references_are_not_readable() {
        let found = check(&document(json!([
            {"type": "customEvent", "name": "a", "data": {"var": "Dialogue/Other"}},
            {"type": "customEvent", "name": "b", "data": {"var": "Bot/not-alnum"}},
            {
                "type": "dialogue",
                "dialogueId": "child",
                "outputs": {"Bot/answer": {"var": "answer"}},
                "nextNodeIndex": null
            }
        ])));
        assert_eq!(
            found,
            vec![
                at("/nodes/0/data/var", ErrorKind::ReservedNamespace),
                at("/nodes/1/data/var", ErrorKind::ReservedNamespace),
                at("/nodes/2/outputs/Bot~1answer", ErrorKind::ReservedNamespace),
            ]
        );
    }

    #[test]
    fn test_stray_keys_do_not_hide_graph_problems() {
        let found = check(&document(json!([
            {"type": "message", "message": "hi", "nextNodeIndex": 5, "colour": "red"},
            {
                "type": "decision",
                "rule": {"==": [1]},
                "passNodeIndex": 9,
                "failNodeIndex": null,
                "note": 1
            },
            {
                "type": "operation",
                "operation": {"+": ["a"]},
                "output": "Bot/Foo",
                "nextNodeIndex": 7,
                "extra": true
            }
        ])));
        assert_eq!(
            found,
            vec![
                at("/nodes/0/colour", ErrorKind::UnknownField),
                at("/nodes/1/note", ErrorKind::UnknownField),
                at("/nodes/2/extra", ErrorKind::UnknownField),
                at("/nodes/0/nextNodeIndex", ErrorKind::DanglingReference),
                at("/nodes/1/passNodeIndex", ErrorKind::DanglingReference),
                at("/nodes/1/rule/==", ErrorKind::ArityMismatch),
                at("/nodes/2/nextNodeIndex", ErrorKind::DanglingReference),
                at("/nodes/2/operation/+/0", ErrorKind::OperandType),
                at("/nodes/2/output", ErrorKind::ReservedNamespace),
            ]
        );
    }

    #[test]
    fn test_graph_pass_can_be_skipped_after_structural_failure() {
        let value = document(json!([
            {"type": "message", "nextNodeIndex": null},
            message_to(json!(9))
        ]));
        let strict = Validator::builder()
            .graph_on_structural_failure(false)
            .build();
        assert_eq!(
            problems(&strict.validate_value(&value)),
            vec![at("/nodes/0", ErrorKind::MissingRequiredField)]
        );
        assert_eq!(
            check(&value),
            vec![
                at("/nodes/0", ErrorKind::MissingRequiredField),
                at("/nodes/1/nextNodeIndex", ErrorKind::DanglingReference),
            ]
        );
    }
}
