//! Expression typing tests
//!
//! Use-site expectations, operator arity, operand families and nesting limits,
//! checked through whole documents.
//!
mod common;
use common::*;
use dialogue_schema::prelude::*;
use serde_json::{Value, json};

fn decision(rule: Value) -> Value {
    document(json!([
        {"type": "decision", "rule": rule, "passNodeIndex": 1, "failNodeIndex": null},
        {"type": "event", "event": "endDialogue"}
    ]))
}

fn operation(expression: Value) -> Value {
    document(json!([
        {"type": "operation", "operation": expression, "output": "result", "nextNodeIndex": null}
    ]))
}

#[cfg(test)]
mod expression_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_boolean_literals_pass_a_decision() {
        assert_eq!(check(&decision(json!(true))), none());
        assert_eq!(check(&decision(json!(false))), none());
    }

    #[test]
    fn test_boolean_use_site_rejects_other_families() {
        let non_boolean = [
            json!("yes"),
            json!(1),
            json!({"+": [1, 2]}),
            json!({"cat": ["a", "b"]}),
            json!({"Date.currentDate": []}),
            json!({"DateTime.currentDateTime": []}),
            json!({"Time.currentTime": []}),
            json!({"method": ["a,b", "split", [","]]}),
            json!(null),
        ];
        for rule in non_boolean {
            assert_eq!(
                check(&decision(rule.clone())),
                vec![at("/nodes/0/rule", ErrorKind::FamilyMismatch)],
                "rule {} should not pass as Boolean",
                rule
            );
        }
    }

    #[test]
    fn test_boolean_use_site_accepts_any_arm() {
        assert_eq!(check(&decision(json!({"var": "flag"}))), none());
        assert_eq!(check(&decision(json!({"if": [true, false, true]}))), none());
        assert_eq!(
            check(&decision(json!({"method": [{"var": "flags"}, "getItem", [0]]}))),
            none()
        );
    }

    #[test]
    fn test_logic_use_sites_take_any_family() {
        let found = check(&document(json!([
            {
                "type": "numberPrompt",
                "message": "How many?",
                "retryMessage": "A number please",
                "output": "guests",
                "validation": {"+": ["a"]},
                "nextNodeIndex": null
            },
            {
                "type": "repeatDialogue",
                "dialogueId": "child",
                "inputs": {},
                "outputs": {},
                "repeatUntil": "done",
                "nextNodeIndex": null
            },
            {
                "type": "card",
                "content": {"title": "t", "isThumbnail": 1},
                "nextNodeIndex": null
            }
        ])));
        assert_eq!(
            found,
            vec![
                at("/nodes/0/validation/+/0", ErrorKind::OperandType),
                at("/nodes/2/content/isThumbnail", ErrorKind::FamilyMismatch),
            ]
        );
    }

    #[test]
    fn test_operation_accepts_any_family() {
        for expression in [
            json!(null),
            json!("text"),
            json!(0),
            json!(true),
            json!({"method": [{"var": "items"}, "sort", []]}),
            json!({"DateTime.fromUTC": ["2024-01-01T00:00:00", "yyyy-MM-dd"]}),
        ] {
            assert_eq!(check(&operation(expression)), none());
        }
    }

    #[test]
    fn test_arity_rules() {
        let cases = [
            (json!({"/": [1]}), "/nodes/0/operation/~1"),
            (json!({"/": [1, 2, 3]}), "/nodes/0/operation/~1"),
            (json!({"%": [1]}), "/nodes/0/operation/%"),
            (json!({"%": [1, 2, 3]}), "/nodes/0/operation/%"),
            (json!({"and": [true]}), "/nodes/0/operation/and"),
            (json!({"or": [true]}), "/nodes/0/operation/or"),
            (json!({"if": [true, 1]}), "/nodes/0/operation/if"),
            (json!({"*": [2]}), "/nodes/0/operation/*"),
            (json!({"!": [true, false]}), "/nodes/0/operation/!"),
            (json!({"substr": ["abc"]}), "/nodes/0/operation/substr"),
        ];
        for (expression, path) in cases {
            assert_eq!(
                check(&operation(expression.clone())),
                vec![at(path, ErrorKind::ArityMismatch)],
                "expression {}",
                expression
            );
        }
        assert_eq!(check(&operation(json!({"/": [1, 2]}))), none());
        assert_eq!(check(&operation(json!({"and": [true, false, true]}))), none());
        assert_eq!(check(&operation(json!({"if": [true, 1, false, 2, 3]}))), none());
    }

    #[test]
    fn test_operand_type_reported_at_the_operand() {
        let found = check(&operation(json!({"+": [1, {"cat": ["a", "b"]}, 3]})));
        assert_eq!(found, vec![at("/nodes/0/operation/+/1", ErrorKind::OperandType)]);

        let found = check(&operation(json!({"substr": ["abc", "1"]})));
        assert_eq!(found, vec![at("/nodes/0/operation/substr/1", ErrorKind::OperandType)]);
    }

    #[test]
    fn test_nested_errors_do_not_cascade() {
        let found = check(&decision(json!({"and": [{"==": [1]}, {"unknownOp": [1]}]})));
        assert_eq!(
            found,
            vec![
                at("/nodes/0/rule/and/0/==", ErrorKind::ArityMismatch),
                at("/nodes/0/rule/and/1/unknownOp", ErrorKind::UnknownOperator),
            ]
        );
    }

    #[test]
    fn test_ordered_comparisons() {
        assert_eq!(
            check(&decision(json!({"<": [{"Date.currentDate": []}, "2030-01-01"]}))),
            none()
        );
        assert_eq!(
            check(&decision(json!({"<": [{"Date.currentDate": []}, {"Time.currentTime": []}]}))),
            vec![at("/nodes/0/rule/</1", ErrorKind::OperandType)]
        );
        assert_eq!(
            check(&decision(json!({">=": [true, false]}))),
            vec![at("/nodes/0/rule/>=/0", ErrorKind::OperandType)]
        );
    }

    #[test]
    fn test_temporal_units_per_family() {
        assert_eq!(
            check(&operation(json!({"method": [{"Time.currentTime": []}, "addMinutes", [5]]}))),
            none()
        );
        assert_eq!(
            check(&operation(json!({"method": [{"Time.currentTime": []}, "addDays", [5]]}))),
            vec![at("/nodes/0/operation/method/0", ErrorKind::OperandType)]
        );
        assert_eq!(
            check(&operation(json!({"method": [{"Date.currentDate": []}, "subtractWeeks", ["x"]]}))),
            vec![at("/nodes/0/operation/method/2/0", ErrorKind::OperandType)]
        );
    }

    #[test]
    fn test_format_strings() {
        assert_eq!(
            check(&operation(json!({"DateTime.format": [{"DateTime.currentDateTime": []}, "yyyy-MM-dd HH:mm"]}))),
            none()
        );
        assert_eq!(
            check(&operation(json!({"Date.format": [{"Date.currentDate": []}, "dd.MM.yyyy"]}))),
            vec![at("/nodes/0/operation/Date.format/1", ErrorKind::PatternMismatch)]
        );
    }

    #[test]
    fn test_filter_forms() {
        assert_eq!(
            check(&operation(json!({"method": [{"var": "items"}, "filter", ["item", {"==": [{"current": "item"}, 1]}]]}))),
            none()
        );
        assert_eq!(
            check(&operation(json!({"method": [{"var": "items"}, "filter", [{"!!": [{"current": "item"}]}]]}))),
            none()
        );
        assert_eq!(
            check(&operation(json!({"method": [{"var": "items"}, "filter", [1, true]]}))),
            vec![at("/nodes/0/operation/method/2/0", ErrorKind::InvalidType)]
        );
    }

    #[test]
    fn test_reserved_var_reference() {
        let found = check(&decision(json!({"==": [{"var": "user/authenticationToken"}, "x"]})));
        assert_eq!(
            found,
            vec![at("/nodes/0/rule/==/0/var", ErrorKind::ReservedNamespace)]
        );
        assert_eq!(
            check(&decision(json!({"==": [{"var": "Language/Greeting"}, "x"]}))),
            none()
        );
    }

    #[test]
    fn test_depth_ceiling() {
        let mut deep = json!(1);
        for _ in 0..100 {
            deep = json!({"+": [deep]});
        }
        let found = check(&operation(deep.clone()));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].1, ErrorKind::DepthExceeded);

        let relaxed = Validator::builder().max_depth(200).build();
        assert!(relaxed.validate_value(&operation(deep)).is_accepted());
    }

    #[test]
    fn test_infer_type_contract() {
        let validator = Validator::new();
        assert_eq!(
            validator.infer_type(&json!({"==": [{"var": "count"}, 3]}), None),
            Ok(TypeFamily::Boolean)
        );
        assert_eq!(
            validator.infer_type(&json!({"if": [true, 1, 2]}), Some(TypeFamily::Numeric)),
            Ok(TypeFamily::Numeric)
        );
        let report = validator
            .infer_type(&json!({"cat": ["a", "b"]}), Some(TypeFamily::Boolean))
            .unwrap_err();
        assert_eq!(problems(&report), vec![at("", ErrorKind::FamilyMismatch)]);
    }
}
