use cypher_filter::error::AppError;
use cypher_filter::parser::{validate, EntityKind};
use serde_json::json;

mod common;

use common::{lower_node, lower_relationship, params};

#[test]
fn test_or_of_property_comparisons() {
    let result = lower_node(json!({"$or": [{"age": {"$lt": 18}}, {"age": {"$gte": 65}}]}));

    assert_eq!(result.fragment, "(e.age < $param_0 OR e.age >= $param_1)");
    assert_eq!(result.parameters, params(json!({"param_0": 18, "param_1": 65})));
}

#[test]
fn test_and_with_three_operands() {
    let result = lower_node(json!({"$and": [
        {"name": {"$startsWith": "J"}},
        {"age": {"$gt": 21}},
        {"active": {"$eq": true}}
    ]}));

    assert_eq!(
        result.fragment,
        "(e.name STARTS WITH $param_0 AND e.age > $param_1 AND e.active = $param_2)"
    );
    assert_eq!(
        result.parameters,
        params(json!({"param_0": "J", "param_1": 21, "param_2": true}))
    );
}

#[test]
fn test_nested_logical_operators() {
    let result = lower_node(json!({"$and": [
        {"$or": [{"city": {"$eq": "Paris"}}, {"city": {"$eq": "Rome"}}]},
        {"$not": {"age": {"$lt": 18}}}
    ]}));

    assert_eq!(
        result.fragment,
        "((e.city = $param_0 OR e.city = $param_1) AND NOT(e.age < $param_2))"
    );
}

#[test]
fn test_xor_on_relationships() {
    let result = lower_relationship(json!({"$xor": [
        {"weight": {"$gt": 0.5}},
        {"$type": ["LIKES", "LOVES"]}
    ]}));

    assert_eq!(result.fragment, "(e.weight > $param_0 XOR type(e) IN $param_1)");
    assert_eq!(result.parameters["param_1"], json!(["LIKES", "LOVES"]));
}

#[test]
fn test_empty_operand_mapping_is_tautology() {
    let result = lower_node(json!({"$or": [{}, {"age": {"$eq": 1}}]}));
    assert_eq!(result.fragment, "(TRUE OR e.age = $param_0)");
}

#[test]
fn test_empty_logical_list_is_rejected() {
    for operator in ["$and", "$or", "$xor"] {
        let err = validate(&json!({ operator: [] }), EntityKind::Node).unwrap_err();
        match err {
            AppError::EmptyLogicalOperand(op) => assert_eq!(op, operator),
            other => panic!("Expected EmptyLogicalOperand for {}, got {:?}", operator, other),
        }
    }
}

#[test]
fn test_logical_operands_must_be_mappings() {
    let err = validate(&json!({"$or": [1, 2]}), EntityKind::Node).unwrap_err();
    assert!(matches!(err, AppError::InvalidOperatorValue { .. }));

    let err = validate(&json!({"$and": {"a": {"$eq": 1}}}), EntityKind::Node).unwrap_err();
    assert!(matches!(err, AppError::InvalidOperatorValue { .. }));

    let err = validate(&json!({"$not": [{"a": {"$eq": 1}}]}), EntityKind::Node).unwrap_err();
    assert!(matches!(err, AppError::InvalidOperatorValue { .. }));
}

#[test]
fn test_parameters_follow_traversal_order() {
    let result = lower_node(json!({
        "b": {"$eq": 2},
        "$or": [{"c": {"$eq": 3}}, {"d": {"$eq": 4}}],
        "a": {"$eq": 1}
    }));

    assert_eq!(
        result.fragment,
        "(e.b = $param_0 AND (e.c = $param_1 OR e.d = $param_2) AND e.a = $param_3)"
    );
    let keys: Vec<&String> = result.parameters.keys().collect();
    assert_eq!(keys, vec!["param_0", "param_1", "param_2", "param_3"]);
    assert_eq!(result.parameters["param_3"], json!(1));
}
