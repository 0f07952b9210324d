use cypher_filter::backend::QueryResult;
use cypher_filter::config::AppConfig;
use cypher_filter::error::AppError;
use cypher_filter::parser::{QueryOptions, QueryOrder};
use serde_json::{json, Value};

mod common;

use common::{params, setup_repository, setup_repository_with};

#[tokio::test]
async fn test_find_nodes_executes_filtered_match() {
    let (repository, executor) = setup_repository();

    let options = QueryOptions::from_value(&json!({
        "limit": 25,
        "skip": 50,
        "sort": ["lastName", "firstName"],
        "order": "DESC"
    }))
    .unwrap();

    repository
        .find_nodes(&["Person"], &json!({"age": {"$gte": 18}}), &options)
        .await
        .unwrap();

    let query = executor.last();
    assert_eq!(
        query.text,
        "MATCH (e:Person) WHERE e.age >= $param_0 RETURN e \
         ORDER BY e.lastName DESC, e.firstName DESC SKIP $skip LIMIT $limit"
    );
    assert_eq!(
        query.parameters,
        params(json!({"param_0": 18, "skip": 50, "limit": 25}))
    );
}

#[tokio::test]
async fn test_find_nodes_with_multiple_labels_and_no_filter() {
    let (repository, executor) = setup_repository();

    repository
        .find_nodes(&["Person", "Employee"], &json!({}), &QueryOptions::default())
        .await
        .unwrap();

    let query = executor.last();
    assert_eq!(query.text, "MATCH (e:Person:Employee) RETURN e");
    assert!(query.parameters.is_empty());
}

#[tokio::test]
async fn test_find_relationships() {
    let (repository, executor) = setup_repository();

    repository
        .find_relationships(
            Some("FOLLOWS"),
            &json!({"since": {"$lt": 2015}}),
            &QueryOptions::new().with_sort("since", QueryOrder::Asc),
        )
        .await
        .unwrap();
    repository
        .find_relationships(None, &Value::Null, &QueryOptions::default())
        .await
        .unwrap();

    let recorded = executor.recorded();
    assert_eq!(recorded.len(), 2);
    assert_eq!(
        recorded[0].text,
        "MATCH ()-[e:FOLLOWS]->() WHERE e.since < $param_0 RETURN e ORDER BY e.since ASC"
    );
    assert_eq!(recorded[1].text, "MATCH ()-[e]->() RETURN e");
}

#[tokio::test]
async fn test_results_are_returned_unchanged() {
    let response = QueryResult {
        keys: vec!["e".to_string()],
        rows: vec![vec![json!({"name": "Alice"})], vec![json!({"name": "Bob"})]],
    };
    let (repository, _executor) =
        setup_repository_with(response.clone(), &AppConfig::default_config());

    let result = repository
        .find_nodes(&["Person"], &json!({"name": {"$in": ["Alice", "Bob"]}}), &QueryOptions::default())
        .await
        .unwrap();
    assert_eq!(result, response);
}

#[tokio::test]
async fn test_count_nodes() {
    let response = QueryResult {
        keys: vec!["count".to_string()],
        rows: vec![vec![json!(42)]],
    };
    let (repository, executor) = setup_repository_with(response, &AppConfig::default_config());

    let count = repository
        .count_nodes(&["Person"], &json!({"active": {"$eq": true}}))
        .await
        .unwrap();

    assert_eq!(count, 42);
    assert_eq!(
        executor.last().text,
        "MATCH (e:Person) WHERE e.active = $param_0 RETURN count(e) AS count"
    );
}

#[tokio::test]
async fn test_invalid_filter_executes_nothing() {
    let (repository, executor) = setup_repository();

    let err = repository
        .find_nodes(&["Person"], &json!({"$or": []}), &QueryOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::EmptyLogicalOperand(_)));
    assert!(executor.recorded().is_empty());
}

#[tokio::test]
async fn test_configured_reference_and_prefix() {
    let config = AppConfig::from_yaml_str(
        "lowering:\n  entity_reference: person\n  parameter_prefix: arg\n",
    )
    .unwrap();
    let (repository, executor) = setup_repository_with(QueryResult::default(), &config);

    repository
        .find_nodes(
            &["Person"],
            &json!({"$pattern": [{"$direction": "OUTGOING", "$node": {"$labels": "City"}}]}),
            &QueryOptions::new().with_limit(1),
        )
        .await
        .unwrap();

    let query = executor.last();
    assert_eq!(
        query.text,
        "MATCH (person:Person) WHERE EXISTS { MATCH (person)-->(_n0) \
         WHERE ALL(_i1 IN $arg_0 WHERE _i1 IN labels(_n0)) } RETURN person LIMIT $limit"
    );
    assert_eq!(query.parameters, params(json!({"arg_0": ["City"], "limit": 1})));
}

#[tokio::test]
async fn test_label_reference_is_not_shadowed() {
    let config = AppConfig::from_yaml_str("lowering:\n  entity_reference: label\n").unwrap();
    let (repository, executor) = setup_repository_with(QueryResult::default(), &config);

    repository
        .find_nodes(&["Person"], &json!({"$labels": ["Admin"]}), &QueryOptions::default())
        .await
        .unwrap();

    assert_eq!(
        executor.last().text,
        "MATCH (label:Person) WHERE ALL(_i0 IN $param_0 WHERE _i0 IN labels(label)) RETURN label"
    );
}

#[tokio::test]
async fn test_repeated_queries_are_identical() {
    let (repository, executor) = setup_repository();
    let filter = json!({
        "$and": [{"score": {"$gt": 0.5}}, {"tags": {"$all": [{"$ne": "spam"}]}}],
        "$pattern": [{"$relationship": {"$type": "TAGGED"}}]
    });

    for _ in 0..3 {
        repository
            .find_nodes(&["Post"], &filter, &QueryOptions::default())
            .await
            .unwrap();
    }

    let recorded = executor.recorded();
    assert_eq!(recorded.len(), 3);
    assert!(recorded
        .iter()
        .all(|query| query.text == recorded[0].text && query.parameters == recorded[0].parameters));
}

#[test]
fn test_query_options_validation() {
    for options in [json!({"limit": 0}), json!({"skip": -1}), json!({"order": "UP"})] {
        let err = QueryOptions::from_value(&options).unwrap_err();
        assert!(matches!(err, AppError::InvalidQueryOptions(_)));
    }
}
