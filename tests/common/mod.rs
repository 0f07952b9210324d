#![allow(dead_code)]

use async_trait::async_trait;
use cypher_filter::backend::cypher::{CypherFilterConverter, QueryBuilder};
use cypher_filter::backend::filter::LoweredFilter;
use cypher_filter::backend::{GraphRepository, QueryExecutor, QueryResult};
use cypher_filter::config::AppConfig;
use cypher_filter::error::AppResult;
use cypher_filter::parser::{validate, EntityKind, ExpressionValidator, ValidatorOptions};
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex};

/// One statement seen by [`RecordingExecutor`]
#[derive(Debug, Clone)]
pub struct RecordedQuery {
    pub text: String,
    pub parameters: Map<String, Value>,
}

/// Executor that records every statement and answers with a canned result
#[derive(Default)]
pub struct RecordingExecutor {
    pub queries: Mutex<Vec<RecordedQuery>>,
    pub response: QueryResult,
}

impl RecordingExecutor {
    pub fn with_response(response: QueryResult) -> Self {
        RecordingExecutor {
            queries: Mutex::new(Vec::new()),
            response,
        }
    }

    pub fn recorded(&self) -> Vec<RecordedQuery> {
        self.queries.lock().unwrap().clone()
    }

    pub fn last(&self) -> RecordedQuery {
        self.recorded()
            .pop()
            .expect("at least one query should have been executed")
    }
}

#[async_trait]
impl QueryExecutor for RecordingExecutor {
    async fn execute(&self, query: &str, parameters: &Map<String, Value>) -> AppResult<QueryResult> {
        self.queries.lock().unwrap().push(RecordedQuery {
            text: query.to_string(),
            parameters: parameters.clone(),
        });
        Ok(self.response.clone())
    }
}

/// Repository over a fresh recording executor with default configuration
pub fn setup_repository() -> (GraphRepository, Arc<RecordingExecutor>) {
    setup_repository_with(QueryResult::default(), &AppConfig::default_config())
}

pub fn setup_repository_with(
    response: QueryResult,
    config: &AppConfig,
) -> (GraphRepository, Arc<RecordingExecutor>) {
    let executor = Arc::new(RecordingExecutor::with_response(response));
    let repository = GraphRepository::new(executor.clone(), QueryBuilder::from_config(config));
    (repository, executor)
}

/// Validate and lower with default options against `e`
pub fn lower(raw: &Value, kind: EntityKind) -> LoweredFilter {
    let expression = validate(raw, kind).expect("filter should validate");
    CypherFilterConverter::new().lower(&expression, "e")
}

pub fn lower_node(raw: Value) -> LoweredFilter {
    lower(&raw, EntityKind::Node)
}

pub fn lower_relationship(raw: Value) -> LoweredFilter {
    lower(&raw, EntityKind::Relationship)
}

pub fn strict_validator() -> ExpressionValidator {
    ExpressionValidator::new(ValidatorOptions {
        strict: true,
        ..ValidatorOptions::default()
    })
}

pub fn params(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("Expected object"),
    }
}
