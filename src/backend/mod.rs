use crate::error::{AppError, AppResult};
use crate::parser::sort_parser::QueryOptions;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

pub mod cypher;
pub mod filter;

use cypher::{CypherQuery, QueryBuilder};

/// Rows returned by a graph database driver
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Column names, in `RETURN` order
    pub keys: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl QueryResult {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value of the named column in the first row
    pub fn first_value(&self, key: &str) -> Option<&Value> {
        let index = self.keys.iter().position(|k| k == key)?;
        self.rows.first().and_then(|row| row.get(index))
    }
}

/// Driver seam for running generated Cypher
///
/// Implementations own connection handling; this crate only produces the
/// statement text and its parameter map.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Run a parameterized statement
    async fn execute(&self, query: &str, parameters: &Map<String, Value>) -> AppResult<QueryResult>;
}

/// Filter-driven reads over a graph database
#[derive(Clone)]
pub struct GraphRepository {
    executor: Arc<dyn QueryExecutor>,
    builder: Arc<QueryBuilder>,
}

impl GraphRepository {
    pub fn new(executor: Arc<dyn QueryExecutor>, builder: QueryBuilder) -> Self {
        GraphRepository {
            executor,
            builder: Arc::new(builder),
        }
    }

    pub fn builder(&self) -> &QueryBuilder {
        &self.builder
    }

    /// Find nodes carrying all `labels` that match `filter`
    pub async fn find_nodes(
        &self,
        labels: &[&str],
        filter: &Value,
        options: &QueryOptions,
    ) -> AppResult<QueryResult> {
        let query = self.builder.match_nodes(labels, filter, options)?;
        self.run(query).await
    }

    /// Find relationships, optionally of one type, that match `filter`
    pub async fn find_relationships(
        &self,
        relationship_type: Option<&str>,
        filter: &Value,
        options: &QueryOptions,
    ) -> AppResult<QueryResult> {
        let query = self
            .builder
            .match_relationships(relationship_type, filter, options)?;
        self.run(query).await
    }

    /// Count nodes carrying all `labels` that match `filter`
    pub async fn count_nodes(&self, labels: &[&str], filter: &Value) -> AppResult<u64> {
        let query = self.builder.count_nodes(labels, filter)?;
        let result = self.run(query).await?;
        match result.first_value("count") {
            Some(count) => count
                .as_u64()
                .ok_or_else(|| AppError::Query(format!("count is not an integer: {}", count))),
            None => Err(AppError::Query("count query returned no rows".to_string())),
        }
    }

    async fn run(&self, query: CypherQuery) -> AppResult<QueryResult> {
        debug!("Executing query: {}", query.text);
        self.executor.execute(&query.text, &query.parameters).await
    }
}
