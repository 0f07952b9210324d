use super::filter_impl::CypherFilterConverter;
use super::pattern::{node_pattern, relationship_pattern};
use crate::backend::filter::{FilterConverter, LoweredFilter};
use crate::config::AppConfig;
use crate::error::AppResult;
use crate::logging::log_translation;
use crate::parser::direction::PatternDirection;
use crate::parser::entity_kind::EntityKind;
use crate::parser::filter_parser::{ExpressionValidator, ValidatorOptions};
use crate::parser::sort_parser::QueryOptions;
use crate::utils::quote_identifier;
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Instant;
use tracing::debug;

const SKIP_PARAMETER: &str = "skip";
const LIMIT_PARAMETER: &str = "limit";

/// A complete Cypher statement with its parameter values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CypherQuery {
    pub text: String,
    pub parameters: Map<String, Value>,
}

/// Validates raw filters and assembles MATCH statements around them
pub struct QueryBuilder {
    validator: ExpressionValidator,
    converter: CypherFilterConverter,
    entity_reference: String,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::from_config(&AppConfig::default_config())
    }
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &AppConfig) -> Self {
        QueryBuilder {
            validator: ExpressionValidator::new(config.validator_options()),
            converter: CypherFilterConverter::with_options(config.lowerer_options()),
            entity_reference: config.lowering.entity_reference.clone(),
        }
    }

    pub fn with_validator_options(mut self, options: ValidatorOptions) -> Self {
        self.validator = ExpressionValidator::new(options);
        self
    }

    pub fn entity_reference(&self) -> &str {
        &self.entity_reference
    }

    /// Validate and lower a raw filter against the configured entity reference
    pub fn filter(&self, raw: &Value, kind: EntityKind) -> AppResult<LoweredFilter> {
        self.filter_as(raw, kind, &self.entity_reference)
    }

    /// Validate and lower a raw filter against an explicit element variable
    pub fn filter_as(&self, raw: &Value, kind: EntityKind, entity_ref: &str) -> AppResult<LoweredFilter> {
        let start = Instant::now();
        let expression = self.validator.validate(raw, kind)?;
        let lowered = self.converter.to_where_clause(&expression, entity_ref);
        log_translation(kind, &lowered, start.elapsed());
        Ok(lowered)
    }

    /// `MATCH (e:Label) WHERE ... RETURN e` with optional ordering and paging
    pub fn match_nodes(
        &self,
        labels: &[&str],
        raw: &Value,
        options: &QueryOptions,
    ) -> AppResult<CypherQuery> {
        let filter = self.filter(raw, EntityKind::Node)?;
        let pattern = node_pattern(&self.entity_reference, labels, false);
        Ok(self.assemble(&pattern, filter, options))
    }

    /// `MATCH ()-[e:TYPE]->() WHERE ... RETURN e` with optional ordering and paging
    pub fn match_relationships(
        &self,
        relationship_type: Option<&str>,
        raw: &Value,
        options: &QueryOptions,
    ) -> AppResult<CypherQuery> {
        let filter = self.filter(raw, EntityKind::Relationship)?;
        let pattern = relationship_pattern(
            &self.entity_reference,
            relationship_type,
            None,
            None,
            PatternDirection::Outgoing,
        );
        Ok(self.assemble(&pattern, filter, options))
    }

    /// `MATCH (e:Label) WHERE ... RETURN count(e) AS count`
    pub fn count_nodes(&self, labels: &[&str], raw: &Value) -> AppResult<CypherQuery> {
        let filter = self.filter(raw, EntityKind::Node)?;
        let pattern = node_pattern(&self.entity_reference, labels, false);
        let reference = quote_identifier(&self.entity_reference);

        let mut text = format!("MATCH {}", pattern);
        push_clause(&mut text, &filter.where_clause());
        text.push_str(&format!(" RETURN count({}) AS count", reference));

        Ok(CypherQuery {
            text,
            parameters: filter.parameters,
        })
    }

    fn assemble(&self, pattern: &str, filter: LoweredFilter, options: &QueryOptions) -> CypherQuery {
        let reference = quote_identifier(&self.entity_reference);
        let where_clause = filter.where_clause();
        let mut parameters = filter.parameters;

        let mut text = format!("MATCH {}", pattern);
        push_clause(&mut text, &where_clause);
        text.push_str(&format!(" RETURN {}", reference));
        push_clause(&mut text, &self.options_clause(&reference, options, &mut parameters));

        debug!("Assembled query: {}", text);
        CypherQuery { text, parameters }
    }

    /// `ORDER BY ... SKIP $skip LIMIT $limit`; empty when no option is set
    fn options_clause(
        &self,
        reference: &str,
        options: &QueryOptions,
        parameters: &mut Map<String, Value>,
    ) -> String {
        let mut clauses = Vec::new();

        if !options.sort.is_empty() {
            let keys: Vec<String> = options
                .sort
                .iter()
                .map(|property| {
                    let path = self.converter.property_path(reference, property);
                    match options.order {
                        Some(order) => format!("{} {}", path, order.as_cypher()),
                        None => path,
                    }
                })
                .collect();
            clauses.push(format!("ORDER BY {}", keys.join(", ")));
        }

        if let Some(skip) = options.skip {
            parameters.insert(SKIP_PARAMETER.to_string(), Value::from(skip));
            clauses.push(format!("SKIP {}", self.converter.param_placeholder(SKIP_PARAMETER)));
        }

        if let Some(limit) = options.limit {
            parameters.insert(LIMIT_PARAMETER.to_string(), Value::from(limit));
            clauses.push(format!("LIMIT {}", self.converter.param_placeholder(LIMIT_PARAMETER)));
        }

        clauses.join(" ")
    }
}

fn push_clause(text: &mut String, clause: &str) {
    if !clause.is_empty() {
        text.push(' ');
        text.push_str(clause);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::parser::sort_parser::QueryOrder;
    use serde_json::json;

    #[test]
    fn test_filter() {
        let builder = QueryBuilder::new();
        let filter = builder
            .filter(&json!({"name": {"$eq": "Alice"}}), EntityKind::Node)
            .unwrap();
        assert_eq!(filter.fragment, "e.name = $param_0");
        assert_eq!(filter.parameters["param_0"], json!("Alice"));

        let filter = builder
            .filter_as(&json!({"name": {"$eq": "Alice"}}), EntityKind::Node, "n")
            .unwrap();
        assert_eq!(filter.fragment, "n.name = $param_0");
    }

    #[test]
    fn test_match_nodes() {
        let builder = QueryBuilder::new();
        let query = builder
            .match_nodes(
                &["Person"],
                &json!({"age": {"$gte": 21}}),
                &QueryOptions::new()
                    .with_sort("name", QueryOrder::Asc)
                    .with_skip(20)
                    .with_limit(10),
            )
            .unwrap();

        assert_eq!(
            query.text,
            "MATCH (e:Person) WHERE e.age >= $param_0 RETURN e ORDER BY e.name ASC SKIP $skip LIMIT $limit"
        );
        assert_eq!(query.parameters["param_0"], json!(21));
        assert_eq!(query.parameters["skip"], json!(20));
        assert_eq!(query.parameters["limit"], json!(10));
    }

    #[test]
    fn test_match_nodes_without_filter() {
        let builder = QueryBuilder::new();
        let query = builder
            .match_nodes(&[], &json!({}), &QueryOptions::default())
            .unwrap();
        assert_eq!(query.text, "MATCH (e) RETURN e");
        assert!(query.parameters.is_empty());
    }

    #[test]
    fn test_match_relationships() {
        let builder = QueryBuilder::new();
        let query = builder
            .match_relationships(
                Some("KNOWS"),
                &json!({"$type": "KNOWS", "since": {"$lt": 2020}}),
                &QueryOptions::new().with_limit(5),
            )
            .unwrap();

        assert_eq!(
            query.text,
            "MATCH ()-[e:KNOWS]->() WHERE (type(e) IN $param_0 AND e.since < $param_1) RETURN e LIMIT $limit"
        );
        assert_eq!(query.parameters["param_0"], json!(["KNOWS"]));
        assert_eq!(query.parameters["limit"], json!(5));
    }

    #[test]
    fn test_match_relationships_ignores_standalone_hops() {
        let builder = QueryBuilder::new();
        let query = builder
            .match_relationships(
                Some("KNOWS"),
                &json!({"$hops": 3, "since": {"$lt": 2020}}),
                &QueryOptions::default(),
            )
            .unwrap();
        assert_eq!(
            query.text,
            "MATCH ()-[e:KNOWS]->() WHERE e.since < $param_0 RETURN e"
        );
        assert_eq!(query.parameters["param_0"], json!(2020));

        let query = builder
            .match_relationships(None, &json!({"$hops": 2}), &QueryOptions::default())
            .unwrap();
        assert_eq!(query.text, "MATCH ()-[e]->() RETURN e");
    }

    #[test]
    fn test_count_nodes() {
        let builder = QueryBuilder::new();
        let query = builder
            .count_nodes(&["Person"], &json!({"active": {"$eq": true}}))
            .unwrap();
        assert_eq!(
            query.text,
            "MATCH (e:Person) WHERE e.active = $param_0 RETURN count(e) AS count"
        );
    }

    #[test]
    fn test_sort_without_order_and_quoted_keys() {
        let builder = QueryBuilder::new();
        let mut options = QueryOptions::new();
        options.sort = vec!["last name".to_string(), "age".to_string()];
        let query = builder.match_nodes(&[], &Value::Null, &options).unwrap();
        assert_eq!(query.text, "MATCH (e) RETURN e ORDER BY e.`last name`, e.age");
    }

    #[test]
    fn test_configured_builder() {
        let config = AppConfig::from_yaml_str(
            "validation:\n  strict: true\nlowering:\n  entity_reference: n\n  parameter_prefix: p\n",
        )
        .unwrap();
        let builder = QueryBuilder::from_config(&config);
        assert_eq!(builder.entity_reference(), "n");

        let query = builder
            .match_nodes(&["User"], &json!({"name": {"$eq": "x"}}), &QueryOptions::default())
            .unwrap();
        assert_eq!(query.text, "MATCH (n:User) WHERE n.name = $p_0 RETURN n");

        let err = builder
            .filter(&json!({"$unknown": 1}), EntityKind::Node)
            .unwrap_err();
        assert!(matches!(err, AppError::UnsupportedOperatorForContext { .. }));
    }

    #[test]
    fn test_validation_errors_propagate() {
        let builder = QueryBuilder::new();
        let err = builder
            .match_nodes(&[], &json!({"$and": []}), &QueryOptions::default())
            .unwrap_err();
        assert!(matches!(err, AppError::EmptyLogicalOperand(_)));
    }
}
