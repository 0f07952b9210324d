use crate::error::{AppError, AppResult};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOrder {
    Asc,
    Desc,
}

impl QueryOrder {
    pub fn from_str(s: &str) -> Option<QueryOrder> {
        match s.to_uppercase().as_str() {
            "ASC" | "ASCENDING" => Some(QueryOrder::Asc),
            "DESC" | "DESCENDING" => Some(QueryOrder::Desc),
            _ => None,
        }
    }

    pub fn as_cypher(&self) -> &'static str {
        match self {
            QueryOrder::Asc => "ASC",
            QueryOrder::Desc => "DESC",
        }
    }
}

/// Pagination and ordering for a match query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    pub limit: Option<u64>,
    pub skip: Option<u64>,
    pub sort: Vec<String>,
    pub order: Option<QueryOrder>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn with_sort(mut self, property: &str, order: QueryOrder) -> Self {
        self.sort.push(property.to_string());
        self.order = Some(order);
        self
    }

    /// Parse `{limit, skip, sort, order}` from untyped input.
    ///
    /// `limit` must be at least 1, `skip` at least 0, `sort` a property name or
    /// a list of them, and `order` one of `ASC`/`DESC`. Unknown keys are ignored.
    pub fn from_value(value: &Value) -> AppResult<QueryOptions> {
        let map = match value {
            Value::Null => return Ok(QueryOptions::default()),
            Value::Object(map) => map,
            _ => {
                return Err(AppError::InvalidQueryOptions(
                    "query options must be a mapping".to_string(),
                ))
            }
        };

        let mut options = QueryOptions::default();

        if let Some(limit) = map.get("limit").filter(|v| !v.is_null()) {
            match limit.as_u64() {
                Some(limit) if limit >= 1 => options.limit = Some(limit),
                _ => {
                    return Err(AppError::InvalidQueryOptions(format!(
                        "limit must be an integer >= 1, got {}",
                        limit
                    )))
                }
            }
        }

        if let Some(skip) = map.get("skip").filter(|v| !v.is_null()) {
            match skip.as_u64() {
                Some(skip) => options.skip = Some(skip),
                None => {
                    return Err(AppError::InvalidQueryOptions(format!(
                        "skip must be an integer >= 0, got {}",
                        skip
                    )))
                }
            }
        }

        match map.get("sort") {
            None | Some(Value::Null) => {}
            Some(Value::String(property)) => options.sort.push(property.clone()),
            Some(Value::Array(properties)) => {
                for property in properties {
                    match property.as_str() {
                        Some(name) => options.sort.push(name.to_string()),
                        None => {
                            return Err(AppError::InvalidQueryOptions(format!(
                                "sort keys must be strings, got {}",
                                property
                            )))
                        }
                    }
                }
            }
            Some(other) => {
                return Err(AppError::InvalidQueryOptions(format!(
                    "sort must be a string or a list of strings, got {}",
                    other
                )))
            }
        }

        if let Some(order) = map.get("order").filter(|v| !v.is_null()) {
            options.order = match order.as_str().and_then(QueryOrder::from_str) {
                Some(order) => Some(order),
                None => {
                    return Err(AppError::InvalidQueryOptions(format!(
                        "order must be ASC or DESC, got {}",
                        order
                    )))
                }
            };
        }

        if options.sort.iter().any(|property| property.is_empty()) {
            return Err(AppError::InvalidQueryOptions(
                "sort keys must not be empty".to_string(),
            ));
        }

        Ok(options)
    }

    pub fn is_empty(&self) -> bool {
        self.limit.is_none() && self.skip.is_none() && self.sort.is_empty()
    }
}
