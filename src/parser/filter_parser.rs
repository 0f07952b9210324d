use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::parser::direction::PatternDirection;
use crate::parser::entity_kind::{EntityKind, OperatorContext};
pub use crate::parser::expression::{Comparison, Expression, PatternFilter, PropertyFilter};
use crate::parser::filter_operator::{
    is_operator_key, is_pattern_key, lookup, Operator, OperatorDefinition, PATTERN_DIRECTION_KEY,
    PATTERN_EXISTS_KEY, PATTERN_NODE_KEY, PATTERN_RELATIONSHIP_KEY,
};

pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Validator behaviour switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorOptions {
    /// Reject unrecognized `$` keys instead of dropping them
    pub strict: bool,
    pub max_depth: usize,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        ValidatorOptions {
            strict: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Validate a raw filter mapping with the default (permissive) options
pub fn validate(raw: &Value, kind: EntityKind) -> AppResult<Expression> {
    ExpressionValidator::default().validate(raw, kind)
}

/// Turns an untyped filter mapping into an [`Expression`] tree.
///
/// Unrecognized operator keys are dropped (or rejected in strict mode).
/// Recognized operators with malformed values always fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpressionValidator {
    options: ValidatorOptions,
}

impl ExpressionValidator {
    pub fn new(options: ValidatorOptions) -> Self {
        ExpressionValidator { options }
    }

    pub fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    pub fn validate(&self, raw: &Value, kind: EntityKind) -> AppResult<Expression> {
        match raw {
            Value::Null => Ok(Expression::Empty),
            Value::Object(map) => self.validate_element(map, kind.into(), 0, true),
            other => Err(AppError::invalid_value(
                "filter",
                format!("expected a mapping, got {}", describe(other)),
            )),
        }
    }

    /// Validate a node or relationship mapping.
    ///
    /// `top_level` is true for the root of a node/relationship filter (including
    /// the `$node`/`$relationship` mappings of a pattern) and false inside
    /// logical operands.
    fn validate_element(
        &self,
        map: &Map<String, Value>,
        context: OperatorContext,
        depth: usize,
        top_level: bool,
    ) -> AppResult<Expression> {
        self.check_depth(depth)?;

        let mut parts = Vec::new();
        for (key, value) in map {
            if !is_operator_key(key) {
                if let Some(filter) = self.validate_property(key, value, depth + 1)? {
                    parts.push(Expression::Property(filter));
                }
                continue;
            }

            let definition = match lookup(key, context) {
                Some(definition) => definition,
                None => {
                    if is_pattern_key(key) {
                        return Err(AppError::unsupported(key, context));
                    }
                    self.drop_operator(key, context)?;
                    continue;
                }
            };
            if is_unset(key, value) {
                continue;
            }

            let expression =
                self.validate_element_operator(definition, value, context, depth, top_level)?;
            if !expression.is_empty() {
                parts.push(expression);
            }
        }

        Ok(Expression::conjunction(parts))
    }

    fn validate_element_operator(
        &self,
        definition: &OperatorDefinition,
        value: &Value,
        context: OperatorContext,
        depth: usize,
        top_level: bool,
    ) -> AppResult<Expression> {
        let key = definition.key;
        check_shape(definition, value)?;
        match definition.operator {
            Operator::And | Operator::Or | Operator::Xor => {
                let operands = expect_operand_list(key, value)?
                    .iter()
                    .map(|operand| {
                        let map = expect_mapping(key, operand)?;
                        self.validate_element(map, context, depth + 1, false)
                    })
                    .collect::<AppResult<Vec<_>>>()?;
                Ok(Expression::Logical {
                    operator: definition.operator,
                    operands,
                })
            }
            Operator::Not => {
                let map = expect_mapping(key, value)?;
                let inner = self.validate_element(map, context, depth + 1, false)?;
                if inner.is_empty() {
                    debug!("Dropping {} with no recognized operators", key);
                    return Ok(Expression::Empty);
                }
                Ok(Expression::Not(Box::new(inner)))
            }
            Operator::ElementId => match value {
                Value::String(_) => Ok(comparison(definition.operator, value.clone())),
                other => Err(expected(key, "a string", other)),
            },
            Operator::Id => match value.as_i64() {
                Some(id) => Ok(comparison(definition.operator, Value::from(id))),
                None => Err(expected(key, "an integer", value)),
            },
            Operator::Labels | Operator::Type => {
                let names = expect_string_or_list(key, value)?;
                Ok(comparison(definition.operator, names))
            }
            Operator::Hops => {
                if !top_level {
                    return Err(AppError::unsupported(key, "nested relationship"));
                }
                match value.as_u64() {
                    Some(hops) if hops >= 1 && hops <= u32::MAX as u64 => {
                        Ok(Expression::Hops(hops as u32))
                    }
                    _ => Err(expected(key, "a positive integer", value)),
                }
            }
            Operator::Pattern => {
                let entries = match value {
                    Value::Array(entries) if !entries.is_empty() => entries,
                    Value::Array(_) => {
                        return Err(AppError::invalid_value(key, "pattern list must not be empty"))
                    }
                    other => return Err(expected(key, "a list of patterns", other)),
                };
                let patterns = entries
                    .iter()
                    .map(|entry| {
                        let map = expect_mapping(key, entry)?;
                        self.validate_pattern(map, depth + 1).map(Expression::Pattern)
                    })
                    .collect::<AppResult<Vec<_>>>()?;
                Ok(Expression::conjunction(patterns))
            }
            other => Err(AppError::unsupported(other.key(), context)),
        }
    }

    fn validate_pattern(&self, map: &Map<String, Value>, depth: usize) -> AppResult<PatternFilter> {
        self.check_depth(depth)?;

        let mut pattern = PatternFilter {
            direction: PatternDirection::Both,
            exists: true,
            node: None,
            relationship: None,
        };

        for (key, value) in map {
            match key.as_str() {
                PATTERN_NODE_KEY => {
                    let node = expect_mapping(key, value)?;
                    let expression =
                        self.validate_element(node, OperatorContext::Node, depth + 1, true)?;
                    pattern.node = non_empty(expression);
                }
                PATTERN_RELATIONSHIP_KEY => {
                    let relationship = expect_mapping(key, value)?;
                    let expression = self.validate_element(
                        relationship,
                        OperatorContext::Relationship,
                        depth + 1,
                        true,
                    )?;
                    pattern.relationship = non_empty(expression);
                }
                PATTERN_DIRECTION_KEY => {
                    pattern.direction = value
                        .as_str()
                        .map(PatternDirection::from_str)
                        .unwrap_or_default();
                }
                PATTERN_EXISTS_KEY => match value {
                    Value::Bool(exists) => pattern.exists = *exists,
                    other => return Err(expected(key, "a boolean", other)),
                },
                _ => self.drop_operator(key, "pattern")?,
            }
        }

        Ok(pattern)
    }

    /// Validate the operator mapping under a plain property key
    fn validate_property(
        &self,
        name: &str,
        value: &Value,
        depth: usize,
    ) -> AppResult<Option<PropertyFilter>> {
        if name.is_empty() {
            return Err(AppError::invalid_value(name, "property name must not be empty"));
        }
        let map = match value {
            Value::Object(map) => map,
            other => {
                return Err(AppError::invalid_value(
                    name,
                    format!(
                        "property filter must be a mapping of operators, got {}",
                        describe(other)
                    ),
                ))
            }
        };

        let comparisons = self.validate_property_mapping(map, depth)?;
        if comparisons.is_empty() {
            debug!("Dropping property filter {} with no recognized operators", name);
            return Ok(None);
        }

        Ok(Some(PropertyFilter {
            name: name.to_string(),
            comparisons,
        }))
    }

    fn validate_property_mapping(
        &self,
        map: &Map<String, Value>,
        depth: usize,
    ) -> AppResult<Vec<Expression>> {
        self.check_depth(depth)?;

        let mut comparisons = Vec::new();
        for (key, value) in map {
            match lookup(key, OperatorContext::Property) {
                Some(_) if is_unset(key, value) => {}
                Some(definition) => {
                    if let Some(expression) =
                        self.validate_property_operator(definition, value, depth)?
                    {
                        comparisons.push(expression);
                    }
                }
                None => self.drop_operator(key, OperatorContext::Property)?,
            }
        }

        Ok(comparisons)
    }

    fn validate_property_operator(
        &self,
        definition: &OperatorDefinition,
        value: &Value,
        depth: usize,
    ) -> AppResult<Option<Expression>> {
        let key = definition.key;
        check_shape(definition, value)?;
        let expression = match definition.operator {
            Operator::And | Operator::Or | Operator::Xor => {
                let operands = expect_operand_list(key, value)?
                    .iter()
                    .map(|operand| {
                        let map = expect_mapping(key, operand)?;
                        self.validate_property_mapping(map, depth + 1)
                            .map(Expression::conjunction)
                    })
                    .collect::<AppResult<Vec<_>>>()?;
                Expression::Logical {
                    operator: definition.operator,
                    operands,
                }
            }
            Operator::Not => {
                let map = expect_mapping(key, value)?;
                let inner = self.validate_property_mapping(map, depth + 1)?;
                if inner.is_empty() {
                    debug!("Dropping {} with no recognized operators", key);
                    return Ok(None);
                }
                Expression::Not(Box::new(Expression::conjunction(inner)))
            }
            Operator::Size => {
                let map = expect_mapping(key, value)?;
                let comparisons = self.validate_comparison_mapping(map, depth + 1)?;
                if comparisons.is_empty() {
                    return Ok(None);
                }
                Expression::Size(comparisons)
            }
            Operator::All => {
                let items = match value {
                    Value::Array(items) if !items.is_empty() => items,
                    Value::Array(_) => {
                        return Err(AppError::invalid_value(key, "list must not be empty"))
                    }
                    other => return Err(expected(key, "a list of comparison mappings", other)),
                };
                let mut groups = Vec::with_capacity(items.len());
                for item in items {
                    let map = expect_mapping(key, item)?;
                    let group = self.validate_comparison_mapping(map, depth + 1)?;
                    if !group.is_empty() {
                        groups.push(group);
                    }
                }
                if groups.is_empty() {
                    return Ok(None);
                }
                Expression::All(groups)
            }
            operator => Expression::Comparison(check_comparison_value(operator, key, value)?),
        };

        Ok(Some(expression))
    }

    /// Restricted sub-grammar used by `$size` and `$all`
    fn validate_comparison_mapping(
        &self,
        map: &Map<String, Value>,
        depth: usize,
    ) -> AppResult<Vec<Comparison>> {
        self.check_depth(depth)?;

        let mut comparisons = Vec::new();
        for (key, value) in map {
            match lookup(key, OperatorContext::Comparison) {
                Some(_) if is_unset(key, value) => {}
                Some(definition) => {
                    check_shape(definition, value)?;
                    comparisons.push(check_comparison_value(definition.operator, key, value)?)
                }
                None => self.drop_operator(key, OperatorContext::Comparison)?,
            }
        }
        Ok(comparisons)
    }

    fn drop_operator(&self, key: &str, context: impl std::fmt::Display) -> AppResult<()> {
        if self.options.strict {
            warn!("Rejecting unrecognized operator {} in {} context", key, context);
            return Err(AppError::unsupported(key, context));
        }
        debug!("Dropping unrecognized operator {} in {} context", key, context);
        Ok(())
    }

    fn check_depth(&self, depth: usize) -> AppResult<()> {
        if depth > self.options.max_depth {
            return Err(AppError::ExpressionTooDeep(self.options.max_depth));
        }
        Ok(())
    }
}

/// A `null` operand leaves the operator unset, so it is skipped like an absent key
fn is_unset(key: &str, value: &Value) -> bool {
    if value.is_null() {
        debug!("Ignoring {} with a null operand", key);
        return true;
    }
    false
}

/// Reject values whose JSON kind can never fit the operator
fn check_shape(definition: &OperatorDefinition, value: &Value) -> AppResult<()> {
    if definition.shape.accepts(value) {
        Ok(())
    } else {
        Err(expected(definition.key, definition.shape.describe(), value))
    }
}

/// Check the value of a leaf comparison operator once its shape is known to fit
fn check_comparison_value(operator: Operator, key: &str, value: &Value) -> AppResult<Comparison> {
    match operator {
        Operator::Eq | Operator::Ne => Ok(Comparison::new(operator, value.clone())),
        Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte => match value {
            Value::Number(_) => Ok(Comparison::new(operator, value.clone())),
            other => Err(expected(key, "a number", other)),
        },
        Operator::Contains | Operator::StartsWith | Operator::EndsWith | Operator::Regex => {
            match value {
                Value::String(_) => Ok(Comparison::new(operator, value.clone())),
                other => Err(expected(key, "a string", other)),
            }
        }
        Operator::In => {
            let items = match value {
                Value::Array(items) => items.clone(),
                scalar => vec![scalar.clone()],
            };
            if items.iter().any(|item| item.is_array() || item.is_object()) {
                return Err(AppError::invalid_value(key, "list items must be scalars"));
            }
            Ok(Comparison::new(operator, Value::Array(items)))
        }
        Operator::Exists => match value {
            Value::Bool(_) => Ok(Comparison::new(operator, value.clone())),
            other => Err(expected(key, "a boolean", other)),
        },
        other => Err(AppError::unsupported(other.key(), OperatorContext::Property)),
    }
}

fn comparison(operator: Operator, value: Value) -> Expression {
    Expression::Comparison(Comparison::new(operator, value))
}

fn non_empty(expression: Expression) -> Option<Box<Expression>> {
    if expression.is_empty() {
        None
    } else {
        Some(Box::new(expression))
    }
}

fn expect_mapping<'a>(key: &str, value: &'a Value) -> AppResult<&'a Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(expected(key, "a mapping", other)),
    }
}

fn expect_operand_list<'a>(key: &str, value: &'a Value) -> AppResult<&'a Vec<Value>> {
    match value {
        Value::Array(operands) if operands.is_empty() => {
            Err(AppError::EmptyLogicalOperand(key.to_string()))
        }
        Value::Array(operands) => Ok(operands),
        other => Err(expected(key, "a list of expressions", other)),
    }
}

/// Accept `"A"` or `["A", "B"]`, normalized to a list
fn expect_string_or_list(key: &str, value: &Value) -> AppResult<Value> {
    match value {
        Value::String(_) => Ok(Value::Array(vec![value.clone()])),
        Value::Array(items) if items.is_empty() => {
            Err(AppError::invalid_value(key, "list must not be empty"))
        }
        Value::Array(items) if items.iter().all(Value::is_string) => Ok(value.clone()),
        other => Err(expected(key, "a string or a list of strings", other)),
    }
}

fn expected(key: &str, what: &str, got: &Value) -> AppError {
    AppError::invalid_value(key, format!("expected {}, got {}", what, describe(got)))
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
