use super::super::filter::{FilterConverter, LoweredFilter};
use crate::parser::expression::{Comparison, Expression, PatternFilter, PropertyFilter};
use crate::parser::filter_operator::Operator;
use crate::utils::{property_path, quote_identifier};
use serde_json::{Map, Value};
use tracing::warn;

pub const DEFAULT_PARAMETER_PREFIX: &str = "param";

/// Prefixes of the internal variables introduced by patterns and list predicates
const NODE_REFERENCE: &str = "_n";
const RELATIONSHIP_REFERENCE: &str = "_r";
const ITEM_REFERENCE: &str = "_i";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LowererOptions {
    pub parameter_prefix: String,
}

impl Default for LowererOptions {
    fn default() -> Self {
        LowererOptions {
            parameter_prefix: DEFAULT_PARAMETER_PREFIX.to_string(),
        }
    }
}

/// Cypher lowering for validated filter expressions
///
/// Every value is bound as a named parameter (`$param_0`, `$param_1`, ...)
/// in traversal order; only operator keywords, quoted identifiers and the
/// `$hops` bound are written into the text.
#[derive(Debug, Clone, Default)]
pub struct CypherFilterConverter {
    options: LowererOptions,
}

impl CypherFilterConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: LowererOptions) -> Self {
        Self { options }
    }

    /// Lower an expression; a fresh parameter counter is used for every call
    ///
    /// A top-level `$hops` bound only has meaning inside `$pattern`; here it is
    /// removed with a warning and the remaining predicates are lowered.
    pub fn lower(&self, expression: &Expression, entity_ref: &str) -> LoweredFilter {
        let (hops, expression) = expression.clone().take_hops();
        if let Some(hops) = hops {
            warn!("Ignoring $hops bound {} outside of a pattern", hops);
        }

        let reference = quote_identifier(entity_ref);
        let mut state = LoweringState::new(&self.options.parameter_prefix, &reference);
        let fragment = self.lower_expression(&expression, &Scope::element(&reference), &mut state);
        LoweredFilter {
            fragment,
            parameters: state.parameters,
        }
    }
}

impl FilterConverter for CypherFilterConverter {
    fn to_where_clause(&self, expression: &Expression, entity_ref: &str) -> LoweredFilter {
        self.lower(expression, entity_ref)
    }

    fn property_path(&self, reference: &str, property: &str) -> String {
        property_path(reference, property)
    }
}

/// Per-call counters and bound values
struct LoweringState<'a> {
    prefix: &'a str,
    /// The caller's element variable; never handed out as an internal reference
    reserved: &'a str,
    parameters: Map<String, Value>,
    next_parameter: usize,
    next_reference: usize,
}

impl<'a> LoweringState<'a> {
    fn new(prefix: &'a str, reserved: &'a str) -> Self {
        LoweringState {
            prefix,
            reserved,
            parameters: Map::new(),
            next_parameter: 0,
            next_reference: 0,
        }
    }

    /// Bind a value and return its placeholder
    fn bind(&mut self, value: Value) -> String {
        let name = format!("{}_{}", self.prefix, self.next_parameter);
        self.next_parameter += 1;
        self.parameters.insert(name.clone(), value);
        format!("${}", name)
    }

    fn fresh_reference(&mut self, prefix: &str) -> String {
        loop {
            let reference = format!("{}{}", prefix, self.next_reference);
            self.next_reference += 1;
            if reference != self.reserved {
                return reference;
            }
        }
    }
}

/// What the operators at the current position apply to
struct Scope<'a> {
    /// The element variable (`e`, `_n0`, ...)
    reference: &'a str,
    /// The property expression for property-level operators (`e.age`, `size(e.tags)`)
    subject: Option<String>,
}

impl<'a> Scope<'a> {
    fn element(reference: &'a str) -> Self {
        Scope {
            reference,
            subject: None,
        }
    }

    fn with_subject(&self, subject: String) -> Scope<'a> {
        Scope {
            reference: self.reference,
            subject: Some(subject),
        }
    }

    fn subject(&self) -> &str {
        self.subject.as_deref().unwrap_or(self.reference)
    }
}

impl CypherFilterConverter {
    fn lower_expression(
        &self,
        expression: &Expression,
        scope: &Scope,
        state: &mut LoweringState,
    ) -> String {
        match expression {
            Expression::Empty => "TRUE".to_string(),
            Expression::Comparison(comparison) => self.lower_comparison(comparison, scope, state),
            Expression::Logical { operator, operands } => {
                let keyword = format!(" {} ", operator.definition().template);
                let parts: Vec<String> = operands
                    .iter()
                    .map(|operand| self.lower_expression(operand, scope, state))
                    .collect();
                format!("({})", parts.join(&keyword))
            }
            Expression::Not(inner) => {
                let inner_cypher = self.lower_expression(inner, scope, state);
                Operator::Not.definition().render("", &inner_cypher, scope.reference)
            }
            Expression::Property(filter) => self.lower_property(filter, scope, state),
            Expression::Size(comparisons) => {
                let subject = Operator::Size
                    .definition()
                    .render(scope.subject(), "", scope.reference);
                let size_scope = scope.with_subject(subject);
                let parts: Vec<String> = comparisons
                    .iter()
                    .map(|comparison| self.lower_comparison(comparison, &size_scope, state))
                    .collect();
                conjoin(parts)
            }
            Expression::All(groups) => {
                let item = state.fresh_reference(ITEM_REFERENCE);
                let item_scope = Scope::element(&item).with_subject(item.clone());
                let conditions: Vec<String> = groups
                    .iter()
                    .flatten()
                    .map(|comparison| self.lower_comparison(comparison, &item_scope, state))
                    .collect();
                Operator::All
                    .definition()
                    .render(scope.subject(), &conditions.join(" AND "), &item)
            }
            Expression::Hops(hops) => {
                warn!("Ignoring $hops bound {} outside of a pattern", hops);
                "TRUE".to_string()
            }
            Expression::Pattern(pattern) => self.lower_pattern(pattern, scope, state),
        }
    }

    fn lower_property(
        &self,
        filter: &PropertyFilter,
        scope: &Scope,
        state: &mut LoweringState,
    ) -> String {
        let property_scope = scope.with_subject(self.property_path(scope.reference, &filter.name));
        let parts: Vec<String> = filter
            .comparisons
            .iter()
            .map(|comparison| self.lower_expression(comparison, &property_scope, state))
            .collect();
        conjoin(parts)
    }

    fn lower_comparison(
        &self,
        comparison: &Comparison,
        scope: &Scope,
        state: &mut LoweringState,
    ) -> String {
        let definition = comparison.operator.definition();
        match comparison.operator {
            Operator::Exists => {
                if comparison.value.as_bool().unwrap_or(true) {
                    definition.render(scope.subject(), "", scope.reference)
                } else {
                    format!("{} IS NULL", scope.subject())
                }
            }
            Operator::Labels => {
                let placeholder = state.bind(comparison.value.clone());
                let item = state.fresh_reference(ITEM_REFERENCE);
                definition.render(&item, &placeholder, scope.reference)
            }
            _ => {
                let placeholder = state.bind(comparison.value.clone());
                definition.render(scope.subject(), &placeholder, scope.reference)
            }
        }
    }

    /// `EXISTS { MATCH (e)-[_r0]->(_n1) WHERE ... }`
    fn lower_pattern(
        &self,
        pattern: &PatternFilter,
        scope: &Scope,
        state: &mut LoweringState,
    ) -> String {
        let (hops, relationship) = match &pattern.relationship {
            Some(relationship) => {
                let (hops, rest) = (**relationship).clone().take_hops();
                (hops, Some(rest).filter(|r| !r.is_empty()))
            }
            None => (None, None),
        };

        let relationship_ref = relationship
            .as_ref()
            .map(|_| state.fresh_reference(RELATIONSHIP_REFERENCE));
        let node_ref = pattern
            .node
            .as_ref()
            .map(|_| state.fresh_reference(NODE_REFERENCE));

        let (left, right) = pattern.direction.arrow_parts();
        let length = hops
            .map(|h| Operator::Hops.definition().render("", &h.to_string(), ""))
            .unwrap_or_default();
        let relationship_cypher = if relationship_ref.is_some() || !length.is_empty() {
            format!(
                "{}[{}{}]{}",
                left,
                relationship_ref.as_deref().unwrap_or(""),
                length,
                right
            )
        } else {
            format!("{}{}", left, right)
        };

        let mut clause = format!(
            "MATCH ({}){}({})",
            scope.reference,
            relationship_cypher,
            node_ref.as_deref().unwrap_or("")
        );

        let mut conditions = Vec::new();
        if let (Some(expression), Some(reference)) = (&relationship, &relationship_ref) {
            let condition = if hops.is_some() {
                // A variable-length relationship binds a list; every hop must match
                let item = state.fresh_reference(ITEM_REFERENCE);
                let inner = self.lower_expression(expression, &Scope::element(&item), state);
                Operator::All.definition().render(reference, &inner, &item)
            } else {
                self.lower_expression(expression, &Scope::element(reference), state)
            };
            conditions.push(condition);
        }
        if let (Some(expression), Some(reference)) = (&pattern.node, &node_ref) {
            conditions.push(self.lower_expression(expression, &Scope::element(reference), state));
        }
        if !conditions.is_empty() {
            clause.push_str(" WHERE ");
            clause.push_str(&conditions.join(" AND "));
        }

        let exists = Operator::Pattern.definition().render("", &clause, scope.reference);
        if pattern.exists {
            exists
        } else {
            format!("NOT {}", exists)
        }
    }
}

fn conjoin(mut parts: Vec<String>) -> String {
    match parts.len() {
        0 => "TRUE".to_string(),
        1 => parts.remove(0),
        _ => format!("({})", parts.join(" AND ")),
    }
}
