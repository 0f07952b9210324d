use crate::parser::expression::Expression;
use serde::Serialize;
use serde_json::{Map, Value};

/// Output of lowering one filter expression
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoweredFilter {
    /// Cypher boolean expression, ready to splice after `WHERE`
    pub fragment: String,
    /// Values for every `$name` placeholder used in `fragment`
    pub parameters: Map<String, Value>,
}

impl LoweredFilter {
    /// True when the filter constrains nothing
    pub fn is_tautology(&self) -> bool {
        self.fragment == "TRUE"
    }

    /// `WHERE <fragment>`, or an empty string for a tautology
    pub fn where_clause(&self) -> String {
        if self.is_tautology() {
            String::new()
        } else {
            format!("WHERE {}", self.fragment)
        }
    }
}

/// Trait for lowering validated filter expressions to query text
///
/// Lowering cannot fail: every [`Expression`] produced by the validator is
/// a valid input.
pub trait FilterConverter: Send + Sync {
    /// Lower an expression against the element bound to `entity_ref`
    ///
    /// Returns the boolean fragment together with its parameter values.
    fn to_where_clause(&self, expression: &Expression, entity_ref: &str) -> LoweredFilter;

    /// Get the placeholder text for a named parameter
    ///
    /// Cypher uses `$name`.
    fn param_placeholder(&self, name: &str) -> String {
        format!("${}", name)
    }

    /// Get the expression addressing a property of an element
    fn property_path(&self, reference: &str, property: &str) -> String;
}
