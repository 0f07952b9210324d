use crate::parser::direction::PatternDirection;
use crate::parser::filter_operator::Operator;
use serde_json::Value;

/// A single operator applied to the current subject, with its checked value
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub operator: Operator,
    pub value: Value,
}

impl Comparison {
    pub fn new(operator: Operator, value: Value) -> Self {
        Comparison { operator, value }
    }
}

/// Validated filter expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// No recognized keys survived validation
    Empty,
    Comparison(Comparison),
    /// `$and`, `$or` or `$xor` over the operands
    Logical {
        operator: Operator,
        operands: Vec<Expression>,
    },
    Not(Box<Expression>),
    Property(PropertyFilter),
    /// Comparisons applied to `size(property)`
    Size(Vec<Comparison>),
    /// Every list item must satisfy each group of comparisons
    All(Vec<Vec<Comparison>>),
    /// Variable-length bound of a relationship; only meaningful inside a pattern
    Hops(u32),
    Pattern(PatternFilter),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyFilter {
    pub name: String,
    pub comparisons: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatternFilter {
    pub direction: PatternDirection,
    /// `false` when the pattern must not exist
    pub exists: bool,
    pub node: Option<Box<Expression>>,
    pub relationship: Option<Box<Expression>>,
}

impl Expression {
    /// Implicit conjunction of the entries of one mapping
    pub fn conjunction(mut parts: Vec<Expression>) -> Expression {
        match parts.len() {
            0 => Expression::Empty,
            1 => parts.remove(0),
            _ => Expression::Logical {
                operator: Operator::And,
                operands: parts,
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Expression::Empty)
    }

    /// Split a top-level `$hops` bound off a relationship expression.
    ///
    /// `$hops` is only accepted at the top of a relationship mapping, so it is
    /// either the whole expression or a direct operand of its conjunction.
    pub fn take_hops(self) -> (Option<u32>, Expression) {
        match self {
            Expression::Hops(hops) => (Some(hops), Expression::Empty),
            Expression::Logical {
                operator: Operator::And,
                operands,
            } => {
                let mut hops = None;
                let mut rest = Vec::with_capacity(operands.len());
                for operand in operands {
                    match operand {
                        Expression::Hops(h) => hops = Some(h),
                        other => rest.push(other),
                    }
                }
                (hops, Expression::conjunction(rest))
            }
            other => (None, other),
        }
    }
}
