use std::fmt;
use std::str::FromStr;

/// The kind of graph element a filter is validated and lowered against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Node,
    Relationship,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Node => write!(f, "node"),
            EntityKind::Relationship => write!(f, "relationship"),
        }
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "node" | "n" => Ok(EntityKind::Node),
            "relationship" | "rel" | "r" => Ok(EntityKind::Relationship),
            other => Err(format!("Unknown entity kind: {}", other)),
        }
    }
}

/// Operator lookup context.
///
/// `Node` and `Relationship` are element-level mappings. `Property` is the
/// mapping under a plain property key. `Comparison` is the restricted
/// sub-grammar accepted by `$size` and `$all`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorContext {
    Node,
    Relationship,
    Property,
    Comparison,
}

impl From<EntityKind> for OperatorContext {
    fn from(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Node => OperatorContext::Node,
            EntityKind::Relationship => OperatorContext::Relationship,
        }
    }
}

impl fmt::Display for OperatorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatorContext::Node => write!(f, "node"),
            OperatorContext::Relationship => write!(f, "relationship"),
            OperatorContext::Property => write!(f, "property"),
            OperatorContext::Comparison => write!(f, "comparison"),
        }
    }
}
