use crate::parser::entity_kind::OperatorContext;
use lazy_static::lazy_static;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Every operator key starts with this prefix; anything else is a property name
pub const OPERATOR_PREFIX: char = '$';

/// Keys that only have meaning inside a `$pattern` entry
pub const PATTERN_NODE_KEY: &str = "$node";
pub const PATTERN_RELATIONSHIP_KEY: &str = "$relationship";
pub const PATTERN_DIRECTION_KEY: &str = "$direction";
pub const PATTERN_EXISTS_KEY: &str = "$exists";

const PROPERTY_PLACEHOLDER: &str = "{property_name}";
const VALUE_PLACEHOLDER: &str = "{value}";
const REF_PLACEHOLDER: &str = "{ref}";

/// Closed set of filter operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    // Comparison operators
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,

    // String operators
    Contains,
    StartsWith,
    EndsWith,
    Regex,

    // Membership
    In,

    // Logical operators
    And,
    Or,
    Xor,
    Not,
    All,

    // Element operators
    ElementId,
    Id,

    // Structural operators
    Labels,
    Type,
    Hops,
    Exists,
    Size,
    Pattern,
}

/// Shape of the value an operator accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    Scalar,
    List,
    NestedExpression,
    NestedPattern,
}

impl ValueShape {
    /// Coarse JSON kind check; operator-specific rules are applied afterwards
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            ValueShape::Scalar => !value.is_array() && !value.is_object(),
            // A lone scalar is wrapped into a one-element list
            ValueShape::List => !value.is_object() && !value.is_null(),
            ValueShape::NestedExpression => value.is_object() || value.is_array(),
            ValueShape::NestedPattern => value.is_array(),
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            ValueShape::Scalar => "a scalar value",
            ValueShape::List => "a list or a single scalar",
            ValueShape::NestedExpression => "a mapping or a list of mappings",
            ValueShape::NestedPattern => "a list of patterns",
        }
    }
}

/// Static description of one operator.
///
/// Templates use `{property_name}`, `{value}` and `{ref}` placeholders. For
/// logical operators the template is the joining keyword. `$labels` has no
/// property, so its `{property_name}` slot carries the list item variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorDefinition {
    pub operator: Operator,
    pub key: &'static str,
    pub shape: ValueShape,
    pub template: &'static str,
}

impl OperatorDefinition {
    /// Substitute the placeholders in a single pass, so placeholder-like text
    /// inside the substituted values is left alone.
    pub fn render(&self, property_name: &str, value: &str, reference: &str) -> String {
        let mut rendered = String::with_capacity(self.template.len() + value.len());
        let mut rest = self.template;
        while let Some(start) = rest.find('{') {
            rendered.push_str(&rest[..start]);
            let tail = &rest[start..];
            let (replacement, consumed) = if tail.starts_with(PROPERTY_PLACEHOLDER) {
                (property_name, PROPERTY_PLACEHOLDER.len())
            } else if tail.starts_with(VALUE_PLACEHOLDER) {
                (value, VALUE_PLACEHOLDER.len())
            } else if tail.starts_with(REF_PLACEHOLDER) {
                (reference, REF_PLACEHOLDER.len())
            } else {
                ("{", 1)
            };
            rendered.push_str(replacement);
            rest = &tail[consumed..];
        }
        rendered.push_str(rest);
        rendered
    }
}

#[rustfmt::skip]
const DEFINITIONS: &[OperatorDefinition] = &[
    OperatorDefinition { operator: Operator::Eq, key: "$eq", shape: ValueShape::Scalar, template: "{property_name} = {value}" },
    OperatorDefinition { operator: Operator::Ne, key: "$ne", shape: ValueShape::Scalar, template: "NOT({property_name} = {value})" },
    OperatorDefinition { operator: Operator::Gt, key: "$gt", shape: ValueShape::Scalar, template: "{property_name} > {value}" },
    OperatorDefinition { operator: Operator::Gte, key: "$gte", shape: ValueShape::Scalar, template: "{property_name} >= {value}" },
    OperatorDefinition { operator: Operator::Lt, key: "$lt", shape: ValueShape::Scalar, template: "{property_name} < {value}" },
    OperatorDefinition { operator: Operator::Lte, key: "$lte", shape: ValueShape::Scalar, template: "{property_name} <= {value}" },
    OperatorDefinition { operator: Operator::Contains, key: "$contains", shape: ValueShape::Scalar, template: "{property_name} CONTAINS {value}" },
    OperatorDefinition { operator: Operator::StartsWith, key: "$startsWith", shape: ValueShape::Scalar, template: "{property_name} STARTS WITH {value}" },
    OperatorDefinition { operator: Operator::EndsWith, key: "$endsWith", shape: ValueShape::Scalar, template: "{property_name} ENDS WITH {value}" },
    OperatorDefinition { operator: Operator::Regex, key: "$regex", shape: ValueShape::Scalar, template: "{property_name} =~ {value}" },
    OperatorDefinition { operator: Operator::In, key: "$in", shape: ValueShape::List, template: "{property_name} IN {value}" },
    OperatorDefinition { operator: Operator::And, key: "$and", shape: ValueShape::NestedExpression, template: "AND" },
    OperatorDefinition { operator: Operator::Or, key: "$or", shape: ValueShape::NestedExpression, template: "OR" },
    OperatorDefinition { operator: Operator::Xor, key: "$xor", shape: ValueShape::NestedExpression, template: "XOR" },
    OperatorDefinition { operator: Operator::Not, key: "$not", shape: ValueShape::NestedExpression, template: "NOT({value})" },
    OperatorDefinition { operator: Operator::All, key: "$all", shape: ValueShape::NestedExpression, template: "ALL({ref} IN {property_name} WHERE {value})" },
    OperatorDefinition { operator: Operator::ElementId, key: "$elementId", shape: ValueShape::Scalar, template: "elementId({ref}) = {value}" },
    OperatorDefinition { operator: Operator::Id, key: "$id", shape: ValueShape::Scalar, template: "ID({ref}) = {value}" },
    OperatorDefinition { operator: Operator::Labels, key: "$labels", shape: ValueShape::List, template: "ALL({property_name} IN {value} WHERE {property_name} IN labels({ref}))" },
    OperatorDefinition { operator: Operator::Type, key: "$type", shape: ValueShape::List, template: "type({ref}) IN {value}" },
    OperatorDefinition { operator: Operator::Hops, key: "$hops", shape: ValueShape::Scalar, template: "*1..{value}" },
    OperatorDefinition { operator: Operator::Exists, key: "$exists", shape: ValueShape::Scalar, template: "{property_name} IS NOT NULL" },
    OperatorDefinition { operator: Operator::Size, key: "$size", shape: ValueShape::NestedExpression, template: "size({property_name})" },
    OperatorDefinition { operator: Operator::Pattern, key: "$pattern", shape: ValueShape::NestedPattern, template: "EXISTS { {value} }" },
];

const COMPARISON_OPERATORS: &[Operator] = &[
    Operator::Eq,
    Operator::Ne,
    Operator::Gt,
    Operator::Gte,
    Operator::Lt,
    Operator::Lte,
];

const PROPERTY_OPERATORS: &[Operator] = &[
    Operator::Contains,
    Operator::StartsWith,
    Operator::EndsWith,
    Operator::Regex,
    Operator::In,
    Operator::Exists,
    Operator::Size,
    Operator::All,
    Operator::And,
    Operator::Or,
    Operator::Xor,
    Operator::Not,
];

const ELEMENT_OPERATORS: &[Operator] = &[
    Operator::And,
    Operator::Or,
    Operator::Xor,
    Operator::Not,
    Operator::ElementId,
    Operator::Id,
];

lazy_static! {
    static ref GRAMMAR: HashMap<(OperatorContext, &'static str), &'static OperatorDefinition> = {
        let mut table = HashMap::new();
        let contexts: [(OperatorContext, Vec<Operator>); 4] = [
            (OperatorContext::Comparison, COMPARISON_OPERATORS.to_vec()),
            (
                OperatorContext::Property,
                [COMPARISON_OPERATORS, PROPERTY_OPERATORS].concat(),
            ),
            (
                OperatorContext::Node,
                [ELEMENT_OPERATORS, &[Operator::Labels, Operator::Pattern][..]].concat(),
            ),
            (
                OperatorContext::Relationship,
                [ELEMENT_OPERATORS, &[Operator::Type, Operator::Hops][..]].concat(),
            ),
        ];

        for (context, operators) in contexts {
            for operator in operators {
                let definition = operator.definition();
                table.insert((context, definition.key), definition);
            }
        }
        table
    };
}

impl Operator {
    pub fn definition(&self) -> &'static OperatorDefinition {
        // DEFINITIONS is declared in variant order
        &DEFINITIONS[*self as usize]
    }

    pub fn key(&self) -> &'static str {
        self.definition().key
    }

}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Look up an operator key in the given context.
///
/// `None` means the key is not part of the context's grammar; callers drop
/// such keys unless validating strictly.
pub fn lookup(key: &str, context: OperatorContext) -> Option<&'static OperatorDefinition> {
    GRAMMAR.get(&(context, key)).copied()
}

pub fn is_operator_key(key: &str) -> bool {
    key.starts_with(OPERATOR_PREFIX)
}

pub fn is_pattern_key(key: &str) -> bool {
    matches!(
        key,
        PATTERN_NODE_KEY | PATTERN_RELATIONSHIP_KEY | PATTERN_DIRECTION_KEY
    )
}
