pub mod direction;
pub mod entity_kind;
pub mod expression;
pub mod filter_operator;
pub mod filter_parser;
pub mod sort_parser;

pub use direction::PatternDirection;
pub use entity_kind::{EntityKind, OperatorContext};
pub use expression::Expression;
pub use filter_parser::{validate, ExpressionValidator, ValidatorOptions};
pub use sort_parser::{QueryOptions, QueryOrder};
