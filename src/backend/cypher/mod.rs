pub mod filter_impl;
pub mod pattern;
pub mod query;

pub use filter_impl::{CypherFilterConverter, LowererOptions};
pub use pattern::{node_pattern, relationship_pattern};
pub use query::{CypherQuery, QueryBuilder};
