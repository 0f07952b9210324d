pub mod backend;
pub mod config;
pub mod error;
pub mod logging;
pub mod parser;
pub mod utils;

// Re-export commonly used types for easier access
pub use backend::cypher::{CypherFilterConverter, CypherQuery, QueryBuilder};
pub use backend::filter::{FilterConverter, LoweredFilter};
pub use backend::{GraphRepository, QueryExecutor, QueryResult};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use parser::{validate, EntityKind, Expression, ExpressionValidator, QueryOptions};
