use std::fmt;

#[derive(Debug)]
pub enum AppError {
    /// A logical operator (`$and`, `$or`, `$xor`) was given an empty list
    EmptyLogicalOperand(String),
    /// An operator's value failed its shape, type or range constraint
    InvalidOperatorValue { operator: String, reason: String },
    /// A structural operator appeared where it cannot be dropped, or any
    /// unrecognized `$` key while validating in strict mode
    UnsupportedOperatorForContext { operator: String, context: String },
    ExpressionTooDeep(usize),
    InvalidQueryOptions(String),
    Configuration(String),
    Serialization(serde_json::Error),
    Query(String),
}

impl AppError {
    pub fn invalid_value(operator: &str, reason: impl Into<String>) -> Self {
        AppError::InvalidOperatorValue {
            operator: operator.to_string(),
            reason: reason.into(),
        }
    }

    pub fn unsupported(operator: &str, context: impl fmt::Display) -> Self {
        AppError::UnsupportedOperatorForContext {
            operator: operator.to_string(),
            context: context.to_string(),
        }
    }

    /// True for errors caused by the caller's filter input rather than the
    /// environment (configuration, driver).
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            AppError::EmptyLogicalOperand(_)
                | AppError::InvalidOperatorValue { .. }
                | AppError::UnsupportedOperatorForContext { .. }
                | AppError::ExpressionTooDeep(_)
                | AppError::InvalidQueryOptions(_)
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::EmptyLogicalOperand(op) => {
                write!(f, "Logical operator {} requires at least one operand", op)
            }
            AppError::InvalidOperatorValue { operator, reason } => {
                write!(f, "Invalid value for operator {}: {}", operator, reason)
            }
            AppError::UnsupportedOperatorForContext { operator, context } => {
                write!(f, "Operator {} is not supported in {} context", operator, context)
            }
            AppError::ExpressionTooDeep(limit) => {
                write!(f, "Filter expression exceeds maximum nesting depth of {}", limit)
            }
            AppError::InvalidQueryOptions(e) => write!(f, "Invalid query options: {}", e),
            AppError::Configuration(e) => write!(f, "Configuration error: {}", e),
            AppError::Serialization(e) => write!(f, "Serialization error: {}", e),
            AppError::Query(e) => write!(f, "Query execution failed: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err)
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Configuration(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
