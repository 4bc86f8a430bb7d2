//! Error type shared by every compilation stage.

use crate::builder::QueryType;
use thiserror::Error;

/// Errors raised while decoding or compiling a filter, sort string or query.
///
/// Compilation either fully succeeds or fails with one of these; no partial
/// fragment is ever returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// The operation code is not one of the supported operations.
    #[error("operation '{0}' is not supported")]
    UnsupportedOperation(String),

    /// The `queryType` is not one of `text|numeric|datetime|boolean|guid`.
    #[error("query type '{0}' is not supported")]
    UnsupportedQueryType(String),

    /// A column name or path failed the identifier whitelist.
    #[error(
        "Invalid SQL identifier: '{0}'. Only alphanumeric characters, underscores, and dots are allowed."
    )]
    InvalidIdentifier(String),

    /// A combinator key is neither `and` nor `or`.
    #[error("Invalid logical operator: '{0}'. Only 'and' or 'or' are allowed.")]
    InvalidLogicalOperator(String),

    /// A sort direction is neither `asc` nor `desc`.
    #[error("Invalid sort order: '{0}'. Only 'asc' or 'desc' are allowed.")]
    InvalidSortOrder(String),

    /// A raw value could not be parsed for its declared type, or an operation
    /// received the wrong number of values.
    #[error("invalid {query_type} value '{value}': {reason}")]
    ValueFormat {
        /// The declared type the value was parsed as.
        query_type: QueryType,
        /// The offending raw value.
        value: String,
        /// Why parsing failed.
        reason: String,
    },

    /// The filter tree nests deeper than the configured limit.
    #[error("filter nesting exceeds maximum depth {max}")]
    NestingTooDeep {
        /// The configured maximum depth.
        max: usize,
    },

    /// The filter document does not have a valid node shape.
    #[error("malformed filter: {0}")]
    MalformedFilter(String),

    /// The input is not valid JSON.
    #[error("invalid JSON: {0}")]
    InvalidJson(String),
}

impl CompileError {
    pub(crate) fn value_format(
        query_type: QueryType,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::ValueFormat {
            query_type,
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedFilter(reason.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = CompileError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offending_input() {
        let err = CompileError::InvalidIdentifier("name; DROP".into());
        assert!(err.to_string().contains("Invalid SQL identifier"));
        assert!(err.to_string().contains("name; DROP"));

        let err = CompileError::InvalidSortOrder("sideways".into());
        assert!(err.to_string().contains("Invalid sort order"));

        let err = CompileError::InvalidLogicalOperator("$xor".into());
        assert!(err.to_string().contains("Invalid logical operator"));
    }

    #[test]
    fn test_value_format_display() {
        let err = CompileError::value_format(QueryType::Numeric, "abc", "not a number");
        assert_eq!(err.to_string(), "invalid numeric value 'abc': not a number");
    }

    #[test]
    fn test_nesting_display() {
        let err = CompileError::NestingTooDeep { max: 4 };
        assert_eq!(err.to_string(), "filter nesting exceeds maximum depth 4");
    }
}
