//! Error types for SQL parsing.

use thiserror::Error;

/// Errors raised while splitting, resolving or parsing SQL text.
///
/// Every error is local to the call that produced it: nothing is retried and
/// a statement either parses completely or fails with the first error found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SqlParseError {
    /// A quote, bracket or parenthesis is never closed (or closed twice).
    #[error("unbalanced quotes or parentheses in: {0}")]
    UnbalancedSyntax(String),

    /// A comparator token does not match any known operator.
    #[error("unknown operator: '{0}'")]
    UnknownOperator(String),

    /// A field reference does not resolve against the schema.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// `PARAMETER('')` was used without a parameter name.
    #[error("parameter name is empty")]
    EmptyParameterName,

    /// `PARAMETER('name') = ''` was used without a value.
    #[error("parameter value is empty")]
    EmptyParameterValue,

    /// A SQL type code has no matching field type category.
    #[error("unsupported SQL type code: {0}")]
    UnsupportedSqlType(i32),

    /// A LIKE pattern is missing.
    #[error("LIKE pattern is missing")]
    InvalidLikePattern,

    /// A value that must be a literal could not be decoded as one.
    #[error("invalid literal: {0}")]
    InvalidLiteral(String),

    /// An expression is structurally incomplete (missing operand, wrong
    /// argument count, trailing text).
    #[error("malformed expression: {0}")]
    MalformedExpression(String),

    /// A mandatory clause is absent from the statement.
    #[error("missing {0} clause")]
    MissingClause(&'static str),
}

/// Result type alias for parsing operations.
pub type Result<T> = std::result::Result<T, SqlParseError>;
