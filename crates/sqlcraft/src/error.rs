//! Error types for statement compilation.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type SqlResult<T> = Result<T, SqlError>;

/// Errors raised while compiling a statement.
///
/// All errors surface synchronously from the render entry points; a failed
/// compile never produces partial SQL.
#[derive(Debug, Error)]
pub enum SqlError {
    /// A condition could not be compiled: unknown operator, missing operand,
    /// or an otherwise unusable node shape.
    #[error("malformed condition: {0}")]
    MalformedCondition(String),

    /// An identifier failed the strict-mode pattern check.
    #[error("field not allowed: {0}")]
    FieldNotAllowed(String),

    /// A data assignment carried a value the target clause cannot express.
    #[error("unsupported data shape: {0}")]
    UnsupportedDataShape(String),

    /// DELETE was rendered without any condition and without the force flag.
    #[error("refusing DELETE without a condition (pass force to allow a full-table delete)")]
    MissingDeleteCondition,

    /// A column-to-column comparison used an operator outside the comparison set.
    #[error("invalid column comparison operator: {0}")]
    InvalidColumnCompare(String),
}

impl SqlError {
    /// Create a [`SqlError::MalformedCondition`].
    pub fn malformed(msg: impl Into<String>) -> Self {
        SqlError::MalformedCondition(msg.into())
    }

    /// Create a [`SqlError::FieldNotAllowed`].
    pub fn field(key: impl Into<String>) -> Self {
        SqlError::FieldNotAllowed(key.into())
    }

    /// Create a [`SqlError::UnsupportedDataShape`].
    pub fn data(msg: impl Into<String>) -> Self {
        SqlError::UnsupportedDataShape(msg.into())
    }

    /// Create a [`SqlError::InvalidColumnCompare`].
    pub fn column(op: impl Into<String>) -> Self {
        SqlError::InvalidColumnCompare(op.into())
    }
}
