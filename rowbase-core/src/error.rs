/// Structured error types for rowbase-core.
///
/// Uses `thiserror` for better API surface and error composition, so
/// library consumers get structured, composable errors.
use thiserror::Error;

/// Main error type for rowbase-core operations
#[derive(Error, Debug)]
pub enum DbError {
    /// Driver or pool error (connect failure, pool timeout, statement error)
    #[error("database error: {source}")]
    Sqlx {
        #[from]
        source: sqlx::Error,
    },

    /// JSON serialization or parsing failed
    #[error("JSON error at {context}: {source}")]
    Json {
        context: String,
        source: serde_json::Error,
    },

    /// No compiler registered for the requested dialect
    #[error("unsupported dialect '{name}'")]
    UnsupportedDialect { name: String },

    /// Mutating call on a reader-role accessor
    #[error("role violation: {operation} on table '{table}' requires writer role")]
    RoleViolation { table: String, operation: String },

    /// Row references a column the table descriptor does not declare
    #[error("unknown column '{column}' for table '{table}'")]
    UnknownColumn { table: String, column: String },

    /// Upsert called with zero rows
    #[error("empty batch for table '{table}'")]
    EmptyBatch { table: String },

    /// Batched rows do not share the first row's column set
    #[error("heterogeneous batch for table '{table}': row {index} differs from first row")]
    HeterogeneousBatch { table: String, index: usize },

    /// Configuration error
    #[error("configuration error: {reason}")]
    Config { reason: String },
}

/// Result type alias for rowbase-core operations
pub type Result<T> = std::result::Result<T, DbError>;

impl DbError {
    /// Create a JSON error with context
    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    /// Create an unsupported dialect error
    pub fn unsupported_dialect(name: impl Into<String>) -> Self {
        Self::UnsupportedDialect { name: name.into() }
    }

    /// Create a role violation error
    pub fn role_violation(table: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::RoleViolation {
            table: table.into(),
            operation: operation.into(),
        }
    }

    /// Create an unknown column error
    pub fn unknown_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::UnknownColumn {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Create an empty batch error
    pub fn empty_batch(table: impl Into<String>) -> Self {
        Self::EmptyBatch {
            table: table.into(),
        }
    }

    /// Create a heterogeneous batch error
    pub fn heterogeneous_batch(table: impl Into<String>, index: usize) -> Self {
        Self::HeterogeneousBatch {
            table: table.into(),
            index,
        }
    }

    /// Create a config error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// True when the error is pool exhaustion (no connection became
    /// available within the acquire timeout).
    pub fn is_pool_timeout(&self) -> bool {
        matches!(
            self,
            Self::Sqlx {
                source: sqlx::Error::PoolTimedOut,
            }
        )
    }
}
