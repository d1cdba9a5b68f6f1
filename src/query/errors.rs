//! # Query Errors
//!
//! Error types for statement composition and execution.

use thiserror::Error;

/// Result type for query pipeline operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Query pipeline errors
#[derive(Debug, Error)]
pub enum QueryError {
    // ==================
    // Parameter Errors
    // ==================
    /// A literal slot declared by the template received no value
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    /// A filter key outside the endpoint's declared filter schema
    #[error("Undeclared filter key: {0}")]
    UndeclaredFilter(String),

    /// The template references a slot it does not declare
    #[error("Template '{template}' references unknown slot '{slot}'")]
    UnknownSlot { template: String, slot: String },

    // ==================
    // Execution Errors
    // ==================
    /// The store refused to open a connection
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The statement would modify the store
    #[error("Statement is not read-only")]
    NotReadOnly,

    /// The store rejected or failed to run the statement
    #[error("Query failed: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl QueryError {
    /// Parameter errors are caught before the statement reaches the store
    pub fn is_parameter_error(&self) -> bool {
        matches!(
            self,
            QueryError::MissingParameter(_)
                | QueryError::UndeclaredFilter(_)
                | QueryError::UnknownSlot { .. }
        )
    }
}
