//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← categorized: not-found, unique, FK, pool      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  EngineError (vendo-engine) ← duplicates remapped to validation errors │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (apps/api) ← status code + JSON envelope                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Database operation errors.
///
/// Infrastructure kinds (pool, connection, migration, query) are never
/// interpreted upstream, only propagated. `UniqueViolation` carries the
/// violated constraint so the engine can map it onto the right domain
/// outcome.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found: an update or delete matched zero rows.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    /// Unique constraint violation. `constraint` is the column list from
    /// the SQLite message, e.g. `users.username` or
    /// `products.name, products.seller_id`.
    #[error("unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    /// Foreign key constraint violation.
    #[error("foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted: no connection became available within the acquire
    /// timeout. This is the bound on every persistence call.
    #[error("connection pool exhausted")]
    PoolExhausted,

    /// A stored value could not be converted back into a domain type
    /// (e.g. an unknown role string). Indicates the database was written
    /// around the application.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Internal database error.
    #[error("internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        DbError::NotFound { entity, id }
    }

    /// True when the violated unique constraint involves the given column,
    /// e.g. `users.username`.
    pub fn violates_unique(&self, column: &str) -> bool {
        matches!(self, DbError::UniqueViolation { constraint } if constraint.contains(column))
    }
}

/// Convert sqlx errors to DbError.
///
/// SQLite reports constraint failures through the error message:
/// `UNIQUE constraint failed: <table>.<column>[, ...]` and
/// `FOREIGN KEY constraint failed`.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "record",
                id: 0,
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                if msg.contains("UNIQUE constraint failed") {
                    let constraint = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation { constraint }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn violates_unique_matches_constraint_column() {
        let err = DbError::UniqueViolation {
            constraint: "users.username".to_string(),
        };
        assert!(err.violates_unique("users.username"));
        assert!(!err.violates_unique("products.name"));

        let composite = DbError::UniqueViolation {
            constraint: "products.name, products.seller_id".to_string(),
        };
        assert!(composite.violates_unique("products.name"));
    }
}
