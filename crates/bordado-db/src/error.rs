//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! SQLite error (sqlx::Error)
//!        │
//!        ▼
//! DbError (this module)           context and categorization
//!        │
//!        ▼
//! ProviderError (bordado-cart)    what the cart store reacts to:
//!                                 NotFound / Unavailable / Conflict / Corrupt
//! ```

use thiserror::Error;

use bordado_cart::providers::ProviderError;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in the database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    #[error("duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    #[error("foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Guarded update lost against the authoritative counter, e.g. a coupon
    /// increment past `max_uses` or a stock claim past availability.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A stored JSON payload could not be encoded or decoded.
    #[error("payload serialization failed: {0}")]
    Serialization(String),

    /// Database connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and id.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

/// Convert sqlx errors to DbError.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite constraint messages:
                // "UNIQUE constraint failed: <table>.<column>"
                // "FOREIGN KEY constraint failed"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
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

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::Serialization(err.to_string())
    }
}

/// Mapping into the collaborator boundary the cart store understands.
///
/// Serialization failures surface as `Corrupt` so that a damaged cart
/// payload triggers the cart-reset path rather than being treated as a
/// transient outage.
impl From<DbError> for ProviderError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ProviderError::NotFound(format!("{entity} {id}")),
            DbError::Conflict(message) => ProviderError::Conflict(message),
            DbError::Serialization(message) => ProviderError::Corrupt(message),
            other => ProviderError::Unavailable(other.to_string()),
        }
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_provider_not_found() {
        let err: ProviderError = DbError::not_found("product", "polo-1").into();
        assert_eq!(err, ProviderError::NotFound("product polo-1".to_string()));
    }

    #[test]
    fn test_serialization_maps_to_corrupt() {
        let err: ProviderError = DbError::Serialization("bad json".to_string()).into();
        assert!(matches!(err, ProviderError::Corrupt(_)));
    }

    #[test]
    fn test_query_failure_maps_to_unavailable() {
        let err: ProviderError = DbError::QueryFailed("boom".to_string()).into();
        assert!(matches!(err, ProviderError::Unavailable(_)));
    }
}
