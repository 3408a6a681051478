//! # Persistence Errors
//!
//! Error types for the persistence layer, wrapping sqlx and IO errors.

use thiserror::Error;

/// Persistence layer errors
#[derive(Debug, Error)]
pub enum PersistenceError {
    // === Database errors ===
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    // === Journal errors ===
    #[error("Journal IO error: {0}")]
    JournalIo(#[from] std::io::Error),

    #[error("Event serialization error: {0}")]
    EventSerialization(#[from] serde_json::Error),

    // === Conversion errors ===
    #[error("Invalid stored value: {0}")]
    InvalidValue(#[from] budgetgov_core::CoreError),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for PersistenceError
pub type PersistenceResult<T> = Result<T, PersistenceError>;

impl PersistenceError {
    pub fn not_found(entity: &str, id: &str) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    /// Translate constraint failures into typed variants; other sqlx errors
    /// pass through unchanged.
    pub fn from_constraint(err: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return Self::UniqueViolation(what.to_string());
            }
            if db_err.is_foreign_key_violation() {
                return Self::ForeignKeyViolation(what.to_string());
            }
        }
        Self::Database(err)
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = PersistenceError::not_found("Budget", "BUDGET#4");
        assert_eq!(err.to_string(), "Record not found: Budget with id BUDGET#4");
        assert!(matches!(err, PersistenceError::NotFound { .. }));
        assert!(!err.is_unique_violation());
    }

    #[test]
    fn test_non_database_error_passes_through() {
        let err = PersistenceError::from_constraint(sqlx::Error::RowNotFound, "ldap");
        assert!(matches!(err, PersistenceError::Database(sqlx::Error::RowNotFound)));
    }
}
