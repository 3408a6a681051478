//! Engine errors
//!
//! Guard failures are typed so callers can tell a rejected request
//! (validation, lock, conflict, ceiling, dependency) from an infrastructure
//! failure.

use budgetgov_core::{AopId, AopState, CoreError, EmployeeId};
use budgetgov_persistence::PersistenceError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Engine operation errors
#[derive(Debug, Error)]
pub enum BusinessError {
    /// Malformed input or a reference to a record that does not exist
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{aop_id} is {state} and cannot be modified")]
    StateLocked { aop_id: AopId, state: AopState },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(
        "Ceiling exceeded for {aop_id}: committed {committed} + requested {requested} > approved {approved}"
    )]
    CeilingExceeded {
        aop_id: AopId,
        committed: Decimal,
        requested: Decimal,
        approved: Decimal,
    },

    #[error("{employee_id} still owns {active_budgets} active budget(s)")]
    Dependency {
        employee_id: EmployeeId,
        active_budgets: i64,
    },

    // === Wrapped errors ===
    #[error("Persistence error: {0}")]
    Persistence(PersistenceError),

    #[error("{0}")]
    Core(#[from] CoreError),
}

/// Result type alias for engine operations
pub type BusinessResult<T> = Result<T, BusinessError>;

/// Coarse error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    StateLocked,
    Conflict,
    CeilingExceeded,
    Dependency,
    /// Storage or journal failure
    Internal,
}

impl BusinessError {
    pub fn not_found(what: impl std::fmt::Display) -> Self {
        Self::Validation(format!("{} not found", what))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::Core(_) => ErrorKind::Validation,
            Self::StateLocked { .. } => ErrorKind::StateLocked,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::CeilingExceeded { .. } => ErrorKind::CeilingExceeded,
            Self::Dependency { .. } => ErrorKind::Dependency,
            Self::Persistence(_) => ErrorKind::Internal,
        }
    }
}

impl From<PersistenceError> for BusinessError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::NotFound { entity, id } => {
                Self::Validation(format!("{} {} not found", entity, id))
            }
            PersistenceError::UniqueViolation(what) => {
                Self::Validation(format!("duplicate value: {}", what))
            }
            PersistenceError::ForeignKeyViolation(what) => {
                Self::Validation(format!("unknown reference: {}", what))
            }
            PersistenceError::InvalidValue(core) => Self::Core(core),
            other => Self::Persistence(other),
        }
    }
}

impl From<sqlx::Error> for BusinessError {
    fn from(err: sqlx::Error) -> Self {
        Self::Persistence(PersistenceError::Database(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ceiling_exceeded_message() {
        let err = BusinessError::CeilingExceeded {
            aop_id: AopId(1),
            committed: dec!(600),
            requested: dec!(500),
            approved: dec!(1000),
        };
        assert_eq!(err.kind(), ErrorKind::CeilingExceeded);
        assert!(err.to_string().contains("committed 600"));
        assert!(err.to_string().contains("approved 1000"));
    }

    #[test]
    fn test_state_locked_message() {
        let err = BusinessError::StateLocked {
            aop_id: AopId(3),
            state: AopState::Active,
        };
        assert_eq!(err.to_string(), "AOP#3 is Active and cannot be modified");
    }

    #[test]
    fn test_not_found_is_validation() {
        let err: BusinessError = PersistenceError::not_found("Budget", "BUDGET#9").into();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err: BusinessError = CoreError::negative("amount", dec!(-1)).into();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_database_error_is_internal() {
        let err: BusinessError = sqlx::Error::PoolTimedOut.into();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
