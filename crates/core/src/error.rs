//! # Error Module
//!
//! Domain validation errors for budgetgov, built on thiserror.

use rust_decimal::Decimal;
use thiserror::Error;

/// Core domain errors.
///
/// Raised by pure validation on domain values; they never touch storage.
#[derive(Debug, Error)]
pub enum CoreError {
    // === Money errors ===
    #[error("Amount cannot be negative: {field} = {amount}")]
    NegativeAmount { field: String, amount: Decimal },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Amount overflow: total exceeds the largest representable amount")]
    AmountOverflow,

    // === State errors ===
    #[error("Invalid AOP state: {0}")]
    InvalidAopState(String),

    #[error("Invalid budget state: {0}")]
    InvalidBudgetState(String),

    // === Field errors ===
    #[error("Required field is empty: {0}")]
    EmptyField(String),

    #[error("Invalid level: {0}")]
    InvalidLevel(i64),

    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

/// Result type alias with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Create a negative amount error for the named field
    pub fn negative(field: &str, amount: Decimal) -> Self {
        Self::NegativeAmount {
            field: field.to_string(),
            amount,
        }
    }
}

/// Reject blank strings for required fields
pub fn require_non_empty(field: &str, value: &str) -> CoreResult<()> {
    if value.trim().is_empty() {
        return Err(CoreError::EmptyField(field.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_display() {
        let err = CoreError::negative("amount", dec!(-5));
        assert_eq!(err.to_string(), "Amount cannot be negative: amount = -5");

        let err = CoreError::InvalidAopState("archived".to_string());
        assert_eq!(err.to_string(), "Invalid AOP state: archived");
    }

    #[test]
    fn test_require_non_empty() {
        assert!(require_non_empty("project", "Infra").is_ok());
        let err = require_non_empty("project", "   ").unwrap_err();
        assert!(err.to_string().contains("project"));
    }
}
