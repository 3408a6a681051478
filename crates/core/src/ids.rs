//! # Identifier Module
//!
//! Typed row identifiers. Every entity is keyed by its SQLite integer row id;
//! the newtypes keep an AOP id from being passed where a budget id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Raw row id for binding into queries
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", $prefix, self.0)
            }
        }
    };
}

row_id!(
    /// Identifier of an annual operating plan
    AopId,
    "AOP"
);
row_id!(
    /// Identifier of a budget allocation
    BudgetId,
    "BUDGET"
);
row_id!(
    /// Identifier of an employee
    EmployeeId,
    "EMP"
);
row_id!(
    /// Identifier of a cost center
    CostCenterId,
    "CC"
);
row_id!(
    /// Identifier of a purchase request, order or receipt
    PurchaseId,
    "PUR"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        assert_eq!(AopId(7).to_string(), "AOP#7");
        assert_eq!(BudgetId::from(12).to_string(), "BUDGET#12");
        assert_eq!(EmployeeId(3).get(), 3);
    }

    #[test]
    fn test_id_serializes_as_number() {
        let json = serde_json::to_string(&AopId(42)).unwrap();
        assert_eq!(json, "42");
        let back: AopId = serde_json::from_str("42").unwrap();
        assert_eq!(back, AopId(42));
    }
}
