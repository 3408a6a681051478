//! # Budgetgov Core
//!
//! Domain types for the budget-governance engine.
//!
//! - [`Aop`] - annual operating plan with a Draft / Active / EOL state
//! - [`Budget`] - a sub-allocation of an AOP to one employee
//! - [`Employee`] - directory entry, soft-deactivated instead of deleted
//! - [`CostCenter`] - reference data, not enforced against free-text codes
//! - [`PurchaseRequest`] / [`PurchaseOrder`] / [`Receipt`] - append-only logs
//! - [`Event`] - governance journal entry
//!
//! Money is always [`rust_decimal::Decimal`].

pub mod aop;
pub mod budget;
pub mod cost_center;
pub mod employee;
pub mod error;
pub mod event;
pub mod ids;
pub mod money;
pub mod purchase;

pub use aop::{Aop, AopDetail, AopPatch, AopState, NewAop, NewAopDetail};
pub use budget::{Budget, BudgetPatch, BudgetState, NewBudget};
pub use cost_center::CostCenter;
pub use employee::{Employee, EmployeePatch, NewEmployee, OrgChart};
pub use error::{CoreError, CoreResult};
pub use event::{Event, EventType};
pub use ids::{AopId, BudgetId, CostCenterId, EmployeeId, PurchaseId};
pub use money::{ensure_non_negative, parse_amount};
pub use purchase::{
    parse_date, NewPurchaseOrder, NewPurchaseRequest, NewReceipt, PurchaseOrder, PurchaseRequest,
    Receipt,
};
