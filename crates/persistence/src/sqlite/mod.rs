//! SQLite persistence module
//!
//! Repository pattern for SQLite access.

pub mod repos;
pub mod schema;

pub use repos::{
    create_pool, init_database, run_migrations, AopDetailRepo, AopRepo, BudgetQuery, BudgetRepo,
    CostCenterRepo, EmployeeRepo, PurchaseRepo,
};
pub use schema::{
    AopDetailRow, AopRow, BudgetRow, CostCenterRow, EmployeeRow, PurchaseOrderRow,
    PurchaseRequestRow, ReceiptRow,
};
