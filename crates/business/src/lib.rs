//! # Budgetgov Business
//!
//! Governance engine: allocation ledger, AOP and budget lifecycles,
//! employee directory, cost centers, purchase log, reconciliation.
//!
//! ```rust,ignore
//! let ctx = ServiceContext::new(db);
//! let aop_id = AopService::new(&ctx).create(NewAop::new("FY27", dec!(1000))).await?;
//! let budget_id = BudgetService::new(&ctx)
//!     .create(NewBudget::new(aop_id, employee_id, "Infra", dec!(400)))
//!     .await?;
//! ```

pub mod aop;
pub mod auditor;
pub mod budget;
pub mod cost_center;
pub mod employee;
pub mod error;
pub mod ledger;
pub mod purchase;
pub mod services;

pub use aop::AopService;
pub use auditor::{Discrepancy, ReconciliationAuditor};
pub use budget::BudgetService;
pub use cost_center::CostCenterService;
pub use employee::EmployeeService;
pub use error::{BusinessError, BusinessResult, ErrorKind};
pub use ledger::Ledger;
pub use purchase::PurchaseService;
pub use services::ServiceContext;
