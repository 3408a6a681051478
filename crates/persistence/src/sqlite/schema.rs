//! Database schema definitions
//!
//! Row types for sqlx mapping from SQLite tables.
//! Schema is defined in migrations/20261016000000_init.sql

use crate::error::{PersistenceError, PersistenceResult};
use budgetgov_core::{
    parse_amount, Aop, AopDetail, AopId, AopState, Budget, BudgetId, BudgetState, CostCenter,
    CostCenterId, Employee, EmployeeId, PurchaseId, PurchaseOrder, PurchaseRequest, Receipt,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Row type for table `aops`
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct AopRow {
    pub id: i64,
    pub name: String,
    pub total_approved_amount: String, // Decimal stored as TEXT
    pub state: String,
}

/// Row type for table `aop_details`
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct AopDetailRow {
    pub id: i64,
    pub aop_id: i64,
    pub cost_center_code: String,
    pub allocated_amount: String, // Decimal stored as TEXT
}

/// Row type for table `cost_centers`
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct CostCenterRow {
    pub id: i64,
    pub code: String,
    pub name: String,
}

/// Row type for table `employees`
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct EmployeeRow {
    pub id: i64,
    pub ldap: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub level: i64,
    pub cost_center_code: String,
    pub manager_id: Option<i64>,
    pub active: bool,
}

/// Row type for table `budgets`
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct BudgetRow {
    pub id: i64,
    pub aop_id: i64,
    pub employee_id: i64,
    pub project: String,
    pub description: String,
    pub amount: String, // Decimal stored as TEXT
    pub state: String,
    pub soft_deleted: bool,
}

/// Row type for table `purchase_requests`
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct PurchaseRequestRow {
    pub id: i64,
    pub reference: String,
    pub requestor_ldap: String,
    pub budget_id: i64,
    pub amount: String,
    pub date: NaiveDate,
}

/// Row type for table `purchase_orders`
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct PurchaseOrderRow {
    pub id: i64,
    pub order_number: String,
    pub line_number: i64,
    pub requestor_ldap: String,
    pub budget_id: i64,
    pub item: String,
    pub amount: String,
    pub date: NaiveDate,
}

/// Row type for table `receipts`
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct ReceiptRow {
    pub id: i64,
    pub receipt_date: NaiveDate,
    pub order_number: String,
    pub line_number: i64,
    pub item: String,
}

// === Conversion implementations ===

impl AopRow {
    /// Convert into the domain type, attaching the detail breakdown
    pub fn into_aop(self, details: Vec<AopDetailRow>) -> PersistenceResult<Aop> {
        let details = details
            .into_iter()
            .map(AopDetail::try_from)
            .collect::<PersistenceResult<Vec<_>>>()?;
        Ok(Aop {
            id: AopId(self.id),
            name: self.name,
            total_approved_amount: parse_amount(&self.total_approved_amount)?,
            state: parse_state(&self.state)?,
            details,
        })
    }

    pub fn state(&self) -> PersistenceResult<AopState> {
        parse_state(&self.state)
    }
}

fn parse_state(raw: &str) -> PersistenceResult<AopState> {
    AopState::from_str(raw).ok_or_else(|| PersistenceError::InvalidValue(
        budgetgov_core::CoreError::InvalidAopState(raw.to_string()),
    ))
}

impl TryFrom<AopDetailRow> for AopDetail {
    type Error = PersistenceError;

    fn try_from(row: AopDetailRow) -> PersistenceResult<Self> {
        Ok(AopDetail {
            id: row.id,
            aop_id: AopId(row.aop_id),
            cost_center_code: row.cost_center_code,
            allocated_amount: parse_amount(&row.allocated_amount)?,
        })
    }
}

impl From<CostCenterRow> for CostCenter {
    fn from(row: CostCenterRow) -> Self {
        CostCenter {
            id: CostCenterId(row.id),
            code: row.code,
            name: row.name,
        }
    }
}

impl From<EmployeeRow> for Employee {
    fn from(row: EmployeeRow) -> Self {
        Employee {
            id: EmployeeId(row.id),
            ldap: row.ldap,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            level: row.level,
            cost_center_code: row.cost_center_code,
            manager_id: row.manager_id.map(EmployeeId),
            active: row.active,
        }
    }
}

impl TryFrom<BudgetRow> for Budget {
    type Error = PersistenceError;

    fn try_from(row: BudgetRow) -> PersistenceResult<Self> {
        Ok(Budget {
            id: BudgetId(row.id),
            aop_id: AopId(row.aop_id),
            employee_id: EmployeeId(row.employee_id),
            project: row.project,
            description: row.description,
            amount: parse_amount(&row.amount)?,
            state: BudgetState::parse(&row.state)?,
            soft_deleted: row.soft_deleted,
        })
    }
}

impl TryFrom<PurchaseRequestRow> for PurchaseRequest {
    type Error = PersistenceError;

    fn try_from(row: PurchaseRequestRow) -> PersistenceResult<Self> {
        Ok(PurchaseRequest {
            id: PurchaseId(row.id),
            reference: row.reference,
            requestor_ldap: row.requestor_ldap,
            budget_id: BudgetId(row.budget_id),
            amount: parse_amount(&row.amount)?,
            date: row.date,
        })
    }
}

impl TryFrom<PurchaseOrderRow> for PurchaseOrder {
    type Error = PersistenceError;

    fn try_from(row: PurchaseOrderRow) -> PersistenceResult<Self> {
        Ok(PurchaseOrder {
            id: PurchaseId(row.id),
            order_number: row.order_number,
            line_number: row.line_number,
            requestor_ldap: row.requestor_ldap,
            budget_id: BudgetId(row.budget_id),
            item: row.item,
            amount: parse_amount(&row.amount)?,
            date: row.date,
        })
    }
}

impl From<ReceiptRow> for Receipt {
    fn from(row: ReceiptRow) -> Self {
        Receipt {
            id: PurchaseId(row.id),
            receipt_date: row.receipt_date,
            order_number: row.order_number,
            line_number: row.line_number,
            item: row.item,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_budget_row_conversion() {
        let row = BudgetRow {
            id: 5,
            aop_id: 1,
            employee_id: 2,
            project: "Infra".to_string(),
            description: String::new(),
            amount: "412.50".to_string(),
            state: "active".to_string(),
            soft_deleted: false,
        };
        let budget = Budget::try_from(row).unwrap();
        assert_eq!(budget.id, BudgetId(5));
        assert_eq!(budget.amount, dec!(412.50));
        assert!(budget.is_committed());
    }

    #[test]
    fn test_aop_row_rejects_unknown_state() {
        let row = AopRow {
            id: 1,
            name: "AOP".to_string(),
            total_approved_amount: "10".to_string(),
            state: "archived".to_string(),
        };
        assert!(row.into_aop(Vec::new()).is_err());
    }

    #[test]
    fn test_bad_amount_is_reported() {
        let row = AopDetailRow {
            id: 1,
            aop_id: 1,
            cost_center_code: "CC".to_string(),
            allocated_amount: "n/a".to_string(),
        };
        let err = AopDetail::try_from(row).unwrap_err();
        assert!(matches!(err, PersistenceError::InvalidValue(_)));
    }
}
