//! Repository implementations for SQLite
//!
//! Every function is generic over the sqlx executor so the same query runs
//! against the pool (unsynchronized reads) or inside a write transaction
//! (`&mut *tx`).

use crate::config::DatabaseConfig;
use crate::error::{PersistenceError, PersistenceResult};
use crate::sqlite::schema::*;
use budgetgov_core::{
    AopId, AopState, BudgetId, BudgetState, CostCenterId, Employee, EmployeeId, NewAopDetail, NewEmployee,
    NewPurchaseOrder, NewPurchaseRequest, NewReceipt,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Executor, QueryBuilder, Sqlite, SqlitePool};

/// Budgets that are still visible (not soft-deleted).
macro_rules! live_budget {
    () => {
        "soft_deleted = 0"
    };
}

/// Budgets that count toward a committed total. Every ledger read, the
/// employee dependency count, and the budget chart go through this filter.
macro_rules! committed_budget {
    () => {
        concat!("state = 'active' AND ", live_budget!())
    };
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

// ============================================================================
// AOP Repository
// ============================================================================

/// Repository for the aops table
pub struct AopRepo;

impl AopRepo {
    pub async fn get<'e, E>(exec: E, id: AopId) -> PersistenceResult<Option<AopRow>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let row = sqlx::query_as::<_, AopRow>("SELECT * FROM aops WHERE id = ?")
            .bind(id.0)
            .fetch_optional(exec)
            .await?;
        Ok(row)
    }

    pub async fn get_all<'e, E>(exec: E) -> PersistenceResult<Vec<AopRow>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let rows = sqlx::query_as::<_, AopRow>("SELECT * FROM aops ORDER BY id")
            .fetch_all(exec)
            .await?;
        Ok(rows)
    }

    pub async fn get_by_state<'e, E>(exec: E, state: AopState) -> PersistenceResult<Vec<AopRow>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let rows = sqlx::query_as::<_, AopRow>("SELECT * FROM aops WHERE state = ? ORDER BY id")
            .bind(state.as_str())
            .fetch_all(exec)
            .await?;
        Ok(rows)
    }

    /// The Active AOP, if any
    pub async fn find_active<'e, E>(exec: E) -> PersistenceResult<Option<AopRow>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let row = sqlx::query_as::<_, AopRow>("SELECT * FROM aops WHERE state = 'active' LIMIT 1")
            .fetch_optional(exec)
            .await?;
        Ok(row)
    }

    /// First AOP whose name contains `fragment` (case-insensitive)
    pub async fn find_by_name<'e, E>(exec: E, fragment: &str) -> PersistenceResult<Option<AopRow>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let row = sqlx::query_as::<_, AopRow>(
            "SELECT * FROM aops WHERE name LIKE '%' || ? || '%' ORDER BY id LIMIT 1",
        )
        .bind(fragment)
        .fetch_optional(exec)
        .await?;
        Ok(row)
    }

    pub async fn insert<'e, E>(exec: E, name: &str, total: Decimal) -> PersistenceResult<AopId>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            "INSERT INTO aops (name, total_approved_amount, state) VALUES (?, ?, 'draft')",
        )
        .bind(name)
        .bind(total.to_string())
        .execute(exec)
        .await?;
        Ok(AopId(result.last_insert_rowid()))
    }

    /// Update name and approved total
    pub async fn update<'e, E>(
        exec: E,
        id: AopId,
        name: &str,
        total: Decimal,
    ) -> PersistenceResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result =
            sqlx::query("UPDATE aops SET name = ?, total_approved_amount = ? WHERE id = ?")
                .bind(name)
                .bind(total.to_string())
                .bind(id.0)
                .execute(exec)
                .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("AOP", &id.to_string()));
        }
        Ok(())
    }

    pub async fn update_state<'e, E>(exec: E, id: AopId, state: AopState) -> PersistenceResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("UPDATE aops SET state = ? WHERE id = ?")
            .bind(state.as_str())
            .bind(id.0)
            .execute(exec)
            .await
            .map_err(|e| PersistenceError::from_constraint(e, "aops.state = 'active'"))?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("AOP", &id.to_string()));
        }
        Ok(())
    }

    /// Take the write lock for an AOP by touching its row. Inside a
    /// transaction this serializes every writer that locks the same AOP.
    /// Returns false if the AOP does not exist.
    pub async fn lock<'e, E>(exec: E, id: AopId) -> PersistenceResult<bool>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("UPDATE aops SET id = id WHERE id = ?")
            .bind(id.0)
            .execute(exec)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete an AOP; details, budgets and their purchase rows cascade
    pub async fn delete<'e, E>(exec: E, id: AopId) -> PersistenceResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM aops WHERE id = ?")
            .bind(id.0)
            .execute(exec)
            .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("AOP", &id.to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// AOP Detail Repository
// ============================================================================

/// Repository for the aop_details table
pub struct AopDetailRepo;

impl AopDetailRepo {
    pub async fn get_by_aop<'e, E>(exec: E, aop_id: AopId) -> PersistenceResult<Vec<AopDetailRow>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let rows = sqlx::query_as::<_, AopDetailRow>(
            "SELECT * FROM aop_details WHERE aop_id = ? ORDER BY id",
        )
        .bind(aop_id.0)
        .fetch_all(exec)
        .await?;
        Ok(rows)
    }

    pub async fn insert<'e, E>(exec: E, aop_id: AopId, detail: &NewAopDetail) -> PersistenceResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            "INSERT INTO aop_details (aop_id, cost_center_code, allocated_amount) VALUES (?, ?, ?)",
        )
        .bind(aop_id.0)
        .bind(&detail.cost_center_code)
        .bind(detail.allocated_amount.to_string())
        .execute(exec)
        .await?;
        Ok(())
    }

    pub async fn delete_by_aop<'e, E>(exec: E, aop_id: AopId) -> PersistenceResult<u64>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM aop_details WHERE aop_id = ?")
            .bind(aop_id.0)
            .execute(exec)
            .await?;
        Ok(result.rows_affected())
    }
}

// ============================================================================
// Budget Repository
// ============================================================================

/// Listing criteria for budgets
#[derive(Debug, Clone, Default)]
pub struct BudgetQuery {
    pub aop_id: Option<AopId>,
    pub employee_id: Option<EmployeeId>,
    /// Include soft-deleted rows (audit view)
    pub include_deleted: bool,
}

impl BudgetQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn aop(mut self, aop_id: AopId) -> Self {
        self.aop_id = Some(aop_id);
        self
    }

    pub fn employee(mut self, employee_id: EmployeeId) -> Self {
        self.employee_id = Some(employee_id);
        self
    }

    pub fn include_deleted(mut self) -> Self {
        self.include_deleted = true;
        self
    }
}

/// Repository for the budgets table
pub struct BudgetRepo;

impl BudgetRepo {
    pub async fn get<'e, E>(exec: E, id: BudgetId) -> PersistenceResult<Option<BudgetRow>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let row = sqlx::query_as::<_, BudgetRow>("SELECT * FROM budgets WHERE id = ?")
            .bind(id.0)
            .fetch_optional(exec)
            .await?;
        Ok(row)
    }

    pub async fn list<'e, E>(exec: E, query: &BudgetQuery) -> PersistenceResult<Vec<BudgetRow>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM budgets WHERE 1 = 1");
        if !query.include_deleted {
            qb.push(concat!(" AND ", live_budget!()));
        }
        if let Some(aop_id) = query.aop_id {
            qb.push(" AND aop_id = ").push_bind(aop_id.0);
        }
        if let Some(employee_id) = query.employee_id {
            qb.push(" AND employee_id = ").push_bind(employee_id.0);
        }
        qb.push(" ORDER BY id");

        let rows = qb.build_query_as::<BudgetRow>().fetch_all(exec).await?;
        Ok(rows)
    }

    /// Amounts of the committed budgets of an AOP (ledger source)
    pub async fn committed_amounts<'e, E>(exec: E, aop_id: AopId) -> PersistenceResult<Vec<String>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let rows: Vec<(String,)> = sqlx::query_as(concat!(
            "SELECT amount FROM budgets WHERE aop_id = ? AND ",
            committed_budget!()
        ))
        .bind(aop_id.0)
        .fetch_all(exec)
        .await?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    /// Amounts of the committed budgets held by an employee
    pub async fn committed_amounts_for_employee<'e, E>(
        exec: E,
        employee_id: EmployeeId,
    ) -> PersistenceResult<Vec<String>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let rows: Vec<(String,)> = sqlx::query_as(concat!(
            "SELECT amount FROM budgets WHERE employee_id = ? AND ",
            committed_budget!()
        ))
        .bind(employee_id.0)
        .fetch_all(exec)
        .await?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    /// Number of committed budgets held by an employee
    pub async fn count_committed_for_employee<'e, E>(
        exec: E,
        employee_id: EmployeeId,
    ) -> PersistenceResult<i64>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let row: (i64,) = sqlx::query_as(concat!(
            "SELECT COUNT(*) FROM budgets WHERE employee_id = ? AND ",
            committed_budget!()
        ))
        .bind(employee_id.0)
        .fetch_one(exec)
        .await?;
        Ok(row.0)
    }

    /// Committed budgets of an AOP, all rows (amount ordering is done by the
    /// caller in Decimal since amounts are TEXT)
    pub async fn committed_for_aop<'e, E>(exec: E, aop_id: AopId) -> PersistenceResult<Vec<BudgetRow>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let rows = sqlx::query_as::<_, BudgetRow>(concat!(
            "SELECT * FROM budgets WHERE aop_id = ? AND ",
            committed_budget!(),
            " ORDER BY id"
        ))
        .bind(aop_id.0)
        .fetch_all(exec)
        .await?;
        Ok(rows)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert<'e, E>(
        exec: E,
        aop_id: AopId,
        employee_id: EmployeeId,
        project: &str,
        description: &str,
        amount: Decimal,
        state: BudgetState,
    ) -> PersistenceResult<BudgetId>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            r#"
            INSERT INTO budgets (aop_id, employee_id, project, description, amount, state, soft_deleted)
            VALUES (?, ?, ?, ?, ?, ?, 0)
            "#,
        )
        .bind(aop_id.0)
        .bind(employee_id.0)
        .bind(project)
        .bind(description)
        .bind(amount.to_string())
        .bind(state.as_str())
        .execute(exec)
        .await
        .map_err(|e| PersistenceError::from_constraint(e, "budget references"))?;
        Ok(BudgetId(result.last_insert_rowid()))
    }

    /// Overwrite project, description and amount
    pub async fn update_fields<'e, E>(
        exec: E,
        id: BudgetId,
        project: &str,
        description: &str,
        amount: Decimal,
    ) -> PersistenceResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            "UPDATE budgets SET project = ?, description = ?, amount = ? WHERE id = ?",
        )
        .bind(project)
        .bind(description)
        .bind(amount.to_string())
        .bind(id.0)
        .execute(exec)
        .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("Budget", &id.to_string()));
        }
        Ok(())
    }

    pub async fn update_amount<'e, E>(exec: E, id: BudgetId, amount: Decimal) -> PersistenceResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("UPDATE budgets SET amount = ? WHERE id = ?")
            .bind(amount.to_string())
            .bind(id.0)
            .execute(exec)
            .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("Budget", &id.to_string()));
        }
        Ok(())
    }

    /// Flag a budget as soft-deleted. There is no inverse.
    pub async fn soft_delete<'e, E>(exec: E, id: BudgetId) -> PersistenceResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("UPDATE budgets SET soft_deleted = 1 WHERE id = ?")
            .bind(id.0)
            .execute(exec)
            .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("Budget", &id.to_string()));
        }
        Ok(())
    }

    /// Take the write lock for a budget row (see [`AopRepo::lock`])
    pub async fn lock<'e, E>(exec: E, id: BudgetId) -> PersistenceResult<bool>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("UPDATE budgets SET id = id WHERE id = ?")
            .bind(id.0)
            .execute(exec)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count<'e, E>(exec: E) -> PersistenceResult<i64>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM budgets")
            .fetch_one(exec)
            .await?;
        Ok(row.0)
    }
}

// ============================================================================
// Employee Repository
// ============================================================================

/// Repository for the employees table
pub struct EmployeeRepo;

impl EmployeeRepo {
    pub async fn get<'e, E>(exec: E, id: EmployeeId) -> PersistenceResult<Option<EmployeeRow>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let row = sqlx::query_as::<_, EmployeeRow>("SELECT * FROM employees WHERE id = ?")
            .bind(id.0)
            .fetch_optional(exec)
            .await?;
        Ok(row)
    }

    pub async fn get_by_ldap<'e, E>(exec: E, ldap: &str) -> PersistenceResult<Option<EmployeeRow>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let row = sqlx::query_as::<_, EmployeeRow>("SELECT * FROM employees WHERE ldap = ?")
            .bind(ldap)
            .fetch_optional(exec)
            .await?;
        Ok(row)
    }

    pub async fn list<'e, E>(exec: E, active_only: bool) -> PersistenceResult<Vec<EmployeeRow>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = if active_only {
            "SELECT * FROM employees WHERE active = 1 ORDER BY id"
        } else {
            "SELECT * FROM employees ORDER BY id"
        };
        let rows = sqlx::query_as::<_, EmployeeRow>(sql).fetch_all(exec).await?;
        Ok(rows)
    }

    pub async fn insert<'e, E>(exec: E, employee: &NewEmployee) -> PersistenceResult<EmployeeId>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            r#"
            INSERT INTO employees (ldap, first_name, last_name, email, level, cost_center_code, manager_id, active)
            VALUES (?, ?, ?, ?, ?, ?, ?, 1)
            "#,
        )
        .bind(&employee.ldap)
        .bind(&employee.first_name)
        .bind(&employee.last_name)
        .bind(&employee.email)
        .bind(employee.level)
        .bind(&employee.cost_center_code)
        .bind(employee.manager_id.map(|m| m.0))
        .execute(exec)
        .await
        .map_err(|e| PersistenceError::from_constraint(e, &format!("employees.ldap = {}", employee.ldap)))?;
        Ok(EmployeeId(result.last_insert_rowid()))
    }

    /// Write back every mutable column of an employee
    pub async fn update<'e, E>(exec: E, employee: &Employee) -> PersistenceResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            r#"
            UPDATE employees
            SET first_name = ?, last_name = ?, email = ?, level = ?, cost_center_code = ?, manager_id = ?
            WHERE id = ?
            "#,
        )
        .bind(&employee.first_name)
        .bind(&employee.last_name)
        .bind(&employee.email)
        .bind(employee.level)
        .bind(&employee.cost_center_code)
        .bind(employee.manager_id.map(|m| m.0))
        .bind(employee.id.0)
        .execute(exec)
        .await
        .map_err(|e| PersistenceError::from_constraint(e, "employees.manager_id"))?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("Employee", &employee.id.to_string()));
        }
        Ok(())
    }

    pub async fn set_active<'e, E>(exec: E, id: EmployeeId, active: bool) -> PersistenceResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("UPDATE employees SET active = ? WHERE id = ?")
            .bind(active)
            .bind(id.0)
            .execute(exec)
            .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("Employee", &id.to_string()));
        }
        Ok(())
    }

    /// Take the write lock for an employee row (see [`AopRepo::lock`])
    pub async fn lock<'e, E>(exec: E, id: EmployeeId) -> PersistenceResult<bool>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("UPDATE employees SET id = id WHERE id = ?")
            .bind(id.0)
            .execute(exec)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ============================================================================
// Cost Center Repository
// ============================================================================

/// Repository for the cost_centers table
pub struct CostCenterRepo;

impl CostCenterRepo {
    pub async fn get_all<'e, E>(exec: E) -> PersistenceResult<Vec<CostCenterRow>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let rows = sqlx::query_as::<_, CostCenterRow>("SELECT * FROM cost_centers ORDER BY code")
            .fetch_all(exec)
            .await?;
        Ok(rows)
    }

    pub async fn get<'e, E>(exec: E, id: CostCenterId) -> PersistenceResult<CostCenterRow>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, CostCenterRow>("SELECT * FROM cost_centers WHERE id = ?")
            .bind(id.0)
            .fetch_optional(exec)
            .await?
            .ok_or_else(|| PersistenceError::not_found("CostCenter", &id.to_string()))
    }

    pub async fn insert<'e, E>(exec: E, code: &str, name: &str) -> PersistenceResult<CostCenterId>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("INSERT INTO cost_centers (code, name) VALUES (?, ?)")
            .bind(code)
            .bind(name)
            .execute(exec)
            .await
            .map_err(|e| PersistenceError::from_constraint(e, &format!("cost_centers.code = {}", code)))?;
        Ok(CostCenterId(result.last_insert_rowid()))
    }

    pub async fn update<'e, E>(exec: E, id: CostCenterId, code: &str, name: &str) -> PersistenceResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("UPDATE cost_centers SET code = ?, name = ? WHERE id = ?")
            .bind(code)
            .bind(name)
            .bind(id.0)
            .execute(exec)
            .await
            .map_err(|e| PersistenceError::from_constraint(e, &format!("cost_centers.code = {}", code)))?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("CostCenter", &id.to_string()));
        }
        Ok(())
    }

    pub async fn delete<'e, E>(exec: E, id: CostCenterId) -> PersistenceResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM cost_centers WHERE id = ?")
            .bind(id.0)
            .execute(exec)
            .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("CostCenter", &id.to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// Purchase Repository
// ============================================================================

/// Repository for purchase_requests, purchase_orders and receipts
pub struct PurchaseRepo;

impl PurchaseRepo {
    pub async fn insert_request<'e, E>(exec: E, pr: &NewPurchaseRequest) -> PersistenceResult<i64>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            "INSERT INTO purchase_requests (reference, requestor_ldap, budget_id, amount, date) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&pr.reference)
        .bind(&pr.requestor_ldap)
        .bind(pr.budget_id.0)
        .bind(pr.amount.to_string())
        .bind(pr.date.unwrap_or_else(today))
        .execute(exec)
        .await
        .map_err(|e| PersistenceError::from_constraint(e, "purchase_requests.budget_id"))?;
        Ok(result.last_insert_rowid())
    }

    pub async fn insert_order<'e, E>(exec: E, po: &NewPurchaseOrder) -> PersistenceResult<i64>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            r#"
            INSERT INTO purchase_orders (order_number, line_number, requestor_ldap, budget_id, item, amount, date)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&po.order_number)
        .bind(po.line_number)
        .bind(&po.requestor_ldap)
        .bind(po.budget_id.0)
        .bind(&po.item)
        .bind(po.amount.to_string())
        .bind(po.date.unwrap_or_else(today))
        .execute(exec)
        .await
        .map_err(|e| PersistenceError::from_constraint(e, "purchase_orders.budget_id"))?;
        Ok(result.last_insert_rowid())
    }

    pub async fn insert_receipt<'e, E>(exec: E, receipt: &NewReceipt) -> PersistenceResult<i64>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            "INSERT INTO receipts (receipt_date, order_number, line_number, item) VALUES (?, ?, ?, ?)",
        )
        .bind(receipt.receipt_date.unwrap_or_else(today))
        .bind(&receipt.order_number)
        .bind(receipt.line_number)
        .bind(&receipt.item)
        .execute(exec)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn requests_for_budget<'e, E>(
        exec: E,
        budget_id: BudgetId,
    ) -> PersistenceResult<Vec<PurchaseRequestRow>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let rows = sqlx::query_as::<_, PurchaseRequestRow>(
            "SELECT * FROM purchase_requests WHERE budget_id = ? ORDER BY date, id",
        )
        .bind(budget_id.0)
        .fetch_all(exec)
        .await?;
        Ok(rows)
    }

    pub async fn orders_for_budget<'e, E>(
        exec: E,
        budget_id: BudgetId,
    ) -> PersistenceResult<Vec<PurchaseOrderRow>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let rows = sqlx::query_as::<_, PurchaseOrderRow>(
            "SELECT * FROM purchase_orders WHERE budget_id = ? ORDER BY order_number, line_number",
        )
        .bind(budget_id.0)
        .fetch_all(exec)
        .await?;
        Ok(rows)
    }

    pub async fn receipts_for_order<'e, E>(
        exec: E,
        order_number: &str,
    ) -> PersistenceResult<Vec<ReceiptRow>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let rows = sqlx::query_as::<_, ReceiptRow>(
            "SELECT * FROM receipts WHERE order_number = ? ORDER BY line_number, id",
        )
        .bind(order_number)
        .fetch_all(exec)
        .await?;
        Ok(rows)
    }
}

// ============================================================================
// Database initialization
// ============================================================================

/// Open a pool on an existing database
pub async fn create_pool(config: &DatabaseConfig) -> PersistenceResult<SqlitePool> {
    connect(config, false).await
}

/// Apply migrations under `migrations/`
pub async fn run_migrations(pool: &SqlitePool) -> PersistenceResult<()> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    Ok(())
}

/// Open (creating the file if missing) and migrate
pub async fn init_database(config: &DatabaseConfig) -> PersistenceResult<SqlitePool> {
    let pool = connect(config, true).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

async fn connect(config: &DatabaseConfig, create: bool) -> PersistenceResult<SqlitePool> {
    let options = config
        .url
        .parse::<SqliteConnectOptions>()?
        .create_if_missing(create)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(config.busy_timeout);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;

    tracing::debug!(url = %config.url, create, "database pool opened");
    Ok(pool)
}
