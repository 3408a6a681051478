//! Budget lifecycle
//!
//! Create and copy are ceiling-checked inside the AOP write lock. Update and
//! reduce only validate the amount; drift they introduce is reported by the
//! reconciliation auditor.

use crate::aop::lock_and_fetch;
use crate::error::{BusinessError, BusinessResult};
use crate::ledger::committed_total_checked;
use crate::services::ServiceContext;
use budgetgov_core::{
    ensure_non_negative, parse_amount, AopId, Budget, BudgetId, BudgetPatch, BudgetState, Event,
    EventType, NewBudget,
};
use budgetgov_persistence::{BudgetQuery, BudgetRepo, EmployeeRepo};
use rust_decimal::Decimal;
use sqlx::SqliteConnection;
use tracing::{debug, info};

pub struct BudgetService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> BudgetService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Allocate a new Active budget under an AOP
    pub async fn create(&self, new: NewBudget) -> BusinessResult<BudgetId> {
        new.validate()?;

        let mut tx = self.ctx.pool().begin().await?;
        let aop = lock_and_fetch(&mut *tx, new.aop_id).await?;
        if EmployeeRepo::get(&mut *tx, new.employee_id).await?.is_none() {
            return Err(BusinessError::not_found(new.employee_id));
        }

        let approved = parse_amount(&aop.total_approved_amount)?;
        ensure_within_ceiling(&mut *tx, new.aop_id, new.amount, approved).await?;

        let budget_id = BudgetRepo::insert(
            &mut *tx,
            new.aop_id,
            new.employee_id,
            &new.project,
            &new.description,
            new.amount,
            BudgetState::Active,
        )
        .await?;
        tx.commit().await?;

        info!(budget_id = %budget_id, aop_id = %new.aop_id, amount = %new.amount, "budget created");
        self.ctx.record(&Event::budget_created(
            &self.ctx.next_event_id(),
            new.aop_id,
            budget_id,
            new.amount,
        ));

        Ok(budget_id)
    }

    /// Duplicate a budget into another (or the same) AOP. The source is left
    /// untouched; the destination ceiling is checked.
    pub async fn copy(&self, source_id: BudgetId, destination: AopId) -> BusinessResult<BudgetId> {
        let mut tx = self.ctx.pool().begin().await?;
        let aop = lock_and_fetch(&mut *tx, destination).await?;
        let source: Budget = BudgetRepo::get(&mut *tx, source_id)
            .await?
            .ok_or_else(|| BusinessError::not_found(source_id))?
            .try_into()?;

        let approved = parse_amount(&aop.total_approved_amount)?;
        ensure_within_ceiling(&mut *tx, destination, source.amount, approved).await?;

        let budget_id = BudgetRepo::insert(
            &mut *tx,
            destination,
            source.employee_id,
            &source.project,
            &source.description,
            source.amount,
            source.state,
        )
        .await?;
        tx.commit().await?;

        info!(
            budget_id = %budget_id,
            source = %source_id,
            aop_id = %destination,
            amount = %source.amount,
            "budget copied"
        );
        self.ctx.record(
            &Event::new(self.ctx.next_event_id(), EventType::BudgetCopied)
                .with_aop(destination)
                .with_budget(budget_id)
                .with_amount(source.amount)
                .with_description(&format!("copied from {}", source_id)),
        );

        Ok(budget_id)
    }

    /// Change project, description and/or amount. No ceiling check.
    pub async fn update(&self, budget_id: BudgetId, patch: BudgetPatch) -> BusinessResult<()> {
        patch.validate()?;

        let mut tx = self.ctx.pool().begin().await?;
        let mut budget = lock_and_fetch_budget(&mut *tx, budget_id).await?;
        let previous_amount = budget.amount;
        patch.apply(&mut budget);

        BudgetRepo::update_fields(
            &mut *tx,
            budget_id,
            &budget.project,
            &budget.description,
            budget.amount,
        )
        .await?;
        tx.commit().await?;

        info!(budget_id = %budget_id, amount = %budget.amount, "budget updated");
        self.ctx.record(
            &Event::new(self.ctx.next_event_id(), EventType::BudgetUpdated)
                .with_aop(budget.aop_id)
                .with_budget(budget_id)
                .with_amount(budget.amount)
                .with_previous_amount(previous_amount),
        );

        Ok(())
    }

    /// Set a new amount. The amount may go up; only negativity is rejected.
    pub async fn reduce(&self, budget_id: BudgetId, new_amount: Decimal) -> BusinessResult<()> {
        ensure_non_negative("amount", new_amount)?;

        let mut tx = self.ctx.pool().begin().await?;
        let budget = lock_and_fetch_budget(&mut *tx, budget_id).await?;
        BudgetRepo::update_amount(&mut *tx, budget_id, new_amount).await?;
        tx.commit().await?;

        info!(
            budget_id = %budget_id,
            from = %budget.amount,
            to = %new_amount,
            "budget reduced"
        );
        self.ctx.record(
            &Event::new(self.ctx.next_event_id(), EventType::BudgetReduced)
                .with_aop(budget.aop_id)
                .with_budget(budget_id)
                .with_amount(new_amount)
                .with_previous_amount(budget.amount),
        );

        Ok(())
    }

    /// Flag a budget as deleted. Idempotent and permanent.
    pub async fn soft_delete(&self, budget_id: BudgetId) -> BusinessResult<()> {
        let mut tx = self.ctx.pool().begin().await?;
        let budget = lock_and_fetch_budget(&mut *tx, budget_id).await?;
        if budget.soft_deleted {
            debug!(budget_id = %budget_id, "budget already soft-deleted");
            return Ok(());
        }

        BudgetRepo::soft_delete(&mut *tx, budget_id).await?;
        tx.commit().await?;

        info!(budget_id = %budget_id, "budget soft-deleted");
        self.ctx.record(
            &Event::new(self.ctx.next_event_id(), EventType::BudgetSoftDeleted)
                .with_aop(budget.aop_id)
                .with_budget(budget_id)
                .with_amount(budget.amount),
        );

        Ok(())
    }

    /// Read one budget, soft-deleted or not
    pub async fn get(&self, budget_id: BudgetId) -> BusinessResult<Budget> {
        fetch(self.ctx.pool(), budget_id).await
    }

    pub async fn list(&self, query: &BudgetQuery) -> BusinessResult<Vec<Budget>> {
        let rows = BudgetRepo::list(self.ctx.pool(), query).await?;
        rows.into_iter()
            .map(|row| Budget::try_from(row).map_err(BusinessError::from))
            .collect()
    }

    /// The `limit` largest committed budgets of an AOP, largest first
    pub async fn top_active(&self, aop_id: AopId, limit: usize) -> BusinessResult<Vec<Budget>> {
        let rows = BudgetRepo::committed_for_aop(self.ctx.pool(), aop_id).await?;
        let mut budgets = rows
            .into_iter()
            .map(|row| Budget::try_from(row).map_err(BusinessError::from))
            .collect::<BusinessResult<Vec<_>>>()?;

        budgets.sort_by(|a, b| b.amount.cmp(&a.amount).then(a.id.0.cmp(&b.id.0)));
        budgets.truncate(limit);
        Ok(budgets)
    }
}

async fn fetch<'e, E>(exec: E, budget_id: BudgetId) -> BusinessResult<Budget>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let row = BudgetRepo::get(exec, budget_id)
        .await?
        .ok_or_else(|| BusinessError::not_found(budget_id))?;
    Ok(Budget::try_from(row)?)
}

/// Take the budget's write lock, then read it. Must be the first statement
/// of the transaction.
async fn lock_and_fetch_budget(
    tx: &mut SqliteConnection,
    budget_id: BudgetId,
) -> BusinessResult<Budget> {
    if !BudgetRepo::lock(&mut *tx, budget_id).await? {
        return Err(BusinessError::not_found(budget_id));
    }
    fetch(&mut *tx, budget_id).await
}

/// Reject an allocation that would take the committed total above the
/// approved ceiling. Must run under the AOP write lock.
async fn ensure_within_ceiling(
    tx: &mut SqliteConnection,
    aop_id: AopId,
    requested: Decimal,
    approved: Decimal,
) -> BusinessResult<()> {
    let committed = committed_total_checked(&mut *tx, aop_id).await?;
    let within = committed
        .and_then(|c| c.checked_add(requested))
        .is_some_and(|total| total <= approved);
    if !within {
        return Err(BusinessError::CeilingExceeded {
            aop_id,
            committed: committed.unwrap_or(Decimal::MAX),
            requested,
            approved,
        });
    }
    Ok(())
}
