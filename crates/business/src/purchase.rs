//! Purchase log
//!
//! Append-only purchase requests, orders and receipts. Amounts are not
//! checked against what is left on the budget.

use crate::error::{BusinessError, BusinessResult};
use crate::services::ServiceContext;
use budgetgov_core::{
    BudgetId, NewPurchaseOrder, NewPurchaseRequest, NewReceipt, PurchaseOrder, PurchaseRequest,
    Receipt,
};
use budgetgov_persistence::{BudgetRepo, PurchaseRepo};
use tracing::info;

pub struct PurchaseService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PurchaseService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    pub async fn record_request(&self, pr: NewPurchaseRequest) -> BusinessResult<i64> {
        pr.validate()?;
        self.ensure_budget(pr.budget_id).await?;

        let id = PurchaseRepo::insert_request(self.ctx.pool(), &pr).await?;
        info!(budget_id = %pr.budget_id, amount = %pr.amount, reference = %pr.reference, "purchase request recorded");
        Ok(id)
    }

    pub async fn record_order(&self, po: NewPurchaseOrder) -> BusinessResult<i64> {
        po.validate()?;
        self.ensure_budget(po.budget_id).await?;

        let id = PurchaseRepo::insert_order(self.ctx.pool(), &po).await?;
        info!(
            budget_id = %po.budget_id,
            amount = %po.amount,
            order = %po.order_number,
            line = po.line_number,
            "purchase order recorded"
        );
        Ok(id)
    }

    pub async fn record_receipt(&self, receipt: NewReceipt) -> BusinessResult<i64> {
        receipt.validate()?;

        let id = PurchaseRepo::insert_receipt(self.ctx.pool(), &receipt).await?;
        info!(order = %receipt.order_number, line = receipt.line_number, "receipt recorded");
        Ok(id)
    }

    pub async fn requests_for_budget(&self, budget_id: BudgetId) -> BusinessResult<Vec<PurchaseRequest>> {
        let rows = PurchaseRepo::requests_for_budget(self.ctx.pool(), budget_id).await?;
        rows.into_iter()
            .map(|row| PurchaseRequest::try_from(row).map_err(BusinessError::from))
            .collect()
    }

    pub async fn orders_for_budget(&self, budget_id: BudgetId) -> BusinessResult<Vec<PurchaseOrder>> {
        let rows = PurchaseRepo::orders_for_budget(self.ctx.pool(), budget_id).await?;
        rows.into_iter()
            .map(|row| PurchaseOrder::try_from(row).map_err(BusinessError::from))
            .collect()
    }

    pub async fn receipts_for_order(&self, order_number: &str) -> BusinessResult<Vec<Receipt>> {
        let rows = PurchaseRepo::receipts_for_order(self.ctx.pool(), order_number).await?;
        Ok(rows.into_iter().map(Receipt::from).collect())
    }

    async fn ensure_budget(&self, budget_id: BudgetId) -> BusinessResult<()> {
        match BudgetRepo::get(self.ctx.pool(), budget_id).await? {
            Some(_) => Ok(()),
            None => Err(BusinessError::not_found(budget_id)),
        }
    }
}
