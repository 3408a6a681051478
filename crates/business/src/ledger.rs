//! Allocation ledger
//!
//! The committed total of an AOP is the sum of its Active, non-soft-deleted
//! budgets. It is recomputed on every call; there is no stored aggregate.

use crate::error::{BusinessError, BusinessResult};
use crate::services::ServiceContext;
use budgetgov_core::{money, parse_amount, AopId, CoreError, CoreResult, EmployeeId};
use budgetgov_persistence::BudgetRepo;
use rust_decimal::Decimal;
use sqlx::{Executor, Sqlite};

/// Read-only view over committed budget amounts
pub struct Ledger<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> Ledger<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Committed total of an AOP, 0 when it has no committed budgets
    pub async fn committed_total(&self, aop_id: AopId) -> BusinessResult<Decimal> {
        committed_total_with(self.ctx.pool(), aop_id).await
    }

    /// Committed total held by one employee across all AOPs
    pub async fn employee_committed_total(&self, employee_id: EmployeeId) -> BusinessResult<Decimal> {
        let amounts =
            BudgetRepo::committed_amounts_for_employee(self.ctx.pool(), employee_id).await?;
        total(&amounts)
    }
}

async fn committed_total_with<'e, E>(exec: E, aop_id: AopId) -> BusinessResult<Decimal>
where
    E: Executor<'e, Database = Sqlite>,
{
    let amounts = BudgetRepo::committed_amounts(exec, aop_id).await?;
    total(&amounts)
}

/// Committed total on a given executor, `None` when the committed amounts add
/// up past `Decimal::MAX` (above any approved ceiling). Guarded writes call
/// this with their open transaction so the check sees the same snapshot they
/// write to.
pub(crate) async fn committed_total_checked<'e, E>(
    exec: E,
    aop_id: AopId,
) -> BusinessResult<Option<Decimal>>
where
    E: Executor<'e, Database = Sqlite>,
{
    match committed_total_with(exec, aop_id).await {
        Ok(total) => Ok(Some(total)),
        Err(BusinessError::Core(CoreError::AmountOverflow)) => Ok(None),
        Err(e) => Err(e),
    }
}

fn total(amounts: &[String]) -> BusinessResult<Decimal> {
    let values = amounts
        .iter()
        .map(|a| parse_amount(a))
        .collect::<CoreResult<Vec<_>>>()?;
    Ok(money::sum(values)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_total_of_nothing_is_zero() {
        assert_eq!(total(&[]).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_total_is_exact() {
        let amounts = vec!["0.10".to_string(), "0.20".to_string(), "400".to_string()];
        assert_eq!(total(&amounts).unwrap(), dec!(400.30));
    }

    #[test]
    fn test_overflowing_total_is_reported() {
        let half = "50000000000000000000000000000".to_string();
        let err = total(&[half.clone(), half]).unwrap_err();
        assert!(matches!(err, BusinessError::Core(CoreError::AmountOverflow)));
    }

    #[test]
    fn test_corrupt_amount_is_reported() {
        let amounts = vec!["12".to_string(), "twelve".to_string()];
        assert!(total(&amounts).is_err());
    }
}
