//! Reconciliation auditor
//!
//! Read-only sweep comparing each Active AOP's committed total with its
//! approved ceiling. Budget update and reduce are not ceiling-checked, so
//! this is where over-commitment shows up.

use crate::error::BusinessResult;
use crate::ledger::committed_total_checked;
use crate::services::ServiceContext;
use budgetgov_core::{parse_amount, AopId, AopState, Event, EventType};
use budgetgov_persistence::AopRepo;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

/// An Active AOP whose committed total exceeds its approved total
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discrepancy {
    pub aop_id: AopId,
    pub aop_name: String,
    /// `Decimal::MAX` when `committed_overflow` is set
    pub committed_total: Decimal,
    pub approved_total: Decimal,
    /// The committed amounts add up past the largest representable amount
    pub committed_overflow: bool,
}

impl Discrepancy {
    /// Amount committed beyond the ceiling; a lower bound on overflow
    pub fn overage(&self) -> Decimal {
        self.committed_total - self.approved_total
    }
}

pub struct ReconciliationAuditor<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReconciliationAuditor<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Every Active AOP in breach of its ceiling; empty when consistent.
    /// Changes nothing in the database, so repeated runs agree.
    pub async fn reconcile(&self) -> BusinessResult<Vec<Discrepancy>> {
        let mut discrepancies = Vec::new();

        for row in AopRepo::get_by_state(self.ctx.pool(), AopState::Active).await? {
            let aop_id = AopId(row.id);
            let approved = parse_amount(&row.total_approved_amount)?;
            let committed = committed_total_checked(self.ctx.pool(), aop_id).await?;
            let committed_overflow = committed.is_none();
            let committed = committed.unwrap_or(Decimal::MAX);

            if committed_overflow || committed > approved {
                warn!(
                    aop_id = %aop_id,
                    committed = %committed,
                    approved = %approved,
                    overflow = committed_overflow,
                    "AOP over-committed"
                );
                discrepancies.push(Discrepancy {
                    aop_id,
                    aop_name: row.name,
                    committed_total: committed,
                    approved_total: approved,
                    committed_overflow,
                });
            }
        }

        info!(issues = discrepancies.len(), "reconciliation finished");
        self.ctx.record(
            &Event::new(self.ctx.next_event_id(), EventType::ReconciliationRun).with_description(
                &format!("{} discrepancy(ies)", discrepancies.len()),
            ),
        );

        Ok(discrepancies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_overage() {
        let d = Discrepancy {
            aop_id: AopId(1),
            aop_name: "FY27".to_string(),
            committed_total: dec!(1200),
            approved_total: dec!(1000),
            committed_overflow: false,
        };
        assert_eq!(d.overage(), dec!(200));
    }

    #[test]
    fn test_discrepancy_serializes_amounts_as_strings() {
        let d = Discrepancy {
            aop_id: AopId(2),
            aop_name: "FY27".to_string(),
            committed_total: dec!(1200.50),
            approved_total: dec!(1000),
            committed_overflow: false,
        };
        let json = serde_json::to_string(&d).unwrap();
        assert!(json.contains("\"aop_id\":2"));
        assert!(json.contains("\"committed_total\":\"1200.50\""));
    }
}
