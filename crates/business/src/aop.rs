//! AOP lifecycle
//!
//! Create, modify, transition and delete annual operating plans. Only the
//! transition to Active is guarded: a single Active AOP, and its committed
//! total within the approved ceiling.

use crate::error::{BusinessError, BusinessResult};
use crate::ledger::committed_total_checked;
use crate::services::ServiceContext;
use budgetgov_core::{parse_amount, Aop, AopId, AopPatch, AopState, Event, EventType, NewAop};
use budgetgov_persistence::{AopDetailRepo, AopRepo, AopRow, PersistenceError};
use rust_decimal::Decimal;
use sqlx::SqliteConnection;
use tracing::info;

pub struct AopService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AopService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a Draft AOP together with its detail rows
    pub async fn create(&self, new: NewAop) -> BusinessResult<AopId> {
        new.validate()?;

        let mut tx = self.ctx.pool().begin().await?;
        let aop_id = AopRepo::insert(&mut *tx, &new.name, new.total_approved_amount).await?;
        for detail in &new.details {
            AopDetailRepo::insert(&mut *tx, aop_id, detail).await?;
        }
        tx.commit().await?;

        info!(aop_id = %aop_id, amount = %new.total_approved_amount, "AOP created");
        self.ctx.record(
            &Event::new(self.ctx.next_event_id(), EventType::AopCreated)
                .with_aop(aop_id)
                .with_amount(new.total_approved_amount)
                .with_description(&new.name),
        );

        Ok(aop_id)
    }

    /// Modify name, approved total or details. Rejected while Active.
    /// Details, when given, replace the existing set.
    pub async fn update(&self, aop_id: AopId, patch: AopPatch) -> BusinessResult<()> {
        patch.validate()?;

        let mut tx = self.ctx.pool().begin().await?;
        let row = lock_and_fetch(&mut *tx, aop_id).await?;
        let state = row.state()?;
        if state.is_locked() {
            return Err(BusinessError::StateLocked { aop_id, state });
        }

        let previous_total = parse_amount(&row.total_approved_amount)?;
        let name = patch.name.clone().unwrap_or(row.name);
        let total = patch.total_approved_amount.unwrap_or(previous_total);

        AopRepo::update(&mut *tx, aop_id, &name, total).await?;
        if let Some(ref details) = patch.details {
            AopDetailRepo::delete_by_aop(&mut *tx, aop_id).await?;
            for detail in details {
                AopDetailRepo::insert(&mut *tx, aop_id, detail).await?;
            }
        }
        tx.commit().await?;

        info!(aop_id = %aop_id, amount = %total, "AOP updated");
        self.ctx.record(
            &Event::new(self.ctx.next_event_id(), EventType::AopUpdated)
                .with_aop(aop_id)
                .with_amount(total)
                .with_previous_amount(previous_total),
        );

        Ok(())
    }

    /// Move an AOP to `target`. Any state may be reached from any state;
    /// entering Active checks exclusivity and the ceiling, including when the
    /// AOP is already Active.
    pub async fn transition(&self, aop_id: AopId, target: AopState) -> BusinessResult<()> {
        let mut tx = self.ctx.pool().begin().await?;
        let row = lock_and_fetch(&mut *tx, aop_id).await?;
        let from = row.state()?;

        if target == AopState::Active {
            if let Some(active) = AopRepo::find_active(&mut *tx).await? {
                if active.id != aop_id.0 {
                    return Err(BusinessError::Conflict(format!(
                        "{} is already active",
                        AopId(active.id)
                    )));
                }
            }

            let approved = parse_amount(&row.total_approved_amount)?;
            let committed = committed_total_checked(&mut *tx, aop_id).await?;
            if committed.map_or(true, |c| c > approved) {
                return Err(BusinessError::CeilingExceeded {
                    aop_id,
                    committed: committed.unwrap_or(Decimal::MAX),
                    requested: Decimal::ZERO,
                    approved,
                });
            }
        }

        AopRepo::update_state(&mut *tx, aop_id, target)
            .await
            .map_err(|e| match e {
                PersistenceError::UniqueViolation(_) => {
                    BusinessError::Conflict("another AOP is already active".to_string())
                }
                other => other.into(),
            })?;
        tx.commit().await?;

        info!(aop_id = %aop_id, from = %from, to = %target, "AOP transitioned");
        self.ctx.record(&Event::aop_transitioned(
            &self.ctx.next_event_id(),
            aop_id,
            from,
            target,
        ));

        Ok(())
    }

    /// Delete an AOP. Details, budgets and their purchase records go with it.
    pub async fn delete(&self, aop_id: AopId) -> BusinessResult<()> {
        AopRepo::delete(self.ctx.pool(), aop_id).await?;

        info!(aop_id = %aop_id, "AOP deleted");
        self.ctx.record(&Event::new(self.ctx.next_event_id(), EventType::AopDeleted).with_aop(aop_id));

        Ok(())
    }

    pub async fn get(&self, aop_id: AopId) -> BusinessResult<Aop> {
        let row = AopRepo::get(self.ctx.pool(), aop_id)
            .await?
            .ok_or_else(|| BusinessError::not_found(aop_id))?;
        self.hydrate(row).await
    }

    pub async fn list(&self) -> BusinessResult<Vec<Aop>> {
        let rows = AopRepo::get_all(self.ctx.pool()).await?;
        let mut aops = Vec::with_capacity(rows.len());
        for row in rows {
            aops.push(self.hydrate(row).await?);
        }
        Ok(aops)
    }

    pub async fn active_aop(&self) -> BusinessResult<Option<Aop>> {
        match AopRepo::find_active(self.ctx.pool()).await? {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    /// First AOP whose name contains `fragment`
    pub async fn find_by_name(&self, fragment: &str) -> BusinessResult<Option<Aop>> {
        match AopRepo::find_by_name(self.ctx.pool(), fragment).await? {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    async fn hydrate(&self, row: AopRow) -> BusinessResult<Aop> {
        let details = AopDetailRepo::get_by_aop(self.ctx.pool(), AopId(row.id)).await?;
        Ok(row.into_aop(details)?)
    }
}

/// Take the AOP write lock inside `tx` and read the row under it
pub(crate) async fn lock_and_fetch(tx: &mut SqliteConnection, aop_id: AopId) -> BusinessResult<AopRow> {
    if !AopRepo::lock(&mut *tx, aop_id).await? {
        return Err(BusinessError::not_found(aop_id));
    }
    AopRepo::get(&mut *tx, aop_id)
        .await?
        .ok_or_else(|| BusinessError::not_found(aop_id))
}
