//! Cost center registry
//!
//! Reference data only. Employees and AOP details carry cost-center codes as
//! free text, so removing a cost center touches nothing else.

use crate::error::BusinessResult;
use crate::services::ServiceContext;
use budgetgov_core::{CostCenter, CostCenterId};
use budgetgov_persistence::CostCenterRepo;
use tracing::info;

pub struct CostCenterService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> CostCenterService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    pub async fn create(&self, code: &str, name: &str) -> BusinessResult<CostCenterId> {
        CostCenter::validate_fields(code, name)?;
        let id = CostCenterRepo::insert(self.ctx.pool(), code.trim(), name.trim()).await?;
        info!(cost_center = %id, code, "cost center created");
        Ok(id)
    }

    pub async fn update(
        &self,
        id: CostCenterId,
        code: Option<&str>,
        name: Option<&str>,
    ) -> BusinessResult<()> {
        let current = CostCenterRepo::get(self.ctx.pool(), id).await?;
        let code = code.map(str::trim).unwrap_or(current.code.as_str());
        let name = name.map(str::trim).unwrap_or(current.name.as_str());
        CostCenter::validate_fields(code, name)?;

        CostCenterRepo::update(self.ctx.pool(), id, code, name).await?;
        info!(cost_center = %id, code, "cost center updated");
        Ok(())
    }

    pub async fn delete(&self, id: CostCenterId) -> BusinessResult<()> {
        CostCenterRepo::delete(self.ctx.pool(), id).await?;
        info!(cost_center = %id, "cost center deleted");
        Ok(())
    }

    pub async fn list(&self) -> BusinessResult<Vec<CostCenter>> {
        let rows = CostCenterRepo::get_all(self.ctx.pool()).await?;
        Ok(rows.into_iter().map(CostCenter::from).collect())
    }
}
