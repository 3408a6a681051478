//! Cost center commands

use anyhow::{Context, Result};
use budgetgov_business::{CostCenterService, ServiceContext};
use budgetgov_core::CostCenterId;

use crate::CostCenterAction;

/// Handle cost-center subcommands
pub async fn handle(ctx: &ServiceContext, action: CostCenterAction) -> Result<()> {
    let service = CostCenterService::new(ctx);

    match action {
        CostCenterAction::Create { code, name } => {
            let id = service
                .create(&code, &name)
                .await
                .with_context(|| format!("Failed to create cost center '{}'", code))?;
            println!("✅ Cost center {} created ({})", code, id);
        }

        CostCenterAction::List => {
            let centers = service.list().await?;
            if centers.is_empty() {
                println!("No cost centers found.");
                return Ok(());
            }
            for center in &centers {
                println!("   {:<8} {}", center.id.get(), center);
            }
        }

        CostCenterAction::Update { id, code, name } => {
            let id = CostCenterId(id);
            service
                .update(id, code.as_deref(), name.as_deref())
                .await
                .with_context(|| format!("Failed to update {}", id))?;
            println!("✅ {} updated", id);
        }

        CostCenterAction::Delete { id } => {
            let id = CostCenterId(id);
            service
                .delete(id)
                .await
                .with_context(|| format!("Failed to delete {}", id))?;
            println!("🗑️  {} deleted", id);
        }
    }

    Ok(())
}
