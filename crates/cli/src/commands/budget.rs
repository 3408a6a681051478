//! Budget commands

use anyhow::{Context, Result};
use budgetgov_business::{AopService, BudgetService, Ledger, ServiceContext};
use budgetgov_core::{AopId, BudgetId, BudgetPatch, EmployeeId, NewBudget};
use budgetgov_persistence::BudgetQuery;
use budgetgov_reports::BudgetChartReport;

use super::aop::truncate;
use crate::BudgetAction;

/// Handle budget subcommands
pub async fn handle(ctx: &ServiceContext, action: BudgetAction) -> Result<()> {
    let service = BudgetService::new(ctx);

    match action {
        BudgetAction::Create {
            aop,
            employee,
            project,
            amount,
            description,
        } => {
            let new = NewBudget::new(AopId(aop), EmployeeId(employee), &project, amount)
                .with_description(&description);
            let budget_id = service
                .create(new)
                .await
                .context("Failed to create budget")?;
            let committed = Ledger::new(ctx).committed_total(AopId(aop)).await?;

            println!("✅ Budget created!");
            println!("   ID:        {}", budget_id);
            println!("   AOP:       {}", AopId(aop));
            println!("   Amount:    {}", amount);
            println!("   Committed: {}", committed);
        }

        BudgetAction::List {
            aop,
            employee,
            include_deleted,
        } => {
            let mut query = BudgetQuery::new();
            if let Some(aop) = aop {
                query = query.aop(AopId(aop));
            }
            if let Some(employee) = employee {
                query = query.employee(EmployeeId(employee));
            }
            if include_deleted {
                query = query.include_deleted();
            }

            let budgets = service.list(&query).await?;
            if budgets.is_empty() {
                println!("No budgets found.");
                return Ok(());
            }

            println!(
                "{:<12} {:<8} {:<10} {:<24} {:>14} {:<9}",
                "ID", "AOP", "EMPLOYEE", "PROJECT", "AMOUNT", "STATE"
            );
            println!("{}", "-".repeat(82));
            for budget in &budgets {
                let state = if budget.soft_deleted {
                    format!("{} (deleted)", budget.state)
                } else {
                    budget.state.to_string()
                };
                println!(
                    "{:<12} {:<8} {:<10} {:<24} {:>14} {:<9}",
                    budget.id.to_string(),
                    budget.aop_id.to_string(),
                    budget.employee_id.to_string(),
                    truncate(&budget.project, 24),
                    budget.amount,
                    state
                );
            }
        }

        BudgetAction::Copy { budget_id, to } => {
            let source = BudgetId(budget_id);
            let copy = service
                .copy(source, AopId(to))
                .await
                .with_context(|| format!("Failed to copy {}", source))?;
            println!("✅ {} copied to {} as {}", source, AopId(to), copy);
        }

        BudgetAction::Update {
            budget_id,
            project,
            description,
            amount,
        } => {
            let mut patch = BudgetPatch::new();
            if let Some(project) = &project {
                patch = patch.project(project);
            }
            if let Some(description) = &description {
                patch = patch.description(description);
            }
            if let Some(amount) = amount {
                patch = patch.amount(amount);
            }

            let budget_id = BudgetId(budget_id);
            service
                .update(budget_id, patch)
                .await
                .with_context(|| format!("Failed to update {}", budget_id))?;
            println!("✅ {} updated", budget_id);
        }

        BudgetAction::Reduce { budget_id, amount } => {
            let budget_id = BudgetId(budget_id);
            let before = service.get(budget_id).await?;
            service
                .reduce(budget_id, amount)
                .await
                .with_context(|| format!("Failed to reduce {}", budget_id))?;
            println!("✅ {} set to {} (was {})", budget_id, amount, before.amount);
        }

        BudgetAction::Delete { budget_id } => {
            let budget_id = BudgetId(budget_id);
            service
                .soft_delete(budget_id)
                .await
                .with_context(|| format!("Failed to delete {}", budget_id))?;
            println!("🗑️  {} soft-deleted", budget_id);
        }

        BudgetAction::Chart {
            aop_id,
            top,
            format,
        } => {
            let aop = AopService::new(ctx).get(AopId(aop_id)).await?;
            let committed = Ledger::new(ctx).committed_total(aop.id).await?;
            let budgets = service.top_active(aop.id, top).await?;

            let report = BudgetChartReport::new(&aop, committed, budgets);
            println!("{}", format.to_export_format().export(&report));
        }
    }

    Ok(())
}
