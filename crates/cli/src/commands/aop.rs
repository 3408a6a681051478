//! AOP commands

use anyhow::{Context, Result};
use budgetgov_business::{AopService, Ledger, ServiceContext};
use budgetgov_core::{Aop, AopId, AopPatch, NewAop, NewAopDetail};

use crate::{AopAction, DetailArg};

/// Handle aop subcommands
pub async fn handle(ctx: &ServiceContext, action: AopAction) -> Result<()> {
    let service = AopService::new(ctx);

    match action {
        AopAction::Create {
            name,
            total,
            details,
        } => {
            let mut new = NewAop::new(&name, total);
            for detail in &details {
                new = new.with_detail(&detail.code, detail.amount);
            }
            let aop_id = service.create(new).await.context("Failed to create AOP")?;

            println!("✅ AOP created!");
            println!("   ID:       {}", aop_id);
            println!("   Name:     {}", name);
            println!("   Approved: {}", total);
            println!("   State:    Draft");
        }

        AopAction::List => {
            let aops = service.list().await?;
            if aops.is_empty() {
                println!("No AOPs found.");
                return Ok(());
            }

            println!("{:<10} {:<24} {:>16} {:<8}", "ID", "NAME", "APPROVED", "STATE");
            println!("{}", "-".repeat(62));
            for aop in &aops {
                println!(
                    "{:<10} {:<24} {:>16} {:<8}",
                    aop.id.to_string(),
                    truncate(&aop.name, 24),
                    aop.total_approved_amount,
                    aop.state
                );
            }
        }

        AopAction::Show { aop } => {
            let aop = match aop.parse::<i64>() {
                Ok(id) => service.get(AopId(id)).await?,
                Err(_) => service
                    .find_by_name(&aop)
                    .await?
                    .with_context(|| format!("No AOP named like '{}'", aop))?,
            };
            let committed = Ledger::new(ctx).committed_total(aop.id).await?;
            print_aop(&aop, committed);
        }

        AopAction::Update {
            aop_id,
            name,
            total,
            details,
            clear_details,
        } => {
            let mut patch = AopPatch::new();
            if let Some(name) = &name {
                patch = patch.name(name);
            }
            if let Some(total) = total {
                patch = patch.total(total);
            }
            if clear_details || !details.is_empty() {
                patch = patch.details(to_details(&details));
            }

            let aop_id = AopId(aop_id);
            service
                .update(aop_id, patch)
                .await
                .with_context(|| format!("Failed to update {}", aop_id))?;
            println!("✅ {} updated", aop_id);
        }

        AopAction::Transition { aop_id, state } => {
            let aop_id = AopId(aop_id);
            let target = state.to_core_state();
            service
                .transition(aop_id, target)
                .await
                .with_context(|| format!("Failed to move {} to {}", aop_id, target))?;
            println!("✅ {} is now {}", aop_id, target);
        }

        AopAction::Delete { aop_id } => {
            let aop_id = AopId(aop_id);
            service
                .delete(aop_id)
                .await
                .with_context(|| format!("Failed to delete {}", aop_id))?;
            println!("🗑️  {} deleted with its details and budgets", aop_id);
        }
    }

    Ok(())
}

fn to_details(details: &[DetailArg]) -> Vec<NewAopDetail> {
    details
        .iter()
        .map(|d| NewAopDetail::new(&d.code, d.amount))
        .collect()
}

fn print_aop(aop: &Aop, committed: rust_decimal::Decimal) {
    println!("📋 {} - {}", aop.id, aop.name);
    println!("   State:     {}", aop.state);
    println!("   Approved:  {}", aop.total_approved_amount);
    println!("   Committed: {}", committed);
    println!("   Remaining: {}", aop.total_approved_amount - committed);

    if aop.details.is_empty() {
        return;
    }
    println!();
    println!("   {:<16} {:>16}", "COST CENTER", "ALLOCATED");
    for detail in &aop.details {
        println!(
            "   {:<16} {:>16}",
            detail.cost_center_code, detail.allocated_amount
        );
    }
    match aop.details_total() {
        Ok(total) => println!("   {:<16} {:>16}", "(total)", total),
        Err(e) => println!("   {:<16} {:>16}", "(total)", e),
    }
}

/// Truncate string for display
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
