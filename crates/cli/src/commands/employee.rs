//! Employee directory commands

use anyhow::{Context, Result};
use budgetgov_business::{BusinessError, EmployeeService, Ledger, ServiceContext};
use budgetgov_core::{Employee, EmployeeId, EmployeePatch, NewEmployee, OrgChart};
use std::collections::HashMap;

use crate::EmployeeAction;

/// Handle employee subcommands
pub async fn handle(ctx: &ServiceContext, action: EmployeeAction) -> Result<()> {
    let service = EmployeeService::new(ctx);

    match action {
        EmployeeAction::Create {
            ldap,
            first_name,
            last_name,
            email,
            level,
            cost_center,
            manager,
        } => {
            let mut new = NewEmployee::new(&ldap, &first_name, &last_name)
                .with_email(&email)
                .with_level(level)
                .with_cost_center(&cost_center);
            if let Some(manager) = manager {
                new = new.with_manager(EmployeeId(manager));
            }

            let employee_id = service
                .create(new)
                .await
                .with_context(|| format!("Failed to create employee '{}'", ldap))?;
            println!("✅ Employee created!");
            println!("   ID:   {}", employee_id);
            println!("   LDAP: {}", ldap);
        }

        EmployeeAction::List { all } => {
            let employees = service.list(!all).await?;
            if employees.is_empty() {
                println!("No employees found.");
                return Ok(());
            }

            println!(
                "{:<10} {:<14} {:<24} {:<10} {:>5} {:<10} {:<6}",
                "ID", "LDAP", "NAME", "COST CTR", "LEVEL", "MANAGER", "ACTIVE"
            );
            println!("{}", "-".repeat(86));
            for e in &employees {
                println!(
                    "{:<10} {:<14} {:<24} {:<10} {:>5} {:<10} {:<6}",
                    e.id.to_string(),
                    e.ldap,
                    e.full_name(),
                    e.cost_center_code,
                    e.level,
                    e.manager_id.map(|m| m.to_string()).unwrap_or_default(),
                    if e.active { "yes" } else { "no" }
                );
            }
        }

        EmployeeAction::Update {
            employee_id,
            first_name,
            last_name,
            email,
            level,
            cost_center,
            manager,
            clear_manager,
        } => {
            let manager_id = if clear_manager {
                Some(None)
            } else {
                manager.map(|m| Some(EmployeeId(m)))
            };
            let patch = EmployeePatch {
                first_name,
                last_name,
                email,
                level,
                cost_center_code: cost_center,
                manager_id,
            };

            let employee_id = EmployeeId(employee_id);
            service
                .update(employee_id, patch)
                .await
                .with_context(|| format!("Failed to update {}", employee_id))?;
            println!("✅ {} updated", employee_id);
        }

        EmployeeAction::Deactivate { employee } => {
            let target = match employee.parse::<i64>() {
                Ok(id) => service.get(EmployeeId(id)).await?,
                Err(_) => service
                    .get_by_ldap(&employee)
                    .await?
                    .with_context(|| format!("No employee with ldap '{}'", employee))?,
            };

            if let Err(err) = service.deactivate(target.id).await {
                if matches!(err, BusinessError::Dependency { .. }) {
                    let committed = Ledger::new(ctx).employee_committed_total(target.id).await?;
                    println!("❌ {} still owns committed budgets ({})", target, committed);
                }
                return Err(err).with_context(|| format!("Failed to deactivate {}", target.id));
            }
            println!("✅ {} deactivated", target);
        }

        EmployeeAction::Org => {
            let employees = service.list(false).await?;
            let chart = service.org_chart().await?;
            let by_id: HashMap<EmployeeId, &Employee> =
                employees.iter().map(|e| (e.id, e)).collect();

            println!("🏢 Reporting tree");
            for root in chart.roots() {
                print_tree(&chart, &by_id, *root, 0);
            }
        }
    }

    Ok(())
}

fn print_tree(
    chart: &OrgChart,
    by_id: &HashMap<EmployeeId, &Employee>,
    id: EmployeeId,
    depth: usize,
) {
    // Management cycles are not rejected on write
    if depth > by_id.len() {
        return;
    }
    let label = match by_id.get(&id) {
        Some(e) if e.active => e.to_string(),
        Some(e) => format!("{} [inactive]", e),
        None => id.to_string(),
    };
    println!("{}{}", "   ".repeat(depth + 1), label);
    for report in chart.direct_reports(id) {
        print_tree(chart, by_id, *report, depth + 1);
    }
}
