//! Purchase log commands

use anyhow::{Context, Result};
use budgetgov_business::{PurchaseService, ServiceContext};
use budgetgov_core::{parse_date, BudgetId, NewPurchaseOrder, NewPurchaseRequest, NewReceipt};
use chrono::NaiveDate;

use crate::PurchaseAction;

/// Handle purchase subcommands
pub async fn handle(ctx: &ServiceContext, action: PurchaseAction) -> Result<()> {
    let service = PurchaseService::new(ctx);

    match action {
        PurchaseAction::Request {
            reference,
            requestor,
            budget,
            amount,
            date,
        } => {
            let request = NewPurchaseRequest {
                reference,
                requestor_ldap: requestor,
                budget_id: BudgetId(budget),
                amount,
                date: optional_date(date)?,
            };
            let id = service
                .record_request(request)
                .await
                .context("Failed to record purchase request")?;
            println!("✅ Purchase request #{} recorded against {}", id, BudgetId(budget));
        }

        PurchaseAction::Order {
            order_number,
            line,
            requestor,
            budget,
            item,
            amount,
            date,
        } => {
            let order = NewPurchaseOrder {
                order_number: order_number.clone(),
                line_number: line,
                requestor_ldap: requestor,
                budget_id: BudgetId(budget),
                item,
                amount,
                date: optional_date(date)?,
            };
            let id = service
                .record_order(order)
                .await
                .context("Failed to record purchase order")?;
            println!("✅ Order {} line {} recorded (#{})", order_number, line, id);
        }

        PurchaseAction::Receipt {
            order_number,
            line,
            item,
            date,
        } => {
            let receipt = NewReceipt {
                receipt_date: optional_date(date)?,
                order_number: order_number.clone(),
                line_number: line,
                item,
            };
            let id = service
                .record_receipt(receipt)
                .await
                .context("Failed to record receipt")?;
            println!("✅ Receipt #{} recorded for {} line {}", id, order_number, line);
        }

        PurchaseAction::List { budget } => {
            let budget_id = BudgetId(budget);
            let requests = service.requests_for_budget(budget_id).await?;
            let orders = service.orders_for_budget(budget_id).await?;

            println!("🧾 Purchases against {}", budget_id);
            println!();
            println!("{:<12} {:<16} {:<14} {:>14}", "DATE", "REFERENCE", "REQUESTOR", "AMOUNT");
            for pr in &requests {
                println!(
                    "{:<12} {:<16} {:<14} {:>14}",
                    pr.date.to_string(),
                    pr.reference, pr.requestor_ldap, pr.amount
                );
            }
            println!();
            println!(
                "{:<12} {:<16} {:>5} {:<20} {:>14} {:>9}",
                "DATE", "ORDER", "LINE", "ITEM", "AMOUNT", "RECEIPTS"
            );
            for po in &orders {
                let received = service
                    .receipts_for_order(&po.order_number)
                    .await?
                    .iter()
                    .filter(|r| r.line_number == po.line_number)
                    .count();
                println!(
                    "{:<12} {:<16} {:>5} {:<20} {:>14} {:>9}",
                    po.date.to_string(),
                    po.order_number, po.line_number, po.item, po.amount, received
                );
            }
        }
    }

    Ok(())
}

fn optional_date(raw: Option<String>) -> Result<Option<NaiveDate>> {
    raw.map(|d| parse_date(&d)).transpose().map_err(Into::into)
}
