//! Reconciliation and journal commands

use anyhow::{bail, Context, Result};
use budgetgov_business::{ReconciliationAuditor, ServiceContext};
use budgetgov_core::{parse_date, AopId, BudgetId, EmployeeId, EventType};
use budgetgov_persistence::{EventFilter, EventReader};
use budgetgov_reports::{JournalReport, ReconciliationReport};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::{JournalArgs, ReportFormat};

/// Run the reconciliation sweep and print or save the report
pub async fn reconcile(
    ctx: &ServiceContext,
    format: ReportFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    let discrepancies = ReconciliationAuditor::new(ctx)
        .reconcile()
        .await
        .context("Reconciliation failed")?;
    let report = ReconciliationReport::new(discrepancies);
    if report.discrepancies.is_empty() {
        info!("reconciled: no AOP over its ceiling");
    } else {
        warn!(issues = report.discrepancies.len(), "AOPs over their ceiling");
    }
    let content = format.to_export_format().export(&report);

    match output {
        Some(path) => {
            fs::write(&path, &content).context("Failed to write report file")?;
            println!("✅ Report generated: {:?} ({})", path, report.status());
        }
        None => {
            println!("{}", content);
        }
    }

    Ok(())
}

/// Print journal events matching the given filters
pub fn journal(events_dir: &Path, args: JournalArgs) -> Result<()> {
    let reader = EventReader::new(events_dir);
    let events = match (&args.from, &args.to) {
        (Some(from), Some(to)) => reader.read_range(from, to)?,
        (Some(from), None) => {
            let today = Utc::now().format("%Y-%m-%d").to_string();
            reader.read_range(from, &today)?
        }
        (None, Some(to)) => {
            let last = parse_date(to)?;
            let mut events = reader.read_all()?;
            events.retain(|e| e.timestamp.date_naive() <= last);
            events
        }
        (None, None) => reader.read_all()?,
    };

    let mut filter = EventFilter::new();
    if let Some(aop) = args.aop {
        filter = filter.aop(AopId(aop));
    }
    if let Some(budget) = args.budget {
        filter = filter.budget(BudgetId(budget));
    }
    if let Some(employee) = args.employee {
        filter = filter.employee(EmployeeId(employee));
    }
    if let Some(types) = &args.types {
        filter = filter.event_types(parse_event_types(types)?);
    }
    let events = filter.apply(events);
    debug!(events = events.len(), "journal events selected");

    if events.is_empty() {
        println!("No events found matching criteria.");
        return Ok(());
    }

    let report = JournalReport::from_events("Governance Journal", events);
    println!("{}", args.format.to_export_format().export(&report));
    Ok(())
}

fn parse_event_types(raw: &[String]) -> Result<Vec<EventType>> {
    let mut types = Vec::with_capacity(raw.len());
    for name in raw {
        match EventType::from_str(name) {
            Some(t) => types.push(t),
            None => bail!("Unknown event type '{}'", name),
        }
    }
    Ok(types)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_event_types() {
        let types =
            parse_event_types(&["budget_created".to_string(), "AOP_TRANSITIONED".to_string()])
                .unwrap();
        assert_eq!(types, vec![EventType::BudgetCreated, EventType::AopTransitioned]);

        assert!(parse_event_types(&["budget_approved".to_string()]).is_err());
    }
}
