//! Governance reports: reconciliation, AOP budget chart, journal listing

use budgetgov_business::Discrepancy;
use budgetgov_core::{money, Aop, Budget, CoreResult, Event};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::exporters::ReportData;

// ============================================================================
// Reconciliation Report
// ============================================================================

/// Result of a reconciliation sweep
#[derive(Debug, Clone)]
pub struct ReconciliationReport {
    pub title: String,
    pub discrepancies: Vec<Discrepancy>,
    pub generated_at: DateTime<Utc>,
}

impl ReconciliationReport {
    pub fn new(discrepancies: Vec<Discrepancy>) -> Self {
        Self {
            title: "Reconciliation Report".to_string(),
            discrepancies,
            generated_at: Utc::now(),
        }
    }

    /// `reconciled` when no AOP is over its ceiling, `issues` otherwise
    pub fn status(&self) -> &'static str {
        if self.discrepancies.is_empty() {
            "reconciled"
        } else {
            "issues"
        }
    }

    /// Fails when the overages add up past the largest representable amount
    pub fn total_overage(&self) -> CoreResult<Decimal> {
        money::sum(self.discrepancies.iter().map(|d| d.overage()))
    }
}

impl ReportData for ReconciliationReport {
    fn title(&self) -> &str {
        &self.title
    }

    fn headers(&self) -> Vec<String> {
        ["AOP", "Name", "Committed", "Approved", "Overage"]
            .iter()
            .map(|h| h.to_string())
            .collect()
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.discrepancies
            .iter()
            .map(|d| {
                vec![
                    d.aop_id.to_string(),
                    d.aop_name.clone(),
                    if d.committed_overflow {
                        format!(">{}", d.committed_total)
                    } else {
                        d.committed_total.to_string()
                    },
                    d.approved_total.to_string(),
                    d.overage().to_string(),
                ]
            })
            .collect()
    }

    fn summary(&self) -> Vec<(String, String)> {
        vec![
            ("Status".to_string(), self.status().to_string()),
            (
                "AOPs Over Ceiling".to_string(),
                self.discrepancies.len().to_string(),
            ),
            (
                "Total Overage".to_string(),
                match self.total_overage() {
                    Ok(total) => total.to_string(),
                    Err(e) => e.to_string(),
                },
            ),
            ("Generated At".to_string(), self.generated_at.to_rfc3339()),
        ]
    }
}

// ============================================================================
// Budget Chart Report
// ============================================================================

/// Largest committed budgets of one AOP against its ceiling
#[derive(Debug, Clone)]
pub struct BudgetChartReport {
    pub title: String,
    pub approved: Decimal,
    pub committed: Decimal,
    pub budgets: Vec<Budget>,
}

impl BudgetChartReport {
    /// `budgets` are shown in the order given
    pub fn new(aop: &Aop, committed: Decimal, budgets: Vec<Budget>) -> Self {
        Self {
            title: format!("Budget Chart - {} ({})", aop.name, aop.id),
            approved: aop.total_approved_amount,
            committed,
            budgets,
        }
    }

    pub fn remaining(&self) -> Decimal {
        self.approved - self.committed
    }

    /// Share of the approved total, in percent with one decimal
    fn share(&self, amount: Decimal) -> String {
        if self.approved.is_zero() {
            return "-".to_string();
        }
        format!("{:.1}%", amount * Decimal::ONE_HUNDRED / self.approved)
    }
}

impl ReportData for BudgetChartReport {
    fn title(&self) -> &str {
        &self.title
    }

    fn headers(&self) -> Vec<String> {
        ["Budget", "Project", "Employee", "Amount", "Share"]
            .iter()
            .map(|h| h.to_string())
            .collect()
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.budgets
            .iter()
            .map(|b| {
                vec![
                    b.id.to_string(),
                    b.project.clone(),
                    b.employee_id.to_string(),
                    b.amount.to_string(),
                    self.share(b.amount),
                ]
            })
            .collect()
    }

    fn summary(&self) -> Vec<(String, String)> {
        vec![
            ("Approved".to_string(), self.approved.to_string()),
            ("Committed".to_string(), self.committed.to_string()),
            ("Remaining".to_string(), self.remaining().to_string()),
        ]
    }
}

// ============================================================================
// Journal Report
// ============================================================================

/// Flat listing of journal events
#[derive(Debug, Clone)]
pub struct JournalReport {
    pub title: String,
    pub events: Vec<Event>,
}

impl JournalReport {
    pub fn from_events(title: &str, events: Vec<Event>) -> Self {
        Self {
            title: title.to_string(),
            events,
        }
    }
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl ReportData for JournalReport {
    fn title(&self) -> &str {
        &self.title
    }

    fn headers(&self) -> Vec<String> {
        [
            "ID",
            "Timestamp",
            "Type",
            "AOP",
            "Budget",
            "Employee",
            "Amount",
            "Previous",
            "Description",
        ]
        .iter()
        .map(|h| h.to_string())
        .collect()
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.events
            .iter()
            .map(|e| {
                vec![
                    e.event_id.clone(),
                    e.timestamp.to_rfc3339(),
                    e.event_type.to_string(),
                    opt(e.aop_id),
                    opt(e.budget_id),
                    opt(e.employee_id),
                    opt(e.amount),
                    opt(e.previous_amount),
                    e.description.clone().unwrap_or_default(),
                ]
            })
            .collect()
    }

    fn summary(&self) -> Vec<(String, String)> {
        let first = self.events.first().map(|e| e.timestamp.to_rfc3339());
        let last = self.events.last().map(|e| e.timestamp.to_rfc3339());
        vec![
            ("Events".to_string(), self.events.len().to_string()),
            ("From".to_string(), first.unwrap_or_default()),
            ("To".to_string(), last.unwrap_or_default()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exporters::{CsvExporter, JsonExporter, MarkdownExporter, ReportExporter};
    use budgetgov_core::{AopId, AopState, BudgetId, BudgetState, EmployeeId, EventType};
    use rust_decimal_macros::dec;

    fn discrepancy() -> Discrepancy {
        Discrepancy {
            aop_id: AopId(1),
            aop_name: "FY27".to_string(),
            committed_total: dec!(1200),
            approved_total: dec!(1000),
            committed_overflow: false,
        }
    }

    fn budget(id: i64, project: &str, amount: Decimal) -> Budget {
        Budget {
            id: BudgetId(id),
            aop_id: AopId(1),
            employee_id: EmployeeId(2),
            project: project.to_string(),
            description: String::new(),
            amount,
            state: BudgetState::Active,
            soft_deleted: false,
        }
    }

    #[test]
    fn test_reconciled_status() {
        let report = ReconciliationReport::new(Vec::new());
        assert_eq!(report.status(), "reconciled");
        assert_eq!(report.total_overage().unwrap(), Decimal::ZERO);

        let output = JsonExporter::new().export(&report);
        assert!(output.contains("\"Status\": \"reconciled\""));
    }

    #[test]
    fn test_issues_report() {
        let report = ReconciliationReport::new(vec![discrepancy()]);
        assert_eq!(report.status(), "issues");
        assert_eq!(report.total_overage().unwrap(), dec!(200));

        let csv = CsvExporter::new().export(&report);
        assert!(csv.contains("AOP,Name,Committed,Approved,Overage"));
        assert!(csv.contains("AOP#1,FY27,1200,1000,200"));
    }

    #[test]
    fn test_overflowed_committed_total() {
        let overflowed = Discrepancy {
            aop_id: AopId(2),
            aop_name: "FY28".to_string(),
            committed_total: Decimal::MAX,
            approved_total: Decimal::ZERO,
            committed_overflow: true,
        };
        let report = ReconciliationReport::new(vec![discrepancy(), overflowed]);
        assert_eq!(report.status(), "issues");
        assert!(report.total_overage().is_err());

        let rows = report.rows();
        assert_eq!(rows[1][2], format!(">{}", Decimal::MAX));

        let summary = report.summary();
        assert_eq!(summary[2].0, "Total Overage");
        assert!(summary[2].1.contains("overflow"));
    }

    #[test]
    fn test_budget_chart() {
        let aop = Aop {
            id: AopId(1),
            name: "FY27".to_string(),
            total_approved_amount: dec!(1000),
            state: AopState::Active,
            details: Vec::new(),
        };
        let report = BudgetChartReport::new(
            &aop,
            dec!(700),
            vec![budget(2, "Infra", dec!(400)), budget(3, "Tools", dec!(300))],
        );

        assert_eq!(report.remaining(), dec!(300));
        let rows = report.rows();
        assert_eq!(rows[0][4], "40.0%");
        assert_eq!(rows[1][0], "BUDGET#3");

        let md = MarkdownExporter::new().export(&report);
        assert!(md.contains("# Budget Chart - FY27 (AOP#1)"));
        assert!(md.contains("- **Remaining**: 300"));
    }

    #[test]
    fn test_budget_chart_zero_ceiling() {
        let aop = Aop {
            id: AopId(1),
            name: "Empty".to_string(),
            total_approved_amount: Decimal::ZERO,
            state: AopState::Draft,
            details: Vec::new(),
        };
        let report = BudgetChartReport::new(&aop, Decimal::ZERO, vec![budget(1, "X", Decimal::ZERO)]);
        assert_eq!(report.rows()[0][4], "-");
    }

    #[test]
    fn test_journal_report() {
        let events = vec![
            Event::budget_created("EVT_000001", AopId(1), BudgetId(1), dec!(400)),
            Event::new("EVT_000002".to_string(), EventType::BudgetReduced)
                .with_budget(BudgetId(1))
                .with_amount(dec!(300))
                .with_previous_amount(dec!(400)),
        ];
        let report = JournalReport::from_events("Journal", events);

        let rows = report.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][2], "budget_created");
        assert_eq!(rows[1][3], "");
        assert_eq!(rows[1][7], "400");
        assert_eq!(report.summary()[0].1, "2");
    }
}
