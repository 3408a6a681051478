//! # Budgetgov Reports
//!
//! Governance reports and their CSV / JSON / Markdown exporters.
//!
//! - [`ReconciliationReport`] - AOPs over their approved ceiling
//! - [`BudgetChartReport`] - largest committed budgets of an AOP
//! - [`JournalReport`] - governance journal listing
//!
//! ```rust,ignore
//! use budgetgov_reports::{ExportFormat, ReconciliationReport};
//!
//! let report = ReconciliationReport::new(auditor.reconcile().await?);
//! println!("{}", ExportFormat::Csv.export(&report));
//! ```

pub mod exporters;
pub mod governance;

pub use exporters::{
    CsvExporter, ExportFormat, JsonExporter, MarkdownExporter, ReportData, ReportExporter,
};
pub use governance::{BudgetChartReport, JournalReport, ReconciliationReport};
