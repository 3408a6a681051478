//! Report exporters - CSV, JSON, Markdown

use std::fmt;

/// Renders a report into one output format
pub trait ReportExporter {
    fn export(&self, report: &dyn ReportData) -> String;

    /// File extension for this format, without the dot
    fn extension(&self) -> &'static str;
}

/// Tabular report content
pub trait ReportData {
    fn title(&self) -> &str;

    fn headers(&self) -> Vec<String>;

    fn rows(&self) -> Vec<Vec<String>>;

    /// Key/value lines shown above the table
    fn summary(&self) -> Vec<(String, String)>;
}

/// Output format selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    Csv,
    Json,
    #[default]
    Markdown,
}

impl ExportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            "md" | "markdown" => Some(Self::Markdown),
            _ => None,
        }
    }

    pub fn exporter(&self) -> Box<dyn ReportExporter> {
        match self {
            Self::Csv => Box::new(CsvExporter::new()),
            Self::Json => Box::new(JsonExporter::new()),
            Self::Markdown => Box::new(MarkdownExporter::new()),
        }
    }

    pub fn export(&self, report: &dyn ReportData) -> String {
        self.exporter().export(report)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Markdown => "markdown",
        };
        write!(f, "{}", name)
    }
}

// ============================================================================
// CSV Exporter
// ============================================================================

/// CSV exporter. Only the table is written; the summary is dropped.
pub struct CsvExporter {
    delimiter: char,
    include_header: bool,
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self {
            delimiter: ',',
            include_header: true,
        }
    }
}

impl CsvExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn without_header(mut self) -> Self {
        self.include_header = false;
        self
    }

    fn field(&self, raw: &str) -> String {
        let needs_quotes = raw.contains(self.delimiter)
            || raw.contains('"')
            || raw.contains('\n')
            || raw.contains('\r');
        if needs_quotes {
            format!("\"{}\"", raw.replace('"', "\"\""))
        } else {
            raw.to_string()
        }
    }

    fn line(&self, cells: &[String]) -> String {
        let sep = self.delimiter.to_string();
        let mut line = cells
            .iter()
            .map(|c| self.field(c))
            .collect::<Vec<_>>()
            .join(&sep);
        line.push('\n');
        line
    }
}

impl ReportExporter for CsvExporter {
    fn export(&self, report: &dyn ReportData) -> String {
        let mut output = String::new();
        if self.include_header {
            output.push_str(&self.line(&report.headers()));
        }
        for row in report.rows() {
            output.push_str(&self.line(&row));
        }
        output
    }

    fn extension(&self) -> &'static str {
        "csv"
    }
}

// ============================================================================
// JSON Exporter
// ============================================================================

/// JSON exporter: `{ title, summary: {..}, data: [ {header: cell} ] }`
pub struct JsonExporter {
    pretty: bool,
}

impl Default for JsonExporter {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl JsonExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compact(mut self) -> Self {
        self.pretty = false;
        self
    }
}

impl ReportExporter for JsonExporter {
    fn export(&self, report: &dyn ReportData) -> String {
        use serde_json::{Map, Value};

        let headers = report.headers();
        let data: Vec<Value> = report
            .rows()
            .into_iter()
            .map(|row| {
                let obj: Map<String, Value> = headers
                    .iter()
                    .cloned()
                    .zip(row.into_iter().map(Value::String))
                    .collect();
                Value::Object(obj)
            })
            .collect();

        let summary: Map<String, Value> = report
            .summary()
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();

        let output = serde_json::json!({
            "title": report.title(),
            "summary": summary,
            "data": data,
        });

        // Serializing a Value built from strings cannot fail
        if self.pretty {
            serde_json::to_string_pretty(&output).unwrap_or_default()
        } else {
            serde_json::to_string(&output).unwrap_or_default()
        }
    }

    fn extension(&self) -> &'static str {
        "json"
    }
}

// ============================================================================
// Markdown Exporter
// ============================================================================

/// Markdown exporter: title, summary bullets, table
pub struct MarkdownExporter {
    include_summary: bool,
}

impl Default for MarkdownExporter {
    fn default() -> Self {
        Self {
            include_summary: true,
        }
    }
}

impl MarkdownExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_summary(mut self) -> Self {
        self.include_summary = false;
        self
    }

    fn row(cells: &[String]) -> String {
        let escaped: Vec<String> = cells.iter().map(|c| c.replace('|', "\\|")).collect();
        format!("| {} |\n", escaped.join(" | "))
    }
}

impl ReportExporter for MarkdownExporter {
    fn export(&self, report: &dyn ReportData) -> String {
        let mut output = format!("# {}\n\n", report.title());

        if self.include_summary {
            for (key, value) in report.summary() {
                output.push_str(&format!("- **{}**: {}\n", key, value));
            }
            output.push('\n');
        }

        let headers = report.headers();
        let rows = report.rows();
        if rows.is_empty() {
            output.push_str("_No rows._\n");
            return output;
        }

        output.push_str(&Self::row(&headers));
        output.push_str(&format!(
            "|{}\n",
            headers.iter().map(|_| " --- |").collect::<String>()
        ));
        for row in rows {
            output.push_str(&Self::row(&row));
        }

        output
    }

    fn extension(&self) -> &'static str {
        "md"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        rows: Vec<Vec<String>>,
    }

    impl ReportData for Fixture {
        fn title(&self) -> &str {
            "Fixture"
        }

        fn headers(&self) -> Vec<String> {
            vec!["Budget".to_string(), "Project".to_string(), "Amount".to_string()]
        }

        fn rows(&self) -> Vec<Vec<String>> {
            self.rows.clone()
        }

        fn summary(&self) -> Vec<(String, String)> {
            vec![("Status".to_string(), "reconciled".to_string())]
        }
    }

    fn fixture() -> Fixture {
        Fixture {
            rows: vec![
                vec!["BUDGET#1".into(), "Infra".into(), "400".into()],
                vec!["BUDGET#2".into(), "Tools, misc \"extra\"".into(), "300".into()],
            ],
        }
    }

    #[test]
    fn test_csv_exporter() {
        let output = CsvExporter::new().export(&fixture());
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[0], "Budget,Project,Amount");
        assert_eq!(lines[1], "BUDGET#1,Infra,400");
        assert_eq!(lines[2], "BUDGET#2,\"Tools, misc \"\"extra\"\"\",300");
    }

    #[test]
    fn test_csv_without_header_and_custom_delimiter() {
        let output = CsvExporter::new()
            .with_delimiter(';')
            .without_header()
            .export(&fixture());
        assert!(output.starts_with("BUDGET#1;Infra;400\n"));
    }

    #[test]
    fn test_json_exporter() {
        let output = JsonExporter::new().export(&fixture());
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["title"], "Fixture");
        assert_eq!(value["summary"]["Status"], "reconciled");
        assert_eq!(value["data"][1]["Amount"], "300");
    }

    #[test]
    fn test_json_compact() {
        let output = JsonExporter::new().compact().export(&fixture());
        assert!(!output.contains('\n'));
    }

    #[test]
    fn test_markdown_exporter() {
        let output = MarkdownExporter::new().export(&fixture());

        assert!(output.starts_with("# Fixture\n"));
        assert!(output.contains("- **Status**: reconciled"));
        assert!(output.contains("| Budget | Project | Amount |"));
        assert!(output.contains("| --- | --- | --- |"));
        assert!(output.contains("| BUDGET#1 | Infra | 400 |"));
    }

    #[test]
    fn test_markdown_empty_table() {
        let output = MarkdownExporter::new()
            .without_summary()
            .export(&Fixture { rows: Vec::new() });
        assert!(output.contains("_No rows._"));
        assert!(!output.contains("Status"));
    }

    #[test]
    fn test_format_selection() {
        assert_eq!(ExportFormat::from_str("JSON"), Some(ExportFormat::Json));
        assert_eq!(ExportFormat::from_str("md"), Some(ExportFormat::Markdown));
        assert_eq!(ExportFormat::from_str("xlsx"), None);
        assert_eq!(ExportFormat::Csv.exporter().extension(), "csv");
        assert_eq!(ExportFormat::default().to_string(), "markdown");
    }
}
