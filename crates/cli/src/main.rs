//! Budgetgov CLI - AOP and budget governance from the command line
//!
//! Usage:
//! ```bash
//! budgetgov init
//! budgetgov aop create --name FY27 --total 1000 --detail CC100=600
//! budgetgov aop transition 1 active
//! budgetgov budget create --aop 1 --employee 2 --project Infra 400
//! budgetgov reconcile --format csv
//! budgetgov journal --aop 1 --from 2026-10-01
//! ```

use anyhow::Result;
use budgetgov_core::AopState;
use budgetgov_persistence::{DatabaseConfig, DEFAULT_DATABASE_URL, DEFAULT_EVENTS_DIR};
use budgetgov_reports::ExportFormat;
use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

mod commands;
mod db;

use commands::{aop, audit, budget, cost_center, employee, purchase};

/// Budgetgov - annual operating plans, budgets and their ceilings
#[derive(Parser)]
#[command(name = "budgetgov")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// SQLite database URL
    #[arg(long, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_URL, global = true)]
    pub database_url: String,

    /// Journal directory path
    #[arg(long, env = "BUDGETGOV_EVENTS_DIR", default_value = DEFAULT_EVENTS_DIR, global = true)]
    pub events_dir: PathBuf,

    /// Milliseconds a writer waits for a competing writer
    #[arg(long, default_value_t = 5000, global = true)]
    pub busy_timeout_ms: u64,

    /// Connection pool size
    #[arg(long, default_value_t = 5, global = true)]
    pub max_connections: u32,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig::new(self.database_url.as_str())
            .with_busy_timeout(Duration::from_millis(self.busy_timeout_ms))
            .with_max_connections(self.max_connections)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database and apply migrations
    Init {
        /// Remove an existing database file first
        #[arg(long)]
        force: bool,
    },

    /// Show database status
    Status,

    /// Annual operating plans
    Aop {
        #[command(subcommand)]
        action: AopAction,
    },

    /// Budgets allocated against an AOP
    Budget {
        #[command(subcommand)]
        action: BudgetAction,
    },

    /// Employee directory
    Employee {
        #[command(subcommand)]
        action: EmployeeAction,
    },

    /// Cost center reference data
    CostCenter {
        #[command(subcommand)]
        action: CostCenterAction,
    },

    /// Purchase requests, orders and receipts
    Purchase {
        #[command(subcommand)]
        action: PurchaseAction,
    },

    /// Report AOPs whose committed budgets exceed the approved total
    Reconcile {
        #[arg(long, default_value = "markdown")]
        format: ReportFormat,
        /// Output file path
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Read the governance journal
    Journal(JournalArgs),
}

impl Commands {
    /// Subcommand name as typed on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Init { .. } => "init",
            Commands::Status => "status",
            Commands::Aop { .. } => "aop",
            Commands::Budget { .. } => "budget",
            Commands::Employee { .. } => "employee",
            Commands::CostCenter { .. } => "cost-center",
            Commands::Purchase { .. } => "purchase",
            Commands::Reconcile { .. } => "reconcile",
            Commands::Journal(_) => "journal",
        }
    }
}

#[derive(Args)]
pub struct JournalArgs {
    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,
    /// End date (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,
    #[arg(long)]
    pub aop: Option<i64>,
    #[arg(long)]
    pub budget: Option<i64>,
    #[arg(long)]
    pub employee: Option<i64>,
    /// Event types to keep (comma-separated, e.g. budget_created,aop_transitioned)
    #[arg(long = "type", value_delimiter = ',')]
    pub types: Option<Vec<String>>,
    #[arg(long, default_value = "markdown")]
    pub format: ReportFormat,
}

#[derive(Subcommand)]
pub enum AopAction {
    /// Create a Draft AOP
    Create {
        #[arg(long, short)]
        name: String,
        /// Approved ceiling
        #[arg(long, short)]
        total: Decimal,
        /// Cost-center line, CODE=AMOUNT (repeatable)
        #[arg(long = "detail")]
        details: Vec<DetailArg>,
    },
    /// List all AOPs
    List,
    /// Show an AOP with its committed total, by id or name fragment
    Show { aop: String },
    /// Edit a Draft or EOL AOP
    Update {
        aop_id: i64,
        #[arg(long, short)]
        name: Option<String>,
        #[arg(long, short)]
        total: Option<Decimal>,
        /// Replacement cost-center lines, CODE=AMOUNT (repeatable)
        #[arg(long = "detail")]
        details: Vec<DetailArg>,
        /// Remove every cost-center line
        #[arg(long, conflicts_with = "details")]
        clear_details: bool,
    },
    /// Move an AOP to another state
    Transition { aop_id: i64, state: AopStateArg },
    /// Delete an AOP and everything allocated against it
    Delete { aop_id: i64 },
}

#[derive(Subcommand)]
pub enum BudgetAction {
    /// Allocate a budget against an AOP
    Create {
        #[arg(long)]
        aop: i64,
        #[arg(long)]
        employee: i64,
        #[arg(long, short)]
        project: String,
        amount: Decimal,
        #[arg(long, short, default_value = "")]
        description: String,
    },
    /// List budgets
    List {
        #[arg(long)]
        aop: Option<i64>,
        #[arg(long)]
        employee: Option<i64>,
        /// Include soft-deleted budgets
        #[arg(long)]
        include_deleted: bool,
    },
    /// Copy a budget into another AOP
    Copy {
        budget_id: i64,
        /// Destination AOP
        #[arg(long)]
        to: i64,
    },
    /// Edit a budget (no ceiling re-check)
    Update {
        budget_id: i64,
        #[arg(long, short)]
        project: Option<String>,
        #[arg(long, short)]
        description: Option<String>,
        #[arg(long, short)]
        amount: Option<Decimal>,
    },
    /// Set a budget's amount
    Reduce { budget_id: i64, amount: Decimal },
    /// Soft-delete a budget
    Delete { budget_id: i64 },
    /// Largest committed budgets of an AOP
    Chart {
        aop_id: i64,
        #[arg(long, default_value_t = 10)]
        top: usize,
        #[arg(long, default_value = "markdown")]
        format: ReportFormat,
    },
}

#[derive(Subcommand)]
pub enum EmployeeAction {
    /// Add an employee
    Create {
        ldap: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long, short)]
        email: String,
        #[arg(long, default_value_t = 0)]
        level: i64,
        #[arg(long)]
        cost_center: String,
        #[arg(long)]
        manager: Option<i64>,
    },
    /// List employees
    List {
        /// Include inactive employees
        #[arg(long)]
        all: bool,
    },
    /// Edit an employee
    Update {
        employee_id: i64,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long, short)]
        email: Option<String>,
        #[arg(long)]
        level: Option<i64>,
        #[arg(long)]
        cost_center: Option<String>,
        #[arg(long)]
        manager: Option<i64>,
        #[arg(long, conflicts_with = "manager")]
        clear_manager: bool,
    },
    /// Deactivate an employee by id or ldap
    Deactivate { employee: String },
    /// Print the reporting tree
    Org,
}

#[derive(Subcommand)]
pub enum CostCenterAction {
    Create { code: String, name: String },
    List,
    Update {
        id: i64,
        #[arg(long)]
        code: Option<String>,
        #[arg(long)]
        name: Option<String>,
    },
    Delete { id: i64 },
}

#[derive(Subcommand)]
pub enum PurchaseAction {
    /// Record a purchase request
    Request {
        #[arg(long)]
        reference: String,
        #[arg(long)]
        requestor: String,
        #[arg(long)]
        budget: i64,
        amount: Decimal,
        /// Request date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
    },
    /// Record a purchase order line
    Order {
        #[arg(long)]
        order_number: String,
        #[arg(long, default_value_t = 1)]
        line: i64,
        #[arg(long)]
        requestor: String,
        #[arg(long)]
        budget: i64,
        #[arg(long)]
        item: String,
        amount: Decimal,
        #[arg(long)]
        date: Option<String>,
    },
    /// Record a goods receipt against an order line
    Receipt {
        #[arg(long)]
        order_number: String,
        #[arg(long, default_value_t = 1)]
        line: i64,
        #[arg(long)]
        item: String,
        #[arg(long)]
        date: Option<String>,
    },
    /// Show requests and orders booked against a budget
    List { budget: i64 },
}

/// `CODE=AMOUNT` cost-center line
#[derive(Debug, Clone)]
pub struct DetailArg {
    pub code: String,
    pub amount: Decimal,
}

impl FromStr for DetailArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (code, amount) = s
            .split_once('=')
            .ok_or_else(|| format!("expected CODE=AMOUNT, got '{}'", s))?;
        let amount = Decimal::from_str(amount.trim())
            .map_err(|e| format!("invalid amount '{}': {}", amount, e))?;
        Ok(Self {
            code: code.trim().to_string(),
            amount,
        })
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum AopStateArg {
    Draft,
    Active,
    Eol,
}

impl AopStateArg {
    pub fn to_core_state(&self) -> AopState {
        match self {
            AopStateArg::Draft => AopState::Draft,
            AopStateArg::Active => AopState::Active,
            AopStateArg::Eol => AopState::Eol,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ReportFormat {
    Csv,
    Json,
    Markdown,
}

impl ReportFormat {
    pub fn to_export_format(&self) -> ExportFormat {
        match self {
            ReportFormat::Csv => ExportFormat::Csv,
            ReportFormat::Json => ExportFormat::Json,
            ReportFormat::Markdown => ExportFormat::Markdown,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = cli.database_config();
    debug!(
        command = cli.command.name(),
        database_url = %config.url,
        events_dir = %cli.events_dir.display(),
        "dispatching command"
    );

    match cli.command {
        Commands::Init { force } => {
            db::init_database(config, &cli.events_dir, force).await?;
        }

        Commands::Status => {
            db::show_status(config, &cli.events_dir).await?;
        }

        Commands::Aop { action } => {
            let ctx = db::connect(config, &cli.events_dir).await?;
            aop::handle(&ctx, action).await?;
        }

        Commands::Budget { action } => {
            let ctx = db::connect(config, &cli.events_dir).await?;
            budget::handle(&ctx, action).await?;
        }

        Commands::Employee { action } => {
            let ctx = db::connect(config, &cli.events_dir).await?;
            employee::handle(&ctx, action).await?;
        }

        Commands::CostCenter { action } => {
            let ctx = db::connect(config, &cli.events_dir).await?;
            cost_center::handle(&ctx, action).await?;
        }

        Commands::Purchase { action } => {
            let ctx = db::connect(config, &cli.events_dir).await?;
            purchase::handle(&ctx, action).await?;
        }

        Commands::Reconcile { format, output } => {
            let ctx = db::connect(config, &cli.events_dir).await?;
            audit::reconcile(&ctx, format, output).await?;
        }

        Commands::Journal(args) => {
            audit::journal(&cli.events_dir, args)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_detail_arg() {
        let detail: DetailArg = "CC100=600.50".parse().unwrap();
        assert_eq!(detail.code, "CC100");
        assert_eq!(detail.amount, Decimal::new(60050, 2));

        assert!("CC100".parse::<DetailArg>().is_err());
        assert!("CC100=abc".parse::<DetailArg>().is_err());
    }

    #[test]
    fn test_global_options() {
        let cli = Cli::try_parse_from([
            "budgetgov",
            "--database-url",
            "sqlite:/tmp/x.db",
            "--max-connections",
            "0",
            "aop",
            "transition",
            "3",
            "eol",
        ])
        .unwrap();

        let config = cli.database_config();
        assert_eq!(config.url, "sqlite:/tmp/x.db");
        assert_eq!(config.max_connections, 1);
        assert_eq!(cli.command.name(), "aop");
        match cli.command {
            Commands::Aop {
                action: AopAction::Transition { aop_id, state },
            } => {
                assert_eq!(aop_id, 3);
                assert_eq!(state.to_core_state(), AopState::Eol);
            }
            _ => panic!("expected aop transition"),
        }
    }
}
