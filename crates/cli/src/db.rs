//! Database initialization, status and connection

use anyhow::{Context, Result};
use budgetgov_business::{AopService, EmployeeService, Ledger, ServiceContext};
use budgetgov_core::AopState;
use budgetgov_persistence::{BudgetRepo, Database, DatabaseConfig};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Create the database (and its parent directory) and apply migrations
pub async fn init_database(config: DatabaseConfig, events_dir: &Path, force: bool) -> Result<()> {
    if let Some(path) = database_file(&config.url) {
        if force && path.exists() {
            std::fs::remove_file(&path).context("Failed to remove existing database")?;
            info!(path = %path.display(), "removed existing database");
            println!("🗑️  Removed existing database");
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create database directory")?;
        }
    }

    let url = config.url.clone();
    let db = Database::init(config, events_dir)
        .await
        .context("Failed to initialize database")?;
    db.pool().close().await;

    println!("✅ Database initialized at {}", url);
    println!("   Journal: {:?}", events_dir);
    Ok(())
}

/// Show database status
pub async fn show_status(config: DatabaseConfig, events_dir: &Path) -> Result<()> {
    if let Some(path) = database_file(&config.url) {
        if !path.exists() {
            println!("❌ Database not found at {:?}", path);
            println!("   Run 'budgetgov init' to create the database");
            return Ok(());
        }
    }

    println!("📊 Database Status");
    println!("   URL: {}", config.url);
    println!();

    let ctx = connect(config, events_dir).await?;

    let aops = AopService::new(&ctx).list().await?;
    let count_in = |state: AopState| aops.iter().filter(|a| a.state == state).count();
    let budget_count = BudgetRepo::count(ctx.pool()).await?;
    let employees = EmployeeService::new(&ctx).list(false).await?;
    let active_employees = employees.iter().filter(|e| e.active).count();
    let journal_files = ctx.events().list_files()?;

    println!(
        "   AOPs:         {} (draft {}, active {}, eol {})",
        aops.len(),
        count_in(AopState::Draft),
        count_in(AopState::Active),
        count_in(AopState::Eol)
    );
    println!("   Budgets:      {}", budget_count);
    println!("   Employees:    {} ({} active)", employees.len(), active_employees);
    println!("   Journal days: {}", journal_files.len());

    if let Some(active) = aops.iter().find(|a| a.is_active()) {
        let committed = Ledger::new(&ctx).committed_total(active.id).await?;
        println!();
        println!("   Active AOP:   {} ({})", active.name, active.id);
        println!("   Approved:     {}", active.total_approved_amount);
        println!("   Committed:    {}", committed);
        println!("   Remaining:    {}", active.total_approved_amount - committed);
    }

    ctx.pool().close().await;
    Ok(())
}

/// Connect to an initialized database and build the service context
pub async fn connect(config: DatabaseConfig, events_dir: &Path) -> Result<ServiceContext> {
    debug!(url = %config.url, events_dir = %events_dir.display(), "connecting");
    let db = Database::connect(config, events_dir)
        .await
        .context("Failed to connect to database. Run 'budgetgov init' first.")?;
    Ok(ServiceContext::new(db))
}

/// File behind a `sqlite:` URL; `None` for in-memory databases
fn database_file(url: &str) -> Option<PathBuf> {
    let rest = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Some(PathBuf::from(path))
}
