//! # Budgetgov Persistence
//!
//! SQLite state plus the JSONL governance journal.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Database                               │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────────┐ │
//! │  │   SQLite    │    │    JSONL    │    │     Repos       │ │
//! │  │  (state)    │    │  (journal)  │    │   (queries)     │ │
//! │  └─────────────┘    └─────────────┘    └─────────────────┘ │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use budgetgov_persistence::{AopRepo, Database, DatabaseConfig};
//!
//! let db = Database::init(DatabaseConfig::new("sqlite:budgetgov.db"), "data/events").await?;
//! let aops = AopRepo::get_all(db.pool()).await?;
//! db.events().append(&event)?;
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod sqlite;

pub use config::{DatabaseConfig, DEFAULT_DATABASE_URL, DEFAULT_EVENTS_DIR};
pub use error::{PersistenceError, PersistenceResult};
pub use events::{EventFilter, EventReader, EventStore};
pub use sqlite::schema::{
    AopDetailRow, AopRow, BudgetRow, CostCenterRow, EmployeeRow, PurchaseOrderRow,
    PurchaseRequestRow, ReceiptRow,
};
pub use sqlite::{
    init_database, AopDetailRepo, AopRepo, BudgetQuery, BudgetRepo, CostCenterRepo, EmployeeRepo,
    PurchaseRepo,
};

use sqlx::SqlitePool;
use std::path::Path;

/// Database facade - SQLite pool plus journal
pub struct Database {
    pool: SqlitePool,
    event_store: EventStore,
}

impl Database {
    /// Connect to an existing, already migrated database
    pub async fn connect<Q: AsRef<Path>>(
        config: DatabaseConfig,
        events_path: Q,
    ) -> PersistenceResult<Self> {
        let pool = sqlite::create_pool(&config).await?;
        let event_store = EventStore::new(events_path)?;

        Ok(Self { pool, event_store })
    }

    /// Create the database if needed and apply migrations
    pub async fn init<Q: AsRef<Path>>(
        config: DatabaseConfig,
        events_path: Q,
    ) -> PersistenceResult<Self> {
        let pool = init_database(&config).await?;
        let event_store = EventStore::new(events_path)?;

        Ok(Self { pool, event_store })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn events(&self) -> &EventStore {
        &self.event_store
    }

    /// Split into parts (pool, journal)
    pub fn into_parts(self) -> (SqlitePool, EventStore) {
        (self.pool, self.event_store)
    }
}
