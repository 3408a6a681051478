//! Shared service context
//!
//! Every service borrows one [`ServiceContext`]: the SQLite pool plus the
//! governance journal.

use budgetgov_core::Event;
use budgetgov_persistence::{Database, EventStore};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Context for engine operations - database and journal access
pub struct ServiceContext {
    pool: SqlitePool,
    events: Arc<EventStore>,
}

impl ServiceContext {
    pub fn new(db: Database) -> Self {
        let (pool, events) = db.into_parts();
        Self {
            pool,
            events: Arc::new(events),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn events(&self) -> &EventStore {
        &self.events
    }

    pub fn next_event_id(&self) -> String {
        self.events.next_event_id()
    }

    /// Append a journal entry for a change that is already committed.
    /// A failed append is logged and otherwise ignored; the database stays
    /// the source of truth.
    pub fn record(&self, event: &Event) {
        if let Err(e) = self.events.append(event) {
            tracing::warn!(
                event_id = %event.event_id,
                event_type = %event.event_type,
                error = %e,
                "journal append failed after commit"
            );
        }
    }
}
