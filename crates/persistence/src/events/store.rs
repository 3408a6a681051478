//! JSONL journal store - append-only writer
//!
//! One file per day: `data/events/2026-10-16.jsonl`.

use crate::error::{PersistenceError, PersistenceResult};
use budgetgov_core::Event;
use chrono::Utc;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Append-only governance journal.
pub struct EventStore {
    base_path: PathBuf,
    event_counter: AtomicU64,
    current_writer: Mutex<Option<EventWriter>>,
}

struct EventWriter {
    date: String,
    writer: BufWriter<File>,
}

impl EventStore {
    /// Open (creating the directory if needed) and resume the id counter
    pub fn new<P: AsRef<Path>>(base_path: P) -> PersistenceResult<Self> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)?;

        let event_counter = Self::load_event_counter(&base_path)?;

        Ok(Self {
            base_path,
            event_counter: AtomicU64::new(event_counter),
            current_writer: Mutex::new(None),
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Next free counter value after the highest EVT_ id on disk
    fn load_event_counter(base_path: &Path) -> PersistenceResult<u64> {
        let mut max_id: u64 = 0;

        for entry in fs::read_dir(base_path)?.flatten() {
            let path = entry.path();
            if !path.extension().is_some_and(|ext| ext == "jsonl") {
                continue;
            }
            let content = fs::read_to_string(&path)?;
            for line in content.lines() {
                // Unparseable lines are skipped; the reader reports them
                if let Ok(event) = serde_json::from_str::<Event>(line) {
                    if let Some(num) = event
                        .event_id
                        .strip_prefix("EVT_")
                        .and_then(|n| n.parse::<u64>().ok())
                    {
                        max_id = max_id.max(num);
                    }
                }
            }
        }

        Ok(max_id + 1)
    }

    fn file_path(&self, date: &str) -> PathBuf {
        self.base_path.join(format!("{}.jsonl", date))
    }

    fn current_date() -> String {
        Utc::now().format("%Y-%m-%d").to_string()
    }

    fn writer(&self) -> PersistenceResult<MutexGuard<'_, Option<EventWriter>>> {
        self.current_writer
            .lock()
            .map_err(|_| PersistenceError::Other("journal writer lock poisoned".to_string()))
    }

    pub fn next_event_id(&self) -> String {
        let id = self.event_counter.fetch_add(1, Ordering::SeqCst);
        Event::generate_id(id)
    }

    /// Append one event and flush
    pub fn append(&self, event: &Event) -> PersistenceResult<()> {
        let date = Self::current_date();
        let json = event.to_json()?;

        let mut guard = self.writer()?;

        let needs_new_file = guard.as_ref().map_or(true, |w| w.date != date);
        if needs_new_file {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(self.file_path(&date))?;
            *guard = Some(EventWriter {
                date,
                writer: BufWriter::new(file),
            });
        }

        if let Some(w) = guard.as_mut() {
            writeln!(w.writer, "{}", json)?;
            w.writer.flush()?;
        }

        Ok(())
    }

    /// All journal files, oldest first
    pub fn list_files(&self) -> PersistenceResult<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in fs::read_dir(&self.base_path)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "jsonl") {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }

    pub fn flush(&self) -> PersistenceResult<()> {
        let mut guard = self.writer()?;
        if let Some(w) = guard.as_mut() {
            w.writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for EventStore {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use budgetgov_core::{AopId, AopState, BudgetId};
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    #[test]
    fn test_event_store_append() {
        let dir = tempdir().unwrap();
        let store = EventStore::new(dir.path()).unwrap();

        let event_id = store.next_event_id();
        let event = Event::budget_created(&event_id, AopId(1), BudgetId(1), dec!(100));

        store.append(&event).unwrap();
        store.flush().unwrap();

        let files = store.list_files().unwrap();
        assert_eq!(files.len(), 1);

        let content = fs::read_to_string(&files[0]).unwrap();
        assert!(content.contains("EVT_000001"));
        assert!(content.contains("budget_created"));
    }

    #[test]
    fn test_event_store_counter() {
        let dir = tempdir().unwrap();
        let store = EventStore::new(dir.path()).unwrap();

        assert_eq!(store.next_event_id(), "EVT_000001");
        assert_eq!(store.next_event_id(), "EVT_000002");
        assert_eq!(store.next_event_id(), "EVT_000003");
    }

    #[test]
    fn test_event_store_reload_counter() {
        let dir = tempdir().unwrap();

        {
            let store = EventStore::new(dir.path()).unwrap();
            let event = Event::budget_created(&store.next_event_id(), AopId(1), BudgetId(1), dec!(100));
            store.append(&event).unwrap();

            let event = Event::aop_transitioned(
                &store.next_event_id(),
                AopId(1),
                AopState::Draft,
                AopState::Active,
            );
            store.append(&event).unwrap();
        }

        // Reopened store continues after the last id on disk
        let store = EventStore::new(dir.path()).unwrap();
        assert_eq!(store.next_event_id(), "EVT_000003");
    }
}
