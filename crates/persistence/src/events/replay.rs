//! Journal replay - read events back from JSONL files

use crate::error::{PersistenceError, PersistenceResult};
use budgetgov_core::{AopId, BudgetId, EmployeeId, Event, EventType};
use chrono::NaiveDate;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Reads journal files
pub struct EventReader {
    base_path: PathBuf,
}

impl EventReader {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    pub fn read_file(&self, file_path: &Path) -> PersistenceResult<Vec<Event>> {
        let reader = BufReader::new(File::open(file_path)?);
        let mut events = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            events.push(serde_json::from_str::<Event>(&line)?);
        }

        Ok(events)
    }

    /// Events of one day (`YYYY-MM-DD`); empty if the file is missing
    pub fn read_date(&self, date: &str) -> PersistenceResult<Vec<Event>> {
        let file_path = self.base_path.join(format!("{}.jsonl", date));
        if file_path.exists() {
            self.read_file(&file_path)
        } else {
            Ok(Vec::new())
        }
    }

    /// Events between two days, inclusive
    pub fn read_range(&self, from: &str, to: &str) -> PersistenceResult<Vec<Event>> {
        let from_date = parse_day(from)?;
        let to_date = parse_day(to)?;

        let mut all_events = Vec::new();
        let mut current = from_date;
        while current <= to_date {
            all_events.extend(self.read_date(&current.format("%Y-%m-%d").to_string())?);
            match current.succ_opt() {
                Some(next) => current = next,
                None => break,
            }
        }

        Ok(all_events)
    }

    /// Every event on disk, in file order
    pub fn read_all(&self) -> PersistenceResult<Vec<Event>> {
        let mut all_events = Vec::new();

        if !self.base_path.exists() {
            return Ok(all_events);
        }

        let mut files: Vec<PathBuf> = std::fs::read_dir(&self.base_path)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "jsonl"))
            .collect();
        files.sort();

        for file_path in files {
            all_events.extend(self.read_file(&file_path)?);
        }

        Ok(all_events)
    }
}

fn parse_day(raw: &str) -> PersistenceResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| PersistenceError::Other(format!("Invalid date {}: {}", raw, e)))
}

/// Journal filter; unset criteria match everything
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub aop_id: Option<AopId>,
    pub budget_id: Option<BudgetId>,
    pub employee_id: Option<EmployeeId>,
    pub event_types: Option<Vec<EventType>>,
}

impl EventFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn aop(mut self, aop_id: AopId) -> Self {
        self.aop_id = Some(aop_id);
        self
    }

    pub fn budget(mut self, budget_id: BudgetId) -> Self {
        self.budget_id = Some(budget_id);
        self
    }

    pub fn employee(mut self, employee_id: EmployeeId) -> Self {
        self.employee_id = Some(employee_id);
        self
    }

    pub fn event_types(mut self, types: Vec<EventType>) -> Self {
        self.event_types = Some(types);
        self
    }

    pub fn matches(&self, event: &Event) -> bool {
        if self.aop_id.is_some() && event.aop_id != self.aop_id {
            return false;
        }
        if self.budget_id.is_some() && event.budget_id != self.budget_id {
            return false;
        }
        if self.employee_id.is_some() && event.employee_id != self.employee_id {
            return false;
        }
        if let Some(ref types) = self.event_types {
            if !types.contains(&event.event_type) {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, events: Vec<Event>) -> Vec<Event> {
        events.into_iter().filter(|e| self.matches(e)).collect()
    }
}
