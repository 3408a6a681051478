//! # Event Module
//!
//! Governance journal entries. One event is appended for every committed
//! mutation; events are immutable and stored as JSONL.

use crate::aop::AopState;
use crate::ids::{AopId, BudgetId, EmployeeId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of governance event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    // === AOP events ===
    AopCreated,
    AopUpdated,
    AopTransitioned,
    AopDeleted,

    // === Budget events ===
    BudgetCreated,
    BudgetCopied,
    BudgetUpdated,
    BudgetReduced,
    BudgetSoftDeleted,

    // === Employee events ===
    EmployeeCreated,
    EmployeeUpdated,
    EmployeeDeactivated,

    // === Audit events ===
    /// Reconciliation sweep executed
    ReconciliationRun,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::AopCreated => "aop_created",
            EventType::AopUpdated => "aop_updated",
            EventType::AopTransitioned => "aop_transitioned",
            EventType::AopDeleted => "aop_deleted",
            EventType::BudgetCreated => "budget_created",
            EventType::BudgetCopied => "budget_copied",
            EventType::BudgetUpdated => "budget_updated",
            EventType::BudgetReduced => "budget_reduced",
            EventType::BudgetSoftDeleted => "budget_soft_deleted",
            EventType::EmployeeCreated => "employee_created",
            EventType::EmployeeUpdated => "employee_updated",
            EventType::EmployeeDeactivated => "employee_deactivated",
            EventType::ReconciliationRun => "reconciliation_run",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let all = [
            EventType::AopCreated,
            EventType::AopUpdated,
            EventType::AopTransitioned,
            EventType::AopDeleted,
            EventType::BudgetCreated,
            EventType::BudgetCopied,
            EventType::BudgetUpdated,
            EventType::BudgetReduced,
            EventType::BudgetSoftDeleted,
            EventType::EmployeeCreated,
            EventType::EmployeeUpdated,
            EventType::EmployeeDeactivated,
            EventType::ReconciliationRun,
        ];
        let needle = s.trim().to_lowercase();
        all.into_iter().find(|t| t.as_str() == needle)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A governance journal entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// EVT_000001, EVT_000002, ...
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub event_type: EventType,

    // === Target ===
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aop_id: Option<AopId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_id: Option<BudgetId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<EmployeeId>,

    // === Amount ===
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    /// Previous amount for edits
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_amount: Option<Decimal>,

    // === State change ===
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_state: Option<AopState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_state: Option<AopState>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Event {
    pub fn new(event_id: String, event_type: EventType) -> Self {
        Self {
            event_id,
            timestamp: Utc::now(),
            event_type,
            aop_id: None,
            budget_id: None,
            employee_id: None,
            amount: None,
            previous_amount: None,
            from_state: None,
            to_state: None,
            description: None,
        }
    }

    // === Builder methods ===

    pub fn with_aop(mut self, aop_id: AopId) -> Self {
        self.aop_id = Some(aop_id);
        self
    }

    pub fn with_budget(mut self, budget_id: BudgetId) -> Self {
        self.budget_id = Some(budget_id);
        self
    }

    pub fn with_employee(mut self, employee_id: EmployeeId) -> Self {
        self.employee_id = Some(employee_id);
        self
    }

    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_previous_amount(mut self, amount: Decimal) -> Self {
        self.previous_amount = Some(amount);
        self
    }

    pub fn with_transition(mut self, from: AopState, to: AopState) -> Self {
        self.from_state = Some(from);
        self.to_state = Some(to);
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    // === Factory methods ===

    pub fn budget_created(event_id: &str, aop_id: AopId, budget_id: BudgetId, amount: Decimal) -> Self {
        Self::new(event_id.to_string(), EventType::BudgetCreated)
            .with_aop(aop_id)
            .with_budget(budget_id)
            .with_amount(amount)
    }

    pub fn aop_transitioned(event_id: &str, aop_id: AopId, from: AopState, to: AopState) -> Self {
        Self::new(event_id.to_string(), EventType::AopTransitioned)
            .with_aop(aop_id)
            .with_transition(from, to)
    }

    /// Format an event ID from a counter
    pub fn generate_id(counter: u64) -> String {
        format!("EVT_{:06}", counter)
    }

    /// Serialize as one JSONL line
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.event_type
        )?;
        if let Some(aop) = self.aop_id {
            write!(f, " {}", aop)?;
        }
        if let Some(budget) = self.budget_id {
            write!(f, " {}", budget)?;
        }
        if let Some(employee) = self.employee_id {
            write!(f, " {}", employee)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_event_type_roundtrip_str() {
        assert_eq!(EventType::BudgetSoftDeleted.as_str(), "budget_soft_deleted");
        assert_eq!(EventType::from_str("AOP_TRANSITIONED"), Some(EventType::AopTransitioned));
        assert_eq!(EventType::from_str("budget_approved"), None);
    }

    #[test]
    fn test_budget_created_event() {
        let event = Event::budget_created("EVT_000001", AopId(1), BudgetId(9), dec!(400));
        assert_eq!(event.event_type, EventType::BudgetCreated);
        assert_eq!(event.aop_id, Some(AopId(1)));
        assert_eq!(event.budget_id, Some(BudgetId(9)));
        assert_eq!(event.amount, Some(dec!(400)));
    }

    #[test]
    fn test_event_to_json() {
        let event = Event::aop_transitioned("EVT_000002", AopId(3), AopState::Draft, AopState::Active)
            .with_description("go live");
        let json = event.to_json().unwrap();

        assert!(json.contains("EVT_000002"));
        assert!(json.contains("aop_transitioned"));
        assert!(json.contains("\"to_state\":\"active\""));
        assert!(!json.contains("budget_id"));

        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(back.to_state, Some(AopState::Active));
    }

    #[test]
    fn test_event_id_generation() {
        assert_eq!(Event::generate_id(1), "EVT_000001");
        assert_eq!(Event::generate_id(999999), "EVT_999999");
    }
}
