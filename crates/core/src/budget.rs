//! # Budget Module
//!
//! A budget is a sub-allocation of one AOP to one employee for one project.
//! It is the unit the allocation ledger sums.

use crate::error::{require_non_empty, CoreError, CoreResult};
use crate::ids::{AopId, BudgetId, EmployeeId};
use crate::money::ensure_non_negative;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Budget state. Only Active budgets count toward the committed total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetState {
    Active,
    Inactive,
}

impl BudgetState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetState::Active => "active",
            BudgetState::Inactive => "inactive",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" => Some(BudgetState::Active),
            "inactive" => Some(BudgetState::Inactive),
            _ => None,
        }
    }

    pub fn parse(s: &str) -> CoreResult<Self> {
        Self::from_str(s).ok_or_else(|| CoreError::InvalidBudgetState(s.to_string()))
    }
}

impl fmt::Display for BudgetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A budget allocation.
///
/// Soft-deleted budgets stay in storage for audit but are excluded from
/// every total and from default listings. There is no undelete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub id: BudgetId,
    pub aop_id: AopId,
    pub employee_id: EmployeeId,
    pub project: String,
    pub description: String,
    pub amount: Decimal,
    pub state: BudgetState,
    pub soft_deleted: bool,
}

impl Budget {
    /// Whether this budget counts toward its AOP's committed total
    pub fn is_committed(&self) -> bool {
        self.state == BudgetState::Active && !self.soft_deleted
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({}, {}{})",
            self.id,
            self.project,
            self.amount,
            self.state,
            if self.soft_deleted { ", deleted" } else { "" }
        )
    }
}

/// Input for creating a budget. New budgets are always Active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBudget {
    pub aop_id: AopId,
    pub employee_id: EmployeeId,
    pub project: String,
    #[serde(default)]
    pub description: String,
    pub amount: Decimal,
}

impl NewBudget {
    pub fn new(aop_id: AopId, employee_id: EmployeeId, project: &str, amount: Decimal) -> Self {
        Self {
            aop_id,
            employee_id,
            project: project.to_string(),
            description: String::new(),
            amount,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn validate(&self) -> CoreResult<()> {
        require_non_empty("project", &self.project)?;
        ensure_non_negative("amount", self.amount)?;
        Ok(())
    }
}

/// Partial update of a budget (project / description / amount).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetPatch {
    pub project: Option<String>,
    pub description: Option<String>,
    pub amount: Option<Decimal>,
}

impl BudgetPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project(mut self, project: &str) -> Self {
        self.project = Some(project.to_string());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn validate(&self) -> CoreResult<()> {
        if let Some(project) = &self.project {
            require_non_empty("project", project)?;
        }
        if let Some(amount) = self.amount {
            ensure_non_negative("amount", amount)?;
        }
        Ok(())
    }

    /// Apply onto a stored budget
    pub fn apply(&self, budget: &mut Budget) {
        if let Some(project) = &self.project {
            budget.project = project.clone();
        }
        if let Some(description) = &self.description {
            budget.description = description.clone();
        }
        if let Some(amount) = self.amount {
            budget.amount = amount;
        }
    }
}
