//! # AOP Module
//!
//! Annual Operating Plan - the top-level approved budget envelope.
//!
//! The state model is flat: any state may be requested from any state.
//! Only entry into [`AopState::Active`] is guarded, and that guard lives in
//! the engine because it needs the ledger.

use crate::error::{require_non_empty, CoreError, CoreResult};
use crate::ids::AopId;
use crate::money::ensure_non_negative;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of an AOP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AopState {
    /// Initial state; freely editable
    Draft,
    /// In force; at most one AOP at a time, edits locked
    Active,
    /// End of life; retired plan
    Eol,
}

impl AopState {
    /// Code string stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            AopState::Draft => "draft",
            AopState::Active => "active",
            AopState::Eol => "eol",
        }
    }

    /// Parse from string (case-insensitive, accepts "EOL")
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Some(AopState::Draft),
            "active" => Some(AopState::Active),
            "eol" => Some(AopState::Eol),
            _ => None,
        }
    }

    /// Parse or fail with a domain error
    pub fn parse(s: &str) -> CoreResult<Self> {
        Self::from_str(s).ok_or_else(|| CoreError::InvalidAopState(s.to_string()))
    }

    /// Whether edits outside the transition path are locked
    pub fn is_locked(&self) -> bool {
        matches!(self, AopState::Active)
    }
}

impl fmt::Display for AopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AopState::Draft => "Draft",
            AopState::Active => "Active",
            AopState::Eol => "EOL",
        };
        write!(f, "{}", label)
    }
}

/// Cost-center breakdown line of an AOP. Informational only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AopDetail {
    pub id: i64,
    pub aop_id: AopId,
    pub cost_center_code: String,
    pub allocated_amount: Decimal,
}

/// Detail line supplied on create / update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAopDetail {
    pub cost_center_code: String,
    pub allocated_amount: Decimal,
}

impl NewAopDetail {
    pub fn new(cost_center_code: &str, allocated_amount: Decimal) -> Self {
        Self {
            cost_center_code: cost_center_code.to_string(),
            allocated_amount,
        }
    }

    pub fn validate(&self) -> CoreResult<()> {
        require_non_empty("cost_center_code", &self.cost_center_code)?;
        ensure_non_negative("allocated_amount", self.allocated_amount)?;
        Ok(())
    }
}

/// An annual operating plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aop {
    pub id: AopId,
    pub name: String,
    /// Ceiling for the committed total while Active
    pub total_approved_amount: Decimal,
    pub state: AopState,
    pub details: Vec<AopDetail>,
}

impl Aop {
    pub fn is_active(&self) -> bool {
        self.state == AopState::Active
    }

    /// Sum of the informational cost-center breakdown
    pub fn details_total(&self) -> CoreResult<Decimal> {
        crate::money::sum(self.details.iter().map(|d| d.allocated_amount))
    }
}

impl fmt::Display for Aop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} - {}, approved {})",
            self.name, self.id, self.state, self.total_approved_amount
        )
    }
}

/// Input for creating an AOP. New AOPs always start in Draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAop {
    pub name: String,
    pub total_approved_amount: Decimal,
    #[serde(default)]
    pub details: Vec<NewAopDetail>,
}

impl NewAop {
    pub fn new(name: &str, total_approved_amount: Decimal) -> Self {
        Self {
            name: name.to_string(),
            total_approved_amount,
            details: Vec::new(),
        }
    }

    pub fn with_detail(mut self, cost_center_code: &str, allocated_amount: Decimal) -> Self {
        self.details
            .push(NewAopDetail::new(cost_center_code, allocated_amount));
        self
    }

    pub fn validate(&self) -> CoreResult<()> {
        require_non_empty("name", &self.name)?;
        ensure_non_negative("total_approved_amount", self.total_approved_amount)?;
        for detail in &self.details {
            detail.validate()?;
        }
        Ok(())
    }
}

/// Partial update of an AOP. `None` keeps the stored value; `Some(details)`
/// replaces the whole breakdown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AopPatch {
    pub name: Option<String>,
    pub total_approved_amount: Option<Decimal>,
    pub details: Option<Vec<NewAopDetail>>,
}

impl AopPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn total(mut self, total: Decimal) -> Self {
        self.total_approved_amount = Some(total);
        self
    }

    pub fn details(mut self, details: Vec<NewAopDetail>) -> Self {
        self.details = Some(details);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.total_approved_amount.is_none() && self.details.is_none()
    }

    pub fn validate(&self) -> CoreResult<()> {
        if let Some(name) = &self.name {
            require_non_empty("name", name)?;
        }
        if let Some(total) = self.total_approved_amount {
            ensure_non_negative("total_approved_amount", total)?;
        }
        if let Some(details) = &self.details {
            for detail in details {
                detail.validate()?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_aop_state_str() {
        assert_eq!(AopState::Draft.as_str(), "draft");
        assert_eq!(AopState::from_str("EOL"), Some(AopState::Eol));
        assert_eq!(AopState::from_str(" Active "), Some(AopState::Active));
        assert_eq!(AopState::from_str("archived"), None);
        assert!(AopState::parse("archived").is_err());
        assert_eq!(AopState::Eol.to_string(), "EOL");
    }

    #[test]
    fn test_only_active_is_locked() {
        assert!(AopState::Active.is_locked());
        assert!(!AopState::Draft.is_locked());
        assert!(!AopState::Eol.is_locked());
    }

    #[test]
    fn test_new_aop_validation() {
        let aop = NewAop::new("AOP-2026", dec!(1000))
            .with_detail("CC-ENG", dec!(600))
            .with_detail("CC-OPS", dec!(400));
        assert!(aop.validate().is_ok());

        assert!(NewAop::new("AOP-2026", dec!(-1)).validate().is_err());
        assert!(NewAop::new("", dec!(10)).validate().is_err());
        assert!(NewAop::new("AOP", dec!(10))
            .with_detail("CC-ENG", dec!(-5))
            .validate()
            .is_err());
    }

    #[test]
    fn test_patch_builder() {
        let patch = AopPatch::new().name("Renamed").total(dec!(2000));
        assert!(!patch.is_empty());
        assert!(patch.validate().is_ok());
        assert!(AopPatch::new().is_empty());
        assert!(AopPatch::new().total(dec!(-3)).validate().is_err());
    }

    #[test]
    fn test_details_total() {
        let aop = Aop {
            id: AopId(1),
            name: "AOP-2026".to_string(),
            total_approved_amount: dec!(1000),
            state: AopState::Draft,
            details: vec![
                AopDetail {
                    id: 1,
                    aop_id: AopId(1),
                    cost_center_code: "CC-ENG".to_string(),
                    allocated_amount: dec!(700),
                },
                AopDetail {
                    id: 2,
                    aop_id: AopId(1),
                    cost_center_code: "CC-OPS".to_string(),
                    allocated_amount: dec!(500),
                },
            ],
        };
        // breakdown is informational and may exceed the approved total
        assert_eq!(aop.details_total().unwrap(), dec!(1200));
        assert!(!aop.is_active());
    }
}
