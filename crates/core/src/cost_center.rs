//! # Cost Center Module
//!
//! Cost centers are reference data. Employees and AOP details carry the code
//! as free text, so renaming or deleting a cost center never cascades.

use crate::error::{require_non_empty, CoreResult};
use crate::ids::CostCenterId;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostCenter {
    pub id: CostCenterId,
    /// Unique code, e.g. "CC-ENG"
    pub code: String,
    pub name: String,
}

impl CostCenter {
    pub fn validate_fields(code: &str, name: &str) -> CoreResult<()> {
        require_non_empty("code", code)?;
        require_non_empty("name", name)?;
        Ok(())
    }
}

impl fmt::Display for CostCenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.code, self.name)
    }
}
