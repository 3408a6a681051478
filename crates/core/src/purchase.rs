//! # Purchase Module
//!
//! Purchase requests, purchase orders and receipts. These are append-only
//! transactional logs; nothing here is checked against remaining budget.

use crate::error::{require_non_empty, CoreError, CoreResult};
use crate::ids::{BudgetId, PurchaseId};
use crate::money::ensure_non_negative;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Date format accepted for purchase dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(raw: &str) -> CoreResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|e| CoreError::InvalidDate(format!("{}: {}", raw, e)))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRequest {
    pub id: PurchaseId,
    pub reference: String,
    pub requestor_ldap: String,
    pub budget_id: BudgetId,
    pub amount: Decimal,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPurchaseRequest {
    pub reference: String,
    pub requestor_ldap: String,
    pub budget_id: BudgetId,
    pub amount: Decimal,
    /// Defaults to today when absent
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl NewPurchaseRequest {
    pub fn validate(&self) -> CoreResult<()> {
        require_non_empty("reference", &self.reference)?;
        require_non_empty("requestor_ldap", &self.requestor_ldap)?;
        ensure_non_negative("amount", self.amount)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: PurchaseId,
    pub order_number: String,
    pub line_number: i64,
    pub requestor_ldap: String,
    pub budget_id: BudgetId,
    pub item: String,
    pub amount: Decimal,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPurchaseOrder {
    pub order_number: String,
    pub line_number: i64,
    pub requestor_ldap: String,
    pub budget_id: BudgetId,
    pub item: String,
    pub amount: Decimal,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl NewPurchaseOrder {
    pub fn validate(&self) -> CoreResult<()> {
        require_non_empty("order_number", &self.order_number)?;
        require_non_empty("requestor_ldap", &self.requestor_ldap)?;
        require_non_empty("item", &self.item)?;
        ensure_non_negative("amount", self.amount)?;
        Ok(())
    }
}

/// Goods receipt against an order line. References the order by
/// number/line, not by row id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub id: PurchaseId,
    pub receipt_date: NaiveDate,
    pub order_number: String,
    pub line_number: i64,
    pub item: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReceipt {
    #[serde(default)]
    pub receipt_date: Option<NaiveDate>,
    pub order_number: String,
    pub line_number: i64,
    pub item: String,
}

impl NewReceipt {
    pub fn validate(&self) -> CoreResult<()> {
        require_non_empty("order_number", &self.order_number)?;
        require_non_empty("item", &self.item)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_date() {
        let date = parse_date("2026-03-15").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 3, 15).unwrap());
        assert!(parse_date("15/03/2026").is_err());
    }

    #[test]
    fn test_request_validation() {
        let pr = NewPurchaseRequest {
            reference: "PR-1".to_string(),
            requestor_ldap: "lsamuel".to_string(),
            budget_id: BudgetId(1),
            amount: dec!(250),
            date: None,
        };
        assert!(pr.validate().is_ok());

        let negative = NewPurchaseRequest {
            amount: dec!(-1),
            ..pr
        };
        assert!(negative.validate().is_err());
    }
}
