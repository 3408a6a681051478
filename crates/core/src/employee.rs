//! # Employee Module
//!
//! Employee directory entries and the manager hierarchy index.
//!
//! The hierarchy is a plain `manager_id` reference on each employee. The
//! reverse direction (manager -> direct reports) is an external [`OrgChart`]
//! index built from a snapshot, never a child list inside the entity.
//! Cycles are not validated.

use crate::error::{require_non_empty, CoreError, CoreResult};
use crate::ids::EmployeeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// An employee. Never hard-deleted; removal flips `active` to false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    /// Unique directory handle
    pub ldap: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub level: i64,
    /// Free-text copy, not a reference to a cost center row
    pub cost_center_code: String,
    pub manager_id: Option<EmployeeId>,
    pub active: bool,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl fmt::Display for Employee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} - {})", self.full_name(), self.ldap, self.id)
    }
}

/// Input for creating an employee
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEmployee {
    pub ldap: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub level: i64,
    pub cost_center_code: String,
    #[serde(default)]
    pub manager_id: Option<EmployeeId>,
}

impl NewEmployee {
    pub fn new(ldap: &str, first_name: &str, last_name: &str) -> Self {
        Self {
            ldap: ldap.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: String::new(),
            level: 1,
            cost_center_code: String::new(),
            manager_id: None,
        }
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.email = email.to_string();
        self
    }

    pub fn with_level(mut self, level: i64) -> Self {
        self.level = level;
        self
    }

    pub fn with_cost_center(mut self, code: &str) -> Self {
        self.cost_center_code = code.to_string();
        self
    }

    pub fn with_manager(mut self, manager_id: EmployeeId) -> Self {
        self.manager_id = Some(manager_id);
        self
    }

    pub fn validate(&self) -> CoreResult<()> {
        require_non_empty("ldap", &self.ldap)?;
        require_non_empty("first_name", &self.first_name)?;
        require_non_empty("last_name", &self.last_name)?;
        require_non_empty("email", &self.email)?;
        require_non_empty("cost_center_code", &self.cost_center_code)?;
        if self.level < 0 {
            return Err(CoreError::InvalidLevel(self.level));
        }
        Ok(())
    }
}

/// Partial update of an employee. The ldap handle is immutable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeePatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub level: Option<i64>,
    pub cost_center_code: Option<String>,
    /// `Some(None)` clears the manager
    pub manager_id: Option<Option<EmployeeId>>,
}

impl EmployeePatch {
    pub fn validate(&self) -> CoreResult<()> {
        if let Some(level) = self.level {
            if level < 0 {
                return Err(CoreError::InvalidLevel(level));
            }
        }
        for (field, value) in [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("email", &self.email),
            ("cost_center_code", &self.cost_center_code),
        ] {
            if let Some(value) = value {
                require_non_empty(field, value)?;
            }
        }
        Ok(())
    }

    pub fn apply(&self, employee: &mut Employee) {
        if let Some(v) = &self.first_name {
            employee.first_name = v.clone();
        }
        if let Some(v) = &self.last_name {
            employee.last_name = v.clone();
        }
        if let Some(v) = &self.email {
            employee.email = v.clone();
        }
        if let Some(v) = self.level {
            employee.level = v;
        }
        if let Some(v) = &self.cost_center_code {
            employee.cost_center_code = v.clone();
        }
        if let Some(v) = self.manager_id {
            employee.manager_id = v;
        }
    }
}

/// Manager -> direct reports index over an employee snapshot.
#[derive(Debug, Clone, Default)]
pub struct OrgChart {
    reports: BTreeMap<EmployeeId, Vec<EmployeeId>>,
    roots: Vec<EmployeeId>,
}

impl OrgChart {
    /// Build the index. Employees whose manager is absent from the snapshot
    /// are treated as roots.
    pub fn build(employees: &[Employee]) -> Self {
        let known: std::collections::BTreeSet<EmployeeId> =
            employees.iter().map(|e| e.id).collect();
        let mut chart = OrgChart::default();

        for employee in employees {
            match employee.manager_id {
                Some(manager) if known.contains(&manager) => {
                    chart.reports.entry(manager).or_default().push(employee.id);
                }
                _ => chart.roots.push(employee.id),
            }
        }
        for reports in chart.reports.values_mut() {
            reports.sort();
        }
        chart.roots.sort();
        chart
    }

    pub fn direct_reports(&self, manager: EmployeeId) -> &[EmployeeId] {
        self.reports
            .get(&manager)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn roots(&self) -> &[EmployeeId] {
        &self.roots
    }

    /// All transitive reports, visiting each employee once so that an
    /// accidental management cycle terminates.
    pub fn all_reports(&self, manager: EmployeeId) -> Vec<EmployeeId> {
        let mut seen = std::collections::BTreeSet::new();
        let mut stack = vec![manager];
        let mut out = Vec::new();

        while let Some(current) = stack.pop() {
            for &report in self.direct_reports(current) {
                if report != manager && seen.insert(report) {
                    out.push(report);
                    stack.push(report);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emp(id: i64, manager: Option<i64>) -> Employee {
        Employee {
            id: EmployeeId(id),
            ldap: format!("user{}", id),
            first_name: "First".to_string(),
            last_name: format!("Last{}", id),
            email: format!("user{}@example.com", id),
            level: 3,
            cost_center_code: "CC-ENG".to_string(),
            manager_id: manager.map(EmployeeId),
            active: true,
        }
    }

    #[test]
    fn test_new_employee_validation() {
        let ok = NewEmployee::new("lsamuel", "Samuel", "Larkins")
            .with_email("lsamuel@example.com")
            .with_cost_center("CC-ENG");
        assert!(ok.validate().is_ok());

        let missing_email = NewEmployee::new("lsamuel", "Samuel", "Larkins").with_cost_center("CC");
        assert!(missing_email.validate().is_err());

        let bad_level = ok.clone().with_level(-1);
        assert!(matches!(bad_level.validate(), Err(CoreError::InvalidLevel(-1))));
    }

    #[test]
    fn test_patch_clears_manager() {
        let mut e = emp(2, Some(1));
        let patch = EmployeePatch {
            manager_id: Some(None),
            level: Some(5),
            ..Default::default()
        };
        patch.apply(&mut e);
        assert_eq!(e.manager_id, None);
        assert_eq!(e.level, 5);
        assert_eq!(e.ldap, "user2");
    }

    #[test]
    fn test_org_chart() {
        let staff = vec![emp(1, None), emp(2, Some(1)), emp(3, Some(1)), emp(4, Some(2)), emp(5, Some(99))];
        let chart = OrgChart::build(&staff);

        assert_eq!(chart.roots(), &[EmployeeId(1), EmployeeId(5)]);
        assert_eq!(chart.direct_reports(EmployeeId(1)), &[EmployeeId(2), EmployeeId(3)]);
        assert!(chart.direct_reports(EmployeeId(3)).is_empty());

        let mut all = chart.all_reports(EmployeeId(1));
        all.sort();
        assert_eq!(all, vec![EmployeeId(2), EmployeeId(3), EmployeeId(4)]);
    }

    #[test]
    fn test_org_chart_cycle_terminates() {
        let staff = vec![emp(1, Some(2)), emp(2, Some(1))];
        let chart = OrgChart::build(&staff);
        assert!(chart.roots().is_empty());
        assert_eq!(chart.all_reports(EmployeeId(1)), vec![EmployeeId(2)]);
    }
}
