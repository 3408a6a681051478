//! Employee directory
//!
//! Employees are never deleted. Deactivation is refused while the employee
//! still holds committed budgets.

use crate::error::{BusinessError, BusinessResult};
use crate::services::ServiceContext;
use budgetgov_core::{Employee, EmployeeId, EmployeePatch, Event, EventType, NewEmployee, OrgChart};
use budgetgov_persistence::{BudgetRepo, EmployeeRepo};
use tracing::{debug, info};

pub struct EmployeeService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> EmployeeService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    pub async fn create(&self, new: NewEmployee) -> BusinessResult<EmployeeId> {
        new.validate()?;

        if let Some(manager_id) = new.manager_id {
            self.ensure_exists(manager_id).await?;
        }
        if EmployeeRepo::get_by_ldap(self.ctx.pool(), &new.ldap).await?.is_some() {
            return Err(BusinessError::Validation(format!(
                "ldap {} is already taken",
                new.ldap
            )));
        }

        let employee_id = EmployeeRepo::insert(self.ctx.pool(), &new).await?;

        info!(employee_id = %employee_id, ldap = %new.ldap, "employee created");
        self.ctx.record(
            &Event::new(self.ctx.next_event_id(), EventType::EmployeeCreated)
                .with_employee(employee_id)
                .with_description(&new.ldap),
        );

        Ok(employee_id)
    }

    /// Apply a patch. Manager cycles are not checked.
    pub async fn update(&self, employee_id: EmployeeId, patch: EmployeePatch) -> BusinessResult<()> {
        patch.validate()?;

        if let Some(Some(manager_id)) = patch.manager_id {
            self.ensure_exists(manager_id).await?;
        }

        let mut employee = self.get(employee_id).await?;
        patch.apply(&mut employee);
        EmployeeRepo::update(self.ctx.pool(), &employee).await?;

        info!(employee_id = %employee_id, "employee updated");
        self.ctx.record(
            &Event::new(self.ctx.next_event_id(), EventType::EmployeeUpdated).with_employee(employee_id),
        );

        Ok(())
    }

    /// Mark an employee inactive, unless they own committed budgets.
    /// Deactivating an inactive employee succeeds without change.
    pub async fn deactivate(&self, employee_id: EmployeeId) -> BusinessResult<()> {
        let mut tx = self.ctx.pool().begin().await?;
        if !EmployeeRepo::lock(&mut *tx, employee_id).await? {
            return Err(BusinessError::not_found(employee_id));
        }
        let row = EmployeeRepo::get(&mut *tx, employee_id)
            .await?
            .ok_or_else(|| BusinessError::not_found(employee_id))?;
        if !row.active {
            debug!(employee_id = %employee_id, "employee already inactive");
            return Ok(());
        }

        let active_budgets = BudgetRepo::count_committed_for_employee(&mut *tx, employee_id).await?;
        if active_budgets > 0 {
            return Err(BusinessError::Dependency {
                employee_id,
                active_budgets,
            });
        }

        EmployeeRepo::set_active(&mut *tx, employee_id, false).await?;
        tx.commit().await?;

        info!(employee_id = %employee_id, ldap = %row.ldap, "employee deactivated");
        self.ctx.record(
            &Event::new(self.ctx.next_event_id(), EventType::EmployeeDeactivated)
                .with_employee(employee_id)
                .with_description(&row.ldap),
        );

        Ok(())
    }

    /// Deactivate the active employee with this ldap
    pub async fn deactivate_by_ldap(&self, ldap: &str) -> BusinessResult<()> {
        let employee = self
            .get_by_ldap(ldap)
            .await?
            .filter(|e| e.active)
            .ok_or_else(|| BusinessError::Validation(format!("no active employee with ldap {}", ldap)))?;
        self.deactivate(employee.id).await
    }

    pub async fn get(&self, employee_id: EmployeeId) -> BusinessResult<Employee> {
        EmployeeRepo::get(self.ctx.pool(), employee_id)
            .await?
            .map(Employee::from)
            .ok_or_else(|| BusinessError::not_found(employee_id))
    }

    pub async fn get_by_ldap(&self, ldap: &str) -> BusinessResult<Option<Employee>> {
        Ok(EmployeeRepo::get_by_ldap(self.ctx.pool(), ldap)
            .await?
            .map(Employee::from))
    }

    pub async fn list(&self, active_only: bool) -> BusinessResult<Vec<Employee>> {
        let rows = EmployeeRepo::list(self.ctx.pool(), active_only).await?;
        Ok(rows.into_iter().map(Employee::from).collect())
    }

    /// Manager index over the whole directory
    pub async fn org_chart(&self) -> BusinessResult<OrgChart> {
        let employees = self.list(false).await?;
        Ok(OrgChart::build(&employees))
    }

    async fn ensure_exists(&self, employee_id: EmployeeId) -> BusinessResult<()> {
        match EmployeeRepo::get(self.ctx.pool(), employee_id).await? {
            Some(_) => Ok(()),
            None => Err(BusinessError::Validation(format!(
                "manager {} not found",
                employee_id
            ))),
        }
    }
}
