//! Employee service
//!
//! Employees are always addressed through their company, so every operation
//! first checks that the company exists.

use crate::db::repositories::{CompanyRepository, EmployeeRepository};
use crate::models::{
    CreateEmployeeInput, Employee, EmployeeDto, EmployeeParameters, InvalidInput, MetaData,
    UpdateEmployeeInput, ValidateInput,
};
use anyhow::Context;
use std::sync::Arc;
use uuid::Uuid;

use super::links::{EmployeeLinks, LinkResponse, RouteContext};
use super::mapping::Mapper;

/// Message returned for an invalid age range
pub const INVALID_AGE_RANGE: &str = "Max age can't be less than min age.";

/// Error types for employee service operations
#[derive(Debug, thiserror::Error)]
pub enum EmployeeServiceError {
    /// Company or employee not found
    #[error("{0}")]
    NotFound(String),

    /// Query parameters are inconsistent
    #[error("{0}")]
    ValidationError(String),

    /// Request body failed validation
    #[error(transparent)]
    InvalidInput(#[from] InvalidInput),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// One page of employees, shaped and optionally linked
#[derive(Debug, Clone)]
pub struct EmployeePage {
    pub meta_data: MetaData,
    pub response: LinkResponse,
}

/// Employee service
pub struct EmployeeService {
    employees: Arc<dyn EmployeeRepository>,
    companies: Arc<dyn CompanyRepository>,
    mapper: Mapper,
    links: EmployeeLinks,
}

impl EmployeeService {
    pub fn new(
        employees: Arc<dyn EmployeeRepository>,
        companies: Arc<dyn CompanyRepository>,
        mapper: Mapper,
        links: EmployeeLinks,
    ) -> Self {
        Self {
            employees,
            companies,
            mapper,
            links,
        }
    }

    async fn ensure_company(&self, company_id: Uuid) -> Result<(), EmployeeServiceError> {
        let company = self
            .companies
            .get_by_id(company_id)
            .await
            .context("Failed to get company")?;
        if company.is_none() {
            tracing::info!("Company with id: {} doesn't exist in the database.", company_id);
            return Err(EmployeeServiceError::NotFound(format!(
                "Company with id: {} doesn't exist in the database.",
                company_id
            )));
        }
        Ok(())
    }

    async fn find(&self, company_id: Uuid, id: Uuid) -> Result<Employee, EmployeeServiceError> {
        self.ensure_company(company_id).await?;

        match self
            .employees
            .get(company_id, id)
            .await
            .context("Failed to get employee")?
        {
            Some(employee) => Ok(employee),
            None => {
                tracing::info!("Employee with id: {} doesn't exist in the database.", id);
                Err(EmployeeServiceError::NotFound(format!(
                    "Employee with id: {} doesn't exist in the database.",
                    id
                )))
            }
        }
    }

    /// One page of a company's employees.
    ///
    /// The age range is checked before the store is queried.
    pub async fn list(
        &self,
        company_id: Uuid,
        params: &EmployeeParameters,
        ctx: &RouteContext,
    ) -> Result<EmployeePage, EmployeeServiceError> {
        if !params.valid_age_range() {
            return Err(EmployeeServiceError::ValidationError(
                INVALID_AGE_RANGE.to_string(),
            ));
        }

        self.ensure_company(company_id).await?;

        let page = self
            .employees
            .list_for_company(company_id, params)
            .await
            .context("Failed to list employees")?;
        let dtos = self.mapper.employee_dtos(&page.items);

        let response = self.links.try_generate_links(
            &dtos,
            params.request.fields.as_deref(),
            company_id,
            ctx,
        );

        Ok(EmployeePage {
            meta_data: page.meta_data,
            response,
        })
    }

    pub async fn get(&self, company_id: Uuid, id: Uuid) -> Result<EmployeeDto, EmployeeServiceError> {
        let employee = self.find(company_id, id).await?;
        Ok(self.mapper.employee_dto(&employee))
    }

    pub async fn create(
        &self,
        company_id: Uuid,
        input: &CreateEmployeeInput,
    ) -> Result<EmployeeDto, EmployeeServiceError> {
        input.validate_input()?;
        self.ensure_company(company_id).await?;

        let employee = self.mapper.employee_from_input(input, company_id);
        self.employees
            .create(&employee)
            .await
            .context("Failed to create employee")?;
        Ok(self.mapper.employee_dto(&employee))
    }

    pub async fn update(
        &self,
        company_id: Uuid,
        id: Uuid,
        input: &UpdateEmployeeInput,
    ) -> Result<(), EmployeeServiceError> {
        input.validate_input()?;

        let mut employee = self.find(company_id, id).await?;
        self.mapper.apply_employee_update(input, &mut employee);
        self.employees
            .update(&employee)
            .await
            .context("Failed to update employee")?;
        Ok(())
    }

    /// Apply an RFC 6902 patch to the editable view of an employee
    pub async fn patch(
        &self,
        company_id: Uuid,
        id: Uuid,
        patch: &json_patch::Patch,
    ) -> Result<(), EmployeeServiceError> {
        let mut employee = self.find(company_id, id).await?;

        let view = self.mapper.employee_to_update_input(&employee);
        let patched = apply_patch(&view, patch).map_err(|e| {
            tracing::error!("Invalid model state for the patch document");
            e
        })?;

        self.mapper.apply_employee_update(&patched, &mut employee);
        self.employees
            .update(&employee)
            .await
            .context("Failed to update employee")?;
        Ok(())
    }

    pub async fn delete(&self, company_id: Uuid, id: Uuid) -> Result<(), EmployeeServiceError> {
        let employee = self.find(company_id, id).await?;
        self.employees
            .delete(company_id, employee.id)
            .await
            .context("Failed to delete employee")?;
        Ok(())
    }
}

/// Patch `view` and validate the result
fn apply_patch(
    view: &UpdateEmployeeInput,
    patch: &json_patch::Patch,
) -> Result<UpdateEmployeeInput, EmployeeServiceError> {
    let mut document = serde_json::to_value(view).context("Failed to serialize employee")?;

    if let Err(e) = json_patch::patch(&mut document, patch) {
        let mut invalid = InvalidInput::default();
        invalid.add("patchDoc", e.to_string());
        return Err(invalid.into());
    }

    let patched: UpdateEmployeeInput = match serde_json::from_value(document) {
        Ok(patched) => patched,
        Err(e) => {
            let mut invalid = InvalidInput::default();
            invalid.add("patchDoc", e.to_string());
            return Err(invalid.into());
        }
    };

    patched.validate_input()?;
    Ok(patched)
}
