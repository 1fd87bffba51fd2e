//! Company service
//!
//! Business rules around companies:
//! - companies are listed ordered by name and returned as `CompanyDto`
//! - creating a company may create its first employees in the same transaction
//! - collection lookups fail when any requested id is missing

use crate::db::repositories::CompanyRepository;
use crate::models::{
    Company, CompanyDto, CreateCompanyInput, InvalidInput, UpdateCompanyInput, ValidateInput,
};
use anyhow::Context;
use std::sync::Arc;
use uuid::Uuid;

use super::mapping::Mapper;

/// Error types for company service operations
#[derive(Debug, thiserror::Error)]
pub enum CompanyServiceError {
    /// Company not found
    #[error("{0}")]
    NotFound(String),

    /// Request can't be processed as sent
    #[error("{0}")]
    BadRequest(String),

    /// Request body failed validation
    #[error(transparent)]
    InvalidInput(#[from] InvalidInput),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Company service
pub struct CompanyService {
    repo: Arc<dyn CompanyRepository>,
    mapper: Mapper,
}

impl CompanyService {
    pub fn new(repo: Arc<dyn CompanyRepository>, mapper: Mapper) -> Self {
        Self { repo, mapper }
    }

    /// All companies ordered by name
    pub async fn list(&self) -> Result<Vec<CompanyDto>, CompanyServiceError> {
        let companies = self.repo.list().await.context("Failed to list companies")?;
        Ok(self.mapper.company_dtos(&companies))
    }

    /// Load a company entity or fail with `NotFound`
    pub async fn find(&self, id: Uuid) -> Result<Company, CompanyServiceError> {
        match self.repo.get_by_id(id).await.context("Failed to get company")? {
            Some(company) => Ok(company),
            None => {
                tracing::info!("Company with id: {} doesn't exist in the database.", id);
                Err(CompanyServiceError::NotFound(format!(
                    "Company with id: {} doesn't exist in the database.",
                    id
                )))
            }
        }
    }

    pub async fn get(&self, id: Uuid) -> Result<CompanyDto, CompanyServiceError> {
        let company = self.find(id).await?;
        Ok(self.mapper.company_dto(&company))
    }

    /// Companies by id; every id must exist
    pub async fn get_by_ids(&self, ids: &[Uuid]) -> Result<Vec<CompanyDto>, CompanyServiceError> {
        if ids.is_empty() {
            tracing::error!("Parameter ids is null");
            return Err(CompanyServiceError::BadRequest("Parameter ids is null".to_string()));
        }

        let companies = self
            .repo
            .get_by_ids(ids)
            .await
            .context("Failed to get companies by ids")?;

        let mut unique = ids.to_vec();
        unique.sort();
        unique.dedup();
        if unique.len() != companies.len() {
            tracing::error!("Some ids are not valid in a collection");
            return Err(CompanyServiceError::NotFound(
                "Some ids are not valid in a collection".to_string(),
            ));
        }

        Ok(self.mapper.company_dtos(&companies))
    }

    /// Create a company together with its nested employees
    pub async fn create(&self, input: &CreateCompanyInput) -> Result<CompanyDto, CompanyServiceError> {
        input.validate_input()?;

        let company = self.mapper.company_from_input(input);
        let employees = self.mapper.employees_from_company_input(input, company.id);
        self.repo
            .create(&company, &employees)
            .await
            .context("Failed to create company")?;

        tracing::debug!(
            "Created company {} with {} employees",
            company.id,
            employees.len()
        );
        Ok(self.mapper.company_dto(&company))
    }

    /// Create several companies in one transaction; nothing is created if
    /// any input is invalid or the store fails
    pub async fn create_collection(
        &self,
        inputs: &[CreateCompanyInput],
    ) -> Result<Vec<CompanyDto>, CompanyServiceError> {
        if inputs.is_empty() {
            tracing::error!("Company collection sent from client is null.");
            return Err(CompanyServiceError::BadRequest(
                "Company collection sent from client is null.".to_string(),
            ));
        }

        let mut invalid = InvalidInput::default();
        for (index, input) in inputs.iter().enumerate() {
            if let Err(errors) = input.validate_input() {
                for (field, messages) in errors.fields {
                    for message in messages {
                        invalid.add(format!("[{}].{}", index, field), message);
                    }
                }
            }
        }
        invalid.into_result()?;

        let batch: Vec<(Company, Vec<_>)> = inputs
            .iter()
            .map(|input| {
                let company = self.mapper.company_from_input(input);
                let employees = self.mapper.employees_from_company_input(input, company.id);
                (company, employees)
            })
            .collect();
        self.repo
            .create_many(&batch)
            .await
            .context("Failed to create company collection")?;

        tracing::debug!("Created {} companies", batch.len());
        Ok(batch
            .iter()
            .map(|(company, _)| self.mapper.company_dto(company))
            .collect())
    }

    /// Replace company fields and add the listed employees
    pub async fn update(&self, id: Uuid, input: &UpdateCompanyInput) -> Result<(), CompanyServiceError> {
        input.validate_input()?;

        let mut company = self.find(id).await?;
        self.mapper.apply_company_update(input, &mut company);
        let new_employees = self.mapper.employees_from_company_input(input, company.id);

        self.repo
            .update(&company, &new_employees)
            .await
            .context("Failed to update company")?;
        Ok(())
    }

    /// Delete a company and its employees
    pub async fn delete(&self, id: Uuid) -> Result<(), CompanyServiceError> {
        let company = self.find(id).await?;
        self.repo
            .delete(company.id)
            .await
            .context("Failed to delete company")?;
        Ok(())
    }
}
