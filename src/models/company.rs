//! Company model
//!
//! This module provides:
//! - `Company` entity as stored in the database
//! - `CompanyDto`, the representation returned by the API
//! - Validated input types for creating and updating companies

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::employee::CreateEmployeeInput;
use super::validation::{InvalidInput, ValidateInput};

/// Company entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    /// Unique identifier
    pub id: Uuid,
    /// Company name
    pub name: String,
    /// Street address
    pub address: String,
    /// Country
    pub country: String,
}

impl Company {
    /// Create a company with a fresh identifier
    pub fn new(name: impl Into<String>, address: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            address: address.into(),
            country: country.into(),
        }
    }
}

/// Company as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDto {
    pub id: Uuid,
    pub name: String,
    /// Address and country joined into one line
    pub full_address: String,
}

/// Input for creating a company, optionally with its first employees
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompanyInput {
    #[validate(
        required(message = "Company name is a required field."),
        length(min = 1, max = 60, message = "Maximum length for the Name is 60 characters.")
    )]
    pub name: Option<String>,
    #[validate(
        required(message = "Company address is a required field."),
        length(min = 1, max = 60, message = "Maximum length for the Address is 60 characters.")
    )]
    pub address: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub employees: Option<Vec<CreateEmployeeInput>>,
}

/// Input for replacing a company; listed employees are added to it
pub type UpdateCompanyInput = CreateCompanyInput;

impl ValidateInput for CreateCompanyInput {
    /// Validate the company and every nested employee.
    ///
    /// Failures of nested employees are keyed as `employees[<index>].<field>`.
    fn validate_input(&self) -> Result<(), InvalidInput> {
        let mut invalid = InvalidInput::default();
        if let Err(errors) = self.validate() {
            invalid.extend("", &errors);
        }

        for (index, employee) in self.employees.iter().flatten().enumerate() {
            if let Err(errors) = employee.validate() {
                invalid.extend(&format!("employees[{}].", index), &errors);
            }
        }

        invalid.into_result()
    }
}
