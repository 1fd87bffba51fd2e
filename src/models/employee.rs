//! Employee model
//!
//! Employees always belong to exactly one company.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::validation::{InvalidInput, ValidateInput};

/// Employee entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    /// Unique identifier
    pub id: Uuid,
    /// Full name
    pub name: String,
    /// Age in years
    pub age: i32,
    /// Job position
    pub position: String,
    /// Owning company
    pub company_id: Uuid,
}

impl Employee {
    /// Create an employee of `company_id` with a fresh identifier
    pub fn new(company_id: Uuid, name: impl Into<String>, age: i32, position: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            age,
            position: position.into(),
            company_id,
        }
    }
}

/// Employee as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeDto {
    pub id: Uuid,
    pub name: String,
    pub age: i32,
    pub position: String,
}

/// Input for creating an employee
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CreateEmployeeInput {
    #[validate(
        required(message = "Employee name is a required field."),
        length(min = 1, max = 30, message = "Maximum length for the Name is 30 characters.")
    )]
    pub name: Option<String>,
    #[validate(
        required(message = "Age is a required field."),
        range(min = 18, message = "Age is required and it can't be lower than 18")
    )]
    pub age: Option<i32>,
    #[validate(
        required(message = "Position is a required field."),
        length(min = 1, max = 20, message = "Maximum length for the Position is 20 characters.")
    )]
    pub position: Option<String>,
}

/// Input for replacing an employee, also the document JSON Patch operates on
pub type UpdateEmployeeInput = CreateEmployeeInput;

impl ValidateInput for CreateEmployeeInput {
    fn validate_input(&self) -> Result<(), InvalidInput> {
        self.validate().map_err(InvalidInput::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> CreateEmployeeInput {
        CreateEmployeeInput {
            name: Some("Sam Raiden".to_string()),
            age: Some(26),
            position: Some("Software developer".to_string()),
        }
    }

    #[test]
    fn test_valid_input_passes() {
        assert!(valid_input().validate_input().is_ok());
    }

    #[test]
    fn test_underage_is_rejected() {
        let input = CreateEmployeeInput {
            age: Some(17),
            ..valid_input()
        };
        let invalid = input.validate_input().unwrap_err();

        assert_eq!(
            invalid.fields["age"],
            vec!["Age is required and it can't be lower than 18".to_string()]
        );
    }

    #[test]
    fn test_missing_fields_are_rejected() {
        let invalid = CreateEmployeeInput::default().validate_input().unwrap_err();

        assert_eq!(invalid.field_names(), vec!["age", "name", "position"]);
    }

    #[test]
    fn test_position_length_limit() {
        let input = CreateEmployeeInput {
            position: Some("p".repeat(21)),
            ..valid_input()
        };
        assert!(input.validate_input().is_err());

        let input = CreateEmployeeInput {
            position: Some("p".repeat(20)),
            ..valid_input()
        };
        assert!(input.validate_input().is_ok());
    }

    #[test]
    fn test_update_input_serializes_as_patch_document() {
        let json = serde_json::to_value(valid_input()).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "name": "Sam Raiden",
                "age": 26,
                "position": "Software developer"
            })
        );
    }
}
