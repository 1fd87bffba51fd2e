//! Input validation results
//!
//! `validator` reports failures per struct. [`InvalidInput`] flattens them
//! into `field -> messages`, with nested inputs keyed as `employees[0].age`.

use std::collections::BTreeMap;

use validator::{Validate, ValidationErrors};

/// Field level validation failures of one request body
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("Invalid input for fields: {}", self.field_names().join(", "))]
pub struct InvalidInput {
    /// Messages per field, sorted by field name
    pub fields: BTreeMap<String, Vec<String>>,
}

impl InvalidInput {
    /// Record the failures of `errors`, prefixing each field with `prefix`
    pub fn extend(&mut self, prefix: &str, errors: &ValidationErrors) {
        for (field, field_errors) in errors.field_errors() {
            let key = format!("{}{}", prefix, field);
            let messages = self.fields.entry(key).or_default();
            for error in field_errors.iter() {
                let message = match &error.message {
                    Some(message) => message.to_string(),
                    None => format!("Invalid value ({})", error.code),
                };
                messages.push(message);
            }
        }
    }

    /// Record a single message for `field`
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.entry(field.into()).or_default().push(message.into());
    }

    /// Check if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Names of the rejected fields
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    /// `Ok` when nothing was recorded, otherwise `Err(self)`
    pub fn into_result(self) -> Result<(), InvalidInput> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<ValidationErrors> for InvalidInput {
    fn from(errors: ValidationErrors) -> Self {
        let mut invalid = Self::default();
        invalid.extend("", &errors);
        invalid
    }
}

/// Validate a request body into [`InvalidInput`]
pub trait ValidateInput {
    fn validate_input(&self) -> Result<(), InvalidInput>;
}
