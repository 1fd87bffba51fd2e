//! Entity to DTO mapping
//!
//! All conversions between stored entities, API DTOs and request bodies go
//! through one [`Mapper`], configured by an explicit [`MappingProfile`].

use uuid::Uuid;

use crate::models::{
    Company, CompanyDto, CreateCompanyInput, CreateEmployeeInput, Employee, EmployeeDto,
    UpdateCompanyInput, UpdateEmployeeInput,
};

/// Mapping options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingProfile {
    /// Placed between address and country in `fullAddress`
    pub full_address_separator: String,
}

impl Default for MappingProfile {
    fn default() -> Self {
        Self {
            full_address_separator: " ".to_string(),
        }
    }
}

/// Converts between entities, DTOs and inputs
#[derive(Debug, Clone, Default)]
pub struct Mapper {
    profile: MappingProfile,
}

impl Mapper {
    pub fn new(profile: MappingProfile) -> Self {
        Self { profile }
    }

    pub fn company_dto(&self, company: &Company) -> CompanyDto {
        CompanyDto {
            id: company.id,
            name: company.name.clone(),
            full_address: format!(
                "{}{}{}",
                company.address, self.profile.full_address_separator, company.country
            ),
        }
    }

    pub fn company_dtos(&self, companies: &[Company]) -> Vec<CompanyDto> {
        companies.iter().map(|c| self.company_dto(c)).collect()
    }

    /// New company entity from a validated input; nested employees are mapped separately
    pub fn company_from_input(&self, input: &CreateCompanyInput) -> Company {
        Company::new(
            input.name.clone().unwrap_or_default(),
            input.address.clone().unwrap_or_default(),
            input.country.clone().unwrap_or_default(),
        )
    }

    /// Copy input values onto an existing company
    pub fn apply_company_update(&self, input: &UpdateCompanyInput, company: &mut Company) {
        if let Some(name) = &input.name {
            company.name = name.clone();
        }
        if let Some(address) = &input.address {
            company.address = address.clone();
        }
        company.country = input.country.clone().unwrap_or_default();
    }

    /// Nested employees of a company input, owned by `company_id`
    pub fn employees_from_company_input(
        &self,
        input: &CreateCompanyInput,
        company_id: Uuid,
    ) -> Vec<Employee> {
        input
            .employees
            .iter()
            .flatten()
            .map(|e| self.employee_from_input(e, company_id))
            .collect()
    }

    pub fn employee_dto(&self, employee: &Employee) -> EmployeeDto {
        EmployeeDto {
            id: employee.id,
            name: employee.name.clone(),
            age: employee.age,
            position: employee.position.clone(),
        }
    }

    pub fn employee_dtos(&self, employees: &[Employee]) -> Vec<EmployeeDto> {
        employees.iter().map(|e| self.employee_dto(e)).collect()
    }

    /// New employee entity from a validated input
    pub fn employee_from_input(&self, input: &CreateEmployeeInput, company_id: Uuid) -> Employee {
        Employee::new(
            company_id,
            input.name.clone().unwrap_or_default(),
            input.age.unwrap_or_default(),
            input.position.clone().unwrap_or_default(),
        )
    }

    /// Copy input values onto an existing employee
    pub fn apply_employee_update(&self, input: &UpdateEmployeeInput, employee: &mut Employee) {
        if let Some(name) = &input.name {
            employee.name = name.clone();
        }
        if let Some(age) = input.age {
            employee.age = age;
        }
        if let Some(position) = &input.position {
            employee.position = position.clone();
        }
    }

    /// Editable view of an employee, used as the JSON Patch target
    pub fn employee_to_update_input(&self, employee: &Employee) -> UpdateEmployeeInput {
        UpdateEmployeeInput {
            name: Some(employee.name.clone()),
            age: Some(employee.age),
            position: Some(employee.position.clone()),
        }
    }
}
