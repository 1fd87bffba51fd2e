//! Data models
//!
//! This module contains the data structures of the CompanyEmployees API:
//! - Database entities (Company, Employee)
//! - DTOs returned to clients and validated request bodies
//! - Request parameters and paged results of list endpoints

mod company;
mod employee;
mod paging;
mod parameters;
mod validation;

pub use company::{Company, CompanyDto, CreateCompanyInput, UpdateCompanyInput};
pub use employee::{CreateEmployeeInput, Employee, EmployeeDto, UpdateEmployeeInput};
pub use paging::{MetaData, PagedList};
pub use parameters::{EmployeeParameters, EmployeeQuery, RequestParameters};
pub use validation::{InvalidInput, ValidateInput};
