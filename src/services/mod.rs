//! Services layer - Business logic
//!
//! This module contains the business logic of the CompanyEmployees API:
//! - Company and employee rules on top of the repositories
//! - Data shaping, hypermedia links, ordering and DTO mapping
//! - Per-client request rate limiting

pub mod company;
pub mod employee;
pub mod links;
pub mod mapping;
pub mod rate_limiter;
pub mod shaping;
pub mod sorting;

pub use company::{CompanyService, CompanyServiceError};
pub use employee::{EmployeePage, EmployeeService, EmployeeServiceError};
pub use links::{EmployeeLinks, Link, LinkResponse, RouteContext, HATEOAS_MEDIA_TYPE};
pub use mapping::{Mapper, MappingProfile};
pub use rate_limiter::{RateLimitDecision, RequestRateLimiter};
pub use shaping::{DataShaper, FieldValue, ShapedEntity, ShapingError};
