//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles CRUD operations for a specific entity.

pub mod company;
pub mod employee;

pub use company::{CompanyRepository, SqlxCompanyRepository};
pub use employee::{EmployeeRepository, SqlxEmployeeRepository};

use anyhow::{Context, Result};
use sqlx::{MySqlPool, SqlitePool};
use uuid::Uuid;

use crate::db::DynDatabasePool;

fn sqlite_pool(pool: &DynDatabasePool) -> Result<&SqlitePool> {
    pool.as_sqlite().context("SQLite pool is not available")
}

fn mysql_pool(pool: &DynDatabasePool) -> Result<&MySqlPool> {
    pool.as_mysql().context("MySQL pool is not available")
}

/// Parse a stored CHAR(36) identifier
fn parse_uuid(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value).with_context(|| format!("Invalid identifier in database: {}", value))
}

/// `?, ?, ?` for `count` bind parameters
fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
