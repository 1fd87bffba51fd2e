//! Employee repository
//!
//! Listing filters by age and orders in SQL. The name search and paging run
//! in memory on the ordered rows, so case folding is Unicode-aware on every driver.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Employee, EmployeeParameters, PagedList};
use crate::services::sorting::EMPLOYEE_SORT_COLUMNS;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;
use uuid::Uuid;

use super::{mysql_pool, parse_uuid, sqlite_pool};

#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    /// One page of the company's employees, filtered and ordered by `params`
    async fn list_for_company(
        &self,
        company_id: Uuid,
        params: &EmployeeParameters,
    ) -> Result<PagedList<Employee>>;
    async fn get(&self, company_id: Uuid, id: Uuid) -> Result<Option<Employee>>;
    async fn create(&self, employee: &Employee) -> Result<()>;
    async fn update(&self, employee: &Employee) -> Result<()>;
    async fn delete(&self, company_id: Uuid, id: Uuid) -> Result<bool>;
}

pub struct SqlxEmployeeRepository {
    pool: DynDatabasePool,
}

impl SqlxEmployeeRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn EmployeeRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl EmployeeRepository for SqlxEmployeeRepository {
    async fn list_for_company(
        &self,
        company_id: Uuid,
        params: &EmployeeParameters,
    ) -> Result<PagedList<Employee>> {
        let filter = ListFilter::new(company_id, params);
        let mut employees = match self.pool.driver() {
            DatabaseDriver::Sqlite => list_sqlite(sqlite_pool(&self.pool)?, &filter).await?,
            DatabaseDriver::Mysql => list_mysql(mysql_pool(&self.pool)?, &filter).await?,
        };

        if let Some(term) = params.normalized_search_term() {
            employees.retain(|e| name_matches(&e.name, &term));
        }

        Ok(PagedList::to_paged_list(
            employees,
            params.request.page_number,
            params.request.page_size,
        ))
    }

    async fn get(&self, company_id: Uuid, id: Uuid) -> Result<Option<Employee>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_sqlite(sqlite_pool(&self.pool)?, company_id, id).await,
            DatabaseDriver::Mysql => get_mysql(mysql_pool(&self.pool)?, company_id, id).await,
        }
    }

    async fn create(&self, employee: &Employee) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(sqlite_pool(&self.pool)?, employee).await,
            DatabaseDriver::Mysql => create_mysql(mysql_pool(&self.pool)?, employee).await,
        }
    }

    async fn update(&self, employee: &Employee) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_sqlite(sqlite_pool(&self.pool)?, employee).await,
            DatabaseDriver::Mysql => update_mysql(mysql_pool(&self.pool)?, employee).await,
        }
    }

    async fn delete(&self, company_id: Uuid, id: Uuid) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_sqlite(sqlite_pool(&self.pool)?, company_id, id).await,
            DatabaseDriver::Mysql => delete_mysql(mysql_pool(&self.pool)?, company_id, id).await,
        }
    }
}

/// SQL and bind values for listing one company's employees
struct ListFilter {
    sql: String,
    company_id: String,
    min_age: i64,
    max_age: i64,
}

impl ListFilter {
    fn new(company_id: Uuid, params: &EmployeeParameters) -> Self {
        let sql = format!(
            "{} WHERE company_id = ? AND age >= ? AND age <= ? {}",
            SELECT_EMPLOYEE,
            EMPLOYEE_SORT_COLUMNS.order_clause(&params.request.order_by)
        );

        Self {
            sql,
            company_id: company_id.to_string(),
            min_age: params.min_age as i64,
            max_age: params.max_age as i64,
        }
    }
}

/// Case-insensitive containment; `term` is already lowercased
fn name_matches(name: &str, term: &str) -> bool {
    name.to_lowercase().contains(term)
}

const SELECT_EMPLOYEE: &str = "SELECT id, name, age, position, company_id FROM employees";
const INSERT_EMPLOYEE: &str =
    "INSERT INTO employees (id, name, age, position, company_id) VALUES (?, ?, ?, ?, ?)";
const UPDATE_EMPLOYEE: &str =
    "UPDATE employees SET name = ?, age = ?, position = ? WHERE id = ? AND company_id = ?";

// SQLite implementations
async fn list_sqlite(pool: &SqlitePool, filter: &ListFilter) -> Result<Vec<Employee>> {
    let rows = sqlx::query(&filter.sql)
        .bind(&filter.company_id)
        .bind(filter.min_age)
        .bind(filter.max_age)
        .fetch_all(pool)
        .await
        .context("Failed to list employees")?;
    rows.iter().map(row_to_employee_sqlite).collect()
}

async fn get_sqlite(pool: &SqlitePool, company_id: Uuid, id: Uuid) -> Result<Option<Employee>> {
    let row = sqlx::query(&format!("{} WHERE company_id = ? AND id = ?", SELECT_EMPLOYEE))
        .bind(company_id.to_string())
        .bind(id.to_string())
        .fetch_optional(pool)
        .await
        .context("Failed to get employee")?;
    row.map(|r| row_to_employee_sqlite(&r)).transpose()
}

async fn create_sqlite(pool: &SqlitePool, employee: &Employee) -> Result<()> {
    sqlx::query(INSERT_EMPLOYEE)
        .bind(employee.id.to_string())
        .bind(&employee.name)
        .bind(employee.age)
        .bind(&employee.position)
        .bind(employee.company_id.to_string())
        .execute(pool)
        .await
        .context("Failed to create employee")?;
    Ok(())
}

async fn update_sqlite(pool: &SqlitePool, employee: &Employee) -> Result<()> {
    sqlx::query(UPDATE_EMPLOYEE)
        .bind(&employee.name)
        .bind(employee.age)
        .bind(&employee.position)
        .bind(employee.id.to_string())
        .bind(employee.company_id.to_string())
        .execute(pool)
        .await
        .context("Failed to update employee")?;
    Ok(())
}

async fn delete_sqlite(pool: &SqlitePool, company_id: Uuid, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM employees WHERE company_id = ? AND id = ?")
        .bind(company_id.to_string())
        .bind(id.to_string())
        .execute(pool)
        .await
        .context("Failed to delete employee")?;
    Ok(result.rows_affected() > 0)
}

fn row_to_employee_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Employee> {
    let id: String = row.get("id");
    let company_id: String = row.get("company_id");
    Ok(Employee {
        id: parse_uuid(&id)?,
        name: row.get("name"),
        age: row.get("age"),
        position: row.get("position"),
        company_id: parse_uuid(&company_id)?,
    })
}

// MySQL implementations
async fn list_mysql(pool: &MySqlPool, filter: &ListFilter) -> Result<Vec<Employee>> {
    let rows = sqlx::query(&filter.sql)
        .bind(&filter.company_id)
        .bind(filter.min_age)
        .bind(filter.max_age)
        .fetch_all(pool)
        .await
        .context("Failed to list employees")?;
    rows.iter().map(row_to_employee_mysql).collect()
}

async fn get_mysql(pool: &MySqlPool, company_id: Uuid, id: Uuid) -> Result<Option<Employee>> {
    let row = sqlx::query(&format!("{} WHERE company_id = ? AND id = ?", SELECT_EMPLOYEE))
        .bind(company_id.to_string())
        .bind(id.to_string())
        .fetch_optional(pool)
        .await
        .context("Failed to get employee")?;
    row.map(|r| row_to_employee_mysql(&r)).transpose()
}

async fn create_mysql(pool: &MySqlPool, employee: &Employee) -> Result<()> {
    sqlx::query(INSERT_EMPLOYEE)
        .bind(employee.id.to_string())
        .bind(&employee.name)
        .bind(employee.age)
        .bind(&employee.position)
        .bind(employee.company_id.to_string())
        .execute(pool)
        .await
        .context("Failed to create employee")?;
    Ok(())
}

async fn update_mysql(pool: &MySqlPool, employee: &Employee) -> Result<()> {
    sqlx::query(UPDATE_EMPLOYEE)
        .bind(&employee.name)
        .bind(employee.age)
        .bind(&employee.position)
        .bind(employee.id.to_string())
        .bind(employee.company_id.to_string())
        .execute(pool)
        .await
        .context("Failed to update employee")?;
    Ok(())
}

async fn delete_mysql(pool: &MySqlPool, company_id: Uuid, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM employees WHERE company_id = ? AND id = ?")
        .bind(company_id.to_string())
        .bind(id.to_string())
        .execute(pool)
        .await
        .context("Failed to delete employee")?;
    Ok(result.rows_affected() > 0)
}

fn row_to_employee_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Employee> {
    let id: String = row.get("id");
    let company_id: String = row.get("company_id");
    Ok(Employee {
        id: parse_uuid(&id)?,
        name: row.get("name"),
        age: row.get("age"),
        position: row.get("position"),
        company_id: parse_uuid(&company_id)?,
    })
}
