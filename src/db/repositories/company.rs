//! Company repository

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Company, Employee};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlConnection, MySqlPool, Row, SqliteConnection, SqlitePool};
use std::sync::Arc;
use uuid::Uuid;

use super::{mysql_pool, parse_uuid, placeholders, sqlite_pool};

#[async_trait]
pub trait CompanyRepository: Send + Sync {
    /// All companies ordered by name
    async fn list(&self) -> Result<Vec<Company>>;
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Company>>;
    /// Companies whose id is in `ids`; missing ids are simply absent
    async fn get_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Company>>;
    /// Insert the company and its employees in one transaction
    async fn create(&self, company: &Company, employees: &[Employee]) -> Result<()>;
    /// Insert every company with its employees in a single transaction
    async fn create_many(&self, companies: &[(Company, Vec<Employee>)]) -> Result<()>;
    /// Update the company row and insert `new_employees` in one transaction
    async fn update(&self, company: &Company, new_employees: &[Employee]) -> Result<()>;
    /// Delete the company and, by cascade, its employees
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

pub struct SqlxCompanyRepository {
    pool: DynDatabasePool,
}

impl SqlxCompanyRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CompanyRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CompanyRepository for SqlxCompanyRepository {
    async fn list(&self) -> Result<Vec<Company>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_sqlite(sqlite_pool(&self.pool)?).await,
            DatabaseDriver::Mysql => list_mysql(mysql_pool(&self.pool)?).await,
        }
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Company>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(sqlite_pool(&self.pool)?, id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(mysql_pool(&self.pool)?, id).await,
        }
    }

    async fn get_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Company>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_ids_sqlite(sqlite_pool(&self.pool)?, ids).await,
            DatabaseDriver::Mysql => get_by_ids_mysql(mysql_pool(&self.pool)?, ids).await,
        }
    }

    async fn create(&self, company: &Company, employees: &[Employee]) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(sqlite_pool(&self.pool)?, company, employees).await,
            DatabaseDriver::Mysql => create_mysql(mysql_pool(&self.pool)?, company, employees).await,
        }
    }

    async fn create_many(&self, companies: &[(Company, Vec<Employee>)]) -> Result<()> {
        if companies.is_empty() {
            return Ok(());
        }
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_many_sqlite(sqlite_pool(&self.pool)?, companies).await,
            DatabaseDriver::Mysql => create_many_mysql(mysql_pool(&self.pool)?, companies).await,
        }
    }

    async fn update(&self, company: &Company, new_employees: &[Employee]) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_sqlite(sqlite_pool(&self.pool)?, company, new_employees).await,
            DatabaseDriver::Mysql => update_mysql(mysql_pool(&self.pool)?, company, new_employees).await,
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_sqlite(sqlite_pool(&self.pool)?, id).await,
            DatabaseDriver::Mysql => delete_mysql(mysql_pool(&self.pool)?, id).await,
        }
    }
}

const SELECT_COMPANY: &str = "SELECT id, name, address, country FROM companies";
const INSERT_COMPANY: &str = "INSERT INTO companies (id, name, address, country) VALUES (?, ?, ?, ?)";
const UPDATE_COMPANY: &str = "UPDATE companies SET name = ?, address = ?, country = ? WHERE id = ?";
const INSERT_EMPLOYEE: &str =
    "INSERT INTO employees (id, name, age, position, company_id) VALUES (?, ?, ?, ?, ?)";

// SQLite implementations
async fn list_sqlite(pool: &SqlitePool) -> Result<Vec<Company>> {
    let rows = sqlx::query(&format!("{} ORDER BY name", SELECT_COMPANY))
        .fetch_all(pool)
        .await
        .context("Failed to list companies")?;
    rows.iter().map(row_to_company_sqlite).collect()
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: Uuid) -> Result<Option<Company>> {
    let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_COMPANY))
        .bind(id.to_string())
        .fetch_optional(pool)
        .await
        .context("Failed to get company")?;
    row.map(|r| row_to_company_sqlite(&r)).transpose()
}

async fn get_by_ids_sqlite(pool: &SqlitePool, ids: &[Uuid]) -> Result<Vec<Company>> {
    let sql = format!("{} WHERE id IN ({}) ORDER BY name", SELECT_COMPANY, placeholders(ids.len()));
    let mut query = sqlx::query(&sql);
    for id in ids {
        query = query.bind(id.to_string());
    }
    let rows = query
        .fetch_all(pool)
        .await
        .context("Failed to get companies by ids")?;
    rows.iter().map(row_to_company_sqlite).collect()
}

async fn create_sqlite(pool: &SqlitePool, company: &Company, employees: &[Employee]) -> Result<()> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;
    insert_company_sqlite(&mut *tx, company, employees).await?;
    tx.commit().await.context("Failed to commit company")?;
    Ok(())
}

async fn create_many_sqlite(pool: &SqlitePool, companies: &[(Company, Vec<Employee>)]) -> Result<()> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;
    for (company, employees) in companies {
        insert_company_sqlite(&mut *tx, company, employees).await?;
    }
    tx.commit().await.context("Failed to commit company collection")?;
    Ok(())
}

async fn insert_company_sqlite(conn: &mut SqliteConnection, company: &Company, employees: &[Employee]) -> Result<()> {
    sqlx::query(INSERT_COMPANY)
        .bind(company.id.to_string())
        .bind(&company.name)
        .bind(&company.address)
        .bind(&company.country)
        .execute(&mut *conn)
        .await
        .context("Failed to create company")?;

    for employee in employees {
        sqlx::query(INSERT_EMPLOYEE)
            .bind(employee.id.to_string())
            .bind(&employee.name)
            .bind(employee.age)
            .bind(&employee.position)
            .bind(company.id.to_string())
            .execute(&mut *conn)
            .await
            .context("Failed to create employee")?;
    }
    Ok(())
}

async fn update_sqlite(pool: &SqlitePool, company: &Company, new_employees: &[Employee]) -> Result<()> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    sqlx::query(UPDATE_COMPANY)
        .bind(&company.name)
        .bind(&company.address)
        .bind(&company.country)
        .bind(company.id.to_string())
        .execute(&mut *tx)
        .await
        .context("Failed to update company")?;

    for employee in new_employees {
        sqlx::query(INSERT_EMPLOYEE)
            .bind(employee.id.to_string())
            .bind(&employee.name)
            .bind(employee.age)
            .bind(&employee.position)
            .bind(company.id.to_string())
            .execute(&mut *tx)
            .await
            .context("Failed to create employee")?;
    }

    tx.commit().await.context("Failed to commit company update")?;
    Ok(())
}

async fn delete_sqlite(pool: &SqlitePool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM companies WHERE id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await
        .context("Failed to delete company")?;
    Ok(result.rows_affected() > 0)
}

fn row_to_company_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Company> {
    let id: String = row.get("id");
    Ok(Company {
        id: parse_uuid(&id)?,
        name: row.get("name"),
        address: row.get("address"),
        country: row.get("country"),
    })
}

// MySQL implementations
async fn list_mysql(pool: &MySqlPool) -> Result<Vec<Company>> {
    let rows = sqlx::query(&format!("{} ORDER BY name", SELECT_COMPANY))
        .fetch_all(pool)
        .await
        .context("Failed to list companies")?;
    rows.iter().map(row_to_company_mysql).collect()
}

async fn get_by_id_mysql(pool: &MySqlPool, id: Uuid) -> Result<Option<Company>> {
    let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_COMPANY))
        .bind(id.to_string())
        .fetch_optional(pool)
        .await
        .context("Failed to get company")?;
    row.map(|r| row_to_company_mysql(&r)).transpose()
}

async fn get_by_ids_mysql(pool: &MySqlPool, ids: &[Uuid]) -> Result<Vec<Company>> {
    let sql = format!("{} WHERE id IN ({}) ORDER BY name", SELECT_COMPANY, placeholders(ids.len()));
    let mut query = sqlx::query(&sql);
    for id in ids {
        query = query.bind(id.to_string());
    }
    let rows = query
        .fetch_all(pool)
        .await
        .context("Failed to get companies by ids")?;
    rows.iter().map(row_to_company_mysql).collect()
}

async fn create_mysql(pool: &MySqlPool, company: &Company, employees: &[Employee]) -> Result<()> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;
    insert_company_mysql(&mut *tx, company, employees).await?;
    tx.commit().await.context("Failed to commit company")?;
    Ok(())
}

async fn create_many_mysql(pool: &MySqlPool, companies: &[(Company, Vec<Employee>)]) -> Result<()> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;
    for (company, employees) in companies {
        insert_company_mysql(&mut *tx, company, employees).await?;
    }
    tx.commit().await.context("Failed to commit company collection")?;
    Ok(())
}

async fn insert_company_mysql(conn: &mut MySqlConnection, company: &Company, employees: &[Employee]) -> Result<()> {
    sqlx::query(INSERT_COMPANY)
        .bind(company.id.to_string())
        .bind(&company.name)
        .bind(&company.address)
        .bind(&company.country)
        .execute(&mut *conn)
        .await
        .context("Failed to create company")?;

    for employee in employees {
        sqlx::query(INSERT_EMPLOYEE)
            .bind(employee.id.to_string())
            .bind(&employee.name)
            .bind(employee.age)
            .bind(&employee.position)
            .bind(company.id.to_string())
            .execute(&mut *conn)
            .await
            .context("Failed to create employee")?;
    }
    Ok(())
}

async fn update_mysql(pool: &MySqlPool, company: &Company, new_employees: &[Employee]) -> Result<()> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    sqlx::query(UPDATE_COMPANY)
        .bind(&company.name)
        .bind(&company.address)
        .bind(&company.country)
        .bind(company.id.to_string())
        .execute(&mut *tx)
        .await
        .context("Failed to update company")?;

    for employee in new_employees {
        sqlx::query(INSERT_EMPLOYEE)
            .bind(employee.id.to_string())
            .bind(&employee.name)
            .bind(employee.age)
            .bind(&employee.position)
            .bind(company.id.to_string())
            .execute(&mut *tx)
            .await
            .context("Failed to create employee")?;
    }

    tx.commit().await.context("Failed to commit company update")?;
    Ok(())
}

async fn delete_mysql(pool: &MySqlPool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM companies WHERE id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await
        .context("Failed to delete company")?;
    Ok(result.rows_affected() > 0)
}

fn row_to_company_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Company> {
    let id: String = row.get("id");
    Ok(Company {
        id: parse_uuid(&id)?,
        name: row.get("name"),
        address: row.get("address"),
        country: row.get("country"),
    })
}
