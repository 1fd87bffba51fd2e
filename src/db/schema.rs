//! Schema bootstrap
//!
//! Creates the `companies` and `employees` tables when they are missing.
//! Every statement is idempotent, so it runs on each start.

use anyhow::{Context, Result};

use super::DynDatabasePool;
use crate::config::DatabaseDriver;

const SQLITE_SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS companies (
        id CHAR(36) PRIMARY KEY,
        name VARCHAR(60) NOT NULL,
        address VARCHAR(60) NOT NULL,
        country VARCHAR(60) NOT NULL DEFAULT ''
    );
    CREATE INDEX IF NOT EXISTS idx_companies_name ON companies(name);
    CREATE TABLE IF NOT EXISTS employees (
        id CHAR(36) PRIMARY KEY,
        name VARCHAR(30) NOT NULL,
        age INTEGER NOT NULL,
        position VARCHAR(20) NOT NULL,
        company_id CHAR(36) NOT NULL,
        FOREIGN KEY (company_id) REFERENCES companies(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_employees_company_id ON employees(company_id);
"#;

// MySQL has no `CREATE INDEX IF NOT EXISTS`, so indexes are declared inline.
const MYSQL_SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS companies (
        id CHAR(36) PRIMARY KEY,
        name VARCHAR(60) NOT NULL,
        address VARCHAR(60) NOT NULL,
        country VARCHAR(60) NOT NULL DEFAULT '',
        INDEX idx_companies_name (name)
    );
    CREATE TABLE IF NOT EXISTS employees (
        id CHAR(36) PRIMARY KEY,
        name VARCHAR(30) NOT NULL,
        age INT NOT NULL,
        position VARCHAR(20) NOT NULL,
        company_id CHAR(36) NOT NULL,
        INDEX idx_employees_company_id (company_id),
        FOREIGN KEY (company_id) REFERENCES companies(id) ON DELETE CASCADE
    );
"#;

/// Create all tables used by the repositories
pub async fn ensure_schema(pool: &DynDatabasePool) -> Result<()> {
    let sql = match pool.driver() {
        DatabaseDriver::Sqlite => SQLITE_SCHEMA,
        DatabaseDriver::Mysql => MYSQL_SCHEMA,
    };

    for statement in split_sql_statements(sql) {
        pool.execute(statement)
            .await
            .with_context(|| format!("Failed to execute: {}", truncate_sql(statement)))?;
    }

    tracing::debug!("Database schema is in place");
    Ok(())
}

/// Truncate SQL for error messages
fn truncate_sql(sql: &str) -> String {
    match sql.char_indices().nth(100) {
        Some((idx, _)) => format!("{}...", &sql[..idx]),
        None => sql.to_string(),
    }
}

/// Split a script into statements on `;`, dropping blank and comment-only chunks
fn split_sql_statements(sql: &str) -> Vec<&str> {
    sql.split(';')
        .map(str::trim)
        .filter(|stmt| !stmt.is_empty() && !is_comment_only(stmt))
        .collect()
}

fn is_comment_only(s: &str) -> bool {
    s.lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with("--"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use sqlx::Row;

    #[tokio::test]
    async fn test_ensure_schema_is_idempotent() {
        let pool = create_test_pool().await.expect("Failed to create test pool");

        ensure_schema(&pool).await.expect("First run failed");
        ensure_schema(&pool).await.expect("Second run failed");

        let sqlite = pool.as_sqlite().unwrap();
        let row = sqlx::query(
            "SELECT COUNT(*) AS count FROM sqlite_master WHERE type = 'table' AND name IN ('companies', 'employees')",
        )
        .fetch_one(sqlite)
        .await
        .unwrap();
        assert_eq!(row.get::<i64, _>("count"), 2);
    }

    #[tokio::test]
    async fn test_employees_cascade_with_company() {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        ensure_schema(&pool).await.unwrap();
        let sqlite = pool.as_sqlite().unwrap();

        sqlx::query("INSERT INTO companies (id, name, address, country) VALUES ('c1', 'Acme', 'Main St', 'USA')")
            .execute(sqlite)
            .await
            .unwrap();
        sqlx::query("INSERT INTO employees (id, name, age, position, company_id) VALUES ('e1', 'Ann', 30, 'Dev', 'c1')")
            .execute(sqlite)
            .await
            .unwrap();
        sqlx::query("DELETE FROM companies WHERE id = 'c1'")
            .execute(sqlite)
            .await
            .unwrap();

        let row = sqlx::query("SELECT COUNT(*) AS count FROM employees")
            .fetch_one(sqlite)
            .await
            .unwrap();
        assert_eq!(row.get::<i64, _>("count"), 0);
    }

    #[test]
    fn test_split_sql_statements() {
        let statements = split_sql_statements("CREATE TABLE a (id INT); CREATE TABLE b (id INT);");
        assert_eq!(statements, vec!["CREATE TABLE a (id INT)", "CREATE TABLE b (id INT)"]);

        let statements = split_sql_statements("-- Comment\nCREATE TABLE a (id INT);\n-- trailing");
        assert_eq!(statements.len(), 1);
    }

    #[test]
    fn test_is_comment_only() {
        assert!(is_comment_only("-- This is a comment"));
        assert!(is_comment_only("-- Line 1\n-- Line 2"));
        assert!(!is_comment_only("-- Comment\nCREATE TABLE test"));
    }
}
