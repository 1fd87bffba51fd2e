//! Database layer
//!
//! Companies and employees are stored in either:
//! - SQLite (default, single file or in-memory for tests)
//! - MySQL
//!
//! The driver is selected by configuration. Repositories work against the
//! [`DatabasePool`] trait and branch on [`DatabasePool::driver`] for the
//! backend-specific queries.
//!
//! # Usage
//!
//! ```ignore
//! use company_employees::config::DatabaseConfig;
//! use company_employees::db::{create_pool, schema};
//!
//! let pool = create_pool(&DatabaseConfig::default()).await?;
//! schema::ensure_schema(&pool).await?;
//! pool.ping().await?;
//! ```

pub mod pool;
pub mod repositories;
pub mod schema;

pub use pool::{
    create_pool, create_test_pool, DatabasePool, DynDatabasePool, MysqlDatabase, SqliteDatabase,
};
