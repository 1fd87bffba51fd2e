//! CompanyEmployees - REST API for companies and their employees
//!
//! This library provides paging, filtering, data shaping and hypermedia
//! links on top of a SQLite or MySQL store, served with axum.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
