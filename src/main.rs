//! CompanyEmployees - REST API server

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use company_employees::{
    api::{self, AppState},
    config::Config,
    db::{
        self,
        repositories::{SqlxCompanyRepository, SqlxEmployeeRepository},
        schema,
    },
    services::{CompanyService, EmployeeLinks, EmployeeService, Mapper, RequestRateLimiter},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "company_employees=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting CompanyEmployees API...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {:?}", config.database.driver);

    schema::ensure_schema(&pool).await?;
    tracing::info!("Database schema ready");

    // Field registries are checked here so a broken one stops startup
    let links = EmployeeLinks::new().context("Invalid employee field registry")?;

    // Create repositories and services
    let company_repo = SqlxCompanyRepository::boxed(pool.clone());
    let employee_repo = SqlxEmployeeRepository::boxed(pool.clone());

    let company_service = Arc::new(CompanyService::new(company_repo.clone(), Mapper::default()));
    let employee_service = Arc::new(EmployeeService::new(
        employee_repo,
        company_repo,
        Mapper::default(),
        links,
    ));

    let rate_limiter = Arc::new(RequestRateLimiter::new());

    let state = AppState {
        company_service,
        employee_service,
        rate_limiter: rate_limiter.clone(),
        paging: config.paging,
        auth: Arc::new(config.auth.clone()),
    };

    // Drop expired rate limit windows every 5 minutes
    {
        let limiter = rate_limiter.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(300));
            loop {
                interval.tick().await;
                limiter.cleanup().await;
            }
        });
    }

    // Build router
    let app = api::build_router(state, &config.server.cors_origin);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    pool.close().await;
    Ok(())
}
