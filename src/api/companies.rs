//! Company API endpoints
//!
//! Handles HTTP requests for companies:
//! - GET /api/companies - List companies (Manager role)
//! - GET /api/v2/companies - List companies, version 2 (no role required)
//! - OPTIONS /api/companies - Allowed methods
//! - POST /api/companies - Create company with optional employees
//! - GET /api/companies/{companyId} - Get company (ETag, If-None-Match)
//! - PUT /api/companies/{companyId} - Update company
//! - DELETE /api/companies/{companyId} - Delete company and its employees
//! - GET /api/companies/collection/({id1,id2}) - Get companies by ids
//! - POST /api/companies/collection - Create several companies

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderMap, StatusCode},
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::api::middleware::{
    self, base_url, cached_json, require_body, ApiError, AppState,
};
use crate::models::{CompanyDto, CreateCompanyInput, UpdateCompanyInput};

/// Methods served on the company collection
pub const COMPANIES_ALLOW: &str = "GET, OPTIONS, POST";

/// Reported on company listings of every version
pub const API_SUPPORTED_VERSIONS_HEADER: &str = "api-supported-versions";
pub const API_SUPPORTED_VERSIONS: &str = "1.0, 2.0";

/// Seconds a single company may be cached
const COMPANY_MAX_AGE: u32 = 120;

/// Build the company router
pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/companies",
            get(list_companies)
                .route_layer(axum_middleware::from_fn(middleware::require_manager))
                .route_layer(axum_middleware::from_fn_with_state(
                    state,
                    middleware::require_auth,
                ))
                .post(create_company)
                .options(companies_options),
        )
        .route("/v2/companies", get(list_companies_v2))
        .route("/companies/collection", post(create_company_collection))
        .route("/companies/collection/{ids}", get(get_company_collection))
        .route(
            "/companies/{company_id}",
            get(get_company).put(update_company).delete(delete_company),
        )
}

/// GET /api/companies - All companies ordered by name
async fn list_companies(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let companies = state.company_service.list().await?;
    Ok((
        [(API_SUPPORTED_VERSIONS_HEADER, API_SUPPORTED_VERSIONS)],
        Json(companies),
    ))
}

/// GET /api/v2/companies
///
/// Same listing as version 1, open to anonymous callers.
async fn list_companies_v2(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let companies = state.company_service.list().await?;
    tracing::debug!("Listing {} companies (v2)", companies.len());
    Ok((
        [(API_SUPPORTED_VERSIONS_HEADER, API_SUPPORTED_VERSIONS)],
        Json(companies),
    ))
}

/// OPTIONS /api/companies
async fn companies_options() -> impl IntoResponse {
    (StatusCode::OK, [(header::ALLOW, COMPANIES_ALLOW)])
}

/// GET /api/companies/{companyId}
async fn get_company(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let company = state.company_service.get(company_id).await?;
    cached_json(&headers, &company, COMPANY_MAX_AGE)
}

/// POST /api/companies
async fn create_company(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<CreateCompanyInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let input = require_body(body, "CompanyForCreationDto")?;
    let company = state.company_service.create(&input).await?;

    let location = format!("{}/api/companies/{}", base_url(&headers), company.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(company)))
}

/// GET /api/companies/collection/({id1,id2,...})
async fn get_company_collection(
    State(state): State<AppState>,
    Path(ids): Path<String>,
) -> Result<Json<Vec<CompanyDto>>, ApiError> {
    let ids = parse_id_list(&ids)?;
    let companies = state.company_service.get_by_ids(&ids).await?;
    Ok(Json(companies))
}

/// POST /api/companies/collection
async fn create_company_collection(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<Vec<CreateCompanyInput>>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let inputs = require_body(body, "Company collection")?;
    let companies = state.company_service.create_collection(&inputs).await?;

    let location = format!(
        "{}/api/companies/collection/({})",
        base_url(&headers),
        format_id_list(companies.iter().map(|c| c.id))
    );
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(companies)))
}

/// PUT /api/companies/{companyId}
///
/// Employees listed in the body are added to the company.
async fn update_company(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    body: Result<Json<UpdateCompanyInput>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let input = require_body(body, "CompanyForUpdateDto")?;
    state.company_service.update(company_id, &input).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/companies/{companyId}
async fn delete_company(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.company_service.delete(company_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Parse `(id1,id2,...)`; the parentheses are optional
pub fn parse_id_list(raw: &str) -> Result<Vec<Uuid>, ApiError> {
    let trimmed = raw.trim();
    let inner = trimmed
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(trimmed);

    inner
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            Uuid::parse_str(token).map_err(|_| {
                tracing::error!("Invalid id in collection: {}", token);
                ApiError::bad_request(format!("'{}' is not a valid id", token))
            })
        })
        .collect()
}

fn format_id_list(ids: impl Iterator<Item = Uuid>) -> String {
    ids.map(|id| id.to_string()).collect::<Vec<_>>().join(",")
}
