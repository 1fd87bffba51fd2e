//! API middleware
//!
//! Contains middleware for:
//! - Authentication (JWT bearer token validation)
//! - Authorization (role checking)
//! - Per-client rate limiting
//!
//! plus the shared application state, the JSON error type and the
//! media type negotiation used by the employee list endpoint.

use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Deserializer, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use crate::config::{AuthConfig, PagingConfig};
use crate::models::InvalidInput;
use crate::services::links::is_valid_accept;
use crate::services::{
    CompanyService, CompanyServiceError, EmployeeService, EmployeeServiceError,
    RequestRateLimiter, RouteContext,
};

/// Role allowed to list every company
pub const MANAGER_ROLE: &str = "Manager";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub company_service: Arc<CompanyService>,
    pub employee_service: Arc<EmployeeService>,
    pub rate_limiter: Arc<RequestRateLimiter>,
    pub paging: PagingConfig,
    pub auth: Arc<AuthConfig>,
}

// ============================================================================
// Errors
// ============================================================================

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new("FORBIDDEN", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }

    /// Status code for this error's code
    pub fn status(&self) -> StatusCode {
        match self.error.code.as_str() {
            "BAD_REQUEST" | "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "FORBIDDEN" => StatusCode::FORBIDDEN,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "UNPROCESSABLE_ENTITY" => StatusCode::UNPROCESSABLE_ENTITY,
            "RATE_LIMIT" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(self)).into_response()
    }
}

impl From<InvalidInput> for ApiError {
    fn from(invalid: InvalidInput) -> Self {
        let details = serde_json::to_value(&invalid.fields).unwrap_or_default();
        Self::with_details(
            "UNPROCESSABLE_ENTITY",
            "One or more validation errors occurred.",
            details,
        )
    }
}

impl From<CompanyServiceError> for ApiError {
    fn from(e: CompanyServiceError) -> Self {
        match e {
            CompanyServiceError::NotFound(message) => Self::not_found(message),
            CompanyServiceError::BadRequest(message) => Self::bad_request(message),
            CompanyServiceError::InvalidInput(invalid) => invalid.into(),
            CompanyServiceError::InternalError(e) => {
                tracing::error!("Company request failed: {:#}", e);
                Self::internal_error("Internal Server Error")
            }
        }
    }
}

impl From<EmployeeServiceError> for ApiError {
    fn from(e: EmployeeServiceError) -> Self {
        match e {
            EmployeeServiceError::NotFound(message) => Self::not_found(message),
            EmployeeServiceError::ValidationError(message) => Self::validation_error(message),
            EmployeeServiceError::InvalidInput(invalid) => invalid.into(),
            EmployeeServiceError::InternalError(e) => {
                tracing::error!("Employee request failed: {:#}", e);
                Self::internal_error("Internal Server Error")
            }
        }
    }
}

// ============================================================================
// Authentication
// ============================================================================

/// Claims read from a bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub iss: String,
    pub aud: String,
    /// Roles, sent either as a single string or an array
    #[serde(default, alias = "role", deserialize_with = "one_or_many")]
    pub roles: Vec<String>,
}

impl Claims {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(role) => vec![role],
        OneOrMany::Many(roles) => roles,
    })
}

/// Authenticated caller stored in request extensions
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Claims);

/// Extract the bearer token from the Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let token = headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Check signature, expiry, issuer and audience of `token`
pub fn validate_jwt(token: &str, auth: &AuthConfig) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[auth.valid_issuer.as_str()]);
    validation.set_audience(&[auth.valid_audience.as_str()]);

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(auth.jwt_secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}

/// Middleware that requires a valid bearer token
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers())
        .ok_or_else(|| ApiError::unauthorized("Missing authentication token"))?;

    let claims = validate_jwt(token, &state.auth).map_err(|e| {
        tracing::debug!("Rejected bearer token: {}", e);
        ApiError::unauthorized("Invalid or expired token")
    })?;

    request.extensions_mut().insert(AuthenticatedUser(claims));
    Ok(next.run(request).await)
}

/// Middleware that requires the Manager role (must run after `require_auth`)
pub async fn require_manager(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if !user.0.has_role(MANAGER_ROLE) {
        return Err(ApiError::forbidden("Manager role required"));
    }

    Ok(next.run(request).await)
}

// ============================================================================
// Rate limiting
// ============================================================================

/// Client IP from proxy headers, falling back to the socket address
pub fn extract_ip_address(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<IpAddr> {
    // X-Forwarded-For: first entry is the original client
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|h| h.to_str().ok()) {
        if let Some(ip) = forwarded.split(',').next().and_then(|ip| ip.trim().parse().ok()) {
            return Some(ip);
        }
    }

    if let Some(ip) = headers
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
        .and_then(|ip| ip.trim().parse().ok())
    {
        return Some(ip);
    }

    peer.map(|addr| addr.ip())
}

/// Middleware enforcing the per-client request limit
pub async fn rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);
    let ip = extract_ip_address(request.headers(), peer)
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    let decision = state.rate_limiter.check(ip).await;

    let mut response = if decision.allowed {
        next.run(request).await
    } else {
        tracing::warn!("Rate limit exceeded for {}", ip);
        let mut response = ApiError::with_details(
            "RATE_LIMIT",
            "API calls quota exceeded!",
            serde_json::json!({ "retry_after": decision.retry_after_secs }),
        )
        .into_response();
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from(decision.retry_after_secs));
        response
    };

    let headers = response.headers_mut();
    headers.insert("x-rate-limit-limit", HeaderValue::from(decision.limit));
    headers.insert("x-rate-limit-remaining", HeaderValue::from(decision.remaining));
    response
}

// ============================================================================
// Content negotiation
// ============================================================================

/// Scheme and authority of the request, used to build absolute links
pub fn base_url(headers: &HeaderMap) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .filter(|h| !h.is_empty())
        .unwrap_or("localhost");
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("http");
    format!("{}://{}", scheme, host)
}

/// Negotiated route context; rejects requests without a usable Accept header
#[derive(Debug, Clone)]
pub struct MediaType(pub RouteContext);

impl<S> FromRequestParts<S> for MediaType
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let accept = parts
            .headers
            .get(header::ACCEPT)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|accept| !accept.is_empty())
            .ok_or_else(|| ApiError::bad_request("Accept header is missing."))?;

        if !is_valid_accept(accept) {
            return Err(ApiError::bad_request(
                "Media type not present. Please add Accept header with the required media type.",
            ));
        }

        Ok(Self(RouteContext::from_accept(accept, base_url(&parts.headers))))
    }
}

/// Unwrap a JSON body, turning a missing or unreadable one into 400
pub fn require_body<T>(body: Result<Json<T>, JsonRejection>, name: &str) -> Result<T, ApiError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            tracing::error!("{} object sent from client is null.", name);
            tracing::debug!("Rejected body: {}", rejection.body_text());
            Err(ApiError::bad_request(format!("{} object is null", name)))
        }
    }
}

// ============================================================================
// Cache Headers
// ============================================================================

/// Build Cache-Control header for API responses
pub fn cache_control_api(max_age: u32) -> String {
    format!("public, max-age={}", max_age)
}

/// Generate ETag from content
pub fn generate_etag(content: &[u8]) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("\"{:x}\"", hasher.finish())
}

/// Check an `If-None-Match` value (`*` or a comma-separated list) against an ETag.
/// Weak comparison: the `W/` prefix is ignored on both sides.
pub fn etag_matches(if_none_match: Option<&str>, etag: &str) -> bool {
    let Some(value) = if_none_match else {
        return false;
    };
    let etag = etag.trim_start_matches("W/");
    value
        .split(',')
        .map(str::trim)
        .any(|candidate| candidate == "*" || candidate.trim_start_matches("W/") == etag)
}

/// JSON response carrying `ETag` and `Cache-Control`, or 304 when the client's
/// `If-None-Match` already names the current representation
pub fn cached_json<T: Serialize>(
    headers: &HeaderMap,
    data: &T,
    max_age: u32,
) -> Result<Response, ApiError> {
    let body = serde_json::to_vec(data).map_err(|e| {
        tracing::error!("Failed to serialize response: {}", e);
        ApiError::internal_error("Failed to serialize response")
    })?;
    let etag = generate_etag(&body);
    let cache_control = cache_control_api(max_age);

    let if_none_match = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|value| value.to_str().ok());
    if etag_matches(if_none_match, &etag) {
        return Ok((
            StatusCode::NOT_MODIFIED,
            [(header::ETAG, etag), (header::CACHE_CONTROL, cache_control)],
        )
            .into_response());
    }

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::ETAG, etag),
            (header::CACHE_CONTROL, cache_control),
        ],
        body,
    )
        .into_response())
}
