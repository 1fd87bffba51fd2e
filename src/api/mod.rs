//! API layer - HTTP handlers and routing
//!
//! This module contains all HTTP API endpoints of the CompanyEmployees service.
//! It includes:
//! - Root document
//! - Company endpoints
//! - Employee endpoints nested under their company
//! - Authentication, rate limiting and content negotiation middleware

pub mod companies;
pub mod employees;
pub mod middleware;
pub mod root;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware as axum_middleware,
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use middleware::{cache_control_api, cached_json, ApiError, AppState, MediaType};

/// Build the API router (paths relative to `/api`)
pub fn build_api_router(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(root::router())
        .merge(companies::router(state))
        .merge(employees::router())
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_allow_origin(cors_origin))
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .expose_headers([
            HeaderName::from_static(employees::PAGINATION_HEADER),
            header::LOCATION,
        ]);

    Router::new()
        .nest("/api", build_api_router(state.clone()))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `*` or an unparsable origin allows any origin
fn cors_allow_origin(cors_origin: &str) -> AllowOrigin {
    let origin = cors_origin.trim();
    if origin == "*" {
        return AllowOrigin::from(Any);
    }
    match origin.parse::<HeaderValue>() {
        Ok(value) => AllowOrigin::exact(value),
        Err(_) => {
            tracing::warn!("Invalid CORS origin '{}', allowing any origin", cors_origin);
            AllowOrigin::from(Any)
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::services::RequestRateLimiter;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_root_links() {
        let state = test_state().await;

        let request = axum::http::Request::builder()
            .uri("/api")
            .header(header::HOST, "api.test")
            .header(header::ACCEPT, crate::services::HATEOAS_MEDIA_TYPE)
            .body(axum::body::Body::empty())
            .unwrap();
        let response = send_request(&state, request).await;
        assert_eq!(response.status(), StatusCode::OK);

        let links = body_json(response).await;
        assert_eq!(links[0]["href"], "http://api.test/api");
        assert_eq!(links[1]["rel"], "companies");
        assert_eq!(links[2]["method"], "POST");
    }

    #[tokio::test]
    async fn test_root_without_hateoas_is_empty() {
        let state = test_state().await;

        let request = axum::http::Request::builder()
            .uri("/api")
            .header(header::ACCEPT, "application/json")
            .body(axum::body::Body::empty())
            .unwrap();
        let response = send_request(&state, request).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_rate_limit_headers_and_rejection() {
        let limiter = RequestRateLimiter::with_limits(2, chrono::Duration::minutes(5));
        let state = test_state_with_limiter(limiter).await;

        let response = send(&state, Method::OPTIONS, "/api/companies", None, None).await;
        assert_eq!(response.headers()["x-rate-limit-limit"], "2");
        assert_eq!(response.headers()["x-rate-limit-remaining"], "1");

        send(&state, Method::OPTIONS, "/api/companies", None, None).await;

        let response = send(&state, Method::OPTIONS, "/api/companies", None, None).await;
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key(header::RETRY_AFTER));
        assert_eq!(body_json(response).await["error"]["code"], "RATE_LIMIT");
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let state = test_state().await;
        let response = send(&state, Method::GET, "/api/unknown/route/here", None, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_cors_allow_origin_accepts_bad_input() {
        let _ = cors_allow_origin("*");
        let _ = cors_allow_origin("http://localhost:3000");
        let _ = cors_allow_origin("bad\norigin");
    }
}
