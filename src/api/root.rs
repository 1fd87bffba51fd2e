//! API root document
//!
//! GET /api lists the top level links when the client asks for hypermedia.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use crate::api::middleware::{AppState, MediaType};
use crate::services::Link;

/// Build the root router
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_root))
}

/// GET /api - Entry point links
///
/// Returns 204 when the hypermedia media type was not requested.
async fn get_root(MediaType(ctx): MediaType) -> Response {
    if !ctx.hateoas {
        return StatusCode::NO_CONTENT.into_response();
    }

    let links = vec![
        Link::new(format!("{}/api", ctx.base_url), "self", "GET"),
        Link::new(format!("{}/api/companies", ctx.base_url), "companies", "GET"),
        Link::new(format!("{}/api/companies", ctx.base_url), "create_company", "POST"),
    ];
    Json(links).into_response()
}
