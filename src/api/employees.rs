//! Employee API endpoints
//!
//! Employees are nested under their company:
//! - GET|HEAD /api/companies/{companyId}/employees - Paged, filtered, shaped list
//! - POST /api/companies/{companyId}/employees - Create employee
//! - GET /api/companies/{companyId}/employees/{id} - Get employee
//! - PUT /api/companies/{companyId}/employees/{id} - Replace employee
//! - PATCH /api/companies/{companyId}/employees/{id} - JSON Patch employee
//! - DELETE /api/companies/{companyId}/employees/{id} - Delete employee

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::api::middleware::{base_url, require_body, ApiError, AppState, MediaType};
use crate::models::{CreateEmployeeInput, EmployeeDto, EmployeeQuery, UpdateEmployeeInput};

/// Header carrying the page metadata of list responses
pub const PAGINATION_HEADER: &str = "x-pagination";

/// Build the employee router
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/companies/{company_id}/employees",
            get(list_employees).post(create_employee),
        )
        .route(
            "/companies/{company_id}/employees/{id}",
            get(get_employee)
                .put(update_employee)
                .patch(patch_employee)
                .delete(delete_employee),
        )
}

/// GET|HEAD /api/companies/{companyId}/employees
///
/// Query: pageNumber, pageSize, orderBy, fields, minAge, maxAge, searchTerm.
/// Linked entities are returned when the hypermedia media type is accepted.
async fn list_employees(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    MediaType(ctx): MediaType,
    query: Result<Query<EmployeeQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query.map_err(|rejection| {
        tracing::error!("Invalid employee query: {}", rejection.body_text());
        ApiError::bad_request(rejection.body_text())
    })?;
    let params = query.into_parameters(&state.paging);
    let page = state
        .employee_service
        .list(company_id, &params, &ctx)
        .await?;

    let pagination = serde_json::to_string(&page.meta_data)
        .map_err(|e| ApiError::internal_error(format!("Failed to serialize metadata: {}", e)))?;
    let headers = [(PAGINATION_HEADER, pagination)];

    let response = page.response;
    Ok(if response.has_links {
        (headers, Json(response.linked_entities)).into_response()
    } else {
        (headers, Json(response.shaped_entities)).into_response()
    })
}

/// GET /api/companies/{companyId}/employees/{id}
async fn get_employee(
    State(state): State<AppState>,
    Path((company_id, id)): Path<(Uuid, Uuid)>,
) -> Result<Json<EmployeeDto>, ApiError> {
    let employee = state.employee_service.get(company_id, id).await?;
    Ok(Json(employee))
}

/// POST /api/companies/{companyId}/employees
async fn create_employee(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    headers: HeaderMap,
    body: Result<Json<CreateEmployeeInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let input = require_body(body, "EmployeeForCreationDto")?;
    let employee = state.employee_service.create(company_id, &input).await?;

    let location = format!(
        "{}/api/companies/{}/employees/{}",
        base_url(&headers),
        company_id,
        employee.id
    );
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(employee)))
}

/// PUT /api/companies/{companyId}/employees/{id}
async fn update_employee(
    State(state): State<AppState>,
    Path((company_id, id)): Path<(Uuid, Uuid)>,
    body: Result<Json<UpdateEmployeeInput>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let input = require_body(body, "EmployeeForUpdateDto")?;
    state.employee_service.update(company_id, id, &input).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/companies/{companyId}/employees/{id}
///
/// Body is an RFC 6902 document over `name`, `age` and `position`.
async fn patch_employee(
    State(state): State<AppState>,
    Path((company_id, id)): Path<(Uuid, Uuid)>,
    body: Result<Json<json_patch::Patch>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let patch = require_body(body, "patchDoc")?;
    state.employee_service.patch(company_id, id, &patch).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/companies/{companyId}/employees/{id}
async fn delete_employee(
    State(state): State<AppState>,
    Path((company_id, id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    state.employee_service.delete(company_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{body_json, send, send_request, test_state};
    use crate::services::HATEOAS_MEDIA_TYPE;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use serde_json::json;

    /// Create a company with the four sample employees, returning its id
    async fn seed(state: &AppState) -> String {
        let body = json!({
            "name": "IT_Solutions Ltd",
            "address": "583 Wall Dr. Gwynn Oak, MD 21207",
            "country": "USA",
            "employees": [
                {"name": "Sam Raiden", "age": 26, "position": "Software developer"},
                {"name": "Jana McLeaf", "age": 30, "position": "Software developer"},
                {"name": "Kane Miller", "age": 35, "position": "Administrator"},
                {"name": "Martin Samuels", "age": 45, "position": "Manager"}
            ]
        });
        let response = send(state, Method::POST, "/api/companies", None, Some(body)).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await["id"].as_str().unwrap().to_string()
    }

    async fn list(state: &AppState, uri: &str, accept: Option<&str>) -> Response {
        let mut builder = Request::builder().method(Method::GET).uri(uri).header(header::HOST, "api.test");
        if let Some(accept) = accept {
            builder = builder.header(header::ACCEPT, accept);
        }
        send_request(state, builder.body(Body::empty()).unwrap()).await
    }

    #[tokio::test]
    async fn test_list_rejects_malformed_query_as_json() {
        let state = test_state().await;
        let company = seed(&state).await;

        for query in ["minAge=-1", "pageNumber=first", "maxAge=1.5"] {
            let uri = format!("/api/companies/{}/employees?{}", company, query);
            let response = list(&state, &uri, Some("application/json")).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", query);
            assert_eq!(body_json(response).await["error"]["code"], "BAD_REQUEST");
        }
    }

    #[tokio::test]
    async fn test_list_requires_accept_header() {
        let state = test_state().await;
        let company = seed(&state).await;
        let uri = format!("/api/companies/{}/employees", company);

        let response = list(&state, &uri, None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = list(&state, &uri, Some("not a media type")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_pages_and_sets_pagination_header() {
        let state = test_state().await;
        let company = seed(&state).await;
        let uri = format!("/api/companies/{}/employees?pageNumber=2&pageSize=3&orderBy=age desc", company)
            .replace(' ', "%20");

        let response = list(&state, &uri, Some("application/json")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let pagination: serde_json::Value =
            serde_json::from_str(response.headers()[PAGINATION_HEADER].to_str().unwrap()).unwrap();
        assert_eq!(
            pagination,
            json!({"currentPage": 2, "totalPages": 2, "pageSize": 3, "totalCount": 4})
        );

        let body = body_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["name"], "Sam Raiden");
    }

    #[tokio::test]
    async fn test_list_filters_and_shapes() {
        let state = test_state().await;
        let company = seed(&state).await;
        let uri = format!(
            "/api/companies/{}/employees?minAge=27&maxAge=40&fields=Name",
            company
        );

        let response = list(&state, &uri, Some("application/json")).await;
        let body = body_json(response).await;
        assert_eq!(
            body,
            json!([
                {"name": "Jana McLeaf", "id": body[0]["id"].clone()},
                {"name": "Kane Miller", "id": body[1]["id"].clone()}
            ])
        );
        assert_eq!(body[0].as_object().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_list_rejects_invalid_age_range() {
        let state = test_state().await;
        let company = seed(&state).await;
        let uri = format!("/api/companies/{}/employees?minAge=40&maxAge=30", company);

        let response = list(&state, &uri, Some("application/json")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["error"]["message"],
            "Max age can't be less than min age."
        );
    }

    #[tokio::test]
    async fn test_list_for_missing_company() {
        let state = test_state().await;
        let uri = format!("/api/companies/{}/employees", Uuid::new_v4());

        let response = list(&state, &uri, Some("application/json")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_with_links() {
        let state = test_state().await;
        let company = seed(&state).await;
        let uri = format!("/api/companies/{}/employees?searchTerm=sam", company);

        let response = list(&state, &uri, Some(HATEOAS_MEDIA_TYPE)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;

        let value = body["value"].as_array().unwrap();
        assert_eq!(value.len(), 2);
        assert_eq!(value[0]["name"], "Martin Samuels");
        assert_eq!(value[0]["links"].as_array().unwrap().len(), 4);
        assert_eq!(
            body["links"][0]["href"],
            format!("http://api.test/api/companies/{}/employees", company)
        );
    }

    #[tokio::test]
    async fn test_head_returns_pagination_without_body() {
        let state = test_state().await;
        let company = seed(&state).await;
        let request = Request::builder()
            .method(Method::HEAD)
            .uri(format!("/api/companies/{}/employees", company))
            .header(header::ACCEPT, "application/json")
            .body(Body::empty())
            .unwrap();

        let response = send_request(&state, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(PAGINATION_HEADER));
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_employee_crud() {
        let state = test_state().await;
        let company = seed(&state).await;
        let collection = format!("/api/companies/{}/employees", company);

        let response = send(
            &state,
            Method::POST,
            &collection,
            None,
            Some(json!({"name": "Aeron Black", "age": 31, "position": "Tester"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let id = body_json(response).await["id"].as_str().unwrap().to_string();
        let uri = format!("{}/{}", collection, id);

        let response = send(
            &state,
            Method::PUT,
            &uri,
            None,
            Some(json!({"name": "Aeron Black", "age": 32, "position": "Lead tester"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let body = body_json(send(&state, Method::GET, &uri, None, None).await).await;
        assert_eq!(body["age"], 32);
        assert_eq!(body["position"], "Lead tester");

        let response = send(&state, Method::DELETE, &uri, None, None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let response = send(&state, Method::GET, &uri, None, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_employee_validation() {
        let state = test_state().await;
        let company = seed(&state).await;
        let collection = format!("/api/companies/{}/employees", company);

        let response = send(
            &state,
            Method::POST,
            &collection,
            None,
            Some(json!({"name": "Too Young", "age": 16, "position": "Intern"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body_json(response).await["error"]["details"]["age"][0],
            "Age is required and it can't be lower than 18"
        );
    }

    #[tokio::test]
    async fn test_patch_employee() {
        let state = test_state().await;
        let company = seed(&state).await;
        let collection = format!("/api/companies/{}/employees", company);
        let response = send(
            &state,
            Method::POST,
            &collection,
            None,
            Some(json!({"name": "Patch Me", "age": 30, "position": "Dev"})),
        )
        .await;
        let id = body_json(response).await["id"].as_str().unwrap().to_string();
        let uri = format!("{}/{}", collection, id);

        let patch = json!([{"op": "replace", "path": "/age", "value": 33}]);
        let response = send(&state, Method::PATCH, &uri, None, Some(patch)).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(body_json(send(&state, Method::GET, &uri, None, None).await).await["age"], 33);

        let patch = json!([{"op": "replace", "path": "/age", "value": 12}]);
        let response = send(&state, Method::PATCH, &uri, None, Some(patch)).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let patch = json!([{"op": "remove", "path": "/missing"}]);
        let response = send(&state, Method::PATCH, &uri, None, Some(patch)).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = send(&state, Method::PATCH, &uri, None, None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["message"], "patchDoc object is null");
    }
}
