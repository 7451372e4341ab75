//! RFC 9457 Problem Details for HTTP APIs.
//!
//! See: <https://www.rfc-editor.org/rfc/rfc9457.html>

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use citymap_lib::Error as LibError;

/// Problem type URI for invalid request parameters.
pub const PROBLEM_INVALID_REQUEST: &str = "/problems/invalid-request";

/// Problem type URI for routes that cannot be found.
pub const PROBLEM_ROUTE_NOT_FOUND: &str = "/problems/route-not-found";

/// Problem type URI for tiles outside the index or missing from the store.
pub const PROBLEM_TILE_NOT_FOUND: &str = "/problems/tile-not-found";

/// Problem type URI for internal server errors.
pub const PROBLEM_INTERNAL_ERROR: &str = "/problems/internal-error";

/// Problem type URI for service unavailable (e.g., empty graph).
pub const PROBLEM_SERVICE_UNAVAILABLE: &str = "/problems/service-unavailable";

/// RFC 9457 Problem Details response structure.
///
/// # Example
///
/// ```
/// use citymap_service_shared::{ProblemDetails, PROBLEM_TILE_NOT_FOUND};
/// use axum::http::StatusCode;
///
/// let problem = ProblemDetails::new(
///     PROBLEM_TILE_NOT_FOUND,
///     "Tile Not Found",
///     StatusCode::NOT_FOUND,
/// )
/// .with_detail("No tile with id 15")
/// .with_request_id("req-12345");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDetails {
    /// URI reference identifying the problem type (relative).
    #[serde(rename = "type")]
    pub type_uri: String,

    /// Short, human-readable summary of the problem.
    pub title: String,

    /// HTTP status code for this problem.
    pub status: u16,

    /// Human-readable explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Request identifier of the failing request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,

    /// Content type for this response (always "application/problem+json").
    pub content_type: String,
}

impl ProblemDetails {
    pub fn new(type_uri: impl Into<String>, title: impl Into<String>, status: StatusCode) -> Self {
        Self {
            type_uri: type_uri.into(),
            title: title.into(),
            status: status.as_u16(),
            detail: None,
            instance: None,
            content_type: "application/problem+json".to_string(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.instance = Some(request_id.into());
        self
    }

    /// 400 Bad Request for invalid input.
    pub fn bad_request(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INVALID_REQUEST,
            "Invalid Request",
            StatusCode::BAD_REQUEST,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// 404 Not Found for a pair of intersections with no connecting route.
    pub fn route_not_found(start: i64, goal: i64, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_ROUTE_NOT_FOUND,
            "Route Not Found",
            StatusCode::NOT_FOUND,
        )
        .with_detail(format!("No route exists from node {} to node {}", start, goal))
        .with_request_id(request_id)
    }

    /// 404 Not Found for an unknown tile or a tile without an image.
    pub fn tile_not_found(id: u64, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_TILE_NOT_FOUND,
            "Tile Not Found",
            StatusCode::NOT_FOUND,
        )
        .with_detail(format!("No tile image for id {}", id))
        .with_request_id(request_id)
    }

    /// 500 Internal Server Error.
    pub fn internal_error(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INTERNAL_ERROR,
            "Internal Error",
            StatusCode::INTERNAL_SERVER_ERROR,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// 503 Service Unavailable.
    pub fn service_unavailable(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_SERVICE_UNAVAILABLE,
            "Service Unavailable",
            StatusCode::SERVICE_UNAVAILABLE,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }
}

impl std::fmt::Display for ProblemDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.title,
            self.detail.as_deref().unwrap_or("")
        )
    }
}

impl std::error::Error for ProblemDetails {}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut response = Json(&self).into_response();
        response.headers_mut().insert(
            axum::http::header::CONTENT_TYPE,
            axum::http::HeaderValue::from_static("application/problem+json"),
        );

        *response.status_mut() = status;
        response
    }
}

/// Convert library errors to ProblemDetails.
///
/// The `request_id` must be provided separately since library errors don't have it.
pub fn from_lib_error(error: &LibError, request_id: &str) -> ProblemDetails {
    match error {
        LibError::RouteNotFound { start, goal } => {
            ProblemDetails::route_not_found(*start, *goal, request_id)
        }
        LibError::UnknownTile { id } | LibError::TileImageNotFound { id, .. } => {
            ProblemDetails::tile_not_found(*id, request_id)
        }
        LibError::InvalidRoutePoint { .. } | LibError::UnknownNode { .. } => {
            ProblemDetails::bad_request(error.to_string(), request_id)
        }
        LibError::EmptyGraph => {
            ProblemDetails::service_unavailable("No road graph is loaded", request_id)
        }
        LibError::GraphDataNotFound { path } => ProblemDetails::service_unavailable(
            format!("Graph data not available at {}", path.display()),
            request_id,
        ),
        _ => ProblemDetails::internal_error(error.to_string(), request_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_problem_details_new() {
        let problem = ProblemDetails::new(
            PROBLEM_TILE_NOT_FOUND,
            "Tile Not Found",
            StatusCode::NOT_FOUND,
        );
        assert_eq!(problem.type_uri, PROBLEM_TILE_NOT_FOUND);
        assert_eq!(problem.title, "Tile Not Found");
        assert_eq!(problem.status, 404);
        assert_eq!(problem.content_type, "application/problem+json");
    }

    #[test]
    fn test_problem_details_bad_request() {
        let problem = ProblemDetails::bad_request("Invalid query", "req-123");
        assert_eq!(problem.status, 400);
        assert_eq!(problem.instance.as_deref(), Some("req-123"));
    }

    #[test]
    fn test_problem_details_serialization() {
        let problem = ProblemDetails::bad_request("Test error", "req-test");
        let json = serde_json::to_string(&problem).unwrap();

        assert!(json.contains("\"type\":\"/problems/invalid-request\""));
        assert!(json.contains("\"title\":\"Invalid Request\""));
        assert!(json.contains("\"status\":400"));
        assert!(json.contains("\"detail\":\"Test error\""));
        assert!(json.contains("\"instance\":\"req-test\""));
    }

    #[test]
    fn test_problem_details_into_response_sets_status_and_content_type() {
        let response = ProblemDetails::tile_not_found(15, "req-tile").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers()[axum::http::header::CONTENT_TYPE],
            "application/problem+json"
        );
    }

    #[test]
    fn test_from_lib_error_route_not_found() {
        let error = LibError::RouteNotFound { start: 4, goal: 9 };
        let problem = from_lib_error(&error, "req-route");

        assert_eq!(problem.type_uri, PROBLEM_ROUTE_NOT_FOUND);
        assert!(problem.detail.as_deref().unwrap().contains("node 4"));
        assert!(problem.detail.as_deref().unwrap().contains("node 9"));
    }

    #[test]
    fn test_from_lib_error_tiles() {
        let unknown = from_lib_error(&LibError::UnknownTile { id: 19 }, "req-a");
        assert_eq!(unknown.type_uri, PROBLEM_TILE_NOT_FOUND);
        assert_eq!(unknown.status, 404);

        let missing = from_lib_error(
            &LibError::TileImageNotFound {
                id: 12,
                path: PathBuf::from("/data/img/12.png"),
            },
            "req-b",
        );
        assert_eq!(missing.type_uri, PROBLEM_TILE_NOT_FOUND);
        assert!(missing.detail.as_deref().unwrap().contains("12"));
    }

    #[test]
    fn test_from_lib_error_fallbacks() {
        assert_eq!(from_lib_error(&LibError::EmptyGraph, "req").status, 503);
        assert_eq!(
            from_lib_error(&LibError::DuplicateNode { id: 3 }, "req").type_uri,
            PROBLEM_INTERNAL_ERROR
        );
    }
}
