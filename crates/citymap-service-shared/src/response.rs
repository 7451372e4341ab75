//! JSON body for route and raster answers.

use axum::{
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Successful JSON answer that must never be served from a cache.
///
/// Route and raster answers depend on the current route held by the
/// service, so the same URL can legitimately answer differently between
/// calls. The payload is serialized as-is.
#[derive(Debug, Clone)]
pub struct ServiceResponse<T>(pub T);

impl<T> ServiceResponse<T> {
    pub fn new(data: T) -> Self {
        Self(data)
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: Serialize> IntoResponse for ServiceResponse<T> {
    fn into_response(self) -> Response {
        let mut response = Json(self.0).into_response();
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
        response
    }
}
