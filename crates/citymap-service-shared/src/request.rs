//! Query-string types and validation for HTTP endpoints.
//!
//! Parameter names match the ones the map front end already sends.

use serde::{Deserialize, Serialize};

use citymap_lib::{GeoPoint, RasterRequest};

use crate::ProblemDetails;

/// Validation trait for request types.
///
/// Implementations should validate all fields and return a `ProblemDetails`
/// error for invalid input.
pub trait Validate {
    /// Validate the request, returning an error if invalid.
    ///
    /// The `request_id` is used to populate the `instance` field of any
    /// returned `ProblemDetails`.
    ///
    /// Returns a boxed `ProblemDetails` to avoid large `Result::Err` variants.
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>>;
}

/// `GET /route` parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteQuery {
    pub start_lon: f64,
    pub start_lat: f64,
    pub end_lon: f64,
    pub end_lat: f64,

    /// Routing algorithm to use.
    #[serde(default)]
    pub algorithm: RouteAlgorithm,
}

impl RouteQuery {
    pub fn to_request(&self) -> citymap_lib::RouteRequest {
        citymap_lib::RouteRequest {
            start: GeoPoint::new(self.start_lon, self.start_lat),
            goal: GeoPoint::new(self.end_lon, self.end_lat),
            algorithm: self.algorithm.into(),
        }
    }
}

/// Supported routing algorithms.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RouteAlgorithm {
    /// Dijkstra's algorithm.
    Dijkstra,
    /// A* search guided by straight-line distance (default).
    #[default]
    AStar,
}

impl From<RouteAlgorithm> for citymap_lib::RouteAlgorithm {
    fn from(value: RouteAlgorithm) -> Self {
        match value {
            RouteAlgorithm::Dijkstra => citymap_lib::RouteAlgorithm::Dijkstra,
            RouteAlgorithm::AStar => citymap_lib::RouteAlgorithm::AStar,
        }
    }
}

impl Validate for RouteQuery {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        for (name, value) in [
            ("start_lon", self.start_lon),
            ("start_lat", self.start_lat),
            ("end_lon", self.end_lon),
            ("end_lat", self.end_lat),
        ] {
            if !value.is_finite() {
                return Err(Box::new(ProblemDetails::bad_request(
                    format!("The '{}' parameter must be a finite number", name),
                    request_id,
                )));
            }
        }
        Ok(())
    }
}

/// `GET /raster` parameters.
///
/// Only the output size is validated here. A viewport that is inverted or
/// lies off the map is not a client error: the raster answer simply reports
/// `query_success: false`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RasterQuery {
    pub ullon: f64,
    pub ullat: f64,
    pub lrlon: f64,
    pub lrlat: f64,
    /// Output width in pixels.
    pub w: f64,
    /// Output height in pixels.
    pub h: f64,
}

impl RasterQuery {
    pub fn to_request(&self) -> RasterRequest {
        RasterRequest::new(
            GeoPoint::new(self.ullon, self.ullat),
            GeoPoint::new(self.lrlon, self.lrlat),
            self.w,
            self.h,
        )
    }
}

impl Validate for RasterQuery {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        for (name, value) in [("w", self.w), ("h", self.h)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(Box::new(ProblemDetails::bad_request(
                    format!("The '{}' parameter must be a positive number of pixels", name),
                    request_id,
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raster(w: f64, h: f64) -> RasterQuery {
        RasterQuery {
            ullon: -122.24,
            ullat: 37.87,
            lrlon: -122.23,
            lrlat: 37.86,
            w,
            h,
        }
    }

    #[test]
    fn test_route_query_valid() {
        let query = RouteQuery {
            start_lon: -122.27,
            start_lat: 37.87,
            end_lon: -122.26,
            end_lat: 37.86,
            algorithm: RouteAlgorithm::AStar,
        };
        assert!(query.validate("test").is_ok());

        let request = query.to_request();
        assert_eq!(request.start, GeoPoint::new(-122.27, 37.87));
        assert_eq!(request.algorithm, citymap_lib::RouteAlgorithm::AStar);
    }

    #[test]
    fn test_route_query_non_finite() {
        let query = RouteQuery {
            start_lon: f64::NAN,
            start_lat: 37.87,
            end_lon: -122.26,
            end_lat: 37.86,
            algorithm: RouteAlgorithm::Dijkstra,
        };
        let err = query.validate("test").unwrap_err();
        assert!(err.detail.as_deref().unwrap().contains("'start_lon'"));
    }

    #[test]
    fn test_route_query_deserialization_defaults() {
        let json = r#"{"start_lon":-122.27,"start_lat":37.87,"end_lon":-122.26,"end_lat":37.86}"#;
        let query: RouteQuery = serde_json::from_str(json).unwrap();
        assert_eq!(query.algorithm, RouteAlgorithm::AStar);
    }

    #[test]
    fn test_route_algorithm_serialization() {
        let json = serde_json::to_string(&RouteAlgorithm::AStar).unwrap();
        assert_eq!(json, "\"a-star\"");

        let dijkstra: RouteAlgorithm = serde_json::from_str("\"dijkstra\"").unwrap();
        assert_eq!(dijkstra, RouteAlgorithm::Dijkstra);
    }

    #[test]
    fn test_raster_query_valid() {
        let query = raster(892.0, 875.0);
        assert!(query.validate("test").is_ok());
        let request = query.to_request();
        assert_eq!(request.upper_left, GeoPoint::new(-122.24, 37.87));
        assert_eq!(request.lower_right, GeoPoint::new(-122.23, 37.86));
    }

    #[test]
    fn test_raster_query_zero_width() {
        let err = raster(0.0, 100.0).validate("test").unwrap_err();
        assert!(err.detail.as_deref().unwrap().contains("'w'"));
    }

    #[test]
    fn test_raster_query_negative_height() {
        let err = raster(100.0, -1.0).validate("test").unwrap_err();
        assert!(err.detail.as_deref().unwrap().contains("'h'"));
    }

    #[test]
    fn test_raster_query_inverted_viewport_is_not_a_validation_error() {
        let mut query = raster(256.0, 256.0);
        std::mem::swap(&mut query.ullon, &mut query.lrlon);
        assert!(query.validate("test").is_ok());
        assert!(!query.to_request().is_valid());
    }
}
