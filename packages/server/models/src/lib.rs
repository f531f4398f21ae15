#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the extent narrator server.
//!
//! These types are serialized to JSON for the REST API and shared with the
//! client crate so both sides agree on the wire contract.

use extent_narrator_spatial_models::{Extent, GeoBoundingBox};
use geojson::FeatureCollection;
use serde::{Deserialize, Serialize};

/// Error message for a missing or malformed feature collection.
pub const INVALID_GEOJSON: &str = "Invalid GeoJSON: Missing or malformed features array.";

/// Error message for a malformed extent.
pub const INVALID_EXTENT: &str =
    "Invalid extent: Expected an array of 4 numbers [minX, minY, maxX, maxY].";

/// Error message when the AI provider answers with a non-success status.
pub const AI_UPSTREAM_ERROR: &str =
    "AI service error: Unable to get a response from the AI provider.";

/// Error message when the AI provider answers without readable text.
pub const AI_EMPTY_RESPONSE: &str = "AI service error: No readable text found in AI response.";

/// Error message when the AI provider cannot be reached.
pub const AI_INTERNAL_ERROR: &str = "Internal server error while communicating with AI service.";

/// Body of `POST /describe-extent` and `POST /features-in-extent`.
///
/// Fields are kept as raw JSON so the server can answer malformed input
/// with its own error messages instead of a generic deserialization error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DescribeExtentRequest {
    /// Viewport as `[minX, minY, maxX, maxY]` in Web Mercator.
    #[serde(default)]
    pub extent: serde_json::Value,
    /// The same viewport in lon/lat, if the client computed it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<serde_json::Value>,
    /// A `GeoJSON` `FeatureCollection` in WGS84.
    #[serde(default)]
    pub geojson: serde_json::Value,
}

impl DescribeExtentRequest {
    /// Builds a request from typed values.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if any value fails to serialize.
    pub fn new(
        extent: &Extent,
        bbox: Option<&GeoBoundingBox>,
        geojson: &FeatureCollection,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            extent: serde_json::to_value(extent)?,
            bbox: bbox.map(serde_json::to_value).transpose()?,
            geojson: serde_json::to_value(geojson)?,
        })
    }
}

/// Successful response from `POST /describe-extent`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeExtentResponse {
    /// Markdown description of the viewport.
    pub description: String,
    /// Number of features that intersected the extent.
    #[serde(default)]
    pub feature_count: usize,
}

/// Successful response from `POST /features-in-extent`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturesInExtentResponse {
    /// Number of features that intersected the extent.
    pub count: usize,
    /// The intersecting features, unprojected.
    pub features: FeatureCollection,
}

/// Error body returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable error.
    pub error: String,
    /// Upstream details, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// An error without details.
    #[must_use]
    pub fn new(error: &str) -> Self {
        Self {
            error: error.to_string(),
            details: None,
        }
    }

    /// An error with upstream details.
    #[must_use]
    pub fn with_details(error: &str, details: String) -> Self {
        Self {
            error: error.to_string(),
            details: Some(details),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
    /// Name of the configured AI provider.
    pub ai_provider: String,
}
