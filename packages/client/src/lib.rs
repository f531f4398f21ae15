#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Client side of the extent narrator.
//!
//! Loads `GeoJSON` input, gates requests through a minimum-interval
//! throttle, and talks to the narrator API over HTTP.

pub mod client;
pub mod input;
pub mod throttle;

pub use client::NarratorClient;
pub use input::{parse_geojson_input, read_geojson_file};
pub use throttle::RequestThrottle;

use extent_narrator_spatial::SpatialError;
use thiserror::Error;

/// Errors from the client crate.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The input text is not valid JSON or not valid `GeoJSON`.
    #[error("Invalid GeoJSON input: {0}")]
    InvalidGeoJson(#[from] geojson::Error),

    /// An input file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File that failed to read.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// HTTP transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A request body could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The extent could not be converted to lon/lat.
    #[error("Spatial error: {0}")]
    Spatial(#[from] SpatialError),

    /// The server answered with a non-success status.
    #[error("Server returned {status}: {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// The `error` field of the response, or the raw body.
        message: String,
        /// Upstream details, when the server forwarded them.
        details: Option<String>,
    },
}
