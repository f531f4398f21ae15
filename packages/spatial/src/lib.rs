#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Viewport/feature intersection pipeline.
//!
//! Reprojects `GeoJSON` geometries from WGS84 into the map's projected CRS,
//! extracts a bounding box from every geometry type (including nested
//! geometry collections), and keeps the features whose bounding box
//! intersects the current viewport extent.

pub mod bbox;
pub mod collection;
pub mod filter;
pub mod reproject;

pub use collection::{feature_collection_from_value, into_feature_collection};
pub use extent_narrator_spatial_models::{Crs, Extent, ExtentError, GeoBoundingBox};
pub use filter::{ExtentMatch, features_in_extent};
pub use reproject::Reprojector;

use thiserror::Error;

/// Errors that can occur in the spatial pipeline.
#[derive(Debug, Error)]
pub enum SpatialError {
    /// A proj4 definition could not be parsed or a transform failed.
    #[error("Projection error: {0}")]
    Projection(#[from] proj4rs::errors::Error),

    /// `GeoJSON` could not be parsed or converted to geometry types.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// A coordinate was `NaN` or infinite before or after projection.
    #[error("Non-finite coordinate ({x}, {y})")]
    NonFinite {
        /// X / longitude.
        x: f64,
        /// Y / latitude.
        y: f64,
    },

    /// A `FeatureCollection` without a `features` array.
    #[error("FeatureCollection is missing its features array")]
    MissingFeatures,

    /// Extent validation failed.
    #[error("Invalid extent: {0}")]
    Extent(#[from] ExtentError),
}
