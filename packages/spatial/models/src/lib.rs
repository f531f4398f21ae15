#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Coordinate reference system and extent types.
//!
//! These are the plain value types shared by the spatial pipeline, the
//! server request/response types, and the client. They carry no projection
//! logic; see `extent_narrator_spatial` for that.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coordinate reference systems understood by the narrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Crs {
    /// Geographic WGS84 longitude/latitude in degrees (`EPSG:4326`).
    #[serde(rename = "EPSG:4326")]
    Wgs84,
    /// Spherical Web Mercator in metres (`EPSG:3857`).
    #[serde(rename = "EPSG:3857")]
    WebMercator,
}

impl Crs {
    /// The EPSG code, e.g. `"EPSG:3857"`.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Wgs84 => "EPSG:4326",
            Self::WebMercator => "EPSG:3857",
        }
    }

    /// The proj4 definition string for this CRS.
    #[must_use]
    pub const fn proj_string(self) -> &'static str {
        match self {
            Self::Wgs84 => "+proj=longlat +ellps=WGS84 +datum=WGS84 +no_defs",
            Self::WebMercator => {
                "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +no_defs"
            }
        }
    }

    /// Whether coordinates are angular (degrees) rather than linear.
    #[must_use]
    pub const fn is_geographic(self) -> bool {
        matches!(self, Self::Wgs84)
    }
}

impl std::fmt::Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Errors produced when validating raw extent values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtentError {
    /// Wrong number of values.
    #[error("expected 4 values [minX, minY, maxX, maxY], got {0}")]
    Arity(usize),

    /// A value was `NaN` or infinite.
    #[error("extent value at index {0} is not a finite number")]
    NotFinite(usize),

    /// A minimum was greater than its maximum.
    #[error("extent minimum exceeds maximum ({min} > {max})")]
    Inverted {
        /// The offending minimum.
        min: f64,
        /// The offending maximum.
        max: f64,
    },
}

/// A map viewport in projected coordinates.
///
/// Serialized as the array `[minX, minY, maxX, maxY]`, which is what map
/// widgets hand out from their view's `calculateExtent`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "[f64; 4]")]
pub struct Extent {
    /// Minimum x (west).
    pub min_x: f64,
    /// Minimum y (south).
    pub min_y: f64,
    /// Maximum x (east).
    pub max_x: f64,
    /// Maximum y (north).
    pub max_y: f64,
}

impl Extent {
    /// Validates and builds an extent from its four corner values.
    ///
    /// # Errors
    ///
    /// Returns [`ExtentError`] if any value is non-finite or if a minimum
    /// exceeds its maximum.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<Self, ExtentError> {
        Self::from_slice(&[min_x, min_y, max_x, max_y])
    }

    /// Builds an extent from a `[minX, minY, maxX, maxY]` slice.
    ///
    /// # Errors
    ///
    /// Returns [`ExtentError`] if the slice does not hold exactly four
    /// finite values in min/max order.
    pub fn from_slice(values: &[f64]) -> Result<Self, ExtentError> {
        let [min_x, min_y, max_x, max_y] = <[f64; 4]>::try_from(values)
            .map_err(|_| ExtentError::Arity(values.len()))?;

        if let Some(idx) = values.iter().position(|v| !v.is_finite()) {
            return Err(ExtentError::NotFinite(idx));
        }
        if min_x > max_x {
            return Err(ExtentError::Inverted {
                min: min_x,
                max: max_x,
            });
        }
        if min_y > max_y {
            return Err(ExtentError::Inverted {
                min: min_y,
                max: max_y,
            });
        }

        Ok(Self {
            min_x,
            min_y,
            max_x,
            max_y,
        })
    }

    /// Horizontal span.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Vertical span.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Midpoint as `(x, y)`.
    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (
            self.min_x + self.width() / 2.0,
            self.min_y + self.height() / 2.0,
        )
    }

    /// The extent as `[minX, minY, maxX, maxY]`.
    #[must_use]
    pub const fn to_array(&self) -> [f64; 4] {
        [self.min_x, self.min_y, self.max_x, self.max_y]
    }
}

impl TryFrom<Vec<f64>> for Extent {
    type Error = ExtentError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::from_slice(&values)
    }
}

impl From<Extent> for [f64; 4] {
    fn from(extent: Extent) -> Self {
        extent.to_array()
    }
}

impl std::fmt::Display for Extent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}]",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}

/// A geographic bounding box in WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBoundingBox {
    /// Western longitude boundary.
    pub west: f64,
    /// Southern latitude boundary.
    pub south: f64,
    /// Eastern longitude boundary.
    pub east: f64,
    /// Northern latitude boundary.
    pub north: f64,
}

impl GeoBoundingBox {
    /// Creates a new bounding box from the given coordinates.
    #[must_use]
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }
}
