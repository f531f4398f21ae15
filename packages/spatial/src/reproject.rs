//! Coordinate reprojection between geographic and projected CRSs.
//!
//! Wraps a pair of [`proj4rs::Proj`] definitions. `proj4rs` works in
//! radians for geographic systems, so degree conversion happens here and
//! callers only ever see degrees or metres.

use extent_narrator_spatial_models::{Crs, Extent};
use geo::{Coord, MapCoords};
use proj4rs::Proj;

use crate::SpatialError;

/// Latitude limit of the Web Mercator square, in degrees.
pub const WEB_MERCATOR_MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Half the Web Mercator world width, in metres (`6378137 * PI`).
pub const WEB_MERCATOR_HALF_WORLD: f64 = 20_037_508.342_789_244;

/// Transforms coordinates from one CRS to another.
pub struct Reprojector {
    from: Crs,
    to: Crs,
    src: Proj,
    dst: Proj,
}

impl std::fmt::Debug for Reprojector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reprojector")
            .field("from", &self.from)
            .field("to", &self.to)
            .finish_non_exhaustive()
    }
}

impl Reprojector {
    /// Builds a reprojector between two coordinate reference systems.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::Projection`] if either proj4 definition fails
    /// to parse.
    pub fn new(from: Crs, to: Crs) -> Result<Self, SpatialError> {
        Ok(Self {
            from,
            to,
            src: Proj::from_proj_string(from.proj_string())?,
            dst: Proj::from_proj_string(to.proj_string())?,
        })
    }

    /// WGS84 degrees to Web Mercator metres.
    ///
    /// # Errors
    ///
    /// See [`Reprojector::new`].
    pub fn wgs84_to_web_mercator() -> Result<Self, SpatialError> {
        Self::new(Crs::Wgs84, Crs::WebMercator)
    }

    /// Web Mercator metres to WGS84 degrees.
    ///
    /// # Errors
    ///
    /// See [`Reprojector::new`].
    pub fn web_mercator_to_wgs84() -> Result<Self, SpatialError> {
        Self::new(Crs::WebMercator, Crs::Wgs84)
    }

    /// Source CRS.
    #[must_use]
    pub const fn from_crs(&self) -> Crs {
        self.from
    }

    /// Target CRS.
    #[must_use]
    pub const fn to_crs(&self) -> Crs {
        self.to
    }

    /// Projects a single coordinate.
    ///
    /// Latitudes are clamped to the Web Mercator limit when projecting into
    /// Web Mercator, so polar input maps onto the edge of the world square
    /// instead of infinity.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::NonFinite`] for non-finite input or output,
    /// or [`SpatialError::Projection`] if `proj4rs` rejects the point.
    pub fn project_coord(&self, coord: Coord<f64>) -> Result<Coord<f64>, SpatialError> {
        if !coord.x.is_finite() || !coord.y.is_finite() {
            return Err(SpatialError::NonFinite {
                x: coord.x,
                y: coord.y,
            });
        }
        if self.from == self.to {
            return Ok(coord);
        }

        let (mut x, mut y) = (coord.x, coord.y);

        if self.from.is_geographic() {
            if self.to == Crs::WebMercator {
                y = y.clamp(-WEB_MERCATOR_MAX_LATITUDE, WEB_MERCATOR_MAX_LATITUDE);
            }
            x = x.to_radians();
            y = y.to_radians();
        }

        let mut point = (x, y, 0.0);
        proj4rs::transform::transform(&self.src, &self.dst, &mut point)?;

        let (mut x, mut y) = (point.0, point.1);
        if self.to.is_geographic() {
            x = x.to_degrees();
            y = y.to_degrees();
        }

        if !x.is_finite() || !y.is_finite() {
            return Err(SpatialError::NonFinite { x, y });
        }

        Ok(Coord { x, y })
    }

    /// Converts a `GeoJSON` geometry to [`geo::Geometry`] and projects every
    /// coordinate. Geometry collections are handled recursively.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::GeoJson`] if the geometry cannot be converted
    /// or any error from [`Reprojector::project_coord`].
    pub fn project_geometry(
        &self,
        geometry: &geojson::Geometry,
    ) -> Result<geo::Geometry<f64>, SpatialError> {
        let geometry: geo::Geometry<f64> = geometry.value.clone().try_into()?;
        geometry.try_map_coords(|coord| self.project_coord(coord))
    }

    /// Projects both corners of an extent.
    ///
    /// # Errors
    ///
    /// Returns an error if either corner fails to project.
    pub fn project_extent(&self, extent: &Extent) -> Result<Extent, SpatialError> {
        let min = self.project_coord(Coord {
            x: extent.min_x,
            y: extent.min_y,
        })?;
        let max = self.project_coord(Coord {
            x: extent.max_x,
            y: extent.max_y,
        })?;

        Ok(Extent::new(
            min.x.min(max.x),
            min.y.min(max.y),
            min.x.max(max.x),
            min.y.max(max.y),
        )?)
    }
}
