//! Parsing viewports typed on the command line.

use extent_narrator_spatial::{Extent, ExtentError, Reprojector, SpatialError};
use thiserror::Error;

/// Errors from viewport parsing.
#[derive(Debug, Error)]
pub enum ViewportError {
    /// A component is not a number.
    #[error("'{0}' is not a number")]
    NotANumber(String),

    /// The numbers do not form a valid extent.
    #[error(transparent)]
    Extent(#[from] ExtentError),

    /// A lon/lat box could not be projected.
    #[error(transparent)]
    Spatial(#[from] SpatialError),
}

/// Parses `a,b,c,d` (spaces allowed) into an extent.
///
/// # Errors
///
/// Returns [`ViewportError`] if a component is not a number or the values
/// do not form a valid extent.
pub fn parse_extent(text: &str) -> Result<Extent, ViewportError> {
    let values = text
        .split(',')
        .map(|part| {
            let part = part.trim();
            part.parse::<f64>()
                .map_err(|_| ViewportError::NotANumber(part.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Extent::from_slice(&values)?)
}

/// Parses `west,south,east,north` in degrees and projects it to a Web
/// Mercator extent.
///
/// # Errors
///
/// Same as [`parse_extent`], plus [`ViewportError::Spatial`] if the
/// projection fails.
pub fn parse_bbox(text: &str, to_map: &Reprojector) -> Result<Extent, ViewportError> {
    let lon_lat = parse_extent(text)?;
    Ok(to_map.project_extent(&lon_lat)?)
}
