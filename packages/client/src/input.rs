//! Loading `GeoJSON` input.

use std::path::Path;

use extent_narrator_spatial::into_feature_collection;
use geojson::{FeatureCollection, GeoJson};

use crate::ClientError;

/// Parses text as `GeoJSON`. A lone feature or geometry is wrapped into a
/// single-feature collection.
///
/// # Errors
///
/// Returns [`ClientError::InvalidGeoJson`] if the text is not valid JSON
/// or not valid `GeoJSON`.
pub fn parse_geojson_input(text: &str) -> Result<FeatureCollection, ClientError> {
    let geojson: GeoJson = text.parse()?;
    let collection = into_feature_collection(geojson);
    log::debug!("Loaded {} features", collection.features.len());
    Ok(collection)
}

/// Reads and parses a `GeoJSON` file.
///
/// # Errors
///
/// Returns [`ClientError::Io`] if the file cannot be read, or
/// [`ClientError::InvalidGeoJson`] if it does not parse.
pub fn read_geojson_file(path: &Path) -> Result<FeatureCollection, ClientError> {
    let text = std::fs::read_to_string(path).map_err(|source| ClientError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_geojson_input(&text)
}
