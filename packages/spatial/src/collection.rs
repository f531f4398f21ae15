//! Normalizing arbitrary `GeoJSON` into a feature collection.

use geojson::{Feature, FeatureCollection, GeoJson};
use serde_json::Value;

use crate::SpatialError;

/// Wraps a lone feature or geometry into a single-feature collection.
/// Collections pass through unchanged.
#[must_use]
pub fn into_feature_collection(geojson: GeoJson) -> FeatureCollection {
    match geojson {
        GeoJson::FeatureCollection(collection) => collection,
        GeoJson::Feature(feature) => collection_of(vec![feature]),
        GeoJson::Geometry(geometry) => collection_of(vec![Feature::from(geometry)]),
    }
}

/// Parses a JSON value as `GeoJSON` and normalizes it into a collection.
///
/// A `FeatureCollection` only needs a `features` array. Each entry is
/// parsed on its own, and entries that are not valid features (short
/// positions, unknown geometry types, non-objects) are dropped with a
/// warning. A lone feature or geometry must parse as a whole.
///
/// # Errors
///
/// Returns [`SpatialError::MissingFeatures`] for a collection without a
/// `features` array, or [`SpatialError::GeoJson`] if a non-collection value
/// is not valid `GeoJSON`.
pub fn feature_collection_from_value(value: Value) -> Result<FeatureCollection, SpatialError> {
    match value {
        Value::Object(mut object)
            if object.get("type").and_then(Value::as_str) == Some("FeatureCollection") =>
        {
            let Some(Value::Array(entries)) = object.remove("features") else {
                return Err(SpatialError::MissingFeatures);
            };
            Ok(collection_of(parse_features(entries)))
        }
        other => Ok(into_feature_collection(GeoJson::from_json_value(other)?)),
    }
}

fn parse_features(entries: Vec<Value>) -> Vec<Feature> {
    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match Feature::from_json_value(entry) {
            Ok(feature) => Some(feature),
            Err(e) => {
                log::warn!("Skipping malformed feature {index}: {e}");
                None
            }
        })
        .collect()
}

fn collection_of(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn passes_collections_through() {
        let fc = feature_collection_from_value(json!({
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "geometry": null, "properties": {} },
                { "type": "Feature", "geometry": { "type": "Point", "coordinates": [1, 2] }, "properties": {} }
            ]
        }))
        .unwrap();
        assert_eq!(fc.features.len(), 2);
    }

    #[test]
    fn drops_malformed_features_and_keeps_the_rest() {
        let fc = feature_collection_from_value(json!({
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "id": "good", "geometry": { "type": "Point", "coordinates": [2.35, 48.85] }, "properties": {} },
                { "type": "Feature", "geometry": { "type": "Point", "coordinates": [1] }, "properties": {} },
                { "type": "Feature", "geometry": { "type": "Circle", "coordinates": [0, 0], "radius": 5 }, "properties": {} },
                42,
                { "type": "Feature", "id": "also-good", "geometry": null, "properties": null }
            ]
        }))
        .unwrap();

        let ids: Vec<String> = fc
            .features
            .iter()
            .map(|f| match &f.id {
                Some(geojson::feature::Id::String(s)) => s.clone(),
                other => panic!("unexpected id {other:?}"),
            })
            .collect();
        assert_eq!(ids, vec!["good", "also-good"]);
    }

    #[test]
    fn collection_without_features_array_is_rejected() {
        assert!(matches!(
            feature_collection_from_value(json!({ "type": "FeatureCollection" })),
            Err(SpatialError::MissingFeatures)
        ));
        assert!(matches!(
            feature_collection_from_value(json!({ "type": "FeatureCollection", "features": {} })),
            Err(SpatialError::MissingFeatures)
        ));
    }

    #[test]
    fn wraps_single_feature() {
        let fc = feature_collection_from_value(json!({
            "type": "Feature",
            "id": "solo",
            "geometry": { "type": "Point", "coordinates": [1, 2] },
            "properties": null
        }))
        .unwrap();
        assert_eq!(fc.features.len(), 1);
        assert!(fc.features[0].id.is_some());
    }

    #[test]
    fn wraps_bare_geometry() {
        let fc = feature_collection_from_value(json!({
            "type": "LineString",
            "coordinates": [[0, 0], [1, 1]]
        }))
        .unwrap();
        assert_eq!(fc.features.len(), 1);
        assert!(fc.features[0].geometry.is_some());
    }

    #[test]
    fn rejects_non_geojson() {
        assert!(feature_collection_from_value(json!({ "features": "nope" })).is_err());
        assert!(feature_collection_from_value(json!([1, 2, 3])).is_err());
        assert!(feature_collection_from_value(Value::Null).is_err());
    }
}
