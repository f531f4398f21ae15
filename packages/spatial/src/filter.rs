//! Filters a feature collection down to the features inside a viewport.

use extent_narrator_spatial_models::Extent;
use geo::Rect;
use geojson::{Feature, FeatureCollection, feature::Id};

use crate::bbox::{bboxes_intersect, extent_rect, geometry_bbox};
use crate::{Reprojector, SpatialError};

/// Label used when a feature carries no identifier.
pub const UNNAMED_FEATURE: &str = "Unnamed Feature";

/// A feature whose projected bounding box intersects the extent.
#[derive(Debug, Clone)]
pub struct ExtentMatch<'a> {
    /// Position of the feature in the input collection.
    pub index: usize,
    /// The input feature, unprojected.
    pub feature: &'a Feature,
    /// `GeoJSON` geometry type name, e.g. `"Polygon"`.
    pub geometry_type: &'static str,
    /// Bounding box in the reprojector's target CRS.
    pub bbox: Rect<f64>,
}

impl ExtentMatch<'_> {
    /// Display identifier for the feature.
    ///
    /// Prefers a `_id` foreign member, then the `GeoJSON` `id`, falling back
    /// to [`UNNAMED_FEATURE`].
    #[must_use]
    pub fn label(&self) -> String {
        feature_label(self.feature)
    }
}

/// Display identifier for a feature. See [`ExtentMatch::label`].
#[must_use]
pub fn feature_label(feature: &Feature) -> String {
    let foreign_id = feature
        .foreign_members
        .as_ref()
        .and_then(|members| members.get("_id"))
        .and_then(|value| match value {
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

    foreign_id
        .or_else(|| match &feature.id {
            Some(Id::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Id::Number(n)) => Some(n.to_string()),
            _ => None,
        })
        .unwrap_or_else(|| UNNAMED_FEATURE.to_string())
}

/// `GeoJSON` type name of a geometry value.
#[must_use]
pub const fn geometry_type_name(value: &geojson::Value) -> &'static str {
    match value {
        geojson::Value::Point(_) => "Point",
        geojson::Value::MultiPoint(_) => "MultiPoint",
        geojson::Value::LineString(_) => "LineString",
        geojson::Value::MultiLineString(_) => "MultiLineString",
        geojson::Value::Polygon(_) => "Polygon",
        geojson::Value::MultiPolygon(_) => "MultiPolygon",
        geojson::Value::GeometryCollection(_) => "GeometryCollection",
    }
}

/// Projected bounding box of a feature.
///
/// Returns `Ok(None)` when the feature has no geometry or its geometry has
/// no coordinates.
///
/// # Errors
///
/// Returns [`SpatialError`] if the geometry cannot be converted or
/// projected.
pub fn feature_bbox(
    feature: &Feature,
    reprojector: &Reprojector,
) -> Result<Option<Rect<f64>>, SpatialError> {
    let Some(geometry) = &feature.geometry else {
        return Ok(None);
    };
    let projected = reprojector.project_geometry(geometry)?;
    Ok(geometry_bbox(&projected))
}

/// Returns the features whose projected bounding box intersects `extent`,
/// in input order.
///
/// Features without geometry or without coordinates are skipped. Features
/// that fail to project are skipped with a warning rather than failing the
/// whole collection.
#[must_use]
pub fn features_in_extent<'a>(
    collection: &'a FeatureCollection,
    extent: &Extent,
    reprojector: &Reprojector,
) -> Vec<ExtentMatch<'a>> {
    let viewport = extent_rect(extent);

    collection
        .features
        .iter()
        .enumerate()
        .filter_map(|(index, feature)| {
            let geometry = feature.geometry.as_ref()?;
            let bbox = match feature_bbox(feature, reprojector) {
                Ok(Some(bbox)) => bbox,
                Ok(None) => {
                    log::debug!("Feature {index} has no coordinates, skipping");
                    return None;
                }
                Err(e) => {
                    log::warn!("Failed to project feature {index}: {e}");
                    return None;
                }
            };

            bboxes_intersect(&viewport, &bbox).then(|| ExtentMatch {
                index,
                feature,
                geometry_type: geometry_type_name(&geometry.value),
                bbox,
            })
        })
        .collect()
}
