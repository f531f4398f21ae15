//! Prompt construction for viewport descriptions.

use std::fmt::Write as _;

use extent_narrator_spatial::bbox::rect_to_array;
use extent_narrator_spatial::{Extent, ExtentMatch, GeoBoundingBox};

/// Placeholder used in place of the feature list when nothing intersects
/// the viewport. The instructions refer to it verbatim.
pub const NO_FEATURES_SENTINEL: &str = "No GeoJSON features found in this area.";

/// Textual block describing one matched feature.
#[must_use]
pub fn describe_feature(matched: &ExtentMatch<'_>) -> String {
    let [min_x, min_y, max_x, max_y] = rect_to_array(&matched.bbox);
    let properties = properties_json(matched.feature);

    format!(
        "Feature ID: {label}\n  Type: {kind}\n  Reprojected BBox (Web Mercator): [{min_x}, {min_y}, {max_x}, {max_y}]\n  Properties: {properties}",
        label = matched.label(),
        kind = matched.geometry_type,
    )
}

/// Feature properties as compact JSON, `{}` when absent.
#[must_use]
pub fn properties_json(feature: &geojson::Feature) -> String {
    feature
        .properties
        .as_ref()
        .map_or_else(|| "{}".to_string(), |p| serde_json::Value::Object(p.clone()).to_string())
}

/// Builds the full prompt for an extent and the features inside it.
#[must_use]
pub fn build_prompt(
    extent: &Extent,
    bbox: Option<&GeoBoundingBox>,
    matches: &[ExtentMatch<'_>],
) -> String {
    let features = if matches.is_empty() {
        NO_FEATURES_SENTINEL.to_string()
    } else {
        matches
            .iter()
            .map(describe_feature)
            .collect::<Vec<_>>()
            .join("\n\n")
    };

    let mut prompt = String::from(
        "You are an AI geospatial assistant. Describe the features visible in the map extent.\n",
    );
    let _ = writeln!(prompt, "Map Extent Viewport (Web Mercator): {extent}");
    if let Some(b) = bbox {
        let _ = writeln!(
            prompt,
            "Map Extent Viewport (WGS84 lon/lat): west {}, south {}, east {}, north {}",
            b.west, b.south, b.east, b.north
        );
    }
    let _ = write!(
        prompt,
        "\nDetailed GeoJSON Features found within the extent:\n{features}\n\n"
    );
    prompt.push_str(INSTRUCTIONS);
    prompt
}

const INSTRUCTIONS: &str = "Return a clear, human-readable summary of what is in the viewport. \
Begin by describing the geographic area the viewport covers: major landforms, cities, mountain \
ranges, rivers and other geographic features you know of that lie within this extent. Describe \
only what is inside the viewport; do not describe the surrounding environment, climate or \
vegetation. Check the bounds carefully so the description is accurate for this exact extent. \
Then, if GeoJSON features were provided above, describe their geographic types, key properties \
and spatial relationships within the extent, noting first that they come from the provided \
GeoJSON. If the feature list above reads exactly 'No GeoJSON features found in this area.', \
just say that no features were provided. Be concise but informative.\n";

#[cfg(test)]
mod tests {
    use extent_narrator_spatial::{Reprojector, features_in_extent};
    use geojson::{FeatureCollection, GeoJson};

    use super::*;

    fn collection(json: &str) -> FeatureCollection {
        let GeoJson::FeatureCollection(fc) = json.parse::<GeoJson>().unwrap() else {
            panic!("expected feature collection");
        };
        fc
    }

    fn world() -> Extent {
        Extent::new(-20_037_508.0, -20_037_508.0, 20_037_508.0, 20_037_508.0).unwrap()
    }

    #[test]
    fn empty_matches_use_sentinel() {
        let prompt = build_prompt(&world(), None, &[]);
        assert!(prompt.contains(NO_FEATURES_SENTINEL));
        assert!(prompt.contains(
            "Map Extent Viewport (Web Mercator): [-20037508, -20037508, 20037508, 20037508]"
        ));
        assert!(!prompt.contains("WGS84 lon/lat"));
    }

    #[test]
    fn includes_lon_lat_bbox_when_given() {
        let bbox = GeoBoundingBox::new(-10.0, -5.5, 10.0, 5.5);
        let prompt = build_prompt(&world(), Some(&bbox), &[]);
        assert!(prompt.contains("west -10, south -5.5, east 10, north 5.5"));
    }

    #[test]
    fn describes_each_feature() {
        let fc = collection(
            r#"{
                "type": "FeatureCollection",
                "features": [
                    { "type": "Feature", "id": "lake", "geometry": { "type": "Point", "coordinates": [0, 0] }, "properties": { "name": "Lake", "depth": 12 } },
                    { "type": "Feature", "geometry": { "type": "LineString", "coordinates": [[0, 0], [1, 0]] }, "properties": null }
                ]
            }"#,
        );
        let reprojector = Reprojector::wgs84_to_web_mercator().unwrap();
        let matches = features_in_extent(&fc, &world(), &reprojector);
        assert_eq!(matches.len(), 2);

        let first = describe_feature(&matches[0]);
        assert!(first.starts_with("Feature ID: lake\n  Type: Point\n"));
        assert!(first.contains("  Reprojected BBox (Web Mercator): [0, "));
        assert!(
            first.contains(r#"Properties: {"depth":12,"name":"Lake"}"#)
                || first.contains(r#"Properties: {"name":"Lake","depth":12}"#)
        );

        let second = describe_feature(&matches[1]);
        assert!(second.starts_with("Feature ID: Unnamed Feature\n  Type: LineString\n"));
        assert!(second.ends_with("Properties: {}"));

        let prompt = build_prompt(&world(), None, &matches);
        assert!(prompt.contains(&format!("{first}\n\n{second}")));
        assert!(!prompt.contains("Detailed GeoJSON Features found within the extent:\nNo GeoJSON"));
    }

    #[test]
    fn properties_render_as_json_not_debug() {
        let feature: geojson::Feature = serde_json::from_str(
            r#"{ "type": "Feature", "geometry": null, "properties": { "name": "Lake \"Blue\"" } }"#,
        )
        .unwrap();
        assert_eq!(properties_json(&feature), r#"{"name":"Lake \"Blue\""}"#);

        let bare: geojson::Feature = serde_json::from_str(
            r#"{ "type": "Feature", "geometry": null, "properties": null }"#,
        )
        .unwrap();
        assert_eq!(properties_json(&bare), "{}");
    }
}
