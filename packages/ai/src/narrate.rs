//! Viewport narration: filter, prompt, generate.

use extent_narrator_spatial::bbox::rect_to_array;
use extent_narrator_spatial::{
    Extent, ExtentMatch, GeoBoundingBox, Reprojector, features_in_extent,
};
use geojson::FeatureCollection;

use crate::AiError;
use crate::prompt::{build_prompt, properties_json};
use crate::providers::LlmProvider;

/// The outcome of describing a viewport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Narration {
    /// Markdown text returned by the provider.
    pub description: String,
    /// Number of features that intersected the extent.
    pub feature_count: usize,
}

/// Describes the features of `collection` visible in `extent`.
///
/// `reprojector` must map the collection's CRS (WGS84) into the extent's
/// CRS (Web Mercator).
///
/// # Errors
///
/// Returns [`AiError`] if the provider call fails.
pub async fn describe_extent(
    provider: &dyn LlmProvider,
    reprojector: &Reprojector,
    extent: &Extent,
    bbox: Option<&GeoBoundingBox>,
    collection: &FeatureCollection,
) -> Result<Narration, AiError> {
    log::info!(
        "Describing extent {extent} ({} input features) with {}",
        collection.features.len(),
        provider.name()
    );

    let matches = features_in_extent(collection, extent, reprojector);
    log_matches(&matches);

    let prompt = build_prompt(extent, bbox, &matches);
    log::trace!("Prompt:\n{prompt}");

    let description = provider.generate(&prompt).await?;

    Ok(Narration {
        description,
        feature_count: matches.len(),
    })
}

fn log_matches(matches: &[ExtentMatch<'_>]) {
    for m in matches {
        let [min_x, min_y, max_x, max_y] = rect_to_array(&m.bbox);
        log::debug!(
            "Detected feature {} (#{}): {} bbox [{min_x}, {min_y}, {max_x}, {max_y}] properties {}",
            m.label(),
            m.index,
            m.geometry_type,
            properties_json(m.feature),
        );
    }

    let summary = matches
        .iter()
        .map(|m| format!("{} {}", m.geometry_type, m.label()))
        .collect::<Vec<_>>()
        .join(", ");
    log::info!(
        "Features in extent: {}",
        if summary.is_empty() { "None" } else { &summary }
    );
}
