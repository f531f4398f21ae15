//! Bounding-box extraction and intersection.

use extent_narrator_spatial_models::Extent;
use geo::{BoundingRect, Intersects, Rect, coord};

/// Bounding box of any geometry, or `None` when it has no coordinates.
///
/// Geometry collections (including nested ones) yield the union of their
/// members' boxes.
#[must_use]
pub fn geometry_bbox(geometry: &geo::Geometry<f64>) -> Option<Rect<f64>> {
    geometry.bounding_rect()
}

/// Whether two boxes overlap. Shared edges and corners count as overlap.
#[must_use]
pub fn bboxes_intersect(a: &Rect<f64>, b: &Rect<f64>) -> bool {
    a.intersects(b)
}

/// The extent as a [`Rect`].
#[must_use]
pub fn extent_rect(extent: &Extent) -> Rect<f64> {
    Rect::new(
        coord! { x: extent.min_x, y: extent.min_y },
        coord! { x: extent.max_x, y: extent.max_y },
    )
}

/// `[minX, minY, maxX, maxY]` for a [`Rect`].
#[must_use]
pub fn rect_to_array(rect: &Rect<f64>) -> [f64; 4] {
    [rect.min().x, rect.min().y, rect.max().x, rect.max().y]
}
