use super::visual::OverlayVisualState;
use crate::error::GeoResult;
use crate::geometry::AnchorCorners;
use crate::projection;
use crate::types::{GeoPoint, PlanarPoint};

/// Quad the host should draw once display rotation and scale are applied.
///
/// Rotation is clockwise on screen and pivots on the footprint center; both
/// are applied in the Mercator plane so the shape is not skewed by latitude.
/// The stored corners are never modified.
pub fn display_corners(
    corners: &AnchorCorners,
    visual: &OverlayVisualState,
) -> GeoResult<AnchorCorners> {
    let pivot = projection::project(corners.center())?;
    let (sin, cos) = visual.rotation_degrees.to_radians().sin_cos();
    let place = |geo: GeoPoint| -> GeoResult<GeoPoint> {
        let rel = projection::project(geo)? - pivot;
        // Clockwise in a y-up plane.
        let turned = PlanarPoint::new(
            cos.mul_add(rel.x, sin * rel.y),
            (-sin).mul_add(rel.x, cos * rel.y),
        );
        projection::unproject(pivot + turned * visual.scale)
    };
    Ok(AnchorCorners {
        top_left: place(corners.top_left)?,
        top_right: place(corners.top_right)?,
        bottom_left: place(corners.bottom_left)?,
        bottom_right: place(corners.bottom_right)?,
    })
}
