//! Shape checks on the anchor quadrilateral, in lng/lat degree space.

use super::corners::AnchorCorners;
use crate::error::{GeoError, GeoResult};
use crate::types::GeoPoint;

/// Areas below this (square degrees) count as collapsed.
const MIN_AREA_DEG2: f64 = 1e-14;

impl AnchorCorners {
    /// Signed shoelace area walking TL, TR, BR, BL with lng as x and lat as y.
    ///
    /// A north-up footprint walks clockwise and comes out negative.
    /// Vertices are taken relative to TL so a collapsed quad sums to exactly 0.
    #[allow(clippy::suboptimal_flops)]
    pub fn signed_area_deg2(&self) -> f64 {
        let ring = self.ring();
        let origin = ring[0];
        let mut twice = 0.0;
        for i in 0..ring.len() {
            let (px, py) = (ring[i].lng - origin.lng, ring[i].lat - origin.lat);
            let next = ring[(i + 1) % ring.len()];
            let (qx, qy) = (next.lng - origin.lng, next.lat - origin.lat);
            twice += px * qy - qx * py;
        }
        twice * 0.5
    }

    pub fn area_deg2(&self) -> f64 {
        self.signed_area_deg2().abs()
    }

    /// Opposite edges must not cross.
    pub fn is_simple(&self) -> bool {
        let [tl, tr, br, bl] = self.ring();
        !segments_cross(tl, tr, br, bl) && !segments_cross(tr, br, bl, tl)
    }

    /// Gate before persisting: finite, in range, non-zero area, not self-intersecting.
    pub fn validate_footprint(&self) -> GeoResult<()> {
        if !self.is_valid() {
            return Err(GeoError::invalid(
                "anchor corners contain a non-finite or out-of-range position",
            ));
        }
        if self.area_deg2() <= MIN_AREA_DEG2 {
            return Err(GeoError::degenerate("anchor corners enclose no area"));
        }
        if !self.is_simple() {
            return Err(GeoError::degenerate("anchor corners cross each other"));
        }
        Ok(())
    }
}

fn orientation(a: GeoPoint, b: GeoPoint, c: GeoPoint) -> f64 {
    (b.lng - a.lng).mul_add(c.lat - a.lat, -((b.lat - a.lat) * (c.lng - a.lng)))
}

/// Proper crossing of segments `p1-p2` and `q1-q2`; touching endpoints do not count.
fn segments_cross(p1: GeoPoint, p2: GeoPoint, q1: GeoPoint, q2: GeoPoint) -> bool {
    let d1 = orientation(q1, q2, p1);
    let d2 = orientation(q1, q2, p2);
    let d3 = orientation(p1, p2, q1);
    let d4 = orientation(p1, p2, q2);
    d1 * d2 < 0.0 && d3 * d4 < 0.0
}
