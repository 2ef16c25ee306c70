use serde::{Deserialize, Serialize};

use crate::error::{GeoError, GeoResult};
use crate::projection;
use crate::types::{GeoPoint, PixelPoint, PlanarPoint};

/// Affine map from image pixels to Mercator meters.
///
/// `x' = a·px + b·py + e`, `y' = c·px + d·py + f`, with `px, py` in the raw
/// image frame (y down).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanarTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl PlanarTransform {
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub const fn coefficients(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.d, self.e, self.f]
    }

    pub fn is_finite(&self) -> bool {
        self.coefficients().iter().all(|v| v.is_finite())
    }

    pub fn apply(&self, p: PixelPoint) -> PlanarPoint {
        PlanarPoint::new(
            self.a.mul_add(p.x, self.b.mul_add(p.y, self.e)),
            self.c.mul_add(p.x, self.d.mul_add(p.y, self.f)),
        )
    }

    /// Pixel position straight to geographic coordinates.
    pub fn pixel_to_geo(&self, p: PixelPoint) -> GeoResult<GeoPoint> {
        projection::unproject(self.apply(p))
    }

    pub fn determinant(&self) -> f64 {
        self.a.mul_add(self.d, -(self.b * self.c))
    }

    /// Map planar meters back to the pixel that produced them.
    pub fn invert(&self, p: PlanarPoint) -> GeoResult<PixelPoint> {
        let det = self.determinant();
        if !det.is_finite() || det.abs() <= f64::EPSILON * self.magnitude().powi(2) {
            return Err(GeoError::degenerate("transform is not invertible"));
        }
        let dx = p.x - self.e;
        let dy = p.y - self.f;
        Ok(PixelPoint::new(
            self.d.mul_add(dx, -(self.b * dy)) / det,
            self.a.mul_add(dy, -(self.c * dx)) / det,
        ))
    }

    /// Geographic position back to image pixels.
    pub fn geo_to_pixel(&self, geo: GeoPoint) -> GeoResult<PixelPoint> {
        self.invert(projection::project(geo)?)
    }

    /// Meters per pixel along the image x axis.
    pub fn scale_x(&self) -> f64 {
        self.a.hypot(self.c)
    }

    /// Meters per pixel along the image y axis.
    pub fn scale_y(&self) -> f64 {
        self.b.hypot(self.d)
    }

    /// Direction of the image x axis in the planar frame, degrees counter-clockwise from east.
    pub fn rotation_degrees(&self) -> f64 {
        self.c.atan2(self.a).to_degrees()
    }

    /// True when the image appears mirrored relative to a y-down frame.
    ///
    /// Planar y grows north while pixel y grows south, so an unmirrored
    /// placement has a negative determinant.
    pub fn is_mirrored(&self) -> bool {
        self.determinant() > 0.0
    }

    fn magnitude(&self) -> f64 {
        self.a
            .abs()
            .max(self.b.abs())
            .max(self.c.abs())
            .max(self.d.abs())
    }
}

impl Default for PlanarTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
