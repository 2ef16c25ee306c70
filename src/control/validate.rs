//! Pre-fit sanity checks on a control point set.
//!
//! The spacing thresholds keep the solver away from near-singular systems;
//! they are heuristics rather than exact degeneracy tests.

use log::debug;

use super::set::{ControlPoint, ControlPointSet, MAX_POINTS, MIN_POINTS};
use crate::config::ValidationLimits;
use crate::error::{GeoError, PointSpace, ValidationError};
use crate::types::ImageSize;

impl ControlPointSet {
    /// Validate with the default thresholds.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_with(&ValidationLimits::default())
    }

    /// Count, finiteness, then pairwise spacing in both spaces.
    pub fn validate_with(&self, limits: &ValidationLimits) -> Result<(), ValidationError> {
        let points = self.as_slice();
        if !(MIN_POINTS..=MAX_POINTS).contains(&points.len()) {
            return Err(GeoError::WrongPointCount(points.len()));
        }
        for p in points {
            check_finite(p)?;
        }
        for (a, b) in pairs(points) {
            let pixel_dist = a.pixel.distance(b.pixel);
            if pixel_dist < limits.min_pixel_spacing {
                debug!("pixel points #{} and #{} only {pixel_dist:.2}px apart", a.id, b.id);
                return Err(GeoError::PointsTooClose {
                    space: PointSpace::Pixel,
                    first: a.id,
                    second: b.id,
                    distance: pixel_dist,
                    minimum: limits.min_pixel_spacing,
                });
            }
        }
        for (a, b) in pairs(points) {
            let geo_dist = a.geo.degree_distance(b.geo);
            if geo_dist < limits.min_geo_spacing {
                debug!("geo points #{} and #{} only {geo_dist:.6} deg apart", a.id, b.id);
                return Err(GeoError::PointsTooClose {
                    space: PointSpace::Geo,
                    first: a.id,
                    second: b.id,
                    distance: geo_dist,
                    minimum: limits.min_geo_spacing,
                });
            }
        }
        Ok(())
    }

    /// Like [`Self::validate_with`], and every pixel must lie on the image.
    pub fn validate_within(
        &self,
        size: ImageSize,
        limits: &ValidationLimits,
    ) -> Result<(), ValidationError> {
        self.validate_with(limits)?;
        if let Some(outside) = self.iter().find(|p| !size.contains(p.pixel)) {
            return Err(GeoError::invalid(format!(
                "pixel point #{} ({}, {}) lies outside the {}x{} image",
                outside.id, outside.pixel.x, outside.pixel.y, size.width, size.height
            )));
        }
        Ok(())
    }
}

fn check_finite(p: &ControlPoint) -> Result<(), ValidationError> {
    if !p.pixel.is_finite() {
        return Err(GeoError::invalid(format!(
            "pixel point #{} ({}, {}) is not finite",
            p.id, p.pixel.x, p.pixel.y
        )));
    }
    p.geo
        .validate()
        .map(|_| ())
        .map_err(|err| GeoError::invalid(format!("geo point #{}: {err}", p.id)))
}

/// Every unordered pair, in id order.
fn pairs(points: &[ControlPoint]) -> impl Iterator<Item = (&ControlPoint, &ControlPoint)> {
    points
        .iter()
        .enumerate()
        .flat_map(move |(i, a)| points[i + 1..].iter().map(move |b| (a, b)))
}
