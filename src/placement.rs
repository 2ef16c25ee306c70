//! One-shot "fit and place" used when the user confirms reference points.

use log::debug;

use crate::config::EngineConfig;
use crate::control::ControlPointSet;
use crate::error::GeoResult;
use crate::geometry::AnchorCorners;
use crate::solver::{FitReport, PlanarTransform, fit_transform_with};
use crate::types::{GeoPoint, ImageSize};

/// Everything the host needs to position a freshly fitted overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub strategy: &'static str,
    pub transform: PlanarTransform,
    pub corners: AnchorCorners,
    pub center: GeoPoint,
    pub report: FitReport,
}

/// Validate, fit, derive corners and score the fit.
pub fn place_overlay(
    control_points: &ControlPointSet,
    size: ImageSize,
    config: &EngineConfig,
) -> GeoResult<Placement> {
    let fit = fit_transform_with(control_points, size, config)?;
    let corners = AnchorCorners::from_transform(&fit.transform, size)?;
    corners.validate_footprint()?;
    let report = FitReport::compute(fit.strategy, control_points, &fit.transform)?;
    debug!(
        "placed overlay with {}: center {:?}, rmse {:.2} m",
        fit.strategy,
        corners.center(),
        report.rmse_m
    );
    Ok(Placement {
        strategy: fit.strategy,
        transform: fit.transform,
        corners,
        center: corners.center(),
        report,
    })
}
