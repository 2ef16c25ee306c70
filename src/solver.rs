mod linalg;
mod report;
mod strategy;
mod transform;

pub use report::{FitReport, PointResidual};
pub use strategy::{PlanarPair, SolverStrategy};
pub use transform::PlanarTransform;

use log::{debug, warn};

use crate::config::EngineConfig;
use crate::control::ControlPointSet;
use crate::error::GeoResult;
use crate::types::ImageSize;

/// A solved transform together with the strategy that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FittedTransform {
    pub strategy: &'static str,
    pub transform: PlanarTransform,
}

/// Validate the set and fit a pixel-to-planar transform with default settings.
pub fn fit_transform(
    control_points: &ControlPointSet,
    image_width: u32,
    image_height: u32,
) -> GeoResult<PlanarTransform> {
    let size = ImageSize::new(image_width, image_height)?;
    fit_transform_with(control_points, size, &EngineConfig::default()).map(|fit| fit.transform)
}

/// Validate, pick the strategy for the point count, and solve.
pub fn fit_transform_with(
    control_points: &ControlPointSet,
    size: ImageSize,
    config: &EngineConfig,
) -> GeoResult<FittedTransform> {
    if let Err(err) = control_points.validate_with(&config.validation) {
        warn!("rejecting control points: {err}");
        return Err(err);
    }
    let strategy = SolverStrategy::from_set(control_points, Some(size), &config.solver)?;
    debug!(
        "fitting {} control points on a {}x{} image with {}",
        control_points.len(),
        size.width,
        size.height,
        strategy.label()
    );
    let transform = strategy.solve().inspect_err(|err| warn!("fit failed: {err}"))?;
    debug!("fitted transform {:?}", transform.coefficients());
    Ok(FittedTransform {
        strategy: strategy.label(),
        transform,
    })
}
