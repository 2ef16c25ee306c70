//! Fit quality: how far each control point lands from where it was pinned.

use anyhow::Context as _;
use serde::Serialize;
use std::path::Path;

use super::transform::PlanarTransform;
use crate::control::ControlPointSet;
use crate::error::GeoResult;
use crate::projection;
use crate::types::{GeoPoint, PixelPoint};

/// Residual of one control point under a fitted transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointResidual {
    pub id: u32,
    pub pixel: PixelPoint,
    pub geo: GeoPoint,
    /// Where the transform places the pixel.
    pub fitted: GeoPoint,
    /// Ground distance between `geo` and `fitted`, meters.
    pub residual_m: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitReport {
    pub strategy: &'static str,
    pub residuals: Vec<PointResidual>,
    pub rmse_m: f64,
    pub max_m: f64,
}

impl FitReport {
    pub fn compute(
        strategy: &'static str,
        set: &ControlPointSet,
        transform: &PlanarTransform,
    ) -> GeoResult<Self> {
        let mut residuals = Vec::with_capacity(set.len());
        for point in set {
            let target = projection::project(point.geo)?;
            let fitted_planar = transform.apply(point.pixel);
            // Mercator inflates lengths by 1/cos(lat); undo it for ground meters.
            let residual_m =
                target.distance(fitted_planar) / projection::scale_factor(point.geo.lat);
            residuals.push(PointResidual {
                id: point.id,
                pixel: point.pixel,
                geo: point.geo,
                fitted: projection::unproject(fitted_planar)?,
                residual_m,
            });
        }
        let count = f64::from(u32::try_from(residuals.len()).unwrap_or(u32::MAX)).max(1.0);
        let sum_sq: f64 = residuals.iter().map(|r| r.residual_m * r.residual_m).sum();
        let max_m = residuals.iter().map(|r| r.residual_m).fold(0.0, f64::max);
        Ok(Self {
            strategy,
            residuals,
            rmse_m: (sum_sq / count).sqrt(),
            max_m,
        })
    }

    /// Write one CSV row per control point.
    pub fn write_csv(&self, path: &Path) -> anyhow::Result<()> {
        let mut wtr = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        wtr.write_record([
            "id",
            "pixel_x",
            "pixel_y",
            "lat",
            "lng",
            "fitted_lat",
            "fitted_lng",
            "residual_m",
        ])?;
        for r in &self.residuals {
            wtr.write_record([
                r.id.to_string(),
                format!("{:.3}", r.pixel.x),
                format!("{:.3}", r.pixel.y),
                format!("{:.8}", r.geo.lat),
                format!("{:.8}", r.geo.lng),
                format!("{:.8}", r.fitted.lat),
                format!("{:.8}", r.fitted.lng),
                format!("{:.3}", r.residual_m),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize fit report")
    }
}
