//! Fit strategies selected by the number of control points.

use log::debug;

use super::linalg::solve_linear_system;
use super::transform::PlanarTransform;
use crate::config::SolverSettings;
use crate::control::ControlPointSet;
use crate::error::{GeoError, GeoResult};
use crate::projection;
use crate::types::{ImageSize, PixelPoint, PlanarPoint};

/// Vectors shorter than this (pixels or meters) carry no direction.
const MIN_SEGMENT_LENGTH: f64 = 1e-9;

/// A pixel point paired with its projected geo counterpart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanarPair {
    pub pixel: PixelPoint,
    pub planar: PlanarPoint,
}

/// Solver input, one variant per supported point count.
#[derive(Debug, Clone, PartialEq)]
pub enum SolverStrategy {
    /// Exact similarity through both points.
    TwoPoint {
        pairs: [PlanarPair; 2],
        flip_height: Option<f64>,
    },
    /// Similarity from the first two pairs, translation nudged toward the third.
    ThreePoint {
        pairs: [PlanarPair; 3],
        flip_height: Option<f64>,
        damping: f64,
    },
    /// Least-squares affine through all four pairs.
    FourPoint {
        pairs: [PlanarPair; 4],
        pivot_epsilon: f64,
    },
}

impl SolverStrategy {
    /// Project the set's geo points and pick the strategy for its size.
    ///
    /// The set is expected to have passed validation already.
    pub fn from_set(
        set: &ControlPointSet,
        size: Option<ImageSize>,
        settings: &SolverSettings,
    ) -> GeoResult<Self> {
        let pairs = set
            .iter()
            .map(|p| {
                Ok(PlanarPair {
                    pixel: p.pixel,
                    planar: projection::project(p.geo)?,
                })
            })
            .collect::<GeoResult<Vec<_>>>()?;
        let flip_height = size
            .filter(|_| settings.flip_y)
            .map(ImageSize::height_f64);
        match pairs.as_slice() {
            [p1, p2] => Ok(Self::TwoPoint {
                pairs: [*p1, *p2],
                flip_height,
            }),
            [p1, p2, p3] => Ok(Self::ThreePoint {
                pairs: [*p1, *p2, *p3],
                flip_height,
                damping: settings.three_point_damping,
            }),
            [p1, p2, p3, p4] => Ok(Self::FourPoint {
                pairs: [*p1, *p2, *p3, *p4],
                pivot_epsilon: settings.pivot_epsilon,
            }),
            other => Err(GeoError::WrongPointCount(other.len())),
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::TwoPoint { .. } => "two-point similarity",
            Self::ThreePoint { .. } => "three-point damped similarity",
            Self::FourPoint { .. } => "four-point affine",
        }
    }

    pub fn solve(&self) -> GeoResult<PlanarTransform> {
        let transform = match self {
            Self::TwoPoint { pairs, flip_height } => {
                Similarity::fit(&pairs[0], &pairs[1], *flip_height)?.to_transform(*flip_height)
            }
            Self::ThreePoint {
                pairs,
                flip_height,
                damping,
            } => {
                let mut sim = Similarity::fit(&pairs[0], &pairs[1], *flip_height)?;
                let third = &pairs[2];
                let predicted = sim.apply(to_up_frame(third.pixel, *flip_height));
                let residual = third.planar - predicted;
                debug!(
                    "third point residual ({:.3}, {:.3}) m, applying {damping}",
                    residual.x, residual.y
                );
                sim.tx += residual.x * damping;
                sim.ty += residual.y * damping;
                sim.to_transform(*flip_height)
            }
            Self::FourPoint {
                pairs,
                pivot_epsilon,
            } => fit_affine(pairs, *pivot_epsilon)?,
        };
        if !transform.is_finite() {
            return Err(GeoError::degenerate(format!(
                "{} produced non-finite coefficients",
                self.label()
            )));
        }
        Ok(transform)
    }
}

/// Scale, rotation and translation in a y-up pixel frame.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Similarity {
    scale: f64,
    cos_t: f64,
    sin_t: f64,
    tx: f64,
    ty: f64,
}

impl Similarity {
    fn fit(p1: &PlanarPair, p2: &PlanarPair, flip_height: Option<f64>) -> GeoResult<Self> {
        let i1 = to_up_frame(p1.pixel, flip_height);
        let i2 = to_up_frame(p2.pixel, flip_height);
        let v_img = i2 - i1;
        let v_map = p2.planar - p1.planar;
        let len_img = v_img.length();
        let len_map = v_map.length();
        if len_img <= MIN_SEGMENT_LENGTH || len_map <= MIN_SEGMENT_LENGTH {
            return Err(GeoError::degenerate(
                "the first two control points coincide in image or map space",
            ));
        }

        let scale = len_map / len_img;
        let theta = v_map.angle() - v_img.angle();
        let (sin_t, cos_t) = theta.sin_cos();
        let mut sim = Self {
            scale,
            cos_t,
            sin_t,
            tx: 0.0,
            ty: 0.0,
        };
        let at_origin = sim.apply(i1);
        sim.tx = p1.planar.x - at_origin.x;
        sim.ty = p1.planar.y - at_origin.y;
        debug!(
            "similarity: {scale:.6} m/px, rotation {:.3} deg",
            theta.to_degrees()
        );
        Ok(sim)
    }

    fn apply(&self, p: PlanarPoint) -> PlanarPoint {
        PlanarPoint::new(
            self.scale * self.cos_t.mul_add(p.x, -(self.sin_t * p.y)) + self.tx,
            self.scale * self.sin_t.mul_add(p.x, self.cos_t * p.y) + self.ty,
        )
    }

    /// Fold the optional `y_up = H - y` flip into raw-pixel coefficients.
    fn to_transform(self, flip_height: Option<f64>) -> PlanarTransform {
        let sc = self.scale * self.cos_t;
        let ss = self.scale * self.sin_t;
        match flip_height {
            Some(h) => PlanarTransform::new(
                sc,
                ss,
                ss,
                -sc,
                ss.mul_add(-h, self.tx),
                sc.mul_add(h, self.ty),
            ),
            None => PlanarTransform::new(sc, -ss, ss, sc, self.tx, self.ty),
        }
    }
}

fn to_up_frame(p: PixelPoint, flip_height: Option<f64>) -> PlanarPoint {
    match flip_height {
        Some(h) => PlanarPoint::new(p.x, h - p.y),
        None => PlanarPoint::new(p.x, p.y),
    }
}

/// Least-squares affine fit via the normal equations of each planar axis.
///
/// Coordinates are centered on their centroids first so the normal matrix
/// stays well conditioned at Mercator magnitudes.
fn fit_affine(pairs: &[PlanarPair], pivot_epsilon: f64) -> GeoResult<PlanarTransform> {
    let n = f64::from(u32::try_from(pairs.len()).unwrap_or(u32::MAX));
    let (sum_px, sum_m) = pairs.iter().fold(
        (PlanarPoint::default(), PlanarPoint::default()),
        |(sp, sm), p| (sp + PlanarPoint::new(p.pixel.x, p.pixel.y), sm + p.planar),
    );
    let pixel_centroid = sum_px * (1.0 / n);
    let planar_centroid = sum_m * (1.0 / n);

    let mut normal = [[0.0; 3]; 3];
    let mut rhs_x = [0.0; 3];
    let mut rhs_y = [0.0; 3];
    for pair in pairs {
        let row = [
            pair.pixel.x - pixel_centroid.x,
            pair.pixel.y - pixel_centroid.y,
            1.0,
        ];
        let target = pair.planar - planar_centroid;
        for i in 0..3 {
            for j in 0..3 {
                normal[i][j] += row[i] * row[j];
            }
            rhs_x[i] += row[i] * target.x;
            rhs_y[i] += row[i] * target.y;
        }
    }

    let [a, b, e0] = solve_linear_system(normal, rhs_x, pivot_epsilon)?;
    let [c, d, f0] = solve_linear_system(normal, rhs_y, pivot_epsilon)?;
    let e = planar_centroid.x + e0 - a.mul_add(pixel_centroid.x, b * pixel_centroid.y);
    let f = planar_centroid.y + f0 - c.mul_add(pixel_centroid.x, d * pixel_centroid.y);
    Ok(PlanarTransform::new(a, b, c, d, e, f))
}
