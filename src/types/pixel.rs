//! Image-space points and raster dimensions.

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{GeoError, GeoResult};

/// Position in image pixels: origin top-left, y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

#[cfg(feature = "egui")]
impl From<egui::Pos2> for PixelPoint {
    fn from(pos: egui::Pos2) -> Self {
        Self::new(f64::from(pos.x), f64::from(pos.y))
    }
}

/// Pixel dimensions of the overlay raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    /// Dimensions must both be non-zero.
    pub fn new(width: u32, height: u32) -> GeoResult<Self> {
        if width == 0 || height == 0 {
            return Err(GeoError::invalid(format!(
                "image size {width}x{height} has a zero dimension"
            )));
        }
        Ok(Self { width, height })
    }

    /// Read the dimensions from an image header without decoding the pixels.
    pub fn probe(path: &Path) -> anyhow::Result<Self> {
        let (width, height) = image::image_dimensions(path)
            .with_context(|| format!("Failed to read image dimensions of {}", path.display()))?;
        Ok(Self::new(width, height)?)
    }

    pub fn width_f64(self) -> f64 {
        f64::from(self.width)
    }

    pub fn height_f64(self) -> f64 {
        f64::from(self.height)
    }

    /// Inclusive containment: clicks on the far edge still count.
    pub fn contains(self, p: PixelPoint) -> bool {
        p.is_finite()
            && (0.0..=self.width_f64()).contains(&p.x)
            && (0.0..=self.height_f64()).contains(&p.y)
    }

    /// Corners in `[top_left, top_right, bottom_left, bottom_right]` order.
    pub fn corners(self) -> [PixelPoint; 4] {
        let w = self.width_f64();
        let h = self.height_f64();
        [
            PixelPoint::new(0.0, 0.0),
            PixelPoint::new(w, 0.0),
            PixelPoint::new(0.0, h),
            PixelPoint::new(w, h),
        ]
    }

    pub fn center(self) -> PixelPoint {
        PixelPoint::new(self.width_f64() * 0.5, self.height_f64() * 0.5)
    }
}
