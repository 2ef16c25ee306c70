use serde::{Deserialize, Serialize};

use crate::config::OverlayDefaults;

/// Smallest display scale the controls allow (10%).
pub const MIN_SCALE: f64 = 0.1;
/// Largest display scale the controls allow (500%).
pub const MAX_SCALE: f64 = 5.0;

/// Presentation attributes drawn on top of the anchor corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayVisualState {
    /// 0 is invisible, 1 is opaque.
    pub opacity: f64,
    /// Clockwise display rotation in `[0, 360)`.
    ///
    /// Display only: the stored anchor corners stay unrotated, so a reloaded
    /// overlay reproduces this rotation only by reapplying the attribute.
    pub rotation_degrees: f64,
    /// Display scale about the footprint center, `MIN_SCALE..=MAX_SCALE`.
    pub scale: f64,
}

impl Default for OverlayVisualState {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            rotation_degrees: 0.0,
            scale: 1.0,
        }
    }
}

impl From<&OverlayDefaults> for OverlayVisualState {
    fn from(defaults: &OverlayDefaults) -> Self {
        Self::default()
            .with_opacity(defaults.opacity)
            .with_rotation(defaults.rotation)
            .with_scale(defaults.scale)
    }
}

impl OverlayVisualState {
    /// Non-finite input keeps the current value.
    #[must_use]
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        if opacity.is_finite() {
            self.opacity = opacity.clamp(0.0, 1.0);
        }
        self
    }

    #[must_use]
    pub fn with_rotation(mut self, degrees: f64) -> Self {
        if degrees.is_finite() {
            self.rotation_degrees = normalize_degrees(degrees);
        }
        self
    }

    #[must_use]
    pub fn with_scale(mut self, scale: f64) -> Self {
        if scale.is_finite() {
            self.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
        }
        self
    }

    /// Opacity as a whole percentage for slider labels.
    pub fn opacity_percent(&self) -> u8 {
        percent(self.opacity)
    }

    pub fn scale_percent(&self) -> u16 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            (self.scale * 100.0).round().clamp(0.0, f64::from(u16::MAX)) as u16
        }
    }
}

/// Host-side toggles that are not geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayControlState {
    pub visible: bool,
    /// Locked overlays refuse drag edits.
    pub locked: bool,
}

impl Default for OverlayControlState {
    fn default() -> Self {
        Self {
            visible: true,
            locked: false,
        }
    }
}

fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

fn percent(value: f64) -> u8 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        (value * 100.0).round().clamp(0.0, 100.0) as u8
    }
}
