use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use directories::{BaseDirs, ProjectDirs};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "pinmap.toml";

/// Spacing thresholds applied before fitting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationLimits {
    /// Minimum Euclidean distance between two pixel points, in pixels.
    pub min_pixel_spacing: f64,
    /// Minimum Euclidean distance between two geo points, in degrees.
    pub min_geo_spacing: f64,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            min_pixel_spacing: 20.0,
            min_geo_spacing: 1e-4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    /// Share of the third point's residual applied as extra translation.
    pub three_point_damping: f64,
    /// Flip pixel y to a y-up frame before similarity fits.
    pub flip_y: bool,
    /// Relative pivot magnitude below which the affine system is singular.
    pub pivot_epsilon: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            three_point_damping: 0.5,
            flip_y: true,
            pivot_epsilon: 1e-12,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditSettings {
    /// Screen radius around a corner that grabs its handle.
    pub handle_radius_px: f64,
}

impl Default for EditSettings {
    fn default() -> Self {
        Self {
            handle_radius_px: 10.0,
        }
    }
}

/// Visual attributes given to freshly created overlays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayDefaults {
    pub opacity: f64,
    pub scale: f64,
    pub rotation: f64,
}

impl Default for OverlayDefaults {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            scale: 1.0,
            rotation: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub validation: ValidationLimits,
    pub solver: SolverSettings,
    pub editing: EditSettings,
    pub overlay: OverlayDefaults,
}

impl EngineConfig {
    /// First config file that parses wins; defaults otherwise.
    pub fn load() -> Self {
        for path in Self::candidate_paths() {
            if !path.is_file() {
                continue;
            }
            match Self::from_file(&path) {
                Ok(cfg) => {
                    debug!("loaded engine config from {}", path.display());
                    return cfg;
                }
                Err(err) => warn!("ignoring config {}: {err:#}", path.display()),
            }
        }
        Self::default()
    }

    /// Parse and sanitize a single config file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        let cfg: Self = toml::from_str(contents)?;
        Ok(cfg.sanitized())
    }

    /// Clamp to reasonable operating bounds to avoid pathological configs.
    pub fn sanitized(&self) -> Self {
        let finite_or = |v: f64, fallback: f64| if v.is_finite() { v } else { fallback };
        let defaults = Self::default();
        Self {
            validation: ValidationLimits {
                min_pixel_spacing: finite_or(
                    self.validation.min_pixel_spacing,
                    defaults.validation.min_pixel_spacing,
                )
                .clamp(0.0, 10_000.0),
                min_geo_spacing: finite_or(
                    self.validation.min_geo_spacing,
                    defaults.validation.min_geo_spacing,
                )
                .clamp(0.0, 1.0),
            },
            solver: SolverSettings {
                three_point_damping: finite_or(
                    self.solver.three_point_damping,
                    defaults.solver.three_point_damping,
                )
                .clamp(0.0, 1.0),
                flip_y: self.solver.flip_y,
                pivot_epsilon: finite_or(
                    self.solver.pivot_epsilon,
                    defaults.solver.pivot_epsilon,
                )
                .clamp(f64::EPSILON, 1e-3),
            },
            editing: EditSettings {
                handle_radius_px: finite_or(
                    self.editing.handle_radius_px,
                    defaults.editing.handle_radius_px,
                )
                .clamp(1.0, 200.0),
            },
            overlay: OverlayDefaults {
                opacity: finite_or(self.overlay.opacity, defaults.overlay.opacity)
                    .clamp(0.0, 1.0),
                scale: finite_or(self.overlay.scale, defaults.overlay.scale)
                    .clamp(crate::overlay::MIN_SCALE, crate::overlay::MAX_SCALE),
                rotation: finite_or(self.overlay.rotation, defaults.overlay.rotation)
                    .rem_euclid(360.0),
            },
        }
    }

    fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Ok(exe_path) = std::env::current_exe()
            && let Some(dir) = exe_path.parent()
        {
            paths.push(dir.join(CONFIG_FILE_NAME));
        }

        if let Some(proj_dirs) = ProjectDirs::from("dev", "Pinmap", "Pinmap") {
            paths.push(proj_dirs.config_dir().join(CONFIG_FILE_NAME));
        }

        if let Some(base_dirs) = BaseDirs::new() {
            paths.push(base_dirs.config_dir().join("pinmap").join(CONFIG_FILE_NAME));
        }

        paths
    }
}
