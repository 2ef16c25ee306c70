use anyhow::Context as _;
use chrono::{DateTime, Utc};
use crc32fast::Hasher;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Read as _;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::visual::{OverlayControlState, OverlayVisualState};
use crate::config::OverlayDefaults;
use crate::error::GeoResult;
use crate::geometry::AnchorCorners;
use crate::manipulate::EditOutcome;
use crate::placement::Placement;
use crate::types::{GeoPoint, ImageSize};

/// Where the overlay raster lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageSource {
    /// Local file; `relative` is refreshed against the catalog on save.
    Path {
        absolute: PathBuf,
        relative: Option<PathBuf>,
    },
    Url(String),
}

/// Raster reference with enough metadata to detect a swapped file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub source: ImageSource,
    pub size: ImageSize,
    /// Checksum of the local file at import time.
    pub crc32: Option<u32>,
}

impl ImageRef {
    /// Probe a local image for its size and checksum.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .context("Failed to resolve working directory")?
                .join(path)
        };
        let size = ImageSize::probe(&absolute)?;
        let crc32 = compute_image_crc32(&absolute)?;
        Ok(Self {
            source: ImageSource::Path {
                absolute,
                relative: None,
            },
            size,
            crc32: Some(crc32),
        })
    }

    /// Remote image whose size the host already knows.
    pub fn from_url(url: impl Into<String>, size: ImageSize) -> Self {
        Self {
            source: ImageSource::Url(url.into()),
            size,
            crc32: None,
        }
    }

    pub const fn local_path(&self) -> Option<&PathBuf> {
        match &self.source {
            ImageSource::Path { absolute, .. } => Some(absolute),
            ImageSource::Url(_) => None,
        }
    }
}

/// Persisted state of one pinned map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayRecord {
    pub id: Uuid,
    pub name: String,
    pub image: ImageRef,
    pub visual: OverlayVisualState,
    pub control: OverlayControlState,
    /// Unrotated footprint; `None` until the overlay has been placed.
    ///
    /// `visual.rotation_degrees` is applied on top at draw time only.
    pub anchors: Option<AnchorCorners>,
    /// Footprint center, or the drop position before placement.
    pub position: GeoPoint,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OverlayRecord {
    pub fn new(
        name: impl Into<String>,
        image: ImageRef,
        position: GeoPoint,
        defaults: &OverlayDefaults,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            image,
            visual: OverlayVisualState::from(defaults),
            control: OverlayControlState::default(),
            anchors: None,
            position,
            created_at: now,
            updated_at: now,
        }
    }

    /// Adopt a fresh fit. The footprint is checked before anything is stored.
    pub fn apply_placement(&mut self, placement: &Placement) -> GeoResult<()> {
        self.store_corners(placement.corners)
    }

    /// Adopt the result of a finished drag.
    pub fn apply_edit(&mut self, outcome: &EditOutcome) -> GeoResult<()> {
        self.store_corners(outcome.corners)
    }

    fn store_corners(&mut self, corners: AnchorCorners) -> GeoResult<()> {
        corners.validate_footprint()?;
        self.anchors = Some(corners);
        self.position = corners.center();
        self.touch();
        debug!(
            "overlay {} footprint centered at ({:.6}, {:.6})",
            self.id, self.position.lat, self.position.lng
        );
        Ok(())
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        self.visual = self.visual.with_opacity(opacity);
        self.touch();
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.visual = self.visual.with_scale(scale);
        self.touch();
    }

    pub fn set_rotation(&mut self, degrees: f64) {
        self.visual = self.visual.with_rotation(degrees);
        self.touch();
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.control.visible = visible;
        self.touch();
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.control.locked = locked;
        self.touch();
    }

    /// Move the overlay; a placed footprint follows without changing shape.
    pub fn set_position(&mut self, position: GeoPoint) -> GeoResult<()> {
        let position = position.validate()?;
        if let Some(anchors) = self.anchors {
            let moved = anchors.recentered(position);
            moved.validate_footprint()?;
            self.anchors = Some(moved);
        }
        self.position = position;
        self.touch();
        Ok(())
    }

    pub fn is_placed(&self) -> bool {
        self.anchors.is_some()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize overlay record")
    }

    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        serde_json::from_str(text).context("Failed to parse overlay record")
    }
}

/// Streamed CRC32 of a file.
pub fn compute_image_crc32(path: &Path) -> anyhow::Result<u32> {
    let mut file = fs::File::open(path)
        .with_context(|| format!("Failed to open {} for checksum", path.display()))?;
    let mut hasher = Hasher::new();
    let mut chunk = vec![0u8; 64 * 1024];
    loop {
        let n = file.read(&mut chunk)?;
        if n == 0 {
            return Ok(hasher.finalize());
        }
        hasher.update(&chunk[..n]);
    }
}
