//! Binary catalog of overlays: magic, version, lz4-compressed bincode.

use anyhow::{Context as _, bail};
use bincode::config::{Config, standard};
use log::{debug, warn};
use lz4_flex::block::{compress_prepend_size, decompress_size_prepended};
use pathdiff::diff_paths;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::record::{ImageSource, OverlayRecord, compute_image_crc32};

pub const CATALOG_MAGIC: &[u8; 6] = b"PINMAP";
pub const CATALOG_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverlayCatalog {
    pub title: Option<String>,
    pub overlays: Vec<OverlayRecord>,
}

impl OverlayCatalog {
    pub fn get(&self, id: Uuid) -> Option<&OverlayRecord> {
        self.overlays.iter().find(|o| o.id == id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut OverlayRecord> {
        self.overlays.iter_mut().find(|o| o.id == id)
    }

    pub fn remove(&mut self, id: Uuid) -> Option<OverlayRecord> {
        let idx = self.overlays.iter().position(|o| o.id == id)?;
        Some(self.overlays.remove(idx))
    }
}

/// Which stored path a warning refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    Absolute,
    Relative,
}

/// Non-fatal problems found while reattaching images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogWarning {
    MissingImage {
        overlay: Uuid,
        path: PathBuf,
        kind: PathKind,
        reason: String,
    },
    ChecksumMismatch {
        overlay: Uuid,
        path: PathBuf,
        kind: PathKind,
        expected: u32,
        actual: u32,
    },
}

#[derive(Debug, Clone)]
pub struct CatalogLoadOutcome {
    pub catalog: OverlayCatalog,
    pub warnings: Vec<CatalogWarning>,
    pub version: u32,
}

fn bincode_config() -> impl Config {
    standard().with_little_endian()
}

/// Write the catalog next to a temp file, then rename over the target.
pub fn save_catalog(path: &Path, catalog: &OverlayCatalog) -> anyhow::Result<()> {
    let mut catalog = catalog.clone();
    refresh_relative_paths(path, &mut catalog);
    let encoded = bincode::serde::encode_to_vec(&catalog, bincode_config())
        .context("Failed to serialize overlay catalog")?;
    let compressed = compress_prepend_size(&encoded);

    let mut bytes = Vec::with_capacity(CATALOG_MAGIC.len() + 4 + compressed.len());
    bytes.extend_from_slice(CATALOG_MAGIC);
    bytes.extend_from_slice(&CATALOG_VERSION.to_le_bytes());
    bytes.extend_from_slice(&compressed);
    write_atomic(path, &bytes)?;
    debug!(
        "saved {} overlays to {}",
        catalog.overlays.len(),
        path.display()
    );
    Ok(())
}

/// Read a catalog and check every local image it references.
pub fn load_catalog(path: &Path) -> anyhow::Result<CatalogLoadOutcome> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read catalog {}", path.display()))?;
    let Some(rest) = bytes.strip_prefix(CATALOG_MAGIC.as_slice()) else {
        bail!("Not a pinmap catalog: magic signature mismatch");
    };
    let Some((version_bytes, compressed)) = rest.split_first_chunk::<4>() else {
        bail!("Catalog header is truncated");
    };
    let version = u32::from_le_bytes(*version_bytes);
    if version != CATALOG_VERSION {
        bail!("Unsupported catalog version {version} (expected {CATALOG_VERSION})");
    }
    let raw =
        decompress_size_prepended(compressed).context("Failed to decompress catalog payload")?;
    let (catalog, _): (OverlayCatalog, usize) =
        bincode::serde::decode_from_slice(&raw, bincode_config())
            .context("Failed to deserialize catalog payload")?;

    let warnings = check_images(path, &catalog);
    for warning in &warnings {
        warn!("{warning:?}");
    }
    Ok(CatalogLoadOutcome {
        catalog,
        warnings,
        version,
    })
}

fn refresh_relative_paths(catalog_path: &Path, catalog: &mut OverlayCatalog) {
    let Some(dir) = catalog_path.parent() else {
        return;
    };
    for record in &mut catalog.overlays {
        if let ImageSource::Path { absolute, relative } = &mut record.image.source {
            *relative = diff_paths(&*absolute, dir);
        }
    }
}

fn check_images(catalog_path: &Path, catalog: &OverlayCatalog) -> Vec<CatalogWarning> {
    let dir = catalog_path.parent().unwrap_or_else(|| Path::new("."));
    let mut warnings = Vec::new();
    for record in &catalog.overlays {
        let ImageSource::Path { absolute, relative } = &record.image.source else {
            continue;
        };
        let mut candidates = vec![(absolute.clone(), PathKind::Absolute)];
        if let Some(rel) = relative {
            candidates.push((dir.join(rel), PathKind::Relative));
        }
        let mut found = Vec::new();
        for (path, kind) in candidates {
            match compute_image_crc32(&path) {
                Ok(actual) => match record.image.crc32 {
                    Some(expected) if expected != actual => {
                        found.push(CatalogWarning::ChecksumMismatch {
                            overlay: record.id,
                            path,
                            kind,
                            expected,
                            actual,
                        });
                    }
                    _ => {
                        found.clear();
                        break;
                    }
                },
                Err(err) => found.push(CatalogWarning::MissingImage {
                    overlay: record.id,
                    path,
                    kind,
                    reason: format!("{err:#}"),
                }),
            }
        }
        warnings.append(&mut found);
    }
    warnings
}

fn temp_path_for(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map_or_else(|| "catalog".into(), |n| n.to_string_lossy().into_owned());
    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    dir.join(format!(".{name}.{}.tmp", Uuid::new_v4().simple()))
}

fn write_atomic(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    let tmp = temp_path_for(path);
    let written = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp)
        .and_then(|mut file| {
            file.write_all(data)?;
            file.sync_all()
        })
        .with_context(|| format!("Failed to write temp file {}", tmp.display()))
        .and_then(|()| {
            fs::rename(&tmp, path)
                .with_context(|| format!("Failed to replace {}", path.display()))
        });
    if written.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    written
}
