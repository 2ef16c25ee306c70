//! Persisted overlay state: footprint and display attributes, plus an optional catalog file.

#[cfg(feature = "catalog")]
mod catalog;
mod display;
mod record;
mod visual;

#[cfg(feature = "catalog")]
pub use catalog::{
    CATALOG_MAGIC, CATALOG_VERSION, CatalogLoadOutcome, CatalogWarning, OverlayCatalog, PathKind,
    load_catalog, save_catalog,
};
pub use display::display_corners;
pub use record::{ImageRef, ImageSource, OverlayRecord, compute_image_crc32};
pub use visual::{MAX_SCALE, MIN_SCALE, OverlayControlState, OverlayVisualState};

#[cfg(test)]
mod tests;
