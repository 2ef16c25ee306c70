//! Georeferencing engine for pinning scanned maps onto a Web-Mercator map.
//!
//! The flow is: collect 2 to 4 image/map point pairs, fit a planar transform,
//! derive the four geographic corners of the image, then let the user nudge
//! the footprint by dragging corners or the body.

pub mod config;
pub mod control;
pub mod error;
pub mod geometry;
pub mod manipulate;
pub mod overlay;
pub mod placement;
pub mod projection;
pub mod selection;
pub mod solver;
pub mod types;

pub use config::EngineConfig;
pub use control::{ControlPoint, ControlPointSet};
pub use error::{GeoError, GeoResult, ValidationError};
pub use geometry::{AnchorCorners, Corner, derive_anchors};
pub use manipulate::{EditOutcome, Handle, MapViewport, OverlayEditor, WebMercatorViewport};
#[cfg(feature = "catalog")]
pub use overlay::OverlayCatalog;
pub use overlay::{OverlayRecord, OverlayVisualState};
pub use placement::{Placement, place_overlay};
pub use solver::{FitReport, PlanarTransform, SolverStrategy, fit_transform};
pub use types::{GeoBounds, GeoPoint, ImageSize, PixelPoint, PlanarPoint};
