//! Guided reference-point picking on the image and then on the map.

mod view;
mod workflow;

pub use view::{ImageView, MAX_ZOOM, MIN_ZOOM, ZOOM_STEP};
pub use workflow::{PREVIEW_PADDING, Picked, SelectionStep, SelectionWorkflow};
