//! Interactive corner and body dragging of a placed overlay.

mod editor;
mod handle;
mod session;
mod viewport;

pub use editor::{EditOutcome, ManipulationState, OverlayEditor};
pub use handle::{Handle, hit_test};
pub use session::ManipulationSession;
pub use viewport::{MapViewport, WebMercatorViewport};

#[cfg(test)]
mod tests;
