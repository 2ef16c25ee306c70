mod corners;
mod quad;

pub use corners::{AnchorCorners, Corner, derive_anchors};
