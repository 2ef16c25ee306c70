mod geo;
mod pixel;

pub use geo::{GeoBounds, GeoPoint, PlanarPoint};
pub use pixel::{ImageSize, PixelPoint};
