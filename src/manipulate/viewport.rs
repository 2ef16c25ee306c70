use std::f64::consts::PI;

use crate::projection::{self, EARTH_RADIUS, TILE_SIZE};
use crate::types::{GeoPoint, PixelPoint, PlanarPoint};

/// Pointer/geo conversion supplied by whatever renders the base map.
///
/// Pixel positions are in the map container's frame. Either direction may be
/// unavailable (viewport not laid out yet, point off the projection), which the
/// editor treats as "keep the last good geometry".
pub trait MapViewport {
    fn pixel_to_geo(&self, pixel: PixelPoint) -> Option<GeoPoint>;
    fn geo_to_pixel(&self, geo: GeoPoint) -> Option<PixelPoint>;
}

impl<V: MapViewport + ?Sized> MapViewport for &V {
    fn pixel_to_geo(&self, pixel: PixelPoint) -> Option<GeoPoint> {
        (**self).pixel_to_geo(pixel)
    }

    fn geo_to_pixel(&self, geo: GeoPoint) -> Option<PixelPoint> {
        (**self).geo_to_pixel(geo)
    }
}

/// Slippy-map viewport: a center, a fractional zoom and a container size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WebMercatorViewport {
    pub center: GeoPoint,
    pub zoom: f64,
    pub width: f64,
    pub height: f64,
}

impl WebMercatorViewport {
    pub const fn new(center: GeoPoint, zoom: f64, width: f64, height: f64) -> Self {
        Self {
            center,
            zoom,
            width,
            height,
        }
    }

    /// A zero-sized or non-finite viewport cannot convert anything yet.
    pub fn is_ready(&self) -> bool {
        self.width > 0.0
            && self.height > 0.0
            && self.zoom.is_finite()
            && self.center.is_valid()
            && self.center.lat.abs() <= projection::MAX_LATITUDE
    }

    /// World pixels per planar meter at the current zoom.
    fn world_scale(&self) -> f64 {
        TILE_SIZE * self.zoom.exp2() / (2.0 * PI * EARTH_RADIUS)
    }

    fn to_world(&self, planar: PlanarPoint) -> PlanarPoint {
        let scale = self.world_scale();
        let half = PI * EARTH_RADIUS;
        PlanarPoint::new((planar.x + half) * scale, (half - planar.y) * scale)
    }

    fn from_world(&self, world: PlanarPoint) -> PlanarPoint {
        let scale = self.world_scale();
        let half = PI * EARTH_RADIUS;
        PlanarPoint::new(world.x / scale - half, half - world.y / scale)
    }

    fn center_world(&self) -> Option<PlanarPoint> {
        projection::project(self.center)
            .ok()
            .map(|p| self.to_world(p))
    }

    /// Shift the view so content moves by `(dx, dy)` screen pixels.
    #[must_use]
    pub fn panned(&self, dx: f64, dy: f64) -> Self {
        let Some(center_world) = self.center_world() else {
            return *self;
        };
        let moved = center_world - PlanarPoint::new(dx, dy);
        projection::unproject(self.from_world(moved))
            .map_or(*self, |center| Self { center, ..*self })
    }
}

impl MapViewport for WebMercatorViewport {
    fn pixel_to_geo(&self, pixel: PixelPoint) -> Option<GeoPoint> {
        if !self.is_ready() || !pixel.is_finite() {
            return None;
        }
        let center_world = self.center_world()?;
        let world = PlanarPoint::new(
            center_world.x + pixel.x - self.width * 0.5,
            center_world.y + pixel.y - self.height * 0.5,
        );
        projection::unproject(self.from_world(world)).ok()
    }

    fn geo_to_pixel(&self, geo: GeoPoint) -> Option<PixelPoint> {
        if !self.is_ready() {
            return None;
        }
        let center_world = self.center_world()?;
        let world = self.to_world(projection::project(geo).ok()?);
        Some(PixelPoint::new(
            world.x - center_world.x + self.width * 0.5,
            world.y - center_world.y + self.height * 0.5,
        ))
    }
}
