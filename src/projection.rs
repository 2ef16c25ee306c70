//! Spherical Web-Mercator (EPSG:3857) projection.
//!
//! This is the projection slippy-map tile sets use, so planar distances match
//! what the host map displays and angles are locally preserved.

use std::f64::consts::{FRAC_PI_2, PI};

use crate::error::{GeoError, GeoResult};
use crate::types::{GeoPoint, PlanarPoint};

/// Sphere radius used by EPSG:3857, meters.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Latitude at which the projected square world ends.
pub const MAX_LATITUDE: f64 = 85.051_128_779_8;

/// Tile edge length assumed for zoom-level computations.
pub const TILE_SIZE: f64 = 256.0;

/// Forward projection: degrees to planar meters.
///
/// The poles are rejected because the mapping diverges there.
pub fn project(geo: GeoPoint) -> GeoResult<PlanarPoint> {
    let geo = geo.validate()?;
    let sin_lat = geo.lat.to_radians().sin();
    if (1.0 - sin_lat.abs()) <= f64::EPSILON {
        return Err(GeoError::invalid(format!(
            "latitude {} cannot be projected (pole)",
            geo.lat
        )));
    }
    let x = EARTH_RADIUS * geo.lng.to_radians();
    let y = EARTH_RADIUS * ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() * 0.5;
    let planar = PlanarPoint::new(x, y);
    if !planar.is_finite() {
        return Err(GeoError::invalid(format!(
            "projection of ({}, {}) is not finite",
            geo.lat, geo.lng
        )));
    }
    Ok(planar)
}

/// Inverse projection: planar meters to degrees.
pub fn unproject(planar: PlanarPoint) -> GeoResult<GeoPoint> {
    if !planar.is_finite() {
        return Err(GeoError::invalid(format!(
            "planar point ({}, {}) is not finite",
            planar.x, planar.y
        )));
    }
    let lat = 2.0f64.mul_add((planar.y / EARTH_RADIUS).exp().atan(), -FRAC_PI_2);
    let lng = snap_antimeridian((planar.x / EARTH_RADIUS).to_degrees());
    GeoPoint::new(lat.to_degrees(), lng).validate()
}

/// Absorb the rounding error of `±R·π` so the antimeridian stays in range.
fn snap_antimeridian(lng: f64) -> f64 {
    const SLACK: f64 = 1e-9;
    if lng.abs() > 180.0 && lng.abs() - 180.0 <= SLACK {
        180.0f64.copysign(lng)
    } else {
        lng
    }
}

/// Ground resolution of one screen pixel at `lat` and a slippy-map `zoom`.
pub fn meters_per_pixel(lat: f64, zoom: f64) -> f64 {
    let world_px = TILE_SIZE * zoom.exp2();
    2.0 * PI * EARTH_RADIUS * lat.to_radians().cos() / world_px
}

/// Planar scale of the projection at `lat`: projected meters per ground meter.
pub fn scale_factor(lat: f64) -> f64 {
    1.0 / lat.to_radians().cos()
}
