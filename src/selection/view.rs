use crate::types::{ImageSize, PixelPoint};

pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 3.0;
/// Zoom change for the +/- buttons.
pub const ZOOM_STEP: f64 = 0.2;

/// How a scanned image is shown while the user picks points on it.
///
/// The image is stretched to fill `container`, then zoomed and panned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageView {
    pub image: ImageSize,
    pub container_width: f64,
    pub container_height: f64,
    zoom: f64,
    pan: PixelPoint,
}

impl ImageView {
    pub const fn new(image: ImageSize, container_width: f64, container_height: f64) -> Self {
        Self {
            image,
            container_width,
            container_height,
            zoom: 1.0,
            pan: PixelPoint::new(0.0, 0.0),
        }
    }

    pub const fn zoom(&self) -> f64 {
        self.zoom
    }

    pub const fn pan(&self) -> PixelPoint {
        self.pan
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        }
    }

    /// Wheel notch: down zooms out by 10%, up zooms in by 10%.
    pub fn wheel(&mut self, delta_y: f64) {
        let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
        self.set_zoom(self.zoom * factor);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - ZOOM_STEP);
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        if dx.is_finite() && dy.is_finite() {
            self.pan = self.pan.offset(dx, dy);
        }
    }

    pub fn set_container(&mut self, width: f64, height: f64) {
        self.container_width = width;
        self.container_height = height;
    }

    pub const fn reset(&mut self) {
        self.zoom = 1.0;
        self.pan = PixelPoint::new(0.0, 0.0);
    }

    /// Map a click in container coordinates to an image pixel.
    ///
    /// `None` when the container has no size or the click misses the image.
    pub fn click_to_pixel(&self, click: PixelPoint) -> Option<PixelPoint> {
        if !(self.container_width > 0.0 && self.container_height > 0.0) || !click.is_finite() {
            return None;
        }
        let scale_x = self.image.width_f64() / self.container_width;
        let scale_y = self.image.height_f64() / self.container_height;
        let pixel = PixelPoint::new(
            (click.x - self.pan.x) / self.zoom * scale_x,
            (click.y - self.pan.y) / self.zoom * scale_y,
        );
        self.image.contains(pixel).then_some(pixel)
    }

    /// Inverse of [`Self::click_to_pixel`], for drawing markers.
    pub fn pixel_to_click(&self, pixel: PixelPoint) -> Option<PixelPoint> {
        if !(self.container_width > 0.0 && self.container_height > 0.0) {
            return None;
        }
        let scale_x = self.image.width_f64() / self.container_width;
        let scale_y = self.image.height_f64() / self.container_height;
        Some(PixelPoint::new(
            (pixel.x / scale_x).mul_add(self.zoom, self.pan.x),
            (pixel.y / scale_y).mul_add(self.zoom, self.pan.y),
        ))
    }
}
