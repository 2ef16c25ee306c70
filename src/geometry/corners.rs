use serde::{Deserialize, Serialize};

use crate::error::GeoResult;
use crate::solver::PlanarTransform;
use crate::types::{GeoBounds, GeoPoint, ImageSize};

/// One of the four overlay corners, named by compass direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl Corner {
    pub const ALL: [Self; 4] = [
        Self::NorthWest,
        Self::NorthEast,
        Self::SouthWest,
        Self::SouthEast,
    ];

    pub const fn opposite(self) -> Self {
        match self {
            Self::NorthWest => Self::SouthEast,
            Self::NorthEast => Self::SouthWest,
            Self::SouthWest => Self::NorthEast,
            Self::SouthEast => Self::NorthWest,
        }
    }

    /// Short label used in logs and handle ids.
    pub const fn label(self) -> &'static str {
        match self {
            Self::NorthWest => "NW",
            Self::NorthEast => "NE",
            Self::SouthWest => "SW",
            Self::SouthEast => "SE",
        }
    }
}

/// Geographic footprint of the overlay image.
///
/// This is the stored placement; display rotation and scale are kept
/// separately and never folded in here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorCorners {
    pub top_left: GeoPoint,
    pub top_right: GeoPoint,
    pub bottom_left: GeoPoint,
    pub bottom_right: GeoPoint,
}

/// Push the image corners through `transform` and back to degrees.
pub fn derive_anchors(
    transform: &PlanarTransform,
    image_width: u32,
    image_height: u32,
) -> GeoResult<AnchorCorners> {
    let size = ImageSize::new(image_width, image_height)?;
    AnchorCorners::from_transform(transform, size)
}

impl AnchorCorners {
    pub fn from_transform(transform: &PlanarTransform, size: ImageSize) -> GeoResult<Self> {
        let [tl, tr, bl, br] = size.corners();
        Ok(Self {
            top_left: transform.pixel_to_geo(tl)?,
            top_right: transform.pixel_to_geo(tr)?,
            bottom_left: transform.pixel_to_geo(bl)?,
            bottom_right: transform.pixel_to_geo(br)?,
        })
    }

    /// Axis-aligned rectangle filling `bounds`.
    pub const fn from_bounds(bounds: &GeoBounds) -> Self {
        Self {
            top_left: bounds.north_west(),
            top_right: bounds.north_east(),
            bottom_left: bounds.south_west(),
            bottom_right: bounds.south_east(),
        }
    }

    /// Rectangle spanned by two opposite corners, in either order.
    pub fn rectangle(a: GeoPoint, b: GeoPoint) -> Self {
        Self::from_bounds(&GeoBounds::from_corners(a, b))
    }

    pub const fn corner(&self, corner: Corner) -> GeoPoint {
        match corner {
            Corner::NorthWest => self.top_left,
            Corner::NorthEast => self.top_right,
            Corner::SouthWest => self.bottom_left,
            Corner::SouthEast => self.bottom_right,
        }
    }

    /// `[top_left, top_right, bottom_left, bottom_right]`.
    pub const fn to_array(&self) -> [GeoPoint; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_left,
            self.bottom_right,
        ]
    }

    /// Boundary walk order: TL, TR, BR, BL.
    pub(super) const fn ring(&self) -> [GeoPoint; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    /// Midpoint of the top-left/bottom-right diagonal.
    ///
    /// Matches the rectangle editing model rather than the four-corner centroid.
    pub fn center(&self) -> GeoPoint {
        self.top_left.midpoint(self.bottom_right)
    }

    /// Envelope of all four corners; differs from the corners when rotated.
    pub fn bounds(&self) -> GeoBounds {
        let [tl, tr, bl, br] = self.to_array();
        let mut bounds = GeoBounds::from_corners(tl, br);
        for p in [tr, bl] {
            bounds.south = bounds.south.min(p.lat);
            bounds.north = bounds.north.max(p.lat);
            bounds.west = bounds.west.min(p.lng);
            bounds.east = bounds.east.max(p.lng);
        }
        bounds
    }

    /// Same shape shifted by a degree delta.
    pub fn translate(&self, d_lat: f64, d_lng: f64) -> Self {
        Self {
            top_left: self.top_left.offset(d_lat, d_lng),
            top_right: self.top_right.offset(d_lat, d_lng),
            bottom_left: self.bottom_left.offset(d_lat, d_lng),
            bottom_right: self.bottom_right.offset(d_lat, d_lng),
        }
    }

    /// Shift so that [`Self::center`] lands on `target`.
    pub fn recentered(&self, target: GeoPoint) -> Self {
        let center = self.center();
        self.translate(target.lat - center.lat, target.lng - center.lng)
    }

    /// True when the corners form a north-up rectangle within `tolerance` degrees.
    pub fn is_axis_aligned(&self, tolerance: f64) -> bool {
        let close = |a: f64, b: f64| (a - b).abs() <= tolerance;
        close(self.top_left.lat, self.top_right.lat)
            && close(self.bottom_left.lat, self.bottom_right.lat)
            && close(self.top_left.lng, self.bottom_left.lng)
            && close(self.top_right.lng, self.bottom_right.lng)
    }

    pub fn is_valid(&self) -> bool {
        self.to_array().iter().all(|p| p.is_valid())
    }
}
