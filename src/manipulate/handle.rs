use super::viewport::MapViewport;
use crate::geometry::{AnchorCorners, Corner};
use crate::types::PixelPoint;

/// What a press grabbed: a corner handle or the overlay body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    Corner(Corner),
    Center,
}

impl Handle {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Corner(corner) => corner.label(),
            Self::Center => "center",
        }
    }
}

/// Resolve a press to a handle.
///
/// Corners win when the pointer is within `radius` screen pixels (nearest
/// first); otherwise a press inside the projected quad grabs the body.
pub fn hit_test<V: MapViewport + ?Sized>(
    corners: &AnchorCorners,
    pointer: PixelPoint,
    viewport: &V,
    radius: f64,
) -> Option<Handle> {
    if !pointer.is_finite() {
        return None;
    }
    let mut screen = [PixelPoint::default(); 4];
    for (slot, corner) in screen.iter_mut().zip(Corner::ALL) {
        *slot = viewport.geo_to_pixel(corners.corner(corner))?;
    }

    let nearest = Corner::ALL
        .into_iter()
        .zip(screen)
        .map(|(corner, at)| (corner, at.distance(pointer)))
        .filter(|(_, dist)| *dist <= radius)
        .min_by(|a, b| a.1.total_cmp(&b.1));
    if let Some((corner, _)) = nearest {
        return Some(Handle::Corner(corner));
    }

    // Corner::ALL is NW, NE, SW, SE; walk the boundary NW, NE, SE, SW.
    let ring = [screen[0], screen[1], screen[3], screen[2]];
    point_in_polygon(pointer, &ring).then_some(Handle::Center)
}

/// Even-odd crossing test.
fn point_in_polygon(p: PixelPoint, ring: &[PixelPoint]) -> bool {
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (a, b) = (ring[i], ring[j]);
        if (a.y > p.y) != (b.y > p.y) {
            let cross_x = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < cross_x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}
