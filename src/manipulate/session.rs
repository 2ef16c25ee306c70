use log::trace;

use super::handle::Handle;
use super::viewport::MapViewport;
use crate::geometry::AnchorCorners;
use crate::types::PixelPoint;

/// One press-drag-release interaction.
///
/// Corners are recomputed from the pointer on every move; the session never
/// accumulates per-move deltas, so long drags do not drift.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManipulationSession {
    handle: Handle,
    start_pointer: PixelPoint,
    start_corners: AnchorCorners,
    current: AnchorCorners,
}

impl ManipulationSession {
    pub const fn begin(handle: Handle, pointer: PixelPoint, corners: AnchorCorners) -> Self {
        Self {
            handle,
            start_pointer: pointer,
            start_corners: corners,
            current: corners,
        }
    }

    pub const fn handle(&self) -> Handle {
        self.handle
    }

    pub const fn start_corners(&self) -> AnchorCorners {
        self.start_corners
    }

    pub const fn corners(&self) -> AnchorCorners {
        self.current
    }

    /// Track the pointer and return the live corners.
    ///
    /// When the viewport cannot convert the pointer, or the candidate is not a
    /// valid position, the last good corners are kept.
    pub fn update<V: MapViewport + ?Sized>(
        &mut self,
        pointer: PixelPoint,
        viewport: &V,
    ) -> AnchorCorners {
        match self.candidate(pointer, viewport) {
            Some(next) if next.is_valid() => self.current = next,
            _ => trace!(
                "{} drag: pointer ({:.1}, {:.1}) not convertible, holding",
                self.handle.label(),
                pointer.x,
                pointer.y
            ),
        }
        self.current
    }

    fn candidate<V: MapViewport + ?Sized>(
        &self,
        pointer: PixelPoint,
        viewport: &V,
    ) -> Option<AnchorCorners> {
        match self.handle {
            Handle::Corner(corner) => {
                let dragged = viewport.pixel_to_geo(pointer)?;
                // Anchor stays fixed for the whole drag; `current` relabels after a crossover.
                let opposite = self.start_corners.corner(corner.opposite());
                Some(AnchorCorners::rectangle(dragged, opposite))
            }
            Handle::Center => {
                let from = viewport.pixel_to_geo(self.start_pointer)?;
                let to = viewport.pixel_to_geo(pointer)?;
                Some(
                    self.start_corners
                        .translate(to.lat - from.lat, to.lng - from.lng),
                )
            }
        }
    }
}
