use log::{debug, warn};

use super::handle::{Handle, hit_test};
use super::session::ManipulationSession;
use super::viewport::MapViewport;
use crate::config::EditSettings;
use crate::geometry::AnchorCorners;
use crate::overlay::OverlayRecord;
use crate::types::{GeoPoint, PixelPoint};

/// Drag state of one overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ManipulationState {
    Idle,
    Dragging(ManipulationSession),
}

/// Final geometry handed back when a drag ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditOutcome {
    pub handle: Handle,
    pub corners: AnchorCorners,
    pub center: GeoPoint,
}

/// Press/move/release driver for one overlay's handles.
#[derive(Debug, Clone)]
pub struct OverlayEditor {
    committed: AnchorCorners,
    state: ManipulationState,
    locked: bool,
    handle_radius: f64,
}

impl OverlayEditor {
    pub fn new(corners: AnchorCorners) -> Self {
        Self::with_settings(corners, &EditSettings::default())
    }

    pub const fn with_settings(corners: AnchorCorners, settings: &EditSettings) -> Self {
        Self {
            committed: corners,
            state: ManipulationState::Idle,
            locked: false,
            handle_radius: settings.handle_radius_px,
        }
    }

    /// Editor for a placed record, inheriting its lock. `None` before placement.
    pub fn for_record(record: &OverlayRecord, settings: &EditSettings) -> Option<Self> {
        let mut editor = Self::with_settings(record.anchors?, settings);
        editor.locked = record.control.locked;
        Some(editor)
    }

    pub const fn state(&self) -> &ManipulationState {
        &self.state
    }

    pub const fn is_dragging(&self) -> bool {
        matches!(self.state, ManipulationState::Dragging(_))
    }

    pub const fn active_handle(&self) -> Option<Handle> {
        match &self.state {
            ManipulationState::Dragging(session) => Some(session.handle()),
            ManipulationState::Idle => None,
        }
    }

    pub const fn is_locked(&self) -> bool {
        self.locked
    }

    /// Locking mid-drag cancels the drag and restores the committed corners.
    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
        if locked && self.is_dragging() {
            debug!("overlay locked during drag, cancelling");
            self.state = ManipulationState::Idle;
        }
    }

    /// Live corners: the drag preview while dragging, else the committed ones.
    pub const fn corners(&self) -> AnchorCorners {
        match &self.state {
            ManipulationState::Dragging(session) => session.corners(),
            ManipulationState::Idle => self.committed,
        }
    }

    pub const fn committed(&self) -> AnchorCorners {
        self.committed
    }

    /// Replace the committed corners, e.g. after a fresh placement.
    ///
    /// Refused while a drag is in progress.
    pub fn set_committed(&mut self, corners: AnchorCorners) -> bool {
        if self.is_dragging() {
            warn!("ignoring external geometry update during a drag");
            return false;
        }
        self.committed = corners;
        true
    }

    /// Hit-test the pointer and start a drag on whatever it grabbed.
    ///
    /// A second press while already dragging is ignored.
    pub fn press<V: MapViewport + ?Sized>(
        &mut self,
        pointer: PixelPoint,
        viewport: &V,
    ) -> Option<Handle> {
        if self.locked || self.is_dragging() {
            return None;
        }
        let handle = hit_test(&self.committed, pointer, viewport, self.handle_radius)?;
        self.begin(handle, pointer).then_some(handle)
    }

    /// Start a drag on a handle the host already resolved.
    pub fn begin(&mut self, handle: Handle, pointer: PixelPoint) -> bool {
        if self.locked || self.is_dragging() || !pointer.is_finite() {
            return false;
        }
        debug!("drag start on {}", handle.label());
        self.state =
            ManipulationState::Dragging(ManipulationSession::begin(handle, pointer, self.committed));
        true
    }

    pub fn pointer_move<V: MapViewport + ?Sized>(
        &mut self,
        pointer: PixelPoint,
        viewport: &V,
    ) -> AnchorCorners {
        match &mut self.state {
            ManipulationState::Dragging(session) => session.update(pointer, viewport),
            ManipulationState::Idle => self.committed,
        }
    }

    /// End the drag and commit its last corners. Idle releases return `None`.
    pub fn release(&mut self) -> Option<EditOutcome> {
        let ManipulationState::Dragging(session) =
            std::mem::replace(&mut self.state, ManipulationState::Idle)
        else {
            return None;
        };
        let corners = session.corners();
        self.committed = corners;
        let center = corners.center();
        debug!(
            "drag end on {}: center ({:.6}, {:.6})",
            session.handle().label(),
            center.lat,
            center.lng
        );
        Some(EditOutcome {
            handle: session.handle(),
            corners,
            center,
        })
    }

    /// Pointer left the map: treated as a release.
    pub fn leave(&mut self) -> Option<EditOutcome> {
        self.release()
    }
}
