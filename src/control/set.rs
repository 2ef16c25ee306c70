use serde::{Deserialize, Serialize};

use crate::error::{GeoError, GeoResult};
use crate::types::{GeoPoint, PixelPoint};

/// Fewest pairs that determine a transform.
pub const MIN_POINTS: usize = 2;
/// Most pairs a selection session collects.
pub const MAX_POINTS: usize = 4;

/// One image pixel matched to one geographic position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    /// 1-based ordinal assigned when the pair was added.
    pub id: u32,
    pub pixel: PixelPoint,
    pub geo: GeoPoint,
}

/// Ordered control points collected during one selection session.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlPointSet {
    points: Vec<ControlPoint>,
    next_id: u32,
}

impl Default for ControlPointSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlPointSet {
    pub const fn new() -> Self {
        Self {
            points: Vec::new(),
            next_id: 1,
        }
    }

    /// Build a set from pixel/geo pairs in order.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (PixelPoint, GeoPoint)>) -> GeoResult<Self> {
        let mut set = Self::new();
        for (pixel, geo) in pairs {
            set.add(pixel, geo)?;
        }
        Ok(set)
    }

    /// Append a pair; ids keep increasing even after removals.
    pub fn add(&mut self, pixel: PixelPoint, geo: GeoPoint) -> GeoResult<ControlPoint> {
        if self.points.len() >= MAX_POINTS {
            return Err(GeoError::CapacityExceeded(MAX_POINTS));
        }
        let point = ControlPoint {
            id: self.next_id,
            pixel,
            geo,
        };
        self.next_id += 1;
        self.points.push(point);
        Ok(point)
    }

    /// Remove the pair with `id`, returning it when present.
    pub fn remove(&mut self, id: u32) -> Option<ControlPoint> {
        let idx = self.points.iter().position(|p| p.id == id)?;
        Some(self.points.remove(idx))
    }

    pub fn undo_last(&mut self) -> Option<ControlPoint> {
        self.points.pop()
    }

    /// Drop every pair and restart id numbering at 1.
    pub fn clear(&mut self) {
        self.points.clear();
        self.next_id = 1;
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.points.len() >= MAX_POINTS
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ControlPoint> {
        self.points.iter()
    }

    pub fn as_slice(&self) -> &[ControlPoint] {
        &self.points
    }

    pub fn get(&self, id: u32) -> Option<&ControlPoint> {
        self.points.iter().find(|p| p.id == id)
    }

    pub fn pixels(&self) -> Vec<PixelPoint> {
        self.points.iter().map(|p| p.pixel).collect()
    }

    pub fn geos(&self) -> Vec<GeoPoint> {
        self.points.iter().map(|p| p.geo).collect()
    }
}

impl<'a> IntoIterator for &'a ControlPointSet {
    type Item = &'a ControlPoint;
    type IntoIter = std::slice::Iter<'a, ControlPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
