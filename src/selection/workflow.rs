use log::debug;

use crate::control::{ControlPointSet, MAX_POINTS, MIN_POINTS};
use crate::error::{GeoError, GeoResult};
use crate::types::{GeoBounds, GeoPoint, PixelPoint};

/// Margin added around the picked map points for the preview frame.
pub const PREVIEW_PADDING: f64 = 0.1;

/// Where the user is in the pick-image, pick-map, confirm sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SelectionStep {
    #[default]
    Image,
    Map,
    Preview,
}

/// A picked point with a list-local id for removal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Picked<T> {
    pub id: u32,
    pub point: T,
}

#[derive(Debug, Clone)]
struct PickList<T> {
    items: Vec<Picked<T>>,
    next_id: u32,
}

impl<T: Copy> PickList<T> {
    const fn new() -> Self {
        Self {
            items: Vec::new(),
            next_id: 1,
        }
    }

    fn push(&mut self, point: T) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.items.push(Picked { id, point });
        id
    }

    fn remove(&mut self, id: u32) -> bool {
        let before = self.items.len();
        self.items.retain(|p| p.id != id);
        self.items.len() != before
    }

    fn clear(&mut self) {
        self.items.clear();
        self.next_id = 1;
    }

    fn points(&self) -> impl Iterator<Item = T> + '_ {
        self.items.iter().map(|p| p.point)
    }
}

/// Guided collection of matching image and map points.
///
/// Pairs are formed by pick order: the n-th image point matches the n-th map
/// point.
#[derive(Debug, Clone)]
pub struct SelectionWorkflow {
    target: usize,
    step: SelectionStep,
    pixels: PickList<PixelPoint>,
    geos: PickList<GeoPoint>,
}

impl Default for SelectionWorkflow {
    fn default() -> Self {
        Self {
            target: MAX_POINTS,
            step: SelectionStep::Image,
            pixels: PickList::new(),
            geos: PickList::new(),
        }
    }
}

impl SelectionWorkflow {
    pub fn new(target: usize) -> GeoResult<Self> {
        let mut workflow = Self::default();
        workflow.set_target(target)?;
        Ok(workflow)
    }

    pub const fn step(&self) -> SelectionStep {
        self.step
    }

    pub const fn target(&self) -> usize {
        self.target
    }

    /// Change how many pairs to collect; surplus picks are dropped.
    pub fn set_target(&mut self, target: usize) -> GeoResult<()> {
        if !(MIN_POINTS..=MAX_POINTS).contains(&target) {
            return Err(GeoError::WrongPointCount(target));
        }
        self.target = target;
        self.pixels.items.truncate(target);
        self.geos.items.truncate(target);
        Ok(())
    }

    pub fn pixel_points(&self) -> &[Picked<PixelPoint>] {
        &self.pixels.items
    }

    pub fn geo_points(&self) -> &[Picked<GeoPoint>] {
        &self.geos.items
    }

    /// Record an image click. Ignored outside the image step or once full.
    pub fn add_pixel(&mut self, pixel: PixelPoint) -> Option<u32> {
        if self.step != SelectionStep::Image
            || self.pixels.items.len() >= self.target
            || !pixel.is_finite()
        {
            return None;
        }
        let id = self.pixels.push(pixel);
        debug!("image point #{id} at ({:.1}, {:.1})", pixel.x, pixel.y);
        Some(id)
    }

    /// Record a map click. Ignored outside the map step, once full, or when invalid.
    pub fn add_geo(&mut self, geo: GeoPoint) -> Option<u32> {
        if self.step != SelectionStep::Map || self.geos.items.len() >= self.target || !geo.is_valid()
        {
            return None;
        }
        let id = self.geos.push(geo);
        debug!("map point #{id} at ({:.6}, {:.6})", geo.lat, geo.lng);
        Some(id)
    }

    pub fn remove_pixel(&mut self, id: u32) -> bool {
        self.pixels.remove(id)
    }

    pub fn remove_geo(&mut self, id: u32) -> bool {
        self.geos.remove(id)
    }

    pub fn clear_pixels(&mut self) {
        self.pixels.clear();
    }

    pub fn clear_geos(&mut self) {
        self.geos.clear();
    }

    pub fn can_advance(&self) -> bool {
        match self.step {
            SelectionStep::Image => self.pixels.items.len() == self.target,
            SelectionStep::Map => self.geos.items.len() == self.target,
            SelectionStep::Preview => false,
        }
    }

    /// Advance when the current step is complete; the map step starts empty.
    pub fn next_step(&mut self) -> bool {
        if !self.can_advance() {
            return false;
        }
        self.step = match self.step {
            SelectionStep::Image => {
                self.geos.clear();
                SelectionStep::Map
            }
            SelectionStep::Map | SelectionStep::Preview => SelectionStep::Preview,
        };
        debug!("selection advanced to {:?}", self.step);
        true
    }

    /// Step back; the step returned to starts over.
    pub fn previous_step(&mut self) -> bool {
        match self.step {
            SelectionStep::Image => return false,
            SelectionStep::Map => {
                self.pixels.clear();
                self.step = SelectionStep::Image;
            }
            SelectionStep::Preview => {
                self.geos.clear();
                self.step = SelectionStep::Map;
            }
        }
        debug!("selection went back to {:?}", self.step);
        true
    }

    pub fn reset(&mut self) {
        self.step = SelectionStep::Image;
        self.pixels.clear();
        self.geos.clear();
    }

    /// Envelope of the picked map points plus [`PREVIEW_PADDING`].
    pub fn preview_bounds(&self) -> Option<GeoBounds> {
        if self.geos.items.len() < MIN_POINTS {
            return None;
        }
        GeoBounds::from_points(self.geos.points()).map(|b| b.padded(PREVIEW_PADDING))
    }

    /// Pair the picks into a control point set. Only valid at the preview step.
    pub fn finish(&self) -> GeoResult<ControlPointSet> {
        let pairs = self.pixels.items.len().min(self.geos.items.len());
        if self.step != SelectionStep::Preview
            || self.pixels.items.len() != self.target
            || self.geos.items.len() != self.target
        {
            return Err(GeoError::WrongPointCount(pairs));
        }
        ControlPointSet::from_pairs(self.pixels.points().zip(self.geos.points()))
    }
}
